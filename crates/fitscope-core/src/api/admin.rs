//! Client for backend configuration, dashboard metrics, and health checks.

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// The backend's model selection and what it could switch to.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelConfig {
    pub model: Option<String>,
    pub available_models: Vec<String>,
}

/// Backend API settings (which provider it talks to, where).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiConfig {
    pub provider: Option<String>,
    pub endpoint: Option<String>,
}

/// A stored prompt template.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metrics {
    pub total_analyses: Option<u32>,
    pub average_fit_score: Option<f64>,
    pub analyses_this_week: Option<u32>,
    pub top_industries: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub description: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub label: String,
    pub value: f64,
}

/// Result of probing one backend integration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub service: String,
    pub connected: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    message: Option<String>,
}

#[derive(Serialize)]
struct ModelUpdate<'a> {
    model: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TemplateUpsert<'a> {
    name: &'a str,
    content: &'a str,
}

#[derive(Clone)]
pub struct AdminClient {
    client: Client,
    base_url: String,
}

impl AdminClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn model_config(&self) -> Result<ModelConfig> {
        self.get_enveloped("/api/config/model", "model config").await
    }

    pub async fn set_model(&self, model: &str) -> Result<()> {
        let url = format!("{}/api/config/model", self.base_url);
        let response = self
            .client
            .put(&url)
            .json(&ModelUpdate { model })
            .send()
            .await?;
        Self::check_status("model update", response.status())
    }

    pub async fn api_config(&self) -> Result<ApiConfig> {
        self.get_enveloped("/api/config/api", "api config").await
    }

    pub async fn set_api_config(&self, config: &ApiConfig) -> Result<()> {
        let url = format!("{}/api/config/api", self.base_url);
        let response = self.client.put(&url).json(config).send().await?;
        Self::check_status("api config update", response.status())
    }

    pub async fn templates(&self) -> Result<Vec<Template>> {
        let templates: Option<Vec<Template>> = self
            .get_enveloped_opt("/api/config/templates", "templates")
            .await?;
        Ok(templates.unwrap_or_default())
    }

    pub async fn create_template(&self, name: &str, content: &str) -> Result<Template> {
        let url = format!("{}/api/config/templates", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&TemplateUpsert { name, content })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "template create failed with status: {}",
                response.status()
            ));
        }
        let envelope: Envelope<Template> = response.json().await?;
        Self::unwrap_envelope(envelope, "template create")
    }

    pub async fn update_template(&self, id: &str, name: &str, content: &str) -> Result<()> {
        let url = format!("{}/api/config/templates/{}", self.base_url, id);
        let response = self
            .client
            .put(&url)
            .json(&TemplateUpsert { name, content })
            .send()
            .await?;
        Self::check_status("template update", response.status())
    }

    pub async fn delete_template(&self, id: &str) -> Result<()> {
        let url = format!("{}/api/config/templates/{}", self.base_url, id);
        let response = self.client.delete(&url).send().await?;
        Self::check_status("template delete", response.status())
    }

    pub async fn metrics(&self) -> Result<Metrics> {
        self.get_enveloped("/api/dashboard/metrics", "metrics").await
    }

    pub async fn activity(&self) -> Result<Vec<ActivityEntry>> {
        let entries: Option<Vec<ActivityEntry>> = self
            .get_enveloped_opt("/api/dashboard/activity", "activity")
            .await?;
        Ok(entries.unwrap_or_default())
    }

    pub async fn trends(&self) -> Result<Vec<TrendPoint>> {
        let points: Option<Vec<TrendPoint>> = self
            .get_enveloped_opt("/api/dashboard/trends", "trends")
            .await?;
        Ok(points.unwrap_or_default())
    }

    pub async fn test_connections(&self) -> Result<Vec<ConnectionStatus>> {
        let statuses: Option<Vec<ConnectionStatus>> = self
            .get_enveloped_opt("/api/test-connections", "connection test")
            .await?;
        Ok(statuses.unwrap_or_default())
    }

    /// True when the backend answers its health endpoint.
    pub async fn health(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        Ok(response.status().is_success())
    }

    async fn get_enveloped<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        what: &str,
    ) -> Result<T> {
        let data: Option<T> = self.get_enveloped_opt(path, what).await?;
        data.ok_or_else(|| anyhow!("{} response is missing data", what))
    }

    async fn get_enveloped_opt<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        what: &str,
    ) -> Result<Option<T>> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "{} fetch failed with status: {}",
                what,
                response.status()
            ));
        }

        let envelope: Envelope<T> = response.json().await?;
        if !envelope.success {
            return Err(anyhow!(envelope
                .message
                .unwrap_or_else(|| format!("{} fetch failed", what))));
        }
        Ok(envelope.data)
    }

    fn check_status(what: &str, status: reqwest::StatusCode) -> Result<()> {
        if !status.is_success() {
            return Err(anyhow!("{} failed with status: {}", what, status));
        }
        Ok(())
    }

    fn unwrap_envelope<T>(envelope: Envelope<T>, what: &str) -> Result<T> {
        if !envelope.success {
            return Err(anyhow!(envelope
                .message
                .unwrap_or_else(|| format!("{} failed", what))));
        }
        envelope
            .data
            .ok_or_else(|| anyhow!("{} response is missing data", what))
    }
}
