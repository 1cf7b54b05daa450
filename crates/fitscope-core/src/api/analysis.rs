//! Client for the transcript analysis service.

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::model::Analysis;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptRequest<'a> {
    transcript: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    document_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct AnalysisEnvelope {
    success: bool,
    results: Option<Analysis>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct HistoryEnvelope {
    success: bool,
    data: Option<Vec<Analysis>>,
    message: Option<String>,
}

#[derive(Clone)]
pub struct AnalysisClient {
    client: Client,
    base_url: String,
}

impl AnalysisClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Submit a transcript for analysis and return the validated fit report.
    pub async fn submit_transcript(
        &self,
        transcript: &str,
        document_id: Option<&str>,
    ) -> Result<Analysis> {
        let url = format!("{}/analysis/transcript", self.base_url);
        tracing::debug!(chars = transcript.len(), "submitting transcript");

        let request = TranscriptRequest {
            transcript,
            document_id,
        };

        let response = self.client.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "analysis request failed with status: {}",
                response.status()
            ));
        }

        let envelope: AnalysisEnvelope = response.json().await?;
        if !envelope.success {
            return Err(anyhow!(envelope
                .message
                .unwrap_or_else(|| "analysis failed".to_string())));
        }

        let analysis = envelope
            .results
            .ok_or_else(|| anyhow!("analysis response is missing results"))?;
        analysis.validate()?;
        Ok(analysis)
    }

    /// Fetch the most recent analyses, newest first.
    pub async fn history(&self, limit: usize) -> Result<Vec<Analysis>> {
        let url = format!("{}/analysis/history?limit={}", self.base_url, limit);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "history request failed with status: {}",
                response.status()
            ));
        }

        let envelope: HistoryEnvelope = response.json().await?;
        if !envelope.success {
            return Err(anyhow!(envelope
                .message
                .unwrap_or_else(|| "history fetch failed".to_string())));
        }

        Ok(envelope.data.unwrap_or_default())
    }

    pub async fn get(&self, id: &str) -> Result<Analysis> {
        let url = format!("{}/analysis/{}", self.base_url, id);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "analysis fetch failed with status: {}",
                response.status()
            ));
        }

        let envelope: AnalysisEnvelope = response.json().await?;
        if !envelope.success {
            return Err(anyhow!(envelope
                .message
                .unwrap_or_else(|| "analysis fetch failed".to_string())));
        }

        let analysis = envelope
            .results
            .ok_or_else(|| anyhow!("analysis response is missing results"))?;
        analysis.validate()?;
        Ok(analysis)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let url = format!("{}/analysis/{}", self.base_url, id);

        let response = self.client.delete(&url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "delete failed with status: {}",
                response.status()
            ));
        }
        Ok(())
    }

    /// Download the exported PDF for an analysis.
    pub async fn export(&self, id: &str) -> Result<Vec<u8>> {
        let url = format!("{}/analysis/{}/export", self.base_url, id);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "export failed with status: {}",
                response.status()
            ));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
