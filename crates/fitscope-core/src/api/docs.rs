//! Client for the document integration service.

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// A document listing entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocMeta {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub modified_time: Option<String>,
}

/// A document with its text content.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Deserialize)]
struct ListEnvelope {
    success: bool,
    data: Option<Vec<DocMeta>>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct DocumentEnvelope {
    success: bool,
    data: Option<Document>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct FolderEnvelope {
    success: bool,
    data: Option<FolderInfo>,
    message: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractRequest<'a> {
    document_id: &'a str,
}

#[derive(Deserialize)]
struct ExtractEnvelope {
    success: bool,
    content: Option<String>,
    message: Option<String>,
}

#[derive(Clone)]
pub struct DocsClient {
    client: Client,
    base_url: String,
}

impl DocsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn list(&self, folder_id: Option<&str>) -> Result<Vec<DocMeta>> {
        let url = match folder_id {
            Some(folder) => format!("{}/api/docs/list?folderId={}", self.base_url, folder),
            None => format!("{}/api/docs/list", self.base_url),
        };
        self.fetch_list(&url).await
    }

    pub async fn search(&self, query: &str, folder_id: Option<&str>) -> Result<Vec<DocMeta>> {
        let mut url = format!(
            "{}/api/docs/search?query={}",
            self.base_url,
            urlencode(query)
        );
        if let Some(folder) = folder_id {
            url.push_str(&format!("&folderId={}", folder));
        }
        self.fetch_list(&url).await
    }

    pub async fn get(&self, id: &str) -> Result<Document> {
        let url = format!("{}/api/docs/{}", self.base_url, id);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "document fetch failed with status: {}",
                response.status()
            ));
        }

        let envelope: DocumentEnvelope = response.json().await?;
        if !envelope.success {
            return Err(anyhow!(envelope
                .message
                .unwrap_or_else(|| "document fetch failed".to_string())));
        }
        envelope
            .data
            .ok_or_else(|| anyhow!("document response is missing data"))
    }

    /// The folder the backend stores analysis source documents in.
    pub async fn analysis_folder(&self) -> Result<FolderInfo> {
        let url = format!("{}/api/docs/analysis-folder", self.base_url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "analysis folder fetch failed with status: {}",
                response.status()
            ));
        }

        let envelope: FolderEnvelope = response.json().await?;
        if !envelope.success {
            return Err(anyhow!(envelope
                .message
                .unwrap_or_else(|| "analysis folder fetch failed".to_string())));
        }
        envelope
            .data
            .ok_or_else(|| anyhow!("analysis folder response is missing data"))
    }

    /// Extract the plain text of a document for use as a transcript.
    pub async fn extract(&self, document_id: &str) -> Result<String> {
        let url = format!("{}/api/docs/extract", self.base_url);
        tracing::debug!(document_id, "extracting document text");

        let response = self
            .client
            .post(&url)
            .json(&ExtractRequest { document_id })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "document extract failed with status: {}",
                response.status()
            ));
        }

        let envelope: ExtractEnvelope = response.json().await?;
        if !envelope.success {
            return Err(anyhow!(envelope
                .message
                .unwrap_or_else(|| "document extract failed".to_string())));
        }
        envelope
            .content
            .ok_or_else(|| anyhow!("extract response is missing content"))
    }

    async fn fetch_list(&self, url: &str) -> Result<Vec<DocMeta>> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "document list failed with status: {}",
                response.status()
            ));
        }

        let envelope: ListEnvelope = response.json().await?;
        if !envelope.success {
            return Err(anyhow!(envelope
                .message
                .unwrap_or_else(|| "document list failed".to_string())));
        }
        Ok(envelope.data.unwrap_or_default())
    }
}

/// Minimal query-string escaping for the few characters that matter here.
fn urlencode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            ' ' => out.push_str("%20"),
            '&' => out.push_str("%26"),
            '=' => out.push_str("%3D"),
            '?' => out.push_str("%3F"),
            '#' => out.push_str("%23"),
            '%' => out.push_str("%25"),
            '+' => out.push_str("%2B"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urlencode_escapes_query_characters() {
        assert_eq!(urlencode("roofing & solar"), "roofing%20%26%20solar");
        assert_eq!(urlencode("plain"), "plain");
    }
}
