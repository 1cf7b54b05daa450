//! Client for the conversational query service.

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    response: String,
    conversation_id: Option<String>,
}

#[derive(Deserialize)]
struct SuggestionsResponse {
    suggestions: Option<Vec<String>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailRequest<'a> {
    analysis_id: &'a str,
    email_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_instructions: Option<&'a str>,
}

#[derive(Deserialize)]
struct EmailResponse {
    success: bool,
    email: Option<String>,
    message: Option<String>,
}

/// A reply to a chat query, with the continuation token for the next turn.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub text: String,
    pub conversation_id: Option<String>,
}

#[derive(Clone)]
pub struct ConversationClient {
    client: Client,
    base_url: String,
}

impl ConversationClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Send a free-text question about an analysis.
    pub async fn query(
        &self,
        query: &str,
        analysis_id: Option<&str>,
        conversation_id: Option<&str>,
    ) -> Result<ChatReply> {
        let url = format!("{}/api/conversation/query", self.base_url);

        let request = QueryRequest {
            query,
            analysis_id,
            conversation_id,
        };

        let response = self.client.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "conversation query failed with status: {}",
                response.status()
            ));
        }

        let body: QueryResponse = response.json().await?;
        Ok(ChatReply {
            text: body.response,
            conversation_id: body.conversation_id,
        })
    }

    /// Suggested questions for an analysis.
    pub async fn suggestions(&self, analysis_id: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/api/conversation/suggestions/{}",
            self.base_url, analysis_id
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "suggestions fetch failed with status: {}",
                response.status()
            ));
        }

        let body: SuggestionsResponse = response.json().await?;
        Ok(body.suggestions.unwrap_or_default())
    }

    /// Ask the backend to draft an email for an analysis.
    pub async fn generate_email(
        &self,
        analysis_id: &str,
        email_type: &str,
        custom_instructions: Option<&str>,
    ) -> Result<String> {
        let url = format!("{}/api/conversation/email", self.base_url);
        tracing::debug!(email_type, "requesting generated email");

        let request = EmailRequest {
            analysis_id,
            email_type,
            custom_instructions,
        };

        let response = self.client.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "email generation failed with status: {}",
                response.status()
            ));
        }

        let body: EmailResponse = response.json().await?;
        if !body.success {
            return Err(anyhow!(body
                .message
                .unwrap_or_else(|| "email generation failed".to_string())));
        }

        body.email
            .ok_or_else(|| anyhow!("email response is missing the draft"))
    }
}
