//! Client for the spreadsheet integration service.

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

/// A spreadsheet listing entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetMeta {
    pub id: String,
    pub name: String,
}

/// A rectangular block of cell text.
#[derive(Debug, Clone, Default)]
pub struct SheetData {
    pub range: Option<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Deserialize)]
struct ListEnvelope {
    success: bool,
    data: Option<Vec<SheetMeta>>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct DataEnvelope {
    success: bool,
    range: Option<String>,
    // Cells arrive as whatever JSON type the sheet holds; they are
    // stringified here so the UI never sees raw Values.
    values: Option<Vec<Vec<Value>>>,
    message: Option<String>,
}

#[derive(Clone)]
pub struct SheetsClient {
    client: Client,
    base_url: String,
}

impl SheetsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn list(&self) -> Result<Vec<SheetMeta>> {
        let url = format!("{}/api/sheets/list", self.base_url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "sheet list failed with status: {}",
                response.status()
            ));
        }

        let envelope: ListEnvelope = response.json().await?;
        if !envelope.success {
            return Err(anyhow!(envelope
                .message
                .unwrap_or_else(|| "sheet list failed".to_string())));
        }
        Ok(envelope.data.unwrap_or_default())
    }

    pub async fn data(&self, spreadsheet_id: &str, range: Option<&str>) -> Result<SheetData> {
        let mut url = format!(
            "{}/api/sheets/data?spreadsheetId={}",
            self.base_url, spreadsheet_id
        );
        if let Some(range) = range {
            url.push_str(&format!("&range={}", range));
        }

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "sheet data failed with status: {}",
                response.status()
            ));
        }

        let envelope: DataEnvelope = response.json().await?;
        if !envelope.success {
            return Err(anyhow!(envelope
                .message
                .unwrap_or_else(|| "sheet data failed".to_string())));
        }

        let rows = envelope
            .values
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();

        Ok(SheetData {
            range: envelope.range,
            rows,
        })
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_text_stringifies_mixed_types() {
        assert_eq!(cell_text(json!("Acme")), "Acme");
        assert_eq!(cell_text(json!(85)), "85");
        assert_eq!(cell_text(json!(true)), "true");
        assert_eq!(cell_text(json!(null)), "");
    }
}
