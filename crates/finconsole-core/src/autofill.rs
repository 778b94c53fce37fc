//! AI-assisted form filling.
//!
//! Best-effort by construction: every failure collapses into
//! [`Suggestion::Empty`] so callers never handle an error.

use crate::config::AiConfig;
use crate::secrets::{SecretStore, first_secret};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use finconsole_form::FieldSpec;
use serde_json::{Map, Value, json};
use std::time::Duration;

pub const SYSTEM_INSTRUCTION: &str = "You are a specialized Financial QA assistant.
Your job is to generate realistic, valid JSON test data for financial API payloads based on a list of form fields provided.
- Ensure numbers are realistic (e.g., loan amounts, interest rates).
- Ensure dates are valid and logical.
- Return ONLY the JSON object. No markdown formatting.";

/// Secret keys tried, in order, for the provider credential.
pub const CREDENTIAL_KEYS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

#[derive(Debug, Clone, PartialEq)]
pub enum Suggestion {
    Filled(Map<String, Value>),
    Empty,
}

impl Suggestion {
    pub fn is_empty(&self) -> bool {
        self.key_count() == 0
    }

    pub fn key_count(&self) -> usize {
        match self {
            Suggestion::Filled(map) => map.len(),
            Suggestion::Empty => 0,
        }
    }

    pub fn into_map(self) -> Map<String, Value> {
        match self {
            Suggestion::Filled(map) => map,
            Suggestion::Empty => Map::new(),
        }
    }
}

#[async_trait]
pub trait AutoFill: Send + Sync {
    async fn suggest(&self, fields: &[FieldSpec]) -> Suggestion;
}

/// Used when no provider is configured.
#[derive(Debug, Clone, Default)]
pub struct DisabledAutoFill;

#[async_trait]
impl AutoFill for DisabledAutoFill {
    async fn suggest(&self, _fields: &[FieldSpec]) -> Suggestion {
        Suggestion::Empty
    }
}

/// Google Gemini `generateContent` client.
pub struct GeminiAutoFill {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiAutoFill {
    pub fn new(client: reqwest::Client, api_key: Option<String>, config: &AiConfig) -> Self {
        Self {
            client,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolves the credential through `secrets`. A missing credential is not
    /// an error; the adapter then answers every request with nothing.
    pub async fn from_secrets(secrets: &dyn SecretStore, config: &AiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build AI HTTP client")?;
        let api_key = first_secret(secrets, &CREDENTIAL_KEYS).await;
        Ok(Self::new(client, api_key, config))
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn request(&self, api_key: &str, fields: &[FieldSpec]) -> Result<Suggestion> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = json!({
            "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
            "contents": [{ "role": "user", "parts": [{ "text": build_prompt(fields) }] }],
            "generationConfig": { "responseMimeType": "application/json" },
        });

        tracing::debug!(model = %self.model, fields = fields.len(), "Requesting test data");

        let reply: Value = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .context("Provider request failed")?
            .error_for_status()
            .context("Provider returned an error status")?
            .json()
            .await
            .context("Provider reply is not JSON")?;

        let text = reply_text(&reply).ok_or_else(|| anyhow!("Provider reply has no text"))?;
        let parsed: Value = serde_json::from_str(strip_code_fence(text))
            .context("Generated text is not valid JSON")?;

        match parsed {
            Value::Object(map) => Ok(Suggestion::Filled(map)),
            other => Err(anyhow!("Generated JSON is not an object: {}", other)),
        }
    }
}

#[async_trait]
impl AutoFill for GeminiAutoFill {
    #[tracing::instrument(skip_all, fields(model = %self.model))]
    async fn suggest(&self, fields: &[FieldSpec]) -> Suggestion {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("Gemini API key missing");
            return Suggestion::Empty;
        };

        match self.request(api_key, fields).await {
            Ok(suggestion) => {
                tracing::info!(keys = suggestion.key_count(), "Generated test data");
                suggestion
            }
            Err(e) => {
                tracing::error!(error = %format!("{:#}", e), "Failed to generate test data");
                Suggestion::Empty
            }
        }
    }
}

/// `name (kind): label` for each field, comma separated.
pub fn describe_fields(fields: &[FieldSpec]) -> String {
    fields
        .iter()
        .map(|f| format!("{} ({}): {}", f.name, f.kind, f.label))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn build_prompt(fields: &[FieldSpec]) -> String {
    format!(
        "Generate a JSON object for a financial transaction with the following fields: [{}].",
        describe_fields(fields)
    )
}

fn reply_text(reply: &Value) -> Option<&str> {
    reply
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
}

/// Models sometimes wrap JSON in a markdown fence despite being told not to.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_fields() {
        let fields = vec![
            FieldSpec::text("customerId", "Customer ID"),
            FieldSpec::number("amount", "Withdrawal Amount"),
        ];
        assert_eq!(
            build_prompt(&fields),
            "Generate a JSON object for a financial transaction with the following fields: \
             [customerId (text): Customer ID, amount (number): Withdrawal Amount]."
        );
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  ```\n{}\n```  "), "{}");
    }

    #[test]
    fn test_reply_text_path() {
        let reply = json!({"candidates": [{"content": {"parts": [{"text": "{}"}]}}]});
        assert_eq!(reply_text(&reply), Some("{}"));
        assert_eq!(reply_text(&json!({"candidates": []})), None);
    }

    #[tokio::test]
    async fn test_missing_credential_is_empty() {
        let adapter = GeminiAutoFill::new(reqwest::Client::new(), None, &AiConfig::default());
        assert!(!adapter.has_credential());
        let fields = vec![FieldSpec::text("referenceId", "Reference ID")];
        assert_eq!(adapter.suggest(&fields).await, Suggestion::Empty);
    }
}
