use super::{ExecutionPort, ExecutionRecord, ExecutionRequest, ExecutionStatus, elapsed_ms};
use crate::environment::BaseUrls;
use anyhow::Result;
use async_trait::async_trait;
use finconsole_form::HttpMethod;
use serde_json::{Value, json};
use std::time::Duration;

/// Sends the call to the real backend of the selected environment.
pub struct HttpExecutor {
    client: reqwest::Client,
    base_urls: BaseUrls,
}

impl HttpExecutor {
    pub fn new(base_urls: BaseUrls) -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self::with_client(client, base_urls))
    }

    pub fn with_client(client: reqwest::Client, base_urls: BaseUrls) -> Self {
        Self { client, base_urls }
    }

    fn url_for(&self, request: &ExecutionRequest) -> String {
        format!(
            "{}{}",
            self.base_urls.get(request.environment).trim_end_matches('/'),
            request.endpoint
        )
    }
}

#[async_trait]
impl ExecutionPort for HttpExecutor {
    fn name(&self) -> &'static str {
        "http"
    }

    #[tracing::instrument(skip(self, request), fields(endpoint = %request.endpoint, method = %request.method, env = %request.environment))]
    async fn execute(&self, request: ExecutionRequest) -> ExecutionRecord {
        let started = tokio::time::Instant::now();
        let url = self.url_for(&request);

        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        tracing::debug!(method = %method, url = %url, "Sending HTTP request");

        let mut request_builder = self.client.request(method, &url);
        request_builder = match request.method {
            HttpMethod::Get => request_builder.query(&query_pairs(&request.payload)),
            _ => request_builder.json(&request.payload),
        };

        let (status, response) = match request_builder.send().await {
            Ok(resp) => {
                let code = resp.status();
                tracing::debug!(status = %code, "Received HTTP response");
                let text = resp.text().await.unwrap_or_default();
                let body: Value =
                    serde_json::from_str(&text).unwrap_or_else(|_| json!({ "raw": text }));

                if code.is_success() {
                    (ExecutionStatus::Success, body)
                } else {
                    (
                        ExecutionStatus::Error,
                        json!({
                            "code": code.as_u16(),
                            "message": code.canonical_reason().unwrap_or("Request Failed"),
                            "body": body,
                        }),
                    )
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "HTTP request failed");
                (
                    ExecutionStatus::Error,
                    json!({
                        "code": 500,
                        "message": format!("Request Failed: {}", e),
                    }),
                )
            }
        };

        ExecutionRecord::new(request, status, response, elapsed_ms(started))
    }
}

/// Flattens an object payload into query parameters. Non-object payloads send
/// no parameters.
fn query_pairs(payload: &Value) -> Vec<(String, String)> {
    let Some(map) = payload.as_object() else {
        return Vec::new();
    };
    map.iter()
        .map(|(k, v)| {
            let value = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs_stringify_scalars() {
        let pairs = query_pairs(&json!({"referenceId": "R-1", "limit": 10, "flag": true}));
        assert_eq!(
            pairs,
            vec![
                ("referenceId".to_string(), "R-1".to_string()),
                ("limit".to_string(), "10".to_string()),
                ("flag".to_string(), "true".to_string()),
            ]
        );
        assert!(query_pairs(&json!("plain")).is_empty());
    }
}
