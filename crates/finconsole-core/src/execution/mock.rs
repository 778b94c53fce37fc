use super::{ExecutionPort, ExecutionRecord, ExecutionRequest, ExecutionStatus, elapsed_ms};
use crate::config::MockConfig;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value, json};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

pub const SUCCESS_MESSAGE: &str = "Process executed successfully";
pub const FAILURE_MESSAGE: &str = "Internal System Error: Downstream service timeout";

/// Fabricates responses after a random delay, failing a fixed share of calls.
pub struct MockExecutor {
    config: MockConfig,
    rng: Mutex<StdRng>,
}

impl MockExecutor {
    pub fn new(config: MockConfig) -> Self {
        Self {
            config,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic draws, for tests.
    pub fn with_seed(config: MockConfig, seed: u64) -> Self {
        Self {
            config,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn config(&self) -> &MockConfig {
        &self.config
    }

    /// Draws the delay and the outcome for one call.
    fn draw(&self) -> (Duration, bool) {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let min = self.config.latency_min_ms;
        let max = self.config.latency_max_ms;
        let delay_ms = if min < max { rng.gen_range(min..max) } else { min };
        let success = rng.r#gen::<f64>() >= self.config.failure_rate;
        (Duration::from_millis(delay_ms), success)
    }
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new(MockConfig::default())
    }
}

#[async_trait]
impl ExecutionPort for MockExecutor {
    fn name(&self) -> &'static str {
        "mock"
    }

    #[tracing::instrument(skip(self, request), fields(endpoint = %request.endpoint, method = %request.method))]
    async fn execute(&self, request: ExecutionRequest) -> ExecutionRecord {
        let started = tokio::time::Instant::now();
        let (delay, success) = self.draw();

        tracing::debug!(delay_ms = delay.as_millis() as u64, "Simulating network delay");
        tokio::time::sleep(delay).await;

        let now = Utc::now();
        let (status, response) = if success {
            (ExecutionStatus::Success, success_response(&request.payload, now))
        } else {
            (ExecutionStatus::Error, failure_response(now))
        };

        let record = ExecutionRecord::new(request, status, response, elapsed_ms(started));
        tracing::info!(
            record_id = %record.id,
            status = record.status.as_str(),
            latency_ms = record.latency_ms,
            "Mock execution finished"
        );
        record
    }
}

fn success_response(payload: &Value, now: DateTime<Utc>) -> Value {
    let mut data = match payload {
        Value::Object(map) => map.clone(),
        other => {
            let mut map = Map::new();
            map.insert("payload".to_string(), other.clone());
            map
        }
    };
    data.insert(
        "processedAt".to_string(),
        Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );

    json!({
        "code": 200,
        "message": SUCCESS_MESSAGE,
        "transactionId": format!("TXN-{}", now.timestamp_millis()),
        "data": data,
    })
}

fn failure_response(now: DateTime<Utc>) -> Value {
    json!({
        "code": 500,
        "message": FAILURE_MESSAGE,
        "errorId": format!("ERR-{}", now.timestamp_millis()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use finconsole_form::HttpMethod;

    fn request(payload: Value) -> ExecutionRequest {
        ExecutionRequest {
            endpoint: "/transaction/withdraw".to_string(),
            method: HttpMethod::Post,
            payload,
            environment: Environment::Test,
        }
    }

    #[tokio::test]
    async fn test_success_echoes_payload() {
        let executor = MockExecutor::new(MockConfig::instant());
        let record = executor.execute(request(json!({"amount": 5}))).await;

        assert_eq!(record.status, ExecutionStatus::Success);
        assert_eq!(record.summary, "Transaction Completed");
        assert_eq!(record.environment, Environment::Test);
        assert_eq!(record.request_payload, json!({"amount": 5}));

        let response = &record.response_payload;
        assert_eq!(response["code"], json!(200));
        assert_eq!(response["message"], json!(SUCCESS_MESSAGE));
        assert!(response["transactionId"].as_str().unwrap().starts_with("TXN-"));
        assert_eq!(response["data"]["amount"], json!(5));
        assert!(response["data"]["processedAt"].is_string());
    }

    #[tokio::test]
    async fn test_forced_failure_is_data() {
        let config = MockConfig {
            failure_rate: 1.0,
            ..MockConfig::instant()
        };
        let executor = MockExecutor::new(config);
        let record = executor.execute(request(json!({}))).await;

        assert_eq!(record.status, ExecutionStatus::Error);
        assert_eq!(record.summary, "Transaction Failed");
        assert_eq!(record.response_payload["code"], json!(500));
        assert_eq!(record.response_payload["message"], json!(FAILURE_MESSAGE));
        assert!(
            record.response_payload["errorId"]
                .as_str()
                .unwrap()
                .starts_with("ERR-")
        );
        assert!(record.response_payload.get("data").is_none());
    }

    #[tokio::test]
    async fn test_non_object_payload_is_wrapped() {
        let executor = MockExecutor::new(MockConfig::instant());
        let record = executor.execute(request(json!([1, 2, 3]))).await;
        assert_eq!(record.request_payload, json!([1, 2, 3]));
        assert_eq!(record.response_payload["data"]["payload"], json!([1, 2, 3]));
    }

    #[test]
    fn test_seeded_draws_repeat() {
        let a = MockExecutor::with_seed(MockConfig::default(), 7);
        let b = MockExecutor::with_seed(MockConfig::default(), 7);
        for _ in 0..20 {
            assert_eq!(a.draw(), b.draw());
        }
    }

    #[test]
    fn test_draw_stays_in_range() {
        let executor = MockExecutor::with_seed(MockConfig::default(), 42);
        for _ in 0..500 {
            let (delay, _) = executor.draw();
            assert!(delay >= Duration::from_millis(800));
            assert!(delay < Duration::from_millis(1800));
        }
    }
}
