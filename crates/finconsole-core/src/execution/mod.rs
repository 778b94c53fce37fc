pub mod http;
pub mod mock;

pub use http::HttpExecutor;
pub use mock::MockExecutor;

use crate::environment::Environment;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use finconsole_form::HttpMethod;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const SUCCESS_SUMMARY: &str = "Transaction Completed";
pub const FAILURE_SUMMARY: &str = "Transaction Failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExecutionStatus {
    Success,
    Error,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Success => "SUCCESS",
            ExecutionStatus::Error => "ERROR",
        }
    }
}

/// One call to send to a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRequest {
    pub endpoint: String,
    pub method: HttpMethod,
    pub payload: Value,
    pub environment: Environment,
}

/// One logged outcome of a submitted call. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    pub id: Uuid,
    pub status: ExecutionStatus,
    pub timestamp: DateTime<Utc>,
    pub summary: String,
    pub request_payload: Value,
    pub response_payload: Value,
    pub environment: Environment,
    pub latency_ms: u64,
}

impl ExecutionRecord {
    /// Stamps a fresh id and the current time onto an outcome.
    pub fn new(
        request: ExecutionRequest,
        status: ExecutionStatus,
        response_payload: Value,
        latency_ms: u64,
    ) -> Self {
        let summary = match status {
            ExecutionStatus::Success => SUCCESS_SUMMARY,
            ExecutionStatus::Error => FAILURE_SUMMARY,
        };
        Self {
            id: Uuid::new_v4(),
            status,
            timestamp: Utc::now(),
            summary: summary.to_string(),
            request_payload: request.payload,
            response_payload,
            environment: request.environment,
            latency_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }
}

/// Seam between the console and whatever answers its calls.
///
/// Implementations never fail: a failed call is an [`ExecutionStatus::Error`]
/// record, not an `Err`.
#[async_trait]
pub trait ExecutionPort: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute(&self, request: ExecutionRequest) -> ExecutionRecord;
}

pub(crate) fn elapsed_ms(started: tokio::time::Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
