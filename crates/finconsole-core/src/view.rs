use crate::environment::Environment;
use crate::execution::{ExecutionRecord, ExecutionStatus};
use crate::history::ExecutionHistory;
use serde::Serialize;

/// One line of the execution history table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    /// 1-based position, newest first.
    pub index: usize,
    pub id: String,
    pub status: ExecutionStatus,
    pub time: String,
    pub summary: String,
    pub latency: String,
}

impl HistoryRow {
    pub fn rows(history: &ExecutionHistory) -> Vec<Self> {
        history
            .iter()
            .enumerate()
            .map(|(i, record)| Self {
                index: i + 1,
                id: record.id.to_string(),
                status: record.status,
                time: record
                    .timestamp
                    .with_timezone(&chrono::Local)
                    .format("%H:%M:%S")
                    .to_string(),
                summary: record.summary.clone(),
                latency: format!("{}ms", record.latency_ms),
            })
            .collect()
    }
}

/// Everything the detail drawer shows for one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordDetail {
    pub id: String,
    pub status: ExecutionStatus,
    pub environment: Environment,
    pub headline: &'static str,
    pub summary: String,
    pub request_json: String,
    pub response_json: String,
}

impl From<&ExecutionRecord> for RecordDetail {
    fn from(record: &ExecutionRecord) -> Self {
        let headline = match record.status {
            ExecutionStatus::Success => "Execution Successful",
            ExecutionStatus::Error => "Execution Failed",
        };
        Self {
            id: record.id.to_string(),
            status: record.status,
            environment: record.environment,
            headline,
            summary: record.summary.clone(),
            request_json: serde_json::to_string_pretty(&record.request_payload)
                .unwrap_or_default(),
            response_json: serde_json::to_string_pretty(&record.response_payload)
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::ExecutionRequest;
    use finconsole_form::HttpMethod;
    use serde_json::json;

    fn record(status: ExecutionStatus) -> ExecutionRecord {
        let request = ExecutionRequest {
            endpoint: "/data/sign".to_string(),
            method: HttpMethod::Post,
            payload: json!({"referenceId": "R-1"}),
            environment: Environment::Prod,
        };
        ExecutionRecord::new(request, status, json!({"code": 500}), 1234)
    }

    #[test]
    fn test_rows_follow_history_order() {
        let mut history = ExecutionHistory::default();
        history.push(record(ExecutionStatus::Success));
        history.push(record(ExecutionStatus::Error));

        let rows = HistoryRow::rows(&history);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].index, 1);
        assert_eq!(rows[0].status, ExecutionStatus::Error);
        assert_eq!(rows[0].summary, "Transaction Failed");
        assert_eq!(rows[1].summary, "Transaction Completed");
        assert_eq!(rows[1].latency, "1234ms");
        assert_eq!(rows[1].time.len(), 8);
    }

    #[test]
    fn test_detail_pretty_prints_payloads() {
        let detail = RecordDetail::from(&record(ExecutionStatus::Error));
        assert_eq!(detail.headline, "Execution Failed");
        assert_eq!(detail.environment, Environment::Prod);
        assert_eq!(detail.request_json, "{\n  \"referenceId\": \"R-1\"\n}");
        assert!(detail.response_json.contains("\"code\": 500"));
    }
}
