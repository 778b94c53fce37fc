use crate::execution::ExecutionRecord;
use std::collections::VecDeque;
use uuid::Uuid;

/// Execution records of one page view, newest first.
#[derive(Debug, Clone, Default)]
pub struct ExecutionHistory {
    records: VecDeque<ExecutionRecord>,
    /// Oldest records are dropped beyond this many. `None` keeps everything.
    max_records: Option<usize>,
}

impl ExecutionHistory {
    pub fn new(max_records: Option<usize>) -> Self {
        Self {
            records: VecDeque::new(),
            max_records,
        }
    }

    pub fn push(&mut self, record: ExecutionRecord) {
        self.records.push_front(record);
        if let Some(max) = self.max_records {
            self.records.truncate(max);
        }
    }

    pub fn max_records(&self) -> Option<usize> {
        self.max_records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExecutionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn latest(&self) -> Option<&ExecutionRecord> {
        self.records.front()
    }

    /// Zero-based, newest first.
    pub fn nth(&self, index: usize) -> Option<&ExecutionRecord> {
        self.records.get(index)
    }

    pub fn get(&self, id: Uuid) -> Option<&ExecutionRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Looks a record up by its 1-based position in the list or by a prefix
    /// of its id.
    pub fn resolve(&self, selector: &str) -> Option<&ExecutionRecord> {
        let selector = selector.trim();
        if selector.is_empty() {
            return None;
        }
        if let Ok(position) = selector.parse::<usize>() {
            return position.checked_sub(1).and_then(|i| self.nth(i));
        }
        let needle = selector.to_ascii_lowercase();
        self.records
            .iter()
            .find(|r| r.id.to_string().starts_with(&needle))
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::execution::{ExecutionRequest, ExecutionStatus};
    use finconsole_form::HttpMethod;
    use serde_json::json;

    fn record(n: u64) -> ExecutionRecord {
        let request = ExecutionRequest {
            endpoint: "/data/query".to_string(),
            method: HttpMethod::Get,
            payload: json!({ "n": n }),
            environment: Environment::Dev,
        };
        ExecutionRecord::new(request, ExecutionStatus::Success, json!({}), n)
    }

    #[test]
    fn test_newest_first() {
        let mut history = ExecutionHistory::default();
        history.push(record(1));
        history.push(record(2));
        history.push(record(3));

        let order: Vec<u64> = history.iter().map(|r| r.latency_ms).collect();
        assert_eq!(order, vec![3, 2, 1]);
        assert_eq!(history.latest().map(|r| r.latency_ms), Some(3));
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut history = ExecutionHistory::new(Some(2));
        for n in 1..=4 {
            history.push(record(n));
        }
        let order: Vec<u64> = history.iter().map(|r| r.latency_ms).collect();
        assert_eq!(order, vec![4, 3]);
        assert_eq!(history.max_records(), Some(2));
        assert_eq!(ExecutionHistory::default().max_records(), None);
    }

    #[test]
    fn test_resolve_by_position_and_prefix() {
        let mut history = ExecutionHistory::default();
        history.push(record(1));
        history.push(record(2));

        assert_eq!(history.resolve("1").map(|r| r.latency_ms), Some(2));
        assert_eq!(history.resolve("2").map(|r| r.latency_ms), Some(1));
        assert!(history.resolve("0").is_none());
        assert!(history.resolve("3").is_none());
        assert!(history.resolve("").is_none());

        let target = history.nth(1).unwrap().clone();
        let prefix = &target.id.to_string()[..8];
        assert_eq!(history.resolve(prefix).map(|r| r.id), Some(target.id));
        assert_eq!(history.get(target.id), Some(&target));
    }
}
