use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Oldest records are dropped past this length.
pub const MAX_RECORDS: usize = 1000;

/// One tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub action_type: String,
    pub details: serde_json::Value,
    pub success: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    Running,
    #[serde(rename = "Completed Successfully")]
    CompletedSuccessfully,
    #[serde(rename = "Completed with Errors")]
    CompletedWithErrors,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestInfo {
    pub name: String,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: TestStatus,
    pub success_count: u64,
    pub error_count: u64,
}

impl Default for TestInfo {
    fn default() -> Self {
        Self {
            name: "Unnamed Test".to_string(),
            started_at: None,
            finished_at: None,
            status: TestStatus::NotStarted,
            success_count: 0,
            error_count: 0,
        }
    }
}

#[derive(Debug, Default)]
struct LogState {
    info: TestInfo,
    records: VecDeque<ActionRecord>,
}

/// Shared record of what the session has done.
#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    state: Arc<Mutex<LogState>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestReport {
    pub test: TestInfo,
    pub total_actions: usize,
    pub actions: Vec<ActionRecord>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, action_type: &str, details: serde_json::Value, success: bool) {
        let mut state = self.state.lock().await;
        let now = Utc::now();

        if state.info.started_at.is_none() {
            state.info.started_at = Some(now);
            state.info.status = TestStatus::Running;
        }
        if success {
            state.info.success_count += 1;
        } else {
            state.info.error_count += 1;
        }

        if state.records.len() >= MAX_RECORDS {
            state.records.pop_front();
        }
        state.records.push_back(ActionRecord {
            timestamp: now,
            action_type: action_type.to_string(),
            details,
            success,
        });
    }

    pub async fn set_test_name(&self, name: &str) {
        self.state.lock().await.info.name = name.to_string();
    }

    /// Mark the test finished.
    pub async fn complete(&self, success: bool) -> TestInfo {
        let mut state = self.state.lock().await;
        state.info.finished_at = Some(Utc::now());
        state.info.status = if success {
            TestStatus::CompletedSuccessfully
        } else {
            TestStatus::CompletedWithErrors
        };
        state.info.clone()
    }

    /// Test info plus the last `limit` records.
    pub async fn report(&self, limit: Option<usize>) -> TestReport {
        let state = self.state.lock().await;
        let total = state.records.len();
        let skip = limit.map_or(0, |limit| total.saturating_sub(limit));
        TestReport {
            test: state.info.clone(),
            total_actions: total,
            actions: state.records.iter().skip(skip).cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_first_action_starts_the_test() {
        let log = ActionLog::new();
        log.record("test_action", json!({ "test": "data" }), true).await;

        let report = log.report(None).await;
        assert!(report.test.started_at.is_some());
        assert_eq!(report.test.status, TestStatus::Running);
        assert_eq!(report.test.success_count, 1);
        assert_eq!(report.test.error_count, 0);
        assert_eq!(report.actions.len(), 1);
        assert_eq!(report.actions[0].action_type, "test_action");
        assert_eq!(report.actions[0].details, json!({ "test": "data" }));
    }

    #[tokio::test]
    async fn test_failures_are_counted_separately() {
        let log = ActionLog::new();
        log.record("tap_element", json!({}), true).await;
        log.record("tap_element", json!({}), false).await;
        log.record("pinch", json!({}), false).await;

        let report = log.report(None).await;
        assert_eq!(report.test.success_count, 1);
        assert_eq!(report.test.error_count, 2);
        assert!(!report.actions[2].success);
    }

    #[tokio::test]
    async fn test_complete_sets_status() {
        let log = ActionLog::new();
        log.record("go_back", json!({}), true).await;

        let info = log.complete(true).await;
        assert!(info.finished_at.is_some());
        assert_eq!(info.status, TestStatus::CompletedSuccessfully);

        let info = log.complete(false).await;
        assert_eq!(info.status, TestStatus::CompletedWithErrors);
        assert_eq!(
            serde_json::to_value(info.status).unwrap(),
            json!("Completed with Errors")
        );
    }

    #[tokio::test]
    async fn test_log_is_capped() {
        let log = ActionLog::new();
        for i in 0..MAX_RECORDS + 5 {
            log.record("swipe", json!({ "i": i }), true).await;
        }

        let report = log.report(None).await;
        assert_eq!(report.total_actions, MAX_RECORDS);
        assert_eq!(report.actions[0].details, json!({ "i": 5 }));
        assert_eq!(report.test.success_count, (MAX_RECORDS + 5) as u64);
    }

    #[tokio::test]
    async fn test_report_limit_returns_most_recent() {
        let log = ActionLog::new();
        log.set_test_name("Login flow").await;
        for i in 0..10 {
            log.record("tap_element", json!({ "i": i }), true).await;
        }

        let report = log.report(Some(3)).await;
        assert_eq!(report.test.name, "Login flow");
        assert_eq!(report.total_actions, 10);
        assert_eq!(report.actions.len(), 3);
        assert_eq!(report.actions[0].details, json!({ "i": 7 }));
    }
}
