use serde::{Deserialize, Serialize};

use super::Reply;
use crate::error::Result;
use crate::report::ActionLog;

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SetTestNameParams {
    #[schemars(description = "The name of the test being run")]
    pub name: String,
}

pub async fn set_test_name(log: &ActionLog, params: &SetTestNameParams) -> Result<Reply> {
    log.set_test_name(&params.name).await;
    Ok(Reply::ok(format!("Test name set to: {}", params.name)))
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CompleteTestParams {
    #[schemars(description = "Whether the test passed (default: true)")]
    pub success: Option<bool>,
}

pub async fn complete_test(log: &ActionLog, params: &CompleteTestParams) -> Result<Reply> {
    let info = log.complete(params.success.unwrap_or(true)).await;
    Ok(Reply::ok(format!("Test '{}' marked as finished", info.name)).with("test", info))
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetTestReportParams {
    #[schemars(description = "Only include the most recent N actions (default: all)")]
    pub limit: Option<u32>,
}

pub async fn get_test_report(log: &ActionLog, params: &GetTestReportParams) -> Result<Reply> {
    let report = log.report(params.limit.map(|l| l as usize)).await;
    Ok(Reply::empty()
        .with("test", &report.test)
        .with("total_actions", report.total_actions)
        .with("actions", &report.actions))
}
