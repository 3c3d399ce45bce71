use crate::runner::context::CreatedEntities;
use crate::runner::metrics::EndpointStats;
use crate::runner::state::{RunSummary, TestResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything a finished run produced, as written to `results.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResults {
    pub run_id: String,
    pub summary: RunSummary,
    pub results: Vec<TestResult>,
    /// Latency per templated endpoint key
    pub metrics: BTreeMap<String, EndpointStats>,
    pub entities: CreatedEntities,
    /// Panic message if the run stopped inside a stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aborted: Option<String>,
    pub generated_at: String,
}

impl TestResults {
    /// Exit-code policy: overall success rate against a percentage threshold
    pub fn meets_threshold(&self, threshold_percent: f64) -> bool {
        self.aborted.is_none() && self.summary.success_percent() >= threshold_percent
    }
}
