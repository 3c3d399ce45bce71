use serde::{Deserialize, Serialize};

/// Outcome of one test
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    Pass,
    Fail,
}

impl TestStatus {
    pub fn from_passed(passed: bool) -> Self {
        if passed {
            TestStatus::Pass
        } else {
            TestStatus::Fail
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, TestStatus::Pass)
    }
}

/// One recorded test outcome. Immutable once appended to the reporter log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub stage: String,
    pub name: String,
    pub status: TestStatus,
    /// Elapsed seconds between start and end of the test
    pub duration: f64,
    pub message: String,
}

/// Per-stage aggregate, derived from the result log at summarize time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StageSummary {
    pub stage: String,
    pub passed: u32,
    pub failed: u32,
    pub total: u32,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run_id: String,
    /// Stages in order of first appearance
    pub stages: Vec<StageSummary>,
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    /// `passed / total`, 0 when nothing ran
    pub success_rate: f64,
    pub duration_secs: f64,
    pub started_at: String,
    pub finished_at: String,
}

impl RunSummary {
    pub fn success_percent(&self) -> f64 {
        self.success_rate * 100.0
    }

    pub fn stage(&self, name: &str) -> Option<&StageSummary> {
        self.stages.iter().find(|s| s.stage == name)
    }
}

/// `passed / (passed + failed)`, or 0 for an empty set
pub fn success_rate(passed: u32, failed: u32) -> f64 {
    let total = passed + failed;
    if total == 0 {
        0.0
    } else {
        passed as f64 / total as f64
    }
}

/// Fold results into stage summaries, keeping first-appearance order.
/// Non-contiguous runs of the same stage name aggregate together.
pub fn stage_summaries(results: &[TestResult]) -> Vec<StageSummary> {
    let mut stages: Vec<StageSummary> = Vec::new();

    for result in results {
        let idx = match stages.iter().position(|s| s.stage == result.stage) {
            Some(idx) => idx,
            None => {
                stages.push(StageSummary {
                    stage: result.stage.clone(),
                    passed: 0,
                    failed: 0,
                    total: 0,
                    success_rate: 0.0,
                });
                stages.len() - 1
            }
        };

        let stage = &mut stages[idx];
        match result.status {
            TestStatus::Pass => stage.passed += 1,
            TestStatus::Fail => stage.failed += 1,
        }
    }

    for stage in &mut stages {
        stage.total = stage.passed + stage.failed;
        stage.success_rate = success_rate(stage.passed, stage.failed);
    }
    stages
}
