use super::events::{EventEmitter, TestEvent};
use super::state::{stage_summaries, success_rate, RunSummary, TestResult, TestStatus};
use chrono::{DateTime, Local};
use std::time::Instant;

/// Label for results recorded before any stage was set
pub const NO_STAGE: &str = "(no stage)";

/// Test and stage bookkeeping for one run.
///
/// Results are appended in chronological order and tagged with the stage
/// that is current when the test *ends*; callers must not switch stages
/// between `start_test` and `end_test`.
pub struct TestReporter {
    run_id: String,
    current_stage: Option<String>,
    results: Vec<TestResult>,
    tests_passed: u32,
    tests_failed: u32,
    started_at: Instant,
    started_wall: DateTime<Local>,
    emitter: EventEmitter,
}

impl TestReporter {
    pub fn new(run_id: &str) -> Self {
        Self::with_emitter(run_id, EventEmitter::default())
    }

    pub fn with_emitter(run_id: &str, emitter: EventEmitter) -> Self {
        Self {
            run_id: run_id.to_string(),
            current_stage: None,
            results: Vec::new(),
            tests_passed: 0,
            tests_failed: 0,
            started_at: Instant::now(),
            started_wall: Local::now(),
            emitter,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Switch the stage label. Counts are never reset.
    pub fn set_stage(&mut self, name: &str) {
        self.current_stage = Some(name.to_string());
        self.emitter.emit(TestEvent::StageStarted {
            stage: name.to_string(),
        });
    }

    pub fn current_stage(&self) -> &str {
        self.current_stage.as_deref().unwrap_or(NO_STAGE)
    }

    /// Mark the start of a test. Nothing is recorded until `end_test`.
    pub fn start_test(&self, name: &str) -> Instant {
        self.emitter.emit(TestEvent::TestStarted {
            stage: self.current_stage().to_string(),
            name: name.to_string(),
        });
        Instant::now()
    }

    pub fn end_test(&mut self, name: &str, start: Instant, passed: bool, message: impl Into<String>) {
        let duration = start.elapsed().as_secs_f64();

        if passed {
            self.tests_passed += 1;
        } else {
            self.tests_failed += 1;
        }

        let result = TestResult {
            stage: self.current_stage().to_string(),
            name: name.to_string(),
            status: TestStatus::from_passed(passed),
            duration,
            message: message.into(),
        };
        self.emitter.emit(TestEvent::TestFinished {
            result: result.clone(),
        });
        self.results.push(result);
    }

    pub fn tests_passed(&self) -> u32 {
        self.tests_passed
    }

    pub fn tests_failed(&self) -> u32 {
        self.tests_failed
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<TestResult> {
        self.results
    }

    pub fn emit(&self, event: TestEvent) {
        self.emitter.emit(event);
    }

    pub fn log(&self, message: impl Into<String>) {
        self.emitter.emit(TestEvent::Log {
            message: message.into(),
        });
    }

    /// Aggregate the result log. Safe on an empty log (rate 0).
    pub fn summarize(&self) -> RunSummary {
        RunSummary {
            run_id: self.run_id.clone(),
            stages: stage_summaries(&self.results),
            total: self.tests_passed + self.tests_failed,
            passed: self.tests_passed,
            failed: self.tests_failed,
            success_rate: success_rate(self.tests_passed, self.tests_failed),
            duration_secs: self.started_at.elapsed().as_secs_f64(),
            started_at: self.started_wall.format("%Y-%m-%d %H:%M:%S").to_string(),
            finished_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}
