//! Stage functions: ordered groups of dependent API calls.
//!
//! Every test follows the same contract: issue the call, evaluate the
//! response, record exactly one result, continue regardless of outcome.

pub mod admin;
pub mod auth;
pub mod items;
pub mod search;

use super::assertions::{assert_status, Verdict};
use super::context::RunContext;
use super::metrics::MetricsCollector;
use super::reporter::TestReporter;
use crate::client::{ApiClient, ApiRequest, ApiResponse};
use crate::db::Database;
use crate::error::TransportError;
use crate::runner::panic_message;
use crate::utils::{Config, TestData};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

pub const STAGE_AUTH: &str = "Authentication";
pub const STAGE_LOST_ITEMS: &str = "Lost Items";
pub const STAGE_FOUND_ITEMS: &str = "Found Items";
pub const STAGE_ADMIN: &str = "Admin Operations";
pub const STAGE_SEARCH: &str = "Search & Statistics";

/// Drives the stages of one run against an API and database
pub struct WorkflowDriver<'a> {
    client: &'a dyn ApiClient,
    db: &'a dyn Database,
    config: &'a Config,
    data: &'a TestData,
    timeout: Duration,
    pub ctx: RunContext,
    pub reporter: TestReporter,
    pub metrics: MetricsCollector,
}

impl<'a> WorkflowDriver<'a> {
    pub fn new(
        client: &'a dyn ApiClient,
        db: &'a dyn Database,
        config: &'a Config,
        data: &'a TestData,
        reporter: TestReporter,
    ) -> Self {
        Self {
            client,
            db,
            config,
            data,
            timeout: Duration::from_millis(config.request_timeout_ms),
            ctx: RunContext::new(),
            reporter,
            metrics: MetricsCollector::new(),
        }
    }

    /// Run every stage in the fixed order
    pub async fn run_all(&mut self) {
        auth::run(self).await;
        items::run_lost(self).await;
        items::run_found(self).await;
        admin::run(self).await;
        search::run(self).await;
    }

    /// Issue one call, bounded by the per-call timeout. A panic inside the
    /// client fails this call only. The latency sample is recorded whatever
    /// the outcome.
    async fn call(&mut self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let key = request.key();
        let started = Instant::now();

        let send = AssertUnwindSafe(self.client.send(request)).catch_unwind();
        let outcome = match tokio::time::timeout(self.timeout, send).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(panic)) => Err(TransportError::Other(format!(
                "panic: {}",
                panic_message(panic.as_ref())
            ))),
            Err(_) => Err(TransportError::Timeout(self.timeout.as_millis() as u64)),
        };

        self.metrics.record(key, started.elapsed());
        if let Err(e) = &outcome {
            log::warn!("{}", e);
        }
        outcome
    }

    /// Run one API test. Returns the response only if `evaluate` passed.
    async fn run_test<F>(&mut self, name: &str, request: ApiRequest, evaluate: F) -> Option<ApiResponse>
    where
        F: FnOnce(&ApiResponse) -> Verdict,
    {
        let start = self.reporter.start_test(name);

        match self.call(request).await {
            Ok(response) => {
                let verdict = evaluate(&response);
                self.reporter
                    .end_test(name, start, verdict.passed, verdict.message);
                verdict.passed.then_some(response)
            }
            Err(e) => {
                self.reporter.end_test(name, start, false, e.to_string());
                None
            }
        }
    }

    /// Shorthand for the common status-only test
    async fn expect_status(&mut self, name: &str, request: ApiRequest, expected: u16) -> Option<ApiResponse> {
        self.run_test(name, request, |r| assert_status(r, expected))
            .await
    }

    /// Record a failed result for a test whose prerequisite is missing
    fn fail_unrunnable(&mut self, name: &str, reason: &str) {
        let start = self.reporter.start_test(name);
        self.reporter.end_test(name, start, false, reason);
    }
}
