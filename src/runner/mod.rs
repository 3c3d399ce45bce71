pub mod assertions;
pub mod context;
pub mod events;
pub mod metrics;
pub mod reporter;
pub mod stages;
pub mod state;

use crate::client::{ApiClient, ApiRequest, Endpoint, HttpApiClient, Method};
use crate::db::{Database, PgDatabase};
use crate::error::{HarnessError, Result, TransportError};
use crate::report::types::TestResults;
use crate::utils::{Config, TestData};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub use events::*;
pub use state::*;

use reporter::TestReporter;
use stages::WorkflowDriver;

/// Inputs of a full run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config_path: PathBuf,
    pub data_path: PathBuf,
    /// Write `results.json` and `junit.xml` here when set
    pub report_dir: Option<PathBuf>,
}

/// Load config and data, connect to the live API and database, run every
/// stage and print progress to the console.
pub async fn run_tests(options: &RunOptions) -> Result<TestResults> {
    let config = Config::load(&options.config_path)?;
    let data = TestData::load(&options.data_path)?;

    let client = HttpApiClient::new(&config.base_url, config.request_timeout_ms)
        .map_err(|e| HarnessError::Setup(e.to_string()))?;
    let db = PgDatabase::connect(&config.db_config, &config.reset_tables).await?;

    let run_id = Uuid::new_v4().to_string();
    let (emitter, receiver) = EventEmitter::new();
    let listener = tokio::spawn(ConsoleEventListener::listen(receiver));
    let reporter = TestReporter::with_emitter(&run_id, emitter);

    let outcome = run_suite(&client, &db, &config, &data, reporter).await;

    // The reporter (and its emitter) is gone once run_suite returns
    if let Err(e) = listener.await {
        log::warn!("Console listener stopped abnormally: {}", e);
    }

    let results = outcome?;
    if let Some(dir) = &options.report_dir {
        save_reports(&results, dir);
    }
    Ok(results)
}

/// Write report files for a finished run. A failure is logged only: the
/// run's results and exit status stand regardless.
fn save_reports(results: &TestResults, dir: &Path) -> bool {
    match crate::report::write_reports(results, dir) {
        Ok(()) => true,
        Err(e) => {
            log::error!("Could not write reports to {}: {}", dir.display(), e);
            false
        }
    }
}

/// Run controller: reset, stages, metrics and summary, teardown.
///
/// Teardown (reset then close) runs on every path once the database is
/// connected, including setup failures and panics inside a stage.
pub async fn run_suite(
    client: &dyn ApiClient,
    db: &dyn Database,
    config: &Config,
    data: &TestData,
    reporter: TestReporter,
) -> Result<TestResults> {
    reporter.emit(TestEvent::RunStarted {
        run_id: reporter.run_id().to_string(),
        base_url: config.base_url.clone(),
    });

    if let Err(e) = setup(client, db, config, &reporter).await {
        log::error!("{}", e);
        teardown(db, &reporter).await;
        return Err(e);
    }

    let mut driver = WorkflowDriver::new(client, db, config, data, reporter);
    let aborted = match AssertUnwindSafe(driver.run_all()).catch_unwind().await {
        Ok(()) => None,
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            log::error!("Run aborted inside stage '{}': {}", driver.reporter.current_stage(), message);
            Some(message)
        }
    };

    let metrics = driver.metrics.summary();
    driver.reporter.emit(TestEvent::MetricsReady {
        metrics: metrics.clone(),
    });
    let summary = driver.reporter.summarize();
    driver.reporter.emit(TestEvent::RunFinished {
        summary: summary.clone(),
    });

    teardown(db, &driver.reporter).await;

    let entities = driver.ctx.entities();
    Ok(TestResults {
        run_id: summary.run_id.clone(),
        summary,
        results: driver.reporter.into_results(),
        metrics,
        entities,
        aborted,
        generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    })
}

async fn setup(
    client: &dyn ApiClient,
    db: &dyn Database,
    config: &Config,
    reporter: &TestReporter,
) -> Result<()> {
    probe_api(client, config).await?;
    reporter.log("Cleaning database...");
    db.reset()
        .await
        .map_err(|e| HarnessError::Setup(format!("initial database reset failed: {}", e)))?;
    reporter.log("✓ Database cleaned");
    Ok(())
}

/// Any HTTP answer proves the API is up; only transport failures are fatal
async fn probe_api(client: &dyn ApiClient, config: &Config) -> Result<()> {
    let probe = ApiRequest::new(Method::Get, Endpoint::Items);
    let timeout = std::time::Duration::from_millis(config.request_timeout_ms);

    let outcome = match tokio::time::timeout(timeout, client.send(probe)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(TransportError::Timeout(config.request_timeout_ms)),
    };

    match outcome {
        Ok(response) => {
            log::info!("API reachable at {} (status {})", config.base_url, response.status);
            Ok(())
        }
        Err(e) => Err(HarnessError::Setup(format!(
            "API at {} is unreachable: {}",
            config.base_url, e
        ))),
    }
}

/// Best effort: failures are logged, never returned
async fn teardown(db: &dyn Database, reporter: &TestReporter) {
    reporter.log("Cleaning up...");
    if let Err(e) = db.reset().await {
        log::error!("Teardown reset failed: {}", e);
    }
    db.close().await;
    reporter.log("✓ Cleanup complete");
}

pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Re-render a saved `results.json`
pub fn load_results(path: &Path) -> Result<TestResults> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_config, sample_data, MockApi};

    async fn run_once(api: &MockApi) -> Result<TestResults> {
        let config = sample_config();
        let data = sample_data();
        run_suite(api, api, &config, &data, TestReporter::new("run")).await
    }

    #[tokio::test]
    async fn test_full_run_passes_against_contract() {
        let api = MockApi::new();
        let results = run_once(&api).await.unwrap();

        assert!(results.aborted.is_none());
        assert_eq!(results.summary.failed, 0, "{:#?}", results.results);
        assert_eq!(results.summary.total as usize, results.results.len());
        assert_eq!(results.summary.success_rate, 1.0);

        let stage_names: Vec<&str> = results.summary.stages.iter().map(|s| s.stage.as_str()).collect();
        assert_eq!(
            stage_names,
            [
                stages::STAGE_AUTH,
                stages::STAGE_LOST_ITEMS,
                stages::STAGE_FOUND_ITEMS,
                stages::STAGE_ADMIN,
                stages::STAGE_SEARCH
            ]
        );
        assert_eq!(results.summary.stage(stages::STAGE_AUTH).map(|s| s.total), Some(5));

        // ID-bearing endpoints aggregate under one templated key
        assert!(results.metrics.contains_key("PATCH /lost-items/{id}"));
        assert!(!results.metrics.keys().any(|k| k.chars().any(|c| c.is_ascii_digit())));

        assert_eq!(api.reset_count(), 2);
        assert!(api.is_closed());
    }

    #[tokio::test]
    async fn test_repeated_runs_are_identical() {
        let api = MockApi::new();
        let first = run_once(&api).await.unwrap();
        let second = run_once(&api).await.unwrap();

        assert_eq!(first.results.len(), second.results.len());
        assert_eq!(first.summary.passed, second.summary.passed);
        assert_eq!(first.entities, second.entities);
        assert_eq!(first.entities.lost_items, vec![Some(1), Some(2), Some(3)]);
        let names = |r: &TestResults| r.results.iter().map(|t| t.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&first), names(&second));
    }

    #[tokio::test]
    async fn test_unreachable_api_is_fatal_but_tears_down() {
        let api = MockApi::new();
        api.go_offline();

        let err = run_once(&api).await.unwrap_err();
        assert!(matches!(err, HarnessError::Setup(_)));
        assert_eq!(api.reset_count(), 1);
        assert!(api.is_closed());
    }

    #[tokio::test]
    async fn test_failed_initial_reset_is_fatal() {
        let api = MockApi::new();
        api.fail_resets();

        let err = run_once(&api).await.unwrap_err();
        assert!(err.to_string().contains("initial database reset failed"));
        assert!(api.is_closed());
    }

    #[tokio::test]
    async fn test_panicking_call_is_recorded_and_stage_continues() {
        let api = MockApi::new();
        api.panic_on_search();

        let results = run_once(&api).await.unwrap();
        assert!(results.aborted.is_none());

        let search: Vec<_> = results
            .results
            .iter()
            .filter(|r| r.stage == stages::STAGE_SEARCH)
            .collect();
        let names: Vec<&str> = search.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Search Items", "Get All Items", "Get Items Statistics"]);
        assert!(!search[0].status.is_pass());
        assert!(search[0].message.contains("search endpoint exploded"));
        assert!(search[1].status.is_pass() && search[2].status.is_pass());

        assert_eq!(results.summary.failed, 1);
        assert_eq!(results.summary.total as usize, results.results.len());
        assert_eq!(api.reset_count(), 2);
        assert!(api.is_closed());
    }

    #[tokio::test]
    async fn test_report_write_failure_keeps_results() {
        let api = MockApi::new();
        let results = run_once(&api).await.unwrap();

        // A regular file where the report directory should go
        let blocker = std::env::temp_dir().join(format!("lostfound-blocker-{}", Uuid::new_v4()));
        std::fs::write(&blocker, "x").unwrap();

        assert!(!save_reports(&results, &blocker.join("reports")));
        assert!(results.meets_threshold(100.0));

        let _ = std::fs::remove_file(&blocker);
    }

    #[tokio::test]
    async fn test_teardown_failure_does_not_mask_results() {
        let api = MockApi::new();
        api.fail_resets_after(1);

        let results = run_once(&api).await.unwrap();
        assert!(results.aborted.is_none());
        assert_eq!(results.summary.failed, 0, "{:#?}", results.results);
        assert!(results.summary.passed > 0);
        assert_eq!(api.reset_count(), 1);
        assert!(api.is_closed());
    }

    #[tokio::test]
    async fn test_broken_api_records_failures_without_aborting() {
        let api = MockApi::new();
        api.fail_status(500);

        let results = run_once(&api).await.unwrap();
        assert!(results.aborted.is_none());
        assert_eq!(results.summary.passed, 0, "{:#?}", results.results);
        assert_eq!(results.summary.total as usize, results.results.len());
        assert_eq!(results.summary.success_rate, 0.0);
        assert_eq!(results.summary.stages.len(), 5);
    }
}
