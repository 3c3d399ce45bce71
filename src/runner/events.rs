use super::metrics::EndpointStats;
use super::state::{RunSummary, TestResult};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::time::Duration;
use tokio::sync::broadcast;

/// Test execution events for real-time updates
#[derive(Debug, Clone)]
pub enum TestEvent {
    // Run events
    RunStarted {
        run_id: String,
        base_url: String,
    },
    RunFinished {
        summary: RunSummary,
    },

    StageStarted {
        stage: String,
    },

    // Test events
    TestStarted {
        stage: String,
        name: String,
    },
    TestFinished {
        result: TestResult,
    },

    MetricsReady {
        metrics: BTreeMap<String, EndpointStats>,
    },

    // Log event for coordinated output
    Log {
        message: String,
    },
}

/// Event emitter for broadcasting test events
pub struct EventEmitter {
    sender: broadcast::Sender<TestEvent>,
}

impl EventEmitter {
    pub fn new() -> (Self, broadcast::Receiver<TestEvent>) {
        let (sender, receiver) = broadcast::channel(256);
        (Self { sender }, receiver)
    }

    pub fn emit(&self, event: TestEvent) {
        // No subscribers is fine (library use, tests)
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TestEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }
}

/// Console event listener for printing real-time updates
pub struct ConsoleEventListener;

impl ConsoleEventListener {
    /// Print events until every emitter is dropped
    pub async fn listen(mut receiver: broadcast::Receiver<TestEvent>) {
        let interactive = std::io::stdout().is_terminal();
        let mut spinner: Option<ProgressBar> = None;

        loop {
            let event = match receiver.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("Console output skipped {} events", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };

            match event {
                TestEvent::RunStarted { run_id, base_url } => {
                    println!("{}", "=".repeat(80).cyan());
                    println!("{}", "Lost & Found API Tests".cyan().bold());
                    println!("{}", "=".repeat(80).cyan());
                    println!(
                        "Started: {}",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
                    );
                    println!("Run: {}", run_id.dimmed());
                    println!("Running tests against API at: {}", base_url.cyan());
                }

                TestEvent::StageStarted { stage } => {
                    println!("\n{}", format!("Stage: {}", stage).cyan().bold());
                    println!("{}\n", "=".repeat(80).cyan());
                }

                TestEvent::TestStarted { name, .. } => {
                    let pb = if interactive {
                        ProgressBar::new_spinner()
                    } else {
                        // Piped output: avoid terminal escape codes
                        ProgressBar::hidden()
                    };
                    if let Ok(style) = ProgressStyle::default_spinner()
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                        .template("{spinner} {msg}")
                    {
                        pb.set_style(style);
                    }
                    pb.set_message(format!("Running: {}", name).yellow().to_string());
                    pb.enable_steady_tick(Duration::from_millis(100));
                    spinner = Some(pb);
                }

                TestEvent::TestFinished { result } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }

                    let status = if result.status.is_pass() {
                        "✓ PASS".green()
                    } else {
                        "✗ FAIL".red()
                    };
                    println!("{} | {} [{:.3}s]", status, result.name, result.duration);
                    if !result.message.is_empty() {
                        println!("    {}", format!("▹ {}", result.message).blue());
                    }
                }

                TestEvent::MetricsReady { metrics } => {
                    print!("{}", crate::report::console::render_metrics(&metrics));
                }

                TestEvent::RunFinished { summary } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }
                    print!("{}", crate::report::console::render_summary(&summary));
                }

                TestEvent::Log { message } => {
                    match &spinner {
                        Some(pb) => pb.println(format!("      {}", message)),
                        None => println!("{}", message),
                    }
                }
            }
        }
    }
}
