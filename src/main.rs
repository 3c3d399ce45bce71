use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

use lostfound_tester::{report, runner};

#[derive(Parser)]
#[command(name = "lostfound-tester")]
#[command(version = "0.1.0")]
#[command(about = "Integration test harness for the Lost & Found API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every stage against a live API and database
    Run {
        /// Harness configuration (JSON or YAML)
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,

        /// Test payloads (JSON or YAML)
        #[arg(short, long, default_value = "test_data.json")]
        data: PathBuf,

        /// Output directory for reports
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Write results.json and junit.xml to the output directory
        #[arg(long, default_value = "false")]
        report: bool,

        /// Minimum success rate (percent) for a zero exit code
        #[arg(long, default_value = "100")]
        threshold: f64,
    },

    /// Generate report from saved test results
    Report {
        /// Path to results.json
        results: PathBuf,

        /// Output format (json, junit, console)
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Run met the threshold
const EXIT_PASSED: u8 = 0;
/// Run completed below the threshold
const EXIT_FAILED: u8 = 1;
/// Config, data or setup error; no stage ran. Report-write failures after
/// a finished run are logged and do not change the exit code.
const EXIT_FATAL: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            data,
            output,
            report,
            threshold,
        } => {
            println!("{} Running API tests", "▶".green().bold());
            println!("  Config: {}", config.display().to_string().cyan());
            println!("  Data: {}", data.display().to_string().cyan());
            if report {
                println!("  Reports: {}", output.display().to_string().cyan());
            }
            println!("  Threshold: {}", format!("{}%", threshold).yellow());

            let options = runner::RunOptions {
                config_path: config,
                data_path: data,
                report_dir: report.then_some(output),
            };

            match runner::run_tests(&options).await {
                Ok(results) => {
                    if let Some(reason) = &results.aborted {
                        eprintln!("{} Run aborted: {}", "✗".red().bold(), reason);
                    }
                    if results.meets_threshold(threshold) {
                        ExitCode::from(EXIT_PASSED)
                    } else {
                        ExitCode::from(EXIT_FAILED)
                    }
                }
                Err(e) => {
                    eprintln!("{} {}", "✗".red().bold(), e);
                    ExitCode::from(EXIT_FATAL)
                }
            }
        }

        Commands::Report {
            results,
            format,
            output,
        } => {
            println!(
                "{} Generating {} report from: {}",
                "📊".to_string().blue(),
                format.cyan(),
                results.display()
            );
            match report::generate_report(&results, &format, output.as_deref()) {
                Ok(()) => ExitCode::from(EXIT_PASSED),
                Err(e) => {
                    eprintln!("{} {:#}", "✗".red().bold(), e);
                    ExitCode::from(EXIT_FATAL)
                }
            }
        }
    }
}
