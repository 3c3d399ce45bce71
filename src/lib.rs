pub mod client;
pub mod db;
pub mod error;
pub mod report;
pub mod runner;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

// Re-export common items
pub use error::{HarnessError, TransportError};
pub use report::generate_report;
pub use runner::{run_tests, RunOptions};
