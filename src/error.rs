use thiserror::Error;

/// Fatal errors that stop a run before (or instead of) executing stages.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Test data error: {0}")]
    TestData(String),

    #[error("Setup failed: {0}")]
    Setup(String),

    #[error("Report error: {0}")]
    Report(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Per-call transport failures. These never abort a run; the workflow driver
/// turns them into failed test results.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Timeout: no response within {0}ms")]
    Timeout(u64),

    #[error("Transport error: connection failed: {0}")]
    Connect(String),

    #[error("Transport error: malformed response: {0}")]
    Decode(String),

    #[error("Transport error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, HarnessError>;
