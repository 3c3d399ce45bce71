use crate::error::{HarnessError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Harness configuration, loaded from `config.json` (or YAML)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API root, e.g. `http://localhost:8080/api/v1`
    pub base_url: String,

    pub users: Users,

    pub db_config: DbConfig,

    /// Upper bound for a single API call (ms)
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Tables truncated (with identity restart) before and after a run
    #[serde(default = "default_reset_tables")]
    pub reset_tables: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Users {
    pub admin: UserFixture,
    pub regular: UserFixture,
}

/// Account used by the run. Extra fields (names, phone, ...) are passed
/// through to signup untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserFixture {
    pub email: String,
    pub password: String,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl UserFixture {
    pub fn signup_payload(&self) -> Value {
        let mut body = self.profile.clone();
        body.insert("email".into(), Value::String(self.email.clone()));
        body.insert("password".into(), Value::String(self.password.clone()));
        Value::Object(body)
    }

    pub fn credentials(&self) -> Value {
        serde_json::json!({
            "email": self.email,
            "password": self.password,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub host: String,
    #[serde(deserialize_with = "port_from_any")]
    pub port: u16,
    pub db_name: String,
    pub user: String,
    pub password: String,
}

impl DbConfig {
    pub fn connect_options(&self) -> sqlx::postgres::PgConnectOptions {
        sqlx::postgres::PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.db_name)
            .username(&self.user)
            .password(&self.password)
    }
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_login_path() -> String {
    "/auth/login".to_string()
}

fn default_reset_tables() -> Vec<String> {
    vec![
        "lost_items".to_string(),
        "found_items".to_string(),
        "users".to_string(),
    ]
}

/// Ports show up both as numbers and as strings in existing config files
fn port_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u16, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Num(u16),
        Str(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Num(p) => Ok(p),
        Port::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid port '{}'", s))),
    }
}

impl Config {
    /// Load, apply environment overrides and validate
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let mut config = Self::parse(&content, is_yaml(path))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn parse(content: &str, yaml: bool) -> Result<Self> {
        let parsed = if yaml {
            serde_yaml::from_str(content).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(content).map_err(|e| e.to_string())
        };
        parsed.map_err(HarnessError::Config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("LNF_BASE_URL") {
            self.base_url = url;
        }
        if let Ok(password) = std::env::var("LNF_DB_PASSWORD") {
            self.db_config.password = password;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(HarnessError::Config("base_url is empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(HarnessError::Config(format!(
                "base_url must start with http:// or https://, got '{}'",
                url
            )));
        }

        for (role, user) in [("admin", &self.users.admin), ("regular", &self.users.regular)] {
            if user.email.trim().is_empty() {
                return Err(HarnessError::Config(format!("users.{}.email is empty", role)));
            }
            if user.password.is_empty() {
                return Err(HarnessError::Config(format!(
                    "users.{}.password is empty",
                    role
                )));
            }
        }
        if self.users.admin.email.eq_ignore_ascii_case(&self.users.regular.email) {
            return Err(HarnessError::Config(
                "users.admin and users.regular must use different emails".into(),
            ));
        }

        if !self.login_path.starts_with('/') {
            return Err(HarnessError::Config("login_path must start with '/'".into()));
        }
        if self.request_timeout_ms == 0 {
            return Err(HarnessError::Config("request_timeout_ms must be > 0".into()));
        }

        for table in &self.reset_tables {
            let valid = !table.is_empty()
                && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid {
                return Err(HarnessError::Config(format!(
                    "reset_tables contains invalid table name '{}'",
                    table
                )));
            }
        }

        Ok(())
    }
}

pub(crate) fn is_yaml(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext == "yaml" || ext == "yml")
}
