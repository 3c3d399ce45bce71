use super::Database;
use crate::error::{HarnessError, Result};
use crate::utils::config::DbConfig;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Postgres connection used for seeding and resets
pub struct PgDatabase {
    pool: PgPool,
    tables: Vec<String>,
}

impl PgDatabase {
    /// Connect with a single pooled connection; the harness is strictly sequential.
    ///
    /// `tables` must already be validated identifiers (see `Config::validate`).
    pub async fn connect(config: &DbConfig, tables: &[String]) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(config.connect_options())
            .await
            .map_err(|e| {
                HarnessError::Setup(format!(
                    "cannot connect to database {}@{}:{}/{}: {}",
                    config.user, config.host, config.port, config.db_name, e
                ))
            })?;

        log::info!(
            "Connected to database {}:{}/{}",
            config.host,
            config.port,
            config.db_name
        );

        Ok(Self {
            pool,
            tables: tables.to_vec(),
        })
    }

    fn reset_statement(&self) -> Option<String> {
        reset_statement(&self.tables)
    }
}

/// One statement so a partial reset cannot be observed
pub(crate) fn reset_statement(tables: &[String]) -> Option<String> {
    if tables.is_empty() {
        return None;
    }
    Some(format!(
        "TRUNCATE TABLE {} RESTART IDENTITY CASCADE",
        tables.join(", ")
    ))
}

#[async_trait]
impl Database for PgDatabase {
    async fn set_admin_role(&self, email: &str) -> Result<()> {
        let result = sqlx::query("UPDATE users SET is_admin = true WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(HarnessError::Setup(format!(
                "no user registered with email '{}'",
                email
            )));
        }
        log::debug!("Granted admin role to {}", email);
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        let Some(statement) = self.reset_statement() else {
            log::warn!("No reset tables configured, skipping database reset");
            return Ok(());
        };

        sqlx::query(&statement).execute(&self.pool).await?;
        log::info!("Database reset: {}", self.tables.join(", "));
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        log::info!("Database connection closed");
    }
}
