pub mod postgres;

use crate::error::Result;
use async_trait::async_trait;

pub use postgres::PgDatabase;

/// Privileged access to the API's backing store.
///
/// Only used to seed state the API cannot create itself (admin role) and to
/// return the data to a known baseline around a run.
#[async_trait]
pub trait Database: Send + Sync {
    /// Grant admin rights to the account with `email`
    async fn set_admin_role(&self, email: &str) -> Result<()>;

    /// Truncate test tables (cascading) and restart their identity sequences.
    /// Must be idempotent.
    async fn reset(&self) -> Result<()>;

    async fn close(&self);
}
