use thiserror::Error;

use crate::db::traits::{
    AuthManagement,
    CartManagement,
    FavoriteManagement,
    LiveQueries,
    OrderManagement,
    ReviewManagement,
};

/// The highest level of behaviour for a Feast backend. It bundles every collection contract, plus the bits of
/// housekeeping the API layer needs.
#[allow(async_fn_in_trait)]
pub trait FeastDatabase:
    Clone
    + Send
    + Sync
    + 'static
    + CartManagement
    + OrderManagement
    + FavoriteManagement
    + ReviewManagement
    + AuthManagement
    + LiveQueries
{
    /// The URL of the database
    fn url(&self) -> &str;

    /// Closes all connections to the store. Live queries that are still open stop receiving updates.
    async fn close(&mut self) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("We have an internal database engine (configuration/uptime etc.) error: {0}")]
    DatabaseError(String),
    #[error("The requested document does not exist: {0}")]
    NotFound(String),
    #[error("An account with email {0} already exists")]
    DuplicateEmail(String),
    #[error("The write was rejected by the store: {0}")]
    Rejected(String),
    #[error("Could not run database migrations: {0}")]
    MigrationError(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            // CHECK constraints, and the triggers that keep delivered orders and order line items frozen
            sqlx::Error::Database(db_err) if db_err.is_check_violation() || db_err.message().contains("cannot") => {
                StoreError::Rejected(db_err.message().to_string())
            },
            e => StoreError::DatabaseError(e.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationError(e.to_string())
    }
}
