//! # SQLite backend
//!
//! "Low-level" SQLite interactions live in the collection modules as plain functions that accept a
//! `&mut SqliteConnection`. Callers can obtain a connection from a pool, or open an atomic transaction and pass
//! `&mut *tx` through without any other changes. [`SqliteDatabase`] wires them up to the backend traits.
use std::{env, str::FromStr};

use log::*;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

mod carts;
mod favorites;
mod live_query;
mod orders;
mod reviews;
mod sqlite_impl;
mod users;

pub use sqlite_impl::SqliteDatabase;

use crate::config::DEFAULT_DATABASE_URL;

pub fn db_url() -> String {
    let result = env::var("FEAST_DATABASE_URL").unwrap_or_else(|_| {
        info!("FEAST_DATABASE_URL is not set. Using the default.");
        DEFAULT_DATABASE_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true).foreign_keys(true);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}
