use std::env;

use feast_common::helpers::{env_or_default, parse_boolean_flag};
use log::*;

use crate::location::{WatchOptions, DEFAULT_DISTANCE_INTERVAL_M};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/feast.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 25;
pub const DEFAULT_CHANGE_FEED_CAPACITY: usize = 256;

#[derive(Clone, Debug)]
pub struct FeastConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// Capacity of each event hook's queue.
    pub event_buffer_size: usize,
    /// How many store change notifications a slow live query may fall behind before it has to resync.
    pub change_feed_capacity: usize,
    /// Distance the courier has to move before the tracking feed records a new sample.
    pub tracking_distance_m: f64,
    /// When true, only the order's owner or a courier/admin may change an order's status. When false, anyone holding
    /// the order id may, as earlier releases of the app allowed.
    pub restrict_delivery: bool,
}

impl Default for FeastConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
            change_feed_capacity: DEFAULT_CHANGE_FEED_CAPACITY,
            tracking_distance_m: DEFAULT_DISTANCE_INTERVAL_M,
            restrict_delivery: true,
        }
    }
}

impl FeastConfig {
    pub fn new_with_url(database_url: &str) -> Self {
        Self { database_url: database_url.to_string(), ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let database_url = env::var("FEAST_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ FEAST_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let max_connections = env_or_default("FEAST_DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS);
        let event_buffer_size = env_or_default("FEAST_EVENT_BUFFER_SIZE", DEFAULT_EVENT_BUFFER_SIZE);
        let change_feed_capacity = env_or_default("FEAST_CHANGE_FEED_CAPACITY", DEFAULT_CHANGE_FEED_CAPACITY);
        let mut tracking_distance_m = env_or_default("FEAST_TRACKING_DISTANCE_M", DEFAULT_DISTANCE_INTERVAL_M);
        if !tracking_distance_m.is_finite() || tracking_distance_m < 0.0 {
            error!(
                "🪛️ FEAST_TRACKING_DISTANCE_M must be a non-negative number of metres. Using the default, \
                 {DEFAULT_DISTANCE_INTERVAL_M}, instead."
            );
            tracking_distance_m = DEFAULT_DISTANCE_INTERVAL_M;
        }
        let restrict_delivery = parse_boolean_flag(env::var("FEAST_RESTRICT_DELIVERY").ok(), true);
        if !restrict_delivery {
            warn!("🪛️ FEAST_RESTRICT_DELIVERY is off. Any signed-in user can mark any order as delivered.");
        }
        Self {
            database_url,
            max_connections,
            event_buffer_size,
            change_feed_capacity,
            tracking_distance_m,
            restrict_delivery,
        }
    }

    pub fn watch_options(&self) -> WatchOptions {
        WatchOptions { distance_interval_m: self.tracking_distance_m, ..Default::default() }
    }
}
