//! Device location contract
//!
//! The engine never talks to a GPS chip itself. Whatever runs it supplies a [`LocationProvider`] offering a permission
//! prompt, a one-shot fix, reverse geocoding and a continuous position watch. The watch is handed out as a
//! [`PositionWatch`], which unsubscribes from the sensor exactly once, when it is cancelled or dropped.
use std::{fmt::Display, future::Future};

use feast_common::Coordinate;
use log::*;
use thiserror::Error;
use tokio::sync::mpsc;

pub const DEFAULT_DISTANCE_INTERVAL_M: f64 = 10.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PermissionStatus {
    #[default]
    Granted,
    Denied,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("Permission to access location was denied")]
    PermissionDenied,
    #[error("Location unavailable: {0}")]
    Unavailable(String),
    #[error("Reverse geocoding failed: {0}")]
    GeocodeFailed(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Accuracy {
    Low,
    Balanced,
    #[default]
    High,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatchOptions {
    pub accuracy: Accuracy,
    /// Minimum distance, in metres, the device has to move before a new sample is reported.
    pub distance_interval_m: f64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self { accuracy: Accuracy::High, distance_interval_m: DEFAULT_DISTANCE_INTERVAL_M }
    }
}

/// A reverse-geocoded address. Any part may be unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl Display for Address {
    /// `street, city, region, country`, skipping the parts that are unknown.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts = [&self.street, &self.city, &self.region, &self.country]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .filter(|p| !p.trim().is_empty())
            .collect::<Vec<&str>>();
        write!(f, "{}", parts.join(", "))
    }
}

pub trait LocationProvider: Clone + Send + Sync + 'static {
    fn request_permission(&self) -> impl Future<Output = PermissionStatus> + Send;

    fn current_position(&self) -> impl Future<Output = Result<Coordinate, LocationError>> + Send;

    /// Candidate addresses for the coordinate, best match first.
    fn reverse_geocode(&self, coordinate: Coordinate) -> impl Future<Output = Result<Vec<Address>, LocationError>> + Send;

    fn watch_position(&self, options: WatchOptions) -> impl Future<Output = Result<PositionWatch, LocationError>> + Send;
}

/// Reverse geocodes `coordinate` and formats the best match. Failures are not errors here: the caller just gets no
/// label.
pub async fn describe_location<L: LocationProvider>(location: &L, coordinate: Coordinate) -> Option<String> {
    match location.reverse_geocode(coordinate).await {
        Ok(addresses) => addresses.first().map(|a| a.to_string()),
        Err(e) => {
            debug!("📍️ Could not reverse geocode {coordinate}: {e}");
            None
        },
    }
}

/// A live position watch on the device sensor.
pub struct PositionWatch {
    positions: mpsc::Receiver<Coordinate>,
    on_cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl PositionWatch {
    /// `on_cancel` is how the provider removes its sensor subscription. It runs exactly once.
    pub fn new<F>(positions: mpsc::Receiver<Coordinate>, on_cancel: F) -> Self
    where F: FnOnce() + Send + 'static {
        Self { positions, on_cancel: Some(Box::new(on_cancel)) }
    }

    /// The next position sample, or `None` once the watch has been cancelled or the provider has gone away.
    pub async fn next(&mut self) -> Option<Coordinate> {
        if self.on_cancel.is_none() {
            return None;
        }
        self.positions.recv().await
    }

    pub fn is_cancelled(&self) -> bool {
        self.on_cancel.is_none()
    }

    pub fn cancel(&mut self) {
        if let Some(on_cancel) = self.on_cancel.take() {
            self.positions.close();
            on_cancel();
            debug!("📍️ Position watch released");
        }
    }
}

impl Drop for PositionWatch {
    fn drop(&mut self) {
        self.cancel();
    }
}
