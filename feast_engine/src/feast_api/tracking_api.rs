//! Live order tracking.
//!
//! A [`TrackingFeed`] follows the device position and builds an append-only route of samples. Each sample is reverse
//! geocoded when possible. The feed owns a sensor watch. It releases that watch exactly once: when the feed is
//! stopped, when it is dropped, or when the order it follows is delivered.
//!
//! [`TrackingApi::track`] puts together everything the tracking screen needs: the live order, a label for the
//! pickup location, and the feed.
use chrono::{DateTime, Utc};
use feast_common::Coordinate;
use log::*;
use tokio::sync::watch;

use crate::{
    db::traits::LiveQueries,
    db_types::{DocumentState, Order, OrderId},
    feast_api::errors::FeastApiError,
    location::{describe_location, LocationProvider, PermissionStatus, PositionWatch, WatchOptions},
    subscription::Subscription,
};

#[derive(Debug, Clone, PartialEq)]
pub struct RouteSample {
    pub coordinate: Coordinate,
    /// Formatted address of the sample, if reverse geocoding succeeded
    pub address: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackingState {
    pub current: Option<Coordinate>,
    pub current_address: Option<String>,
    /// Every accepted sample, oldest first. Samples are only ever appended.
    pub route: Vec<RouteSample>,
    /// Set once the followed order has been delivered (or has disappeared) and sampling has stopped.
    pub finished: bool,
}

pub struct TrackingFeed {
    state: Subscription<TrackingState>,
}

impl std::fmt::Debug for TrackingFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TrackingFeed ({:?})", self.state)
    }
}

impl TrackingFeed {
    /// Asks for location permission and starts following the device.
    ///
    /// If `order_feed` is given, sampling stops as soon as that order is delivered or goes missing.
    pub async fn start<L: LocationProvider>(
        location: L,
        options: WatchOptions,
        order_feed: Option<watch::Receiver<DocumentState<Order>>>,
    ) -> Result<Self, FeastApiError> {
        if location.request_permission().await == PermissionStatus::Denied {
            info!("🛵️ Location permission denied. Not tracking");
            return Err(FeastApiError::PermissionDenied);
        }
        let positions = location.watch_position(options.clone()).await?;
        let (tx, rx) = watch::channel(TrackingState::default());
        let task = tokio::spawn(run_feed(location, positions, options.distance_interval_m, order_feed, tx));
        debug!("🛵️ Tracking feed started with a {}m threshold", options.distance_interval_m);
        Ok(Self { state: Subscription::new(rx, task) })
    }

    pub fn state(&self) -> TrackingState {
        self.state.latest()
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackingState> {
        self.state.receiver()
    }

    /// Waits for the next state change. Returns `None` once the feed has stopped.
    pub async fn changed(&mut self) -> Option<TrackingState> {
        self.state.changed().await
    }

    pub async fn wait_for<F>(&mut self, predicate: F) -> Option<TrackingState>
    where F: FnMut(&TrackingState) -> bool {
        self.state.wait_for(predicate).await
    }

    pub fn is_running(&self) -> bool {
        self.state.is_active()
    }

    /// Stops sampling and releases the sensor. Returns the route as it stood when the feed stopped.
    pub async fn stop(self) -> TrackingState {
        let final_state = self.state.receiver();
        self.state.close().await;
        let state = final_state.borrow().clone();
        debug!("🛵️ Tracking feed stopped after {} samples", state.route.len());
        state
    }
}

enum FeedEvent {
    Sample(Coordinate),
    SensorGone,
    OrderFinished,
}

async fn run_feed<L: LocationProvider>(
    location: L,
    mut positions: PositionWatch,
    distance_interval_m: f64,
    mut order_feed: Option<watch::Receiver<DocumentState<Order>>>,
    tx: watch::Sender<TrackingState>,
) {
    let mut last: Option<Coordinate> = None;
    loop {
        let event = tokio::select! {
            biased;
            _ = order_finished(order_feed.as_mut()) => FeedEvent::OrderFinished,
            sample = positions.next() => sample.map(FeedEvent::Sample).unwrap_or(FeedEvent::SensorGone),
        };
        let coordinate = match event {
            FeedEvent::Sample(c) => c,
            FeedEvent::SensorGone => {
                info!("🛵️ The location provider closed the position watch");
                break;
            },
            FeedEvent::OrderFinished => {
                info!("🛵️ The order is no longer on its way. Tracking stops");
                tx.send_modify(|s| s.finished = true);
                break;
            },
        };
        if let Some(prev) = last {
            let moved = prev.distance_to(&coordinate);
            if moved < distance_interval_m {
                trace!("🛵️ Moved {moved:.1}m since the last sample. Ignoring {coordinate}");
                continue;
            }
        }
        last = Some(coordinate);
        let address = describe_location(&location, coordinate).await;
        let sample = RouteSample { coordinate, address: address.clone(), recorded_at: Utc::now() };
        tx.send_modify(|s| {
            s.current = Some(coordinate);
            s.current_address = address;
            s.route.push(sample);
        });
        trace!("🛵️ Route sample recorded at {coordinate}");
    }
    positions.cancel();
}

/// Resolves once the order is delivered or missing. Without an order feed (or once that feed has closed) it never
/// resolves.
async fn order_finished(feed: Option<&mut watch::Receiver<DocumentState<Order>>>) {
    if let Some(feed) = feed {
        let finished = feed.wait_for(|s| s.as_ref().map(|o| o.is_delivered()).unwrap_or(true)).await.is_ok();
        if finished {
            return;
        }
    }
    std::future::pending::<()>().await
}

/// Everything the tracking view of one order needs.
#[derive(Debug)]
pub struct OrderTracking {
    pub order: Subscription<DocumentState<Order>>,
    /// Formatted address of the pickup coordinate, if it could be reverse geocoded
    pub pickup_address: Option<String>,
    /// `None` when the order is already delivered, or when the feed could not start (see `feed_error`)
    pub feed: Option<TrackingFeed>,
    pub feed_error: Option<FeastApiError>,
}

impl OrderTracking {
    /// Stops the feed and the order subscription. Returns the final route, if there was a feed.
    pub async fn stop(self) -> Option<TrackingState> {
        let state = match self.feed {
            Some(feed) => Some(feed.stop().await),
            None => None,
        };
        self.order.close().await;
        state
    }
}

pub struct TrackingApi<B, L> {
    db: B,
    location: L,
    options: WatchOptions,
}

impl<B, L> std::fmt::Debug for TrackingApi<B, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TrackingApi ({:?})", self.options)
    }
}

impl<B, L> TrackingApi<B, L> {
    pub fn new(db: B, location: L) -> Self {
        Self { db, location, options: WatchOptions::default() }
    }

    pub fn with_options(mut self, options: WatchOptions) -> Self {
        self.options = options;
        self
    }
}

impl<B, L> TrackingApi<B, L>
where
    B: LiveQueries,
    L: LocationProvider,
{
    /// Opens the tracking view for an order.
    ///
    /// A delivered order gets no feed. If the feed cannot start (e.g. location permission is denied), the order is
    /// still tracked and the reason is kept in `feed_error`.
    pub async fn track(&self, order_id: &OrderId) -> Result<OrderTracking, FeastApiError> {
        let order = self.db.watch_order(order_id).await?;
        let current = match order.latest() {
            DocumentState::Exists(o) => o,
            DocumentState::Missing => return Err(FeastApiError::NotFound(format!("Order {order_id}"))),
        };
        let pickup_address = describe_location(&self.location, current.pickup_location).await;
        let (feed, feed_error) = if current.is_delivered() {
            debug!("🛵️ Order {order_id} is already delivered. No live tracking");
            (None, None)
        } else {
            match TrackingFeed::start(self.location.clone(), self.options.clone(), Some(order.receiver())).await {
                Ok(feed) => (Some(feed), None),
                Err(e) => {
                    warn!("🛵️ Order {order_id} is tracked without a live route. {e}");
                    (None, Some(e))
                },
            }
        };
        Ok(OrderTracking { order, pickup_address, feed, feed_error })
    }
}
