//! Feast Engine
//!
//! The Feast engine is the domain core of a food-ordering app: a per-user cart, the order lifecycle that turns a cart
//! snapshot into an order, and a live tracking feed that follows the order until it is delivered. Favorites, reviews,
//! authentication and the user profile ride along as simple side collections.
//!
//! The library is divided into three main sections:
//! 1. Document store management ([`mod@db`]). The store is described by a family of backend traits; SQLite is the
//!    bundled backend. Apart from the data types in [`db_types`], you should not need to touch the store directly.
//! 2. The public API ([`mod@feast_api`]). Each API object is constructed with a backend and the [`Session`] it acts for,
//!    so there is no process-wide "current user".
//! 3. Live data. Every watch call returns a [`Subscription`] that is cancelled exactly once, either by an explicit
//!    [`Subscription::close`] or when it is dropped. The same applies to the [`TrackingFeed`] and the device
//!    position watch behind it.
//!
//! The engine also emits events (order placed, order status changed) that you can hook into via [`events`].
mod db;

pub mod config;
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod location;
pub mod subscription;

mod feast;
mod feast_api;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::SqliteDatabase;
pub use db::traits::{
    AuthManagement,
    CartManagement,
    Collection,
    FavoriteManagement,
    FeastDatabase,
    LiveQueries,
    OrderManagement,
    ReviewManagement,
    StoreChange,
    StoreError,
};
pub use feast::Feast;
pub use feast_api::{
    auth_api::AuthApi,
    cart_api::{badge_count, total_quantity, CartApi},
    errors::{AuthApiError, FeastApiError},
    favorites_api::FavoritesApi,
    order_flow_api::{is_trackable, OrderFlowApi, PlacementReceipt},
    reviews_api::ReviewsApi,
    session::Session,
    tracking_api::{OrderTracking, RouteSample, TrackingApi, TrackingFeed, TrackingState},
};
pub use subscription::Subscription;
