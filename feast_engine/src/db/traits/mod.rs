//! # Document store management
//!
//! This module defines the contracts a *backend* must honour to store Feast's data. The app's data lives in a handful
//! of collections: the per-user cart, orders (with their frozen line items), favorites, reviews and user accounts.
//!
//! * [`CartManagement`] covers the per-user cart.
//! * [`OrderManagement`] writes orders atomically and moves them along their status lifecycle.
//! * [`FavoriteManagement`] and [`ReviewManagement`] cover the side collections.
//! * [`AuthManagement`] covers accounts, sessions and roles.
//! * [`LiveQueries`] turns any of the list queries into a [`crate::Subscription`] that is re-evaluated whenever the
//!   underlying collection changes.
//! * [`FeastDatabase`] ties them all together.
mod auth_management;
mod cart_management;
mod data_objects;
mod favorite_management;
mod feast_database;
mod live_queries;
mod order_management;
mod review_management;

pub use auth_management::AuthManagement;
pub use cart_management::CartManagement;
pub use data_objects::{Collection, StoreChange};
pub use favorite_management::FavoriteManagement;
pub use feast_database::{FeastDatabase, StoreError};
pub use live_queries::LiveQueries;
pub use order_management::OrderManagement;
pub use review_management::ReviewManagement;
