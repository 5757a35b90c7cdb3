//! # Feast public API
//!
//! The `feast_api` module exposes the programmatic API of the engine. It is modular, so a host app can pick the parts
//! it needs.
//!
//! * [`cart_api`] is the cart ledger: the signed-in user's line items and their quantities.
//! * [`order_flow_api`] turns a cart snapshot into an order and moves orders through their lifecycle.
//! * [`tracking_api`] follows an order with a live route of position samples until it is delivered.
//! * [`favorites_api`] and [`reviews_api`] manage the side collections.
//! * [`auth_api`] signs users up and in, and hands out the [`session::Session`] every other API needs.
//!
//! # API usage
//!
//! An API instance is created from a backend that implements the traits the API needs, plus the session it acts for.
//! There is no global "current user".
//!
//! ```rust,ignore
//! use feast_engine::{CartApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let session = auth_api.sign_in("alice@example.com", password).await?;
//! let cart = CartApi::new(db, session);
//! let item = cart.add(MenuItemRef::new("52772", "Teriyaki Chicken Casserole"), 2).await?;
//! ```
pub mod auth_api;
pub mod cart_api;
pub mod errors;
pub mod favorites_api;
pub mod order_flow_api;
pub mod reviews_api;
pub mod session;
pub mod tracking_api;
