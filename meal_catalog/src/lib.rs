//! Meal catalog
//!
//! A thin, read-only client for the public TheMealDB recipe API. Recipes stand in for restaurant menu entries: each
//! [`CatalogItem`] can be turned into a [`feast_common::MenuItemRef`] and added to a cart or a favorites list.
//! Nothing in this crate writes to the catalog.
mod api;
mod config;
mod data_objects;
mod error;
mod helpers;

pub use api::CatalogApi;
pub use config::CatalogConfig;
pub use data_objects::{CatalogItem, CatalogResponse};
pub use error::CatalogApiError;
pub use helpers::filter_by_name;
