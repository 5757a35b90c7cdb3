use thiserror::Error;

use crate::{
    db::traits::StoreError,
    db_types::{OrderId, OrderStatusType, UserId},
    location::LocationError,
};

#[derive(Debug, Clone, Error)]
pub enum FeastApiError {
    #[error("Permission to access the device location was denied")]
    PermissionDenied,
    #[error("Cannot place an order from an empty cart")]
    EmptyCart,
    #[error("The requested document does not exist: {0}")]
    NotFound(String),
    #[error("The store operation failed: {0}")]
    RemoteOperation(String),
    #[error("Quantity must be at least 1, but was {0}")]
    InvalidQuantity(i64),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("The device location is unavailable: {0}")]
    LocationUnavailable(String),
    #[error("User {user} is not allowed to {action}")]
    NotAuthorized { user: UserId, action: String },
    #[error("Order {order_id} cannot change from {from} to {to}")]
    InvalidStatusTransition { order_id: OrderId, from: OrderStatusType, to: OrderStatusType },
}

impl From<StoreError> for FeastApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(s) => FeastApiError::NotFound(s),
            e => FeastApiError::RemoteOperation(e.to_string()),
        }
    }
}

impl From<LocationError> for FeastApiError {
    fn from(e: LocationError) -> Self {
        match e {
            LocationError::PermissionDenied => FeastApiError::PermissionDenied,
            e => FeastApiError::LocationUnavailable(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The email or password is incorrect")]
    InvalidCredentials,
    #[error("An account with email {0} already exists")]
    EmailAlreadyRegistered(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("The session has expired or was signed out")]
    SessionExpired,
    #[error("No profile exists for user {0}")]
    ProfileNotFound(UserId),
    #[error("Could not hash the password: {0}")]
    PasswordHash(String),
}

impl From<StoreError> for AuthApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail(email) => AuthApiError::EmailAlreadyRegistered(email),
            e => AuthApiError::DatabaseError(e.to_string()),
        }
    }
}
