use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use feast_common::{Coordinate, MenuItemRef};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

/// Declares a store-assigned string identifier. New identifiers are random UUIDs, as the hosted document store would
/// hand out.
macro_rules! document_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
        #[sqlx(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn random() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

document_id!(
    /// The authenticated user's identifier (`uid`).
    UserId
);
document_id!(CartItemId);
document_id!(OrderId);
document_id!(FavoriteId);
document_id!(ReviewId);
document_id!(
    /// Opaque bearer token for a signed-in session.
    SessionToken
);

//--------------------------------------     CartLineItem      ---------------------------------------------------------
/// One entry in a user's cart. `quantity` is always at least 1: a line item that would drop below 1 is deleted
/// instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: CartItemId,
    pub owner_id: UserId,
    pub menu_item: MenuItemRef,
    pub quantity: i64,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartLineItem {
    pub owner_id: UserId,
    pub menu_item: MenuItemRef,
    pub quantity: i64,
}

impl NewCartLineItem {
    pub fn new(owner_id: UserId, menu_item: MenuItemRef, quantity: i64) -> Self {
        Self { owner_id, menu_item, quantity }
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order has been created from a cart snapshot.
    Placed,
    /// A courier has picked the order up. Placement never writes this. It is an opt-in intermediate step.
    InTransit,
    /// Terminal. No further status change is accepted.
    Delivered,
}

impl OrderStatusType {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatusType::Delivered)
    }

    /// Whether moving from `self` to `next` is a forward step of the lifecycle. Staying put is not a step.
    pub fn can_advance_to(&self, next: OrderStatusType) -> bool {
        use OrderStatusType::*;
        matches!((*self, next), (Placed, InTransit) | (Placed, Delivered) | (InTransit, Delivered))
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Placed => write!(f, "Placed"),
            OrderStatusType::InTransit => write!(f, "InTransit"),
            OrderStatusType::Delivered => write!(f, "Delivered"),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Treating it as Placed");
            OrderStatusType::Placed
        })
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Placed" => Ok(Self::Placed),
            "InTransit" => Ok(Self::InTransit),
            "Delivered" => Ok(Self::Delivered),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------    OrderLineItem      ---------------------------------------------------------
/// A frozen copy of a cart line item, taken when the order is placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub cart_item_id: CartItemId,
    pub menu_item: MenuItemRef,
    pub quantity: i64,
}

impl From<&CartLineItem> for OrderLineItem {
    fn from(item: &CartLineItem) -> Self {
        Self { cart_item_id: item.id.clone(), menu_item: item.menu_item.clone(), quantity: item.quantity }
    }
}

//--------------------------------------        Order          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub owner_id: UserId,
    pub line_items: Vec<OrderLineItem>,
    pub status: OrderStatusType,
    /// Assigned by the store when the order is written
    pub placed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Where the device was when the order was placed
    pub pickup_location: Coordinate,
}

impl Order {
    pub fn is_delivered(&self) -> bool {
        self.status.is_terminal()
    }
}

//--------------------------------------       NewOrder        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub owner_id: UserId,
    pub line_items: Vec<OrderLineItem>,
    pub pickup_location: Coordinate,
}

impl NewOrder {
    /// Builds an order request from a cart snapshot. The line items are copied, so whatever happens to the cart
    /// afterwards cannot reach the order.
    pub fn from_snapshot(owner_id: UserId, snapshot: &[CartLineItem], pickup_location: Coordinate) -> Self {
        let line_items = snapshot.iter().map(OrderLineItem::from).collect();
        Self { owner_id, line_items, pickup_location }
    }
}

//--------------------------------------    DocumentState      ---------------------------------------------------------
/// The state of a single watched document. A document that does not exist (yet) is reported as `Missing` rather
/// than leaving the watcher waiting.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentState<T> {
    Missing,
    Exists(T),
}

impl<T> DocumentState<T> {
    pub fn exists(&self) -> bool {
        matches!(self, DocumentState::Exists(_))
    }

    pub fn as_ref(&self) -> Option<&T> {
        match self {
            DocumentState::Exists(v) => Some(v),
            DocumentState::Missing => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            DocumentState::Exists(v) => Some(v),
            DocumentState::Missing => None,
        }
    }
}

impl<T> From<Option<T>> for DocumentState<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => DocumentState::Exists(v),
            None => DocumentState::Missing,
        }
    }
}

//--------------------------------------       Favorite        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: FavoriteId,
    pub owner_id: UserId,
    pub menu_item: MenuItemRef,
    pub thumbnail: Option<String>,
    pub favorited_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFavorite {
    pub owner_id: UserId,
    pub menu_item: MenuItemRef,
    pub thumbnail: Option<String>,
}

//--------------------------------------        Review         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub catalog_item_id: String,
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub catalog_item_id: String,
    pub author: String,
    pub text: String,
}

//--------------------------------------     UserProfile       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: UserId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    /// Argon2 PHC string. The salt is part of it.
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub uid: UserId,
    pub password_hash: String,
}

//--------------------------------------         Role          ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Customer,
    /// May advance any order's status, not only their own.
    Courier,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Customer => write!(f, "customer"),
            Role::Courier => write!(f, "courier"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "courier" => Ok(Self::Courier),
            "admin" => Ok(Self::Admin),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}
