//! The cart ledger.
//!
//! Every mutation goes straight to the store; there is no local staging. A line item's quantity never drops below 1.
//! Asking for less deletes the line item instead.
use std::fmt::Debug;

use feast_common::MenuItemRef;
use log::*;

use crate::{
    db::traits::{CartManagement, LiveQueries},
    db_types::{CartItemId, CartLineItem, Favorite, NewCartLineItem},
    feast_api::{errors::FeastApiError, session::Session},
    subscription::Subscription,
};

pub struct CartApi<B> {
    db: B,
    session: Session,
}

impl<B> Debug for CartApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CartApi ({})", self.session.user_id)
    }
}

impl<B> CartApi<B> {
    pub fn new(db: B, session: Session) -> Self {
        Self { db, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

impl<B> CartApi<B>
where B: CartManagement + LiveQueries
{
    /// Adds `quantity` of the menu item to the cart as a new line item, even if the menu item is already in the cart.
    pub async fn add(&self, menu_item: MenuItemRef, quantity: i64) -> Result<CartLineItem, FeastApiError> {
        if quantity < 1 {
            return Err(FeastApiError::InvalidQuantity(quantity));
        }
        let owner = self.session.user_id.clone();
        let item = self.db.insert_cart_item(NewCartLineItem::new(owner, menu_item, quantity)).await?;
        debug!("🛒️ {} x{} added to the cart of {}", item.menu_item, item.quantity, item.owner_id);
        Ok(item)
    }

    /// Adds one of a favorite's menu items to the cart.
    pub async fn add_favorite(&self, favorite: &Favorite) -> Result<CartLineItem, FeastApiError> {
        self.add(favorite.menu_item.clone(), 1).await
    }

    /// Sets the quantity of a line item. A quantity below 1 deletes the line item, in which case `None` is returned.
    pub async fn set_quantity(
        &self,
        id: &CartItemId,
        new_quantity: i64,
    ) -> Result<Option<CartLineItem>, FeastApiError> {
        let owner = &self.session.user_id;
        if new_quantity < 1 {
            if self.db.remove_cart_item(owner, id).await? {
                debug!("🛒️ Quantity of {id} set to {new_quantity}. Removed it from the cart of {owner}");
                return Ok(None);
            }
            return Err(FeastApiError::NotFound(format!("Cart item {id}")));
        }
        match self.db.update_cart_item_quantity(owner, id, new_quantity).await? {
            Some(item) => {
                trace!("🛒️ Quantity of {id} set to {new_quantity}");
                Ok(Some(item))
            },
            None => Err(FeastApiError::NotFound(format!("Cart item {id}"))),
        }
    }

    pub async fn increment(&self, id: &CartItemId) -> Result<Option<CartLineItem>, FeastApiError> {
        let item = self.fetch_item(id).await?;
        self.set_quantity(id, item.quantity.saturating_add(1)).await
    }

    /// Reduces the quantity by one. Decrementing a line item with quantity 1 removes it.
    pub async fn decrement(&self, id: &CartItemId) -> Result<Option<CartLineItem>, FeastApiError> {
        let item = self.fetch_item(id).await?;
        self.set_quantity(id, item.quantity - 1).await
    }

    /// Removes the line item. Removing an item that is not in the cart is not an error; the result is `false`.
    pub async fn remove(&self, id: &CartItemId) -> Result<bool, FeastApiError> {
        let removed = self.db.remove_cart_item(&self.session.user_id, id).await?;
        if !removed {
            info!("🛒️ Cart item {id} was already gone from the cart of {}", self.session.user_id);
        }
        Ok(removed)
    }

    pub async fn list(&self) -> Result<Vec<CartLineItem>, FeastApiError> {
        Ok(self.db.fetch_cart(&self.session.user_id).await?)
    }

    /// A live view of the cart. Every add, update and removal produces a new snapshot.
    pub async fn watch(&self) -> Result<Subscription<Vec<CartLineItem>>, FeastApiError> {
        Ok(self.db.watch_cart(&self.session.user_id).await?)
    }

    async fn fetch_item(&self, id: &CartItemId) -> Result<CartLineItem, FeastApiError> {
        self.db
            .fetch_cart_item(&self.session.user_id, id)
            .await?
            .ok_or_else(|| FeastApiError::NotFound(format!("Cart item {id}")))
    }
}

/// The number shown on the cart badge. It counts line items, not units.
pub fn badge_count(snapshot: &[CartLineItem]) -> usize {
    snapshot.len()
}

pub fn total_quantity(snapshot: &[CartLineItem]) -> i64 {
    snapshot.iter().map(|i| i.quantity).sum()
}
