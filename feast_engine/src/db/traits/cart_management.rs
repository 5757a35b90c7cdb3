use crate::{
    db::traits::StoreError,
    db_types::{CartItemId, CartLineItem, NewCartLineItem, UserId},
};

/// Storage for the per-user cart. Every call is scoped to an owner: a line item that belongs to someone else is
/// indistinguishable from one that does not exist.
#[allow(async_fn_in_trait)]
pub trait CartManagement {
    /// Adds a new line item. Adding a menu item that is already in the cart creates a second line item.
    async fn insert_cart_item(&self, item: NewCartLineItem) -> Result<CartLineItem, StoreError>;

    /// The owner's cart, in the order the items were added.
    async fn fetch_cart(&self, owner: &UserId) -> Result<Vec<CartLineItem>, StoreError>;

    async fn fetch_cart_item(&self, owner: &UserId, id: &CartItemId) -> Result<Option<CartLineItem>, StoreError>;

    /// Sets the quantity of a line item. The caller guarantees `quantity >= 1`. Returns `None` if the item does not
    /// exist for this owner.
    async fn update_cart_item_quantity(
        &self,
        owner: &UserId,
        id: &CartItemId,
        quantity: i64,
    ) -> Result<Option<CartLineItem>, StoreError>;

    /// Deletes a line item. Returns `false` if there was nothing to delete.
    async fn remove_cart_item(&self, owner: &UserId, id: &CartItemId) -> Result<bool, StoreError>;
}
