use crate::{
    db::traits::StoreError,
    db_types::{CartLineItem, DocumentState, Favorite, Order, OrderId, UserId},
    subscription::Subscription,
};

/// Live versions of the list queries. Each call evaluates the query once, then keeps re-evaluating it in the
/// background whenever a committed write touches the collection it reads. Every snapshot is a complete, consistent
/// result; snapshots that are equal to the previous one are not re-delivered.
///
/// The initial snapshot is already in place when the call returns. Dropping or closing the returned
/// [`Subscription`] detaches the query from the store.
#[allow(async_fn_in_trait)]
pub trait LiveQueries {
    async fn watch_cart(&self, owner: &UserId) -> Result<Subscription<Vec<CartLineItem>>, StoreError>;

    async fn watch_order(&self, id: &OrderId) -> Result<Subscription<DocumentState<Order>>, StoreError>;

    async fn watch_orders_for_user(&self, owner: &UserId) -> Result<Subscription<Vec<Order>>, StoreError>;

    async fn watch_favorites(&self, owner: &UserId) -> Result<Subscription<Vec<Favorite>>, StoreError>;
}
