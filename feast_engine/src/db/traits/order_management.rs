use crate::{
    db::traits::StoreError,
    db_types::{NewOrder, Order, OrderId, OrderStatusType, UserId},
};

/// The `OrderManagement` trait defines how orders are written and read. Line items are immutable once written; only
/// the status moves.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Writes the order and all its line items in a single atomic transaction. Either the whole order exists afterwards
    /// or none of it does. The store assigns the id and timestamps, and the status starts at `Placed`.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError>;

    async fn fetch_order(&self, id: &OrderId) -> Result<Option<Order>, StoreError>;

    /// All the user's orders, oldest first.
    async fn fetch_orders_for_user(&self, owner: &UserId) -> Result<Vec<Order>, StoreError>;

    /// Sets the order status, unless the order is already `Delivered`. Returns the order as it was before the update,
    /// or `None` if there is no such order. Callers compare the returned status to learn whether anything changed.
    async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatusType,
    ) -> Result<Option<Order>, StoreError>;
}
