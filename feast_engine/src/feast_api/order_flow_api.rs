use std::fmt::Debug;

use log::*;

use crate::{
    db::traits::{CartManagement, LiveQueries, OrderManagement},
    db_types::{CartItemId, CartLineItem, DocumentState, NewOrder, Order, OrderId, OrderStatusType},
    events::{EventProducers, OrderPlacedEvent, OrderStatusChangedEvent},
    feast_api::{errors::FeastApiError, session::Session},
    location::{LocationProvider, PermissionStatus},
    subscription::Subscription,
};

/// The result of a successful placement. The order exists. `uncleared` lists the cart line items that could not be
/// removed from the cart afterwards; they are still in the cart, but they are also in the order.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementReceipt {
    pub order_id: OrderId,
    pub uncleared: Vec<CartItemId>,
}

impl PlacementReceipt {
    pub fn cart_cleared(&self) -> bool {
        self.uncleared.is_empty()
    }
}

/// `OrderFlowApi` turns cart snapshots into orders and moves orders along their lifecycle.
pub struct OrderFlowApi<B> {
    db: B,
    session: Session,
    producers: EventProducers,
    restrict_delivery: bool,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi ({})", self.session.user_id)
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, session: Session, producers: EventProducers) -> Self {
        Self { db, session, producers, restrict_delivery: true }
    }

    /// When `false`, anyone may advance any order, given its id.
    pub fn with_delivery_restriction(mut self, restrict: bool) -> Self {
        self.restrict_delivery = restrict;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

impl<B> OrderFlowApi<B>
where B: CartManagement + OrderManagement + LiveQueries
{
    /// Places an order for the items in `snapshot`, picked up wherever the device currently is.
    ///
    /// Nothing is written unless the cart is non-empty, every item belongs to the session user, location permission
    /// is granted and a position fix is obtained. The order and its line items are then written in one atomic
    /// transaction. Only once that has committed are the ordered items removed from the cart. That cleanup is best
    /// effort: failures are logged and listed in the receipt, and the order stays valid.
    ///
    /// The line items are copied out of `snapshot`. Changes to the cart while the order is being placed do not reach
    /// the order.
    pub async fn place_order<L>(
        &self,
        snapshot: &[CartLineItem],
        location: &L,
    ) -> Result<PlacementReceipt, FeastApiError>
    where
        L: LocationProvider,
    {
        let owner = &self.session.user_id;
        if snapshot.is_empty() {
            debug!("🔄️📦️ {owner} tried to place an order from an empty cart");
            return Err(FeastApiError::EmptyCart);
        }
        if let Some(foreign) = snapshot.iter().find(|item| &item.owner_id != owner) {
            warn!("🔄️📦️ {owner} tried to order cart item {}, which belongs to {}", foreign.id, foreign.owner_id);
            return Err(FeastApiError::NotFound(format!("Cart item {}", foreign.id)));
        }
        if location.request_permission().await == PermissionStatus::Denied {
            info!("🔄️📦️ Location permission denied. No order placed for {owner}");
            return Err(FeastApiError::PermissionDenied);
        }
        let pickup = location.current_position().await.map_err(|e| {
            warn!("🔄️📦️ Could not get a position fix for {owner}'s order. {e}");
            FeastApiError::LocationUnavailable(e.to_string())
        })?;
        let order = self.db.insert_order(NewOrder::from_snapshot(owner.clone(), snapshot, pickup)).await?;
        info!("🔄️📦️ Order {} placed for {owner} with {} line items at {pickup}", order.id, order.line_items.len());

        let mut uncleared = Vec::new();
        for item in snapshot {
            match self.db.remove_cart_item(owner, &item.id).await {
                Ok(true) => {},
                Ok(false) => debug!("🔄️📦️ Cart item {} had already left the cart", item.id),
                Err(e) => {
                    warn!("🔄️📦️ Order {} was placed, but cart item {} could not be cleared. {e}", order.id, item.id);
                    uncleared.push(item.id.clone());
                },
            }
        }
        let receipt = PlacementReceipt { order_id: order.id.clone(), uncleared };
        self.call_order_placed_hook(order).await;
        Ok(receipt)
    }

    /// Places an order for whatever is in the cart right now.
    pub async fn place_order_from_cart<L>(&self, location: &L) -> Result<PlacementReceipt, FeastApiError>
    where L: LocationProvider {
        let snapshot = self.db.fetch_cart(&self.session.user_id).await?;
        self.place_order(&snapshot, location).await
    }

    /// Marks the order as delivered. Marking a delivered order as delivered again is a no-op.
    pub async fn mark_delivered(&self, order_id: &OrderId) -> Result<Order, FeastApiError> {
        self.modify_status(order_id, OrderStatusType::Delivered).await
    }

    /// Records that a courier has picked up the order.
    pub async fn mark_in_transit(&self, order_id: &OrderId) -> Result<Order, FeastApiError> {
        self.modify_status(order_id, OrderStatusType::InTransit).await
    }

    /// Changes the status of an order. Orders only ever move forward:
    ///
    /// | From \ To | Placed | InTransit | Delivered |
    /// |-----------|--------|-----------|-----------|
    /// | Placed    | no-op  | ok        | ok        |
    /// | InTransit | Err    | no-op     | ok        |
    /// | Delivered | Err    | Err       | no-op     |
    ///
    /// A no-op returns the order unchanged and emits no event. A change emits an `OrderStatusChanged` event.
    ///
    /// While delivery is restricted, only the order's owner, a courier or an admin may change its status.
    pub async fn modify_status(&self, order_id: &OrderId, new_status: OrderStatusType) -> Result<Order, FeastApiError> {
        let order = self.order(order_id).await?;
        self.check_can_modify(&order, new_status)?;
        if order.status == new_status {
            debug!("🔄️📦️ Order {order_id} is already {new_status}. Nothing to do");
            return Ok(order);
        }
        if !order.status.can_advance_to(new_status) {
            return Err(FeastApiError::InvalidStatusTransition {
                order_id: order_id.clone(),
                from: order.status,
                to: new_status,
            });
        }
        let old = self
            .db
            .update_order_status(order_id, new_status)
            .await?
            .ok_or_else(|| FeastApiError::NotFound(format!("Order {order_id}")))?;
        let updated = self.order(order_id).await?;
        if updated.status != new_status {
            // Somebody else moved the order on between our read and our write
            return Err(FeastApiError::InvalidStatusTransition {
                order_id: order_id.clone(),
                from: updated.status,
                to: new_status,
            });
        }
        if old.status != updated.status {
            info!("🔄️📦️ Order {order_id} moved from {} to {new_status}", old.status);
            self.call_status_changed_hook(updated.clone(), old.status).await;
        }
        Ok(updated)
    }

    pub async fn order(&self, order_id: &OrderId) -> Result<Order, FeastApiError> {
        self.db.fetch_order(order_id).await?.ok_or_else(|| FeastApiError::NotFound(format!("Order {order_id}")))
    }

    /// A live view of a single order. An order that does not exist is reported as [`DocumentState::Missing`].
    pub async fn observe(&self, order_id: &OrderId) -> Result<Subscription<DocumentState<Order>>, FeastApiError> {
        Ok(self.db.watch_order(order_id).await?)
    }

    /// The session user's orders, oldest first.
    pub async fn history(&self) -> Result<Vec<Order>, FeastApiError> {
        Ok(self.db.fetch_orders_for_user(&self.session.user_id).await?)
    }

    pub async fn watch_history(&self) -> Result<Subscription<Vec<Order>>, FeastApiError> {
        Ok(self.db.watch_orders_for_user(&self.session.user_id).await?)
    }

    fn check_can_modify(&self, order: &Order, new_status: OrderStatusType) -> Result<(), FeastApiError> {
        if !self.restrict_delivery || order.owner_id == self.session.user_id || self.session.can_handle_any_order() {
            return Ok(());
        }
        warn!("🔄️📦️ {} tried to mark order {} as {new_status}, but it is not theirs", self.session.user_id, order.id);
        Err(FeastApiError::NotAuthorized {
            user: self.session.user_id.clone(),
            action: format!("mark order {} as {new_status}", order.id),
        })
    }

    async fn call_order_placed_hook(&self, order: Order) {
        if !self.producers.order_placed_producer.is_empty() {
            debug!("🔄️📦️ Notifying order placed hook subscribers");
            self.producers.publish_order_placed(OrderPlacedEvent::new(order)).await;
        }
    }

    async fn call_status_changed_hook(&self, order: Order, old_status: OrderStatusType) {
        if !self.producers.order_status_producer.is_empty() {
            debug!("🔄️📦️ Notifying order status hook subscribers");
            self.producers.publish_status_changed(OrderStatusChangedEvent::new(order, old_status)).await;
        }
    }
}

/// Only orders that are still on their way can be tracked.
pub fn is_trackable(order: &Order) -> bool {
    !order.is_delivered()
}
