//! Cart cleanup after placement is best effort: the order stands even when some cart items cannot be removed.
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use feast_common::MenuItemRef;
use feast_engine::{
    db_types::{
        CartItemId,
        CartLineItem,
        DocumentState,
        Favorite,
        NewCartLineItem,
        NewOrder,
        Order,
        OrderId,
        OrderStatusType,
        UserId,
    },
    events::EventProducers,
    test_utils::{
        mock_location::MockLocationProvider,
        prepare_env::{prepare_test_db, test_session},
    },
    CartApi,
    CartManagement,
    LiveQueries,
    OrderFlowApi,
    OrderManagement,
    SqliteDatabase,
    StoreError,
    Subscription,
};

/// Delegates to SQLite, but refuses every cart removal after the first `healthy_removals`.
#[derive(Clone)]
struct FlakyCartStore {
    inner: SqliteDatabase,
    healthy_removals: usize,
    removals: Arc<AtomicUsize>,
}

impl FlakyCartStore {
    fn new(inner: SqliteDatabase, healthy_removals: usize) -> Self {
        Self { inner, healthy_removals, removals: Arc::new(AtomicUsize::new(0)) }
    }
}

impl CartManagement for FlakyCartStore {
    async fn insert_cart_item(&self, item: NewCartLineItem) -> Result<CartLineItem, StoreError> {
        self.inner.insert_cart_item(item).await
    }

    async fn fetch_cart(&self, owner: &UserId) -> Result<Vec<CartLineItem>, StoreError> {
        self.inner.fetch_cart(owner).await
    }

    async fn fetch_cart_item(&self, owner: &UserId, id: &CartItemId) -> Result<Option<CartLineItem>, StoreError> {
        self.inner.fetch_cart_item(owner, id).await
    }

    async fn update_cart_item_quantity(
        &self,
        owner: &UserId,
        id: &CartItemId,
        quantity: i64,
    ) -> Result<Option<CartLineItem>, StoreError> {
        self.inner.update_cart_item_quantity(owner, id, quantity).await
    }

    async fn remove_cart_item(&self, owner: &UserId, id: &CartItemId) -> Result<bool, StoreError> {
        if self.removals.fetch_add(1, Ordering::SeqCst) >= self.healthy_removals {
            return Err(StoreError::DatabaseError(format!("connection reset while removing {id}")));
        }
        self.inner.remove_cart_item(owner, id).await
    }
}

impl OrderManagement for FlakyCartStore {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        self.inner.insert_order(order).await
    }

    async fn fetch_order(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        self.inner.fetch_order(id).await
    }

    async fn fetch_orders_for_user(&self, owner: &UserId) -> Result<Vec<Order>, StoreError> {
        self.inner.fetch_orders_for_user(owner).await
    }

    async fn update_order_status(&self, id: &OrderId, status: OrderStatusType) -> Result<Option<Order>, StoreError> {
        self.inner.update_order_status(id, status).await
    }
}

impl LiveQueries for FlakyCartStore {
    async fn watch_cart(&self, owner: &UserId) -> Result<Subscription<Vec<CartLineItem>>, StoreError> {
        self.inner.watch_cart(owner).await
    }

    async fn watch_order(&self, id: &OrderId) -> Result<Subscription<DocumentState<Order>>, StoreError> {
        self.inner.watch_order(id).await
    }

    async fn watch_orders_for_user(&self, owner: &UserId) -> Result<Subscription<Vec<Order>>, StoreError> {
        self.inner.watch_orders_for_user(owner).await
    }

    async fn watch_favorites(&self, owner: &UserId) -> Result<Subscription<Vec<Favorite>>, StoreError> {
        self.inner.watch_favorites(owner).await
    }
}

#[tokio::test]
async fn failed_cleanup_keeps_the_order_and_reports_leftovers() {
    let _ = env_logger::try_init();
    let db = prepare_test_db().await;
    let alice = test_session("alice", &[]);
    let cart = CartApi::new(db.clone(), alice.clone());
    let first = cart.add(MenuItemRef::new("52772", "Teriyaki Chicken Casserole"), 2).await.unwrap();
    let second = cart.add(MenuItemRef::new("52959", "Baked salmon with fennel"), 1).await.unwrap();
    let third = cart.add(MenuItemRef::new("53049", "Apam balik"), 3).await.unwrap();
    let snapshot = cart.list().await.unwrap();

    let store = FlakyCartStore::new(db.clone(), 1);
    let orders = OrderFlowApi::new(store, alice.clone(), EventProducers::default());
    let location = MockLocationProvider::default();
    let receipt = orders.place_order(&snapshot, &location).await.expect("The order stands despite the failed cleanup");

    assert!(!receipt.cart_cleared());
    assert_eq!(receipt.uncleared, vec![second.id.clone(), third.id.clone()]);

    let order = orders.order(&receipt.order_id).await.unwrap();
    assert_eq!(order.status, OrderStatusType::Placed);
    let ordered = order.line_items.iter().map(|l| (l.cart_item_id.clone(), l.quantity)).collect::<Vec<_>>();
    assert_eq!(ordered, vec![(first.id.clone(), 2), (second.id.clone(), 1), (third.id.clone(), 3)]);

    let left = cart.list().await.unwrap().into_iter().map(|i| i.id).collect::<Vec<_>>();
    assert_eq!(left, vec![second.id, third.id]);

    let history = orders.history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, receipt.order_id);
}

#[tokio::test]
async fn cleanup_failing_on_every_item_still_places_one_order() {
    let db = prepare_test_db().await;
    let alice = test_session("alice", &[]);
    let cart = CartApi::new(db.clone(), alice.clone());
    let item = cart.add(MenuItemRef::new("52772", "Teriyaki Chicken Casserole"), 2).await.unwrap();

    let orders = OrderFlowApi::new(FlakyCartStore::new(db.clone(), 0), alice, EventProducers::default());
    let receipt = orders.place_order_from_cart(&MockLocationProvider::default()).await.unwrap();
    assert_eq!(receipt.uncleared, vec![item.id.clone()]);
    assert_eq!(cart.list().await.unwrap().len(), 1);
    let history = orders.history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].line_items.len(), 1);
    assert_eq!(history[0].line_items[0].cart_item_id, item.id);
}
