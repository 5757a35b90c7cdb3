use std::collections::HashMap;

use cucumber::World;
use feast_common::Secret;
use feast_engine::{
    config::FeastConfig,
    db_types::{CartLineItem, Order, Role},
    test_utils::{
        mock_location::MockLocationProvider,
        prepare_env::{create_database, random_db_path, run_migrations},
    },
    CartApi,
    Feast,
    FeastApiError,
    OrderFlowApi,
    OrderTracking,
    PlacementReceipt,
    Session,
    SqliteDatabase,
    Subscription,
};
use log::*;

#[derive(Default, Debug, World)]
pub struct FeastWorld {
    pub system: Option<FeastSystem>,
    pub users: HashMap<String, Session>,
    pub last_receipt: Option<PlacementReceipt>,
    pub last_error: Option<FeastApiError>,
    /// Live handles opened by the scenario. They are released by the after-scenario hook at the latest.
    pub tracking: Option<OrderTracking>,
    pub cart_watch: Option<Subscription<Vec<CartLineItem>>>,
}

#[derive(Debug)]
pub struct FeastSystem {
    pub db_path: String,
    pub feast: Feast<SqliteDatabase>,
    pub location: MockLocationProvider,
}

impl FeastWorld {
    pub fn system(&self) -> &FeastSystem {
        self.system.as_ref().expect("Feast system not initialised")
    }

    pub fn session(&self, name: &str) -> &Session {
        self.users.get(name).unwrap_or_else(|| panic!("No user called {name}"))
    }

    pub fn cart(&self, name: &str) -> CartApi<SqliteDatabase> {
        self.system().feast.cart(self.session(name))
    }

    pub fn orders(&self, name: &str) -> OrderFlowApi<SqliteDatabase> {
        self.system().feast.orders(self.session(name))
    }

    pub async fn cart_item(&self, name: &str, menu_item_id: &str) -> CartLineItem {
        let cart = self.cart(name).list().await.expect("Error fetching cart");
        cart.into_iter()
            .find(|i| i.menu_item.id == menu_item_id)
            .unwrap_or_else(|| panic!("Menu item {menu_item_id} is not in the cart of {name}"))
    }

    pub async fn last_order(&self) -> Order {
        let receipt = self.last_receipt.as_ref().expect("No order has been placed");
        let db = self.system().feast.db();
        feast_engine::OrderManagement::fetch_order(db, &receipt.order_id)
            .await
            .expect("Error fetching order")
            .expect("The placed order does not exist")
    }

    /// Stops the tracking feed and closes every live query the scenario opened.
    pub async fn release_live_views(&mut self) {
        if let Some(tracking) = self.tracking.take() {
            let route = tracking.stop().await.map(|s| s.route.len()).unwrap_or_default();
            debug!("🚀️ Tracking view closed with {route} route samples");
        }
        if let Some(watch) = self.cart_watch.take() {
            watch.close().await;
        }
    }

    pub async fn sign_up(&mut self, name: &str, roles: &[Role]) {
        let auth = self.system().feast.auth();
        let email = format!("{name}@example.com");
        let session =
            auth.sign_up(name, &email, &Secret::from("correct horse battery")).await.expect("Error signing up");
        let session = if roles.is_empty() {
            session
        } else {
            auth.assign_roles(&session.user_id, roles).await.expect("Error assigning roles");
            auth.current_user(&session.token).await.expect("Error refreshing session")
        };
        debug!("🚀️ {name} signed up as {}", session.user_id);
        self.users.insert(name.to_string(), session);
    }
}

impl FeastSystem {
    pub async fn new() -> Self {
        let url = random_db_path();
        create_database(&url).await;
        run_migrations(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
        debug!("Created database: {url}");
        let feast = Feast::new(db, FeastConfig::new_with_url(&url), Default::default());
        Self { db_path: url, feast, location: MockLocationProvider::default() }
    }
}
