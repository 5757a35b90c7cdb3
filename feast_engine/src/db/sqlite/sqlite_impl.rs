//! `SqliteDatabase` is the bundled Feast backend.
//!
//! It implements every trait in [`crate::db::traits`], and publishes a [`StoreChange`] after each committed write so
//! that live queries stay current.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate, SqlitePool};
use tokio::sync::broadcast;

use super::{carts, db_url, favorites, live_query::spawn_live_query, new_pool, orders, reviews, users};
use crate::{
    config::{FeastConfig, DEFAULT_CHANGE_FEED_CAPACITY},
    db::traits::{
        AuthManagement,
        CartManagement,
        Collection,
        FavoriteManagement,
        FeastDatabase,
        LiveQueries,
        OrderManagement,
        ReviewManagement,
        StoreChange,
        StoreError,
    },
    db_types::{
        CartItemId,
        CartLineItem,
        DocumentState,
        Favorite,
        FavoriteId,
        NewCartLineItem,
        NewFavorite,
        NewOrder,
        NewReview,
        NewUser,
        Order,
        OrderId,
        OrderStatusType,
        Review,
        Role,
        SessionToken,
        UserCredentials,
        UserId,
        UserProfile,
    },
    subscription::Subscription,
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
    changes: broadcast::Sender<StoreChange>,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using `FEAST_DATABASE_URL`
    pub async fn new(max_connections: u32) -> Result<Self, StoreError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        Self::new_with_capacity(url, max_connections, DEFAULT_CHANGE_FEED_CAPACITY).await
    }

    pub async fn from_config(config: &FeastConfig) -> Result<Self, StoreError> {
        Self::new_with_capacity(&config.database_url, config.max_connections, config.change_feed_capacity).await
    }

    async fn new_with_capacity(url: &str, max_connections: u32, capacity: usize) -> Result<Self, StoreError> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let (changes, _) = broadcast::channel(capacity.max(1));
        Ok(Self { url: url.to_string(), pool, changes })
    }

    /// Brings the schema up to date.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        migrate!("./src/db/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// The number of live queries currently attached to the change feed.
    pub fn change_feed_listeners(&self) -> usize {
        self.changes.receiver_count()
    }

    fn publish(&self, change: StoreChange) {
        trace!("🗃️ {} document {} changed", change.collection, change.document_id);
        // An error only means that nobody is listening right now
        let _ = self.changes.send(change);
    }
}

impl FeastDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        self.pool.close().await;
        Ok(())
    }
}

impl CartManagement for SqliteDatabase {
    async fn insert_cart_item(&self, item: NewCartLineItem) -> Result<CartLineItem, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let item = carts::insert_item(item, &mut conn).await?;
        self.publish(StoreChange::new(Collection::Carts, Some(item.owner_id.clone()), item.id.as_str()));
        Ok(item)
    }

    async fn fetch_cart(&self, owner: &UserId) -> Result<Vec<CartLineItem>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(carts::fetch_cart(owner, &mut conn).await?)
    }

    async fn fetch_cart_item(&self, owner: &UserId, id: &CartItemId) -> Result<Option<CartLineItem>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(carts::fetch_item(owner, id, &mut conn).await?)
    }

    async fn update_cart_item_quantity(
        &self,
        owner: &UserId,
        id: &CartItemId,
        quantity: i64,
    ) -> Result<Option<CartLineItem>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let item = carts::update_quantity(owner, id, quantity, &mut conn).await?;
        if item.is_some() {
            self.publish(StoreChange::new(Collection::Carts, Some(owner.clone()), id.as_str()));
        }
        Ok(item)
    }

    async fn remove_cart_item(&self, owner: &UserId, id: &CartItemId) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let removed = carts::remove_item(owner, id, &mut conn).await?;
        if removed {
            self.publish(StoreChange::new(Collection::Carts, Some(owner.clone()), id.as_str()));
        }
        Ok(removed)
    }
}

impl OrderManagement for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(order, &mut tx).await?;
        tx.commit().await?;
        self.publish(StoreChange::new(Collection::Orders, Some(order.owner_id.clone()), order.id.as_str()));
        Ok(order)
    }

    async fn fetch_order(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order(id, &mut conn).await?)
    }

    async fn fetch_orders_for_user(&self, owner: &UserId) -> Result<Vec<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_orders_for_user(owner, &mut conn).await?)
    }

    async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatusType,
    ) -> Result<Option<Order>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let old = orders::update_order_status(id, status, &mut tx).await?;
        tx.commit().await?;
        if let Some(order) = old.as_ref().filter(|o| o.status != status) {
            self.publish(StoreChange::new(Collection::Orders, Some(order.owner_id.clone()), id.as_str()));
        }
        Ok(old)
    }
}

impl FavoriteManagement for SqliteDatabase {
    async fn insert_favorite(&self, favorite: NewFavorite) -> Result<Favorite, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let favorite = favorites::insert_favorite(favorite, &mut conn).await?;
        self.publish(StoreChange::new(Collection::Favorites, Some(favorite.owner_id.clone()), favorite.id.as_str()));
        Ok(favorite)
    }

    async fn fetch_favorites(&self, owner: &UserId) -> Result<Vec<Favorite>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(favorites::fetch_favorites(owner, &mut conn).await?)
    }

    async fn fetch_favorites_for_item(&self, owner: &UserId, menu_item_id: &str) -> Result<Vec<Favorite>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(favorites::fetch_favorites_for_item(owner, menu_item_id, &mut conn).await?)
    }

    async fn remove_favorite(&self, owner: &UserId, id: &FavoriteId) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let removed = favorites::remove_favorite(owner, id, &mut conn).await?;
        if removed {
            self.publish(StoreChange::new(Collection::Favorites, Some(owner.clone()), id.as_str()));
        }
        Ok(removed)
    }

    async fn remove_favorites_for_item(&self, owner: &UserId, menu_item_id: &str) -> Result<u64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let removed = favorites::remove_favorites_for_item(owner, menu_item_id, &mut conn).await?;
        if removed > 0 {
            self.publish(StoreChange::new(Collection::Favorites, Some(owner.clone()), menu_item_id));
        }
        Ok(removed)
    }
}

impl ReviewManagement for SqliteDatabase {
    async fn insert_review(&self, review: NewReview) -> Result<Review, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let review = reviews::insert_review(review, &mut conn).await?;
        self.publish(StoreChange::new(Collection::Reviews, None, review.id.as_str()));
        Ok(review)
    }

    async fn fetch_reviews(&self, catalog_item_id: &str) -> Result<Vec<Review>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(reviews::fetch_reviews(catalog_item_id, &mut conn).await?)
    }
}

impl AuthManagement for SqliteDatabase {
    async fn create_user(&self, user: NewUser) -> Result<UserProfile, StoreError> {
        let mut tx = self.pool.begin().await?;
        let profile = users::insert_user(user, &mut tx).await?;
        users::assign_roles(&profile.uid, &[Role::Customer], &mut tx).await?;
        tx.commit().await?;
        self.publish(StoreChange::new(Collection::Users, Some(profile.uid.clone()), profile.uid.as_str()));
        Ok(profile)
    }

    async fn fetch_credentials(&self, email: &str) -> Result<Option<UserCredentials>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::fetch_credentials(email, &mut conn).await?)
    }

    async fn fetch_user_profile(&self, uid: &UserId) -> Result<Option<UserProfile>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::fetch_profile(uid, &mut conn).await?)
    }

    async fn create_session(&self, uid: &UserId) -> Result<SessionToken, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::insert_session(uid, &mut conn).await?)
    }

    async fn session_user(&self, token: &SessionToken) -> Result<Option<UserId>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::session_user(token, &mut conn).await?)
    }

    async fn delete_session(&self, token: &SessionToken) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::delete_session(token, &mut conn).await?)
    }

    async fn fetch_roles(&self, uid: &UserId) -> Result<Vec<Role>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        users::roles_for_user(uid, &mut conn).await
    }

    async fn assign_roles(&self, uid: &UserId, roles: &[Role]) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        users::assign_roles(uid, roles, &mut conn).await?;
        self.publish(StoreChange::new(Collection::Users, Some(uid.clone()), uid.as_str()));
        Ok(())
    }
}

impl LiveQueries for SqliteDatabase {
    async fn watch_cart(&self, owner: &UserId) -> Result<Subscription<Vec<CartLineItem>>, StoreError> {
        let scope = owner.clone();
        let owner = owner.clone();
        spawn_live_query(
            "cart",
            self.pool.clone(),
            &self.changes,
            move |change| change.affects(Collection::Carts, &scope),
            move |pool| {
                let owner = owner.clone();
                async move {
                    let mut conn = pool.acquire().await?;
                    Ok::<_, StoreError>(carts::fetch_cart(&owner, &mut conn).await?)
                }
            },
        )
        .await
    }

    async fn watch_order(&self, id: &OrderId) -> Result<Subscription<DocumentState<Order>>, StoreError> {
        let scope = id.clone();
        let id = id.clone();
        spawn_live_query(
            "order",
            self.pool.clone(),
            &self.changes,
            move |change| change.affects_document(Collection::Orders, scope.as_str()),
            move |pool| {
                let id = id.clone();
                async move {
                    let mut conn = pool.acquire().await?;
                    Ok::<_, StoreError>(DocumentState::from(orders::fetch_order(&id, &mut conn).await?))
                }
            },
        )
        .await
    }

    async fn watch_orders_for_user(&self, owner: &UserId) -> Result<Subscription<Vec<Order>>, StoreError> {
        let scope = owner.clone();
        let owner = owner.clone();
        spawn_live_query(
            "order history",
            self.pool.clone(),
            &self.changes,
            move |change| change.affects(Collection::Orders, &scope),
            move |pool| {
                let owner = owner.clone();
                async move {
                    let mut conn = pool.acquire().await?;
                    Ok::<_, StoreError>(orders::fetch_orders_for_user(&owner, &mut conn).await?)
                }
            },
        )
        .await
    }

    async fn watch_favorites(&self, owner: &UserId) -> Result<Subscription<Vec<Favorite>>, StoreError> {
        let scope = owner.clone();
        let owner = owner.clone();
        spawn_live_query(
            "favorites",
            self.pool.clone(),
            &self.changes,
            move |change| change.affects(Collection::Favorites, &scope),
            move |pool| {
                let owner = owner.clone();
                async move {
                    let mut conn = pool.acquire().await?;
                    Ok::<_, StoreError>(favorites::fetch_favorites(&owner, &mut conn).await?)
                }
            },
        )
        .await
    }
}
