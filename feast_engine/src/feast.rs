use std::fmt::Debug;

use crate::{
    config::FeastConfig,
    db::traits::FeastDatabase,
    events::{EventHandlers, EventHooks, EventProducers},
    feast_api::{
        auth_api::AuthApi,
        cart_api::CartApi,
        favorites_api::FavoritesApi,
        order_flow_api::OrderFlowApi,
        reviews_api::ReviewsApi,
        session::Session,
        tracking_api::TrackingApi,
    },
    location::LocationProvider,
};

/// The assembled engine: a backend, its configuration and the event producers. Hands out API objects bound to a
/// session.
#[derive(Clone)]
pub struct Feast<B> {
    db: B,
    config: FeastConfig,
    producers: EventProducers,
}

impl<B> Debug for Feast<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Feast ({})", self.config.database_url)
    }
}

impl<B: FeastDatabase> Feast<B> {
    pub fn new(db: B, config: FeastConfig, producers: EventProducers) -> Self {
        Self { db, config, producers }
    }

    /// Builds the engine and starts a handler for each hook in `hooks`. Must be called from within a tokio runtime.
    pub fn with_hooks(db: B, config: FeastConfig, hooks: EventHooks) -> Self {
        let handlers = EventHandlers::new(config.event_buffer_size, hooks);
        let producers = handlers.producers();
        handlers.start_handlers();
        Self::new(db, config, producers)
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn config(&self) -> &FeastConfig {
        &self.config
    }

    pub fn auth(&self) -> AuthApi<B> {
        AuthApi::new(self.db.clone())
    }

    pub fn cart(&self, session: &Session) -> CartApi<B> {
        CartApi::new(self.db.clone(), session.clone())
    }

    pub fn orders(&self, session: &Session) -> OrderFlowApi<B> {
        OrderFlowApi::new(self.db.clone(), session.clone(), self.producers.clone())
            .with_delivery_restriction(self.config.restrict_delivery)
    }

    pub fn tracking<L: LocationProvider>(&self, location: L) -> TrackingApi<B, L> {
        TrackingApi::new(self.db.clone(), location).with_options(self.config.watch_options())
    }

    pub fn favorites(&self, session: &Session) -> FavoritesApi<B> {
        FavoritesApi::new(self.db.clone(), session.clone())
    }

    pub fn reviews(&self, session: &Session) -> ReviewsApi<B> {
        ReviewsApi::new(self.db.clone(), session.clone())
    }
}

#[cfg(feature = "sqlite")]
impl Feast<crate::SqliteDatabase> {
    /// Opens (and if need be creates) the SQLite store named in `config`, brings its schema up to date, and starts the
    /// event hooks.
    pub async fn connect(config: FeastConfig, hooks: EventHooks) -> Result<Self, crate::StoreError> {
        let db = crate::SqliteDatabase::from_config(&config).await?;
        db.migrate().await?;
        log::info!("🍜️ Feast engine connected to {}", config.database_url);
        Ok(Self::with_hooks(db, config, hooks))
    }
}
