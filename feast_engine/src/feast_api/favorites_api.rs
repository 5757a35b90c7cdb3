use std::fmt::Debug;

use feast_common::MenuItemRef;
use log::*;

use crate::{
    db::traits::{FavoriteManagement, LiveQueries},
    db_types::{Favorite, FavoriteId, NewFavorite},
    feast_api::{errors::FeastApiError, session::Session},
    subscription::Subscription,
};

pub struct FavoritesApi<B> {
    db: B,
    session: Session,
}

impl<B> Debug for FavoritesApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FavoritesApi ({})", self.session.user_id)
    }
}

impl<B> FavoritesApi<B> {
    pub fn new(db: B, session: Session) -> Self {
        Self { db, session }
    }
}

impl<B> FavoritesApi<B>
where B: FavoriteManagement + LiveQueries
{
    pub async fn list(&self) -> Result<Vec<Favorite>, FeastApiError> {
        Ok(self.db.fetch_favorites(&self.session.user_id).await?)
    }

    pub async fn watch(&self) -> Result<Subscription<Vec<Favorite>>, FeastApiError> {
        Ok(self.db.watch_favorites(&self.session.user_id).await?)
    }

    pub async fn is_favorite(&self, menu_item_id: &str) -> Result<bool, FeastApiError> {
        let matches = self.db.fetch_favorites_for_item(&self.session.user_id, menu_item_id).await?;
        Ok(!matches.is_empty())
    }

    /// Favorites the menu item if it is not a favorite yet. Otherwise removes every favorite pointing at it.
    /// Returns whether the item is a favorite afterwards.
    pub async fn toggle(&self, menu_item: MenuItemRef, thumbnail: Option<String>) -> Result<bool, FeastApiError> {
        let owner = &self.session.user_id;
        let removed = self.db.remove_favorites_for_item(owner, &menu_item.id).await?;
        if removed > 0 {
            debug!("⭐️ {menu_item} is no longer a favorite of {owner}");
            return Ok(false);
        }
        let favorite = NewFavorite { owner_id: owner.clone(), menu_item, thumbnail };
        let favorite = self.db.insert_favorite(favorite).await?;
        debug!("⭐️ {} is now a favorite of {owner}", favorite.menu_item);
        Ok(true)
    }

    /// Removes a favorite. Returns `false` if it was already gone.
    pub async fn remove(&self, id: &FavoriteId) -> Result<bool, FeastApiError> {
        Ok(self.db.remove_favorite(&self.session.user_id, id).await?)
    }
}
