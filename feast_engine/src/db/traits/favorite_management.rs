use crate::{
    db::traits::StoreError,
    db_types::{Favorite, FavoriteId, NewFavorite, UserId},
};

#[allow(async_fn_in_trait)]
pub trait FavoriteManagement {
    async fn insert_favorite(&self, favorite: NewFavorite) -> Result<Favorite, StoreError>;

    /// The owner's favorites, oldest first.
    async fn fetch_favorites(&self, owner: &UserId) -> Result<Vec<Favorite>, StoreError>;

    /// Favorites of `owner` that point at the given menu item. Usually zero or one.
    async fn fetch_favorites_for_item(&self, owner: &UserId, menu_item_id: &str) -> Result<Vec<Favorite>, StoreError>;

    async fn remove_favorite(&self, owner: &UserId, id: &FavoriteId) -> Result<bool, StoreError>;

    /// Removes every favorite of `owner` pointing at the menu item, returning how many were removed.
    async fn remove_favorites_for_item(&self, owner: &UserId, menu_item_id: &str) -> Result<u64, StoreError>;
}
