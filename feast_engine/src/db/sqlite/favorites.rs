use chrono::{DateTime, Utc};
use feast_common::MenuItemRef;
use sqlx::{FromRow, SqliteConnection};

use crate::db_types::{Favorite, FavoriteId, NewFavorite, UserId};

#[derive(FromRow)]
struct FavoriteRow {
    id: FavoriteId,
    owner_id: UserId,
    menu_item_id: String,
    menu_item_name: String,
    thumbnail: Option<String>,
    favorited_at: DateTime<Utc>,
}

impl From<FavoriteRow> for Favorite {
    fn from(row: FavoriteRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            menu_item: MenuItemRef::new(row.menu_item_id, row.menu_item_name),
            thumbnail: row.thumbnail,
            favorited_at: row.favorited_at,
        }
    }
}

pub async fn insert_favorite(favorite: NewFavorite, conn: &mut SqliteConnection) -> Result<Favorite, sqlx::Error> {
    let row: FavoriteRow = sqlx::query_as(
        r#"
            INSERT INTO favorites (id, owner_id, menu_item_id, menu_item_name, thumbnail, favorited_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(FavoriteId::random())
    .bind(favorite.owner_id)
    .bind(favorite.menu_item.id)
    .bind(favorite.menu_item.name)
    .bind(favorite.thumbnail)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    Ok(row.into())
}

pub async fn fetch_favorites(owner: &UserId, conn: &mut SqliteConnection) -> Result<Vec<Favorite>, sqlx::Error> {
    let rows: Vec<FavoriteRow> =
        sqlx::query_as("SELECT * FROM favorites WHERE owner_id = $1 ORDER BY favorited_at, rowid")
            .bind(owner.as_str())
            .fetch_all(conn)
            .await?;
    Ok(rows.into_iter().map(Favorite::from).collect())
}

pub async fn fetch_favorites_for_item(
    owner: &UserId,
    menu_item_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Favorite>, sqlx::Error> {
    let rows: Vec<FavoriteRow> =
        sqlx::query_as("SELECT * FROM favorites WHERE owner_id = $1 AND menu_item_id = $2 ORDER BY favorited_at, rowid")
            .bind(owner.as_str())
            .bind(menu_item_id)
            .fetch_all(conn)
            .await?;
    Ok(rows.into_iter().map(Favorite::from).collect())
}

pub async fn remove_favorite(owner: &UserId, id: &FavoriteId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM favorites WHERE owner_id = $1 AND id = $2")
        .bind(owner.as_str())
        .bind(id.as_str())
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn remove_favorites_for_item(
    owner: &UserId,
    menu_item_id: &str,
    conn: &mut SqliteConnection,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM favorites WHERE owner_id = $1 AND menu_item_id = $2")
        .bind(owner.as_str())
        .bind(menu_item_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}
