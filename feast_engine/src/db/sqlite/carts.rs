use chrono::{DateTime, Utc};
use feast_common::MenuItemRef;
use log::*;
use sqlx::{FromRow, SqliteConnection};

use crate::db_types::{CartItemId, CartLineItem, NewCartLineItem, UserId};

#[derive(FromRow)]
struct CartRow {
    id: CartItemId,
    owner_id: UserId,
    menu_item_id: String,
    menu_item_name: String,
    quantity: i64,
    added_at: DateTime<Utc>,
}

impl From<CartRow> for CartLineItem {
    fn from(row: CartRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            menu_item: MenuItemRef::new(row.menu_item_id, row.menu_item_name),
            quantity: row.quantity,
            added_at: row.added_at,
        }
    }
}

pub async fn insert_item(item: NewCartLineItem, conn: &mut SqliteConnection) -> Result<CartLineItem, sqlx::Error> {
    let row: CartRow = sqlx::query_as(
        r#"
            INSERT INTO carts (id, owner_id, menu_item_id, menu_item_name, quantity, added_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(CartItemId::random())
    .bind(item.owner_id)
    .bind(item.menu_item.id)
    .bind(item.menu_item.name)
    .bind(item.quantity)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    trace!("🛒️ Cart item {} added for {}", row.id, row.owner_id);
    Ok(row.into())
}

pub async fn fetch_cart(owner: &UserId, conn: &mut SqliteConnection) -> Result<Vec<CartLineItem>, sqlx::Error> {
    let rows: Vec<CartRow> = sqlx::query_as("SELECT * FROM carts WHERE owner_id = $1 ORDER BY added_at, rowid")
        .bind(owner.as_str())
        .fetch_all(conn)
        .await?;
    Ok(rows.into_iter().map(CartLineItem::from).collect())
}

pub async fn fetch_item(
    owner: &UserId,
    id: &CartItemId,
    conn: &mut SqliteConnection,
) -> Result<Option<CartLineItem>, sqlx::Error> {
    let row: Option<CartRow> = sqlx::query_as("SELECT * FROM carts WHERE owner_id = $1 AND id = $2")
        .bind(owner.as_str())
        .bind(id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(row.map(CartLineItem::from))
}

pub async fn update_quantity(
    owner: &UserId,
    id: &CartItemId,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<CartLineItem>, sqlx::Error> {
    let row: Option<CartRow> =
        sqlx::query_as("UPDATE carts SET quantity = $1 WHERE owner_id = $2 AND id = $3 RETURNING *")
            .bind(quantity)
            .bind(owner.as_str())
            .bind(id.as_str())
            .fetch_optional(conn)
            .await?;
    Ok(row.map(CartLineItem::from))
}

pub async fn remove_item(owner: &UserId, id: &CartItemId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM carts WHERE owner_id = $1 AND id = $2")
        .bind(owner.as_str())
        .bind(id.as_str())
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
