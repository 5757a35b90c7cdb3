use std::collections::HashMap;

use chrono::{DateTime, Utc};
use feast_common::{Coordinate, MenuItemRef};
use log::*;
use sqlx::{FromRow, SqliteConnection};

use crate::db_types::{CartItemId, NewOrder, Order, OrderId, OrderLineItem, OrderStatusType, UserId};

#[derive(FromRow)]
struct OrderRow {
    id: OrderId,
    owner_id: UserId,
    status: String,
    placed_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    pickup_latitude: f64,
    pickup_longitude: f64,
}

#[derive(FromRow)]
struct LineItemRow {
    order_id: OrderId,
    cart_item_id: CartItemId,
    menu_item_id: String,
    menu_item_name: String,
    quantity: i64,
}

impl From<LineItemRow> for OrderLineItem {
    fn from(row: LineItemRow) -> Self {
        Self {
            cart_item_id: row.cart_item_id,
            menu_item: MenuItemRef::new(row.menu_item_id, row.menu_item_name),
            quantity: row.quantity,
        }
    }
}

impl OrderRow {
    fn into_order(self, line_items: Vec<OrderLineItem>) -> Order {
        Order {
            id: self.id,
            owner_id: self.owner_id,
            line_items,
            status: OrderStatusType::from(self.status),
            placed_at: self.placed_at,
            updated_at: self.updated_at,
            pickup_location: Coordinate { latitude: self.pickup_latitude, longitude: self.pickup_longitude },
        }
    }
}

/// Inserts the order header and its line items using the given connection. This is not atomic on its own. Call it
/// inside a transaction and pass `&mut *tx` as the connection argument.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let now = Utc::now();
    let row: OrderRow = sqlx::query_as(
        r#"
            INSERT INTO orders (id, owner_id, status, placed_at, updated_at, pickup_latitude, pickup_longitude)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(OrderId::random())
    .bind(order.owner_id)
    .bind(OrderStatusType::Placed.to_string())
    .bind(now)
    .bind(now)
    .bind(order.pickup_location.latitude)
    .bind(order.pickup_location.longitude)
    .fetch_one(&mut *conn)
    .await?;
    for (position, item) in order.line_items.iter().enumerate() {
        #[allow(clippy::cast_possible_wrap)]
        let position = position as i64;
        sqlx::query(
            r#"
                INSERT INTO order_line_items (order_id, position, cart_item_id, menu_item_id, menu_item_name, quantity)
                VALUES ($1, $2, $3, $4, $5, $6);
            "#,
        )
        .bind(row.id.as_str())
        .bind(position)
        .bind(item.cart_item_id.as_str())
        .bind(item.menu_item.id.as_str())
        .bind(item.menu_item.name.as_str())
        .bind(item.quantity)
        .execute(&mut *conn)
        .await?;
    }
    debug!("📝️ Order {} inserted with {} line items", row.id, order.line_items.len());
    Ok(row.into_order(order.line_items))
}

pub async fn fetch_order(id: &OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let row: Option<OrderRow> =
        sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id.as_str()).fetch_optional(&mut *conn).await?;
    match row {
        Some(row) => {
            let items: Vec<LineItemRow> =
                sqlx::query_as("SELECT * FROM order_line_items WHERE order_id = $1 ORDER BY position")
                    .bind(id.as_str())
                    .fetch_all(&mut *conn)
                    .await?;
            Ok(Some(row.into_order(items.into_iter().map(OrderLineItem::from).collect())))
        },
        None => Ok(None),
    }
}

/// Orders for the user, oldest first, with their line items.
pub async fn fetch_orders_for_user(owner: &UserId, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let rows: Vec<OrderRow> = sqlx::query_as("SELECT * FROM orders WHERE owner_id = $1 ORDER BY placed_at, rowid")
        .bind(owner.as_str())
        .fetch_all(&mut *conn)
        .await?;
    let items: Vec<LineItemRow> = sqlx::query_as(
        r#"
            SELECT order_line_items.* FROM order_line_items
            JOIN orders ON orders.id = order_line_items.order_id
            WHERE orders.owner_id = $1
            ORDER BY order_line_items.order_id, order_line_items.position
        "#,
    )
    .bind(owner.as_str())
    .fetch_all(&mut *conn)
    .await?;
    let mut items_by_order = HashMap::<OrderId, Vec<OrderLineItem>>::new();
    for item in items {
        items_by_order.entry(item.order_id.clone()).or_default().push(item.into());
    }
    let orders = rows
        .into_iter()
        .map(|row| {
            let line_items = items_by_order.remove(&row.id).unwrap_or_default();
            row.into_order(line_items)
        })
        .collect();
    Ok(orders)
}

/// Sets the order status unless the order is already delivered. Returns the order as it was before the update.
pub async fn update_order_status(
    id: &OrderId,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let old = match fetch_order(id, &mut *conn).await? {
        Some(o) => o,
        None => return Ok(None),
    };
    if old.status.is_terminal() || old.status == status {
        trace!("📝️ Order {id} is already {}. Status not updated to {status}", old.status);
        return Ok(Some(old));
    }
    let result = sqlx::query("UPDATE orders SET status = $1, updated_at = $2 WHERE id = $3 AND status <> 'Delivered'")
        .bind(status.to_string())
        .bind(Utc::now())
        .bind(id.as_str())
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        // Someone else delivered it in the meantime. Report what is there now, so that the caller sees no change.
        return fetch_order(id, conn).await;
    }
    debug!("📝️ Order {id} status changed from {} to {status}", old.status);
    Ok(Some(old))
}
