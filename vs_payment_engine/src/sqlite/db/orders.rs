use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;
use vsp_common::Money;

use crate::db_types::{NewOrderItem, Order, OrderStatusType};

/// Inserts a new order row. This is not atomic on its own; embed the call inside a transaction together with
/// [`insert_order_items`] and pass `&mut *tx` as the connection argument.
pub async fn insert_order(
    user_id: &str,
    total_amount: Money,
    total_items: i64,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (user_id, total_amount, total_items)
            VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(user_id)
    .bind(total_amount.value())
    .bind(total_items)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Order #{} inserted for user {user_id} ({total_amount})", order.id);
    Ok(order)
}

/// Writes the item snapshots for an order. `priced_items` pairs each submitted item with the catalog price at
/// order time.
pub async fn insert_order_items(
    order_id: i64,
    priced_items: &[(NewOrderItem, Money)],
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    for (item, price) in priced_items {
        sqlx::query(
            r#"
                INSERT INTO order_items (order_id, product_id, price, quantity)
                VALUES ($1, $2, $3, $4);
            "#,
        )
        .bind(order_id)
        .bind(item.product_id)
        .bind(price.value())
        .bind(item.quantity)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn fetch_order_by_id(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(order_id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_for_user(
    order_id: i64,
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1 AND user_id = $2")
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// Sets the order status. A `Completed` status also marks the order paid and stamps `paid_at`; every other
/// status leaves the paid flag untouched, preserving the `paid ⇒ COMPLETED` invariant.
pub async fn update_order_status(
    order_id: i64,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    let order = if status == OrderStatusType::Completed {
        sqlx::query_as(
            r#"
                UPDATE orders SET status = $1, paid = 1, paid_at = $2
                WHERE id = $3
                RETURNING *;
            "#,
        )
        .bind(status)
        .bind(Utc::now())
        .bind(order_id)
        .fetch_one(conn)
        .await?
    } else {
        sqlx::query_as("UPDATE orders SET status = $1 WHERE id = $2 RETURNING *;")
            .bind(status)
            .bind(order_id)
            .fetch_one(conn)
            .await?
    };
    Ok(order)
}
