//! # Order Repository
//!
//! Persistence for orders and their line items.
//!
//! ## Item Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create:  insert_order() + insert_items()                              │
//! │  update:  delete_items() + insert_items()   ← wholesale replacement    │
//! │  delete:  delete_items() + delete_order()                              │
//! │                                                                         │
//! │  Items are never patched individually; the service recomputes the      │
//! │  whole set so the differ's invariants stay intact.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use atlas_core::{Order, OrderItem};

use crate::error::{DbError, DbResult};

/// Inserts an order header.
pub async fn insert_order(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
    debug!(id = %order.id, customer_id = %order.customer_id, "Inserting order");

    sqlx::query(
        "INSERT INTO orders \
         (id, customer_id, store_id, status, total_cents, notes, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )
    .bind(&order.id)
    .bind(&order.customer_id)
    .bind(&order.store_id)
    .bind(order.status)
    .bind(order.total_cents)
    .bind(&order.notes)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Gets an order header by ID.
pub async fn get_order(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(
        "SELECT id, customer_id, store_id, status, total_cents, notes, created_at, updated_at \
         FROM orders WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(order)
}

/// Updates the mutable order header fields.
///
/// ## Errors
/// `DbError::NotFound` if the order doesn't exist.
pub async fn update_order(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
    let result = sqlx::query(
        "UPDATE orders SET \
             customer_id = ?2, \
             status = ?3, \
             total_cents = ?4, \
             notes = ?5, \
             updated_at = ?6 \
         WHERE id = ?1",
    )
    .bind(&order.id)
    .bind(&order.customer_id)
    .bind(order.status)
    .bind(order.total_cents)
    .bind(&order.notes)
    .bind(order.updated_at)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Order", &order.id));
    }

    Ok(())
}

/// Deletes an order header.
///
/// Items must be deleted first (the service does, after returning their
/// stock through the ledger).
pub async fn delete_order(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
    let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Order", id));
    }

    Ok(())
}

/// Inserts a batch of line items.
pub async fn insert_items(conn: &mut SqliteConnection, items: &[OrderItem]) -> DbResult<()> {
    for item in items {
        sqlx::query(
            "INSERT INTO order_items \
             (id, order_id, product_id, quantity, unit_price_cents, line_total_cents, position) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&item.id)
        .bind(&item.order_id)
        .bind(&item.product_id)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.line_total_cents)
        .bind(item.position)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Gets all line items for an order in submitted order.
pub async fn get_items(conn: &mut SqliteConnection, order_id: &str) -> DbResult<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT id, order_id, product_id, quantity, unit_price_cents, line_total_cents, position \
         FROM order_items WHERE order_id = ?1 ORDER BY position",
    )
    .bind(order_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(items)
}

/// Deletes all line items for an order (the wholesale-replacement path).
pub async fn delete_items(conn: &mut SqliteConnection, order_id: &str) -> DbResult<()> {
    sqlx::query("DELETE FROM order_items WHERE order_id = ?1")
        .bind(order_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Helper to generate a new order ID.
pub fn generate_order_id() -> String {
    Uuid::new_v4().to_string()
}

/// Helper to generate a new order item ID.
pub fn generate_order_item_id() -> String {
    Uuid::new_v4().to_string()
}
