//! # Stock & Balance Ledgers
//!
//! The single chokepoint for every inventory-quantity and customer-balance
//! mutation in the system. Orchestrators never UPDATE those rows directly;
//! they hand signed deltas to this module inside their transaction.
//!
//! ## Delta Application
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Stock Ledger: apply_stock                           │
//! │                                                                         │
//! │  Caller's transaction (the lock scope)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT quantity FROM inventory WHERE (store, product)                 │
//! │       │                                                                 │
//! │       ├── row absent? INSERT (store, product, 0)  ← lazy creation      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  new_quantity = quantity + delta                                       │
//! │       │                                                                 │
//! │       ├── new_quantity < 0 → Err(InsufficientStock) → tx rolls back    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE inventory SET quantity = new_quantity                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  return new_quantity                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Delta Updates?
//! Two concurrent orders touching the same (store, product) row serialize on
//! the database writer lock; the later committer observes the earlier's
//! decrement before its own non-negativity check. That is what prevents
//! overselling - an absolute `SET quantity = n` would silently lose the
//! concurrent decrement.
//!
//! ## Lock Ordering
//! When one logical operation touches several rows, callers pass deltas in
//! ascending (store_id, product_id) order - the differ already emits them
//! sorted. On the SQLite backend writers serialize on the whole database, so
//! the fixed order is about determinism; on a row-locking backend it is what
//! prevents deadlocks between concurrent multi-row operations.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use atlas_core::diff::QuantityDelta;

use crate::error::{DbError, DbResult};

// =============================================================================
// Stock Ledger
// =============================================================================

/// Applies a signed quantity delta to one (store, product) inventory row.
///
/// Runs on the caller's transaction connection: the mutation is staged, not
/// committed. The inventory row is created at quantity 0 if it doesn't exist
/// yet (rows are never deleted afterwards, only zeroed).
///
/// ## Returns
/// The new quantity after the delta.
///
/// ## Errors
/// `DbError::InsufficientStock` if the delta would take the quantity below
/// zero; the row is left untouched and the enclosing transaction is expected
/// to roll back.
pub async fn apply_stock(
    conn: &mut SqliteConnection,
    store_id: &str,
    product_id: &str,
    delta: i64,
) -> DbResult<i64> {
    let now = Utc::now();

    let current: Option<i64> = sqlx::query_scalar(
        "SELECT quantity FROM inventory WHERE store_id = ?1 AND product_id = ?2",
    )
    .bind(store_id)
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;

    let current = match current {
        Some(quantity) => quantity,
        None => {
            // Lazy creation on first reference
            sqlx::query(
                "INSERT INTO inventory (store_id, product_id, quantity, updated_at) \
                 VALUES (?1, ?2, 0, ?3)",
            )
            .bind(store_id)
            .bind(product_id)
            .bind(now)
            .execute(&mut *conn)
            .await?;
            0
        }
    };

    let new_quantity = current + delta;
    if new_quantity < 0 {
        return Err(DbError::InsufficientStock {
            store_id: store_id.to_string(),
            product_id: product_id.to_string(),
            available: current,
            requested: -delta,
        });
    }

    sqlx::query(
        "UPDATE inventory SET quantity = ?3, updated_at = ?4 \
         WHERE store_id = ?1 AND product_id = ?2",
    )
    .bind(store_id)
    .bind(product_id)
    .bind(new_quantity)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    debug!(
        store_id = %store_id,
        product_id = %product_id,
        delta = %delta,
        new_quantity = %new_quantity,
        "Applied stock delta"
    );

    Ok(new_quantity)
}

/// Applies a batch of differ deltas against one store.
///
/// Deltas must already be in ascending product order (the differ emits them
/// that way); each is applied through [`apply_stock`], so the first delta
/// that would go negative aborts the batch and the enclosing transaction.
pub async fn apply_stock_deltas(
    conn: &mut SqliteConnection,
    store_id: &str,
    deltas: &[QuantityDelta],
) -> DbResult<()> {
    for delta in deltas {
        apply_stock(conn, store_id, &delta.product_id, delta.delta).await?;
    }
    Ok(())
}

// =============================================================================
// Customer Balance Ledger
// =============================================================================

/// Applies a signed cents delta to one customer's balance.
///
/// Runs on the caller's transaction connection. Unlike stock, balances may
/// go negative (credit purchases); the credit limit is informational and not
/// enforced here.
///
/// ## Returns
/// The new balance after the delta.
///
/// ## Errors
/// `DbError::NotFound` if the customer doesn't exist.
pub async fn apply_balance(
    conn: &mut SqliteConnection,
    customer_id: &str,
    delta_cents: i64,
) -> DbResult<i64> {
    let now = Utc::now();

    let current: Option<i64> =
        sqlx::query_scalar("SELECT balance_cents FROM customers WHERE id = ?1")
            .bind(customer_id)
            .fetch_optional(&mut *conn)
            .await?;

    let current = current.ok_or_else(|| DbError::not_found("Customer", customer_id))?;

    let new_balance = current + delta_cents;

    sqlx::query("UPDATE customers SET balance_cents = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(customer_id)
        .bind(new_balance)
        .bind(now)
        .execute(&mut *conn)
        .await?;

    debug!(
        customer_id = %customer_id,
        delta_cents = %delta_cents,
        new_balance = %new_balance,
        "Applied balance delta"
    );

    Ok(new_balance)
}

// =============================================================================
// Unit Tests
// =============================================================================
