//! # Inventory Repository
//!
//! Read access and seeding for inventory rows.
//!
//! Quantity mutations are the stock ledger's job (`crate::ledger`); this
//! module deliberately has no delta-applying function so there is exactly
//! one code path that can change a quantity.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;

/// Gets the quantity for one (store, product) pair.
///
/// `None` means the row was never referenced (distinct from `Some(0)`).
pub async fn get_quantity(
    conn: &mut SqliteConnection,
    store_id: &str,
    product_id: &str,
) -> DbResult<Option<i64>> {
    let quantity: Option<i64> = sqlx::query_scalar(
        "SELECT quantity FROM inventory WHERE store_id = ?1 AND product_id = ?2",
    )
    .bind(store_id)
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(quantity)
}

/// Sets an absolute quantity (stock takes / seeding).
///
/// This is the receiving/adjustment path, not the order path: orders and
/// requisitions always go through the ledger's delta application.
pub async fn set_quantity(
    conn: &mut SqliteConnection,
    store_id: &str,
    product_id: &str,
    quantity: i64,
) -> DbResult<()> {
    debug!(store_id = %store_id, product_id = %product_id, quantity = %quantity, "Setting inventory quantity");

    let now = Utc::now();

    sqlx::query(
        "INSERT INTO inventory (store_id, product_id, quantity, updated_at) \
         VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT (store_id, product_id) \
         DO UPDATE SET quantity = excluded.quantity, updated_at = excluded.updated_at",
    )
    .bind(store_id)
    .bind(product_id)
    .bind(quantity)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
