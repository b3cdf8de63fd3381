//! # Requisition Repository
//!
//! Persistence for stock requisitions and their items. Requisition items are
//! immutable once created; only the header's status / approved_by change.

use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use atlas_core::{RequisitionItem, StockRequisition};

use crate::error::{DbError, DbResult};

/// Inserts a requisition header.
pub async fn insert_requisition(
    conn: &mut SqliteConnection,
    requisition: &StockRequisition,
) -> DbResult<()> {
    debug!(
        id = %requisition.id,
        from = %requisition.from_store_id,
        to = %requisition.to_store_id,
        "Inserting requisition"
    );

    sqlx::query(
        "INSERT INTO stock_requisitions \
         (id, from_store_id, to_store_id, status, approved_by, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(&requisition.id)
    .bind(&requisition.from_store_id)
    .bind(&requisition.to_store_id)
    .bind(requisition.status)
    .bind(&requisition.approved_by)
    .bind(requisition.created_at)
    .bind(requisition.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Gets a requisition header by ID.
pub async fn get_requisition(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<StockRequisition>> {
    let requisition = sqlx::query_as::<_, StockRequisition>(
        "SELECT id, from_store_id, to_store_id, status, approved_by, created_at, updated_at \
         FROM stock_requisitions WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(requisition)
}

/// Updates the mutable requisition header fields (status, approved_by).
///
/// ## Errors
/// `DbError::NotFound` if the requisition doesn't exist.
pub async fn update_requisition(
    conn: &mut SqliteConnection,
    requisition: &StockRequisition,
) -> DbResult<()> {
    let result = sqlx::query(
        "UPDATE stock_requisitions SET \
             status = ?2, \
             approved_by = ?3, \
             updated_at = ?4 \
         WHERE id = ?1",
    )
    .bind(&requisition.id)
    .bind(requisition.status)
    .bind(&requisition.approved_by)
    .bind(requisition.updated_at)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("StockRequisition", &requisition.id));
    }

    Ok(())
}

/// Inserts a batch of requisition items.
pub async fn insert_items(
    conn: &mut SqliteConnection,
    items: &[RequisitionItem],
) -> DbResult<()> {
    for item in items {
        sqlx::query(
            "INSERT INTO requisition_items (id, requisition_id, product_id, quantity) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&item.id)
        .bind(&item.requisition_id)
        .bind(&item.product_id)
        .bind(item.quantity)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Gets all items for a requisition, ascending by product id.
pub async fn get_items(
    conn: &mut SqliteConnection,
    requisition_id: &str,
) -> DbResult<Vec<RequisitionItem>> {
    let items = sqlx::query_as::<_, RequisitionItem>(
        "SELECT id, requisition_id, product_id, quantity \
         FROM requisition_items WHERE requisition_id = ?1 ORDER BY product_id",
    )
    .bind(requisition_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(items)
}

/// Helper to generate a new requisition ID.
pub fn generate_requisition_id() -> String {
    Uuid::new_v4().to_string()
}

/// Helper to generate a new requisition item ID.
pub fn generate_requisition_item_id() -> String {
    Uuid::new_v4().to_string()
}
