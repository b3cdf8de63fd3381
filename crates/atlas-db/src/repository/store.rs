//! # Store Repository
//!
//! Persistence for stores (branches). Reference data only; store management
//! is external to this core.

use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use atlas_core::Store;

use crate::error::DbResult;

/// Inserts a new store.
pub async fn insert(conn: &mut SqliteConnection, store: &Store) -> DbResult<()> {
    debug!(id = %store.id, name = %store.name, "Inserting store");

    sqlx::query("INSERT INTO stores (id, name, created_at) VALUES (?1, ?2, ?3)")
        .bind(&store.id)
        .bind(&store.name)
        .bind(store.created_at)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Helper to generate a new store ID.
pub fn generate_store_id() -> String {
    Uuid::new_v4().to_string()
}
