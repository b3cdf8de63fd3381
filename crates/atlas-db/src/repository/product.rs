//! # Product Repository
//!
//! Persistence for the product catalog. The orchestrators only need price
//! resolution (`get_by_id`) and the seed path (`insert`); catalog management
//! itself lives outside this core.

use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use atlas_core::Product;

use crate::error::DbResult;

/// Inserts a new product.
///
/// ## Errors
/// `DbError::UniqueViolation` if the SKU already exists.
pub async fn insert(conn: &mut SqliteConnection, product: &Product) -> DbResult<()> {
    debug!(sku = %product.sku, "Inserting product");

    sqlx::query(
        "INSERT INTO products (id, sku, name, price_cents, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(&product.id)
    .bind(&product.sku)
    .bind(&product.name)
    .bind(product.price_cents)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Gets a product by its ID.
pub async fn get_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        "SELECT id, sku, name, price_cents, created_at, updated_at \
         FROM products WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(product)
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}
