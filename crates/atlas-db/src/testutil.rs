//! Shared fixtures for the crate's unit tests: an isolated in-memory
//! database plus seed/readback helpers so tests stay about behavior, not
//! plumbing. Unwraps are fine here; a failed fixture should panic the test.

use atlas_core::{Customer, Product, Store};
use chrono::Utc;

use crate::pool::{Database, DbConfig};
use crate::repository::{customer, inventory, product, store};

/// Fresh, fully migrated in-memory database.
pub async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// Inserts a store, returning its generated id.
pub async fn seed_store(db: &Database, name: &str) -> String {
    let mut conn = db.pool().acquire().await.unwrap();
    let row = Store {
        id: store::generate_store_id(),
        name: name.to_string(),
        created_at: Utc::now(),
    };
    store::insert(&mut conn, &row).await.unwrap();
    row.id
}

/// Inserts a product, returning its generated id.
pub async fn seed_product(db: &Database, sku: &str, price_cents: i64) -> String {
    let mut conn = db.pool().acquire().await.unwrap();
    let now = Utc::now();
    let row = Product {
        id: product::generate_product_id(),
        sku: sku.to_string(),
        name: format!("Product {sku}"),
        price_cents,
        created_at: now,
        updated_at: now,
    };
    product::insert(&mut conn, &row).await.unwrap();
    row.id
}

/// Inserts a customer, returning its generated id.
pub async fn seed_customer(db: &Database, name: &str, balance_cents: i64) -> String {
    let mut conn = db.pool().acquire().await.unwrap();
    let now = Utc::now();
    let row = Customer {
        id: customer::generate_customer_id(),
        name: name.to_string(),
        balance_cents,
        credit_limit_cents: 0,
        created_at: now,
        updated_at: now,
    };
    customer::insert(&mut conn, &row).await.unwrap();
    row.id
}

/// Sets an absolute inventory quantity for one (store, product) pair.
pub async fn seed_inventory(db: &Database, store_id: &str, product_id: &str, quantity: i64) {
    let mut conn = db.pool().acquire().await.unwrap();
    inventory::set_quantity(&mut conn, store_id, product_id, quantity)
        .await
        .unwrap();
}

/// Reads back a quantity; `None` means the row was never created.
pub async fn stock_of(db: &Database, store_id: &str, product_id: &str) -> Option<i64> {
    let mut conn = db.pool().acquire().await.unwrap();
    inventory::get_quantity(&mut conn, store_id, product_id)
        .await
        .unwrap()
}

/// Reads back a customer balance.
pub async fn balance_of(db: &Database, customer_id: &str) -> i64 {
    let mut conn = db.pool().acquire().await.unwrap();
    customer::get_by_id(&mut conn, customer_id)
        .await
        .unwrap()
        .unwrap()
        .balance_cents
}
