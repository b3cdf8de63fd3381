//! # Customer Repository
//!
//! Persistence for customers. Balance mutations go through the balance
//! ledger, never through this module.

use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use atlas_core::Customer;

use crate::error::DbResult;

/// Inserts a new customer.
pub async fn insert(conn: &mut SqliteConnection, customer: &Customer) -> DbResult<()> {
    debug!(id = %customer.id, "Inserting customer");

    sqlx::query(
        "INSERT INTO customers \
         (id, name, balance_cents, credit_limit_cents, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(&customer.id)
    .bind(&customer.name)
    .bind(customer.balance_cents)
    .bind(customer.credit_limit_cents)
    .bind(customer.created_at)
    .bind(customer.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Gets a customer by ID.
pub async fn get_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(
        "SELECT id, name, balance_cents, credit_limit_cents, created_at, updated_at \
         FROM customers WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(customer)
}

/// Helper to generate a new customer ID.
pub fn generate_customer_id() -> String {
    Uuid::new_v4().to_string()
}
