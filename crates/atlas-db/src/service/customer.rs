//! # Customer Balance Service
//!
//! Deposits onto customer accounts. Like inventory, balances only ever change
//! by signed delta through the ledger - two concurrent deposits both land
//! because the later transaction reads the earlier one's committed balance.

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use atlas_core::validation::validate_deposit_cents;
use atlas_core::Customer;

use crate::error::{DbError, DbResult};
use crate::ledger;
use crate::repository::customer;

// =============================================================================
// Outputs
// =============================================================================

/// The slice of customer state a deposit response carries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerBalance {
    pub id: String,
    pub balance_cents: i64,
}

/// Deposit confirmation returned to the HTTP layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositReceipt {
    pub message: String,
    pub customer: CustomerBalance,
}

// =============================================================================
// Service
// =============================================================================

/// Customer balance orchestrator.
#[derive(Debug, Clone)]
pub struct CustomerService {
    pool: SqlitePool,
}

impl CustomerService {
    /// Creates a new CustomerService.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerService { pool }
    }

    /// Deposits a positive amount onto a customer's balance.
    ///
    /// ## Errors
    /// - `Validation` if `amount_cents` ≤ 0
    /// - `NotFound` if the customer doesn't exist
    pub async fn deposit(&self, customer_id: &str, amount_cents: i64) -> DbResult<DepositReceipt> {
        validate_deposit_cents(amount_cents)?;

        let mut tx = self.pool.begin().await?;
        let new_balance = ledger::apply_balance(&mut tx, customer_id, amount_cents).await?;
        tx.commit().await?;

        info!(
            customer_id = %customer_id,
            amount_cents = %amount_cents,
            new_balance = %new_balance,
            "Deposit applied"
        );

        Ok(DepositReceipt {
            message: "Deposit applied".to_string(),
            customer: CustomerBalance {
                id: customer_id.to_string(),
                balance_cents: new_balance,
            },
        })
    }

    /// Fetches a customer (read-only).
    pub async fn get(&self, customer_id: &str) -> DbResult<Customer> {
        let mut conn = self.pool.acquire().await?;

        customer::get_by_id(&mut conn, customer_id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", customer_id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
