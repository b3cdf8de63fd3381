//! # Validation Module
//!
//! Business rule validation for Atlas POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP layer (external)                                        │
//! │  ├── Request-schema validation (types, required fields, FK-valid ids)  │
//! │  └── Immediate client feedback                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (before any transaction opens)                   │
//! │  ├── Business rules: non-empty item lists, quantity ≥ 1,               │
//! │  │   positive deposit, from ≠ to store                                 │
//! │  └── A rejected request never touches the ledger                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity >= 0) on inventory                                │
//! │  ├── UNIQUE / FOREIGN KEY constraints                                  │
//! │  └── Backstop only - the ledger fails first with typed errors          │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::types::{NewOrderItem, NewRequisitionItem};
use crate::{MAX_ITEM_QUANTITY, MAX_ORDER_ITEMS, MAX_UNIT_PRICE_CENTS, MIN_DEPOSIT_CENTS};

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line item quantity.
///
/// ## Rules
/// - Must be ≥ 1
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an explicit unit price override.
///
/// ## Rules
/// - Must be non-negative (zero allowed: free items)
/// - Must not exceed MAX_UNIT_PRICE_CENTS, which keeps
///   `quantity × unit_price` line totals inside i64 range
pub fn validate_unit_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 || cents > MAX_UNIT_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "unit_price_cents".to_string(),
            min: 0,
            max: MAX_UNIT_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a customer deposit amount in cents.
///
/// ## Rules
/// - Must be at least MIN_DEPOSIT_CENTS (1); zero and negative amounts are
///   rejected before any transaction opens
pub fn validate_deposit_cents(cents: i64) -> ValidationResult<()> {
    if cents < MIN_DEPOSIT_CENTS {
        return Err(ValidationError::MustBePositive {
            field: "amount_cents".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates a submitted order item list.
///
/// ## Rules
/// - Must not be empty
/// - Must not exceed MAX_ORDER_ITEMS entries
/// - Every quantity must pass [`validate_quantity`]
/// - Every explicit unit price must pass [`validate_unit_price_cents`]
pub fn validate_order_items(items: &[NewOrderItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }

    if items.len() > MAX_ORDER_ITEMS {
        return Err(ValidationError::TooMany {
            field: "items".to_string(),
            max: MAX_ORDER_ITEMS,
        });
    }

    for item in items {
        validate_quantity(item.quantity)?;
        if let Some(cents) = item.unit_price_cents {
            validate_unit_price_cents(cents)?;
        }
    }

    Ok(())
}

/// Validates a submitted requisition item list.
///
/// Same shape rules as order items, without prices.
pub fn validate_requisition_items(items: &[NewRequisitionItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }

    if items.len() > MAX_ORDER_ITEMS {
        return Err(ValidationError::TooMany {
            field: "items".to_string(),
            max: MAX_ORDER_ITEMS,
        });
    }

    for item in items {
        validate_quantity(item.quantity)?;
    }

    Ok(())
}

// =============================================================================
// Store Validators
// =============================================================================

/// Validates a requisition's store pair.
///
/// ## Rules
/// - Source and destination store must differ. Checked before any ledger
///   write so a same-store requisition never opens a transaction.
pub fn validate_store_pair(from_store_id: &str, to_store_id: &str) -> ValidationResult<()> {
    if from_store_id == to_store_id {
        return Err(ValidationError::MustDiffer {
            field: "to_store_id".to_string(),
            other: "from_store_id".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
