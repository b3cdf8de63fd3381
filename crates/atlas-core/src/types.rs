//! # Domain Types
//!
//! Core domain types used throughout Atlas POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │ StockRequisition│       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  sku (business) │   │  customer_id    │   │  from_store_id  │       │
//! │  │  name           │   │  store_id       │   │  to_store_id    │       │
//! │  │  price_cents    │   │  status         │   │  status         │       │
//! │  └─────────────────┘   │  total_cents    │   │  approved_by    │       │
//! │                        └───────┬─────────┘   └───────┬─────────┘       │
//! │  ┌─────────────────┐           │ owns                │ owns            │
//! │  │   Inventory     │   ┌───────▼─────────┐   ┌───────▼─────────┐       │
//! │  │  ─────────────  │   │   OrderItem     │   │ RequisitionItem │       │
//! │  │  (store_id,     │   │  product_id     │   │  product_id     │       │
//! │  │   product_id)   │   │  quantity       │   │  quantity       │       │
//! │  │  quantity ≥ 0   │   │  unit_price     │   └─────────────────┘       │
//! │  └─────────────────┘   │  line_total     │                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists (sku) - human-readable, potentially mutable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Store
// =============================================================================

/// A physical store / branch holding its own inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Store {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale or transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier, unique.
    pub sku: String,

    /// Display name.
    pub name: String,

    /// Current list price in cents. Orders may override per line item;
    /// when they don't, this is the resolved unit price.
    pub price_cents: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the list price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// Stock level of one product at one store.
///
/// Rows are created lazily on first reference and never deleted, only zeroed.
/// `quantity` is kept non-negative by the stock ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Inventory {
    pub store_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Customer
// =============================================================================

/// A customer with a running account balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub name: String,

    /// Account balance in cents. Deposits increase it; it may go negative
    /// through other flows (credit purchases).
    pub balance_cents: i64,

    /// Informational credit ceiling. Not enforced on deposits.
    pub credit_limit_cents: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Returns the balance as Money.
    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order.
///
/// Values come from a fixed set; the documented contract enforces no
/// transition-legality graph. Deleting an order is the stock-returning path,
/// not a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Newly created, stock already reserved.
    Pending,
    /// Being picked / fulfilled.
    Processing,
    /// Fulfilled and closed.
    Completed,
    /// Cancelled. Stock is NOT returned by a status change.
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Order
// =============================================================================

/// An order against one store's inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    /// The store whose inventory this order consumed, resolved once at the
    /// HTTP boundary and recorded here.
    pub store_id: String,
    pub status: OrderStatus,
    /// Invariant: equals the sum of the items' line totals.
    pub total_cents: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the order total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item on an order.
///
/// Items are created with the order and wholesale-replaced on update, never
/// individually patched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Quantity ordered (≥ 1).
    pub quantity: i64,
    /// Unit price in cents at time of ordering (frozen).
    pub unit_price_cents: i64,
    /// Invariant: quantity × unit_price_cents.
    pub line_total_cents: i64,
    /// Position in the submitted item list.
    pub position: i64,
}

impl OrderItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Requisition Status
// =============================================================================

/// The status of an inter-store stock requisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum RequisitionStatus {
    /// Created; whether stock has already moved depends on the configured
    /// stock movement policy.
    Pending,
    /// Approved by a manager.
    Approved,
    /// Rejected; no further stock movement.
    Rejected,
}

impl Default for RequisitionStatus {
    fn default() -> Self {
        RequisitionStatus::Pending
    }
}

// =============================================================================
// Stock Requisition
// =============================================================================

/// A request to move stock from one store to another.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockRequisition {
    pub id: String,
    pub from_store_id: String,
    /// Must differ from `from_store_id`; validated before any write.
    pub to_store_id: String,
    pub status: RequisitionStatus,
    pub approved_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line item on a stock requisition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct RequisitionItem {
    pub id: String,
    pub requisition_id: String,
    pub product_id: String,
    /// Quantity to move (≥ 1).
    pub quantity: i64,
}

// =============================================================================
// Input Shapes
// =============================================================================
// The HTTP layer deserializes request bodies into these before calling the
// services. They are pure data, validated by `validation`.

/// A submitted order line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NewOrderItem {
    pub product_id: String,
    pub quantity: i64,
    /// Explicit unit price override; when None the product's current list
    /// price is resolved inside the order transaction.
    pub unit_price_cents: Option<i64>,
}

/// A submitted requisition line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NewRequisitionItem {
    pub product_id: String,
    pub quantity: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
