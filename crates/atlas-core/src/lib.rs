//! # atlas-core: Pure Business Logic for Atlas POS
//!
//! This crate is the **heart** of the Atlas POS backend. It contains all
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Atlas POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              HTTP Layer (external deployment unit)              │   │
//! │  │     POST /orders ── PUT /orders/{id} ── POST /…/deposit        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ validated, type-correct input          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 atlas-db (services + ledgers)                   │   │
//! │  │     OrderService, RequisitionService, CustomerService           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ atlas-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   diff    │  │ validation│  │   │
//! │  │   │   Order   │  │   Money   │  │  Differ   │  │   rules   │  │   │
//! │  │   │ Inventory │  │ line math │  │  deltas   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, StockRequisition, Customer, …)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`diff`] - Line-Item Differ: minimal stock deltas between two item sets
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use atlas_core::diff::{diff_items, LineItem};
//!
//! let previous = vec![LineItem::new("p1", 2)];
//! let new = vec![LineItem::new("p1", 5)];
//!
//! // delta = old - new: consuming 3 more units of p1
//! let deltas = diff_items(&previous, &new);
//! assert_eq!(deltas[0].delta, -3);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod diff;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use atlas_core::Money` instead of
// `use atlas_core::money::Money`

pub use diff::{diff_items, LineItem, QuantityDelta};
pub use error::ValidationError;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed on a single order or requisition.
///
/// ## Business Reason
/// Prevents runaway submissions and keeps one transaction from locking an
/// unbounded number of inventory rows.
pub const MAX_ORDER_ITEMS: usize = 100;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
/// Configurable per-tenant in future versions.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Minimum customer deposit in cents.
///
/// Deposits of zero or negative amounts are rejected before any write.
pub const MIN_DEPOSIT_CENTS: i64 = 1;

/// Maximum unit price override in cents ($1,000,000).
///
/// Bounds the `line_total = quantity × unit_price` math: with quantities
/// capped at [`MAX_ITEM_QUANTITY`], line and order totals stay far inside
/// i64 range.
pub const MAX_UNIT_PRICE_CENTS: i64 = 100_000_000;
