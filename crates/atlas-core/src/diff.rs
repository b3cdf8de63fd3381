//! # Line-Item Differ
//!
//! Pure function computing minimal stock deltas between an old and a new
//! item set. This is the piece that makes order updates apply *deltas*
//! instead of naively re-consuming the whole new item set.
//!
//! ## How It Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Differ Walkthrough                               │
//! │                                                                         │
//! │  previous: [{p1, 2}, {p2, 4}]        new: [{p1, 5}, {p3, 1}]           │
//! │       │                                    │                            │
//! │       ▼ coalesce (sum duplicates)          ▼                            │
//! │  {p1: 2, p2: 4}                      {p1: 5, p3: 1}                     │
//! │       │                                    │                            │
//! │       └────────────┬───────────────────────┘                            │
//! │                    ▼ delta = old - new                                  │
//! │  p1: 2 - 5 = -3   → consume 3 more units                               │
//! │  p2: 4 - 0 = +4   → return all 4 units (dropped from order)            │
//! │  p3: 0 - 1 = -1   → consume 1 unit (newly added)                       │
//! │                                                                         │
//! │  Output (ascending product id, zero deltas dropped):                   │
//! │  [{p1, -3}, {p2, +4}, {p3, -1}]                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sign Convention
//! `delta = old_quantity - new_quantity`:
//! - positive ⇒ stock comes BACK to inventory
//! - negative ⇒ stock is CONSUMED from inventory
//!
//! The stock ledger applies these values as-is, so the convention here and
//! in `atlas_db::ledger` must stay in sync.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// =============================================================================
// Input / Output Shapes
// =============================================================================

/// One (product, quantity) pair, the differ's input unit.
///
/// Both order items and requisition items project down to this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub quantity: i64,
}

impl LineItem {
    /// Convenience constructor.
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        LineItem {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// A signed stock delta for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityDelta {
    pub product_id: String,
    /// old − new. Positive returns stock, negative consumes it.
    pub delta: i64,
}

// =============================================================================
// Differ
// =============================================================================

/// Sums duplicate product ids within one item list.
///
/// The BTreeMap keeps products in ascending id order, which downstream code
/// relies on for its fixed lock-acquisition order.
pub fn coalesce(items: &[LineItem]) -> BTreeMap<String, i64> {
    let mut totals: BTreeMap<String, i64> = BTreeMap::new();
    for item in items {
        *totals.entry(item.product_id.clone()).or_insert(0) += item.quantity;
    }
    totals
}

/// Computes minimal signed deltas between two item sets.
///
/// ## Contract
/// - Duplicate product ids within one list are summed first
/// - `delta = old_quantity − new_quantity`
/// - Items only in `previous` fully return their quantity
/// - Items only in `new` fully consume theirs
/// - Zero deltas are dropped (minimal output)
/// - Output is sorted ascending by product id
///
/// Pure function: no I/O, no side effects.
pub fn diff_items(previous: &[LineItem], new: &[LineItem]) -> Vec<QuantityDelta> {
    let old_totals = coalesce(previous);
    let new_totals = coalesce(new);

    let mut deltas: BTreeMap<String, i64> = BTreeMap::new();

    for (product_id, old_qty) in &old_totals {
        deltas.insert(product_id.clone(), *old_qty);
    }
    for (product_id, new_qty) in &new_totals {
        *deltas.entry(product_id.clone()).or_insert(0) -= *new_qty;
    }

    deltas
        .into_iter()
        .filter(|(_, delta)| *delta != 0)
        .map(|(product_id, delta)| QuantityDelta { product_id, delta })
        .collect()
}

/// Deltas that return every quantity in `items` to stock.
///
/// Used by order deletion: equivalent to `diff_items(items, &[])`, spelled
/// out because the delete path reads better with an explicit name.
pub fn full_return(items: &[LineItem]) -> Vec<QuantityDelta> {
    diff_items(items, &[])
}

/// Deltas that consume every quantity in `items` from stock.
///
/// Used by order creation: equivalent to `diff_items(&[], items)`.
pub fn full_consume(items: &[LineItem]) -> Vec<QuantityDelta> {
    diff_items(&[], items)
}

// =============================================================================
// Unit Tests
// =============================================================================
