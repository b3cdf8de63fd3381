//! # Order Lifecycle Service
//!
//! Orchestrates order create/update/delete using the line-item differ and
//! the stock ledger inside one transaction boundary per operation.
//!
//! ## Stock Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Order Lifecycle & Stock                            │
//! │                                                                         │
//! │  create(items)                                                         │
//! │    └── ledger: -quantity per product        (full consume)             │
//! │                                                                         │
//! │  update(new_items)                                                     │
//! │    └── differ(current, new) → signed deltas (may return AND consume)   │
//! │        └── ledger: apply each delta                                    │
//! │        └── wholesale-replace the item set, recompute total             │
//! │                                                                         │
//! │  delete()                                                              │
//! │    └── ledger: +quantity per product        (full return)              │
//! │        └── delete items, then the order                                │
//! │                                                                         │
//! │  Every path: one transaction. A ledger failure (InsufficientStock)     │
//! │  rolls back EVERYTHING - no partial order ever exists.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use atlas_core::diff::{self, LineItem};
use atlas_core::validation::validate_order_items;
use atlas_core::{Customer, Money, NewOrderItem, Order, OrderItem, OrderStatus};

use crate::error::{DbError, DbResult};
use crate::ledger;
use crate::repository::{customer, order, product};

// =============================================================================
// Inputs / Outputs
// =============================================================================

/// Input for order creation.
///
/// `store_id` is resolved once at the HTTP boundary (no global default
/// store) and recorded on the order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CreateOrderInput {
    pub customer_id: String,
    pub store_id: String,
    pub items: Vec<NewOrderItem>,
    pub notes: Option<String>,
}

/// Input for order update. Omitted (None) fields are left unchanged.
///
/// `items`, when present, wholesale-replaces the current item set; there is
/// deliberately no per-item patch entry point.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdateOrderInput {
    pub customer_id: Option<String>,
    pub items: Option<Vec<NewOrderItem>>,
    pub status: Option<OrderStatus>,
    pub notes: Option<String>,
}

/// The order aggregate returned to the HTTP layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub customer: Customer,
}

// =============================================================================
// Service
// =============================================================================

/// Order lifecycle orchestrator.
#[derive(Debug, Clone)]
pub struct OrderService {
    pool: SqlitePool,
}

impl OrderService {
    /// Creates a new OrderService.
    pub fn new(pool: SqlitePool) -> Self {
        OrderService { pool }
    }

    /// Creates an order, consuming stock for every line item.
    ///
    /// ## Steps
    /// 1. Validate the item list (non-empty, quantities ≥ 1) - no write yet
    /// 2. Open the transaction boundary
    /// 3. Resolve unit prices (explicit override or current product price)
    /// 4. Consume stock through the ledger (coalesced, ascending product id)
    /// 5. Insert order + items with total = Σ line_total
    /// 6. Commit and return the aggregate
    ///
    /// A failed ledger call rolls back the entire transaction - no partial
    /// order is ever created.
    pub async fn create(&self, input: CreateOrderInput) -> DbResult<OrderDetail> {
        validate_order_items(&input.items)?;

        let mut tx = self.pool.begin().await?;

        let customer = customer::get_by_id(&mut tx, &input.customer_id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", &input.customer_id))?;

        let now = Utc::now();
        let order_id = order::generate_order_id();

        let (items, total) = build_items(&mut tx, &order_id, &input.items).await?;

        // Consume stock before persisting the order so an InsufficientStock
        // failure leaves nothing behind.
        let consumed = diff::full_consume(&submitted_line_items(&input.items));
        ledger::apply_stock_deltas(&mut tx, &input.store_id, &consumed).await?;

        let order = Order {
            id: order_id,
            customer_id: input.customer_id,
            store_id: input.store_id,
            status: OrderStatus::Pending,
            total_cents: total.cents(),
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };

        order::insert_order(&mut tx, &order).await?;
        order::insert_items(&mut tx, &items).await?;

        tx.commit().await?;

        info!(
            order_id = %order.id,
            customer_id = %order.customer_id,
            store_id = %order.store_id,
            total = %total,
            item_count = items.len(),
            "Order created"
        );

        Ok(OrderDetail {
            order,
            items,
            customer,
        })
    }

    /// Updates an order. Omitted fields are left unchanged.
    ///
    /// When `items` is supplied the differ computes signed deltas against
    /// the current item set; one transaction may both return and consume
    /// stock. The item set is then wholesale-replaced and the total
    /// recomputed.
    ///
    /// ## Errors
    /// - `NotFound` if the order doesn't exist
    /// - `InsufficientStock` if net consumption exceeds availability
    pub async fn update(&self, order_id: &str, input: UpdateOrderInput) -> DbResult<OrderDetail> {
        if let Some(items) = &input.items {
            validate_order_items(items)?;
        }

        let mut tx = self.pool.begin().await?;

        let mut order = order::get_order(&mut tx, order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;

        if let Some(new_items) = &input.items {
            let current = order::get_items(&mut tx, order_id).await?;

            let previous: Vec<LineItem> = current
                .iter()
                .map(|i| LineItem::new(i.product_id.clone(), i.quantity))
                .collect();
            let deltas = diff::diff_items(&previous, &submitted_line_items(new_items));

            debug!(order_id = %order_id, delta_count = deltas.len(), "Applying item deltas");
            ledger::apply_stock_deltas(&mut tx, &order.store_id, &deltas).await?;

            // Wholesale replacement: the single path that rewrites items.
            order::delete_items(&mut tx, order_id).await?;
            let (items, total) = build_items(&mut tx, order_id, new_items).await?;
            order::insert_items(&mut tx, &items).await?;
            order.total_cents = total.cents();
        }

        if let Some(customer_id) = input.customer_id {
            order.customer_id = customer_id;
        }
        if let Some(status) = input.status {
            order.status = status;
        }
        if let Some(notes) = input.notes {
            order.notes = Some(notes);
        }
        order.updated_at = Utc::now();

        order::update_order(&mut tx, &order).await?;

        let items = order::get_items(&mut tx, order_id).await?;
        let customer = customer::get_by_id(&mut tx, &order.customer_id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", &order.customer_id))?;

        tx.commit().await?;

        info!(order_id = %order_id, status = ?order.status, "Order updated");

        Ok(OrderDetail {
            order,
            items,
            customer,
        })
    }

    /// Deletes an order, returning all item quantities to inventory first.
    ///
    /// This path is stock-increasing only and cannot raise
    /// `InsufficientStock`.
    pub async fn delete(&self, order_id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let order = order::get_order(&mut tx, order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;
        let items = order::get_items(&mut tx, order_id).await?;

        let line_items: Vec<LineItem> = items
            .iter()
            .map(|i| LineItem::new(i.product_id.clone(), i.quantity))
            .collect();
        let returned = diff::full_return(&line_items);
        ledger::apply_stock_deltas(&mut tx, &order.store_id, &returned).await?;

        order::delete_items(&mut tx, order_id).await?;
        order::delete_order(&mut tx, order_id).await?;

        tx.commit().await?;

        info!(order_id = %order_id, item_count = items.len(), "Order deleted, stock returned");

        Ok(())
    }

    /// Fetches the order aggregate (read-only).
    pub async fn get(&self, order_id: &str) -> DbResult<OrderDetail> {
        let mut conn = self.pool.acquire().await?;

        let order = order::get_order(&mut conn, order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;
        let items = order::get_items(&mut conn, order_id).await?;
        let customer = customer::get_by_id(&mut conn, &order.customer_id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", &order.customer_id))?;

        Ok(OrderDetail {
            order,
            items,
            customer,
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Projects submitted items down to the differ's input shape.
fn submitted_line_items(items: &[NewOrderItem]) -> Vec<LineItem> {
    items
        .iter()
        .map(|i| LineItem::new(i.product_id.clone(), i.quantity))
        .collect()
}

/// Builds order item rows, resolving unit prices and computing line totals.
///
/// An explicit `unit_price_cents` wins; otherwise the product's current list
/// price is read inside the transaction (`NotFound` if the product is
/// absent). Returns the rows plus the order total, which is by construction
/// Σ line_total.
async fn build_items(
    conn: &mut SqliteConnection,
    order_id: &str,
    submitted: &[NewOrderItem],
) -> DbResult<(Vec<OrderItem>, Money)> {
    let mut items = Vec::with_capacity(submitted.len());
    let mut total = Money::zero();

    for (position, item) in submitted.iter().enumerate() {
        let unit_price = match item.unit_price_cents {
            Some(cents) => Money::from_cents(cents),
            None => product::get_by_id(conn, &item.product_id)
                .await?
                .ok_or_else(|| DbError::not_found("Product", &item.product_id))?
                .price(),
        };

        let line_total = unit_price.line_total(item.quantity);
        total += line_total;

        items.push(OrderItem {
            id: order::generate_order_item_id(),
            order_id: order_id.to_string(),
            product_id: item.product_id.clone(),
            quantity: item.quantity,
            unit_price_cents: unit_price.cents(),
            line_total_cents: line_total.cents(),
            position: position as i64,
        });
    }

    Ok((items, total))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    fn new_item(product_id: &str, quantity: i64, price: Option<i64>) -> NewOrderItem {
        NewOrderItem {
            product_id: product_id.to_string(),
            quantity,
            unit_price_cents: price,
        }
    }

    struct Fixture {
        db: crate::Database,
        store: String,
        customer: String,
        product: String,
    }

    async fn fixture() -> Fixture {
        let db = testutil::test_db().await;
        let store = testutil::seed_store(&db, "North").await;
        let customer = testutil::seed_customer(&db, "Ada", 0).await;
        let product = testutil::seed_product(&db, "SKU-1", 5000).await;
        Fixture {
            db,
            store,
            customer,
            product,
        }
    }

    #[tokio::test]
    async fn test_create_consumes_stock_and_totals_line_items() {
        let f = fixture().await;
        testutil::seed_inventory(&f.db, &f.store, &f.product, 100).await;

        // quantity 2 at explicit unit price 50 cents → total 100
        let detail = f
            .db
            .orders()
            .create(CreateOrderInput {
                customer_id: f.customer.clone(),
                store_id: f.store.clone(),
                items: vec![new_item(&f.product, 2, Some(50))],
                notes: None,
            })
            .await
            .unwrap();

        assert_eq!(detail.order.total_cents, 100);
        assert_eq!(detail.order.status, OrderStatus::Pending);
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.items[0].line_total_cents, 100);
        assert_eq!(detail.customer.id, f.customer);

        assert_eq!(
            testutil::stock_of(&f.db, &f.store, &f.product).await,
            Some(98)
        );
    }

    #[tokio::test]
    async fn test_create_resolves_product_price_when_not_overridden() {
        let f = fixture().await;
        testutil::seed_inventory(&f.db, &f.store, &f.product, 10).await;

        let detail = f
            .db
            .orders()
            .create(CreateOrderInput {
                customer_id: f.customer.clone(),
                store_id: f.store.clone(),
                items: vec![new_item(&f.product, 3, None)],
                notes: None,
            })
            .await
            .unwrap();

        // Product list price is 5000 cents
        assert_eq!(detail.items[0].unit_price_cents, 5000);
        assert_eq!(detail.order.total_cents, 15_000);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_items() {
        let f = fixture().await;

        let err = f
            .db
            .orders()
            .create(CreateOrderInput {
                customer_id: f.customer.clone(),
                store_id: f.store.clone(),
                items: vec![],
                notes: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_insufficient_stock_leaves_no_trace() {
        let f = fixture().await;
        testutil::seed_inventory(&f.db, &f.store, &f.product, 1).await;

        let err = f
            .db
            .orders()
            .create(CreateOrderInput {
                customer_id: f.customer.clone(),
                store_id: f.store.clone(),
                items: vec![new_item(&f.product, 2, Some(50))],
                notes: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::InsufficientStock { .. }));

        // No partial write: quantity untouched, no order rows exist.
        assert_eq!(
            testutil::stock_of(&f.db, &f.store, &f.product).await,
            Some(1)
        );
        let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(f.db.pool())
            .await
            .unwrap();
        assert_eq!(orders, 0);
    }

    #[tokio::test]
    async fn test_create_multi_item_failure_rolls_back_first_item() {
        let f = fixture().await;
        let scarce = testutil::seed_product(&f.db, "SKU-2", 1000).await;
        testutil::seed_inventory(&f.db, &f.store, &f.product, 50).await;
        testutil::seed_inventory(&f.db, &f.store, &scarce, 0).await;

        let err = f
            .db
            .orders()
            .create(CreateOrderInput {
                customer_id: f.customer.clone(),
                store_id: f.store.clone(),
                items: vec![
                    new_item(&f.product, 5, Some(100)),
                    new_item(&scarce, 1, Some(100)),
                ],
                notes: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::InsufficientStock { .. }));

        // The successful first delta was rolled back with the transaction.
        assert_eq!(
            testutil::stock_of(&f.db, &f.store, &f.product).await,
            Some(50)
        );
    }

    #[tokio::test]
    async fn test_update_applies_delta_not_absolute() {
        let f = fixture().await;
        testutil::seed_inventory(&f.db, &f.store, &f.product, 10).await;

        let detail = f
            .db
            .orders()
            .create(CreateOrderInput {
                customer_id: f.customer.clone(),
                store_id: f.store.clone(),
                items: vec![new_item(&f.product, 2, Some(50))],
                notes: None,
            })
            .await
            .unwrap();
        assert_eq!(
            testutil::stock_of(&f.db, &f.store, &f.product).await,
            Some(8)
        );

        // 2 → 5 consumes exactly 3 additional units, not 5
        let updated = f
            .db
            .orders()
            .update(
                &detail.order.id,
                UpdateOrderInput {
                    items: Some(vec![new_item(&f.product, 5, Some(50))]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(
            testutil::stock_of(&f.db, &f.store, &f.product).await,
            Some(5)
        );
        assert_eq!(updated.order.total_cents, 250);
        assert_eq!(updated.items.len(), 1);
        assert_eq!(updated.items[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_update_can_return_and_consume_in_one_transaction() {
        let f = fixture().await;
        let other = testutil::seed_product(&f.db, "SKU-2", 2000).await;
        testutil::seed_inventory(&f.db, &f.store, &f.product, 10).await;
        testutil::seed_inventory(&f.db, &f.store, &other, 10).await;

        let detail = f
            .db
            .orders()
            .create(CreateOrderInput {
                customer_id: f.customer.clone(),
                store_id: f.store.clone(),
                items: vec![new_item(&f.product, 4, Some(100))],
                notes: None,
            })
            .await
            .unwrap();

        // Swap products entirely: return 4 of one, consume 2 of the other.
        f.db.orders()
            .update(
                &detail.order.id,
                UpdateOrderInput {
                    items: Some(vec![new_item(&other, 2, Some(100))]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(
            testutil::stock_of(&f.db, &f.store, &f.product).await,
            Some(10)
        );
        assert_eq!(testutil::stock_of(&f.db, &f.store, &other).await, Some(8));
    }

    #[tokio::test]
    async fn test_update_insufficient_stock_rolls_back_item_set() {
        let f = fixture().await;
        testutil::seed_inventory(&f.db, &f.store, &f.product, 3).await;

        let detail = f
            .db
            .orders()
            .create(CreateOrderInput {
                customer_id: f.customer.clone(),
                store_id: f.store.clone(),
                items: vec![new_item(&f.product, 2, Some(50))],
                notes: None,
            })
            .await
            .unwrap();

        // 2 → 10 needs 8 more but only 1 remains.
        let err = f
            .db
            .orders()
            .update(
                &detail.order.id,
                UpdateOrderInput {
                    items: Some(vec![new_item(&f.product, 10, Some(50))]),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InsufficientStock { .. }));

        // Items and total unchanged.
        let fetched = f.db.orders().get(&detail.order.id).await.unwrap();
        assert_eq!(fetched.items[0].quantity, 2);
        assert_eq!(fetched.order.total_cents, 100);
        assert_eq!(
            testutil::stock_of(&f.db, &f.store, &f.product).await,
            Some(1)
        );
    }

    #[tokio::test]
    async fn test_update_partial_fields_leave_items_alone() {
        let f = fixture().await;
        testutil::seed_inventory(&f.db, &f.store, &f.product, 10).await;

        let detail = f
            .db
            .orders()
            .create(CreateOrderInput {
                customer_id: f.customer.clone(),
                store_id: f.store.clone(),
                items: vec![new_item(&f.product, 2, Some(50))],
                notes: None,
            })
            .await
            .unwrap();

        let updated = f
            .db
            .orders()
            .update(
                &detail.order.id,
                UpdateOrderInput {
                    status: Some(OrderStatus::Processing),
                    notes: Some("rush".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.order.status, OrderStatus::Processing);
        assert_eq!(updated.order.notes.as_deref(), Some("rush"));
        // Items untouched, no stock movement
        assert_eq!(updated.items[0].quantity, 2);
        assert_eq!(
            testutil::stock_of(&f.db, &f.store, &f.product).await,
            Some(8)
        );
    }

    #[tokio::test]
    async fn test_update_missing_order() {
        let f = fixture().await;

        let err = f
            .db
            .orders()
            .update("missing", UpdateOrderInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_create_then_delete_is_inventory_noop() {
        let f = fixture().await;
        testutil::seed_inventory(&f.db, &f.store, &f.product, 42).await;

        let detail = f
            .db
            .orders()
            .create(CreateOrderInput {
                customer_id: f.customer.clone(),
                store_id: f.store.clone(),
                items: vec![new_item(&f.product, 7, Some(10))],
                notes: None,
            })
            .await
            .unwrap();
        assert_eq!(
            testutil::stock_of(&f.db, &f.store, &f.product).await,
            Some(35)
        );

        f.db.orders().delete(&detail.order.id).await.unwrap();

        assert_eq!(
            testutil::stock_of(&f.db, &f.store, &f.product).await,
            Some(42)
        );
        let err = f.db.orders().get(&detail.order.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_interleaved_lifecycle_reconciles_inventory() {
        // Final quantity = initial − Σ(active order item quantities)
        let f = fixture().await;
        testutil::seed_inventory(&f.db, &f.store, &f.product, 100).await;

        let orders = f.db.orders();
        let a = orders
            .create(CreateOrderInput {
                customer_id: f.customer.clone(),
                store_id: f.store.clone(),
                items: vec![new_item(&f.product, 10, Some(10))],
                notes: None,
            })
            .await
            .unwrap();
        let b = orders
            .create(CreateOrderInput {
                customer_id: f.customer.clone(),
                store_id: f.store.clone(),
                items: vec![new_item(&f.product, 20, Some(10))],
                notes: None,
            })
            .await
            .unwrap();

        orders
            .update(
                &a.order.id,
                UpdateOrderInput {
                    items: Some(vec![new_item(&f.product, 15, Some(10))]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        orders.delete(&b.order.id).await.unwrap();

        // Active items: order a with 15 → 100 - 15 = 85
        assert_eq!(
            testutil::stock_of(&f.db, &f.store, &f.product).await,
            Some(85)
        );
    }

    #[tokio::test]
    async fn test_duplicate_products_in_one_order_are_coalesced() {
        let f = fixture().await;
        testutil::seed_inventory(&f.db, &f.store, &f.product, 5).await;

        let detail = f
            .db
            .orders()
            .create(CreateOrderInput {
                customer_id: f.customer.clone(),
                store_id: f.store.clone(),
                items: vec![
                    new_item(&f.product, 2, Some(100)),
                    new_item(&f.product, 3, Some(100)),
                ],
                notes: None,
            })
            .await
            .unwrap();

        // Both lines persist; stock moved once for the summed quantity.
        assert_eq!(detail.items.len(), 2);
        assert_eq!(detail.order.total_cents, 500);
        assert_eq!(
            testutil::stock_of(&f.db, &f.store, &f.product).await,
            Some(0)
        );
    }
}
