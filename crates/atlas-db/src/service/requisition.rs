//! # Requisition Transfer Service
//!
//! Moves stock between stores. A requisition names a from-store, a to-store,
//! and a set of items; the transfer itself is a paired ledger movement
//! executed atomically.
//!
//! ## Transfer Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Requisition Transfer (per item)                      │
//! │                                                                         │
//! │   from-store inventory          to-store inventory                     │
//! │   ┌──────────────────┐          ┌──────────────────┐                   │
//! │   │ quantity -= n    │ ───────▶ │ quantity += n    │                   │
//! │   └──────────────────┘          └──────────────────┘                   │
//! │         debit first                  credit second                     │
//! │                                                                         │
//! │   Items walk in ascending product id (coalesced); a failed debit       │
//! │   rolls back every movement already staged in the transaction.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Movement Policy
//! WHEN stock moves is configuration, not convention: `OnCreate` moves at
//! creation time (the default - a created requisition is already in transit),
//! `OnApproval` defers movement to the Pending → Approved transition. A
//! requisition's stock moves exactly once under either policy.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use atlas_core::diff;
use atlas_core::diff::LineItem;
use atlas_core::validation::{validate_requisition_items, validate_store_pair};
use atlas_core::{NewRequisitionItem, RequisitionItem, RequisitionStatus, StockRequisition};

use crate::error::{DbError, DbResult};
use crate::ledger;
use crate::repository::requisition;

// =============================================================================
// Policy
// =============================================================================

/// When a requisition's stock movement is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockMovementPolicy {
    /// Move stock when the requisition is created (default).
    OnCreate,
    /// Move stock when the requisition transitions Pending → Approved.
    OnApproval,
}

impl Default for StockMovementPolicy {
    fn default() -> Self {
        StockMovementPolicy::OnCreate
    }
}

// =============================================================================
// Inputs / Outputs
// =============================================================================

/// Input for requisition creation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CreateRequisitionInput {
    pub from_store_id: String,
    pub to_store_id: String,
    pub items: Vec<NewRequisitionItem>,
    /// Approver recorded at creation (pre-approved requisitions). Approval
    /// via `update` can set or replace it later.
    pub approved_by: Option<String>,
}

/// Input for requisition update. Only the header's status and approver are
/// mutable; the item set is fixed at creation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdateRequisitionInput {
    pub status: Option<RequisitionStatus>,
    pub approved_by: Option<String>,
}

/// The requisition aggregate returned to the HTTP layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequisitionDetail {
    pub requisition: StockRequisition,
    pub items: Vec<RequisitionItem>,
}

// =============================================================================
// Service
// =============================================================================

/// Requisition transfer orchestrator.
#[derive(Debug, Clone)]
pub struct RequisitionService {
    pool: SqlitePool,
    policy: StockMovementPolicy,
}

impl RequisitionService {
    /// Creates a new RequisitionService with the given movement policy.
    pub fn new(pool: SqlitePool, policy: StockMovementPolicy) -> Self {
        RequisitionService { pool, policy }
    }

    /// The active stock movement policy.
    pub fn policy(&self) -> StockMovementPolicy {
        self.policy
    }

    /// Creates a requisition.
    ///
    /// Under `OnCreate` the transfer executes here, inside the same
    /// transaction as the insert; an insufficient from-store debit rolls back
    /// the whole requisition. Under `OnApproval` only the rows are written.
    ///
    /// ## Errors
    /// - `Validation` if the stores match or the item list is invalid
    /// - `InsufficientStock` if the from-store can't cover an item (OnCreate)
    pub async fn create(&self, input: CreateRequisitionInput) -> DbResult<RequisitionDetail> {
        validate_store_pair(&input.from_store_id, &input.to_store_id)?;
        validate_requisition_items(&input.items)?;

        let mut tx = self.pool.begin().await?;

        let now = Utc::now();
        let requisition = StockRequisition {
            id: requisition::generate_requisition_id(),
            from_store_id: input.from_store_id,
            to_store_id: input.to_store_id,
            status: RequisitionStatus::Pending,
            approved_by: input.approved_by,
            created_at: now,
            updated_at: now,
        };

        let items: Vec<RequisitionItem> = input
            .items
            .iter()
            .map(|i| RequisitionItem {
                id: requisition::generate_requisition_item_id(),
                requisition_id: requisition.id.clone(),
                product_id: i.product_id.clone(),
                quantity: i.quantity,
            })
            .collect();

        requisition::insert_requisition(&mut tx, &requisition).await?;
        requisition::insert_items(&mut tx, &items).await?;

        if self.policy == StockMovementPolicy::OnCreate {
            execute_transfer(&mut tx, &requisition, &items).await?;
        }

        tx.commit().await?;

        info!(
            requisition_id = %requisition.id,
            from = %requisition.from_store_id,
            to = %requisition.to_store_id,
            item_count = items.len(),
            policy = ?self.policy,
            "Requisition created"
        );

        Ok(RequisitionDetail { requisition, items })
    }

    /// Updates a requisition's status / approver.
    ///
    /// Under `OnApproval` the transfer executes exactly on the
    /// Pending → Approved transition; re-approving an approved requisition is
    /// a header touch, never a second movement.
    ///
    /// ## Errors
    /// - `NotFound` if the requisition doesn't exist
    /// - `InsufficientStock` if the deferred transfer can't be covered
    pub async fn update(
        &self,
        requisition_id: &str,
        input: UpdateRequisitionInput,
    ) -> DbResult<RequisitionDetail> {
        let mut tx = self.pool.begin().await?;

        let mut requisition = requisition::get_requisition(&mut tx, requisition_id)
            .await?
            .ok_or_else(|| DbError::not_found("StockRequisition", requisition_id))?;
        let items = requisition::get_items(&mut tx, requisition_id).await?;

        let newly_approved = matches!(
            (requisition.status, input.status),
            (RequisitionStatus::Pending, Some(RequisitionStatus::Approved))
        );

        if let Some(status) = input.status {
            requisition.status = status;
        }
        if let Some(approved_by) = input.approved_by {
            requisition.approved_by = Some(approved_by);
        }
        requisition.updated_at = Utc::now();

        requisition::update_requisition(&mut tx, &requisition).await?;

        if newly_approved && self.policy == StockMovementPolicy::OnApproval {
            execute_transfer(&mut tx, &requisition, &items).await?;
        }

        tx.commit().await?;

        info!(
            requisition_id = %requisition_id,
            status = ?requisition.status,
            moved_stock = newly_approved && self.policy == StockMovementPolicy::OnApproval,
            "Requisition updated"
        );

        Ok(RequisitionDetail { requisition, items })
    }

    /// Fetches the requisition aggregate (read-only).
    pub async fn get(&self, requisition_id: &str) -> DbResult<RequisitionDetail> {
        let mut conn = self.pool.acquire().await?;

        let requisition = requisition::get_requisition(&mut conn, requisition_id)
            .await?
            .ok_or_else(|| DbError::not_found("StockRequisition", requisition_id))?;
        let items = requisition::get_items(&mut conn, requisition_id).await?;

        Ok(RequisitionDetail { requisition, items })
    }
}

// =============================================================================
// Transfer Execution
// =============================================================================

/// Executes the paired ledger movement for every item.
///
/// Items are coalesced per product and walked in ascending product id; each
/// product is debited from the from-store before the matching credit to the
/// to-store. The debit is the only side that can fail, so a failure leaves
/// no half-moved product.
async fn execute_transfer(
    conn: &mut SqliteConnection,
    requisition: &StockRequisition,
    items: &[RequisitionItem],
) -> DbResult<()> {
    let line_items: Vec<LineItem> = items
        .iter()
        .map(|i| LineItem::new(i.product_id.clone(), i.quantity))
        .collect();

    // BTreeMap iteration gives the ascending product walk.
    for (product_id, quantity) in diff::coalesce(&line_items) {
        debug!(
            requisition_id = %requisition.id,
            product_id = %product_id,
            quantity = %quantity,
            "Transferring product"
        );
        ledger::apply_stock(conn, &requisition.from_store_id, &product_id, -quantity).await?;
        ledger::apply_stock(conn, &requisition.to_store_id, &product_id, quantity).await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    fn new_item(product_id: &str, quantity: i64) -> NewRequisitionItem {
        NewRequisitionItem {
            product_id: product_id.to_string(),
            quantity,
        }
    }

    struct Fixture {
        db: crate::Database,
        from: String,
        to: String,
        product: String,
    }

    async fn fixture() -> Fixture {
        let db = testutil::test_db().await;
        let from = testutil::seed_store(&db, "Warehouse").await;
        let to = testutil::seed_store(&db, "Shopfront").await;
        let product = testutil::seed_product(&db, "SKU-1", 500).await;
        Fixture {
            db,
            from,
            to,
            product,
        }
    }

    #[tokio::test]
    async fn test_on_create_moves_stock_immediately() {
        let f = fixture().await;
        testutil::seed_inventory(&f.db, &f.from, &f.product, 10).await;

        let detail = f
            .db
            .requisitions()
            .create(CreateRequisitionInput {
                from_store_id: f.from.clone(),
                to_store_id: f.to.clone(),
                items: vec![new_item(&f.product, 4)],
                approved_by: None,
            })
            .await
            .unwrap();

        assert_eq!(detail.requisition.status, RequisitionStatus::Pending);
        assert_eq!(testutil::stock_of(&f.db, &f.from, &f.product).await, Some(6));
        assert_eq!(testutil::stock_of(&f.db, &f.to, &f.product).await, Some(4));
    }

    #[tokio::test]
    async fn test_create_records_approver() {
        let f = fixture().await;
        testutil::seed_inventory(&f.db, &f.from, &f.product, 10).await;

        let service = f.db.requisitions();
        let detail = service
            .create(CreateRequisitionInput {
                from_store_id: f.from.clone(),
                to_store_id: f.to.clone(),
                items: vec![new_item(&f.product, 2)],
                approved_by: Some("manager-7".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(detail.requisition.approved_by.as_deref(), Some("manager-7"));

        // Persisted, not just echoed back
        let fetched = service.get(&detail.requisition.id).await.unwrap();
        assert_eq!(fetched.requisition.approved_by.as_deref(), Some("manager-7"));
    }

    #[tokio::test]
    async fn test_on_create_approval_does_not_move_again() {
        let f = fixture().await;
        testutil::seed_inventory(&f.db, &f.from, &f.product, 10).await;

        let service = f.db.requisitions();
        let detail = service
            .create(CreateRequisitionInput {
                from_store_id: f.from.clone(),
                to_store_id: f.to.clone(),
                items: vec![new_item(&f.product, 4)],
                approved_by: None,
            })
            .await
            .unwrap();

        let updated = service
            .update(
                &detail.requisition.id,
                UpdateRequisitionInput {
                    status: Some(RequisitionStatus::Approved),
                    approved_by: Some("manager-1".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.requisition.status, RequisitionStatus::Approved);
        assert_eq!(updated.requisition.approved_by.as_deref(), Some("manager-1"));
        // Stock already moved at create; approval is a header touch only.
        assert_eq!(testutil::stock_of(&f.db, &f.from, &f.product).await, Some(6));
        assert_eq!(testutil::stock_of(&f.db, &f.to, &f.product).await, Some(4));
    }

    #[tokio::test]
    async fn test_on_approval_defers_movement() {
        let f = fixture().await;
        testutil::seed_inventory(&f.db, &f.from, &f.product, 10).await;

        let service = f
            .db
            .requisitions_with_policy(StockMovementPolicy::OnApproval);
        let detail = service
            .create(CreateRequisitionInput {
                from_store_id: f.from.clone(),
                to_store_id: f.to.clone(),
                items: vec![new_item(&f.product, 4)],
                approved_by: None,
            })
            .await
            .unwrap();

        // Nothing moved yet
        assert_eq!(testutil::stock_of(&f.db, &f.from, &f.product).await, Some(10));
        assert_eq!(testutil::stock_of(&f.db, &f.to, &f.product).await, None);

        service
            .update(
                &detail.requisition.id,
                UpdateRequisitionInput {
                    status: Some(RequisitionStatus::Approved),
                    approved_by: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(testutil::stock_of(&f.db, &f.from, &f.product).await, Some(6));
        assert_eq!(testutil::stock_of(&f.db, &f.to, &f.product).await, Some(4));
    }

    #[tokio::test]
    async fn test_on_approval_reapproval_moves_once() {
        let f = fixture().await;
        testutil::seed_inventory(&f.db, &f.from, &f.product, 10).await;

        let service = f
            .db
            .requisitions_with_policy(StockMovementPolicy::OnApproval);
        let detail = service
            .create(CreateRequisitionInput {
                from_store_id: f.from.clone(),
                to_store_id: f.to.clone(),
                items: vec![new_item(&f.product, 4)],
                approved_by: None,
            })
            .await
            .unwrap();

        for _ in 0..2 {
            service
                .update(
                    &detail.requisition.id,
                    UpdateRequisitionInput {
                        status: Some(RequisitionStatus::Approved),
                        approved_by: None,
                    },
                )
                .await
                .unwrap();
        }

        // Approved → Approved is not a Pending → Approved transition.
        assert_eq!(testutil::stock_of(&f.db, &f.from, &f.product).await, Some(6));
        assert_eq!(testutil::stock_of(&f.db, &f.to, &f.product).await, Some(4));
    }

    #[tokio::test]
    async fn test_on_approval_rejection_never_moves() {
        let f = fixture().await;
        testutil::seed_inventory(&f.db, &f.from, &f.product, 10).await;

        let service = f
            .db
            .requisitions_with_policy(StockMovementPolicy::OnApproval);
        let detail = service
            .create(CreateRequisitionInput {
                from_store_id: f.from.clone(),
                to_store_id: f.to.clone(),
                items: vec![new_item(&f.product, 4)],
                approved_by: None,
            })
            .await
            .unwrap();

        let updated = service
            .update(
                &detail.requisition.id,
                UpdateRequisitionInput {
                    status: Some(RequisitionStatus::Rejected),
                    approved_by: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.requisition.status, RequisitionStatus::Rejected);
        assert_eq!(testutil::stock_of(&f.db, &f.from, &f.product).await, Some(10));
        assert_eq!(testutil::stock_of(&f.db, &f.to, &f.product).await, None);
    }

    #[tokio::test]
    async fn test_same_store_pair_rejected_before_any_write() {
        let f = fixture().await;

        let err = f
            .db
            .requisitions()
            .create(CreateRequisitionInput {
                from_store_id: f.from.clone(),
                to_store_id: f.from.clone(),
                items: vec![new_item(&f.product, 1)],
                approved_by: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Validation(_)));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_requisitions")
            .fetch_one(f.db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_empty_items_rejected() {
        let f = fixture().await;

        let err = f
            .db
            .requisitions()
            .create(CreateRequisitionInput {
                from_store_id: f.from.clone(),
                to_store_id: f.to.clone(),
                items: vec![],
                approved_by: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_insufficient_from_store_rolls_back_everything() {
        let f = fixture().await;
        let other = testutil::seed_product(&f.db, "SKU-2", 300).await;
        testutil::seed_inventory(&f.db, &f.from, &f.product, 10).await;
        testutil::seed_inventory(&f.db, &f.from, &other, 0).await;

        // Product ids sort deterministically, but either order works: the
        // covered product's movement must roll back with the failed one.
        let err = f
            .db
            .requisitions()
            .create(CreateRequisitionInput {
                from_store_id: f.from.clone(),
                to_store_id: f.to.clone(),
                items: vec![new_item(&f.product, 5), new_item(&other, 1)],
                approved_by: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::InsufficientStock { .. }));

        assert_eq!(testutil::stock_of(&f.db, &f.from, &f.product).await, Some(10));
        assert_eq!(testutil::stock_of(&f.db, &f.from, &other).await, Some(0));
        assert_eq!(testutil::stock_of(&f.db, &f.to, &f.product).await, None);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_requisitions")
            .fetch_one(f.db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_duplicate_products_coalesce_into_one_movement() {
        let f = fixture().await;
        testutil::seed_inventory(&f.db, &f.from, &f.product, 10).await;

        f.db.requisitions()
            .create(CreateRequisitionInput {
                from_store_id: f.from.clone(),
                to_store_id: f.to.clone(),
                items: vec![new_item(&f.product, 2), new_item(&f.product, 3)],
                approved_by: None,
            })
            .await
            .unwrap();

        assert_eq!(testutil::stock_of(&f.db, &f.from, &f.product).await, Some(5));
        assert_eq!(testutil::stock_of(&f.db, &f.to, &f.product).await, Some(5));
    }

    #[tokio::test]
    async fn test_get_returns_items_ascending() {
        let f = fixture().await;
        let a = testutil::seed_product(&f.db, "SKU-A", 100).await;
        let b = testutil::seed_product(&f.db, "SKU-B", 100).await;
        testutil::seed_inventory(&f.db, &f.from, &a, 10).await;
        testutil::seed_inventory(&f.db, &f.from, &b, 10).await;

        let service = f.db.requisitions();
        let detail = service
            .create(CreateRequisitionInput {
                from_store_id: f.from.clone(),
                to_store_id: f.to.clone(),
                items: vec![new_item(&a, 1), new_item(&b, 2)],
                approved_by: None,
            })
            .await
            .unwrap();

        let fetched = service.get(&detail.requisition.id).await.unwrap();
        assert_eq!(fetched.items.len(), 2);
        let ids: Vec<&str> = fetched.items.iter().map(|i| i.product_id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[tokio::test]
    async fn test_update_missing_requisition() {
        let f = fixture().await;

        let err = f
            .db
            .requisitions()
            .update("missing", UpdateRequisitionInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
