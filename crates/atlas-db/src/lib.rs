//! # Atlas DB
//!
//! SQLite persistence and transactional services for the Atlas POS backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                             atlas-db                                    │
//! │                                                                         │
//! │  ┌───────────────────────── service ─────────────────────────────┐     │
//! │  │  OrderService      RequisitionService      CustomerService    │     │
//! │  │  (one transaction boundary per mutating operation)            │     │
//! │  └───────────┬──────────────────┬──────────────────┬────────────┘     │
//! │              │                  │                  │                   │
//! │              ▼                  ▼                  ▼                   │
//! │  ┌──────── repository ────────┐   ┌─────────── ledger ────────────┐   │
//! │  │  orders, requisitions,     │   │  apply_stock / apply_balance  │   │
//! │  │  customers, products,      │   │  (the ONLY quantity/balance   │   │
//! │  │  stores, inventory (read)  │   │   mutation paths)             │   │
//! │  └────────────┬───────────────┘   └──────────────┬────────────────┘   │
//! │               │                                  │                    │
//! │               ▼                                  ▼                    │
//! │  ┌─────────────────────────────────────────────────────────────────┐  │
//! │  │        pool (SqlitePool, WAL) + migrations (embedded)           │  │
//! │  └─────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pure computation (the line-item differ, money, validation) lives in
//! `atlas-core`; this crate owns everything that touches SQLite.
//!
//! ## Usage
//! ```rust,ignore
//! use atlas_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./atlas.db")).await?;
//! let detail = db.orders().create(input).await?;
//! ```

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

#[cfg(test)]
mod testutil;

pub use error::{DbError, DbResult, ErrorKind};
pub use pool::{Database, DbConfig};
pub use service::customer::{CustomerBalance, CustomerService, DepositReceipt};
pub use service::order::{CreateOrderInput, OrderDetail, OrderService, UpdateOrderInput};
pub use service::requisition::{
    CreateRequisitionInput, RequisitionDetail, RequisitionService, StockMovementPolicy,
    UpdateRequisitionInput,
};
