//! # Transactional Services
//!
//! The orchestrators the HTTP layer calls 1:1. Each mutating operation opens
//! one transaction boundary, threads it through the repositories and
//! ledgers, and commits only when every staged write succeeded.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST   /orders                    → OrderService::create              │
//! │  PUT    /orders/{id}               → OrderService::update              │
//! │  DELETE /orders/{id}               → OrderService::delete              │
//! │  POST   /stock-requisitions        → RequisitionService::create        │
//! │  PUT    /stock-requisitions/{id}   → RequisitionService::update        │
//! │  POST   /customers/{id}/deposit    → CustomerService::deposit          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod customer;
pub mod order;
pub mod requisition;
