//! # Repositories
//!
//! Row-level persistence functions, one module per aggregate.
//!
//! ## Design: connection-taking functions, not pool-bound structs
//! Every function takes `&mut SqliteConnection` so it composes inside the
//! caller's transaction boundary. A service opens `db.begin()` once and
//! threads the same connection through every repository and ledger call; a
//! single `?` anywhere rolls the whole unit of work back.
//!
//! Reads that don't need transactional consistency acquire a pool connection
//! at the service layer and call the same functions.

pub mod customer;
pub mod inventory;
pub mod order;
pub mod product;
pub mod requisition;
pub mod store;
