//! # Database Error Types
//!
//! Error types for database operations and the transactional services.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)          ValidationError (atlas-core)      │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  DbError (this module) ← Adds context and a STABLE kind                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  HTTP layer maps kind() / status_code() to the response                │
//! │    validation / insufficient_stock → 422                               │
//! │    not_found                       → 404                               │
//! │    conflict                        → 409                               │
//! │    busy (retryable)                → 503                               │
//! │    internal                        → 500                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error raised inside a transaction aborts it wholesale (the
//! transaction rolls back on drop), so `busy` is always safe to retry at the
//! request level.

use serde::Serialize;
use thiserror::Error;

/// Database and service operation errors.
///
/// These errors wrap sqlx errors and core validation errors and provide the
/// stable taxonomy the HTTP layer exposes.
#[derive(Debug, Error)]
pub enum DbError {
    /// Input failed a business rule before any write happened.
    #[error("validation failed: {0}")]
    Validation(#[from] atlas_core::ValidationError),

    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A stock delta would take an inventory row below zero.
    ///
    /// Carries the offending (store, product) pair plus what was available
    /// versus requested, so the client can show a precise message.
    #[error(
        "insufficient stock for product {product_id} at store {store_id}: \
         available {available}, requested {requested}"
    )]
    InsufficientStock {
        store_id: String,
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Lock-wait timeout or writer contention.
    ///
    /// Safe to retry the whole request: the transaction boundary guarantees
    /// no partial writes survive the abort.
    #[error("database busy: {0}")]
    Busy(String),

    /// Unique constraint violation (duplicate SKU, etc.).
    #[error("duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Internal database error.
    #[error("internal database error: {0}")]
    Internal(String),
}

/// Stable error kinds exposed to the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    InsufficientStock,
    Conflict,
    Busy,
    Internal,
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Returns the stable kind for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::Validation(_) => ErrorKind::Validation,
            DbError::NotFound { .. } => ErrorKind::NotFound,
            DbError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            DbError::Busy(_) => ErrorKind::Busy,
            DbError::UniqueViolation { .. } | DbError::ForeignKeyViolation { .. } => {
                ErrorKind::Conflict
            }
            DbError::ConnectionFailed(_)
            | DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// HTTP status code for this error's kind.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::InsufficientStock => 422,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Busy => 503,
            ErrorKind::Internal => 500,
        }
    }

    /// Whether the whole request may be retried safely.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Busy)
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint / busy type
/// sqlx::Error::PoolTimedOut   → DbError::Busy (retryable)
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite error messages for constraints:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                // Writer contention: "database is locked" (SQLITE_BUSY)
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("database is locked")
                    || msg.contains("database table is locked")
                {
                    DbError::Busy(msg.to_string())
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => {
                DbError::Busy("connection pool timed out".to_string())
            }

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================
