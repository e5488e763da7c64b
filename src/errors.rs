//! Unified error types and result handling.
//!
//! Every command and query in the crate returns [`Result`]. Not-found variants
//! are raised both when a row genuinely does not exist and when it belongs to a
//! different owner, so cross-tenant probes are indistinguishable from misses.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// No authenticated principal was attached to the request.
    #[error("no authenticated principal")]
    Unauthenticated,

    /// The authenticated principal does not map to a known user.
    #[error("user not found: {username}")]
    UserNotFound {
        /// Principal that failed to resolve
        username: String,
    },

    /// Budget missing for this owner (or owned by someone else).
    #[error("budget not found: {id}")]
    BudgetNotFound {
        /// Requested budget id
        id: i64,
    },

    /// Category missing for this owner (or owned by someone else).
    #[error("category not found: {id}")]
    CategoryNotFound {
        /// Requested category id
        id: i64,
    },

    /// Transaction missing for this owner (or owned by someone else).
    #[error("transaction not found: {id}")]
    TransactionNotFound {
        /// Requested transaction id
        id: i64,
    },

    /// Structurally invalid input (missing required field, bad amount, ...).
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// What was wrong with the request
        message: String,
    },

    /// Business-rule violation in the category merge command. The entities
    /// exist; the operation on them is disallowed.
    #[error("invalid merge: {message}")]
    InvalidMerge {
        /// Which merge rule was violated
        message: String,
    },

    /// An active budget already covers the requested category and window.
    #[error("overlapping budget: {message}")]
    OverlappingBudget {
        /// Description of the conflicting budget
        message: String,
    },

    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Convenience `Result` type.
pub type Result<T> = std::result::Result<T, Error>;
