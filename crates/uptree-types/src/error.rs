//! Error types for the uptree referral ledger.
//!
//! All errors use the `UT_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Account / identity errors
//! - 2xx: Balance / amount errors
//! - 3xx: Authorization errors
//! - 4xx: Contention errors (retryable)
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{AccountId, Money, TransactionId};

/// Central error enum for all uptree operations.
#[derive(Debug, Error)]
pub enum UptreeError {
    // =================================================================
    // Account / Identity Errors (1xx)
    // =================================================================
    /// The requested account does not exist.
    #[error("UT_ERR_100: Account not found: {0}")]
    AccountNotFound(AccountId),

    /// An account with this username already exists.
    #[error("UT_ERR_101: Username already taken: {username}")]
    DuplicateUsername { username: String },

    /// The username fails the length policy (3–50 characters).
    #[error("UT_ERR_102: Invalid username: {reason}")]
    InvalidUsername { reason: String },

    /// The password fails the minimum-length policy.
    #[error("UT_ERR_103: Password too weak: must be at least {min_len} characters")]
    WeakPassword { min_len: usize },

    /// Username/password pair did not verify.
    #[error("UT_ERR_104: Invalid credentials")]
    InvalidCredentials,

    /// The requested transaction record does not exist.
    #[error("UT_ERR_105: Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    // =================================================================
    // Balance / Amount Errors (2xx)
    // =================================================================
    /// The supplied amount is zero, negative, or unrepresentable.
    #[error("UT_ERR_200: Invalid amount: {value} (must be a positive decimal)")]
    InvalidAmount { value: Decimal },

    /// Not enough balance to perform the debit.
    #[error("UT_ERR_201: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Money, available: Money },

    /// A balance operation would overflow the minor-unit counter.
    #[error("UT_ERR_202: Balance arithmetic overflow")]
    BalanceOverflow,

    // =================================================================
    // Authorization Errors (3xx)
    // =================================================================
    /// Transfers are only allowed to direct (next-level) children.
    #[error("UT_ERR_300: Unauthorized transfer: {receiver} is not a direct child of {actor}")]
    UnauthorizedTransfer {
        actor: AccountId,
        receiver: AccountId,
    },

    /// The actor is not permitted to perform this action.
    #[error("UT_ERR_301: Unauthorized action: {reason}")]
    UnauthorizedAction { reason: String },

    // =================================================================
    // Contention Errors (4xx) — retryable
    // =================================================================
    /// Could not acquire the account row locks within the deadline.
    /// The caller may retry the whole operation.
    #[error("UT_ERR_400: Lock acquisition timed out after {waited_ms}ms on account {account}")]
    LockTimeout { account: AccountId, waited_ms: u64 },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// An internal invariant was broken (cycle in the parent graph, ledger
    /// row missing for a registered account, ...). Fatal: must abort the
    /// enclosing operation and never be silently swallowed.
    #[error("UT_ERR_900: Consistency violation: {reason}")]
    ConsistencyViolation { reason: String },

    /// Unrecoverable internal error.
    #[error("UT_ERR_901: Internal error: {0}")]
    Internal(String),

    /// Configuration error (invalid commission rate, zero timeout, ...).
    #[error("UT_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

impl UptreeError {
    /// Whether the caller may retry the operation verbatim.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockTimeout { .. })
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, UptreeError>;
