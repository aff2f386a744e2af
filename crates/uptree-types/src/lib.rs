//! # uptree-types
//!
//! Shared types, errors, and configuration for the **uptree** referral ledger.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`TransactionId`], [`CommissionId`]
//! - **Money**: [`Money`] (fixed-point minor units, two decimal places)
//! - **Account model**: [`Account`], [`Role`]
//! - **Transaction model**: [`Transaction`], [`TransactionKind`]
//! - **Commission model**: [`Commission`]
//! - **Configuration**: [`EngineConfig`]
//! - **Errors**: [`UptreeError`] with `UT_ERR_` prefix codes

pub mod account;
pub mod commission;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod money;
pub mod transaction;

// Re-export the primary types at crate root for ergonomic imports:
//   use uptree_types::{Account, Money, Transaction, UptreeError, ...};

pub use account::*;
pub use commission::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use money::*;
pub use transaction::*;

// Constants are accessed via `uptree_types::constants::FOO`
// (not re-exported to avoid name collisions).
