//! # uptree-engine
//!
//! **Write plane**: the transfer and credit engines, the collaborator seams
//! for credential hashing and challenge codes, and the [`LedgerService`]
//! facade that assembles the whole referral ledger.
//!
//! Money moves one hop down the tree: an account may transfer only to its
//! direct children, and a fixed-rate commission is skimmed to the sender's
//! parent on every transfer. All balance mutations run inside the ledger's
//! sorted-lock atomic sections and pair with append-only journal rows.

pub mod auth;
pub mod challenge;
pub mod credit;
pub mod service;
pub mod transfer;

pub use auth::{CredentialHasher, SaltedSha256Hasher};
pub use challenge::{ChallengeProvider, InMemoryChallenges};
pub use credit::{CreditEngine, CreditReceipt};
pub use service::LedgerService;
pub use transfer::{TransferEngine, TransferReceipt};
