//! Immutable transaction records — the append-only ledger log.
//!
//! Every balance mutation is documented by at least one `Transaction`; a
//! mutation without its record (or vice versa) is a consistency violation.
//! Balances are authoritative mutable counters, but the signed sum over this
//! log must always reconcile with them — see `Journal::derived_balance`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, Money, TransactionId};

/// Direction of a transaction row relative to its sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Funds arrive at the receiver.
    Credit,
    /// Funds leave the sender.
    Debit,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Credit => write!(f, "CREDIT"),
            Self::Debit => write!(f, "DEBIT"),
        }
    }
}

/// An immutable ledger entry. Never modified or deleted once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub sender: AccountId,
    pub receiver: AccountId,
    /// Always positive; direction comes from `kind`.
    pub amount: Money,
    pub kind: TransactionKind,
    pub description: String,
    /// Commission metadata on transfer DEBIT rows (the skimmed amount).
    pub commission: Option<Money>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// The signed minor-unit effect of this row on `account`'s balance:
    /// `+amount` for a CREDIT addressed to it, `-amount` for a DEBIT it sent,
    /// zero otherwise. Summing this over the whole log re-derives a balance.
    #[must_use]
    pub fn signed_amount_for(&self, account: AccountId) -> i64 {
        match self.kind {
            TransactionKind::Credit if self.receiver == account => self.amount.minor(),
            TransactionKind::Debit if self.sender == account => -self.amount.minor(),
            _ => 0,
        }
    }
}
