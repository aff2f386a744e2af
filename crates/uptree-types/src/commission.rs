//! Commission records — the audit trail of skimmed transfer fees.
//!
//! A `Commission` row is created only as a side effect of a transfer whose
//! sender has a parent. It references the DEBIT transaction it was skimmed
//! from and is immutable once written.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, CommissionId, Money, TransactionId};

/// An immutable commission entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commission {
    pub id: CommissionId,
    /// The account that received the commission (the sender's parent).
    pub beneficiary: AccountId,
    /// The DEBIT transaction this commission was skimmed from.
    pub transaction: TransactionId,
    pub amount: Money,
    /// The fractional rate that was applied (e.g. 0.02 for 2%).
    pub rate: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Commission {
    #[must_use]
    pub fn new(
        beneficiary: AccountId,
        transaction: TransactionId,
        amount: Money,
        rate: Decimal,
    ) -> Self {
        Self {
            id: CommissionId::new(),
            beneficiary,
            transaction,
            amount,
            rate,
            created_at: Utc::now(),
        }
    }
}
