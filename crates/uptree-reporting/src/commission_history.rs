//! Commission history: every skim earned by an account, joined with the
//! transfer that produced it.

use serde::{Deserialize, Serialize};
use uptree_types::{AccountId, Commission, Money, Result, UptreeError};

use crate::Reporting;

/// One earned commission joined with its originating transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionEntry {
    pub commission: Commission,
    /// Gross amount of the transfer the commission was skimmed from.
    pub transfer_amount: Money,
    pub transfer_description: String,
    /// Username of the account whose transfer generated the skim.
    pub earned_from: String,
}

/// An account's full commission history, newest first, with the lifetime
/// total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionReport {
    pub entries: Vec<CommissionEntry>,
    pub total: Money,
}

impl Reporting {
    /// Build `id`'s commission history. Each entry references the debit
    /// transaction it was skimmed from; a dangling reference is a store
    /// consistency bug and fails the report.
    pub fn commission_history(&self, id: AccountId) -> Result<CommissionReport> {
        self.registry.get(id)?;

        let commissions = self.journal.commissions_for(id)?;
        let mut entries = Vec::with_capacity(commissions.len());
        for commission in commissions {
            let tx = self.journal.get(commission.transaction).map_err(|_| {
                UptreeError::ConsistencyViolation {
                    reason: format!(
                        "commission {} references missing transaction {}",
                        commission.id, commission.transaction
                    ),
                }
            })?;
            let earned_from = self
                .registry
                .get(tx.sender)
                .map_or_else(|_| "(unknown)".to_owned(), |a| a.username);
            entries.push(CommissionEntry {
                commission,
                transfer_amount: tx.amount,
                transfer_description: tx.description,
                earned_from,
            });
        }

        Ok(CommissionReport {
            total: self.journal.total_commission(id)?,
            entries,
        })
    }
}
