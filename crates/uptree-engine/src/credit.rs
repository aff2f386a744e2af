//! The credit engine: admin-issued credits and root self-recharge.
//!
//! Credits are the only paths by which value enters the network. A credit to
//! a root account (or a self-recharge) is fresh issuance; a credit to a
//! non-root account is *not* — it is funded by debiting the target's
//! immediate parent, whoever the acting admin happens to be.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uptree_store::{AccountRegistry, ConservationTracker, Journal, Ledger};
use uptree_types::{AccountId, Money, Result, TransactionId, TransactionKind, UptreeError};

/// Outcome of a committed credit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditReceipt {
    pub target: AccountId,
    pub amount: Money,
    /// The parent account that funded the credit; `None` for fresh issuance
    /// (root credit or self-recharge).
    pub funded_by: Option<AccountId>,
    pub transactions: Vec<TransactionId>,
}

/// Executes credits against shared store handles.
pub struct CreditEngine {
    registry: Arc<AccountRegistry>,
    ledger: Arc<Ledger>,
    journal: Arc<Journal>,
    tracker: Arc<ConservationTracker>,
}

impl CreditEngine {
    #[must_use]
    pub fn new(
        registry: Arc<AccountRegistry>,
        ledger: Arc<Ledger>,
        journal: Arc<Journal>,
        tracker: Arc<ConservationTracker>,
    ) -> Self {
        Self {
            registry,
            ledger,
            journal,
            tracker,
        }
    }

    /// Credit `amount` (major units) to `target` on behalf of `actor`.
    ///
    /// Root targets receive fresh issuance. Non-root targets are funded by
    /// debiting their immediate parent, which must cover the amount.
    ///
    /// Role enforcement lives in the service facade; the engine only cares
    /// about the money movement.
    pub fn issue_credit(
        &self,
        actor: AccountId,
        target: AccountId,
        amount: Decimal,
    ) -> Result<CreditReceipt> {
        let money = Money::parse_amount(amount)?;
        let target_account = self.registry.get(target)?;

        let receipt = match target_account.parent {
            None => self.issue_to_root(actor, target, money)?,
            Some(parent) => self.reallocate_from_parent(parent, target, money)?,
        };

        tracing::info!(
            actor = %actor,
            target = %target,
            amount = %money,
            funded_by = ?receipt.funded_by,
            "Credit committed"
        );
        Ok(receipt)
    }

    /// A root account tops up its own balance. Fresh issuance.
    ///
    /// # Errors
    /// `UnauthorizedAction` when `actor` is not a root account.
    pub fn self_recharge(&self, actor: AccountId, amount: Decimal) -> Result<CreditReceipt> {
        let money = Money::parse_amount(amount)?;
        let account = self.registry.get(actor)?;
        if !account.is_root() {
            tracing::warn!(actor = %actor, "Self-recharge rejected: not a root account");
            return Err(UptreeError::UnauthorizedAction {
                reason: "only a root account may recharge itself".into(),
            });
        }

        let receipt = self.ledger.with_accounts(&[actor], |view| {
            view.credit(actor, money)?;
            let tx = self.journal.record(
                actor,
                actor,
                money,
                TransactionKind::Credit,
                "Self Recharge",
                None,
            )?;
            self.tracker.record_issued(money)?;
            Ok(CreditReceipt {
                target: actor,
                amount: money,
                funded_by: None,
                transactions: vec![tx],
            })
        })?;

        tracing::info!(actor = %actor, amount = %money, "Self-recharge committed");
        Ok(receipt)
    }

    fn issue_to_root(
        &self,
        actor: AccountId,
        target: AccountId,
        money: Money,
    ) -> Result<CreditReceipt> {
        self.ledger.with_accounts(&[target], |view| {
            view.credit(target, money)?;
            let tx = self.journal.record(
                actor,
                target,
                money,
                TransactionKind::Credit,
                "Admin Credit",
                None,
            )?;
            self.tracker.record_issued(money)?;
            Ok(CreditReceipt {
                target,
                amount: money,
                funded_by: None,
                transactions: vec![tx],
            })
        })
    }

    fn reallocate_from_parent(
        &self,
        parent: AccountId,
        target: AccountId,
        money: Money,
    ) -> Result<CreditReceipt> {
        let target_name = self.registry.get(target)?.username;
        self.ledger.with_accounts(&[parent, target], |view| {
            // Validate both sides before mutating: sufficiency on the
            // funding parent, overflow headroom on the target.
            let available = view.balance(parent)?;
            if available < money {
                return Err(UptreeError::InsufficientBalance {
                    needed: money,
                    available,
                });
            }
            view.balance(target)?.checked_add(money)?;

            view.debit(parent, money)?;
            view.credit(target, money)?;

            let debit_tx = self.journal.record(
                parent,
                target,
                money,
                TransactionKind::Debit,
                format!("Credit allocation to {target_name}"),
                None,
            )?;
            let credit_tx = self.journal.record(
                parent,
                target,
                money,
                TransactionKind::Credit,
                "Admin Credit",
                None,
            )?;
            Ok(CreditReceipt {
                target,
                amount: money,
                funded_by: Some(parent),
                transactions: vec![debit_tx, credit_tx],
            })
        })
    }
}
