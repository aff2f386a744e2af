//! The transfer engine: one-hop downward money moves with commission
//! skimming.
//!
//! A transfer debits the sender the gross amount, credits the receiver the
//! net (gross minus commission), and credits the commission to the sender's
//! parent. A root sender has no parent, so its commission is debited but
//! credited nowhere — the value leaks out of the network. That leak is a
//! product decision, kept observable through the [`ConservationTracker`].
//!
//! Preconditions are checked in a fixed order so callers see a stable first
//! failure: amount shape, then the one-hop authorization gate, then
//! sufficiency under the row lock.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uptree_store::{AccountRegistry, ConservationTracker, Journal, Ledger};
use uptree_types::{AccountId, Money, Result, TransactionId, TransactionKind, UptreeError};

/// Outcome of a committed transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// The debit transaction anchoring the transfer. Commission rows
    /// reference this id.
    pub transaction: TransactionId,
    pub actor: AccountId,
    pub receiver: AccountId,
    pub gross: Money,
    pub net: Money,
    pub commission: Money,
    /// Who received the commission; `None` means the sender is a root and
    /// the commission leaked.
    pub beneficiary: Option<AccountId>,
}

/// Executes transfers against shared store handles.
pub struct TransferEngine {
    registry: Arc<AccountRegistry>,
    ledger: Arc<Ledger>,
    journal: Arc<Journal>,
    tracker: Arc<ConservationTracker>,
    rate: Decimal,
}

impl TransferEngine {
    #[must_use]
    pub fn new(
        registry: Arc<AccountRegistry>,
        ledger: Arc<Ledger>,
        journal: Arc<Journal>,
        tracker: Arc<ConservationTracker>,
        rate: Decimal,
    ) -> Self {
        Self {
            registry,
            ledger,
            journal,
            tracker,
            rate,
        }
    }

    /// Transfer `amount` (major units) from `actor` to `receiver`.
    ///
    /// # Errors
    /// `InvalidAmount` for a non-positive or unrepresentable amount;
    /// `UnauthorizedTransfer` unless `receiver` is a direct child of `actor`;
    /// `InsufficientBalance` when the actor cannot cover the gross amount
    /// (checked under the row lock); `LockTimeout` under contention.
    pub fn transfer(
        &self,
        actor: AccountId,
        receiver: AccountId,
        amount: Decimal,
    ) -> Result<TransferReceipt> {
        let gross = Money::parse_amount(amount)?;

        let sender = self.registry.get(actor)?;
        if !self.registry.is_direct_child(actor, receiver)? {
            tracing::warn!(
                actor = %actor,
                receiver = %receiver,
                "Transfer rejected: receiver is not a direct child"
            );
            return Err(UptreeError::UnauthorizedTransfer { actor, receiver });
        }

        let commission = gross.apply_rate(self.rate)?;
        let net = gross.checked_sub(commission)?;
        let beneficiary = sender.parent;
        let receiver_name = self.registry.get(receiver)?.username;

        let mut involved = vec![actor, receiver];
        if let Some(parent) = beneficiary {
            involved.push(parent);
        }

        let receipt = self.ledger.with_accounts(&involved, |view| {
            // Validate everything before the first mutation: sufficiency on
            // the debit side, overflow headroom on every credited row. The
            // section either commits whole or leaves no trace.
            let available = view.balance(actor)?;
            if available < gross {
                return Err(UptreeError::InsufficientBalance {
                    needed: gross,
                    available,
                });
            }
            if !net.is_zero() {
                view.balance(receiver)?.checked_add(net)?;
            }
            if let Some(parent) = beneficiary {
                if !commission.is_zero() {
                    view.balance(parent)?.checked_add(commission)?;
                }
            }

            view.debit(actor, gross)?;

            let debit_tx = self.journal.record(
                actor,
                receiver,
                gross,
                TransactionKind::Debit,
                format!("Transfer to {receiver_name}"),
                Some(commission),
            )?;

            if !commission.is_zero() {
                if let Some(parent) = beneficiary {
                    view.credit(parent, commission)?;
                    self.journal.record(
                        actor,
                        parent,
                        commission,
                        TransactionKind::Credit,
                        format!("Commission from {}", sender.username),
                        None,
                    )?;
                    self.journal
                        .record_commission(parent, debit_tx, commission, self.rate)?;
                } else {
                    self.tracker.record_leak(commission)?;
                }
            }

            if !net.is_zero() {
                view.credit(receiver, net)?;
                self.journal.record(
                    actor,
                    receiver,
                    net,
                    TransactionKind::Credit,
                    format!("Transfer from {}", sender.username),
                    None,
                )?;
            }

            Ok(TransferReceipt {
                transaction: debit_tx,
                actor,
                receiver,
                gross,
                net,
                commission,
                beneficiary: if commission.is_zero() { None } else { beneficiary },
            })
        })?;

        tracing::info!(
            transaction = %receipt.transaction,
            actor = %actor,
            receiver = %receiver,
            gross = %gross,
            net = %net,
            commission = %commission,
            leaked = receipt.beneficiary.is_none() && !commission.is_zero(),
            "Transfer committed"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use uptree_types::Role;

    use super::*;

    struct Fixture {
        registry: Arc<AccountRegistry>,
        ledger: Arc<Ledger>,
        journal: Arc<Journal>,
        tracker: Arc<ConservationTracker>,
        engine: TransferEngine,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(AccountRegistry::new());
        let ledger = Arc::new(Ledger::new(2_000));
        let journal = Arc::new(Journal::new());
        let tracker = Arc::new(ConservationTracker::new());
        let engine = TransferEngine::new(
            Arc::clone(&registry),
            Arc::clone(&ledger),
            Arc::clone(&journal),
            Arc::clone(&tracker),
            Decimal::new(2, 2),
        );
        Fixture {
            registry,
            ledger,
            journal,
            tracker,
            engine,
        }
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    impl Fixture {
        fn account_with_balance(&self, username: &str, minor: i64) -> AccountId {
            let acct = self
                .registry
                .insert_root(username, Role::User, "h".into())
                .unwrap();
            self.ledger.open_account(acct.id).unwrap();
            if minor > 0 {
                self.ledger
                    .credit(acct.id, Money::from_minor(minor))
                    .unwrap();
            }
            acct.id
        }

        fn child_of(&self, parent: AccountId, username: &str) -> AccountId {
            let acct = self
                .registry
                .insert_child(parent, username, "h".into())
                .unwrap();
            self.ledger.open_account(acct.id).unwrap();
            acct.id
        }
    }

    #[test]
    fn transfer_splits_gross_into_net_and_commission() {
        let fx = fixture();
        let root = fx.account_with_balance("root", 0);
        let mid = fx.child_of(root, "mid");
        let leaf = fx.child_of(mid, "leaf");
        fx.ledger.credit(mid, Money::from_minor(10_000)).unwrap();

        let receipt = fx.engine.transfer(mid, leaf, dec("50")).unwrap();

        // 2% of 50.00 = 1.00 commission, 49.00 net.
        assert_eq!(receipt.gross, Money::from_minor(5_000));
        assert_eq!(receipt.commission, Money::from_minor(100));
        assert_eq!(receipt.net, Money::from_minor(4_900));
        assert_eq!(receipt.beneficiary, Some(root));

        assert_eq!(fx.ledger.balance(mid).unwrap(), Money::from_minor(5_000));
        assert_eq!(fx.ledger.balance(leaf).unwrap(), Money::from_minor(4_900));
        assert_eq!(fx.ledger.balance(root).unwrap(), Money::from_minor(100));

        // Three journal rows plus the commission record.
        assert_eq!(fx.journal.len().unwrap(), 3);
        let commissions = fx.journal.commissions_for(root).unwrap();
        assert_eq!(commissions.len(), 1);
        assert_eq!(commissions[0].transaction, receipt.transaction);
    }

    #[test]
    fn rootless_sender_commission_leaks() {
        let fx = fixture();
        let root = fx.account_with_balance("root", 10_000);
        let kid = fx.child_of(root, "kid");

        let receipt = fx.engine.transfer(root, kid, dec("50")).unwrap();

        assert_eq!(receipt.beneficiary, None);
        assert_eq!(fx.ledger.balance(root).unwrap(), Money::from_minor(5_000));
        assert_eq!(fx.ledger.balance(kid).unwrap(), Money::from_minor(4_900));
        // Nobody holds the 1.00 commission.
        assert_eq!(
            fx.tracker.total_leaked().unwrap(),
            Decimal::new(100, 2)
        );
        // Two rows only: no commission credit.
        assert_eq!(fx.journal.len().unwrap(), 2);
    }

    #[test]
    fn grandchild_transfer_rejected_without_state_change() {
        let fx = fixture();
        let root = fx.account_with_balance("root", 10_000);
        let kid = fx.child_of(root, "kid");
        let grandkid = fx.child_of(kid, "grandkid");

        let err = fx.engine.transfer(root, grandkid, dec("10")).unwrap_err();
        assert!(matches!(err, UptreeError::UnauthorizedTransfer { .. }));

        assert_eq!(fx.ledger.balance(root).unwrap(), Money::from_minor(10_000));
        assert_eq!(fx.ledger.balance(grandkid).unwrap(), Money::ZERO);
        assert!(fx.journal.is_empty().unwrap());
    }

    #[test]
    fn upward_transfer_rejected() {
        let fx = fixture();
        let root = fx.account_with_balance("root", 0);
        let kid = fx.child_of(root, "kid");
        fx.ledger.credit(kid, Money::from_minor(1_000)).unwrap();

        let err = fx.engine.transfer(kid, root, dec("5")).unwrap_err();
        assert!(matches!(err, UptreeError::UnauthorizedTransfer { .. }));
    }

    #[test]
    fn insufficient_balance_rejected_without_state_change() {
        let fx = fixture();
        let root = fx.account_with_balance("root", 10_000);
        let kid = fx.child_of(root, "kid");

        // Balance 100.00, transfer 150.00.
        let err = fx.engine.transfer(root, kid, dec("150")).unwrap_err();
        assert!(matches!(err, UptreeError::InsufficientBalance { .. }));
        assert_eq!(fx.ledger.balance(root).unwrap(), Money::from_minor(10_000));
        assert_eq!(fx.ledger.balance(kid).unwrap(), Money::ZERO);
        assert!(fx.journal.is_empty().unwrap());
    }

    #[test]
    fn amount_gate_fires_before_authorization() {
        let fx = fixture();
        let root = fx.account_with_balance("root", 10_000);
        let kid = fx.child_of(root, "kid");
        let grandkid = fx.child_of(kid, "grandkid");

        // Bad amount to a bad receiver: the amount error wins.
        let err = fx.engine.transfer(root, grandkid, dec("-5")).unwrap_err();
        assert!(matches!(err, UptreeError::InvalidAmount { .. }));
    }

    #[test]
    fn commission_rounds_half_up() {
        let fx = fixture();
        let root = fx.account_with_balance("root", 0);
        let mid = fx.child_of(root, "mid");
        let leaf = fx.child_of(mid, "leaf");
        fx.ledger.credit(mid, Money::from_minor(1_000)).unwrap();

        // 2% of 0.25 = 0.005 -> 0.01 commission, 0.24 net.
        let receipt = fx.engine.transfer(mid, leaf, dec("0.25")).unwrap();
        assert_eq!(receipt.commission, Money::from_minor(1));
        assert_eq!(receipt.net, Money::from_minor(24));
        assert_eq!(fx.ledger.balance(root).unwrap(), Money::from_minor(1));
    }

    #[test]
    fn receiver_overflow_leaves_no_partial_state() {
        let fx = fixture();
        let root = fx.account_with_balance("root", 0);
        let mid = fx.child_of(root, "mid");
        let leaf = fx.child_of(mid, "leaf");
        fx.ledger.credit(mid, Money::from_minor(10_000)).unwrap();
        // The receiver sits close enough to the counter ceiling that the
        // net credit cannot fit.
        fx.ledger
            .credit(leaf, Money::from_minor(i64::MAX - 100))
            .unwrap();

        let err = fx.engine.transfer(mid, leaf, dec("50")).unwrap_err();
        assert!(matches!(err, UptreeError::BalanceOverflow));

        // The sender's debit and its journal row must not have landed.
        assert_eq!(fx.ledger.balance(mid).unwrap(), Money::from_minor(10_000));
        assert_eq!(
            fx.ledger.balance(leaf).unwrap(),
            Money::from_minor(i64::MAX - 100)
        );
        assert!(fx.journal.is_empty().unwrap());
    }

    #[test]
    fn concurrent_double_spend_only_one_wins() {
        let fx = fixture();
        let root = fx.account_with_balance("root", 0);
        let mid = fx.child_of(root, "mid");
        let a = fx.child_of(mid, "aaa");
        let b = fx.child_of(mid, "bbb");
        fx.ledger.credit(mid, Money::from_minor(10_000)).unwrap();

        // Balance 100: two concurrent 60-unit transfers, one must lose.
        let engine = Arc::new(fx.engine);
        let handles: Vec<_> = [a, b]
            .into_iter()
            .map(|receiver| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || engine.transfer(mid, receiver, dec("60")).is_ok())
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1);
        assert_eq!(fx.ledger.balance(mid).unwrap(), Money::from_minor(4_000));
    }

    #[test]
    fn balances_reconcile_against_the_journal() {
        let fx = fixture();
        let root = fx.account_with_balance("root", 0);
        let mid = fx.child_of(root, "mid");
        let leaf = fx.child_of(mid, "leaf");
        fx.ledger.credit(mid, Money::from_minor(10_000)).unwrap();
        fx.journal
            .record(
                mid,
                mid,
                Money::from_minor(10_000),
                TransactionKind::Credit,
                "Seed",
                None,
            )
            .unwrap();

        fx.engine.transfer(mid, leaf, dec("30")).unwrap();
        fx.engine.transfer(mid, leaf, dec("12.5")).unwrap();

        for id in [root, mid, leaf] {
            assert_eq!(
                fx.ledger.balance(id).unwrap(),
                fx.journal.derived_balance(id).unwrap(),
                "counter and journal diverged"
            );
        }
    }
}
