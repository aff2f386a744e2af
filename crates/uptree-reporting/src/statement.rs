//! Account statements: the journal rows touching one account, joined with
//! counterparty usernames for display.

use serde::{Deserialize, Serialize};
use uptree_types::{AccountId, Money, Result, Transaction};

use crate::Reporting;

/// One statement row. `signed_amount` is positive for money in, negative
/// for money out, zero for rows that merely mention the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementEntry {
    pub transaction: Transaction,
    pub sender_username: String,
    pub receiver_username: String,
    pub signed_amount: Money,
}

impl StatementEntry {
    #[must_use]
    pub fn is_credit(&self) -> bool {
        self.signed_amount.minor() > 0
    }

    #[must_use]
    pub fn is_debit(&self) -> bool {
        self.signed_amount.minor() < 0
    }
}

impl Reporting {
    /// The statement for `id`: every journal row where the account appears
    /// as sender or receiver, newest first.
    ///
    /// Counterparty accounts removed from the registry render as
    /// `"(unknown)"` rather than failing the whole statement.
    pub fn statement(&self, id: AccountId) -> Result<Vec<StatementEntry>> {
        // Fail loudly for a viewer that does not exist at all.
        self.registry.get(id)?;

        let rows = self.journal.for_account(id)?;
        let mut entries = Vec::with_capacity(rows.len());
        for tx in rows {
            let signed_amount = Money::from_minor(tx.signed_amount_for(id));
            entries.push(StatementEntry {
                sender_username: self.username_or_unknown(tx.sender),
                receiver_username: self.username_or_unknown(tx.receiver),
                transaction: tx,
                signed_amount,
            });
        }
        Ok(entries)
    }

    fn username_or_unknown(&self, id: AccountId) -> String {
        self.registry
            .get(id)
            .map_or_else(|_| "(unknown)".to_owned(), |a| a.username)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uptree_store::{AccountRegistry, Journal, Ledger};
    use uptree_types::{Role, TransactionKind, UptreeError};

    use super::*;

    fn setup() -> (Reporting, Arc<AccountRegistry>, Arc<Journal>) {
        let registry = Arc::new(AccountRegistry::new());
        let ledger = Arc::new(Ledger::new(2_000));
        let journal = Arc::new(Journal::new());
        let reporting = Reporting::new(
            Arc::clone(&registry),
            Arc::clone(&ledger),
            Arc::clone(&journal),
        );
        (reporting, registry, journal)
    }

    #[test]
    fn statement_signs_rows_from_the_viewer_side() {
        let (reporting, registry, journal) = setup();
        let root = registry
            .insert_root("root", Role::Admin, "h".into())
            .unwrap();
        let kid = registry.insert_child(root.id, "kid", "h".into()).unwrap();

        journal
            .record(
                root.id,
                kid.id,
                Money::from_minor(5_000),
                TransactionKind::Credit,
                "Credit issued",
                None,
            )
            .unwrap();
        journal
            .record(
                kid.id,
                root.id,
                Money::from_minor(1_000),
                TransactionKind::Debit,
                "Transfer to root",
                Some(Money::from_minor(20)),
            )
            .unwrap();

        let statement = reporting.statement(kid.id).unwrap();
        assert_eq!(statement.len(), 2);

        // Newest first: the debit is on top.
        assert!(statement[0].is_debit());
        assert_eq!(statement[0].signed_amount, Money::from_minor(-1_000));
        assert_eq!(statement[0].sender_username, "kid");
        assert_eq!(statement[0].receiver_username, "root");

        assert!(statement[1].is_credit());
        assert_eq!(statement[1].signed_amount, Money::from_minor(5_000));
    }

    #[test]
    fn statement_for_unknown_account_errors() {
        let (reporting, _registry, _journal) = setup();
        let err = reporting.statement(AccountId::new()).unwrap_err();
        assert!(matches!(err, UptreeError::AccountNotFound(_)));
    }

    #[test]
    fn empty_statement_is_fine() {
        let (reporting, registry, _journal) = setup();
        let root = registry
            .insert_root("quiet", Role::User, "h".into())
            .unwrap();
        assert!(reporting.statement(root.id).unwrap().is_empty());
    }
}
