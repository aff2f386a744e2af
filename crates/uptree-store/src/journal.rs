//! The transaction recorder: an append-only log of transactions and
//! commissions.
//!
//! Records are appended inside the same ledger atomic section as the balance
//! mutation they document, never modified, and never deleted. The signed sum
//! over the log re-derives any account's balance — [`Journal::derived_balance`]
//! is the oracle the tests reconcile the authoritative counters against.

use std::sync::Mutex;

use chrono::Utc;
use rust_decimal::Decimal;
use uptree_types::{
    AccountId, Commission, CommissionId, Money, Result, Transaction, TransactionId,
    TransactionKind, UptreeError,
};

#[derive(Default)]
struct JournalInner {
    transactions: Vec<Transaction>,
    commissions: Vec<Commission>,
}

/// Append-only transaction and commission log.
#[derive(Default)]
pub struct Journal {
    inner: Mutex<JournalInner>,
}

impl Journal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transaction record. Returns its id for linking commissions.
    pub fn record(
        &self,
        sender: AccountId,
        receiver: AccountId,
        amount: Money,
        kind: TransactionKind,
        description: impl Into<String>,
        commission: Option<Money>,
    ) -> Result<TransactionId> {
        let tx = Transaction {
            id: TransactionId::new(),
            sender,
            receiver,
            amount,
            kind,
            description: description.into(),
            commission,
            created_at: Utc::now(),
        };
        let id = tx.id;
        self.lock()?.transactions.push(tx);
        Ok(id)
    }

    /// Append a commission record referencing the transaction it was
    /// skimmed from.
    pub fn record_commission(
        &self,
        beneficiary: AccountId,
        transaction: TransactionId,
        amount: Money,
        rate: Decimal,
    ) -> Result<CommissionId> {
        let commission = Commission::new(beneficiary, transaction, amount, rate);
        let id = commission.id;
        self.lock()?.commissions.push(commission);
        Ok(id)
    }

    /// Fetch a transaction by id.
    pub fn get(&self, id: TransactionId) -> Result<Transaction> {
        self.lock()?
            .transactions
            .iter()
            .find(|tx| tx.id == id)
            .cloned()
            .ok_or(UptreeError::TransactionNotFound(id))
    }

    /// All transactions involving `account` (as sender or receiver),
    /// newest first.
    pub fn for_account(&self, account: AccountId) -> Result<Vec<Transaction>> {
        Ok(self
            .lock()?
            .transactions
            .iter()
            .rev()
            .filter(|tx| tx.sender == account || tx.receiver == account)
            .cloned()
            .collect())
    }

    /// All commissions earned by `beneficiary`, newest first.
    pub fn commissions_for(&self, beneficiary: AccountId) -> Result<Vec<Commission>> {
        Ok(self
            .lock()?
            .commissions
            .iter()
            .rev()
            .filter(|c| c.beneficiary == beneficiary)
            .cloned()
            .collect())
    }

    /// Total commission earned by `beneficiary` since genesis.
    pub fn total_commission(&self, beneficiary: AccountId) -> Result<Money> {
        let total: i128 = self
            .lock()?
            .commissions
            .iter()
            .filter(|c| c.beneficiary == beneficiary)
            .map(|c| i128::from(c.amount.minor()))
            .sum();
        i64::try_from(total)
            .map(Money::from_minor)
            .map_err(|_| UptreeError::BalanceOverflow)
    }

    /// Re-derive `account`'s balance from the log alone: the sum of signed
    /// amounts over every row. Must equal the ledger's counter at any
    /// quiescent point.
    pub fn derived_balance(&self, account: AccountId) -> Result<Money> {
        let total: i128 = self
            .lock()?
            .transactions
            .iter()
            .map(|tx| i128::from(tx.signed_amount_for(account)))
            .sum();
        i64::try_from(total)
            .map(Money::from_minor)
            .map_err(|_| UptreeError::BalanceOverflow)
    }

    /// Number of transaction records.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.transactions.len())
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.transactions.is_empty())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, JournalInner>> {
        self.inner
            .lock()
            .map_err(|_| UptreeError::Internal("poisoned journal lock".into()))
    }
}
