//! The ledger: authoritative balance counters with per-account row locks.
//!
//! Every account gets one row, an `Arc<Mutex<i64>>` of minor units. Single
//! credits/debits lock one row; multi-account money moves go through
//! [`Ledger::with_accounts`], which acquires the involved rows in ascending
//! `AccountId` order (two transfers moving money in opposite directions
//! between the same pair cannot deadlock) under a bounded deadline.
//! Sufficiency checks happen while the row lock is held, so a concurrent
//! double-spend always observes the post-debit balance.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, TryLockError};
use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use uptree_types::{AccountId, Money, Result, UptreeError};

/// Balance store. Engines share it behind an `Arc`.
pub struct Ledger {
    rows: RwLock<HashMap<AccountId, Arc<Mutex<i64>>>>,
    lock_timeout: Duration,
}

impl Ledger {
    #[must_use]
    pub fn new(lock_timeout_ms: u64) -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            lock_timeout: Duration::from_millis(lock_timeout_ms),
        }
    }

    /// Open a zero-balance row for a newly registered account.
    ///
    /// # Errors
    /// A pre-existing row means registration double-fired —
    /// `ConsistencyViolation`.
    pub fn open_account(&self, id: AccountId) -> Result<()> {
        let mut rows = self.write_rows()?;
        if rows.contains_key(&id) {
            return Err(UptreeError::ConsistencyViolation {
                reason: format!("ledger row for {id} already exists"),
            });
        }
        rows.insert(id, Arc::new(Mutex::new(0)));
        Ok(())
    }

    /// Increase `id`'s balance by `amount` (> 0). Returns the new balance.
    pub fn credit(&self, id: AccountId, amount: Money) -> Result<Money> {
        require_positive(amount)?;
        let row = self.row(id)?;
        let mut guard = self.lock_row(id, &row)?;
        let next = Money::from_minor(*guard).checked_add(amount)?;
        *guard = next.minor();
        Ok(next)
    }

    /// Decrease `id`'s balance by `amount` (> 0). The balance never goes
    /// negative: an insufficient row rejects the whole debit.
    pub fn debit(&self, id: AccountId, amount: Money) -> Result<Money> {
        require_positive(amount)?;
        let row = self.row(id)?;
        let mut guard = self.lock_row(id, &row)?;
        let available = Money::from_minor(*guard);
        if available < amount {
            return Err(UptreeError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        let next = available.checked_sub(amount)?;
        *guard = next.minor();
        Ok(next)
    }

    /// Current balance of `id`.
    pub fn balance(&self, id: AccountId) -> Result<Money> {
        let row = self.row(id)?;
        let guard = self.lock_row(id, &row)?;
        Ok(Money::from_minor(*guard))
    }

    /// Sum of all balances. Reporting snapshot: rows are read one at a time,
    /// so a concurrent transfer may be half-counted — benign staleness.
    pub fn total(&self) -> Result<Decimal> {
        let rows: Vec<(AccountId, Arc<Mutex<i64>>)> = {
            let map = self.read_rows()?;
            map.iter().map(|(id, row)| (*id, Arc::clone(row))).collect()
        };
        let mut total: i128 = 0;
        for (id, row) in rows {
            total += i128::from(*self.lock_row(id, &row)?);
        }
        Ok(Decimal::from_i128_with_scale(total, 2))
    }

    /// Run `f` with exclusive access to the given accounts' balances.
    ///
    /// Ids are deduplicated and locked in ascending order; all mutations and
    /// journal appends performed inside `f` form one atomic unit. `f` must
    /// validate before mutating — on error the caller sees no partial state
    /// because no other thread can observe the rows mid-closure, and a
    /// correctly written closure mutates only after its checks pass.
    ///
    /// # Errors
    /// `AccountNotFound` for an unknown id, `LockTimeout` when a row cannot
    /// be acquired within the configured deadline, or whatever `f` returns.
    pub fn with_accounts<T>(
        &self,
        ids: &[AccountId],
        f: impl FnOnce(&mut BalanceView<'_>) -> Result<T>,
    ) -> Result<T> {
        let mut sorted: Vec<AccountId> = ids.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let arcs: Vec<(AccountId, Arc<Mutex<i64>>)> = sorted
            .iter()
            .map(|id| Ok((*id, self.row(*id)?)))
            .collect::<Result<_>>()?;

        let mut guards: Vec<(AccountId, MutexGuard<'_, i64>)> = Vec::with_capacity(arcs.len());
        for (id, row) in &arcs {
            guards.push((*id, self.lock_row(*id, row)?));
        }

        let mut view = BalanceView {
            rows: guards
                .iter_mut()
                .map(|(id, guard)| (*id, &mut **guard))
                .collect(),
        };
        f(&mut view)
    }

    fn row(&self, id: AccountId) -> Result<Arc<Mutex<i64>>> {
        self.read_rows()?
            .get(&id)
            .cloned()
            .ok_or(UptreeError::AccountNotFound(id))
    }

    /// Acquire a row lock, polling until the configured deadline.
    fn lock_row<'a>(&self, id: AccountId, row: &'a Mutex<i64>) -> Result<MutexGuard<'a, i64>> {
        let deadline = Instant::now() + self.lock_timeout;
        loop {
            match row.try_lock() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::WouldBlock) => {
                    if Instant::now() >= deadline {
                        return Err(UptreeError::LockTimeout {
                            account: id,
                            waited_ms: u64::try_from(self.lock_timeout.as_millis())
                                .unwrap_or(u64::MAX),
                        });
                    }
                    std::thread::yield_now();
                }
                Err(TryLockError::Poisoned(_)) => {
                    return Err(UptreeError::Internal(format!(
                        "poisoned balance lock for {id}"
                    )));
                }
            }
        }
    }

    fn read_rows(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<AccountId, Arc<Mutex<i64>>>>> {
        self.rows
            .read()
            .map_err(|_| UptreeError::Internal("poisoned ledger row map".into()))
    }

    fn write_rows(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<AccountId, Arc<Mutex<i64>>>>> {
        self.rows
            .write()
            .map_err(|_| UptreeError::Internal("poisoned ledger row map".into()))
    }
}

/// Exclusive view over the rows locked by [`Ledger::with_accounts`].
pub struct BalanceView<'a> {
    rows: HashMap<AccountId, &'a mut i64>,
}

impl BalanceView<'_> {
    /// Balance of a locked row.
    pub fn balance(&self, id: AccountId) -> Result<Money> {
        self.rows
            .get(&id)
            .map(|minor| Money::from_minor(**minor))
            .ok_or_else(|| unlocked_row_violation(id))
    }

    /// Credit a locked row. `amount` must be positive.
    pub fn credit(&mut self, id: AccountId, amount: Money) -> Result<()> {
        require_positive(amount)?;
        let minor = self
            .rows
            .get_mut(&id)
            .ok_or_else(|| unlocked_row_violation(id))?;
        **minor = Money::from_minor(**minor).checked_add(amount)?.minor();
        Ok(())
    }

    /// Debit a locked row. `amount` must be positive and covered.
    pub fn debit(&mut self, id: AccountId, amount: Money) -> Result<()> {
        require_positive(amount)?;
        let minor = self
            .rows
            .get_mut(&id)
            .ok_or_else(|| unlocked_row_violation(id))?;
        let available = Money::from_minor(**minor);
        if available < amount {
            return Err(UptreeError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        **minor = available.checked_sub(amount)?.minor();
        Ok(())
    }
}

fn require_positive(amount: Money) -> Result<()> {
    if amount <= Money::ZERO {
        return Err(UptreeError::InvalidAmount {
            value: amount.to_decimal(),
        });
    }
    Ok(())
}

fn unlocked_row_violation(id: AccountId) -> UptreeError {
    UptreeError::ConsistencyViolation {
        reason: format!("account {id} was not locked in this atomic section"),
    }
}
