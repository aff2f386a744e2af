//! Supply conservation invariant checker.
//!
//! Transfers only move balances between accounts, so the network-wide total
//! changes in exactly two places:
//!
//! ```text
//! Σ balances == Σ issued (recharges + root credits) − Σ leaked
//! ```
//!
//! "Leaked" is the commission computed on a transfer whose sender has no
//! parent: the sender is debited the gross amount but nobody receives the
//! skim. The leak is a deliberate product decision; this tracker makes it
//! observable instead of silent.

use std::sync::Mutex;

use rust_decimal::Decimal;
use uptree_types::{Money, Result, UptreeError};

#[derive(Default)]
struct Totals {
    issued_minor: i128,
    leaked_minor: i128,
}

/// Tracks issuance and leakage so the expected network total can be
/// verified against the ledger after any money-moving operation.
#[derive(Default)]
pub struct ConservationTracker {
    totals: Mutex<Totals>,
}

impl ConservationTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record value entering the network (self-recharge, root credit).
    pub fn record_issued(&self, amount: Money) -> Result<()> {
        self.lock()?.issued_minor += i128::from(amount.minor());
        Ok(())
    }

    /// Record commission value leaving the network (rootless-sender skim).
    pub fn record_leak(&self, amount: Money) -> Result<()> {
        self.lock()?.leaked_minor += i128::from(amount.minor());
        Ok(())
    }

    /// The total expected to be sitting in account balances.
    pub fn expected_total(&self) -> Result<Decimal> {
        let totals = self.lock()?;
        Ok(Decimal::from_i128_with_scale(
            totals.issued_minor - totals.leaked_minor,
            2,
        ))
    }

    /// Total leaked since genesis.
    pub fn total_leaked(&self) -> Result<Decimal> {
        Ok(Decimal::from_i128_with_scale(self.lock()?.leaked_minor, 2))
    }

    /// Verify the ledger-side total against the expected total.
    ///
    /// # Errors
    /// Returns [`UptreeError::ConsistencyViolation`] if they diverge —
    /// value was created or destroyed outside the two sanctioned paths.
    pub fn verify(&self, actual_total: Decimal) -> Result<()> {
        let expected = self.expected_total()?;
        if actual_total != expected {
            return Err(UptreeError::ConsistencyViolation {
                reason: format!(
                    "supply mismatch: ledger total {actual_total} != expected {expected}"
                ),
            });
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Totals>> {
        self.totals
            .lock()
            .map_err(|_| UptreeError::Internal("poisoned conservation lock".into()))
    }
}
