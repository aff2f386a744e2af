//! Engine configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{constants, Result, UptreeError};

/// Tunables for the ledger engines. The commission rate is the single
/// business tunable; the rest are operational policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Fraction of every transfer skimmed to the sender's parent (default 0.02).
    pub commission_rate: Decimal,
    /// Deadline for acquiring account row locks before the operation fails
    /// with the retryable `LockTimeout`.
    pub lock_timeout_ms: u64,
    /// Minimum password length accepted by the service facade.
    pub min_password_len: usize,
}

impl EngineConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns [`UptreeError::Configuration`] for a commission rate outside
    /// `[0, 1)` or a zero lock timeout.
    pub fn validate(&self) -> Result<()> {
        if self.commission_rate < Decimal::ZERO || self.commission_rate >= Decimal::ONE {
            return Err(UptreeError::Configuration(format!(
                "commission_rate must be in [0, 1), got {}",
                self.commission_rate
            )));
        }
        if self.lock_timeout_ms == 0 {
            return Err(UptreeError::Configuration(
                "lock_timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            commission_rate: Decimal::new(
                constants::DEFAULT_COMMISSION_RATE_MANTISSA,
                constants::DEFAULT_COMMISSION_RATE_SCALE,
            ),
            lock_timeout_ms: constants::DEFAULT_LOCK_TIMEOUT_MS,
            min_password_len: constants::MIN_PASSWORD_LEN,
        }
    }
}
