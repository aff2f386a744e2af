//! System-wide limits and defaults.

/// Default commission rate skimmed to the sender's parent on transfers: 2%.
/// Expressed as (mantissa, scale) for `Decimal::new`.
pub const DEFAULT_COMMISSION_RATE_MANTISSA: i64 = 2;
pub const DEFAULT_COMMISSION_RATE_SCALE: u32 = 2;

/// Default deadline for acquiring account row locks, in milliseconds.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 2_000;

/// Username length policy.
pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;

/// Minimum password length accepted by the facade.
pub const MIN_PASSWORD_LEN: usize = 6;
