//! Globally unique identifiers used throughout uptree.
//!
//! All entity IDs use UUIDv7 for time-ordered lexicographic sorting. The
//! ascending `Ord` on [`AccountId`] doubles as the canonical lock-acquisition
//! order for multi-account ledger sections.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// Unique identifier for an account in the referral tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AccountId(pub Uuid);

impl AccountId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TransactionId
// ---------------------------------------------------------------------------

/// Unique identifier for a ledger transaction record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TransactionId(pub Uuid);

impl TransactionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// CommissionId
// ---------------------------------------------------------------------------

/// Unique identifier for a commission record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CommissionId(pub Uuid);

impl CommissionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for CommissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CommissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "com:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_id_uniqueness() {
        let a = AccountId::new();
        let b = AccountId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn account_id_ordering() {
        let a = AccountId::new();
        let b = AccountId::new();
        assert!(a < b);
    }

    #[test]
    fn display_prefixes() {
        let tx = TransactionId::new();
        assert!(tx.to_string().starts_with("tx:"));
        let com = CommissionId::new();
        assert!(com.to_string().starts_with("com:"));
    }

    #[test]
    fn serde_roundtrips() {
        let aid = AccountId::new();
        let json = serde_json::to_string(&aid).unwrap();
        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(aid, back);

        let tid = TransactionId::new();
        let json = serde_json::to_string(&tid).unwrap();
        let back: TransactionId = serde_json::from_str(&json).unwrap();
        assert_eq!(tid, back);
    }
}
