//! Account model for the referral tree.
//!
//! Every account has at most one parent; `parent == None` marks a root
//! ("owner") account at the top of its tree. Identity fields are immutable
//! after creation — the mutable balance lives in the ledger, not here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{constants, AccountId, Result, UptreeError};

/// Account role. Admins may issue credits and view network-wide summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::User => write!(f, "user"),
        }
    }
}

/// An account record. The parent reference makes the account set a forest:
/// no cycles, at most one parent, roots have `parent == None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Unique, 3–50 characters.
    pub username: String,
    pub role: Role,
    /// `None` for root/owner accounts.
    pub parent: Option<AccountId>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a new root account (no parent).
    #[must_use]
    pub fn new_root(username: impl Into<String>, role: Role) -> Self {
        Self {
            id: AccountId::new(),
            username: username.into(),
            role,
            parent: None,
            created_at: Utc::now(),
        }
    }

    /// Create a new child account under `parent`.
    #[must_use]
    pub fn new_child(username: impl Into<String>, parent: AccountId) -> Self {
        Self {
            id: AccountId::new(),
            username: username.into(),
            role: Role::User,
            parent: Some(parent),
            created_at: Utc::now(),
        }
    }

    /// Whether this account sits at the top of its tree.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Validate a username against the length policy (3–50 characters).
///
/// # Errors
/// Returns [`UptreeError::InvalidUsername`] when out of bounds.
pub fn validate_username(username: &str) -> Result<()> {
    let len = username.chars().count();
    if len < constants::USERNAME_MIN_LEN || len > constants::USERNAME_MAX_LEN {
        return Err(UptreeError::InvalidUsername {
            reason: format!(
                "must be between {} and {} characters, got {len}",
                constants::USERNAME_MIN_LEN,
                constants::USERNAME_MAX_LEN
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_account_has_no_parent() {
        let acct = Account::new_root("owner", Role::Admin);
        assert!(acct.is_root());
        assert_eq!(acct.role, Role::Admin);
    }

    #[test]
    fn child_account_references_parent() {
        let root = Account::new_root("owner", Role::Admin);
        let child = Account::new_child("alice", root.id);
        assert!(!child.is_root());
        assert_eq!(child.parent, Some(root.id));
        assert_eq!(child.role, Role::User);
    }

    #[test]
    fn username_length_policy() {
        assert!(validate_username("abc").is_ok());
        assert!(validate_username(&"x".repeat(50)).is_ok());
        assert!(matches!(
            validate_username("ab"),
            Err(UptreeError::InvalidUsername { .. })
        ));
        assert!(matches!(
            validate_username(&"x".repeat(51)),
            Err(UptreeError::InvalidUsername { .. })
        ));
    }

    #[test]
    fn role_serde_is_lowercase() {
        let json = serde_json::to_string(&Role::Admin).unwrap();
        assert_eq!(json, "\"admin\"");
        let back: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(back, Role::User);
    }
}
