//! The hierarchy store: account records and parent/child edges.
//!
//! The registry is the source of truth for account identity and tree shape.
//! Children are kept username-sorted per parent at insert time (usernames are
//! immutable), so every child listing and downline traversal comes out in
//! ascending username order without re-sorting.
//!
//! All traversals are iterative: ancestry walks carry a hop cap sized by the
//! registry, and the downline builder uses an explicit frame stack, so
//! arbitrarily deep chains cannot exhaust the call stack.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use uptree_types::{
    validate_username, Account, AccountId, Result, Role, UptreeError,
};

/// A node in a downline tree. `depth` is counted from the viewer: direct
/// children are depth 1. (Depth-from-root lives on [`AccountRegistry::level`],
/// where the root is 0 — the two conventions are deliberately separate.)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownlineNode {
    pub account: Account,
    pub depth: u32,
    pub children: Vec<DownlineNode>,
}

#[derive(Default)]
struct RegistryInner {
    accounts: HashMap<AccountId, Account>,
    by_username: HashMap<String, AccountId>,
    /// Child ids per parent, kept sorted by child username.
    children: HashMap<AccountId, Vec<AccountId>>,
    /// Opaque credential hashes, keyed by account.
    credentials: HashMap<AccountId, String>,
}

impl RegistryInner {
    fn insert(&mut self, account: Account, password_hash: String) -> Result<Account> {
        validate_username(&account.username)?;
        if self.by_username.contains_key(&account.username) {
            return Err(UptreeError::DuplicateUsername {
                username: account.username,
            });
        }
        if let Some(parent) = account.parent {
            let siblings = self.children.entry(parent).or_default();
            let pos = siblings
                .binary_search_by(|sib| {
                    self.accounts[sib].username.as_str().cmp(&account.username)
                })
                .unwrap_or_else(|pos| pos);
            siblings.insert(pos, account.id);
        }
        self.by_username
            .insert(account.username.clone(), account.id);
        self.credentials.insert(account.id, password_hash);
        self.accounts.insert(account.id, account.clone());
        Ok(account)
    }
}

/// Thread-safe account registry. Engines share it behind an `Arc`.
#[derive(Default)]
pub struct AccountRegistry {
    inner: RwLock<RegistryInner>,
}

impl AccountRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new root account (no parent).
    ///
    /// # Errors
    /// `InvalidUsername` or `DuplicateUsername` per the username policy.
    pub fn insert_root(
        &self,
        username: &str,
        role: Role,
        password_hash: String,
    ) -> Result<Account> {
        let mut inner = self.write()?;
        inner.insert(Account::new_root(username, role), password_hash)
    }

    /// Register a new child account under `parent`.
    ///
    /// # Errors
    /// `AccountNotFound` if the parent does not exist, plus the username
    /// policy errors.
    pub fn insert_child(
        &self,
        parent: AccountId,
        username: &str,
        password_hash: String,
    ) -> Result<Account> {
        let mut inner = self.write()?;
        if !inner.accounts.contains_key(&parent) {
            return Err(UptreeError::AccountNotFound(parent));
        }
        inner.insert(Account::new_child(username, parent), password_hash)
    }

    /// Fetch an account by id.
    pub fn get(&self, id: AccountId) -> Result<Account> {
        let inner = self.read()?;
        inner
            .accounts
            .get(&id)
            .cloned()
            .ok_or(UptreeError::AccountNotFound(id))
    }

    /// Fetch an account by username.
    pub fn get_by_username(&self, username: &str) -> Result<Account> {
        let inner = self.read()?;
        let id = inner
            .by_username
            .get(username)
            .ok_or(UptreeError::InvalidCredentials)?;
        inner
            .accounts
            .get(id)
            .cloned()
            .ok_or(UptreeError::AccountNotFound(*id))
    }

    /// Direct children of `id`, ordered by username ascending.
    pub fn direct_children(&self, id: AccountId) -> Result<Vec<Account>> {
        let inner = self.read()?;
        if !inner.accounts.contains_key(&id) {
            return Err(UptreeError::AccountNotFound(id));
        }
        let ids = inner.children.get(&id).cloned().unwrap_or_default();
        ids.iter()
            .map(|cid| {
                inner
                    .accounts
                    .get(cid)
                    .cloned()
                    .ok_or_else(|| child_index_violation(id, *cid))
            })
            .collect()
    }

    /// The parent of `id`, or `None` for a root account.
    pub fn parent(&self, id: AccountId) -> Result<Option<AccountId>> {
        Ok(self.get(id)?.parent)
    }

    /// Whether `child` is exactly one hop below `parent`. Missing accounts
    /// answer `false` — this is the transfer/credit/password gate, and an
    /// unknown account is simply not a direct child.
    pub fn is_direct_child(&self, parent: AccountId, child: AccountId) -> Result<bool> {
        let inner = self.read()?;
        Ok(inner
            .accounts
            .get(&child)
            .is_some_and(|acct| acct.parent == Some(parent)))
    }

    /// Whether `id` sits anywhere in `ancestor`'s downline: walks parent
    /// pointers upward until a match or a root.
    pub fn is_descendant(&self, ancestor: AccountId, id: AccountId) -> Result<bool> {
        let inner = self.read()?;
        let mut current = match inner.accounts.get(&id) {
            Some(acct) => acct.parent,
            None => return Ok(false),
        };
        let mut hops = 0usize;
        let cap = inner.accounts.len();
        while let Some(pid) = current {
            if pid == ancestor {
                return Ok(true);
            }
            hops += 1;
            if hops > cap {
                return Err(parent_cycle_violation(id));
            }
            current = inner
                .accounts
                .get(&pid)
                .ok_or(UptreeError::AccountNotFound(pid))?
                .parent;
        }
        Ok(false)
    }

    /// Hops from `id` up to its root. Roots are level 0.
    pub fn level(&self, id: AccountId) -> Result<u32> {
        let inner = self.read()?;
        let mut current = inner
            .accounts
            .get(&id)
            .ok_or(UptreeError::AccountNotFound(id))?
            .parent;
        let mut level = 0u32;
        let cap = inner.accounts.len();
        while let Some(pid) = current {
            level += 1;
            if level as usize > cap {
                return Err(parent_cycle_violation(id));
            }
            current = inner
                .accounts
                .get(&pid)
                .ok_or(UptreeError::AccountNotFound(pid))?
                .parent;
        }
        Ok(level)
    }

    /// The full downline of `id`: a forest of its children's subtrees,
    /// depth-first, username-ascending at every level. Direct children carry
    /// depth 1. Built with an explicit stack over a single index snapshot.
    pub fn downline(&self, id: AccountId) -> Result<Vec<DownlineNode>> {
        let inner = self.read()?;
        if !inner.accounts.contains_key(&id) {
            return Err(UptreeError::AccountNotFound(id));
        }

        struct Frame {
            node: DownlineNode,
            pending: std::vec::IntoIter<AccountId>,
        }

        let child_ids = |pid: AccountId| -> std::vec::IntoIter<AccountId> {
            inner
                .children
                .get(&pid)
                .cloned()
                .unwrap_or_default()
                .into_iter()
        };

        let mut roots: Vec<DownlineNode> = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();
        let mut top = child_ids(id);

        loop {
            let (next, depth) = match stack.last_mut() {
                Some(frame) => (frame.pending.next(), frame.node.depth + 1),
                None => (top.next(), 1),
            };
            if let Some(cid) = next {
                let account = inner
                    .accounts
                    .get(&cid)
                    .cloned()
                    .ok_or_else(|| child_index_violation(id, cid))?;
                stack.push(Frame {
                    node: DownlineNode {
                        account,
                        depth,
                        children: Vec::new(),
                    },
                    pending: child_ids(cid),
                });
            } else {
                match stack.pop() {
                    Some(done) => match stack.last_mut() {
                        Some(parent) => parent.node.children.push(done.node),
                        None => roots.push(done.node),
                    },
                    None => break,
                }
            }
        }
        Ok(roots)
    }

    /// Replace the stored credential hash for `id`.
    pub fn set_password_hash(&self, id: AccountId, hash: String) -> Result<()> {
        let mut inner = self.write()?;
        if !inner.accounts.contains_key(&id) {
            return Err(UptreeError::AccountNotFound(id));
        }
        inner.credentials.insert(id, hash);
        Ok(())
    }

    /// The stored credential hash for `id`.
    pub fn password_hash(&self, id: AccountId) -> Result<String> {
        let inner = self.read()?;
        inner
            .credentials
            .get(&id)
            .cloned()
            .ok_or(UptreeError::AccountNotFound(id))
    }

    /// Total number of accounts.
    pub fn count(&self) -> Result<usize> {
        Ok(self.read()?.accounts.len())
    }

    /// Snapshot of every account (reporting).
    pub fn all_accounts(&self) -> Result<Vec<Account>> {
        Ok(self.read()?.accounts.values().cloned().collect())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, RegistryInner>> {
        self.inner
            .read()
            .map_err(|_| UptreeError::Internal("poisoned registry lock".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, RegistryInner>> {
        self.inner
            .write()
            .map_err(|_| UptreeError::Internal("poisoned registry lock".into()))
    }
}

fn child_index_violation(parent: AccountId, child: AccountId) -> UptreeError {
    UptreeError::ConsistencyViolation {
        reason: format!("child index of {parent} references missing account {child}"),
    }
}

fn parent_cycle_violation(id: AccountId) -> UptreeError {
    UptreeError::ConsistencyViolation {
        reason: format!("parent walk from {id} exceeded registry size: cycle in parent graph"),
    }
}
