//! Dashboard and admin summaries.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uptree_types::{AccountId, Money, Result};

use crate::Reporting;

/// What one account sees on its own dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub balance: Money,
    pub direct_children: usize,
    pub total_commission: Money,
}

/// Per-level rollup for the admin view. Level 0 is the root tier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelSummary {
    pub accounts: usize,
    pub total_balance: Decimal,
}

/// Network-wide rollup for operators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSummary {
    pub total_accounts: usize,
    pub total_balance: Decimal,
    pub root_accounts: usize,
    /// Accounts and balances grouped by depth from root, ascending.
    pub by_level: BTreeMap<u32, LevelSummary>,
}

impl Reporting {
    /// Build `id`'s dashboard: current balance, direct-child count, and
    /// lifetime commission earned.
    pub fn dashboard(&self, id: AccountId) -> Result<DashboardSummary> {
        self.registry.get(id)?;
        Ok(DashboardSummary {
            balance: self.ledger.balance(id)?,
            direct_children: self.registry.direct_children(id)?.len(),
            total_commission: self.journal.total_commission(id)?,
        })
    }

    /// Build the network-wide summary: every account grouped by its depth
    /// from root.
    ///
    /// Balances are read row by row, so the totals are a best-effort
    /// snapshot: a transfer committing mid-traversal may be half-counted.
    pub fn admin_summary(&self) -> Result<AdminSummary> {
        let accounts = self.registry.all_accounts()?;
        let mut by_level: BTreeMap<u32, LevelSummary> = BTreeMap::new();
        let mut root_accounts = 0usize;
        let mut total_minor: i128 = 0;

        for account in &accounts {
            if account.is_root() {
                root_accounts += 1;
            }
            let level = self.registry.level(account.id)?;
            let balance = self.ledger.balance(account.id)?;
            total_minor += i128::from(balance.minor());

            let entry = by_level.entry(level).or_default();
            entry.accounts += 1;
            entry.total_balance += balance.to_decimal();
        }

        Ok(AdminSummary {
            total_accounts: accounts.len(),
            total_balance: Decimal::from_i128_with_scale(total_minor, 2),
            root_accounts,
            by_level,
        })
    }
}
