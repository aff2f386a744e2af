//! # uptree-reporting
//!
//! **Read plane**: aggregations over the hierarchy store, ledger, and
//! journal. No mutation.
//!
//! Reports read short-lived snapshots outside any ledger atomic section, so
//! a long traversal racing a concurrent transfer may observe read skew.
//! That staleness is documented and accepted — reports are
//! snapshot-best-effort, not serialized with the engines.

pub mod commission_history;
pub mod downline;
pub mod statement;
pub mod summary;

pub use commission_history::{CommissionEntry, CommissionReport};
pub use downline::{BalanceNode, DownlineEntry, DownlineReport};
pub use statement::StatementEntry;
pub use summary::{AdminSummary, DashboardSummary, LevelSummary};

use std::sync::Arc;

use uptree_store::{AccountRegistry, Journal, Ledger};

/// Read-only report builder over shared store handles.
pub struct Reporting {
    pub(crate) registry: Arc<AccountRegistry>,
    pub(crate) ledger: Arc<Ledger>,
    pub(crate) journal: Arc<Journal>,
}

impl Reporting {
    #[must_use]
    pub fn new(
        registry: Arc<AccountRegistry>,
        ledger: Arc<Ledger>,
        journal: Arc<Journal>,
    ) -> Self {
        Self {
            registry,
            ledger,
            journal,
        }
    }
}
