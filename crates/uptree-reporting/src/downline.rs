//! Downline views: the full descendant tree with balances joined in, plus a
//! flattened row list for tabular display.

use serde::{Deserialize, Serialize};
use uptree_types::{Account, AccountId, Money, Result};
use uptree_store::DownlineNode;

use crate::Reporting;

/// A downline tree node with the account's current balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceNode {
    pub account: Account,
    /// Depth from the viewer: direct children are 1.
    pub depth: u32,
    pub balance: Money,
    pub children: Vec<BalanceNode>,
}

/// One flattened downline row, in depth-first username order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownlineEntry {
    pub account: Account,
    pub depth: u32,
    pub balance: Money,
}

/// The full downline of one account, as a tree and as flat rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownlineReport {
    pub tree: Vec<BalanceNode>,
    pub flat: Vec<DownlineEntry>,
}

impl Reporting {
    /// Build the downline report for `id`: every descendant, depth-first,
    /// username-ascending at each level, with current balances.
    pub fn downline(&self, id: AccountId) -> Result<DownlineReport> {
        let tree = self.join_balances(self.registry.downline(id)?)?;
        let flat = flatten(&tree);
        Ok(DownlineReport { tree, flat })
    }

    /// Attach balances to a hierarchy tree, iteratively (no recursion on
    /// arbitrarily deep chains).
    fn join_balances(&self, nodes: Vec<DownlineNode>) -> Result<Vec<BalanceNode>> {
        struct Frame {
            node: BalanceNode,
            pending: std::vec::IntoIter<DownlineNode>,
        }

        let mut roots: Vec<BalanceNode> = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();
        let mut top = nodes.into_iter();

        loop {
            let next = match stack.last_mut() {
                Some(frame) => frame.pending.next(),
                None => top.next(),
            };
            if let Some(dn) = next {
                let balance = self.ledger.balance(dn.account.id)?;
                stack.push(Frame {
                    node: BalanceNode {
                        account: dn.account,
                        depth: dn.depth,
                        balance,
                        children: Vec::new(),
                    },
                    pending: dn.children.into_iter(),
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
}

/// Flatten a balance tree into depth-first rows (parent before children).
fn flatten(tree: &[BalanceNode]) -> Vec<DownlineEntry> {
    let mut rows = Vec::new();
    let mut stack: Vec<&BalanceNode> = tree.iter().rev().collect();
    while let Some(node) = stack.pop() {
        rows.push(DownlineEntry {
            account: node.account.clone(),
            depth: node.depth,
            balance: node.balance,
        });
        stack.extend(node.children.iter().rev());
    }
    rows
}
