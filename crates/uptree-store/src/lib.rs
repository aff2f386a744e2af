//! # uptree-store
//!
//! **Storage plane**: the thread-safe state the engines mutate.
//!
//! ## Architecture
//!
//! 1. **`AccountRegistry`**: account records, username index, parent/child
//!    edges; answers ancestry, direct-child, downline, and level queries.
//! 2. **`Ledger`**: authoritative balance counters, one lock per account
//!    row; multi-row atomic sections with ordered acquisition.
//! 3. **`Journal`**: append-only transaction and commission log; every
//!    ledger mutation is recorded here within the same atomic section.
//! 4. **`ConservationTracker`**: issued-minus-leaked supply invariant.
//!
//! Identity fields and journal rows are immutable post-creation; the balance
//! column is the only hot mutable shared state.

pub mod conservation;
pub mod journal;
pub mod ledger;
pub mod registry;

pub use conservation::ConservationTracker;
pub use journal::Journal;
pub use ledger::{BalanceView, Ledger};
pub use registry::{AccountRegistry, DownlineNode};
