//! Stack management module
//!
//! This module implements the core stacked patch functionality:
//! - Stack data structures and persistence
//! - Patch status relative to the parent
//! - Navigation (push, pop, untrack) with automatic rebasing

pub mod context;
pub mod navigator;
pub mod rebase;
pub mod reporter;
pub mod stack;
pub mod status;
pub mod store;

pub use context::StackContext;
pub use navigator::{Movement, Navigator};
pub use rebase::{RebaseOrchestrator, RebaseSummary};
pub use reporter::{PatchDiff, Reporter, StackLine};
pub use stack::{Patch, Stack, SyncPoint};
pub use status::{PatchStatus, Relation};
pub use store::StackStore;
