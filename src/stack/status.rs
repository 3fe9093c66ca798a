use super::{Stack, SyncPoint};
use crate::errors::{PatchStackError, Result};
use crate::git::VersionControl;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// How a patch relates to its parent's current tip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatchStatus {
    /// Nothing happened on either side since the last sync
    UpToDate,
    /// The patch has commits of its own on top of its parent
    Ahead,
    /// The parent moved past the patch's fork point; a rebase is needed
    Diverged,
}

impl PatchStatus {
    pub fn needs_rebase(self) -> bool {
        self == PatchStatus::Diverged
    }
}

impl fmt::Display for PatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchStatus::UpToDate => write!(f, "up to date"),
            PatchStatus::Ahead => write!(f, "ahead"),
            PatchStatus::Diverged => write!(f, "needs rebase"),
        }
    }
}

/// Live view of a patch and its parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub patch: String,
    pub parent: String,
    pub patch_tip: String,
    pub parent_tip: String,
    pub merge_base: Option<String>,
    pub status: PatchStatus,
}

impl Relation {
    /// First commit outside the patch: the merge base with the parent, or
    /// the parent tip for unrelated histories
    pub fn base(&self) -> &str {
        self.merge_base.as_deref().unwrap_or(&self.parent_tip)
    }
}

/// Classify a patch from its tips, the merge base and the last sync record
pub fn classify(
    patch_tip: &str,
    parent_tip: &str,
    merge_base: Option<&str>,
    synced: Option<&SyncPoint>,
) -> PatchStatus {
    if merge_base != Some(parent_tip) {
        return PatchStatus::Diverged;
    }

    let unchanged_since_sync =
        synced.is_some_and(|sync| sync.base == parent_tip && sync.tip == patch_tip);
    if patch_tip == parent_tip || unchanged_since_sync {
        PatchStatus::UpToDate
    } else {
        PatchStatus::Ahead
    }
}

/// Resolve a tracked patch against the repository. Never cached.
pub fn relation(vcs: &dyn VersionControl, stack: &Stack, name: &str) -> Result<Relation> {
    if name == stack.root {
        return Err(PatchStackError::AtRoot {
            root: stack.root.clone(),
        });
    }
    let patch = stack
        .patch(name)
        .ok_or_else(|| PatchStackError::NotTracked(name.to_string()))?;

    let patch_tip = vcs.tip(&patch.name)?;
    let parent_tip = vcs.tip(&patch.parent)?;
    let merge_base = vcs.merge_base(&patch_tip, &parent_tip)?;
    let status = classify(
        &patch_tip,
        &parent_tip,
        merge_base.as_deref(),
        patch.synced.as_ref(),
    );

    debug!(
        "Status of '{}' over '{}': {:?} (tip {}, parent tip {}, base {:?})",
        patch.name, patch.parent, status, patch_tip, parent_tip, merge_base
    );

    Ok(Relation {
        patch: patch.name.clone(),
        parent: patch.parent.clone(),
        patch_tip,
        parent_tip,
        merge_base,
        status,
    })
}

/// Status of a tracked patch
pub fn status(vcs: &dyn VersionControl, stack: &Stack, name: &str) -> Result<PatchStatus> {
    Ok(relation(vcs, stack, name)?.status)
}
