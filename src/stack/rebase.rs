use super::{Patch, Stack};
use crate::errors::{PatchStackError, Result};
use crate::git::{RebaseOutcome, VersionControl};
use tracing::{debug, info, warn};

/// Result of a successful patch rebase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebaseSummary {
    pub patch: String,
    pub onto: String,
    pub old_tip: String,
    pub new_tip: String,
}

/// Rebases one patch onto a new parent tip and guarantees the repository is
/// never left mid-rebase: conflicts and failures are aborted and the
/// checked-out branch is restored before returning.
pub struct RebaseOrchestrator<'a> {
    vcs: &'a dyn VersionControl,
}

impl<'a> RebaseOrchestrator<'a> {
    pub fn new(vcs: &'a dyn VersionControl) -> Self {
        Self { vcs }
    }

    /// Rebase `patch` onto `onto_tip` and record the new sync point in
    /// `stack`. The caller decides whether to persist the stack.
    pub fn rebase(&self, stack: &mut Stack, patch: &str, onto_tip: &str) -> Result<RebaseSummary> {
        let entry = stack
            .patch(patch)
            .ok_or_else(|| PatchStackError::NotTracked(patch.to_string()))?
            .clone();

        let position = self.vcs.current_branch()?;
        let old_tip = self.vcs.tip(patch)?;
        let upstream = self.choose_upstream(&entry, &old_tip, onto_tip)?;

        info!("Rebasing '{}' onto {}", patch, short(onto_tip));
        debug!(
            "Rebase of '{}': tip {}, upstream {}, onto {}",
            patch, old_tip, upstream, onto_tip
        );

        let outcome = match self.vcs.rebase(patch, &upstream, onto_tip) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Rebase of '{}' failed: {}", patch, e);
                if let Err(abort_err) = self.vcs.abort_rebase() {
                    debug!("Nothing to abort after failed rebase: {}", abort_err);
                }
                self.restore_position(position.as_deref());
                return Err(e);
            }
        };

        match outcome {
            RebaseOutcome::Completed { new_tip } => {
                self.restore_position(position.as_deref());
                stack.mark_synced(patch, onto_tip, &new_tip);
                info!(
                    "Rebased '{}': {} -> {}",
                    patch,
                    short(&old_tip),
                    short(&new_tip)
                );
                Ok(RebaseSummary {
                    patch: patch.to_string(),
                    onto: onto_tip.to_string(),
                    old_tip,
                    new_tip,
                })
            }
            RebaseOutcome::Conflict { paths } => {
                warn!(
                    "Rebase of '{}' stopped on conflicts in {} file(s), rolling back",
                    patch,
                    paths.len()
                );
                let aborted = self.vcs.abort_rebase();
                self.restore_position(position.as_deref());
                aborted?;
                Err(PatchStackError::RebaseConflict {
                    patch: patch.to_string(),
                    paths,
                })
            }
        }
    }

    /// Commits to replay are those after the last sync base when it is still
    /// part of the patch's history, otherwise those after the merge base.
    fn choose_upstream(&self, patch: &Patch, patch_tip: &str, onto_tip: &str) -> Result<String> {
        if let Some(sync) = &patch.synced {
            if self.vcs.is_descendant(patch_tip, &sync.base)? {
                debug!("Using sync base {} as upstream", sync.base);
                return Ok(sync.base.clone());
            }
            debug!("Sync base {} is no longer in '{}'", sync.base, patch.name);
        }

        Ok(self
            .vcs
            .merge_base(patch_tip, onto_tip)?
            .unwrap_or_else(|| onto_tip.to_string()))
    }

    fn restore_position(&self, position: Option<&str>) {
        let Some(position) = position else {
            return;
        };

        match self.vcs.current_branch() {
            Ok(Some(current)) if current == position => {}
            _ => {
                if let Err(e) = self.vcs.checkout(position) {
                    warn!("Failed to restore checkout of '{}': {}", position, e);
                }
            }
        }
    }
}

fn short(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
