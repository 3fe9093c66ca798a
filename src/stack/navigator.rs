use super::status::relation;
use super::{Patch, RebaseOrchestrator, RebaseSummary, Stack, StackContext};
use crate::errors::{PatchStackError, Result};
use tracing::{debug, info, warn};

/// A completed move between stack entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movement {
    pub from: String,
    pub to: String,
    /// Present when the target was rebased onto its parent on the way
    pub rebased: Option<RebaseSummary>,
}

/// Moves the checked-out position along the stack and adds or removes
/// patches. Every operation loads the stack afresh and resolves the
/// position from the repository.
pub struct Navigator<'a> {
    ctx: StackContext<'a>,
}

impl<'a> Navigator<'a> {
    pub fn new(ctx: StackContext<'a>) -> Self {
        Self { ctx }
    }

    /// Check out the patch above the position, rebasing it first if its
    /// parent moved on.
    pub fn push(&self) -> Result<Movement> {
        let mut stack = self.ctx.load()?;
        let position = self.ctx.position(&stack)?;

        let child = stack
            .child_of(&position)
            .map(|p| p.name.clone())
            .ok_or_else(|| PatchStackError::TopOfStack {
                position: position.clone(),
            })?;

        let rebased = self.rebase_if_diverged(&mut stack, &child)?;
        if rebased.is_some() {
            self.ctx.store.save(&stack)?;
        }

        self.checkout(&child)?;
        Ok(Movement {
            from: position,
            to: child,
            rebased,
        })
    }

    /// Create a branch at the position's tip and insert it directly above
    /// the position.
    pub fn push_new(&self, name: &str) -> Result<Movement> {
        let mut stack = self.ctx.load()?;
        let position = self.ctx.position(&stack)?;

        if stack.contains(name) || self.ctx.vcs.branch_exists(name)? {
            return Err(PatchStackError::NameInUse(name.to_string()));
        }

        let tip = self.ctx.vcs.tip(&position)?;
        insert_above(
            &mut stack,
            &position,
            Patch::new(name, position.as_str()).with_sync(&tip, &tip),
        )?;
        self.ctx.vcs.create_branch(name, &tip)?;
        info!("Created branch '{}' from '{}'", name, position);

        if let Err(e) = self.ctx.store.save(&stack) {
            if let Err(cleanup) = self.ctx.vcs.delete_branch(name) {
                warn!("Failed to remove branch '{}' after error: {}", name, cleanup);
            }
            return Err(e);
        }

        self.checkout(name)?;
        Ok(Movement {
            from: position,
            to: name.to_string(),
            rebased: None,
        })
    }

    /// Start tracking an existing branch directly above the position.
    ///
    /// The stack is written only once any required rebase has succeeded.
    pub fn push_branch(&self, name: &str) -> Result<Movement> {
        let mut stack = self.ctx.load()?;
        let position = self.ctx.position(&stack)?;

        if stack.contains(name) {
            return Err(PatchStackError::AlreadyTracked(name.to_string()));
        }
        if !self.ctx.vcs.branch_exists(name)? {
            return Err(PatchStackError::BranchNotFound(name.to_string()));
        }

        insert_above(&mut stack, &position, Patch::new(name, position.as_str()))?;
        let rebased = self.rebase_if_diverged(&mut stack, name)?;
        if rebased.is_none() {
            let current = relation(self.ctx.vcs, &stack, name)?;
            stack.mark_synced(name, &current.parent_tip, &current.patch_tip);
        }
        self.ctx.store.save(&stack)?;
        info!("Tracking '{}' above '{}'", name, position);

        self.checkout(name)?;
        Ok(Movement {
            from: position,
            to: name.to_string(),
            rebased,
        })
    }

    /// Check out the entry below the position
    pub fn pop(&self) -> Result<Movement> {
        let stack = self.ctx.load()?;
        let position = self.ctx.position(&stack)?;
        let index = self.index_above_root(&stack, &position)?;

        let previous = stack
            .name_at(index - 1)
            .map(str::to_string)
            .ok_or_else(|| PatchStackError::corrupt(format!("No entry below '{position}'")))?;

        self.checkout(&previous)?;
        Ok(Movement {
            from: position,
            to: previous,
            rebased: None,
        })
    }

    /// Check out the root
    pub fn pop_all(&self) -> Result<Movement> {
        let stack = self.ctx.load()?;
        let position = self.ctx.position(&stack)?;
        self.index_above_root(&stack, &position)?;

        self.checkout(&stack.root)?;
        Ok(Movement {
            from: position,
            to: stack.root.clone(),
            rebased: None,
        })
    }

    /// Stop tracking a leaf patch. The branch itself is left alone.
    pub fn untrack(&self, name: &str) -> Result<Patch> {
        let (mut stack, dangling) = self.ctx.load_lenient()?;
        if !dangling.is_empty() {
            debug!("Untracking with missing branches: {:?}", dangling);
        }

        if !stack.is_tracked(name) {
            return Err(PatchStackError::NotTracked(name.to_string()));
        }

        let dependents: Vec<String> = stack
            .dependents_of(name)
            .into_iter()
            .map(str::to_string)
            .collect();
        if !dependents.is_empty() {
            return Err(PatchStackError::HasDependents {
                name: name.to_string(),
                dependents,
            });
        }

        let removed = stack
            .remove_leaf(name)
            .ok_or_else(|| PatchStackError::NotTracked(name.to_string()))?;
        self.ctx.store.save(&stack)?;

        info!("Untracked '{}'", name);
        Ok(removed)
    }

    fn rebase_if_diverged(&self, stack: &mut Stack, name: &str) -> Result<Option<RebaseSummary>> {
        let current = relation(self.ctx.vcs, stack, name)?;
        if !current.status.needs_rebase() {
            return Ok(None);
        }

        let summary =
            RebaseOrchestrator::new(self.ctx.vcs).rebase(stack, name, &current.parent_tip)?;
        Ok(Some(summary))
    }

    fn index_above_root(&self, stack: &Stack, position: &str) -> Result<usize> {
        match stack.index_of(position) {
            Some(0) => Err(PatchStackError::AtRoot {
                root: stack.root.clone(),
            }),
            Some(index) => Ok(index),
            None => Err(PatchStackError::not_in_stack(position)),
        }
    }

    fn checkout(&self, name: &str) -> Result<()> {
        self.ctx.vcs.checkout(name)?;
        info!("Checked out '{}'", name);
        Ok(())
    }
}

fn insert_above(stack: &mut Stack, position: &str, patch: Patch) -> Result<()> {
    let name = patch.name.clone();
    if stack.insert_after(position, patch) {
        Ok(())
    } else {
        Err(PatchStackError::corrupt(format!(
            "Cannot insert '{name}' above '{position}'"
        )))
    }
}
