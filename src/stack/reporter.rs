use super::status::{relation, PatchStatus};
use super::StackContext;
use crate::errors::{PatchStackError, Result};
use crate::git::CommitSummary;

/// One entry of `show`, root first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackLine {
    pub name: String,
    pub is_root: bool,
    pub is_current: bool,
    /// `None` for the root and for entries that cannot be resolved
    pub status: Option<PatchStatus>,
    /// Commits the patch adds over its parent
    pub commits: Option<usize>,
    /// The branch no longer exists
    pub missing: bool,
}

/// Changes a patch introduces over its parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchDiff {
    pub patch: String,
    pub base: String,
    pub head: String,
    pub text: String,
}

/// Read-only views of the stack
pub struct Reporter<'a> {
    ctx: StackContext<'a>,
}

impl<'a> Reporter<'a> {
    pub fn new(ctx: StackContext<'a>) -> Self {
        Self { ctx }
    }

    /// Every entry with its live status. Missing branches are flagged
    /// rather than reported as errors.
    pub fn show(&self) -> Result<Vec<StackLine>> {
        let (stack, dangling) = self.ctx.load_lenient()?;
        let current = self.ctx.vcs.current_branch()?;
        let is_current = |name: &str| current.as_deref() == Some(name);

        let mut lines = vec![StackLine {
            name: stack.root.clone(),
            is_root: true,
            is_current: is_current(&stack.root),
            status: None,
            commits: None,
            missing: dangling.contains(&stack.root),
        }];

        for patch in &stack.patches {
            let missing = dangling.contains(&patch.name);
            let resolvable = !missing && !dangling.contains(&patch.parent);

            let (status, commits) = if resolvable {
                let rel = relation(self.ctx.vcs, &stack, &patch.name)?;
                let commits = self.ctx.vcs.log(rel.base(), &rel.patch_tip)?.len();
                (Some(rel.status), Some(commits))
            } else {
                (None, None)
            };

            lines.push(StackLine {
                name: patch.name.clone(),
                is_root: false,
                is_current: is_current(&patch.name),
                status,
                commits,
                missing,
            });
        }

        Ok(lines)
    }

    /// Diff of a patch against its parent, the position by default
    pub fn diff(&self, name: Option<&str>) -> Result<PatchDiff> {
        let (patch, base, head) = self.bounds(name)?;
        let text = self.ctx.vcs.diff(&base, &head)?;
        Ok(PatchDiff {
            patch,
            base,
            head,
            text,
        })
    }

    /// Commits a patch adds over its parent, newest first
    pub fn log(&self, name: Option<&str>) -> Result<Vec<CommitSummary>> {
        let (_, base, head) = self.bounds(name)?;
        self.ctx.vcs.log(&base, &head)
    }

    fn bounds(&self, name: Option<&str>) -> Result<(String, String, String)> {
        let stack = self.ctx.load()?;
        let target = self.ctx.target(&stack, name)?;
        if target == stack.root {
            return Err(PatchStackError::AtRoot { root: target });
        }

        let rel = relation(self.ctx.vcs, &stack, &target)?;
        Ok((target, rel.base().to_string(), rel.patch_tip))
    }
}
