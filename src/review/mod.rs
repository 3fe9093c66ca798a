//! Code-review integration
//!
//! The bridge resolves the current patch and its parent and hands the two
//! tips to a [`ReviewService`]. The stack itself is never modified.

use crate::config::ReviewSettings;
use crate::errors::{PatchStackError, Result};
use crate::stack::status::relation;
use crate::stack::StackContext;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Operations the review tool offers
pub trait ReviewService {
    /// Upload the changes between `base` and `head`, optionally updating an
    /// existing revision
    fn upload_diff(&self, base: &str, head: &str, update: Option<&str>) -> Result<()>;

    /// Land the changes between `base` and `head`
    fn land(&self, base: &str, head: &str) -> Result<()>;
}

/// Runs the configured review commands in the repository's working tree
#[derive(Debug, Clone)]
pub struct CommandReview {
    diff_command: String,
    land_command: String,
    workdir: PathBuf,
}

impl CommandReview {
    pub fn new(settings: &ReviewSettings, workdir: &Path) -> Self {
        Self {
            diff_command: settings.diff_command.clone(),
            land_command: settings.land_command.clone(),
            workdir: workdir.to_path_buf(),
        }
    }

    fn run(&self, args: Vec<String>) -> Result<()> {
        let (program, rest) = args
            .split_first()
            .ok_or_else(|| PatchStackError::config("Review command is empty"))?;

        info!("Running {}", args.join(" "));
        let status = Command::new(program)
            .args(rest)
            .current_dir(&self.workdir)
            .status()
            .map_err(|e| PatchStackError::collaborator(format!("Failed to run '{program}': {e}")))?;

        if !status.success() {
            return Err(PatchStackError::collaborator(format!(
                "'{}' exited with {}",
                args.join(" "),
                status
            )));
        }
        Ok(())
    }
}

impl ReviewService for CommandReview {
    fn upload_diff(&self, base: &str, head: &str, update: Option<&str>) -> Result<()> {
        self.run(expand_template(&self.diff_command, base, head, update))
    }

    fn land(&self, base: &str, head: &str) -> Result<()> {
        self.run(expand_template(&self.land_command, base, head, None))
    }
}

/// Split a command template into arguments and fill in the placeholders
pub fn expand_template(template: &str, base: &str, head: &str, update: Option<&str>) -> Vec<String> {
    let mut args = Vec::new();
    for token in template.split_whitespace() {
        if token == "{update}" {
            if let Some(revision) = update {
                args.push("--update".to_string());
                args.push(revision.to_string());
            }
            continue;
        }
        args.push(token.replace("{base}", base).replace("{head}", head));
    }
    args
}

/// Patch handed to the review tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewTarget {
    pub patch: String,
    pub parent: String,
    /// Parent tip
    pub base: String,
    /// Patch tip
    pub head: String,
}

pub struct ReviewBridge<'a> {
    ctx: StackContext<'a>,
    review: &'a dyn ReviewService,
}

impl<'a> ReviewBridge<'a> {
    pub fn new(ctx: StackContext<'a>, review: &'a dyn ReviewService) -> Self {
        Self { ctx, review }
    }

    pub fn arcdiff(&self, update: Option<&str>) -> Result<ReviewTarget> {
        let target = self.current_target()?;
        self.review.upload_diff(&target.base, &target.head, update)?;
        Ok(target)
    }

    pub fn arcland(&self) -> Result<ReviewTarget> {
        let target = self.current_target()?;
        self.review.land(&target.base, &target.head)?;
        Ok(target)
    }

    fn current_target(&self) -> Result<ReviewTarget> {
        let stack = self.ctx.load()?;
        let position = self.ctx.position(&stack)?;
        let rel = relation(self.ctx.vcs, &stack, &position)?;
        debug!("Review target '{}' over '{}'", rel.patch, rel.parent);

        Ok(ReviewTarget {
            patch: rel.patch,
            parent: rel.parent,
            base: rel.parent_tip,
            head: rel.patch_tip,
        })
    }
}
