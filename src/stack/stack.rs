use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Parent tip a patch was last forked from or rebased onto, together with
/// the patch's own tip at that moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPoint {
    pub base: String,
    pub tip: String,
}

/// A tracked branch, one unit of the stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patch {
    /// Branch name
    pub name: String,
    /// Name of the previous entry (another patch or the root)
    pub parent: String,
    /// Last sync with the parent, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced: Option<SyncPoint>,
    /// When this patch was added to the stack
    pub created_at: DateTime<Utc>,
}

impl Patch {
    pub fn new(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: parent.into(),
            synced: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_sync(mut self, base: impl Into<String>, tip: impl Into<String>) -> Self {
        self.synced = Some(SyncPoint {
            base: base.into(),
            tip: tip.into(),
        });
        self
    }
}

/// Two stacks are equivalent when they track the same names in the same
/// order with the same parents; timestamps and sync records are ignored.
impl PartialEq for Patch {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.parent == other.parent
    }
}

/// Ordered chain `root -> p1 -> ... -> pN`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stack {
    /// Branch at the bottom of the stack, fixed at init
    pub root: String,
    /// Tracked patches, bottom first
    pub patches: Vec<Patch>,
    /// When the stack was last modified
    pub updated_at: DateTime<Utc>,
}

impl PartialEq for Stack {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root && self.patches == other.patches
    }
}

impl Stack {
    /// Create a stack holding only the root
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            patches: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Number of tracked patches (the root is not counted)
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Every entry name, root first
    pub fn entry_names(&self) -> Vec<&str> {
        std::iter::once(self.root.as_str())
            .chain(self.patches.iter().map(|p| p.name.as_str()))
            .collect()
    }

    /// True for the root and for tracked patches
    pub fn contains(&self, name: &str) -> bool {
        self.root == name || self.is_tracked(name)
    }

    /// True for tracked patches only
    pub fn is_tracked(&self, name: &str) -> bool {
        self.patches.iter().any(|p| p.name == name)
    }

    /// Position index of an entry: 0 is the root, `i + 1` is `patches[i]`
    pub fn index_of(&self, name: &str) -> Option<usize> {
        if self.root == name {
            return Some(0);
        }
        self.patches
            .iter()
            .position(|p| p.name == name)
            .map(|i| i + 1)
    }

    /// Entry name at a position index
    pub fn name_at(&self, index: usize) -> Option<&str> {
        match index {
            0 => Some(self.root.as_str()),
            i => self.patches.get(i - 1).map(|p| p.name.as_str()),
        }
    }

    pub fn patch(&self, name: &str) -> Option<&Patch> {
        self.patches.iter().find(|p| p.name == name)
    }

    pub fn patch_mut(&mut self, name: &str) -> Option<&mut Patch> {
        self.patches.iter_mut().find(|p| p.name == name)
    }

    /// The patch directly above an entry
    pub fn child_of(&self, name: &str) -> Option<&Patch> {
        self.index_of(name).and_then(|i| self.patches.get(i))
    }

    /// Patches whose parent is `name`
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        self.patches
            .iter()
            .filter(|p| p.parent == name)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Insert a patch directly above `position`. The previous child, if any,
    /// is re-linked to the new patch so the chain stays linear.
    ///
    /// Returns false when the name is already an entry or `position` is not.
    pub fn insert_after(&mut self, position: &str, mut patch: Patch) -> bool {
        if self.contains(&patch.name) {
            return false;
        }
        let Some(index) = self.index_of(position) else {
            return false;
        };

        patch.parent = position.to_string();
        if let Some(child) = self.patches.get_mut(index) {
            child.parent = patch.name.clone();
        }
        self.patches.insert(index, patch);
        self.updated_at = Utc::now();
        true
    }

    /// Remove a patch nothing depends on
    pub fn remove_leaf(&mut self, name: &str) -> Option<Patch> {
        if !self.dependents_of(name).is_empty() {
            return None;
        }
        let index = self.patches.iter().position(|p| p.name == name)?;
        let removed = self.patches.remove(index);
        self.updated_at = Utc::now();
        Some(removed)
    }

    /// Record a completed sync for a patch
    pub fn mark_synced(&mut self, name: &str, base: &str, tip: &str) -> bool {
        let Some(patch) = self.patch_mut(name) else {
            return false;
        };
        patch.synced = Some(SyncPoint {
            base: base.to_string(),
            tip: tip.to_string(),
        });
        self.updated_at = Utc::now();
        true
    }

    /// Validate the stack structure
    pub fn validate(&self) -> Result<(), String> {
        if self.root.trim().is_empty() {
            return Err("Root branch name is empty".to_string());
        }

        let mut seen = HashSet::new();
        seen.insert(self.root.as_str());

        let mut previous = self.root.as_str();
        for patch in &self.patches {
            if patch.name.trim().is_empty() {
                return Err("Patch with an empty name".to_string());
            }
            if !seen.insert(patch.name.as_str()) {
                return Err(format!("'{}' appears more than once", patch.name));
            }
            if patch.parent != previous {
                return Err(format!(
                    "Parent of '{}' is '{}' but the previous entry is '{}'",
                    patch.name, patch.parent, previous
                ));
            }
            previous = patch.name.as_str();
        }

        Ok(())
    }
}
