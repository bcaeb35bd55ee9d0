use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::Category;

/// A module plugin as seen by a purge: its identity and how many plugins it owns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModuleSummary {
    pub id: Uuid,
    pub module_name: String,
    /// Descendants owned by this module. Nested modules and their own
    /// descendants are not included.
    pub child_count: usize,
}

/// Everything a bulk module removal would delete, computed without writing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurgePlan {
    pub modules: Vec<ModuleSummary>,
    /// Categories left without plugins once every module subtree is gone.
    /// Empty unless category removal was requested.
    pub categories: Vec<Category>,
}

impl PurgePlan {
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn child_count(&self) -> usize {
        self.modules.iter().map(|m| m.child_count).sum()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Modules plus children.
    pub fn plugin_count(&self) -> usize {
        self.module_count() + self.child_count()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// What a committed purge removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurgeResult {
    pub modules: Vec<ModuleSummary>,
    pub categories: Vec<Category>,
}

impl PurgeResult {
    pub fn counts(&self) -> DeletedCounts {
        DeletedCounts {
            modules: self.modules.len(),
            children: self.modules.iter().map(|m| m.child_count).sum(),
            categories: self.categories.len(),
        }
    }
}

/// Totals of removed records by kind.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletedCounts {
    pub modules: usize,
    pub children: usize,
    pub categories: usize,
}
