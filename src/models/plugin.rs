use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A plugin instance placed on a page or inside a category.
///
/// Plugins form trees through `parent_id`. A module plugin owns every plugin
/// beneath it; removing the module must remove that whole subtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Plugin {
    pub id: Uuid,
    pub plugin_type: PluginType,
    /// Parent plugin. `None` for plugins at the top of a placeholder.
    pub parent_id: Option<Uuid>,
    /// Category holding this plugin, if any.
    pub category_id: Option<Uuid>,
    /// Page the plugin is attached to.
    pub page_id: Option<Uuid>,
    pub position: i32,
    /// Display name. Only set for module plugins.
    pub module_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Plugin {
    pub fn is_module(&self) -> bool {
        self.plugin_type == PluginType::Module
    }
}

/// The kind of a plugin row.
///
/// Only `Module` is interpreted by this crate. Every other CMS plugin type is
/// carried through as `Other` with its original type name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PluginType {
    Module,
    Other(String),
}

impl PluginType {
    /// Type name stored for module plugins.
    pub const MODULE: &'static str = "ModulePlugin";

    pub fn as_str(&self) -> &str {
        match self {
            Self::Module => Self::MODULE,
            Self::Other(name) => name,
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            Self::MODULE => Self::Module,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Input for creating a plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePluginInput {
    pub plugin_type: PluginType,
    pub parent_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub page_id: Option<Uuid>,
    #[serde(default)]
    pub position: i32,
    pub module_name: Option<String>,
}

impl CreatePluginInput {
    /// A top-level module plugin inside `category_id`.
    pub fn module(name: impl Into<String>, category_id: Option<Uuid>) -> Self {
        Self {
            plugin_type: PluginType::Module,
            parent_id: None,
            category_id,
            page_id: None,
            position: 0,
            module_name: Some(name.into()),
        }
    }

    /// A plain content plugin nested under `parent_id`.
    pub fn child(plugin_type: impl Into<String>, parent_id: Uuid) -> Self {
        Self {
            plugin_type: PluginType::Other(plugin_type.into()),
            parent_id: Some(parent_id),
            category_id: None,
            page_id: None,
            position: 0,
            module_name: None,
        }
    }
}
