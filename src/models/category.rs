use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named grouping of module plugins.
///
/// Categories are persisted independently of the plugins they hold. They are
/// never removed implicitly: a bulk purge only deletes a category when asked to
/// and only once no plugin references it any more.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    /// Display order among sibling categories.
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryInput {
    pub name: String,
    #[serde(default)]
    pub position: i32,
}
