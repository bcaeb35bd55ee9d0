//! Domain models for the CMS module store.
//!
//! # Core Concepts
//!
//! - [`Plugin`]: A node in a page's plugin tree. Plugins nest through `parent_id`.
//! - Module plugin: a [`Plugin`] whose type is [`PluginType::Module`]. It is the
//!   root of a reusable block; every plugin below it in the tree is one of its
//!   child plugins and is owned by it.
//! - [`Category`]: A grouping of modules. A category with no plugins left in it
//!   is considered empty.
//!
//! The purge types ([`PurgePlan`], [`PurgeResult`]) describe what a bulk removal
//! would touch and what it actually touched.

mod category;
mod plugin;
mod purge;

pub use category::*;
pub use plugin::*;
pub use purge::*;
