//! Maintenance commands run against a module store.

pub mod remove_modules;

pub use remove_modules::{remove_modules, Outcome, RemoveModulesOptions};
