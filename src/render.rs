//! Console wording for purge reports.

use crate::models::{Category, DeletedCounts, ModuleSummary, PurgePlan};

pub const NOTHING_TO_REMOVE: &str = "No Module plugins found to remove.";
pub const DRY_RUN_BANNER: &str = "DRY RUN MODE - No changes will be made";
pub const DRY_RUN_DONE: &str = "Dry run completed. Use --force to skip confirmation.";
pub const CANCELLED: &str = "Operation cancelled.";
pub const BREAKDOWN_HEADER: &str = "Detailed breakdown:";

/// Plural suffix for `count`.
///
/// `suffix` is either a plain suffix (`"s"`) or a `"singular,plural"` pair
/// (`"y,ies"`). Returns `""` when `count` is 1 and the plural part otherwise.
pub fn pluralize(count: usize, suffix: &str) -> &str {
    if count == 1 {
        return "";
    }
    match suffix.split_once(',') {
        Some((_, plural)) => plural,
        None => suffix,
    }
}

fn categories(count: usize) -> String {
    format!("categor{}", if count == 1 { "y" } else { pluralize(count, "y,ies") })
}

/// One-line totals, used at verbosity 0.
pub fn plan_totals(plan: &PurgePlan, remove_categories: bool) -> String {
    let mut line = format!(
        "{} Module plugin{}, {} child plugin{}",
        plan.module_count(),
        pluralize(plan.module_count(), "s"),
        plan.child_count(),
        pluralize(plan.child_count(), "s"),
    );
    if remove_categories {
        line.push_str(&format!(", {} {}", plan.category_count(), categories(plan.category_count())));
    }
    line
}

pub fn found_modules(plan: &PurgePlan) -> String {
    format!(
        "Found {} Module plugin{} with {} child plugin{}",
        plan.module_count(),
        pluralize(plan.module_count(), "s"),
        plan.child_count(),
        pluralize(plan.child_count(), "s"),
    )
}

pub fn found_categories(plan: &PurgePlan) -> String {
    format!(
        "Found {} {} that will be removed",
        plan.category_count(),
        categories(plan.category_count())
    )
}

pub fn module_breakdown(module: &ModuleSummary) -> String {
    format!(
        "  Module \"{}\" (ID: {}) has {} child plugin{}",
        module.module_name,
        module.id,
        module.child_count,
        pluralize(module.child_count, "s"),
    )
}

/// The question asked before deleting anything.
pub fn confirmation_prompt(plan: &PurgePlan, remove_categories: bool) -> String {
    let total = plan.plugin_count();
    let mut prompt = format!(
        "This will permanently delete {} plugin{} ({} Module plugins and {} child plugins)",
        total,
        pluralize(total, "s"),
        plan.module_count(),
        plan.child_count(),
    );
    if remove_categories {
        prompt.push_str(&format!(
            " and {} {}",
            plan.category_count(),
            categories(plan.category_count())
        ));
    }
    prompt.push_str(".\n\nAre you sure? Type \"yes\" to continue: ");
    prompt
}

pub fn deleted_module(module: &ModuleSummary) -> String {
    format!(
        "Deleted Module \"{}\" and {} child plugin{}",
        module.module_name,
        module.child_count,
        pluralize(module.child_count, "s"),
    )
}

pub fn deleted_category(category: &Category) -> String {
    format!("Deleted empty category \"{}\"", category.name)
}

pub fn deleted_plugins(counts: &DeletedCounts) -> String {
    format!(
        "Successfully deleted {} Module plugins, {} child plugins",
        counts.modules, counts.children
    )
}

pub fn deleted_categories(counts: &DeletedCounts) -> String {
    format!(
        "Successfully deleted {} empty {}",
        counts.categories,
        categories(counts.categories)
    )
}

/// One-line totals after a purge, used at verbosity 0.
pub fn deleted_totals(counts: &DeletedCounts, remove_categories: bool) -> String {
    let mut line = format!(
        "Deleted {} Module plugin{}, {} child plugin{}",
        counts.modules,
        pluralize(counts.modules, "s"),
        counts.children,
        pluralize(counts.children, "s"),
    );
    if remove_categories {
        line.push_str(&format!(", {} {}", counts.categories, categories(counts.categories)));
    }
    line
}
