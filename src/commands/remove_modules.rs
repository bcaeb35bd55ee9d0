//! Bulk removal of module plugins.
//!
//! [`remove_modules`] counts every module plugin and the plugins it owns,
//! reports them, asks for confirmation unless forced, and then deletes them in
//! a single transaction through [`Database::purge`]. A dry run stops after the
//! report and never opens a write transaction.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use crate::db::Database;
use crate::error::PurgeError;
use crate::models::{PurgePlan, PurgeResult};
use crate::render;

/// Highest accepted `verbosity`.
pub const MAX_VERBOSITY: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveModulesOptions {
    /// Report what would be deleted without deleting it.
    pub dry_run: bool,
    /// Also delete categories left without plugins.
    pub remove_categories: bool,
    /// Skip the confirmation prompt.
    pub force: bool,
    /// 0 prints totals only, 1 adds a summary per record kind, 2 lists every module.
    pub verbosity: u8,
}

impl Default for RemoveModulesOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            remove_categories: false,
            force: false,
            verbosity: 1,
        }
    }
}

impl RemoveModulesOptions {
    pub fn validate(&self) -> Result<(), PurgeError> {
        if self.verbosity > MAX_VERBOSITY {
            return Err(PurgeError::InvalidVerbosity(self.verbosity));
        }
        Ok(())
    }
}

/// How a run ended. Every variant is a clean exit.
#[derive(Debug)]
pub enum Outcome {
    /// The store held no module plugins.
    NothingToRemove,
    /// Preview only; nothing was written.
    DryRun(PurgePlan),
    /// The operator declined the prompt; nothing was written.
    Cancelled(PurgePlan),
    /// The purge committed.
    Removed(PurgeResult),
}

/// Remove every module plugin (and its children) from `db`.
///
/// The confirmation answer is read from `input`; reports and the prompt are
/// written to `out`.
pub fn remove_modules<R: BufRead, W: Write>(
    db: &Database,
    options: &RemoveModulesOptions,
    input: &mut R,
    out: &mut W,
) -> Result<Outcome> {
    options.validate()?;
    let verbosity = options.verbosity;

    let plan = db
        .plan_purge(options.remove_categories)
        .context("Failed to count module plugins")?;

    tracing::info!(
        modules = plan.module_count(),
        children = plan.child_count(),
        categories = plan.category_count(),
        dry_run = options.dry_run,
        "Planned module removal"
    );

    // With remove_categories, empty categories alone are still work to do
    if plan.is_empty() && (!options.remove_categories || plan.categories.is_empty()) {
        if verbosity == 0 {
            writeln!(out, "{}", render::plan_totals(&plan, options.remove_categories))?;
        } else {
            writeln!(out, "{}", render::NOTHING_TO_REMOVE)?;
        }
        return Ok(Outcome::NothingToRemove);
    }

    write_plan(out, &plan, options)?;

    if options.dry_run {
        if verbosity >= 1 {
            writeln!(out, "{}", render::DRY_RUN_BANNER)?;
            writeln!(out, "{}", render::DRY_RUN_DONE)?;
        }
        return Ok(Outcome::DryRun(plan));
    }

    if !options.force && !confirm(input, out, &plan, options.remove_categories)? {
        tracing::info!("Module removal cancelled at the prompt");
        if verbosity >= 1 {
            writeln!(out, "{}", render::CANCELLED)?;
        }
        return Ok(Outcome::Cancelled(plan));
    }

    let result = db
        .purge(options.remove_categories)
        .context("Error during deletion")?;

    let counts = result.counts();
    if counts.modules != plan.module_count() || counts.children != plan.child_count() {
        tracing::warn!(
            planned_modules = plan.module_count(),
            planned_children = plan.child_count(),
            modules = counts.modules,
            children = counts.children,
            "Store changed between preview and deletion"
        );
    }

    write_result(out, &result, options)?;
    Ok(Outcome::Removed(result))
}

fn write_plan<W: Write>(out: &mut W, plan: &PurgePlan, options: &RemoveModulesOptions) -> Result<()> {
    if options.verbosity == 0 {
        writeln!(out, "{}", render::plan_totals(plan, options.remove_categories))?;
        return Ok(());
    }

    writeln!(out, "{}", render::found_modules(plan))?;
    if options.remove_categories {
        writeln!(out, "{}", render::found_categories(plan))?;
    }

    if options.verbosity >= 2 {
        writeln!(out, "{}", render::BREAKDOWN_HEADER)?;
        for module in &plan.modules {
            writeln!(out, "{}", render::module_breakdown(module))?;
        }
    }
    Ok(())
}

/// Ask the operator to type "yes". End of input counts as a refusal.
fn confirm<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    plan: &PurgePlan,
    remove_categories: bool,
) -> Result<bool> {
    write!(out, "{}", render::confirmation_prompt(plan, remove_categories))?;
    out.flush()?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}

fn write_result<W: Write>(
    out: &mut W,
    result: &PurgeResult,
    options: &RemoveModulesOptions,
) -> Result<()> {
    let counts = result.counts();

    if options.verbosity == 0 {
        writeln!(out, "{}", render::deleted_totals(&counts, options.remove_categories))?;
        return Ok(());
    }

    if options.verbosity >= 2 {
        for module in &result.modules {
            writeln!(out, "{}", render::deleted_module(module))?;
        }
        for category in &result.categories {
            writeln!(out, "{}", render::deleted_category(category))?;
        }
    }

    writeln!(out, "{}", render::deleted_plugins(&counts))?;
    if options.remove_categories && counts.categories > 0 {
        writeln!(out, "{}", render::deleted_categories(&counts))?;
    }
    Ok(())
}
