use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::RemoveModulesOptions;

#[derive(Debug, Parser)]
#[command(name = "cmsmod")]
#[command(about = "Maintenance commands for CMS module plugins")]
pub struct Cli {
    /// SQLite database holding the module store
    #[arg(long, global = true, value_name = "PATH")]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Remove all Module CMS plugins and optionally their categories
    RemoveModules(RemoveModulesArgs),
    /// Create or upgrade the store schema
    Migrate,
}

#[derive(Debug, Args)]
pub struct RemoveModulesArgs {
    /// Show what would be deleted without actually deleting it
    #[arg(long)]
    pub dry_run: bool,

    /// Also remove empty categories after removing modules
    #[arg(long)]
    pub remove_categories: bool,

    /// Skip confirmation prompts
    #[arg(long)]
    pub force: bool,

    /// Verbosity level; 0=minimal output, 1=normal output, 2=verbose output
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub verbosity: u8,
}

impl From<&RemoveModulesArgs> for RemoveModulesOptions {
    fn from(args: &RemoveModulesArgs) -> Self {
        Self {
            dry_run: args.dry_run,
            remove_categories: args.remove_categories,
            force: args.force,
            verbosity: args.verbosity,
        }
    }
}
