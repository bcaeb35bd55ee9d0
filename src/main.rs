use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cmsmod::cli::{Cli, Commands};
use cmsmod::commands::{self, Outcome, RemoveModulesOptions};
use cmsmod::config::{self, Config};
use cmsmod::db::Database;

/// Initialize tracing on stderr; stdout carries the command's report.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "cmsmod=warn".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let path = Config::load().resolve_database_path(cli.database, config::database_from_env())?;
    tracing::info!("Using module store at {}", path.display());

    match cli.command {
        Commands::RemoveModules(args) => {
            let options = RemoveModulesOptions::from(&args);
            // Read-only for previews: a dry run never writes
            let db = Database::open_existing(&path, options.dry_run)?;
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();

            let outcome =
                commands::remove_modules(&db, &options, &mut stdin.lock(), &mut stdout.lock())?;

            if let Outcome::Removed(result) = outcome {
                let counts = result.counts();
                tracing::info!(
                    modules = counts.modules,
                    children = counts.children,
                    categories = counts.categories,
                    "Module plugins removed"
                );
            }
        }
        Commands::Migrate => {
            let db = Database::open(path)?;
            db.migrate()?;
            println!("Schema is up to date.");
        }
    }

    Ok(())
}
