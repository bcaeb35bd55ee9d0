use anyhow::{Context, Result};
use rusqlite::Connection;

/// One versioned step of the store schema, applied at most once.
struct Migration {
    version: &'static str,
    name: &'static str,
    sql: &'static str,
}

// Append new steps here; versions must sort in the order they apply
const MIGRATIONS: &[Migration] = &[Migration {
    version: "001",
    name: "initial",
    sql: include_str!("migrations/001_initial.sql"),
}];

/// Bring the schema up to the latest version. Rerunning is a no-op.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    // Version bookkeeping lives next to the data it describes
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )
    .context("Failed to create schema_migrations table")?;

    // Stores created by the CMS already have the tables but no version rows
    if check_needs_baseline(conn)? {
        mark_migration_applied(conn, "001", "initial")?;
        tracing::info!("Detected existing module tables, marked migration 001 as applied");
    }

    let applied = get_applied_migrations(conn)?;

    // Apply whatever is not recorded yet, oldest first
    for migration in MIGRATIONS {
        if !applied.iter().any(|v| v == migration.version) {
            apply_migration(conn, migration)?;
        }
    }

    Ok(())
}

/// True for a store that has module tables but has never been migrated.
fn check_needs_baseline(conn: &Connection) -> Result<bool> {
    let migration_count: i32 =
        conn.query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| {
            row.get(0)
        })?;

    if migration_count > 0 {
        return Ok(false);
    }

    // `plugins` is the table every CMS store has
    let tables_exist: i32 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='plugins'",
        [],
        |row| row.get(0),
    )?;

    Ok(tables_exist > 0)
}

fn get_applied_migrations(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations ORDER BY version")?;
    let versions = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(versions)
}

fn mark_migration_applied(conn: &Connection, version: &str, name: &str) -> Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)",
        (version, name, &now),
    )?;
    Ok(())
}

fn apply_migration(conn: &Connection, migration: &Migration) -> Result<()> {
    tracing::info!(
        "Applying migration {}: {}",
        migration.version,
        migration.name
    );

    // A failing statement leaves the schema as it was before this step
    conn.execute_batch(&format!("BEGIN TRANSACTION; {} COMMIT;", migration.sql))
        .with_context(|| {
            format!(
                "Failed to apply migration {}: {}",
                migration.version, migration.name
            )
        })?;

    // Recorded outside the batch; a crash in between reapplies and fails loudly
    mark_migration_applied(conn, migration.version, migration.name)?;

    tracing::debug!("Migration {} applied", migration.version);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        let count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
                [name],
                |row| row.get(0),
            )
            .unwrap();
        count == 1
    }

    #[test]
    fn test_migrations_run_on_fresh_db() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        assert!(table_exists(&conn, "plugins"));
        assert!(table_exists(&conn, "categories"));

        let versions = get_applied_migrations(&conn).unwrap();
        assert_eq!(versions, vec!["001"]);
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let versions = get_applied_migrations(&conn).unwrap();
        assert_eq!(versions, vec!["001"]);
    }

    #[test]
    fn test_existing_db_gets_baseline() {
        let conn = Connection::open_in_memory().unwrap();

        // Tables created outside of migration tracking
        conn.execute_batch(
            "
            CREATE TABLE categories (id TEXT PRIMARY KEY, name TEXT NOT NULL, position INTEGER NOT NULL DEFAULT 0, created_at TEXT NOT NULL);
            CREATE TABLE plugins (id TEXT PRIMARY KEY, plugin_type TEXT NOT NULL, parent_id TEXT, category_id TEXT, page_id TEXT, position INTEGER NOT NULL DEFAULT 0, module_name TEXT, created_at TEXT NOT NULL);
        ",
        )
        .unwrap();

        // Would fail with "table already exists" without the baseline
        run_migrations(&conn).unwrap();

        let versions = get_applied_migrations(&conn).unwrap();
        assert_eq!(versions, vec!["001"]);
    }
}
