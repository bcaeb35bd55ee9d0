use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use rusqlite::Connection;
use speculate2::speculate;
use uuid::Uuid;

const SCHEMA: &str = include_str!("../src/db/migrations/001_initial.sql");

/// A store as the CMS leaves it: module tables, no migration bookkeeping,
/// default journal mode. One category holding a module with two children,
/// plus an empty category.
fn create_cms_store(path: &Path) {
    let conn = Connection::open(path).expect("Failed to create store");
    conn.execute_batch(SCHEMA).expect("Failed to create tables");

    let now = chrono::Utc::now().to_rfc3339();
    let blocks = Uuid::new_v4().to_string();
    let module = Uuid::new_v4().to_string();

    conn.execute(
        "INSERT INTO categories (id, name, position, created_at) VALUES (?, 'Blocks', 0, ?)",
        (&blocks, &now),
    )
    .expect("Failed to insert category");
    conn.execute(
        "INSERT INTO categories (id, name, position, created_at) VALUES (?, 'Archive', 1, ?)",
        (Uuid::new_v4().to_string(), &now),
    )
    .expect("Failed to insert category");
    conn.execute(
        "INSERT INTO plugins (id, plugin_type, category_id, position, module_name, created_at)
         VALUES (?, 'ModulePlugin', ?, 0, 'Hero', ?)",
        (&module, &blocks, &now),
    )
    .expect("Failed to insert module");
    for _ in 0..2 {
        conn.execute(
            "INSERT INTO plugins (id, plugin_type, parent_id, position, created_at)
             VALUES (?, 'TextPlugin', ?, 0, ?)",
            (Uuid::new_v4().to_string(), &module, &now),
        )
        .expect("Failed to insert child");
    }
}

fn cmsmod(database: &Path, args: &[&str], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_cmsmod"))
        .arg("--database")
        .arg(database)
        .args(args)
        .env_remove("CMSMOD_DATABASE")
        .env("RUST_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start cmsmod");

    child
        .stdin
        .take()
        .expect("stdin was not piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");

    child.wait_with_output().expect("Failed to wait for cmsmod")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// (modules, plugins, categories)
fn counts(path: &Path) -> (i64, i64, i64) {
    let conn = Connection::open(path).expect("Failed to open store");
    let count = |sql: &str| -> i64 {
        conn.query_row(sql, [], |row| row.get(0))
            .expect("Count failed")
    };
    (
        count("SELECT COUNT(*) FROM plugins WHERE plugin_type = 'ModulePlugin'"),
        count("SELECT COUNT(*) FROM plugins"),
        count("SELECT COUNT(*) FROM categories"),
    )
}

fn has_table(path: &Path, name: &str) -> bool {
    let conn = Connection::open(path).expect("Failed to open store");
    let n: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
            [name],
            |row| row.get(0),
        )
        .expect("Query failed");
    n > 0
}

fn journal_mode(path: &Path) -> String {
    let conn = Connection::open(path).expect("Failed to open store");
    conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))
        .expect("Query failed")
}

speculate! {
    before {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store: PathBuf = dir.path().join("cms.db");
        create_cms_store(&store);
    }

    describe "remove-modules --dry-run" {
        it "exits 0 and leaves the store file untouched" {
            let before = std::fs::read(&store).expect("Failed to read store");

            let output = cmsmod(&store, &["remove-modules", "--dry-run", "--verbosity", "2"], "");

            assert_eq!(output.status.code(), Some(0));
            assert!(stdout(&output).contains("Found 1 Module plugin with 2 child plugins"));
            assert!(stdout(&output).contains("DRY RUN MODE - No changes will be made"));

            assert_eq!(std::fs::read(&store).expect("Failed to read store"), before);
            assert!(!has_table(&store, "schema_migrations"));
            assert_eq!(journal_mode(&store), "delete");
            assert_eq!(counts(&store), (1, 3, 2));
        }

        it "fails on a missing store without creating it" {
            let missing = dir.path().join("typo").join("nothere.db");

            let output = cmsmod(&missing, &["remove-modules", "--dry-run"], "");

            assert_ne!(output.status.code(), Some(0));
            assert!(!missing.exists());
            assert!(!dir.path().join("typo").exists());
        }
    }

    describe "remove-modules" {
        it "exits 0 without writing when the prompt is declined" {
            let output = cmsmod(&store, &["remove-modules"], "no\n");

            assert_eq!(output.status.code(), Some(0));
            assert!(stdout(&output).contains("Operation cancelled."));
            assert_eq!(counts(&store), (1, 3, 2));
        }

        it "deletes after yes" {
            let output = cmsmod(&store, &["remove-modules"], "yes\n");

            assert_eq!(output.status.code(), Some(0));
            assert_eq!(counts(&store), (0, 0, 2));
        }

        it "deletes modules and emptied categories when forced" {
            let output = cmsmod(&store, &["remove-modules", "--force", "--remove-categories"], "");

            assert_eq!(output.status.code(), Some(0));
            assert!(stdout(&output).contains("Successfully deleted 2 empty categories"));
            assert_eq!(counts(&store), (0, 0, 0));
            assert!(!has_table(&store, "schema_migrations"));
        }

        it "rejects verbosity 3 with a usage error" {
            let output = cmsmod(&store, &["remove-modules", "--verbosity", "3"], "");

            assert_eq!(output.status.code(), Some(2));
            assert_eq!(counts(&store), (1, 3, 2));
        }

        it "exits non-zero on a store error" {
            let broken = dir.path().join("broken.db");
            Connection::open(&broken)
                .expect("Failed to create store")
                .execute_batch("CREATE TABLE unrelated (id INTEGER PRIMARY KEY);")
                .expect("Failed to create table");

            let output = cmsmod(&broken, &["remove-modules", "--force"], "");

            assert_eq!(output.status.code(), Some(1));
            assert!(String::from_utf8_lossy(&output.stderr).contains("no such table"));
        }
    }

    describe "migrate" {
        it "creates a new store with migration bookkeeping" {
            let fresh = dir.path().join("nested").join("fresh.db");

            let output = cmsmod(&fresh, &["migrate"], "");

            assert_eq!(output.status.code(), Some(0));
            assert!(has_table(&fresh, "schema_migrations"));
            assert!(has_table(&fresh, "plugins"));
        }

        it "baselines an existing CMS store" {
            let output = cmsmod(&store, &["migrate"], "");

            assert_eq!(output.status.code(), Some(0));
            assert!(has_table(&store, "schema_migrations"));
            assert_eq!(counts(&store), (1, 3, 2));
        }
    }
}
