mod schema;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row, TransactionBehavior};
use uuid::Uuid;

use crate::error::PurgeError;
use crate::models::*;

/// Every plugin below a module, stopping at nested modules (they own their own subtree).
const OWNED_CHILD_COUNT_SQL: &str = "
    WITH RECURSIVE owned(id) AS (
        SELECT id FROM plugins WHERE parent_id = ?1 AND plugin_type != 'ModulePlugin'
        UNION
        SELECT p.id FROM plugins p JOIN owned o ON p.parent_id = o.id
        WHERE p.plugin_type != 'ModulePlugin'
    )
    SELECT COUNT(*) FROM owned";

const DELETE_SUBTREE_SQL: &str = "
    WITH RECURSIVE subtree(id) AS (
        SELECT id FROM plugins WHERE id = ?1
        UNION
        SELECT p.id FROM plugins p JOIN subtree s ON p.parent_id = s.id
    )
    DELETE FROM plugins WHERE id IN (SELECT id FROM subtree)";

/// Categories that keep no plugin once every module subtree is removed.
const CATEGORIES_EMPTIED_BY_PURGE_SQL: &str = "
    WITH RECURSIVE doomed(id) AS (
        SELECT id FROM plugins WHERE plugin_type = 'ModulePlugin'
        UNION
        SELECT p.id FROM plugins p JOIN doomed d ON p.parent_id = d.id
    )
    SELECT c.id, c.name, c.position, c.created_at FROM categories c
    WHERE NOT EXISTS (
        SELECT 1 FROM plugins p
        WHERE p.category_id = c.id AND p.id NOT IN (SELECT id FROM doomed)
    )
    ORDER BY c.position, c.name";

const EMPTY_CATEGORIES_SQL: &str = "
    SELECT c.id, c.name, c.position, c.created_at FROM categories c
    WHERE NOT EXISTS (SELECT 1 FROM plugins p WHERE p.category_id = c.id)
    ORDER BY c.position, c.name";

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a store, creating parent directories and switching to WAL.
    ///
    /// Used by `migrate`. Commands working on an existing store go through
    /// [`Database::open_existing`] instead.
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::from_connection(conn)
    }

    /// Open a store that must already exist, without changing its journal mode.
    ///
    /// With `read_only` the connection cannot write at all, so a preview
    /// leaves the file byte-for-byte untouched.
    pub fn open_existing(path: &Path, read_only: bool) -> Result<Self> {
        if !path.is_file() {
            anyhow::bail!("Database not found at {}", path.display());
        }

        let access = if read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE
        };
        let flags = access | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        Self::from_connection(conn)
    }

    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Category operations
    // ============================================================

    pub fn get_all_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, name, position, created_at FROM categories ORDER BY position, name",
        )?;

        let categories = stmt
            .query_map([], map_category)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    pub fn get_category(&self, id: Uuid) -> Result<Option<Category>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let category = conn
            .query_row(
                "SELECT id, name, position, created_at FROM categories WHERE id = ?",
                [id.to_string()],
                map_category,
            )
            .optional()?;
        Ok(category)
    }

    pub fn create_category(&self, input: CreateCategoryInput) -> Result<Category> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO categories (id, name, position, created_at) VALUES (?, ?, ?, ?)",
            (id.to_string(), &input.name, input.position, now.to_rfc3339()),
        )?;

        Ok(Category {
            id,
            name: input.name,
            position: input.position,
            created_at: now,
        })
    }

    pub fn count_categories(&self) -> Result<usize> {
        let conn = self.conn.lock().expect("database lock poisoned");
        count(&conn, "SELECT COUNT(*) FROM categories")
    }

    // ============================================================
    // Plugin operations
    // ============================================================

    pub fn get_plugin(&self, id: Uuid) -> Result<Option<Plugin>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let plugin = conn
            .query_row(
                "SELECT id, plugin_type, parent_id, category_id, page_id, position, module_name, created_at
                 FROM plugins WHERE id = ?",
                [id.to_string()],
                map_plugin,
            )
            .optional()?;
        Ok(plugin)
    }

    pub fn get_module_plugins(&self) -> Result<Vec<Plugin>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, plugin_type, parent_id, category_id, page_id, position, module_name, created_at
             FROM plugins WHERE plugin_type = 'ModulePlugin' ORDER BY position, module_name, id",
        )?;

        let plugins = stmt
            .query_map([], map_plugin)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(plugins)
    }

    pub fn create_plugin(&self, input: CreatePluginInput) -> Result<Plugin> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO plugins (id, plugin_type, parent_id, category_id, page_id, position, module_name, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                input.plugin_type.as_str(),
                input.parent_id.map(|u| u.to_string()),
                input.category_id.map(|u| u.to_string()),
                input.page_id.map(|u| u.to_string()),
                input.position,
                &input.module_name,
                now.to_rfc3339(),
            ),
        )
        .context("Failed to insert plugin")?;

        Ok(Plugin {
            id,
            plugin_type: input.plugin_type,
            parent_id: input.parent_id,
            category_id: input.category_id,
            page_id: input.page_id,
            position: input.position,
            module_name: input.module_name,
            created_at: now,
        })
    }

    pub fn count_plugins(&self) -> Result<usize> {
        let conn = self.conn.lock().expect("database lock poisoned");
        count(&conn, "SELECT COUNT(*) FROM plugins")
    }

    pub fn count_module_plugins(&self) -> Result<usize> {
        let conn = self.conn.lock().expect("database lock poisoned");
        count_modules(&conn)
    }

    /// Plugins whose parent reference points at a row that no longer exists.
    pub fn count_orphaned_plugins(&self) -> Result<usize> {
        let conn = self.conn.lock().expect("database lock poisoned");
        count(
            &conn,
            "SELECT COUNT(*) FROM plugins p
             WHERE p.parent_id IS NOT NULL
               AND NOT EXISTS (SELECT 1 FROM plugins parent WHERE parent.id = p.parent_id)",
        )
    }

    // ============================================================
    // Purge operations
    // ============================================================

    /// Compute what [`Database::purge`] would remove. Read-only.
    pub fn plan_purge(&self, remove_categories: bool) -> Result<PurgePlan> {
        let conn = self.conn.lock().expect("database lock poisoned");

        let modules = load_module_summaries(&conn)?;
        let categories = if remove_categories {
            load_categories(&conn, CATEGORIES_EMPTIED_BY_PURGE_SQL)?
        } else {
            Vec::new()
        };

        Ok(PurgePlan {
            modules,
            categories,
        })
    }

    /// Delete every module plugin with its subtree and, optionally, every
    /// category left without plugins, as one transaction.
    ///
    /// The deletion set is re-read inside the transaction, so the result
    /// reflects what was actually removed even if the store changed since
    /// [`Database::plan_purge`]. Any error rolls the whole purge back.
    pub fn purge(&self, remove_categories: bool) -> Result<PurgeResult> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let modules = load_module_summaries(&tx)?;
        let expected: usize = modules.iter().map(|m| m.child_count + 1).sum();

        let mut deleted = 0;
        for module in &modules {
            let rows = tx
                .execute(DELETE_SUBTREE_SQL, [module.id.to_string()])
                .with_context(|| format!("Failed to delete Module \"{}\"", module.module_name))?;
            tracing::debug!(
                module_id = %module.id,
                module_name = %module.module_name,
                rows,
                "Deleted module subtree"
            );
            deleted += rows;
        }

        let remaining_modules = count_modules(&tx)?;
        if deleted != expected || remaining_modules > 0 {
            return Err(PurgeError::IncompleteDeletion {
                expected,
                deleted,
                remaining_modules,
            }
            .into());
        }

        let categories = if remove_categories {
            let empty = load_categories(&tx, EMPTY_CATEGORIES_SQL)?;
            for category in &empty {
                tx.execute(
                    "DELETE FROM categories WHERE id = ?",
                    [category.id.to_string()],
                )
                .with_context(|| format!("Failed to delete category \"{}\"", category.name))?;
                tracing::debug!(category_id = %category.id, name = %category.name, "Deleted empty category");
            }
            empty
        } else {
            Vec::new()
        };

        tx.commit()?;

        tracing::info!(
            modules = modules.len(),
            plugins = deleted,
            categories = categories.len(),
            "Purge committed"
        );

        Ok(PurgeResult {
            modules,
            categories,
        })
    }
}

fn load_module_summaries(conn: &Connection) -> Result<Vec<ModuleSummary>> {
    let mut stmt = conn.prepare(
        "SELECT id, COALESCE(module_name, '') FROM plugins
         WHERE plugin_type = 'ModulePlugin' ORDER BY position, module_name, id",
    )?;
    let modules = stmt
        .query_map([], |row| {
            Ok((parse_uuid(row.get::<_, String>(0)?), row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut child_stmt = conn.prepare(OWNED_CHILD_COUNT_SQL)?;
    modules
        .into_iter()
        .map(|(id, module_name)| -> Result<ModuleSummary> {
            let child_count: i64 =
                child_stmt.query_row([id.to_string()], |row| row.get(0))?;
            Ok(ModuleSummary {
                id,
                module_name,
                child_count: child_count as usize,
            })
        })
        .collect()
}

fn load_categories(conn: &Connection, sql: &str) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(sql)?;
    let categories = stmt
        .query_map([], map_category)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(categories)
}

fn count_modules(conn: &Connection) -> Result<usize> {
    count(
        conn,
        "SELECT COUNT(*) FROM plugins WHERE plugin_type = 'ModulePlugin'",
    )
}

fn count(conn: &Connection, sql: &str) -> Result<usize> {
    let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(n as usize)
}

fn map_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: parse_uuid(row.get::<_, String>(0)?),
        name: row.get(1)?,
        position: row.get(2)?,
        created_at: parse_datetime(row.get::<_, String>(3)?),
    })
}

fn map_plugin(row: &Row<'_>) -> rusqlite::Result<Plugin> {
    Ok(Plugin {
        id: parse_uuid(row.get::<_, String>(0)?),
        plugin_type: PluginType::from_str(&row.get::<_, String>(1)?),
        parent_id: row.get::<_, Option<String>>(2)?.map(parse_uuid),
        category_id: row.get::<_, Option<String>>(3)?.map(parse_uuid),
        page_id: row.get::<_, Option<String>>(4)?.map(parse_uuid),
        position: row.get(5)?,
        module_name: row.get(6)?,
        created_at: parse_datetime(row.get::<_, String>(7)?),
    })
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
