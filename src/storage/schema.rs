//! Database schema definitions and migration logic.
//!
//! The schema evolves through an ordered list of [`Migration`] steps. The
//! version reached so far is tracked in `PRAGMA user_version`. A step only
//! creates stores and indexes that are missing, so data written under an
//! older version survives every upgrade.

use crate::error::{DeskError, Result};
use rusqlite::Connection;

/// One version-gated schema step.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i32,
    pub name: &'static str,
    pub sql: &'static str,
}

/// All schema steps, in version order.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "core_stores",
        sql: r"
            CREATE TABLE IF NOT EXISTS wallets (
                key TEXT PRIMARY KEY,
                data TEXT NOT NULL
            );

            -- Singleton lists stored under a fixed key
            CREATE TABLE IF NOT EXISTS wallet_types (
                key TEXT PRIMARY KEY,
                data TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS projects (
                key TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                is_deleted INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS tasks (
                key TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                is_deleted INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS sub_tasks (
                key TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                task_id TEXT NOT NULL DEFAULT ''
            );
            CREATE INDEX IF NOT EXISTS idx_sub_tasks_task_id ON sub_tasks(task_id);

            CREATE TABLE IF NOT EXISTS chains (
                key TEXT PRIMARY KEY,
                data TEXT NOT NULL
            );
        ",
    },
    Migration {
        version: 2,
        name: "notes_store",
        sql: r"
            CREATE TABLE IF NOT EXISTS notes (
                key TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                is_deleted INTEGER NOT NULL DEFAULT 0
            );
        ",
    },
    Migration {
        version: 3,
        name: "tags_store",
        sql: r"
            CREATE TABLE IF NOT EXISTS tags (
                key TEXT PRIMARY KEY,
                data TEXT NOT NULL
            );
        ",
    },
];

/// Version reached after every migration has run.
pub const CURRENT_SCHEMA_VERSION: i32 = 3;

/// Bring the database to the current schema and set connection PRAGMAs.
///
/// # Errors
///
/// Returns `SchemaTooNew` if the database was written by a newer build, or a
/// database error if a migration fails.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    migrate_to(conn, CURRENT_SCHEMA_VERSION)?;

    // Set journal mode to WAL for concurrency
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // Enable foreign keys
    conn.pragma_update(None, "foreign_keys", "ON")?;

    // NORMAL synchronous is safe with WAL: committed data survives OS crash
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;
    conn.pragma_update(None, "cache_size", "-8000")?;

    Ok(())
}

/// Run every migration above the stored version, up to and including `target`.
///
/// Each step commits together with its `user_version` bump. Returns the
/// version the database is at afterwards.
///
/// # Errors
///
/// Returns `SchemaTooNew` if the stored version is above
/// [`CURRENT_SCHEMA_VERSION`], or a database error if a step fails.
pub fn migrate_to(conn: &Connection, target: i32) -> Result<i32> {
    let mut current = schema_version(conn)?;
    if current > CURRENT_SCHEMA_VERSION {
        return Err(DeskError::SchemaTooNew {
            found: current,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }

    let start = current;
    for migration in MIGRATIONS
        .iter()
        .filter(|m| m.version > start && m.version <= target)
    {
        tracing::debug!(
            version = migration.version,
            name = migration.name,
            "Applying schema migration"
        );
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
        tx.commit()?;
        current = migration.version;
    }

    Ok(current)
}

/// Read the schema version recorded in the database.
///
/// # Errors
///
/// Returns an error if the PRAGMA cannot be read.
pub fn schema_version(conn: &Connection) -> Result<i32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// True if `sql` only creates things and never removes data.
#[must_use]
pub fn is_additive(sql: &str) -> bool {
    let upper = sql.to_ascii_uppercase();
    !["DROP ", "DELETE ", "RENAME "]
        .iter()
        .any(|forbidden| upper.contains(forbidden))
}

/// Check whether a table exists.
#[must_use]
pub fn table_exists(conn: &Connection, table: &str) -> bool {
    conn.prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name=?")
        .and_then(|mut stmt| stmt.exists([table]))
        .unwrap_or(false)
}

/// Check whether an index exists.
#[must_use]
pub fn index_exists(conn: &Connection, index: &str) -> bool {
    conn.prepare("SELECT 1 FROM sqlite_master WHERE type='index' AND name=?")
        .and_then(|mut stmt| stmt.exists([index]))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_schema() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        for table in [
            "wallets",
            "wallet_types",
            "projects",
            "tasks",
            "sub_tasks",
            "chains",
            "notes",
            "tags",
        ] {
            assert!(table_exists(&conn, table), "missing table {table}");
        }
        assert!(index_exists(&conn, "idx_sub_tasks_task_id"));
        assert_eq!(schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);

        let fk: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn apply_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();
        apply_schema(&conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn migrations_are_ordered_and_end_at_current() {
        let versions: Vec<i32> = MIGRATIONS.iter().map(|m| m.version).collect();
        let mut sorted = versions.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(versions, sorted);
        assert_eq!(versions.last().copied(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn every_migration_is_additive() {
        for migration in MIGRATIONS {
            assert!(
                is_additive(migration.sql),
                "migration {} ({}) removes data",
                migration.version,
                migration.name
            );
        }
    }

    #[test]
    fn is_additive_flags_destructive_sql() {
        assert!(is_additive("CREATE TABLE IF NOT EXISTS x (key TEXT)"));
        assert!(!is_additive("DROP TABLE sub_tasks; CREATE TABLE sub_tasks (key TEXT)"));
        assert!(!is_additive("delete from notes"));
        assert!(is_additive("ALTER TABLE notes ADD COLUMN pinned INTEGER"));
        assert!(!is_additive("ALTER TABLE notes RENAME TO old_notes"));
    }

    #[test]
    fn partial_migration_stops_at_target() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(migrate_to(&conn, 1).unwrap(), 1);
        assert!(table_exists(&conn, "sub_tasks"));
        assert!(!table_exists(&conn, "notes"));
        assert!(!table_exists(&conn, "tags"));
    }

    #[test]
    fn newer_schema_is_refused() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION + 1)
            .unwrap();
        let err = apply_schema(&conn).unwrap_err();
        assert!(matches!(err, DeskError::SchemaTooNew { .. }));
    }
}
