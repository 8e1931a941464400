//! `SQLite` storage implementation.

use crate::error::Result;
use crate::model::DEFAULT_WALLET_TYPES;
use crate::storage::schema::apply_schema;
use rusqlite::{Connection, OptionalExtension, Transaction};
use std::path::Path;

/// Key of the single row in `wallet_types`.
const WALLET_TYPES_KEY: &str = "types";

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

/// Context for a mutation operation, tracking its side effects.
#[derive(Debug, Default)]
pub struct MutationContext {
    pub op_name: String,
    pub writes: usize,
    pub deletes: usize,
}

impl MutationContext {
    #[must_use]
    pub fn new(op_name: &str) -> Self {
        Self {
            op_name: op_name.to_string(),
            ..Self::default()
        }
    }

    pub const fn record_write(&mut self) {
        self.writes += 1;
    }

    pub const fn record_writes(&mut self, count: usize) {
        self.writes += count;
    }

    pub const fn record_deletes(&mut self, count: usize) {
        self.deletes += count;
    }
}

impl SqliteStorage {
    /// Open a new connection to the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema application fails.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        apply_schema(&conn)?;
        tracing::debug!(path = %path.display(), "Opened database");
        Ok(Self { conn })
    }

    /// Open an in-memory database for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Borrow the underlying connection for reads.
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` inside one IMMEDIATE transaction.
    ///
    /// Commits when `f` succeeds. Any error drops the transaction, which
    /// rolls back every write `f` made.
    ///
    /// # Errors
    ///
    /// Returns the first error from `f` or from the commit.
    pub fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction, &mut MutationContext) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        let mut ctx = MutationContext::new(op);

        let result = f(&tx, &mut ctx)?;

        tx.commit()?;
        tracing::debug!(
            op = %ctx.op_name,
            writes = ctx.writes,
            deletes = ctx.deletes,
            "Committed mutation"
        );
        Ok(result)
    }

    /// The user's wallet-type list, or the defaults when none is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be read or holds invalid JSON.
    pub fn wallet_types(&self) -> Result<Vec<String>> {
        read_wallet_types(&self.conn)
    }

    /// Replace the stored wallet-type list.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn set_wallet_types(&mut self, types: &[String]) -> Result<()> {
        self.mutate("set_wallet_types", |tx, ctx| {
            write_wallet_types(tx, types)?;
            ctx.record_write();
            Ok(())
        })
    }
}

/// Read the wallet-type singleton on any connection or transaction.
pub(crate) fn read_wallet_types(conn: &Connection) -> Result<Vec<String>> {
    let data: Option<String> = conn
        .query_row(
            "SELECT data FROM wallet_types WHERE key = ?",
            [WALLET_TYPES_KEY],
            |row| row.get(0),
        )
        .optional()?;
    match data {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(DEFAULT_WALLET_TYPES.iter().map(ToString::to_string).collect()),
    }
}

/// Write the wallet-type singleton on any connection or transaction.
pub(crate) fn write_wallet_types(conn: &Connection, types: &[String]) -> Result<()> {
    let data = serde_json::to_string(types)?;
    conn.execute(
        "INSERT INTO wallet_types (key, data) VALUES (?, ?)
         ON CONFLICT(key) DO UPDATE SET data = excluded.data",
        [WALLET_TYPES_KEY, data.as_str()],
    )?;
    Ok(())
}

/// Remove the wallet-type singleton so reads fall back to the defaults.
pub(crate) fn clear_wallet_types(conn: &Connection) -> Result<usize> {
    Ok(conn.execute("DELETE FROM wallet_types", [])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeskError;
    use crate::model::Project;
    use crate::storage::store;

    #[test]
    fn wallet_types_default_until_set() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        assert_eq!(storage.wallet_types().unwrap(), vec!["EVM", "StarkNet"]);

        let types = vec!["EVM".to_string(), "Solana".to_string(), "Cosmos".to_string()];
        storage.set_wallet_types(&types).unwrap();
        assert_eq!(storage.wallet_types().unwrap(), types);
    }

    #[test]
    fn mutate_rolls_back_on_error() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let result: Result<()> = storage.mutate("failing", |tx, ctx| {
            store::put(tx, &mut Project::new("Half-written"))?;
            ctx.record_write();
            Err(DeskError::validation("name", "forced failure"))
        });
        assert!(result.is_err());
        assert_eq!(store::count::<Project>(storage.conn()).unwrap(), 0);
    }

    #[test]
    fn mutate_commits_on_success() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let id = storage
            .mutate("create", |tx, ctx| {
                let id = store::put(tx, &mut Project::new("Kept"))?;
                ctx.record_write();
                Ok(id)
            })
            .unwrap();
        assert!(store::exists::<Project>(storage.conn(), &id).unwrap());
    }

    #[test]
    fn open_on_disk_persists_between_handles() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("desk.db");
        {
            let mut storage = SqliteStorage::open(&path).unwrap();
            storage.set_wallet_types(&["Sui".to_string()]).unwrap();
        }
        let storage = SqliteStorage::open(&path).unwrap();
        assert_eq!(storage.wallet_types().unwrap(), vec!["Sui"]);
    }
}
