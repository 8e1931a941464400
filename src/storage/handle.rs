//! Shared, lazily-opened database handle.

use crate::error::{DeskError, Result};
use crate::storage::SqliteStorage;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    File(PathBuf),
    Memory,
}

/// One database per process, opened on first use.
///
/// Every caller of [`storage`](Self::storage) gets the same connection, no
/// matter how many threads race to open it first.
#[derive(Debug)]
pub struct Database {
    location: Location,
    cell: OnceCell<Mutex<SqliteStorage>>,
}

impl Database {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(path.into()),
            cell: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            location: Location::Memory,
            cell: OnceCell::new(),
        }
    }

    #[must_use]
    pub const fn location(&self) -> &Location {
        &self.location
    }

    /// The on-disk path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::File(path) => Some(path),
            Location::Memory => None,
        }
    }

    /// True once the underlying connection has been opened.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Lock the shared storage, opening it first if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if opening fails, or `Poisoned` if a previous holder
    /// panicked.
    pub fn storage(&self) -> Result<MutexGuard<'_, SqliteStorage>> {
        let cell = self.cell.get_or_try_init(|| {
            let storage = match &self.location {
                Location::File(path) => SqliteStorage::open(path)?,
                Location::Memory => SqliteStorage::open_memory()?,
            };
            Ok::<_, DeskError>(Mutex::new(storage))
        })?;
        cell.lock().map_err(|_| DeskError::Poisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Project;

    #[test]
    fn opens_lazily() {
        let db = Database::in_memory();
        assert!(!db.is_open());
        drop(db.storage().unwrap());
        assert!(db.is_open());
    }

    #[test]
    fn every_caller_sees_the_same_connection() {
        let db = Database::in_memory();
        let id = db
            .storage()
            .unwrap()
            .projects()
            .save(&mut Project::new("Shared"))
            .unwrap();
        let found = db.storage().unwrap().projects().get(&id).unwrap();
        assert!(found.is_some());
    }

    #[test]
    fn failed_open_can_be_retried() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = Database::new(dir.path().join("missing").join("desk.db"));
        assert!(db.storage().is_err());
        assert!(!db.is_open());

        std::fs::create_dir_all(dir.path().join("missing")).unwrap();
        assert!(db.storage().is_ok());
    }
}
