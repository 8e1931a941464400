//! Typed repositories over the object stores.
//!
//! A [`Repository`] borrows the storage handle mutably for as long as it
//! lives, so reads and writes through it never interleave with another
//! writer on the same handle.

use crate::error::{DeskError, Result};
use crate::model::{Chain, Note, Project, SubTask, Tag, Task, Wallet};
use crate::storage::SqliteStorage;
use crate::storage::store::{self, DeletePolicy, Record};
use chrono::Utc;
use std::marker::PhantomData;

/// Typed access to one object store.
pub struct Repository<'a, T: Record> {
    storage: &'a mut SqliteStorage,
    _record: PhantomData<T>,
}

impl SqliteStorage {
    pub fn repo<T: Record>(&mut self) -> Repository<'_, T> {
        Repository {
            storage: self,
            _record: PhantomData,
        }
    }

    pub fn wallets(&mut self) -> Repository<'_, Wallet> {
        self.repo()
    }

    pub fn projects(&mut self) -> Repository<'_, Project> {
        self.repo()
    }

    pub fn tasks(&mut self) -> Repository<'_, Task> {
        self.repo()
    }

    pub fn sub_tasks(&mut self) -> Repository<'_, SubTask> {
        self.repo()
    }

    pub fn notes(&mut self) -> Repository<'_, Note> {
        self.repo()
    }

    pub fn chains(&mut self) -> Repository<'_, Chain> {
        self.repo()
    }

    pub fn tags(&mut self) -> Repository<'_, Tag> {
        self.repo()
    }
}

impl<T: Record> Repository<'_, T> {
    /// All live records in storage order. Soft-deleted records are hidden.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn list(&self) -> Result<Vec<T>> {
        store::get_all(self.storage.conn(), false)
    }

    /// All records, soft-deleted ones included.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn list_including_deleted(&self) -> Result<Vec<T>> {
        store::get_all(self.storage.conn(), true)
    }

    /// Look up one record by key. Soft-deleted records are still returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn get(&self, key: &str) -> Result<Option<T>> {
        store::get(self.storage.conn(), key)
    }

    /// Like [`get`](Self::get), but a missing key is a `NotFound` error.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no record has this key.
    pub fn require(&self, key: &str) -> Result<T> {
        self.get(key)?.ok_or_else(|| DeskError::NotFound {
            store: T::STORE.name,
            key: key.to_string(),
        })
    }

    /// Stamp and write one record, returning its key.
    ///
    /// A generated-key record saved with an empty key receives a fresh id,
    /// written back into `record`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the write fails.
    pub fn save(&mut self, record: &mut T) -> Result<String> {
        let op = format!("save_{}", T::STORE.name);
        self.storage.mutate(&op, |tx, ctx| {
            store::stamp(record, Utc::now());
            let key = store::put(tx, record)?;
            ctx.record_write();
            Ok(key)
        })
    }

    /// Stamp and write several records in one transaction.
    ///
    /// # Errors
    ///
    /// Returns the first failing write; nothing is persisted in that case.
    pub fn save_all(&mut self, records: &mut [T]) -> Result<Vec<String>> {
        let op = format!("save_all_{}", T::STORE.name);
        self.storage.mutate(&op, |tx, ctx| {
            let now = Utc::now();
            let mut keys = Vec::with_capacity(records.len());
            for record in records.iter_mut() {
                store::stamp(record, now);
                keys.push(store::put(tx, record)?);
                ctx.record_write();
            }
            Ok(keys)
        })
    }

    /// Delete a record according to the store's delete policy.
    ///
    /// Soft stores flag the record and refresh `updatedAt`; hard stores drop
    /// the row. Returns whether a record was affected. A missing key is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn remove(&mut self, key: &str) -> Result<bool> {
        let op = format!("remove_{}", T::STORE.name);
        self.storage.mutate(&op, |tx, ctx| {
            let removed = match T::STORE.delete {
                DeletePolicy::Soft => store::soft_delete::<T>(tx, key, Utc::now())?.is_some(),
                DeletePolicy::Hard => store::delete::<T>(tx, key)?,
            };
            if removed {
                ctx.record_deletes(1);
            }
            Ok(removed)
        })
    }

    /// Undo a soft delete.
    ///
    /// Returns whether a deleted record was brought back. A missing key, a
    /// live record and any hard-delete store all yield `false`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn restore(&mut self, key: &str) -> Result<bool> {
        if T::STORE.delete != DeletePolicy::Soft {
            return Ok(false);
        }
        let op = format!("restore_{}", T::STORE.name);
        self.storage.mutate(&op, |tx, ctx| {
            let restored = store::restore::<T>(tx, key, Utc::now())?.is_some();
            if restored {
                ctx.record_write();
            }
            Ok(restored)
        })
    }

    /// Number of rows, soft-deleted included.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn count(&self) -> Result<usize> {
        store::count::<T>(self.storage.conn())
    }
}

impl Repository<'_, SubTask> {
    /// Subtasks belonging to `task_id`, in storage order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn for_task(&self, task_id: &str) -> Result<Vec<SubTask>> {
        store::get_by_index(self.storage.conn(), task_id)
    }

    /// Attach every subtask to `task_id` and save them together.
    ///
    /// # Errors
    ///
    /// Returns the first failing write; nothing is persisted in that case.
    pub fn save_for_task(&mut self, task_id: &str, sub_tasks: &mut [SubTask]) -> Result<Vec<String>> {
        for sub_task in sub_tasks.iter_mut() {
            sub_task.task_id = task_id.to_string();
        }
        self.save_all(sub_tasks)
    }

    /// Delete every subtask of `task_id`. All or none are removed.
    ///
    /// # Errors
    ///
    /// Returns an error if any delete fails.
    pub fn delete_for_task(&mut self, task_id: &str) -> Result<usize> {
        self.storage.mutate("delete_sub_tasks_for_task", |tx, ctx| {
            let sub_tasks: Vec<SubTask> = store::get_by_index(tx, task_id)?;
            let mut removed = 0;
            for sub_task in &sub_tasks {
                if store::delete::<SubTask>(tx, &sub_task.id)? {
                    removed += 1;
                }
            }
            ctx.record_deletes(removed);
            Ok(removed)
        })
    }
}

impl Repository<'_, Chain> {
    /// Save freshly fetched chain data, stamping `lastUpdated` on each.
    ///
    /// # Errors
    ///
    /// Returns the first failing write; nothing is persisted in that case.
    pub fn save_fetched(&mut self, chains: &mut [Chain]) -> Result<Vec<String>> {
        let now = Utc::now();
        for chain in chains.iter_mut() {
            chain.last_updated = Some(now);
        }
        self.save_all(chains)
    }
}
