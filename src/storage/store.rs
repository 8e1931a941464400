//! Generic object-store primitives.
//!
//! Each record type names its store and the policies that govern it through
//! a [`StoreDef`]. The functions here take a borrowed [`Connection`] so that
//! callers can run them on a plain connection or inside a [`rusqlite::Transaction`]
//! (which derefs to `Connection`) and compose several of them atomically.
//!
//! Row layout for every store:
//!
//! ```text
//! key TEXT PRIMARY KEY    -- natural or generated key
//! data TEXT NOT NULL      -- the record as JSON
//! is_deleted INTEGER      -- soft-delete stores only
//! <index column> TEXT     -- stores with a secondary index only
//! ```

use crate::error::{DeskError, Result};
use crate::util::generate_unique_id;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, ToSql};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// How a store's primary key is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPolicy {
    /// The caller supplies the key through the named record field.
    Natural { field: &'static str },
    /// An id is generated on first save when the record's key is empty.
    Generated,
}

/// What "delete" means for a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Set `isDeleted`; listings hide the record, key lookup still finds it.
    Soft,
    /// Remove the row.
    Hard,
}

/// Which timestamps a save maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampPolicy {
    None,
    /// `createdAt` is filled once, when absent.
    Created,
    /// `createdAt` once, `updatedAt` on every save.
    CreatedAndUpdated,
}

/// Static description of one object store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreDef {
    /// Table name.
    pub name: &'static str,
    pub key: KeyPolicy,
    pub delete: DeletePolicy,
    pub timestamps: TimestampPolicy,
    /// Column holding the secondary-index value, if any.
    pub index: Option<&'static str>,
}

impl StoreDef {
    #[must_use]
    pub const fn is_soft_delete(&self) -> bool {
        matches!(self.delete, DeletePolicy::Soft)
    }
}

/// A record type stored in one object store.
///
/// Accessors for optional concerns default to no-ops; a type only overrides
/// the ones its [`StoreDef`] policies need.
pub trait Record: Serialize + DeserializeOwned {
    const STORE: StoreDef;

    fn key(&self) -> &str;

    fn set_key(&mut self, _key: String) {}

    fn index_value(&self) -> Option<&str> {
        None
    }

    fn is_deleted(&self) -> bool {
        false
    }

    fn set_deleted(&mut self, _deleted: bool) {}

    fn created_at(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn set_created_at(&mut self, _at: DateTime<Utc>) {}

    fn set_updated_at(&mut self, _at: DateTime<Utc>) {}
}

/// Apply the store's timestamp policy for a write happening at `now`.
pub fn stamp<T: Record>(record: &mut T, now: DateTime<Utc>) {
    match T::STORE.timestamps {
        TimestampPolicy::None => {}
        TimestampPolicy::Created => {
            if record.created_at().is_none() {
                record.set_created_at(now);
            }
        }
        TimestampPolicy::CreatedAndUpdated => {
            if record.created_at().is_none() {
                record.set_created_at(now);
            }
            record.set_updated_at(now);
        }
    }
}

/// Check whether a key is present in the store.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn exists<T: Record>(conn: &Connection, key: &str) -> Result<bool> {
    let sql = format!("SELECT 1 FROM {} WHERE key = ?", T::STORE.name);
    let found = conn
        .query_row(&sql, [key], |_| Ok(()))
        .optional()?
        .is_some();
    Ok(found)
}

/// Read every record in storage order.
///
/// Soft-deleted records are included only when `include_deleted` is set.
///
/// # Errors
///
/// Returns an error if the query fails or a row holds invalid JSON.
pub fn get_all<T: Record>(conn: &Connection, include_deleted: bool) -> Result<Vec<T>> {
    let mut sql = format!("SELECT data FROM {}", T::STORE.name);
    if T::STORE.is_soft_delete() && !include_deleted {
        sql.push_str(" WHERE is_deleted = 0");
    }
    sql.push_str(" ORDER BY rowid");
    query_records(conn, &sql, &[])
}

/// Read one record by primary key, soft-deleted or not.
///
/// # Errors
///
/// Returns an error if the query fails or the row holds invalid JSON.
pub fn get<T: Record>(conn: &Connection, key: &str) -> Result<Option<T>> {
    let sql = format!("SELECT data FROM {} WHERE key = ?", T::STORE.name);
    let data: Option<String> = conn
        .query_row(&sql, [key], |row| row.get(0))
        .optional()?;
    data.map(|json| serde_json::from_str(&json).map_err(DeskError::from))
        .transpose()
}

/// Read every record whose secondary-index value equals `value`.
///
/// Returns an empty list when nothing matches.
///
/// # Errors
///
/// Returns `NoIndex` if the store declares no index, or a query error.
pub fn get_by_index<T: Record>(conn: &Connection, value: &str) -> Result<Vec<T>> {
    let column = T::STORE.index.ok_or(DeskError::NoIndex {
        store: T::STORE.name,
    })?;
    let sql = format!(
        "SELECT data FROM {} WHERE {column} = ? ORDER BY rowid",
        T::STORE.name
    );
    let params: [&dyn ToSql; 1] = [&value];
    query_records(conn, &sql, &params)
}

/// Write one record, overwriting any record with the same key.
///
/// An empty key on a generated-key store is replaced by a fresh id, and the
/// id is written back into `record`. An empty natural key is rejected.
/// Timestamps are left as they are; see [`stamp`].
///
/// # Errors
///
/// Returns a validation error for an empty natural key, or a database error.
pub fn put<T: Record>(conn: &Connection, record: &mut T) -> Result<String> {
    if record.key().trim().is_empty() {
        match T::STORE.key {
            KeyPolicy::Natural { field } => {
                return Err(DeskError::validation(field, "must not be empty"));
            }
            KeyPolicy::Generated => {
                let id = generate_unique_id(T::STORE.name, |candidate| {
                    exists::<T>(conn, candidate)
                })?;
                tracing::debug!(store = T::STORE.name, id = %id, "Generated id");
                record.set_key(id);
            }
        }
    }

    let key = record.key().to_string();
    let data = serde_json::to_string(&*record)?;

    let mut columns: Vec<&str> = vec!["key", "data"];
    let mut params: Vec<Box<dyn ToSql>> = vec![Box::new(key.clone()), Box::new(data)];

    if T::STORE.is_soft_delete() {
        columns.push("is_deleted");
        params.push(Box::new(record.is_deleted()));
    }
    if let Some(column) = T::STORE.index {
        columns.push(column);
        params.push(Box::new(record.index_value().unwrap_or_default().to_string()));
    }

    let placeholders = vec!["?"; columns.len()].join(", ");
    let updates = columns
        .iter()
        .skip(1)
        .map(|column| format!("{column} = excluded.{column}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({placeholders}) ON CONFLICT(key) DO UPDATE SET {updates}",
        T::STORE.name,
        columns.join(", ")
    );

    let params_refs: Vec<&dyn ToSql> = params.iter().map(AsRef::as_ref).collect();
    conn.execute(&sql, params_refs.as_slice())?;
    Ok(key)
}

/// Physically delete a record. Returns whether a row was removed.
///
/// # Errors
///
/// Returns an error if the statement fails.
pub fn delete<T: Record>(conn: &Connection, key: &str) -> Result<bool> {
    let sql = format!("DELETE FROM {} WHERE key = ?", T::STORE.name);
    let rows = conn.execute(&sql, [key])?;
    Ok(rows > 0)
}

/// Mark a record deleted and refresh its timestamps.
///
/// A missing key is a no-op and returns `None`.
///
/// # Errors
///
/// Returns an error if the read or write fails.
pub fn soft_delete<T: Record>(
    conn: &Connection,
    key: &str,
    now: DateTime<Utc>,
) -> Result<Option<T>> {
    let Some(mut record) = get::<T>(conn, key)? else {
        tracing::debug!(store = T::STORE.name, key, "Soft delete of missing record ignored");
        return Ok(None);
    };
    record.set_deleted(true);
    stamp(&mut record, now);
    put(conn, &mut record)?;
    Ok(Some(record))
}

/// Clear a record's deleted flag and refresh its timestamps.
///
/// Returns `None` for a missing key or a record that is not deleted; neither
/// is written.
///
/// # Errors
///
/// Returns an error if the read or write fails.
pub fn restore<T: Record>(conn: &Connection, key: &str, now: DateTime<Utc>) -> Result<Option<T>> {
    let Some(mut record) = get::<T>(conn, key)?.filter(T::is_deleted) else {
        tracing::debug!(store = T::STORE.name, key, "Nothing to restore");
        return Ok(None);
    };
    record.set_deleted(false);
    stamp(&mut record, now);
    put(conn, &mut record)?;
    Ok(Some(record))
}

/// Remove every row from the store. Returns the number removed.
///
/// # Errors
///
/// Returns an error if the statement fails.
pub fn clear<T: Record>(conn: &Connection) -> Result<usize> {
    let sql = format!("DELETE FROM {}", T::STORE.name);
    Ok(conn.execute(&sql, [])?)
}

/// Count rows, including soft-deleted ones.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count<T: Record>(conn: &Connection) -> Result<usize> {
    let sql = format!("SELECT count(*) FROM {}", T::STORE.name);
    let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(usize::try_from(count).unwrap_or(0))
}

fn query_records<T: Record>(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    rows.iter()
        .map(|json| serde_json::from_str(json).map_err(DeskError::from))
        .collect()
}
