//! JSON snapshot import/export for `dropdesk`.
//!
//! This module handles:
//! - Export: `SQLite` -> one JSON document (backup file)
//! - Import: JSON document -> `SQLite`, replacing the stored collections
//! - Path validation for snapshot files
//! - Import of the older localStorage dump format ([`legacy`])

pub mod legacy;
pub mod path;

pub use path::{
    PathValidation, export_file_name, require_valid_snapshot_path, resolve_export_path,
    validate_snapshot_path,
};

use crate::error::{DeskError, Result};
use crate::model::{Note, Project, SubTask, Tag, Task, Wallet};
use crate::storage::SqliteStorage;
use crate::storage::sqlite::{clear_wallet_types, read_wallet_types, write_wallet_types};
use crate::storage::store::{self, Record, TimestampPolicy};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Format tag written into every snapshot.
pub const SNAPSHOT_VERSION: &str = "1.0";

/// The whole user database as one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub wallets: Vec<Wallet>,
    #[serde(default)]
    pub wallet_types: Vec<String>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub sub_tasks: Vec<SubTask>,
    #[serde(default)]
    pub notes: Vec<Note>,
    /// Absent in documents written before tags existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    #[serde(deserialize_with = "scalar_string")]
    pub version: String,
    #[serde(deserialize_with = "scalar_string")]
    pub export_date: String,
}

/// Header fields written by older builds may be numbers or booleans.
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, found {other}"
        ))),
    }
}

impl Snapshot {
    #[must_use]
    pub fn counts(&self) -> SnapshotCounts {
        SnapshotCounts {
            wallets: self.wallets.len(),
            wallet_types: self.wallet_types.len(),
            projects: self.projects.len(),
            tasks: self.tasks.len(),
            sub_tasks: self.sub_tasks.len(),
            notes: self.notes.len(),
            tags: self.tags.as_ref().map_or(0, Vec::len),
        }
    }
}

/// Per-collection record counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotCounts {
    pub wallets: usize,
    pub wallet_types: usize,
    pub projects: usize,
    pub tasks: usize,
    pub sub_tasks: usize,
    pub notes: usize,
    pub tags: usize,
}

impl SnapshotCounts {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.wallets + self.projects + self.tasks + self.sub_tasks + self.notes + self.tags
    }
}

/// Result of an export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportResult {
    /// Output file path (None if written to a stream).
    pub output_path: Option<PathBuf>,
    pub counts: SnapshotCounts,
    /// SHA256 hash of the exported document.
    pub content_hash: String,
    pub export_date: String,
}

/// Result of an import.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportResult {
    pub imported: SnapshotCounts,
    /// Rows removed from the stores before re-insertion.
    pub cleared: usize,
    /// Whether the tag store was replaced (false for documents without tags).
    pub tags_replaced: bool,
}

/// Collect every live record into a snapshot.
///
/// Soft-deleted projects, tasks and notes are left out, and subtasks are
/// gathered only for tasks that are still live. Chains are not included.
///
/// # Errors
///
/// Returns an error if any store cannot be read.
pub fn build_snapshot(storage: &SqliteStorage, now: DateTime<Utc>) -> Result<Snapshot> {
    let tx = storage.conn().unchecked_transaction()?;

    let tasks: Vec<Task> = store::get_all(&tx, false)?;
    let mut sub_tasks = Vec::new();
    for task in &tasks {
        sub_tasks.extend(store::get_by_index::<SubTask>(&tx, &task.id)?);
    }

    let snapshot = Snapshot {
        wallets: store::get_all(&tx, false)?,
        wallet_types: read_wallet_types(&tx)?,
        projects: store::get_all(&tx, false)?,
        tasks,
        sub_tasks,
        notes: store::get_all(&tx, false)?,
        tags: Some(store::get_all(&tx, false)?),
        version: SNAPSHOT_VERSION.to_string(),
        export_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    tx.commit()?;
    Ok(snapshot)
}

/// Export a snapshot to a file or directory.
///
/// A directory target receives `crypto-portfolio-backup-YYYY-MM-DD.json`.
/// The document is written to a temp file first and renamed into place.
///
/// # Errors
///
/// Returns an error if the path is refused, or reading or writing fails.
pub fn export_to_file(storage: &SqliteStorage, target: &Path, now: DateTime<Utc>) -> Result<ExportResult> {
    let output_path = resolve_export_path(target, now.date_naive());
    require_valid_snapshot_path(&output_path)?;

    let snapshot = build_snapshot(storage, now)?;
    let json = serde_json::to_string_pretty(&snapshot)?;

    // Write to temp file for atomic rename
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let temp_path = output_path.with_extension("json.tmp");
    let mut temp_file = File::create(&temp_path)?;
    temp_file.write_all(json.as_bytes())?;
    temp_file.sync_all()?;
    drop(temp_file);

    // Atomic rename
    fs::rename(&temp_path, &output_path)?;

    tracing::info!(
        path = %output_path.display(),
        records = snapshot.counts().total(),
        "Exported snapshot"
    );

    Ok(ExportResult {
        output_path: Some(output_path),
        counts: snapshot.counts(),
        content_hash: content_hash(&json),
        export_date: snapshot.export_date,
    })
}

/// Export a snapshot to a writer (e.g., stdout).
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn export_to_writer<W: Write>(
    storage: &SqliteStorage,
    writer: &mut W,
    now: DateTime<Utc>,
) -> Result<ExportResult> {
    let snapshot = build_snapshot(storage, now)?;
    let json = serde_json::to_string_pretty(&snapshot)?;
    writeln!(writer, "{json}")?;
    Ok(ExportResult {
        output_path: None,
        counts: snapshot.counts(),
        content_hash: content_hash(&json),
        export_date: snapshot.export_date,
    })
}

/// Parse and check a snapshot document.
///
/// Only the header is checked: `version` and `exportDate` must be present
/// and non-empty. Record bodies are taken as they are.
///
/// # Errors
///
/// Returns `InvalidSnapshot` for malformed JSON, a missing header field, or
/// a collection that does not hold records.
pub fn parse_snapshot(text: &str) -> Result<Snapshot> {
    let value: Value = serde_json::from_str(text)
        .map_err(|err| DeskError::invalid_snapshot(format!("not valid JSON: {err}")))?;

    let Value::Object(fields) = &value else {
        return Err(DeskError::invalid_snapshot("document is not a JSON object"));
    };
    for field in ["version", "exportDate"] {
        if !is_present(fields.get(field)) {
            return Err(DeskError::invalid_snapshot(format!("missing {field}")));
        }
    }

    serde_json::from_value(value).map_err(|err| DeskError::invalid_snapshot(err.to_string()))
}

/// Replace the stored collections with the snapshot's contents.
///
/// Clearing and re-inserting happen in one transaction: on any failure the
/// database is left exactly as it was. Records are written as they appear
/// in the document, keeping ids and timestamps; only a missing id or
/// `createdAt` is filled in. The tag store is replaced only when the
/// document carries tags.
///
/// # Errors
///
/// Returns an error if any record cannot be written.
pub fn import_snapshot(storage: &mut SqliteStorage, snapshot: &Snapshot) -> Result<ImportResult> {
    let now = Utc::now();
    let result = storage.mutate("import_snapshot", |tx, ctx| {
        let mut cleared = 0;
        cleared += store::clear::<Wallet>(tx)?;
        cleared += clear_wallet_types(tx)?;
        cleared += store::clear::<Project>(tx)?;
        cleared += store::clear::<Task>(tx)?;
        cleared += store::clear::<SubTask>(tx)?;
        cleared += store::clear::<Note>(tx)?;
        if snapshot.tags.is_some() {
            cleared += store::clear::<Tag>(tx)?;
        }
        ctx.record_deletes(cleared);

        let mut imported = SnapshotCounts {
            wallets: replay(tx, &snapshot.wallets, now)?,
            projects: replay(tx, &snapshot.projects, now)?,
            tasks: replay(tx, &snapshot.tasks, now)?,
            sub_tasks: replay(tx, &snapshot.sub_tasks, now)?,
            notes: replay(tx, &snapshot.notes, now)?,
            tags: match &snapshot.tags {
                Some(tags) => replay(tx, tags, now)?,
                None => 0,
            },
            ..SnapshotCounts::default()
        };
        if !snapshot.wallet_types.is_empty() {
            write_wallet_types(tx, &snapshot.wallet_types)?;
            imported.wallet_types = snapshot.wallet_types.len();
        }
        ctx.record_writes(imported.total());

        Ok(ImportResult {
            imported,
            cleared,
            tags_replaced: snapshot.tags.is_some(),
        })
    })?;

    tracing::info!(
        records = result.imported.total(),
        cleared = result.cleared,
        "Imported snapshot"
    );
    Ok(result)
}

/// Read, check and import a snapshot file.
///
/// A file that fails to parse or lacks its header never touches the stores.
///
/// # Errors
///
/// Returns an error if the path is refused, the file cannot be read, the
/// document is invalid, or the import fails.
pub fn import_from_file(storage: &mut SqliteStorage, path: &Path) -> Result<ImportResult> {
    require_valid_snapshot_path(path)?;
    let text = fs::read_to_string(path)?;
    let snapshot = parse_snapshot(&text)?;
    tracing::debug!(
        path = %path.display(),
        version = %snapshot.version,
        export_date = %snapshot.export_date,
        "Parsed snapshot"
    );
    import_snapshot(storage, &snapshot)
}

/// SHA256 of a document, as lowercase hex.
#[must_use]
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Write every record and return how many distinct keys were written.
///
/// A key repeated in the document overwrites the earlier record and is
/// counted once.
fn replay<T: Record + Clone>(conn: &Connection, records: &[T], now: DateTime<Utc>) -> Result<usize> {
    let mut keys = HashSet::with_capacity(records.len());
    for record in records {
        let mut record = record.clone();
        if T::STORE.timestamps != TimestampPolicy::None && record.created_at().is_none() {
            record.set_created_at(now);
        }
        keys.insert(store::put(conn, &mut record)?);
    }
    Ok(keys.len())
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null | Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n.abs() > 0.0),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seeded() -> SqliteStorage {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage
            .wallets()
            .save(&mut Wallet {
                address: "0x1111111111111111111111111111111111111111".to_string(),
                wallet_type: "EVM".to_string(),
                ..Wallet::default()
            })
            .unwrap();
        let mut project = Project::new("Zora");
        storage.projects().save(&mut project).unwrap();
        let mut live = Task::new("Mint", &project.id);
        let mut dead = Task::new("Old", &project.id);
        storage.tasks().save(&mut live).unwrap();
        storage.tasks().save(&mut dead).unwrap();
        storage
            .sub_tasks()
            .save_for_task(&live.id, &mut [SubTask::new("", "bridge")])
            .unwrap();
        storage
            .sub_tasks()
            .save_for_task(&dead.id, &mut [SubTask::new("", "orphan")])
            .unwrap();
        storage.tasks().remove(&dead.id).unwrap();
        storage
            .notes()
            .save(&mut Note::new("gas", "wait for low gas"))
            .unwrap();
        storage
    }

    #[test]
    fn snapshot_skips_deleted_tasks_and_their_subtasks() {
        let storage = seeded();
        let snapshot = build_snapshot(&storage, Utc::now()).unwrap();
        assert_eq!(snapshot.tasks.len(), 1);
        assert_eq!(snapshot.sub_tasks.len(), 1);
        assert_eq!(snapshot.sub_tasks[0].name, "bridge");
        assert_eq!(snapshot.wallet_types, vec!["EVM", "StarkNet"]);
        assert_eq!(snapshot.version, "1.0");
        assert!(snapshot.export_date.ends_with('Z'));
    }

    #[test]
    fn parse_rejects_missing_header() {
        let err = parse_snapshot(r#"{"wallets":[],"version":"1.0"}"#).unwrap_err();
        assert!(err.to_string().contains("exportDate"));

        let err = parse_snapshot(r#"{"version":"","exportDate":"2024-06-01"}"#).unwrap_err();
        assert!(err.to_string().contains("version"));

        assert!(matches!(
            parse_snapshot("not json").unwrap_err(),
            DeskError::InvalidSnapshot { .. }
        ));
    }

    #[test]
    fn parse_accepts_numeric_header() {
        let snapshot =
            parse_snapshot(r#"{"version":1,"exportDate":"2024-06-01T00:00:00.000Z"}"#).unwrap();
        assert_eq!(snapshot.version, "1");

        // Falsy header values are still missing.
        assert!(parse_snapshot(r#"{"version":0,"exportDate":"2024-06-01"}"#).is_err());
        assert!(parse_snapshot(r#"{"version":false,"exportDate":"2024-06-01"}"#).is_err());
        assert!(parse_snapshot(r#"{"version":["1.0"],"exportDate":"2024-06-01"}"#).is_err());
    }

    #[test]
    fn repeated_ids_are_counted_once() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let snapshot = parse_snapshot(
            r#"{
                "projects": [
                    {"id": "dup000001", "name": "First"},
                    {"id": "dup000001", "name": "Second"},
                    {"id": "other0001", "name": "Other"}
                ],
                "version": "1.0",
                "exportDate": "2024-06-01T00:00:00.000Z"
            }"#,
        )
        .unwrap();

        let result = import_snapshot(&mut storage, &snapshot).unwrap();
        assert_eq!(result.imported.projects, 2);
        assert_eq!(storage.projects().count().unwrap(), 2);
        assert_eq!(storage.projects().require("dup000001").unwrap().name, "Second");
    }

    #[test]
    fn parse_accepts_minimal_document() {
        let snapshot =
            parse_snapshot(r#"{"version":"1.0","exportDate":"2024-06-01T00:00:00.000Z"}"#).unwrap();
        assert!(snapshot.wallets.is_empty());
        assert!(snapshot.tags.is_none());
    }

    #[test]
    fn import_replaces_and_preserves_ids() {
        let source = seeded();
        let snapshot = build_snapshot(&source, Utc::now()).unwrap();

        let mut target = SqliteStorage::open_memory().unwrap();
        target
            .projects()
            .save(&mut Project::new("Will be cleared"))
            .unwrap();
        let result = import_snapshot(&mut target, &snapshot).unwrap();
        assert_eq!(result.imported.projects, 1);
        assert!(result.tags_replaced);

        let projects = target.projects().list().unwrap();
        assert_eq!(projects, snapshot.projects);
        assert_eq!(target.tasks().list().unwrap(), snapshot.tasks);
    }

    #[test]
    fn failed_import_leaves_store_untouched() {
        let mut storage = seeded();
        let before = storage.projects().list().unwrap();

        let snapshot = Snapshot {
            wallets: vec![Wallet::default()],
            wallet_types: Vec::new(),
            projects: Vec::new(),
            tasks: Vec::new(),
            sub_tasks: Vec::new(),
            notes: Vec::new(),
            tags: None,
            version: SNAPSHOT_VERSION.to_string(),
            export_date: "2024-06-01T00:00:00.000Z".to_string(),
        };
        assert!(import_snapshot(&mut storage, &snapshot).is_err());
        assert_eq!(storage.projects().list().unwrap(), before);
        assert_eq!(storage.wallets().count().unwrap(), 1);
    }

    #[test]
    fn export_writes_dated_file_into_directory() {
        let storage = seeded();
        let temp = TempDir::new().unwrap();
        let now = Utc::now();
        let result = export_to_file(&storage, temp.path(), now).unwrap();

        let path = result.output_path.unwrap();
        assert_eq!(path, temp.path().join(export_file_name(now.date_naive())));
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(content_hash(&text), result.content_hash);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn import_from_file_refuses_wrong_extension() {
        let mut storage = seeded();
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("backup.txt");
        fs::write(&path, "{}").unwrap();
        assert!(import_from_file(&mut storage, &path).is_err());
        assert_eq!(storage.projects().list().unwrap().len(), 1);
    }
}
