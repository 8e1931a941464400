//! Import of the earlier localStorage-era dump.
//!
//! That format stored four top-level keys: `wallets`, `walletTypes`,
//! `projects` (without ids) and `dailyTasks`. Wallets and projects are
//! merged into the database; daily marks go to the slot.

use crate::error::{DeskError, Result};
use crate::model::{DailyTask, Project, Wallet};
use crate::slot::{DailyTracker, LocalSlot};
use crate::storage::SqliteStorage;
use crate::storage::sqlite::write_wallet_types;
use crate::storage::store;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// The localStorage dump.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyDump {
    #[serde(default)]
    pub wallets: Vec<Wallet>,
    #[serde(default)]
    pub wallet_types: Option<Vec<String>>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub daily_tasks: Vec<DailyTask>,
}

/// What a legacy import changed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LegacyImportResult {
    pub wallets: usize,
    pub wallet_types: usize,
    pub projects_added: usize,
    /// Projects whose name already exists among live projects.
    pub projects_skipped: usize,
    pub daily_marks_added: usize,
}

/// Parse a legacy dump.
///
/// # Errors
///
/// Returns `InvalidSnapshot` if the text is not a legacy dump.
pub fn parse_legacy(text: &str) -> Result<LegacyDump> {
    serde_json::from_str(text)
        .map_err(|err| DeskError::invalid_snapshot(format!("not a legacy dump: {err}")))
}

/// Merge a legacy dump into the database and slot.
///
/// Wallets are upserted by address. Projects receive generated ids; a
/// project whose name matches a live project is skipped, so running the
/// import twice adds nothing. Database changes commit together before the
/// slot is touched.
///
/// # Errors
///
/// Returns an error if any write fails.
pub fn import_legacy(
    storage: &mut SqliteStorage,
    slot: &LocalSlot,
    dump: &LegacyDump,
) -> Result<LegacyImportResult> {
    let now = Utc::now();
    let mut result = storage.mutate("import_legacy", |tx, ctx| {
        let mut result = LegacyImportResult::default();

        for wallet in &dump.wallets {
            store::put(tx, &mut wallet.clone())?;
            result.wallets += 1;
        }
        if let Some(types) = dump.wallet_types.as_ref().filter(|t| !t.is_empty()) {
            write_wallet_types(tx, types)?;
            result.wallet_types = types.len();
        }

        let mut known: HashSet<String> = store::get_all::<Project>(tx, false)?
            .into_iter()
            .map(|project| project.name)
            .collect();
        for project in &dump.projects {
            if !known.insert(project.name.clone()) {
                result.projects_skipped += 1;
                continue;
            }
            let mut project = Project {
                id: String::new(),
                ..project.clone()
            };
            store::stamp(&mut project, now);
            store::put(tx, &mut project)?;
            result.projects_added += 1;
        }

        ctx.record_writes(result.wallets + result.projects_added);
        Ok(result)
    })?;

    result.daily_marks_added = DailyTracker::new(slot).merge(&dump.daily_tasks)?;

    tracing::info!(
        wallets = result.wallets,
        projects = result.projects_added,
        skipped = result.projects_skipped,
        daily_marks = result.daily_marks_added,
        "Imported legacy dump"
    );
    Ok(result)
}

/// Read and merge a legacy dump file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or the import fails.
pub fn import_legacy_file(
    storage: &mut SqliteStorage,
    slot: &LocalSlot,
    path: &Path,
) -> Result<LegacyImportResult> {
    let text = std::fs::read_to_string(path)?;
    let dump = parse_legacy(&text)?;
    import_legacy(storage, slot, &dump)
}
