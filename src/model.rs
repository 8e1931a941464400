//! Record types persisted by `dropdesk`.
//!
//! Field names serialize in camelCase so the snapshot document stays
//! readable by older exports of the dashboard. Every non-key field carries a
//! serde default: snapshot import validates only the document header, so
//! partially-populated records must still load.

use crate::storage::store::{DeletePolicy, KeyPolicy, Record, StoreDef, TimestampPolicy};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Wallet types offered before the user stores a list of their own.
pub const DEFAULT_WALLET_TYPES: [&str; 2] = ["EVM", "StarkNet"];

/// Default priority for tasks (lowest urgency).
pub const DEFAULT_TASK_PRIORITY: u8 = 5;

/// Default priority for notes.
pub const DEFAULT_NOTE_PRIORITY: u8 = 3;

const fn default_task_priority() -> u8 {
    DEFAULT_TASK_PRIORITY
}

const fn default_note_priority() -> u8 {
    DEFAULT_NOTE_PRIORITY
}

/// A tracked wallet, keyed by its address.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub address: String,
    #[serde(rename = "type", default)]
    pub wallet_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Wallet {
    /// Alias if set, otherwise the address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.alias
            .as_deref()
            .filter(|alias| !alias.trim().is_empty())
            .unwrap_or(&self.address)
    }
}

/// An airdrop project.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub website: String,
    pub discord: String,
    pub telegram: String,
    pub twitter: String,
    pub is_mandatory: bool,
    pub tags: Vec<String>,
    pub stage: String,
    pub airdrop_stage: String,
    pub estimated_price: String,
    pub end_date: String,
    pub related_wallets: Vec<String>,
    pub is_deleted: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A task belonging to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub guide_link: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_daily: bool,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// 1 (most urgent) to 5.
    #[serde(default = "default_task_priority")]
    pub priority: u8,
    #[serde(default)]
    pub priority_note: String,
}

impl Default for Task {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            project_id: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            guide_link: String::new(),
            description: String::new(),
            is_daily: false,
            is_deleted: false,
            created_at: None,
            updated_at: None,
            priority: DEFAULT_TASK_PRIORITY,
            priority_note: String::new(),
        }
    }
}

impl Task {
    #[must_use]
    pub fn new(name: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project_id: project_id.into(),
            ..Self::default()
        }
    }
}

/// A checklist step under a task. Hard-deleted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SubTask {
    pub id: String,
    pub task_id: String,
    pub name: String,
    pub description: String,
    pub guide_link: String,
}

impl SubTask {
    #[must_use]
    pub fn new(task_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A free-form note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// 1 (most important) to 5.
    #[serde(default = "default_note_priority")]
    pub priority: u8,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_deleted: bool,
}

impl Default for Note {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            content: String::new(),
            priority: DEFAULT_NOTE_PRIORITY,
            tags: Vec::new(),
            created_at: None,
            updated_at: None,
            is_deleted: false,
        }
    }
}

impl Note {
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }
}

/// Reference data describing a chain, refreshed from an external service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Chain {
    pub chain_index: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// A user-defined label with a display color.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Wallets that finished a project's daily routine on a given day.
///
/// Lives in the local slot, not the main database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyTask {
    pub date: String,
    pub project: String,
    #[serde(default)]
    pub completed_wallets: Vec<String>,
}

impl Record for Wallet {
    const STORE: StoreDef = StoreDef {
        name: "wallets",
        key: KeyPolicy::Natural { field: "address" },
        delete: DeletePolicy::Hard,
        timestamps: TimestampPolicy::None,
        index: None,
    };

    fn key(&self) -> &str {
        &self.address
    }
}

impl Record for Project {
    const STORE: StoreDef = StoreDef {
        name: "projects",
        key: KeyPolicy::Generated,
        delete: DeletePolicy::Soft,
        timestamps: TimestampPolicy::CreatedAndUpdated,
        index: None,
    };

    fn key(&self) -> &str {
        &self.id
    }

    fn set_key(&mut self, key: String) {
        self.id = key;
    }

    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = deleted;
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = Some(at);
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }
}

impl Record for Task {
    const STORE: StoreDef = StoreDef {
        name: "tasks",
        key: KeyPolicy::Generated,
        delete: DeletePolicy::Soft,
        timestamps: TimestampPolicy::CreatedAndUpdated,
        index: None,
    };

    fn key(&self) -> &str {
        &self.id
    }

    fn set_key(&mut self, key: String) {
        self.id = key;
    }

    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = deleted;
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = Some(at);
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }
}

impl Record for SubTask {
    const STORE: StoreDef = StoreDef {
        name: "sub_tasks",
        key: KeyPolicy::Generated,
        delete: DeletePolicy::Hard,
        timestamps: TimestampPolicy::None,
        index: Some("task_id"),
    };

    fn key(&self) -> &str {
        &self.id
    }

    fn set_key(&mut self, key: String) {
        self.id = key;
    }

    fn index_value(&self) -> Option<&str> {
        Some(&self.task_id)
    }
}

impl Record for Note {
    const STORE: StoreDef = StoreDef {
        name: "notes",
        key: KeyPolicy::Generated,
        delete: DeletePolicy::Soft,
        timestamps: TimestampPolicy::CreatedAndUpdated,
        index: None,
    };

    fn key(&self) -> &str {
        &self.id
    }

    fn set_key(&mut self, key: String) {
        self.id = key;
    }

    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = deleted;
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = Some(at);
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }
}

impl Record for Chain {
    const STORE: StoreDef = StoreDef {
        name: "chains",
        key: KeyPolicy::Natural {
            field: "chainIndex",
        },
        delete: DeletePolicy::Hard,
        timestamps: TimestampPolicy::None,
        index: None,
    };

    fn key(&self) -> &str {
        &self.chain_index
    }
}

impl Record for Tag {
    const STORE: StoreDef = StoreDef {
        name: "tags",
        key: KeyPolicy::Generated,
        delete: DeletePolicy::Hard,
        timestamps: TimestampPolicy::Created,
        index: None,
    };

    fn key(&self) -> &str {
        &self.id
    }

    fn set_key(&mut self, key: String) {
        self.id = key;
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_priority_defaults_to_five_when_absent() {
        let task: Task = serde_json::from_str(r#"{"id":"t1","name":"Bridge"}"#).unwrap();
        assert_eq!(task.priority, 5);
        assert!(!task.is_deleted);
    }

    #[test]
    fn wallet_type_keeps_json_name() {
        let wallet = Wallet {
            address: "0xabc".to_string(),
            wallet_type: "EVM".to_string(),
            ..Wallet::default()
        };
        let json = serde_json::to_value(&wallet).unwrap();
        assert_eq!(json["type"], "EVM");
        assert!(json.get("alias").is_none());
    }

    #[test]
    fn project_fields_serialize_camel_case() {
        let mut project = Project::new("Test");
        project.related_wallets = vec!["0xabc".to_string()];
        project.is_mandatory = true;
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["relatedWallets"][0], "0xabc");
        assert_eq!(json["isMandatory"], true);
        assert_eq!(json["isDeleted"], false);
    }

    #[test]
    fn display_name_prefers_non_blank_alias() {
        let mut wallet = Wallet {
            address: "0xabc".to_string(),
            ..Wallet::default()
        };
        assert_eq!(wallet.display_name(), "0xabc");
        wallet.alias = Some("  ".to_string());
        assert_eq!(wallet.display_name(), "0xabc");
        wallet.alias = Some("main".to_string());
        assert_eq!(wallet.display_name(), "main");
    }
}
