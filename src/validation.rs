//! Input checks run before anything reaches storage.
//!
//! Storage itself accepts any record shape; these rules belong to the
//! command layer.

use crate::error::{DeskError, Result};
use crate::model::{Note, Project, Tag, Task, Wallet};
use once_cell::sync::Lazy;
use regex::Regex;

static EVM_ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("valid EVM address regex"));

/// Wallet type whose addresses are checked for the 0x-hex form.
pub const EVM_WALLET_TYPE: &str = "EVM";

/// Address must be present, free of whitespace, and well-formed for EVM.
pub fn validate_wallet(wallet: &Wallet) -> Result<()> {
    let address = wallet.address.as_str();
    if address.trim().is_empty() {
        return Err(DeskError::validation("address", "wallet address cannot be empty"));
    }
    if address.chars().any(char::is_whitespace) {
        return Err(DeskError::validation(
            "address",
            format!("Invalid address '{address}': whitespace not allowed"),
        ));
    }
    if wallet.wallet_type.trim().is_empty() {
        return Err(DeskError::validation("type", "wallet type cannot be empty"));
    }
    if wallet.wallet_type == EVM_WALLET_TYPE && !EVM_ADDRESS_RE.is_match(address) {
        return Err(DeskError::validation(
            "address",
            format!("Invalid EVM address '{address}': expected 0x followed by 40 hex digits"),
        ));
    }
    Ok(())
}

pub fn validate_project(project: &Project) -> Result<()> {
    require_text("name", &project.name, "project name cannot be empty")
}

pub fn validate_task(task: &Task) -> Result<()> {
    require_text("name", &task.name, "task name cannot be empty")?;
    require_text("projectId", &task.project_id, "task must belong to a project")?;
    validate_priority(task.priority)
}

pub fn validate_note(note: &Note) -> Result<()> {
    require_text("title", &note.title, "note title cannot be empty")?;
    validate_priority(note.priority)
}

pub fn validate_tag(tag: &Tag) -> Result<()> {
    require_text("name", &tag.name, "tag name cannot be empty")
}

/// Priorities run from 1 (most urgent) to 5.
pub fn validate_priority(priority: u8) -> Result<()> {
    if (1..=5).contains(&priority) {
        Ok(())
    } else {
        Err(DeskError::validation(
            "priority",
            format!("Priority must be between 1 and 5, got {priority}"),
        ))
    }
}

fn require_text(field: &str, value: &str, reason: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(DeskError::validation(field, reason))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet(address: &str, wallet_type: &str) -> Wallet {
        Wallet {
            address: address.to_string(),
            wallet_type: wallet_type.to_string(),
            ..Wallet::default()
        }
    }

    #[test]
    fn evm_addresses_are_checked() {
        assert!(validate_wallet(&wallet("0x52908400098527886E0F7030069857D2E4169EE7", "EVM")).is_ok());
        assert!(validate_wallet(&wallet("0x1234", "EVM")).is_err());
        assert!(validate_wallet(&wallet("52908400098527886E0F7030069857D2E4169EE7aa", "EVM")).is_err());
    }

    #[test]
    fn other_types_only_need_an_address() {
        let starknet = "0x04a3b2c1d0e9f8a7b6c5d4e3f2a1b0c9d8e7f6a5b4c3d2e1f0a9b8c7d6e5f4a3";
        assert!(validate_wallet(&wallet(starknet, "StarkNet")).is_ok());
        assert!(validate_wallet(&wallet("  ", "StarkNet")).is_err());
        assert!(validate_wallet(&wallet("abc def", "StarkNet")).is_err());
    }

    #[test]
    fn task_needs_project_and_valid_priority() {
        let mut task = Task::new("Swap", "");
        assert!(validate_task(&task).is_err());
        task.project_id = "p1".to_string();
        assert!(validate_task(&task).is_ok());
        task.priority = 0;
        let err = validate_task(&task).unwrap_err();
        assert!(err.to_string().contains("priority"));
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(validate_project(&Project::new("   ")).is_err());
        assert!(validate_note(&Note::new("", "body")).is_err());
        assert!(validate_tag(&Tag::default()).is_err());
    }
}
