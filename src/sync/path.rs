//! Path validation for snapshot files.
//!
//! Snapshots may live anywhere the user points at, with two exceptions:
//!
//! | Rule | Reason |
//! |------|--------|
//! | No `.git` path component | never write into repository internals |
//! | `.json` (or `.json.tmp`) extension | only snapshot documents are read or written |
//!
//! A directory target resolves to a dated file name inside it; see
//! [`resolve_export_path`].

use crate::error::{DeskError, Result};
use chrono::NaiveDate;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Extensions accepted for snapshot I/O.
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "json",     // Snapshot document
    "json.tmp", // Atomic write temp file
];

/// File-name prefix used for exports into a directory.
pub const EXPORT_FILE_PREFIX: &str = "crypto-portfolio-backup-";

/// Result of path validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathValidation {
    /// Path is allowed for snapshot I/O.
    Allowed,
    /// Path has a disallowed extension.
    DisallowedExtension { path: PathBuf, extension: String },
    /// Path targets git internals (.git directory).
    GitPathAttempt { path: PathBuf },
}

impl PathValidation {
    /// Returns true if the path is allowed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Returns the rejection reason as a human-readable string.
    #[must_use]
    pub fn rejection_reason(&self) -> Option<String> {
        match self {
            Self::Allowed => None,
            Self::DisallowedExtension { path, extension } => Some(format!(
                "Path '{}' has disallowed extension '{}' (allowed: {:?})",
                path.display(),
                extension,
                ALLOWED_EXTENSIONS
            )),
            Self::GitPathAttempt { path } => Some(format!(
                "Path '{}' is inside a .git directory",
                path.display()
            )),
        }
    }
}

/// Validates that a path may be used as a snapshot file.
#[must_use]
pub fn validate_snapshot_path(path: &Path) -> PathValidation {
    debug!(path = %path.display(), "Validating snapshot path");

    let result = if is_git_path(path) {
        PathValidation::GitPathAttempt {
            path: path.to_path_buf(),
        }
    } else {
        validate_extension(path)
    };

    if let Some(reason) = result.rejection_reason() {
        warn!(path = %path.display(), reason = %reason, "Path validation rejected");
    }
    result
}

/// Validates a path and returns an error if it's not allowed.
///
/// # Errors
///
/// Returns `DeskError::Config` with a descriptive message if the path is not allowed.
pub fn require_valid_snapshot_path(path: &Path) -> Result<()> {
    let validation = validate_snapshot_path(path);
    match validation {
        PathValidation::Allowed => Ok(()),
        _ => Err(DeskError::Config(
            validation
                .rejection_reason()
                .unwrap_or_else(|| "Path validation failed".to_string()),
        )),
    }
}

/// Dated snapshot file name, e.g. `crypto-portfolio-backup-2024-06-01.json`.
#[must_use]
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{EXPORT_FILE_PREFIX}{}.json", date.format("%Y-%m-%d"))
}

/// Turn an export target into a concrete file path.
///
/// An existing directory, or a path without an extension, gets the dated
/// file name appended. Anything else is taken as the file itself.
#[must_use]
pub fn resolve_export_path(target: &Path, date: NaiveDate) -> PathBuf {
    if target.is_dir() || target.extension().is_none() {
        target.join(export_file_name(date))
    } else {
        target.to_path_buf()
    }
}

fn is_git_path(path: &Path) -> bool {
    path.components()
        .any(|component| matches!(component, Component::Normal(name) if name == ".git"))
}

fn validate_extension(path: &Path) -> PathValidation {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    // Handle compound extensions like .json.tmp
    for allowed_ext in ALLOWED_EXTENSIONS {
        if file_name.ends_with(&format!(".{allowed_ext}")) {
            return PathValidation::Allowed;
        }
    }

    let extension = path
        .extension()
        .map_or_else(|| "none".to_string(), |e| e.to_string_lossy().to_string());

    PathValidation::DisallowedExtension {
        path: path.to_path_buf(),
        extension,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_allowed_json_file() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join("backup.json");
        assert!(validate_snapshot_path(&path).is_allowed());
    }

    #[test]
    fn test_allowed_temp_file() {
        let path = PathBuf::from("/tmp/backup.json.tmp");
        assert!(validate_snapshot_path(&path).is_allowed());
    }

    #[test]
    fn test_rejected_git_path() {
        let path = PathBuf::from("project/.git/backup.json");
        let result = validate_snapshot_path(&path);
        assert!(matches!(result, PathValidation::GitPathAttempt { .. }));
        assert!(result.rejection_reason().unwrap().contains(".git"));
    }

    #[test]
    fn test_github_dir_is_not_git_dir() {
        let path = PathBuf::from("project/.github/backup.json");
        assert!(validate_snapshot_path(&path).is_allowed());
    }

    #[test]
    fn test_rejected_disallowed_extension() {
        let path = PathBuf::from("backup.yaml");
        assert!(matches!(
            validate_snapshot_path(&path),
            PathValidation::DisallowedExtension { .. }
        ));
        assert!(require_valid_snapshot_path(&path).is_err());
    }

    #[test]
    fn test_resolve_directory_target() {
        let temp = TempDir::new().expect("create temp dir");
        let resolved = resolve_export_path(temp.path(), date());
        assert_eq!(
            resolved,
            temp.path().join("crypto-portfolio-backup-2024-06-01.json")
        );
    }

    #[test]
    fn test_resolve_file_target() {
        let target = PathBuf::from("/tmp/mine.json");
        assert_eq!(resolve_export_path(&target, date()), target);
    }
}
