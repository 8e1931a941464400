//! Configuration management for `dropdesk`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`DROPDESK_*`)
//! 3. Project config (.dropdesk/config.yaml)
//! 4. User config (~/.config/dropdesk/config.yaml)
//! 5. Defaults

use crate::error::{DeskError, Result};
use crate::slot::LocalSlot;
use crate::storage::Database;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the data directory looked for in the working tree.
pub const DATA_DIR_NAME: &str = ".dropdesk";
/// Default database filename used when metadata is missing.
const DEFAULT_DB_FILENAME: &str = "dropdesk.db";
/// Default slot filename used when metadata is missing.
const DEFAULT_SLOT_FILENAME: &str = "slot.json";
/// Seconds a cached balance stays fresh unless configured otherwise.
pub const DEFAULT_BALANCE_CACHE_TTL_SECS: i64 = 60;

/// Startup metadata describing the database and slot paths.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Metadata {
    pub database: String,
    #[serde(default)]
    pub slot: String,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            database: DEFAULT_DB_FILENAME.to_string(),
            slot: DEFAULT_SLOT_FILENAME.to_string(),
        }
    }
}

impl Metadata {
    /// Load metadata.json from the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join("metadata.json");
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path)?;
        let mut metadata: Self = serde_json::from_str(&contents)?;

        if metadata.database.trim().is_empty() {
            metadata.database = DEFAULT_DB_FILENAME.to_string();
        }
        if metadata.slot.trim().is_empty() {
            metadata.slot = DEFAULT_SLOT_FILENAME.to_string();
        }

        Ok(metadata)
    }
}

/// Resolved paths for this data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub slot_path: PathBuf,
    pub metadata: Metadata,
}

impl ConfigPaths {
    /// Resolve database + slot paths using metadata and an optional override.
    ///
    /// # Errors
    ///
    /// Returns an error if metadata cannot be read.
    pub fn resolve(data_dir: &Path, db_override: Option<&PathBuf>) -> Result<Self> {
        let metadata = Metadata::load(data_dir)?;
        let db_path = match db_override {
            Some(path) => path.clone(),
            None => relative_to(data_dir, &metadata.database),
        };
        let slot_path = relative_to(data_dir, &metadata.slot);

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            db_path,
            slot_path,
            metadata,
        })
    }
}

/// Discover the active `.dropdesk` directory.
///
/// Honors `DROPDESK_DIR` when set, otherwise walks up from `start` (or CWD).
///
/// # Errors
///
/// Returns `NotInitialized` if no data directory is found, or an error if
/// the CWD cannot be read.
pub fn discover_data_dir(start: Option<&Path>) -> Result<PathBuf> {
    discover_data_dir_with_env(start, None)
}

fn discover_data_dir_with_env(start: Option<&Path>, env_override: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = env_override {
        if path.is_dir() {
            return Ok(path.to_path_buf());
        }
    } else if let Ok(value) = env::var("DROPDESK_DIR") {
        if !value.trim().is_empty() {
            let path = PathBuf::from(value);
            if path.is_dir() {
                return Ok(path);
            }
        }
    }

    let mut current = match start {
        Some(path) => path.to_path_buf(),
        None => env::current_dir()?,
    };

    loop {
        let candidate = current.join(DATA_DIR_NAME);
        if candidate.is_dir() {
            return Ok(candidate);
        }

        if !current.pop() {
            break;
        }
    }

    Err(DeskError::NotInitialized)
}

/// Create a data directory under `root` with default metadata and config.
///
/// # Errors
///
/// Returns `AlreadyInitialized` if `root` already holds one (unless `force`),
/// or an I/O error.
pub fn init_data_dir(root: &Path, force: bool) -> Result<ConfigPaths> {
    let data_dir = root.join(DATA_DIR_NAME);
    let metadata_path = data_dir.join("metadata.json");
    if metadata_path.exists() && !force {
        return Err(DeskError::AlreadyInitialized { path: data_dir });
    }

    fs::create_dir_all(&data_dir)?;
    fs::write(
        &metadata_path,
        serde_json::to_string_pretty(&Metadata::default())?,
    )?;

    let config_path = data_dir.join("config.yaml");
    if !config_path.exists() {
        fs::write(
            &config_path,
            format!(
                "# dropdesk configuration\n# balance-cache-ttl: {DEFAULT_BALANCE_CACHE_TTL_SECS}\n# export-dir: ~/backups\n"
            ),
        )?;
    }

    let data_dir = dunce::canonicalize(&data_dir)?;
    tracing::info!(path = %data_dir.display(), "Initialized data directory");
    ConfigPaths::resolve(&data_dir, None)
}

/// A configuration layer split into startup-only and runtime keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub startup: HashMap<String, String>,
    pub runtime: HashMap<String, String>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.startup {
            self.startup.insert(key.clone(), value.clone());
        }
        for (key, value) in &other.runtime {
            self.runtime.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&contents)?;
        Ok(layer_from_yaml_value(&value))
    }

    /// Build a layer from `DROPDESK_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(env::vars())
    }

    fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut layer = Self::default();
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix("DROPDESK_") {
                insert_key_value(&mut layer, &normalize_key(stripped), value);
            }
        }
        layer
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db: Option<PathBuf>,
    pub json: Option<bool>,
    pub no_color: Option<bool>,
    pub balance_cache_ttl: Option<i64>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(path) = &self.db {
            insert_key_value(&mut layer, "db", path.to_string_lossy().to_string());
        }
        if let Some(json) = self.json {
            insert_key_value(&mut layer, "json", json.to_string());
        }
        if let Some(no_color) = self.no_color {
            insert_key_value(&mut layer, "no-color", no_color.to_string());
        }
        if let Some(ttl) = self.balance_cache_ttl {
            insert_key_value(&mut layer, "balance-cache-ttl", ttl.to_string());
        }

        layer
    }
}

/// Load project config (.dropdesk/config.yaml).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(data_dir: &Path) -> Result<ConfigLayer> {
    ConfigLayer::from_yaml(&data_dir.join("config.yaml"))
}

/// Load user config (~/.config/dropdesk/config.yaml).
///
/// A missing `HOME` yields an empty layer.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<ConfigLayer> {
    let Ok(home) = env::var("HOME") else {
        return Ok(ConfigLayer::default());
    };
    let path = Path::new(&home)
        .join(".config")
        .join("dropdesk")
        .join("config.yaml");
    ConfigLayer::from_yaml(&path)
}

/// Default config layer (lowest precedence).
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    layer.runtime.insert(
        "balance-cache-ttl".to_string(),
        DEFAULT_BALANCE_CACHE_TTL_SECS.to_string(),
    );
    layer
}

/// Load configuration with the usual precedence order.
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed.
pub fn load_config(data_dir: Option<&Path>, cli: &CliOverrides) -> Result<ConfigLayer> {
    let defaults = default_config_layer();
    let user = load_user_config()?;
    let project = match data_dir {
        Some(dir) => load_project_config(dir)?,
        None => ConfigLayer::default(),
    };
    let env_layer = ConfigLayer::from_env();
    let cli_layer = cli.as_layer();

    Ok(ConfigLayer::merge_layers(&[
        defaults, user, project, env_layer, cli_layer,
    ]))
}

/// How long a cached balance stays fresh.
///
/// Unparseable or negative values fall back to the default.
#[must_use]
pub fn balance_cache_ttl(layer: &ConfigLayer) -> Duration {
    let seconds = get_value(layer, &["balance-cache-ttl"])
        .and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|secs| *secs >= 0)
        .unwrap_or(DEFAULT_BALANCE_CACHE_TTL_SECS);
    Duration::seconds(seconds)
}

/// Default export target, with a leading `~` expanded.
#[must_use]
pub fn export_dir(layer: &ConfigLayer) -> Option<PathBuf> {
    let value = get_value(layer, &["export-dir"])?.trim();
    if value.is_empty() {
        return None;
    }
    if let Some(rest) = value.strip_prefix("~/") {
        if let Ok(home) = env::var("HOME") {
            return Some(Path::new(&home).join(rest));
        }
    }
    Some(PathBuf::from(value))
}

/// Startup flag lookup (`json`, `no-color`).
#[must_use]
pub fn startup_flag(layer: &ConfigLayer, key: &str) -> Option<bool> {
    layer.startup.get(key).and_then(|value| parse_bool(value))
}

/// What a command works against: resolved paths, merged config, the
/// database handle (opened on first use) and the local slot.
#[derive(Debug)]
pub struct Workspace {
    pub paths: ConfigPaths,
    pub layer: ConfigLayer,
    pub db: Database,
    pub slot: LocalSlot,
}

/// Discover the data directory from the CWD and open a workspace on it.
///
/// # Errors
///
/// Returns `NotInitialized` if no data directory is found, or an error if
/// configuration cannot be loaded.
pub fn open_workspace(cli: &CliOverrides) -> Result<Workspace> {
    let data_dir = discover_data_dir(None)?;
    open_workspace_at(&data_dir, cli)
}

/// Open a workspace on a known data directory.
///
/// A `db` startup key from any layer overrides the metadata path.
///
/// # Errors
///
/// Returns an error if configuration or metadata cannot be loaded.
pub fn open_workspace_at(data_dir: &Path, cli: &CliOverrides) -> Result<Workspace> {
    let layer = load_config(Some(data_dir), cli)?;
    let db_override = layer.startup.get("db").map(PathBuf::from);
    let paths = ConfigPaths::resolve(data_dir, db_override.as_ref())?;
    tracing::debug!(
        db = %paths.db_path.display(),
        slot = %paths.slot_path.display(),
        "Resolved workspace"
    );

    Ok(Workspace {
        db: Database::new(paths.db_path.clone()),
        slot: LocalSlot::new(paths.slot_path.clone()),
        paths,
        layer,
    })
}

/// Determine if a key is startup-only.
fn is_startup_key(key: &str) -> bool {
    matches!(
        normalize_key(key).as_str(),
        "db" | "dir" | "json" | "no-color" | "log-file"
    )
}

fn insert_key_value(layer: &mut ConfigLayer, key: &str, value: String) {
    let key = normalize_key(key);
    if is_startup_key(&key) {
        layer.startup.insert(key, value);
    } else {
        layer.runtime.insert(key, value);
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn get_value<'a>(layer: &'a ConfigLayer, keys: &[&str]) -> Option<&'a String> {
    keys.iter().find_map(|key| layer.runtime.get(*key))
}

fn relative_to(base: &Path, name: &str) -> PathBuf {
    let candidate = PathBuf::from(name);
    if candidate.is_absolute() {
        candidate
    } else {
        base.join(candidate)
    }
}

fn layer_from_yaml_value(value: &serde_yaml::Value) -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    let mut flat = HashMap::new();
    flatten_yaml(value, "", &mut flat);

    for (key, value) in flat {
        insert_key_value(&mut layer, &key, value);
    }

    layer
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        serde_yaml::Value::Sequence(values) => {
            let joined = values
                .iter()
                .filter_map(yaml_scalar_to_string)
                .collect::<Vec<_>>()
                .join(",");
            out.insert(prefix.to_string(), joined);
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn metadata_defaults_when_missing() {
        let temp = TempDir::new().expect("tempdir");
        let metadata = Metadata::load(temp.path()).expect("metadata");
        assert_eq!(metadata.database, DEFAULT_DB_FILENAME);
        assert_eq!(metadata.slot, DEFAULT_SLOT_FILENAME);
    }

    #[test]
    fn metadata_override_paths() {
        let temp = TempDir::new().expect("tempdir");
        let data_dir = temp.path().join(DATA_DIR_NAME);
        fs::create_dir_all(&data_dir).expect("create data dir");
        fs::write(
            data_dir.join("metadata.json"),
            r#"{"database": "custom.db", "slot": "state.json"}"#,
        )
        .expect("write metadata");

        let paths = ConfigPaths::resolve(&data_dir, None).expect("paths");
        assert_eq!(paths.db_path, data_dir.join("custom.db"));
        assert_eq!(paths.slot_path, data_dir.join("state.json"));

        let override_db = PathBuf::from("/tmp/other.db");
        let paths = ConfigPaths::resolve(&data_dir, Some(&override_db)).expect("paths");
        assert_eq!(paths.db_path, override_db);
    }

    #[test]
    fn merge_precedence_order() {
        let defaults = default_config_layer();

        let mut yaml = ConfigLayer::default();
        yaml.runtime
            .insert("balance-cache-ttl".to_string(), "120".to_string());

        let env_layer = ConfigLayer::from_vars([(
            "DROPDESK_BALANCE_CACHE_TTL".to_string(),
            "300".to_string(),
        )]);

        let cli = CliOverrides {
            balance_cache_ttl: Some(5),
            ..CliOverrides::default()
        }
        .as_layer();

        let merged = ConfigLayer::merge_layers(&[defaults.clone(), yaml.clone()]);
        assert_eq!(balance_cache_ttl(&merged), Duration::seconds(120));

        let merged = ConfigLayer::merge_layers(&[defaults.clone(), yaml.clone(), env_layer.clone()]);
        assert_eq!(balance_cache_ttl(&merged), Duration::seconds(300));

        let merged = ConfigLayer::merge_layers(&[defaults, yaml, env_layer, cli]);
        assert_eq!(balance_cache_ttl(&merged), Duration::seconds(5));
    }

    #[test]
    fn yaml_startup_keys_are_separated() {
        let yaml = r"
json: true
export-dir: /backups
";
        let value: serde_yaml::Value = serde_yaml::from_str(yaml).expect("parse yaml");
        let layer = layer_from_yaml_value(&value);
        assert_eq!(startup_flag(&layer, "json"), Some(true));
        assert_eq!(export_dir(&layer), Some(PathBuf::from("/backups")));
    }

    #[test]
    fn bad_ttl_falls_back_to_default() {
        let mut layer = ConfigLayer::default();
        layer
            .runtime
            .insert("balance-cache-ttl".to_string(), "soon".to_string());
        assert_eq!(
            balance_cache_ttl(&layer),
            Duration::seconds(DEFAULT_BALANCE_CACHE_TTL_SECS)
        );
    }

    #[test]
    fn discover_data_dir_uses_env_override() {
        let temp = TempDir::new().expect("tempdir");
        let data_dir = temp.path().join(DATA_DIR_NAME);
        fs::create_dir_all(&data_dir).expect("create data dir");

        let discovered = discover_data_dir_with_env(None, Some(&data_dir)).expect("discover");
        assert_eq!(discovered, data_dir);
    }

    #[test]
    fn discover_data_dir_walks_up() {
        let temp = TempDir::new().expect("tempdir");
        let data_dir = temp.path().join(DATA_DIR_NAME);
        fs::create_dir_all(&data_dir).expect("create data dir");
        let nested = temp.path().join("a").join("b");
        fs::create_dir_all(&nested).expect("create nested");

        let discovered = discover_data_dir_with_env(Some(&nested), Some(Path::new("/nonexistent/dir")))
            .expect("discover");
        assert_eq!(discovered, data_dir);
    }

    #[test]
    fn init_refuses_second_run() {
        let temp = TempDir::new().expect("tempdir");
        let paths = init_data_dir(temp.path(), false).expect("init");
        assert!(paths.data_dir.join("metadata.json").exists());
        assert!(paths.data_dir.join("config.yaml").exists());

        let err = init_data_dir(temp.path(), false).unwrap_err();
        assert!(matches!(err, DeskError::AlreadyInitialized { .. }));
        assert!(init_data_dir(temp.path(), true).is_ok());
    }

    #[test]
    fn workspace_uses_cli_db_override() {
        let temp = TempDir::new().expect("tempdir");
        let paths = init_data_dir(temp.path(), false).expect("init");
        let custom = temp.path().join("elsewhere.db");
        let cli = CliOverrides {
            db: Some(custom.clone()),
            ..CliOverrides::default()
        };

        let workspace = open_workspace_at(&paths.data_dir, &cli).expect("workspace");
        assert_eq!(workspace.db.path(), Some(custom.as_path()));
        assert!(!workspace.db.is_open());
        assert_eq!(workspace.slot.path(), paths.slot_path.as_path());
    }
}
