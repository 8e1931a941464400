//! Init command implementation.

use crate::cli::InitArgs;
use crate::config;
use crate::error::Result;
use crate::format::OutputContext;
use crate::storage::SqliteStorage;
use crate::storage::schema::CURRENT_SCHEMA_VERSION;
use serde::Serialize;

#[derive(Serialize)]
struct InitResult {
    data_dir: String,
    database: String,
    slot: String,
    schema_version: i32,
}

/// Create `.dropdesk/` in the current directory and an empty database.
///
/// # Errors
///
/// Returns `AlreadyInitialized` unless `--force`, or an I/O or database error.
pub fn execute(args: &InitArgs, ctx: &OutputContext) -> Result<()> {
    let root = std::env::current_dir()?;
    let paths = config::init_data_dir(&root, args.force)?;
    // Opening applies every migration.
    drop(SqliteStorage::open(&paths.db_path)?);

    let result = InitResult {
        data_dir: paths.data_dir.display().to_string(),
        database: paths.db_path.display().to_string(),
        slot: paths.slot_path.display().to_string(),
        schema_version: CURRENT_SCHEMA_VERSION,
    };

    if ctx.is_json() {
        return ctx.json(&result);
    }
    ctx.line(&format!("Initialized dropdesk in {}", result.data_dir));
    Ok(())
}
