//! Schema command implementation.
//!
//! Emits JSON Schema documents for the stored record types, the snapshot
//! document, and the `--json` error envelope, for tooling that reads
//! dropdesk output.

use crate::cli::{SchemaArgs, SchemaTarget};
use crate::error::Result;
use crate::format::OutputContext;
use crate::model::{Chain, Note, Project, SubTask, Tag, Task, Wallet};
use crate::sync::Snapshot;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use schemars::schema::RootSchema;
use schemars::schema_for;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize, JsonSchema)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Serialize, JsonSchema)]
struct ErrorBody {
    /// Machine-readable error code (SCREAMING_SNAKE_CASE)
    code: String,
    /// Human-readable message
    message: String,
    /// Optional hint for remediation
    hint: Option<String>,
}

#[derive(Debug, Serialize)]
struct SchemaOutput {
    tool: &'static str,
    generated_at: DateTime<Utc>,
    schemas: BTreeMap<&'static str, RootSchema>,
}

/// Print the requested schemas.
///
/// Schemas are JSON in every output mode; quiet mode prints nothing.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn execute(args: &SchemaArgs, ctx: &OutputContext) -> Result<()> {
    if ctx.is_quiet() {
        return Ok(());
    }

    let payload = SchemaOutput {
        tool: "dropdesk",
        generated_at: Utc::now(),
        schemas: build_schemas(args.target),
    };
    ctx.json(&payload)
}

fn build_schemas(target: SchemaTarget) -> BTreeMap<&'static str, RootSchema> {
    let mut schemas = BTreeMap::new();
    let all = target == SchemaTarget::All;

    if all || target == SchemaTarget::Wallet {
        schemas.insert("Wallet", schema_for!(Wallet));
    }
    if all || target == SchemaTarget::Project {
        schemas.insert("Project", schema_for!(Project));
    }
    if all || target == SchemaTarget::Task {
        schemas.insert("Task", schema_for!(Task));
    }
    if all || target == SchemaTarget::Subtask {
        schemas.insert("SubTask", schema_for!(SubTask));
    }
    if all || target == SchemaTarget::Note {
        schemas.insert("Note", schema_for!(Note));
    }
    if all || target == SchemaTarget::Tag {
        schemas.insert("Tag", schema_for!(Tag));
    }
    if all || target == SchemaTarget::Chain {
        schemas.insert("Chain", schema_for!(Chain));
    }
    if all || target == SchemaTarget::Snapshot {
        schemas.insert("Snapshot", schema_for!(Snapshot));
    }
    if all || target == SchemaTarget::Error {
        schemas.insert("ErrorEnvelope", schema_for!(ErrorEnvelope));
    }

    schemas
}
