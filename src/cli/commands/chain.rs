//! Chain command implementation.
//!
//! Chains are reference data. `upsert` loads them from a JSON array (as
//! returned by a chain-list service) and stamps `lastUpdated`.

use super::report_empty;
use crate::cli::{ChainCommands, ChainUpsertArgs};
use crate::config::Workspace;
use crate::error::{DeskError, Result};
use crate::format::OutputContext;
use crate::format::rich::RichChainTable;
use crate::model::Chain;
use rich_rust::prelude::*;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Execute the chain command.
///
/// # Errors
///
/// Returns an error if the input file is unreadable or a database operation fails.
pub fn execute(command: &ChainCommands, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    match command {
        ChainCommands::List => chain_list(workspace, ctx),
        ChainCommands::Upsert(args) => chain_upsert(args, workspace, ctx),
    }
}

#[derive(Serialize)]
struct UpsertResult {
    upserted: usize,
}

fn read_chains(path: &Path) -> Result<Vec<Chain>> {
    let text = std::fs::read_to_string(path)?;
    let chains: Vec<Chain> = serde_json::from_str(&text)?;
    if let Some(blank) = chains.iter().position(|c| c.chain_index.trim().is_empty()) {
        return Err(DeskError::validation(
            "chainIndex",
            format!("chain #{blank} has no chainIndex"),
        ));
    }
    Ok(chains)
}

fn chain_list(workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let chains = workspace.db.storage()?.chains().list()?;

    if ctx.is_json() {
        return ctx.json(&chains);
    }
    if ctx.is_quiet() {
        return Ok(());
    }
    if chains.is_empty() {
        report_empty(ctx, "chains");
        return Ok(());
    }
    if ctx.is_rich() {
        let theme = ctx.theme();
        Console::default().print_renderable(&RichChainTable::new(&chains, &theme).build_table());
    } else {
        for chain in &chains {
            println!("{}  {}  {}", chain.chain_index, chain.name, chain.short_name);
        }
    }
    Ok(())
}

fn chain_upsert(args: &ChainUpsertArgs, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let mut chains = read_chains(&args.file)?;
    workspace.db.storage()?.chains().save_fetched(&mut chains)?;
    info!(count = chains.len(), "Upserted chains");

    if ctx.is_json() {
        return ctx.json(&UpsertResult {
            upserted: chains.len(),
        });
    }
    ctx.line(&format!("Upserted {} chain(s)", chains.len()));
    Ok(())
}
