//! Wallet command implementation.
//!
//! Provides wallet management: add, list, show, edit, rm, the wallet-type
//! list, and cached balances.

use super::{report_action, report_empty};
use crate::balance::{BalanceBook, UnconfiguredSource};
use crate::cli::{
    AddressArg, WalletAddArgs, WalletBalanceArgs, WalletCommands, WalletEditArgs, WalletListArgs,
    WalletTypesArgs,
};
use crate::config::{self, Workspace};
use crate::error::{DeskError, Result};
use crate::format::rich::RichWalletTable;
use crate::format::{OutputContext, format_usd, format_wallet_line};
use crate::model::{DEFAULT_WALLET_TYPES, Wallet};
use crate::validation::validate_wallet;
use chrono::Utc;
use rich_rust::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// Execute the wallet command.
///
/// # Errors
///
/// Returns an error if validation or database operations fail.
pub fn execute(command: &WalletCommands, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    match command {
        WalletCommands::Add(args) => wallet_add(args, workspace, ctx),
        WalletCommands::List(args) => wallet_list(args, workspace, ctx),
        WalletCommands::Show(args) => wallet_show(args, workspace, ctx),
        WalletCommands::Edit(args) => wallet_edit(args, workspace, ctx),
        WalletCommands::Rm(args) => wallet_rm(args, workspace, ctx),
        WalletCommands::Types(args) => wallet_types(args, workspace, ctx),
        WalletCommands::Balance(args) => wallet_balance(args, workspace, ctx),
        WalletCommands::Balances => wallet_balances(workspace, ctx),
    }
}

#[derive(Serialize)]
struct BalanceOutput<'a> {
    address: &'a str,
    balance: f64,
    fetched_at: Option<String>,
    fresh: bool,
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require_known_type(types: &[String], wallet_type: &str) -> Result<()> {
    if types.iter().any(|t| t == wallet_type) {
        return Ok(());
    }
    Err(DeskError::validation(
        "type",
        format!(
            "Unknown wallet type '{wallet_type}' (known: {})",
            types.join(", ")
        ),
    ))
}

fn wallet_add(args: &WalletAddArgs, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let mut wallet = Wallet {
        address: args.address.trim().to_string(),
        wallet_type: args.wallet_type.trim().to_string(),
        alias: non_blank(args.alias.as_ref()),
        twitter: non_blank(args.twitter.as_ref()),
        email: non_blank(args.email.as_ref()),
    };
    validate_wallet(&wallet)?;

    let mut storage = workspace.db.storage()?;
    require_known_type(&storage.wallet_types()?, &wallet.wallet_type)?;
    if storage.wallets().get(&wallet.address)?.is_some() {
        return Err(DeskError::DuplicateKey {
            store: "wallets",
            key: wallet.address,
        });
    }

    storage.wallets().save(&mut wallet)?;
    info!(address = %wallet.address, wallet_type = %wallet.wallet_type, "Added wallet");
    report_action(ctx, "created", "wallets", &wallet.address, "wallet")
}

fn wallet_list(args: &WalletListArgs, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let mut wallets = workspace.db.storage()?.wallets().list()?;
    if let Some(wallet_type) = &args.wallet_type {
        wallets.retain(|w| &w.wallet_type == wallet_type);
    }

    if ctx.is_json() {
        return ctx.json(&wallets);
    }
    if ctx.is_quiet() {
        return Ok(());
    }
    if wallets.is_empty() {
        report_empty(ctx, "wallets");
        return Ok(());
    }

    if ctx.is_rich() {
        let theme = ctx.theme();
        let table = RichWalletTable::new(&wallets, &theme)
            .full_address(args.full)
            .build_table();
        Console::default().print_renderable(&table);
    } else {
        for wallet in &wallets {
            println!("{}", format_wallet_line(wallet));
        }
    }
    Ok(())
}

fn load_wallet(workspace: &Workspace, address: &str) -> Result<Wallet> {
    workspace.db.storage()?.wallets().require(address.trim())
}

fn wallet_show(args: &AddressArg, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let wallet = load_wallet(workspace, &args.address)?;

    if ctx.is_json() {
        return ctx.json(&wallet);
    }
    if ctx.is_quiet() {
        return Ok(());
    }

    if ctx.is_rich() {
        let theme = ctx.theme();
        let wallets = [wallet];
        let table = RichWalletTable::new(&wallets, &theme)
            .full_address(true)
            .build_table();
        Console::default().print_renderable(&table);
    } else {
        println!("{}", format_wallet_line(&wallet));
        if let Some(twitter) = &wallet.twitter {
            println!("  twitter: {twitter}");
        }
        if let Some(email) = &wallet.email {
            println!("  email: {email}");
        }
    }
    Ok(())
}

fn wallet_edit(args: &WalletEditArgs, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let mut storage = workspace.db.storage()?;
    let mut wallet = storage.wallets().require(args.address.trim())?;

    if let Some(wallet_type) = &args.wallet_type {
        require_known_type(&storage.wallet_types()?, wallet_type.trim())?;
        wallet.wallet_type = wallet_type.trim().to_string();
    }
    // An empty value clears the optional field.
    if args.alias.is_some() {
        wallet.alias = non_blank(args.alias.as_ref());
    }
    if args.twitter.is_some() {
        wallet.twitter = non_blank(args.twitter.as_ref());
    }
    if args.email.is_some() {
        wallet.email = non_blank(args.email.as_ref());
    }
    validate_wallet(&wallet)?;

    storage.wallets().save(&mut wallet)?;
    report_action(ctx, "updated", "wallets", &wallet.address, "wallet")
}

fn wallet_rm(args: &AddressArg, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let address = args.address.trim();
    let removed = workspace.db.storage()?.wallets().remove(address)?;
    if removed {
        let mut book = BalanceBook::load(&workspace.slot, config::balance_cache_ttl(&workspace.layer))?;
        if book.forget(address) {
            book.save()?;
        }
        info!(address, "Removed wallet");
    }
    let status = if removed { "removed" } else { "not_found" };
    report_action(ctx, status, "wallets", address, "wallet")
}

fn wallet_types(args: &WalletTypesArgs, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let mut storage = workspace.db.storage()?;
    let mut types = storage.wallet_types()?;
    let mut changed = false;

    if args.reset {
        types = DEFAULT_WALLET_TYPES.iter().map(ToString::to_string).collect();
        changed = true;
    }
    for name in &args.add {
        let name = name.trim();
        if name.is_empty() {
            return Err(DeskError::validation("type", "wallet type cannot be empty"));
        }
        if !types.iter().any(|t| t == name) {
            types.push(name.to_string());
            changed = true;
        }
    }
    for name in &args.remove {
        let before = types.len();
        types.retain(|t| t != name.trim());
        changed |= types.len() != before;
    }

    if changed {
        storage.set_wallet_types(&types)?;
        info!(types = ?types, "Updated wallet types");
    }

    if ctx.is_json() {
        return ctx.json(&types);
    }
    if ctx.is_quiet() {
        return Ok(());
    }
    if ctx.is_rich() {
        let theme = ctx.theme();
        let mut line = Text::new("");
        line.append_styled("Wallet types: ", theme.header.clone());
        for (i, name) in types.iter().enumerate() {
            if i > 0 {
                line.append("  ");
            }
            line.append_styled(name, theme.wallet_type_style(name).clone());
        }
        Console::default().print_renderable(&line);
    } else {
        for name in &types {
            println!("{name}");
        }
    }
    Ok(())
}

fn wallet_balance(args: &WalletBalanceArgs, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let wallet = load_wallet(workspace, &args.address)?;
    let ttl = config::balance_cache_ttl(&workspace.layer);
    let mut book = BalanceBook::load(&workspace.slot, ttl)?;
    let now = Utc::now();

    let balance = if let Some(value) = args.set {
        if !value.is_finite() || value < 0.0 {
            return Err(DeskError::validation(
                "balance",
                format!("Balance must be a non-negative number, got {value}"),
            ));
        }
        book.record(&wallet.address, value, now);
        book.save()?;
        value
    } else if args.forget {
        book.forget(&wallet.address);
        book.save()?;
        0.0
    } else {
        let value = book.balance_of(&UnconfiguredSource, &wallet.address, now);
        book.save()?;
        value
    };

    let entry = book.cache().get(&wallet.address);
    let output = BalanceOutput {
        address: &wallet.address,
        balance,
        fetched_at: entry.map(|e| e.fetched_at.to_rfc3339()),
        fresh: entry.is_some_and(|e| e.is_fresh(ttl, now)),
    };

    if ctx.is_json() {
        return ctx.json(&output);
    }
    if ctx.is_quiet() {
        return Ok(());
    }
    if ctx.is_rich() {
        let theme = ctx.theme();
        let mut text = Text::new("");
        text.append_styled(wallet.display_name(), theme.address.clone());
        text.append("  ");
        text.append_styled(&format_usd(balance), theme.amount.clone());
        if !output.fresh {
            text.append_styled("  (stale)", theme.muted.clone());
        }
        Console::default().print_renderable(&text);
    } else {
        let stale = if output.fresh { "" } else { "  (stale)" };
        println!("{}  {}{stale}", wallet.address, format_usd(balance));
    }
    Ok(())
}

fn wallet_balances(workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let wallets = workspace.db.storage()?.wallets().list()?;
    let book = BalanceBook::load(&workspace.slot, config::balance_cache_ttl(&workspace.layer))?;

    let balances: BTreeMap<String, f64> = wallets
        .iter()
        .map(|w| {
            let value = book.cache().get(&w.address).map_or(0.0, |e| e.value);
            (w.address.clone(), value)
        })
        .collect();
    let total: f64 = balances.values().sum();

    if ctx.is_json() {
        return ctx.json(&serde_json::json!({ "balances": balances, "total": total }));
    }
    if ctx.is_quiet() {
        return Ok(());
    }
    if wallets.is_empty() {
        report_empty(ctx, "wallets");
        return Ok(());
    }

    if ctx.is_rich() {
        let theme = ctx.theme();
        let console = Console::default();
        let table = RichWalletTable::new(&wallets, &theme)
            .with_balances(&balances)
            .build_table();
        console.print_renderable(&table);
        let mut footer = Text::new("");
        footer.append_styled("Total ", theme.header.clone());
        footer.append_styled(&format_usd(total), theme.amount.clone());
        console.print_renderable(&footer);
    } else {
        for wallet in &wallets {
            let value = balances.get(&wallet.address).copied().unwrap_or(0.0);
            println!("{}  {}", wallet.address, format_usd(value));
        }
        println!("total  {}", format_usd(total));
    }
    Ok(())
}
