use clap::Parser;
use dropdesk::cli::Cli;
use dropdesk::cli::commands;
use dropdesk::config::{self, ConfigLayer};
use dropdesk::format::OutputContext;
use dropdesk::{DeskError, StructuredError, logging};
use std::path::PathBuf;

fn main() {
    let cli = Cli::parse();

    // Startup flags may also come from DROPDESK_* variables.
    let env_layer = ConfigLayer::from_env();
    let json = cli.json || config::startup_flag(&env_layer, "json").unwrap_or(false);
    let no_color = cli.no_color || config::startup_flag(&env_layer, "no-color").unwrap_or(false);
    let log_file = cli
        .log_file
        .clone()
        .or_else(|| env_layer.startup.get("log-file").map(PathBuf::from));

    if let Err(err) = logging::init_logging(cli.verbose, cli.quiet, log_file.as_deref()) {
        eprintln!("Warning: failed to initialize logging: {err}");
    }

    let ctx = OutputContext::from_flags(json, cli.quiet, no_color);
    if let Err(err) = commands::dispatch(&cli, &ctx) {
        report_error(&err, json);
        std::process::exit(err.exit_code());
    }
}

fn report_error(err: &DeskError, json: bool) {
    tracing::debug!(code = ?err.code(), error = %err, "Command failed");
    if json {
        let envelope = StructuredError::from(err);
        match serde_json::to_string_pretty(&envelope) {
            Ok(text) => println!("{text}"),
            Err(_) => eprintln!("Error: {err}"),
        }
        return;
    }
    eprintln!("Error: {err}");
    if let Some(hint) = err.hint() {
        eprintln!("Hint: {hint}");
    }
}
