//! `dropdesk` - local-first tracker for airdrop hunting
//!
//! Wallets, projects, tasks, checklist steps, notes, tags and chain
//! reference data live in one `SQLite` database. A JSON snapshot carries the
//! whole collection between machines.
//!
//! # Architecture
//!
//! - [`model`] - Record types and their store policies
//! - [`storage`] - Object stores over `SQLite`, schema migrations, repositories
//! - [`sync`] - Snapshot export/import and the legacy dump importer
//! - [`slot`] - Per-device key-value file (daily marks, balance cache)
//! - [`cache`] / [`balance`] - Time-boxed balance lookups
//! - [`validation`] - Input rules applied by the CLI
//! - [`config`] - Layered configuration and data-directory discovery
//! - [`cli`] / [`format`] - Command-line surface and output rendering
//! - [`error`] - Error types

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod balance;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod model;
pub mod slot;
pub mod storage;
pub mod sync;
pub mod util;
pub mod validation;

pub use error::{DeskError, ErrorCode, Result, StructuredError};
