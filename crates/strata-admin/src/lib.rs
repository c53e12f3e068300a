#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::redundant_pub_crate)]

//! Administrative command shell for a Strata zone.
//!
//! Layout:
//! - `cli.rs`: argument parsing, connection setup, exit codes
//! - `config.rs`: environment file and endpoint resolution
//! - `telemetry.rs`: tracing subscriber installation
//! - `shell.rs`: the read/dispatch loop
//! - `dispatch.rs`: verb table and routing
//! - `commands/`: verb handlers grouped by concern
//! - `proxy.rs`: general-admin calls with legacy fallback
//! - `replica.rs`, `registry.rs`: replica inspection and modification
//! - `tokenizer.rs`, `console.rs`, `output.rs`, `help.rs`, `scramble.rs`: plumbing
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod commands;
pub(crate) mod config;
pub(crate) mod console;
pub(crate) mod dispatch;
pub(crate) mod error;
pub(crate) mod help;
pub(crate) mod output;
pub(crate) mod proxy;
pub(crate) mod registry;
pub(crate) mod replica;
pub(crate) mod scramble;
pub(crate) mod shell;
pub(crate) mod telemetry;
pub(crate) mod tokenizer;

pub use cli::run;
