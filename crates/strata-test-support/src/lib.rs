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
#![allow(clippy::module_name_repetitions)]

//! Shared test helpers for the admin shell.
//! Layout: mocks.rs (scripted connection), fixtures.rs (canned replies).

pub mod fixtures;
pub mod mocks;

pub use mocks::{Call, RecordingConnection, Scripted};
