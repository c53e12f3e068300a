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

//! Client-side view of the Strata data-management service.
//!
//! The administrative shell never talks to the network directly; it drives a
//! [`Connection`], which exposes the handful of request/response calls the
//! shell needs and keeps the server's diagnostic stack between calls.
//!
//! Layout:
//! - `status.rs`: integer status codes and their symbolic names
//! - `model.rs`: request/response payloads shared by every transport
//! - `connection.rs`: the `Connection` trait and the diagnostic stack
//! - `http.rs`: JSON-over-HTTP gateway transport
//! - `error.rs`: transport-level errors

pub mod connection;
pub mod error;
pub mod http;
pub mod model;
pub mod status;

pub use connection::{Connection, ErrorStack};
pub use error::{ClientError, ClientResult};
pub use http::{ConnectionConfig, HttpConnection, HttpConnector, ServerInfo};
pub use model::{
    AdminArgs, DataObjectRef, ErrorMessage, GeneralQueryReply, GridValue, ReplicaModification,
    ReplicaRef, SimpleQueryReply, SimpleQueryRequest, UserIdentity,
};
pub use status::Status;
