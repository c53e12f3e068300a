//! Request and reply payloads shared by every transport.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::status::Status;

/// Number of positional slots carried by an administrative request.
pub const ADMIN_ARG_COUNT: usize = 10;

/// Positional arguments of a general or user administrative request.
///
/// Unused slots are empty strings, never absent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdminArgs([String; ADMIN_ARG_COUNT]);

impl AdminArgs {
    /// Build a request from up to ten leading values; the rest stay empty.
    #[must_use]
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = Self::default();
        for (slot, value) in args.0.iter_mut().zip(values) {
            *slot = value.into();
        }
        args
    }

    /// Value at `index`, or `""` past the end.
    #[must_use]
    pub fn get(&self, index: usize) -> &str {
        self.0.get(index).map_or("", String::as_str)
    }

    /// Overwrite the value at `index`; out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, value: impl Into<String>) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = value.into();
        }
    }

    /// All slots in order.
    #[must_use]
    pub const fn as_slice(&self) -> &[String; ADMIN_ARG_COUNT] {
        &self.0
    }
}

/// One entry of the server's diagnostic stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// Status attached to the message.
    #[serde(default)]
    pub status: Status,
    /// Human-readable text.
    pub message: String,
}

/// Authenticated user the session runs as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// User name without zone.
    pub name: String,
    /// Zone the user belongs to.
    pub zone: String,
}

impl Display for UserIdentity {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}#{}", self.name, self.zone)
    }
}

/// SQL-form catalog query checked server-side against a fixed allowlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleQueryRequest {
    /// Statement text with `?` placeholders.
    pub sql: String,
    /// Bind values, at most four.
    pub args: Vec<String>,
    /// Output form: `1` one value per line, `2` `name: value` lines.
    pub form: u8,
    /// Continuation cursor from a previous page, `0` for the first page.
    pub control: i32,
    /// Maximum size of one page of output.
    pub max_buf_size: u32,
}

impl SimpleQueryRequest {
    /// Build a first-page request.
    #[must_use]
    pub fn new(form: u8, sql: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            sql: sql.into(),
            args,
            form,
            control: 0,
            max_buf_size: 1024,
        }
    }
}

/// One page of simple-query output.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SimpleQueryReply {
    /// Outcome of the call.
    pub status: Status,
    /// Newline-separated output text.
    #[serde(default)]
    pub out_buf: String,
    /// Continuation cursor; positive when more pages remain.
    #[serde(default)]
    pub control: i32,
}

/// Rows returned by a general query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeneralQueryReply {
    /// Outcome of the call.
    pub status: Status,
    /// Result rows; each row holds one string per selected column.
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

/// Data object addressed by a replica request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataObjectRef {
    /// Catalog identifier.
    Id(i64),
    /// Absolute, normalized logical path.
    Path(String),
}

/// Replica of a data object addressed by a replica request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplicaRef {
    /// Replica number.
    Number(i32),
    /// Resource hierarchy hosting the replica.
    Hierarchy(String),
}

/// Catalog metadata update for one replica.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaModification {
    /// Target data object.
    pub data_object: DataObjectRef,
    /// Target replica.
    pub replica: ReplicaRef,
    /// Internal modification keys and their new values.
    pub attributes: BTreeMap<String, String>,
}

/// Grid configuration value lookup result.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GridValue {
    /// Outcome of the call.
    pub status: Status,
    /// Stored value when the call succeeded.
    #[serde(default)]
    pub value: String,
}
