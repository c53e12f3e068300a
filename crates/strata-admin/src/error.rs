//! Errors raised while executing a single shell command.
//!
//! A command error never ends the session: the dispatcher reports it, records
//! the matching status and moves on to the next line.

use std::io;

use strata_client::{ClientError, Status};
use thiserror::Error;

/// Result alias for command handlers.
pub(crate) type ShellResult<T> = Result<T, ShellError>;

#[derive(Debug, Error)]
pub(crate) enum ShellError {
    /// Malformed or missing arguments; nothing was sent.
    #[error("{0}")]
    InvalidArgument(String),
    /// Attribute not known, or known but not modifiable.
    #[error("Invalid attribute specified: {name}")]
    InvalidAttribute { name: String },
    /// The caller lacks the privilege the command needs.
    #[error("{message}")]
    PermissionDenied {
        status: Status,
        message: &'static str,
    },
    /// The lookup matched nothing. Reported as information, not a failure.
    #[error("{message}")]
    NotFound { message: &'static str },
    /// The service answered with a failure status.
    #[error("{operation} failed with error {status}")]
    RemoteFailure {
        operation: &'static str,
        status: Status,
    },
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("failed to read from the terminal")]
    Console(#[source] io::Error),
}

impl ShellError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Local errors are caught before any request reaches the service.
    pub(crate) const fn is_local(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_) | Self::InvalidAttribute { .. } | Self::Console(_)
        )
    }

    /// Status recorded as the outcome of the failed command.
    pub(crate) const fn status(&self) -> Status {
        match self {
            Self::InvalidArgument(_) | Self::InvalidAttribute { .. } => {
                Status::SYS_INVALID_INPUT_PARAM
            }
            Self::PermissionDenied { status, .. } | Self::RemoteFailure { status, .. } => *status,
            Self::NotFound { .. } => Status::SUCCESS,
            Self::Client(err) => err.status(),
            Self::Console(_) => Status::SYS_UNKNOWN_ERROR,
        }
    }
}
