//! Transport-level errors.
//!
//! Remote failures are not errors here: the service reports those as a
//! [`Status`] inside a successful reply. These variants cover the cases
//! where no status could be obtained at all.

use thiserror::Error;

use crate::status::Status;

/// Result alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors raised while talking to the service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server could not be reached.
    #[error("failed to connect to {endpoint}")]
    Connect {
        /// Endpoint that was dialled.
        endpoint: String,
        /// Underlying HTTP error.
        source: reqwest::Error,
    },
    /// The server rejected the supplied credentials.
    #[error("authentication failed for {user}#{zone}")]
    Authentication {
        /// User that attempted to log in.
        user: String,
        /// Zone the user belongs to.
        zone: String,
    },
    /// A request failed in flight after the session was established.
    #[error("request to {operation} failed")]
    Transport {
        /// Logical operation being performed.
        operation: &'static str,
        /// Underlying HTTP error.
        source: reqwest::Error,
    },
    /// The server answered with an unexpected HTTP status.
    #[error("{operation} returned HTTP {status}")]
    Protocol {
        /// Logical operation being performed.
        operation: &'static str,
        /// HTTP status code of the reply.
        status: u16,
    },
    /// The reply body could not be decoded.
    #[error("failed to decode {operation} reply")]
    Decode {
        /// Logical operation being performed.
        operation: &'static str,
        /// Underlying HTTP/JSON error.
        source: reqwest::Error,
    },
    /// A URL could not be derived from the configured endpoint.
    #[error("invalid endpoint {endpoint}")]
    Endpoint {
        /// Offending endpoint text.
        endpoint: String,
        /// Underlying URL parse error.
        source: url::ParseError,
    },
}

impl ClientError {
    /// Status recorded for command tracking when a call never produced one.
    #[must_use]
    pub const fn status(&self) -> Status {
        match self {
            Self::Connect { .. } | Self::Transport { .. } => Status::USER_SOCK_CONNECT_ERR,
            Self::Authentication { .. } => Status::CAT_INVALID_AUTHENTICATION,
            Self::Protocol { .. } | Self::Decode { .. } | Self::Endpoint { .. } => {
                Status::SYS_UNKNOWN_ERROR
            }
        }
    }
}
