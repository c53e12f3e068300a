//! The remote call surface used by the administrative shell.

use async_trait::async_trait;

use crate::error::ClientResult;
use crate::model::{
    AdminArgs, ErrorMessage, GeneralQueryReply, GridValue, ReplicaModification, SimpleQueryReply,
    SimpleQueryRequest, UserIdentity,
};
use crate::status::Status;

/// Ordered diagnostics accumulated on a connection until cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorStack {
    messages: Vec<ErrorMessage>,
}

impl ErrorStack {
    /// Append messages reported by the server.
    pub fn extend(&mut self, messages: impl IntoIterator<Item = ErrorMessage>) {
        self.messages.extend(messages);
    }

    /// Messages in the order they were reported.
    #[must_use]
    pub fn messages(&self) -> &[ErrorMessage] {
        &self.messages
    }

    /// Returns `true` when nothing has been reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Forget every message.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Lines suitable for printing, one per message.
    #[must_use]
    pub fn render(&self) -> Vec<String> {
        self.messages
            .iter()
            .enumerate()
            .map(|(level, entry)| {
                if entry.status == Status::SUCCESS {
                    format!("Level {level}: {}", entry.message)
                } else {
                    format!("Level {level}: {} [{}]", entry.message, entry.status)
                }
            })
            .collect()
    }
}

/// An authenticated session with the service.
///
/// Calls are issued strictly one at a time. Remote failures come back as a
/// non-success [`Status`]; `Err` is reserved for transport problems.
#[async_trait]
pub trait Connection: Send {
    /// User the session is authenticated as.
    fn client_user(&self) -> &UserIdentity;

    /// Issue a general administrative request.
    async fn general_admin(&mut self, args: &AdminArgs) -> ClientResult<Status>;

    /// Issue the legacy user-administration request.
    async fn user_admin(&mut self, args: &AdminArgs) -> ClientResult<Status>;

    /// Run one page of a SQL-form catalog query.
    async fn simple_query(&mut self, request: &SimpleQueryRequest)
    -> ClientResult<SimpleQueryReply>;

    /// Run a general query, optionally routed to `zone_hint`.
    async fn general_query(
        &mut self,
        query: &str,
        zone_hint: Option<&str>,
    ) -> ClientResult<GeneralQueryReply>;

    /// Update catalog metadata of a single replica.
    async fn modify_replica(&mut self, request: &ReplicaModification) -> ClientResult<Status>;

    /// Read a grid configuration option.
    async fn grid_configuration_value(
        &mut self,
        namespace: &str,
        option: &str,
    ) -> ClientResult<GridValue>;

    /// Diagnostics accumulated since the last clear.
    fn error_stack(&self) -> &ErrorStack;

    /// Drop accumulated diagnostics.
    fn clear_error_stack(&mut self);

    /// End the session.
    async fn disconnect(&mut self) -> ClientResult<()>;
}
