//! In-memory [`Connection`] that replays scripted replies and records calls.

use std::collections::VecDeque;

use async_trait::async_trait;
use strata_client::{
    AdminArgs, ClientError, ClientResult, Connection, ErrorMessage, ErrorStack, GeneralQueryReply,
    GridValue, ReplicaModification, SimpleQueryReply, SimpleQueryRequest, Status, UserIdentity,
};

/// A call observed by [`RecordingConnection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// General administrative request.
    GeneralAdmin(AdminArgs),
    /// Legacy user-administration request.
    UserAdmin(AdminArgs),
    /// One simple-query page.
    SimpleQuery(SimpleQueryRequest),
    /// General query text and zone hint.
    GeneralQuery {
        /// Query text.
        query: String,
        /// Zone the query was routed to.
        zone_hint: Option<String>,
    },
    /// Replica metadata update.
    ModifyReplica(ReplicaModification),
    /// Grid configuration lookup.
    GridConfiguration {
        /// Option namespace.
        namespace: String,
        /// Option name.
        option: String,
    },
    /// Session teardown.
    Disconnect,
}

/// Reply queued for one call, plus diagnostics the call leaves behind.
#[derive(Debug, Clone)]
pub struct Scripted<T> {
    reply: Option<T>,
    errors: Vec<ErrorMessage>,
}

impl<T> Scripted<T> {
    /// Answer with `reply`.
    #[must_use]
    pub const fn new(reply: T) -> Self {
        Self {
            reply: Some(reply),
            errors: Vec::new(),
        }
    }

    /// Fail the call at the transport level.
    #[must_use]
    pub const fn unreachable() -> Self {
        Self {
            reply: None,
            errors: Vec::new(),
        }
    }

    /// Leave a diagnostic on the error stack when the call runs.
    #[must_use]
    pub fn with_error(mut self, status: Status, message: impl Into<String>) -> Self {
        self.errors.push(ErrorMessage {
            status,
            message: message.into(),
        });
        self
    }
}

impl<T> From<T> for Scripted<T> {
    fn from(reply: T) -> Self {
        Self::new(reply)
    }
}

/// Replies keyed by a substring of the call's rendered request.
///
/// The first rule whose needle occurs in the key answers. Each rule pops
/// its replies in order and keeps repeating the last one.
#[derive(Debug, Clone)]
struct Script<T> {
    rules: Vec<(String, VecDeque<Scripted<T>>)>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<T: Clone> Script<T> {
    fn push(&mut self, needle: &str, reply: Scripted<T>) {
        if let Some((_, queue)) = self.rules.iter_mut().find(|(rule, _)| rule == needle) {
            queue.push_back(reply);
        } else {
            self.rules.push((needle.to_string(), VecDeque::from([reply])));
        }
    }

    fn next(&mut self, key: &str) -> Option<Scripted<T>> {
        let (_, queue) = self
            .rules
            .iter_mut()
            .find(|(needle, _)| key.contains(needle.as_str()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

/// Scripted stand-in for a live session.
///
/// Calls without a matching script succeed with an empty reply.
#[derive(Debug)]
pub struct RecordingConnection {
    user: UserIdentity,
    calls: Vec<Call>,
    errors: ErrorStack,
    general_admin: Script<Status>,
    user_admin: Script<Status>,
    simple_query: Script<SimpleQueryReply>,
    general_query: Script<GeneralQueryReply>,
    modify_replica: Script<Status>,
    grid: Script<GridValue>,
}

impl RecordingConnection {
    /// Session authenticated as `name#zone`.
    #[must_use]
    pub fn new(name: &str, zone: &str) -> Self {
        Self {
            user: UserIdentity {
                name: name.to_string(),
                zone: zone.to_string(),
            },
            calls: Vec::new(),
            errors: ErrorStack::default(),
            general_admin: Script::default(),
            user_admin: Script::default(),
            simple_query: Script::default(),
            general_query: Script::default(),
            modify_replica: Script::default(),
            grid: Script::default(),
        }
    }

    /// Answer general-admin calls whose space-joined slots contain `needle`.
    #[must_use]
    pub fn on_general_admin(mut self, needle: &str, reply: impl Into<Scripted<Status>>) -> Self {
        self.general_admin.push(needle, reply.into());
        self
    }

    /// Answer user-admin calls whose space-joined slots contain `needle`.
    #[must_use]
    pub fn on_user_admin(mut self, needle: &str, reply: impl Into<Scripted<Status>>) -> Self {
        self.user_admin.push(needle, reply.into());
        self
    }

    /// Answer simple queries whose SQL contains `needle`.
    #[must_use]
    pub fn on_simple_query(
        mut self,
        needle: &str,
        reply: impl Into<Scripted<SimpleQueryReply>>,
    ) -> Self {
        self.simple_query.push(needle, reply.into());
        self
    }

    /// Answer general queries whose text contains `needle`.
    #[must_use]
    pub fn on_general_query(
        mut self,
        needle: &str,
        reply: impl Into<Scripted<GeneralQueryReply>>,
    ) -> Self {
        self.general_query.push(needle, reply.into());
        self
    }

    /// Answer every replica modification.
    #[must_use]
    pub fn on_modify_replica(mut self, reply: impl Into<Scripted<Status>>) -> Self {
        self.modify_replica.push("", reply.into());
        self
    }

    /// Answer lookups of `namespace/option`.
    #[must_use]
    pub fn on_grid_value(
        mut self,
        namespace: &str,
        option: &str,
        reply: impl Into<Scripted<GridValue>>,
    ) -> Self {
        self.grid.push(&format!("{namespace}/{option}"), reply.into());
        self
    }

    /// Every call in the order it was made.
    #[must_use]
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Slots of every general-admin call.
    #[must_use]
    pub fn general_admin_calls(&self) -> Vec<&AdminArgs> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::GeneralAdmin(args) => Some(args),
                _ => None,
            })
            .collect()
    }

    /// Slots of every user-admin call.
    #[must_use]
    pub fn user_admin_calls(&self) -> Vec<&AdminArgs> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::UserAdmin(args) => Some(args),
                _ => None,
            })
            .collect()
    }

    /// Every simple-query page requested.
    #[must_use]
    pub fn simple_queries(&self) -> Vec<&SimpleQueryRequest> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::SimpleQuery(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    /// Text of every general query.
    #[must_use]
    pub fn general_queries(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::GeneralQuery { query, .. } => Some(query.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every replica modification sent.
    #[must_use]
    pub fn replica_modifications(&self) -> Vec<&ReplicaModification> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::ModifyReplica(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    /// Number of remote calls other than disconnect.
    #[must_use]
    pub fn remote_call_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| !matches!(call, Call::Disconnect))
            .count()
    }

    /// Returns `true` once the session has been closed.
    #[must_use]
    pub fn disconnected(&self) -> bool {
        self.calls.contains(&Call::Disconnect)
    }

    fn answer<T>(
        &mut self,
        operation: &'static str,
        scripted: Option<Scripted<T>>,
        fallback: T,
    ) -> ClientResult<T> {
        let Some(scripted) = scripted else {
            return Ok(fallback);
        };
        self.errors.extend(scripted.errors);
        scripted.reply.ok_or(ClientError::Protocol {
            operation,
            status: 503,
        })
    }
}

fn admin_key(args: &AdminArgs) -> String {
    args.as_slice().join(" ")
}

#[async_trait]
impl Connection for RecordingConnection {
    fn client_user(&self) -> &UserIdentity {
        &self.user
    }

    async fn general_admin(&mut self, args: &AdminArgs) -> ClientResult<Status> {
        self.calls.push(Call::GeneralAdmin(args.clone()));
        let scripted = self.general_admin.next(&admin_key(args));
        self.answer("general admin", scripted, Status::SUCCESS)
    }

    async fn user_admin(&mut self, args: &AdminArgs) -> ClientResult<Status> {
        self.calls.push(Call::UserAdmin(args.clone()));
        let scripted = self.user_admin.next(&admin_key(args));
        self.answer("user admin", scripted, Status::SUCCESS)
    }

    async fn simple_query(
        &mut self,
        request: &SimpleQueryRequest,
    ) -> ClientResult<SimpleQueryReply> {
        self.calls.push(Call::SimpleQuery(request.clone()));
        let scripted = self.simple_query.next(&request.sql);
        self.answer("simple query", scripted, SimpleQueryReply::default())
    }

    async fn general_query(
        &mut self,
        query: &str,
        zone_hint: Option<&str>,
    ) -> ClientResult<GeneralQueryReply> {
        self.calls.push(Call::GeneralQuery {
            query: query.to_string(),
            zone_hint: zone_hint.map(str::to_string),
        });
        let scripted = self.general_query.next(query);
        self.answer("general query", scripted, GeneralQueryReply::default())
    }

    async fn modify_replica(&mut self, request: &ReplicaModification) -> ClientResult<Status> {
        self.calls.push(Call::ModifyReplica(request.clone()));
        let scripted = self.modify_replica.next("");
        self.answer("modify replica", scripted, Status::SUCCESS)
    }

    async fn grid_configuration_value(
        &mut self,
        namespace: &str,
        option: &str,
    ) -> ClientResult<GridValue> {
        self.calls.push(Call::GridConfiguration {
            namespace: namespace.to_string(),
            option: option.to_string(),
        });
        let scripted = self.grid.next(&format!("{namespace}/{option}"));
        self.answer("grid configuration", scripted, GridValue::default())
    }

    fn error_stack(&self) -> &ErrorStack {
        &self.errors
    }

    fn clear_error_stack(&mut self) {
        self.errors.clear();
    }

    async fn disconnect(&mut self) -> ClientResult<()> {
        self.calls.push(Call::Disconnect);
        Ok(())
    }
}
