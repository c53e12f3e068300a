//! Handlers for verbs that need more than one templated admin call.

pub(crate) mod listing;
pub(crate) mod local;
pub(crate) mod resources;
pub(crate) mod users;
pub(crate) mod zones;

use strata_client::Status;

use crate::dispatch::Dispatcher;
use crate::error::{ShellError, ShellResult};

/// Split `name[#zone]`; the zone is empty when absent.
pub(crate) fn split_user_name(input: &str) -> ShellResult<(&str, &str)> {
    match input.split_once('#') {
        None => Ok((input, "")),
        Some((_, zone)) if zone.contains('#') => Err(ShellError::invalid("Invalid username format.")),
        Some(parts) => Ok(parts),
    }
}

/// Refuse to continue unless the session user is a `rodsadmin`.
pub(crate) async fn require_rodsadmin(dispatcher: &mut Dispatcher<'_>) -> ShellResult<()> {
    let user = dispatcher.connection().client_user().clone();
    let query = format!(
        "select USER_TYPE where USER_NAME = '{}' and USER_ZONE = '{}'",
        user.name, user.zone
    );
    let reply = dispatcher.connection().general_query(&query, None).await?;
    if reply.status.is_failure() && reply.status != Status::CAT_NO_ROWS_FOUND {
        return Err(ShellError::RemoteFailure {
            operation: "user type lookup",
            status: reply.status,
        });
    }
    let user_type = reply.rows.first().and_then(|row| row.first());
    match user_type.map(String::as_str) {
        None => Err(ShellError::PermissionDenied {
            status: Status::CAT_INVALID_USER_TYPE,
            message: "Could not determine if user has permission to view information.",
        }),
        Some("rodsadmin") => Ok(()),
        Some(other) => {
            tracing::debug!(user = %user, user_type = other, "rodsadmin check refused");
            Err(ShellError::PermissionDenied {
                status: Status::CAT_INSUFFICIENT_PRIVILEGE_LEVEL,
                message: "Operation requires rodsadmin level privileges.",
            })
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use strata_test_support::RecordingConnection;

    use crate::console::testing::ScriptedConsole;
    use crate::dispatch::{Dispatcher, Outcome, SessionSettings};
    use crate::tokenizer::{MAX_TOKENS, tokenize};
    use strata_client::Status;

    /// Settings of a session authenticated in `tempZone`.
    pub(crate) fn settings() -> SessionSettings {
        SessionSettings {
            zone: "tempZone".into(),
            password: Some("rods-password".into()),
            ..SessionSettings::default()
        }
    }

    /// Dispatch one line and return its outcome and recorded status.
    pub(crate) async fn run(
        connection: &mut RecordingConnection,
        console: &mut ScriptedConsole,
        settings: SessionSettings,
        line: &str,
    ) -> (Outcome, Status) {
        let mut dispatcher = Dispatcher::new(connection, console, settings);
        let outcome = dispatcher.dispatch(&tokenize(line, MAX_TOKENS)).await;
        (outcome, dispatcher.last_status())
    }
}
