//! User modification and quotas.

use strata_client::{AdminArgs, Status};

use super::split_user_name;
use crate::dispatch::Dispatcher;
use crate::error::{ShellError, ShellResult};
use crate::proxy::InvokeOptions;
use crate::scramble;
use crate::tokenizer::Command;

/// Whose quota `suq`/`sgq` sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QuotaTarget {
    User,
    Group,
}

impl QuotaTarget {
    const fn kind(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Group => "group",
        }
    }

    const fn missing_name(self) -> &'static str {
        match self {
            Self::User => "ERROR: missing username parameter",
            Self::Group => "ERROR: missing group name parameter",
        }
    }
}

/// `moduser name[#zone] option value`.
///
/// Passwords are scrambled under the caller's own password before they leave
/// the process.
pub(crate) async fn modify_user(dispatcher: &mut Dispatcher<'_>, command: &Command) -> ShellResult<()> {
    let (target, option, value) = (command.arg(1), command.arg(2), command.arg(3));
    let value = match option {
        "password" => {
            let key = match dispatcher.settings().password.clone() {
                Some(password) => password,
                None => dispatcher
                    .console()
                    .read_secret("Enter your current password:")
                    .map_err(ShellError::Console)?,
            };
            scramble::encode(&scramble::pad_password(value), &key)
        }
        "type" if value != "rodsadmin" => {
            refuse_admin_downgrade(dispatcher, target).await?;
            value.to_string()
        }
        _ => value.to_string(),
    };

    let args = AdminArgs::new([
        "modify",
        "user",
        target,
        option,
        value.as_str(),
        command.arg(4),
        command.arg(5),
        command.arg(6),
    ]);
    dispatcher.invoke(args, InvokeOptions::default()).await;
    Ok(())
}

async fn refuse_admin_downgrade(dispatcher: &mut Dispatcher<'_>, target: &str) -> ShellResult<()> {
    let (name, zone) = split_user_name(target)?;
    let zone = if zone.is_empty() {
        dispatcher.local_zone().await?
    } else {
        zone.to_string()
    };

    let reply = dispatcher
        .connection()
        .general_query("select USER_NAME, USER_ZONE where USER_TYPE = 'rodsadmin'", None)
        .await?;
    if reply.status == Status::CAT_NO_ROWS_FOUND {
        return Ok(());
    }
    if reply.status.is_failure() {
        return Err(ShellError::RemoteFailure {
            operation: "rodsadmin lookup",
            status: reply.status,
        });
    }

    let is_admin = reply
        .rows
        .iter()
        .any(|row| row.first().map(String::as_str) == Some(name) && row.get(1) == Some(&zone));
    if is_admin {
        tracing::debug!(user = name, zone = %zone, "refusing rodsadmin downgrade");
        return Err(ShellError::PermissionDenied {
            status: Status::SYS_NOT_ALLOWED,
            message: "Cannot downgrade another rodsadmin user in this zone",
        });
    }
    Ok(())
}

/// `suq`/`sgq name resource-or-total value`.
pub(crate) async fn set_quota(
    dispatcher: &mut Dispatcher<'_>,
    target: QuotaTarget,
    command: &Command,
) -> ShellResult<()> {
    let missing: Vec<&str> = [
        (command.arg(1), target.missing_name()),
        (command.arg(2), "ERROR: missing resource name parameter"),
        (command.arg(3), "ERROR: missing value parameter"),
    ]
    .into_iter()
    .filter(|(value, _)| value.is_empty())
    .map(|(_, message)| message)
    .collect();
    if !missing.is_empty() {
        return Err(ShellError::invalid(missing.join("\n")));
    }

    let args = AdminArgs::new([
        "set-quota",
        target.kind(),
        command.arg(1),
        command.arg(2),
        command.arg(3),
    ]);
    dispatcher.invoke(args, InvokeOptions::default()).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use strata_test_support::RecordingConnection;
    use strata_test_support::fixtures::{no_rows, page, rows};

    use crate::commands::testing::{run, settings};
    use crate::console::testing::ScriptedConsole;
    use crate::dispatch::{Outcome, SessionSettings};

    use super::*;

    #[tokio::test]
    async fn passwords_are_scrambled_with_the_session_password() {
        let mut connection = RecordingConnection::new("rods", "tempZone");
        let mut console = ScriptedConsole::default();
        run(&mut connection, &mut console, settings(), "moduser alice password s3cret").await;

        let sent = connection.general_admin_calls();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].get(3), "password");
        let scrambled = sent[0].get(4);
        assert_ne!(scrambled, "s3cret");
        assert!(scramble::decode(scrambled, "rods-password").starts_with("s3cret"));
        assert!(console.prompts.is_empty());
    }

    #[tokio::test]
    async fn password_key_is_prompted_when_not_configured() {
        let mut connection = RecordingConnection::new("rods", "tempZone");
        let mut console = ScriptedConsole::default().with_secret("typed-key");
        let settings = SessionSettings {
            password: None,
            ..settings()
        };
        run(&mut connection, &mut console, settings, "moduser alice password pw").await;
        assert_eq!(console.prompts, ["Enter your current password:"]);
        let sent = connection.general_admin_calls();
        assert!(scramble::decode(sent[0].get(4), "typed-key").starts_with("pw"));
    }

    #[tokio::test]
    async fn downgrading_a_local_admin_is_refused() {
        let mut connection = RecordingConnection::new("rods", "tempZone")
            .on_simple_query("zone_type_name", page(&["tempZone"]))
            .on_general_query("USER_TYPE = 'rodsadmin'", rows(&[["rods", "tempZone"], ["ops", "tempZone"]]));
        let mut console = ScriptedConsole::default();
        let (outcome, status) =
            run(&mut connection, &mut console, settings(), "moduser ops type rodsuser").await;
        assert_eq!(outcome, Outcome::Handled);
        assert_eq!(status, Status::SYS_NOT_ALLOWED);
        assert!(connection.general_admin_calls().is_empty());

        let (_, status) = run(
            &mut connection,
            &mut console,
            settings(),
            "moduser ops#otherZone type rodsuser",
        )
        .await;
        assert_eq!(status, Status::SUCCESS);
        assert_eq!(connection.general_admin_calls().len(), 1);
    }

    #[tokio::test]
    async fn promotions_and_other_options_skip_the_guard() {
        let mut connection = RecordingConnection::new("rods", "tempZone")
            .on_general_query("USER_TYPE = 'rodsadmin'", no_rows());
        let mut console = ScriptedConsole::default();
        run(&mut connection, &mut console, settings(), "moduser alice type rodsadmin").await;
        run(&mut connection, &mut console, settings(), "moduser alice comment hi").await;
        assert!(connection.general_queries().is_empty());
        assert_eq!(
            connection.general_admin_calls()[1],
            &AdminArgs::new(["modify", "user", "alice", "comment", "hi"])
        );

        run(&mut connection, &mut console, settings(), "moduser bob type groupadmin").await;
        assert_eq!(connection.general_admin_calls().len(), 3);
    }

    #[tokio::test]
    async fn quota_arguments_are_checked_locally() {
        let mut connection = RecordingConnection::new("rods", "tempZone");
        let mut console = ScriptedConsole::default();
        let (outcome, status) = run(&mut connection, &mut console, settings(), "suq alice").await;
        assert_eq!(outcome, Outcome::Invalid);
        assert_eq!(status, Status::SYS_INVALID_INPUT_PARAM);
        assert_eq!(connection.remote_call_count(), 0);

        run(&mut connection, &mut console, settings(), "sgq staff total 1000").await;
        assert_eq!(
            connection.general_admin_calls(),
            [&AdminArgs::new(["set-quota", "group", "staff", "total", "1000"])]
        );
    }

    #[test]
    fn missing_quota_parameters_are_listed_in_order() {
        assert_eq!(QuotaTarget::Group.missing_name(), "ERROR: missing group name parameter");
        assert_eq!(QuotaTarget::User.kind(), "user");
    }
}
