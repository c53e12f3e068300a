//! The read/dispatch loop.

use strata_client::Status;

use crate::console::Console;
use crate::dispatch::{Dispatcher, Outcome};
use crate::tokenizer::{Command, MAX_TOKENS, tokenize};

pub(crate) const PROMPT: &str = "strata-admin>";

/// Exit code for a session that ran commands.
pub(crate) fn exit_code(status: Status) -> i32 {
    if status.is_privilege_denial() {
        1
    } else if status.is_failure() {
        4
    } else {
        0
    }
}

/// Run `first`, then keep reading commands when the shell is interactive.
///
/// Batch mode (`interactive == false`) stops after the first command that
/// was not empty. Returns the status of the last command.
pub(crate) async fn run(
    dispatcher: &mut Dispatcher<'_>,
    first: Command,
    interactive: bool,
) -> Status {
    let mut command = first;
    let mut first_iteration = true;
    loop {
        let outcome = dispatcher.dispatch(&command).await;
        if outcome == Outcome::Quit {
            break;
        }
        if first_iteration
            && !interactive
            && matches!(outcome, Outcome::Handled | Outcome::Invalid)
        {
            break;
        }
        first_iteration = false;
        command = next_command(dispatcher.console());
    }
    dispatcher.last_status()
}

fn next_command(console: &mut dyn Console) -> Command {
    match console.read_line(PROMPT) {
        Ok(Some(line)) => tokenize(&line, MAX_TOKENS),
        Ok(None) => Command::quit(),
        Err(err) => {
            tracing::warn!(error = %err, "failed to read command");
            Command::quit()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_test_support::RecordingConnection;

    use crate::commands::testing::settings;
    use crate::console::testing::ScriptedConsole;

    #[tokio::test]
    async fn interactive_loop_runs_until_quit() {
        let mut connection = RecordingConnection::new("rods", "tempZone")
            .on_general_admin("rm zone", Status::CAT_INSUFFICIENT_PRIVILEGE_LEVEL);
        let mut console = ScriptedConsole::with_lines(["rmzone z2", "", "cu", "q", "cu"]);
        let mut dispatcher = Dispatcher::new(&mut connection, &mut console, settings());
        let status = run(&mut dispatcher, Command::default(), true).await;
        drop(dispatcher);

        assert_eq!(status, Status::SUCCESS);
        assert_eq!(connection.general_admin_calls().len(), 2);
        assert_eq!(console.prompts, [PROMPT, PROMPT, PROMPT, PROMPT]);
    }

    #[tokio::test]
    async fn end_of_input_quits() {
        let mut connection = RecordingConnection::new("rods", "tempZone")
            .on_general_admin("rm zone", Status::SYS_NO_API_PRIV);
        let mut console = ScriptedConsole::with_lines(["rmzone z2"]);
        let mut dispatcher = Dispatcher::new(&mut connection, &mut console, settings());
        let status = run(&mut dispatcher, Command::default(), true).await;
        assert_eq!(status, Status::SYS_NO_API_PRIV);
        assert_eq!(exit_code(status), 1);
    }

    #[tokio::test]
    async fn batch_mode_runs_one_command() {
        let mut connection = RecordingConnection::new("rods", "tempZone")
            .on_general_admin("rm zone", Status::CAT_INVALID_USER_TYPE);
        let mut console = ScriptedConsole::with_lines(["cu"]);
        let mut dispatcher = Dispatcher::new(&mut connection, &mut console, settings());
        let status = run(
            &mut dispatcher,
            Command::from_words(["rmzone", "z2"]),
            false,
        )
        .await;
        drop(dispatcher);

        assert_eq!(exit_code(status), 4);
        assert_eq!(connection.general_admin_calls().len(), 1);
        assert!(console.prompts.is_empty());
    }

    #[tokio::test]
    async fn batch_mode_stops_after_invalid_command() {
        let mut connection = RecordingConnection::new("rods", "tempZone");
        let mut console = ScriptedConsole::default();
        let mut dispatcher = Dispatcher::new(&mut connection, &mut console, settings());
        let status = run(&mut dispatcher, Command::from_words(["bogus"]), false).await;
        assert_eq!(status, Status::SYS_INVALID_INPUT_PARAM);
        assert_eq!(exit_code(status), 4);
        assert_eq!(exit_code(Status::SUCCESS), 0);
    }
}
