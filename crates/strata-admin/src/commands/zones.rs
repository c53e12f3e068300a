//! Zone administration.

use strata_client::AdminArgs;

use crate::console;
use crate::dispatch::Dispatcher;
use crate::error::ShellResult;
use crate::proxy::InvokeOptions;
use crate::tokenizer::Command;

/// `modzone name option value`; renaming the local zone is confirmed first.
pub(crate) async fn modify_zone(dispatcher: &mut Dispatcher<'_>, command: &Command) -> ShellResult<()> {
    let (zone, option, value) = (command.arg(1), command.arg(2), command.arg(3));
    let args = if zone == dispatcher.settings().zone && option == "name" {
        let prompt = "Do you really want to modify the local zone name? (enter y or yes to do so):";
        if !console::confirm(dispatcher.console(), prompt)? {
            println!("Local zone rename aborted");
            return Ok(());
        }
        println!("OK, performing the local zone rename");
        AdminArgs::new(["modify", "localzonename", zone, value])
    } else {
        AdminArgs::new(["modify", "zone", zone, option, value])
    };
    dispatcher.invoke(args, InvokeOptions::default()).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use strata_test_support::RecordingConnection;

    use crate::commands::testing::{run, settings};
    use crate::console::testing::ScriptedConsole;

    use super::*;

    #[tokio::test]
    async fn local_zone_rename_is_confirmed_and_rewritten() {
        let mut connection = RecordingConnection::new("rods", "tempZone");
        let mut console = ScriptedConsole::with_lines(["no", "y"]);
        run(&mut connection, &mut console, settings(), "modzone tempZone name newZone").await;
        assert_eq!(connection.remote_call_count(), 0);
        run(&mut connection, &mut console, settings(), "modzone tempZone name newZone").await;
        assert_eq!(
            connection.general_admin_calls(),
            [&AdminArgs::new(["modify", "localzonename", "tempZone", "newZone"])]
        );
    }

    #[tokio::test]
    async fn remote_zones_are_modified_directly() {
        let mut connection = RecordingConnection::new("rods", "tempZone");
        let mut console = ScriptedConsole::default();
        run(&mut connection, &mut console, settings(), "modzone z2 name z3").await;
        run(&mut connection, &mut console, settings(), "modzone tempZone comment hi").await;
        assert_eq!(
            connection.general_admin_calls(),
            [
                &AdminArgs::new(["modify", "zone", "z2", "name", "z3"]),
                &AdminArgs::new(["modify", "zone", "tempZone", "comment", "hi"]),
            ]
        );
        assert!(console.prompts.is_empty());
    }
}
