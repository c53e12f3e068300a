//! Resource and collection administration.

use strata_client::{AdminArgs, Status};

use crate::console;
use crate::dispatch::Dispatcher;
use crate::error::ShellResult;
use crate::help;
use crate::proxy::InvokeOptions;
use crate::tokenizer::Command;

const RENAME_WARNING: &str = "\
If you rename a resource, clients that name it in their environment files and
any server configuration or rules that refer to it must be updated by hand.
The catalog tables that record the resource name are updated by this command.";

const DATA_PATHS_WARNING: &str = "\
This rewrites the physical path of every data object on the resource whose
path starts with the old path. Only do this after the files have really been
moved, or the catalog will no longer match the storage.";

const PATH_HINT: &str = "\
Modify resource path was successful.
If existing files have been physically moved, you may want to run
'strata-admin modrescdatapaths' with the old and new path.
See 'strata-admin help modrescdatapaths' for more information.";

const NO_UNUSED_METADATA: &str = "\
The return of CAT_SUCCESS_BUT_WITH_NO_INFO in this case means that the
SQL succeeded but there were no rows removed; there were no unused
AVUs to remove.";

/// `mkdir` is a low-level verb and only runs with `-f`.
pub(crate) async fn make_dir(dispatcher: &mut Dispatcher<'_>, command: &Command) -> ShellResult<()> {
    if !dispatcher.settings().force {
        help::print_usage("mkdir");
        return Ok(());
    }
    let args = AdminArgs::new(["add", "dir", command.arg(1), command.arg(2)]);
    dispatcher.invoke(args, InvokeOptions::default()).await;
    Ok(())
}

fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|ch| !ch.is_whitespace()).collect()
}

/// Lines printed before a resource is created, showing the values as typed.
fn creation_summary(command: &Command) -> Vec<String> {
    let location = command.arg(3);
    let (host, path) = location.split_once(':').unwrap_or((location, ""));
    vec![
        "Creating resource:".to_string(),
        format!("Name:\t\t\"{}\"", command.arg(1)),
        format!("Type:\t\t\"{}\"", command.arg(2)),
        format!("Host:\t\t\"{host}\""),
        format!("Path:\t\t\"{path}\""),
        format!("Context:\t\"{}\"", command.arg(4)),
    ]
}

pub(crate) async fn make_resource(dispatcher: &mut Dispatcher<'_>, command: &Command) -> ShellResult<()> {
    let resource_type = strip_whitespace(command.arg(2));
    for line in creation_summary(command) {
        println!("{line}");
    }

    let args = AdminArgs::new([
        "add",
        "resource",
        command.arg(1),
        resource_type.as_str(),
        command.arg(3),
        command.arg(4),
        command.arg(5),
        command.arg(6),
        command.arg(7),
        command.arg(8),
    ]);
    dispatcher.invoke(args, InvokeOptions::default()).await;
    Ok(())
}

pub(crate) async fn modify_resource(dispatcher: &mut Dispatcher<'_>, command: &Command) -> ShellResult<()> {
    let (name, option) = (command.arg(1), command.arg(2));
    let value = match option {
        "name" => {
            println!("{RENAME_WARNING}");
            let prompt =
                "Do you really want to modify the resource name? (enter y or yes to do so):";
            if !console::confirm(dispatcher.console(), prompt)? {
                println!("Resource rename aborted");
                return Ok(());
            }
            println!("OK, performing the resource rename");
            command.arg(3).to_string()
        }
        "type" => strip_whitespace(command.arg(3)),
        _ => command.arg(3).to_string(),
    };

    let args = AdminArgs::new(["modify", "resource", name, option, value.as_str()]);
    let status = dispatcher.invoke(args, InvokeOptions::default()).await;
    if option == "path" && status == Status::SUCCESS {
        println!("{PATH_HINT}");
    }
    Ok(())
}

pub(crate) async fn modify_resource_data_paths(
    dispatcher: &mut Dispatcher<'_>,
    command: &Command,
) -> ShellResult<()> {
    println!("{DATA_PATHS_WARNING}");
    if !console::confirm(
        dispatcher.console(),
        "Are you sure you want to run this command? [y/N]:",
    )? {
        return Ok(());
    }
    println!("OK, performing the resource data paths update");
    let args = AdminArgs::new([
        "modify",
        "resourcedatapaths",
        command.arg(1),
        command.arg(2),
        command.arg(3),
        command.arg(4),
    ]);
    dispatcher.invoke(args, InvokeOptions::default()).await;
    Ok(())
}

pub(crate) async fn remove_resource(dispatcher: &mut Dispatcher<'_>, command: &Command) -> ShellResult<()> {
    let args = AdminArgs::new([
        "rm",
        "resource",
        command.arg(1),
        command.arg(2),
        command.arg(3),
        command.arg(4),
        command.arg(5),
        command.arg(6),
    ]);
    let options = InvokeOptions {
        fallback: false,
        dry_run: dispatcher.settings().dry_run,
    };
    dispatcher.invoke(args, options).await;
    Ok(())
}

/// `rum`: an empty sweep is reported as success.
pub(crate) async fn remove_unused_metadata(dispatcher: &mut Dispatcher<'_>) -> ShellResult<()> {
    let status = dispatcher
        .invoke(AdminArgs::new(["rm", "unusedAVUs"]), InvokeOptions::default())
        .await;
    if status == Status::CAT_SUCCESS_BUT_WITH_NO_INFO {
        println!("{NO_UNUSED_METADATA}");
        dispatcher.record(Status::SUCCESS);
    }
    Ok(())
}
