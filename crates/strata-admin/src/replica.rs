//! `ls` and `modrepl`: inspect and rewrite the catalog entry of one replica.
//!
//! Syntax for both verbs:
//!
//! ```text
//! ls      (logical_path <path> | data_id <id>) (replica_number <n> | resource_hierarchy <hier>)
//! modrepl (logical_path <path> | data_id <id>) (replica_number <n> | resource_hierarchy <hier>) ATTR VALUE
//! ```

use std::collections::BTreeMap;

use strata_client::{Connection, DataObjectRef, ReplicaModification, ReplicaRef, Status};

use crate::error::{ShellError, ShellResult};
use crate::output;
use crate::registry::{self, ADMIN_OVERRIDE_KEY};
use crate::tokenizer::Command;

const LS_ARITY: usize = 5;
const MODREPL_ARITY: usize = 7;

fn require_arity(command: &Command, expected: usize) -> ShellResult<()> {
    if command.words().count() < expected {
        return Err(ShellError::invalid(
            "Input arguments do not match expected values.",
        ));
    }
    Ok(())
}

/// Interpret a data-object selector.
pub(crate) fn resolve_data_object(kind: &str, value: &str) -> ShellResult<DataObjectRef> {
    match kind {
        "data_id" => value
            .parse()
            .map(DataObjectRef::Id)
            .map_err(|_| ShellError::invalid(format!("Invalid input [{value}] for data_id."))),
        "logical_path" => normalize_logical_path(value).map(DataObjectRef::Path),
        _ => Err(ShellError::invalid("Invalid data object option specified.")),
    }
}

/// Interpret a replica selector.
pub(crate) fn resolve_replica(kind: &str, value: &str) -> ShellResult<ReplicaRef> {
    match kind {
        "replica_number" => value.parse().map(ReplicaRef::Number).map_err(|_| {
            ShellError::invalid(format!("Invalid input [{value}] for replica_number."))
        }),
        "resource_hierarchy" => Ok(ReplicaRef::Hierarchy(value.to_string())),
        _ => Err(ShellError::invalid("Invalid replica option specified.")),
    }
}

/// Lexically normalise an absolute logical path that names an object.
pub(crate) fn normalize_logical_path(path: &str) -> ShellResult<String> {
    if !path.starts_with('/') {
        return Err(ShellError::invalid(
            "Provided logical_path must be absolute.",
        ));
    }
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        return Err(ShellError::invalid(
            "Provided logical_path must name a data object.",
        ));
    }
    Ok(format!("/{}", segments.join("/")))
}

fn split_path(path: &str) -> (&str, &str) {
    match path.rsplit_once('/') {
        Some(("", name)) => ("/", name),
        Some((parent, name)) => (parent, name),
        None => ("/", path),
    }
}

/// General query selecting every registry attribute of one replica.
pub(crate) fn build_ls_query(object: &DataObjectRef, replica: &ReplicaRef) -> String {
    let columns = registry::public_names().collect::<Vec<_>>().join(", ");
    let object_predicate = match object {
        DataObjectRef::Id(id) => format!("DATA_ID = '{id}'"),
        DataObjectRef::Path(path) => {
            let (parent, name) = split_path(path);
            format!("COLL_NAME = '{parent}' and DATA_NAME = '{name}'")
        }
    };
    let replica_predicate = match replica {
        ReplicaRef::Number(number) => format!("DATA_REPL_NUM = '{number}'"),
        ReplicaRef::Hierarchy(hierarchy) => format!("DATA_RESC_HIER = '{hierarchy}'"),
    };
    format!("select {columns} where {object_predicate} and {replica_predicate}")
}

/// `NAME: value` lines for each row, columns in registry order.
pub(crate) fn render_rows(rows: &[Vec<String>]) -> Vec<String> {
    rows.iter()
        .flat_map(|row| {
            registry::public_names()
                .zip(row)
                .map(|(name, value)| format!("{name}: {value}"))
        })
        .collect()
}

/// Run `ls` and print the matching replica's attributes.
pub(crate) async fn list_replica(
    connection: &mut dyn Connection,
    command: &Command,
    very_verbose: bool,
) -> ShellResult<()> {
    require_arity(command, LS_ARITY)?;
    let object = resolve_data_object(command.arg(1), command.arg(2))?;
    let replica = resolve_replica(command.arg(3), command.arg(4))?;
    let query = build_ls_query(&object, &replica);
    if very_verbose {
        println!("query:[{query}]");
    }

    let zone = connection.client_user().zone.clone();
    let reply = connection.general_query(&query, Some(&zone)).await?;
    if reply.status == Status::CAT_NO_ROWS_FOUND || (reply.status.is_success() && reply.rows.is_empty()) {
        return Err(ShellError::NotFound {
            message: "No results found.",
        });
    }
    if reply.status.is_failure() {
        output::drain_error_stack(connection);
        return Err(ShellError::RemoteFailure {
            operation: "replica query",
            status: reply.status,
        });
    }
    for line in render_rows(&reply.rows) {
        println!("{line}");
    }
    Ok(())
}

/// Run `modrepl`, returning the status reported by the service.
pub(crate) async fn modify_replica(
    connection: &mut dyn Connection,
    command: &Command,
) -> ShellResult<Status> {
    require_arity(command, MODREPL_ARITY)?;
    let data_object = resolve_data_object(command.arg(1), command.arg(2))?;
    let replica = resolve_replica(command.arg(3), command.arg(4))?;
    let key = registry::resolve_modifiable_attribute(command.arg(5))?;

    let attributes = BTreeMap::from([
        (key.to_string(), command.arg(6).to_string()),
        (ADMIN_OVERRIDE_KEY.to_string(), String::new()),
    ]);
    let request = ReplicaModification {
        data_object,
        replica,
        attributes,
    };
    tracing::debug!(attribute = key, "modifying replica");

    let status = connection.modify_replica(&request).await?;
    if status != Status::SUCCESS {
        let name = status.name().unwrap_or("UNKNOWN_STATUS");
        eprintln!("modify replica failed: [{name} ({})]", status.0);
        output::drain_error_stack(connection);
    }
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use strata_test_support::fixtures::{no_rows, rows};
    use strata_test_support::{RecordingConnection, Scripted};

    use crate::tokenizer::tokenize;

    fn command(line: &str) -> Command {
        tokenize(line, crate::tokenizer::MAX_TOKENS)
    }

    #[test]
    fn data_object_selectors() -> ShellResult<()> {
        assert_eq!(resolve_data_object("data_id", "10101")?, DataObjectRef::Id(10101));
        assert!(resolve_data_object("data_id", "12x").is_err());
        assert_eq!(
            resolve_data_object("logical_path", "/tempZone//home/./rods/../rods/a.txt/")?,
            DataObjectRef::Path("/tempZone/home/rods/a.txt".into())
        );
        assert!(resolve_data_object("logical_path", "relative/a.txt").is_err());
        assert!(resolve_data_object("logical_path", "/").is_err());
        assert!(resolve_data_object("path", "/tempZone/a").is_err());
        Ok(())
    }

    #[test]
    fn replica_selectors() -> ShellResult<()> {
        assert_eq!(resolve_replica("replica_number", "2")?, ReplicaRef::Number(2));
        assert!(resolve_replica("replica_number", "two").is_err());
        assert_eq!(
            resolve_replica("resource_hierarchy", "root;leaf")?,
            ReplicaRef::Hierarchy("root;leaf".into())
        );
        assert!(resolve_replica("replica", "1").is_err());
        Ok(())
    }

    #[test]
    fn ls_query_by_path_and_number() {
        let query = build_ls_query(
            &DataObjectRef::Path("/tempZone/home/rods/a.txt".into()),
            &ReplicaRef::Number(0),
        );
        assert!(query.starts_with("select COLL_ID, DATA_CREATE_TIME, DATA_CHECKSUM,"));
        assert!(query.ends_with(
            "where COLL_NAME = '/tempZone/home/rods' and DATA_NAME = 'a.txt' and DATA_REPL_NUM = '0'"
        ));
    }

    #[test]
    fn ls_query_by_id_and_hierarchy() {
        let query = build_ls_query(&DataObjectRef::Id(7), &ReplicaRef::Hierarchy("a;b".into()));
        assert!(query.ends_with("where DATA_ID = '7' and DATA_RESC_HIER = 'a;b'"));
    }

    #[test]
    fn objects_directly_under_root_use_root_collection() {
        let query = build_ls_query(&DataObjectRef::Path("/a".into()), &ReplicaRef::Number(1));
        assert!(query.contains("COLL_NAME = '/' and DATA_NAME = 'a'"));
    }

    #[test]
    fn rows_render_in_registry_order() {
        let lines = render_rows(&[vec!["1".into(), "0160".into()]]);
        assert_eq!(lines, ["COLL_ID: 1", "DATA_CREATE_TIME: 0160"]);
    }

    #[tokio::test]
    async fn ls_sends_zone_hint() -> Result<()> {
        let mut connection = RecordingConnection::new("rods", "tempZone")
            .on_general_query("select", rows(&[["1", "2"]]));
        list_replica(
            &mut connection,
            &command("ls data_id 10 replica_number 0"),
            false,
        )
        .await?;
        assert_eq!(
            connection.calls()[0],
            strata_test_support::Call::GeneralQuery {
                query: build_ls_query(&DataObjectRef::Id(10), &ReplicaRef::Number(0)),
                zone_hint: Some("tempZone".into()),
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn ls_with_no_rows_is_informational() {
        let mut connection =
            RecordingConnection::new("rods", "tempZone").on_general_query("select", no_rows());
        let result = list_replica(
            &mut connection,
            &command("ls logical_path /tempZone/a replica_number 0"),
            false,
        )
        .await;
        assert!(matches!(result, Err(ShellError::NotFound { .. })));
    }

    #[tokio::test]
    async fn ls_failure_is_remote() {
        let mut connection = RecordingConnection::new("rods", "tempZone").on_general_query(
            "select",
            strata_client::GeneralQueryReply {
                status: Status::SYS_NO_API_PRIV,
                rows: Vec::new(),
            },
        );
        let result = list_replica(
            &mut connection,
            &command("ls data_id 1 replica_number 0"),
            false,
        )
        .await;
        assert!(matches!(
            result,
            Err(ShellError::RemoteFailure {
                status: Status::SYS_NO_API_PRIV,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn short_or_invalid_input_never_reaches_the_service() {
        let mut connection = RecordingConnection::new("rods", "tempZone");
        for line in [
            "ls data_id 1 replica_number",
            "ls data_id x replica_number 0",
            "modrepl data_id 1 replica_number 0 DATA_COMMENTS",
            "modrepl data_id 1 replica_number 0 DATA_NAME renamed",
            "modrepl data_id 1 replica_number 0 NOT_AN_ATTR v",
            "modrepl logical_path relative replica_number 0 DATA_SIZE 1",
        ] {
            let command = command(line);
            let result = if command.verb() == "ls" {
                list_replica(&mut connection, &command, false).await
            } else {
                modify_replica(&mut connection, &command).await.map(|_| ())
            };
            assert!(result.is_err(), "{line} should be refused");
        }
        assert_eq!(connection.remote_call_count(), 0);
    }

    #[tokio::test]
    async fn modrepl_tells_bad_input_from_bad_attributes() {
        let mut connection = RecordingConnection::new("rods", "tempZone");
        let result = modify_replica(
            &mut connection,
            &command("modrepl data_id abc replica_number 0 DATA_SIZE 10"),
        )
        .await;
        assert!(matches!(result, Err(ShellError::InvalidArgument(_))));

        let result = modify_replica(
            &mut connection,
            &command("modrepl logical_path /zone/home/a.txt replica_number 0 DATA_ID 5"),
        )
        .await;
        assert!(matches!(
            result,
            Err(ShellError::InvalidAttribute { ref name }) if name == "DATA_ID"
        ));
        assert_eq!(connection.remote_call_count(), 0);
    }

    #[tokio::test]
    async fn modrepl_sends_key_and_admin_flag() -> Result<()> {
        let mut connection = RecordingConnection::new("rods", "tempZone");
        let status = modify_replica(
            &mut connection,
            &command("modrepl logical_path /tempZone/home/rods/a.txt resource_hierarchy 'root;leaf' DATA_COMMENTS 'new text'"),
        )
        .await?;
        assert_eq!(status, Status::SUCCESS);

        let sent = connection.replica_modifications();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].data_object,
            DataObjectRef::Path("/tempZone/home/rods/a.txt".into())
        );
        assert_eq!(sent[0].replica, ReplicaRef::Hierarchy("root;leaf".into()));
        assert_eq!(
            sent[0].attributes.get("dataComments").map(String::as_str),
            Some("new text")
        );
        assert_eq!(
            sent[0].attributes.get(ADMIN_OVERRIDE_KEY).map(String::as_str),
            Some("")
        );
        assert_eq!(sent[0].attributes.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn modrepl_failure_drains_diagnostics() -> Result<()> {
        let mut connection = RecordingConnection::new("rods", "tempZone").on_modify_replica(
            Scripted::new(Status::CAT_NO_ROWS_FOUND).with_error(Status::CAT_NO_ROWS_FOUND, "no replica"),
        );
        let status = modify_replica(
            &mut connection,
            &command("modrepl data_id 1 replica_number 3 DATA_SIZE 10"),
        )
        .await?;
        assert_eq!(status, Status::CAT_NO_ROWS_FOUND);
        assert!(connection.error_stack().is_empty());
        Ok(())
    }
}
