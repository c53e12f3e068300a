//! Catalog listings: users, tokens, resources, zones, groups, quotas.

use serde::Serialize;
use strata_client::{AdminArgs, SimpleQueryRequest, Status};

use super::{require_rodsadmin, split_user_name};
use crate::dispatch::{Dispatcher, Listing};
use crate::error::{ShellError, ShellResult};
use crate::output;
use crate::proxy::InvokeOptions;
use crate::tokenizer::Command;

const USER_AUTH: &str = "select user_name, user_auth_name from R_USER_AUTH, R_USER_MAIN \
     where R_USER_AUTH.user_id = R_USER_MAIN.user_id";

const RESOURCE_QUOTAS: &str = "select user_name, R_USER_MAIN.zone_name, resc_name, quota_limit, \
     quota_over, R_QUOTA_MAIN.modify_ts from R_QUOTA_MAIN, R_USER_MAIN, R_RESC_MAIN \
     where R_USER_MAIN.user_id = R_QUOTA_MAIN.user_id and R_RESC_MAIN.resc_id = R_QUOTA_MAIN.resc_id";

const GLOBAL_QUOTAS: &str = "select user_name, R_USER_MAIN.zone_name, quota_limit, quota_over, \
     R_QUOTA_MAIN.modify_ts from R_QUOTA_MAIN, R_USER_MAIN \
     where R_USER_MAIN.user_id = R_QUOTA_MAIN.user_id and R_QUOTA_MAIN.resc_id = 0";

pub(crate) async fn run(
    dispatcher: &mut Dispatcher<'_>,
    listing: Listing,
    command: &Command,
) -> ShellResult<()> {
    let (first, second) = (command.arg(1), command.arg(2));
    match listing {
        Listing::Users => list_users(dispatcher, first).await,
        Listing::UsersOfZone => list_users_of_zone(dispatcher, first, second).await,
        Listing::Tokens if first == "resc_type" => {
            let args = AdminArgs::new(["lt", "resc_type"]);
            dispatcher.invoke(args, InvokeOptions::default()).await;
            Ok(())
        }
        Listing::Tokens => list_tokens(dispatcher, first, second).await,
        Listing::Resources => {
            let request = if first.is_empty() {
                SimpleQueryRequest::new(1, "select resc_name from R_RESC_MAIN", Vec::new())
            } else {
                SimpleQueryRequest::new(
                    2,
                    "select * from R_RESC_MAIN where resc_name=?",
                    vec![first.to_string()],
                )
            };
            simple_query(dispatcher, request).await
        }
        Listing::Zones => {
            let request = if first.is_empty() {
                SimpleQueryRequest::new(1, "select zone_name from R_ZONE_MAIN", Vec::new())
            } else {
                SimpleQueryRequest::new(
                    2,
                    "select * from R_ZONE_MAIN where zone_name=?",
                    vec![first.to_string()],
                )
            };
            simple_query(dispatcher, request).await
        }
        Listing::Groups => list_groups(dispatcher, first).await,
        Listing::GroupDetails => {
            if first.is_empty() {
                return Err(ShellError::invalid(
                    "You must specify a group with the lgd command",
                ));
            }
            show_user(dispatcher, first).await
        }
        Listing::UserAuth => list_user_auth(dispatcher, first).await,
        Listing::UserAuthName => {
            let request = SimpleQueryRequest::new(
                1,
                format!("{USER_AUTH} and R_USER_AUTH.user_auth_name=?"),
                vec![first.to_string()],
            );
            simple_query(dispatcher, request).await
        }
        Listing::Quotas => list_quotas(dispatcher, first).await,
        Listing::DelayServer => delay_server_info(dispatcher).await,
    }
}

/// Print every page of a simple query.
///
/// An empty result is not an error: it prints `No rows found`.
pub(crate) async fn simple_query(
    dispatcher: &mut Dispatcher<'_>,
    mut request: SimpleQueryRequest,
) -> ShellResult<()> {
    tracing::trace!(sql = %request.sql, args = ?request.args, "simple query");
    let reply = dispatcher.connection().simple_query(&request).await?;
    if reply.status == Status::CAT_NO_ROWS_FOUND {
        println!("No rows found");
        return Ok(());
    }
    if reply.status.is_failure() {
        output::drain_error_stack(dispatcher.connection());
        return Err(ShellError::RemoteFailure {
            operation: "simple query",
            status: reply.status,
        });
    }
    print_page(&reply.out_buf);

    let mut control = reply.control;
    while control > 0 {
        tracing::debug!(control, "fetching next simple query page");
        request.control = control;
        let page = dispatcher.connection().simple_query(&request).await?;
        if page.status == Status::CAT_NO_ROWS_FOUND {
            break;
        }
        if page.status.is_failure() {
            return Err(ShellError::RemoteFailure {
                operation: "simple query",
                status: page.status,
            });
        }
        print_page(&page.out_buf);
        control = page.control;
    }
    Ok(())
}

fn print_page(buffer: &str) {
    for line in output::render_simple_query(buffer) {
        println!("{line}");
    }
}

async fn list_users(dispatcher: &mut Dispatcher<'_>, input: &str) -> ShellResult<()> {
    let (name, zone) = split_user_name(input)?;
    if zone.is_empty() {
        show_user(dispatcher, input).await
    } else {
        list_users_of_zone(dispatcher, zone, name).await
    }
}

async fn show_user(dispatcher: &mut Dispatcher<'_>, name: &str) -> ShellResult<()> {
    let request = if name.is_empty() {
        SimpleQueryRequest::new(
            1,
            "select user_name||'#'||zone_name from R_USER_MAIN where user_type_name != 'rodsgroup'",
            Vec::new(),
        )
    } else {
        SimpleQueryRequest::new(
            2,
            "select * from R_USER_MAIN where user_name=?",
            vec![name.to_string()],
        )
    };
    simple_query(dispatcher, request).await
}

async fn list_users_of_zone(
    dispatcher: &mut Dispatcher<'_>,
    zone: &str,
    user: &str,
) -> ShellResult<()> {
    let request = if user.is_empty() {
        SimpleQueryRequest::new(
            1,
            "select user_name from R_USER_MAIN where zone_name=? and user_type_name != 'rodsgroup'",
            vec![zone.to_string()],
        )
    } else {
        SimpleQueryRequest::new(
            2,
            "select * from R_USER_MAIN where user_name=? and zone_name=?",
            vec![user.to_string(), zone.to_string()],
        )
    };
    simple_query(dispatcher, request).await
}

async fn list_tokens(
    dispatcher: &mut Dispatcher<'_>,
    namespace: &str,
    name: &str,
) -> ShellResult<()> {
    let request = match (namespace.is_empty(), name.is_empty()) {
        (true, _) => SimpleQueryRequest::new(
            1,
            "select token_name from R_TOKN_MAIN where token_namespace = 'token_namespace'",
            Vec::new(),
        ),
        (false, true) => SimpleQueryRequest::new(
            1,
            "select token_name from R_TOKN_MAIN where token_namespace = ?",
            vec![namespace.to_string()],
        ),
        (false, false) => SimpleQueryRequest::new(
            2,
            "select * from R_TOKN_MAIN where token_namespace = ? and token_name like ?",
            vec![namespace.to_string(), name.to_string()],
        ),
    };
    simple_query(dispatcher, request).await
}

async fn list_user_auth(dispatcher: &mut Dispatcher<'_>, input: &str) -> ShellResult<()> {
    let request = if input.is_empty() {
        SimpleQueryRequest::new(1, USER_AUTH, Vec::new())
    } else {
        match split_user_name(input)? {
            (name, "") => SimpleQueryRequest::new(
                1,
                format!("{USER_AUTH} and R_USER_MAIN.user_name=?"),
                vec![name.to_string()],
            ),
            (name, zone) => SimpleQueryRequest::new(
                1,
                format!("{USER_AUTH} and R_USER_MAIN.user_name=? and R_USER_MAIN.zone_name=?"),
                vec![name.to_string(), zone.to_string()],
            ),
        }
    };
    simple_query(dispatcher, request).await
}

async fn list_groups(dispatcher: &mut Dispatcher<'_>, group: &str) -> ShellResult<()> {
    require_rodsadmin(dispatcher).await?;
    let query = if group.is_empty() {
        "select USER_NAME where USER_TYPE = 'rodsgroup'".to_string()
    } else {
        println!("Members of group {group}:");
        format!(
            "select USER_NAME, USER_ZONE where USER_TYPE != 'rodsgroup' and USER_GROUP_NAME = '{group}'"
        )
    };
    let reply = dispatcher.connection().general_query(&query, None).await?;
    if reply.status == Status::CAT_NO_ROWS_FOUND || (reply.status.is_success() && reply.rows.is_empty()) {
        eprintln!("No rows found");
        return Ok(());
    }
    if reply.status.is_failure() {
        output::drain_error_stack(dispatcher.connection());
        return Err(ShellError::RemoteFailure {
            operation: "group query",
            status: reply.status,
        });
    }
    for row in &reply.rows {
        println!("{}", row.join("#"));
    }
    Ok(())
}

async fn list_quotas(dispatcher: &mut Dispatcher<'_>, input: &str) -> ShellResult<()> {
    let target = if input.is_empty() {
        None
    } else {
        let (name, zone) = split_user_name(input)?;
        let zone = if zone.is_empty() {
            dispatcher.local_zone().await?
        } else {
            zone.to_string()
        };
        Some(vec![name.to_string(), zone])
    };

    if target.is_some() {
        println!("Per resource quotas (if any) for user/group {input}:");
    } else {
        println!("Per resource quotas (if any) for users/groups:");
    }
    let per_resource = simple_query(dispatcher, quota_request(RESOURCE_QUOTAS, target.clone())).await;

    if target.is_some() {
        println!("\nGlobal (total usage) quotas (if any) for user/group {input}:");
    } else {
        println!("\nGlobal (total usage) quotas (if any) for users/groups:");
    }
    let global = simple_query(dispatcher, quota_request(GLOBAL_QUOTAS, target)).await;
    per_resource.and(global)
}

fn quota_request(base: &str, target: Option<Vec<String>>) -> SimpleQueryRequest {
    match target {
        None => SimpleQueryRequest::new(2, base, Vec::new()),
        Some(args) => SimpleQueryRequest::new(
            2,
            format!("{base} and user_name=? and R_USER_MAIN.zone_name=?"),
            args,
        ),
    }
}

#[derive(Debug, Serialize)]
struct DelayServerInfo {
    leader: String,
    successor: String,
}

async fn delay_server_info(dispatcher: &mut Dispatcher<'_>) -> ShellResult<()> {
    require_rodsadmin(dispatcher).await?;
    let leader = delay_server_value(dispatcher, "leader").await?;
    let successor = delay_server_value(dispatcher, "successor").await?;
    match output::to_json_indented(&DelayServerInfo { leader, successor }) {
        Ok(text) => println!("{text}"),
        Err(err) => tracing::error!(error = %err, "failed to render delay server info"),
    }
    Ok(())
}

async fn delay_server_value(dispatcher: &mut Dispatcher<'_>, option: &str) -> ShellResult<String> {
    let reply = dispatcher
        .connection()
        .grid_configuration_value("delay_server", option)
        .await?;
    if reply.status.is_failure() {
        eprintln!("Failed to get delay server information.");
        return Err(ShellError::RemoteFailure {
            operation: "delay server lookup",
            status: reply.status,
        });
    }
    Ok(reply.value)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use strata_client::GridValue;
    use strata_test_support::fixtures::{failed_page, no_rows, page, page_with_cursor, rows};
    use strata_test_support::{Call, RecordingConnection, Scripted};

    use crate::commands::testing::{run, settings};
    use crate::console::testing::ScriptedConsole;
    use crate::dispatch::Outcome;

    use super::*;

    async fn queries_for(line: &str) -> Vec<SimpleQueryRequest> {
        let mut connection = RecordingConnection::new("rods", "tempZone")
            .on_simple_query("zone_type_name", page(&["tempZone"]));
        let mut console = ScriptedConsole::default();
        run(&mut connection, &mut console, settings(), line).await;
        connection.simple_queries().into_iter().cloned().collect()
    }

    #[tokio::test]
    async fn user_listings_pick_form_and_arguments() {
        let all = queries_for("lu").await;
        assert_eq!(all[0].form, 1);
        assert!(all[0].sql.contains("user_name||'#'||zone_name"));

        let one = queries_for("lu alice").await;
        assert_eq!(one[0].form, 2);
        assert_eq!(one[0].args, ["alice"]);

        let zoned = queries_for("lu alice#otherZone").await;
        assert_eq!(zoned[0].sql, "select * from R_USER_MAIN where user_name=? and zone_name=?");
        assert_eq!(zoned[0].args, ["alice", "otherZone"]);

        let zone = queries_for("luz otherZone").await;
        assert_eq!(zone[0].form, 1);
        assert_eq!(zone[0].args, ["otherZone"]);
    }

    #[tokio::test]
    async fn token_listings() {
        let namespaces = queries_for("lt").await;
        assert!(namespaces[0].sql.ends_with("token_namespace = 'token_namespace'"));
        let values = queries_for("lt data_type").await;
        assert_eq!(values[0].args, ["data_type"]);
        let detail = queries_for("lt data_type e%").await;
        assert_eq!(detail[0].form, 2);
        assert_eq!(detail[0].args, ["data_type", "e%"]);
    }

    #[tokio::test]
    async fn resource_zone_and_auth_listings() {
        assert_eq!(queries_for("lr").await[0].sql, "select resc_name from R_RESC_MAIN");
        assert_eq!(queries_for("lr demoResc").await[0].args, ["demoResc"]);
        assert_eq!(queries_for("lz").await[0].sql, "select zone_name from R_ZONE_MAIN");
        assert_eq!(queries_for("lz z2").await[0].form, 2);

        let auth = queries_for("lua alice#z2").await;
        assert!(auth[0].sql.ends_with("R_USER_MAIN.user_name=? and R_USER_MAIN.zone_name=?"));
        assert_eq!(auth[0].args, ["alice", "z2"]);
        assert!(queries_for("lua").await[0].args.is_empty());
        let by_name = queries_for("luan /CN=alice").await;
        assert!(by_name[0].sql.ends_with("R_USER_AUTH.user_auth_name=?"));
        assert_eq!(by_name[0].args, ["/CN=alice"]);
    }

    #[tokio::test]
    async fn quotas_use_the_local_zone_for_bare_names() {
        let all = queries_for("lq").await;
        assert_eq!(all.len(), 2);
        assert!(all[0].sql.contains("R_RESC_MAIN.resc_id"));
        assert!(all[1].sql.ends_with("R_QUOTA_MAIN.resc_id = 0"));

        let named = queries_for("lq alice").await;
        assert!(named[0].sql.contains("zone_type_name"));
        assert_eq!(named[1].args, ["alice", "tempZone"]);
        assert_eq!(named[2].args, ["alice", "tempZone"]);
    }

    #[tokio::test]
    async fn pages_follow_the_continuation_cursor() -> Result<()> {
        let mut connection = RecordingConnection::new("rods", "tempZone")
            .on_simple_query("R_RESC_MAIN", page_with_cursor(&["demoResc"], 7))
            .on_simple_query("R_RESC_MAIN", page(&["otherResc"]));
        let mut console = ScriptedConsole::default();
        let (outcome, status) = run(&mut connection, &mut console, settings(), "lr").await;
        assert_eq!((outcome, status), (Outcome::Handled, Status::SUCCESS));
        let controls: Vec<_> = connection.simple_queries().iter().map(|q| q.control).collect();
        assert_eq!(controls, [0, 7]);
        Ok(())
    }

    #[tokio::test]
    async fn empty_results_succeed_and_failures_are_recorded() {
        let mut console = ScriptedConsole::default();
        let mut connection = RecordingConnection::new("rods", "tempZone")
            .on_simple_query("R_ZONE_MAIN", failed_page(Status::CAT_NO_ROWS_FOUND));
        let (_, status) = run(&mut connection, &mut console, settings(), "lz").await;
        assert_eq!(status, Status::SUCCESS);

        let mut connection = RecordingConnection::new("rods", "tempZone").on_simple_query(
            "R_ZONE_MAIN",
            Scripted::new(failed_page(Status::CAT_INSUFFICIENT_PRIVILEGE_LEVEL))
                .with_error(Status::CAT_INSUFFICIENT_PRIVILEGE_LEVEL, "denied"),
        );
        let (outcome, status) = run(&mut connection, &mut console, settings(), "lz").await;
        assert_eq!(outcome, Outcome::Handled);
        assert_eq!(status, Status::CAT_INSUFFICIENT_PRIVILEGE_LEVEL);
        assert!(connection.calls().iter().all(|call| matches!(call, Call::SimpleQuery(_))));
    }

    #[tokio::test]
    async fn group_details_need_a_name() {
        let mut console = ScriptedConsole::default();
        let mut connection = RecordingConnection::new("rods", "tempZone");
        let (outcome, _) = run(&mut connection, &mut console, settings(), "lgd").await;
        assert_eq!(outcome, Outcome::Invalid);
        assert_eq!(connection.remote_call_count(), 0);
    }

    #[tokio::test]
    async fn groups_require_rodsadmin() {
        let mut console = ScriptedConsole::default();
        let mut connection = RecordingConnection::new("alice", "tempZone")
            .on_general_query("USER_TYPE where", rows(&[["rodsuser"]]));
        let (outcome, status) = run(&mut connection, &mut console, settings(), "lg").await;
        assert_eq!(outcome, Outcome::Handled);
        assert_eq!(status, Status::CAT_INSUFFICIENT_PRIVILEGE_LEVEL);
        assert_eq!(connection.general_queries().len(), 1);

        let mut connection = RecordingConnection::new("rods", "tempZone")
            .on_general_query("USER_TYPE where", rows(&[["rodsadmin"]]))
            .on_general_query("USER_GROUP_NAME", rows(&[["bob", "tempZone"]]));
        let (_, status) = run(&mut connection, &mut console, settings(), "lg staff").await;
        assert_eq!(status, Status::SUCCESS);
        assert!(connection.general_queries()[1].ends_with("USER_GROUP_NAME = 'staff'"));

        let mut connection = RecordingConnection::new("rods", "tempZone")
            .on_general_query("USER_TYPE where", rows(&[["rodsadmin"]]))
            .on_general_query("rodsgroup", no_rows());
        let (_, status) = run(&mut connection, &mut console, settings(), "lg").await;
        assert_eq!(status, Status::SUCCESS);
    }

    #[tokio::test]
    async fn delay_server_info_reads_both_options() {
        let mut console = ScriptedConsole::default();
        let mut connection = RecordingConnection::new("rods", "tempZone")
            .on_general_query("USER_TYPE where", rows(&[["rodsadmin"]]))
            .on_grid_value(
                "delay_server",
                "leader",
                GridValue {
                    status: Status::SUCCESS,
                    value: "host1".into(),
                },
            );
        let (_, status) = run(
            &mut connection,
            &mut console,
            settings(),
            "get_delay_server_info",
        )
        .await;
        assert_eq!(status, Status::SUCCESS);
        let options: Vec<_> = connection
            .calls()
            .iter()
            .filter_map(|call| match call {
                Call::GridConfiguration { option, .. } => Some(option.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(options, ["leader", "successor"]);

        let mut connection = RecordingConnection::new("rods", "tempZone")
            .on_general_query("USER_TYPE where", rows(&[["rodsadmin"]]))
            .on_grid_value(
                "delay_server",
                "leader",
                GridValue {
                    status: Status::SYS_NOT_ALLOWED,
                    value: String::new(),
                },
            );
        let (_, status) = run(
            &mut connection,
            &mut console,
            settings(),
            "get_delay_server_info",
        )
        .await;
        assert_eq!(status, Status::SYS_NOT_ALLOWED);
    }

    #[test]
    fn delay_server_info_renders_as_indented_json() -> Result<()> {
        let text = output::to_json_indented(&DelayServerInfo {
            leader: "a".into(),
            successor: String::new(),
        })?;
        assert_eq!(text, "{\n    \"leader\": \"a\",\n    \"successor\": \"\"\n}");
        Ok(())
    }
}
