//! Verb table and per-command routing.
//!
//! Every verb maps to exactly one [`Handler`]. Handlers that need more than
//! a single administrative call live in `commands/`; verbs that are a plain
//! rearrangement of their tokens are described by an [`OpTemplate`].

use strata_client::{AdminArgs, Connection, SimpleQueryRequest, Status};

use crate::commands::{listing, local, resources, users, zones};
use crate::console::Console;
use crate::error::{ShellError, ShellResult};
use crate::help;
use crate::proxy::{self, InvokeOptions, OpTemplate, Slot};
use crate::replica;
use crate::tokenizer::Command;

/// Result of dispatching one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// The command was at least partially valid.
    Handled = 0,
    Quit = -1,
    /// The command was refused before reaching the service.
    Invalid = -2,
    Empty = -3,
}

/// Options fixed for the whole session.
#[derive(Debug, Clone, Default)]
pub(crate) struct SessionSettings {
    /// `-f`: allow low-level verbs such as `mkdir`.
    pub(crate) force: bool,
    /// `--dryrun`: validate resource removal without applying it.
    pub(crate) dry_run: bool,
    /// `-V`: echo commands and generated queries.
    pub(crate) very_verbose: bool,
    /// Zone from the client environment.
    pub(crate) zone: String,
    /// Password used to log in, reused as the scramble key for `moduser`.
    pub(crate) password: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Listing {
    Users,
    UsersOfZone,
    Tokens,
    Resources,
    Zones,
    Groups,
    GroupDetails,
    UserAuth,
    UserAuthName,
    Quotas,
    DelayServer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Guarded {
    ModifyUser,
    SetUserQuota,
    SetGroupQuota,
    MakeDir,
    MakeResource,
    ModifyResource,
    ModifyResourceDataPaths,
    RemoveResource,
    RemoveUnusedMetadata,
    ModifyZone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LocalVerb {
    Scramble,
    Descramble,
    ConvertTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReplicaVerb {
    List,
    Modify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Handler {
    Help,
    Quit,
    Listing(Listing),
    Proxied(OpTemplate),
    Local(LocalVerb),
    Replica(ReplicaVerb),
    Guarded(Guarded),
    Deprecated,
}

const fn lit(value: &'static str) -> Slot {
    Slot::Lit(value)
}

const fn arg(index: usize) -> Slot {
    Slot::Arg(index)
}

const E: Slot = Slot::Empty;

/// Every verb the shell understands, matched exactly and in order.
pub(crate) static VERBS: &[(&str, Handler)] = &[
    ("help", Handler::Help),
    ("h", Handler::Help),
    ("quit", Handler::Quit),
    ("q", Handler::Quit),
    ("lu", Handler::Listing(Listing::Users)),
    ("luz", Handler::Listing(Listing::UsersOfZone)),
    ("lt", Handler::Listing(Listing::Tokens)),
    ("lr", Handler::Listing(Listing::Resources)),
    ("ls", Handler::Replica(ReplicaVerb::List)),
    ("lz", Handler::Listing(Listing::Zones)),
    ("lg", Handler::Listing(Listing::Groups)),
    ("lgd", Handler::Listing(Listing::GroupDetails)),
    ("lrg", Handler::Deprecated),
    (
        "mkuser",
        Handler::Proxied(OpTemplate::new([
            lit("add"),
            lit("user"),
            arg(1),
            arg(2),
            E,
            arg(3),
            arg(4),
            arg(5),
        ])),
    ),
    ("moduser", Handler::Guarded(Guarded::ModifyUser)),
    (
        "aua",
        Handler::Proxied(OpTemplate::new([
            lit("modify"),
            lit("user"),
            arg(1),
            lit("addAuth"),
            arg(2),
            arg(3),
            arg(4),
            arg(5),
        ])),
    ),
    (
        "rua",
        Handler::Proxied(OpTemplate::new([
            lit("modify"),
            lit("user"),
            arg(1),
            lit("rmAuth"),
            arg(2),
            arg(3),
            arg(4),
            arg(5),
        ])),
    ),
    (
        "rpp",
        Handler::Proxied(OpTemplate::new([
            lit("modify"),
            lit("user"),
            arg(1),
            lit("rmPamPw"),
            arg(2),
            arg(3),
            arg(4),
            arg(5),
        ])),
    ),
    ("lua", Handler::Listing(Listing::UserAuth)),
    ("luan", Handler::Listing(Listing::UserAuthName)),
    ("cu", Handler::Proxied(OpTemplate::new([lit("calculate-usage")]))),
    ("suq", Handler::Guarded(Guarded::SetUserQuota)),
    ("sgq", Handler::Guarded(Guarded::SetGroupQuota)),
    ("lq", Handler::Listing(Listing::Quotas)),
    ("mkdir", Handler::Guarded(Guarded::MakeDir)),
    ("mkresc", Handler::Guarded(Guarded::MakeResource)),
    (
        "addchildtoresc",
        Handler::Proxied(OpTemplate::new([
            lit("add"),
            lit("childtoresc"),
            arg(1),
            arg(2),
            arg(3),
        ])),
    ),
    (
        "rmchildfromresc",
        Handler::Proxied(OpTemplate::new([
            lit("rm"),
            lit("childfromresc"),
            arg(1),
            arg(2),
        ])),
    ),
    (
        "modrescdatapaths",
        Handler::Guarded(Guarded::ModifyResourceDataPaths),
    ),
    ("modresc", Handler::Guarded(Guarded::ModifyResource)),
    (
        "mkzone",
        Handler::Proxied(OpTemplate::new([
            lit("add"),
            lit("zone"),
            arg(1),
            arg(2),
            arg(3),
            arg(4),
        ])),
    ),
    ("modzone", Handler::Guarded(Guarded::ModifyZone)),
    (
        "modzonecollacl",
        Handler::Proxied(OpTemplate::new([
            lit("modify"),
            lit("zonecollacl"),
            arg(1),
            arg(2),
            arg(3),
        ])),
    ),
    (
        "rmzone",
        Handler::Proxied(OpTemplate::new([lit("rm"), lit("zone"), arg(1)])),
    ),
    (
        "mkgroup",
        Handler::Proxied(OpTemplate::new([
            lit("add"),
            lit("user"),
            arg(1),
            lit("rodsgroup"),
        ])),
    ),
    (
        "rmgroup",
        Handler::Proxied(OpTemplate::new([
            lit("rm"),
            lit("user"),
            arg(1),
            Slot::EnvZone,
        ])),
    ),
    (
        "atg",
        Handler::Proxied(
            OpTemplate::new([
                lit("modify"),
                lit("group"),
                arg(1),
                lit("add"),
                arg(2),
                arg(3),
            ])
            .with_fallback(),
        ),
    ),
    (
        "rfg",
        Handler::Proxied(
            OpTemplate::new([
                lit("modify"),
                lit("group"),
                arg(1),
                lit("remove"),
                arg(2),
                arg(3),
            ])
            .with_fallback(),
        ),
    ),
    ("atrg", Handler::Deprecated),
    ("rfrg", Handler::Deprecated),
    ("rmresc", Handler::Guarded(Guarded::RemoveResource)),
    (
        "rmdir",
        Handler::Proxied(OpTemplate::new([
            lit("rm"),
            lit("dir"),
            arg(1),
            arg(2),
            arg(3),
            arg(4),
            arg(5),
            arg(6),
        ])),
    ),
    (
        "rmuser",
        Handler::Proxied(OpTemplate::new([
            lit("rm"),
            lit("user"),
            arg(1),
            arg(2),
            arg(3),
            arg(4),
            arg(5),
            arg(6),
        ])),
    ),
    (
        "at",
        Handler::Proxied(OpTemplate::new([
            lit("add"),
            lit("token"),
            arg(1),
            arg(2),
            arg(3),
            arg(4),
            arg(5),
            arg(6),
        ])),
    ),
    (
        "rt",
        Handler::Proxied(OpTemplate::new([
            lit("rm"),
            lit("token"),
            arg(1),
            arg(2),
            arg(3),
            arg(4),
            arg(5),
            arg(6),
        ])),
    ),
    ("spass", Handler::Local(LocalVerb::Scramble)),
    ("dspass", Handler::Local(LocalVerb::Descramble)),
    ("ctime", Handler::Local(LocalVerb::ConvertTime)),
    ("rum", Handler::Guarded(Guarded::RemoveUnusedMetadata)),
    (
        "asq",
        Handler::Proxied(OpTemplate::new([
            lit("add"),
            lit("specificQuery"),
            arg(1),
            arg(2),
        ])),
    ),
    (
        "rsq",
        Handler::Proxied(OpTemplate::new([
            lit("rm"),
            lit("specificQuery"),
            arg(1),
        ])),
    ),
    ("modrepl", Handler::Replica(ReplicaVerb::Modify)),
    (
        "get_delay_server_info",
        Handler::Listing(Listing::DelayServer),
    ),
    (
        "set_delay_server",
        Handler::Proxied(OpTemplate::new([lit("set_delay_server"), arg(1)])),
    ),
];

pub(crate) fn lookup(verb: &str) -> Option<Handler> {
    VERBS
        .iter()
        .find(|(name, _)| *name == verb)
        .map(|(_, handler)| *handler)
}

/// Routes commands to handlers over one authenticated connection.
pub(crate) struct Dispatcher<'a> {
    connection: &'a mut dyn Connection,
    console: &'a mut dyn Console,
    settings: SessionSettings,
    local_zone: Option<String>,
    last_status: Status,
}

impl<'a> Dispatcher<'a> {
    pub(crate) fn new(
        connection: &'a mut dyn Connection,
        console: &'a mut dyn Console,
        settings: SessionSettings,
    ) -> Self {
        Self {
            connection,
            console,
            settings,
            local_zone: None,
            last_status: Status::SUCCESS,
        }
    }

    /// Status left behind by the most recent command.
    pub(crate) const fn last_status(&self) -> Status {
        self.last_status
    }

    pub(crate) const fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub(crate) fn connection(&mut self) -> &mut dyn Connection {
        &mut *self.connection
    }

    pub(crate) fn console(&mut self) -> &mut dyn Console {
        &mut *self.console
    }

    pub(crate) const fn record(&mut self, status: Status) {
        self.last_status = status;
    }

    /// Send an administrative request and record its status.
    pub(crate) async fn invoke(&mut self, args: AdminArgs, options: InvokeOptions) -> Status {
        let status = proxy::invoke(&mut *self.connection, args, options).await;
        self.record(status);
        status
    }

    /// Name of the zone the server considers local, looked up once.
    pub(crate) async fn local_zone(&mut self) -> ShellResult<String> {
        if let Some(zone) = &self.local_zone {
            return Ok(zone.clone());
        }
        let request = SimpleQueryRequest::new(
            1,
            "select zone_name from R_ZONE_MAIN where zone_type_name=?",
            vec!["local".to_string()],
        );
        let reply = self.connection.simple_query(&request).await?;
        if reply.status.is_failure() {
            eprintln!("Error getting local zone");
            return Err(ShellError::RemoteFailure {
                operation: "local zone lookup",
                status: reply.status,
            });
        }
        let zone = reply
            .out_buf
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        tracing::debug!(zone = %zone, "resolved local zone");
        self.local_zone = Some(zone.clone());
        Ok(zone)
    }

    /// Run one command and classify the result.
    pub(crate) async fn dispatch(&mut self, command: &Command) -> Outcome {
        let verb = command.verb();
        if verb.is_empty() {
            return Outcome::Empty;
        }
        if self.settings.very_verbose {
            println!(
                "executing command: {}",
                command.words().collect::<Vec<_>>().join(" ")
            );
        }

        let Some(handler) = lookup(verb) else {
            eprintln!("unrecognized command, try 'help'");
            self.record(Status::SYS_INVALID_INPUT_PARAM);
            return Outcome::Invalid;
        };
        if handler == Handler::Quit {
            return Outcome::Quit;
        }

        self.record(Status::SUCCESS);
        tracing::debug!(verb, "dispatching command");
        match self.run(handler, command).await {
            Ok(()) => Outcome::Handled,
            Err(err) => self.fail(err),
        }
    }

    async fn run(&mut self, handler: Handler, command: &Command) -> ShellResult<()> {
        match handler {
            Handler::Help => {
                help::print_usage(command.arg(1));
                Ok(())
            }
            Handler::Quit => Ok(()),
            Handler::Listing(kind) => listing::run(self, kind, command).await,
            Handler::Proxied(template) => {
                let args = template.render(command, &self.settings.zone);
                self.invoke(
                    args,
                    InvokeOptions {
                        fallback: template.fallback,
                        dry_run: false,
                    },
                )
                .await;
                Ok(())
            }
            Handler::Local(kind) => local::run(kind, command, &mut *self.console),
            Handler::Replica(ReplicaVerb::List) => {
                let very_verbose = self.settings.very_verbose;
                replica::list_replica(&mut *self.connection, command, very_verbose).await
            }
            Handler::Replica(ReplicaVerb::Modify) => {
                let status = replica::modify_replica(&mut *self.connection, command).await?;
                self.record(status);
                Ok(())
            }
            Handler::Guarded(guarded) => self.run_guarded(guarded, command).await,
            Handler::Deprecated => {
                eprintln!(
                    "Resource groups are deprecated.\n\
                     Please investigate the available coordinating resource plugins.\n\
                     (e.g. random, replication, etc.)"
                );
                Ok(())
            }
        }
    }

    async fn run_guarded(&mut self, guarded: Guarded, command: &Command) -> ShellResult<()> {
        match guarded {
            Guarded::ModifyUser => users::modify_user(self, command).await,
            Guarded::SetUserQuota => users::set_quota(self, users::QuotaTarget::User, command).await,
            Guarded::SetGroupQuota => {
                users::set_quota(self, users::QuotaTarget::Group, command).await
            }
            Guarded::MakeDir => resources::make_dir(self, command).await,
            Guarded::MakeResource => resources::make_resource(self, command).await,
            Guarded::ModifyResource => resources::modify_resource(self, command).await,
            Guarded::ModifyResourceDataPaths => {
                resources::modify_resource_data_paths(self, command).await
            }
            Guarded::RemoveResource => resources::remove_resource(self, command).await,
            Guarded::RemoveUnusedMetadata => resources::remove_unused_metadata(self).await,
            Guarded::ModifyZone => zones::modify_zone(self, command).await,
        }
    }

    fn fail(&mut self, err: ShellError) -> Outcome {
        if let ShellError::NotFound { message } = err {
            println!("{message}");
            self.record(Status::SUCCESS);
            return Outcome::Handled;
        }
        let local = err.is_local();
        self.record(err.status());
        tracing::debug!(local, status = %err.status(), "command failed");
        eprintln!("{:#}", anyhow::Error::new(err));
        if local {
            Outcome::Invalid
        } else {
            Outcome::Handled
        }
    }
}
