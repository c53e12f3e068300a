//! Argument parsing, session setup and exit codes.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, anyhow};
use clap::Parser;
use strata_client::{ClientError, Connection, HttpConnection, HttpConnector};

use crate::commands::local;
use crate::config::{self, Overrides};
use crate::console::{Console, StdConsole};
use crate::dispatch::{self, Dispatcher, Handler, SessionSettings};
use crate::help;
use crate::output;
use crate::shell;
use crate::telemetry::{self, LogFormat};
use crate::tokenizer::Command;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Parser, Debug)]
#[command(
    name = "strata-admin",
    about = "Administrative shell for a Strata zone",
    disable_version_flag = true
)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    #[arg(long, env = "STRATA_HOST")]
    host: Option<String>,
    #[arg(long, env = "STRATA_PORT")]
    port: Option<u16>,
    #[arg(long, env = "STRATA_USER")]
    user: Option<String>,
    #[arg(long, env = "STRATA_ZONE")]
    zone: Option<String>,
    #[arg(long, env = "STRATA_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    #[arg(long, env = "STRATA_ENVIRONMENT_FILE")]
    environment_file: Option<PathBuf>,
    #[arg(long, env = "STRATA_HTTP_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,
    /// Run low-level verbs such as mkdir.
    #[arg(short, long)]
    force: bool,
    /// Check resource removal without applying it.
    #[arg(long = "dryrun")]
    dry_run: bool,
    #[arg(short, long)]
    verbose: bool,
    /// Echo each command and generated query.
    #[arg(short = 'V', long)]
    very_verbose: bool,
    /// A single command to run; without one the shell prompts for commands.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            zone: self.zone.clone(),
            environment_file: self.environment_file.clone(),
            timeout: Duration::from_secs(self.timeout),
        }
    }
}

/// Failures that prevent a session from starting.
#[derive(Debug)]
enum SessionError {
    Environment(anyhow::Error),
    Authentication(anyhow::Error),
}

impl SessionError {
    const fn exit_code(&self) -> i32 {
        match self {
            Self::Environment(_) => 2,
            Self::Authentication(_) => 3,
        }
    }

    fn display_message(&self) -> String {
        match self {
            Self::Environment(error) | Self::Authentication(error) => format!("{error:#}"),
        }
    }
}

/// Parses arguments, opens a session and runs the shell.
/// Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let (command, lifted) = lift_flags(&cli.command);
    let flags = lifted.merge(&cli);
    let level = telemetry::default_level(flags.verbose, flags.very_verbose);
    if let Err(err) = telemetry::init(level, LogFormat::from_env()) {
        eprintln!("warning: {err:#}");
    }

    let mut console = StdConsole;
    if let Some(code) = run_offline(&command, &mut console) {
        return code;
    }

    let (mut connection, password) = match open_session(&cli, &mut console).await {
        Ok(session) => session,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            return err.exit_code();
        }
    };

    let settings = SessionSettings {
        force: flags.force,
        dry_run: flags.dry_run,
        very_verbose: flags.very_verbose,
        zone: connection.client_user().zone.clone(),
        password: Some(password),
    };
    let interactive = command.verb().is_empty();
    let status = {
        let mut dispatcher = Dispatcher::new(&mut connection, &mut console, settings);
        shell::run(&mut dispatcher, command, interactive).await
    };

    output::drain_error_stack(&mut connection);
    if let Err(err) = connection.disconnect().await {
        tracing::warn!(error = %err, "failed to close session");
    }
    shell::exit_code(status)
}

/// Global switches, wherever they appeared on the command line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
struct Flags {
    force: bool,
    dry_run: bool,
    verbose: bool,
    very_verbose: bool,
}

impl Flags {
    const fn merge(self, cli: &Cli) -> Self {
        Self {
            force: self.force || cli.force,
            dry_run: self.dry_run || cli.dry_run,
            verbose: self.verbose || cli.verbose,
            very_verbose: self.very_verbose || cli.very_verbose,
        }
    }

    fn take(&mut self, word: &str) -> bool {
        let slot = match word {
            "-f" | "--force" => &mut self.force,
            "--dryrun" => &mut self.dry_run,
            "-v" | "--verbose" => &mut self.verbose,
            "-V" | "--very-verbose" => &mut self.very_verbose,
            _ => return false,
        };
        *slot = true;
        true
    }
}

/// Lift global switches that follow the verb out of the command words.
///
/// Words after a bare `--` are kept as they are.
fn lift_flags(words: &[String]) -> (Command, Flags) {
    let mut flags = Flags::default();
    let mut kept = Vec::with_capacity(words.len());
    let mut literal = false;
    for (index, word) in words.iter().enumerate() {
        if literal || index == 0 {
            kept.push(word.clone());
        } else if word == "--" {
            literal = true;
        } else if !flags.take(word) {
            kept.push(word.clone());
        }
    }
    (Command::from_words(kept), flags)
}

/// Verbs that never need the service run before connecting.
fn run_offline(command: &Command, console: &mut dyn Console) -> Option<i32> {
    match dispatch::lookup(command.verb())? {
        Handler::Help => {
            help::print_usage(command.arg(1));
            Some(0)
        }
        Handler::Local(verb) => Some(match local::run(verb, command, console) {
            Ok(()) => 0,
            Err(err) => {
                eprintln!("{err}");
                shell::exit_code(err.status())
            }
        }),
        _ => None,
    }
}

async fn open_session(
    cli: &Cli,
    console: &mut dyn Console,
) -> Result<(HttpConnection, String), SessionError> {
    let config = config::resolve(&cli.overrides())
        .context("unable to determine the client environment")
        .map_err(SessionError::Environment)?;
    tracing::debug!(endpoint = %config.base_url, user = %config.user, zone = %config.zone, "connecting");

    let connector = HttpConnector::new(config).map_err(|err| SessionError::Environment(err.into()))?;
    let info = connector
        .probe()
        .await
        .map_err(|err| SessionError::Environment(err.into()))?;
    tracing::debug!(version = %info.version, "server reachable");

    let password = match &cli.password {
        Some(password) => password.clone(),
        None => console
            .read_secret("Enter your current password:")
            .context("failed to read password")
            .map_err(SessionError::Environment)?,
    };

    match connector.login(&password).await {
        Ok(connection) => Ok((connection, password)),
        Err(err @ ClientError::Authentication { .. }) => Err(SessionError::Authentication(
            anyhow!(err).context("login rejected"),
        )),
        Err(err) => Err(SessionError::Environment(err.into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    use crate::console::testing::ScriptedConsole;

    #[test]
    fn clap_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn trailing_words_form_the_command() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "strata-admin",
            "--host",
            "catalog",
            "-V",
            "moduser",
            "alice",
            "password",
            "-secret-",
        ])?;
        assert!(cli.very_verbose);
        assert_eq!(cli.host.as_deref(), Some("catalog"));
        assert_eq!(cli.command, ["moduser", "alice", "password", "-secret-"]);
        assert_eq!(cli.overrides().timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        Ok(())
    }

    fn lifted(args: &[&str]) -> anyhow::Result<(Vec<String>, Flags)> {
        let cli = Cli::try_parse_from(args.iter().copied())?;
        let (command, flags) = lift_flags(&cli.command);
        let words = command.words().map(String::from).collect();
        Ok((words, flags.merge(&cli)))
    }

    #[test]
    fn mkdir_force_can_follow_the_verb() -> anyhow::Result<()> {
        let (words, flags) = lifted(&["strata-admin", "mkdir", "-f", "/tempZone/x"])?;
        assert!(flags.force);
        assert_eq!(words, ["mkdir", "/tempZone/x"]);
        Ok(())
    }

    #[test]
    fn dryrun_is_read_on_either_side_of_the_resource() -> anyhow::Result<()> {
        for args in [
            ["strata-admin", "--dryrun", "rmresc", "demo"],
            ["strata-admin", "rmresc", "--dryrun", "demo"],
            ["strata-admin", "rmresc", "demo", "--dryrun"],
        ] {
            let (words, flags) = lifted(&args)?;
            assert!(flags.dry_run, "{args:?}");
            assert!(!flags.force);
            assert_eq!(words, ["rmresc", "demo"], "{args:?}");
        }
        Ok(())
    }

    #[test]
    fn verbosity_after_the_verb_is_lifted() -> anyhow::Result<()> {
        let (words, flags) = lifted(&["strata-admin", "lu", "-V", "alice", "-v"])?;
        assert!(flags.verbose && flags.very_verbose);
        assert_eq!(words, ["lu", "alice"]);
        Ok(())
    }

    #[test]
    fn only_exact_switches_are_lifted() -> anyhow::Result<()> {
        let (words, flags) = lifted(&[
            "strata-admin",
            "moduser",
            "alice",
            "password",
            "-secret-",
        ])?;
        assert_eq!(flags, Flags::default());
        assert_eq!(words, ["moduser", "alice", "password", "-secret-"]);

        let (words, flags) = lifted(&["strata-admin", "moduser", "alice", "password", "--", "-f"])?;
        assert!(!flags.force);
        assert_eq!(words, ["moduser", "alice", "password", "-f"]);
        Ok(())
    }

    #[test]
    fn offline_verbs_do_not_need_a_session() {
        let mut console = ScriptedConsole::default();
        assert_eq!(
            run_offline(&Command::from_words(["help", "lu"]), &mut console),
            Some(0)
        );
        assert_eq!(
            run_offline(&Command::from_words(["spass", "pw", "key"]), &mut console),
            Some(0)
        );
        assert_eq!(
            run_offline(&Command::from_words(["ctime", "bogus"]), &mut console),
            Some(4)
        );
        assert_eq!(run_offline(&Command::from_words(["lu"]), &mut console), None);
        assert_eq!(run_offline(&Command::default(), &mut console), None);
    }

    #[test]
    fn session_errors_map_to_exit_codes() {
        assert_eq!(SessionError::Environment(anyhow!("x")).exit_code(), 2);
        assert_eq!(SessionError::Authentication(anyhow!("x")).exit_code(), 3);
        assert_eq!(
            SessionError::Environment(anyhow!("outer").context("ctx")).display_message(),
            "ctx: outer"
        );
    }
}
