//! Issues administrative requests, falling back to the legacy user API.

use strata_client::model::ADMIN_ARG_COUNT;
use strata_client::{AdminArgs, Connection, Status};

use crate::output;
use crate::tokenizer::Command;

/// Where one request slot takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Lit(&'static str),
    /// Token at this index of the typed command.
    Arg(usize),
    Empty,
    /// Zone of the configured client user.
    EnvZone,
}

/// Request layout for a verb that maps straight onto one admin call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OpTemplate {
    pub(crate) slots: [Slot; ADMIN_ARG_COUNT],
    pub(crate) fallback: bool,
}

impl OpTemplate {
    /// Template from leading slots; the rest are empty.
    pub(crate) const fn new<const N: usize>(leading: [Slot; N]) -> Self {
        let mut slots = [Slot::Empty; ADMIN_ARG_COUNT];
        let mut index = 0;
        while index < N && index < ADMIN_ARG_COUNT {
            slots[index] = leading[index];
            index += 1;
        }
        Self {
            slots,
            fallback: false,
        }
    }

    pub(crate) const fn with_fallback(mut self) -> Self {
        self.fallback = true;
        self
    }

    pub(crate) fn render(&self, command: &Command, env_zone: &str) -> AdminArgs {
        AdminArgs::new(self.slots.iter().map(|slot| match slot {
            Slot::Lit(value) => *value,
            Slot::Arg(index) => command.arg(*index),
            Slot::Empty => "",
            Slot::EnvZone => env_zone,
        }))
    }
}

/// Per-call switches.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct InvokeOptions {
    /// Retry through the user-admin call when the general call is refused
    /// with `SYS_NO_API_PRIV`.
    pub(crate) fallback: bool,
    /// Ask the service to validate without applying.
    pub(crate) dry_run: bool,
}

/// Send one administrative request and report its outcome.
///
/// The connection's error stack is printed and cleared exactly once,
/// whatever happened. Transport failures are reported here and come back as
/// the status they map to.
pub(crate) async fn invoke(
    connection: &mut dyn Connection,
    mut args: AdminArgs,
    options: InvokeOptions,
) -> Status {
    if options.dry_run {
        args.set(3, "--dryrun");
    }

    let (call, result) = match connection.general_admin(&args).await {
        Ok(status) if options.fallback && status == Status::SYS_NO_API_PRIV => {
            tracing::debug!("general admin refused; retrying through user admin");
            (
                "general admin and user admin",
                connection.user_admin(&args).await,
            )
        }
        other => ("general admin", other),
    };

    let status = match result {
        Ok(status) => status,
        Err(err) => {
            eprintln!("{call} failed: {err}");
            err.status()
        }
    };
    report(call, &args, status, options);
    output::drain_error_stack(connection);
    status
}

fn report(call: &str, args: &AdminArgs, status: Status, options: InvokeOptions) {
    if options.dry_run && args.get(0) == "rm" && args.get(1) == "resource" {
        let verdict = if status == Status::SUCCESS {
            "SUCCESS"
        } else {
            "FAILURE"
        };
        println!(
            "DRYRUN REMOVING RESOURCE [{} - {}] :: {verdict}",
            args.get(2),
            status.0
        );
    } else if status == Status::USER_INVALID_USERNAME_FORMAT {
        eprintln!("Invalid username format.");
    } else if status.is_failure() && status != Status::CAT_SUCCESS_BUT_WITH_NO_INFO {
        tracing::debug!(call, operation = args.get(0), target = args.get(1), %status, "admin call failed");
        eprintln!("{call} failed with error {status}");
        if status.base() == Status::CAT_INVALID_USER_TYPE {
            eprintln!("See 'lt user_type' for a list of valid user types.");
        }
    }
}
