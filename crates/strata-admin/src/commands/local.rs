//! Verbs answered without the service: `spass`, `dspass`, `ctime`.

use chrono::Utc;

use crate::console::Console;
use crate::dispatch::LocalVerb;
use crate::error::{ShellError, ShellResult};
use crate::output;
use crate::scramble::{self, MAX_PASSWORD_LEN};
use crate::tokenizer::Command;

pub(crate) fn run(verb: LocalVerb, command: &Command, console: &mut dyn Console) -> ShellResult<()> {
    match verb {
        LocalVerb::Scramble => scramble_password(command.arg(1), command.arg(2)),
        LocalVerb::Descramble => {
            if command.arg(1).is_empty() {
                let scrambled = read_stdin_line(console)?;
                let key = read_stdin_line(console)?;
                descramble_password(&scrambled, &key)
            } else {
                descramble_password(command.arg(1), command.arg(2))
            }
        }
        LocalVerb::ConvertTime => convert_time(command),
    }
}

fn read_stdin_line(console: &mut dyn Console) -> ShellResult<String> {
    console
        .read_line("")
        .map(Option::unwrap_or_default)
        .map_err(ShellError::Console)
}

fn scramble_password(password: &str, key: &str) -> ShellResult<()> {
    if password.len() > MAX_PASSWORD_LEN - 2 {
        return Err(ShellError::invalid("Password exceeds maximum length"));
    }
    if key.is_empty() {
        println!("Warning, scramble key is null");
    }
    println!("Scrambled form is:{}", scramble::encode(password, key));
    Ok(())
}

fn descramble_password(scrambled: &str, key: &str) -> ShellResult<()> {
    if scrambled.len() > MAX_PASSWORD_LEN - 2 {
        return Err(ShellError::invalid(
            "Scrambled password exceeds maximum length",
        ));
    }
    if key.is_empty() {
        println!("Warning, scramble key is null");
    }
    println!("Unscrambled form is:{}", scramble::decode(scrambled, key));
    Ok(())
}

fn is_integer(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|byte| byte.is_ascii_digit())
}

/// Resolve a `ctime` invocation to the line it prints.
fn time_conversion(command: &Command) -> ShellResult<String> {
    match (command.arg(1), command.arg(2)) {
        ("now", _) => Ok(format!(
            "Current time as catalog integer time: {}",
            output::catalog_time(Utc::now().timestamp())
        )),
        ("str", text) => {
            let seconds = if is_integer(text) {
                text.to_string()
            } else {
                output::parse_local_time(text)
                    .map(output::catalog_time)
                    .ok_or_else(|| {
                        ShellError::invalid(format!(
                            "Invalid time '{text}', expected YYYY-MM-DD.hh:mm:ss"
                        ))
                    })?
            };
            Ok(format!("Converted to local catalog integer time: {seconds}"))
        }
        (value, _) => value
            .parse::<i64>()
            .ok()
            .filter(|_| is_integer(value))
            .map(|seconds| format!("Converted to local time: {}", output::format_local_time(seconds)))
            .ok_or_else(|| {
                ShellError::invalid("ctime needs an integer time, 'now', or 'str <time>'")
            }),
    }
}

fn convert_time(command: &Command) -> ShellResult<()> {
    println!("{}", time_conversion(command)?);
    Ok(())
}
