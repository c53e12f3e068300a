//! Renderers and formatting helpers shared by the command handlers.

use chrono::{Local, NaiveDateTime, TimeZone};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use strata_client::Connection;

/// Display format for catalog timestamps.
pub(crate) const TIME_FORMAT: &str = "%Y-%m-%d.%H:%M:%S";

/// Print and forget whatever the service left on the error stack.
pub(crate) fn drain_error_stack(connection: &mut dyn Connection) {
    for line in connection.error_stack().render() {
        eprintln!("{line}");
    }
    connection.clear_error_stack();
}

/// Render epoch seconds in local time.
pub(crate) fn format_local_time(seconds: i64) -> String {
    Local
        .timestamp_opt(seconds, 0)
        .single()
        .map_or_else(|| seconds.to_string(), |time| time.format(TIME_FORMAT).to_string())
}

/// Parse a `YYYY-MM-DD.hh:mm:ss` local time into epoch seconds.
pub(crate) fn parse_local_time(text: &str) -> Option<i64> {
    let naive = NaiveDateTime::parse_from_str(text, TIME_FORMAT).ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|time| time.timestamp())
}

/// Catalog integer time: epoch seconds zero-padded to eleven digits.
pub(crate) fn catalog_time(seconds: i64) -> String {
    format!("{seconds:011}")
}

/// Lines of one simple-query page as they should be shown.
///
/// Resource class and object-count rows are hidden, and `*_ts` values are
/// shown as local time.
pub(crate) fn render_simple_query(buffer: &str) -> Vec<String> {
    buffer
        .split('\n')
        .filter(|line| !line.is_empty())
        .filter(|line| !line.contains("resc_class") && !line.contains("resc_objcount"))
        .map(|line| {
            if line.contains("_ts:") {
                convert_timestamp_line(line)
            } else {
                line.to_string()
            }
        })
        .collect()
}

fn convert_timestamp_line(line: &str) -> String {
    let mut parts = line.split(':');
    let (Some(name), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
        tracing::warn!(line, "unexpected timestamp line shape");
        return line.to_string();
    };
    match value.trim().parse::<i64>() {
        Ok(seconds) => format!("{name}: {}", format_local_time(seconds)),
        Err(_) => format!("{name}:{value}"),
    }
}

/// Serialise `value` as JSON indented by four spaces.
pub(crate) fn to_json_indented<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
