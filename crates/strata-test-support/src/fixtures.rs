//! Canned replies shared by shell tests.

use strata_client::{GeneralQueryReply, SimpleQueryReply, Status};

/// Successful general-query reply holding `rows`.
#[must_use]
pub fn rows<const N: usize>(rows: &[[&str; N]]) -> GeneralQueryReply {
    GeneralQueryReply {
        status: Status::SUCCESS,
        rows: rows
            .iter()
            .map(|row| row.iter().map(|cell| (*cell).to_string()).collect())
            .collect(),
    }
}

/// General-query reply reporting no matches.
#[must_use]
pub fn no_rows() -> GeneralQueryReply {
    GeneralQueryReply {
        status: Status::CAT_NO_ROWS_FOUND,
        rows: Vec::new(),
    }
}

/// Final simple-query page with the given output lines.
#[must_use]
pub fn page(lines: &[&str]) -> SimpleQueryReply {
    page_with_cursor(lines, 0)
}

/// Simple-query page that announces more output behind `control`.
#[must_use]
pub fn page_with_cursor(lines: &[&str], control: i32) -> SimpleQueryReply {
    let mut out_buf = lines.join("\n");
    if !out_buf.is_empty() {
        out_buf.push('\n');
    }
    SimpleQueryReply {
        status: Status::SUCCESS,
        out_buf,
        control,
    }
}

/// Simple-query reply carrying only a failure status.
#[must_use]
pub fn failed_page(status: Status) -> SimpleQueryReply {
    SimpleQueryReply {
        status,
        out_buf: String::new(),
        control: 0,
    }
}
