//! Integer status codes returned by the service.
//!
//! A status packs a base error and an optional sub-code (usually an OS
//! `errno`) into one negative integer: `status = base - sub` with
//! `0 <= sub < 1000`. Zero and positive values mean success.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Status returned by a remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Status(pub i32);

macro_rules! statuses {
    ($($(#[$doc:meta])* $name:ident = $value:expr;)+) => {
        impl Status {
            $(
                $(#[$doc])*
                pub const $name: Self = Self($value);
            )+
        }

        const NAMED: &[(i32, &str)] = &[$(($value, stringify!($name))),+];
    };
}

statuses! {
    /// Call completed.
    SUCCESS = 0;
    /// Unclassified failure.
    SYS_UNKNOWN_ERROR = -1;
    /// Arguments were rejected before anything was sent.
    SYS_INVALID_INPUT_PARAM = -130_000;
    /// The server refused the operation outright.
    SYS_NOT_ALLOWED = -169_000;
    /// The client could not reach the server.
    USER_SOCK_CONNECT_ERR = -305_000;
    /// A user name was not of the form `name[#zone]`.
    USER_INVALID_USERNAME_FORMAT = -344_000;
    /// The caller may not use this API at all.
    SYS_NO_API_PRIV = -350_000;
    /// The catalog query matched nothing.
    CAT_NO_ROWS_FOUND = -808_000;
    /// The statement ran but changed no rows.
    CAT_SUCCESS_BUT_WITH_NO_INFO = -816_000;
    /// Unknown user type.
    CAT_INVALID_USER_TYPE = -818_000;
    /// Credentials were rejected.
    CAT_INVALID_AUTHENTICATION = -826_000;
    /// The caller's user type is too weak for the operation.
    CAT_INSUFFICIENT_PRIVILEGE_LEVEL = -830_000;
}

impl Status {
    /// Returns `true` for zero and positive values.
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 >= 0
    }

    /// Returns `true` for negative values.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        self.0 < 0
    }

    /// Base error with the sub-code stripped.
    #[must_use]
    pub const fn base(self) -> Self {
        if self.0 >= 0 {
            self
        } else {
            Self(self.0 / 1000 * 1000)
        }
    }

    /// Sub-code folded into a failure status, zero when absent.
    #[must_use]
    pub const fn sub_code(self) -> i32 {
        if self.0 >= 0 { 0 } else { -(self.0 % 1000) }
    }

    /// Symbolic name of the base error, if known.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        let base = self.base().0;
        NAMED
            .iter()
            .find(|(value, _)| *value == base)
            .map(|(_, name)| *name)
    }

    /// Returns `true` when the status reports a privilege problem.
    #[must_use]
    pub fn is_privilege_denial(self) -> bool {
        matches!(
            self.base(),
            Self::SYS_NO_API_PRIV | Self::CAT_INSUFFICIENT_PRIVILEGE_LEVEL
        )
    }
}

impl Display for Status {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        let name = self.name().unwrap_or("UNKNOWN_STATUS");
        match self.sub_code() {
            0 => write!(formatter, "{} {name}", self.0),
            sub => write!(formatter, "{} {name} (sub-code {sub})", self.0),
        }
    }
}

impl From<i32> for Status {
    fn from(value: i32) -> Self {
        Self(value)
    }
}
