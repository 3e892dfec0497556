//! Process exit codes.
//!
//! Only zero versus non-zero is a stable contract; the individual values
//! let scripts tell the failure categories apart.
//!
//! # Examples
//!
//! ```
//! use zipseries_core::exit_code::ExitCode;
//!
//! assert_eq!(ExitCode::PartialFailure.as_i32(), 23);
//! assert_eq!(ExitCode::from_i32(24), Some(ExitCode::RemoteCommand));
//! ```

use std::fmt;

/// Exit codes returned by the `zipseries` binary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ExitCode {
    /// Every requested step completed.
    Ok = 0,

    /// Invalid or incomplete configuration, detected before any network
    /// activity. Also used for command-line usage errors.
    Configuration = 1,

    /// The host sent a reply that does not fit the exchange in progress.
    Protocol = 2,

    /// A host rejected the user profile or password.
    Authentication = 5,

    /// A control connection could not be opened or was lost.
    Connection = 10,

    /// A save-file transfer failed or was incomplete.
    Transfer = 11,

    /// The save completed but the restore side failed.
    ///
    /// The local copy of the save file is kept so the restore can be
    /// repeated.
    PartialFailure = 23,

    /// A save, restore or save-file command failed on the host.
    RemoteCommand = 24,

    /// A host stopped answering within the configured timeout.
    Timeout = 30,
}

impl ExitCode {
    /// Returns the numeric exit code value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns a human-readable description of this exit code.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Ok => "success",
            Self::Configuration => "configuration error",
            Self::Protocol => "unexpected reply from host",
            Self::Authentication => "authentication failed",
            Self::Connection => "connection error",
            Self::Transfer => "save file transfer failed",
            Self::PartialFailure => "save completed, restore failed",
            Self::RemoteCommand => "remote command failed",
            Self::Timeout => "timeout waiting for host",
        }
    }

    /// Returns `true` if this represents a successful exit.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Creates an exit code from an i32 value.
    #[must_use]
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Ok),
            1 => Some(Self::Configuration),
            2 => Some(Self::Protocol),
            5 => Some(Self::Authentication),
            10 => Some(Self::Connection),
            11 => Some(Self::Transfer),
            23 => Some(Self::PartialFailure),
            24 => Some(Self::RemoteCommand),
            30 => Some(Self::Timeout),
            _ => None,
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code.as_i32() as u8)
    }
}
