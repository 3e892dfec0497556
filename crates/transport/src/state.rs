use std::fmt;

/// Lifecycle of a [`FtpSession`](crate::FtpSession).
///
/// ```text
/// Disconnected -> Authenticating -> Ready -> {Executing | Transferring} -> Ready -> Disconnected
/// ```
///
/// A failed login or a dropped connection goes straight to
/// [`SessionState::Disconnected`]; nothing reconnects automatically.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SessionState {
    /// No usable control connection.
    Disconnected,
    /// Connected and greeted; login in progress.
    Authenticating,
    /// Logged in and idle.
    Ready,
    /// An `RCMD` is in flight.
    Executing,
    /// A `RETR` or `STOR` is in flight.
    Transferring,
}

impl SessionState {
    /// Returns a lowercase label for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Authenticating => "authenticating",
            Self::Ready => "ready",
            Self::Executing => "executing",
            Self::Transferring => "transferring",
        }
    }

    /// Returns `true` when a new operation may start.
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
