use std::fmt;

use thiserror::Error;

/// A command sent on the control channel.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ControlCommand<'a> {
    /// `USER name`
    User(&'a str),
    /// `PASS secret`; the secret is redacted by [`fmt::Display`].
    Pass(&'a str),
    /// `TYPE I`, selecting binary image transfers.
    TypeImage,
    /// `PASV`
    Passive,
    /// `RCMD command`, running a CL command in the server job.
    RemoteCommand(&'a str),
    /// `RETR path`
    Retrieve(&'a str),
    /// `STOR path`
    Store(&'a str),
    /// `NOOP`
    Noop,
    /// `QUIT`
    Quit,
}

/// Raised when a command argument would break the line framing.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("{verb} argument contains a line break")]
pub struct EncodeError {
    verb: &'static str,
}

impl EncodeError {
    /// Returns the verb whose argument was rejected.
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        self.verb
    }
}

impl ControlCommand<'_> {
    /// Returns the protocol verb.
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::User(_) => "USER",
            Self::Pass(_) => "PASS",
            Self::TypeImage => "TYPE",
            Self::Passive => "PASV",
            Self::RemoteCommand(_) => "RCMD",
            Self::Retrieve(_) => "RETR",
            Self::Store(_) => "STOR",
            Self::Noop => "NOOP",
            Self::Quit => "QUIT",
        }
    }

    const fn argument(&self) -> Option<&str> {
        match self {
            Self::User(value)
            | Self::Pass(value)
            | Self::RemoteCommand(value)
            | Self::Retrieve(value)
            | Self::Store(value) => Some(*value),
            Self::TypeImage => Some("I"),
            Self::Passive | Self::Noop | Self::Quit => None,
        }
    }

    /// Renders the CRLF-terminated line sent on the wire, including secrets.
    pub fn encode(&self) -> Result<String, EncodeError> {
        match self.argument() {
            Some(argument) if argument.contains(['\r', '\n']) => {
                Err(EncodeError { verb: self.verb() })
            }
            Some(argument) => Ok(format!("{} {argument}\r\n", self.verb())),
            None => Ok(format!("{}\r\n", self.verb())),
        }
    }
}

impl fmt::Display for ControlCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass(_) => f.write_str("PASS ****"),
            other => match other.argument() {
                Some(argument) => write!(f, "{} {argument}", other.verb()),
                None => f.write_str(other.verb()),
            },
        }
    }
}
