use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use protocol::EncodeError;
use thiserror::Error;

use crate::state::SessionState;
use crate::transfer::TransferDirection;

/// Coarse classification of a [`SessionError`], used to pick the
/// user-facing error category and exit status.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SessionErrorKind {
    /// The control channel could not be opened or was lost.
    Connection,
    /// The host rejected the credentials.
    Authentication,
    /// The host sent a reply the session cannot make sense of.
    Protocol,
    /// A file transfer failed or was incomplete.
    Transfer,
    /// The host did not answer within the configured timeout.
    Timeout,
}

/// Errors raised by a remote session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Name resolution failed.
    #[error("failed to resolve {host}: {source}")]
    Resolve {
        /// Host name as configured.
        host: String,
        /// Resolver error.
        #[source]
        source: io::Error,
    },
    /// Name resolution succeeded but produced nothing to connect to.
    #[error("{host} did not resolve to any addresses")]
    NoAddresses {
        /// Host name as configured.
        host: String,
    },
    /// Every resolved address refused or timed out; `addr` is the last one tried.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        /// Address of the last attempt.
        addr: SocketAddr,
        /// Socket error of the last attempt.
        #[source]
        source: io::Error,
    },
    /// The login was refused.
    #[error("{host} rejected user {user}: {reply}")]
    Authentication {
        /// Host name.
        host: String,
        /// User profile that was refused.
        user: String,
        /// The refusing reply.
        reply: String,
    },
    /// A reply arrived that does not fit the exchange in progress.
    #[error("{host} answered {command} with an unexpected reply: {reply}")]
    UnexpectedReply {
        /// Host name.
        host: String,
        /// The command (never a password) or exchange that was answered.
        command: String,
        /// The reply, or a description of what could not be parsed.
        reply: String,
    },
    /// The control connection closed or failed.
    #[error("connection to {host} was lost during {operation}")]
    Disconnected {
        /// Host name.
        host: String,
        /// What the session was doing.
        operation: String,
        /// Socket error, when the loss was reported as one.
        #[source]
        source: Option<io::Error>,
    },
    /// The host stopped answering.
    #[error("timed out waiting for {host} during {operation}")]
    Timeout {
        /// Host name.
        host: String,
        /// What the session was doing.
        operation: String,
    },
    /// A file transfer failed; the session itself may still be usable.
    #[error("{direction} of {remote} on {host} failed: {reason}")]
    Transfer {
        /// Host name.
        host: String,
        /// Direction of the failed transfer.
        direction: TransferDirection,
        /// Host path of the file.
        remote: String,
        /// Reply text or socket error describing the failure.
        reason: String,
    },
    /// An operation was attempted while the session was not ready.
    #[error("cannot {operation} on {host}: session is {state}")]
    InvalidState {
        /// Host name.
        host: String,
        /// The refused operation.
        operation: &'static str,
        /// State the session was in.
        state: SessionState,
    },
    /// The local side of a transfer failed.
    #[error("local file {}: {source}", path.display())]
    LocalFile {
        /// Local path.
        path: PathBuf,
        /// File system error.
        #[source]
        source: io::Error,
    },
    /// A command argument could not be framed on the control channel.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

impl SessionError {
    /// Classifies the error.
    #[must_use]
    pub fn kind(&self) -> SessionErrorKind {
        match self {
            Self::Connect { source, .. } if is_timeout(source) => SessionErrorKind::Timeout,
            Self::Timeout { .. } => SessionErrorKind::Timeout,
            Self::Resolve { .. }
            | Self::NoAddresses { .. }
            | Self::Connect { .. }
            | Self::Disconnected { .. }
            | Self::InvalidState { .. } => SessionErrorKind::Connection,
            Self::Authentication { .. } => SessionErrorKind::Authentication,
            Self::UnexpectedReply { .. } | Self::Encode(_) => SessionErrorKind::Protocol,
            Self::Transfer { .. } | Self::LocalFile { .. } => SessionErrorKind::Transfer,
        }
    }
}

pub(crate) fn is_timeout(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_timeouts_are_classified_as_timeouts() {
        let error = SessionError::Connect {
            addr: "192.0.2.1:21".parse().expect("address"),
            source: io::Error::new(io::ErrorKind::TimedOut, "connection timed out"),
        };
        assert_eq!(error.kind(), SessionErrorKind::Timeout);

        let refused = SessionError::Connect {
            addr: "127.0.0.1:21".parse().expect("address"),
            source: io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        };
        assert_eq!(refused.kind(), SessionErrorKind::Connection);
    }

    #[test]
    fn messages_name_the_host_and_operation() {
        let error = SessionError::Disconnected {
            host: "pub400.com".to_owned(),
            operation: "RCMD".to_owned(),
            source: None,
        };
        assert_eq!(
            error.to_string(),
            "connection to pub400.com was lost during RCMD"
        );
    }
}
