use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use transport::{CommandResult, SessionError, SessionErrorKind};

use crate::exit_code::ExitCode;
use crate::names::NameKind;
use crate::release::ReleaseLevel;
use crate::step::Role;

/// Invalid or incomplete configuration.
///
/// Every variant is detected before the first network round-trip.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ConfigError {
    /// A library or object name is not a valid system name.
    #[error("invalid {kind} name {value:?}: {reason}")]
    InvalidName {
        /// What the name identifies.
        kind: NameKind,
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// An object type code is not supported.
    #[error("unsupported object type {value:?}")]
    UnknownObjectType {
        /// The rejected input.
        value: String,
    },
    /// A release identifier is not supported.
    #[error("unsupported release {value:?} (supported: {})", ReleaseLevel::supported_list())]
    UnknownRelease {
        /// The rejected input.
        value: String,
    },
    /// An object selection could not be parsed.
    #[error("invalid object {value:?}: {reason}")]
    InvalidObject {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
    /// A host save file is not written `LIBRARY/FILE`.
    #[error("invalid save file {value:?}: expected LIBRARY/FILE")]
    InvalidSaveFile {
        /// The rejected input.
        value: String,
    },
    /// A value the run needs was not supplied.
    #[error("no {role} {field} given")]
    MissingField {
        /// Role the field belongs to.
        role: Role,
        /// Field name, such as `"server"`.
        field: &'static str,
    },
    /// An object list was supplied but contains no objects.
    #[error("the object list is empty")]
    EmptyObjectList,
    /// The same object was selected twice.
    #[error("object {name} is selected more than once")]
    DuplicateObject {
        /// The repeated name.
        name: String,
    },
    /// The per-object type restrictions need more `OMITOBJ` exclusions than
    /// one save command accepts.
    #[error(
        "the object selection needs {count} type exclusions but a save accepts at most {limit}; \
         save the type-restricted objects in a separate run"
    )]
    TooManyOmissions {
        /// Exclusions the selection needs.
        count: usize,
        /// Most exclusions one command accepts.
        limit: usize,
    },
    /// Local save files were given for both roles.
    #[error("a local save file cannot be set for both the source and the target")]
    ConflictingSaveFiles,
    /// The local save file to restore from does not exist.
    #[error("local save file {} does not exist", path.display())]
    SaveFileNotFound {
        /// The missing path.
        path: PathBuf,
    },
    /// The directory that should receive the local save file does not exist.
    #[error("directory for local save file {} does not exist", path.display())]
    SaveFileDirectoryMissing {
        /// The requested path.
        path: PathBuf,
    },
    /// A required password could not be obtained.
    #[error("no password for {role} user {user}: {reason}")]
    PasswordUnavailable {
        /// Role needing the password.
        role: Role,
        /// User profile.
        user: String,
        /// Why no password could be obtained.
        reason: String,
    },
    /// A config file could not be read.
    #[error("cannot read config file {}: {reason}", path.display())]
    ConfigFileUnreadable {
        /// Config file path.
        path: PathBuf,
        /// Underlying error text.
        reason: String,
    },
    /// A config file line is invalid.
    #[error("{}:{line}: {message}", path.display())]
    ConfigFile {
        /// Config file path.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// What is wrong with the line.
        message: String,
    },
}

/// User-facing failure categories.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorCategory {
    /// Invalid or missing configuration.
    Configuration,
    /// Credentials rejected.
    Authentication,
    /// A CL command failed on the host.
    RemoteCommand,
    /// A save-file copy failed.
    Transfer,
    /// The control channel failed, timed out or misbehaved.
    Connection,
}

impl ErrorCategory {
    /// Returns the label printed before the diagnostic.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration error",
            Self::Authentication => "authentication error",
            Self::RemoteCommand => "remote command error",
            Self::Transfer => "transfer error",
            Self::Connection => "connection error",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a migration run failed.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A session to one of the hosts failed.
    #[error("{role}: {source}")]
    Session {
        /// Role of the failing session.
        role: Role,
        /// The session failure.
        #[source]
        source: SessionError,
    },
    /// A CL command completed with a failing reply.
    #[error("{role} host {host} rejected {}", command_name(result.command()))]
    RemoteCommand {
        /// Role of the host.
        role: Role,
        /// Host name.
        host: String,
        /// The failing result with its diagnostics.
        result: CommandResult,
    },
    /// The local intermediate save file could not be created.
    #[error("cannot create local save file: {reason}")]
    Staging {
        /// Underlying error text.
        reason: String,
    },
}

impl MigrationError {
    /// Wraps a session failure.
    #[must_use]
    pub const fn session(role: Role, source: SessionError) -> Self {
        Self::Session { role, source }
    }

    /// Returns the user-facing category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Session { source, .. } => match source.kind() {
                SessionErrorKind::Authentication => ErrorCategory::Authentication,
                SessionErrorKind::Transfer => ErrorCategory::Transfer,
                SessionErrorKind::Connection
                | SessionErrorKind::Protocol
                | SessionErrorKind::Timeout => ErrorCategory::Connection,
            },
            Self::RemoteCommand { .. } => ErrorCategory::RemoteCommand,
            Self::Staging { .. } => ErrorCategory::Transfer,
        }
    }

    /// Returns the exit code for a run that failed with this error.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) => ExitCode::Configuration,
            Self::Session { source, .. } => match source.kind() {
                SessionErrorKind::Authentication => ExitCode::Authentication,
                SessionErrorKind::Transfer => ExitCode::Transfer,
                SessionErrorKind::Connection => ExitCode::Connection,
                SessionErrorKind::Protocol => ExitCode::Protocol,
                SessionErrorKind::Timeout => ExitCode::Timeout,
            },
            Self::RemoteCommand { .. } => ExitCode::RemoteCommand,
            Self::Staging { .. } => ExitCode::Transfer,
        }
    }

    /// Returns the host diagnostics attached to the error, in the order the
    /// host sent them. Empty for failures that did not come from a command.
    #[must_use]
    pub fn diagnostics(&self) -> &[String] {
        match self {
            Self::RemoteCommand { result, .. } => result.diagnostics(),
            _ => &[],
        }
    }
}

/// Returns the CL command name, the first word of `command`.
fn command_name(command: &str) -> &str {
    command.split_whitespace().next().unwrap_or(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::ReplyCode;

    fn failed_command() -> CommandResult {
        CommandResult::new(
            "SAVLIB LIB(PAYROLL) DEV(*SAVF) SAVF(QTEMP/ZIPSERIES)",
            ReplyCode::new(550).expect("code"),
            vec![
                "Error occurred on command SAVLIB.".to_owned(),
                "CPF3781: Library PAYROLL not found.".to_owned(),
            ],
        )
    }

    #[test]
    fn remote_command_error_names_the_command_and_keeps_diagnostics() {
        let error = MigrationError::RemoteCommand {
            role: Role::Source,
            host: "as400.example.com".to_owned(),
            result: failed_command(),
        };

        assert_eq!(
            error.to_string(),
            "source host as400.example.com rejected SAVLIB"
        );
        assert_eq!(error.category(), ErrorCategory::RemoteCommand);
        assert_eq!(error.exit_code(), ExitCode::RemoteCommand);
        assert_eq!(error.diagnostics().len(), 2);
    }

    #[test]
    fn session_errors_map_by_kind() {
        let auth = MigrationError::session(
            Role::Target,
            SessionError::Authentication {
                host: "h".to_owned(),
                user: "U".to_owned(),
                reply: "530 rejected".to_owned(),
            },
        );
        assert_eq!(auth.category(), ErrorCategory::Authentication);
        assert_eq!(auth.exit_code(), ExitCode::Authentication);

        let timeout = MigrationError::session(
            Role::Source,
            SessionError::Timeout {
                host: "h".to_owned(),
                operation: "RCMD".to_owned(),
            },
        );
        assert_eq!(timeout.category(), ErrorCategory::Connection);
        assert_eq!(timeout.exit_code(), ExitCode::Timeout);
    }

    #[test]
    fn config_errors_exit_with_one() {
        let error = MigrationError::from(ConfigError::EmptyObjectList);
        assert_eq!(error.category(), ErrorCategory::Configuration);
        assert_eq!(error.exit_code().as_i32(), 1);
        assert!(error.diagnostics().is_empty());
    }

    #[test]
    fn unknown_release_lists_supported_values() {
        let error = ConfigError::UnknownRelease {
            value: "V4R5M0".to_owned(),
        };
        assert!(error.to_string().contains("*CURRENT, *PRV"));
    }
}
