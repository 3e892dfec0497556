use std::fmt;

/// One of the two hosts taking part in a migration.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Role {
    /// The host the library is saved from.
    Source,
    /// The host the library is restored to.
    Target,
}

impl Role {
    /// Returns `"source"` or `"target"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Target => "target",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stage of a migration run, used to report progress and failures.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Step {
    /// Checking the configuration and building the commands.
    Validate,
    /// Obtaining the passwords that were not configured.
    ResolveCredentials,
    /// Opening and authenticating a session.
    Connect(Role),
    /// Creating or clearing the host save file.
    PrepareSaveFile(Role),
    /// Running the save command on the source.
    Save,
    /// Copying the save file from the source to the local machine.
    Download,
    /// Copying the save file from the local machine to the target.
    Upload,
    /// Running the restore command on the target.
    Restore,
}

impl Step {
    /// Returns the role whose host the step talks to, if any.
    #[must_use]
    pub const fn role(self) -> Option<Role> {
        match self {
            Self::Validate | Self::ResolveCredentials => None,
            Self::Connect(role) | Self::PrepareSaveFile(role) => Some(role),
            Self::Save | Self::Download => Some(Role::Source),
            Self::Upload | Self::Restore => Some(Role::Target),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validate => f.write_str("validate configuration"),
            Self::ResolveCredentials => f.write_str("resolve credentials"),
            Self::Connect(role) => write!(f, "connect to {role}"),
            Self::PrepareSaveFile(role) => write!(f, "prepare {role} save file"),
            Self::Save => f.write_str("save"),
            Self::Download => f.write_str("download save file"),
            Self::Upload => f.write_str("upload save file"),
            Self::Restore => f.write_str("restore"),
        }
    }
}
