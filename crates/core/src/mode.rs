use std::fmt;

use crate::config::Configuration;
use crate::error::ConfigError;

/// Which halves of a migration a run performs.
///
/// Derived once from the local save-file settings: a local target save file
/// means there is nothing to save, a local source save file means there is
/// nothing to restore.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ExecutionMode {
    /// Save on the source and keep the save file locally.
    SaveOnly,
    /// Restore on the target from a local save file.
    RestoreOnly,
    /// Save on the source, move the save file, restore on the target.
    SaveAndRestore,
}

impl ExecutionMode {
    /// Derives the mode, rejecting local save files on both sides.
    pub fn from_config(config: &Configuration) -> Result<Self, ConfigError> {
        match (
            config.source.local_save_file.is_some(),
            config.target.local_save_file.is_some(),
        ) {
            (true, true) => Err(ConfigError::ConflictingSaveFiles),
            (true, false) => Ok(Self::SaveOnly),
            (false, true) => Ok(Self::RestoreOnly),
            (false, false) => Ok(Self::SaveAndRestore),
        }
    }

    /// Returns `true` when the source host is contacted.
    #[must_use]
    pub const fn saves(self) -> bool {
        matches!(self, Self::SaveOnly | Self::SaveAndRestore)
    }

    /// Returns `true` when the target host is contacted.
    #[must_use]
    pub const fn restores(self) -> bool {
        matches!(self, Self::RestoreOnly | Self::SaveAndRestore)
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SaveOnly => "save only",
            Self::RestoreOnly => "restore only",
            Self::SaveAndRestore => "save and restore",
        })
    }
}
