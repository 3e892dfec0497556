use std::path::PathBuf;

use transport::Secret;

use crate::names::LibraryName;
use crate::object_type::ObjectType;
use crate::release::ReleaseLevel;
use crate::selection::{ObjectSpec, RemoteSaveFile};

/// Everything a migration run needs, as assembled by the front end.
///
/// Fields are plain optional values so command-line flags and config files
/// can fill them in any order. [`MigrationPlan::new`](crate::MigrationPlan::new)
/// validates the combination.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Configuration {
    /// Report progress while running.
    pub verbose: bool,
    /// The host the library is saved from.
    pub source: SourceConfig,
    /// The host the library is restored to.
    pub target: TargetConfig,
}

/// Source side of a [`Configuration`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SourceConfig {
    /// Host name or address.
    pub server: Option<String>,
    /// User profile.
    pub user: Option<String>,
    /// Password; prompted for when absent.
    pub password: Option<Secret>,
    /// Library to save.
    pub library: Option<LibraryName>,
    /// Objects to save, in order. `None` saves the whole library.
    pub objects: Option<Vec<ObjectSpec>>,
    /// Types used for objects without their own types. Empty means `*ALL`.
    pub object_types: Vec<ObjectType>,
    /// Keep the save file at this local path and skip the restore.
    pub local_save_file: Option<PathBuf>,
    /// Host save file; `QTEMP/ZIPSERIES` when unset.
    pub remote_save_file: Option<RemoteSaveFile>,
}

/// Target side of a [`Configuration`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TargetConfig {
    /// Release the saved objects must be restorable on.
    pub release: ReleaseLevel,
    /// Host name or address.
    pub server: Option<String>,
    /// User profile.
    pub user: Option<String>,
    /// Password; prompted for when absent.
    pub password: Option<Secret>,
    /// Library to restore into.
    pub library: Option<LibraryName>,
    /// Restore from this local save file and skip the save.
    pub local_save_file: Option<PathBuf>,
    /// Host save file; `QTEMP/ZIPSERIES` when unset.
    pub remote_save_file: Option<RemoteSaveFile>,
}
