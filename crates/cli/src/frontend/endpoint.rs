use std::path::PathBuf;

use zipseries_core::{
    LibraryName, ObjectSpec, ObjectType, ReleaseLevel, RemoteSaveFile, Secret, SourceConfig,
    TargetConfig,
};

/// Settings for one role, as given on the command line or in a config file.
///
/// Every field is optional so that two sources can be layered with
/// [`Endpoint::fill_from`]; the result becomes a [`SourceConfig`] or a
/// [`TargetConfig`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Endpoint {
    pub(crate) server: Option<String>,
    pub(crate) user: Option<String>,
    pub(crate) password: Option<Secret>,
    pub(crate) library: Option<LibraryName>,
    pub(crate) objects: Option<Vec<ObjectSpec>>,
    pub(crate) object_types: Option<Vec<ObjectType>>,
    pub(crate) save_file: Option<PathBuf>,
    pub(crate) remote_save_file: Option<RemoteSaveFile>,
    pub(crate) release: Option<ReleaseLevel>,
    pub(crate) verbose: Option<bool>,
}

impl Endpoint {
    /// Fills every unset field from `fallback`. Set fields are never replaced.
    pub(crate) fn fill_from(&mut self, fallback: Self) {
        fill(&mut self.server, fallback.server);
        fill(&mut self.user, fallback.user);
        fill(&mut self.password, fallback.password);
        fill(&mut self.library, fallback.library);
        fill(&mut self.objects, fallback.objects);
        fill(&mut self.object_types, fallback.object_types);
        fill(&mut self.save_file, fallback.save_file);
        fill(&mut self.remote_save_file, fallback.remote_save_file);
        fill(&mut self.release, fallback.release);
        fill(&mut self.verbose, fallback.verbose);
    }

    pub(crate) fn into_source(self) -> SourceConfig {
        SourceConfig {
            server: self.server,
            user: self.user,
            password: self.password,
            library: self.library,
            objects: self.objects,
            object_types: self.object_types.unwrap_or_default(),
            local_save_file: self.save_file,
            remote_save_file: self.remote_save_file,
        }
    }

    pub(crate) fn into_target(self) -> TargetConfig {
        TargetConfig {
            release: self.release.unwrap_or_default(),
            server: self.server,
            user: self.user,
            password: self.password,
            library: self.library,
            local_save_file: self.save_file,
            remote_save_file: self.remote_save_file,
        }
    }
}

fn fill<T>(slot: &mut Option<T>, fallback: Option<T>) {
    if slot.is_none() {
        *slot = fallback;
    }
}
