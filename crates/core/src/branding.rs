//! Program names and filesystem locations.
//!
//! The CLI, the console reporter and the config-file loader all read these
//! constants, so banners, diagnostics and search paths stay consistent.
//!
//! # Examples
//!
//! ```
//! use std::path::Path;
//!
//! use zipseries_core::branding;
//!
//! assert_eq!(
//!     branding::config_path_in(Path::new("/etc/zipSeries"), "prod"),
//!     Path::new("/etc/zipSeries/prod.conf")
//! );
//! ```

use std::env;
use std::path::{Path, PathBuf};

/// Human-facing program name used in banners and diagnostics.
pub const PROGRAM_NAME: &str = "zipSeries";

/// Release of this build.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the installed binary.
pub const BINARY_NAME: &str = "zipseries";

/// Directory searched for named config files.
pub const CONFIG_DIR: &str = "/etc/zipSeries";

/// Extension appended to config names.
pub const CONFIG_EXTENSION: &str = "conf";

/// Environment variable replacing [`CONFIG_DIR`].
pub const CONFIG_DIR_ENV: &str = "ZIPSERIES_CONFIG_DIR";

/// Returns the config directory, honouring [`CONFIG_DIR_ENV`].
#[must_use]
pub fn config_dir() -> PathBuf {
    env::var_os(CONFIG_DIR_ENV)
        .filter(|value| !value.is_empty())
        .map_or_else(|| PathBuf::from(CONFIG_DIR), PathBuf::from)
}

/// Resolves a config `name` to a file path.
///
/// A name containing a path separator or ending in `.conf` is already a
/// path; anything else is looked up in [`config_dir`].
#[must_use]
pub fn config_path(name: &str) -> PathBuf {
    config_path_in(&config_dir(), name)
}

/// Resolves `name` like [`config_path`], against an explicit directory.
#[must_use]
pub fn config_path_in(dir: &Path, name: &str) -> PathBuf {
    let explicit = name.contains(std::path::MAIN_SEPARATOR)
        || name.contains('/')
        || Path::new(name)
            .extension()
            .is_some_and(|extension| extension == CONFIG_EXTENSION);
    if explicit {
        PathBuf::from(name)
    } else {
        dir.join(format!("{name}.{CONFIG_EXTENSION}"))
    }
}
