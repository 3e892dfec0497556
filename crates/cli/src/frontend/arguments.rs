use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::ArgMatches;
use transport::SessionOptions;
use zipseries_core::{
    LibraryName, ObjectSpec, ObjectType, ReleaseLevel, RemoteSaveFile, Secret,
};

use super::command_builder::clap_command;
use super::endpoint::Endpoint;

/// Command-line arguments after parsing.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct ParsedArgs {
    pub(crate) show_version: bool,
    pub(crate) verbose: bool,
    pub(crate) source: Endpoint,
    pub(crate) target: Endpoint,
    pub(crate) source_config: Option<String>,
    pub(crate) target_config: Option<String>,
    pub(crate) options: SessionOptions,
}

/// Parses `arguments`, the first being the program name.
pub(crate) fn parse_args<I, S>(arguments: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let matches = clap_command().try_get_matches_from(arguments)?;

    let source = Endpoint {
        server: text(&matches, "source-svr"),
        user: text(&matches, "source-usr"),
        password: text(&matches, "source-pwd").map(Secret::from),
        library: value::<LibraryName>(&matches, "source-lib"),
        objects: values::<ObjectSpec>(&matches, "source-obj"),
        object_types: values::<ObjectType>(&matches, "source-obj-type"),
        save_file: value::<PathBuf>(&matches, "source-save-file"),
        remote_save_file: value::<RemoteSaveFile>(&matches, "source-remote-savf"),
        release: None,
        verbose: None,
    };
    let target = Endpoint {
        server: text(&matches, "target-svr"),
        user: text(&matches, "target-usr"),
        password: text(&matches, "target-pwd").map(Secret::from),
        library: value::<LibraryName>(&matches, "target-lib"),
        objects: None,
        object_types: None,
        save_file: value::<PathBuf>(&matches, "target-save-file"),
        remote_save_file: value::<RemoteSaveFile>(&matches, "target-remote-savf"),
        release: value::<ReleaseLevel>(&matches, "target-release"),
        verbose: None,
    };

    Ok(ParsedArgs {
        show_version: matches.get_flag("version"),
        verbose: matches.get_flag("verbose"),
        source,
        target,
        source_config: text(&matches, "source-config"),
        target_config: text(&matches, "target-config"),
        options: session_options(&matches),
    })
}

fn session_options(matches: &ArgMatches) -> SessionOptions {
    let mut options = SessionOptions::default();
    if let Some(port) = value::<u16>(matches, "port") {
        options = options.with_port(port);
    }
    if let Some(seconds) = value::<u64>(matches, "timeout") {
        options = options.with_io_timeout(seconds_or_forever(seconds));
    }
    if let Some(seconds) = value::<u64>(matches, "contimeout") {
        options = options.with_connect_timeout(seconds_or_forever(seconds));
    }
    options
}

fn seconds_or_forever(seconds: u64) -> Option<Duration> {
    (seconds > 0).then(|| Duration::from_secs(seconds))
}

fn text(matches: &ArgMatches, id: &str) -> Option<String> {
    matches.get_one::<String>(id).cloned()
}

fn value<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> Option<T> {
    matches.get_one::<T>(id).cloned()
}

fn values<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> Option<Vec<T>> {
    matches
        .get_many::<T>(id)
        .map(|values| values.cloned().collect())
}
