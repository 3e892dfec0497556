//! Named config files supplying fallback values for one role.
//!
//! ```text
//! # /etc/zipSeries/prod.conf
//! server   = prod.example.com
//! user     = QSECOFR
//! library  = PAYROLL
//! obj-type = *FILE *PGM
//! ```
//!
//! Keys may use their long or short form. Values only fill what the command
//! line left unset; that layering happens in [`Endpoint::fill_from`].

use std::fs;
use std::path::{Path, PathBuf};

use zipseries_core::{ConfigError, ObjectSpec, ObjectType, Role, Secret};

use super::endpoint::Endpoint;

/// Reads and parses the config file at `path` for `role`.
pub(crate) fn load(path: &Path, role: Role) -> Result<Endpoint, ConfigError> {
    let text = fs::read_to_string(path).map_err(|error| ConfigError::ConfigFileUnreadable {
        path: path.to_path_buf(),
        reason: error.to_string(),
    })?;
    parse(path, &text, role)
}

/// Parses config `text`; `path` is only used in error messages.
pub(crate) fn parse(path: &Path, text: &str, role: Role) -> Result<Endpoint, ConfigError> {
    let mut endpoint = Endpoint::default();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        let at = |message: String| ConfigError::ConfigFile {
            path: path.to_path_buf(),
            line: index + 1,
            message,
        };

        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| at(format!("expected `key = value`, found `{line}`")))?;
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();
        apply(&mut endpoint, &key, value, role).map_err(at)?;
    }
    Ok(endpoint)
}

fn apply(endpoint: &mut Endpoint, key: &str, value: &str, role: Role) -> Result<(), String> {
    match key {
        "server" | "svr" => endpoint.server = Some(value.to_owned()),
        "user" | "usr" => endpoint.user = Some(value.to_owned()),
        "password" | "pwd" => endpoint.password = Some(Secret::from(value)),
        "library" | "lib" => endpoint.library = Some(parse_value(value)?),
        "object" | "obj" => {
            only_for(Role::Source, role, key)?;
            let objects = value
                .split_whitespace()
                .map(str::parse::<ObjectSpec>)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|error| error.to_string())?;
            endpoint.objects = Some(objects);
        }
        "object-type" | "obj-type" => {
            only_for(Role::Source, role, key)?;
            let types = value
                .split_whitespace()
                .map(str::parse::<ObjectType>)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|error| error.to_string())?;
            endpoint.object_types = Some(types);
        }
        "save-file" => endpoint.save_file = Some(PathBuf::from(value)),
        "remote-savf" => endpoint.remote_save_file = Some(parse_value(value)?),
        "release" => {
            only_for(Role::Target, role, key)?;
            endpoint.release = Some(parse_value(value)?);
        }
        "verbose" => endpoint.verbose = Some(parse_flag(value)?),
        other => return Err(format!("unknown key `{other}`")),
    }
    Ok(())
}

fn parse_value<T>(value: &str) -> Result<T, String>
where
    T: std::str::FromStr<Err = ConfigError>,
{
    value.parse().map_err(|error: ConfigError| error.to_string())
}

fn parse_flag(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "yes" | "true" | "on" | "1" => Ok(true),
        "no" | "false" | "off" | "0" => Ok(false),
        _ => Err(format!("`{value}` is not a yes/no value")),
    }
}

fn only_for(allowed: Role, role: Role, key: &str) -> Result<(), String> {
    if allowed == role {
        Ok(())
    } else {
        Err(format!("`{key}` only applies to {allowed} config files"))
    }
}
