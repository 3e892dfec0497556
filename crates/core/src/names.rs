use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

const MAX_LEN: usize = 10;

/// What a system name identifies, for diagnostics.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum NameKind {
    /// A library.
    Library,
    /// An object inside a library.
    Object,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Library => "library",
            Self::Object => "object",
        })
    }
}

/// The object value selecting every object in a library.
pub const ALL_OBJECTS: &str = "*ALL";

/// Validates an IBM i system name and returns it upper-cased.
///
/// A system name is 1 to 10 characters. The first is a letter or one of
/// `$ # @`; the rest may also be digits, `_` or `.`.
fn system_name(kind: NameKind, input: &str) -> Result<String, ConfigError> {
    let value = input.trim().to_ascii_uppercase();
    check_system_name(&value, MAX_LEN).map_err(|reason| invalid(kind, input, reason))?;
    Ok(value)
}

/// Validates an object name, which may also be generic: `*ALL`, or a valid
/// name prefix followed by `*` such as `PAY*`.
fn object_name(kind: NameKind, input: &str) -> Result<String, ConfigError> {
    let value = input.trim().to_ascii_uppercase();
    if value == ALL_OBJECTS {
        return Ok(value);
    }
    match value.strip_suffix('*') {
        Some(prefix) => {
            check_system_name(prefix, MAX_LEN - 1)
                .map_err(|reason| invalid(kind, input, reason))?;
            Ok(value)
        }
        None => system_name(kind, input),
    }
}

fn check_system_name(value: &str, max_len: usize) -> Result<(), &'static str> {
    let Some(first) = value.chars().next() else {
        return Err("name is empty");
    };
    if value.len() > max_len {
        return Err("name is longer than 10 characters");
    }
    if !(first.is_ascii_uppercase() || matches!(first, '$' | '#' | '@')) {
        return Err("name must start with a letter, $, # or @");
    }
    if !value
        .chars()
        .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit() || "$#@_.".contains(ch))
    {
        return Err("name may only contain letters, digits, $, #, @, _ and .");
    }
    Ok(())
}

fn invalid(kind: NameKind, input: &str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidName {
        kind,
        value: input.trim().to_owned(),
        reason,
    }
}

macro_rules! system_name_type {
    ($(#[$meta:meta])* $name:ident, $kind:expr, $parse:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
        pub struct $name(String);

        impl $name {
            /// Returns the upper-cased name.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Wraps a name known to be valid and upper-case.
            pub(crate) fn from_static(value: &'static str) -> Self {
                debug_assert!($parse($kind, value).as_deref() == Ok(value));
                Self(value.to_owned())
            }
        }

        impl FromStr for $name {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $parse($kind, s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

system_name_type!(
    /// Name of a library, such as `PAYROLL`.
    LibraryName,
    NameKind::Library,
    system_name
);

system_name_type!(
    /// Name of an object inside a library, such as `EMPMAST`, or a generic
    /// name such as `PAY*` or `*ALL`.
    ObjectName,
    NameKind::Object,
    object_name
);

impl ObjectName {
    /// Returns `true` for `*ALL` and `PREFIX*` names, which may match more
    /// than one object.
    #[must_use]
    pub fn is_generic(&self) -> bool {
        self.0.ends_with('*') || self.0 == ALL_OBJECTS
    }
}
