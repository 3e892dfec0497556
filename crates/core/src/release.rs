use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Operating system release the saved objects must be restorable on
/// (`TGTRLS`).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum ReleaseLevel {
    /// The release the source system runs.
    #[default]
    Current,
    /// The release before the one the source system runs.
    Previous,
    /// V5R4M0.
    V5R4M0,
    /// V6R1M0.
    V6R1M0,
    /// V6R1M1.
    V6R1M1,
    /// V7R1M0.
    V7R1M0,
    /// V7R2M0.
    V7R2M0,
    /// V7R3M0.
    V7R3M0,
    /// V7R4M0.
    V7R4M0,
    /// V7R5M0.
    V7R5M0,
}

impl ReleaseLevel {
    /// Every supported release, default first.
    pub const SUPPORTED: [Self; 10] = [
        Self::Current,
        Self::Previous,
        Self::V5R4M0,
        Self::V6R1M0,
        Self::V6R1M1,
        Self::V7R1M0,
        Self::V7R2M0,
        Self::V7R3M0,
        Self::V7R4M0,
        Self::V7R5M0,
    ];

    /// Returns the `TGTRLS` value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Current => "*CURRENT",
            Self::Previous => "*PRV",
            Self::V5R4M0 => "V5R4M0",
            Self::V6R1M0 => "V6R1M0",
            Self::V6R1M1 => "V6R1M1",
            Self::V7R1M0 => "V7R1M0",
            Self::V7R2M0 => "V7R2M0",
            Self::V7R3M0 => "V7R3M0",
            Self::V7R4M0 => "V7R4M0",
            Self::V7R5M0 => "V7R5M0",
        }
    }

    /// Returns the supported values joined by `", "`, for help and errors.
    #[must_use]
    pub fn supported_list() -> String {
        Self::SUPPORTED
            .iter()
            .map(|release| release.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for ReleaseLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::SUPPORTED
            .into_iter()
            .find(|release| release.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ConfigError::UnknownRelease {
                value: trimmed.to_owned(),
            })
    }
}

impl fmt::Display for ReleaseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
