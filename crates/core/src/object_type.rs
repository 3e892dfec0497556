use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Object type codes accepted by the `OBJTYPE` parameter of `SAVOBJ` and
/// `RSTOBJ`, in the order the system documents them. `*ALL` comes first.
const OBJECT_TYPES: &[&str] = &[
    "*ALL", "*ALRTBL", "*BNDDIR", "*CFGL", "*CHTFMT", "*CLD", "*CLS", "*CMD", "*CNNL", "*COSD",
    "*CRG", "*CRQD", "*CSI", "*CSPMAP", "*CSPTBL", "*DTAARA", "*DTADCT", "*DTAQ", "*EDTD",
    "*FCT", "*FILE", "*FNTRSC", "*FNTTBL", "*FORMDF", "*FTR", "*GSS", "*IGCDCT", "*IGCSRT",
    "*IGCTBL", "*IMGCLG", "*JOBD", "*JOBQ", "*JOBSCD", "*JRN", "*JRNRCV", "*LOCALE", "*MEDDFN",
    "*MENU", "*MGTCOL", "*MODULE", "*MSGF", "*MSGQ", "*M36", "*M36CFG", "*NODGRP", "*NODL",
    "*OUTQ", "*OVL", "*PAGDFN", "*PAGSEG", "*PDFMAP", "*PDG", "*PGM", "*PNLGRP", "*PRDAVL",
    "*PRDDFN", "*PRDLOD", "*PSFCFG", "*QMFORM", "*QMQRY", "*QRYDFN", "*RCT", "*SBSD", "*SCHIDX",
    "*SPADCT", "*SQLPKG", "*SQLUDT", "*SQLXSR", "*SRVPGM", "*SSND", "*SVRSTG", "*S36", "*TBL",
    "*TIMZON", "*USRIDX", "*USRQ", "*USRSPC", "*VLDL", "*WSCST",
];

/// An object type code such as `*PGM` or `*FILE`.
///
/// Ordering follows the system's documented order, which keeps generated
/// `OBJTYPE` lists stable.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ObjectType(u8);

impl ObjectType {
    /// `*ALL`, matching every type.
    pub const ALL: Self = Self(0);

    /// Returns the code including its leading `*`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        OBJECT_TYPES[usize::from(self.0)]
    }

    /// Returns `true` for `*ALL`.
    #[must_use]
    pub const fn is_all(self) -> bool {
        self.0 == 0
    }

    /// Iterates over every supported type code.
    pub fn supported() -> impl Iterator<Item = Self> {
        (0..OBJECT_TYPES.len()).map(|index| Self(index as u8))
    }
}

impl Default for ObjectType {
    fn default() -> Self {
        Self::ALL
    }
}

impl FromStr for ObjectType {
    type Err = ConfigError;

    /// Parses a code case-insensitively, with or without its leading `*`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let bare = trimmed.strip_prefix('*').unwrap_or(trimmed);
        OBJECT_TYPES
            .iter()
            .position(|code| code[1..].eq_ignore_ascii_case(bare))
            .map(|index| Self(index as u8))
            .ok_or_else(|| ConfigError::UnknownObjectType {
                value: trimmed.to_owned(),
            })
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalises a type list: sorted, without duplicates, and reduced to
/// `[*ALL]` when `*ALL` is present. An empty list also means `[*ALL]`.
pub(crate) fn normalise_types(types: &[ObjectType]) -> Vec<ObjectType> {
    if types.is_empty() || types.iter().any(|ty| ty.is_all()) {
        return vec![ObjectType::ALL];
    }
    let mut list = types.to_vec();
    list.sort_unstable();
    list.dedup();
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_or_without_star_in_any_case() {
        let program: ObjectType = "*PGM".parse().expect("valid");
        assert_eq!(program.as_str(), "*PGM");
        assert_eq!("file".parse::<ObjectType>().expect("valid").to_string(), "*FILE");
        assert_eq!("*srvpgm".parse::<ObjectType>().expect("valid").as_str(), "*SRVPGM");
    }

    #[test]
    fn all_is_the_default_and_first() {
        assert_eq!(ObjectType::default(), ObjectType::ALL);
        assert_eq!(ObjectType::supported().next(), Some(ObjectType::ALL));
        assert!("*all".parse::<ObjectType>().expect("valid").is_all());
    }

    #[test]
    fn rejects_unknown_codes() {
        let error = "*NOPE".parse::<ObjectType>().expect_err("unknown");
        assert_eq!(
            error,
            ConfigError::UnknownObjectType {
                value: "*NOPE".to_owned()
            }
        );
        assert!("".parse::<ObjectType>().is_err());
    }

    #[test]
    fn every_supported_code_round_trips_through_its_text() {
        for ty in ObjectType::supported() {
            assert_eq!(ty.as_str().parse::<ObjectType>().expect("valid"), ty);
        }
        assert!(ObjectType::supported().count() < usize::from(u8::MAX));
    }

    #[test]
    fn normalised_lists_are_sorted_and_collapse_all() {
        let program: ObjectType = "*PGM".parse().expect("valid");
        let file: ObjectType = "*FILE".parse().expect("valid");

        assert_eq!(normalise_types(&[program, file, program]), [file, program]);
        assert_eq!(normalise_types(&[program, ObjectType::ALL]), [ObjectType::ALL]);
        assert_eq!(normalise_types(&[]), [ObjectType::ALL]);
    }
}
