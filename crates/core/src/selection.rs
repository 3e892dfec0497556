use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::names::{LibraryName, ObjectName};
use crate::object_type::ObjectType;

/// An object named on the command line, optionally restricted to types.
///
/// Written `NAME` or `NAME:TYPE[,TYPE...]`, e.g. `EMPMAST:*FILE` or
/// `CALC:*PGM,*SRVPGM`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ObjectSpec {
    name: ObjectName,
    types: Option<Vec<ObjectType>>,
}

impl ObjectSpec {
    /// Creates a spec that uses the default types.
    #[must_use]
    pub const fn new(name: ObjectName) -> Self {
        Self { name, types: None }
    }

    /// Creates a spec restricted to `types`.
    #[must_use]
    pub const fn with_types(name: ObjectName, types: Vec<ObjectType>) -> Self {
        Self {
            name,
            types: Some(types),
        }
    }

    /// Returns the object name.
    #[must_use]
    pub const fn name(&self) -> &ObjectName {
        &self.name
    }

    /// Returns the per-object type override, if any.
    #[must_use]
    pub fn types(&self) -> Option<&[ObjectType]> {
        self.types.as_deref()
    }
}

impl FromStr for ObjectSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConfigError::InvalidObject {
            value: s.trim().to_owned(),
            reason: reason.to_owned(),
        };
        match s.trim().split_once(':') {
            None => Ok(Self::new(s.parse()?)),
            Some((name, types)) => {
                let name = name.parse()?;
                let types = types
                    .split(',')
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(str::parse)
                    .collect::<Result<Vec<ObjectType>, _>>()?;
                if types.is_empty() {
                    return Err(invalid("no object type after ':'"));
                }
                Ok(Self::with_types(name, types))
            }
        }
    }
}

impl fmt::Display for ObjectSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_str())?;
        if let Some(types) = &self.types {
            let codes: Vec<&str> = types.iter().map(|ty| ty.as_str()).collect();
            write!(f, ":{}", codes.join(","))?;
        }
        Ok(())
    }
}

/// Host-side save file, `LIBRARY/FILE`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct RemoteSaveFile {
    library: LibraryName,
    file: ObjectName,
}

impl RemoteSaveFile {
    /// Creates a save-file reference.
    #[must_use]
    pub const fn new(library: LibraryName, file: ObjectName) -> Self {
        Self { library, file }
    }

    /// Returns the library holding the save file.
    #[must_use]
    pub const fn library(&self) -> &LibraryName {
        &self.library
    }

    /// Returns the save-file name.
    #[must_use]
    pub const fn file(&self) -> &ObjectName {
        &self.file
    }

    /// Returns `true` when the file lives in the job-scoped `QTEMP` library
    /// and therefore disappears when the session ends.
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self.library.as_str() == "QTEMP"
    }
}

impl Default for RemoteSaveFile {
    /// `QTEMP/ZIPSERIES`.
    fn default() -> Self {
        Self {
            library: LibraryName::from_static("QTEMP"),
            file: ObjectName::from_static("ZIPSERIES"),
        }
    }
}

impl FromStr for RemoteSaveFile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((library, file)) = s.trim().split_once('/') else {
            return Err(ConfigError::InvalidSaveFile {
                value: s.trim().to_owned(),
            });
        };
        let file: ObjectName = file.parse()?;
        if file.is_generic() {
            return Err(ConfigError::InvalidSaveFile {
                value: s.trim().to_owned(),
            });
        }
        Ok(Self::new(library.parse()?, file))
    }
}

impl fmt::Display for RemoteSaveFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.library, self.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name_has_no_override() {
        let spec: ObjectSpec = "empmast".parse().expect("valid");
        assert_eq!(spec.name().as_str(), "EMPMAST");
        assert!(spec.types().is_none());
        assert_eq!(spec.to_string(), "EMPMAST");
    }

    #[test]
    fn types_follow_a_colon() {
        let spec: ObjectSpec = "CALC:*PGM, srvpgm".parse().expect("valid");
        let codes: Vec<_> = spec
            .types()
            .expect("override")
            .iter()
            .map(|ty| ty.as_str())
            .collect();
        assert_eq!(codes, ["*PGM", "*SRVPGM"]);
        assert_eq!(spec.to_string(), "CALC:*PGM,*SRVPGM");
    }

    #[test]
    fn empty_type_list_is_rejected() {
        assert!(matches!(
            "CALC:".parse::<ObjectSpec>(),
            Err(ConfigError::InvalidObject { .. })
        ));
        assert!(matches!(
            "CALC:*BOGUS".parse::<ObjectSpec>(),
            Err(ConfigError::UnknownObjectType { .. })
        ));
    }

    #[test]
    fn generic_names_select_objects() {
        let spec: ObjectSpec = "pay*:*file".parse().expect("generic");
        assert_eq!(spec.name().as_str(), "PAY*");
        assert_eq!(spec.to_string(), "PAY*:*FILE");

        let spec: ObjectSpec = "*ALL".parse().expect("all objects");
        assert_eq!(spec.name().as_str(), "*ALL");
        assert!(spec.types().is_none());
    }

    #[test]
    fn save_file_must_name_one_file() {
        for value in ["MYLIB/XFER*", "MYLIB/*ALL"] {
            assert!(
                matches!(
                    value.parse::<RemoteSaveFile>(),
                    Err(ConfigError::InvalidSaveFile { .. })
                ),
                "{value}"
            );
        }
    }

    #[test]
    fn default_save_file_is_in_qtemp() {
        let savf = RemoteSaveFile::default();
        assert_eq!(savf.to_string(), "QTEMP/ZIPSERIES");
        assert!(savf.is_temporary());
    }

    #[test]
    fn save_file_requires_a_library() {
        let savf: RemoteSaveFile = "mylib/transfer".parse().expect("valid");
        assert_eq!(savf.to_string(), "MYLIB/TRANSFER");
        assert!(!savf.is_temporary());
        assert!(matches!(
            "TRANSFER".parse::<RemoteSaveFile>(),
            Err(ConfigError::InvalidSaveFile { .. })
        ));
    }
}
