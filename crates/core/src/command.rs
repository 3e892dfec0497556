//! CL command text for the save, restore and save-file steps.
//!
//! Commands are built from validated values only, so their text is always
//! well formed. Whole-library runs use `SAVLIB`/`RSTLIB`; object selections
//! use `SAVOBJ`/`RSTOBJ` with an `OBJTYPE` list that is the union of every
//! object's types. When objects ask for different types, each
//! (object, type) pair that the union would select but the object did not
//! ask for is excluded with `OMITOBJ`. A union of `*ALL` selects every
//! concrete type, so a restricted object next to `*ALL` is excluded for
//! every type it did not ask for.

use std::collections::HashSet;
use std::fmt;

use crate::error::ConfigError;
use crate::names::{LibraryName, ObjectName};
use crate::object_type::{ObjectType, normalise_types};
use crate::release::ReleaseLevel;
use crate::selection::{ObjectSpec, RemoteSaveFile};

/// Description attached to save files created on a host.
pub const SAVE_FILE_TEXT: &str = "zipSeries save file";

/// Most `OMITOBJ` entries `SAVOBJ` and `RSTOBJ` accept.
pub const MAX_OMISSIONS: usize = 300;

/// Messages with which `CRTSAVF` reports that the save file already exists.
pub const SAVE_FILE_EXISTS_MESSAGES: [&str; 2] = ["CPF5813", "CPF7302"];

/// Returns the `CRTSAVF` command creating `save_file`.
#[must_use]
pub fn create_save_file(save_file: &RemoteSaveFile) -> String {
    format!("CRTSAVF FILE({save_file}) TEXT('{SAVE_FILE_TEXT}')")
}

/// Returns the `CLRSAVF` command emptying an existing `save_file`.
#[must_use]
pub fn clear_save_file(save_file: &RemoteSaveFile) -> String {
    format!("CLRSAVF FILE({save_file})")
}

/// Selected objects, each with the types it resolves to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ObjectSelection {
    entries: Vec<(ObjectName, Vec<ObjectType>)>,
}

impl ObjectSelection {
    /// Resolves each spec's types against `default_types` and validates the
    /// selection.
    ///
    /// The list must be non-empty and free of duplicates, and the
    /// exclusions it needs must fit in one command.
    pub fn resolve(specs: &[ObjectSpec], default_types: &[ObjectType]) -> Result<Self, ConfigError> {
        if specs.is_empty() {
            return Err(ConfigError::EmptyObjectList);
        }

        let default_types = normalise_types(default_types);
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(specs.len());
        for spec in specs {
            if !seen.insert(spec.name().clone()) {
                return Err(ConfigError::DuplicateObject {
                    name: spec.name().to_string(),
                });
            }
            let types = spec
                .types()
                .map_or_else(|| default_types.clone(), normalise_types);
            entries.push((spec.name().clone(), types));
        }

        let selection = Self { entries };
        let count = selection.omissions().len();
        if count > MAX_OMISSIONS {
            return Err(ConfigError::TooManyOmissions {
                count,
                limit: MAX_OMISSIONS,
            });
        }
        Ok(selection)
    }

    /// Returns the object names in selection order.
    pub fn names(&self) -> impl Iterator<Item = &ObjectName> {
        self.entries.iter().map(|(name, _)| name)
    }

    /// Returns the union of all object types, in canonical order.
    #[must_use]
    pub fn union(&self) -> Vec<ObjectType> {
        let all: Vec<ObjectType> = self
            .entries
            .iter()
            .flat_map(|(_, types)| types.iter().copied())
            .collect();
        normalise_types(&all)
    }

    /// Returns the (object, type) pairs the union selects but the object
    /// did not ask for.
    #[must_use]
    pub fn omissions(&self) -> Vec<(&ObjectName, ObjectType)> {
        let mut union = self.union();
        if union.first().is_some_and(|ty| ty.is_all()) {
            union = ObjectType::supported().filter(|ty| !ty.is_all()).collect();
        }
        self.entries
            .iter()
            .filter(|(_, types)| !types.first().is_some_and(|ty| ty.is_all()))
            .flat_map(|(name, types)| {
                union
                    .iter()
                    .filter(|ty| !types.contains(ty))
                    .map(move |ty| (name, *ty))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn write_clauses(&self, f: &mut fmt::Formatter<'_>, library: &LibraryName) -> fmt::Result {
        let omissions = self.omissions();
        if omissions.is_empty() {
            return Ok(());
        }
        let pairs: Vec<String> = omissions
            .iter()
            .map(|(name, ty)| format!("({library}/{name} {ty})"))
            .collect();
        write!(f, " OMITOBJ({})", pairs.join(" "))
    }

    fn object_list(&self) -> String {
        self.names()
            .map(ObjectName::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn join(types: &[ObjectType]) -> String {
    types
        .iter()
        .map(|ty| ty.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The save command submitted on the source host.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaveCommand {
    library: LibraryName,
    objects: Option<ObjectSelection>,
    save_file: RemoteSaveFile,
    release: ReleaseLevel,
}

impl SaveCommand {
    /// Creates a save command; `objects` of `None` saves the whole library.
    #[must_use]
    pub const fn new(
        library: LibraryName,
        objects: Option<ObjectSelection>,
        save_file: RemoteSaveFile,
        release: ReleaseLevel,
    ) -> Self {
        Self {
            library,
            objects,
            save_file,
            release,
        }
    }

    /// Returns `true` when the whole library is saved.
    #[must_use]
    pub const fn is_whole_library(&self) -> bool {
        self.objects.is_none()
    }

    /// Returns the library saved from.
    #[must_use]
    pub const fn library(&self) -> &LibraryName {
        &self.library
    }

    /// Returns the host save file written by the command.
    #[must_use]
    pub const fn save_file(&self) -> &RemoteSaveFile {
        &self.save_file
    }

    /// Returns the target release.
    #[must_use]
    pub const fn release(&self) -> ReleaseLevel {
        self.release
    }

    /// Returns a one-line description for progress output.
    #[must_use]
    pub fn summary(&self) -> String {
        match &self.objects {
            None => format!(
                "save library {} for release {}",
                self.library, self.release
            ),
            Some(objects) => format!(
                "save {} from library {} for release {}",
                objects.object_list(),
                self.library,
                self.release
            ),
        }
    }
}

impl fmt::Display for SaveCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.objects {
            None => write!(
                f,
                "SAVLIB LIB({}) DEV(*SAVF) SAVF({}) TGTRLS({})",
                self.library, self.save_file, self.release
            ),
            Some(objects) => {
                write!(
                    f,
                    "SAVOBJ OBJ({}) LIB({}) DEV(*SAVF) OBJTYPE({}) SAVF({}) TGTRLS({})",
                    objects.object_list(),
                    self.library,
                    join(&objects.union()),
                    self.save_file,
                    self.release
                )?;
                objects.write_clauses(f, &self.library)
            }
        }
    }
}

/// The restore command submitted on the target host.
///
/// The release is carried for reporting: the save was already made for it
/// with `TGTRLS`, and the restore commands have no release parameter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RestoreCommand {
    saved_library: LibraryName,
    restore_library: LibraryName,
    objects: Option<ObjectSelection>,
    save_file: RemoteSaveFile,
    release: ReleaseLevel,
}

impl RestoreCommand {
    /// Creates a restore command; `objects` of `None` restores the whole
    /// library.
    #[must_use]
    pub const fn new(
        saved_library: LibraryName,
        restore_library: LibraryName,
        objects: Option<ObjectSelection>,
        save_file: RemoteSaveFile,
        release: ReleaseLevel,
    ) -> Self {
        Self {
            saved_library,
            restore_library,
            objects,
            save_file,
            release,
        }
    }

    /// Returns the library name recorded in the save file.
    #[must_use]
    pub const fn saved_library(&self) -> &LibraryName {
        &self.saved_library
    }

    /// Returns the host save file read by the command.
    #[must_use]
    pub const fn save_file(&self) -> &RemoteSaveFile {
        &self.save_file
    }

    /// Returns the release the save targeted.
    #[must_use]
    pub const fn release(&self) -> ReleaseLevel {
        self.release
    }

    /// Returns a one-line description for progress output.
    #[must_use]
    pub fn summary(&self) -> String {
        match &self.objects {
            None => format!(
                "restore library {} at release {}",
                self.restore_library, self.release
            ),
            Some(objects) => format!(
                "restore {} into library {} at release {}",
                objects.object_list(),
                self.restore_library,
                self.release
            ),
        }
    }
}

impl fmt::Display for RestoreCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.objects {
            None => write!(
                f,
                "RSTLIB SAVLIB({}) DEV(*SAVF) SAVF({}) RSTLIB({}) MBROPT(*ALL) ALWOBJDIF(*ALL)",
                self.saved_library, self.save_file, self.restore_library
            ),
            Some(objects) => {
                write!(
                    f,
                    "RSTOBJ OBJ({}) SAVLIB({}) DEV(*SAVF) OBJTYPE({}) SAVF({}) RSTLIB({}) MBROPT(*ALL) ALWOBJDIF(*ALL)",
                    objects.object_list(),
                    self.saved_library,
                    join(&objects.union()),
                    self.save_file,
                    self.restore_library
                )?;
                objects.write_clauses(f, &self.saved_library)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lib(name: &str) -> LibraryName {
        name.parse().expect("library")
    }

    fn spec(text: &str) -> ObjectSpec {
        text.parse().expect("object spec")
    }

    fn ty(text: &str) -> ObjectType {
        text.parse().expect("object type")
    }

    #[test]
    fn whole_library_save_uses_savlib() {
        let command = SaveCommand::new(
            lib("PAYROLL"),
            None,
            RemoteSaveFile::default(),
            ReleaseLevel::V7R3M0,
        );
        assert_eq!(
            command.to_string(),
            "SAVLIB LIB(PAYROLL) DEV(*SAVF) SAVF(QTEMP/ZIPSERIES) TGTRLS(V7R3M0)"
        );
        assert!(command.is_whole_library());
        assert_eq!(command.summary(), "save library PAYROLL for release V7R3M0");
    }

    #[test]
    fn object_save_enumerates_objects_in_order() {
        let selection =
            ObjectSelection::resolve(&[spec("ZETA"), spec("ALPHA")], &[]).expect("selection");
        let command = SaveCommand::new(
            lib("PAYROLL"),
            Some(selection),
            RemoteSaveFile::default(),
            ReleaseLevel::Current,
        );
        assert_eq!(
            command.to_string(),
            "SAVOBJ OBJ(ZETA ALPHA) LIB(PAYROLL) DEV(*SAVF) OBJTYPE(*ALL) SAVF(QTEMP/ZIPSERIES) TGTRLS(*CURRENT)"
        );
    }

    #[test]
    fn default_types_apply_to_every_object() {
        let selection = ObjectSelection::resolve(&[spec("A"), spec("B")], &[ty("*PGM"), ty("*FILE")])
            .expect("selection");
        assert_eq!(selection.union(), [ty("*FILE"), ty("*PGM")]);
        assert!(selection.omissions().is_empty());
    }

    #[test]
    fn differing_types_produce_omissions() {
        let selection =
            ObjectSelection::resolve(&[spec("EMPMAST:*FILE"), spec("CALC:*PGM")], &[])
                .expect("selection");
        let command = SaveCommand::new(
            lib("PAYROLL"),
            Some(selection),
            RemoteSaveFile::default(),
            ReleaseLevel::V7R1M0,
        );
        assert_eq!(
            command.to_string(),
            "SAVOBJ OBJ(EMPMAST CALC) LIB(PAYROLL) DEV(*SAVF) OBJTYPE(*FILE *PGM) \
             SAVF(QTEMP/ZIPSERIES) TGTRLS(V7R1M0) \
             OMITOBJ((PAYROLL/EMPMAST *PGM) (PAYROLL/CALC *FILE))"
        );
    }

    #[test]
    fn restricted_types_next_to_all_omit_every_other_type() {
        let selection = ObjectSelection::resolve(&[spec("EMPMAST"), spec("CALC:*PGM")], &[])
            .expect("selection");
        assert_eq!(selection.union(), [ObjectType::ALL]);

        let omissions = selection.omissions();
        assert_eq!(omissions.len(), ObjectType::supported().count() - 2);
        assert!(omissions.iter().all(|(name, _)| name.as_str() == "CALC"));
        assert!(omissions.iter().any(|(_, kind)| *kind == ty("*FILE")));
        assert!(!omissions.iter().any(|(_, kind)| *kind == ty("*PGM") || kind.is_all()));

        let command = SaveCommand::new(
            lib("PAYROLL"),
            Some(selection),
            RemoteSaveFile::default(),
            ReleaseLevel::Current,
        )
        .to_string();
        assert!(command.starts_with("SAVOBJ OBJ(EMPMAST CALC) LIB(PAYROLL) DEV(*SAVF) OBJTYPE(*ALL)"));
        assert!(command.contains(" OMITOBJ((PAYROLL/CALC *ALRTBL) "));
        assert!(!command.contains("(PAYROLL/CALC *PGM)"));
        assert!(!command.contains("PAYROLL/EMPMAST"));
    }

    #[test]
    fn too_many_exclusions_ask_for_a_separate_run() {
        let specs: Vec<ObjectSpec> = ["ALL1", "A:*PGM", "B:*PGM", "C:*PGM", "D:*PGM"]
            .into_iter()
            .map(spec)
            .collect();
        let error = ObjectSelection::resolve(&specs, &[]).expect_err("over the limit");
        assert!(matches!(
            error,
            ConfigError::TooManyOmissions { count, limit: MAX_OMISSIONS } if count > MAX_OMISSIONS
        ));
        assert!(error.to_string().contains("separate run"));
    }

    #[test]
    fn generic_names_are_saved_as_given() {
        let selection = ObjectSelection::resolve(&[spec("pay*"), spec("EMPMAST")], &[ty("*FILE")])
            .expect("selection");
        let command = SaveCommand::new(
            lib("PAYROLL"),
            Some(selection),
            RemoteSaveFile::default(),
            ReleaseLevel::Current,
        );
        assert_eq!(
            command.to_string(),
            "SAVOBJ OBJ(PAY* EMPMAST) LIB(PAYROLL) DEV(*SAVF) OBJTYPE(*FILE) SAVF(QTEMP/ZIPSERIES) TGTRLS(*CURRENT)"
        );
    }

    #[test]
    fn empty_and_duplicate_selections_are_rejected() {
        assert_eq!(
            ObjectSelection::resolve(&[], &[]),
            Err(ConfigError::EmptyObjectList)
        );
        assert!(matches!(
            ObjectSelection::resolve(&[spec("A"), spec("a:*PGM")], &[]),
            Err(ConfigError::DuplicateObject { name }) if name == "A"
        ));
    }

    #[test]
    fn whole_library_restore_uses_rstlib() {
        let command = RestoreCommand::new(
            lib("PAYROLL"),
            lib("PAYROLL2"),
            None,
            RemoteSaveFile::default(),
            ReleaseLevel::V7R3M0,
        );
        assert_eq!(
            command.to_string(),
            "RSTLIB SAVLIB(PAYROLL) DEV(*SAVF) SAVF(QTEMP/ZIPSERIES) RSTLIB(PAYROLL2) MBROPT(*ALL) ALWOBJDIF(*ALL)"
        );
        assert_eq!(
            command.summary(),
            "restore library PAYROLL2 at release V7R3M0"
        );
    }

    #[test]
    fn object_restore_mirrors_the_save_selection() {
        let selection =
            ObjectSelection::resolve(&[spec("EMPMAST:*FILE"), spec("CALC:*PGM")], &[])
                .expect("selection");
        let command = RestoreCommand::new(
            lib("PAYROLL"),
            lib("PAYTEST"),
            Some(selection),
            "MYLIB/XFER".parse().expect("savf"),
            ReleaseLevel::Current,
        );
        assert_eq!(
            command.to_string(),
            "RSTOBJ OBJ(EMPMAST CALC) SAVLIB(PAYROLL) DEV(*SAVF) OBJTYPE(*FILE *PGM) \
             SAVF(MYLIB/XFER) RSTLIB(PAYTEST) MBROPT(*ALL) ALWOBJDIF(*ALL) \
             OMITOBJ((PAYROLL/EMPMAST *PGM) (PAYROLL/CALC *FILE))"
        );
    }

    #[test]
    fn save_file_preparation_commands() {
        let savf = RemoteSaveFile::default();
        assert_eq!(
            create_save_file(&savf),
            "CRTSAVF FILE(QTEMP/ZIPSERIES) TEXT('zipSeries save file')"
        );
        assert_eq!(clear_save_file(&savf), "CLRSAVF FILE(QTEMP/ZIPSERIES)");
    }
}
