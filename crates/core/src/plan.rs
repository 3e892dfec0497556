use std::path::{Path, PathBuf};

use transport::{Credentials, Secret};

use crate::command::{ObjectSelection, RestoreCommand, SaveCommand};
use crate::config::{Configuration, SourceConfig, TargetConfig};
use crate::error::ConfigError;
use crate::mode::ExecutionMode;
use crate::names::LibraryName;
use crate::step::Role;

/// Obtains passwords that were not configured.
///
/// Called at most once per role, before any session is opened.
pub trait SecretPrompt {
    /// Returns the password of `user` on `server` for `role`.
    fn password(&mut self, role: Role, server: &str, user: &str) -> Result<Secret, ConfigError>;
}

/// Host name, user profile and (possibly still missing) password of one role.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HostLogin {
    role: Role,
    server: String,
    user: String,
    password: Option<Secret>,
}

impl HostLogin {
    fn from_parts(
        role: Role,
        server: Option<&String>,
        user: Option<&String>,
        password: Option<&Secret>,
    ) -> Result<Self, ConfigError> {
        let server = required(role, "server", server.map(|value| value.trim()))?;
        let user = required(role, "user", user.map(|value| value.trim()))?;
        Ok(Self {
            role,
            server: server.to_owned(),
            user: user.to_ascii_uppercase(),
            password: password.cloned(),
        })
    }

    /// Returns the role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the host name.
    #[must_use]
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Returns the user profile.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Returns complete credentials, asking `prompt` for a missing password.
    pub fn credentials(&self, prompt: &mut dyn SecretPrompt) -> Result<Credentials, ConfigError> {
        let password = match &self.password {
            Some(password) => password.clone(),
            None => prompt.password(self.role, &self.server, &self.user)?,
        };
        Ok(Credentials::new(&self.user, password))
    }
}

fn required<'a>(role: Role, field: &'static str, value: Option<&'a str>) -> Result<&'a str, ConfigError> {
    value
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingField { role, field })
}

/// Source half of a plan.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SavePlan {
    login: HostLogin,
    command: SaveCommand,
    keep_at: Option<PathBuf>,
}

impl SavePlan {
    /// Returns the source login.
    #[must_use]
    pub const fn login(&self) -> &HostLogin {
        &self.login
    }

    /// Returns the save command.
    #[must_use]
    pub const fn command(&self) -> &SaveCommand {
        &self.command
    }

    /// Returns the local path the save file is kept at in a save-only run.
    #[must_use]
    pub fn keep_at(&self) -> Option<&Path> {
        self.keep_at.as_deref()
    }
}

/// Target half of a plan.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RestorePlan {
    login: HostLogin,
    command: RestoreCommand,
    restore_from: Option<PathBuf>,
}

impl RestorePlan {
    /// Returns the target login.
    #[must_use]
    pub const fn login(&self) -> &HostLogin {
        &self.login
    }

    /// Returns the restore command.
    #[must_use]
    pub const fn command(&self) -> &RestoreCommand {
        &self.command
    }

    /// Returns the pre-existing local save file of a restore-only run.
    #[must_use]
    pub fn restore_from(&self) -> Option<&Path> {
        self.restore_from.as_deref()
    }
}

/// A validated configuration with its commands built.
///
/// Building a plan performs every check that needs no network access, so a
/// run that gets past [`MigrationPlan::new`] only fails on host or transfer
/// errors (or a password that cannot be obtained).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MigrationPlan {
    mode: ExecutionMode,
    save: Option<SavePlan>,
    restore: Option<RestorePlan>,
}

impl MigrationPlan {
    /// Validates `config` and builds the save and restore commands.
    pub fn new(config: &Configuration) -> Result<Self, ConfigError> {
        let mode = ExecutionMode::from_config(config)?;
        let objects = match &config.source.objects {
            Some(specs) => Some(ObjectSelection::resolve(specs, &config.source.object_types)?),
            None => None,
        };

        let save = if mode.saves() {
            Some(save_plan(&config.source, &config.target, objects.clone())?)
        } else {
            None
        };
        let restore = if mode.restores() {
            Some(restore_plan(&config.source, &config.target, objects)?)
        } else {
            None
        };

        Ok(Self {
            mode,
            save,
            restore,
        })
    }

    /// Returns the execution mode.
    #[must_use]
    pub const fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Returns the source half, present when the mode saves.
    #[must_use]
    pub const fn save(&self) -> Option<&SavePlan> {
        self.save.as_ref()
    }

    /// Returns the target half, present when the mode restores.
    #[must_use]
    pub const fn restore(&self) -> Option<&RestorePlan> {
        self.restore.as_ref()
    }

    /// Resolves the credentials of every role the run contacts.
    ///
    /// All prompting happens here, before the first session opens, so an
    /// operator is never asked for a password halfway through a run.
    pub fn resolve_credentials(
        &self,
        prompt: &mut dyn SecretPrompt,
    ) -> Result<ResolvedCredentials, ConfigError> {
        let source = match &self.save {
            Some(save) => Some(save.login.credentials(prompt)?),
            None => None,
        };
        let target = match &self.restore {
            Some(restore) => Some(restore.login.credentials(prompt)?),
            None => None,
        };
        Ok(ResolvedCredentials { source, target })
    }
}

/// Credentials for every role a run contacts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedCredentials {
    source: Option<Credentials>,
    target: Option<Credentials>,
}

impl ResolvedCredentials {
    /// Returns the credentials for `role`, if the run contacts it.
    #[must_use]
    pub const fn get(&self, role: Role) -> Option<&Credentials> {
        match role {
            Role::Source => self.source.as_ref(),
            Role::Target => self.target.as_ref(),
        }
    }
}

fn save_plan(
    source: &SourceConfig,
    target: &TargetConfig,
    objects: Option<ObjectSelection>,
) -> Result<SavePlan, ConfigError> {
    let login = HostLogin::from_parts(
        Role::Source,
        source.server.as_ref(),
        source.user.as_ref(),
        source.password.as_ref(),
    )?;
    let library = source.library.clone().ok_or(ConfigError::MissingField {
        role: Role::Source,
        field: "library",
    })?;

    if let Some(path) = &source.local_save_file {
        let parent = path.parent().filter(|parent| !parent.as_os_str().is_empty());
        if parent.is_some_and(|parent| !parent.is_dir()) {
            return Err(ConfigError::SaveFileDirectoryMissing { path: path.clone() });
        }
    }

    let command = SaveCommand::new(
        library,
        objects,
        source.remote_save_file.clone().unwrap_or_default(),
        target.release,
    );
    Ok(SavePlan {
        login,
        command,
        keep_at: source.local_save_file.clone(),
    })
}

fn restore_plan(
    source: &SourceConfig,
    target: &TargetConfig,
    objects: Option<ObjectSelection>,
) -> Result<RestorePlan, ConfigError> {
    let login = HostLogin::from_parts(
        Role::Target,
        target.server.as_ref(),
        target.user.as_ref(),
        target.password.as_ref(),
    )?;
    let restore_library: LibraryName =
        target.library.clone().ok_or(ConfigError::MissingField {
            role: Role::Target,
            field: "library",
        })?;
    let saved_library = source
        .library
        .clone()
        .unwrap_or_else(|| restore_library.clone());

    if let Some(path) = &target.local_save_file {
        if !path.is_file() {
            return Err(ConfigError::SaveFileNotFound { path: path.clone() });
        }
    }

    let command = RestoreCommand::new(
        saved_library,
        restore_library,
        objects,
        target.remote_save_file.clone().unwrap_or_default(),
        target.release,
    );
    Ok(RestorePlan {
        login,
        command,
        restore_from: target.local_save_file.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::ReleaseLevel;
    use crate::selection::ObjectSpec;
    use std::fs;

    struct Answers {
        calls: Vec<(Role, String, String)>,
        fail: bool,
    }

    impl SecretPrompt for Answers {
        fn password(&mut self, role: Role, server: &str, user: &str) -> Result<Secret, ConfigError> {
            self.calls.push((role, server.to_owned(), user.to_owned()));
            if self.fail {
                Err(ConfigError::PasswordUnavailable {
                    role,
                    user: user.to_owned(),
                    reason: "no terminal".to_owned(),
                })
            } else {
                Ok(Secret::from(format!("{role}-pw")))
            }
        }
    }

    fn full_config() -> Configuration {
        let mut config = Configuration::default();
        config.source.server = Some("src.example.com".to_owned());
        config.source.user = Some("srcusr".to_owned());
        config.source.library = Some("PAYROLL".parse().expect("lib"));
        config.target.server = Some("tgt.example.com".to_owned());
        config.target.user = Some("tgtusr".to_owned());
        config.target.library = Some("PAYROLL2".parse().expect("lib"));
        config.target.release = ReleaseLevel::V7R3M0;
        config
    }

    #[test]
    fn full_plan_builds_both_commands() {
        let plan = MigrationPlan::new(&full_config()).expect("plan");

        assert_eq!(plan.mode(), ExecutionMode::SaveAndRestore);
        let save = plan.save().expect("save half");
        assert_eq!(
            save.command().to_string(),
            "SAVLIB LIB(PAYROLL) DEV(*SAVF) SAVF(QTEMP/ZIPSERIES) TGTRLS(V7R3M0)"
        );
        assert_eq!(save.login().user(), "SRCUSR");
        let restore = plan.restore().expect("restore half");
        assert_eq!(
            restore.command().to_string(),
            "RSTLIB SAVLIB(PAYROLL) DEV(*SAVF) SAVF(QTEMP/ZIPSERIES) RSTLIB(PAYROLL2) MBROPT(*ALL) ALWOBJDIF(*ALL)"
        );
    }

    #[test]
    fn missing_fields_are_named() {
        let mut config = full_config();
        config.target.server = None;
        assert_eq!(
            MigrationPlan::new(&config),
            Err(ConfigError::MissingField {
                role: Role::Target,
                field: "server",
            })
        );

        let mut config = full_config();
        config.source.library = None;
        assert_eq!(
            MigrationPlan::new(&config),
            Err(ConfigError::MissingField {
                role: Role::Source,
                field: "library",
            })
        );
    }

    #[test]
    fn blank_user_counts_as_missing() {
        let mut config = full_config();
        config.source.user = Some("  ".to_owned());
        assert!(matches!(
            MigrationPlan::new(&config),
            Err(ConfigError::MissingField { field: "user", .. })
        ));
    }

    #[test]
    fn restore_only_falls_back_to_target_library_and_ignores_source() {
        let dir = tempfile::tempdir().expect("tempdir");
        let savf = dir.path().join("in.savf");
        fs::write(&savf, b"data").expect("write");

        let mut config = full_config();
        config.source = SourceConfig::default();
        config.target.local_save_file = Some(savf.clone());

        let plan = MigrationPlan::new(&config).expect("plan");
        assert_eq!(plan.mode(), ExecutionMode::RestoreOnly);
        assert!(plan.save().is_none());
        let restore = plan.restore().expect("restore half");
        assert_eq!(restore.command().saved_library().as_str(), "PAYROLL2");
        assert_eq!(restore.restore_from(), Some(savf.as_path()));
    }

    #[test]
    fn restore_only_requires_an_existing_file() {
        let mut config = full_config();
        config.target.local_save_file = Some(PathBuf::from("/nonexistent/zipseries/in.savf"));
        assert!(matches!(
            MigrationPlan::new(&config),
            Err(ConfigError::SaveFileNotFound { .. })
        ));
    }

    #[test]
    fn save_only_needs_no_target() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = full_config();
        config.target = TargetConfig::default();
        config.source.local_save_file = Some(dir.path().join("out.savf"));

        let plan = MigrationPlan::new(&config).expect("plan");
        assert_eq!(plan.mode(), ExecutionMode::SaveOnly);
        assert!(plan.restore().is_none());
        assert_eq!(
            plan.save().and_then(SavePlan::keep_at),
            Some(dir.path().join("out.savf").as_path())
        );
    }

    #[test]
    fn save_only_requires_an_existing_directory() {
        let mut config = full_config();
        config.source.local_save_file = Some(PathBuf::from("/nonexistent/zipseries/out.savf"));
        assert!(matches!(
            MigrationPlan::new(&config),
            Err(ConfigError::SaveFileDirectoryMissing { .. })
        ));
    }

    #[test]
    fn object_selection_flows_into_both_commands() {
        let mut config = full_config();
        config.source.objects = Some(vec![
            "EMPMAST".parse::<ObjectSpec>().expect("spec"),
            "PAYCALC".parse::<ObjectSpec>().expect("spec"),
        ]);
        let plan = MigrationPlan::new(&config).expect("plan");

        assert!(plan.save().expect("save").command().to_string().starts_with("SAVOBJ OBJ(EMPMAST PAYCALC) LIB(PAYROLL)"));
        assert!(plan.restore().expect("restore").command().to_string().starts_with("RSTOBJ OBJ(EMPMAST PAYCALC) SAVLIB(PAYROLL)"));
    }

    #[test]
    fn credentials_prompt_only_for_missing_passwords() {
        let mut config = full_config();
        config.source.password = Some(Secret::from("given"));
        let plan = MigrationPlan::new(&config).expect("plan");
        let mut prompt = Answers {
            calls: Vec::new(),
            fail: false,
        };

        let resolved = plan.resolve_credentials(&mut prompt).expect("resolved");

        assert_eq!(
            prompt.calls,
            [(Role::Target, "tgt.example.com".to_owned(), "TGTUSR".to_owned())]
        );
        let source = resolved.get(Role::Source).expect("source");
        assert_eq!(source.password().expose(), "given");
        let target = resolved.get(Role::Target).expect("target");
        assert_eq!(target.password().expose(), "target-pw");
    }

    #[test]
    fn prompt_failure_is_a_configuration_error() {
        let plan = MigrationPlan::new(&full_config()).expect("plan");
        let mut prompt = Answers {
            calls: Vec::new(),
            fail: true,
        };
        assert!(matches!(
            plan.resolve_credentials(&mut prompt),
            Err(ConfigError::PasswordUnavailable { role: Role::Source, .. })
        ));
        assert_eq!(prompt.calls.len(), 1);
    }
}
