//! The save, transfer and restore sequence.
//!
//! # Overview
//!
//! [`run`] validates a [`Configuration`], resolves every password the run
//! needs, then drives the source and target hosts through the steps of the
//! derived [`ExecutionMode`]:
//!
//! 1. source: prepare the save file, save, download the save file;
//! 2. target: prepare the save file, upload, restore.
//!
//! # Design
//!
//! Host-to-host movement is staged through the local machine. In a full
//! migration the save file is downloaded to a temporary file that is
//! deleted once the restore succeeds, and kept (its path reported) when the
//! restore side fails, so the restore can be retried with a local target
//! save file. Each session is closed as soon as its role's work is done,
//! on success and on failure alike.
//!
//! # Errors
//!
//! Nothing is retried. The first failing step ends the run; see
//! [`MigrationOutcome`] for how failures before and after the save
//! completed are told apart.

use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::{info, warn};
use transport::{CommandResult, Connector, Credentials, RemoteSession};

use crate::command::{SAVE_FILE_EXISTS_MESSAGES, clear_save_file, create_save_file};
use crate::config::Configuration;
use crate::error::{ConfigError, MigrationError};
use crate::mode::ExecutionMode;
use crate::outcome::{MigrationOutcome, MigrationReport};
use crate::plan::{HostLogin, MigrationPlan, RestorePlan, SavePlan, SecretPrompt};
use crate::selection::RemoteSaveFile;
use crate::step::{Role, Step};

const RUN_TARGET: &str = "zipseries::run";

type StepResult<T> = Result<T, (Step, MigrationError)>;

/// Validates `config` and performs the migration it describes.
///
/// `prompt` is asked for missing passwords before any session opens;
/// `connector` opens the sessions.
pub fn run<C: Connector>(
    config: &Configuration,
    prompt: &mut dyn SecretPrompt,
    connector: &mut C,
) -> MigrationOutcome {
    match MigrationPlan::new(config) {
        Ok(plan) => execute(&plan, prompt, connector),
        Err(error) => MigrationOutcome::Failure {
            report: MigrationReport::default(),
            step: Step::Validate,
            error: error.into(),
        },
    }
}

/// Performs an already validated plan.
pub fn execute<C: Connector>(
    plan: &MigrationPlan,
    prompt: &mut dyn SecretPrompt,
    connector: &mut C,
) -> MigrationOutcome {
    let mut migration = Migration {
        plan,
        connector,
        report: MigrationReport::new(plan.mode()),
        staging: None,
    };
    migration.report.complete(Step::Validate);

    match migration.perform(prompt) {
        Ok(()) => MigrationOutcome::Success(migration.report),
        Err((step, error)) => migration.fail(step, error),
    }
}

struct Migration<'a, C> {
    plan: &'a MigrationPlan,
    connector: &'a mut C,
    report: MigrationReport,
    staging: Option<TempPath>,
}

impl<C: Connector> Migration<'_, C> {
    fn perform(&mut self, prompt: &mut dyn SecretPrompt) -> StepResult<()> {
        let credentials = self
            .plan
            .resolve_credentials(prompt)
            .map_err(|error| (Step::ResolveCredentials, error.into()))?;
        self.report.complete(Step::ResolveCredentials);
        let plan = self.plan;
        info!(target: RUN_TARGET, mode = %plan.mode(), "starting migration");

        let mut artifact = None;
        if let Some(save) = plan.save() {
            let source = credentials.get(Role::Source).ok_or_else(|| missing(Role::Source))?;
            let destination = self.save_destination(save)?;
            self.save(save, source, &destination)?;
            artifact = Some(destination);
        }

        if let Some(restore) = plan.restore() {
            let target = credentials.get(Role::Target).ok_or_else(|| missing(Role::Target))?;
            let local = match (restore.restore_from(), artifact) {
                (Some(path), _) => path.to_path_buf(),
                (None, Some(path)) => path,
                (None, None) => return Err(missing_artifact()),
            };
            self.restore(restore, target, &local)?;
        }

        info!(target: RUN_TARGET, "migration complete");
        Ok(())
    }

    fn save_destination(&mut self, save: &SavePlan) -> StepResult<PathBuf> {
        if let Some(path) = save.keep_at() {
            return Ok(path.to_path_buf());
        }
        let staging = tempfile::Builder::new()
            .prefix("zipseries-")
            .suffix(".savf")
            .tempfile()
            .map_err(|error| {
                (
                    Step::Download,
                    MigrationError::Staging {
                        reason: error.to_string(),
                    },
                )
            })?
            .into_temp_path();
        let path = staging.to_path_buf();
        self.staging = Some(staging);
        Ok(path)
    }

    fn save(&mut self, save: &SavePlan, credentials: &Credentials, destination: &Path) -> StepResult<()> {
        let mut session = self.open(save.login(), credentials)?;
        let result = self.save_with(&mut session, save, destination);
        close(&mut session, Role::Source);
        result
    }

    fn save_with(
        &mut self,
        session: &mut C::Session,
        save: &SavePlan,
        destination: &Path,
    ) -> StepResult<()> {
        let command = save.command();
        let save_file = command.save_file();

        prepare_save_file(session, Role::Source, save_file)
            .map_err(|error| (Step::PrepareSaveFile(Role::Source), error))?;
        self.report.complete(Step::PrepareSaveFile(Role::Source));

        info!(target: RUN_TARGET, "{}", command.summary());
        let text = command.to_string();
        submit(session, Role::Source, &text).map_err(|error| (Step::Save, error))?;
        self.report.complete(Step::Save);
        self.report.set_save_command(text);

        let transfer = session
            .download(&save_file.to_string(), destination)
            .map_err(|error| (Step::Download, MigrationError::session(Role::Source, error)))?;
        self.report.complete(Step::Download);
        self.report.set_bytes(transfer.bytes());
        if save.keep_at().is_some() {
            self.report.set_artifact(destination.to_path_buf());
        }
        Ok(())
    }

    fn restore(
        &mut self,
        restore: &RestorePlan,
        credentials: &Credentials,
        local: &Path,
    ) -> StepResult<()> {
        let mut session = self.open(restore.login(), credentials)?;
        let result = self.restore_with(&mut session, restore, local);
        close(&mut session, Role::Target);
        result
    }

    fn restore_with(
        &mut self,
        session: &mut C::Session,
        restore: &RestorePlan,
        local: &Path,
    ) -> StepResult<()> {
        let command = restore.command();
        let save_file = command.save_file();

        prepare_save_file(session, Role::Target, save_file)
            .map_err(|error| (Step::PrepareSaveFile(Role::Target), error))?;
        self.report.complete(Step::PrepareSaveFile(Role::Target));

        let transfer = session
            .upload(local, &save_file.to_string())
            .map_err(|error| (Step::Upload, MigrationError::session(Role::Target, error)))?;
        self.report.complete(Step::Upload);
        self.report.set_bytes(transfer.bytes());

        info!(target: RUN_TARGET, "{}", command.summary());
        let text = command.to_string();
        submit(session, Role::Target, &text).map_err(|error| (Step::Restore, error))?;
        self.report.complete(Step::Restore);
        self.report.set_restore_command(text);
        Ok(())
    }

    fn open(&mut self, login: &HostLogin, credentials: &Credentials) -> StepResult<C::Session> {
        let role = login.role();
        info!(target: RUN_TARGET, %role, server = login.server(), user = login.user(), "connecting");
        let session = self
            .connector
            .open(login.server(), credentials)
            .map_err(|error| (Step::Connect(role), MigrationError::session(role, error)))?;
        self.report.complete(Step::Connect(role));
        Ok(session)
    }

    /// Builds the failure outcome. Once the save file is on the local
    /// machine, a failing restore side is a partial failure and the
    /// intermediate copy is kept.
    fn fail(mut self, step: Step, error: MigrationError) -> MigrationOutcome {
        let partial = self.plan.mode() == ExecutionMode::SaveAndRestore
            && self.report.has_completed(Step::Download);
        if !partial {
            return MigrationOutcome::Failure {
                report: self.report,
                step,
                error,
            };
        }

        if let Some(staging) = self.staging.take() {
            match staging.keep() {
                Ok(path) => {
                    info!(target: RUN_TARGET, path = %path.display(), "kept local save file");
                    self.report.set_artifact(path);
                }
                Err(keep) => {
                    warn!(target: RUN_TARGET, "cannot keep local save file: {}", keep.error);
                }
            }
        }
        MigrationOutcome::PartialFailure {
            report: self.report,
            failed: step,
            error,
        }
    }
}

/// Creates the host save file, clearing it instead when it already exists.
fn prepare_save_file<S: RemoteSession>(
    session: &mut S,
    role: Role,
    save_file: &RemoteSaveFile,
) -> Result<(), MigrationError> {
    let created = session
        .submit(&create_save_file(save_file))
        .map_err(|error| MigrationError::session(role, error))?;
    if created.succeeded() {
        return Ok(());
    }
    if SAVE_FILE_EXISTS_MESSAGES
        .iter()
        .any(|id| created.has_message(id))
    {
        submit(session, role, &clear_save_file(save_file))?;
        return Ok(());
    }
    Err(rejected(session, role, created))
}

/// Submits `command`, turning a failing reply into an error.
fn submit<S: RemoteSession>(
    session: &mut S,
    role: Role,
    command: &str,
) -> Result<CommandResult, MigrationError> {
    let result = session
        .submit(command)
        .map_err(|error| MigrationError::session(role, error))?;
    if result.succeeded() {
        Ok(result)
    } else {
        Err(rejected(session, role, result))
    }
}

fn rejected<S: RemoteSession>(session: &S, role: Role, result: CommandResult) -> MigrationError {
    MigrationError::RemoteCommand {
        role,
        host: session.host().to_owned(),
        result,
    }
}

fn close<S: RemoteSession>(session: &mut S, role: Role) {
    if let Err(error) = session.close() {
        warn!(target: RUN_TARGET, %role, "closing session failed: {error}");
    }
}

fn missing(role: Role) -> (Step, MigrationError) {
    (
        Step::ResolveCredentials,
        ConfigError::MissingField {
            role,
            field: "password",
        }
        .into(),
    )
}

fn missing_artifact() -> (Step, MigrationError) {
    (
        Step::Upload,
        ConfigError::MissingField {
            role: Role::Target,
            field: "save file",
        }
        .into(),
    )
}
