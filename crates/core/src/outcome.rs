use std::path::{Path, PathBuf};

use crate::error::MigrationError;
use crate::exit_code::ExitCode;
use crate::mode::ExecutionMode;
use crate::step::Step;

/// What a run got done, whatever its outcome.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MigrationReport {
    mode: Option<ExecutionMode>,
    completed: Vec<Step>,
    save_command: Option<String>,
    restore_command: Option<String>,
    artifact: Option<PathBuf>,
    bytes: Option<u64>,
}

impl MigrationReport {
    pub(crate) fn new(mode: ExecutionMode) -> Self {
        Self {
            mode: Some(mode),
            ..Self::default()
        }
    }

    pub(crate) fn complete(&mut self, step: Step) {
        self.completed.push(step);
    }

    pub(crate) fn set_save_command(&mut self, command: String) {
        self.save_command = Some(command);
    }

    pub(crate) fn set_restore_command(&mut self, command: String) {
        self.restore_command = Some(command);
    }

    pub(crate) fn set_artifact(&mut self, path: PathBuf) {
        self.artifact = Some(path);
    }

    pub(crate) fn set_bytes(&mut self, bytes: u64) {
        self.bytes = Some(bytes);
    }

    /// Returns the execution mode, unknown when validation failed.
    #[must_use]
    pub const fn mode(&self) -> Option<ExecutionMode> {
        self.mode
    }

    /// Returns the steps that completed, in order.
    #[must_use]
    pub fn completed(&self) -> &[Step] {
        &self.completed
    }

    /// Returns `true` when `step` completed.
    #[must_use]
    pub fn has_completed(&self, step: Step) -> bool {
        self.completed.contains(&step)
    }

    /// Returns the save command that ran successfully.
    #[must_use]
    pub fn save_command(&self) -> Option<&str> {
        self.save_command.as_deref()
    }

    /// Returns the restore command that ran successfully.
    #[must_use]
    pub fn restore_command(&self) -> Option<&str> {
        self.restore_command.as_deref()
    }

    /// Returns the local save file left behind: the requested file of a
    /// save-only run, or the kept intermediate copy after a partial failure.
    #[must_use]
    pub fn artifact(&self) -> Option<&Path> {
        self.artifact.as_deref()
    }

    /// Returns the size of the save file, once it has been transferred.
    #[must_use]
    pub const fn bytes(&self) -> Option<u64> {
        self.bytes
    }
}

/// Result of [`run`](crate::run).
#[derive(Debug)]
pub enum MigrationOutcome {
    /// Every step the mode requires completed.
    Success(MigrationReport),
    /// The save completed and its file reached the local machine, but the
    /// restore side failed. Nothing that completed is undone.
    PartialFailure {
        /// What completed; [`MigrationReport::artifact`] holds the kept
        /// save file.
        report: MigrationReport,
        /// The step that failed.
        failed: Step,
        /// Why it failed.
        error: MigrationError,
    },
    /// The run failed before producing anything usable.
    Failure {
        /// What completed before the failure.
        report: MigrationReport,
        /// The step that failed.
        step: Step,
        /// Why it failed.
        error: MigrationError,
    },
}

impl MigrationOutcome {
    /// Returns `true` for [`MigrationOutcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the report of completed work.
    #[must_use]
    pub const fn report(&self) -> &MigrationReport {
        match self {
            Self::Success(report)
            | Self::PartialFailure { report, .. }
            | Self::Failure { report, .. } => report,
        }
    }

    /// Returns the failed step and its error, if the run failed.
    #[must_use]
    pub const fn failure(&self) -> Option<(Step, &MigrationError)> {
        match self {
            Self::Success(_) => None,
            Self::PartialFailure { failed, error, .. } => Some((*failed, error)),
            Self::Failure { step, error, .. } => Some((*step, error)),
        }
    }

    /// Returns the last step that completed before a partial failure.
    #[must_use]
    pub fn completed_step(&self) -> Option<Step> {
        self.report().completed().last().copied()
    }

    /// Returns the process exit code for the outcome.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Success(_) => ExitCode::Ok,
            Self::PartialFailure { .. } => ExitCode::PartialFailure,
            Self::Failure { error, .. } => error.exit_code(),
        }
    }
}
