#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Program names and config-file locations.
pub mod branding;
mod command;
mod config;
mod error;
/// Process exit codes for migration outcomes.
pub mod exit_code;
mod migration;
mod mode;
mod names;
mod object_type;
mod outcome;
mod plan;
mod release;
mod selection;
mod step;

pub use command::{
    ObjectSelection, RestoreCommand, SAVE_FILE_EXISTS_MESSAGES, SAVE_FILE_TEXT, SaveCommand,
    clear_save_file, create_save_file,
};
pub use config::{Configuration, SourceConfig, TargetConfig};
pub use error::{ConfigError, ErrorCategory, MigrationError};
pub use exit_code::ExitCode;
pub use migration::{execute, run};
pub use mode::ExecutionMode;
pub use names::{LibraryName, NameKind, ObjectName};
pub use object_type::ObjectType;
pub use outcome::{MigrationOutcome, MigrationReport};
pub use plan::{HostLogin, MigrationPlan, ResolvedCredentials, RestorePlan, SavePlan, SecretPrompt};
pub use release::ReleaseLevel;
pub use selection::{ObjectSpec, RemoteSaveFile};
pub use step::{Role, Step};
pub use transport::Secret;
