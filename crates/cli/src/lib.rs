#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` is the command-line front end of zipSeries. It turns arguments,
//! named config files and operator answers into a
//! [`Configuration`](zipseries_core::Configuration), hands it to
//! [`zipseries_core::run`] and prints the outcome.
//!
//! # Design
//!
//! [`run`] accepts the arguments together with handles for standard output
//! and error so the binary and the tests drive the same code. Prompts are
//! behind the [`SecretPrompt`](zipseries_core::SecretPrompt) and
//! [`ObjectPrompt`] traits; [`run_with`] takes them explicitly through an
//! [`Interaction`].
//!
//! Values are layered per role: the command line first, then the role's
//! config file (`-c NAME` / `-C NAME`), which only fills what is still unset.
//! When neither objects nor a target save file were given, the operator is
//! asked for objects; without a terminal the whole library is saved.
//!
//! # Invariants
//!
//! - `run` never panics; failures become non-zero exit codes.
//! - Nothing connects to a host until the configuration is complete and
//!   every needed password is known.
//! - A successful run reports on standard output; any failure reports on
//!   standard error.
//!
//! # Errors
//!
//! Argument errors print clap's diagnostic and exit with `1`, as do
//! configuration errors. Run failures exit with the code of
//! [`MigrationOutcome::exit_code`](zipseries_core::MigrationOutcome::exit_code).
//!
//! # Examples
//!
//! ```
//! let mut stdout = Vec::new();
//! let mut stderr = Vec::new();
//! let exit_code = cli::run(["zipseries", "--version"], &mut stdout, &mut stderr);
//!
//! assert_eq!(exit_code, 0);
//! assert!(String::from_utf8(stdout).unwrap().starts_with("zipSeries "));
//! assert!(stderr.is_empty());
//! ```

mod frontend;

pub use frontend::{
    Interaction, ObjectPrompt, SOURCE_PASSWORD_ENV, TARGET_PASSWORD_ENV, TerminalObjectPrompt,
    TerminalPrompt, parse_object_list, run, run_with,
};
