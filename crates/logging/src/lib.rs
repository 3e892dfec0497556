#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` owns everything zipSeries writes for an operator to read:
//! [`init_tracing`] installs the `tracing` subscriber that renders progress
//! events, and [`ConsoleReporter`] prints the final summary of a run.
//!
//! # Design
//!
//! Progress is emitted with the `tracing` macros under `zipseries::*`
//! targets (`zipseries::run`, `zipseries::cmd`, `zipseries::transfer`) and
//! filtered by an [`EnvFilter`](tracing_subscriber::EnvFilter). Verbose runs
//! enable `info` for those targets; everything else stays at `warn` unless
//! [`LOG_ENV`] says otherwise.
//!
//! Outcome lines go through [`ConsoleReporter`] rather than `tracing` so they
//! are printed whatever the filter, in a fixed `zipSeries: …` format.
//!
//! # Invariants
//!
//! - Every line starts with the program name.
//! - Colour escapes are only written when the reporter was built styled;
//!   callers decide that from whether the stream is a terminal.
//! - A successful save is reported even when the restore side failed.
//!
//! # Examples
//!
//! ```
//! use logging::ConsoleReporter;
//!
//! let mut console = ConsoleReporter::new(Vec::new(), false);
//! console.success("restore completed").unwrap();
//!
//! let output = String::from_utf8(console.into_inner()).unwrap();
//! assert_eq!(output, "zipSeries: restore completed\n");
//! ```

mod console;
mod subscriber;

pub use console::ConsoleReporter;
pub use subscriber::{LOG_ENV, env_filter, init_tracing};
