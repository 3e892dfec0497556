#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_docs)]

//! # Overview
//!
//! `transport` implements the remote session used by zipSeries: one
//! authenticated control connection to the FTP server of an IBM i host,
//! exposing exactly two primitives.
//!
//! - **Submit**: run a CL command through `RCMD` and report whether the host
//!   completed it, with the host's diagnostic text and message identifiers.
//! - **Transfer**: copy a file byte for byte between the host and the local
//!   machine (`TYPE I`, passive mode, `RETR`/`STOR`).
//!
//! # Design
//!
//! [`FtpSession`] is a blocking state machine over a single
//! [`std::net::TcpStream`]; see [`SessionState`] for the lifecycle. Reply
//! parsing lives in the `protocol` crate so this crate only sequences
//! exchanges and maps failures. The [`Connector`] and [`RemoteSession`]
//! traits let the orchestrator run against [`FtpConnector`] in production and
//! against test doubles elsewhere.
//!
//! Every command and transfer is echoed with `tracing` at `info` level under
//! the `zipseries::cmd` and `zipseries::transfer` targets. Raw protocol
//! traffic is logged at `trace`, with passwords redacted.
//!
//! # Invariants
//!
//! - Operations run only in [`SessionState::Ready`]; anything else is a
//!   [`SessionError::InvalidState`].
//! - A lost, timed-out or garbled control connection is terminal for the
//!   session. There is no reconnect.
//! - A failed download never leaves a file at its destination path.
//!
//! # Errors
//!
//! All fallible operations return [`SessionError`]; [`SessionError::kind`]
//! groups the variants into connection, authentication, protocol, transfer
//! and timeout failures. A CL command that fails on the host is *not* an
//! error at this layer: it is a [`CommandResult`] whose
//! [`CommandResult::succeeded`] is `false`.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//! use transport::{Connector, Credentials, FtpConnector, RemoteSession, Secret, SessionOptions};
//!
//! let mut connector = FtpConnector::new(SessionOptions::default());
//! let credentials = Credentials::new("QSECOFR", Secret::from("password"));
//! let mut session = connector.open("as400.example.com", &credentials)?;
//!
//! let result = session.submit("CRTSAVF FILE(QTEMP/ZIPSERIES)")?;
//! assert!(result.succeeded());
//! session.download("QTEMP/ZIPSERIES", Path::new("payroll.savf"))?;
//! session.close()?;
//! # Ok::<(), transport::SessionError>(())
//! ```

mod connect;
mod error;
mod options;
mod remote;
mod secret;
mod session;
mod state;
mod transfer;

pub use error::{SessionError, SessionErrorKind};
pub use options::{DEFAULT_CONNECT_TIMEOUT, SessionOptions};
pub use remote::{CommandResult, Connector, FtpConnector, RemoteSession};
pub use secret::{Credentials, Secret};
pub use session::FtpSession;
pub use state::SessionState;
pub use transfer::{TransferDirection, TransferReport};
