//! Shared test utilities for the zipSeries workspace.
//!
//! The centrepiece is [`FakeHost`], a scripted stand-in for the FTP server of
//! an IBM i partition. It speaks enough of the dialect (login, `TYPE I`,
//! `PASV`, `RCMD`, `RETR`, `STOR`, `QUIT`) for the transport and the
//! orchestrator to be exercised end to end over real sockets, and records
//! everything it sees so tests can assert on the exact sequence of remote
//! operations.

#![allow(clippy::missing_panics_doc)]

mod host;

pub use host::{
    DEFAULT_PASSWORD, DEFAULT_USER, FakeHost, FakeHostBuilder, HostEvent, sample_save_file,
};
