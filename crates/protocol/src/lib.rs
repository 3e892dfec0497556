#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `protocol` implements the wire format spoken on the control channel of an
//! IBM i FTP server. The crate performs no network I/O of its own: it parses
//! replies from any [`std::io::BufRead`] source and renders commands into the
//! CRLF-terminated lines the server expects, so the transport layer can stay
//! focused on connection management.
//!
//! # Design
//!
//! - [`read_reply`] consumes one complete reply, folding RFC 959 multi-line
//!   replies (`550-…` continuation lines terminated by `550 …`) into a single
//!   [`Reply`].
//! - [`ReplyCode::class`] maps the first digit of a reply code onto a
//!   [`ReplyClass`]. Only [`ReplyClass::Completion`] counts as success for a
//!   finished remote command.
//! - [`extract_host_messages`] recognises IBM i message identifiers such as
//!   `CPF3812` inside reply text so callers can react to specific host
//!   conditions (for example "save file already exists").
//! - [`parse_passive_address`] decodes the `227` reply used to open passive
//!   data connections.
//! - [`ControlCommand`] renders outgoing commands and redacts the password
//!   argument whenever a command is displayed.
//!
//! # Invariants
//!
//! - A [`Reply`] always carries at least one text line (possibly empty).
//! - [`ControlCommand::encode`] never emits an argument containing CR or LF.
//!
//! # Examples
//!
//! ```
//! use std::io::Cursor;
//! use protocol::{ReplyClass, read_reply};
//!
//! let mut input = Cursor::new(
//!     "550-Error occurred on command SAVLIB.\r\n550 CPF3781: Library PAYROLL not found.\r\n",
//! );
//! let reply = read_reply(&mut input).unwrap();
//!
//! assert_eq!(reply.code().as_u16(), 550);
//! assert_eq!(reply.class(), ReplyClass::PermanentNegative);
//! assert_eq!(reply.lines().len(), 2);
//! assert_eq!(reply.host_messages()[0].id().as_str(), "CPF3781");
//! ```

mod command;
mod message;
mod passive;
mod reply;

pub use command::{ControlCommand, EncodeError};
pub use message::{HostMessage, MessageId, extract_host_messages};
pub use passive::parse_passive_address;
pub use reply::{Reply, ReplyClass, ReplyCode, ReplyError, read_reply};

/// Well-known TCP port of an FTP control channel.
pub const DEFAULT_CONTROL_PORT: u16 = 21;
