use std::path::Path;

use protocol::{HostMessage, Reply, ReplyClass, ReplyCode, extract_host_messages};

use crate::error::SessionError;
use crate::options::SessionOptions;
use crate::secret::Credentials;
use crate::session::FtpSession;
use crate::state::SessionState;
use crate::transfer::TransferReport;

/// Outcome of one remote CL command.
///
/// A command either completes (`2xx`) or fails; the diagnostics are the reply
/// text in the order the host sent it, and [`CommandResult::messages`] lists
/// the message identifiers found in that text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandResult {
    command: String,
    code: ReplyCode,
    diagnostics: Vec<String>,
    messages: Vec<HostMessage>,
}

impl CommandResult {
    /// Builds a result from the reply code and text lines the host sent.
    #[must_use]
    pub fn new(command: &str, code: ReplyCode, diagnostics: Vec<String>) -> Self {
        let messages = extract_host_messages(&diagnostics);
        Self {
            command: command.to_owned(),
            code,
            diagnostics,
            messages,
        }
    }

    /// Builds a result from a complete reply.
    #[must_use]
    pub fn from_reply(command: &str, reply: Reply) -> Self {
        let code = reply.code();
        Self::new(command, code, reply.into_lines())
    }

    /// Returns the command text that was submitted.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Returns the final reply code.
    #[must_use]
    pub const fn code(&self) -> ReplyCode {
        self.code
    }

    /// Returns `true` only for a positive-completion reply.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        matches!(self.code.class(), ReplyClass::Completion)
    }

    /// Returns the reply text lines.
    #[must_use]
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    /// Returns the host messages referenced by the reply.
    #[must_use]
    pub fn messages(&self) -> &[HostMessage] {
        &self.messages
    }

    /// Returns `true` when the reply mentions message `id` (for example `CPF5813`).
    #[must_use]
    pub fn has_message(&self, id: &str) -> bool {
        self.messages.iter().any(|message| message.id().as_str() == id)
    }
}

/// An authenticated control connection to one host.
pub trait RemoteSession {
    /// Returns the host this session talks to.
    fn host(&self) -> &str;

    /// Returns the current lifecycle state.
    fn state(&self) -> SessionState;

    /// Runs a CL command and waits for the host to report completion.
    ///
    /// A failing command is not an `Err`: it is a [`CommandResult`] whose
    /// [`succeeded`](CommandResult::succeeded) is `false`. `Err` is reserved
    /// for the session itself failing.
    fn submit(&mut self, command: &str) -> Result<CommandResult, SessionError>;

    /// Copies host file `remote` to `local`, byte for byte.
    fn download(&mut self, remote: &str, local: &Path) -> Result<TransferReport, SessionError>;

    /// Copies `local` to host file `remote`, byte for byte.
    fn upload(&mut self, local: &Path, remote: &str) -> Result<TransferReport, SessionError>;

    /// Ends the session. Closing an already closed session succeeds.
    fn close(&mut self) -> Result<(), SessionError>;
}

/// Opens authenticated sessions.
pub trait Connector {
    /// The session type produced.
    type Session: RemoteSession;

    /// Connects to `host` and logs in with `credentials`.
    fn open(&mut self, host: &str, credentials: &Credentials)
    -> Result<Self::Session, SessionError>;
}

/// [`Connector`] for the IBM i FTP server.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FtpConnector {
    options: SessionOptions,
}

impl FtpConnector {
    /// Creates a connector that applies `options` to every session.
    #[must_use]
    pub const fn new(options: SessionOptions) -> Self {
        Self { options }
    }

    /// Returns the options applied to new sessions.
    #[must_use]
    pub const fn options(&self) -> &SessionOptions {
        &self.options
    }
}

impl Connector for FtpConnector {
    type Session = FtpSession;

    fn open(&mut self, host: &str, credentials: &Credentials) -> Result<FtpSession, SessionError> {
        let mut session = FtpSession::connect(host, &self.options)?;
        session.login(credentials)?;
        Ok(session)
    }
}

impl RemoteSession for FtpSession {
    fn host(&self) -> &str {
        Self::host(self)
    }

    fn state(&self) -> SessionState {
        Self::state(self)
    }

    fn submit(&mut self, command: &str) -> Result<CommandResult, SessionError> {
        Self::submit(self, command)
    }

    fn download(&mut self, remote: &str, local: &Path) -> Result<TransferReport, SessionError> {
        Self::download(self, remote, local)
    }

    fn upload(&mut self, local: &Path, remote: &str) -> Result<TransferReport, SessionError> {
        Self::upload(self, local, remote)
    }

    fn close(&mut self) -> Result<(), SessionError> {
        Self::close(self)
    }
}
