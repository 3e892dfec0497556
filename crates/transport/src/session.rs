use std::fs::File;
use std::io::{self, BufReader, Write};
use std::net::{IpAddr, Shutdown, SocketAddr, TcpStream};
use std::path::Path;

use protocol::{
    ControlCommand, Reply, ReplyClass, ReplyCode, ReplyError, parse_passive_address, read_reply,
};
use tracing::{debug, info, trace, warn};

use crate::connect::{apply_io_timeout, connect_control, open_stream};
use crate::error::{SessionError, is_timeout};
use crate::options::SessionOptions;
use crate::remote::CommandResult;
use crate::secret::Credentials;
use crate::state::SessionState;
use crate::transfer::{TransferDirection, TransferReport};

const CMD_TARGET: &str = "zipseries::cmd";
const TRANSFER_TARGET: &str = "zipseries::transfer";

/// A control connection to the FTP server of an IBM i host.
///
/// The session is strictly sequential: one command or transfer at a time,
/// each blocking until the host answers. Any failure of the control
/// connection itself (reset, EOF, timeout, unparsable reply) moves the
/// session to [`SessionState::Disconnected`] and every later operation is
/// refused. A failing CL command or a refused transfer leaves the session
/// [`SessionState::Ready`].
///
/// Dropping a session that was not closed sends `QUIT` on a best-effort
/// basis.
#[derive(Debug)]
pub struct FtpSession {
    host: String,
    control: BufReader<TcpStream>,
    peer: IpAddr,
    options: SessionOptions,
    state: SessionState,
}

impl FtpSession {
    /// Connects to `host` and consumes the greeting.
    ///
    /// The returned session is [`SessionState::Authenticating`]; call
    /// [`FtpSession::login`] next.
    pub fn connect(host: &str, options: &SessionOptions) -> Result<Self, SessionError> {
        let stream = connect_control(host, options)?;
        let peer = stream
            .peer_addr()
            .map_err(|source| SessionError::Disconnected {
                host: host.to_owned(),
                operation: "connect".to_owned(),
                source: Some(source),
            })?
            .ip();

        let mut session = Self {
            host: host.to_owned(),
            control: BufReader::new(stream),
            peer,
            options: *options,
            state: SessionState::Authenticating,
        };

        let greeting = session.read_final("greeting")?;
        if greeting.code() != ReplyCode::SERVICE_READY {
            session.abandon();
            return Err(session.unexpected("greeting", &greeting));
        }
        debug!(target: CMD_TARGET, host = %session.host, "connected: {greeting}");
        Ok(session)
    }

    /// Logs in and switches the session to binary transfers.
    ///
    /// A refused login is terminal: the connection is dropped and the
    /// session stays [`SessionState::Disconnected`].
    pub fn login(&mut self, credentials: &Credentials) -> Result<(), SessionError> {
        if self.state != SessionState::Authenticating {
            return Err(self.invalid_state("log in"));
        }

        let reply = self.exchange(ControlCommand::User(credentials.user()))?;
        let reply = match reply.code() {
            ReplyCode::LOGGED_IN => reply,
            ReplyCode::NEED_PASSWORD => {
                self.exchange(ControlCommand::Pass(credentials.password().expose()))?
            }
            _ => return Err(self.rejected(credentials, &reply)),
        };
        if !reply.is_completion() {
            return Err(self.rejected(credentials, &reply));
        }

        let binary = self.exchange(ControlCommand::TypeImage)?;
        if !binary.is_completion() {
            self.abandon();
            return Err(self.unexpected("TYPE I", &binary));
        }

        self.state = SessionState::Ready;
        info!(target: CMD_TARGET, host = %self.host, user = credentials.user(), "logged in");
        Ok(())
    }

    /// Returns the host name the session was opened with.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Runs `command` through `RCMD` and waits for its completion reply.
    pub fn submit(&mut self, command: &str) -> Result<CommandResult, SessionError> {
        self.operate(SessionState::Executing, "submit a command", |session| {
            info!(target: CMD_TARGET, host = %session.host, "{command}");
            let reply = session.exchange(ControlCommand::RemoteCommand(command))?;
            let result = CommandResult::from_reply(command, reply);
            if result.succeeded() {
                debug!(target: CMD_TARGET, host = %session.host, code = %result.code(), "command completed");
            } else {
                info!(
                    target: CMD_TARGET,
                    host = %session.host,
                    code = %result.code(),
                    "command failed: {}",
                    result.diagnostics().join(" ")
                );
            }
            Ok(result)
        })
    }

    /// Downloads host file `remote` into `local`.
    ///
    /// Data is staged in a temporary file next to `local` and renamed into
    /// place only after the host confirms the transfer, so a failed download
    /// never leaves a partial file at `local`.
    pub fn download(&mut self, remote: &str, local: &Path) -> Result<TransferReport, SessionError> {
        self.operate(SessionState::Transferring, "download", |session| {
            let bytes = session.retrieve(remote, local)?;
            info!(
                target: TRANSFER_TARGET,
                host = %session.host,
                remote,
                local = %local.display(),
                bytes,
                "downloaded"
            );
            Ok(TransferReport::new(
                TransferDirection::Download,
                remote,
                local,
                bytes,
            ))
        })
    }

    /// Uploads `local` into host file `remote`.
    ///
    /// Every byte of `local` must be accepted by the host; a short write or
    /// a failing closing reply is a [`SessionError::Transfer`].
    pub fn upload(&mut self, local: &Path, remote: &str) -> Result<TransferReport, SessionError> {
        self.operate(SessionState::Transferring, "upload", |session| {
            let bytes = session.store(local, remote)?;
            info!(
                target: TRANSFER_TARGET,
                host = %session.host,
                remote,
                local = %local.display(),
                bytes,
                "uploaded"
            );
            Ok(TransferReport::new(
                TransferDirection::Upload,
                remote,
                local,
                bytes,
            ))
        })
    }

    /// Sends `QUIT` and closes the connection.
    ///
    /// The connection is closed even if `QUIT` fails. Closing a
    /// disconnected session is a no-op.
    pub fn close(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::Disconnected {
            return Ok(());
        }
        let result = self.exchange(ControlCommand::Quit).map(drop);
        self.abandon();
        debug!(target: CMD_TARGET, host = %self.host, "disconnected");
        result
    }

    /// Runs `body` with the session in `busy`, returning to `Ready` unless
    /// the body lost the connection.
    fn operate<T>(
        &mut self,
        busy: SessionState,
        operation: &'static str,
        body: impl FnOnce(&mut Self) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        if !self.state.is_ready() {
            return Err(self.invalid_state(operation));
        }
        self.state = busy;
        let result = body(self);
        if self.state == busy {
            self.state = SessionState::Ready;
        }
        result
    }

    fn retrieve(&mut self, remote: &str, local: &Path) -> Result<u64, SessionError> {
        let directory = match local.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staging = tempfile::Builder::new()
            .prefix(".zipseries-")
            .suffix(".part")
            .tempfile_in(directory)
            .map_err(|source| local_file(local, source))?;

        let mut data = self.open_data_channel()?;
        let opening = self.begin_transfer(ControlCommand::Retrieve(remote))?;
        if opening.class() != ReplyClass::Preliminary {
            return Err(self.refused(TransferDirection::Download, remote, &opening));
        }

        let copied = io::copy(&mut data, staging.as_file_mut());
        drop(data);
        let closing = self.read_final("RETR")?;

        let bytes = match copied {
            Ok(bytes) => bytes,
            Err(error) => {
                return Err(self.transfer_failed(
                    TransferDirection::Download,
                    remote,
                    format!("data connection failed: {error} ({closing})"),
                ));
            }
        };
        if !closing.is_completion() {
            return Err(self.refused(TransferDirection::Download, remote, &closing));
        }

        staging
            .as_file()
            .sync_all()
            .map_err(|source| local_file(local, source))?;
        staging
            .persist(local)
            .map_err(|error| local_file(local, error.error))?;
        Ok(bytes)
    }

    fn store(&mut self, local: &Path, remote: &str) -> Result<u64, SessionError> {
        let mut file = File::open(local).map_err(|source| local_file(local, source))?;
        let expected = file
            .metadata()
            .map_err(|source| local_file(local, source))?
            .len();

        let mut data = self.open_data_channel()?;
        let opening = self.begin_transfer(ControlCommand::Store(remote))?;
        if opening.class() != ReplyClass::Preliminary {
            return Err(self.refused(TransferDirection::Upload, remote, &opening));
        }

        let copied = io::copy(&mut file, &mut data).and_then(|bytes| {
            data.flush()?;
            Ok(bytes)
        });
        let _ = data.shutdown(Shutdown::Write);
        drop(data);
        let closing = self.read_final("STOR")?;

        let bytes = match copied {
            Ok(bytes) => bytes,
            Err(error) => {
                return Err(self.transfer_failed(
                    TransferDirection::Upload,
                    remote,
                    format!("data connection failed: {error} ({closing})"),
                ));
            }
        };
        if !closing.is_completion() {
            return Err(self.refused(TransferDirection::Upload, remote, &closing));
        }
        if bytes != expected {
            return Err(self.transfer_failed(
                TransferDirection::Upload,
                remote,
                format!("sent {bytes} of {expected} bytes"),
            ));
        }
        Ok(bytes)
    }

    /// Enters passive mode and connects the data channel.
    ///
    /// The address advertised in the `227` reply is only used for its port;
    /// the data connection goes to the address the control connection
    /// reached, which keeps transfers working behind NAT.
    fn open_data_channel(&mut self) -> Result<TcpStream, SessionError> {
        let reply = self.exchange(ControlCommand::Passive)?;
        if reply.code() != ReplyCode::PASSIVE_MODE {
            return Err(self.unexpected("PASV", &reply));
        }
        let Some(advertised) = parse_passive_address(&reply.text()) else {
            return Err(self.unexpected("PASV", &reply));
        };
        if IpAddr::V4(*advertised.ip()) != self.peer {
            trace!(
                target: TRANSFER_TARGET,
                host = %self.host,
                advertised = %advertised,
                "ignoring advertised passive address"
            );
        }

        let target = SocketAddr::new(self.peer, advertised.port());
        let stream = open_stream(target, self.options.connect_timeout())
            .and_then(|stream| {
                apply_io_timeout(&stream, self.options.io_timeout())?;
                Ok(stream)
            })
            .map_err(|source| SessionError::Connect {
                addr: target,
                source,
            })?;
        Ok(stream)
    }

    /// Sends a transfer command and returns its first reply, which is
    /// preliminary when the host starts sending or receiving.
    fn begin_transfer(&mut self, command: ControlCommand<'_>) -> Result<Reply, SessionError> {
        self.send(command)?;
        self.read(command.verb())
    }

    /// Sends `command` and returns its final (non-preliminary) reply.
    fn exchange(&mut self, command: ControlCommand<'_>) -> Result<Reply, SessionError> {
        self.send(command)?;
        self.read_final(command.verb())
    }

    fn send(&mut self, command: ControlCommand<'_>) -> Result<(), SessionError> {
        let line = command.encode()?;
        trace!(target: CMD_TARGET, host = %self.host, "> {command}");
        let stream = self.control.get_mut();
        let written = stream.write_all(line.as_bytes()).and_then(|()| stream.flush());
        written.map_err(|error| self.lost(command.verb(), error))
    }

    fn read(&mut self, operation: &str) -> Result<Reply, SessionError> {
        match read_reply(&mut self.control) {
            Ok(reply) => {
                trace!(target: CMD_TARGET, host = %self.host, "< {reply}");
                Ok(reply)
            }
            Err(ReplyError::UnexpectedEof) => {
                self.abandon();
                Err(SessionError::Disconnected {
                    host: self.host.clone(),
                    operation: operation.to_owned(),
                    source: None,
                })
            }
            Err(ReplyError::Malformed { line }) => {
                self.abandon();
                Err(SessionError::UnexpectedReply {
                    host: self.host.clone(),
                    command: operation.to_owned(),
                    reply: format!("unparsable line {line:?}"),
                })
            }
            Err(ReplyError::Io(error)) => Err(self.lost(operation, error)),
        }
    }

    fn read_final(&mut self, operation: &str) -> Result<Reply, SessionError> {
        loop {
            let reply = self.read(operation)?;
            if reply.class() != ReplyClass::Preliminary {
                return Ok(reply);
            }
        }
    }

    fn abandon(&mut self) {
        let _ = self.control.get_ref().shutdown(Shutdown::Both);
        self.state = SessionState::Disconnected;
    }

    fn lost(&mut self, operation: &str, error: io::Error) -> SessionError {
        self.abandon();
        if is_timeout(&error) {
            SessionError::Timeout {
                host: self.host.clone(),
                operation: operation.to_owned(),
            }
        } else {
            SessionError::Disconnected {
                host: self.host.clone(),
                operation: operation.to_owned(),
                source: Some(error),
            }
        }
    }

    fn rejected(&mut self, credentials: &Credentials, reply: &Reply) -> SessionError {
        self.abandon();
        warn!(target: CMD_TARGET, host = %self.host, user = credentials.user(), "login rejected");
        SessionError::Authentication {
            host: self.host.clone(),
            user: credentials.user().to_owned(),
            reply: reply.to_string(),
        }
    }

    fn unexpected(&self, command: &str, reply: &Reply) -> SessionError {
        SessionError::UnexpectedReply {
            host: self.host.clone(),
            command: command.to_owned(),
            reply: reply.to_string(),
        }
    }

    fn refused(&self, direction: TransferDirection, remote: &str, reply: &Reply) -> SessionError {
        self.transfer_failed(direction, remote, reply.to_string())
    }

    fn transfer_failed(
        &self,
        direction: TransferDirection,
        remote: &str,
        reason: String,
    ) -> SessionError {
        SessionError::Transfer {
            host: self.host.clone(),
            direction,
            remote: remote.to_owned(),
            reason,
        }
    }

    fn invalid_state(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidState {
            host: self.host.clone(),
            operation,
            state: self.state,
        }
    }
}

impl Drop for FtpSession {
    fn drop(&mut self) {
        if self.state != SessionState::Disconnected {
            let _ = self.close();
        }
    }
}

fn local_file(path: &Path, source: io::Error) -> SessionError {
    SessionError::LocalFile {
        path: path.to_path_buf(),
        source,
    }
}
