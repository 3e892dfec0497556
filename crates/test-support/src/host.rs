use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{Ipv4Addr, Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const IO_TIMEOUT: Duration = Duration::from_secs(10);

/// Default user profile accepted by a [`FakeHost`].
pub const DEFAULT_USER: &str = "ZIPUSER";
/// Default password accepted by a [`FakeHost`].
pub const DEFAULT_PASSWORD: &str = "secret";

/// Something the fake host observed, in order of arrival.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HostEvent {
    /// A control connection was accepted.
    Connected,
    /// A `PASS` command completed a login attempt.
    Login {
        /// User profile named by `USER`.
        user: String,
        /// Whether the credentials matched.
        accepted: bool,
    },
    /// An `RCMD` command was received (recorded before it is evaluated).
    Command(String),
    /// A file was sent to the client.
    Retrieved {
        /// Host path of the file.
        path: String,
        /// Bytes written on the data connection.
        bytes: Vec<u8>,
    },
    /// A file was received from the client.
    Stored {
        /// Host path of the file.
        path: String,
        /// Bytes read from the data connection.
        bytes: Vec<u8>,
    },
    /// A restore command consumed a save file.
    Restored {
        /// The restore command text.
        command: String,
        /// Host path of the consumed save file.
        save_file: String,
        /// Content of the save file at restore time.
        bytes: Vec<u8>,
    },
    /// `QUIT` was received.
    Quit,
}

/// Returns deterministic binary content that exercises every byte value,
/// CR/LF pairs, NUL and the DOS end-of-file marker.
#[must_use]
pub fn sample_save_file(len: usize) -> Vec<u8> {
    let header: &[u8] = b"\r\n\0\x1a\xff\n\r";
    header
        .iter()
        .copied()
        .chain((0..=255u8).cycle())
        .take(len)
        .collect()
}

#[derive(Clone, Debug)]
struct Failure {
    prefix: String,
    lines: Vec<String>,
}

/// Configures and starts a [`FakeHost`].
#[derive(Clone, Debug)]
pub struct FakeHostBuilder {
    user: String,
    password: String,
    save_payload: Vec<u8>,
    failures: Vec<Failure>,
    drop_on: Vec<String>,
    abort_transfers: Vec<String>,
    files: HashMap<String, Vec<u8>>,
}

impl Default for FakeHostBuilder {
    fn default() -> Self {
        Self {
            user: DEFAULT_USER.to_owned(),
            password: DEFAULT_PASSWORD.to_owned(),
            save_payload: sample_save_file(64 * 1024 + 7),
            failures: Vec::new(),
            drop_on: Vec::new(),
            abort_transfers: Vec::new(),
            files: HashMap::new(),
        }
    }
}

impl FakeHostBuilder {
    /// Sets the only user profile and password the host accepts.
    #[must_use]
    pub fn credentials(mut self, user: &str, password: &str) -> Self {
        self.user = user.to_ascii_uppercase();
        self.password = password.to_owned();
        self
    }

    /// Sets the content written into the save file by `SAVLIB`/`SAVOBJ`.
    #[must_use]
    pub fn save_payload(mut self, bytes: Vec<u8>) -> Self {
        self.save_payload = bytes;
        self
    }

    /// Makes every `RCMD` whose command starts with `prefix` fail with a
    /// `550` reply carrying `lines` after the usual "Error occurred" line.
    #[must_use]
    pub fn fail_command(mut self, prefix: &str, lines: &[&str]) -> Self {
        self.failures.push(Failure {
            prefix: prefix.to_ascii_uppercase(),
            lines: lines.iter().map(|line| (*line).to_owned()).collect(),
        });
        self
    }

    /// Closes the control connection without a reply when a command line
    /// starts with `prefix` (for example `"RETR"` or `"RCMD RSTLIB"`).
    #[must_use]
    pub fn drop_connection_on(mut self, prefix: &str) -> Self {
        self.drop_on.push(prefix.to_ascii_uppercase());
        self
    }

    /// Cuts the data connection of `RETR` or `STOR` half way and replies `451`.
    #[must_use]
    pub fn abort_transfer(mut self, verb: &str) -> Self {
        self.abort_transfers.push(verb.to_ascii_uppercase());
        self
    }

    /// Seeds a host file.
    #[must_use]
    pub fn with_file(mut self, path: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(path.to_ascii_uppercase(), bytes);
        self
    }

    /// Binds a loopback listener and starts serving connections.
    #[must_use]
    pub fn start(mut self) -> FakeHost {
        let listener =
            TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).expect("bind fake host listener");
        let addr = listener.local_addr().expect("fake host address");
        let state = Arc::new(Mutex::new(State {
            events: Vec::new(),
            files: std::mem::take(&mut self.files),
            sessions: 0,
        }));
        let stop = Arc::new(AtomicBool::new(false));

        let handle = {
            let state = Arc::clone(&state);
            let stop = Arc::clone(&stop);
            let script = Arc::new(self);
            thread::spawn(move || serve(&listener, &script, &state, &stop))
        };

        FakeHost {
            addr,
            state,
            stop,
            handle: Some(handle),
        }
    }
}

struct State {
    events: Vec<HostEvent>,
    files: HashMap<String, Vec<u8>>,
    sessions: usize,
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A scripted IBM i FTP server listening on the loopback interface.
///
/// Connections are served one at a time on a background thread. Files in
/// `QTEMP` disappear when the session that created them ends, mirroring the
/// job-scoped temporary library of the real system.
pub struct FakeHost {
    addr: SocketAddr,
    state: Arc<Mutex<State>>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FakeHost {
    /// Returns a builder with default credentials and payload.
    #[must_use]
    pub fn builder() -> FakeHostBuilder {
        FakeHostBuilder::default()
    }

    /// Starts a host with the default configuration.
    #[must_use]
    pub fn start() -> Self {
        Self::builder().start()
    }

    /// Returns the listening address.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the listening IP address as text.
    #[must_use]
    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    /// Returns the listening port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Returns every event recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<HostEvent> {
        lock(&self.state).events.clone()
    }

    /// Returns the text of every `RCMD` received so far.
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        lock(&self.state)
            .events
            .iter()
            .filter_map(|event| match event {
                HostEvent::Command(command) => Some(command.clone()),
                _ => None,
            })
            .collect()
    }

    /// Returns the number of control connections accepted.
    #[must_use]
    pub fn sessions(&self) -> usize {
        lock(&self.state).sessions
    }

    /// Returns the current content of a host file.
    #[must_use]
    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        lock(&self.state).files.get(&path.to_ascii_uppercase()).cloned()
    }
}

impl Drop for FakeHost {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        let _ = TcpStream::connect_timeout(&self.addr, Duration::from_secs(1));
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn serve(
    listener: &TcpListener,
    script: &FakeHostBuilder,
    state: &Mutex<State>,
    stop: &AtomicBool,
) {
    for stream in listener.incoming() {
        if stop.load(Ordering::SeqCst) {
            break;
        }
        let Ok(stream) = stream else {
            continue;
        };

        {
            let mut guard = lock(state);
            guard.sessions += 1;
            guard.events.push(HostEvent::Connected);
        }

        if let Ok(session) = Session::new(stream, script, state) {
            let _ = session.run();
        }

        lock(state)
            .files
            .retain(|path, _| !path.starts_with("QTEMP/"));
    }
}

struct Session<'a> {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
    script: &'a FakeHostBuilder,
    state: &'a Mutex<State>,
    user: Option<String>,
    logged_in: bool,
    passive: Option<TcpListener>,
}

impl<'a> Session<'a> {
    fn new(
        stream: TcpStream,
        script: &'a FakeHostBuilder,
        state: &'a Mutex<State>,
    ) -> io::Result<Self> {
        stream.set_read_timeout(Some(IO_TIMEOUT))?;
        stream.set_write_timeout(Some(IO_TIMEOUT))?;
        let writer = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(stream),
            writer,
            script,
            state,
            user: None,
            logged_in: false,
            passive: None,
        })
    }

    fn run(mut self) -> io::Result<()> {
        self.reply_lines(
            220,
            &[
                "QTCP at FAKE.HOST.",
                "Connection will close if idle more than 5 minutes.",
            ],
        )?;

        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(());
            }
            let line = line.trim_end_matches(['\r', '\n']).to_owned();
            let upper = line.to_ascii_uppercase();

            if self
                .script
                .drop_on
                .iter()
                .any(|prefix| upper.starts_with(prefix.as_str()))
            {
                let _ = self.writer.shutdown(Shutdown::Both);
                return Ok(());
            }

            let (verb, argument) = match line.split_once(' ') {
                Some((verb, argument)) => (verb.to_ascii_uppercase(), argument.trim().to_owned()),
                None => (upper.clone(), String::new()),
            };

            match verb.as_str() {
                "USER" => {
                    self.user = Some(argument.to_ascii_uppercase());
                    self.reply(331, "Enter password.")?;
                }
                "PASS" => self.login(&argument)?,
                "QUIT" => {
                    self.record(HostEvent::Quit);
                    self.reply(221, "QUIT subcommand received.")?;
                    return Ok(());
                }
                _ if !self.logged_in => self.reply(530, "Not logged in.")?,
                "TYPE" => self.reply(200, "Representation type is binary IMAGE.")?,
                "PASV" => self.enter_passive()?,
                "RCMD" => self.remote_command(&argument)?,
                "RETR" => self.retrieve(&argument.to_ascii_uppercase())?,
                "STOR" => self.store(&argument.to_ascii_uppercase())?,
                "NOOP" => self.reply(200, "NOOP subcommand successful.")?,
                other => self.reply(500, &format!("Subcommand {other} not valid."))?,
            }
        }
    }

    fn login(&mut self, password: &str) -> io::Result<()> {
        let user = self.user.clone().unwrap_or_default();
        let accepted = user == self.script.user && password == self.script.password;
        self.record(HostEvent::Login {
            user: user.clone(),
            accepted,
        });

        if accepted {
            self.logged_in = true;
            self.reply(230, &format!("{user} logged on."))
        } else {
            self.reply(530, &format!("Log on attempt by user {user} rejected."))
        }
    }

    fn enter_passive(&mut self) -> io::Result<()> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
        let port = listener.local_addr()?.port();
        self.passive = Some(listener);
        self.reply(
            227,
            &format!(
                "Entering Passive Mode (127,0,0,1,{},{}).",
                port >> 8,
                port & 0xff
            ),
        )
    }

    fn remote_command(&mut self, command: &str) -> io::Result<()> {
        self.record(HostEvent::Command(command.to_owned()));
        let upper = command.to_ascii_uppercase();
        let script = self.script;

        if let Some(failure) = script
            .failures
            .iter()
            .find(|failure| upper.starts_with(failure.prefix.as_str()))
        {
            let mut lines = vec![format!("Error occurred on command {command}.")];
            lines.extend(failure.lines.iter().cloned());
            return self.reply_lines(550, &lines);
        }

        let name = upper.split_whitespace().next().unwrap_or_default();
        let result = match name {
            "CRTSAVF" => self.create_save_file(&upper),
            "CLRSAVF" => self.clear_save_file(&upper),
            "SAVLIB" | "SAVOBJ" => self.save(&upper),
            "RSTLIB" | "RSTOBJ" => self.restore(command, &upper),
            _ => Ok(()),
        };

        match result {
            Ok(()) => self.reply(250, &format!("Command {name} successful.")),
            Err(lines) => {
                let mut all = vec![format!("Error occurred on command {command}.")];
                all.extend(lines);
                self.reply_lines(550, &all)
            }
        }
    }

    fn create_save_file(&self, command: &str) -> Result<(), Vec<String>> {
        let path = parameter(command, "FILE").unwrap_or_default();
        let mut state = lock(self.state);
        if state.files.contains_key(&path) {
            let (library, file) = split_path(&path);
            return Err(vec![
                format!("CPF5813: File {file} in library {library} already exists."),
                format!("CPF7302: File {file} not created in library {library}."),
            ]);
        }
        state.files.insert(path, Vec::new());
        Ok(())
    }

    fn clear_save_file(&self, command: &str) -> Result<(), Vec<String>> {
        let path = parameter(command, "FILE").unwrap_or_default();
        let mut state = lock(self.state);
        match state.files.get_mut(&path) {
            Some(bytes) => {
                bytes.clear();
                Ok(())
            }
            None => Err(vec![not_found(&path)]),
        }
    }

    fn save(&self, command: &str) -> Result<(), Vec<String>> {
        let path = parameter(command, "SAVF").unwrap_or_default();
        let mut state = lock(self.state);
        match state.files.get_mut(&path) {
            Some(bytes) => {
                *bytes = self.script.save_payload.clone();
                Ok(())
            }
            None => Err(vec![not_found(&path)]),
        }
    }

    fn restore(&self, command: &str, upper: &str) -> Result<(), Vec<String>> {
        let path = parameter(upper, "SAVF").unwrap_or_default();
        let mut state = lock(self.state);
        let bytes = match state.files.get(&path) {
            Some(bytes) if bytes.is_empty() => {
                return Err(vec![format!("CPF3743: File {path} contains no saved data.")]);
            }
            Some(bytes) => bytes.clone(),
            None => return Err(vec![not_found(&path)]),
        };
        state.events.push(HostEvent::Restored {
            command: command.to_owned(),
            save_file: path,
            bytes,
        });
        Ok(())
    }

    fn retrieve(&mut self, path: &str) -> io::Result<()> {
        let Some(listener) = self.passive.take() else {
            return self.reply(425, "Use PASV first.");
        };
        let Some(bytes) = lock(self.state).files.get(path).cloned() else {
            return self.reply(550, &format!("Unable to open file {path}."));
        };

        let mut data = accept_within(&listener, IO_TIMEOUT)?;
        self.reply(150, &format!("Retrieving member {path} in binary mode."))?;

        if self.script.abort_transfers.iter().any(|verb| verb == "RETR") {
            data.write_all(&bytes[..bytes.len() / 2])?;
            drop(data);
            return self.reply(451, "Transfer aborted; data connection closed.");
        }

        data.write_all(&bytes)?;
        data.flush()?;
        drop(data);
        self.record(HostEvent::Retrieved {
            path: path.to_owned(),
            bytes,
        });
        self.reply(226, "File transfer completed successfully.")
    }

    fn store(&mut self, path: &str) -> io::Result<()> {
        let Some(listener) = self.passive.take() else {
            return self.reply(425, "Use PASV first.");
        };
        if !lock(self.state).files.contains_key(path) {
            return self.reply(
                550,
                &format!("Unable to store file {path}; create the save file with CRTSAVF first."),
            );
        }

        let mut data = accept_within(&listener, IO_TIMEOUT)?;
        data.set_read_timeout(Some(IO_TIMEOUT))?;
        self.reply(150, &format!("Sending file to member {path}."))?;

        if self.script.abort_transfers.iter().any(|verb| verb == "STOR") {
            let mut partial = [0u8; 512];
            let _ = data.read(&mut partial);
            drop(data);
            return self.reply(451, "Transfer aborted; data connection closed.");
        }

        let mut bytes = Vec::new();
        data.read_to_end(&mut bytes)?;
        lock(self.state)
            .files
            .insert(path.to_owned(), bytes.clone());
        self.record(HostEvent::Stored {
            path: path.to_owned(),
            bytes,
        });
        self.reply(226, "File transfer completed successfully.")
    }

    fn record(&self, event: HostEvent) {
        lock(self.state).events.push(event);
    }

    fn reply(&mut self, code: u16, text: &str) -> io::Result<()> {
        self.writer.write_all(format!("{code} {text}\r\n").as_bytes())?;
        self.writer.flush()
    }

    fn reply_lines<S: AsRef<str>>(&mut self, code: u16, lines: &[S]) -> io::Result<()> {
        let mut payload = String::new();
        for (index, line) in lines.iter().enumerate() {
            let separator = if index + 1 == lines.len() { ' ' } else { '-' };
            payload.push_str(&format!("{code}{separator}{}\r\n", line.as_ref()));
        }
        self.writer.write_all(payload.as_bytes())?;
        self.writer.flush()
    }
}

fn accept_within(listener: &TcpListener, timeout: Duration) -> io::Result<TcpStream> {
    listener.set_nonblocking(true)?;
    let deadline = Instant::now() + timeout;
    loop {
        match listener.accept() {
            Ok((stream, _)) => {
                stream.set_nonblocking(false)?;
                return Ok(stream);
            }
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                if Instant::now() >= deadline {
                    return Err(io::Error::new(
                        io::ErrorKind::TimedOut,
                        "client never opened the data connection",
                    ));
                }
                thread::sleep(Duration::from_millis(5));
            }
            Err(error) => return Err(error),
        }
    }
}

/// Extracts the value of `KEYWORD(value)` from a CL command.
fn parameter(command: &str, keyword: &str) -> Option<String> {
    let needle = format!(" {keyword}(");
    let start = command.find(&needle)? + needle.len();
    let end = command[start..].find(')')? + start;
    Some(command[start..end].trim().to_owned())
}

fn split_path(path: &str) -> (&str, &str) {
    path.split_once('/').unwrap_or(("*LIBL", path))
}

fn not_found(path: &str) -> String {
    let (library, file) = split_path(path);
    format!("CPF9812: File {file} in library {library} not found.")
}
