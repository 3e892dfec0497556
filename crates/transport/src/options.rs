use std::time::Duration;

use protocol::DEFAULT_CONTROL_PORT;

/// Connect timeout applied when none is configured.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Network settings shared by every session a connector opens.
///
/// `io_timeout` bounds each individual read and write on the control and
/// data connections. It is unset by default because save and restore
/// commands on a large library legitimately run for a long time before the
/// host replies.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SessionOptions {
    port: u16,
    connect_timeout: Option<Duration>,
    io_timeout: Option<Duration>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            port: DEFAULT_CONTROL_PORT,
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            io_timeout: None,
        }
    }
}

impl SessionOptions {
    /// Sets the control port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the connect timeout; `None` waits for the operating system.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the per-read/per-write timeout; `None` waits indefinitely.
    #[must_use]
    pub const fn with_io_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Returns the control port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the connect timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    /// Returns the I/O timeout.
    #[must_use]
    pub const fn io_timeout(&self) -> Option<Duration> {
        self.io_timeout
    }
}
