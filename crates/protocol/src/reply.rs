use std::fmt;
use std::io::{self, BufRead};

use thiserror::Error;

use crate::message::{HostMessage, extract_host_messages};

/// Three-digit reply code sent by the server at the start of every reply.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ReplyCode(u16);

impl ReplyCode {
    /// `220` service ready, sent as the connection greeting.
    pub const SERVICE_READY: Self = Self(220);
    /// `227` entering passive mode.
    pub const PASSIVE_MODE: Self = Self(227);
    /// `230` user logged in.
    pub const LOGGED_IN: Self = Self(230);
    /// `250` requested file action completed.
    pub const FILE_ACTION_OK: Self = Self(250);
    /// `331` user name accepted, password required.
    pub const NEED_PASSWORD: Self = Self(331);

    /// Creates a reply code, rejecting values outside `100..=599`.
    #[must_use]
    pub const fn new(value: u16) -> Option<Self> {
        if value >= 100 && value < 600 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Returns the numeric value of the code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Returns the class encoded by the first digit.
    #[must_use]
    pub const fn class(self) -> ReplyClass {
        match self.0 / 100 {
            1 => ReplyClass::Preliminary,
            2 => ReplyClass::Completion,
            3 => ReplyClass::Intermediate,
            4 => ReplyClass::TransientNegative,
            _ => ReplyClass::PermanentNegative,
        }
    }
}

impl fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

/// Severity class of a reply, derived from the first digit of its code.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ReplyClass {
    /// `1yz`: the action is starting; another reply follows.
    Preliminary,
    /// `2yz`: the action completed successfully.
    Completion,
    /// `3yz`: the command was accepted but more input is required.
    Intermediate,
    /// `4yz`: the action failed but may succeed if repeated.
    TransientNegative,
    /// `5yz`: the action failed.
    PermanentNegative,
}

impl ReplyClass {
    /// Returns `true` for the two failing classes.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        matches!(self, Self::TransientNegative | Self::PermanentNegative)
    }

    /// Returns a lowercase label suitable for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Preliminary => "preliminary",
            Self::Completion => "completion",
            Self::Intermediate => "intermediate",
            Self::TransientNegative => "transient failure",
            Self::PermanentNegative => "permanent failure",
        }
    }
}

/// A complete reply read from the control channel.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Reply {
    code: ReplyCode,
    lines: Vec<String>,
}

impl Reply {
    /// Creates a reply from a code and its text lines.
    ///
    /// An empty `lines` vector is normalised to a single empty line.
    #[must_use]
    pub fn new(code: ReplyCode, mut lines: Vec<String>) -> Self {
        if lines.is_empty() {
            lines.push(String::new());
        }
        Self { code, lines }
    }

    /// Returns the reply code.
    #[must_use]
    pub const fn code(&self) -> ReplyCode {
        self.code
    }

    /// Returns the class of the reply code.
    #[must_use]
    pub const fn class(&self) -> ReplyClass {
        self.code.class()
    }

    /// Returns `true` when the reply reports successful completion.
    #[must_use]
    pub const fn is_completion(&self) -> bool {
        matches!(self.code.class(), ReplyClass::Completion)
    }

    /// Returns the text lines with the code prefixes removed.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns the text of the reply with lines joined by `\n`.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Returns the IBM i messages referenced by the reply text.
    #[must_use]
    pub fn host_messages(&self) -> Vec<HostMessage> {
        extract_host_messages(&self.lines)
    }

    /// Consumes the reply and returns its text lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.lines.join(" "))
    }
}

/// Errors produced while reading a reply.
#[derive(Debug, Error)]
pub enum ReplyError {
    /// The stream ended (or was reset) in the middle of a reply.
    #[error("control connection closed before a complete reply was received")]
    UnexpectedEof,
    /// A line did not start with a three-digit reply code.
    #[error("malformed reply line: {line:?}")]
    Malformed {
        /// The offending line, without its terminator.
        line: String,
    },
    /// The underlying reader failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Reads one complete reply, folding multi-line replies.
///
/// Continuation lines may repeat the code followed by `-` or carry arbitrary
/// text; the reply ends at the first line that starts with the opening code
/// followed by a space (or the bare code).
pub fn read_reply<R: BufRead>(reader: &mut R) -> Result<Reply, ReplyError> {
    let first = read_line(reader)?.ok_or(ReplyError::UnexpectedEof)?;
    let (code, multiline, text) =
        split_reply_line(&first).ok_or_else(|| ReplyError::Malformed {
            line: first.clone(),
        })?;

    let mut lines = vec![text.to_owned()];
    if multiline {
        loop {
            let line = read_line(reader)?.ok_or(ReplyError::UnexpectedEof)?;
            match split_reply_line(&line) {
                Some((candidate, false, text)) if candidate == code => {
                    lines.push(text.to_owned());
                    break;
                }
                Some((candidate, true, text)) if candidate == code => {
                    lines.push(text.to_owned());
                }
                _ => lines.push(line.trim_start().to_owned()),
            }
        }
    }

    Ok(Reply::new(code, lines))
}

/// Splits `NNN text` / `NNN-text` into its code, continuation flag and text.
fn split_reply_line(line: &str) -> Option<(ReplyCode, bool, &str)> {
    let bytes = line.as_bytes();
    if bytes.len() < 3 || !bytes[..3].iter().all(u8::is_ascii_digit) {
        return None;
    }

    let value = u16::from(bytes[0] - b'0') * 100
        + u16::from(bytes[1] - b'0') * 10
        + u16::from(bytes[2] - b'0');
    let code = ReplyCode::new(value)?;

    match bytes.get(3) {
        None => Some((code, false, "")),
        Some(b' ') => Some((code, false, &line[4..])),
        Some(b'-') => Some((code, true, &line[4..])),
        Some(_) => None,
    }
}

/// Reads one line, retrying on interrupts and trimming CR/LF terminators.
///
/// Connection resets are reported as end of stream so callers see a single
/// "closed" condition regardless of how the peer went away.
fn read_line<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut buffer = Vec::new();

    let bytes = loop {
        match reader.read_until(b'\n', &mut buffer) {
            Ok(bytes) => break bytes,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::ConnectionReset
                        | io::ErrorKind::ConnectionAborted
                        | io::ErrorKind::BrokenPipe
                ) =>
            {
                return Ok(None);
            }
            Err(error) => return Err(error),
        }
    };

    if bytes == 0 && buffer.is_empty() {
        return Ok(None);
    }

    while matches!(buffer.last(), Some(b'\n' | b'\r')) {
        buffer.pop();
    }

    Ok(Some(String::from_utf8_lossy(&buffer).into_owned()))
}
