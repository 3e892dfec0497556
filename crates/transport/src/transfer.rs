use std::fmt;
use std::path::{Path, PathBuf};

/// Direction of a file transfer, seen from the control machine.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TransferDirection {
    /// Host to local (`RETR`).
    Download,
    /// Local to host (`STOR`).
    Upload,
}

impl TransferDirection {
    /// Returns a lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Download => "download",
            Self::Upload => "upload",
        }
    }
}

impl fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of a completed transfer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransferReport {
    direction: TransferDirection,
    remote: String,
    local: PathBuf,
    bytes: u64,
}

impl TransferReport {
    /// Creates a report.
    #[must_use]
    pub fn new(direction: TransferDirection, remote: &str, local: &Path, bytes: u64) -> Self {
        Self {
            direction,
            remote: remote.to_owned(),
            local: local.to_path_buf(),
            bytes,
        }
    }

    /// Returns the direction.
    #[must_use]
    pub const fn direction(&self) -> TransferDirection {
        self.direction
    }

    /// Returns the host path.
    #[must_use]
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Returns the local path.
    #[must_use]
    pub fn local(&self) -> &Path {
        &self.local
    }

    /// Returns the number of bytes moved.
    #[must_use]
    pub const fn bytes(&self) -> u64 {
        self.bytes
    }
}
