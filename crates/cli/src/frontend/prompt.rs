use std::env;
use std::io::{self, BufRead, Write};

use is_terminal::IsTerminal;
use zipseries_core::{ConfigError, LibraryName, ObjectSpec, Role, Secret, SecretPrompt};

/// Environment variable supplying the source password.
pub const SOURCE_PASSWORD_ENV: &str = "ZIPSERIES_SOURCE_PASSWORD";
/// Environment variable supplying the target password.
pub const TARGET_PASSWORD_ENV: &str = "ZIPSERIES_TARGET_PASSWORD";

/// Answer that selects the whole library at the object prompt.
const WHOLE_LIBRARY: &str = "*NONE";

/// Asks which objects to save when none were configured.
pub trait ObjectPrompt {
    /// Returns the objects to save from `library`; `None` saves it whole.
    fn objects(&mut self, library: Option<&LibraryName>) -> Result<Option<Vec<ObjectSpec>>, ConfigError>;
}

/// Parses an object prompt answer: space-separated `NAME[:TYPE,…]` tokens,
/// where names may be generic (`PAY*`). An empty answer or an answer of
/// exactly `*NONE` selects the whole library.
pub fn parse_object_list(answer: &str) -> Result<Option<Vec<ObjectSpec>>, ConfigError> {
    let tokens: Vec<&str> = answer.split_whitespace().collect();
    match tokens.as_slice() {
        [] => return Ok(None),
        [only] if only.eq_ignore_ascii_case(WHOLE_LIBRARY) => return Ok(None),
        _ => {}
    }
    tokens.into_iter().map(str::parse).collect::<Result<Vec<_>, _>>().map(Some)
}

/// Password source for interactive runs.
///
/// The role's environment variable is consulted first; otherwise the
/// password is read from the terminal with echo disabled.
pub struct TerminalPrompt {
    interactive: bool,
    lookup: fn(&str) -> Option<String>,
}

impl TerminalPrompt {
    /// Prompts only when standard input is a terminal.
    #[must_use]
    pub fn new() -> Self {
        Self::with_lookup(io::stdin().is_terminal(), |key| env::var(key).ok())
    }

    pub(crate) fn with_lookup(interactive: bool, lookup: fn(&str) -> Option<String>) -> Self {
        Self { interactive, lookup }
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretPrompt for TerminalPrompt {
    fn password(&mut self, role: Role, server: &str, user: &str) -> Result<Secret, ConfigError> {
        let variable = match role {
            Role::Source => SOURCE_PASSWORD_ENV,
            Role::Target => TARGET_PASSWORD_ENV,
        };
        if let Some(value) = (self.lookup)(variable) {
            return Ok(Secret::from(value));
        }

        let unavailable = |reason: String| ConfigError::PasswordUnavailable {
            role,
            user: user.to_owned(),
            reason,
        };
        if !self.interactive {
            return Err(unavailable(format!(
                "no terminal to prompt on; set {variable} or pass the password option"
            )));
        }
        rpassword::prompt_password(format!("{role} password for {user} on {server}: "))
            .map(Secret::from)
            .map_err(|error| unavailable(error.to_string()))
    }
}

/// Object prompt reading one line from standard input.
///
/// Without a terminal nothing is asked and the whole library is saved.
pub struct TerminalObjectPrompt {
    interactive: bool,
}

impl TerminalObjectPrompt {
    /// Prompts only when standard input is a terminal.
    #[must_use]
    pub fn new() -> Self {
        Self {
            interactive: io::stdin().is_terminal(),
        }
    }
}

impl Default for TerminalObjectPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectPrompt for TerminalObjectPrompt {
    fn objects(&mut self, library: Option<&LibraryName>) -> Result<Option<Vec<ObjectSpec>>, ConfigError> {
        if !self.interactive {
            return Ok(None);
        }
        let library = library.map_or("the library", LibraryName::as_str);
        let mut stderr = io::stderr();
        let mut answer = String::new();
        let asked = write!(
            stderr,
            "Objects to save from {library} (space separated, {WHOLE_LIBRARY} for all): "
        )
        .and_then(|()| stderr.flush())
        .and_then(|()| io::stdin().lock().read_line(&mut answer));
        if let Err(error) = asked {
            tracing::warn!(target: "zipseries::run", "object prompt failed: {error}");
            return Ok(None);
        }
        parse_object_list(&answer)
    }
}
