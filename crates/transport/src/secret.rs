use std::fmt;

use zeroize::Zeroizing;

/// A password that is wiped from memory when dropped.
///
/// `Debug` and `Display` never print the content, so a [`Secret`] can sit in
/// structures that are logged or included in error values.
#[derive(Clone, Default, Eq, PartialEq)]
pub struct Secret(Zeroizing<String>);

impl Secret {
    /// Takes ownership of `value`; the original allocation is wiped on drop.
    #[must_use]
    pub fn new(value: String) -> Self {
        Self(Zeroizing::new(value))
    }

    /// Returns the clear text, for the single place that sends it.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Returns `true` for an empty password.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value.to_owned())
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(****)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

/// A user profile and its password.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Credentials {
    user: String,
    password: Secret,
}

impl Credentials {
    /// Creates credentials; the user profile is upper-cased as the host does.
    #[must_use]
    pub fn new(user: &str, password: Secret) -> Self {
        Self {
            user: user.trim().to_ascii_uppercase(),
            password,
        }
    }

    /// Returns the user profile.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Returns the password.
    #[must_use]
    pub const fn password(&self) -> &Secret {
        &self.password
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_and_display_are_redacted() {
        let secret = Secret::from("hunter2");
        assert_eq!(format!("{secret:?}"), "Secret(****)");
        assert_eq!(secret.to_string(), "****");
        assert_eq!(secret.expose(), "hunter2");
    }

    #[test]
    fn credentials_debug_does_not_leak_password() {
        let credentials = Credentials::new("qsecofr ", Secret::from("hunter2"));
        let rendered = format!("{credentials:?}");
        assert_eq!(credentials.user(), "QSECOFR");
        assert!(!rendered.contains("hunter2"));
    }
}
