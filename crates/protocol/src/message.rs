use std::fmt;
use std::str::FromStr;

/// IBM i message identifier: a three-letter prefix followed by four
/// hexadecimal digits (`CPF3812`, `CPD0043`, `MCH3601`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct MessageId([u8; 7]);

impl MessageId {
    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Constructed only from validated ASCII.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Returns the three-letter prefix (`CPF`, `CPD`, …).
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.as_str()[..3]
    }

    fn parse(candidate: &str) -> Option<Self> {
        let bytes = candidate.as_bytes();
        if bytes.len() != 7 {
            return None;
        }
        if !bytes[..3].iter().all(u8::is_ascii_uppercase) {
            return None;
        }
        if !bytes[3..]
            .iter()
            .all(|byte| byte.is_ascii_digit() || (b'A'..=b'F').contains(byte))
        {
            return None;
        }

        let mut id = [0u8; 7];
        id.copy_from_slice(bytes);
        Some(Self(id))
    }
}

impl FromStr for MessageId {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or(())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A host message referenced in reply text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HostMessage {
    id: MessageId,
    text: String,
}

impl HostMessage {
    /// Returns the message identifier.
    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.id
    }

    /// Returns the first-level text that accompanied the identifier.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for HostMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.text.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{}: {}", self.id, self.text)
        }
    }
}

/// Extracts every IBM i message identifier referenced in `lines`.
///
/// A line of the form `CPF3781: Library X not found.` yields the identifier
/// with the text after the colon. Identifiers that appear mid-sentence are
/// reported with the whole line as their text. Each identifier is reported
/// once, in order of first appearance.
pub fn extract_host_messages<S: AsRef<str>>(lines: &[S]) -> Vec<HostMessage> {
    let mut messages: Vec<HostMessage> = Vec::new();

    for line in lines {
        let line = line.as_ref().trim();
        for (index, word) in line.split_ascii_whitespace().enumerate() {
            let token = word.trim_end_matches([':', '.', ',', ';', ')']);
            let token = token.trim_start_matches('(');
            let Some(id) = MessageId::parse(token) else {
                continue;
            };
            if messages.iter().any(|existing| existing.id == id) {
                continue;
            }

            let text = if index == 0 {
                line[word.len()..].trim_start().to_owned()
            } else {
                line.to_owned()
            };
            messages.push(HostMessage { id, text });
        }
    }

    messages
}
