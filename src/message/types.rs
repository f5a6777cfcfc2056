//! Owned IRC message type.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::MessageParseError;
use crate::prefix;
use crate::response;

use super::nom_parser::ParsedMessage;

/// One parsed IRC line: optional prefix, command and parameters.
///
/// The trailing parameter, if any, is the last element of `params`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Message source, without the leading `:`.
    pub prefix: Option<String>,
    /// Command name or numeric reply (possibly normalized).
    pub command: String,
    /// Middle parameters followed by the trailing parameter.
    pub params: Vec<String>,
}

impl Message {
    /// Parse a single line. Trailing CR/LF characters are ignored.
    pub fn parse(line: &str) -> Result<Self, MessageParseError> {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.trim().is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }

        let parsed = match ParsedMessage::parse(trimmed) {
            Ok(m) => m,
            Err(e) if e.in_prefix() => {
                return Err(MessageParseError::InvalidPrefix(trimmed.to_string()))
            }
            Err(_) => return Err(MessageParseError::InvalidCommand),
        };

        Ok(Message {
            prefix: parsed.prefix.map(str::to_owned),
            command: parsed.command.to_owned(),
            params: parsed.params.into_iter().map(str::to_owned).collect(),
        })
    }

    /// Create a message without a prefix.
    pub fn new(command: impl Into<String>, params: Vec<String>) -> Self {
        Message {
            prefix: None,
            command: command.into(),
            params,
        }
    }

    /// Replace a numeric command with its reply name, see [`response::normalize`].
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if let Some(name) = response::reply_name(&self.command) {
            self.command = name.to_owned();
        }
        self
    }

    /// Parameter at `index`, if present.
    #[inline]
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// Nick of the sender when the prefix has the `nick!user@host` shape.
    pub fn source_nick(&self) -> Option<&str> {
        self.prefix.as_deref().and_then(prefix::nick_of)
    }
}

impl FromStr for Message {
    type Err = MessageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Message::parse(s)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, ":{} ", prefix)?;
        }
        f.write_str(&self.command)?;

        if let Some((last, middle)) = self.params.split_last() {
            for param in middle {
                write!(f, " {}", param)?;
            }
            if last.is_empty() || last.contains(' ') || last.starts_with(':') {
                write!(f, " :{}", last)?;
            } else {
                write!(f, " {}", last)?;
            }
        }

        Ok(())
    }
}
