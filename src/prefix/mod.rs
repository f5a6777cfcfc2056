//! IRC message prefix (source) handling.

use serde::Serialize;

/// The source of a message, as far as this client cares about it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum Source {
    /// A user, identified by the nick part of `nick!user@host`.
    User(String),
    /// Anything without a `!`, typically a server name.
    Server(String),
}

impl Source {
    /// Classify a raw prefix.
    pub fn from_prefix(prefix: &str) -> Self {
        match nick_of(prefix) {
            Some(nick) => Source::User(nick.to_owned()),
            None => Source::Server(prefix.to_owned()),
        }
    }

    /// Nick or server name.
    pub fn name(&self) -> &str {
        match self {
            Source::User(n) | Source::Server(n) => n,
        }
    }

    /// The nick, for user sources only.
    pub fn nick(&self) -> Option<&str> {
        match self {
            Source::User(n) => Some(n),
            Source::Server(_) => None,
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Extract the nick from a `nick!user@host` prefix.
///
/// A prefix without `!` does not identify a user and yields `None`.
pub fn nick_of(prefix: &str) -> Option<&str> {
    match prefix.split_once('!') {
        Some((nick, _)) if !nick.is_empty() => Some(nick),
        _ => None,
    }
}
