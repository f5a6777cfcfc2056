//! Data types held by the session store.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::isupport::SupportValue;

/// Server metadata gathered during the connection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ServerInfo {
    /// RPL_ISUPPORT feature table.
    pub support: BTreeMap<String, SupportValue>,
    /// LUSER counters.
    pub stats: BTreeMap<String, u64>,
    /// Lines of the last complete MOTD.
    pub motd: Vec<String>,
}

/// A channel this client is in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Channel {
    pub name: String,
    pub topic: Topic,
    pub members: Vec<Member>,
}

impl Channel {
    pub fn new(name: impl Into<String>) -> Self {
        Channel {
            name: name.into(),
            topic: Topic::default(),
            members: Vec::new(),
        }
    }
}

/// Channel topic. Each field is filled in independently.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Topic {
    pub text: Option<String>,
    pub set_by: Option<String>,
    pub set_on: Option<DateTime<Utc>>,
}

/// A partial topic update; `None` fields leave the stored value alone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TopicPatch {
    pub text: Option<String>,
    pub set_by: Option<String>,
    pub set_on: Option<DateTime<Utc>>,
}

impl Topic {
    /// Apply a patch, overwriting only the fields it carries.
    pub fn apply(&mut self, patch: TopicPatch) {
        if let Some(text) = patch.text {
            self.text = Some(text);
        }
        if let Some(set_by) = patch.set_by {
            self.set_by = Some(set_by);
        }
        if let Some(set_on) = patch.set_on {
            self.set_on = Some(set_on);
        }
    }
}

/// A channel member and the membership prefixes (`@`, `+`, ...) it holds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Member {
    pub nick: String,
    pub mode_prefixes: BTreeSet<char>,
}

impl Member {
    /// A member with no prefixes.
    pub fn new(nick: impl Into<String>) -> Self {
        Member {
            nick: nick.into(),
            mode_prefixes: BTreeSet::new(),
        }
    }

    /// Split a NAMES token such as `@+bob` into prefixes and nick.
    ///
    /// Every leading character found in `prefixes` is a membership prefix.
    /// Returns `None` when nothing is left for the nick.
    pub fn from_names_token(token: &str, prefixes: &str) -> Option<Self> {
        let nick = token.trim_start_matches(|c: char| prefixes.contains(c));
        if nick.is_empty() {
            return None;
        }
        let mode_prefixes = token[..token.len() - nick.len()].chars().collect();
        Some(Member {
            nick: nick.to_owned(),
            mode_prefixes,
        })
    }
}

/// A user known from a WHO reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GlobalUser {
    pub nick: String,
    pub username: String,
    pub host: String,
    pub server: String,
    pub realname: String,
}

/// Transport facts the connection driver reports.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConnectionInfo {
    pub remote_addr: Option<String>,
    pub encrypted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_from_names_token() {
        let m = Member::from_names_token("@+bob", "~&@%+").unwrap();
        assert_eq!(m.nick, "bob");
        assert_eq!(m.mode_prefixes, ['@', '+'].into_iter().collect());

        let plain = Member::from_names_token("carol", "~&@%+").unwrap();
        assert!(plain.mode_prefixes.is_empty());

        assert!(Member::from_names_token("@", "~&@%+").is_none());
    }

    #[test]
    fn test_topic_patch_keeps_missing_fields() {
        let mut topic = Topic {
            text: Some("old".into()),
            set_by: Some("alice".into()),
            set_on: None,
        };
        topic.apply(TopicPatch {
            text: Some("new".into()),
            ..Default::default()
        });
        assert_eq!(topic.text.as_deref(), Some("new"));
        assert_eq!(topic.set_by.as_deref(), Some("alice"));
    }
}
