//! Session state for one connection.
//!
//! The [`Store`] is created empty when a connection starts and is mutated only
//! by the session's in-order event processing. Readers get `&Store`, a clone,
//! or a JSON snapshot; none of them can observe a half-applied event.
//!
//! Channel and nick lookups use RFC 1459 case mapping.

mod apply;
mod path;
mod types;

pub use self::types::{Channel, ConnectionInfo, GlobalUser, Member, ServerInfo, Topic, TopicPatch};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::casemap::irc_eq;
use crate::error::StoreError;
use crate::isupport::Feature;

/// Queryable session state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Store {
    pub own_nick: String,
    pub server: ServerInfo,
    pub channels: Vec<Channel>,
    /// Users seen in WHO replies. Not a complete directory.
    pub users: Vec<GlobalUser>,
    pub connection: Option<ConnectionInfo>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `nick` is this client's current nick.
    pub fn is_own_nick(&self, nick: &str) -> bool {
        !self.own_nick.is_empty() && irc_eq(&self.own_nick, nick)
    }

    pub fn set_own_nick(&mut self, nick: impl Into<String>) {
        self.own_nick = nick.into();
        debug!(nick = %self.own_nick, "own nick set");
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| irc_eq(&c.name, name))
    }

    fn channel_mut(&mut self, name: &str) -> Option<&mut Channel> {
        self.channels.iter_mut().find(|c| irc_eq(&c.name, name))
    }

    /// Add an empty channel. Returns `false` if it already exists.
    pub fn add_channel(&mut self, name: &str) -> bool {
        if self.channel(name).is_some() {
            return false;
        }
        self.channels.push(Channel::new(name));
        debug!(channel = name, "channel added");
        true
    }

    pub fn remove_channel(&mut self, name: &str) -> Option<Channel> {
        let index = self.channels.iter().position(|c| irc_eq(&c.name, name))?;
        debug!(channel = name, "channel removed");
        Some(self.channels.remove(index))
    }

    /// Patch a channel's topic. Returns `false` for unknown channels.
    pub fn patch_topic(&mut self, name: &str, patch: TopicPatch) -> bool {
        match self.channel_mut(name) {
            Some(channel) => {
                channel.topic.apply(patch);
                true
            }
            None => false,
        }
    }

    pub fn has_member(&self, channel: &str, nick: &str) -> bool {
        self.channel(channel)
            .is_some_and(|c| c.members.iter().any(|m| irc_eq(&m.nick, nick)))
    }

    /// Add a member unless it is already listed.
    pub fn add_member(&mut self, channel: &str, member: Member) -> bool {
        let Some(chan) = self.channel_mut(channel) else {
            return false;
        };
        if chan.members.iter().any(|m| irc_eq(&m.nick, &member.nick)) {
            return false;
        }
        chan.members.push(member);
        true
    }

    pub fn remove_member(&mut self, channel: &str, nick: &str) -> bool {
        let Some(chan) = self.channel_mut(channel) else {
            return false;
        };
        let before = chan.members.len();
        chan.members.retain(|m| !irc_eq(&m.nick, nick));
        chan.members.len() != before
    }

    /// Remove `nick` from every channel and from the user directory.
    pub fn forget_nick(&mut self, nick: &str) {
        for chan in &mut self.channels {
            chan.members.retain(|m| !irc_eq(&m.nick, nick));
        }
        self.users.retain(|u| !irc_eq(&u.nick, nick));
    }

    /// Rename a member in every channel and in the user directory.
    pub fn rename_member(&mut self, old: &str, new: &str) {
        for chan in &mut self.channels {
            for member in chan.members.iter_mut().filter(|m| irc_eq(&m.nick, old)) {
                member.nick = new.to_owned();
            }
        }
        for user in self.users.iter_mut().filter(|u| irc_eq(&u.nick, old)) {
            user.nick = new.to_owned();
        }
    }

    /// Replace a channel's member list wholesale.
    pub fn set_members(&mut self, channel: &str, members: Vec<Member>) -> bool {
        match self.channel_mut(channel) {
            Some(chan) => {
                chan.members = members;
                true
            }
            None => false,
        }
    }

    /// Merge ISUPPORT features; negated features are removed.
    pub fn merge_support(&mut self, features: impl IntoIterator<Item = Feature>) {
        for feature in features {
            match feature.value {
                Some(value) => {
                    self.server.support.insert(feature.key, value);
                }
                None => {
                    self.server.support.remove(&feature.key);
                }
            }
        }
    }

    /// Merge LUSER counters, keeping counters not mentioned.
    pub fn merge_stats<'a>(&mut self, stats: impl IntoIterator<Item = (&'a str, u64)>) {
        for (key, value) in stats {
            self.server.stats.insert(key.to_owned(), value);
        }
    }

    pub fn set_motd(&mut self, lines: Vec<String>) {
        self.server.motd = lines;
    }

    /// Insert WHO users, replacing entries with the same nick.
    pub fn upsert_users(&mut self, users: impl IntoIterator<Item = GlobalUser>) {
        for user in users {
            match self.users.iter_mut().find(|u| irc_eq(&u.nick, &user.nick)) {
                Some(existing) => *existing = user,
                None => self.users.push(user),
            }
        }
    }

    pub fn user(&self, nick: &str) -> Option<&GlobalUser> {
        self.users.iter().find(|u| irc_eq(&u.nick, nick))
    }

    pub fn set_connection(&mut self, info: ConnectionInfo) {
        self.connection = Some(info);
    }

    /// The whole state as JSON.
    pub fn snapshot(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Pretty-printed JSON, for diagnostics.
    pub fn to_json(&self) -> String {
        format!("{:#}", self.snapshot())
    }

    /// Read a value by path, such as `channels[0].topic.set_by`.
    pub fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let snapshot = self.snapshot();
        Ok(path::lookup(&snapshot, path)?.cloned())
    }
}
