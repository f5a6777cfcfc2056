//! Typed events produced by the router.
//!
//! Every classified message yields exactly one [`Event`]. Multi-line server
//! replies (MOTD, WHO, NAMES) yield one event per completed burst.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::caps::CapReply;
use crate::isupport::Feature;
use crate::prefix::Source;
use crate::response::Response;
use crate::store::{GlobalUser, Member};

/// A classified server message.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Event {
    Notice {
        sender: Source,
        target: String,
        text: String,
    },
    Privmsg {
        sender: Source,
        target: String,
        text: String,
    },
    /// A PRIVMSG whose body is `\x01command params\x01`.
    Ctcp {
        sender: Source,
        target: String,
        command: String,
        params: Option<String>,
    },
    Cap(CapReply),
    Authenticate {
        message: String,
    },
    Ping {
        /// Empty when the server sent no token.
        token: String,
    },
    Pong {
        token: Option<String>,
    },
    Join {
        nick: String,
        channel: String,
    },
    Part {
        nick: String,
        channel: String,
        reason: Option<String>,
    },
    Quit {
        nick: String,
        reason: Option<String>,
    },
    Nick {
        old_nick: String,
        new_nick: String,
    },
    Kick {
        /// The nick that was kicked.
        who: String,
        /// The nick that kicked.
        by: String,
        channel: String,
        reason: Option<String>,
    },
    /// A live `TOPIC` change.
    Topic {
        channel: String,
        text: String,
        who: String,
        time: DateTime<Utc>,
    },
    /// RPL_TOPIC.
    TopicText {
        channel: String,
        text: String,
    },
    /// RPL_TOPICWHOTIME.
    TopicWhoTime {
        channel: String,
        who: String,
        time: Option<DateTime<Utc>>,
    },
    Motd {
        text: Vec<String>,
    },
    Who {
        channel: String,
        users: Vec<GlobalUser>,
    },
    Names {
        channel: String,
        users: Vec<Member>,
    },
    /// RPL_WELCOME; `nick` is the nick the server registered us under.
    Welcome {
        nick: String,
        text: String,
    },
    Isupport(Vec<Feature>),
    /// LUSER counters, keyed by stat name.
    Luser(Vec<(&'static str, u64)>),
    SaslSuccess,
    SaslFailure {
        code: Response,
        reason: String,
    },
    /// ERR_NICKNAMEINUSE or ERR_ERRONEUSNICKNAME.
    NickInUse {
        nick: String,
    },
    /// Server `ERROR`; the connection is about to close.
    Error {
        reason: String,
    },
    /// A command the router does not classify.
    Unhandled {
        command: String,
    },
}

/// Discriminant of [`Event`], used to key subscriptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum EventKind {
    Notice,
    Privmsg,
    Ctcp,
    Cap,
    Authenticate,
    Ping,
    Pong,
    Join,
    Part,
    Quit,
    Nick,
    Kick,
    Topic,
    TopicText,
    TopicWhoTime,
    Motd,
    Who,
    Names,
    Welcome,
    Isupport,
    Luser,
    SaslSuccess,
    SaslFailure,
    NickInUse,
    Error,
    Unhandled,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Notice { .. } => EventKind::Notice,
            Event::Privmsg { .. } => EventKind::Privmsg,
            Event::Ctcp { .. } => EventKind::Ctcp,
            Event::Cap(_) => EventKind::Cap,
            Event::Authenticate { .. } => EventKind::Authenticate,
            Event::Ping { .. } => EventKind::Ping,
            Event::Pong { .. } => EventKind::Pong,
            Event::Join { .. } => EventKind::Join,
            Event::Part { .. } => EventKind::Part,
            Event::Quit { .. } => EventKind::Quit,
            Event::Nick { .. } => EventKind::Nick,
            Event::Kick { .. } => EventKind::Kick,
            Event::Topic { .. } => EventKind::Topic,
            Event::TopicText { .. } => EventKind::TopicText,
            Event::TopicWhoTime { .. } => EventKind::TopicWhoTime,
            Event::Motd { .. } => EventKind::Motd,
            Event::Who { .. } => EventKind::Who,
            Event::Names { .. } => EventKind::Names,
            Event::Welcome { .. } => EventKind::Welcome,
            Event::Isupport(_) => EventKind::Isupport,
            Event::Luser(_) => EventKind::Luser,
            Event::SaslSuccess => EventKind::SaslSuccess,
            Event::SaslFailure { .. } => EventKind::SaslFailure,
            Event::NickInUse { .. } => EventKind::NickInUse,
            Event::Error { .. } => EventKind::Error,
            Event::Unhandled { .. } => EventKind::Unhandled,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
