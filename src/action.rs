//! Caller-originated actions and their wire encoding.
//!
//! [`Action::encode`] is a pure function from an action to the command lines
//! that carry it. An action that cannot be expressed (a JOIN without
//! channels, a KICK of many users from many channels) encodes to `None`, as
//! does one whose names contain spaces or whose fields contain CR, LF or NUL.
//!
//! # Example
//!
//! ```
//! use slirc_session::action::{Action, JoinTarget};
//!
//! let join = Action::Join(vec![JoinTarget::with_key("#a", "k")]);
//! assert_eq!(join.encode(), Some(vec!["JOIN #a k".to_string()]));
//!
//! let msg = Action::privmsg("#a", "one\n\ntwo");
//! assert_eq!(
//!     msg.encode(),
//!     Some(vec!["PRIVMSG #a :one".to_string(), "PRIVMSG #a :two".to_string()])
//! );
//! ```

use std::fmt;

use serde::Deserialize;

use crate::ctcp::CTCP_DELIM;

/// Nicks per MODE line when changing privileges.
pub const PRIVILEGE_BATCH_SIZE: usize = 6;

/// A channel to join, with an optional key.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct JoinTarget {
    pub name: String,
    #[serde(default)]
    pub key: Option<String>,
}

impl JoinTarget {
    pub fn new(name: impl Into<String>) -> Self {
        JoinTarget {
            name: name.into(),
            key: None,
        }
    }

    pub fn with_key(name: impl Into<String>, key: impl Into<String>) -> Self {
        JoinTarget {
            name: name.into(),
            key: Some(key.into()),
        }
    }
}

impl From<&str> for JoinTarget {
    fn from(name: &str) -> Self {
        JoinTarget::new(name)
    }
}

/// Channel privileges that can be granted or revoked in bulk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Privilege {
    Op,
    HalfOp,
    Voice,
}

impl Privilege {
    /// The channel mode letter.
    pub fn mode(self) -> char {
        match self {
            Privilege::Op => 'o',
            Privilege::HalfOp => 'h',
            Privilege::Voice => 'v',
        }
    }
}

/// Something the caller wants the client to do.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Action {
    Nick {
        nick: String,
    },
    Join(Vec<JoinTarget>),
    Part {
        channels: Vec<String>,
        reason: Option<String>,
    },
    /// One channel with any number of users, or any number of channels
    /// with one user.
    Kick {
        channels: Vec<String>,
        users: Vec<String>,
        reason: Option<String>,
    },
    /// Sets the topic to `text`. `None` or an empty text queries it.
    Topic {
        channel: String,
        text: Option<String>,
    },
    /// One PRIVMSG per non-empty line of `text`, each prefixed with `prefix`.
    Privmsg {
        target: String,
        text: String,
        prefix: Option<String>,
    },
    /// One NOTICE per non-empty line of `text`, each prefixed with `prefix`.
    Notice {
        target: String,
        text: String,
        prefix: Option<String>,
    },
    Ctcp {
        target: String,
        message: String,
    },
    Quit {
        reason: Option<String>,
    },
    /// Grant or revoke a privilege, six nicks per MODE line.
    Privileges {
        channel: String,
        grant: bool,
        privilege: Privilege,
        nicks: Vec<String>,
    },
}

impl Action {
    pub fn nick(nick: impl Into<String>) -> Self {
        Action::Nick { nick: nick.into() }
    }

    pub fn join(channel: impl Into<String>) -> Self {
        Action::Join(vec![JoinTarget::new(channel)])
    }

    pub fn part(channel: impl Into<String>, reason: Option<String>) -> Self {
        Action::Part {
            channels: vec![channel.into()],
            reason,
        }
    }

    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Self {
        Action::Privmsg {
            target: target.into(),
            text: text.into(),
            prefix: None,
        }
    }

    pub fn notice(target: impl Into<String>, text: impl Into<String>) -> Self {
        Action::Notice {
            target: target.into(),
            text: text.into(),
            prefix: None,
        }
    }

    pub fn ctcp(target: impl Into<String>, message: impl Into<String>) -> Self {
        Action::Ctcp {
            target: target.into(),
            message: message.into(),
        }
    }

    pub fn quit(reason: Option<String>) -> Self {
        Action::Quit { reason }
    }

    /// Encode into command lines without line terminators.
    ///
    /// Returns `None` when the action is invalid.
    pub fn encode(&self) -> Option<Vec<String>> {
        match self {
            Action::Nick { nick } => {
                valid_name(nick)?;
                Some(vec![format!("NICK {}", nick)])
            }
            Action::Join(targets) => {
                if targets.is_empty() {
                    return None;
                }
                for target in targets {
                    valid_name(&target.name)?;
                    if let Some(key) = target.key.as_deref().filter(|k| !k.is_empty()) {
                        valid_name(key)?;
                    }
                }
                let names: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
                let keys: Vec<&str> = targets
                    .iter()
                    .map(|t| t.key.as_deref().filter(|k| !k.is_empty()).unwrap_or("0"))
                    .collect();
                Some(vec![format!("JOIN {} {}", names.join(","), keys.join(","))])
            }
            Action::Part { channels, reason } => {
                if channels.is_empty() {
                    return None;
                }
                valid_names(channels)?;
                valid_trailing(reason.as_deref())?;
                let mut line = format!("PART {}", channels.join(","));
                push_trailing(&mut line, reason.as_deref());
                Some(vec![line])
            }
            Action::Kick {
                channels,
                users,
                reason,
            } => {
                let users = match (channels.len(), users.len()) {
                    (0, _) | (_, 0) => return None,
                    (1, _) => users.clone(),
                    (n, 1) => vec![users[0].clone(); n],
                    _ => return None,
                };
                valid_names(channels)?;
                valid_names(&users)?;
                valid_trailing(reason.as_deref())?;
                let mut line = format!("KICK {} {}", channels.join(","), users.join(","));
                push_trailing(&mut line, reason.as_deref());
                Some(vec![line])
            }
            Action::Topic { channel, text } => {
                valid_name(channel)?;
                valid_trailing(text.as_deref())?;
                let mut line = format!("TOPIC {}", channel);
                push_trailing(&mut line, text.as_deref());
                Some(vec![line])
            }
            Action::Privmsg {
                target,
                text,
                prefix,
            } => message_lines("PRIVMSG", target, text, prefix.as_deref()),
            Action::Notice {
                target,
                text,
                prefix,
            } => message_lines("NOTICE", target, text, prefix.as_deref()),
            Action::Ctcp { target, message } => {
                valid_name(target)?;
                valid_text(message)?;
                Some(vec![format!(
                    "PRIVMSG {} :{}{}{}",
                    target, CTCP_DELIM, message, CTCP_DELIM
                )])
            }
            Action::Quit { reason } => {
                valid_trailing(reason.as_deref())?;
                let mut line = String::from("QUIT");
                push_trailing(&mut line, reason.as_deref());
                Some(vec![line])
            }
            Action::Privileges {
                channel,
                grant,
                privilege,
                nicks,
            } => {
                valid_name(channel)?;
                valid_names(nicks)?;
                let sign = if *grant { '+' } else { '-' };
                Some(
                    nicks
                        .chunks(PRIVILEGE_BATCH_SIZE)
                        .map(|batch| {
                            let modes: String =
                                std::iter::repeat(privilege.mode()).take(batch.len()).collect();
                            format!("MODE {} {}{} {}", channel, sign, modes, batch.join(" "))
                        })
                        .collect(),
                )
            }
        }
    }
}

impl fmt::Display for Action {
    /// Short name used in diagnostics.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Nick { .. } => "NICK",
            Action::Join(_) => "JOIN",
            Action::Part { .. } => "PART",
            Action::Kick { .. } => "KICK",
            Action::Topic { .. } => "TOPIC",
            Action::Privmsg { .. } => "PRIVMSG",
            Action::Notice { .. } => "NOTICE",
            Action::Ctcp { .. } => "CTCP",
            Action::Quit { .. } => "QUIT",
            Action::Privileges { .. } => "MODE",
        };
        f.write_str(name)
    }
}

/// A nick, channel or target: non-empty and free of spaces and line breaks.
fn valid_name(s: &str) -> Option<()> {
    (!s.is_empty() && !s.contains([' ', '\r', '\n', '\0'])).then_some(())
}

fn valid_names(names: &[String]) -> Option<()> {
    names.iter().try_for_each(|name| valid_name(name))
}

/// Free text that has to stay on a single line.
fn valid_text(s: &str) -> Option<()> {
    (!s.contains(['\r', '\n', '\0'])).then_some(())
}

fn valid_trailing(s: Option<&str>) -> Option<()> {
    s.map_or(Some(()), valid_text)
}

fn push_trailing(line: &mut String, trailing: Option<&str>) {
    if let Some(text) = trailing.filter(|t| !t.is_empty()) {
        line.push_str(" :");
        line.push_str(text);
    }
}

fn message_lines(
    command: &str,
    target: &str,
    text: &str,
    prefix: Option<&str>,
) -> Option<Vec<String>> {
    valid_name(target)?;
    valid_trailing(prefix)?;
    if text.contains('\0') {
        return None;
    }
    let prefix = prefix.unwrap_or_default();
    Some(
        text.split(['\r', '\n'])
            .filter(|line| !line.is_empty())
            .map(|line| format!("{} {} :{}{}", command, target, prefix, line))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(action: Action) -> String {
        let mut lines = action.encode().expect("valid action");
        assert_eq!(lines.len(), 1);
        lines.remove(0)
    }

    #[test]
    fn test_nick() {
        assert_eq!(one(Action::nick("bob")), "NICK bob");
        assert_eq!(Action::nick("").encode(), None);
    }

    #[test]
    fn test_join_keys_default_to_zero() {
        assert_eq!(one(Action::join("#a")), "JOIN #a 0");
        let multi = Action::Join(vec![JoinTarget::new("#a"), JoinTarget::with_key("#b", "pw")]);
        assert_eq!(one(multi), "JOIN #a,#b 0,pw");
        assert_eq!(Action::Join(vec![]).encode(), None);
    }

    #[test]
    fn test_part() {
        assert_eq!(one(Action::part("#a", None)), "PART #a");
        assert_eq!(
            one(Action::part("#a", Some("gone fishing".into()))),
            "PART #a :gone fishing"
        );
    }

    #[test]
    fn test_kick_shapes() {
        let one_channel = Action::Kick {
            channels: vec!["#a".into()],
            users: vec!["x".into(), "y".into()],
            reason: Some("bye".into()),
        };
        assert_eq!(one(one_channel), "KICK #a x,y :bye");

        let one_user = Action::Kick {
            channels: vec!["#a".into(), "#b".into()],
            users: vec!["x".into()],
            reason: None,
        };
        assert_eq!(one(one_user), "KICK #a,#b x,x");

        let cartesian = Action::Kick {
            channels: vec!["#a".into(), "#b".into()],
            users: vec!["x".into(), "y".into()],
            reason: None,
        };
        assert_eq!(cartesian.encode(), None);
    }

    #[test]
    fn test_topic() {
        let query = Action::Topic {
            channel: "#a".into(),
            text: None,
        };
        assert_eq!(one(query), "TOPIC #a");
        let set = Action::Topic {
            channel: "#a".into(),
            text: Some("new topic".into()),
        };
        assert_eq!(one(set), "TOPIC #a :new topic");
        let empty = Action::Topic {
            channel: "#a".into(),
            text: Some(String::new()),
        };
        assert_eq!(one(empty), "TOPIC #a");
    }

    #[test]
    fn test_line_breaks_in_fields_are_rejected() {
        let topic = Action::Topic {
            channel: "#a".into(),
            text: Some("hi\r\nQUIT :pwned".into()),
        };
        assert_eq!(topic.encode(), None);
        assert_eq!(Action::nick("bob\nQUIT").encode(), None);
        assert_eq!(Action::part("#a", Some("bye\r\nJOIN #b".into())).encode(), None);
        assert_eq!(Action::quit(Some("x\0y".into())).encode(), None);
        assert_eq!(Action::ctcp("alice", "PING\nQUIT").encode(), None);
        assert_eq!(Action::privmsg("#a\r\nQUIT", "hi").encode(), None);
        assert_eq!(Action::privmsg("#a", "nul\0inside").encode(), None);

        let kick = Action::Kick {
            channels: vec!["#a".into()],
            users: vec!["x".into()],
            reason: Some("\nQUIT".into()),
        };
        assert_eq!(kick.encode(), None);
    }

    #[test]
    fn test_names_with_spaces_are_rejected() {
        assert_eq!(Action::nick("bob smith").encode(), None);
        assert_eq!(Action::join("#a b").encode(), None);
        assert_eq!(
            Action::Join(vec![JoinTarget::with_key("#a", "two words")]).encode(),
            None
        );
        assert_eq!(Action::notice("alice bob", "hi").encode(), None);

        let ops = Action::Privileges {
            channel: "#a".into(),
            grant: true,
            privilege: Privilege::Op,
            nicks: vec!["ok".into(), "".into()],
        };
        assert_eq!(ops.encode(), None);
    }

    #[test]
    fn test_privmsg_splits_lines_with_prefix() {
        let action = Action::Privmsg {
            target: "#a".into(),
            text: "first\r\n\r\nsecond\nthird".into(),
            prefix: Some("> ".into()),
        };
        assert_eq!(
            action.encode().unwrap(),
            vec![
                "PRIVMSG #a :> first",
                "PRIVMSG #a :> second",
                "PRIVMSG #a :> third"
            ]
        );
        assert_eq!(Action::notice("#a", "\n\n").encode(), Some(vec![]));
        assert_eq!(Action::notice("", "hi").encode(), None);
    }

    #[test]
    fn test_ctcp_and_quit() {
        assert_eq!(
            one(Action::ctcp("alice", "VERSION")),
            "PRIVMSG alice :\x01VERSION\x01"
        );
        assert_eq!(one(Action::quit(None)), "QUIT");
        assert_eq!(one(Action::quit(Some("bye all".into()))), "QUIT :bye all");
    }

    #[test]
    fn test_privileges_batches_of_six() {
        let nicks: Vec<String> = (1..=8).map(|i| format!("n{i}")).collect();
        let action = Action::Privileges {
            channel: "#a".into(),
            grant: true,
            privilege: Privilege::Op,
            nicks,
        };
        assert_eq!(
            action.encode().unwrap(),
            vec!["MODE #a +oooooo n1 n2 n3 n4 n5 n6", "MODE #a +oo n7 n8"]
        );

        let take = Action::Privileges {
            channel: "#a".into(),
            grant: false,
            privilege: Privilege::Voice,
            nicks: vec!["x".into()],
        };
        assert_eq!(one(take), "MODE #a -v x");
    }
}
