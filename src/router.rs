//! Classification of normalized messages into typed events.
//!
//! The [`Router`] consumes messages in arrival order and returns at most one
//! [`Event`] per message. MOTD, WHO and NAMES replies are buffered in a
//! [`Burst`] until their end marker, then surface as a single event.
//!
//! Fields are extracted by IRC positional-parameter convention, e.g.
//! RPL_NAMREPLY is `[target, symbol, channel, names]`.

use chrono::{TimeZone, Utc};
use tracing::warn;

use crate::burst::Burst;
use crate::caps::CapReply;
use crate::ctcp::Ctcp;
use crate::event::Event;
use crate::isupport::{self, PrefixSpec, SupportValue, DEFAULT_MEMBERSHIP_PREFIXES};
use crate::message::Message;
use crate::prefix::Source;
use crate::response::Response;
use crate::store::{GlobalUser, Member};

/// One buffered RPL_WHOREPLY.
#[derive(Clone, Debug, PartialEq, Eq)]
struct WhoReply {
    channel: String,
    user: GlobalUser,
}

/// One buffered RPL_NAMREPLY.
#[derive(Clone, Debug, PartialEq, Eq)]
struct NamesReply {
    channel: String,
    users: Vec<Member>,
}

/// Event classifier with burst aggregation state.
#[derive(Clone, Debug)]
pub struct Router {
    motd: Burst<String>,
    who: Burst<WhoReply>,
    names: Burst<NamesReply>,
    /// Membership prefix symbols used to split NAMES tokens.
    prefixes: String,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Router {
            motd: Burst::new(),
            who: Burst::new(),
            names: Burst::new(),
            prefixes: DEFAULT_MEMBERSHIP_PREFIXES.to_owned(),
        }
    }

    /// Membership prefix symbols currently in use.
    pub fn membership_prefixes(&self) -> &str {
        &self.prefixes
    }

    /// Classify one normalized message.
    ///
    /// Returns `None` for burst lines still being buffered, for end markers
    /// of empty bursts and for messages missing required fields.
    pub fn route(&mut self, msg: &Message) -> Option<Event> {
        let command = msg.command.as_str();
        match command {
            "NOTICE" => Some(Event::Notice {
                sender: sender(msg),
                target: param(msg, 0),
                text: param(msg, 1),
            }),
            "PRIVMSG" => Some(self.privmsg(msg)),
            "CAP" => match CapReply::from_params(&msg.params) {
                Some(reply) => Some(Event::Cap(reply)),
                None => malformed(msg),
            },
            "AUTHENTICATE" => Some(Event::Authenticate {
                message: param(msg, 0),
            }),
            "PING" => Some(Event::Ping {
                token: param(msg, 0),
            }),
            "PONG" => Some(Event::Pong {
                token: msg.params.last().cloned(),
            }),
            "JOIN" => {
                let nick = user_nick(msg)?;
                Some(Event::Join {
                    nick,
                    channel: required(msg, 0)?,
                })
            }
            "PART" => {
                let nick = user_nick(msg)?;
                Some(Event::Part {
                    nick,
                    channel: required(msg, 0)?,
                    reason: optional(msg, 1),
                })
            }
            "QUIT" => Some(Event::Quit {
                nick: user_nick(msg)?,
                reason: optional(msg, 0),
            }),
            "NICK" => {
                let old_nick = user_nick(msg)?;
                Some(Event::Nick {
                    old_nick,
                    new_nick: required(msg, 0)?,
                })
            }
            "KICK" => {
                let by = user_nick(msg)?;
                Some(Event::Kick {
                    who: required(msg, 1)?,
                    by,
                    channel: required(msg, 0)?,
                    reason: optional(msg, 2),
                })
            }
            "TOPIC" => {
                let who = user_nick(msg)?;
                Some(Event::Topic {
                    channel: required(msg, 0)?,
                    text: param(msg, 1),
                    who,
                    time: Utc::now(),
                })
            }
            "ERROR" => Some(Event::Error {
                reason: param(msg, 0),
            }),
            _ => match command.parse::<Response>() {
                Ok(response) => self.route_reply(response, msg),
                Err(_) => unhandled(msg),
            },
        }
    }

    fn privmsg(&self, msg: &Message) -> Event {
        let sender = sender(msg);
        let target = param(msg, 0);
        let text = msg.param(1).unwrap_or_default();

        match Ctcp::parse(text) {
            Some(ctcp) => Event::Ctcp {
                sender,
                target,
                command: ctcp.command.to_owned(),
                params: ctcp.params.map(str::to_owned),
            },
            None => Event::Privmsg {
                sender,
                target,
                text: text.to_owned(),
            },
        }
    }

    fn route_reply(&mut self, response: Response, msg: &Message) -> Option<Event> {
        match response {
            Response::RPL_WELCOME => Some(Event::Welcome {
                nick: required(msg, 0)?,
                text: param(msg, 1),
            }),
            Response::RPL_ISUPPORT => {
                let features = isupport::parse_response_args(&msg.params);
                self.update_prefixes(&features);
                Some(Event::Isupport(features))
            }
            Response::RPL_LUSEROP => luser(msg, &["opers_online"]),
            Response::RPL_LUSERUNKNOWN => luser(msg, &["unknown_connections"]),
            Response::RPL_LUSERCHANNELS => luser(msg, &["channels_formed"]),
            Response::RPL_LOCALUSERS => luser(msg, &["local_current_users", "local_max_users"]),
            Response::RPL_GLOBALUSERS => {
                luser(msg, &["global_current_users", "global_max_users"])
            }
            Response::RPL_TOPIC => Some(Event::TopicText {
                channel: required(msg, 1)?,
                text: param(msg, 2),
            }),
            Response::RPL_TOPICWHOTIME => {
                let setter = required(msg, 2)?;
                let who = setter.split('!').next().unwrap_or_default().to_owned();
                let time = msg
                    .param(3)
                    .and_then(|t| t.parse::<i64>().ok())
                    .and_then(|secs| Utc.timestamp_opt(secs, 0).single());
                Some(Event::TopicWhoTime {
                    channel: required(msg, 1)?,
                    who,
                    time,
                })
            }
            Response::RPL_MOTDSTART => None,
            Response::RPL_MOTD => {
                self.motd.push(param(msg, 1));
                None
            }
            Response::RPL_ENDOFMOTD | Response::ERR_NOMOTD => {
                self.motd.finish().map(|text| Event::Motd { text })
            }
            Response::RPL_WHOREPLY => {
                let reply = who_reply(msg)?;
                self.who.push(reply);
                None
            }
            Response::RPL_ENDOFWHO => {
                let replies = self.who.finish()?;
                let channel = replies[0].channel.clone();
                let users = replies.into_iter().map(|r| r.user).collect();
                Some(Event::Who { channel, users })
            }
            Response::RPL_NAMREPLY => {
                let reply = self.names_reply(msg)?;
                self.names.push(reply);
                None
            }
            Response::RPL_ENDOFNAMES => {
                let replies = self.names.finish()?;
                let channel = replies[0].channel.clone();
                let users = replies.into_iter().flat_map(|r| r.users).collect();
                Some(Event::Names { channel, users })
            }
            Response::RPL_SASLSUCCESS => Some(Event::SaslSuccess),
            Response::ERR_NICKLOCKED
            | Response::ERR_SASLFAIL
            | Response::ERR_SASLTOOLONG
            | Response::ERR_SASLABORTED
            | Response::ERR_SASLALREADY => Some(Event::SaslFailure {
                code: response,
                reason: msg.params.last().cloned().unwrap_or_default(),
            }),
            Response::ERR_NICKNAMEINUSE | Response::ERR_ERRONEUSNICKNAME => {
                Some(Event::NickInUse {
                    nick: param(msg, 1),
                })
            }
            _ => unhandled(msg),
        }
    }

    fn names_reply(&self, msg: &Message) -> Option<NamesReply> {
        let channel = required(msg, 2)?;
        let users = msg
            .param(3)
            .unwrap_or_default()
            .split_whitespace()
            .filter_map(|token| Member::from_names_token(token, &self.prefixes))
            .collect();
        Some(NamesReply { channel, users })
    }

    fn update_prefixes(&mut self, features: &[isupport::Feature]) {
        let Some(feature) = features.iter().find(|f| f.key == "PREFIX") else {
            return;
        };
        match &feature.value {
            Some(SupportValue::Text(raw)) => {
                if let Some(spec) = PrefixSpec::parse(raw) {
                    self.prefixes = spec.prefixes.to_owned();
                }
            }
            _ => self.prefixes = DEFAULT_MEMBERSHIP_PREFIXES.to_owned(),
        }
    }
}

fn param(msg: &Message, index: usize) -> String {
    msg.param(index).unwrap_or_default().to_owned()
}

fn optional(msg: &Message, index: usize) -> Option<String> {
    msg.param(index).map(str::to_owned)
}

fn required(msg: &Message, index: usize) -> Option<String> {
    match msg.param(index) {
        Some(value) => Some(value.to_owned()),
        None => {
            warn!(command = %msg.command, index, "missing parameter");
            None
        }
    }
}

fn sender(msg: &Message) -> Source {
    Source::from_prefix(msg.prefix.as_deref().unwrap_or_default())
}

/// The sending nick, for commands that only make sense from a user.
fn user_nick(msg: &Message) -> Option<String> {
    match msg.source_nick() {
        Some(nick) => Some(nick.to_owned()),
        None => {
            warn!(
                command = %msg.command,
                prefix = msg.prefix.as_deref().unwrap_or_default(),
                "prefix does not identify a user"
            );
            None
        }
    }
}

fn luser(msg: &Message, keys: &[&'static str]) -> Option<Event> {
    let stats: Vec<_> = keys
        .iter()
        .enumerate()
        .filter_map(|(i, key)| msg.param(i + 1)?.parse().ok().map(|v| (*key, v)))
        .collect();
    if stats.is_empty() {
        return None;
    }
    Some(Event::Luser(stats))
}

fn who_reply(msg: &Message) -> Option<WhoReply> {
    let trailing = required(msg, 7)?;
    // "<hopcount> <realname>"
    let realname = trailing
        .split_once(char::is_whitespace)
        .map(|(_, rest)| rest.trim_start())
        .unwrap_or_default();
    Some(WhoReply {
        channel: required(msg, 1)?,
        user: GlobalUser {
            nick: required(msg, 5)?,
            username: required(msg, 2)?,
            host: required(msg, 3)?,
            server: required(msg, 4)?,
            realname: realname.to_owned(),
        },
    })
}

fn unhandled(msg: &Message) -> Option<Event> {
    Some(Event::Unhandled {
        command: msg.command.clone(),
    })
}

fn malformed(msg: &Message) -> Option<Event> {
    warn!(command = %msg.command, params = ?msg.params, "malformed message");
    None
}
