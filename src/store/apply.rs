//! Store synchronization from routed events.

use tracing::debug;

use crate::event::Event;

use super::{Member, Store, TopicPatch};

impl Store {
    /// Apply the state effect of one event.
    ///
    /// Events without a state effect are ignored. A NICK change of this
    /// client's own nick updates `own_nick` only; it is never also treated
    /// as a rename of some other member.
    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::Welcome { nick, .. } => self.set_own_nick(nick.clone()),
            Event::Join { nick, channel } => {
                if self.is_own_nick(nick) {
                    self.add_channel(channel);
                } else {
                    self.add_member(channel, Member::new(nick.clone()));
                }
            }
            Event::Part { nick, channel, .. } => self.leave(nick, channel),
            Event::Kick { who, channel, .. } => self.leave(who, channel),
            Event::Quit { nick, .. } => {
                if !self.is_own_nick(nick) {
                    self.forget_nick(nick);
                }
            }
            Event::Nick { old_nick, new_nick } => {
                if self.is_own_nick(old_nick) {
                    self.set_own_nick(new_nick.clone());
                } else {
                    self.rename_member(old_nick, new_nick);
                }
            }
            Event::Topic {
                channel,
                text,
                who,
                time,
            } => {
                self.patch_topic(
                    channel,
                    TopicPatch {
                        text: Some(text.clone()),
                        set_by: Some(who.clone()),
                        set_on: Some(*time),
                    },
                );
            }
            Event::TopicText { channel, text } => {
                self.patch_topic(
                    channel,
                    TopicPatch {
                        text: Some(text.clone()),
                        ..Default::default()
                    },
                );
            }
            Event::TopicWhoTime { channel, who, time } => {
                self.patch_topic(
                    channel,
                    TopicPatch {
                        set_by: Some(who.clone()),
                        set_on: *time,
                        ..Default::default()
                    },
                );
            }
            Event::Names { channel, users } => {
                if !self.set_members(channel, users.clone()) {
                    debug!(channel = %channel, "NAMES for a channel we are not in");
                }
            }
            Event::Who { users, .. } => self.upsert_users(users.iter().cloned()),
            Event::Motd { text } => self.set_motd(text.clone()),
            Event::Isupport(features) => self.merge_support(features.iter().cloned()),
            Event::Luser(stats) => self.merge_stats(stats.iter().copied()),
            _ => {}
        }
    }

    fn leave(&mut self, nick: &str, channel: &str) {
        if self.is_own_nick(nick) {
            self.remove_channel(channel);
        } else {
            self.remove_member(channel, nick);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn join(nick: &str, channel: &str) -> Event {
        Event::Join {
            nick: nick.into(),
            channel: channel.into(),
        }
    }

    fn part(nick: &str, channel: &str) -> Event {
        Event::Part {
            nick: nick.into(),
            channel: channel.into(),
            reason: None,
        }
    }

    fn registered(nick: &str) -> Store {
        let mut store = Store::new();
        store.apply(&Event::Welcome {
            nick: nick.into(),
            text: "Welcome".into(),
        });
        store
    }

    #[test]
    fn test_own_join_part() {
        let mut store = registered("bob");
        store.apply(&join("bob", "#y"));
        store.apply(&join("bob", "#y"));
        assert_eq!(store.channels.len(), 1);
        assert!(store.channels[0].members.is_empty());

        store.apply(&part("bob", "#y"));
        assert!(store.channels.is_empty());
    }

    #[test]
    fn test_other_part_keeps_channel() {
        let mut store = registered("bob");
        store.apply(&join("bob", "#y"));
        store.apply(&join("carol", "#y"));
        assert!(store.has_member("#y", "carol"));

        store.apply(&part("carol", "#y"));
        assert!(store.channel("#y").is_some());
        assert!(!store.has_member("#y", "carol"));
    }

    #[test]
    fn test_own_kick_removes_channel() {
        let mut store = registered("bob");
        store.apply(&join("bob", "#y"));
        store.apply(&Event::Kick {
            who: "bob".into(),
            by: "op".into(),
            channel: "#y".into(),
            reason: Some("bye".into()),
        });
        assert!(store.channel("#y").is_none());
    }

    #[test]
    fn test_own_nick_change_precedence() {
        let mut store = registered("alice");
        store.apply(&join("alice", "#x"));
        store.add_member("#x", Member::new("alice"));

        store.apply(&Event::Nick {
            old_nick: "alice".into(),
            new_nick: "bob".into(),
        });
        assert_eq!(store.own_nick, "bob");
        assert!(store.has_member("#x", "alice"));
        assert!(!store.has_member("#x", "bob"));
    }

    #[test]
    fn test_other_nick_change_renames() {
        let mut store = registered("bob");
        store.apply(&join("bob", "#x"));
        store.apply(&join("carol", "#x"));
        store.apply(&Event::Nick {
            old_nick: "carol".into(),
            new_nick: "caz".into(),
        });
        assert!(store.has_member("#x", "caz"));
        assert_eq!(store.own_nick, "bob");
    }

    #[test]
    fn test_quit_removes_everywhere() {
        let mut store = registered("bob");
        store.apply(&join("bob", "#a"));
        store.apply(&join("bob", "#b"));
        store.apply(&join("carol", "#a"));
        store.apply(&join("carol", "#b"));
        store.apply(&Event::Quit {
            nick: "carol".into(),
            reason: None,
        });
        assert!(!store.has_member("#a", "carol"));
        assert!(!store.has_member("#b", "carol"));
    }

    #[test]
    fn test_topic_patches_do_not_erase() {
        let mut store = registered("bob");
        store.apply(&join("bob", "#t"));
        let when = Utc.timestamp_opt(1_700_000_000, 0).single().unwrap();

        store.apply(&Event::TopicWhoTime {
            channel: "#t".into(),
            who: "alice".into(),
            time: Some(when),
        });
        store.apply(&Event::TopicText {
            channel: "#t".into(),
            text: "Welcome".into(),
        });

        let topic = &store.channel("#t").unwrap().topic;
        assert_eq!(topic.text.as_deref(), Some("Welcome"));
        assert_eq!(topic.set_by.as_deref(), Some("alice"));
        assert_eq!(topic.set_on, Some(when));
    }

    #[test]
    fn test_names_replaces_members() {
        let mut store = registered("bob");
        store.apply(&join("bob", "#c"));
        store.apply(&join("dave", "#c"));
        store.apply(&Event::Names {
            channel: "#c".into(),
            users: vec![Member::new("bob"), Member::new("carol")],
        });
        let members = &store.channel("#c").unwrap().members;
        let nicks: Vec<_> = members.iter().map(|m| m.nick.as_str()).collect();
        assert_eq!(nicks, vec!["bob", "carol"]);
    }
}
