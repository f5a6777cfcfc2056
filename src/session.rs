//! The sans-IO session: one ordered pipeline from inbound lines to state,
//! events and outbound commands.
//!
//! A [`Session`] owns the router, the registration machine and the store.
//! Each inbound line is parsed, normalized, routed and applied before the
//! next one is looked at, so readers of [`Session::store`] never see a
//! half-applied event. Every outbound line, whether produced by the
//! registration machine, the CTCP responder or a caller action, goes onto a
//! single queue in the order it was produced.
//!
//! # Example
//!
//! ```
//! use slirc_session::config::ConfigBuilder;
//! use slirc_session::Session;
//!
//! let config = ConfigBuilder::new("bob").build().unwrap();
//! let mut session = Session::new(config);
//! session.start();
//! assert_eq!(session.take_outbound()[0], "CAP LS");
//!
//! session.handle_line(":server 001 bob :Welcome").unwrap();
//! session.handle_line(":bob!u@h JOIN #chan").unwrap();
//! assert!(session.store().channel("#chan").is_some());
//! ```

use std::collections::VecDeque;

use tracing::{debug, error, trace, warn};

use crate::action::Action;
use crate::config::Config;
use crate::ctcp;
use crate::dispatch::Dispatcher;
use crate::error::{MessageParseError, RegistrationError};
use crate::event::{Event, EventKind};
use crate::message::Message;
use crate::router::Router;
use crate::state::{RegistrationAction, RegistrationMachine, RegistrationState};
use crate::store::{ConnectionInfo, Store};

/// Single-owner client session.
#[derive(Debug)]
pub struct Session {
    config: Config,
    router: Router,
    machine: RegistrationMachine,
    store: Store,
    dispatcher: Dispatcher,
    outbound: VecDeque<String>,
    /// Actions held until RPL_WELCOME.
    deferred: Vec<Action>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        let machine = RegistrationMachine::new(&config);
        Session {
            config,
            router: Router::new(),
            machine,
            store: Store::new(),
            dispatcher: Dispatcher::new(),
            outbound: VecDeque::new(),
            deferred: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn state(&self) -> RegistrationState {
        self.machine.state()
    }

    pub fn is_registered(&self) -> bool {
        self.machine.is_registered()
    }

    /// Record transport facts in the store.
    pub fn set_connection_info(&mut self, info: ConnectionInfo) {
        self.store.set_connection(info);
    }

    /// Queue the opening registration lines.
    pub fn start(&mut self) {
        let actions = self.machine.start();
        self.perform(actions);
    }

    /// Start over for a new connection.
    ///
    /// The store, router and registration machine are replaced and pending
    /// output is discarded. Subscriptions and deferred actions are kept.
    pub fn reset(&mut self) {
        debug!("session reset");
        self.router = Router::new();
        self.machine = RegistrationMachine::new(&self.config);
        self.store = Store::new();
        self.outbound.clear();
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F)
    where
        F: FnMut(&Event) + Send + 'static,
    {
        self.dispatcher.subscribe(kind, handler);
    }

    /// Process one inbound line.
    ///
    /// A line that does not parse is dropped; the error is returned for the
    /// caller's information and the session is unaffected.
    pub fn handle_line(&mut self, line: &str) -> Result<(), MessageParseError> {
        trace!("S: {}", line);
        match Message::parse(line) {
            Ok(msg) => {
                self.handle_message(msg);
                Ok(())
            }
            Err(e) => {
                warn!(line = %line, error = %e, "dropping malformed line");
                Err(e)
            }
        }
    }

    /// Process one parsed message.
    pub fn handle_message(&mut self, msg: Message) {
        let msg = msg.normalized();
        let Some(event) = self.router.route(&msg) else {
            return;
        };

        if let Event::Unhandled { command } = &event {
            warn!("{} not implemented", command);
        }

        self.store.apply(&event);

        let actions = self.machine.feed(&event);
        self.perform(actions);

        if let Event::Ctcp {
            sender,
            target,
            command,
            params,
        } = &event
        {
            if self.store.is_own_nick(target) {
                match ctcp::respond(sender.name(), command, params.as_deref()) {
                    Some(reply) => self.push(reply),
                    None => warn!(command = %command, sender = %sender, "unsupported CTCP request"),
                }
            }
        }

        self.dispatcher.dispatch(&event);
    }

    /// Encode and queue an action.
    ///
    /// Returns `false` if the action was invalid and nothing was queued.
    pub fn submit(&mut self, action: Action) -> bool {
        match action.encode() {
            Some(lines) => {
                for line in lines {
                    self.push(line);
                }
                true
            }
            None => {
                warn!(action = %action, "invalid action dropped");
                false
            }
        }
    }

    /// Queue an action now if registered, otherwise at RPL_WELCOME.
    pub fn submit_after_registration(&mut self, action: Action) {
        if self.is_registered() {
            self.submit(action);
        } else {
            self.deferred.push(action);
        }
    }

    /// Queue a pre-formatted line.
    ///
    /// Returns `false` and queues nothing if the line is empty or contains
    /// CR, LF or NUL.
    pub fn send_raw(&mut self, line: impl Into<String>) -> bool {
        let line = line.into();
        if line.is_empty() || line.contains(['\r', '\n', '\0']) {
            warn!(line = ?line, "raw line dropped");
            return false;
        }
        self.push(line);
        true
    }

    /// Drain the outbound queue, in submission order.
    pub fn take_outbound(&mut self) -> Vec<String> {
        self.outbound.drain(..).collect()
    }

    pub fn has_outbound(&self) -> bool {
        !self.outbound.is_empty()
    }

    fn push(&mut self, line: String) {
        trace!("C: {}", line);
        self.outbound.push_back(line);
    }

    fn perform(&mut self, actions: Vec<RegistrationAction>) {
        for action in actions {
            match action {
                RegistrationAction::Send(line) => self.push(line),
                RegistrationAction::Registered => self.on_registered(),
                RegistrationAction::Error(RegistrationError::ServerError(reason)) => {
                    error!(reason = %reason, "server closed the connection");
                }
                RegistrationAction::Error(e) => warn!(error = %e, "registration problem"),
            }
        }
    }

    fn on_registered(&mut self) {
        debug!(nick = %self.store.own_nick, "registered");
        if !self.config.auto_join.is_empty() {
            self.submit(Action::Join(self.config.auto_join.clone()));
        }
        for action in std::mem::take(&mut self.deferred) {
            self.submit(action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use std::sync::{Arc, Mutex};

    fn session(builder: ConfigBuilder) -> Session {
        Session::new(builder.build().unwrap())
    }

    #[test]
    fn test_malformed_line_is_isolated() {
        let mut s = session(ConfigBuilder::new("bob"));
        assert!(s.handle_line("").is_err());
        assert!(s.handle_line(":onlyprefix").is_err());
        s.handle_line(":server 001 bob :Welcome").unwrap();
        assert_eq!(s.store().own_nick, "bob");
    }

    #[test]
    fn test_auto_join_and_deferred_after_welcome() {
        let mut s = session(ConfigBuilder::new("bob").auto_join("#a"));
        s.start();
        s.submit_after_registration(Action::privmsg("#a", "hello"));
        let opening = s.take_outbound();
        assert!(!opening.iter().any(|l| l.starts_with("JOIN")));

        s.handle_line(":server 001 bob :Welcome").unwrap();
        assert_eq!(s.take_outbound(), vec!["JOIN #a 0", "PRIVMSG #a :hello"]);

        s.submit_after_registration(Action::privmsg("#a", "again"));
        assert_eq!(s.take_outbound(), vec!["PRIVMSG #a :again"]);
    }

    #[test]
    fn test_ctcp_version_reply() {
        let mut s = session(ConfigBuilder::new("bob"));
        s.handle_line(":server 001 bob :Welcome").unwrap();
        s.handle_line(":alice!a@h PRIVMSG bob :\x01VERSION\x01").unwrap();
        let out = s.take_outbound();
        assert_eq!(out.len(), 1);
        assert!(out[0].starts_with("NOTICE alice :\x01VERSION "));
        assert!(out[0].contains(ctcp::CLIENT_VERSION));
    }

    #[test]
    fn test_ctcp_to_channel_not_answered() {
        let mut s = session(ConfigBuilder::new("bob"));
        s.handle_line(":server 001 bob :Welcome").unwrap();
        s.handle_line(":alice!a@h PRIVMSG #chan :\x01VERSION\x01").unwrap();
        s.handle_line(":alice!a@h PRIVMSG bob :\x01FINGER\x01").unwrap();
        assert!(!s.has_outbound());
    }

    #[test]
    fn test_invalid_action_dropped() {
        let mut s = session(ConfigBuilder::new("bob"));
        assert!(!s.submit(Action::Join(vec![])));
        assert!(s.submit(Action::nick("robert")));
        assert!(s.send_raw("WHO #a"));
        assert_eq!(s.take_outbound(), vec!["NICK robert", "WHO #a"]);
    }

    #[test]
    fn test_line_breaks_never_reach_the_queue() {
        let mut s = session(ConfigBuilder::new("bob"));
        let topic = Action::Topic {
            channel: "#a".into(),
            text: Some("hi\r\nQUIT :pwned".into()),
        };
        assert!(!s.submit(topic));
        assert!(!s.send_raw("WHO #a\r\nQUIT"));
        assert!(!s.send_raw(""));
        assert!(s.submit(Action::privmsg("#a", "still here")));
        assert_eq!(s.take_outbound(), vec!["PRIVMSG #a :still here"]);
    }

    #[test]
    fn test_subscribers_see_events_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut s = session(ConfigBuilder::new("bob"));
        let log = Arc::clone(&seen);
        s.subscribe(EventKind::Privmsg, move |e| {
            if let Event::Privmsg { text, .. } = e {
                log.lock().unwrap().push(text.clone());
            }
        });
        s.handle_line(":alice!a@h PRIVMSG #a :one").unwrap();
        s.handle_line(":alice!a@h NOTICE #a :skip").unwrap();
        s.handle_line(":alice!a@h PRIVMSG #a :two").unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn test_reset_gives_fresh_store() {
        let mut s = session(ConfigBuilder::new("bob"));
        s.handle_line(":server 001 bob :Welcome").unwrap();
        s.handle_line(":bob!u@h JOIN #a").unwrap();
        s.reset();
        assert!(s.store().channels.is_empty());
        assert_eq!(s.state(), RegistrationState::Connected);
    }
}
