//! Registration state machine core.

use std::collections::HashSet;

use tracing::debug;

use crate::config::{Config, SaslConfig};
use crate::error::RegistrationError;
use crate::event::Event;
use crate::message::Message;

use super::{RegistrationAction, RegistrationState};

/// Sans-IO state machine for connection registration.
#[derive(Clone, Debug)]
pub struct RegistrationMachine {
    pub(super) password: Option<String>,
    pub(super) nick: String,
    pub(super) username: String,
    pub(super) realname: String,
    pub(super) request_caps: Vec<String>,
    pub(super) sasl: Option<SaslConfig>,
    pub(super) state: RegistrationState,
    /// Capabilities acknowledged by the server.
    pub(super) enabled_caps: HashSet<String>,
    /// Capabilities the server advertised, across all CAP LS lines.
    pub(super) available_caps: HashSet<String>,
}

impl RegistrationMachine {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            password: config.password.clone(),
            nick: config.nick.clone(),
            username: config.username.clone(),
            realname: config.realname.clone(),
            request_caps: config.capabilities.clone(),
            sasl: config.sasl.clone(),
            state: RegistrationState::Connected,
            enabled_caps: HashSet::new(),
            available_caps: HashSet::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> RegistrationState {
        self.state
    }

    #[must_use]
    pub fn enabled_caps(&self) -> &HashSet<String> {
        &self.enabled_caps
    }

    #[must_use]
    pub fn available_caps(&self) -> &HashSet<String> {
        &self.available_caps
    }

    pub fn is_registered(&self) -> bool {
        self.state == RegistrationState::Registered
    }

    pub(super) fn transition(&mut self, next: RegistrationState) {
        if self.state != next {
            debug!(from = %self.state, to = %next, "registration state");
            self.state = next;
        }
    }

    /// Begin registration. Returns the opening lines, once.
    #[must_use]
    pub fn start(&mut self) -> Vec<RegistrationAction> {
        if self.state != RegistrationState::Connected {
            return Vec::new();
        }
        self.transition(RegistrationState::CapNegotiating);

        let mut actions = Vec::new();
        if let Some(pass) = &self.password {
            actions.push(send(Message::new("PASS", vec![pass.clone()]).to_string()));
        }
        actions.push(send("CAP LS".to_owned()));
        actions.push(send(format!("NICK {}", self.nick)));
        actions.push(send(format!(
            "USER {} 8 * :{}",
            self.username, self.realname
        )));
        actions
    }

    /// Feed one routed event.
    #[must_use]
    pub fn feed(&mut self, event: &Event) -> Vec<RegistrationAction> {
        match event {
            Event::Ping { token } => {
                vec![send(Message::new("PONG", vec![token.clone()]).to_string())]
            }
            Event::Error { reason } => {
                self.transition(RegistrationState::Terminated);
                vec![RegistrationAction::Error(RegistrationError::ServerError(
                    reason.clone(),
                ))]
            }
            _ => match self.state {
                RegistrationState::Connected
                | RegistrationState::Registered
                | RegistrationState::Terminated => Vec::new(),
                RegistrationState::CapNegotiating => self.handle_cap_negotiation(event),
                RegistrationState::Authenticating => self.handle_authentication(event),
                RegistrationState::Registering => self.handle_registration(event),
            },
        }
    }
}

pub(super) fn send(line: String) -> RegistrationAction {
    RegistrationAction::Send(line)
}
