//! State transition handlers for the registration phases.

use tracing::{debug, warn};

use crate::caps::{self, CapSubCommand};
use crate::error::RegistrationError;
use crate::event::Event;
use crate::sasl;

use super::tracker::{send, RegistrationMachine};
use super::{RegistrationAction, RegistrationState};

impl RegistrationMachine {
    pub(super) fn handle_cap_negotiation(&mut self, event: &Event) -> Vec<RegistrationAction> {
        let Event::Cap(reply) = event else {
            return self.handle_registration(event);
        };

        let mut actions = Vec::new();
        match reply.subcommand {
            CapSubCommand::LS => {
                self.available_caps
                    .extend(reply.capabilities.iter().cloned());
                if reply.more {
                    return actions;
                }

                let to_request = caps::intersection(&self.request_caps, &self.available_caps);
                if to_request.is_empty() {
                    actions.extend(self.finish_cap_negotiation());
                } else {
                    actions.push(send(format!("CAP REQ :{}", to_request.join(" "))));
                }
            }
            CapSubCommand::ACK => {
                self.enabled_caps
                    .extend(reply.capabilities.iter().cloned());

                let mechanism = self
                    .sasl
                    .as_ref()
                    .filter(|_| self.enabled_caps.contains("sasl"))
                    .map(|sasl| sasl.mechanism.to_string());

                match mechanism {
                    Some(mechanism) => {
                        self.transition(RegistrationState::Authenticating);
                        actions.push(send(format!("AUTHENTICATE {}", mechanism)));
                    }
                    None => actions.extend(self.finish_cap_negotiation()),
                }
            }
            CapSubCommand::NAK => {
                warn!(caps = ?reply.capabilities, "capabilities rejected");
                actions.push(RegistrationAction::Error(
                    RegistrationError::CapabilityRejected(reply.capabilities.clone()),
                ));
                actions.extend(self.finish_cap_negotiation());
            }
            other => debug!(subcommand = %other, "ignoring CAP reply during negotiation"),
        }
        actions
    }

    pub(super) fn handle_authentication(&mut self, event: &Event) -> Vec<RegistrationAction> {
        match event {
            Event::Authenticate { message } if message == "+" => {
                let Some(creds) = &self.sasl else {
                    return self.finish_cap_negotiation();
                };
                let payload =
                    sasl::encode_plain_with_authzid(&creds.account, &creds.account, &creds.password);
                sasl::chunk_response(&payload)
                    .into_iter()
                    .map(|chunk| send(format!("AUTHENTICATE {}", chunk)))
                    .collect()
            }
            Event::Authenticate { message } => {
                debug!(message = %message, "unexpected AUTHENTICATE challenge");
                Vec::new()
            }
            Event::SaslSuccess => self.finish_cap_negotiation(),
            Event::SaslFailure { code, reason } => {
                warn!(code = %code, reason = %reason, "SASL authentication failed");
                let mut actions = vec![RegistrationAction::Error(RegistrationError::SaslFailed(
                    reason.clone(),
                ))];
                // Registration can still complete without an account.
                actions.extend(self.finish_cap_negotiation());
                actions
            }
            _ => self.handle_registration(event),
        }
    }

    pub(super) fn handle_registration(&mut self, event: &Event) -> Vec<RegistrationAction> {
        match event {
            Event::Welcome { nick, .. } => {
                self.nick = nick.clone();
                self.transition(RegistrationState::Registered);
                vec![RegistrationAction::Registered]
            }
            Event::NickInUse { nick } => {
                let nick = if nick.is_empty() { &self.nick } else { nick };
                warn!(nick = %nick, "nickname rejected");
                vec![RegistrationAction::Error(RegistrationError::NicknameInUse(
                    nick.clone(),
                ))]
            }
            _ => Vec::new(),
        }
    }

    pub(super) fn finish_cap_negotiation(&mut self) -> Vec<RegistrationAction> {
        self.transition(RegistrationState::Registering);
        vec![send("CAP END".to_owned())]
    }
}
