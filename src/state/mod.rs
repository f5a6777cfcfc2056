//! Sans-IO registration state machine.
//!
//! [`RegistrationMachine`] drives the CAP, AUTHENTICATE, NICK/USER and
//! welcome flow. It performs no I/O: it consumes routed [`Event`]s and
//! returns [`RegistrationAction`]s for the caller to carry out.
//!
//! # Example
//!
//! ```
//! use slirc_session::config::ConfigBuilder;
//! use slirc_session::event::Event;
//! use slirc_session::state::{RegistrationAction, RegistrationMachine, RegistrationState};
//!
//! let config = ConfigBuilder::new("bob").build().unwrap();
//! let mut machine = RegistrationMachine::new(&config);
//!
//! // PASS (if configured), CAP LS, NICK, USER
//! let actions = machine.start();
//! assert_eq!(actions.len(), 3);
//!
//! let actions = machine.feed(&Event::Welcome {
//!     nick: "bob".into(),
//!     text: "Welcome".into(),
//! });
//! assert!(actions.contains(&RegistrationAction::Registered));
//! assert_eq!(machine.state(), RegistrationState::Registered);
//! ```
//!
//! [`Event`]: crate::event::Event

mod sync;
mod tracker;

pub use tracker::RegistrationMachine;

use std::fmt;

use serde::Serialize;

use crate::error::RegistrationError;

/// Where the connection is in the registration flow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum RegistrationState {
    /// Transport is up, nothing sent yet.
    #[default]
    Connected,
    /// Sent CAP LS, negotiating capabilities.
    CapNegotiating,
    /// SASL exchange in progress.
    Authenticating,
    /// Sent CAP END, awaiting RPL_WELCOME.
    Registering,
    /// Received RPL_WELCOME.
    Registered,
    /// Server sent ERROR.
    Terminated,
}

impl fmt::Display for RegistrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Output of the registration machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistrationAction {
    /// Send this line to the server.
    Send(String),
    /// Registration completed; queued post-registration work may run.
    Registered,
    /// Something went wrong. Only [`RegistrationError::ServerError`] ends
    /// the connection.
    Error(RegistrationError),
}
