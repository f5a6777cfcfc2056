//! # slirc-session
//!
//! An IRC client session runtime: it turns the line-oriented IRC protocol
//! into typed events, drives connection registration, and keeps a session
//! store in sync with what the server reports.
//!
//! ## Features
//!
//! - Line parsing and numeric-to-name command normalization
//! - Typed events with MOTD, WHO and NAMES bursts aggregated into one event
//! - Sans-IO registration state machine (CAP, SASL PLAIN, NICK/USER, PING)
//! - Session store with channels, topics, memberships and server metadata
//! - CTCP responder for CLIENTINFO, PING, SOURCE, TIME and VERSION
//! - Action encoder for JOIN, PART, KICK, TOPIC, PRIVMSG, NOTICE and friends
//! - Optional Tokio driver that owns a session and talks to it via a handle

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ### Driving a session by hand
//!
//! ```rust
//! use slirc_session::{ConfigBuilder, Session};
//!
//! let config = ConfigBuilder::new("bob").build().unwrap();
//! let mut session = Session::new(config);
//! session.start();
//!
//! for line in [
//!     ":server 001 bob :Welcome",
//!     ":bob!u@h JOIN #chan",
//!     ":server 353 bob = #chan :@bob carol",
//!     ":server 366 bob #chan :End of /NAMES list",
//! ] {
//!     session.handle_line(line).unwrap();
//! }
//!
//! let channel = session.store().channel("#chan").unwrap();
//! assert_eq!(channel.members.len(), 2);
//!
//! // Lines to write to the server, in order.
//! let outbound = session.take_outbound();
//! assert_eq!(outbound[0], "CAP LS");
//! ```
//!
//! ### Subscribing to events
//!
//! ```rust
//! use slirc_session::{ConfigBuilder, Event, EventKind, Session};
//!
//! let mut session = Session::new(ConfigBuilder::new("bob").build().unwrap());
//! session.subscribe(EventKind::Privmsg, |event| {
//!     if let Event::Privmsg { sender, text, .. } = event {
//!         println!("<{}> {}", sender, text);
//!     }
//! });
//! session.handle_line(":alice!a@h PRIVMSG #chan :hi").unwrap();
//! ```

pub mod action;
pub mod burst;
pub mod caps;
pub mod casemap;
pub mod config;
#[cfg(feature = "tokio")]
pub mod connection;
pub mod ctcp;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod isupport;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
pub mod prefix;
pub mod response;
pub mod router;
pub mod sasl;
pub mod session;
pub mod state;
pub mod store;

pub use self::action::{Action, JoinTarget, Privilege};
pub use self::caps::{CapReply, CapSubCommand};
pub use self::config::{Config, ConfigBuilder};
#[cfg(feature = "tokio")]
pub use self::connection::Handle;
pub use self::error::{ConfigError, MessageParseError, ProtocolError, RegistrationError, StoreError};
#[cfg(feature = "tokio")]
pub use self::error::ConnectionError;
pub use self::event::{Event, EventKind};
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
pub use self::message::Message;
pub use self::prefix::Source;
pub use self::response::Response;
pub use self::router::Router;
pub use self::session::Session;
pub use self::state::{RegistrationAction, RegistrationMachine, RegistrationState};
pub use self::store::Store;
