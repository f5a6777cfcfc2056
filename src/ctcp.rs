//! CTCP (Client-to-Client Protocol) handling.
//!
//! CTCP requests travel inside a PRIVMSG body wrapped in `\x01` delimiters.
//! This module splits such a body into a command and optional parameters and
//! answers the small set of queries the client supports.
//!
//! # Reference
//! - CTCP specification: <https://modern.ircdocs.horse/ctcp.html>
//!
//! # Example
//!
//! ```
//! use slirc_session::ctcp::Ctcp;
//!
//! let ctcp = Ctcp::parse("\x01PING 1234\x01").unwrap();
//! assert_eq!(ctcp.command, "PING");
//! assert_eq!(ctcp.params, Some("1234"));
//! ```

use chrono::Utc;

/// The CTCP delimiter character (`\x01`).
pub const CTCP_DELIM: char = '\x01';

/// Identity advertised in VERSION replies.
pub const CLIENT_VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

/// Source location advertised in SOURCE replies.
pub const CLIENT_SOURCE: &str = env!("CARGO_PKG_REPOSITORY");

/// A parsed CTCP request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ctcp<'a> {
    /// First whitespace-delimited token.
    pub command: &'a str,
    /// Everything after the first space, if non-empty.
    pub params: Option<&'a str>,
}

impl<'a> Ctcp<'a> {
    /// Parse a message body as CTCP.
    ///
    /// The body must both start and end with the delimiter and carry a
    /// non-empty command.
    pub fn parse(text: &'a str) -> Option<Self> {
        let inner = text.strip_prefix(CTCP_DELIM)?.strip_suffix(CTCP_DELIM)?;

        let (command, params) = match inner.split_once(' ') {
            Some((command, params)) => (command, Some(params).filter(|p| !p.is_empty())),
            None => (inner, None),
        };

        if command.is_empty() || command.contains(char::is_whitespace) {
            return None;
        }

        Some(Ctcp { command, params })
    }

    /// Check whether a message body is a CTCP request.
    #[inline]
    pub fn is_ctcp(text: &str) -> bool {
        Ctcp::parse(text).is_some()
    }
}

type Responder = fn(Option<&str>) -> String;

/// Queries this client answers, in the order CLIENTINFO lists them.
const RESPONDERS: &[(&str, Responder)] = &[
    ("CLIENTINFO", clientinfo),
    ("PING", ping),
    ("SOURCE", source),
    ("TIME", time),
    ("VERSION", version),
];

fn clientinfo(_: Option<&str>) -> String {
    let names: Vec<&str> = RESPONDERS.iter().map(|(name, _)| *name).collect();
    format!("CLIENTINFO {}", names.join(" "))
}

fn ping(id: Option<&str>) -> String {
    match id {
        Some(id) => format!("PING {}", id),
        None => "PING".to_owned(),
    }
}

fn source(_: Option<&str>) -> String {
    format!("SOURCE {}", CLIENT_SOURCE)
}

fn time(_: Option<&str>) -> String {
    format!("TIME {}", Utc::now().to_rfc2822())
}

fn version(_: Option<&str>) -> String {
    format!("VERSION {}", CLIENT_VERSION)
}

/// Reply payload for a query, without delimiters.
///
/// Query names match exactly. Returns `None` for queries the client does
/// not answer.
pub fn reply_payload(command: &str, params: Option<&str>) -> Option<String> {
    RESPONDERS
        .iter()
        .find(|(name, _)| *name == command)
        .map(|(_, respond)| respond(params))
}

/// Build the `NOTICE` line answering a query from `sender`.
pub fn respond(sender: &str, command: &str, params: Option<&str>) -> Option<String> {
    let payload = reply_payload(command, params)?;
    Some(format!(
        "NOTICE {} :{}{}{}",
        sender, CTCP_DELIM, payload, CTCP_DELIM
    ))
}
