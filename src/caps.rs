//! IRCv3 capability negotiation support.
//!
//! This module parses `CAP` replies and computes which of the locally
//! desired capabilities can be requested from the server.
//!
//! # Reference
//! - IRCv3 Capability Negotiation: <https://ircv3.net/specs/extensions/capability-negotiation>

use std::collections::HashSet;
use std::fmt;

/// `CAP` subcommands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum CapSubCommand {
    /// List available capabilities.
    LS,
    /// List enabled capabilities.
    LIST,
    /// Request capabilities.
    REQ,
    /// Server acknowledged a request.
    ACK,
    /// Server rejected a request.
    NAK,
    /// End negotiation.
    END,
    /// Server advertises new capabilities (cap-notify).
    NEW,
    /// Server withdraws capabilities (cap-notify).
    DEL,
}

impl CapSubCommand {
    /// Parse a subcommand, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "LS" => Some(Self::LS),
            "LIST" => Some(Self::LIST),
            "REQ" => Some(Self::REQ),
            "ACK" => Some(Self::ACK),
            "NAK" => Some(Self::NAK),
            "END" => Some(Self::END),
            "NEW" => Some(Self::NEW),
            "DEL" => Some(Self::DEL),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LS => "LS",
            Self::LIST => "LIST",
            Self::REQ => "REQ",
            Self::ACK => "ACK",
            Self::NAK => "NAK",
            Self::END => "END",
            Self::NEW => "NEW",
            Self::DEL => "DEL",
        }
    }
}

impl fmt::Display for CapSubCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A server `CAP` reply: `CAP <target> <subcommand> [*] :<capabilities>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapReply {
    pub subcommand: CapSubCommand,
    /// Set when the server marked this line with `*`: more lines follow.
    pub more: bool,
    /// Capability names, with `=value` suffixes and ACK modifiers removed.
    pub capabilities: Vec<String>,
}

impl CapReply {
    /// Parse the parameters of a server `CAP` message.
    pub fn from_params<S: AsRef<str>>(params: &[S]) -> Option<Self> {
        let subcommand = CapSubCommand::parse(params.get(1)?.as_ref())?;
        let (more, list) = match (params.get(2).map(AsRef::as_ref), params.get(3)) {
            (Some("*"), Some(list)) => (true, list.as_ref()),
            (Some(list), _) => (false, list),
            (None, _) => (false, ""),
        };

        Some(CapReply {
            subcommand,
            more,
            capabilities: parse_cap_list(list),
        })
    }
}

/// Split a capability list into names.
///
/// `sasl=PLAIN,EXTERNAL` yields `sasl`; the `-`, `~` and `=` modifiers some
/// servers put in front of ACKed names are stripped, with `-name` dropped
/// entirely since it disables the capability.
pub fn parse_cap_list(list: &str) -> Vec<String> {
    list.split_whitespace()
        .filter(|cap| !cap.starts_with('-'))
        .map(|cap| cap.trim_start_matches(['~', '=']))
        .map(|cap| cap.split('=').next().unwrap_or(cap))
        .filter(|cap| !cap.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Capabilities in `desired` that the server offers, in `desired` order.
pub fn intersection<S: AsRef<str>>(desired: &[S], offered: &HashSet<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    desired
        .iter()
        .map(AsRef::as_ref)
        .filter(|cap| offered.contains(*cap))
        .filter(|cap| seen.insert(*cap))
        .map(str::to_owned)
        .collect()
}
