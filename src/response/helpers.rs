//! Helper methods and trait implementations for IRC response codes.
//!
//! This module provides utility methods for the Response enum including:
//! - Code conversion (code)
//! - Type checking (is_error, is_sasl, etc.)
//! - Command normalization (numeric to reply name)
//! - Display/parsing traits

use std::borrow::Cow;
use std::str::FromStr;

use super::Response;

impl Response {
    /// Returns the numeric code as u16
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is an error response (4xx, 5xx, or SASL failures)
    #[inline]
    pub fn is_error(&self) -> bool {
        let code = self.code();
        (400..600).contains(&code) || code == 902 || (904..=907).contains(&code)
    }

    /// Check if this is a connection registration response (001-099)
    #[inline]
    pub fn is_registration(&self) -> bool {
        self.code() < 100
    }

    /// Check if this is a SASL-related response (900-908)
    #[inline]
    pub fn is_sasl(&self) -> bool {
        (900..=908).contains(&self.code())
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Response {
    type Err = String;

    /// Accepts either a numeric (`"001"`) or a reply name (`"RPL_WELCOME"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_numeric(s)
            .and_then(Response::from_code)
            .or_else(|| Response::from_name(s))
            .ok_or_else(|| format!("unknown response: {}", s))
    }
}

fn parse_numeric(command: &str) -> Option<u16> {
    if command.is_empty() || !command.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    command.parse().ok()
}

/// Reply name for a numeric command, if the numeric is in the table.
pub fn reply_name(command: &str) -> Option<&'static str> {
    parse_numeric(command)
        .and_then(Response::from_code)
        .map(|r| r.name())
}

/// Rewrite a numeric command into its canonical reply name.
///
/// Named commands and numerics missing from the table are returned as-is,
/// so `normalize(normalize(c)) == normalize(c)` for every input.
pub fn normalize(command: &str) -> Cow<'_, str> {
    match reply_name(command) {
        Some(name) => Cow::Borrowed(name),
        None => Cow::Borrowed(command),
    }
}
