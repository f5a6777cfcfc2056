//! RPL_ISUPPORT (005) feature parsing.
//!
//! Each token is `KEY`, `KEY=value` or `-KEY`. Values are coerced: a value
//! with a `,` becomes a list, a purely decimal value becomes a number and
//! anything else stays a string. A bare `KEY` is stored as
//! [`SupportValue::Present`].

use serde::{Serialize, Serializer};

/// Default membership prefix symbols when the server does not advertise `PREFIX`.
pub const DEFAULT_MEMBERSHIP_PREFIXES: &str = "~&@%+";

/// A coerced ISUPPORT value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SupportValue {
    /// Token without a value.
    Present,
    /// Purely decimal value.
    Number(u64),
    /// Comma-separated value.
    List(Vec<String>),
    /// Any other value.
    Text(String),
}

impl SupportValue {
    /// Coerce a raw token value.
    pub fn coerce(raw: &str) -> Self {
        if raw.contains(',') {
            return SupportValue::List(raw.split(',').map(str::to_owned).collect());
        }
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = raw.parse() {
                return SupportValue::Number(n);
            }
        }
        SupportValue::Text(raw.to_owned())
    }

    /// The value as a string, for text values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SupportValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The value as a number, for numeric values.
    pub fn as_number(&self) -> Option<u64> {
        match self {
            SupportValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl Serialize for SupportValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SupportValue::Present => serializer.serialize_bool(true),
            SupportValue::Number(n) => serializer.serialize_u64(*n),
            SupportValue::List(items) => items.serialize(serializer),
            SupportValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// One ISUPPORT token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feature {
    pub key: String,
    /// `None` when the server negated the feature with `-KEY`.
    pub value: Option<SupportValue>,
}

impl Feature {
    /// Parse a single token.
    pub fn parse(token: &str) -> Option<Self> {
        if token.is_empty() {
            return None;
        }
        if let Some(key) = token.strip_prefix('-') {
            if key.is_empty() {
                return None;
            }
            return Some(Feature {
                key: key.to_owned(),
                value: None,
            });
        }
        let (key, value) = match token.split_once('=') {
            Some((k, v)) => (k, SupportValue::coerce(v)),
            None => (token, SupportValue::Present),
        };
        if key.is_empty() {
            return None;
        }
        Some(Feature {
            key: key.to_owned(),
            value: Some(value),
        })
    }
}

/// Parse the parameters of an RPL_ISUPPORT reply.
///
/// The first parameter is the target nick and the last one is always the
/// human-readable trailer; neither is a feature.
pub fn parse_response_args<S: AsRef<str>>(args: &[S]) -> Vec<Feature> {
    if args.len() < 2 {
        return Vec::new();
    }
    args[1..args.len() - 1]
        .iter()
        .filter_map(|t| Feature::parse(t.as_ref()))
        .collect()
}

/// The `PREFIX` token, e.g. `(qaohv)~&@%+`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrefixSpec<'a> {
    pub modes: &'a str,
    pub prefixes: &'a str,
}

impl<'a> PrefixSpec<'a> {
    pub fn parse(s: &'a str) -> Option<Self> {
        if let Some(open) = s.find('(') {
            if let Some(close) = s[open + 1..].find(')') {
                let close = open + 1 + close;
                let modes = &s[open + 1..close];
                let prefixes = &s[close + 1..];
                if !modes.is_empty() && !prefixes.is_empty() {
                    return Some(PrefixSpec { modes, prefixes });
                }
            }
        } else if !s.is_empty() {
            return Some(PrefixSpec {
                modes: "",
                prefixes: s,
            });
        }
        None
    }
}
