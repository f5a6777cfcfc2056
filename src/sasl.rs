//! SASL authentication helpers for IRC.
//!
//! Only the PLAIN mechanism is supported. Credentials pass through the
//! SASLprep profile (RFC 4013) before they are encoded.
//!
//! # Reference
//! - IRCv3 SASL: <https://ircv3.net/specs/extensions/sasl-3.2>
//! - RFC 4616 (PLAIN): <https://tools.ietf.org/html/rfc4616>
//!
//! # Example
//!
//! ```
//! use slirc_session::sasl::{SaslMechanism, encode_plain};
//!
//! let encoded = encode_plain("myuser", "mypassword").unwrap();
//! assert!(!encoded.is_empty());
//!
//! let mech = SaslMechanism::parse("plain");
//! assert_eq!(mech, SaslMechanism::Plain);
//! ```

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::error::ConfigError;

/// Maximum length of a single SASL message chunk (400 bytes).
///
/// SASL responses that exceed this length must be split into multiple
/// AUTHENTICATE commands.
pub const SASL_CHUNK_SIZE: usize = 400;

/// SASL mechanisms a configuration may name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SaslMechanism {
    /// PLAIN mechanism (RFC 4616) - simple username/password.
    Plain,
    /// Anything else. Rejected at configuration time.
    Unknown(String),
}

impl SaslMechanism {
    /// Parse a mechanism name string.
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "PLAIN" => Self::Plain,
            _ => Self::Unknown(name.to_owned()),
        }
    }

    /// Returns the canonical name of this mechanism, as sent in `AUTHENTICATE`.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Plain => "PLAIN",
            Self::Unknown(s) => s,
        }
    }

    /// Check if this mechanism is supported for encoding.
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Plain)
    }
}

impl std::fmt::Display for SaslMechanism {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Apply the SASLprep profile to one credential.
pub fn saslprep(field: &'static str, value: &str) -> Result<String, ConfigError> {
    stringprep::saslprep(value)
        .map(|prepped| prepped.into_owned())
        .map_err(|e| ConfigError::Saslprep {
            field,
            reason: e.to_string(),
        })
}

/// Encode credentials for the PLAIN mechanism.
///
/// The payload is `authzid NUL authcid NUL password` where both identities
/// are the SASLprep-normalized `username`.
///
/// # Example
///
/// ```
/// use slirc_session::sasl::encode_plain;
///
/// let encoded = encode_plain("testuser", "testpass").unwrap();
/// // Decodes to: "testuser\0testuser\0testpass"
/// assert_eq!(encoded, "dGVzdHVzZXIAdGVzdHVzZXIAdGVzdHBhc3M=");
/// ```
pub fn encode_plain(username: &str, password: &str) -> Result<String, ConfigError> {
    let username = saslprep("username", username)?;
    let password = saslprep("password", password)?;
    Ok(encode_plain_with_authzid(&username, &username, &password))
}

/// Encode credentials for the PLAIN mechanism with an explicit authzid.
///
/// No normalization is applied here.
pub fn encode_plain_with_authzid(authzid: &str, authcid: &str, password: &str) -> String {
    let payload = format!("{}\0{}\0{}", authzid, authcid, password);
    BASE64.encode(payload.as_bytes())
}

/// Split an encoded SASL response into `AUTHENTICATE` arguments.
///
/// Responses longer than 400 bytes are split; if the last chunk is exactly
/// 400 bytes an extra `+` tells the server the response is complete.
pub fn chunk_response(encoded: &str) -> Vec<String> {
    if encoded.is_empty() {
        return vec!["+".to_owned()];
    }

    // base64 is ASCII, so byte offsets are char boundaries.
    let mut chunks: Vec<String> = encoded
        .as_bytes()
        .chunks(SASL_CHUNK_SIZE)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect();

    if encoded.len() % SASL_CHUNK_SIZE == 0 {
        chunks.push("+".to_owned());
    }
    chunks
}

/// Check if a SASL response needs chunking.
#[inline]
pub fn needs_chunking(encoded: &str) -> bool {
    encoded.len() > SASL_CHUNK_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_plain() {
        let encoded = encode_plain("testuser", "testpass").unwrap();
        let decoded = BASE64.decode(&encoded).unwrap();
        assert_eq!(decoded, b"testuser\0testuser\0testpass");
    }

    #[test]
    fn test_encode_plain_applies_saslprep() {
        // U+00A0 NO-BREAK SPACE maps to a plain space under SASLprep.
        let encoded = encode_plain("user", "pass\u{00A0}word").unwrap();
        let decoded = BASE64.decode(&encoded).unwrap();
        assert_eq!(decoded, b"user\0user\0pass word");
    }

    #[test]
    fn test_saslprep_rejects_prohibited() {
        let err = saslprep("password", "bad\u{0007}").unwrap_err();
        assert!(matches!(err, ConfigError::Saslprep { field: "password", .. }));
    }

    #[test]
    fn test_encode_plain_with_authzid() {
        let encoded = encode_plain_with_authzid("admin", "testuser", "testpass");
        let decoded = BASE64.decode(&encoded).unwrap();
        assert_eq!(decoded, b"admin\0testuser\0testpass");
    }

    #[test]
    fn test_chunk_response_short() {
        assert_eq!(chunk_response("abc"), vec!["abc"]);
        assert!(!needs_chunking("abc"));
    }

    #[test]
    fn test_chunk_response_long() {
        let long = "a".repeat(450);
        let chunks = chunk_response(&long);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 400);
        assert_eq!(chunks[1].len(), 50);
        assert!(needs_chunking(&long));
    }

    #[test]
    fn test_chunk_response_exact_multiple() {
        let exact = "a".repeat(400);
        let chunks = chunk_response(&exact);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1], "+");
    }

    #[test]
    fn test_mechanism_parse() {
        assert_eq!(SaslMechanism::parse("plain"), SaslMechanism::Plain);
        assert_eq!(SaslMechanism::parse("PLAIN").as_str(), "PLAIN");
        let other = SaslMechanism::parse("EXTERNAL");
        assert_eq!(other, SaslMechanism::Unknown("EXTERNAL".to_string()));
        assert!(!other.is_supported());
    }
}
