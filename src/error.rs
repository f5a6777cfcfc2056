//! Error types for the IRC session runtime.
//!
//! This module defines error types for line parsing, the transport codec,
//! configuration validation, store path lookups and connection registration.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Transport-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Illegal control character in a line.
    #[error("illegal control character: {0:?}")]
    IllegalControlChar(char),
}

/// Errors encountered when parsing a single IRC line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Line was empty.
    #[error("empty message")]
    EmptyMessage,

    /// Command token was invalid or missing.
    #[error("invalid command")]
    InvalidCommand,

    /// Prefix marker without a prefix.
    #[error("invalid prefix: {0}")]
    InvalidPrefix(String),
}

/// Configuration errors, reported before a connection is attempted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// No nickname was configured.
    #[error("no nickname provided")]
    MissingNick,

    /// The nickname can not be sent on the wire as-is.
    #[error("invalid nickname: {0:?}")]
    InvalidNick(String),

    /// Only the PLAIN SASL mechanism is supported.
    #[error("SASL mechanism ({0}) not supported")]
    UnsupportedSaslMechanism(String),

    /// A SASL mechanism was configured without a password.
    #[error("SASL mechanism configured without a password")]
    MissingSaslPassword,

    /// A SASL credential was rejected by the SASLprep profile.
    #[error("SASLprep rejected {field}: {reason}")]
    Saslprep {
        /// Which credential failed (`username` or `password`).
        field: &'static str,
        /// Description from the stringprep implementation.
        reason: String,
    },
}

/// Errors from path-based reads of the session store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    /// The path could not be parsed.
    #[error("invalid store path: {0}")]
    InvalidPath(String),

    /// An index was applied to something that is not an array.
    #[error("path does not point to an array: {0}")]
    NotAnArray(String),

    /// A field was applied to something that is not an object.
    #[error("path does not point to an object: {0}")]
    NotAnObject(String),
}

/// Non-fatal problems reported while registering with a server.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistrationError {
    /// Server rejected a capability request.
    #[error("capability rejected: {}", .0.join(", "))]
    CapabilityRejected(Vec<String>),

    /// SASL authentication failed.
    #[error("SASL authentication failed: {0}")]
    SaslFailed(String),

    /// Nickname collision or erroneous nickname.
    #[error("nickname in use: {0}")]
    NicknameInUse(String),

    /// Server sent ERROR.
    #[error("server error: {0}")]
    ServerError(String),
}

/// Errors that end a running connection.
#[cfg(feature = "tokio")]
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConnectionError {
    /// The codec failed on the underlying stream.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The connection task is gone.
    #[error("connection closed")]
    Closed,
}
