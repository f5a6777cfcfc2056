//! Connection configuration.
//!
//! A [`ConfigBuilder`] collects options (programmatically or through serde)
//! and [`ConfigBuilder::build`] validates them once into an immutable
//! [`Config`]. Every configuration error, including an unsupported SASL
//! mechanism, is reported here, before any connection is attempted.
//!
//! # Example
//!
//! ```
//! use slirc_session::config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new("bob")
//!     .sasl("plain", "hunter2")
//!     .auto_join("#rust")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.username, "bob");
//! assert!(config.capabilities.iter().any(|c| c == "sasl"));
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::action::JoinTarget;
use crate::error::ConfigError;
use crate::sasl::{self, SaslMechanism};

pub const DEFAULT_PORT: u16 = 6697;
pub const DEFAULT_ENCODING: &str = "utf-8";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_REALNAME: &str = "slirc-session IRC client";
pub const DEFAULT_CAPABILITIES: &[&str] = &["multi-prefix"];

/// Unvalidated options. Missing fields take their defaults.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    tls: Option<bool>,
    encoding: Option<String>,
    timeout_secs: Option<u64>,
    password: Option<String>,
    nick: Option<String>,
    username: Option<String>,
    realname: Option<String>,
    capabilities: Option<Vec<String>>,
    sasl_mechanism: Option<String>,
    sasl_password: Option<String>,
    auto_join: Vec<JoinTarget>,
}

impl ConfigBuilder {
    pub fn new(nick: impl Into<String>) -> Self {
        ConfigBuilder {
            nick: Some(nick.into()),
            ..Default::default()
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn tls(mut self, tls: bool) -> Self {
        self.tls = Some(tls);
        self
    }

    pub fn encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = Some(label.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = Some(timeout.as_secs());
        self
    }

    /// Server password, sent as `PASS` before anything else.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn realname(mut self, realname: impl Into<String>) -> Self {
        self.realname = Some(realname.into());
        self
    }

    /// Capabilities to request, replacing the defaults.
    pub fn capabilities<I, S>(mut self, caps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = Some(caps.into_iter().map(Into::into).collect());
        self
    }

    pub fn sasl(mut self, mechanism: impl Into<String>, password: impl Into<String>) -> Self {
        self.sasl_mechanism = Some(mechanism.into());
        self.sasl_password = Some(password.into());
        self
    }

    pub fn auto_join(mut self, target: impl Into<JoinTarget>) -> Self {
        self.auto_join.push(target.into());
        self
    }

    /// Validate and freeze the configuration.
    pub fn build(self) -> Result<Config, ConfigError> {
        let nick = self.nick.filter(|n| !n.is_empty()).ok_or(ConfigError::MissingNick)?;
        if nick.starts_with([':', '#', '&']) || nick.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidNick(nick));
        }

        let username = self
            .username
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| nick.clone());

        let mut capabilities = self
            .capabilities
            .unwrap_or_else(|| DEFAULT_CAPABILITIES.iter().map(|c| c.to_string()).collect());
        capabilities.retain(|c| c != "sasl");

        let sasl = match self.sasl_mechanism {
            None => None,
            Some(name) => {
                let mechanism = SaslMechanism::parse(&name);
                if !mechanism.is_supported() {
                    return Err(ConfigError::UnsupportedSaslMechanism(name));
                }
                let password = self
                    .sasl_password
                    .filter(|p| !p.is_empty())
                    .ok_or(ConfigError::MissingSaslPassword)?;
                capabilities.push("sasl".to_owned());
                Some(SaslConfig {
                    mechanism,
                    account: sasl::saslprep("username", &username)?,
                    password: sasl::saslprep("password", &password)?,
                })
            }
        };

        Ok(Config {
            host: self.host,
            port: self.port.unwrap_or(DEFAULT_PORT),
            tls: self.tls.unwrap_or(true),
            encoding: self.encoding.unwrap_or_else(|| DEFAULT_ENCODING.to_owned()),
            timeout: self
                .timeout_secs
                .map_or(DEFAULT_TIMEOUT, Duration::from_secs),
            password: self.password.filter(|p| !p.is_empty()),
            nick,
            username,
            realname: self
                .realname
                .unwrap_or_else(|| DEFAULT_REALNAME.to_owned()),
            capabilities,
            sasl,
            auto_join: self.auto_join,
        })
    }
}

/// SASL settings. Credentials are already SASLprep-normalized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaslConfig {
    pub mechanism: SaslMechanism,
    pub account: String,
    pub password: String,
}

/// Validated, immutable connection configuration.
///
/// `host`, `port`, `tls`, `encoding` and `timeout` are carried for the
/// transport; the session itself only reads the identity, capability, SASL
/// and auto-join settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub host: Option<String>,
    pub port: u16,
    pub tls: bool,
    pub encoding: String,
    pub timeout: Duration,
    pub password: Option<String>,
    pub nick: String,
    pub username: String,
    pub realname: String,
    /// Capabilities to request; contains `sasl` iff SASL is configured.
    pub capabilities: Vec<String>,
    pub sasl: Option<SaslConfig>,
    pub auto_join: Vec<JoinTarget>,
}
