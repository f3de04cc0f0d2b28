//! Process identity handshake shared by hosts and plugins.
//!
//! The host exports the magic cookie into the plugin's environment. A plugin
//! started without it refuses to serve, which stops plugins from being run by
//! hand. The plugin then announces its protocol version as its first frame.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Protocol version spoken by this crate.
pub const PROTOCOL_VERSION: u32 = 1;

/// Environment variable carrying the magic cookie.
pub const DEFAULT_MAGIC_COOKIE_KEY: &str = "CAPLINK_PLUGIN";

/// Expected value of the magic cookie.
pub const DEFAULT_MAGIC_COOKIE_VALUE: &str = "caplink.capability.plugin";

/// Handshake parameters both sides must agree on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandshakeConfig {
    protocol_version: u32,
    magic_cookie_key: String,
    magic_cookie_value: String,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            magic_cookie_key: DEFAULT_MAGIC_COOKIE_KEY.to_owned(),
            magic_cookie_value: DEFAULT_MAGIC_COOKIE_VALUE.to_owned(),
        }
    }
}

impl HandshakeConfig {
    /// Creates a handshake with explicit values.
    #[must_use]
    pub fn new(
        protocol_version: u32,
        magic_cookie_key: impl Into<String>,
        magic_cookie_value: impl Into<String>,
    ) -> Self {
        Self {
            protocol_version,
            magic_cookie_key: magic_cookie_key.into(),
            magic_cookie_value: magic_cookie_value.into(),
        }
    }

    /// Returns the protocol version.
    #[must_use]
    pub const fn protocol_version(&self) -> u32 {
        self.protocol_version
    }

    /// Returns the cookie environment variable name.
    #[must_use]
    pub fn magic_cookie_key(&self) -> &str {
        &self.magic_cookie_key
    }

    /// Returns the expected cookie value.
    #[must_use]
    pub fn magic_cookie_value(&self) -> &str {
        &self.magic_cookie_value
    }

    /// Checks the cookie value found in the plugin's environment.
    ///
    /// # Errors
    ///
    /// Returns [`HandshakeError::MissingCookie`] or
    /// [`HandshakeError::CookieMismatch`] when the plugin was not started by
    /// a compatible host.
    pub fn verify_cookie(&self, found: Option<&str>) -> Result<(), HandshakeError> {
        match found {
            None => Err(HandshakeError::MissingCookie(self.magic_cookie_key.clone())),
            Some(value) if value == self.magic_cookie_value => Ok(()),
            Some(_) => Err(HandshakeError::CookieMismatch(
                self.magic_cookie_key.clone(),
            )),
        }
    }

    /// Checks the hello frame announced by a plugin.
    ///
    /// # Errors
    ///
    /// Returns [`HandshakeError::VersionMismatch`] when the versions differ.
    pub const fn verify_hello(&self, hello: &HandshakeHello) -> Result<(), HandshakeError> {
        if hello.protocol_version == self.protocol_version {
            Ok(())
        } else {
            Err(HandshakeError::VersionMismatch {
                expected: self.protocol_version,
                actual: hello.protocol_version,
            })
        }
    }

    /// Builds the hello frame a plugin named `plugin` sends.
    #[must_use]
    pub fn hello(&self, plugin: impl Into<String>) -> HandshakeHello {
        HandshakeHello {
            protocol_version: self.protocol_version,
            plugin: plugin.into(),
        }
    }
}

/// First frame a plugin writes once it accepts the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeHello {
    /// Protocol version the plugin speaks.
    pub protocol_version: u32,
    /// Plugin name.
    pub plugin: String,
}

/// Handshake failures. All of them are fatal at startup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HandshakeError {
    /// The cookie variable is absent from the plugin's environment.
    #[error("magic cookie '{0}' is not set; plugins must be launched by a host")]
    MissingCookie(String),

    /// The cookie variable holds an unexpected value.
    #[error("magic cookie '{0}' does not match the expected value")]
    CookieMismatch(String),

    /// Host and plugin speak different protocol versions.
    #[error("incompatible plugin protocol version: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Version the host speaks.
        expected: u32,
        /// Version the plugin announced.
        actual: u32,
    },

    /// The plugin closed its channel or sent garbage instead of a hello.
    #[error("plugin did not complete the handshake: {0}")]
    NoHello(String),
}
