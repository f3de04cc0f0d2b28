//! Call channel port between a host and one plugin process.

use crate::capability::wire::{FrameError, PluginMethod, PluginRequest, PluginResponse};
use std::sync::Arc;
use thiserror::Error;

/// Result type for raw transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Bidirectional call channel to a single plugin process.
///
/// Calls block until the plugin answers or the channel fails. There is no
/// built-in timeout; callers needing bounded latency impose their own
/// deadline around the whole call.
#[cfg_attr(test, mockall::automock)]
pub trait PluginTransport: Send + Sync {
    /// Sends one call and waits for its reply.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the channel is broken. Remote faults
    /// are not transport errors; they arrive as [`PluginResponse::Fault`].
    fn call(&self, method: PluginMethod, request: &PluginRequest)
    -> TransportResult<PluginResponse>;

    /// Tears the channel down and terminates the plugin process.
    fn kill(&self);
}

/// Failures of the channel itself.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The plugin closed its end of the channel.
    #[error("plugin channel closed")]
    Disconnected,

    /// The channel was killed by the host.
    #[error("plugin channel was killed")]
    Killed,

    /// Framing failed on the channel.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// A reply answered a different call than the one in flight.
    #[error("reply {actual} does not answer call {expected}")]
    MismatchedReply {
        /// Identifier of the call in flight.
        expected: u64,
        /// Identifier carried by the reply.
        actual: u64,
    },

    /// Generic channel failure.
    #[error("plugin channel error: {0}")]
    Channel(Arc<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    /// Wraps an adapter-specific channel failure.
    pub fn channel(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Channel(Arc::new(err))
    }
}

/// Result type for remote calls made through a plugin client.
pub type PluginCallResult<T> = Result<T, PluginCallError>;

/// Failures of a remote call, classified by who is at fault.
#[derive(Debug, Clone, Error)]
pub enum PluginCallError {
    /// The channel broke; the plugin is now considered dead.
    #[error("transport to plugin '{plugin}' failed during {method}: {source}")]
    Transport {
        /// Plugin name.
        plugin: String,
        /// Method in flight.
        method: PluginMethod,
        /// Underlying channel failure.
        source: TransportError,
    },

    /// An earlier transport failure or a kill made the plugin unusable.
    #[error("plugin '{0}' is no longer usable")]
    Unavailable(String),

    /// The call site passed more than one argument.
    #[error("{method} on plugin '{plugin}' accepts at most one argument, got {count}")]
    TooManyArguments {
        /// Plugin name.
        plugin: String,
        /// Method requested.
        method: PluginMethod,
        /// Number of arguments supplied.
        count: usize,
    },

    /// Host and plugin disagree on the protocol.
    #[error("protocol violation calling {method} on plugin '{plugin}': {message}")]
    Protocol {
        /// Plugin name.
        plugin: String,
        /// Method requested.
        method: PluginMethod,
        /// Diagnostic.
        message: String,
    },

    /// The plugin's own logic failed for this request.
    #[error("{method} on plugin '{plugin}' failed: {message}")]
    Business {
        /// Plugin name.
        plugin: String,
        /// Method requested.
        method: PluginMethod,
        /// Error reported by the plugin.
        message: String,
    },
}

impl PluginCallError {
    /// Returns whether the error signals a broken plugin or a host/plugin
    /// mismatch rather than a failure tied to one owner.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::Business { .. })
    }
}
