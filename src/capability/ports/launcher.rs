//! Port for starting plugin processes.

use super::PluginTransport;
use crate::capability::wire::{HandshakeConfig, HandshakeError};
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for plugin launches.
pub type LaunchResult<T> = Result<T, LaunchError>;

/// A started plugin with a connected call channel.
#[derive(Clone)]
pub struct LaunchedPlugin {
    /// Plugin name, usually the binary's file name.
    pub name: String,
    /// Connected channel.
    pub transport: Arc<dyn PluginTransport>,
}

impl fmt::Debug for LaunchedPlugin {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LaunchedPlugin")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Starts a plugin and completes the handshake.
pub trait PluginLauncher: Send + Sync {
    /// Launches the plugin at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError`] when the process cannot be started or the
    /// handshake fails. Both are fatal startup errors.
    fn launch(&self, path: &Utf8Path, handshake: &HandshakeConfig) -> LaunchResult<LaunchedPlugin>;
}

/// Launch failures.
#[derive(Debug, Clone, Error)]
pub enum LaunchError {
    /// The process could not be spawned.
    #[error("failed to spawn plugin '{path}': {source}")]
    Spawn {
        /// Plugin binary path.
        path: Utf8PathBuf,
        /// Spawn failure.
        source: Arc<std::io::Error>,
    },

    /// The spawned process has no piped stdin or stdout.
    #[error("plugin '{0}' was spawned without piped stdio")]
    MissingPipe(Utf8PathBuf),

    /// The path has no usable plugin name.
    #[error("plugin path '{0}' has no file name")]
    UnnamedPlugin(Utf8PathBuf),

    /// No plugin is known at the given path.
    #[error("no plugin available at '{0}'")]
    UnknownPlugin(Utf8PathBuf),

    /// The handshake failed.
    #[error(transparent)]
    Handshake(#[from] HandshakeError),
}
