//! In-process plugin transport and launcher.
//!
//! Calls still pass through the frame codec so that host and plugin only
//! share what travels on the wire.

use crate::capability::{
    ports::{
        LaunchError, LaunchResult, LaunchedPlugin, PluginLauncher, PluginResource,
        PluginTransport, TransportError, TransportResult,
    },
    services::PluginServer,
    wire::{
        CallFrame, HandshakeConfig, HandshakeHello, PluginMethod, PluginRequest, PluginResponse,
        ReplyFrame, read_frame, write_frame,
    },
};
use camino::Utf8Path;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Transport serving calls with an in-process [`PluginServer`].
#[derive(Debug)]
pub struct LoopbackTransport {
    server: PluginServer,
    next_id: AtomicU64,
    killed: AtomicBool,
    calls: Mutex<HashMap<PluginMethod, usize>>,
}

impl LoopbackTransport {
    /// Creates a transport serving `resource`.
    #[must_use]
    pub fn new(resource: Arc<dyn PluginResource>) -> Self {
        Self::with_server(PluginServer::new(resource))
    }

    /// Creates a transport over an existing server.
    #[must_use]
    pub fn with_server(server: PluginServer) -> Self {
        Self {
            server,
            next_id: AtomicU64::new(1),
            killed: AtomicBool::new(false),
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Returns how many calls of `method` reached the server.
    #[must_use]
    pub fn calls_of(&self, method: PluginMethod) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&method)
            .copied()
            .unwrap_or_default()
    }

    /// Returns how many calls reached the server.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }

    /// Returns whether the transport was killed.
    #[must_use]
    pub fn is_killed(&self) -> bool {
        self.killed.load(Ordering::Acquire)
    }
}

impl PluginTransport for LoopbackTransport {
    fn call(
        &self,
        method: PluginMethod,
        request: &PluginRequest,
    ) -> TransportResult<PluginResponse> {
        if self.is_killed() {
            return Err(TransportError::Killed);
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let mut outbound = Vec::new();
        write_frame(
            &mut outbound,
            &CallFrame {
                id,
                method,
                request: request.clone(),
            },
        )?;
        let call: CallFrame =
            read_frame(&mut Cursor::new(outbound))?.ok_or(TransportError::Disconnected)?;

        *self
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(call.method)
            .or_default() += 1;
        let response = self.server.handle(call.method, &call.request);

        let mut inbound = Vec::new();
        write_frame(
            &mut inbound,
            &ReplyFrame {
                id: call.id,
                response,
            },
        )?;
        let reply: ReplyFrame =
            read_frame(&mut Cursor::new(inbound))?.ok_or(TransportError::Disconnected)?;
        if reply.id != id {
            return Err(TransportError::MismatchedReply {
                expected: id,
                actual: reply.id,
            });
        }
        Ok(reply.response)
    }

    fn kill(&self) {
        self.killed.store(true, Ordering::Release);
    }
}

/// Launcher resolving plugin paths to in-process plugin resources by file
/// name.
#[derive(Default)]
pub struct LoopbackLauncher {
    plugins: HashMap<String, Arc<dyn PluginResource>>,
    protocol_versions: HashMap<String, u32>,
    launched: Mutex<HashMap<String, Arc<LoopbackTransport>>>,
}

impl LoopbackLauncher {
    /// Creates a launcher with no plugins.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `resource` launchable under the file name `name`.
    #[must_use]
    pub fn with_plugin(mut self, name: impl Into<String>, resource: Arc<dyn PluginResource>) -> Self {
        self.plugins.insert(name.into(), resource);
        self
    }

    /// Makes the plugin `name` announce `version` instead of the host's.
    #[must_use]
    pub fn with_protocol_version(mut self, name: impl Into<String>, version: u32) -> Self {
        self.protocol_versions.insert(name.into(), version);
        self
    }

    /// Returns the transport of the most recent launch of `name`.
    #[must_use]
    pub fn launched(&self, name: &str) -> Option<Arc<LoopbackTransport>> {
        self.launched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

impl PluginLauncher for LoopbackLauncher {
    fn launch(&self, path: &Utf8Path, handshake: &HandshakeConfig) -> LaunchResult<LaunchedPlugin> {
        let name = path
            .file_name()
            .ok_or_else(|| LaunchError::UnnamedPlugin(path.to_owned()))?;
        let resource = self
            .plugins
            .get(name)
            .ok_or_else(|| LaunchError::UnknownPlugin(path.to_owned()))?;

        let hello = HandshakeHello {
            protocol_version: self
                .protocol_versions
                .get(name)
                .copied()
                .unwrap_or_else(|| handshake.protocol_version()),
            plugin: name.to_owned(),
        };
        handshake.verify_hello(&hello)?;

        let transport = Arc::new(LoopbackTransport::new(Arc::clone(resource)));
        self.launched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_owned(), Arc::clone(&transport));
        Ok(LaunchedPlugin {
            name: name.to_owned(),
            transport,
        })
    }
}
