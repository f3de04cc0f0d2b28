//! Plugin processes speaking newline-delimited JSON over stdio.

use crate::capability::{
    ports::{
        LaunchError, LaunchResult, LaunchedPlugin, PluginLauncher, PluginResource,
        PluginTransport, TransportError, TransportResult,
    },
    services::PluginServer,
    wire::{
        CallFrame, FrameError, HandshakeConfig, HandshakeError, HandshakeHello, PluginMethod,
        PluginRequest, PluginResponse, ReplyFrame, read_frame, write_frame,
    },
};
use camino::Utf8Path;
use std::fmt;
use std::io::{self, BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Call channel over a reader/writer pair, optionally owning the plugin
/// process at the other end.
///
/// A mutex serialises each request/response pair on the channel.
pub struct StreamTransport<R, W> {
    channel: Mutex<Option<Channel<R, W>>>,
    next_id: AtomicU64,
}

struct Channel<R, W> {
    reader: R,
    writer: W,
    child: Option<Child>,
}

impl<R, W> StreamTransport<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    /// Creates a transport over an already connected stream pair.
    #[must_use]
    pub const fn new(reader: R, writer: W) -> Self {
        Self::with_channel(Channel {
            reader,
            writer,
            child: None,
        })
    }

    const fn with_channel(channel: Channel<R, W>) -> Self {
        Self {
            channel: Mutex::new(Some(channel)),
            next_id: AtomicU64::new(1),
        }
    }

    fn exchange(
        channel: &mut Channel<R, W>,
        id: u64,
        method: PluginMethod,
        request: &PluginRequest,
    ) -> TransportResult<PluginResponse> {
        write_frame(
            &mut channel.writer,
            &CallFrame {
                id,
                method,
                request: request.clone(),
            },
        )?;
        let reply: ReplyFrame =
            read_frame(&mut channel.reader)?.ok_or(TransportError::Disconnected)?;
        if reply.id != id {
            return Err(TransportError::MismatchedReply {
                expected: id,
                actual: reply.id,
            });
        }
        Ok(reply.response)
    }
}

impl<R, W> PluginTransport for StreamTransport<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn call(
        &self,
        method: PluginMethod,
        request: &PluginRequest,
    ) -> TransportResult<PluginResponse> {
        let mut guard = self
            .channel
            .lock()
            .map_err(|err| TransportError::channel(io::Error::other(err.to_string())))?;
        let channel = guard.as_mut().ok_or(TransportError::Killed)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let outcome = Self::exchange(channel, id, method, request);
        if outcome.is_err()
            && let Some(broken) = guard.take()
        {
            broken.close();
        }
        outcome
    }

    fn kill(&self) {
        let taken = self
            .channel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(channel) = taken {
            channel.close();
        }
    }
}

impl<R, W> Drop for StreamTransport<R, W> {
    fn drop(&mut self) {
        let slot = self
            .channel
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(channel) = slot.take() {
            channel.close();
        }
    }
}

impl<R, W> fmt::Debug for StreamTransport<R, W> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("StreamTransport")
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl<R, W> Channel<R, W> {
    fn close(self) {
        let Self { writer, child, .. } = self;
        drop(writer);
        if let Some(process) = child {
            reap(process);
        }
    }
}

fn reap(mut process: Child) {
    if let Err(err) = process.kill() {
        debug!(pid = process.id(), error = %err, "plugin process already gone");
    }
    if let Err(err) = process.wait() {
        warn!(pid = process.id(), error = %err, "failed to reap plugin process");
    }
}

/// Transport to a spawned plugin process.
pub type ProcessTransport = StreamTransport<BufReader<ChildStdout>, ChildStdin>;

/// Launches plugin executables as child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    /// Creates a launcher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PluginLauncher for ProcessLauncher {
    fn launch(&self, path: &Utf8Path, handshake: &HandshakeConfig) -> LaunchResult<LaunchedPlugin> {
        let fallback_name = path
            .file_name()
            .ok_or_else(|| LaunchError::UnnamedPlugin(path.to_owned()))?
            .to_owned();
        let mut process = Command::new(path)
            .env(handshake.magic_cookie_key(), handshake.magic_cookie_value())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|err| LaunchError::Spawn {
                path: path.to_owned(),
                source: Arc::new(err),
            })?;

        let (Some(writer), Some(stdout)) = (process.stdin.take(), process.stdout.take()) else {
            reap(process);
            return Err(LaunchError::MissingPipe(path.to_owned()));
        };
        let mut reader = BufReader::new(stdout);

        let hello = match read_hello(&mut reader, handshake) {
            Ok(hello) => hello,
            Err(err) => {
                warn!(%path, error = %err, "plugin handshake failed");
                reap(process);
                return Err(err.into());
            }
        };
        let name = if hello.plugin.is_empty() {
            fallback_name
        } else {
            hello.plugin
        };
        info!(plugin = %name, pid = process.id(), "plugin handshake completed");

        let transport: ProcessTransport = StreamTransport::with_channel(Channel {
            reader,
            writer,
            child: Some(process),
        });
        Ok(LaunchedPlugin {
            name,
            transport: Arc::new(transport),
        })
    }
}

fn read_hello<R: BufRead>(
    reader: &mut R,
    handshake: &HandshakeConfig,
) -> Result<HandshakeHello, HandshakeError> {
    let hello: HandshakeHello = read_frame(reader)
        .map_err(|err| HandshakeError::NoHello(err.to_string()))?
        .ok_or_else(|| HandshakeError::NoHello("plugin closed its channel".to_owned()))?;
    handshake.verify_hello(&hello)?;
    Ok(hello)
}

/// Errors that stop a plugin from serving.
#[derive(Debug, Clone, Error)]
pub enum ServeError {
    /// The host did not launch this plugin correctly.
    #[error(transparent)]
    Handshake(#[from] HandshakeError),

    /// The channel failed.
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Serves `resource` over the process's stdin/stdout until the host closes
/// the channel.
///
/// Nothing else may write to stdout while serving.
///
/// # Errors
///
/// Returns [`ServeError::Handshake`] when the magic cookie is missing or
/// wrong, and [`ServeError::Frame`] when the channel fails.
pub fn serve_stdio(
    resource: Arc<dyn PluginResource>,
    handshake: &HandshakeConfig,
    name: &str,
) -> Result<(), ServeError> {
    let cookie = std::env::var(handshake.magic_cookie_key()).ok();
    handshake.verify_cookie(cookie.as_deref())?;
    serve_channel(
        &PluginServer::new(resource),
        io::stdin().lock(),
        io::stdout().lock(),
        handshake,
        name,
    )
}

/// Announces the plugin on `writer`, then answers call frames read from
/// `reader` until end of stream.
///
/// # Errors
///
/// Returns [`ServeError::Frame`] when the channel fails or a call frame is
/// malformed.
pub fn serve_channel<R: BufRead, W: Write>(
    server: &PluginServer,
    mut reader: R,
    mut writer: W,
    handshake: &HandshakeConfig,
    name: &str,
) -> Result<(), ServeError> {
    write_frame(&mut writer, &handshake.hello(name))?;
    while let Some(call) = read_frame::<_, CallFrame>(&mut reader)? {
        let response = server.handle(call.method, &call.request);
        write_frame(
            &mut writer,
            &ReplyFrame {
                id: call.id,
                response,
            },
        )?;
    }
    info!(plugin = name, "host closed the plugin channel");
    Ok(())
}
