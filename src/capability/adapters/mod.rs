//! Adapter implementations for plugin transport, storage, and catalog ports.

pub mod memory;

mod loopback;
mod process;

pub use loopback::{LoopbackLauncher, LoopbackTransport};
pub use process::{
    ProcessLauncher, ProcessTransport, ServeError, StreamTransport, serve_channel, serve_stdio,
};
