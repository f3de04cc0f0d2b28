//! Wire protocol between host and plugin processes.
//!
//! A call is a [`PluginMethod`] plus a [`PluginRequest`] envelope; the reply
//! is a [`PluginResponse`] whose body depends on the method. Frames are
//! newline-delimited JSON exchanged after a cookie and version handshake.

mod envelope;
mod frame;
mod handshake;
mod method;
mod response;

pub use envelope::PluginRequest;
pub use frame::{CallFrame, FrameError, ReplyFrame, read_frame, write_frame};
pub use handshake::{
    DEFAULT_MAGIC_COOKIE_KEY, DEFAULT_MAGIC_COOKIE_VALUE, HandshakeConfig, HandshakeError,
    HandshakeHello, PROTOCOL_VERSION,
};
pub use method::PluginMethod;
pub use response::{BuildResponse, FaultKind, PluginResponse, RemoteFault, UpdateResponse};
