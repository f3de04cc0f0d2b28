//! Newline-delimited JSON framing.
//!
//! JSON escapes control characters inside strings, so a newline can only
//! ever terminate a frame.

use super::{PluginMethod, PluginRequest, PluginResponse};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use thiserror::Error;

/// Call frame written by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallFrame {
    /// Correlation identifier echoed by the reply.
    pub id: u64,
    /// Method to invoke.
    pub method: PluginMethod,
    /// Call envelope.
    pub request: PluginRequest,
}

/// Reply frame written by the plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyFrame {
    /// Identifier of the call being answered.
    pub id: u64,
    /// Call outcome.
    pub response: PluginResponse,
}

/// Errors raised while reading or writing frames.
#[derive(Debug, Clone, Error)]
pub enum FrameError {
    /// The underlying stream failed.
    #[error("frame I/O error: {0}")]
    Io(Arc<io::Error>),

    /// A frame was not valid JSON for the expected shape.
    #[error("malformed frame: {0}")]
    Malformed(String),
}

impl From<io::Error> for FrameError {
    fn from(err: io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

/// Writes one frame and flushes the stream.
///
/// # Errors
///
/// Returns [`FrameError::Malformed`] when the value cannot be serialised and
/// [`FrameError::Io`] when the stream fails.
pub fn write_frame<W: Write, T: Serialize>(writer: &mut W, frame: &T) -> Result<(), FrameError> {
    let mut line =
        serde_json::to_vec(frame).map_err(|err| FrameError::Malformed(err.to_string()))?;
    line.push(b'\n');
    writer.write_all(&line)?;
    writer.flush()?;
    Ok(())
}

/// Reads one frame, returning `None` at end of stream.
///
/// # Errors
///
/// Returns [`FrameError::Io`] when the stream fails and
/// [`FrameError::Malformed`] when the line does not decode.
pub fn read_frame<R: BufRead, T: DeserializeOwned>(reader: &mut R) -> Result<Option<T>, FrameError> {
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if !line.trim().is_empty() {
            break;
        }
    }
    serde_json::from_str(line.trim_end())
        .map(Some)
        .map_err(|err| FrameError::Malformed(err.to_string()))
}
