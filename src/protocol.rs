//! Wire protocol for pipechat.
//!
//! One frame per connection: `len:u16` big-endian, followed by exactly `len`
//! bytes of UTF-16LE encoded text. A zero-length frame is a valid frame that
//! carries no message (connectivity probes produce them); it is never
//! delivered as an empty string.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Maximum payload size in bytes (post-encoding). Longer input is silently
/// truncated to fit the u16 prefix.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

#[derive(Debug, Error)]
pub enum FrameError {
    /// The peer went away before a full length prefix arrived.
    #[error("stream ended before the length prefix was read")]
    MissingPrefix(#[source] std::io::Error),

    /// The prefix promised more bytes than the stream delivered.
    #[error("stream ended before the {wanted}-byte payload was read")]
    ShortRead {
        wanted: usize,
        #[source]
        source: std::io::Error,
    },
}

/// Encode a message into a complete frame (prefix + payload).
///
/// MAX_PAYLOAD is odd, so truncation can sever the last UTF-16 code unit;
/// the decoder drops a dangling byte.
pub fn encode_message(text: &str) -> Bytes {
    let mut payload = BytesMut::with_capacity(text.len() * 2);
    for unit in text.encode_utf16() {
        payload.put_u16_le(unit);
    }
    payload.truncate(MAX_PAYLOAD);

    let mut frame = BytesMut::with_capacity(2 + payload.len());
    frame.put_u16(payload.len() as u16);
    frame.extend_from_slice(&payload);
    frame.freeze()
}

/// Decode a frame payload back into text.
///
/// A trailing odd byte is ignored; a severed surrogate pair decodes lossily.
pub fn decode_payload(payload: &[u8]) -> String {
    let units: Vec<u16> = payload
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Read one frame from the stream. `Ok(None)` means a zero-length frame
/// arrived ("no message"), distinct from any real message.
pub async fn read_message<R: AsyncRead + Unpin>(r: &mut R) -> Result<Option<String>, FrameError> {
    let len = r.read_u16().await.map_err(FrameError::MissingPrefix)? as usize;
    if len == 0 {
        return Ok(None);
    }

    let mut payload = vec![0u8; len];
    r.read_exact(&mut payload)
        .await
        .map_err(|source| FrameError::ShortRead { wanted: len, source })?;

    Ok(Some(decode_payload(&payload)))
}

/// Write one framed message to the stream.
pub async fn write_message<W: AsyncWrite + Unpin>(w: &mut W, text: &str) -> std::io::Result<()> {
    w.write_all(&encode_message(text)).await?;
    w.flush().await
}
