//! Outbound sender: one fresh connection per message.
//!
//! Every send opens a new connection, writes one frame, drains, and closes.
//! A dead peer is detected by the connect timeout, not by a broken persistent
//! link, so the per-message reconnect cycle is load-bearing.

use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;
use tracing::debug;

use crate::protocol;
use crate::session::ChannelId;
use crate::transport::Endpoint;

/// Deliver one message to the peer's channel. Returns `false` when the peer
/// is not listening right now; that is an expected condition, not an error.
///
/// `message = None` is the degenerate connectivity probe used during
/// negotiation: it connects and disconnects without writing anything.
pub async fn send(endpoint: &Endpoint, channel: ChannelId, message: Option<&str>) -> bool {
    let Some(mut stream) = endpoint.connect(channel.pipe_name()).await else {
        return false;
    };

    if let Some(text) = message {
        if let Err(e) = write_and_drain(&mut stream, text).await {
            debug!(channel = channel.pipe_name(), "send failed: {e}");
            return false;
        }
    }

    // Dropping the stream is the per-message disconnect.
    true
}

async fn write_and_drain(stream: &mut UnixStream, text: &str) -> std::io::Result<()> {
    protocol::write_message(stream, text).await?;
    // Half-close the write side so buffered bytes reach the peer before the
    // connection goes away.
    stream.shutdown().await
}
