//! Inbound loop: accept one client, read one frame, deliver, disconnect.
//!
//! Every await on this path races the session's cancellation token, so
//! cancelling unblocks a pending accept or read promptly. A peer that
//! disconnects mid-frame costs nothing: the partial frame is discarded and
//! the loop keeps accepting.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::protocol;
use crate::transport::PipeListener;

/// Run until cancelled. Decoded remote messages are pushed into `deliver`;
/// zero-length frames (probes) are dropped without delivery.
pub async fn run(
    listener: PipeListener,
    deliver: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
) {
    loop {
        let mut stream = tokio::select! {
            _ = cancel.cancelled() => break,
            res = listener.accept() => match res {
                Ok(stream) => stream,
                Err(e) => {
                    debug!("accept failed: {e}");
                    continue;
                }
            },
        };

        let read = tokio::select! {
            _ = cancel.cancelled() => break,
            res = protocol::read_message(&mut stream) => res,
        };

        match read {
            Ok(Some(text)) => {
                if deliver.send(text).is_err() {
                    // Display side is gone; nothing left to deliver to.
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => debug!("discarding partial frame: {e}"),
        }
        // Dropping the stream disconnects the client; the listener stays up.
    }

    debug!(path = %listener.path().display(), "inbound loop stopped");
}
