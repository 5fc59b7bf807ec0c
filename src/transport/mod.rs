//! Transport adapter over Unix domain sockets.
//!
//! Channels are named, connection-oriented byte streams: one side binds and
//! accepts, the other connects with a short timeout. Connect failures of any
//! kind (timeout, refused, missing socket) mean "no peer reachable" and are
//! absorbed here as `None` rather than propagated as errors.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::{UnixListener, UnixStream};
use tokio::time::timeout;
use tracing::debug;

/// Resolves channel names to socket paths and opens connections.
#[derive(Debug, Clone)]
pub struct Endpoint {
    dir: PathBuf,
    connect_timeout: Duration,
}

impl Endpoint {
    pub fn new(dir: PathBuf, connect_timeout: Duration) -> Self {
        Self {
            dir,
            connect_timeout,
        }
    }

    pub fn socket_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Bind a listener on the named channel.
    ///
    /// A previous crash can leave the socket file behind with no listener.
    /// When the bind hits the occupied path, a probe connect distinguishes a
    /// live owner (bind error stands) from a stale file (removed, bind
    /// retried once). A live listener still makes the bind fail, so the
    /// channel name stays exclusive.
    pub async fn bind(&self, name: &str) -> Result<PipeListener> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create pipe directory {}", self.dir.display()))?;

        let path = self.socket_path(name);
        let listener = match UnixListener::bind(&path) {
            Ok(listener) => listener,
            Err(e) if e.kind() == ErrorKind::AddrInUse => {
                if self.connect(name).await.is_some() {
                    return Err(e)
                        .with_context(|| format!("channel {name} is already owned"));
                }
                debug!(channel = name, "removing stale socket file");
                std::fs::remove_file(&path)
                    .with_context(|| format!("failed to remove stale socket {}", path.display()))?;
                UnixListener::bind(&path)
                    .with_context(|| format!("failed to bind channel {name}"))?
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to bind channel {name}"));
            }
        };

        debug!(channel = name, path = %path.display(), "listening");
        Ok(PipeListener { listener, path })
    }

    /// Connect to the named channel, bounded by the configured timeout.
    /// Returns `None` when no peer is reachable.
    pub async fn connect(&self, name: &str) -> Option<UnixStream> {
        let path = self.socket_path(name);
        match timeout(self.connect_timeout, UnixStream::connect(&path)).await {
            Ok(Ok(stream)) => Some(stream),
            Ok(Err(e)) => {
                debug!(channel = name, "connect failed: {e}");
                None
            }
            Err(_) => {
                debug!(channel = name, timeout = ?self.connect_timeout, "connect timed out");
                None
            }
        }
    }
}

/// A bound inbound channel. Dropping it closes the listener and removes the
/// socket file so the name can be claimed again.
#[derive(Debug)]
pub struct PipeListener {
    listener: UnixListener,
    path: PathBuf,
}

impl PipeListener {
    /// Wait for the next client. One connection is handled at a time; the
    /// caller tears the stream down after reading a single frame.
    pub async fn accept(&self) -> std::io::Result<UnixStream> {
        let (stream, _addr) = self.listener.accept().await?;
        Ok(stream)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PipeListener {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
