//! Runtime configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::transport::Endpoint;

/// Connect timeout for probes and outbound sends. Sized for same-machine
/// transports only.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10;

/// Interval between non-blocking input polls in the driver loop.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Directory holding the channel socket files.
    pub pipe_dir: PathBuf,
    pub connect_timeout: Duration,
}

impl ChatConfig {
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.pipe_dir.clone(), self.connect_timeout)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            pipe_dir: std::env::temp_dir().join("pipechat"),
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        }
    }
}
