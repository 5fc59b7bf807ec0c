//! pipechat - two-party chat between local processes over named pipe
//! channels.
//!
//! Two anonymous instances discover each other by probing a well-known
//! channel name, assign themselves complementary identities, and exchange
//! length-prefixed text frames over short-lived connections (one connect,
//! one frame, one disconnect per message).

pub mod chat;
pub mod config;
pub mod console;
pub mod protocol;
pub mod session;
pub mod transport;

pub use config::ChatConfig;
pub use session::{ChannelId, Session, CHANNEL_A, CHANNEL_B};
