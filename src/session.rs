//! Channel identities and role negotiation.
//!
//! Two fixed channel names exist; exactly one instance owns each. Ownership
//! is decided once at startup by probing `pipe_1`: no owner means this
//! instance is first and claims it, an owner means this instance is second,
//! claims `pipe_2`, and greets the first instance.

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::chat::outbound;
use crate::transport::{Endpoint, PipeListener};

pub const CHANNEL_A: &str = "pipe_1";
pub const CHANNEL_B: &str = "pipe_2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelId {
    A,
    B,
}

impl ChannelId {
    pub fn pipe_name(self) -> &'static str {
        match self {
            ChannelId::A => CHANNEL_A,
            ChannelId::B => CHANNEL_B,
        }
    }

    pub fn peer(self) -> ChannelId {
        match self {
            ChannelId::A => ChannelId::B,
            ChannelId::B => ChannelId::A,
        }
    }
}

/// Runtime state of one instance, fixed for the session's lifetime.
#[derive(Debug)]
pub struct Session {
    pub self_channel: ChannelId,
    pub peer_channel: ChannelId,
    pub cancel: CancellationToken,
}

/// Assign this instance its channel identity and bind its inbound listener.
///
/// The probe is a bare connect (no payload) bounded by the short timeout:
/// failure means nobody owns `pipe_1` yet and this instance takes it;
/// success means an owner exists and this instance becomes `pipe_2`.
///
/// Two instances probing inside the same timeout window can both see no
/// owner; the loser of the ensuing bind race gets a negotiation error and
/// can retry. That window is inherent to the probe design.
pub async fn negotiate(endpoint: &Endpoint) -> Result<(Session, PipeListener)> {
    let owner_exists = outbound::send(endpoint, ChannelId::A, None).await;

    let self_channel = if owner_exists {
        ChannelId::B
    } else {
        ChannelId::A
    };
    let peer_channel = self_channel.peer();

    let listener = endpoint
        .bind(self_channel.pipe_name())
        .await
        .with_context(|| format!("cannot claim channel {}", self_channel.pipe_name()))?;

    if self_channel == ChannelId::B {
        let greeting = format!("Hello from {}!", CHANNEL_B);
        outbound::send(endpoint, ChannelId::A, Some(&greeting)).await;
    }

    info!(
        self_channel = self_channel.pipe_name(),
        peer_channel = peer_channel.pipe_name(),
        "negotiated channel identity"
    );

    Ok((
        Session {
            self_channel,
            peer_channel,
            cancel: CancellationToken::new(),
        },
        listener,
    ))
}
