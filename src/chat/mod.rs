//! Chat session runner.
//!
//! One session = negotiate an identity, run the inbound loop and the
//! interactive driver concurrently under a shared cancellation token, and
//! tear both down when the user quits.
//!
//! ```text
//! +-----------+   accept/frame   +--------------+
//! |  inbound  | ---------------> |    driver    | --> terminal
//! |   task    |   mpsc channel   | (poll loop)  |
//! +-----------+                  +--------------+
//!       ^                              |
//!       |         cancellation         v
//!       +------------ token ------ outbound send (per keystroke)
//! ```

pub mod inbound;
pub mod outbound;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::config::{ChatConfig, POLL_INTERVAL};
use crate::console::{Console, KeyInput};
use crate::session::{self, Session};
use crate::transport::Endpoint;

/// Run one chat session to completion. Returns `Err` only for negotiation
/// failure; the user quitting is the normal `Ok` path.
pub async fn run_session(config: &ChatConfig, console: &mut Console) -> Result<()> {
    let endpoint = config.endpoint();
    let (session, listener) = session::negotiate(&endpoint).await?;

    console.line(&format!(
        "connected as {} (peer: {}) - type to chat, Esc to quit",
        session.self_channel.pipe_name(),
        session.peer_channel.pipe_name()
    ))?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let inbound = tokio::spawn(inbound::run(listener, tx, session.cancel.clone()));

    let result = drive(&endpoint, &session, &mut rx, console).await;

    session.cancel.cancel();
    let _ = inbound.await;
    result
}

/// The interactive driver: drain remote messages, poll one local input unit,
/// complete its send before polling the next. Each iteration yields for the
/// poll interval when idle.
async fn drive(
    endpoint: &Endpoint,
    session: &Session,
    rx: &mut mpsc::UnboundedReceiver<String>,
    console: &mut Console,
) -> Result<()> {
    loop {
        while let Ok(text) = rx.try_recv() {
            console.print_remote(&text)?;
        }

        match console.poll_key()? {
            Some(KeyInput::Char(c)) => {
                let text = c.to_string();
                console.print_local(&text)?;
                outbound::send(endpoint, session.peer_channel, Some(&text)).await;
            }
            Some(KeyInput::Enter) => {
                console.print_local("\n")?;
                outbound::send(endpoint, session.peer_channel, Some("\n")).await;
            }
            Some(KeyInput::Quit) => return Ok(()),
            None => tokio::time::sleep(POLL_INTERVAL).await,
        }
    }
}
