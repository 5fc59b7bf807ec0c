//! pipechat entry point.
//!
//! Runs chat sessions in a loop: when a session ends (quit key or a failed
//! negotiation), any key starts a fresh negotiation and the quit key exits.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::terminal::disable_raw_mode;
use tracing_subscriber::EnvFilter;

use pipechat::chat;
use pipechat::config::{ChatConfig, DEFAULT_CONNECT_TIMEOUT_MS};
use pipechat::console::Console;

#[derive(Parser, Debug)]
#[command(name = "pipechat", version, about = "Two-party chat over local named pipe channels")]
struct Cli {
    /// Directory holding the channel socket files
    #[arg(long, env = "PIPECHAT_DIR")]
    pipe_dir: Option<PathBuf>,

    /// Connect timeout for probes and sends, in milliseconds
    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT_MS)]
    connect_timeout_ms: u64,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let defaults = ChatConfig::default();
    let config = ChatConfig {
        pipe_dir: cli.pipe_dir.unwrap_or(defaults.pipe_dir),
        connect_timeout: Duration::from_millis(cli.connect_timeout_ms),
    };

    // Restore the terminal before a panic message hits a raw-mode screen
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        original_hook(panic_info);
    }));

    let mut console = Console::new()?;
    loop {
        if let Err(e) = chat::run_session(&config, &mut console).await {
            console.line(&format!("negotiation failed: {e:#}"))?;
        }
        console.line("session ended - any key restarts, Esc exits")?;
        if !console.wait_any_key()? {
            break;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    // Quiet by default: the chat screen shares the terminal with the logs
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}
