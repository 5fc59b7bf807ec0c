//! Terminal collaborator: raw-mode input polling and origin-aware output.
//!
//! The terminal has no cancellable blocking read, so input is polled
//! non-blocking at a bounded interval by the driver. Output interleaves two
//! character streams (locally typed and remotely received); a line break is
//! inserted whenever the origin flips so partial lines from the two streams
//! never run together.

use std::io::{self, Write};
use std::time::Duration;

use colored::Colorize;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

/// One unit of local input, already mapped to its chat meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Enter,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Local,
    Remote,
}

/// Owns raw mode for the process lifetime; dropping restores the terminal.
pub struct Console {
    last_origin: Option<Origin>,
}

impl Console {
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self { last_origin: None })
    }

    /// Non-blocking poll for one mapped key. `None` means no input pending.
    pub fn poll_key(&mut self) -> io::Result<Option<KeyInput>> {
        if !event::poll(Duration::ZERO)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(map_key(key)),
            _ => Ok(None),
        }
    }

    /// Block for the next key press. Returns `false` when it is the quit key.
    pub fn wait_any_key(&mut self) -> io::Result<bool> {
        loop {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                return Ok(!matches!(map_key(key), Some(KeyInput::Quit)));
            }
        }
    }

    /// Echo locally typed text.
    pub fn print_local(&mut self, text: &str) -> io::Result<()> {
        self.print(Origin::Local, text.normal())
    }

    /// Show text received from the peer.
    pub fn print_remote(&mut self, text: &str) -> io::Result<()> {
        self.print(Origin::Remote, text.cyan())
    }

    /// Print a full status line (banner, prompt, error), ending any partial
    /// chat line first.
    pub fn line(&mut self, text: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        if self.last_origin.is_some() {
            out.write_all(b"\r\n")?;
            self.last_origin = None;
        }
        write!(out, "{}\r\n", text.dimmed())?;
        out.flush()
    }

    fn print(&mut self, origin: Origin, text: colored::ColoredString) -> io::Result<()> {
        let mut out = io::stdout().lock();
        if self.last_origin.is_some_and(|last| last != origin) {
            out.write_all(b"\r\n")?;
        }
        // Raw mode needs explicit carriage returns
        write!(out, "{}", text.to_string().replace('\n', "\r\n"))?;
        out.flush()?;
        self.last_origin = Some(origin);
        Ok(())
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

fn map_key(key: KeyEvent) -> Option<KeyInput> {
    match key.code {
        KeyCode::Esc => Some(KeyInput::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyInput::Quit)
        }
        KeyCode::Enter => Some(KeyInput::Enter),
        KeyCode::Char(c) => Some(KeyInput::Char(c)),
        _ => None,
    }
}
