use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Signals from the interactive control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    /// Start recording, or stop it if already recording (space bar).
    Toggle,
    /// Quit; discards an in-progress recording ('q' or ctrl-c).
    Quit,
}

/// Restores the terminal on every exit path, including panics.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("failed to restore terminal: {e}");
        }
    }
}

/// Spawn the key listener task.
///
/// The returned channel carries [`ControlSignal`]s; the session consumes it
/// instead of reading keys itself. The task polls so it can notice when the
/// receiver is dropped, and exits after forwarding `Quit`.
pub fn spawn_key_listener(capacity: usize) -> mpsc::Receiver<ControlSignal> {
    let (tx, rx) = mpsc::channel(capacity);

    tokio::task::spawn_blocking(move || {
        let _guard = match RawModeGuard::enable() {
            Ok(guard) => guard,
            Err(e) => {
                warn!("terminal raw mode unavailable: {e}");
                return;
            }
        };

        loop {
            match event::poll(Duration::from_millis(100)) {
                Ok(true) => {
                    let key = match event::read() {
                        Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => key,
                        Ok(_) => continue,
                        Err(e) => {
                            warn!("key read failed: {e}");
                            break;
                        }
                    };

                    let signal = match key.code {
                        KeyCode::Char(' ') => Some(ControlSignal::Toggle),
                        KeyCode::Char('q') | KeyCode::Char('Q') => Some(ControlSignal::Quit),
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            Some(ControlSignal::Quit)
                        }
                        _ => None,
                    };

                    if let Some(signal) = signal {
                        if tx.blocking_send(signal).is_err() {
                            break;
                        }
                        if signal == ControlSignal::Quit {
                            info!("quit signal forwarded, key listener exiting");
                            break;
                        }
                    }
                }
                Ok(false) => {
                    if tx.is_closed() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("key polling failed: {e}");
                    break;
                }
            }
        }
    });

    rx
}
