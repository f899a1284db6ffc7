//! Line-based terminal input for the interactive modes.

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use serde::Serialize;

/// One line typed by the player.
pub enum Input {
    Line(String),
    Closed,
    Idle,
}

/// Stdin read on a helper thread so the game loop can keep polling.
pub struct Console {
    lines: Receiver<String>,
}

impl Console {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self { lines: rx }
    }

    /// Wait up to `timeout` for a line.
    pub fn next(&self, timeout: Duration) -> Input {
        match self.lines.recv_timeout(timeout) {
            Ok(line) => Input::Line(line),
            Err(RecvTimeoutError::Timeout) => Input::Idle,
            Err(RecvTimeoutError::Disconnected) => Input::Closed,
        }
    }

    /// Block until a line arrives; `None` on end of input.
    pub fn read_line(&self) -> Option<String> {
        self.lines.recv().ok()
    }

    /// Throw away anything typed while no one was listening.
    pub fn drain(&self) {
        while self.lines.try_recv().is_ok() {}
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
