//! Line feed for shell commands.
//!
//! A background thread reads lines from stdin (or any reader) and forwards
//! them over a channel, so the event loop can poll for commands without
//! blocking its timers.

use crate::model::error::InputError;
use std::io::{self, BufRead, BufReader, Read};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use tracing::debug;

#[derive(Debug)]
enum FeedMessage {
    Line(String),
    Eof,
    Failed(io::Error),
}

/// Non-blocking line source for the event loop.
///
/// # Design
///
/// - Reading happens on a dedicated thread; `poll()` only drains a channel
/// - Tracks EOF via the `complete` flag
/// - A read error is reported once, then the feed counts as complete
#[derive(Debug)]
pub struct StdinFeed {
    rx: Receiver<FeedMessage>,
    complete: bool,
}

impl StdinFeed {
    /// Feed reading the process's stdin.
    ///
    /// # Errors
    ///
    /// Returns `InputError::Io` if the reader thread cannot be spawned.
    pub fn stdin() -> Result<Self, InputError> {
        Self::from_reader(io::stdin())
    }

    /// Feed reading any reader, e.g. a script file or an in-memory buffer.
    ///
    /// # Errors
    ///
    /// Returns `InputError::Io` if the reader thread cannot be spawned.
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Result<Self, InputError> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("stdin-feed".to_string())
            .spawn(move || {
                let mut reader = BufReader::new(reader);
                loop {
                    let mut line = String::new();
                    let message = match reader.read_line(&mut line) {
                        Ok(0) => FeedMessage::Eof,
                        Ok(_) => {
                            let trimmed = line.trim_end_matches(['\r', '\n']).to_string();
                            FeedMessage::Line(trimmed)
                        }
                        Err(e) => FeedMessage::Failed(e),
                    };
                    let last = !matches!(message, FeedMessage::Line(_));
                    if tx.send(message).is_err() || last {
                        break;
                    }
                }
            })?;

        Ok(Self {
            rx,
            complete: false,
        })
    }

    /// Drain every line read so far. Never blocks.
    ///
    /// # Errors
    ///
    /// Returns `InputError::Io` if the reader failed. Lines received before
    /// the failure are lost with it; the feed is complete afterwards.
    pub fn poll(&mut self) -> Result<Vec<String>, InputError> {
        let mut lines = Vec::new();
        while !self.complete {
            match self.rx.try_recv() {
                Ok(FeedMessage::Line(line)) => lines.push(line),
                Ok(FeedMessage::Eof) | Err(TryRecvError::Disconnected) => {
                    debug!("command feed reached EOF");
                    self.complete = true;
                }
                Ok(FeedMessage::Failed(e)) => {
                    self.complete = true;
                    return Err(InputError::Io(e));
                }
                Err(TryRecvError::Empty) => break,
            }
        }
        Ok(lines)
    }

    /// Check if EOF has been reached (no more lines will arrive).
    pub fn is_complete(&self) -> bool {
        self.complete
    }
}
