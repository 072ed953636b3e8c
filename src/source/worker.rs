//! Background execution of page requests.
//!
//! Each request runs on its own short-lived thread and reports back through
//! an mpsc channel the event loop drains once per tick. Requests are never
//! interrupted: a request the controller no longer cares about still
//! finishes, and its completion is discarded by session identity.

use crate::model::{FetchError, FetchRequest, FetchTicket};
use crate::source::DataSource;
use crate::state::FetchCompletion;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

struct Outstanding {
    ticket: FetchTicket,
    started: Instant,
    handle: JoinHandle<()>,
}

/// Runs `DataSource` requests on background threads.
pub struct FetchWorker {
    source: Arc<dyn DataSource>,
    timeout: Option<Duration>,
    tx: Sender<FetchCompletion>,
    rx: Receiver<FetchCompletion>,
    outstanding: Vec<Outstanding>,
}

impl std::fmt::Debug for FetchWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchWorker")
            .field("timeout", &self.timeout)
            .field("outstanding", &self.outstanding.len())
            .finish_non_exhaustive()
    }
}

impl FetchWorker {
    /// Worker over `source`, with no timeout.
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            timeout: None,
            tx,
            rx,
            outstanding: Vec::new(),
        }
    }

    /// Give up on requests that run longer than `timeout`.
    ///
    /// A timed-out request is reported as `FetchError::TimedOut`; whatever
    /// its thread delivers later is still forwarded and left to the
    /// controller to discard.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Start executing `request` in the background.
    pub fn submit(&mut self, request: FetchRequest) {
        let ticket = request.ticket;
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();

        let spawned = thread::Builder::new()
            .name(format!("fetch-{ticket}"))
            .spawn(move || {
                let result =
                    source.fetch_page(&request.criteria, request.ticket.cursor, request.page_size);
                if tx.send(FetchCompletion { ticket, result }).is_err() {
                    trace!(%ticket, "completion receiver gone");
                }
            });

        match spawned {
            Ok(handle) => {
                debug!(%ticket, "fetch submitted");
                self.outstanding.push(Outstanding {
                    ticket,
                    started: Instant::now(),
                    handle,
                });
            }
            Err(error) => {
                warn!(%ticket, %error, "could not spawn fetch thread");
                self.report(ticket, FetchError::WorkerGone);
            }
        }
    }

    /// Collect every completion that is ready, without blocking.
    ///
    /// Requests whose thread died without answering are reported as
    /// `FetchError::WorkerGone`, and requests past the timeout as
    /// `FetchError::TimedOut`.
    pub fn poll_completions(&mut self) -> Vec<FetchCompletion> {
        let mut completions: Vec<FetchCompletion> = self.rx.try_iter().collect();
        self.reap(Instant::now());
        completions.extend(self.rx.try_iter());
        completions
    }

    /// Block until one completion arrives or `timeout` passes.
    pub fn wait_for_completion(&mut self, timeout: Duration) -> Option<FetchCompletion> {
        let deadline = Instant::now() + timeout;
        loop {
            self.reap(Instant::now());
            let remaining = deadline.saturating_duration_since(Instant::now());
            let slice = remaining.min(Duration::from_millis(10));
            match self.rx.recv_timeout(slice) {
                Ok(completion) => return Some(completion),
                Err(RecvTimeoutError::Timeout) if remaining.is_zero() => return None,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    /// Number of requests whose outcome has not been reported yet.
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    fn reap(&mut self, now: Instant) {
        let mut still_running = Vec::with_capacity(self.outstanding.len());
        for job in std::mem::take(&mut self.outstanding) {
            if job.handle.is_finished() {
                if job.handle.join().is_err() {
                    warn!(ticket = %job.ticket, "fetch thread panicked");
                    self.report(job.ticket, FetchError::WorkerGone);
                }
                continue;
            }

            let elapsed = now.saturating_duration_since(job.started);
            match self.timeout {
                Some(limit) if elapsed >= limit => {
                    warn!(ticket = %job.ticket, elapsed_ms = elapsed.as_millis() as u64, "fetch timed out");
                    self.report(
                        job.ticket,
                        FetchError::TimedOut {
                            elapsed_ms: elapsed.as_millis() as u64,
                        },
                    );
                }
                _ => still_running.push(job),
            }
        }
        self.outstanding = still_running;
    }

    fn report(&self, ticket: FetchTicket, error: FetchError) {
        if self
            .tx
            .send(FetchCompletion {
                ticket,
                result: Err(error),
            })
            .is_err()
        {
            trace!(%ticket, "completion receiver gone");
        }
    }
}
