//! Line-oriented shell around the search controller.
//!
//! The impure half of the program: it reads commands, runs page requests on
//! the fetch worker, renders to the console and feeds the controller the
//! current time and viewport. All decisions stay in [`SearchController`].

use crate::config::ResolvedConfig;
use crate::integration::{parse_line, ScrollAmount, ShellCommand};
use crate::model::{AppError, CommandError};
use crate::source::stdin::StdinFeed;
use crate::source::{DataSource, FetchWorker};
use crate::state::{AggregateOutcome, CompletionOutcome, InputEvent, SearchController};
use crate::view::console::DEFAULT_WIDTH;
use crate::view::viewport::{DEFAULT_ROW_EXTENT, DEFAULT_VIEWPORT_ROWS};
use crate::view::{ConsoleView, SimulatedViewport};
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Loop period. Short enough that debounce deadlines are met closely.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Presentation options that are not part of the controller config.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellOptions {
    /// Console width in columns.
    pub width: usize,
    /// Rows the simulated viewport shows at once.
    pub viewport_rows: usize,
    /// Content units per row, in the same unit as the scroll threshold.
    pub row_extent: f32,
    /// Query text applied before the initial load.
    pub initial_query: Option<String>,
    /// Sleep between loop steps.
    pub tick_interval: Duration,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            viewport_rows: DEFAULT_VIEWPORT_ROWS,
            row_extent: DEFAULT_ROW_EXTENT,
            initial_query: None,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

/// Whether the loop should keep going after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep stepping.
    Continue,
    /// Stop the loop.
    Quit,
}

#[derive(Debug, Clone, Copy)]
enum Hold {
    UntilSettled,
    Until(Instant),
}

/// Event loop state.
///
/// Generic over the output so tests can render into a `Vec<u8>`.
pub struct Shell<W: Write> {
    controller: SearchController,
    worker: FetchWorker,
    view: ConsoleView<W>,
    viewport: SimulatedViewport,
    initial_query: Option<String>,
    tick_interval: Duration,
    queue: VecDeque<Result<ShellCommand, CommandError>>,
    hold: Option<Hold>,
}

impl<W: Write> Shell<W> {
    /// Shell over an existing controller and worker, printing to `out`.
    pub fn new(
        controller: SearchController,
        worker: FetchWorker,
        out: W,
        options: ShellOptions,
    ) -> Self {
        Self {
            controller,
            worker,
            view: ConsoleView::new(out, options.width),
            viewport: SimulatedViewport::new(options.viewport_rows, options.row_extent),
            initial_query: options.initial_query,
            tick_interval: options.tick_interval,
            queue: VecDeque::new(),
            hold: None,
        }
    }

    /// Run until `quit`, or until the feed is exhausted and nothing is
    /// pending or outstanding. The controller is disposed on the way out.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Terminal` when the output cannot be written.
    pub fn run(&mut self, feed: &mut StdinFeed) -> Result<(), AppError> {
        self.start(Instant::now());

        let result = loop {
            match feed.poll() {
                Ok(lines) => lines.iter().for_each(|line| self.enqueue(line)),
                Err(error) => {
                    warn!(%error, "command input failed");
                    self.view.note(&format!("[input error: {error}]"));
                }
            }

            let flow = self.step(Instant::now());
            if let Some(error) = self.view.take_error() {
                break Err(AppError::Terminal(error));
            }
            if flow == Flow::Quit {
                break Ok(());
            }
            if feed.is_complete() && self.queue.is_empty() && self.is_settled() {
                debug!("input exhausted and no work left");
                break Ok(());
            }
            thread::sleep(self.tick_interval);
        };

        self.controller.dispose(&mut self.view);
        match (result, self.view.take_error()) {
            (Ok(()), Some(error)) => Err(AppError::Terminal(error)),
            (result, _) => result,
        }
    }

    /// Initial load: apply the startup query, then search without waiting
    /// for the debounce.
    pub fn start(&mut self, now: Instant) {
        if let Some(query) = self.initial_query.take() {
            self.controller
                .handle_input(InputEvent::QueryChanged(query), now);
        }
        if let Some(request) = self.controller.search_now(&mut self.view) {
            self.worker.submit(request);
        }
    }

    /// Queue one raw input line. Blank lines and comments are dropped.
    pub fn enqueue(&mut self, line: &str) {
        if let Some(parsed) = parse_line(line) {
            self.queue.push_back(parsed);
        }
    }

    /// One loop iteration: deliver completions, advance the controller,
    /// then run queued commands unless held by `wait`.
    pub fn step(&mut self, now: Instant) -> Flow {
        self.deliver_completions(now);

        let metrics = self.viewport.metrics(self.controller.aggregator().len());
        if let Some(request) = self.controller.tick(now, Some(&metrics), &mut self.view) {
            self.worker.submit(request);
        }

        self.run_commands(now)
    }

    /// Nothing outstanding and no search waiting to start. A hidden view
    /// counts as settled since its searches wait for `show`.
    pub fn is_settled(&self) -> bool {
        self.worker.outstanding() == 0
            && (!self.controller.has_pending_search() || !self.controller.is_visible())
    }

    /// The controller, for status output and tests.
    pub fn controller(&self) -> &SearchController {
        &self.controller
    }

    /// The simulated viewport.
    pub fn viewport(&self) -> &SimulatedViewport {
        &self.viewport
    }

    /// Dispose the controller and hand back the output.
    pub fn finish(mut self) -> W {
        self.controller.dispose(&mut self.view);
        self.view.into_inner()
    }

    fn deliver_completions(&mut self, now: Instant) {
        for completion in self.worker.poll_completions() {
            let ticket = completion.ticket;
            let outcome = self
                .controller
                .on_fetch_complete(completion, now, &mut self.view);
            debug!(%ticket, ?outcome, "completion handled");
            if matches!(
                outcome,
                CompletionOutcome::Applied(AggregateOutcome::Replaced(_))
                    | CompletionOutcome::Applied(AggregateOutcome::ShowedEmpty)
            ) {
                self.viewport.reset();
            }
        }
    }

    fn run_commands(&mut self, now: Instant) -> Flow {
        while !self.is_held(now) {
            let Some(parsed) = self.queue.pop_front() else {
                break;
            };
            let command = match parsed {
                Ok(command) => command,
                Err(error) => {
                    warn!(%error, "bad command");
                    self.view.note(&format!("[{error}]"));
                    continue;
                }
            };
            let waits = matches!(command, ShellCommand::Wait(_));
            if self.apply(command, now) == Flow::Quit {
                return Flow::Quit;
            }
            // A wait only starts counting from the next step.
            if waits {
                break;
            }
        }
        Flow::Continue
    }

    fn is_held(&mut self, now: Instant) -> bool {
        let held = match self.hold {
            None => false,
            Some(Hold::Until(deadline)) => now < deadline,
            Some(Hold::UntilSettled) => !self.is_settled(),
        };
        if !held {
            self.hold = None;
        }
        held
    }

    fn apply(&mut self, command: ShellCommand, now: Instant) -> Flow {
        debug!(?command, "command");
        let rows = self.controller.aggregator().len();
        match command {
            ShellCommand::Scroll(ScrollAmount::Rows(delta)) => self.viewport.scroll_by(delta, rows),
            ShellCommand::Scroll(ScrollAmount::Top) => self.viewport.reset(),
            ShellCommand::Scroll(ScrollAmount::End) => self.viewport.scroll_to_end(rows),
            ShellCommand::Hide => self.controller.set_visible(false),
            ShellCommand::Show => self.controller.set_visible(true),
            ShellCommand::Status => {
                let lines = self.status_lines();
                lines.iter().for_each(|line| self.view.note(line));
            }
            ShellCommand::Wait(None) => self.hold = Some(Hold::UntilSettled),
            ShellCommand::Wait(Some(ms)) => {
                self.hold = Some(Hold::Until(now + Duration::from_millis(ms)));
            }
            ShellCommand::Quit => return Flow::Quit,
            criteria => {
                for event in criteria.input_events() {
                    self.controller.handle_input(event, now);
                }
            }
        }
        Flow::Continue
    }

    fn status_lines(&self) -> [String; 2] {
        let session = match self.controller.session() {
            Some(session) => format!(
                "{} {} next={} received={}",
                session.id(),
                format!("{:?}", session.phase()).to_lowercase(),
                session.cursor(),
                session.received()
            ),
            None => "no session".to_string(),
        };
        let stats = self.controller.stats();
        [
            format!(
                "status: {session} shown={} top={} sessions={} pages={} discarded={} failures={}",
                self.controller.aggregator().len(),
                self.viewport.top_row(),
                stats.sessions_started,
                stats.pages_delivered,
                stats.completions_discarded,
                stats.failures
            ),
            format!("criteria: {}", self.controller.criteria()),
        ]
    }
}

/// Build a shell from resolved config and run it over `input`/`out`.
///
/// # Errors
///
/// Returns `AppError` if the input thread cannot start or output fails.
pub fn run_with_io<R, W>(
    source: Arc<dyn DataSource>,
    config: &ResolvedConfig,
    options: ShellOptions,
    input: R,
    out: W,
) -> Result<W, AppError>
where
    R: Read + Send + 'static,
    W: Write,
{
    let controller = SearchController::new(config.controller_config());
    let worker = match config.fetch_timeout() {
        Some(timeout) => FetchWorker::new(source).with_timeout(timeout),
        None => FetchWorker::new(source),
    };
    let mut feed = StdinFeed::from_reader(input)?;
    let mut shell = Shell::new(controller, worker, out, options);

    shell.run(&mut feed)?;
    info!(stats = ?shell.controller().stats(), "shell finished");
    Ok(shell.view.into_inner())
}

/// Run the shell on stdin and stdout.
///
/// Note: Logging must be initialized by caller before calling this function.
///
/// # Errors
///
/// See [`run_with_io`].
pub fn run_with_source(
    source: Arc<dyn DataSource>,
    config: &ResolvedConfig,
    options: ShellOptions,
) -> Result<(), AppError> {
    let _ = run_with_io(source, config, options, io::stdin(), io::stdout().lock())?;
    Ok(())
}

#[cfg(test)]
#[path = "shell_tests.rs"]
mod tests;
