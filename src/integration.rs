//! Pure core integration functions.
//!
//! This module contains pure functions that turn raw shell input into
//! controller events for the main event loop. These functions are testable
//! without needing actual I/O.

use crate::model::{CommandError, FilterValue, SortDirection, SortField};
use crate::state::InputEvent;

/// How far a `scroll` command moves the simulated viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAmount {
    /// Relative move in rows; negative scrolls up.
    Rows(isize),
    /// `scroll top`
    Top,
    /// `scroll end`
    End,
}

/// One line of shell input, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// `query <text>`; the rest of the line, verbatim.
    Query(String),
    /// `ruleset <name>`, or `None` for `any`.
    Ruleset(Option<FilterValue>),
    /// `category <name>`, or `None` for `any`.
    Category(Option<FilterValue>),
    /// `sort <field> [asc|desc]`
    Sort {
        /// Field to sort by.
        field: SortField,
        /// Direction, when given.
        direction: Option<SortDirection>,
    },
    /// `dir asc|desc`
    Direction(SortDirection),
    /// `scroll <rows|top|end>`
    Scroll(ScrollAmount),
    /// `hide`
    Hide,
    /// `show`
    Show,
    /// `status`
    Status,
    /// Hold further commands for this many milliseconds, or until nothing
    /// is pending or outstanding when `None`.
    Wait(Option<u64>),
    /// `quit`
    Quit,
}

impl ShellCommand {
    /// Criteria changes carried by this command, in application order.
    pub fn input_events(&self) -> Vec<InputEvent> {
        match self {
            ShellCommand::Query(text) => vec![InputEvent::QueryChanged(text.clone())],
            ShellCommand::Ruleset(value) => vec![InputEvent::RulesetChanged(value.clone())],
            ShellCommand::Category(value) => vec![InputEvent::CategoryChanged(value.clone())],
            ShellCommand::Sort { field, direction } => {
                let mut events = vec![InputEvent::SortFieldChanged(*field)];
                if let Some(direction) = direction {
                    events.push(InputEvent::SortDirectionChanged(*direction));
                }
                events
            }
            ShellCommand::Direction(direction) => {
                vec![InputEvent::SortDirectionChanged(*direction)]
            }
            ShellCommand::Scroll(_)
            | ShellCommand::Hide
            | ShellCommand::Show
            | ShellCommand::Status
            | ShellCommand::Wait(_)
            | ShellCommand::Quit => Vec::new(),
        }
    }
}

/// Parse one command line.
///
/// The first word names the command (case-insensitive); the rest of the
/// line is its argument. `query` keeps its argument verbatim, so
/// `query` alone clears the search text.
///
/// # Errors
///
/// Returns `CommandError` for unknown commands, missing arguments and
/// arguments that do not parse.
pub fn parse_command(line: &str) -> Result<ShellCommand, CommandError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "query" | "q" => Ok(ShellCommand::Query(rest.to_string())),
        "ruleset" => parse_filter("ruleset", rest).map(ShellCommand::Ruleset),
        "category" => parse_filter("category", rest).map(ShellCommand::Category),
        "sort" => parse_sort(rest),
        "dir" | "direction" => {
            let arg = required("dir", rest)?;
            let direction = arg.parse().map_err(|e| invalid("dir", e))?;
            Ok(ShellCommand::Direction(direction))
        }
        "scroll" => parse_scroll(rest).map(ShellCommand::Scroll),
        "hide" => Ok(ShellCommand::Hide),
        "show" => Ok(ShellCommand::Show),
        "status" => Ok(ShellCommand::Status),
        "wait" if rest.is_empty() => Ok(ShellCommand::Wait(None)),
        "wait" => rest
            .parse()
            .map(|ms| ShellCommand::Wait(Some(ms)))
            .map_err(|e| invalid("wait", e)),
        "quit" | "exit" => Ok(ShellCommand::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

/// Parse one input line; `None` for blanks and `#` comments.
pub fn parse_line(line: &str) -> Option<Result<ShellCommand, CommandError>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        None
    } else {
        Some(parse_command(line))
    }
}

/// Parse a batch of lines, skipping blanks and `#` comments.
///
/// # Returns
///
/// Tuple of (parsed commands, errors), each in input order.
pub fn process_lines<I, S>(lines: I) -> (Vec<ShellCommand>, Vec<CommandError>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut commands = Vec::new();
    let mut errors = Vec::new();

    for line in lines {
        match parse_line(line.as_ref()) {
            Some(Ok(command)) => commands.push(command),
            Some(Err(err)) => errors.push(err),
            None => {}
        }
    }

    (commands, errors)
}

fn required<'a>(command: &'static str, rest: &'a str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument { command })
    } else {
        Ok(rest)
    }
}

fn invalid(command: &'static str, reason: impl ToString) -> CommandError {
    CommandError::InvalidArgument {
        command,
        reason: reason.to_string(),
    }
}

fn parse_filter(command: &'static str, rest: &str) -> Result<Option<FilterValue>, CommandError> {
    let arg = required(command, rest)?;
    if arg.eq_ignore_ascii_case("any") {
        return Ok(None);
    }
    FilterValue::new(arg)
        .map(Some)
        .map_err(|e| invalid(command, e))
}

fn parse_sort(rest: &str) -> Result<ShellCommand, CommandError> {
    let arg = required("sort", rest)?;
    let mut parts = arg.split_whitespace();
    let field = parts
        .next()
        .ok_or(CommandError::MissingArgument { command: "sort" })?
        .parse()
        .map_err(|e| invalid("sort", e))?;
    let direction = parts
        .next()
        .map(str::parse)
        .transpose()
        .map_err(|e| invalid("sort", e))?;
    if let Some(extra) = parts.next() {
        return Err(invalid("sort", format!("unexpected `{extra}`")));
    }
    Ok(ShellCommand::Sort { field, direction })
}

fn parse_scroll(rest: &str) -> Result<ScrollAmount, CommandError> {
    let arg = required("scroll", rest)?;
    match arg.to_ascii_lowercase().as_str() {
        "end" | "bottom" => Ok(ScrollAmount::End),
        "top" | "start" => Ok(ScrollAmount::Top),
        rows => rows
            .parse::<isize>()
            .map(ScrollAmount::Rows)
            .map_err(|e| invalid("scroll", e)),
    }
}
