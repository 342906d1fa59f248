//! Line commands of the terminal front end, translated into [`DashboardEvent`]s.

use crate::error::DashboardError;
use crate::pie::page::PieEvent;
use crate::session::{ActivePage, DashboardEvent};
use crate::weather::page::WeatherEvent;
use log::debug;
use std::io::{BufRead, Write};
use thiserror::Error;
use tokio::sync::mpsc;

pub const HELP: &str = "\
Commands:
  page pie|weather     switch page
  category <column>    pie: category column
  value <column>       pie: value column
  donut on|off         pie: donut style
  sort on|off          pie: sort slices by value
  top <n>              pie: show top N, rest grouped as Other
  interval <secs>      weather: refresh interval (10-120)
  auto on|off          weather: auto refresh
  refresh              re-render the current page
  help                 show this text
  quit                 leave";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type 'help' for a list.")]
    Unknown(String),

    #[error("'{command}' expects {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("'{command}' expects {expected}, got '{got}'")]
    InvalidArgument {
        command: &'static str,
        expected: &'static str,
        got: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Event(DashboardEvent),
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let event = match word.to_ascii_lowercase().as_str() {
        "" => return Ok(None),
        "help" | "?" => return Ok(Some(Command::Help)),
        "quit" | "exit" => DashboardEvent::Close,
        "refresh" => DashboardEvent::Weather(WeatherEvent::Refresh),
        "page" => match argument("page", "pie or weather", rest)?
            .to_ascii_lowercase()
            .as_str()
        {
            "pie" => DashboardEvent::ShowPage(ActivePage::Pie),
            "weather" | "live" => DashboardEvent::ShowPage(ActivePage::Weather),
            other => {
                return Err(CommandError::InvalidArgument {
                    command: "page",
                    expected: "pie or weather",
                    got: other.to_string(),
                })
            }
        },
        "category" => DashboardEvent::Pie(PieEvent::SelectCategory(
            argument("category", "a column name", rest)?.to_string(),
        )),
        "value" => DashboardEvent::Pie(PieEvent::SelectValue(
            argument("value", "a column name", rest)?.to_string(),
        )),
        "donut" => DashboardEvent::Pie(PieEvent::SetDonut(switch("donut", rest)?)),
        "sort" => DashboardEvent::Pie(PieEvent::SetSortDesc(switch("sort", rest)?)),
        "top" => DashboardEvent::Pie(PieEvent::SetTopN(number("top", rest)? as usize)),
        "interval" => DashboardEvent::Weather(WeatherEvent::SetInterval(number("interval", rest)?)),
        "auto" => DashboardEvent::Weather(WeatherEvent::SetAutoRefresh(switch("auto", rest)?)),
        _ => return Err(CommandError::Unknown(word.to_string())),
    };
    Ok(Some(Command::Event(event)))
}

/// Feeds `input` lines into a session until end of input, then sends
/// [`DashboardEvent::Close`]. Help text and parse errors go to `replies`.
///
/// Blocks the calling thread; run it off the async runtime.
///
/// # Errors
///
/// Returns [`DashboardError::Terminal`] if reading `input` or writing `replies` fails.
/// The session is closed in that case too.
pub fn read_commands(
    input: impl BufRead,
    mut replies: impl Write,
    sender: mpsc::Sender<DashboardEvent>,
) -> Result<(), DashboardError> {
    let result = forward_lines(input, &mut replies, &sender);
    if sender.blocking_send(DashboardEvent::Close).is_err() {
        debug!("Session already closed");
    }
    result
}

fn forward_lines(
    input: impl BufRead,
    replies: &mut impl Write,
    sender: &mpsc::Sender<DashboardEvent>,
) -> Result<(), DashboardError> {
    for line in input.lines() {
        let line = line.map_err(DashboardError::Terminal)?;
        match parse_command(&line) {
            Ok(Some(Command::Event(event))) => {
                if sender.blocking_send(event).is_err() {
                    debug!("Session ended, no longer reading input");
                    return Ok(());
                }
            }
            Ok(Some(Command::Help)) => writeln!(replies, "{HELP}").map_err(DashboardError::Terminal)?,
            Ok(None) => {}
            Err(e) => writeln!(replies, "{e}").map_err(DashboardError::Terminal)?,
        }
    }
    Ok(())
}

fn argument<'a>(
    command: &'static str,
    expected: &'static str,
    rest: &'a str,
) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument { command, expected })
    } else {
        Ok(rest)
    }
}

fn switch(command: &'static str, rest: &str) -> Result<bool, CommandError> {
    const EXPECTED: &str = "on or off";
    match argument(command, EXPECTED, rest)?.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        other => Err(CommandError::InvalidArgument {
            command,
            expected: EXPECTED,
            got: other.to_string(),
        }),
    }
}

fn number(command: &'static str, rest: &str) -> Result<u64, CommandError> {
    const EXPECTED: &str = "a whole number";
    let raw = argument(command, EXPECTED, rest)?;
    raw.parse().map_err(|_| CommandError::InvalidArgument {
        command,
        expected: EXPECTED,
        got: raw.to_string(),
    })
}
