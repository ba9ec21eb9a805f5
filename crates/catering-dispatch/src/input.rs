//! Parsing for the line-oriented submitter.
//!
//! Validation happens here, at the boundary: the dispatch core accepts any name, and
//! any delay up to [`MAX_DELAY`].

use crate::model::MAX_DELAY;
use std::time::Duration;
use thiserror::Error;

pub const USAGE_HINT: &str = "Please enter in format: <order_name> <seconds>, e.g. A 5";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Submit { name: String, delay: Duration },
    Status,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Empty input")]
    Empty,

    #[error("Expected exactly two tokens, got {0:?}")]
    Format(String),

    #[error("Invalid delay {0:?}: expected a whole number of seconds up to one year")]
    InvalidDelay(String),
}

/// Parses one submitter line into a command.
pub fn parse_command(line: &str) -> Result<Command, InputError> {
    match line.trim() {
        "" => Err(InputError::Empty),
        "status" => Ok(Command::Status),
        "quit" | "exit" => Ok(Command::Quit),
        other => {
            let (name, delay) = parse_order_line(other)?;
            Ok(Command::Submit { name, delay })
        }
    }
}

/// Parses `<order_name> <seconds>`.
pub fn parse_order_line(line: &str) -> Result<(String, Duration), InputError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        [] => Err(InputError::Empty),
        [name, seconds] => {
            let delay = seconds
                .parse()
                .map(Duration::from_secs)
                .ok()
                .filter(|delay| *delay <= MAX_DELAY)
                .ok_or_else(|| InputError::InvalidDelay(seconds.to_string()))?;
            Ok((name.to_string(), delay))
        }
        _ => Err(InputError::Format(line.trim().to_string())),
    }
}
