//!
//! Line protocol: one request per line, one response line per request.
//!
//! | request             | success                        | failure |
//! |---------------------|--------------------------------|---------|
//! | `i <id> <parent>`   | `0 <depth>`                    | `1`     |
//! | `l <id>`            | `0 <leader id> <leader depth>` | `1`     |
//! | `c <id> <max>`      | `0 <id> <id> ...`              | `1`     |
//!
//! Lines matching none of the above are answered with [`STATUS_MALFORMED`].
//!
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

use kchain_consensus::model::block::BlockId;

pub const STATUS_OK: u8 = 0;
pub const STATUS_FAILURE: u8 = 1;
pub const STATUS_MALFORMED: u8 = 255;

// The command letter may be followed by any amount of whitespace, but the two
// arguments of `i` and `c` are separated by exactly one whitespace character.
// Unicode is disabled so `\s` only matches ASCII whitespace.
static INSERT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?-u)^\s*i\s+([0-9]+)\s([0-9]+)\s*$").unwrap());
static LEADER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?-u)^\s*l\s+([0-9]+)\s*$").unwrap());
static CHAIN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?-u)^\s*c\s+([0-9]+)\s([0-9]+)\s*$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Insert { id: BlockId, parent: BlockId },
    Leader { id: BlockId },
    Chain { id: BlockId, max: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unrecognized command {0:?}")]
    Unrecognized(String),

    #[error("number {0} is out of range")]
    OutOfRange(String),
}

impl FromStr for Request {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        if let Some(caps) = INSERT_PATTERN.captures(line) {
            Ok(Request::Insert { id: parse_number(&caps, 1)?, parent: parse_number(&caps, 2)? })
        } else if let Some(caps) = LEADER_PATTERN.captures(line) {
            Ok(Request::Leader { id: parse_number(&caps, 1)? })
        } else if let Some(caps) = CHAIN_PATTERN.captures(line) {
            Ok(Request::Chain { id: parse_number(&caps, 1)?, max: parse_number(&caps, 2)? })
        } else {
            Err(ParseError::Unrecognized(line.trim_end().to_string()))
        }
    }
}

fn parse_number<T: FromStr>(caps: &Captures<'_>, group: usize) -> Result<T, ParseError> {
    let digits = caps.get(group).map_or("", |m| m.as_str());
    digits.parse().map_err(|_| ParseError::OutOfRange(digits.to_string()))
}

/// A response line: status `0` followed by the result items, or a bare failure status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Items(Vec<u64>),
    Failure(u8),
}

impl Response {
    /// Builds a success response, falling back to the generic failure when there is
    /// nothing to report (e.g. a chain query with `max` 0)
    pub fn from_items(items: Vec<u64>) -> Self {
        if items.is_empty() { Response::Failure(STATUS_FAILURE) } else { Response::Items(items) }
    }

    pub fn status(&self) -> u8 {
        match self {
            Response::Items(_) => STATUS_OK,
            Response::Failure(status) => *status,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == STATUS_OK
    }
}

impl Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Response::Items(items) => write!(f, "{} {}", STATUS_OK, items.iter().join(" ")),
            Response::Failure(status) => write!(f, "{}", status),
        }
    }
}
