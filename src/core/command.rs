//! REPL command grammar
//!
//! ```text
//! ai = 0.3 | ai: 0.3 | set ai 0.3     write one component
//! get ai                              read one component
//! register warp [0.5]                 add a component
//! strategy balanced                   switch aggregation strategy
//! harmonize 0.7                       set every component
//! emergency [reason ...]              reset to baseline
//! status | audit | help | quit
//! ```

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use crate::types::{AggregationStrategy, ParseStrategyError};

lazy_static! {
    /// `<id> = <level>` or `<id>: <level>`
    static ref RE_ASSIGN: Regex = Regex::new(
        r"^(?P<id>[A-Za-z_][\w.-]*)\s*[:=]\s*(?P<level>\S+)$"
    ).unwrap();

    /// `<verb> [args...]`
    static ref RE_VERB: Regex = Regex::new(
        r"^(?P<verb>[A-Za-z]+)(?:\s+(?P<rest>.*))?$"
    ).unwrap();

    /// Component identifier
    static ref RE_ID: Regex = Regex::new(r"^[A-Za-z_][\w.-]*$").unwrap();
}

/// One parsed REPL line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Set { component_id: String, level: f64 },
    Get { component_id: String },
    Register { component_id: String, level: Option<f64> },
    Strategy(AggregationStrategy),
    Harmonize(f64),
    Emergency { reason: String },
    Status,
    Audit,
    Help,
    Quit,
}

/// Why a line could not be parsed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}' (type 'help')")]
    Unknown(String),

    #[error("'{0}' is not a number")]
    InvalidNumber(String),

    #[error("'{0}' is not a valid component id")]
    InvalidComponent(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    Strategy(#[from] ParseStrategyError),
}

/// Reason used when `emergency` is given without one
pub const DEFAULT_EMERGENCY_REASON: &str = "manual";

/// Help text for the REPL
pub const HELP: &str = "\
Commands:
  <id> = <level>        set a component (also '<id>: <level>' or 'set <id> <level>')
  get <id>              show a component level
  register <id> [level] add a component (baseline when level omitted)
  strategy <name>       conservative | balanced | performance
  harmonize <level>     set every component to <level>
  emergency [reason]    reset every component to the baseline
  status                show the system snapshot
  audit                 show the audit log
  quit                  leave";

/// Parser for REPL lines
#[derive(Debug, Default)]
pub struct CommandParser;

impl CommandParser {
    /// Create new parser
    pub fn new() -> Self {
        Self
    }

    /// Parse one line
    pub fn parse(&self, line: &str) -> Result<Command, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandError::Empty);
        }

        if let Some(caps) = RE_ASSIGN.captures(line) {
            return Ok(Command::Set {
                component_id: caps["id"].to_string(),
                level: parse_level(&caps["level"])?,
            });
        }

        let caps = RE_VERB
            .captures(line)
            .ok_or_else(|| CommandError::Unknown(line.to_string()))?;
        let verb = caps["verb"].to_ascii_lowercase();
        let args: Vec<&str> = caps
            .name("rest")
            .map(|m| m.as_str().split_whitespace().collect())
            .unwrap_or_default();

        match (verb.as_str(), args.as_slice()) {
            ("set", [id, level]) => Ok(Command::Set {
                component_id: parse_id(id)?,
                level: parse_level(level)?,
            }),
            ("set", _) => Err(CommandError::Usage("set <id> <level>")),

            ("get", [id]) => Ok(Command::Get { component_id: parse_id(id)? }),
            ("get", _) => Err(CommandError::Usage("get <id>")),

            ("register", [id]) => Ok(Command::Register {
                component_id: parse_id(id)?,
                level: None,
            }),
            ("register", [id, level]) => Ok(Command::Register {
                component_id: parse_id(id)?,
                level: Some(parse_level(level)?),
            }),
            ("register", _) => Err(CommandError::Usage("register <id> [level]")),

            ("strategy", [name]) => Ok(Command::Strategy(name.parse()?)),
            ("strategy", _) => Err(CommandError::Usage("strategy <conservative|balanced|performance>")),

            ("harmonize", [level]) => Ok(Command::Harmonize(parse_level(level)?)),
            ("harmonize", _) => Err(CommandError::Usage("harmonize <level>")),

            ("emergency", []) => Ok(Command::Emergency {
                reason: DEFAULT_EMERGENCY_REASON.to_string(),
            }),
            ("emergency", words) => Ok(Command::Emergency { reason: words.join(" ") }),

            ("status", []) => Ok(Command::Status),
            ("audit", []) => Ok(Command::Audit),
            ("help", _) => Ok(Command::Help),
            ("quit", []) | ("exit", []) => Ok(Command::Quit),

            _ => Err(CommandError::Unknown(line.to_string())),
        }
    }
}

fn parse_level(raw: &str) -> Result<f64, CommandError> {
    raw.parse::<f64>()
        .map_err(|_| CommandError::InvalidNumber(raw.to_string()))
}

/// Component ids: a letter or underscore, then word characters, `.` or `-`.
/// Shared by every entry point that registers components.
pub fn is_valid_component_id(id: &str) -> bool {
    RE_ID.is_match(id)
}

fn parse_id(raw: &str) -> Result<String, CommandError> {
    if is_valid_component_id(raw) {
        Ok(raw.to_string())
    } else {
        Err(CommandError::InvalidComponent(raw.to_string()))
    }
}

// =============================================================================
// TESTS
// =============================================================================
