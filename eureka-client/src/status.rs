//! Instance status values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a registered instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Registered but not yet serving; the status of a fresh registration.
    Starting,
    Up,
    Down,
    OutOfService,
    Unknown,
}

impl Status {
    /// Wire name (`UP`, `OUT_OF_SERVICE`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Starting => "STARTING",
            Status::Up => "UP",
            Status::Down => "DOWN",
            Status::OutOfService => "OUT_OF_SERVICE",
            Status::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown instance status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for Status {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STARTING" => Ok(Status::Starting),
            "UP" => Ok(Status::Up),
            "DOWN" => Ok(Status::Down),
            "OUT_OF_SERVICE" => Ok(Status::OutOfService),
            "UNKNOWN" => Ok(Status::Unknown),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}
