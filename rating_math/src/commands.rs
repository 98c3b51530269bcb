use std::fmt;
use std::str::FromStr;

use crate::rating::{Rating, RatingShape};

/// Which records an operator action applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSelector {
    All,
    Id(u32),
    Name(String),
    Shape(RatingShape),
}

impl fmt::Display for RecordSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordSelector::All => f.write_str("all"),
            RecordSelector::Id(id) => write!(f, "#{id}"),
            RecordSelector::Name(name) => f.write_str(name),
            RecordSelector::Shape(shape) => write!(f, "shape:{}", shape.positions()),
        }
    }
}

impl FromStr for RecordSelector {
    type Err = String;

    /// `all`, `#<id>`, `shape:<2|3|4>`, otherwise a record name.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let token = token.trim();
        if token.is_empty() {
            return Err(token.to_string());
        }
        if token.eq_ignore_ascii_case("all") {
            return Ok(RecordSelector::All);
        }
        if let Some(id) = token.strip_prefix('#') {
            return id
                .parse::<u32>()
                .map(RecordSelector::Id)
                .map_err(|_| token.to_string());
        }
        if let Some(positions) = token.strip_prefix("shape:") {
            return positions
                .parse::<usize>()
                .ok()
                .and_then(RatingShape::from_positions)
                .map(RecordSelector::Shape)
                .ok_or_else(|| token.to_string());
        }
        Ok(RecordSelector::Name(token.to_string()))
    }
}

/// Supported operator commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandPayload {
    Cycle {
        steps: u32,
    },
    Modify {
        selector: RecordSelector,
        delta: i32,
    },
    Check {
        selector: RecordSelector,
        difficulty: u8,
    },
    Show {
        selector: RecordSelector,
    },
    Spawn {
        name: String,
        rating: Rating,
    },
}
