use std::num::ParseIntError;

use thiserror::Error;

use crate::{CommandPayload, Rating, RatingError, RecordSelector};

#[derive(Debug, Error)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("invalid integer '{value}' for {context}: {source}")]
    InvalidInteger {
        value: String,
        context: &'static str,
        source: ParseIntError,
    },
    #[error("invalid selector '{0}'")]
    InvalidSelector(String),
    #[error(transparent)]
    InvalidRating(#[from] RatingError),
}

pub fn parse_command_line(input: &str) -> Result<CommandPayload, CommandParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CommandParseError::Empty);
    }

    let mut parts = trimmed.split_whitespace();
    let verb = parts
        .next()
        .map(|v| v.to_ascii_lowercase())
        .ok_or(CommandParseError::Empty)?;

    match verb.as_str() {
        "cycle" | "tick" => {
            let steps_str = parts.next().unwrap_or("1");
            let steps = parse_u32(steps_str, "cycle steps")?;
            Ok(CommandPayload::Cycle { steps })
        }
        "modify" | "mod" => {
            let selector_str = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("selector"))?;
            let delta_str = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("delta"))?;
            let selector = parse_selector(selector_str)?;
            let delta = parse_i32(delta_str, "modifier delta")?;
            Ok(CommandPayload::Modify { selector, delta })
        }
        "check" => {
            let selector_str = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("selector"))?;
            let difficulty_str = parts.next().unwrap_or("1");
            let selector = parse_selector(selector_str)?;
            let difficulty = parse_u8(difficulty_str, "check difficulty")?;
            Ok(CommandPayload::Check {
                selector,
                difficulty,
            })
        }
        "show" => {
            let selector = parse_selector(parts.next().unwrap_or("all"))?;
            Ok(CommandPayload::Show { selector })
        }
        "spawn" => {
            let name = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("name"))?;
            let rating_str = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("rating"))?;
            let rating: Rating = rating_str.parse()?;
            Ok(CommandPayload::Spawn {
                name: name.to_string(),
                rating,
            })
        }
        other => Err(CommandParseError::UnknownCommand(other.to_string())),
    }
}

fn parse_selector(token: &str) -> Result<RecordSelector, CommandParseError> {
    token.parse().map_err(CommandParseError::InvalidSelector)
}

fn parse_u8(value: &str, context: &'static str) -> Result<u8, CommandParseError> {
    value
        .parse::<u8>()
        .map_err(|source| CommandParseError::InvalidInteger {
            value: value.to_string(),
            context,
            source,
        })
}

fn parse_u32(value: &str, context: &'static str) -> Result<u32, CommandParseError> {
    value
        .parse::<u32>()
        .map_err(|source| CommandParseError::InvalidInteger {
            value: value.to_string(),
            context,
            source,
        })
}

fn parse_i32(value: &str, context: &'static str) -> Result<i32, CommandParseError> {
    value
        .parse::<i32>()
        .map_err(|source| CommandParseError::InvalidInteger {
            value: value.to_string(),
            context,
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RatingShape;

    #[test]
    fn parses_modify_and_check() {
        assert_eq!(
            parse_command_line("modify all -3").unwrap(),
            CommandPayload::Modify {
                selector: RecordSelector::All,
                delta: -3,
            }
        );
        assert_eq!(
            parse_command_line("CHECK shape:4 3").unwrap(),
            CommandPayload::Check {
                selector: RecordSelector::Shape(RatingShape::Four),
                difficulty: 3,
            }
        );
        assert_eq!(
            parse_command_line("check #2").unwrap(),
            CommandPayload::Check {
                selector: RecordSelector::Id(2),
                difficulty: 1,
            }
        );
    }

    #[test]
    fn parses_cycle_show_and_spawn() {
        assert_eq!(
            parse_command_line("cycle").unwrap(),
            CommandPayload::Cycle { steps: 1 }
        );
        assert_eq!(
            parse_command_line("  cycle 12 ").unwrap(),
            CommandPayload::Cycle { steps: 12 }
        );
        assert_eq!(
            parse_command_line("show").unwrap(),
            CommandPayload::Show {
                selector: RecordSelector::All
            }
        );
        assert_eq!(
            parse_command_line("spawn scout 3:4:1").unwrap(),
            CommandPayload::Spawn {
                name: "scout".to_string(),
                rating: "3:4:1".parse().unwrap(),
            }
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            parse_command_line("   "),
            Err(CommandParseError::Empty)
        ));
        assert!(matches!(
            parse_command_line("explode"),
            Err(CommandParseError::UnknownCommand(_))
        ));
        assert!(matches!(
            parse_command_line("modify all"),
            Err(CommandParseError::MissingArgument("delta"))
        ));
        assert!(matches!(
            parse_command_line("check all -1"),
            Err(CommandParseError::InvalidInteger { .. })
        ));
        assert!(matches!(
            parse_command_line("modify #nope 1"),
            Err(CommandParseError::InvalidSelector(_))
        ));
        assert!(matches!(
            parse_command_line("spawn scout 7:1"),
            Err(CommandParseError::InvalidRating(_))
        ));
    }
}
