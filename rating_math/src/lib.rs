//! Rating arithmetic and check resolution for the Esoteric dice mechanic.
//!
//! This crate holds the pure pieces: the [`Rating`] numeral, carry/borrow
//! arithmetic over it, the outcome cascade, per-record dice and the operator
//! command text. The batch engine that drives them lives in `rating_sim`.

pub mod arithmetic;
mod command_text;
mod commands;
pub mod dice;
mod error;
mod rating;
pub mod resolution;

pub use arithmetic::{
    add, apply_delta, bump, is_max_value, is_min_value, subtract, try_bump, validate,
    validate_digit, DeltaOutcome, Step,
};
pub use command_text::{parse_command_line, CommandParseError};
pub use commands::{CommandPayload, RecordSelector};
pub use dice::{roll_for, roll_full, DieSource, Roller};
pub use error::RatingError;
pub use rating::{Digit, RawRating, Rating, RatingShape};
pub use resolution::{resolve, resolve_with_domain, Level, DEFAULT_DIFFICULTY};
