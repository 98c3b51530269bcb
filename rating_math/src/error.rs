use thiserror::Error;

use crate::rating::RawRating;

/// Failure raised at the validation boundary of the rating types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RatingError {
    #[error("digit {0} is outside 1..=6")]
    InvalidDigit(i32),
    #[error(
        "invalid rating {}:{}:{}:{}",
        .0.tier,
        .0.degree,
        .0.minute,
        .0.second
    )]
    InvalidRating(RawRating),
    #[error("cannot parse rating '{0}'")]
    Parse(String),
}
