//! Senary arithmetic over [`Rating`] values.
//!
//! Steps carry and borrow across the positions a rating actually carries,
//! least significant first. Incrementing resets subordinate positions to 1,
//! decrementing resets them to 6, so repeated steps walk every value of a
//! shape in order without gaps. A step past either end of the range leaves
//! the rating unchanged.

use crate::rating::{Digit, RawRating, Rating};

/// True iff `n` is a usable digit value.
pub fn validate_digit(n: i32) -> bool {
    Digit::from_i32(n).is_some()
}

/// Range check over an authored rating. Absent (`0`) trailing positions are
/// accepted; the minute-before-second rule is enforced by
/// `Rating::try_from` instead.
pub fn validate(raw: &RawRating) -> bool {
    validate_digit(raw.tier)
        && validate_digit(raw.degree)
        && (raw.minute == 0 || validate_digit(raw.minute))
        && (raw.second == 0 || validate_digit(raw.second))
}

/// Every present position sits at 6.
pub fn is_max_value(rating: &Rating) -> bool {
    rating.tier() == Digit::MAX
        && rating.degree() == Digit::MAX
        && rating.minute().map_or(true, |minute| minute == Digit::MAX)
        && rating.second().map_or(true, |second| second == Digit::MAX)
}

/// Every present position sits at 1.
pub fn is_min_value(rating: &Rating) -> bool {
    rating.tier() == Digit::MIN
        && rating.degree() == Digit::MIN
        && rating.minute().map_or(true, |minute| minute == Digit::MIN)
        && rating.second().map_or(true, |second| second == Digit::MIN)
}

/// Direction of a single step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Up,
    Down,
}

impl Step {
    pub fn delta(self) -> i32 {
        match self {
            Step::Up => 1,
            Step::Down => -1,
        }
    }

    /// Value subordinate positions take after a carry or borrow.
    pub fn reset(self) -> Digit {
        match self {
            Step::Up => Digit::MIN,
            Step::Down => Digit::MAX,
        }
    }
}

/// One step with carry/borrow, or `None` when no present position can move.
pub fn try_bump(rating: Rating, reset: Digit, step: Step) -> Option<Rating> {
    let delta = step.delta();
    let (tier, degree, minute, second) = (
        rating.tier(),
        rating.degree(),
        rating.minute(),
        rating.second(),
    );
    let reset_present = |position: Option<Digit>| position.map(|_| reset);

    if let Some(next) = second.and_then(|s| s.offset(delta)) {
        return Some(rating.with_positions(tier, degree, minute, Some(next)));
    }
    if let Some(next) = minute.and_then(|m| m.offset(delta)) {
        return Some(rating.with_positions(tier, degree, Some(next), reset_present(second)));
    }
    if let Some(next) = degree.offset(delta) {
        return Some(rating.with_positions(
            tier,
            next,
            reset_present(minute),
            reset_present(second),
        ));
    }
    if let Some(next) = tier.offset(delta) {
        return Some(rating.with_positions(
            next,
            reset,
            reset_present(minute),
            reset_present(second),
        ));
    }
    None
}

/// One step with carry/borrow; a step out of range returns the input.
pub fn bump(rating: Rating, reset: Digit, step: Step) -> Rating {
    try_bump(rating, reset, step).unwrap_or(rating)
}

pub fn add(rating: Rating, count: u32) -> Rating {
    step_many(rating, count, Step::Up).rating
}

/// `count` is the magnitude of the negative delta.
pub fn subtract(rating: Rating, count: u32) -> Rating {
    step_many(rating, count, Step::Down).rating
}

/// Result of applying a signed delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeltaOutcome {
    pub rating: Rating,
    /// Steps that actually moved the rating.
    pub applied: u32,
    /// The rating hit the end of its range before the delta was used up.
    pub saturated: bool,
}

pub fn apply_delta(rating: Rating, delta: i32) -> DeltaOutcome {
    let step = if delta < 0 { Step::Down } else { Step::Up };
    step_many(rating, delta.unsigned_abs(), step)
}

fn step_many(mut rating: Rating, count: u32, step: Step) -> DeltaOutcome {
    // Once a step fails every later step fails too.
    for applied in 0..count {
        match try_bump(rating, step.reset(), step) {
            Some(next) => rating = next,
            None => {
                return DeltaOutcome {
                    rating,
                    applied,
                    saturated: true,
                }
            }
        }
    }
    DeltaOutcome {
        rating,
        applied: count,
        saturated: false,
    }
}
