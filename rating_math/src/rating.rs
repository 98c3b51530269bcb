use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::arithmetic::validate;
use crate::error::RatingError;

/// A single senary position, always in `1..=6`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digit(u8);

impl Digit {
    pub const MIN: Digit = Digit(1);
    pub const MAX: Digit = Digit(6);
    /// Every digit, ascending.
    pub const ALL: [Digit; 6] = [Digit(1), Digit(2), Digit(3), Digit(4), Digit(5), Digit(6)];

    pub fn new(value: u8) -> Result<Self, RatingError> {
        Self::from_i32(i32::from(value)).ok_or(RatingError::InvalidDigit(i32::from(value)))
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        if (1..=6).contains(&value) {
            Some(Self(value as u8))
        } else {
            None
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Move one place up or down, `None` when that leaves `1..=6`.
    pub fn offset(self, delta: i32) -> Option<Self> {
        Self::from_i32(i32::from(self.0) + delta)
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How many positions a rating carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RatingShape {
    Two,
    Three,
    Four,
}

impl RatingShape {
    pub fn positions(self) -> usize {
        match self {
            RatingShape::Two => 2,
            RatingShape::Three => 3,
            RatingShape::Four => 4,
        }
    }

    pub fn from_positions(positions: usize) -> Option<Self> {
        match positions {
            2 => Some(RatingShape::Two),
            3 => Some(RatingShape::Three),
            4 => Some(RatingShape::Four),
            _ => None,
        }
    }
}

/// A senary value of 2-4 positions, each from 1-6.
///
/// Positions are, most significant first, Tier, Degree, Minute and Second.
/// Minute and Second are optional; a Second can only be present alongside a
/// Minute. Ratings are written `T:D`, `T:D:M` or `T:D:M:S`.
///
/// Ordering is lexicographic over the four positions with an absent
/// position sorting below every digit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Rating {
    tier: Digit,
    degree: Digit,
    minute: Option<Digit>,
    second: Option<Digit>,
}

impl Rating {
    /// The universal botch roll, `6:6`.
    pub const BOTCH: Rating = Rating {
        tier: Digit::MAX,
        degree: Digit::MAX,
        minute: None,
        second: None,
    };

    pub fn from_digits(
        tier: Digit,
        degree: Digit,
        minute: Option<Digit>,
        second: Option<Digit>,
    ) -> Result<Self, RatingError> {
        if second.is_some() && minute.is_none() {
            return Err(RatingError::InvalidRating(RawRating {
                tier: i32::from(tier.get()),
                degree: i32::from(degree.get()),
                minute: 0,
                second: second.map_or(0, |digit| i32::from(digit.get())),
            }));
        }
        Ok(Self {
            tier,
            degree,
            minute,
            second,
        })
    }

    pub fn two(tier: u8, degree: u8) -> Result<Self, RatingError> {
        Self::from_digits(Digit::new(tier)?, Digit::new(degree)?, None, None)
    }

    pub fn three(tier: u8, degree: u8, minute: u8) -> Result<Self, RatingError> {
        Self::from_digits(
            Digit::new(tier)?,
            Digit::new(degree)?,
            Some(Digit::new(minute)?),
            None,
        )
    }

    pub fn four(tier: u8, degree: u8, minute: u8, second: u8) -> Result<Self, RatingError> {
        Self::from_digits(
            Digit::new(tier)?,
            Digit::new(degree)?,
            Some(Digit::new(minute)?),
            Some(Digit::new(second)?),
        )
    }

    /// A four-position rating; always well formed.
    pub fn from_four(tier: Digit, degree: Digit, minute: Digit, second: Digit) -> Self {
        Self {
            tier,
            degree,
            minute: Some(minute),
            second: Some(second),
        }
    }

    /// Every present position at `digit`.
    pub fn filled(shape: RatingShape, digit: Digit) -> Self {
        Self {
            tier: digit,
            degree: digit,
            minute: (shape != RatingShape::Two).then_some(digit),
            second: (shape == RatingShape::Four).then_some(digit),
        }
    }

    pub fn tier(&self) -> Digit {
        self.tier
    }

    pub fn degree(&self) -> Digit {
        self.degree
    }

    pub fn minute(&self) -> Option<Digit> {
        self.minute
    }

    pub fn second(&self) -> Option<Digit> {
        self.second
    }

    pub fn shape(&self) -> RatingShape {
        match (self.minute, self.second) {
            (None, _) => RatingShape::Two,
            (Some(_), None) => RatingShape::Three,
            (Some(_), Some(_)) => RatingShape::Four,
        }
    }

    /// Drop the positions that `shape` does not carry. Never adds positions.
    pub fn truncate_to(self, shape: RatingShape) -> Self {
        match shape {
            RatingShape::Two => Self {
                minute: None,
                second: None,
                ..self
            },
            RatingShape::Three => Self {
                second: None,
                ..self
            },
            RatingShape::Four => self,
        }
    }

    pub(crate) fn with_positions(
        self,
        tier: Digit,
        degree: Digit,
        minute: Option<Digit>,
        second: Option<Digit>,
    ) -> Self {
        debug_assert_eq!(minute.is_some(), self.minute.is_some());
        debug_assert_eq!(second.is_some(), self.second.is_some());
        Self {
            tier,
            degree,
            minute,
            second,
        }
    }

    /// Render the rating; `show_all` prints every position with `0` for
    /// absent ones.
    pub fn label(&self, show_all: bool) -> String {
        if show_all {
            let raw = RawRating::from(*self);
            return format!("{}:{}:{}:{}", raw.tier, raw.degree, raw.minute, raw.second);
        }
        self.to_string()
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tier, self.degree)?;
        if let Some(minute) = self.minute {
            write!(f, ":{minute}")?;
            if let Some(second) = self.second {
                write!(f, ":{second}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for Rating {
    type Err = RatingError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let parse_error = || RatingError::Parse(trimmed.to_string());
        let digits = trimmed
            .split(':')
            .map(|part| part.trim().parse::<u8>().ok().and_then(|v| Digit::new(v).ok()))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(parse_error)?;
        match digits.as_slice() {
            [tier, degree] => Self::from_digits(*tier, *degree, None, None),
            [tier, degree, minute] => Self::from_digits(*tier, *degree, Some(*minute), None),
            [tier, degree, minute, second] => {
                Self::from_digits(*tier, *degree, Some(*minute), Some(*second))
            }
            _ => Err(parse_error()),
        }
    }
}

impl From<Rating> for String {
    fn from(rating: Rating) -> Self {
        rating.to_string()
    }
}

impl TryFrom<String> for Rating {
    type Error = RatingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Authoring form of a rating: four plain integers, `0` marking an absent
/// position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRating {
    pub tier: i32,
    pub degree: i32,
    pub minute: i32,
    pub second: i32,
}

impl From<Rating> for RawRating {
    fn from(rating: Rating) -> Self {
        let value = |digit: Option<Digit>| digit.map_or(0, |d| i32::from(d.get()));
        Self {
            tier: i32::from(rating.tier.get()),
            degree: i32::from(rating.degree.get()),
            minute: value(rating.minute),
            second: value(rating.second),
        }
    }
}

impl TryFrom<RawRating> for Rating {
    type Error = RatingError;

    fn try_from(raw: RawRating) -> Result<Self, Self::Error> {
        let invalid = RatingError::InvalidRating(raw);
        if !validate(&raw) {
            return Err(invalid);
        }
        // Past validation, a position that is not a digit is the absent `0`.
        let (Some(tier), Some(degree)) = (Digit::from_i32(raw.tier), Digit::from_i32(raw.degree))
        else {
            return Err(invalid);
        };
        Rating::from_digits(
            tier,
            degree,
            Digit::from_i32(raw.minute),
            Digit::from_i32(raw.second),
        )
        .map_err(|_| invalid)
    }
}
