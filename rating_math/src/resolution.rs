use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rating::Rating;

/// Difficulty a check falls back to once it has been resolved.
pub const DEFAULT_DIFFICULTY: u8 = 1;

/// Outcome tier of a resolved check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    Botch,
    Failure,
    Success,
    Triumph,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Botch, Level::Failure, Level::Success, Level::Triumph];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Botch => "Botch",
            Level::Failure => "Failure",
            Level::Success => "Success",
            Level::Triumph => "Triumph",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify `roll` against a single stat.
///
/// Rules are tried in order and the first match wins:
/// 1. equal to the stat is a triumph,
/// 2. exactly `6:6` is a botch,
/// 3. a tier under `difficulty` fails,
/// 4. under the stat succeeds,
/// 5. anything else fails.
pub fn resolve(stat: &Rating, roll: &Rating, difficulty: u8) -> Level {
    if roll == stat {
        return Level::Triumph;
    }
    if *roll == Rating::BOTCH {
        return Level::Botch;
    }
    if roll.tier().get() < difficulty {
        return Level::Failure;
    }
    if roll < stat {
        return Level::Success;
    }
    Level::Failure
}

/// Classify `roll` against a stat or a domain, whichever serves better.
///
/// Same cascade as [`resolve`], except that a domain of tier 6 turns the
/// `6:6` botch into a plain failure, and a roll also succeeds when its
/// degree is under the domain's tier.
pub fn resolve_with_domain(stat: &Rating, domain: &Rating, roll: &Rating, difficulty: u8) -> Level {
    if roll == stat || roll == domain {
        return Level::Triumph;
    }
    if *roll == Rating::BOTCH {
        return if domain.tier().get() == 6 {
            Level::Failure
        } else {
            Level::Botch
        };
    }
    if roll.tier().get() < difficulty {
        return Level::Failure;
    }
    if roll < stat || roll < domain || roll.degree() < domain.tier() {
        return Level::Success;
    }
    Level::Failure
}
