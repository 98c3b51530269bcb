use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::rating::{Digit, Rating};

/// Uniform source of d6 results.
pub trait DieSource {
    fn roll_d6(&mut self) -> Digit;
}

/// Deterministic per-record die roller.
#[derive(Clone, Debug)]
pub struct Roller {
    rng: SmallRng,
}

impl Roller {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl DieSource for Roller {
    fn roll_d6(&mut self) -> Digit {
        Digit::ALL[self.rng.gen_range(0..Digit::ALL.len())]
    }
}

/// Roll all four positions, Tier first.
pub fn roll_full<S: DieSource + ?Sized>(source: &mut S) -> Rating {
    let tier = source.roll_d6();
    let degree = source.roll_d6();
    let minute = source.roll_d6();
    let second = source.roll_d6();
    Rating::from_four(tier, degree, minute, second)
}

/// Roll at full precision, then drop positions `stat` does not carry.
pub fn roll_for<S: DieSource + ?Sized>(source: &mut S, stat: &Rating) -> Rating {
    roll_full(source).truncate_to(stat.shape())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::RatingShape;

    struct Scripted(std::vec::IntoIter<u8>);

    impl Scripted {
        fn new(values: &[u8]) -> Self {
            Self(values.to_vec().into_iter())
        }
    }

    impl DieSource for Scripted {
        fn roll_d6(&mut self) -> Digit {
            Digit::new(self.0.next().expect("script exhausted")).expect("scripted digit")
        }
    }

    #[test]
    fn roll_consumes_four_draws_in_order() {
        let mut dice = Scripted::new(&[2, 3, 4, 5, 6, 1, 1, 1]);
        let stat: Rating = "4:4".parse().unwrap();
        assert_eq!(roll_for(&mut dice, &stat).to_string(), "2:3");
        let stat: Rating = "4:4:4".parse().unwrap();
        assert_eq!(roll_for(&mut dice, &stat).to_string(), "6:1:1");
    }

    #[test]
    fn roll_matches_stat_shape() {
        let mut roller = Roller::from_seed(7);
        for shape in [RatingShape::Two, RatingShape::Three, RatingShape::Four] {
            let stat = Rating::filled(shape, Digit::MIN);
            for _ in 0..50 {
                assert_eq!(roll_for(&mut roller, &stat).shape(), shape);
            }
        }
    }

    #[test]
    fn roller_is_deterministic_per_seed() {
        let mut a = Roller::from_seed(99);
        let mut b = Roller::from_seed(99);
        let left: Vec<Rating> = (0..20).map(|_| roll_full(&mut a)).collect();
        let right: Vec<Rating> = (0..20).map(|_| roll_full(&mut b)).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn roller_covers_every_face() {
        let mut roller = Roller::from_seed(3);
        let mut seen = [false; 6];
        for _ in 0..600 {
            seen[usize::from(roller.roll_d6().get()) - 1] = true;
        }
        assert!(seen.iter().all(|face| *face));
    }
}
