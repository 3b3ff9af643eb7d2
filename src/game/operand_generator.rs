use rand::seq::IndexedRandom;
use rand::Rng;

use crate::error::GameError;
use crate::model::{DifficultySettings, Operation};

/// Chance that a drawn operand is swapped for a round number from `SPECIAL_NUMBERS`.
pub const SPECIAL_NUMBER_CHANCE: f64 = 0.3;
pub const SPECIAL_NUMBERS: [u64; 17] = [
    5, 10, 15, 20, 25, 30, 40, 50, 60, 75, 100, 125, 150, 200, 250, 500, 1000,
];
/// Chance of turning two single-digit addends into a "make ten" pair.
pub const COMPLEMENT_CHANCE: f64 = 0.3;
/// Largest digit count whose values fit comfortably in a u64.
pub const MAX_OPERAND_DIGITS: u32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DivisionTriple {
    pub dividend: u64,
    pub divisor: u64,
    pub quotient: u64,
}

pub fn digit_count(n: u64) -> u32 {
    if n == 0 {
        1
    } else {
        n.ilog10() + 1
    }
}

/// Inclusive value bounds for numbers with exactly `digits` digits.
fn value_bounds(digits: u32, exclude_zero: bool) -> (u64, u64) {
    let min = if digits == 1 {
        if exclude_zero {
            1
        } else {
            0
        }
    } else {
        10u64.pow(digits - 1)
    };
    (min, 10u64.pow(digits) - 1)
}

pub fn special_numbers_between(min: u64, max: u64) -> Vec<u64> {
    SPECIAL_NUMBERS
        .iter()
        .copied()
        .filter(|n| (min..=max).contains(n))
        .collect()
}

pub fn number_in_range<R: Rng>(
    rng: &mut R,
    min_digits: u32,
    max_digits: u32,
    exclude_zero: bool,
) -> u64 {
    let low = min_digits.clamp(1, MAX_OPERAND_DIGITS);
    let high = max_digits.clamp(low, MAX_OPERAND_DIGITS);
    let digits = rng.random_range(low..=high);
    let (min, max) = value_bounds(digits, exclude_zero);

    let mut number = rng.random_range(min..=max);
    if rng.random_bool(SPECIAL_NUMBER_CHANCE) {
        if let Some(special) = special_numbers_between(min, max).choose(rng) {
            number = *special;
        }
    }
    number
}

pub fn addition_pair<R: Rng>(rng: &mut R, difficulty: &DifficultySettings) -> (u64, u64) {
    let a = number_in_range(rng, difficulty.min_digits, difficulty.max_digits, false);
    let mut b = number_in_range(rng, difficulty.min_digits, difficulty.max_digits, false);

    if rng.random_bool(COMPLEMENT_CHANCE) && a < 10 && b < 10 {
        let complement = 10 - a;
        if (1..=9).contains(&complement) {
            b = (complement + rng.random_range(0..5)).min(difficulty.max_value());
        }
    }
    (a, b)
}

/// The first operand is never smaller than the second.
pub fn subtraction_pair<R: Rng>(rng: &mut R, difficulty: &DifficultySettings) -> (u64, u64) {
    let a = number_in_range(rng, difficulty.min_digits, difficulty.max_digits, false);
    let high = difficulty.max_digits.min(digit_count(a));
    let low = difficulty.min_digits.min(high);
    let b = number_in_range(rng, low, high, false);

    if a < b {
        (b, a)
    } else {
        (a, b)
    }
}

pub fn multiplication_pair<R: Rng>(rng: &mut R, difficulty: &DifficultySettings) -> (u64, u64) {
    let average_digits = (difficulty.min_digits + difficulty.max_digits) as f64 / 2.0;

    if average_digits <= 2.0 {
        (rng.random_range(1..=12), rng.random_range(1..=12))
    } else if average_digits <= 3.0 {
        let high = difficulty.max_digits.min(2);
        let low = difficulty.min_digits.min(high);
        (
            rng.random_range(1..=15),
            number_in_range(rng, low, high, false),
        )
    } else {
        let high = difficulty.max_digits.min(3);
        let low = difficulty.min_digits.min(high);
        (
            number_in_range(rng, low, high, false),
            number_in_range(rng, low, high, false),
        )
    }
}

/// Builds the dividend from quotient and divisor so the division is always exact.
pub fn division_pair<R: Rng>(
    rng: &mut R,
    difficulty: &DifficultySettings,
) -> Result<DivisionTriple, GameError> {
    let high = difficulty.max_digits.saturating_sub(1).max(1);
    let quotient = number_in_range(rng, 1, high, false);
    let divisor = number_in_range(rng, 1, high, true);
    let dividend = quotient
        .checked_mul(divisor)
        .ok_or(GameError::Overflow(Operation::Division))?;
    Ok(DivisionTriple {
        dividend,
        divisor,
        quotient,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn settings(min: u32, max: u32) -> DifficultySettings {
        DifficultySettings::new(min, max, &[Operation::Addition], &[1.0])
    }

    #[test]
    fn test_digit_count() {
        assert_eq!(digit_count(0), 1);
        assert_eq!(digit_count(9), 1);
        assert_eq!(digit_count(10), 2);
        assert_eq!(digit_count(99_999), 5);
        assert_eq!(digit_count(100_000), 6);
    }

    #[test]
    fn test_special_numbers_between() {
        assert_eq!(special_numbers_between(0, 9), vec![5]);
        assert_eq!(
            special_numbers_between(10, 99),
            vec![10, 15, 20, 25, 30, 40, 50, 60, 75]
        );
        assert!(special_numbers_between(10_000, 99_999).is_empty());
    }

    #[test]
    fn test_number_in_range_respects_digits() {
        let mut rng = StdRng::seed_from_u64(1);
        for (min, max) in [(1, 1), (1, 2), (2, 3), (3, 5), (5, 8)] {
            for _ in 0..2_000 {
                let n = number_in_range(&mut rng, min, max, false);
                let digits = digit_count(n);
                assert!(
                    (min..=max).contains(&digits),
                    "{} has {} digits, expected {}..={}",
                    n,
                    digits,
                    min,
                    max
                );
            }
        }
    }

    #[test]
    fn test_number_in_range_exclude_zero() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..2_000 {
            assert_ne!(number_in_range(&mut rng, 1, 1, true), 0);
        }
    }

    #[test]
    fn test_number_in_range_prefers_special_numbers() {
        let mut rng = StdRng::seed_from_u64(3);
        let draws = 10_000;
        // only 5 is special among single digits; uniform odds alone would be 10%
        let fives = (0..draws)
            .filter(|_| number_in_range(&mut rng, 1, 1, false) == 5)
            .count();
        let share = fives as f64 / draws as f64;
        assert!(share > 0.3 && share < 0.43, "share of fives {}", share);
    }

    #[test]
    fn test_division_is_exact() {
        let mut rng = StdRng::seed_from_u64(4);
        for max in 1..=8 {
            for _ in 0..500 {
                let triple = division_pair(&mut rng, &settings(1, max)).unwrap();
                assert!(triple.divisor > 0);
                assert_eq!(triple.dividend % triple.divisor, 0);
                assert_eq!(triple.dividend / triple.divisor, triple.quotient);
                assert!(digit_count(triple.divisor) <= (max - 1).max(1));
            }
        }
    }

    #[test]
    fn test_subtraction_never_negative() {
        let mut rng = StdRng::seed_from_u64(5);
        for (min, max) in [(1, 1), (1, 2), (2, 2), (3, 4), (5, 7)] {
            for _ in 0..1_000 {
                let (a, b) = subtraction_pair(&mut rng, &settings(min, max));
                assert!(a >= b, "{} - {}", a, b);
                assert!(digit_count(b) <= digit_count(a));
            }
        }
    }

    #[test]
    fn test_addition_single_digit_stays_single_digit() {
        let mut rng = StdRng::seed_from_u64(6);
        for _ in 0..5_000 {
            let (a, b) = addition_pair(&mut rng, &settings(1, 1));
            assert!(a <= 9 && b <= 9, "{} + {}", a, b);
        }
    }

    #[test]
    fn test_addition_makes_ten_pairs() {
        let mut rng = StdRng::seed_from_u64(7);
        let sums_to_ten_or_more = (0..5_000)
            .map(|_| addition_pair(&mut rng, &settings(1, 2)))
            .filter(|(a, b)| *a < 10 && *a > 0 && a + b >= 10 && *b < 14)
            .count();
        assert!(sums_to_ten_or_more > 0);
    }

    #[test]
    fn test_multiplication_strategies() {
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..1_000 {
            let (a, b) = multiplication_pair(&mut rng, &settings(2, 2));
            assert!((1..=12).contains(&a) && (1..=12).contains(&b));

            let (a, b) = multiplication_pair(&mut rng, &settings(2, 4));
            assert!((1..=15).contains(&a));
            assert!(digit_count(b) <= 2);

            let (a, b) = multiplication_pair(&mut rng, &settings(5, 7));
            assert_eq!(digit_count(a), 3);
            assert_eq!(digit_count(b), 3);
        }
    }
}
