use log::trace;

use crate::model::{GameMode, Operation, ScoreCalculationParams};

pub const POINTS_PER_CORRECT: f64 = 10.0;
pub const BONUS_TIME_AMOUNT: u32 = 5;
pub const LEVEL_SCORE_STEP: f64 = 0.05;
pub const DIFFICULTY_SCORE_STEP: f64 = 0.1;

/// Share of the allotted time left over; 0 when no time was allotted.
pub fn time_ratio(time_to_answer: f64, max_time: f64) -> f64 {
    if max_time <= 0.0 || !max_time.is_finite() {
        return 0.0;
    }
    (max_time - time_to_answer) / max_time
}

pub fn score_multiplier(operation: Operation, level: u32, mode: GameMode) -> f64 {
    let level_multiplier = 1.0 + (level.max(1) - 1) as f64 * LEVEL_SCORE_STEP;
    operation.score_multiplier() * level_multiplier * mode.config().score_multiplier
}

pub fn speed_bonus(time_to_answer: f64, max_time: f64) -> f64 {
    let ratio = time_ratio(time_to_answer, max_time);
    if ratio > 0.8 {
        1.5
    } else if ratio > 0.6 {
        1.2
    } else if ratio > 0.4 {
        1.0
    } else if ratio > 0.2 {
        0.8
    } else {
        0.6
    }
}

/// Points for one answer: zero when wrong, at least one when right.
pub fn calculate_score(params: &ScoreCalculationParams) -> u32 {
    if !params.is_correct {
        return 0;
    }
    let multiplier = score_multiplier(params.operation, params.level, params.mode);
    let speed = speed_bonus(params.time_to_answer, params.max_time);
    let difficulty_bonus = 1.0 + params.difficulty as f64 * DIFFICULTY_SCORE_STEP;
    let score = (POINTS_PER_CORRECT * multiplier * speed * difficulty_bonus)
        .max(1.0)
        .round();

    trace!(
        target: "scoring",
        "{} at level {} ({}): x{:.2} speed {} difficulty {:.1} -> {}",
        params.operation,
        params.level,
        params.mode,
        multiplier,
        speed,
        difficulty_bonus,
        score
    );
    score.min(u32::MAX as f64) as u32
}

/// Seconds of extra time earned by a fast answer.
pub fn bonus_time(mode: GameMode, time_to_answer: f64, max_time: f64) -> u32 {
    if time_ratio(time_to_answer, max_time) >= mode.config().bonus_ratio_threshold {
        BONUS_TIME_AMOUNT
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(
        operation: Operation,
        mode: GameMode,
        level: u32,
        t: f64,
        max: f64,
    ) -> ScoreCalculationParams {
        ScoreCalculationParams {
            operation,
            is_correct: true,
            time_to_answer: t,
            max_time: max,
            level,
            mode,
            difficulty: level,
        }
    }

    #[test]
    fn test_wrong_answer_scores_zero() {
        let mut p = params(Operation::Division, GameMode::Hard, 50, 0.5, 10.0);
        p.is_correct = false;
        assert_eq!(calculate_score(&p), 0);
    }

    #[test]
    fn test_score_values() {
        // 10 * 1.0 * 1.5 * 1.1
        assert_eq!(
            calculate_score(&params(Operation::Addition, GameMode::Easy, 1, 1.0, 15.0)),
            17
        );
        // 10 * (1.8 * 1.45 * 2.0) * 0.6 * 2.0
        assert_eq!(
            calculate_score(&params(Operation::Division, GameMode::Hard, 10, 9.0, 10.0)),
            63
        );
    }

    #[test]
    fn test_correct_answer_scores_at_least_one() {
        for mode in GameMode::all() {
            for operation in Operation::all() {
                for level in [0, 1, 7, 99] {
                    for t in [0.0, 5.0, 30.0] {
                        let mut p = params(operation, mode, level, t, 10.0);
                        p.difficulty = 0;
                        assert!(calculate_score(&p) >= 1);
                    }
                }
            }
        }
    }

    #[test]
    fn test_speed_bonus_tiers() {
        assert_eq!(speed_bonus(1.0, 10.0), 1.5);
        assert_eq!(speed_bonus(2.0, 10.0), 1.2);
        assert_eq!(speed_bonus(5.0, 10.0), 1.0);
        assert_eq!(speed_bonus(7.0, 10.0), 0.8);
        assert_eq!(speed_bonus(9.0, 10.0), 0.6);
        assert_eq!(speed_bonus(1.0, 0.0), 0.6);
        assert_eq!(speed_bonus(1.0, -3.0), 0.6);
    }

    #[test]
    fn test_score_multiplier_grows_with_level() {
        let base = score_multiplier(Operation::Multiplication, 1, GameMode::Medium);
        assert!((base - 2.25).abs() < 1e-9);
        let later = score_multiplier(Operation::Multiplication, 21, GameMode::Medium);
        assert!((later - 4.5).abs() < 1e-9);
        assert_eq!(
            score_multiplier(Operation::Addition, 0, GameMode::Easy),
            score_multiplier(Operation::Addition, 1, GameMode::Easy)
        );
    }

    #[test]
    fn test_bonus_time() {
        assert_eq!(bonus_time(GameMode::Hard, 1.0, 10.0), 5);
        assert_eq!(bonus_time(GameMode::Hard, 3.0, 10.0), 0);
        assert_eq!(bonus_time(GameMode::Easy, 6.0, 15.0), 5);
        assert_eq!(bonus_time(GameMode::Easy, 7.0, 15.0), 0);
        assert_eq!(bonus_time(GameMode::Medium, 0.0, 0.0), 0);
    }
}
