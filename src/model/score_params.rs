use super::{GameMode, Operation};

/// Inputs for scoring a single answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreCalculationParams {
    pub operation: Operation,
    pub is_correct: bool,
    /// Seconds spent on the question.
    pub time_to_answer: f64,
    /// Seconds allotted to the question.
    pub max_time: f64,
    pub level: u32,
    pub mode: GameMode,
    /// Currently always the level.
    pub difficulty: u32,
}
