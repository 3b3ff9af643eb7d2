use serde::{Deserialize, Serialize};

use super::Operation;

/// One entry of a session's answer log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAnswer {
    pub question_id: String,
    pub operation: Operation,
    /// `None` when the countdown expired before an answer was entered.
    pub user_answer: Option<i64>,
    pub correct_answer: i64,
    pub time_to_answer: f64,
    pub is_correct: bool,
    pub score_earned: u32,
    pub bonus_time_earned: u32,
    pub level: u32,
    pub round: u32,
}
