use serde::{Deserialize, Serialize};

use super::Operation;

/// A generated arithmetic question. Fields are readable everywhere but only
/// this module can construct or change one; a new round gets a new question.
#[readonly::make]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub operation: Operation,
    pub operand1: u64,
    pub operand2: u64,
    pub correct_answer: i64,
    pub level: u32,
    pub round: u32,
    /// Milliseconds since the unix epoch.
    pub created_at: i64,
}

impl Question {
    pub fn new(
        id: String,
        operation: Operation,
        operand1: u64,
        operand2: u64,
        correct_answer: i64,
        level: u32,
        round: u32,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            operation,
            operand1,
            operand2,
            correct_answer,
            level,
            round,
            created_at,
        }
    }

    /// Recomputes the answer from the operands; `None` on overflow or division by zero.
    pub fn expected_answer(&self) -> Option<i64> {
        let a = i64::try_from(self.operand1).ok()?;
        let b = i64::try_from(self.operand2).ok()?;
        match self.operation {
            Operation::Addition => a.checked_add(b),
            Operation::Subtraction => a.checked_sub(b),
            Operation::Multiplication => a.checked_mul(b),
            Operation::Division => {
                if b == 0 || a % b != 0 {
                    None
                } else {
                    Some(a / b)
                }
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.id.is_empty()
            && self.level >= 1
            && self.expected_answer() == Some(self.correct_answer)
    }

    pub fn is_correct(&self, answer: i64) -> bool {
        answer == self.correct_answer
    }

    /// Question text as shown to the player, e.g. `12 × 4 = ?`.
    pub fn prompt(&self) -> String {
        format!(
            "{} {} {} = ?",
            self.operand1,
            self.operation.symbol(),
            self.operand2
        )
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} = {}",
            self.operand1,
            self.operation.symbol(),
            self.operand2,
            self.correct_answer
        )
    }
}
