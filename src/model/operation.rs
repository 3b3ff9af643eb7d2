use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl Operation {
    pub fn all() -> Vec<Operation> {
        vec![
            Operation::Addition,
            Operation::Subtraction,
            Operation::Multiplication,
            Operation::Division,
        ]
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::Addition => "+",
            Operation::Subtraction => "−",
            Operation::Multiplication => "×",
            Operation::Division => "÷",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Addition => "Addition",
            Operation::Subtraction => "Subtraction",
            Operation::Multiplication => "Multiplication",
            Operation::Division => "Division",
        }
    }

    /// Lowercase key used in question ids and persisted data.
    pub fn key(&self) -> &'static str {
        match self {
            Operation::Addition => "addition",
            Operation::Subtraction => "subtraction",
            Operation::Multiplication => "multiplication",
            Operation::Division => "division",
        }
    }

    /// Points multiplier applied before level and mode scaling.
    pub fn score_multiplier(&self) -> f64 {
        match self {
            Operation::Addition => 1.0,
            Operation::Subtraction => 1.2,
            Operation::Multiplication => 1.5,
            Operation::Division => 1.8,
        }
    }

    pub fn complexity(&self) -> u32 {
        match self {
            Operation::Addition => 1,
            Operation::Subtraction => 2,
            Operation::Multiplication => 3,
            Operation::Division => 4,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}
