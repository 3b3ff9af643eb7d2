use thiserror::Error;

use crate::model::{GameMode, Operation};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GameError {
    #[error("Unknown game mode: {0}")]
    UnknownMode(String),

    #[error("No difficulty breakpoints defined for mode {0}")]
    EmptyTable(GameMode),

    /// A breakpoint entry violates the difficulty invariants.
    #[error("Malformed difficulty profile for {mode} at level {threshold}: {reason}")]
    MalformedProfile {
        mode: GameMode,
        threshold: u32,
        reason: String,
    },

    #[error("Arithmetic overflow while building a {0} question")]
    Overflow(Operation),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GameError::MalformedProfile {
            mode: GameMode::Medium,
            threshold: 8,
            reason: "2 operations but 3 weights".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("medium"));
        assert!(display.contains("level 8"));
        assert!(display.contains("3 weights"));
    }
}
