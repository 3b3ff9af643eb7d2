use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::GameError;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Easy,
    Medium,
    Hard,
}

/// Digit growth for one bound of the digit range once a level is past the authored table.
///
/// The bound grows by `floor(progression * numerator / denominator)` and never passes `cap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitGrowth {
    pub numerator: u32,
    pub denominator: u32,
    pub cap: u32,
}

impl DigitGrowth {
    pub fn apply(&self, base: u32, progression: u32) -> u32 {
        let step = progression.saturating_mul(self.numerator) / self.denominator.max(1);
        base.saturating_add(step).min(self.cap)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameModeConfig {
    pub mode: GameMode,
    pub time_per_question: u32,
    /// Share of the allotted time that must remain to earn bonus seconds.
    pub bonus_ratio_threshold: f64,
    pub score_multiplier: f64,
    pub difficulty_multiplier: f64,
    pub min_level: u32,
    pub max_start_level: u32,
    pub min_digit_growth: DigitGrowth,
    pub max_digit_growth: DigitGrowth,
}

const EASY: GameModeConfig = GameModeConfig {
    mode: GameMode::Easy,
    time_per_question: 15,
    bonus_ratio_threshold: 0.6,
    score_multiplier: 1.0,
    difficulty_multiplier: 1.0,
    min_level: 1,
    max_start_level: 10,
    min_digit_growth: DigitGrowth {
        numerator: 1,
        denominator: 3,
        cap: 4,
    },
    max_digit_growth: DigitGrowth {
        numerator: 1,
        denominator: 2,
        cap: 5,
    },
};

const MEDIUM: GameModeConfig = GameModeConfig {
    mode: GameMode::Medium,
    time_per_question: 12,
    bonus_ratio_threshold: 0.7,
    score_multiplier: 1.5,
    difficulty_multiplier: 1.3,
    min_level: 1,
    max_start_level: 15,
    min_digit_growth: DigitGrowth {
        numerator: 1,
        denominator: 2,
        cap: 5,
    },
    // one step every 1.5 ticks
    max_digit_growth: DigitGrowth {
        numerator: 2,
        denominator: 3,
        cap: 6,
    },
};

const HARD: GameModeConfig = GameModeConfig {
    mode: GameMode::Hard,
    time_per_question: 10,
    bonus_ratio_threshold: 0.8,
    score_multiplier: 2.0,
    difficulty_multiplier: 1.6,
    min_level: 1,
    max_start_level: 20,
    min_digit_growth: DigitGrowth {
        numerator: 2,
        denominator: 3,
        cap: 6,
    },
    max_digit_growth: DigitGrowth {
        numerator: 1,
        denominator: 1,
        cap: 8,
    },
};

impl GameMode {
    pub fn all() -> Vec<GameMode> {
        vec![GameMode::Easy, GameMode::Medium, GameMode::Hard]
    }

    pub fn config(&self) -> &'static GameModeConfig {
        match self {
            GameMode::Easy => &EASY,
            GameMode::Medium => &MEDIUM,
            GameMode::Hard => &HARD,
        }
    }

    pub fn time_per_question(&self) -> u32 {
        self.config().time_per_question
    }

    pub fn key(&self) -> &'static str {
        match self {
            GameMode::Easy => "easy",
            GameMode::Medium => "medium",
            GameMode::Hard => "hard",
        }
    }

    /// Clamp a requested starting level into the range this mode allows.
    pub fn clamp_start_level(&self, level: u32) -> u32 {
        let config = self.config();
        level.clamp(config.min_level, config.max_start_level)
    }
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for GameMode {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(GameMode::Easy),
            "medium" => Ok(GameMode::Medium),
            "hard" => Ok(GameMode::Hard),
            _ => Err(GameError::UnknownMode(s.to_string())),
        }
    }
}
