use log::debug;
use serde::{Deserialize, Serialize};

use super::settings::WrongAnswerPolicy;

/// Consecutive correct answers needed to leave a level.
pub const LEVEL_UP_THRESHOLD: u32 = 5;

pub fn should_level_up(correct_in_level: u32) -> bool {
    correct_in_level >= LEVEL_UP_THRESHOLD
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelTransition {
    pub from: u32,
    pub to: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrongAnswerOutcome {
    /// `None` when the level did not move (already at level 1).
    pub transition: Option<LevelTransition>,
    pub ends_session: bool,
}

/// Where the player stands on the level ladder within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    level: u32,
    correct_in_level: u32,
    max_level: u32,
}

impl Default for LevelProgress {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl LevelProgress {
    pub fn starting_at(level: u32) -> Self {
        let level = level.max(1);
        Self {
            level,
            correct_in_level: 0,
            max_level: level,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn correct_in_level(&self) -> u32 {
        self.correct_in_level
    }

    /// Highest level reached this session.
    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    pub fn record_correct(&mut self) -> Option<LevelTransition> {
        self.correct_in_level += 1;
        if !should_level_up(self.correct_in_level) {
            return None;
        }
        let transition = LevelTransition {
            from: self.level,
            to: self.level.saturating_add(1),
        };
        self.level = transition.to;
        self.correct_in_level = 0;
        self.max_level = self.max_level.max(self.level);
        debug!(
            target: "game_engine",
            "Level up {} -> {} (max {})",
            transition.from,
            transition.to,
            self.max_level
        );
        Some(transition)
    }

    pub fn record_incorrect(&mut self, policy: WrongAnswerPolicy) -> WrongAnswerOutcome {
        self.correct_in_level = 0;
        let from = self.level;
        let (to, ends_session) = match policy {
            WrongAnswerPolicy::EndSession => (1, true),
            WrongAnswerPolicy::DropLevel => (from.saturating_sub(1).max(1), false),
        };
        self.level = to;
        let transition = (from != to).then_some(LevelTransition { from, to });
        if let Some(transition) = transition {
            debug!(
                target: "game_engine",
                "Level {} -> {} after wrong answer ({:?})",
                transition.from,
                transition.to,
                policy
            );
        }
        WrongAnswerOutcome {
            transition,
            ends_session,
        }
    }
}
