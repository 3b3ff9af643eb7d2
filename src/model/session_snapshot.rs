use log::{trace, warn};
use serde_with::serde_as;
use serde_with::TimestampSeconds;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use uuid::Uuid;

use super::{GameMode, Question, TimerState, UserAnswer};
use crate::game::level_progression::LevelProgress;
use crate::game::settings::Settings;

/// Everything needed to resume a session after the host app restarts.
#[serde_as]
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SessionSnapshot {
    pub playthrough_id: Uuid,
    pub mode: GameMode,
    /// Level the session began at; `Restart` returns here.
    #[serde(default = "default_start_level")]
    pub start_level: u32,
    pub progress: LevelProgress,
    pub round: u32,
    pub score: u64,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    pub questions_asked: u32,
    pub bonus_time_earned: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub answers: Vec<UserAnswer>,
    pub current_question: Option<Question>,
    pub timer_state: TimerState,
    #[serde_as(as = "TimestampSeconds")]
    pub started_at: SystemTime,
}

fn default_start_level() -> u32 {
    1
}

pub fn session_snapshot_path() -> PathBuf {
    Settings::data_dir().join("session.json")
}

impl SessionSnapshot {
    pub fn save(&self) -> bool {
        self.save_to(&session_snapshot_path())
    }

    pub fn save_to(&self, path: &Path) -> bool {
        if let Some(dir) = path.parent() {
            if let Err(e) = fs::create_dir_all(dir) {
                warn!(target: "stats", "Could not create {:?}: {}", dir, e);
                return false;
            }
        }
        match serde_json::to_string(self) {
            Ok(contents) => match fs::write(path, contents) {
                Ok(()) => {
                    trace!(target: "stats", "Saved session snapshot to {:?}", path);
                    true
                }
                Err(e) => {
                    warn!(target: "stats", "Could not write session snapshot: {}", e);
                    false
                }
            },
            Err(e) => {
                warn!(target: "stats", "Could not serialize session snapshot: {}", e);
                false
            }
        }
    }
}

pub fn load_session_snapshot() -> Option<SessionSnapshot> {
    load_session_snapshot_from(&session_snapshot_path())
}

pub fn load_session_snapshot_from(path: &Path) -> Option<SessionSnapshot> {
    let contents = fs::read_to_string(path).ok()?;
    match serde_json::from_str::<SessionSnapshot>(&contents) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!(target: "stats", "Ignoring unreadable session snapshot {:?}: {}", path, e);
            None
        }
    }
}
