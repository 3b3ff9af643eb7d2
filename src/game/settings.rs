use crate::model::{GameMode, SettingsChange};
use log::{trace, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "OPERANDO_DATA_DIR";
const APP_DIR: &str = "operando";
const CURRENT_VERSION: u32 = 2;

/// What happens to a session after a wrong or timed-out answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WrongAnswerPolicy {
    /// Back to level 1 and the session is over.
    #[default]
    EndSession,
    /// Down one level (never below 1) and play continues.
    DropLevel,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    #[serde(default = "default_version")]
    version: u32,

    #[serde(default)]
    pub wrong_answer_policy: WrongAnswerPolicy,

    #[serde(default)]
    pub default_mode: GameMode,

    #[serde(default = "default_true")]
    pub sound_enabled: bool,

    #[serde(default)]
    pub auto_submit: bool,
}

fn default_version() -> u32 {
    1
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            version: CURRENT_VERSION,
            wrong_answer_policy: WrongAnswerPolicy::default(),
            default_mode: GameMode::default(),
            sound_enabled: true,
            auto_submit: false,
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        Self::load_from(&Self::settings_path())
    }

    /// Reads settings from `path`, writing defaults there when missing or unreadable.
    pub fn load_from(path: &Path) -> Self {
        if let Ok(contents) = fs::read_to_string(path) {
            match serde_json::from_str::<Settings>(&contents) {
                Ok(mut settings) => {
                    settings.migrate();
                    return settings;
                }
                Err(e) => warn!(
                    target: "settings",
                    "Ignoring unreadable settings {:?}: {}",
                    path,
                    e
                ),
            }
        }
        let default = Settings::default();
        if let Err(e) = default.save_to(path) {
            warn!(target: "settings", "Could not write default settings: {}", e);
        }
        default
    }

    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&Self::settings_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let contents = serde_json::to_string(self)?;
        fs::write(path, contents)?;
        trace!(target: "settings", "Saved settings to {:?}", path);
        Ok(())
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Applies the fields present in `change`; returns true when anything differed.
    pub fn apply(&mut self, change: &SettingsChange) -> bool {
        let before = self.clone();
        if let Some(policy) = change.wrong_answer_policy {
            self.wrong_answer_policy = policy;
        }
        if let Some(mode) = change.default_mode {
            self.default_mode = mode;
        }
        if let Some(sound_enabled) = change.sound_enabled {
            self.sound_enabled = sound_enabled;
        }
        if let Some(auto_submit) = change.auto_submit {
            self.auto_submit = auto_submit;
        }
        *self != before
    }

    /// Root for every file the crate persists.
    pub fn data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.is_empty() {
                return PathBuf::from(dir);
            }
        }
        dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR)
    }

    pub fn settings_path() -> PathBuf {
        Self::data_dir().join("settings.json")
    }

    fn migrate(&mut self) {
        match self.version {
            // v1 files predate the wrong answer policy; serde filled the default
            0 | 1 => {
                self.version = CURRENT_VERSION;
            }
            _ => (),
        }
    }

    pub fn is_debug_mode() -> bool {
        std::env::var("DEBUG").map(|v| v == "1").unwrap_or(false)
    }

    pub fn seed_from_env() -> Option<u64> {
        std::env::var("SEED").ok()?.trim().parse::<u64>().ok()
    }
}
