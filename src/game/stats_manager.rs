use crate::game::settings::Settings;
use crate::model::{Achievement, GameMode, GameStats, SessionSummary};
use log::{error, info, trace, warn};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub const STATS_VERSION: u32 = 2;
const STATS_FILE: &str = "stats.json";
const SETTINGS_FILE: &str = "settings.json";
const SESSION_FILE: &str = "session.json";
const ACHIEVEMENTS_FILE: &str = "achievements.json";

/// Persistence for cross-session records. Failures are logged by the
/// implementation and never surface to gameplay.
pub trait StatsStore {
    fn get_stats(&self) -> GameStats;
    fn save_stats(&mut self, stats: &GameStats);
    fn update_highest_level(&mut self, mode: GameMode, level: u32);
    fn update_highest_question_count(&mut self, mode: GameMode, count: u32);

    fn record_session(&mut self, summary: &SessionSummary) {
        let mut stats = self.get_stats();
        stats.record_session(summary);
        self.save_stats(&stats);
        self.update_highest_level(summary.mode, summary.max_level);
        self.update_highest_question_count(summary.mode, summary.questions_asked);
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredStats {
    Versioned { version: u32, stats: GameStats },
    /// Files written before the format carried a version.
    Legacy(GameStats),
}

#[derive(Debug, Serialize, Deserialize)]
struct ExportedData {
    #[serde(default)]
    stats: Option<GameStats>,
    #[serde(default)]
    settings: Option<Settings>,
    #[serde(default)]
    achievements: Option<Vec<Achievement>>,
    #[serde(default)]
    version: u32,
    #[serde(default)]
    export_date: String,
}

/// JSON-file `StatsStore` under the data directory.
#[derive(Debug)]
pub struct StatsManager {
    data_dir: PathBuf,
    stats: GameStats,
    achievements: Vec<Achievement>,
}

impl StatsManager {
    pub fn new() -> Self {
        Self::with_data_dir(Settings::data_dir())
    }

    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        if !data_dir.exists() {
            if let Err(e) = fs::create_dir_all(&data_dir) {
                warn!(target: "stats", "Could not create {:?}: {}", data_dir, e);
            }
        }
        let mut manager = Self {
            data_dir,
            stats: GameStats::default(),
            achievements: vec![],
        };
        manager.load();
        manager.load_achievements();
        manager
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    fn stats_path(&self) -> PathBuf {
        self.data_dir.join(STATS_FILE)
    }

    fn achievements_path(&self) -> PathBuf {
        self.data_dir.join(ACHIEVEMENTS_FILE)
    }

    fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }

    fn load(&mut self) {
        let path = self.stats_path();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(_) => return,
        };
        match serde_json::from_str::<StoredStats>(&contents) {
            Ok(StoredStats::Versioned { version, stats }) => {
                self.stats = stats;
                if version < STATS_VERSION {
                    self.migrate_to_v2();
                }
            }
            Ok(StoredStats::Legacy(stats)) => {
                self.stats = stats;
                self.migrate_to_v2();
            }
            Err(e) => {
                error!(target: "stats", "Discarding unreadable stats {:?}: {}", path, e);
                self.stats = GameStats::default();
            }
        }
        self.stats.normalize();
    }

    fn migrate_to_v2(&mut self) {
        info!(target: "stats", "Migrating stats to v{}", STATS_VERSION);
        let stats = &mut self.stats;
        stats.total_questions_answered = stats.total_correct_answers + stats.total_wrong_answers;
        for mode in GameMode::all() {
            let estimate = (stats.best_score(mode) / 10) as u32;
            stats.raise_highest_question_count(mode, estimate);
        }
        stats.session_count = stats.total_games_played;
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = write_json(&self.stats_path(), &self.versioned()) {
            warn!(target: "stats", "Could not save stats: {}", e);
        } else {
            trace!(target: "stats", "Saved stats to {:?}", self.stats_path());
        }
    }

    fn versioned(&self) -> StoredStats {
        StoredStats::Versioned {
            version: STATS_VERSION,
            stats: self.stats.clone(),
        }
    }

    fn load_achievements(&mut self) {
        let path = self.achievements_path();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(_) => return,
        };
        match serde_json::from_str::<Vec<Achievement>>(&contents) {
            Ok(achievements) => self.achievements = achievements,
            Err(e) => error!(
                target: "stats",
                "Discarding unreadable achievements {:?}: {}",
                path,
                e
            ),
        }
    }

    fn persist_achievements(&self) {
        if let Err(e) = write_json(&self.achievements_path(), &self.achievements) {
            warn!(target: "stats", "Could not save achievements: {}", e);
        }
    }

    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    /// Returns false when an achievement with the same id is already unlocked.
    pub fn add_achievement(&mut self, achievement: Achievement) -> bool {
        if self.achievements.iter().any(|a| a.id == achievement.id) {
            return false;
        }
        info!(target: "stats", "Achievement unlocked: {}", achievement.name);
        self.achievements.push(achievement);
        self.persist_achievements();
        true
    }

    pub fn mark_warmup_seen(&mut self, mode: GameMode) {
        self.stats.mark_warmup_seen(mode);
        self.persist();
    }

    /// Pretty JSON backup of stats and settings.
    pub fn export_data(&self) -> String {
        let data = ExportedData {
            stats: Some(self.stats.clone()),
            settings: Some(Settings::load_from(&self.settings_path())),
            achievements: Some(self.achievements.clone()),
            version: STATS_VERSION,
            export_date: chrono::Utc::now().to_rfc3339(),
        };
        serde_json::to_string_pretty(&data).unwrap_or_else(|e| {
            error!(target: "stats", "Could not export data: {}", e);
            String::new()
        })
    }

    /// Restores a backup produced by `export_data`. Returns false when `data` is unreadable.
    pub fn import_data(&mut self, data: &str) -> bool {
        let imported = match serde_json::from_str::<ExportedData>(data) {
            Ok(imported) => imported,
            Err(e) => {
                error!(target: "stats", "Could not import data: {}", e);
                return false;
            }
        };
        if let Some(mut stats) = imported.stats {
            stats.normalize();
            self.save_stats(&stats);
        }
        if let Some(achievements) = imported.achievements {
            self.achievements = achievements;
            self.persist_achievements();
        }
        if let Some(settings) = imported.settings {
            if let Err(e) = settings.save_to(&self.settings_path()) {
                warn!(target: "stats", "Could not save imported settings: {}", e);
            }
        }
        info!(target: "stats", "Data imported");
        true
    }

    pub fn clear_all(&mut self) {
        for file in [STATS_FILE, SETTINGS_FILE, SESSION_FILE, ACHIEVEMENTS_FILE] {
            let path = self.data_dir.join(file);
            if path.exists() {
                if let Err(e) = fs::remove_file(&path) {
                    warn!(target: "stats", "Could not remove {:?}: {}", path, e);
                }
            }
        }
        self.stats = GameStats::default();
        self.achievements.clear();
        info!(target: "stats", "All data cleared");
    }
}

impl Default for StatsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsStore for StatsManager {
    fn get_stats(&self) -> GameStats {
        self.stats.clone()
    }

    fn save_stats(&mut self, stats: &GameStats) {
        self.stats = stats.clone();
        self.persist();
    }

    fn update_highest_level(&mut self, mode: GameMode, level: u32) {
        if self.stats.raise_highest_level(mode, level) {
            self.persist();
        }
    }

    fn update_highest_question_count(&mut self, mode: GameMode, count: u32) {
        if self.stats.raise_highest_question_count(mode, count) {
            self.persist();
        }
    }
}

/// Keeps stats in memory only.
#[derive(Debug, Default, Clone)]
pub struct MemoryStatsStore {
    stats: GameStats,
}

impl StatsStore for MemoryStatsStore {
    fn get_stats(&self) -> GameStats {
        self.stats.clone()
    }

    fn save_stats(&mut self, stats: &GameStats) {
        self.stats = stats.clone();
    }

    fn update_highest_level(&mut self, mode: GameMode, level: u32) {
        self.stats.raise_highest_level(mode, level);
    }

    fn update_highest_question_count(&mut self, mode: GameMode, count: u32) {
        self.stats.raise_highest_question_count(mode, count);
    }
}

impl<S: StatsStore> StatsStore for Rc<RefCell<S>> {
    fn get_stats(&self) -> GameStats {
        self.borrow().get_stats()
    }

    fn save_stats(&mut self, stats: &GameStats) {
        self.borrow_mut().save_stats(stats);
    }

    fn update_highest_level(&mut self, mode: GameMode, level: u32) {
        self.borrow_mut().update_highest_level(mode, level);
    }

    fn update_highest_question_count(&mut self, mode: GameMode, count: u32) {
        self.borrow_mut().update_highest_question_count(mode, count);
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let contents = serde_json::to_string_pretty(value)?;
    fs::write(path, contents)
}
