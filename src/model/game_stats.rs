use crate::model::GameMode;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use serde_with::TimestampSeconds;
use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};
use uuid::Uuid;

/// Outcome of one finished session.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    pub playthrough_id: Uuid,
    pub mode: GameMode,
    pub score: u64,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    pub questions_asked: u32,
    pub final_level: u32,
    pub max_level: u32,
    pub bonus_time_earned: u32,
    pub longest_streak: u32,
    #[serde_as(as = "TimestampSeconds")]
    pub started_at: SystemTime,
    #[serde_as(as = "TimestampSeconds")]
    pub ended_at: SystemTime,
}

impl SessionSummary {
    pub fn duration(&self) -> Duration {
        self.ended_at
            .duration_since(self.started_at)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    Level,
    Score,
    Speed,
    Streak,
    Special,
}

/// An unlocked milestone, kept in backups alongside the stats.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Milliseconds since the unix epoch.
    pub unlocked_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<AchievementCategory>,
}

/// Cross-session records, persisted by a `StatsStore`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameStats {
    pub total_games_played: u32,
    pub total_score: u64,
    pub best_scores: BTreeMap<GameMode, u64>,
    pub current_levels: BTreeMap<GameMode, u32>,
    pub total_correct_answers: u32,
    pub total_wrong_answers: u32,
    pub total_questions_answered: u32,
    /// Mean session length in milliseconds.
    pub average_time: u64,
    pub longest_streak: u32,
    pub has_seen_warmup: BTreeMap<GameMode, bool>,
    pub highest_levels: BTreeMap<GameMode, u32>,
    pub highest_question_count: BTreeMap<GameMode, u32>,
    pub session_count: u32,
    pub last_played_mode: GameMode,
    /// Milliseconds since the unix epoch.
    pub last_played_date: i64,
}

impl Default for GameStats {
    fn default() -> Self {
        let per_mode = |value| GameMode::all().into_iter().map(|m| (m, value)).collect();
        Self {
            total_games_played: 0,
            total_score: 0,
            best_scores: GameMode::all().into_iter().map(|m| (m, 0)).collect(),
            current_levels: per_mode(1),
            total_correct_answers: 0,
            total_wrong_answers: 0,
            total_questions_answered: 0,
            average_time: 0,
            longest_streak: 0,
            has_seen_warmup: GameMode::all().into_iter().map(|m| (m, false)).collect(),
            highest_levels: per_mode(1),
            highest_question_count: per_mode(0),
            session_count: 0,
            last_played_mode: GameMode::default(),
            last_played_date: chrono::Utc::now().timestamp_millis(),
        }
    }
}

impl GameStats {
    /// Fills per-mode entries missing from older saves.
    pub fn normalize(&mut self) {
        for mode in GameMode::all() {
            self.best_scores.entry(mode).or_insert(0);
            self.current_levels.entry(mode).or_insert(1);
            self.has_seen_warmup.entry(mode).or_insert(false);
            self.highest_levels.entry(mode).or_insert(1);
            self.highest_question_count.entry(mode).or_insert(0);
        }
    }

    pub fn highest_level(&self, mode: GameMode) -> u32 {
        self.highest_levels.get(&mode).copied().unwrap_or(1)
    }

    pub fn highest_question_count(&self, mode: GameMode) -> u32 {
        self.highest_question_count.get(&mode).copied().unwrap_or(0)
    }

    pub fn best_score(&self, mode: GameMode) -> u64 {
        self.best_scores.get(&mode).copied().unwrap_or(0)
    }

    pub fn current_level(&self, mode: GameMode) -> u32 {
        self.current_levels.get(&mode).copied().unwrap_or(1)
    }

    /// Returns true when the stored value changed.
    pub fn raise_highest_level(&mut self, mode: GameMode, level: u32) -> bool {
        let entry = self.highest_levels.entry(mode).or_insert(1);
        if level > *entry {
            *entry = level;
            true
        } else {
            false
        }
    }

    pub fn raise_highest_question_count(&mut self, mode: GameMode, count: u32) -> bool {
        let entry = self.highest_question_count.entry(mode).or_insert(0);
        if count > *entry {
            *entry = count;
            true
        } else {
            false
        }
    }

    pub fn mark_warmup_seen(&mut self, mode: GameMode) {
        self.has_seen_warmup.insert(mode, true);
    }

    pub fn record_session(&mut self, summary: &SessionSummary) {
        let mode = summary.mode;
        let duration_ms = summary.duration().as_millis() as u64;

        self.total_games_played += 1;
        self.total_score += summary.score;
        let best = self.best_scores.entry(mode).or_insert(0);
        *best = (*best).max(summary.score);
        let current = self.current_levels.entry(mode).or_insert(1);
        *current = (*current).max(summary.max_level);
        self.raise_highest_level(mode, summary.max_level);
        self.raise_highest_question_count(mode, summary.questions_asked);
        self.total_correct_answers += summary.correct_answers;
        self.total_wrong_answers += summary.wrong_answers;
        self.total_questions_answered += summary.questions_asked;
        if duration_ms > 0 {
            let sessions = self.session_count as u64;
            self.average_time = (self.average_time * sessions + duration_ms) / (sessions + 1);
        }
        self.longest_streak = self.longest_streak.max(summary.longest_streak);
        self.session_count += 1;
        self.last_played_mode = mode;
        self.last_played_date = chrono::Utc::now().timestamp_millis();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(mode: GameMode, score: u64, max_level: u32, secs: u64) -> SessionSummary {
        let started_at = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        SessionSummary {
            playthrough_id: Uuid::new_v4(),
            mode,
            score,
            correct_answers: 7,
            wrong_answers: 1,
            questions_asked: 8,
            final_level: 1,
            max_level,
            bonus_time_earned: 10,
            longest_streak: 7,
            started_at,
            ended_at: started_at + Duration::from_secs(secs),
        }
    }

    #[test]
    fn test_record_session() {
        let mut stats = GameStats::default();
        stats.record_session(&summary(GameMode::Hard, 120, 3, 60));
        stats.record_session(&summary(GameMode::Hard, 80, 2, 120));

        assert_eq!(stats.total_games_played, 2);
        assert_eq!(stats.total_score, 200);
        assert_eq!(stats.best_score(GameMode::Hard), 120);
        assert_eq!(stats.highest_level(GameMode::Hard), 3);
        assert_eq!(stats.highest_level(GameMode::Easy), 1);
        assert_eq!(stats.highest_question_count(GameMode::Hard), 8);
        assert_eq!(stats.total_questions_answered, 16);
        assert_eq!(stats.average_time, 90_000);
        assert_eq!(stats.longest_streak, 7);
        assert_eq!(stats.last_played_mode, GameMode::Hard);
    }

    #[test]
    fn test_partial_json_is_filled_with_defaults() {
        let json = r#"{"total_games_played": 4, "highest_levels": {"medium": 12}}"#;
        let mut stats: GameStats = serde_json::from_str(json).unwrap();
        stats.normalize();
        assert_eq!(stats.total_games_played, 4);
        assert_eq!(stats.highest_level(GameMode::Medium), 12);
        assert_eq!(stats.highest_levels.get(&GameMode::Easy), Some(&1));
        assert_eq!(stats.highest_question_count.len(), 3);
    }

    #[test]
    fn test_raise_is_monotonic() {
        let mut stats = GameStats::default();
        assert!(stats.raise_highest_level(GameMode::Easy, 5));
        assert!(!stats.raise_highest_level(GameMode::Easy, 4));
        assert_eq!(stats.highest_level(GameMode::Easy), 5);
    }
}
