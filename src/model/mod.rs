mod difficulty_settings;
mod game_engine_command;
mod game_engine_event;
mod game_mode;
mod game_stats;
mod operation;
mod question;
mod score_params;
pub mod session_snapshot;
mod session_projection;
mod timer_state;
mod user_answer;

pub use difficulty_settings::DifficultySettings;
pub use game_engine_command::GameEngineCommand;
pub use game_engine_command::SettingsChange;
pub use game_engine_event::{GameEngineEvent, LevelChangeReason};
pub use game_mode::{DigitGrowth, GameMode, GameModeConfig};
pub use game_stats::{Achievement, AchievementCategory, GameStats, SessionSummary};
pub use operation::Operation;
pub use question::Question;
pub use score_params::ScoreCalculationParams;
pub use session_projection::SessionProjection;
pub use session_snapshot::SessionSnapshot;
pub use timer_state::{SpeedRating, TickOutcome, TimeStatus, TimerHandle, TimerState};
pub use user_answer::UserAnswer;
