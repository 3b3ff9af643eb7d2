pub mod analysis;
pub mod difficulty_resolver;
pub mod difficulty_table;
pub mod game_engine;
pub mod level_names;
pub mod level_progression;
pub mod operand_generator;
pub mod question_factory;
mod question_history;
pub mod scoring;
pub mod settings;
pub mod stats_manager;
mod threshold;

pub use difficulty_resolver::DifficultyResolver;
pub use game_engine::{GameEngine, SessionPhase};
pub use level_names::level_name;
pub use level_progression::{should_level_up, LevelProgress};
pub use question_factory::{generate_question, QuestionFactory};
pub use question_history::{HistoryEntry, QuestionHistory};
pub use scoring::{bonus_time, calculate_score};
pub use stats_manager::{MemoryStatsStore, StatsManager, StatsStore};
pub use threshold::resolve_by_threshold;
