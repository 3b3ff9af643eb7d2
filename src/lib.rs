pub mod destroyable;
pub mod error;
pub mod events;
pub mod game;
pub mod model;

pub use error::GameError;
pub use game::{bonus_time, calculate_score, generate_question, level_name, should_level_up};
