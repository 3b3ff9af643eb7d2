use super::{GameMode, SessionSnapshot, TimerHandle};
use crate::game::settings::WrongAnswerPolicy;

#[derive(Debug, Clone, Default)]
pub struct SettingsChange {
    pub wrong_answer_policy: Option<WrongAnswerPolicy>,
    pub default_mode: Option<GameMode>,
    pub sound_enabled: Option<bool>,
    pub auto_submit: Option<bool>,
}

#[derive(Debug, Clone)]
pub enum GameEngineCommand {
    StartGame { mode: GameMode, level: u32 },
    SubmitAnswer(i64),
    /// One second elapsed on the countdown identified by the handle.
    Tick(TimerHandle),
    /// Leave the feedback step and present the next question.
    Continue,
    Pause,
    Resume,
    EndSession,
    Restart,
    LoadState(SessionSnapshot),
    ChangeSettings(SettingsChange),
}
