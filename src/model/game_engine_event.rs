use super::{GameMode, Question, SessionSummary, TimerState, UserAnswer};
use crate::game::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelChangeReason {
    LevelUp,
    WrongAnswer,
}

#[derive(Debug, Clone)]
pub enum GameEngineEvent {
    SessionStarted { mode: GameMode, level: u32 },
    QuestionPresented(Question),
    AnswerRecorded(UserAnswer),
    BonusTimeAwarded(u32),
    LevelChanged {
        from: u32,
        to: u32,
        reason: LevelChangeReason,
    },
    ScoreChanged(u64),
    TimerStateChanged(TimerState),
    SessionEnded(SessionSummary),
    SettingsChanged(Settings),
}
