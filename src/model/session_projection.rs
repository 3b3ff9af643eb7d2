use crate::destroyable::Destroyable;
use crate::events::{EventHandler, EventObserver, Unsubscriber};
use crate::game::settings::Settings;
use crate::model::{GameEngineEvent, GameMode, Question, SessionSummary, TimerState, UserAnswer};
use std::cell::RefCell;
use std::rc::Rc;

/// Read model of the running session, rebuilt purely from engine events.
pub struct SessionProjection {
    settings: Settings,
    mode: Option<GameMode>,
    level: u32,
    score: u64,
    current_question: Option<Question>,
    last_answer: Option<UserAnswer>,
    timer_state: TimerState,
    pending_bonus: u32,
    last_summary: Option<SessionSummary>,
    subscription: Option<Unsubscriber<GameEngineEvent>>,
}

impl Destroyable for SessionProjection {
    fn destroy(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl SessionProjection {
    pub fn new(initial: &Settings) -> Self {
        Self {
            settings: initial.clone(),
            mode: None,
            level: 1,
            score: 0,
            current_question: None,
            last_answer: None,
            timer_state: TimerState::default(),
            pending_bonus: 0,
            last_summary: None,
            subscription: None,
        }
    }

    pub fn new_shared(
        initial: &Settings,
        game_engine_event_observer: EventObserver<GameEngineEvent>,
    ) -> Rc<RefCell<Self>> {
        let projection = Rc::new(RefCell::new(Self::new(initial)));
        let handler = projection.clone();
        let subscription = game_engine_event_observer.subscribe(move |event| {
            handler.borrow_mut().handle_event(event);
        });
        projection.borrow_mut().subscription = Some(subscription);
        projection
    }

    pub fn current_settings(&self) -> Settings {
        self.settings.clone()
    }

    pub fn mode(&self) -> Option<GameMode> {
        self.mode
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_question.as_ref()
    }

    pub fn last_answer(&self) -> Option<&UserAnswer> {
        self.last_answer.as_ref()
    }

    pub fn timer_state(&self) -> &TimerState {
        &self.timer_state
    }

    /// Bonus seconds awarded since the last question was shown, for the "+5s" flash.
    pub fn pending_bonus(&self) -> u32 {
        self.pending_bonus
    }

    pub fn last_summary(&self) -> Option<&SessionSummary> {
        self.last_summary.as_ref()
    }
}

impl EventHandler<GameEngineEvent> for SessionProjection {
    fn handle_event(&mut self, event: &GameEngineEvent) {
        match event {
            GameEngineEvent::SessionStarted { mode, level } => {
                self.mode = Some(*mode);
                self.level = *level;
                self.last_answer = None;
                self.last_summary = None;
                self.pending_bonus = 0;
            }
            GameEngineEvent::QuestionPresented(question) => {
                self.current_question = Some(question.clone());
                self.pending_bonus = 0;
            }
            GameEngineEvent::AnswerRecorded(answer) => self.last_answer = Some(answer.clone()),
            GameEngineEvent::BonusTimeAwarded(seconds) => self.pending_bonus += seconds,
            GameEngineEvent::LevelChanged { to, .. } => self.level = *to,
            GameEngineEvent::ScoreChanged(score) => self.score = *score,
            GameEngineEvent::TimerStateChanged(timer_state) => {
                self.timer_state = timer_state.clone();
            }
            GameEngineEvent::SessionEnded(summary) => {
                self.last_summary = Some(summary.clone());
                self.current_question = None;
            }
            GameEngineEvent::SettingsChanged(settings) => self.settings = settings.clone(),
        }
    }
}
