use log::{debug, info, trace};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::SystemTime;
use uuid::Uuid;

use super::level_progression::LevelProgress;
use super::question_factory::QuestionFactory;
use super::scoring::{bonus_time, calculate_score};
use super::settings::{Settings, WrongAnswerPolicy};
use super::stats_manager::StatsStore;
use crate::destroyable::Destroyable;
use crate::events::{EventEmitter, EventHandler, EventObserver, Unsubscriber};
use crate::model::{
    GameEngineCommand, GameEngineEvent, GameMode, LevelChangeReason, Question,
    ScoreCalculationParams, SessionSnapshot, SessionSummary, SettingsChange, TickOutcome,
    TimerHandle, TimerState, UserAnswer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    AwaitingAnswer,
    /// The answer is recorded; `Continue` moves on.
    ShowingFeedback { ends_session: bool },
    Ended,
}

pub struct GameEngine {
    settings: Settings,
    factory: QuestionFactory,
    stats_store: Box<dyn StatsStore>,
    debug_mode: bool,
    phase: SessionPhase,
    playthrough_id: Uuid,
    mode: GameMode,
    start_level: u32,
    progress: LevelProgress,
    round: u32,
    score: u64,
    correct_answers: u32,
    wrong_answers: u32,
    questions_asked: u32,
    bonus_time_earned: u32,
    current_streak: u32,
    longest_streak: u32,
    answers: Vec<UserAnswer>,
    current_question: Option<Question>,
    timer_state: TimerState,
    is_paused: bool,
    started_at: SystemTime,
    subscription: Option<Unsubscriber<GameEngineCommand>>,
    game_engine_event_emitter: EventEmitter<GameEngineEvent>,
}

impl Destroyable for GameEngine {
    fn destroy(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl EventHandler<GameEngineCommand> for GameEngine {
    fn handle_event(&mut self, event: &GameEngineCommand) {
        self.handle_command(event.clone());
    }
}

impl GameEngine {
    pub fn new(
        game_engine_event_emitter: EventEmitter<GameEngineEvent>,
        settings: Settings,
        factory: QuestionFactory,
        stats_store: Box<dyn StatsStore>,
    ) -> Self {
        let mode = settings.default_mode;
        Self {
            settings,
            factory,
            stats_store,
            debug_mode: Settings::is_debug_mode(),
            phase: SessionPhase::Idle,
            playthrough_id: Uuid::new_v4(),
            mode,
            start_level: 1,
            progress: LevelProgress::default(),
            round: 0,
            score: 0,
            correct_answers: 0,
            wrong_answers: 0,
            questions_asked: 0,
            bonus_time_earned: 0,
            current_streak: 0,
            longest_streak: 0,
            answers: vec![],
            current_question: None,
            timer_state: TimerState::default(),
            is_paused: false,
            started_at: SystemTime::now(),
            subscription: None,
            game_engine_event_emitter,
        }
    }

    /// Builds an engine driven by commands arriving on `game_engine_command_observer`.
    /// Call `destroy` to break the subscription cycle.
    pub fn new_shared(
        game_engine_command_observer: EventObserver<GameEngineCommand>,
        game_engine_event_emitter: EventEmitter<GameEngineEvent>,
        settings: Settings,
        stats_store: Box<dyn StatsStore>,
    ) -> Rc<RefCell<Self>> {
        let factory = QuestionFactory::new(Settings::seed_from_env());
        let engine = Self::new(game_engine_event_emitter, settings, factory, stats_store);
        let refcell = Rc::new(RefCell::new(engine));
        GameEngine::wire_subscription(refcell.clone(), game_engine_command_observer);
        refcell
    }

    fn wire_subscription(
        game_engine: Rc<RefCell<Self>>,
        game_engine_command_observer: EventObserver<GameEngineCommand>,
    ) {
        let game_engine_handler = game_engine.clone();
        let subscription = game_engine_command_observer.subscribe(move |command| {
            game_engine_handler.borrow_mut().handle_command(command.clone());
        });
        game_engine.borrow_mut().subscription = Some(subscription);
    }

    fn emit(&self, event: GameEngineEvent) {
        self.game_engine_event_emitter.emit(&event);
    }

    pub fn handle_command(&mut self, command: GameEngineCommand) {
        trace!(target: "game_engine", "Handling command: {:?}", command);
        match command {
            GameEngineCommand::StartGame { mode, level } => self.start_game(mode, level),
            GameEngineCommand::SubmitAnswer(answer) => self.submit_answer(Some(answer)),
            GameEngineCommand::Tick(handle) => self.tick(handle),
            GameEngineCommand::Continue => self.continue_game(),
            GameEngineCommand::Pause => self.pause_game(),
            GameEngineCommand::Resume => self.resume_game(),
            GameEngineCommand::EndSession => self.end_session(),
            GameEngineCommand::Restart => {
                if self.phase != SessionPhase::Idle {
                    self.start_game(self.mode, self.start_level);
                }
            }
            GameEngineCommand::LoadState(snapshot) => self.load_state(snapshot),
            GameEngineCommand::ChangeSettings(change) => self.change_settings(&change),
        }
    }

    fn start_game(&mut self, mode: GameMode, level: u32) {
        let level = mode.clamp_start_level(level);
        self.timer_state.stop();
        self.mode = mode;
        self.start_level = level;
        self.playthrough_id = Uuid::new_v4();
        self.progress = LevelProgress::starting_at(level);
        self.round = 1;
        self.score = 0;
        self.correct_answers = 0;
        self.wrong_answers = 0;
        self.questions_asked = 0;
        self.bonus_time_earned = 0;
        self.current_streak = 0;
        self.longest_streak = 0;
        self.answers.clear();
        self.current_question = None;
        self.is_paused = false;
        self.started_at = SystemTime::now();
        self.factory.clear_history();

        info!(
            target: "game_engine",
            "Starting {} session {} at level {} (seed {})",
            mode,
            self.playthrough_id,
            level,
            self.factory.seed()
        );
        self.emit(GameEngineEvent::SessionStarted { mode, level });
        self.emit(GameEngineEvent::ScoreChanged(0));
        self.present_question();
    }

    fn present_question(&mut self) {
        let question = self
            .factory
            .generate(self.mode, self.progress.level(), self.round);
        if self.debug_mode {
            debug!(
                target: "game_engine",
                "Answer to {}: {}",
                question.prompt(),
                question.correct_answer
            );
        }
        self.questions_asked += 1;
        self.timer_state.start(self.mode.time_per_question());
        self.current_question = Some(question.clone());
        self.phase = SessionPhase::AwaitingAnswer;
        self.emit(GameEngineEvent::QuestionPresented(question));
        self.emit(GameEngineEvent::TimerStateChanged(self.timer_state.clone()));
    }

    /// `None` means the countdown ran out.
    fn submit_answer(&mut self, answer: Option<i64>) {
        if self.phase != SessionPhase::AwaitingAnswer || self.is_paused {
            return;
        }
        let question = match &self.current_question {
            Some(question) => question.clone(),
            None => return,
        };

        // the question is over: no tick may land after this point
        self.timer_state.stop();

        let is_correct = answer.is_some_and(|a| question.is_correct(a));
        let max_time = self.mode.time_per_question() as f64;
        let time_to_answer = self.timer_state.elapsed() as f64;
        let level = self.progress.level();

        let score_earned = calculate_score(&ScoreCalculationParams {
            operation: question.operation,
            is_correct,
            time_to_answer,
            max_time,
            level,
            mode: self.mode,
            difficulty: level,
        });
        let bonus_seconds = if is_correct {
            bonus_time(self.mode, time_to_answer, max_time)
        } else {
            0
        };

        if bonus_seconds > 0 {
            self.timer_state.add_time(bonus_seconds);
            self.bonus_time_earned += bonus_seconds;
            self.emit(GameEngineEvent::BonusTimeAwarded(bonus_seconds));
        }

        self.score += score_earned as u64;
        if is_correct {
            self.correct_answers += 1;
            self.current_streak += 1;
            self.longest_streak = self.longest_streak.max(self.current_streak);
        } else {
            self.wrong_answers += 1;
            self.current_streak = 0;
        }
        self.factory.record_outcome(&question.id, is_correct);

        let user_answer = UserAnswer {
            question_id: question.id.clone(),
            operation: question.operation,
            user_answer: answer,
            correct_answer: question.correct_answer,
            time_to_answer,
            is_correct,
            score_earned,
            bonus_time_earned: bonus_seconds,
            level,
            round: self.round,
        };
        debug!(
            target: "game_engine",
            "Round {} {}: answered {:?}, correct {}, +{} points, +{}s",
            self.round,
            question,
            answer,
            is_correct,
            score_earned,
            bonus_seconds
        );
        self.answers.push(user_answer.clone());
        self.emit(GameEngineEvent::AnswerRecorded(user_answer));
        self.emit(GameEngineEvent::ScoreChanged(self.score));

        let ends_session = if is_correct {
            if let Some(transition) = self.progress.record_correct() {
                self.stats_store
                    .update_highest_level(self.mode, transition.to);
                self.emit(GameEngineEvent::LevelChanged {
                    from: transition.from,
                    to: transition.to,
                    reason: LevelChangeReason::LevelUp,
                });
            }
            false
        } else {
            let outcome = self
                .progress
                .record_incorrect(self.settings.wrong_answer_policy);
            if let Some(transition) = outcome.transition {
                self.emit(GameEngineEvent::LevelChanged {
                    from: transition.from,
                    to: transition.to,
                    reason: LevelChangeReason::WrongAnswer,
                });
            }
            outcome.ends_session
        };

        self.phase = SessionPhase::ShowingFeedback { ends_session };
        self.emit(GameEngineEvent::TimerStateChanged(self.timer_state.clone()));
    }

    fn tick(&mut self, handle: TimerHandle) {
        if self.phase != SessionPhase::AwaitingAnswer {
            return;
        }
        match self.timer_state.tick(handle) {
            TickOutcome::Ignored => (),
            TickOutcome::Running(_) => {
                self.emit(GameEngineEvent::TimerStateChanged(self.timer_state.clone()));
            }
            TickOutcome::Expired => {
                info!(target: "game_engine", "Time expired on round {}", self.round);
                self.emit(GameEngineEvent::TimerStateChanged(self.timer_state.clone()));
                self.submit_answer(None);
            }
        }
    }

    fn continue_game(&mut self) {
        match self.phase {
            SessionPhase::ShowingFeedback { ends_session: true } => self.end_session(),
            SessionPhase::ShowingFeedback {
                ends_session: false,
            } => {
                if self.is_paused {
                    return;
                }
                self.round += 1;
                self.present_question();
            }
            _ => (),
        }
    }

    fn pause_game(&mut self) {
        if self.is_active() && !self.is_paused {
            self.is_paused = true;
            self.timer_state.pause();
            self.emit(GameEngineEvent::TimerStateChanged(self.timer_state.clone()));
        }
    }

    fn resume_game(&mut self) {
        if self.is_paused {
            self.is_paused = false;
            self.timer_state.resume();
            self.emit(GameEngineEvent::TimerStateChanged(self.timer_state.clone()));
        }
    }

    fn end_session(&mut self) {
        if !self.is_active() {
            return;
        }
        self.timer_state.stop();
        self.is_paused = false;
        self.phase = SessionPhase::Ended;

        let summary = self.session_summary(SystemTime::now());
        info!(
            target: "game_engine",
            "Session {} ended: score {}, level {} (max {}), {} questions",
            summary.playthrough_id,
            summary.score,
            summary.final_level,
            summary.max_level,
            summary.questions_asked
        );
        self.stats_store.record_session(&summary);
        self.emit(GameEngineEvent::TimerStateChanged(self.timer_state.clone()));
        self.emit(GameEngineEvent::SessionEnded(summary));
    }

    fn load_state(&mut self, snapshot: SessionSnapshot) {
        trace!(target: "game_engine", "Loading saved session {:?}", snapshot);
        // the running countdown ends here; none of its ticks may reach the restored one
        self.timer_state.stop();
        let min_next_handle = self.timer_state.next_handle();

        self.playthrough_id = snapshot.playthrough_id;
        self.mode = snapshot.mode;
        self.start_level = snapshot.mode.clamp_start_level(snapshot.start_level);
        self.progress = snapshot.progress;
        self.round = snapshot.round;
        self.score = snapshot.score;
        self.correct_answers = snapshot.correct_answers;
        self.wrong_answers = snapshot.wrong_answers;
        self.questions_asked = snapshot.questions_asked;
        self.bonus_time_earned = snapshot.bonus_time_earned;
        self.current_streak = snapshot.current_streak;
        self.longest_streak = snapshot.longest_streak;
        self.answers = snapshot.answers;
        self.current_question = snapshot.current_question;
        self.timer_state = snapshot.timer_state;
        self.timer_state.rehandle(min_next_handle);
        self.started_at = snapshot.started_at;

        self.phase = match &self.current_question {
            None => SessionPhase::Idle,
            Some(question) => match self.answers.last() {
                Some(last) if last.question_id == question.id => SessionPhase::ShowingFeedback {
                    ends_session: !last.is_correct
                        && self.settings.wrong_answer_policy == WrongAnswerPolicy::EndSession,
                },
                _ => SessionPhase::AwaitingAnswer,
            },
        };

        // a restored session waits for an explicit Resume
        self.is_paused = self.is_active();
        self.timer_state.pause();

        self.emit(GameEngineEvent::SessionStarted {
            mode: self.mode,
            level: self.progress.level(),
        });
        self.emit(GameEngineEvent::ScoreChanged(self.score));
        if let Some(question) = &self.current_question {
            self.emit(GameEngineEvent::QuestionPresented(question.clone()));
        }
        self.emit(GameEngineEvent::TimerStateChanged(self.timer_state.clone()));
    }

    fn change_settings(&mut self, change: &SettingsChange) {
        if self.settings.apply(change) {
            debug!(target: "game_engine", "Settings changed: {:?}", self.settings);
            self.emit(GameEngineEvent::SettingsChanged(self.settings.clone()));
        }
    }

    fn is_active(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::AwaitingAnswer | SessionPhase::ShowingFeedback { .. }
        )
    }

    pub fn session_summary(&self, ended_at: SystemTime) -> SessionSummary {
        SessionSummary {
            playthrough_id: self.playthrough_id,
            mode: self.mode,
            score: self.score,
            correct_answers: self.correct_answers,
            wrong_answers: self.wrong_answers,
            questions_asked: self.questions_asked,
            final_level: self.progress.level(),
            max_level: self.progress.max_level(),
            bonus_time_earned: self.bonus_time_earned,
            longest_streak: self.longest_streak,
            started_at: self.started_at,
            ended_at,
        }
    }

    /// `None` when no session is in progress.
    pub fn get_save_state(&self) -> Option<SessionSnapshot> {
        if !self.is_active() {
            return None;
        }
        let mut timer_state = self.timer_state.clone();
        timer_state.pause();
        Some(SessionSnapshot {
            playthrough_id: self.playthrough_id,
            mode: self.mode,
            start_level: self.start_level,
            progress: self.progress,
            round: self.round,
            score: self.score,
            correct_answers: self.correct_answers,
            wrong_answers: self.wrong_answers,
            questions_asked: self.questions_asked,
            bonus_time_earned: self.bonus_time_earned,
            current_streak: self.current_streak,
            longest_streak: self.longest_streak,
            answers: self.answers.clone(),
            current_question: self.current_question.clone(),
            timer_state,
            started_at: self.started_at,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn level(&self) -> u32 {
        self.progress.level()
    }

    pub fn progress(&self) -> &LevelProgress {
        &self.progress
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_question.as_ref()
    }

    pub fn answers(&self) -> &[UserAnswer] {
        &self.answers
    }

    pub fn timer_state(&self) -> &TimerState {
        &self.timer_state
    }

    /// Handle the host must pass back with each `Tick`.
    pub fn timer_handle(&self) -> Option<TimerHandle> {
        self.timer_state.handle()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn factory(&self) -> &QuestionFactory {
        &self.factory
    }
}
