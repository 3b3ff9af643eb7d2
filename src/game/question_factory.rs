use log::{debug, warn};
use rand::distr::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use super::difficulty_resolver::{select_operation, DifficultyResolver};
use super::operand_generator::{
    addition_pair, division_pair, multiplication_pair, subtraction_pair,
};
use super::question_history::QuestionHistory;
use crate::error::GameError;
use crate::model::{GameMode, Operation, Question};

const ID_SUFFIX_LEN: usize = 9;

/// Turns (mode, level, round) into a question. Owns the RNG, so a fixed seed
/// replays the same sequence of operations and operands.
#[derive(Debug, Clone)]
pub struct QuestionFactory {
    resolver: DifficultyResolver,
    rng: StdRng,
    seed: u64,
    history: QuestionHistory,
}

impl Default for QuestionFactory {
    fn default() -> Self {
        Self::new(None)
    }
}

impl QuestionFactory {
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_resolver(DifficultyResolver::default(), seed)
    }

    pub fn with_resolver(resolver: DifficultyResolver, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::rng().next_u64());
        Self {
            resolver,
            rng: StdRng::seed_from_u64(seed),
            seed,
            history: QuestionHistory::default(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn resolver(&self) -> &DifficultyResolver {
        &self.resolver
    }

    pub fn history(&self) -> &QuestionHistory {
        &self.history
    }

    pub fn record_outcome(&mut self, question_id: &str, is_correct: bool) {
        self.history.record_outcome(question_id, is_correct);
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Never fails: any generation error degrades to a single-digit addition.
    pub fn generate(&mut self, mode: GameMode, level: u32, round: u32) -> Question {
        let level = level.max(1);
        let question = match self.try_generate(mode, level, round) {
            Ok(question) => {
                debug!(
                    target: "question_factory",
                    "Generated {} question {} for level {} round {}: {}",
                    mode,
                    question.id,
                    level,
                    round,
                    question.prompt()
                );
                question
            }
            Err(e) => {
                warn!(
                    target: "question_factory",
                    "Question generation failed for {} level {}: {}; using fallback",
                    mode,
                    level,
                    e
                );
                self.fallback(level, round)
            }
        };
        self.history.add(question.clone());
        question
    }

    fn try_generate(
        &mut self,
        mode: GameMode,
        level: u32,
        round: u32,
    ) -> Result<Question, GameError> {
        let difficulty = self.resolver.resolve(mode, level)?;
        let operation =
            select_operation(&difficulty.operations, &difficulty.weights, &mut self.rng);

        let (operand1, operand2) = match operation {
            Operation::Addition => addition_pair(&mut self.rng, &difficulty),
            Operation::Subtraction => subtraction_pair(&mut self.rng, &difficulty),
            Operation::Multiplication => multiplication_pair(&mut self.rng, &difficulty),
            Operation::Division => {
                let triple = division_pair(&mut self.rng, &difficulty)?;
                (triple.dividend, triple.divisor)
            }
        };
        let correct_answer = compute_answer(operation, operand1, operand2)?;

        let created_at = chrono::Utc::now().timestamp_millis();
        let id = format!(
            "{}_{}_{}_{}_{}",
            operation.key(),
            level,
            round,
            created_at,
            self.id_suffix()
        );

        Ok(Question::new(
            id,
            operation,
            operand1,
            operand2,
            correct_answer,
            level,
            round,
            created_at,
        ))
    }

    fn fallback(&mut self, level: u32, round: u32) -> Question {
        let operand1: u64 = self.rng.random_range(1..=9);
        let operand2: u64 = self.rng.random_range(1..=9);
        let created_at = chrono::Utc::now().timestamp_millis();
        Question::new(
            format!("fallback_{}", created_at),
            Operation::Addition,
            operand1,
            operand2,
            (operand1 + operand2) as i64,
            level,
            round,
            created_at,
        )
    }

    /// Lowercase base36.
    fn id_suffix(&mut self) -> String {
        (&mut self.rng)
            .sample_iter(Alphanumeric)
            .take(ID_SUFFIX_LEN)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect()
    }
}

fn compute_answer(operation: Operation, operand1: u64, operand2: u64) -> Result<i64, GameError> {
    let overflow = || GameError::Overflow(operation);
    let a = i64::try_from(operand1).map_err(|_| overflow())?;
    let b = i64::try_from(operand2).map_err(|_| overflow())?;
    match operation {
        Operation::Addition => a.checked_add(b),
        Operation::Subtraction => a.checked_sub(b),
        Operation::Multiplication => a.checked_mul(b),
        Operation::Division => a.checked_div(b),
    }
    .ok_or_else(overflow)
}

/// One-off generation with a fresh, randomly seeded factory.
pub fn generate_question(mode: GameMode, level: u32, round: u32) -> Question {
    QuestionFactory::new(None).generate(mode, level, round)
}

#[cfg(test)]
mod tests {
    use test_context::test_context;

    use super::*;
    use crate::game::difficulty_table::DifficultyTable;
    use crate::model::DifficultySettings;
    use crate::tests::UsingLogger;

    #[test_context(UsingLogger)]
    #[test]
    fn test_generated_questions_are_valid(_: &mut UsingLogger) {
        let mut factory = QuestionFactory::new(Some(11));
        for mode in GameMode::all() {
            for level in [1, 2, 5, 12, 30, 60, 100, 150, 500] {
                for round in 0..50 {
                    let question = factory.generate(mode, level, round);
                    assert!(question.is_valid(), "invalid question {:?}", question);
                    assert!(!question.id.starts_with("fallback_"));
                    assert_eq!(question.level, level);
                    assert_eq!(question.round, round);
                    if question.operation == Operation::Subtraction {
                        assert!(question.correct_answer >= 0);
                    }
                    if question.operation == Operation::Division {
                        assert_ne!(question.operand2, 0);
                        assert_eq!(question.operand1 % question.operand2, 0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_easy_level_one_single_digits() {
        let mut factory = QuestionFactory::new(Some(12));
        for round in 0..1_000 {
            let question = factory.generate(GameMode::Easy, 1, round);
            assert_eq!(question.operation, Operation::Addition);
            assert!(question.operand1 <= 9, "{}", question);
            assert!(question.operand2 <= 9, "{}", question);
        }
    }

    #[test]
    fn test_id_format() {
        let mut factory = QuestionFactory::new(Some(13));
        let question = factory.generate(GameMode::Medium, 7, 3);
        let parts: Vec<&str> = question.id.split('_').collect();
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[0], question.operation.key());
        assert_eq!(parts[1], "7");
        assert_eq!(parts[2], "3");
        assert_eq!(parts[3], question.created_at.to_string());
        assert_eq!(parts[4].len(), ID_SUFFIX_LEN);
        assert!(parts[4]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_seed_is_reproducible() {
        let mut first = QuestionFactory::new(Some(2024));
        let mut second = QuestionFactory::new(Some(2024));
        assert_eq!(first.seed(), 2024);
        for round in 0..30 {
            let a = first.generate(GameMode::Hard, 40, round);
            let b = second.generate(GameMode::Hard, 40, round);
            assert_eq!(
                (a.operation, a.operand1, a.operand2, a.correct_answer),
                (b.operation, b.operand1, b.operand2, b.correct_answer)
            );
        }
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_malformed_table_falls_back(_: &mut UsingLogger) {
        let table = DifficultyTable::from_breakpoints(vec![(
            GameMode::Easy,
            1,
            DifficultySettings::new(3, 1, &[Operation::Addition], &[1.0]),
        )]);
        let mut factory = QuestionFactory::with_resolver(DifficultyResolver::new(table), Some(5));
        for mode in GameMode::all() {
            let question = factory.generate(mode, 4, 2);
            assert!(question.id.starts_with("fallback_"));
            assert_eq!(question.operation, Operation::Addition);
            assert!((1..=9).contains(&question.operand1));
            assert!((1..=9).contains(&question.operand2));
            assert!(question.is_valid());
            assert_eq!(question.level, 4);
            assert_eq!(question.round, 2);
        }
    }

    #[test]
    fn test_history_tracks_recent_questions() {
        let mut factory = QuestionFactory::new(Some(14));
        let mut last_id = String::new();
        for round in 0..12 {
            last_id = factory.generate(GameMode::Easy, 3, round).id.clone();
        }
        assert_eq!(factory.history().len(), 10);
        factory.record_outcome(&last_id, true);
        assert!((factory.history().accuracy() - 0.1).abs() < 1e-9);
        factory.clear_history();
        assert!(factory.history().is_empty());
    }

    #[test]
    fn test_compute_answer_overflow() {
        assert_eq!(
            compute_answer(Operation::Multiplication, u64::MAX, 2),
            Err(GameError::Overflow(Operation::Multiplication))
        );
        assert_eq!(compute_answer(Operation::Subtraction, 3, 5), Ok(-2));
        assert_eq!(compute_answer(Operation::Division, 48, 4), Ok(12));
    }
}
