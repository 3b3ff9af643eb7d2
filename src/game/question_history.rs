use std::collections::VecDeque;

use crate::model::{Operation, Question};

pub const HISTORY_CAPACITY: usize = 10;
pub const RECENT_OPERATIONS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub question: Question,
    /// Unknown until the player answers or the countdown expires.
    pub is_correct: Option<bool>,
}

/// The last few generated questions, oldest first. Analytics only.
#[derive(Debug, Clone, Default)]
pub struct QuestionHistory {
    entries: VecDeque<HistoryEntry>,
}

impl QuestionHistory {
    pub fn add(&mut self, question: Question) {
        self.entries.push_back(HistoryEntry {
            question,
            is_correct: None,
        });
        while self.entries.len() > HISTORY_CAPACITY {
            self.entries.pop_front();
        }
    }

    /// Returns false when the question is no longer in the history.
    pub fn record_outcome(&mut self, question_id: &str, is_correct: bool) -> bool {
        match self
            .entries
            .iter_mut()
            .rev()
            .find(|entry| entry.question.id == question_id)
        {
            Some(entry) => {
                entry.is_correct = Some(is_correct);
                true
            }
            None => false,
        }
    }

    pub fn recent_operations(&self) -> Vec<Operation> {
        let skip = self.entries.len().saturating_sub(RECENT_OPERATIONS);
        self.entries
            .iter()
            .skip(skip)
            .map(|entry| entry.question.operation)
            .collect()
    }

    /// Share of held questions answered correctly; unanswered ones count as misses.
    pub fn accuracy(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        let correct = self
            .entries
            .iter()
            .filter(|entry| entry.is_correct == Some(true))
            .count();
        correct as f64 / self.entries.len() as f64
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(n: u32, operation: Operation) -> Question {
        Question::new(format!("q{}", n), operation, 2, 1, 0, 1, n, 0)
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = QuestionHistory::default();
        for n in 0..15 {
            history.add(question(n, Operation::Addition));
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history.entries().next().unwrap().question.id, "q5");
        assert!(!history.record_outcome("q0", true));
    }

    #[test]
    fn test_recent_operations() {
        let mut history = QuestionHistory::default();
        history.add(question(0, Operation::Division));
        history.add(question(1, Operation::Addition));
        assert_eq!(
            history.recent_operations(),
            vec![Operation::Division, Operation::Addition]
        );
        for n in 2..7 {
            history.add(question(n, Operation::Subtraction));
        }
        assert_eq!(history.recent_operations(), vec![Operation::Subtraction; 5]);
    }

    #[test]
    fn test_accuracy() {
        let mut history = QuestionHistory::default();
        assert_eq!(history.accuracy(), 0.0);
        for n in 0..4 {
            history.add(question(n, Operation::Addition));
        }
        assert!(history.record_outcome("q0", true));
        assert!(history.record_outcome("q1", true));
        assert!(history.record_outcome("q2", false));
        assert_eq!(history.accuracy(), 0.5);

        history.clear();
        assert!(history.is_empty());
    }
}
