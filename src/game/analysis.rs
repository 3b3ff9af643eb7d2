use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::operand_generator::digit_count;
use crate::model::{Operation, Question, UserAnswer};

pub const MIN_LEVEL: u32 = 1;
pub const MAX_LEVEL: u32 = 999;
pub const MAX_ESTIMATED_SECONDS: f64 = 25.0;
const STRONG_ACCURACY: f64 = 0.8;
const WEAK_ACCURACY: f64 = 0.6;
const ADAPTIVE_WINDOW: usize = 5;
const ADAPTIVE_MIN_RESULTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyClass {
    Easy,
    Medium,
    Hard,
    Expert,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyAnalysis {
    pub complexity: u32,
    pub estimated_time: f64,
    pub class: DifficultyClass,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub accuracy: f64,
    pub average_time: f64,
    pub strong_operations: Vec<Operation>,
    pub weak_operations: Vec<Operation>,
    pub recommended_level: u32,
}

impl Default for PerformanceReport {
    fn default() -> Self {
        Self {
            accuracy: 0.0,
            average_time: 0.0,
            strong_operations: vec![],
            weak_operations: vec![],
            recommended_level: MIN_LEVEL,
        }
    }
}

pub fn analyze_difficulty(question: &Question) -> DifficultyAnalysis {
    let digits = digit_count(question.operand1).max(digit_count(question.operand2));
    let complexity = digits * question.operation.complexity();
    let estimated_time = (2.0 + complexity as f64 * 1.5).min(MAX_ESTIMATED_SECONDS);
    let class = match complexity {
        0..=4 => DifficultyClass::Easy,
        5..=8 => DifficultyClass::Medium,
        9..=16 => DifficultyClass::Hard,
        _ => DifficultyClass::Expert,
    };
    DifficultyAnalysis {
        complexity,
        estimated_time,
        class,
    }
}

pub fn analyze_performance(answers: &[UserAnswer]) -> PerformanceReport {
    if answers.is_empty() {
        return PerformanceReport::default();
    }

    let total = answers.len() as f64;
    let correct = answers.iter().filter(|a| a.is_correct).count();
    let accuracy = correct as f64 / total;
    let average_time = answers.iter().map(|a| a.time_to_answer).sum::<f64>() / total;

    let by_operation = answers
        .iter()
        .into_group_map_by(|a| a.operation)
        .into_iter()
        .map(|(operation, group)| {
            let right = group.iter().filter(|a| a.is_correct).count();
            (operation, right as f64 / group.len() as f64)
        })
        .sorted_by_key(|(operation, _)| *operation)
        .collect::<Vec<_>>();

    let strong_operations = by_operation
        .iter()
        .filter(|(_, share)| *share >= STRONG_ACCURACY)
        .map(|(operation, _)| *operation)
        .collect();
    let weak_operations = by_operation
        .iter()
        .filter(|(_, share)| *share < WEAK_ACCURACY)
        .map(|(operation, _)| *operation)
        .collect();

    let current_level = answers.iter().map(|a| a.level).max().unwrap_or(MIN_LEVEL);
    let recommended_level = if accuracy >= 0.9 {
        current_level.saturating_add(2).min(MAX_LEVEL)
    } else if accuracy >= 0.7 {
        current_level.saturating_add(1).min(MAX_LEVEL)
    } else if accuracy < 0.5 {
        current_level.saturating_sub(1).max(MIN_LEVEL)
    } else {
        current_level
    };

    PerformanceReport {
        accuracy,
        average_time,
        strong_operations,
        weak_operations,
        recommended_level,
    }
}

/// Nudges the level by one based on the last few results.
pub fn adaptive_level(recent: &[bool], current_level: u32) -> u32 {
    if recent.len() < ADAPTIVE_MIN_RESULTS {
        return current_level;
    }
    let window = &recent[recent.len().saturating_sub(ADAPTIVE_WINDOW)..];
    let accuracy = window.iter().filter(|r| **r).count() as f64 / window.len() as f64;
    if accuracy >= 0.9 {
        current_level.saturating_add(1).min(MAX_LEVEL)
    } else if accuracy <= 0.3 {
        current_level.saturating_sub(1).max(MIN_LEVEL)
    } else {
        current_level
    }
}
