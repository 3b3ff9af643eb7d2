use log::trace;
use rand::Rng;

use super::difficulty_table::DifficultyTable;
use super::threshold::resolve_by_threshold;
use crate::error::GameError;
use crate::model::{DifficultySettings, GameMode, Operation};

/// Levels past the authored table per digit-growth tick.
pub const LEVELS_PER_GROWTH_TICK: u32 = 10;
/// Levels past the authored table before division gets extra weight.
pub const DIVISION_BOOST_AFTER: u32 = 20;
pub const DIVISION_WEIGHT_STEP: f64 = 0.1;
pub const DIVISION_WEIGHT_CAP: f64 = 0.7;

/// Maps (mode, level) to a difficulty profile, extrapolating past the last breakpoint.
#[derive(Debug, Clone, Default)]
pub struct DifficultyResolver {
    table: DifficultyTable,
}

impl DifficultyResolver {
    pub fn new(table: DifficultyTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &DifficultyTable {
        &self.table
    }

    pub fn resolve(&self, mode: GameMode, level: u32) -> Result<DifficultySettings, GameError> {
        let level = level.max(1);
        let breakpoints = self.table.breakpoints(mode);
        let (threshold, base) =
            resolve_by_threshold(breakpoints, level).ok_or(GameError::EmptyTable(mode))?;

        if let Some(reason) = base.invariant_violation() {
            return Err(GameError::MalformedProfile {
                mode,
                threshold,
                reason,
            });
        }

        let max_defined_level = self.table.max_defined_level(mode).unwrap_or(threshold);
        if level > max_defined_level {
            let settings = extrapolate(mode, level, max_defined_level, base);
            trace!(
                target: "difficulty",
                "Extrapolated {} level {} past {}: {:?}",
                mode,
                level,
                max_defined_level,
                settings
            );
            return Ok(settings);
        }

        Ok(base.clone())
    }
}

fn extrapolate(
    mode: GameMode,
    level: u32,
    max_defined_level: u32,
    base: &DifficultySettings,
) -> DifficultySettings {
    let excess = level - max_defined_level;
    let progression = excess / LEVELS_PER_GROWTH_TICK;
    let config = mode.config();

    let max_digits = config
        .max_digit_growth
        .apply(base.max_digits, progression)
        .max(base.max_digits);
    let min_digits = config
        .min_digit_growth
        .apply(base.min_digits, progression)
        .min(max_digits);

    let mut weights = base.weights.clone();
    if excess > DIVISION_BOOST_AFTER {
        if let Some(index) = base
            .operations
            .iter()
            .position(|op| *op == Operation::Division)
        {
            weights[index] = (weights[index] + DIVISION_WEIGHT_STEP).min(DIVISION_WEIGHT_CAP);
            let sum: f64 = weights.iter().sum();
            if sum > 0.0 {
                weights.iter_mut().for_each(|w| *w /= sum);
            }
        }
    }

    DifficultySettings {
        min_digits,
        max_digits,
        operations: base.operations.clone(),
        weights,
    }
}

/// Weighted roulette over `operations`.
pub fn select_operation<R: Rng>(
    operations: &[Operation],
    weights: &[f64],
    rng: &mut R,
) -> Operation {
    match operations {
        [] => return Operation::Addition,
        [only] => return *only,
        _ => (),
    }

    let total: f64 = weights.iter().sum();
    let mut remaining = rng.random::<f64>() * total;
    for (operation, weight) in operations.iter().zip(weights) {
        remaining -= weight;
        if remaining <= 0.0 {
            return *operation;
        }
    }
    operations[operations.len() - 1]
}
