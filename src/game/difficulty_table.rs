use itertools::Itertools;
use std::collections::BTreeMap;

use crate::model::{DifficultySettings, GameMode, Operation};

const ADD: &[Operation] = &[Operation::Addition];
const ADD_SUB: &[Operation] = &[Operation::Addition, Operation::Subtraction];
const ADD_SUB_MUL: &[Operation] = &[
    Operation::Addition,
    Operation::Subtraction,
    Operation::Multiplication,
];
const ALL: &[Operation] = &[
    Operation::Addition,
    Operation::Subtraction,
    Operation::Multiplication,
    Operation::Division,
];

/// (level, min digits, max digits, operations, weights)
type Breakpoint = (u32, u32, u32, &'static [Operation], &'static [f64]);

const EASY_BREAKPOINTS: &[Breakpoint] = &[
    (1, 1, 1, ADD, &[1.0]),
    (2, 1, 2, ADD, &[1.0]),
    (3, 1, 2, ADD_SUB, &[0.7, 0.3]),
    (5, 2, 2, ADD_SUB, &[0.6, 0.4]),
    (8, 2, 3, ADD_SUB, &[0.5, 0.5]),
    (10, 2, 3, ADD_SUB, &[0.4, 0.6]),
    (15, 2, 3, ADD_SUB, &[0.3, 0.7]),
    (20, 3, 3, ADD_SUB, &[0.2, 0.8]),
    (30, 3, 4, ADD_SUB, &[0.1, 0.9]),
    (50, 3, 4, ADD_SUB, &[0.1, 0.9]),
];

const MEDIUM_BREAKPOINTS: &[Breakpoint] = &[
    (1, 2, 2, ADD_SUB, &[0.6, 0.4]),
    (3, 2, 2, ADD_SUB_MUL, &[0.4, 0.4, 0.2]),
    (5, 2, 3, ADD_SUB_MUL, &[0.3, 0.3, 0.4]),
    (8, 2, 3, ALL, &[0.25, 0.25, 0.35, 0.15]),
    (12, 3, 3, ALL, &[0.2, 0.2, 0.4, 0.2]),
    (18, 3, 4, ALL, &[0.15, 0.15, 0.45, 0.25]),
    (25, 3, 4, ALL, &[0.1, 0.1, 0.5, 0.3]),
    (35, 3, 5, ALL, &[0.1, 0.1, 0.4, 0.4]),
    (50, 4, 5, ALL, &[0.05, 0.05, 0.4, 0.5]),
];

const HARD_BREAKPOINTS: &[Breakpoint] = &[
    (1, 2, 3, ADD_SUB_MUL, &[0.3, 0.3, 0.4]),
    (3, 2, 3, ALL, &[0.2, 0.2, 0.4, 0.2]),
    (6, 3, 3, ALL, &[0.15, 0.15, 0.45, 0.25]),
    (10, 3, 4, ALL, &[0.1, 0.1, 0.5, 0.3]),
    (15, 3, 4, ALL, &[0.1, 0.1, 0.4, 0.4]),
    (22, 4, 4, ALL, &[0.05, 0.05, 0.45, 0.45]),
    (30, 4, 5, ALL, &[0.05, 0.05, 0.4, 0.5]),
    (40, 4, 6, ALL, &[0.05, 0.05, 0.35, 0.55]),
    (60, 5, 6, ALL, &[0.05, 0.05, 0.3, 0.6]),
    (100, 5, 7, ALL, &[0.05, 0.05, 0.25, 0.65]),
];

/// Per-mode breakpoint tables, each sorted by ascending level threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyTable {
    modes: BTreeMap<GameMode, Vec<(u32, DifficultySettings)>>,
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl DifficultyTable {
    pub fn standard() -> Self {
        let build = |breakpoints: &[Breakpoint]| {
            breakpoints
                .iter()
                .map(|&(level, min, max, ops, weights)| {
                    (level, DifficultySettings::new(min, max, ops, weights))
                })
                .collect::<Vec<_>>()
        };
        let mut modes = BTreeMap::new();
        modes.insert(GameMode::Easy, build(EASY_BREAKPOINTS));
        modes.insert(GameMode::Medium, build(MEDIUM_BREAKPOINTS));
        modes.insert(GameMode::Hard, build(HARD_BREAKPOINTS));
        Self { modes }
    }

    /// Builds a table from unsorted breakpoints; later duplicates of a threshold win.
    pub fn from_breakpoints(
        breakpoints: impl IntoIterator<Item = (GameMode, u32, DifficultySettings)>,
    ) -> Self {
        let modes = breakpoints
            .into_iter()
            .map(|(mode, level, settings)| (mode, (level, settings)))
            .into_group_map()
            .into_iter()
            .map(|(mode, entries)| {
                let sorted = entries
                    .into_iter()
                    .rev()
                    .unique_by(|(level, _)| *level)
                    .sorted_by_key(|(level, _)| *level)
                    .collect();
                (mode, sorted)
            })
            .collect();
        Self { modes }
    }

    pub fn breakpoints(&self, mode: GameMode) -> &[(u32, DifficultySettings)] {
        self.modes.get(&mode).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn max_defined_level(&self, mode: GameMode) -> Option<u32> {
        self.breakpoints(mode).last().map(|(level, _)| *level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_tables_are_sorted_and_valid() {
        let table = DifficultyTable::standard();
        for mode in GameMode::all() {
            let breakpoints = table.breakpoints(mode);
            assert!(!breakpoints.is_empty());
            assert!(breakpoints
                .iter()
                .tuple_windows()
                .all(|((a, _), (b, _))| a < b));
            for (level, settings) in breakpoints {
                assert_eq!(
                    settings.invariant_violation(),
                    None,
                    "{} level {}",
                    mode,
                    level
                );
            }
        }
        assert_eq!(table.max_defined_level(GameMode::Easy), Some(50));
        assert_eq!(table.max_defined_level(GameMode::Medium), Some(50));
        assert_eq!(table.max_defined_level(GameMode::Hard), Some(100));
    }

    #[test]
    fn test_from_breakpoints_sorts() {
        let table = DifficultyTable::from_breakpoints(vec![
            (
                GameMode::Easy,
                10,
                DifficultySettings::new(2, 2, ADD, &[1.0]),
            ),
            (GameMode::Easy, 1, DifficultySettings::new(1, 1, ADD, &[1.0])),
            (GameMode::Easy, 1, DifficultySettings::new(1, 2, ADD, &[1.0])),
        ]);
        let breakpoints = table.breakpoints(GameMode::Easy);
        assert_eq!(breakpoints.len(), 2);
        assert_eq!(breakpoints[0].0, 1);
        assert_eq!(breakpoints[0].1.max_digits, 2);
        assert_eq!(breakpoints[1].0, 10);
        assert!(table.breakpoints(GameMode::Hard).is_empty());
        assert_eq!(table.max_defined_level(GameMode::Hard), None);
    }
}
