use serde::{Deserialize, Serialize};

use super::Operation;

/// Digit range and operation mix used to build questions at one level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultySettings {
    pub min_digits: u32,
    pub max_digits: u32,
    pub operations: Vec<Operation>,
    /// Aligned with `operations`; only relative magnitudes matter.
    pub weights: Vec<f64>,
}

impl DifficultySettings {
    pub fn new(
        min_digits: u32,
        max_digits: u32,
        operations: &[Operation],
        weights: &[f64],
    ) -> Self {
        Self {
            min_digits,
            max_digits,
            operations: operations.to_vec(),
            weights: weights.to_vec(),
        }
    }

    /// Returns a description of the first broken invariant, if any.
    pub fn invariant_violation(&self) -> Option<String> {
        if self.operations.len() != self.weights.len() {
            return Some(format!(
                "{} operations but {} weights",
                self.operations.len(),
                self.weights.len()
            ));
        }
        if self.min_digits == 0 {
            return Some("min_digits must be at least 1".to_string());
        }
        if self.min_digits > self.max_digits {
            return Some(format!(
                "min_digits {} exceeds max_digits {}",
                self.min_digits, self.max_digits
            ));
        }
        if self.weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Some(format!("invalid weights {:?}", self.weights));
        }
        for (i, op) in self.operations.iter().enumerate() {
            if self.operations[..i].contains(op) {
                return Some(format!("duplicate operation {}", op));
            }
        }
        None
    }

    pub fn weight_of(&self, operation: Operation) -> Option<f64> {
        self.operations
            .iter()
            .position(|op| *op == operation)
            .map(|i| self.weights[i])
    }

    /// Largest operand value the digit range allows.
    pub fn max_value(&self) -> u64 {
        10u64.saturating_pow(self.max_digits).saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invariants() {
        let ok = DifficultySettings::new(1, 2, &[Operation::Addition], &[1.0]);
        assert_eq!(ok.invariant_violation(), None);

        let mismatched = DifficultySettings::new(1, 2, &[Operation::Addition], &[0.5, 0.5]);
        assert!(mismatched.invariant_violation().is_some());

        let inverted = DifficultySettings::new(3, 2, &[Operation::Addition], &[1.0]);
        assert!(inverted
            .invariant_violation()
            .unwrap()
            .contains("exceeds"));

        let duplicate = DifficultySettings::new(
            1,
            1,
            &[Operation::Addition, Operation::Addition],
            &[0.5, 0.5],
        );
        assert!(duplicate
            .invariant_violation()
            .unwrap()
            .contains("duplicate"));
    }

    #[test]
    fn test_weight_of() {
        let settings = DifficultySettings::new(
            2,
            3,
            &[Operation::Addition, Operation::Division],
            &[0.8, 0.2],
        );
        assert_eq!(settings.weight_of(Operation::Division), Some(0.2));
        assert_eq!(settings.weight_of(Operation::Subtraction), None);
        assert_eq!(settings.max_value(), 999);
    }
}
