//! Calculated-question datasets

use super::numeric::round_to;
use crate::enums::{Distribution, Status};
use crate::error::ModelError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Values a wildcard `{name}` takes, keyed by item number (from 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub distribution: Distribution,
    pub minimum: f64,
    pub maximum: f64,
    pub decimals: u32,
    #[serde(default)]
    pub items: BTreeMap<u32, f64>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, minimum: f64, maximum: f64) -> Self {
        Self {
            name: name.into(),
            status: Status::default(),
            distribution: Distribution::default(),
            minimum,
            maximum,
            decimals: 1,
            items: BTreeMap::new(),
        }
    }

    pub fn value(&self, index: u32) -> Option<f64> {
        self.items.get(&index).copied()
    }

    /// Replace the items with `count` fresh samples numbered from 1.
    pub fn generate<R: Rng + ?Sized>(&mut self, count: u32, rng: &mut R) -> Result<(), ModelError> {
        if !(self.minimum <= self.maximum) {
            return Err(ModelError::InvalidNumber(format!("{}..{}", self.minimum, self.maximum)));
        }
        if self.distribution == Distribution::LogUniform && self.minimum <= 0.0 {
            return Err(ModelError::InvalidNumber(self.minimum.to_string()));
        }
        self.items.clear();
        for index in 1..=count {
            let raw = match self.distribution {
                Distribution::Uniform => rng.gen_range(self.minimum..=self.maximum),
                Distribution::LogUniform => rng
                    .gen_range(self.minimum.ln()..=self.maximum.ln())
                    .exp(),
            };
            let value = round_to(raw, self.decimals).clamp(self.minimum, self.maximum);
            self.items.insert(index, value);
        }
        tracing::debug!(dataset = %self.name, count, "generated dataset items");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn uniform_values_in_range_and_rounded() {
        let mut dataset = Dataset::new("x", 1.0, 10.0);
        dataset.decimals = 2;
        let mut rng = StdRng::seed_from_u64(7);
        dataset.generate(20, &mut rng).unwrap();

        assert_eq!(dataset.items.len(), 20);
        for value in dataset.items.values() {
            assert!((1.0..=10.0).contains(value));
            assert_eq!(round_to(*value, 2), *value);
        }
    }

    #[test]
    fn log_uniform_needs_positive_minimum() {
        let mut dataset = Dataset::new("x", 0.0, 10.0);
        dataset.distribution = Distribution::LogUniform;
        let mut rng = StdRng::seed_from_u64(1);
        assert!(dataset.generate(3, &mut rng).is_err());

        dataset.minimum = 0.5;
        dataset.generate(3, &mut rng).unwrap();
        assert!(dataset.items.values().all(|v| (0.5..=10.0).contains(v)));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let mut dataset = Dataset::new("x", 5.0, 1.0);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(dataset.generate(1, &mut rng).is_err());
        assert_eq!(dataset.value(1), None);
    }
}
