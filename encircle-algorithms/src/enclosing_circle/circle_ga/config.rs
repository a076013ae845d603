use super::error::Error;
use encircle_challenges::enclosing_circle::PENALTY_WEIGHT;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub population_size: usize,
    pub generations: usize,
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    pub penalty_weight: f64,
    /// Mutation standard deviation as a fraction of the mutated gene's range.
    pub mutation_scale: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            population_size: 100,
            generations: 200,
            mutation_rate: 0.1,
            crossover_rate: 0.8,
            penalty_weight: PENALTY_WEIGHT,
            mutation_scale: 0.05,
        }
    }
}

impl Config {
    /// Merges `hyperparameters` over the defaults and validates the result.
    pub fn initialize(hyperparameters: &Option<Map<String, Value>>) -> Result<Self, Error> {
        let mut merged = serde_json::to_value(Self::default())
            .map_err(|e| Error::InvalidConfiguration(e.to_string()))?;
        if let (Value::Object(ref mut obj), Some(map)) = (&mut merged, hyperparameters) {
            for (k, v) in map {
                obj.insert(k.clone(), v.clone());
            }
        }
        let config: Self = serde_json::from_value(merged)
            .map_err(|e| Error::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rates outside [0, 1] are accepted and behave as 0 or 1.
    pub fn validate(&self) -> Result<(), Error> {
        if self.population_size < 2 {
            return Err(Error::InvalidConfiguration(format!(
                "population_size ({}) must be at least 2",
                self.population_size
            )));
        }
        if self.population_size % 2 != 0 {
            return Err(Error::InvalidConfiguration(format!(
                "population_size ({}) must be even so parents pair up",
                self.population_size
            )));
        }
        if self.generations == 0 {
            return Err(Error::InvalidConfiguration(
                "generations must be at least 1".to_string(),
            ));
        }
        if !self.penalty_weight.is_finite() || self.penalty_weight < 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "penalty_weight ({}) must be finite and >= 0",
                self.penalty_weight
            )));
        }
        if !self.mutation_scale.is_finite() || self.mutation_scale < 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "mutation_scale ({}) must be finite and >= 0",
                self.mutation_scale
            )));
        }
        Ok(())
    }
}
