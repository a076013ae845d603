use super::config::Config;
use super::error::Error;
use super::operators::{self, Perturbation};
use super::population::{self, GeneBounds};
use encircle_challenges::geometry::{Circle, PointCloud};
use log::{debug, info};
use logging_timer::time;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const LOG_INTERVAL: usize = 20;

/// Outcome of a completed run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GaResult {
    /// Best candidate seen in any generation.
    pub best_circle: Circle,
    pub best_fitness: f64,
    /// Minimum fitness of each generation, one entry per generation.
    pub history: Vec<f64>,
}

/// Best-so-far candidate and the per-generation convergence history.
#[derive(Debug, Clone, Default)]
pub struct Convergence {
    best: Option<(Circle, f64)>,
    history: Vec<f64>,
}

impl Convergence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(generations: usize) -> Self {
        Self {
            best: None,
            history: Vec::with_capacity(generations),
        }
    }

    /// Records one generation and returns its minimum fitness.
    /// The best-so-far is replaced only on strict improvement.
    pub fn record(&mut self, population: &[Circle], fitness: &[f64]) -> Result<f64, Error> {
        if population.len() != fitness.len() {
            return Err(Error::FitnessMismatch {
                population: population.len(),
                fitness: fitness.len(),
            });
        }
        let (best_idx, generation_best) = fitness.iter().enumerate().fold(
            (None, f64::INFINITY),
            |(best_idx, best), (i, &f)| {
                if f < best {
                    (Some(i), f)
                } else {
                    (best_idx, best)
                }
            },
        );
        if let Some(idx) = best_idx {
            if generation_best < self.best_fitness() {
                self.best = Some((population[idx], generation_best));
            }
        }
        self.history.push(generation_best);
        Ok(generation_best)
    }

    pub fn best(&self) -> Option<(Circle, f64)> {
        self.best
    }

    /// `f64::INFINITY` until a generation has been recorded.
    pub fn best_fitness(&self) -> f64 {
        self.best.map_or(f64::INFINITY, |(_, f)| f)
    }

    pub fn history(&self) -> &[f64] {
        &self.history
    }

    pub fn finish(self) -> Option<GaResult> {
        let (best_circle, best_fitness) = self.best?;
        Some(GaResult {
            best_circle,
            best_fitness,
            history: self.history,
        })
    }
}

/// Genetic search for the minimum enclosing circle of a fixed point cloud.
///
/// The optimizer owns its random source, so two optimizers built from the same
/// seed, points and config produce identical results. `run` consumes the
/// optimizer; callers wanting several runs build several optimizers.
pub struct CircleOptimizer<R: Rng = SmallRng> {
    points: PointCloud,
    config: Config,
    perturbation: Perturbation,
    population: Vec<Circle>,
    rng: R,
}

impl CircleOptimizer<SmallRng> {
    pub fn from_seed(points: PointCloud, config: Config, seed: &[u8; 32]) -> Result<Self, Error> {
        Self::new(points, config, SmallRng::from_seed(seed.clone()))
    }
}

impl<R: Rng> CircleOptimizer<R> {
    /// Validates the inputs, derives gene bounds and draws the initial population.
    pub fn new(points: PointCloud, config: Config, mut rng: R) -> Result<Self, Error> {
        config.validate()?;
        if !points.is_finite() {
            return Err(Error::InvalidConfiguration(
                "point cloud contains non-finite coordinates".to_string(),
            ));
        }
        let bounds = GeneBounds::from_points(&points).ok_or_else(|| {
            Error::InvalidConfiguration("point cloud must contain at least one point".to_string())
        })?;
        let perturbation = Perturbation::new(bounds, config.mutation_scale)?;
        let population = population::initialize(&bounds, config.population_size, &mut rng);
        Ok(Self {
            points,
            config,
            perturbation,
            population,
            rng,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn bounds(&self) -> &GeneBounds {
        self.perturbation.bounds()
    }

    pub fn points(&self) -> &PointCloud {
        &self.points
    }

    pub fn population(&self) -> &[Circle] {
        &self.population
    }

    pub fn evaluate_fitness(&self) -> Vec<f64> {
        operators::evaluate_fitness(&self.population, &self.points, self.config.penalty_weight)
    }

    pub fn select(&mut self, fitness: &[f64]) -> Result<Vec<Circle>, Error> {
        operators::select(&self.population, fitness, &mut self.rng)
    }

    pub fn crossover(&mut self, parents: Vec<Circle>) -> Vec<Circle> {
        operators::crossover(parents, self.config.crossover_rate, &mut self.rng)
    }

    pub fn mutate(&mut self, offspring: Vec<Circle>) -> Vec<Circle> {
        operators::mutate(
            offspring,
            &self.perturbation,
            self.config.mutation_rate,
            &mut self.rng,
        )
    }

    /// One generation: evaluate, record, select, recombine, mutate, replace.
    /// No elitism; the best candidate survives only in `convergence`.
    pub fn evolve(&mut self, convergence: &mut Convergence) -> Result<(), Error> {
        let fitness = self.evaluate_fitness();
        convergence.record(&self.population, &fitness)?;
        let parents = self.select(&fitness)?;
        let offspring = self.crossover(parents);
        self.population = self.mutate(offspring);
        Ok(())
    }

    #[time]
    pub fn run(mut self) -> Result<GaResult, Error> {
        let generations = self.config.generations;
        let mut convergence = Convergence::with_capacity(generations);
        for generation in 0..generations {
            self.evolve(&mut convergence)?;
            if (generation + 1) % LOG_INTERVAL == 0 {
                debug!(
                    "generation {}/{}: best fitness {:.2}",
                    generation + 1,
                    generations,
                    convergence.best_fitness()
                );
            }
        }
        let result = convergence.finish().ok_or_else(|| {
            Error::InvalidConfiguration("no finite fitness was observed".to_string())
        })?;
        info!(
            "best circle ({:.2}, {:.2}) r={:.2} fitness={:.2} after {} generations",
            result.best_circle.cx,
            result.best_circle.cy,
            result.best_circle.r,
            result.best_fitness,
            generations
        );
        Ok(result)
    }
}
