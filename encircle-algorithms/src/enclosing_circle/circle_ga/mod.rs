mod config;
mod error;
pub mod operators;
mod optimizer;
pub mod population;

pub use config::Config;
pub use error::Error;
pub use optimizer::{CircleOptimizer, Convergence, GaResult};
pub use population::{Gene, GeneBounds};

use anyhow::Result;
use encircle_challenges::enclosing_circle::*;
use serde_json::{Map, Value};

/// Runs the optimizer on `challenge`, seeded from the challenge seed.
pub fn solve(challenge: &Challenge, config: Config) -> Result<GaResult> {
    let optimizer = CircleOptimizer::from_seed(challenge.points.clone(), config, &challenge.seed)?;
    Ok(optimizer.run()?)
}

pub fn solve_challenge(
    challenge: &Challenge,
    save_solution: &dyn Fn(&Solution) -> Result<()>,
    hyperparameters: &Option<Map<String, Value>>,
) -> Result<()> {
    let config = Config::initialize(hyperparameters)?;
    let result = solve(challenge, config)?;
    save_solution(&Solution::from(result.best_circle))
}

pub fn help() {
    println!("Circle GA: genetic search for the minimum enclosing circle");
    println!("");
    println!("Candidates are (cx, cy, r) triples scored by r + penalty_weight * sum of");
    println!("distances by which points fall outside. Parents are drawn by roulette wheel");
    println!("on inverted fitness, recombined by single-point crossover and mutated by");
    println!("Gaussian noise on one gene, clamped back into the cloud's bounds.");
    println!("");
    println!("HYPERPARAMETERS (JSON object, all optional):");
    println!("  population_size  even, >= 2          (default 100)");
    println!("  generations      >= 1                (default 200)");
    println!("  mutation_rate    probability         (default 0.1)");
    println!("  crossover_rate   probability         (default 0.8)");
    println!("  penalty_weight   >= 0                (default 10.0)");
    println!("  mutation_scale   fraction of range   (default 0.05)");
}
