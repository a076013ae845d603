use crate::memory;
use anyhow::{anyhow, Result};
use encircle_algorithms::enclosing_circle::circle_ga::{CircleOptimizer, Config, GaResult};
use encircle_challenges::enclosing_circle::{Challenge, Shape, Track};
use encircle_challenges::geometry::PointCloud;
use encircle_utils::{column_summaries, linear_fit, row, seed_for_trial, Summary, Table};
use log::info;
use logging_timer::time;
use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
    time::Instant,
};

/// Experiments run by `encircle evaluate`, each producing one CSV table.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Suite {
    Scalability,
    Mutation,
    Robustness,
    Convergence,
    KnownOptimum,
    IterationRuntime,
    ParameterVariation,
}

impl Suite {
    /// Every suite, in the order `all` runs them.
    pub const ALL: [Suite; 7] = [
        Suite::Scalability,
        Suite::Mutation,
        Suite::Robustness,
        Suite::Convergence,
        Suite::KnownOptimum,
        Suite::IterationRuntime,
        Suite::ParameterVariation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Suite::Scalability => "scalability",
            Suite::Mutation => "mutation",
            Suite::Robustness => "robustness",
            Suite::Convergence => "convergence",
            Suite::KnownOptimum => "known-optimum",
            Suite::IterationRuntime => "iteration-runtime",
            Suite::ParameterVariation => "parameter-variation",
        }
    }

    pub fn default_repeats(&self) -> usize {
        match self {
            Suite::Convergence => 30,
            Suite::IterationRuntime => 5,
            Suite::ParameterVariation => 1,
            _ => 10,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}_results.csv", self.name().replace('-', "_"))
    }

    pub fn run(&self, repeats: usize) -> Result<Table> {
        if repeats == 0 {
            return Err(anyhow!("{} needs at least one repeat", self));
        }
        match self {
            Suite::Scalability => scalability(repeats),
            Suite::Mutation => mutation(repeats),
            Suite::Robustness => robustness(repeats),
            Suite::Convergence => convergence(repeats),
            Suite::KnownOptimum => known_optimum(repeats),
            Suite::IterationRuntime => iteration_runtime(repeats),
            Suite::ParameterVariation => parameter_variation(repeats),
        }
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Suite {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Suite::ALL
            .iter()
            .find(|suite| suite.name() == s)
            .copied()
            .ok_or_else(|| {
                anyhow!(
                    "Unknown suite '{}'. Expected one of: {}, all",
                    s,
                    Suite::ALL.map(|suite| suite.name()).join(", ")
                )
            })
    }
}

/// Runs `suite` and writes its table into `out_dir`. Returns the CSV path.
pub fn run_suite(suite: Suite, repeats: Option<usize>, out_dir: &Path) -> Result<PathBuf> {
    let repeats = repeats.unwrap_or(suite.default_repeats());
    info!("running {} ({} repeats)", suite, repeats);
    let table = suite.run(repeats)?;
    let path = out_dir.join(suite.file_name());
    table.write(&path)?;
    info!("{}: {} rows written to {}", suite, table.len(), path.display());
    Ok(path)
}

/// Wall time (seconds), peak heap growth (MiB) and outcome of one optimizer run.
#[derive(Debug, Clone)]
pub struct Measurement {
    pub runtime: f64,
    /// Zero unless the binary installs `memory::PeakAlloc` as its global allocator.
    pub peak_memory_mb: f64,
    pub result: GaResult,
}

impl Measurement {
    pub fn radius(&self) -> f64 {
        self.result.best_circle.r
    }
}

/// Times construction and run of a single optimizer and records its peak heap growth.
pub fn measure(points: &PointCloud, config: Config, seed: &[u8; 32]) -> Result<Measurement> {
    memory::reset_peak();
    let start = Instant::now();
    let result = CircleOptimizer::from_seed(points.clone(), config, seed)?.run()?;
    Ok(Measurement {
        runtime: start.elapsed().as_secs_f64(),
        peak_memory_mb: memory::peak_memory_mb(),
        result,
    })
}

fn ga_config(population_size: usize, generations: usize, mutation_rate: f64) -> Config {
    Config {
        population_size,
        generations,
        mutation_rate,
        crossover_rate: 0.8,
        ..Config::default()
    }
}

fn cloud(label: &str, trial: usize, track: &Track) -> Result<PointCloud> {
    let seed = seed_for_trial(&format!("{}_points", label), trial);
    Ok(Challenge::generate_instance(&seed, track)?.points)
}

fn solver_seed(label: &str, trial: usize) -> [u8; 32] {
    seed_for_trial(&format!("{}_solver", label), trial)
}

fn log_radii(suite: Suite, setting: impl fmt::Display, radii: &[f64]) {
    if let Some(s) = Summary::of(radii) {
        info!(
            "{}: {} -> radius {:.2} ± {:.2} (min {:.2}, max {:.2})",
            suite, setting, s.mean, s.std, s.min, s.max
        );
    }
}

#[time]
fn scalability(repeats: usize) -> Result<Table> {
    let config = ga_config(100, 100, 0.1);
    let mut table = Table::new(&["n_points", "run_id", "runtime", "memory_mb", "radius"]);
    for n_points in [50, 100, 500, 1000, 2000, 5000] {
        let label = format!("scalability_{}", n_points);
        let track = Track {
            num_points: n_points,
            ..Track::default()
        };
        let mut runtimes = Vec::with_capacity(repeats);
        let mut memory_mb = Vec::with_capacity(repeats);
        for run_id in 0..repeats {
            let points = cloud(&label, run_id, &track)?;
            let m = measure(&points, config, &solver_seed(&label, run_id))?;
            runtimes.push(m.runtime);
            memory_mb.push(m.peak_memory_mb);
            table.push(row![n_points, run_id, m.runtime, m.peak_memory_mb, m.radius()])?;
        }
        if let (Some(t), Some(mem)) = (Summary::of(&runtimes), Summary::of(&memory_mb)) {
            info!(
                "scalability: {} points -> {:.3}s ± {:.3}s, peak {:.3} MiB ± {:.3} MiB",
                n_points, t.mean, t.std, mem.mean, mem.std
            );
        }
    }
    Ok(table)
}

#[time]
fn mutation(repeats: usize) -> Result<Table> {
    let rates = [0.01, 0.05, 0.1, 0.2, 0.4, 0.6];
    let track = Track {
        num_points: 200,
        ..Track::default()
    };
    let mut table = Table::new(&["mutation_rate", "run_id", "radius"]);
    let mut radii = vec![Vec::with_capacity(repeats); rates.len()];
    for run_id in 0..repeats {
        let points = cloud("mutation", run_id, &track)?;
        for (rate, found) in rates.iter().zip(radii.iter_mut()) {
            let config = ga_config(100, 100, *rate);
            let m = measure(&points, config, &solver_seed("mutation", run_id))?;
            found.push(m.radius());
            table.push(row![rate, run_id, m.radius()])?;
        }
    }
    for (rate, found) in rates.iter().zip(&radii) {
        log_radii(Suite::Mutation, format!("mutation_rate={}", rate), found);
    }
    Ok(table)
}

#[time]
fn robustness(repeats: usize) -> Result<Table> {
    let config = ga_config(100, 150, 0.1);
    let mut table = Table::new(&["n_outliers", "run_id", "radius"]);
    for n_outliers in [0, 5, 10, 20, 50] {
        let label = format!("robustness_{}", n_outliers);
        let track = Track {
            num_points: 200,
            num_outliers: n_outliers,
            ..Track::default()
        };
        let mut radii = Vec::with_capacity(repeats);
        for run_id in 0..repeats {
            let points = cloud(&label, run_id, &track)?;
            let m = measure(&points, config, &solver_seed(&label, run_id))?;
            radii.push(m.radius());
            table.push(row![n_outliers, run_id, m.radius()])?;
        }
        log_radii(Suite::Robustness, format!("{} outliers", n_outliers), &radii);
    }
    Ok(table)
}

#[time]
fn convergence(repeats: usize) -> Result<Table> {
    let config = ga_config(100, 150, 0.1);
    let track = Track {
        num_points: 200,
        num_outliers: 10,
        ..Track::default()
    };
    let points = cloud("convergence", 0, &track)?;
    let mut histories = Vec::with_capacity(repeats);
    for run_id in 0..repeats {
        let m = measure(&points, config, &solver_seed("convergence", run_id))?;
        histories.push(m.result.history);
    }

    let mut table = Table::new(&["generation", "mean_fitness", "std_fitness"]);
    let summaries = column_summaries(&histories);
    for (generation, s) in summaries.iter().enumerate() {
        table.push(row![generation, s.mean, s.std])?;
    }
    if let (Some(first), Some(last)) = (summaries.first(), summaries.last()) {
        info!(
            "convergence: mean best fitness {:.2} -> {:.2} over {} generations",
            first.mean,
            last.mean,
            summaries.len()
        );
    }
    Ok(table)
}

#[time]
fn known_optimum(repeats: usize) -> Result<Table> {
    let config = ga_config(150, 200, 0.15);
    let mut table = Table::new(&[
        "test_case",
        "optimal_radius",
        "mean_found_radius",
        "std_found_radius",
        "error_percent",
    ]);
    for name in ["triangle", "square", "hexagon", "decagon", "ellipse", "tall_ellipse"] {
        let shape: Shape = name.parse()?;
        let challenge = Challenge::from_shape(&seed_for_trial(name, 0), &shape)?;
        let optimal = shape.optimal_radius();
        let radii = (0..repeats)
            .map(|run_id| -> Result<f64> {
                Ok(measure(&challenge.points, config, &solver_seed(name, run_id))?.radius())
            })
            .collect::<Result<Vec<f64>>>()?;
        let s = Summary::of(&radii).ok_or_else(|| anyhow!("{}: no runs", name))?;
        let error_percent = (s.mean - optimal) / optimal * 100.0;
        info!(
            "known-optimum: {} optimal {:.2}, found {:.2} ± {:.2}, error {:.2}%",
            shape, optimal, s.mean, s.std, error_percent
        );
        table.push(row![shape, optimal, s.mean, s.std, error_percent])?;
    }
    Ok(table)
}

#[time]
fn iteration_runtime(repeats: usize) -> Result<Table> {
    let generation_counts = [25, 50, 100, 150, 200, 300, 500, 750, 1000];
    let track = Track {
        num_points: 200,
        num_outliers: 5,
        ..Track::default()
    };
    let points = cloud("iteration_runtime", 0, &track)?;
    let mut table = Table::new(&[
        "generations",
        "run_id",
        "runtime",
        "radius",
        "time_per_iteration",
    ]);
    let mut mean_runtimes = Vec::with_capacity(generation_counts.len());
    for generations in generation_counts {
        let config = ga_config(100, generations, 0.1);
        let label = format!("iteration_runtime_{}", generations);
        let mut runtimes = Vec::with_capacity(repeats);
        for run_id in 0..repeats {
            let m = measure(&points, config, &solver_seed(&label, run_id))?;
            runtimes.push(m.runtime);
            table.push(row![
                generations,
                run_id,
                m.runtime,
                m.radius(),
                m.runtime / generations as f64
            ])?;
        }
        mean_runtimes.push(runtimes.iter().sum::<f64>() / repeats as f64);
    }

    let xs: Vec<f64> = generation_counts.iter().map(|&g| g as f64).collect();
    match linear_fit(&xs, &mean_runtimes) {
        Some((slope, _)) => info!(
            "iteration-runtime: linear fit slope {:.3} ms/generation",
            slope * 1000.0
        ),
        None => info!("iteration-runtime: linear fit unavailable"),
    }
    Ok(table)
}

#[time]
fn parameter_variation(repeats: usize) -> Result<Table> {
    let config = ga_config(150, 200, 0.15);
    let settings = [
        ("ideal", 2.0, 0.0, 0),
        ("moderate_noise", 5.0, 0.1, 5),
        ("high_noise", 15.0, 0.1, 5),
        ("high_shape_error", 5.0, 0.3, 5),
        ("many_outliers", 5.0, 0.1, 20),
        ("extreme", 10.0, 0.2, 15),
    ];
    let mut table = Table::new(&[
        "config",
        "noise",
        "shape_error",
        "outliers",
        "found_radius",
        "runtime",
    ]);
    for (name, noise, shape_error, num_outliers) in settings {
        let track = Track {
            num_points: 100,
            radius: 100.0,
            noise,
            shape_error,
            num_outliers,
            ..Track::default()
        };
        let mut radii = Vec::with_capacity(repeats);
        for run_id in 0..repeats {
            let points = cloud(name, run_id, &track)?;
            let m = measure(&points, config, &solver_seed(name, run_id))?;
            radii.push(m.radius());
            table.push(row![
                name,
                noise,
                shape_error,
                num_outliers,
                m.radius(),
                m.runtime
            ])?;
        }
        log_radii(Suite::ParameterVariation, name, &radii);
    }
    Ok(table)
}
