use anyhow::{anyhow, Result};
use clap::{arg, Command};
use encircle_algorithms::enclosing_circle::circle_ga::{self, Config};
use encircle_challenges::enclosing_circle::{Challenge, Shape, Solution, Track};
use encircle_challenges::geometry::{Circle, PointCloud};
use encircle_runtime::{measure, run_suite, PeakAlloc, Suite};
use encircle_utils::{dejsonify, jsonify, row, u8s_from_str, Table};
use serde::Serialize;
use serde_json::{Map, Value};
use std::{fs, io::Read, path::PathBuf};

#[global_allocator]
static ALLOC: PeakAlloc = PeakAlloc;

fn cli() -> Command {
    Command::new("encircle")
        .about("Generates point clouds and fits minimum enclosing circles with a genetic algorithm")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("generate")
                .about("Generates a point cloud as x,y CSV")
                .arg(
                    arg!(<TRACK> "Track string, e.g. num_points=200,noise=5,num_outliers=10")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--seed [SEED] "A string used in seed generation")
                        .default_value("0")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--output [OUTPUT_FILE] "If set, the points will be saved to this file path (default stdout)")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("solve")
                .about("Generates a point cloud and fits a circle to it")
                .arg(
                    arg!(<TRACK> "Track string, e.g. num_points=200,noise=5,num_outliers=10")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--seed [SEED] "A string used in seed generation")
                        .default_value("0")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--hyperparameters [HYPERPARAMETERS] "Hyperparameters json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--"save-points" [POINTS_FILE] "If set, the generated points will be saved to this file path as CSV")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--output [OUTPUT_FILE] "If set, the result will be saved to this file path (default stdout)")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("verify")
                .about("Verifies a solution against a shape with a known optimum")
                .arg(
                    arg!(<SHAPE> "One of triangle, square, hexagon, decagon, ellipse, tall_ellipse")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(<SOLUTION> "Solution json string, path to json file, or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--tolerance [TOLERANCE] "Maximum relative radius error")
                        .default_value("0.05")
                        .value_parser(clap::value_parser!(f64)),
                ),
        )
        .subcommand(
            Command::new("evaluate")
                .about("Runs an evaluation suite and writes its results as CSV")
                .arg(
                    arg!(<SUITE> "Suite name, or 'all'")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--repeats [REPEATS] "Overrides the suite's repeat count")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"out-dir" [OUT_DIR] "Directory for the CSV files")
                        .default_value("results")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("hyperparameters").about("Describes the solver and its hyperparameters"),
        )
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let matches = cli().get_matches();

    if let Err(e) = match matches.subcommand() {
        Some(("generate", sub_m)) => generate(
            sub_m.get_one::<String>("TRACK").unwrap().clone(),
            sub_m.get_one::<String>("seed").unwrap().clone(),
            sub_m.get_one::<PathBuf>("output").cloned(),
        ),
        Some(("solve", sub_m)) => solve(
            sub_m.get_one::<String>("TRACK").unwrap().clone(),
            sub_m.get_one::<String>("seed").unwrap().clone(),
            sub_m.get_one::<String>("hyperparameters").cloned(),
            sub_m.get_one::<PathBuf>("save-points").cloned(),
            sub_m.get_one::<PathBuf>("output").cloned(),
        ),
        Some(("verify", sub_m)) => verify(
            sub_m.get_one::<String>("SHAPE").unwrap().clone(),
            sub_m.get_one::<String>("SOLUTION").unwrap().clone(),
            *sub_m.get_one::<f64>("tolerance").unwrap(),
        ),
        Some(("evaluate", sub_m)) => evaluate(
            sub_m.get_one::<String>("SUITE").unwrap().clone(),
            sub_m.get_one::<usize>("repeats").cloned(),
            sub_m.get_one::<PathBuf>("out-dir").unwrap().clone(),
        ),
        Some(("hyperparameters", _)) => {
            circle_ga::help();
            Ok(())
        }
        _ => Err(anyhow!("Invalid subcommand")),
    } {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[derive(Serialize)]
struct SolveOutput {
    seed: String,
    track: Track,
    config: Config,
    circle: Circle,
    best_fitness: f64,
    coverage: f64,
    runtime: f64,
    peak_memory_mb: f64,
    generations: usize,
}

pub fn generate(track: String, seed: String, output_file: Option<PathBuf>) -> Result<()> {
    let track: Track = track.parse()?;
    let challenge = Challenge::generate_instance(&u8s_from_str(&seed), &track)?;
    write_or_print(points_table(&challenge.points)?.to_csv(), output_file)
}

pub fn solve(
    track: String,
    seed: String,
    hyperparameters: Option<String>,
    points_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
) -> Result<()> {
    let track: Track = track.parse()?;
    let hyperparameters = match hyperparameters {
        Some(h) => Some(load_hyperparameters(&h)?),
        None => None,
    };
    let config = Config::initialize(&hyperparameters)?;
    let challenge = Challenge::generate_instance(&u8s_from_str(&seed), &track)?;
    if let Some(path) = points_file {
        points_table(&challenge.points)?.write(&path)?;
    }

    let m = measure(&challenge.points, config, &challenge.seed)?;
    let solution = Solution::from(m.result.best_circle);
    let output = SolveOutput {
        seed,
        track,
        config,
        circle: solution.circle,
        best_fitness: m.result.best_fitness,
        coverage: challenge.calc_coverage(&solution),
        runtime: m.runtime,
        peak_memory_mb: m.peak_memory_mb,
        generations: m.result.history.len(),
    };
    write_or_print(format!("{}\n", jsonify(&output)), output_file)
}

pub fn verify(shape: String, solution: String, tolerance: f64) -> Result<()> {
    let shape: Shape = shape.parse()?;
    let solution = load_solution(&solution)?;
    let challenge = Challenge::from_shape(&u8s_from_str(&shape.to_string()), &shape)?;
    challenge.verify_solution(&solution, tolerance)?;
    println!(
        "Solution is valid: radius {} vs optimum {} for {}",
        solution.circle.r,
        shape.optimal_radius(),
        shape
    );
    Ok(())
}

pub fn evaluate(suite: String, repeats: Option<usize>, out_dir: PathBuf) -> Result<()> {
    let suites = if suite == "all" {
        Suite::ALL.to_vec()
    } else {
        vec![suite.parse::<Suite>()?]
    };
    for suite in suites {
        let path = run_suite(suite, repeats, &out_dir)?;
        println!("{}: {}", suite, path.display());
    }
    Ok(())
}

fn points_table(points: &PointCloud) -> Result<Table> {
    let mut table = Table::new(&["x", "y"]);
    for p in points.iter() {
        table.push(row![p.x, p.y])?;
    }
    Ok(table)
}

fn write_or_print(content: String, output_file: Option<PathBuf>) -> Result<()> {
    match output_file {
        Some(path) => fs::write(&path, content)
            .map_err(|e| anyhow!("Failed to write {}: {}", path.display(), e)),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}

fn load_hyperparameters(hyperparameters: &str) -> Result<Map<String, Value>> {
    let hyperparameters = if hyperparameters.ends_with(".json") {
        fs::read_to_string(hyperparameters)
            .map_err(|_| anyhow!("Failed to read hyperparameters file: {}", hyperparameters))?
    } else {
        hyperparameters.to_string()
    };
    dejsonify::<Map<String, Value>>(&hyperparameters)
        .map_err(|e| anyhow!("Failed to parse hyperparameters: {}", e))
}

fn load_solution(solution: &str) -> Result<Solution> {
    let solution = if solution == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|_| anyhow!("Failed to read solution from stdin"))?;
        buffer
    } else if solution.ends_with(".json") {
        fs::read_to_string(solution)
            .map_err(|_| anyhow!("Failed to read solution file: {}", solution))?
    } else {
        solution.to_string()
    };
    dejsonify::<Solution>(&solution).map_err(|e| anyhow!("Failed to parse solution: {}", e))
}
