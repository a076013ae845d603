use encircle_algorithms::enclosing_circle::circle_ga::{
    operators, solve, solve_challenge, CircleOptimizer, Config, Convergence, Error, Gene,
    GeneBounds,
};
use encircle_challenges::enclosing_circle::{Challenge, Shape, Solution, Track};
use encircle_challenges::geometry::{Circle, Interval, Point, PointCloud};
use encircle_utils::{seed_for_trial, Summary};
use rand::{distributions::WeightedError, rngs::SmallRng, SeedableRng};
use serde_json::{json, Map, Value};
use std::cell::RefCell;

const SEED: [u8; 32] = [42; 32];

fn config(population_size: usize, generations: usize) -> Config {
    Config {
        population_size,
        generations,
        ..Config::default()
    }
}

fn noisy_cloud(seed: &[u8; 32]) -> PointCloud {
    Challenge::generate_instance(seed, &Track::default())
        .unwrap()
        .points
}

fn mean_found_radius(points: &PointCloud, config: Config, label: &str, repeats: usize) -> Summary {
    let radii: Vec<f64> = (0..repeats)
        .map(|trial| {
            CircleOptimizer::from_seed(points.clone(), config, &seed_for_trial(label, trial))
                .unwrap()
                .run()
                .unwrap()
                .best_circle
                .r
        })
        .collect();
    Summary::of(&radii).unwrap()
}

#[test]
fn test_config_validation() {
    assert!(Config::default().validate().is_ok());
    assert!(matches!(
        config(7, 10).validate(),
        Err(Error::InvalidConfiguration(_))
    ));
    assert!(config(0, 10).validate().is_err());
    assert!(config(1, 10).validate().is_err());
    assert!(config(10, 0).validate().is_err());
    let negative_scale = Config {
        mutation_scale: -0.05,
        ..Config::default()
    };
    assert!(negative_scale.validate().is_err());
}

#[test]
fn test_config_initialize_merges_hyperparameters() {
    assert_eq!(Config::initialize(&None).unwrap(), Config::default());

    let hyperparameters: Map<String, Value> = json!({
        "population_size": 150,
        "mutation_rate": 0.15
    })
    .as_object()
    .unwrap()
    .clone();
    let merged = Config::initialize(&Some(hyperparameters)).unwrap();
    assert_eq!(merged.population_size, 150);
    assert_eq!(merged.mutation_rate, 0.15);
    assert_eq!(merged.generations, Config::default().generations);

    let unknown = json!({"elitism": 2}).as_object().unwrap().clone();
    assert!(Config::initialize(&Some(unknown)).is_err());

    let odd = json!({"population_size": 151}).as_object().unwrap().clone();
    assert!(Config::initialize(&Some(odd)).is_err());
}

#[test]
fn test_construction_rejects_invalid_points() {
    let empty = PointCloud::default();
    assert!(matches!(
        CircleOptimizer::from_seed(empty, Config::default(), &SEED),
        Err(Error::InvalidConfiguration(_))
    ));

    let non_finite = PointCloud::from(vec![(0.0, 0.0), (f64::NAN, 1.0)]);
    assert!(CircleOptimizer::from_seed(non_finite, Config::default(), &SEED).is_err());
}

#[test]
fn test_gene_bounds_from_points() {
    let points = PointCloud::from(vec![(-10.0, 5.0), (30.0, 15.0), (0.0, -5.0)]);
    let bounds = GeneBounds::from_points(&points).unwrap();
    assert_eq!(bounds.x, Interval::new(-10.0, 30.0));
    assert_eq!(bounds.y, Interval::new(-5.0, 15.0));
    assert_eq!(bounds.r, Interval::new(4.0, 40.0));
    assert_eq!(GeneBounds::from_points(&PointCloud::default()), None);

    let clamped = bounds.clamp(&Circle::new(100.0, -100.0, 1.0));
    assert_eq!(clamped, Circle::new(30.0, -5.0, 4.0));
    assert!(bounds.contains(&clamped));
}

#[test]
fn test_population_stays_within_bounds() {
    let points = noisy_cloud(&SEED);
    let mut optimizer = CircleOptimizer::from_seed(
        points,
        Config {
            mutation_rate: 0.6,
            ..config(60, 40)
        },
        &SEED,
    )
    .unwrap();
    let bounds = *optimizer.bounds();
    let mut convergence = Convergence::new();

    assert_eq!(optimizer.population().len(), 60);
    assert!(optimizer.population().iter().all(|c| bounds.contains(c)));
    for _ in 0..40 {
        optimizer.evolve(&mut convergence).unwrap();
        assert_eq!(optimizer.population().len(), 60);
        assert!(optimizer.population().iter().all(|c| bounds.contains(c)));
    }
}

#[test]
fn test_convergence_bookkeeping() {
    let points = noisy_cloud(&SEED);
    let mut optimizer = CircleOptimizer::from_seed(points, config(40, 50), &SEED).unwrap();
    let r_min = optimizer.bounds().r.min;
    let mut convergence = Convergence::with_capacity(50);
    assert_eq!(convergence.best_fitness(), f64::INFINITY);

    let mut best_so_far = Vec::new();
    for _ in 0..50 {
        let fitness = optimizer.evaluate_fitness();
        for (circle, f) in optimizer.population().iter().zip(&fitness) {
            assert!(*f >= circle.r);
            assert!(circle.r >= r_min);
        }
        optimizer.evolve(&mut convergence).unwrap();
        best_so_far.push(convergence.best_fitness());
    }

    assert_eq!(convergence.history().len(), 50);
    assert!(best_so_far.windows(2).all(|w| w[1] <= w[0]));
    let history_min = convergence
        .history()
        .iter()
        .cloned()
        .fold(f64::INFINITY, f64::min);
    let result = convergence.finish().unwrap();
    assert_eq!(result.best_fitness, history_min);
}

#[test]
fn test_convergence_ties_keep_first_best() {
    let a = Circle::new(0.0, 0.0, 1.0);
    let b = Circle::new(5.0, 5.0, 1.0);
    let mut convergence = Convergence::new();
    assert_eq!(convergence.record(&[a, b], &[3.0, 3.0]).unwrap(), 3.0);
    assert_eq!(convergence.best(), Some((a, 3.0)));
    convergence.record(&[b, a], &[3.0, 4.0]).unwrap();
    assert_eq!(convergence.best(), Some((a, 3.0)));
    convergence.record(&[b, a], &[2.0, 4.0]).unwrap();
    assert_eq!(convergence.best(), Some((b, 2.0)));
    assert_eq!(convergence.history(), &[3.0, 3.0, 2.0]);
}

#[test]
fn test_convergence_rejects_mismatched_fitness() {
    let c = Circle::new(0.0, 0.0, 1.0);
    let mut convergence = Convergence::new();
    assert!(matches!(
        convergence.record(&[c], &[5.0, 1.0]),
        Err(Error::FitnessMismatch {
            population: 1,
            fitness: 2
        })
    ));
    assert!(convergence.record(&[c, c], &[5.0]).is_err());
    assert_eq!(convergence.best(), None);
    assert!(convergence.history().is_empty());
}

#[test]
fn test_run_history_length_and_best() {
    let points = noisy_cloud(&SEED);
    let result = CircleOptimizer::from_seed(points.clone(), config(50, 37), &SEED)
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(result.history.len(), 37);
    let history_min = result.history.iter().cloned().fold(f64::INFINITY, f64::min);
    assert_eq!(result.best_fitness, history_min);
    assert!(result.best_fitness >= result.best_circle.r);

    let bounds = GeneBounds::from_points(&points).unwrap();
    assert!(bounds.contains(&result.best_circle));
}

#[test]
fn test_run_is_deterministic_under_fixed_seed() {
    let points = noisy_cloud(&SEED);
    let run = |seed: &[u8; 32]| {
        CircleOptimizer::from_seed(points.clone(), config(40, 30), seed)
            .unwrap()
            .run()
            .unwrap()
    };
    assert_eq!(run(&SEED), run(&SEED));
    assert_ne!(run(&SEED).history, run(&[43; 32]).history);
}

#[test]
fn test_degenerate_point_clouds() {
    let single = PointCloud::from(vec![(3.0, -4.0)]);
    let result = CircleOptimizer::from_seed(single, config(10, 5), &SEED)
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(result.best_circle, Circle::new(3.0, -4.0, 0.0));
    assert_eq!(result.best_fitness, 0.0);
    assert_eq!(result.history, vec![0.0; 5]);

    let pair = PointCloud::from(vec![(0.0, 0.0), (10.0, 0.0)]);
    let result = CircleOptimizer::from_seed(pair, config(20, 30), &SEED)
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(result.best_circle.cy, 0.0);
    assert!(result.best_fitness >= 5.0);
    assert_eq!(result.history.len(), 30);
}

#[test]
fn test_select_favours_low_fitness() {
    let good = Circle::new(0.0, 0.0, 1.0);
    let bad = Circle::new(9.0, 9.0, 9.0);
    let population = vec![good, bad, bad, bad];
    let mut rng = SmallRng::from_seed(SEED);

    let parents = operators::select(&population, &[0.0, 1e6, 1e6, 1e6], &mut rng).unwrap();
    assert_eq!(parents.len(), 4);
    assert!(parents.iter().all(|p| *p == good));

    let uniform = operators::select(&population, &[5.0; 4], &mut rng).unwrap();
    assert_eq!(uniform.len(), 4);

    assert!(matches!(
        operators::select(&population, &[1.0; 3], &mut rng),
        Err(Error::FitnessMismatch {
            population: 4,
            fitness: 3
        })
    ));
    assert!(matches!(
        operators::select(&population, &[f64::NAN; 4], &mut rng),
        Err(Error::Selection(WeightedError::InvalidWeight))
    ));
}

#[test]
fn test_crossover_swaps_gene_suffix() {
    let a = Circle::new(1.0, 2.0, 3.0);
    let b = Circle::new(10.0, 20.0, 30.0);
    let mut rng = SmallRng::from_seed(SEED);

    let copied = operators::crossover(vec![a, b, b, a], 0.0, &mut rng);
    assert_eq!(copied, vec![a, b, b, a]);

    for _ in 0..20 {
        let children = operators::crossover(vec![a, b], 1.0, &mut rng);
        let (c, d) = (children[0], children[1]);
        assert_eq!((c.cx, d.cx), (a.cx, b.cx));
        assert_eq!((c.r, d.r), (b.r, a.r));
        assert!(
            (c.cy, d.cy) == (a.cy, b.cy) || (c.cy, d.cy) == (b.cy, a.cy),
            "unexpected centre_y genes: {:?}",
            children
        );
    }
}

#[test]
fn test_mutate_touches_at_most_one_gene() {
    let points = PointCloud::from(vec![(0.0, 0.0), (100.0, 50.0)]);
    let bounds = GeneBounds::from_points(&points).unwrap();
    let perturbation = operators::Perturbation::new(bounds, 0.05).unwrap();
    let mut rng = SmallRng::from_seed(SEED);
    let offspring: Vec<Circle> = (0..50).map(|_| bounds.sample(&mut rng)).collect();

    let untouched = operators::mutate(offspring.clone(), &perturbation, 0.0, &mut rng);
    assert_eq!(untouched, offspring);

    let mutated = operators::mutate(offspring.clone(), &perturbation, 1.0, &mut rng);
    let mut changed = 0;
    for (before, after) in offspring.iter().zip(&mutated) {
        let diffs = Gene::ALL
            .iter()
            .filter(|gene| gene.get(before) != gene.get(after))
            .count();
        assert!(diffs <= 1);
        changed += diffs;
        assert!(bounds.contains(after));
    }
    assert!(changed > 25);

    assert!(operators::Perturbation::new(bounds, f64::NAN).is_err());
}

#[test]
fn test_solve_challenge_saves_best_circle() {
    let challenge = Challenge::generate_instance(&SEED, &Track::default()).unwrap();
    let saved = RefCell::new(Solution::new());
    let save_solution = |s: &Solution| -> anyhow::Result<()> {
        *saved.borrow_mut() = *s;
        Ok(())
    };
    let hyperparameters = json!({"population_size": 40, "generations": 20})
        .as_object()
        .cloned();
    solve_challenge(&challenge, &save_solution, &hyperparameters).unwrap();

    let expected = solve(&challenge, config(40, 20)).unwrap();
    assert_eq!(saved.into_inner().circle, expected.best_circle);
}

#[test]
fn test_known_optimum_shapes() {
    let ga = Config {
        mutation_rate: 0.15,
        ..config(150, 200)
    };
    for name in ["triangle", "square", "ellipse"] {
        let shape: Shape = name.parse().unwrap();
        let challenge = Challenge::from_shape(&SEED, &shape).unwrap();
        let optimal = shape.optimal_radius();
        let summary = mean_found_radius(&challenge.points, ga, name, 10);
        let error = (summary.mean - optimal).abs() / optimal;
        assert!(
            error <= 0.05,
            "{}: mean radius {:.2} vs optimum {:.2}",
            shape,
            summary.mean,
            optimal
        );
    }
}

#[test]
fn test_noisy_circle_is_found_consistently() {
    let track = Track {
        num_points: 200,
        shape_error: 0.0,
        noise: 5.0,
        num_outliers: 0,
        ..Track::default()
    };
    let points = Challenge::generate_instance(&SEED, &track).unwrap().points;
    let summary = mean_found_radius(&points, config(150, 200), "noisy_circle", 10);
    assert!(
        summary.min >= 95.0 && summary.max <= 130.0,
        "radii spread {:?}",
        summary
    );
    assert!(summary.std < 8.0, "radii spread {:?}", summary);
}

/// Outliers whose prefixes of length 5, 10, 20 and 50 reach 115, 125, 135 and 150.5
/// from the origin, spread around the circle by the golden angle.
fn outlier_ring() -> Vec<Point> {
    (0..50)
        .map(|i| {
            let distance = match i {
                0..=4 => 107.0 + 2.0 * i as f64,
                5..=9 => 117.0 + 2.0 * (i - 5) as f64,
                10..=19 => 126.0 + (i - 10) as f64,
                _ => 136.0 + 0.5 * (i - 20) as f64,
            };
            let angle = 2.399963 * i as f64;
            Point::new(distance * angle.cos(), distance * angle.sin())
        })
        .collect()
}

#[test]
fn test_radius_grows_with_outliers() {
    let base = Track {
        num_points: 200,
        shape_error: 0.0,
        noise: 2.0,
        num_outliers: 0,
        ..Track::default()
    };
    let base_points = Challenge::generate_instance(&SEED, &base).unwrap().points;
    let outliers = outlier_ring();

    let ga = config(100, 150);
    let means: Vec<f64> = [0usize, 5, 10, 20, 50]
        .iter()
        .map(|&k| {
            let points: PointCloud = base_points
                .iter()
                .chain(outliers.iter().take(k).copied())
                .collect();
            mean_found_radius(&points, ga, &format!("outliers_{}", k), 10).mean
        })
        .collect();

    // The farthest point grows by at least 9 at every step, so the exact enclosing
    // radius grows by several units; 1.0 covers run-to-run noise in the mean only.
    for w in means.windows(2) {
        assert!(w[1] >= w[0] - 1.0, "radius shrank with more outliers: {:?}", means);
    }
    assert!(means[4] > means[0] + 20.0, "outliers had no effect: {:?}", means);
}
