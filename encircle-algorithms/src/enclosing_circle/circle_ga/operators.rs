use super::error::Error;
use super::population::{Gene, GeneBounds};
use encircle_challenges::enclosing_circle::calc_fitness;
use encircle_challenges::geometry::{Circle, PointCloud};
use rand::distributions::WeightedIndex;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Keeps selection weights finite when a candidate reaches zero fitness.
pub const SELECTION_EPSILON: f64 = 1e-6;

/// Fitness of every candidate, lower is better.
pub fn evaluate_fitness(population: &[Circle], points: &PointCloud, penalty_weight: f64) -> Vec<f64> {
    population
        .iter()
        .map(|circle| calc_fitness(points, circle, penalty_weight))
        .collect()
}

/// Roulette-wheel selection on `1 / (fitness + SELECTION_EPSILON)`, with replacement.
pub fn select<R: Rng>(population: &[Circle], fitness: &[f64], rng: &mut R) -> Result<Vec<Circle>, Error> {
    if population.len() != fitness.len() {
        return Err(Error::FitnessMismatch {
            population: population.len(),
            fitness: fitness.len(),
        });
    }
    let wheel = WeightedIndex::new(fitness.iter().map(|f| 1.0 / (f + SELECTION_EPSILON)))?;
    Ok((0..population.len())
        .map(|_| population[wheel.sample(rng)])
        .collect())
}

/// Single-point crossover over adjacent pairs. A trailing unpaired parent is copied through.
pub fn crossover<R: Rng>(parents: Vec<Circle>, crossover_rate: f64, rng: &mut R) -> Vec<Circle> {
    let mut offspring = parents;
    for pair in offspring.chunks_exact_mut(2) {
        if rng.gen::<f64>() < crossover_rate {
            let cut = rng.gen_range(1..Gene::ALL.len());
            let (first, second) = pair.split_at_mut(1);
            for &gene in &Gene::ALL[cut..] {
                let a = gene.get(&first[0]);
                gene.set(&mut first[0], gene.get(&second[0]));
                gene.set(&mut second[0], a);
            }
        }
    }
    offspring
}

/// Gaussian perturbation of a single gene, scaled to that gene's legal range.
#[derive(Debug, Clone, Copy)]
pub struct Perturbation {
    bounds: GeneBounds,
    x: Normal<f64>,
    y: Normal<f64>,
    r: Normal<f64>,
}

impl Perturbation {
    pub fn new(bounds: GeneBounds, scale: f64) -> Result<Self, Error> {
        let normal = |gene: Gene| {
            let std_dev = bounds.interval(gene).width() * scale;
            Normal::new(0.0, std_dev).map_err(|e| {
                Error::InvalidConfiguration(format!(
                    "mutation std_dev ({}) for {:?}: {}",
                    std_dev, gene, e
                ))
            })
        };
        Ok(Self {
            bounds,
            x: normal(Gene::CenterX)?,
            y: normal(Gene::CenterY)?,
            r: normal(Gene::Radius)?,
        })
    }

    pub fn bounds(&self) -> &GeneBounds {
        &self.bounds
    }

    pub fn sample<R: Rng>(&self, gene: Gene, rng: &mut R) -> f64 {
        match gene {
            Gene::CenterX => self.x.sample(rng),
            Gene::CenterY => self.y.sample(rng),
            Gene::Radius => self.r.sample(rng),
        }
    }
}

/// Perturbs one random gene of each candidate with probability `mutation_rate`,
/// then clamps every candidate back into bounds.
pub fn mutate<R: Rng>(
    offspring: Vec<Circle>,
    perturbation: &Perturbation,
    mutation_rate: f64,
    rng: &mut R,
) -> Vec<Circle> {
    offspring
        .into_iter()
        .map(|mut circle| {
            if rng.gen::<f64>() < mutation_rate {
                let gene = Gene::ALL[rng.gen_range(0..Gene::ALL.len())];
                let value = gene.get(&circle) + perturbation.sample(gene, rng);
                gene.set(&mut circle, value);
            }
            perturbation.bounds.clamp(&circle)
        })
        .collect()
}
