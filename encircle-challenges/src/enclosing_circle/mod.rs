mod shapes;
pub use shapes::Shape;

use crate::geometry::{Circle, Point, PointCloud};
use anyhow::{anyhow, Result};
use rand::{rngs::SmallRng, seq::SliceRandom, Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Weight applied to the summed excess distance of points left outside a circle.
pub const PENALTY_WEIGHT: f64 = 10.0;

impl_kv_string_serde! {
    Track {
        center_x: f64,
        center_y: f64,
        radius: f64,
        num_points: usize,
        shape_error: f64,
        noise: f64,
        num_outliers: usize,
        outlier_range_factor: f64,
    }
}

impl Default for Track {
    fn default() -> Self {
        Self {
            center_x: 0.0,
            center_y: 0.0,
            radius: 100.0,
            num_points: 100,
            shape_error: 0.1,
            noise: 5.0,
            num_outliers: 5,
            outlier_range_factor: 1.5,
        }
    }
}

impl Track {
    pub fn validate(&self) -> Result<()> {
        if self.num_points + self.num_outliers == 0 {
            return Err(anyhow!("Track must produce at least one point"));
        }
        if !self.center_x.is_finite() || !self.center_y.is_finite() {
            return Err(anyhow!(
                "Centre ({}, {}) must be finite",
                self.center_x,
                self.center_y
            ));
        }
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(anyhow!("Radius ({}) must be finite and >= 0", self.radius));
        }
        if !self.shape_error.is_finite() || self.shape_error < 0.0 {
            return Err(anyhow!(
                "Shape error ({}) must be finite and >= 0",
                self.shape_error
            ));
        }
        if !self.noise.is_finite() || self.noise < 0.0 {
            return Err(anyhow!("Noise ({}) must be finite and >= 0", self.noise));
        }
        if !self.outlier_range_factor.is_finite() || self.outlier_range_factor < 1.0 {
            return Err(anyhow!(
                "Outlier range factor ({}) must be finite and >= 1",
                self.outlier_range_factor
            ));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct Solution {
    pub circle: Circle,
}

impl Solution {
    pub fn new() -> Self {
        Self {
            circle: Circle::new(0.0, 0.0, 0.0),
        }
    }
}

impl From<Circle> for Solution {
    fn from(circle: Circle) -> Self {
        Self { circle }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Challenge {
    pub seed: [u8; 32],
    pub points: PointCloud,
    /// Radius of the true minimum enclosing circle, when known analytically.
    pub optimal_radius: Option<f64>,
}

impl Challenge {
    /// Samples a noisy, distorted circle with injected outliers.
    pub fn generate_instance(seed: &[u8; 32], track: &Track) -> Result<Self> {
        track.validate()?;
        let mut rng = SmallRng::from_seed(seed.clone());

        let n = track.num_points;
        let step = if n > 1 {
            2.0 * PI / (n - 1) as f64
        } else {
            0.0
        };
        let scale_x = 1.0 + rng.gen_range(-track.shape_error..=track.shape_error);
        let scale_y = 1.0 + rng.gen_range(-track.shape_error..=track.shape_error);
        let noise = Normal::new(0.0, track.noise)
            .map_err(|e| anyhow!("Invalid noise ({}): {}", track.noise, e))?;

        let mut points: Vec<Point> = Vec::with_capacity(n + track.num_outliers);
        for i in 0..n {
            let angle = step * i as f64;
            let x = (track.center_x + track.radius * angle.cos()) * scale_x;
            let y = (track.center_y + track.radius * angle.sin()) * scale_y;
            points.push(Point::new(
                x + noise.sample(&mut rng),
                y + noise.sample(&mut rng),
            ));
        }

        let outer_radius = track.radius * track.outlier_range_factor;
        for _ in 0..track.num_outliers {
            let angle = rng.gen_range(0.0..2.0 * PI);
            let distance = rng.gen_range(track.radius..=outer_radius);
            points.push(Point::new(
                track.center_x + distance * angle.cos(),
                track.center_y + distance * angle.sin(),
            ));
        }
        points.shuffle(&mut rng);

        Ok(Self {
            seed: seed.clone(),
            points: PointCloud::new(&points),
            optimal_radius: None,
        })
    }

    pub fn from_shape(seed: &[u8; 32], shape: &Shape) -> Result<Self> {
        let mut challenge = Self::from_points(seed, &shape.points())?;
        challenge.optimal_radius = Some(shape.optimal_radius());
        Ok(challenge)
    }

    pub fn from_points(seed: &[u8; 32], points: &[Point]) -> Result<Self> {
        if points.is_empty() {
            return Err(anyhow!("Point cloud must contain at least one point"));
        }
        if let Some(p) = points.iter().find(|p| !p.is_finite()) {
            return Err(anyhow!("Point ({}, {}) is not finite", p.x, p.y));
        }
        Ok(Self {
            seed: seed.clone(),
            points: PointCloud::new(points),
            optimal_radius: None,
        })
    }

    pub fn calc_fitness(&self, solution: &Solution, penalty_weight: f64) -> f64 {
        calc_fitness(&self.points, &solution.circle, penalty_weight)
    }

    /// Fraction of points inside (or on) the solution circle.
    pub fn calc_coverage(&self, solution: &Solution) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        self.points.count_inside(&solution.circle) as f64 / self.points.len() as f64
    }

    /// Signed relative error of the solution radius against the known optimum.
    pub fn calc_radius_error(&self, solution: &Solution) -> Option<f64> {
        self.optimal_radius
            .map(|optimal| (solution.circle.r - optimal) / optimal)
    }

    pub fn verify_solution(&self, solution: &Solution, tolerance: f64) -> Result<()> {
        let circle = &solution.circle;
        if !circle.is_finite() {
            return Err(anyhow!(
                "Circle ({}, {}, {}) is not finite",
                circle.cx,
                circle.cy,
                circle.r
            ));
        }
        if circle.r < 0.0 {
            return Err(anyhow!("Radius ({}) is negative", circle.r));
        }
        match (self.optimal_radius, self.calc_radius_error(solution)) {
            (Some(optimal), Some(error)) if error.abs() > tolerance => Err(anyhow!(
                "Radius ({}) differs from optimum ({}) by {:.2}% (tolerance: {:.2}%)",
                circle.r,
                optimal,
                error * 100.0,
                tolerance * 100.0
            )),
            _ => Ok(()),
        }
    }
}

/// `r + penalty_weight * sum(distance - r)` over points outside the circle. Lower is better.
pub fn calc_fitness(points: &PointCloud, circle: &Circle, penalty_weight: f64) -> f64 {
    circle.r + penalty_weight * points.excess_distance(circle)
}
