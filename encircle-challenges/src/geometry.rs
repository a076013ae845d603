use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// A candidate circle: centre `(cx, cy)` and radius `r`.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct Circle {
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
}

impl Circle {
    pub fn new(cx: f64, cy: f64, r: f64) -> Self {
        Self { cx, cy, r }
    }

    pub fn center(&self) -> Point {
        Point::new(self.cx, self.cy)
    }

    pub fn contains(&self, point: &Point) -> bool {
        self.center().distance_to(point) <= self.r
    }

    pub fn is_finite(&self) -> bool {
        self.cx.is_finite() && self.cy.is_finite() && self.r.is_finite()
    }
}

impl From<(f64, f64, f64)> for Circle {
    fn from((cx, cy, r): (f64, f64, f64)) -> Self {
        Self { cx, cy, r }
    }
}

impl From<Circle> for (f64, f64, f64) {
    fn from(circle: Circle) -> Self {
        (circle.cx, circle.cy, circle.r)
    }
}

/// Closed interval `[min, max]`.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.min..=self.max)
    }
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct BoundingBox {
    pub x: Interval,
    pub y: Interval,
}

impl BoundingBox {
    /// Larger of the box's width and height.
    pub fn max_span(&self) -> f64 {
        self.x.width().max(self.y.width())
    }
}

/// Fixed point cloud stored as parallel coordinate arrays so the fitness loop
/// runs over contiguous memory.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl PointCloud {
    pub fn new(points: &[Point]) -> Self {
        points.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn get(&self, index: usize) -> Option<Point> {
        Some(Point::new(*self.xs.get(index)?, *self.ys.get(index)?))
    }

    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        self.xs
            .iter()
            .zip(self.ys.iter())
            .map(|(&x, &y)| Point::new(x, y))
    }

    pub fn is_finite(&self) -> bool {
        self.xs.iter().chain(self.ys.iter()).all(|v| v.is_finite())
    }

    /// `None` for an empty cloud.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        if self.is_empty() {
            return None;
        }
        let (x_min, x_max) = min_max(&self.xs);
        let (y_min, y_max) = min_max(&self.ys);
        Some(BoundingBox {
            x: Interval::new(x_min, x_max),
            y: Interval::new(y_min, y_max),
        })
    }

    /// Sum of `distance - r` over every point strictly outside `circle`.
    pub fn excess_distance(&self, circle: &Circle) -> f64 {
        self.xs
            .iter()
            .zip(self.ys.iter())
            .map(|(&x, &y)| {
                let dx = x - circle.cx;
                let dy = y - circle.cy;
                let d = (dx * dx + dy * dy).sqrt();
                if d > circle.r {
                    d - circle.r
                } else {
                    0.0
                }
            })
            .sum()
    }

    pub fn count_inside(&self, circle: &Circle) -> usize {
        self.iter().filter(|p| circle.contains(p)).count()
    }
}

impl FromIterator<Point> for PointCloud {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        let (xs, ys) = iter.into_iter().map(|p| (p.x, p.y)).unzip();
        Self { xs, ys }
    }
}

impl From<Vec<(f64, f64)>> for PointCloud {
    fn from(points: Vec<(f64, f64)>) -> Self {
        points.into_iter().map(Point::from).collect()
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}
