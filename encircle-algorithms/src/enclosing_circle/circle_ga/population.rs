use encircle_challenges::geometry::{Circle, Interval, PointCloud};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One of the three genes of a candidate circle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gene {
    CenterX,
    CenterY,
    Radius,
}

impl Gene {
    /// Genes in encoding order; crossover cut points index into this.
    pub const ALL: [Gene; 3] = [Gene::CenterX, Gene::CenterY, Gene::Radius];

    pub fn get(self, circle: &Circle) -> f64 {
        match self {
            Gene::CenterX => circle.cx,
            Gene::CenterY => circle.cy,
            Gene::Radius => circle.r,
        }
    }

    pub fn set(self, circle: &mut Circle, value: f64) {
        match self {
            Gene::CenterX => circle.cx = value,
            Gene::CenterY => circle.cy = value,
            Gene::Radius => circle.r = value,
        }
    }
}

/// Legal range of every gene, fixed at construction from the point cloud.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct GeneBounds {
    pub x: Interval,
    pub y: Interval,
    pub r: Interval,
}

impl GeneBounds {
    /// Centre bounded by the cloud's bounding box, radius by `[max_span / 10, max_span]`.
    /// `None` for an empty cloud.
    pub fn from_points(points: &PointCloud) -> Option<Self> {
        let bbox = points.bounding_box()?;
        let max_span = bbox.max_span();
        Some(Self {
            x: bbox.x,
            y: bbox.y,
            r: Interval::new(max_span / 10.0, max_span),
        })
    }

    pub fn interval(&self, gene: Gene) -> Interval {
        match gene {
            Gene::CenterX => self.x,
            Gene::CenterY => self.y,
            Gene::Radius => self.r,
        }
    }

    pub fn contains(&self, circle: &Circle) -> bool {
        Gene::ALL
            .iter()
            .all(|&gene| self.interval(gene).contains(gene.get(circle)))
    }

    pub fn clamp(&self, circle: &Circle) -> Circle {
        let mut clamped = *circle;
        for gene in Gene::ALL {
            gene.set(&mut clamped, self.interval(gene).clamp(gene.get(circle)));
        }
        clamped
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> Circle {
        Circle::new(self.x.sample(rng), self.y.sample(rng), self.r.sample(rng))
    }
}

/// Draws `size` candidates uniformly within `bounds`.
pub fn initialize<R: Rng>(bounds: &GeneBounds, size: usize, rng: &mut R) -> Vec<Circle> {
    (0..size).map(|_| bounds.sample(rng)).collect()
}
