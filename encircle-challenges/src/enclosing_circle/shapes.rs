use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Origin-centred point sets whose minimum enclosing circle is known analytically.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    RegularPolygon { vertices: usize, circumradius: f64 },
    Square { side: f64 },
    Ellipse { a: f64, b: f64, num_points: usize },
}

impl Shape {
    pub fn points(&self) -> Vec<Point> {
        match *self {
            Shape::RegularPolygon {
                vertices,
                circumradius,
            } => (0..vertices)
                .map(|i| {
                    let angle = 2.0 * PI * i as f64 / vertices as f64;
                    Point::new(circumradius * angle.cos(), circumradius * angle.sin())
                })
                .collect(),
            Shape::Square { side } => {
                let half = side / 2.0;
                vec![
                    Point::new(-half, -half),
                    Point::new(half, -half),
                    Point::new(half, half),
                    Point::new(-half, half),
                ]
            }
            Shape::Ellipse { a, b, num_points } => (0..num_points)
                .map(|i| {
                    let angle = 2.0 * PI * i as f64 / num_points as f64;
                    Point::new(a * angle.cos(), b * angle.sin())
                })
                .collect(),
        }
    }

    pub fn optimal_radius(&self) -> f64 {
        match *self {
            Shape::RegularPolygon { circumradius, .. } => circumradius,
            Shape::Square { side } => side * 2f64.sqrt() / 2.0,
            Shape::Ellipse { a, b, .. } => a.max(b),
        }
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shape::RegularPolygon { vertices, .. } => {
                write!(f, "Regular polygon ({} vertices)", vertices)
            }
            Shape::Square { side } => write!(f, "Square (side {})", side),
            Shape::Ellipse { a, b, .. } => write!(f, "Ellipse (a={}, b={})", a, b),
        }
    }
}

impl std::str::FromStr for Shape {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "triangle" => Ok(Shape::RegularPolygon {
                vertices: 3,
                circumradius: 100.0,
            }),
            "square" => Ok(Shape::Square { side: 100.0 }),
            "hexagon" => Ok(Shape::RegularPolygon {
                vertices: 6,
                circumradius: 100.0,
            }),
            "decagon" => Ok(Shape::RegularPolygon {
                vertices: 10,
                circumradius: 100.0,
            }),
            "ellipse" => Ok(Shape::Ellipse {
                a: 100.0,
                b: 60.0,
                num_points: 50,
            }),
            "tall_ellipse" => Ok(Shape::Ellipse {
                a: 80.0,
                b: 120.0,
                num_points: 50,
            }),
            _ => Err(anyhow::anyhow!("Invalid shape: {}", s)),
        }
    }
}
