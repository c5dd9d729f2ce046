use crate::geometry::cubic::CubicBezier;
use crate::model::{Curve, Point};
use serde::{Deserialize, Serialize};

/// Axis-aligned hull enclosing drawn content, used for hit-testing.
///
/// Hulls of adjacent partitions are expected to touch rather than overlap;
/// containment is inclusive on all edges so a shared border hits both.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn point(p: Point) -> Self {
        Bounds {
            min_x: p.x,
            min_y: p.y,
            max_x: p.x,
            max_y: p.y,
        }
    }

    /// Hull of a curve. Lines are exact; beziers are sampled, which stays
    /// well inside the looser control-point box and keeps adjacent hulls
    /// touching instead of overlapping.
    pub fn of_curve(c: &Curve) -> Self {
        let mut b = Bounds::point(c.start).merge(Bounds::point(c.end));
        if !c.is_line() {
            const SAMPLES: u32 = 8;
            let cubic = CubicBezier::from_curve(c);
            for i in 1..SAMPLES {
                b = b.merge(Bounds::point(cubic.eval(i as f32 / SAMPLES as f32)));
            }
        }
        b
    }

    pub fn merge(&self, other: Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn union(a: Option<Bounds>, b: Option<Bounds>) -> Option<Bounds> {
        match (a, b) {
            (None, x) => x,
            (x, None) => x,
            (Some(a), Some(b)) => Some(a.merge(b)),
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}
