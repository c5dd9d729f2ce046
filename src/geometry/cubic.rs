//! Cubic Bézier evaluation for curve segments.
//!
//! Renderers flatten segments themselves; the model only needs point
//! evaluation (for highlight markers and tests) and the control hull
//! (see [`crate::geometry::bounds::Bounds::of_curve`]).

use crate::model::{Curve, Point};

/// Control points of a cubic Bézier curve.
#[derive(Clone, Copy, Debug)]
pub struct CubicBezier {
    pub p0: Point,
    pub p1: Point,
    pub p2: Point,
    pub p3: Point,
}

impl CubicBezier {
    pub fn new(p0: Point, p1: Point, p2: Point, p3: Point) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Promote a [`Curve`] to cubic form. A straight line gets its control
    /// points at the third points of the chord; a single present control
    /// point is duplicated.
    pub fn from_curve(c: &Curve) -> Self {
        let (p1, p2) = match (c.c1, c.c2) {
            (Some(a), Some(b)) => (a, b),
            (Some(a), None) => (a, a),
            (None, Some(b)) => (b, b),
            (None, None) => (
                lerp(c.start, c.end, 1.0 / 3.0),
                lerp(c.start, c.end, 2.0 / 3.0),
            ),
        };
        Self::new(c.start, p1, p2, c.end)
    }

    /// Evaluate the curve at parameter t ∈ [0, 1].
    pub fn eval(&self, t: f32) -> Point {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        Point {
            x: mt3 * self.p0.x
                + 3.0 * mt2 * t * self.p1.x
                + 3.0 * mt * t2 * self.p2.x
                + t3 * self.p3.x,
            y: mt3 * self.p0.y
                + 3.0 * mt2 * t * self.p1.y
                + 3.0 * mt * t2 * self.p2.y
                + t3 * self.p3.y,
        }
    }
}

fn lerp(a: Point, b: Point, t: f32) -> Point {
    Point {
        x: a.x + t * (b.x - a.x),
        y: a.y + t * (b.y - a.y),
    }
}
