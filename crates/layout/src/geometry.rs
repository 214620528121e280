use crate::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 2D point with f64 coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Create a point at the origin
    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Whether both coordinates are finite
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Node positions keyed by id, iterated in ascending id order
pub type PositionMap = BTreeMap<NodeId, Point>;

/// Axis-aligned bounding box of a set of points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Bounding box of the given points, `None` when there are none
    pub fn of<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let bounds = points.fold(
            Self {
                min: first,
                max: first,
            },
            |b, p| Self {
                min: Point::new(b.min.x.min(p.x), b.min.y.min(p.y)),
                max: Point::new(b.max.x.max(p.x), b.max.y.max(p.y)),
            },
        );
        Some(bounds)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn bounds_of_points() {
        let bounds = Bounds::of([
            Point::new(1.0, -2.0),
            Point::new(-3.0, 4.0),
            Point::new(0.5, 0.5),
        ])
        .unwrap();

        assert_eq!(bounds.min, Point::new(-3.0, -2.0));
        assert_eq!(bounds.max, Point::new(1.0, 4.0));
        assert_eq!(bounds.width(), 4.0);
        assert_eq!(bounds.height(), 6.0);
        assert_eq!(bounds.center(), Point::new(-1.0, 1.0));
    }

    #[test]
    fn bounds_of_nothing() {
        assert_eq!(Bounds::of(std::iter::empty()), None);
    }
}
