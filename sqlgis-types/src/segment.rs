//! Ring edges, the building block of point containment and label placement.

use crate::cartesian::{CartesianPoint2d, Orientation};

/// A straight line segment between two points.
#[derive(Debug, PartialEq)]
pub struct Segment<'a, Point>(pub &'a Point, pub &'a Point);

impl<P: CartesianPoint2d> Segment<'_, P> {
    /// Returns true if the point lies exactly on the segment, including its endpoints.
    pub fn contains_point<Point: CartesianPoint2d<Num = P::Num>>(&self, point: &Point) -> bool {
        if Orientation::triplet(self.0, point, self.1) != Orientation::Collinear {
            return false;
        }

        let (x_min, x_max) = if self.0.x() <= self.1.x() {
            (self.0.x(), self.1.x())
        } else {
            (self.1.x(), self.0.x())
        };
        let (y_min, y_max) = if self.0.y() <= self.1.y() {
            (self.0.y(), self.1.y())
        } else {
            (self.1.y(), self.0.y())
        };

        point.x() >= x_min && point.x() <= x_max && point.y() >= y_min && point.y() <= y_max
    }

    /// X coordinate where the segment crosses the horizontal line at `y`.
    ///
    /// Returns `None` unless the endpoints lie strictly on different sides of the line, with an endpoint
    /// exactly on the line counted as lying above it. Horizontal segments never cross.
    pub fn crossing_at(&self, y: P::Num) -> Option<P::Num> {
        let (a, b) = (self.0, self.1);
        if (a.y() > y) == (b.y() > y) {
            return None;
        }

        Some(a.x() + (y - a.y()) * (b.x() - a.x()) / (b.y() - a.y()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartesian::Point2d;

    #[test]
    fn contains_point() {
        let a = Point2d::new(35.0, 10.0);
        let b = Point2d::new(10.0, 10.0);
        let segment = Segment(&a, &b);

        assert!(segment.contains_point(&Point2d::new(20.0, 10.0)));
        assert!(segment.contains_point(&Point2d::new(10.0, 10.0)));
        assert!(!segment.contains_point(&Point2d::new(5.0, 10.0)));
        assert!(!segment.contains_point(&Point2d::new(20.0, 10.5)));
    }

    #[test]
    fn crossing_at() {
        let a = Point2d::new(0.0, 0.0);
        let b = Point2d::new(10.0, 20.0);
        let segment = Segment(&a, &b);

        assert_eq!(segment.crossing_at(10.0), Some(5.0));
        assert_eq!(segment.crossing_at(25.0), None);

        let c = Point2d::new(10.0, 0.0);
        assert_eq!(Segment(&a, &c).crossing_at(0.0), None);
    }
}
