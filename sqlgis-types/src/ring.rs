//! Ring is a closed sequence of points bounding a polygon area or a hole in it.
//!
//! Rings read from WKT repeat the first point at the end. All operations here accept rings both with and without
//! the repeated point: [`Ring::vertices`] strips it, and the closing segment is always implied.

use std::cmp::Ordering;

use nalgebra::Point2;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

use crate::cartesian::{CartesianPoint2d, Point2d};
use crate::segment::Segment;

/// Closed sequence of points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ring<P = Point2d> {
    /// Points of the ring as they were written, usually with the first point repeated at the end.
    pub points: Vec<P>,
}

impl<P> Ring<P> {
    /// Creates a new ring.
    pub fn new(points: Vec<P>) -> Self {
        Self { points }
    }

    /// Number of points including the repeated closing point.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the ring has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl<P: CartesianPoint2d> Ring<P> {
    /// Vertices of the ring without the repeated closing point.
    pub fn vertices(&self) -> &[P] {
        match self.points.as_slice() {
            [first, .., last] if first.equal(last) => &self.points[..self.points.len() - 1],
            points => points,
        }
    }

    /// Iterates over the vertices and then the first vertex once more.
    pub fn iter_points_closing(&self) -> impl Iterator<Item = &P> {
        let vertices = self.vertices();
        vertices.iter().chain(vertices.first())
    }

    /// Iterates over the edges of the ring, including the one from the last vertex back to the first.
    pub fn iter_segments(&self) -> impl Iterator<Item = Segment<'_, P>> {
        let vertices = self.vertices();
        let count = vertices.len();
        (0..count).map(move |i| Segment(&vertices[i], &vertices[(i + 1) % count]))
    }

    /// Number of vertices, not counting consecutive duplicates.
    pub fn distinct_vertex_count(&self) -> usize {
        let vertices = self.vertices();
        let mut count = 0;
        for (i, vertex) in vertices.iter().enumerate() {
            let next = &vertices[(i + 1) % vertices.len()];
            if !vertex.equal(next) || vertices.len() == 1 {
                count += 1;
            }
        }

        count
    }

    /// A ring with fewer than three distinct vertices encloses no area.
    pub fn is_degenerate(&self) -> bool {
        self.distinct_vertex_count() < 3
    }

    /// Signed area of the ring (shoelace formula).
    ///
    /// Negative for clockwise rings, positive for counterclockwise ones. The repeated closing point contributes
    /// nothing, so the value is the same whether or not the ring repeats its first point.
    pub fn area(&self) -> P::Num {
        let mut iter = self.iter_points_closing();
        let Some(mut prev) = iter.next() else {
            return P::Num::zero();
        };

        let mut aggr = P::Num::zero();
        for p in iter {
            aggr = aggr + prev.x() * p.y() - p.x() * prev.y();
            prev = p;
        }

        aggr / (P::Num::one() + P::Num::one())
    }

    /// Returns true if the ring has the winding of an outer polygon boundary: negative signed area, which is
    /// clockwise on a y-down raster.
    pub fn is_outer(&self) -> bool {
        self.area() < P::Num::zero()
    }

    /// Returns true if the point lies strictly inside the ring. Points on an edge or a vertex are outside.
    pub fn contains_point<Other: CartesianPoint2d<Num = P::Num>>(&self, point: &Other) -> bool {
        if self.vertices().len() < 3 {
            return false;
        }

        if self.iter_segments().any(|s| s.contains_point(point)) {
            return false;
        }

        let mut inside = false;
        for segment in self.iter_segments() {
            if let Some(x) = segment.crossing_at(point.y()) {
                if point.x() < x {
                    inside = !inside;
                }
            }
        }

        inside
    }

    /// Finds a point inside the ring, suitable as a label anchor.
    ///
    /// Scanlines are placed halfway between consecutive distinct vertex y coordinates, so they never pass through a
    /// vertex. The midpoint of the widest interior span over all scanlines is returned. Returns `None` for degenerate
    /// rings.
    pub fn point_on_surface(&self) -> Option<Point2<P::Num>> {
        if self.is_degenerate() {
            return None;
        }

        let two = P::Num::one() + P::Num::one();
        let mut levels: Vec<P::Num> = self.vertices().iter().map(|p| p.y()).collect();
        levels.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        levels.dedup();

        let mut best: Option<(P::Num, Point2<P::Num>)> = None;
        for pair in levels.windows(2) {
            let scan_y = (pair[0] + pair[1]) / two;
            let mut crossings: Vec<P::Num> = self
                .iter_segments()
                .filter_map(|s| s.crossing_at(scan_y))
                .collect();
            crossings.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

            for span in crossings.chunks_exact(2) {
                let width = span[1] - span[0];
                let is_wider = match best {
                    Some((best_width, _)) => width > best_width,
                    None => width > P::Num::zero(),
                };
                if is_wider {
                    best = Some((width, Point2::new((span[0] + span[1]) / two, scan_y)));
                }
            }
        }

        best.map(|(_, point)| point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn ring(coords: &[(f64, f64)]) -> Ring {
        Ring::new(coords.iter().map(|&(x, y)| Point2d::new(x, y)).collect())
    }

    fn triangle() -> Ring {
        ring(&[(35.0, 10.0), (10.0, 10.0), (15.0, 40.0), (35.0, 10.0)])
    }

    #[test]
    fn vertices_strip_closing_point() {
        assert_eq!(triangle().vertices().len(), 3);
        assert_eq!(ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]).vertices().len(), 3);
        assert_eq!(triangle().iter_points_closing().count(), 4);
        assert_eq!(triangle().iter_segments().count(), 3);
    }

    #[test]
    fn area() {
        assert_abs_diff_eq!(ring(&[(35.0, 10.0), (10.0, 10.0), (15.0, 40.0)]).area(), -375.0);
        assert_abs_diff_eq!(triangle().area(), -375.0);
        assert_abs_diff_eq!(ring(&[(15.0, 40.0), (10.0, 10.0), (35.0, 10.0)]).area(), 375.0);
        assert_abs_diff_eq!(Ring::<Point2d>::new(vec![]).area(), 0.0);
        assert_abs_diff_eq!(
            ring(&[(0.1, 0.1), (0.1, 0.4), (0.3, 0.4), (0.3, 0.1)]).area(),
            -0.06,
            epsilon = 1e-12
        );
    }

    #[test]
    fn outer_ring_agrees_with_area_sign() {
        let square = ring(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
        assert!(square.is_outer());

        let reversed = ring(&[(1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]);
        assert!(!reversed.is_outer());

        for r in [triangle(), square, reversed] {
            assert_eq!(r.is_outer(), r.area() < 0.0);
        }
    }

    #[test]
    fn contains_point() {
        let ring = triangle();
        assert!(ring.contains_point(&Point2d::new(20.0, 15.0)));
        assert!(!ring.contains_point(&Point2d::new(20.0, 10.0)));
        assert!(!ring.contains_point(&Point2d::new(10.0, 10.0)));
        assert!(!ring.contains_point(&Point2d::new(5.0, 10.0)));
        assert!(!ring.contains_point(&Point2d::new(25.0, 25.0)));
        assert!(!ring.contains_point(&Point2d::new(15.0, 40.0)));
    }

    #[test]
    fn contains_point_on_every_side_is_false() {
        let square = ring(&[(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0), (0.0, 0.0)]);
        for p in [(0.0, 2.0), (4.0, 2.0), (2.0, 0.0), (2.0, 4.0), (4.0, 4.0)] {
            assert!(!square.contains_point(&Point2d::new(p.0, p.1)), "{p:?}");
        }
        assert!(square.contains_point(&Point2d::new(2.0, 2.0)));
        assert!(square.contains_point(&Point2d::new(3.9, 0.1)));
    }

    #[test]
    fn point_on_surface_is_inside() {
        let rings = [
            ring(&[
                (35.0, 10.0),
                (10.0, 20.0),
                (15.0, 40.0),
                (45.0, 45.0),
                (35.0, 10.0),
            ]),
            ring(&[(20.0, 30.0), (35.0, 32.0), (30.0, 20.0), (20.0, 30.0)]),
            triangle(),
            // concave "U" shape
            ring(&[
                (0.0, 0.0),
                (10.0, 0.0),
                (10.0, 10.0),
                (7.0, 10.0),
                (7.0, 3.0),
                (3.0, 3.0),
                (3.0, 10.0),
                (0.0, 10.0),
                (0.0, 0.0),
            ]),
        ];

        for ring in rings {
            let point = ring.point_on_surface().expect("ring is not degenerate");
            assert!(ring.contains_point(&point), "{point:?} is outside {ring:?}");
        }
    }

    #[test]
    fn point_on_surface_takes_widest_span() {
        let square = ring(&[(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0), (0.0, 0.0)]);
        let point = square.point_on_surface().expect("ring is not degenerate");
        assert_abs_diff_eq!(point.x, 2.0);
        assert_abs_diff_eq!(point.y, 2.0);

        // the lower band of the "L" is wider than its upright
        let l_shape = ring(&[
            (0.0, 0.0),
            (0.0, 3.0),
            (0.3, 3.0),
            (0.3, 1.0),
            (1.0, 1.0),
            (1.0, 0.0),
        ]);
        let point = l_shape.point_on_surface().expect("ring is not degenerate");
        assert_abs_diff_eq!(point.x, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(point.y, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_rings() {
        let line = ring(&[(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        assert!(line.is_degenerate());
        assert_eq!(line.point_on_surface(), None);
        assert!(!line.contains_point(&Point2d::new(0.5, 0.5)));

        let repeated = ring(&[(0.0, 0.0), (0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        assert_eq!(repeated.distinct_vertex_count(), 3);
        assert!(!repeated.is_degenerate());
    }
}
