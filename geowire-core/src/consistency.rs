//! Structural consistency of geometry trees.
//!
//! A tree is consistent when every composite's children share its
//! dimension, measure flag and SRID, and every point zeroes the ordinates
//! its layout does not carry. The EWKB writer only produces well-formed
//! output for consistent input; both parsers reject inconsistent results.

use crate::geometry::{Geometry, LineString, LinearRing, Point, Polygon, Shape};

/// Returns `true` when `geometry` is structurally consistent.
///
/// # Example
///
/// ```
/// use geowire_core::consistency::check;
/// use geowire_core::geometry::{Geometry, MultiPoint, Point};
///
/// let mixed = MultiPoint::new(vec![Point::new(1.0, 2.0), Point::new_z(3.0, 4.0, 5.0)]);
/// assert!(!check(&Geometry::from(mixed)));
/// ```
pub fn check(geometry: &Geometry) -> bool {
    match geometry {
        Geometry::Point(p) => check_point(p),
        Geometry::LineString(g) => check_line(g),
        Geometry::Polygon(g) => check_polygon(g),
        Geometry::MultiPoint(g) => children_consistent(g, g.iter(), check_point),
        Geometry::MultiLineString(g) => children_consistent(g, g.iter(), check_line),
        Geometry::MultiPolygon(g) => children_consistent(g, g.iter(), check_polygon),
        Geometry::GeometryCollection(g) => children_consistent(g, g.iter(), check),
    }
}

fn check_point(point: &Point) -> bool {
    (point.has_z() || point.z() == 0.0) && (point.has_measure() || point.m() == 0.0)
}

fn check_line(line: &LineString) -> bool {
    children_consistent(line, line.iter(), check_point)
}

fn check_ring(ring: &LinearRing) -> bool {
    children_consistent(ring, ring.iter(), check_point)
}

fn check_polygon(polygon: &Polygon) -> bool {
    children_consistent(polygon, polygon.iter(), check_ring)
}

fn children_consistent<'a, P, C, I, F>(parent: &P, children: I, check_child: F) -> bool
where
    P: Shape,
    C: Shape + 'a,
    I: IntoIterator<Item = &'a C>,
    F: Fn(&C) -> bool,
{
    children
        .into_iter()
        .all(|child| parent.same_layout(child) && check_child(child))
}
