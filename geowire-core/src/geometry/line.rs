use super::Point;

composite_geometry!(
    /// An ordered sequence of points.
    LineString,
    points: Point
);

composite_geometry!(
    /// A polygon ring. Closure is not checked.
    LinearRing,
    points: Point
);

impl From<LinearRing> for LineString {
    fn from(ring: LinearRing) -> Self {
        let (dimension, has_measure, srid) = {
            use super::Shape;
            (ring.dimension(), ring.has_measure(), ring.srid())
        };
        LineString::from_parts(ring.into_inner(), dimension, has_measure, srid)
    }
}

impl LinearRing {
    /// True when the first and last points coincide.
    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => first == last,
            _ => false,
        }
    }
}
