use super::{LinearRing, Point};

composite_geometry!(
    /// A shell ring followed by zero or more hole rings.
    Polygon,
    rings: LinearRing
);

impl Polygon {
    /// The outer ring, `None` for an empty polygon.
    pub fn shell(&self) -> Option<&LinearRing> {
        self.rings.first()
    }

    pub fn holes(&self) -> &[LinearRing] {
        self.rings.get(1..).unwrap_or(&[])
    }

    /// Points of every ring, shell first.
    pub fn points(&self) -> impl Iterator<Item = &Point> + '_ {
        self.rings.iter().flat_map(|ring| ring.iter())
    }
}
