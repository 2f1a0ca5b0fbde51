use super::{normalize_srid, Dimension, Shape, UNKNOWN_SRID};

/// A single position with optional Z and M ordinates.
///
/// Ordinates that the layout does not carry are stored as `0.0`, so two
/// points of the same layout compare by the ordinates they actually have.
#[derive(Debug, Clone, Copy)]
pub struct Point {
    x: f64,
    y: f64,
    z: f64,
    m: f64,
    dimension: Dimension,
    has_measure: bool,
    srid: i32,
}

impl Point {
    /// A 2D point.
    pub fn new(x: f64, y: f64) -> Self {
        Self::from_ordinates(Dimension::Xy, false, x, y, 0.0, 0.0)
    }

    /// A 3D point.
    pub fn new_z(x: f64, y: f64, z: f64) -> Self {
        Self::from_ordinates(Dimension::Xyz, false, x, y, z, 0.0)
    }

    /// A 2D point with a measure.
    pub fn new_m(x: f64, y: f64, m: f64) -> Self {
        Self::from_ordinates(Dimension::Xy, true, x, y, 0.0, m)
    }

    /// A 3D point with a measure.
    pub fn new_zm(x: f64, y: f64, z: f64, m: f64) -> Self {
        Self::from_ordinates(Dimension::Xyz, true, x, y, z, m)
    }

    /// Builds a point of the given layout, zeroing the ordinates it lacks.
    pub fn from_ordinates(
        dimension: Dimension,
        has_measure: bool,
        x: f64,
        y: f64,
        z: f64,
        m: f64,
    ) -> Self {
        Self {
            x,
            y,
            z: if dimension.has_z() { z } else { 0.0 },
            m: if has_measure { m } else { 0.0 },
            dimension,
            has_measure,
            srid: UNKNOWN_SRID,
        }
    }

    /// Stores every ordinate as given, bypassing the zeroing rule.
    #[cfg(test)]
    pub(crate) fn unchecked(dimension: Dimension, has_measure: bool, ordinates: [f64; 4]) -> Self {
        let [x, y, z, m] = ordinates;
        Self {
            x,
            y,
            z,
            m,
            dimension,
            has_measure,
            srid: UNKNOWN_SRID,
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Z ordinate, `0.0` for 2D points.
    pub fn z(&self) -> f64 {
        self.z
    }

    /// Measure, `0.0` for unmeasured points.
    pub fn m(&self) -> f64 {
        self.m
    }

    pub fn opt_z(&self) -> Option<f64> {
        self.dimension.has_z().then_some(self.z)
    }

    pub fn opt_m(&self) -> Option<f64> {
        self.has_measure.then_some(self.m)
    }

    pub fn with_srid(mut self, srid: i32) -> Self {
        self.set_srid(srid);
        self
    }

    pub(crate) fn set_layout(&mut self, dimension: Dimension, has_measure: bool) {
        let srid = self.srid;
        *self = Self::from_ordinates(dimension, has_measure, self.x, self.y, self.z, self.m);
        self.srid = srid;
    }
}

fn same_ordinate(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.dimension == other.dimension
            && self.has_measure == other.has_measure
            && self.srid == other.srid
            && same_ordinate(self.x, other.x)
            && same_ordinate(self.y, other.y)
            && same_ordinate(self.z, other.z)
            && same_ordinate(self.m, other.m)
    }
}

impl Shape for Point {
    fn dimension(&self) -> Dimension {
        self.dimension
    }

    fn has_measure(&self) -> bool {
        self.has_measure
    }

    fn srid(&self) -> i32 {
        self.srid
    }

    fn set_srid(&mut self, srid: i32) {
        self.srid = normalize_srid(srid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_zero_missing_ordinates() {
        let p = Point::from_ordinates(Dimension::Xy, false, 1.0, 2.0, 3.0, 4.0);
        assert_eq!(p.z(), 0.0);
        assert_eq!(p.m(), 0.0);
        assert_eq!(p.opt_z(), None);
        assert_eq!(p.opt_m(), None);

        let p = Point::new_m(1.0, 2.0, 7.0);
        assert_eq!(p.dimension(), Dimension::Xy);
        assert_eq!(p.opt_m(), Some(7.0));
        assert_eq!(p.z(), 0.0);
    }

    #[test]
    fn nan_ordinates_compare_equal() {
        let a = Point::new(f64::NAN, f64::NAN);
        let b = Point::new(f64::NAN, f64::NAN);
        assert_eq!(a, b);
        assert_ne!(a, Point::new(f64::NAN, 0.0));
    }

    #[test]
    fn equality_respects_layout() {
        assert_ne!(Point::new(10.0, 10.0), Point::new_z(10.0, 10.0, 0.0));
        assert_ne!(Point::new(10.0, 10.0), Point::new_m(10.0, 10.0, 0.0));
        assert_ne!(Point::new(10.0, 10.0), Point::new(10.0, 10.0).with_srid(4326));
    }
}
