//! PostGIS bounding-box text types `BOX` and `BOX3D`.
//!
//! A box is two corner positions, lower-left(-bottom) first, with an
//! optional `SRID=n;` prefix. `BOX3D` also accepts two-dimensional corners
//! and writes them back unchanged.

use std::fmt;
use std::str::FromStr;

use crate::error::{GeoWireError, Result};
use crate::geometry::{normalize_srid, Dimension, Point, Shape, UNKNOWN_SRID};
use crate::wkt::{parse_position, split_srid, split_top_level, strip_parens, write_position};

/// Reads `[SRID=n;]<keyword>(<corner>,<corner>)`.
fn parse_corners(text: &str, keyword: &str) -> Result<(Point, Point, i32)> {
    let (srid, body) = split_srid(text)?;
    let inner = body
        .strip_prefix(keyword)
        .ok_or_else(|| GeoWireError::text(format!("expected {keyword}"), body))?;
    let corners = split_top_level(strip_parens(inner)?)?;
    let [llb, urt] = corners.as_slice() else {
        return Err(GeoWireError::text("a box needs exactly two corners", inner));
    };
    let (llb, urt) = (parse_position(llb)?, parse_position(urt)?);
    if llb.dimension() != urt.dimension() {
        return Err(GeoWireError::text("box corners differ in dimension", inner));
    }
    Ok((llb, urt, srid.unwrap_or(UNKNOWN_SRID)))
}

fn write_corners(
    f: &mut fmt::Formatter<'_>,
    keyword: &str,
    llb: &Point,
    urt: &Point,
    srid: i32,
) -> fmt::Result {
    if srid != UNKNOWN_SRID {
        write!(f, "SRID={srid};")?;
    }
    f.write_str(keyword)?;
    f.write_str("(")?;
    write_position(llb, f)?;
    f.write_str(",")?;
    write_position(urt, f)?;
    f.write_str(")")
}

macro_rules! bounding_box {
    ($(#[$meta:meta])* $name:ident, $keyword:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $name {
            llb: Point,
            urt: Point,
            srid: i32,
        }

        impl $name {
            pub fn llb(&self) -> &Point {
                &self.llb
            }

            pub fn urt(&self) -> &Point {
                &self.urt
            }

            pub fn srid(&self) -> i32 {
                self.srid
            }

            pub fn with_srid(mut self, srid: i32) -> Self {
                self.srid = normalize_srid(srid);
                self
            }

            pub fn dimension(&self) -> Dimension {
                self.llb.dimension()
            }
        }

        impl FromStr for $name {
            type Err = GeoWireError;

            fn from_str(s: &str) -> Result<Self> {
                let (llb, urt, srid) = parse_corners(s, $keyword)?;
                let parsed = Self::new(llb, urt).map_err(|e| match e {
                    GeoWireError::Conversion(message) => GeoWireError::text(message, s.trim()),
                    other => other,
                })?;
                Ok(parsed.with_srid(srid))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write_corners(f, $keyword, &self.llb, &self.urt, self.srid)
            }
        }
    };
}

bounding_box!(
    /// A 2D box, `BOX(x y,x y)`.
    Box2d,
    "BOX"
);

bounding_box!(
    /// A 3D box, `BOX3D(x y z,x y z)`. Two-dimensional corners are kept as
    /// given.
    Box3d,
    "BOX3D"
);

fn unmeasured(llb: &Point, urt: &Point) -> Result<()> {
    if llb.has_measure() || urt.has_measure() {
        return Err(GeoWireError::Conversion("box corners cannot carry a measure".into()));
    }
    if llb.dimension() != urt.dimension() {
        return Err(GeoWireError::Conversion("box corners differ in dimension".into()));
    }
    Ok(())
}

impl Box2d {
    /// Fails unless both corners are plain 2D positions.
    pub fn new(llb: Point, urt: Point) -> Result<Self> {
        unmeasured(&llb, &urt)?;
        if llb.has_z() {
            return Err(GeoWireError::Conversion("BOX corners must be 2D".into()));
        }
        Ok(Self {
            llb: llb.with_srid(UNKNOWN_SRID),
            urt: urt.with_srid(UNKNOWN_SRID),
            srid: UNKNOWN_SRID,
        })
    }
}

impl Box3d {
    /// Fails when the corners differ in dimension or carry a measure.
    pub fn new(llb: Point, urt: Point) -> Result<Self> {
        unmeasured(&llb, &urt)?;
        Ok(Self {
            llb: llb.with_srid(UNKNOWN_SRID),
            urt: urt.with_srid(UNKNOWN_SRID),
            srid: UNKNOWN_SRID,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_text_roundtrips() {
        for text in ["BOX3D(1 2 3,4 5 6)", "BOX3D(1 2,4 5)", "SRID=4326;BOX3D(1 2 3,4 5 6)"] {
            let parsed: Box3d = text.parse().unwrap();
            assert_eq!(parsed.to_string(), text);
            assert_eq!(parsed.to_string().parse::<Box3d>().unwrap(), parsed);
        }
        for text in ["BOX(1 2,3 4)", "SRID=4326;BOX(1 2,3 4)"] {
            let parsed: Box2d = text.parse().unwrap();
            assert_eq!(parsed.to_string(), text);
        }
    }

    #[test]
    fn corners_and_srid() {
        let b: Box3d = "SRID=4326;BOX3D(1 2 3,4 5 6)".parse().unwrap();
        assert_eq!(b.srid(), 4326);
        assert_eq!(b.llb(), &Point::new_z(1.0, 2.0, 3.0));
        assert_eq!(b.urt(), &Point::new_z(4.0, 5.0, 6.0));
        assert_eq!(b.dimension(), Dimension::Xyz);
    }

    #[test]
    fn rejects_malformed_boxes() {
        assert!("BOX(1 2 3,4 5 6)".parse::<Box2d>().unwrap_err().is_text());
        assert!("BOX3D(1 2 3,4 5)".parse::<Box3d>().unwrap_err().is_text());
        assert!("BOX(1 2)".parse::<Box2d>().unwrap_err().is_text());
        assert!("BOX(1 2,3 4,5 6)".parse::<Box2d>().unwrap_err().is_text());
        assert!("BOX3D(1 2 3 4,5 6 7 8)".parse::<Box3d>().unwrap_err().is_text());
        assert!("BOX3D(1 2,3 4)".parse::<Box2d>().unwrap_err().is_text());
        assert!("POINT(1 2)".parse::<Box3d>().unwrap_err().is_text());
    }

    #[test]
    fn corners_are_bare_positions() {
        assert!("BOX(POINT(1 2),POINT(3 4))".parse::<Box2d>().unwrap_err().is_text());
        assert!("BOX((1 2),(3 4))".parse::<Box2d>().unwrap_err().is_text());
        assert!("BOX3D(1 2 M,3 4 M)".parse::<Box3d>().unwrap_err().is_text());
    }

    #[test]
    fn constructor_checks_corners() {
        assert!(Box2d::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0)).is_ok());
        assert!(Box2d::new(Point::new_z(0.0, 0.0, 0.0), Point::new_z(1.0, 1.0, 1.0)).is_err());
        assert!(Box3d::new(Point::new_m(0.0, 0.0, 1.0), Point::new_m(1.0, 1.0, 1.0)).is_err());
    }
}
