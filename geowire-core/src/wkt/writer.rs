use std::fmt::{self, Write};

use crate::geometry::{Geometry, LineString, Point, Polygon, Shape, UNKNOWN_SRID};

/// Display adapter producing WKT without an SRID prefix.
pub struct Wkt<'a>(pub &'a Geometry);

/// Display adapter producing EWKT: `SRID=n;` followed by WKT when an SRID
/// is set.
pub struct Ewkt<'a>(pub &'a Geometry);

impl fmt::Display for Wkt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_tagged(self.0, true, f)
    }
}

impl fmt::Display for Ewkt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.srid() != UNKNOWN_SRID {
            write!(f, "SRID={};", self.0.srid())?;
        }
        write_tagged(self.0, true, f)
    }
}

/// WKT text of `geom`.
///
/// # Example
///
/// ```
/// use geowire_core::geometry::{Geometry, MultiPoint, Point};
/// use geowire_core::wkt::write_wkt;
///
/// let multi = MultiPoint::new(vec![Point::new(1.0, 2.0), Point::new(3.5, 4.0)]);
/// assert_eq!(write_wkt(&Geometry::from(multi)), "MULTIPOINT(1 2,3.5 4)");
/// ```
pub fn write_wkt(geom: &Geometry) -> String {
    Wkt(geom).to_string()
}

/// EWKT text of `geom`.
pub fn write_ewkt(geom: &Geometry) -> String {
    Ewkt(geom).to_string()
}

/// Keyword, measure suffix and body. The `M` suffix is only written on the
/// outermost keyword and only for 2D measured data; inner keywords inherit
/// it when read back.
fn write_tagged<W: Write>(geom: &Geometry, outermost: bool, out: &mut W) -> fmt::Result {
    out.write_str(geom.type_name())?;
    if outermost && geom.has_measure() && !geom.has_z() {
        out.write_char('M')?;
    }
    if geom.is_empty() {
        return out.write_str(" EMPTY");
    }
    write_body(geom, out)
}

fn write_body<W: Write>(geom: &Geometry, out: &mut W) -> fmt::Result {
    match geom {
        Geometry::Point(p) => {
            out.write_char('(')?;
            write_point(p, out)?;
            out.write_char(')')
        }
        Geometry::LineString(line) => write_point_list(line.points(), out),
        Geometry::Polygon(polygon) => write_polygon(polygon, out),
        // bare positions, no inner parentheses
        Geometry::MultiPoint(multi) => write_point_list(multi.points(), out),
        Geometry::MultiLineString(multi) => write_list(multi.lines(), out, write_line),
        Geometry::MultiPolygon(multi) => write_list(multi.polygons(), out, write_polygon),
        Geometry::GeometryCollection(collection) => {
            write_list(collection.geometries(), out, |child, out| {
                write_tagged(child, false, out)
            })
        }
    }
}

/// `(a,b,...)` with each item written by `write_item`.
fn write_list<T, W: Write>(
    items: &[T],
    out: &mut W,
    mut write_item: impl FnMut(&T, &mut W) -> fmt::Result,
) -> fmt::Result {
    out.write_char('(')?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.write_char(',')?;
        }
        write_item(item, out)?;
    }
    out.write_char(')')
}

fn write_point_list<W: Write>(points: &[Point], out: &mut W) -> fmt::Result {
    write_list(points, out, write_point)
}

fn write_line<W: Write>(line: &LineString, out: &mut W) -> fmt::Result {
    if line.is_empty() {
        return out.write_str("EMPTY");
    }
    write_point_list(line.points(), out)
}

fn write_polygon<W: Write>(polygon: &Polygon, out: &mut W) -> fmt::Result {
    if polygon.is_empty() {
        return out.write_str("EMPTY");
    }
    write_list(polygon.rings(), out, |ring, out| {
        write_point_list(ring.points(), out)
    })
}

pub(crate) fn write_point<W: Write>(point: &Point, out: &mut W) -> fmt::Result {
    write_ordinate(point.x(), out)?;
    out.write_char(' ')?;
    write_ordinate(point.y(), out)?;
    if let Some(z) = point.opt_z() {
        out.write_char(' ')?;
        write_ordinate(z, out)?;
    }
    if let Some(m) = point.opt_m() {
        out.write_char(' ')?;
        write_ordinate(m, out)?;
    }
    Ok(())
}

/// Shortest text that reads back to the same double. Very large and very
/// small magnitudes switch to exponent notation.
fn write_ordinate<W: Write>(value: f64, out: &mut W) -> fmt::Result {
    let magnitude = value.abs();
    if value.is_finite() && value != 0.0 && !(1e-5..1e16).contains(&magnitude) {
        write!(out, "{value:e}")
    } else {
        write!(out, "{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{GeometryCollection, LinearRing, MultiLineString, MultiPolygon};

    fn ring(points: &[(f64, f64)]) -> LinearRing {
        LinearRing::new(points.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    #[test]
    fn ewkt_prefix_only_with_srid() {
        let point = Geometry::from(Point::new(1.0, 2.0));
        assert_eq!(write_ewkt(&point), "POINT(1 2)");
        let point = point.with_srid(4326);
        assert_eq!(write_ewkt(&point), "SRID=4326;POINT(1 2)");
        assert_eq!(write_wkt(&point), "POINT(1 2)");
        assert_eq!(point.to_string(), "SRID=4326;POINT(1 2)");
    }

    #[test]
    fn measure_suffix_only_outermost_and_2d() {
        let line = LineString::new(vec![Point::new_m(0.0, 0.0, 1.0), Point::new_m(1.0, 1.0, 2.0)]);
        let multi = Geometry::from(MultiLineString::new(vec![line.clone()]));
        assert_eq!(write_wkt(&multi), "MULTILINESTRINGM((0 0 1,1 1 2))");

        let collection = Geometry::from(GeometryCollection::new(vec![line.into()]));
        assert_eq!(
            write_wkt(&collection),
            "GEOMETRYCOLLECTIONM(LINESTRING(0 0 1,1 1 2))"
        );

        let zm = Geometry::from(Point::new_zm(1.0, 2.0, 3.0, 4.0));
        assert_eq!(write_wkt(&zm), "POINT(1 2 3 4)");
    }

    #[test]
    fn polygons_and_empties() {
        let polygon = Polygon::new(vec![
            ring(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 0.0)]),
            ring(&[(5.0, 5.0), (6.0, 5.0), (6.0, 6.0), (5.0, 5.0)]),
        ]);
        assert_eq!(
            write_wkt(&polygon.clone().into()),
            "POLYGON((0 0,10 0,10 10,0 0),(5 5,6 5,6 6,5 5))"
        );
        let multi = MultiPolygon::new(vec![polygon, Polygon::empty()]);
        assert!(write_wkt(&multi.into()).ends_with(",EMPTY)"));
        assert_eq!(
            write_wkt(&GeometryCollection::empty().into()),
            "GEOMETRYCOLLECTION EMPTY"
        );
    }

    #[test]
    fn ordinate_formatting() {
        let mut out = String::new();
        for value in [0.0, -2.5, 1e16, 1.5e-7, 0.00002, 123456.789] {
            write_ordinate(value, &mut out).unwrap();
            out.push(' ');
        }
        assert_eq!(out, "0 -2.5 1e16 1.5e-7 0.00002 123456.789 ");
    }
}
