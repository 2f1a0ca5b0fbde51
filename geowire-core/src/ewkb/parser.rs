use super::bytes::{BinaryBytes, ByteGetter, HexBytes};
use super::value::ValueGetter;
use super::{read_header, EwkbHeader};
use crate::consistency;
use crate::error::{GeoWireError, Result};
use crate::geometry::{
    Dimension, Geometry, GeometryCollection, GeometryType, LineString, LinearRing, MultiLineString,
    MultiPoint, MultiPolygon, Point, Polygon, Shape, MAX_NESTING_DEPTH, UNKNOWN_SRID,
};

/// Layout every node below the current one must share.
#[derive(Debug, Clone, Copy)]
struct Layout {
    dimension: Dimension,
    has_measure: bool,
    srid: i32,
}

/// Parse raw EWKB bytes.
///
/// # Example
///
/// ```
/// use geowire_core::ewkb::{parse_binary, write_binary, ByteOrder};
/// use geowire_core::geometry::{Geometry, Point};
///
/// let point = Geometry::from(Point::new_z(1.0, 2.0, 3.0).with_srid(4326));
/// let blob = write_binary(&point, ByteOrder::Xdr);
/// assert_eq!(parse_binary(&blob).unwrap(), point);
/// ```
pub fn parse_binary(bytes: &[u8]) -> Result<Geometry> {
    parse(BinaryBytes::new(bytes))
}

/// Parse hex-encoded EWKB text.
pub fn parse_hex(hex: &str) -> Result<Geometry> {
    parse(HexBytes::new(hex)?)
}

/// Parse one complete EWKB geometry from any byte source. Trailing bytes
/// after the geometry are an error.
pub fn parse<G: ByteGetter>(bytes: G) -> Result<Geometry> {
    let mut data = ValueGetter::for_stream(bytes)?;
    let geom = parse_geometry(&mut data, None, 0)?;
    if data.remaining() != 0 {
        return Err(GeoWireError::binary(
            format!("{} trailing bytes after geometry", data.remaining()),
            data.position(),
        ));
    }
    if !consistency::check(&geom) {
        return Err(GeoWireError::binary("inconsistent geometry", 0));
    }
    Ok(geom)
}

fn parse_geometry<G: ByteGetter>(
    data: &mut ValueGetter<G>,
    parent: Option<Layout>,
    depth: usize,
) -> Result<Geometry> {
    if depth > MAX_NESTING_DEPTH {
        return Err(GeoWireError::binary(
            format!("sub-geometries nest deeper than {MAX_NESTING_DEPTH} levels"),
            data.position(),
        ));
    }
    let header = read_header(data)?;
    let layout = node_layout(&header, parent)?;

    Ok(match header.geom_type {
        GeometryType::Point => Geometry::Point(parse_point(data, layout)?),
        GeometryType::LineString => Geometry::LineString(LineString::from_parts(
            parse_point_array(data, layout)?,
            layout.dimension,
            layout.has_measure,
            layout.srid,
        )),
        GeometryType::Polygon => Geometry::Polygon(parse_polygon(data, layout)?),
        GeometryType::MultiPoint => {
            let points = parse_children(data, layout, depth, |geom| match geom {
                Geometry::Point(p) => Ok(p),
                other => Err(other),
            })?;
            Geometry::MultiPoint(MultiPoint::from_parts(
                points,
                layout.dimension,
                layout.has_measure,
                layout.srid,
            ))
        }
        GeometryType::MultiLineString => {
            let lines = parse_children(data, layout, depth, |geom| match geom {
                Geometry::LineString(line) => Ok(line),
                other => Err(other),
            })?;
            Geometry::MultiLineString(MultiLineString::from_parts(
                lines,
                layout.dimension,
                layout.has_measure,
                layout.srid,
            ))
        }
        GeometryType::MultiPolygon => {
            let polygons = parse_children(data, layout, depth, |geom| match geom {
                Geometry::Polygon(poly) => Ok(poly),
                other => Err(other),
            })?;
            Geometry::MultiPolygon(MultiPolygon::from_parts(
                polygons,
                layout.dimension,
                layout.has_measure,
                layout.srid,
            ))
        }
        GeometryType::GeometryCollection => {
            let geometries = parse_children(data, layout, depth, Ok)?;
            Geometry::GeometryCollection(GeometryCollection::from_parts(
                geometries,
                layout.dimension,
                layout.has_measure,
                layout.srid,
            ))
        }
        GeometryType::LinearRing => {
            return Err(GeoWireError::binary(
                "linear ring cannot be encoded as a standalone geometry",
                header.offset,
            ))
        }
    })
}

/// Resolves the layout of a node against its parent: an embedded SRID must
/// match the parent's, an absent one inherits it.
fn node_layout(header: &EwkbHeader, parent: Option<Layout>) -> Result<Layout> {
    let dimension = Dimension::from_has_z(header.has_z);
    let srid = match (header.srid, parent) {
        (Some(own), Some(parent)) if own != parent.srid => {
            return Err(GeoWireError::binary(
                format!(
                    "sub-geometry SRID {own} differs from parent SRID {}",
                    parent.srid
                ),
                header.offset,
            ))
        }
        (Some(own), _) => own,
        (None, Some(parent)) => parent.srid,
        (None, None) => UNKNOWN_SRID,
    };

    if let Some(parent) = parent {
        if parent.dimension != dimension || parent.has_measure != header.has_m {
            return Err(GeoWireError::binary(
                "sub-geometry dimensionality differs from parent",
                header.offset,
            ));
        }
    }

    Ok(Layout {
        dimension,
        has_measure: header.has_m,
        srid,
    })
}

/// A bare point body: `x y [z] [m]`.
fn parse_point<G: ByteGetter>(data: &mut ValueGetter<G>, layout: Layout) -> Result<Point> {
    let x = data.read_f64()?;
    let y = data.read_f64()?;
    let z = if layout.dimension.has_z() {
        data.read_f64()?
    } else {
        0.0
    };
    let m = if layout.has_measure {
        data.read_f64()?
    } else {
        0.0
    };
    let mut point = Point::from_ordinates(layout.dimension, layout.has_measure, x, y, z, m);
    point.set_srid(layout.srid);
    Ok(point)
}

/// Reads a `u32` element count, capping the preallocation by what the input
/// can still hold.
fn read_count<G: ByteGetter>(data: &mut ValueGetter<G>) -> Result<(usize, usize)> {
    let count = data.read_u32()? as usize;
    Ok((count, count.min(data.remaining())))
}

fn parse_point_array<G: ByteGetter>(
    data: &mut ValueGetter<G>,
    layout: Layout,
) -> Result<Vec<Point>> {
    let (count, capacity) = read_count(data)?;
    let mut points = Vec::with_capacity(capacity);
    for _ in 0..count {
        points.push(parse_point(data, layout)?);
    }
    Ok(points)
}

fn parse_polygon<G: ByteGetter>(data: &mut ValueGetter<G>, layout: Layout) -> Result<Polygon> {
    let (count, capacity) = read_count(data)?;
    let mut rings = Vec::with_capacity(capacity);
    for _ in 0..count {
        let points = parse_point_array(data, layout)?;
        rings.push(LinearRing::from_parts(
            points,
            layout.dimension,
            layout.has_measure,
            layout.srid,
        ));
    }
    Ok(Polygon::from_parts(
        rings,
        layout.dimension,
        layout.has_measure,
        layout.srid,
    ))
}

/// Reads `count` complete sub-geometries, narrowing each with `narrow`,
/// which hands back geometries of the wrong kind.
fn parse_children<G, C, F>(
    data: &mut ValueGetter<G>,
    layout: Layout,
    depth: usize,
    narrow: F,
) -> Result<Vec<C>>
where
    G: ByteGetter,
    F: Fn(Geometry) -> std::result::Result<C, Geometry>,
{
    let (count, capacity) = read_count(data)?;
    let mut children = Vec::with_capacity(capacity);
    for _ in 0..count {
        let offset = data.position();
        let child = parse_geometry(data, Some(layout), depth + 1)?;
        let child = narrow(child).map_err(|wrong| {
            GeoWireError::binary(
                format!("unexpected {} sub-geometry", wrong.type_name()),
                offset,
            )
        })?;
        children.push(child);
    }
    Ok(children)
}
