use super::bytes::{ByteSetter, HexSink};
use super::value::ValueSetter;
use super::{ByteOrder, EWKB_M_FLAG, EWKB_SRID_FLAG, EWKB_Z_FLAG};
use crate::geometry::{Geometry, GeometryType, Point, Polygon, Shape, UNKNOWN_SRID};

/// Serialise a geometry to EWKB bytes in the given byte order.
///
/// The output is only well-formed for geometries that pass
/// [`crate::consistency::check`].
///
/// # Example
///
/// ```
/// use geowire_core::ewkb::{write_binary, ByteOrder};
/// use geowire_core::geometry::{Geometry, Point};
///
/// let blob = write_binary(&Geometry::from(Point::new(1.0, 2.0)), ByteOrder::Ndr);
/// // byte order(1) + type(4) + x(8) + y(8)
/// assert_eq!(blob.len(), 21);
/// assert_eq!(blob[0], 0x01);
/// ```
pub fn write_binary(geom: &Geometry, order: ByteOrder) -> Vec<u8> {
    let mut dest = ValueSetter::new(Vec::with_capacity(estimate_bytes(geom)), order);
    write_geometry(geom, &mut dest);
    dest.into_inner()
}

/// Serialise a geometry to uppercase hex EWKB text.
///
/// # Example
///
/// ```
/// use geowire_core::ewkb::{write_hex, ByteOrder};
/// use geowire_core::geometry::{Geometry, Point};
///
/// let hex = write_hex(&Geometry::from(Point::new(1.0, 2.0)), ByteOrder::Ndr);
/// assert_eq!(hex, "0101000000000000000000F03F0000000000000040");
/// ```
pub fn write_hex(geom: &Geometry, order: ByteOrder) -> String {
    let mut dest = ValueSetter::new(HexSink::with_capacity(estimate_bytes(geom)), order);
    write_geometry(geom, &mut dest);
    dest.into_inner().into_string()
}

/// Writes one complete node: marker, type word, optional SRID and body.
pub fn write_geometry<S: ByteSetter>(geom: &Geometry, dest: &mut ValueSetter<S>) {
    write_header(geom.geometry_type(), geom, dest);

    match geom {
        Geometry::Point(p) => write_point(p, dest),
        Geometry::LineString(line) => write_point_array(line.points(), dest),
        Geometry::Polygon(polygon) => write_polygon(polygon, dest),
        Geometry::MultiPoint(multi) => {
            write_count(multi.len(), dest);
            for point in multi {
                write_header(GeometryType::Point, point, dest);
                write_point(point, dest);
            }
        }
        Geometry::MultiLineString(multi) => {
            write_count(multi.len(), dest);
            for line in multi {
                write_header(GeometryType::LineString, line, dest);
                write_point_array(line.points(), dest);
            }
        }
        Geometry::MultiPolygon(multi) => {
            write_count(multi.len(), dest);
            for polygon in multi {
                write_header(GeometryType::Polygon, polygon, dest);
                write_polygon(polygon, dest);
            }
        }
        Geometry::GeometryCollection(collection) => {
            write_count(collection.len(), dest);
            for child in collection {
                write_geometry(child, dest);
            }
        }
    }
}

fn write_header<S: ByteSetter>(kind: GeometryType, node: &impl Shape, dest: &mut ValueSetter<S>) {
    dest.write_u8(dest.order().marker());
    dest.write_u32(type_word(kind, node));
    if node.srid() != UNKNOWN_SRID {
        dest.write_i32(node.srid());
    }
}

fn type_word(kind: GeometryType, node: &impl Shape) -> u32 {
    let mut word = kind.code();
    if node.has_z() {
        word |= EWKB_Z_FLAG;
    }
    if node.has_measure() {
        word |= EWKB_M_FLAG;
    }
    if node.srid() != UNKNOWN_SRID {
        word |= EWKB_SRID_FLAG;
    }
    word
}

fn write_count<S: ByteSetter>(count: usize, dest: &mut ValueSetter<S>) {
    debug_assert!(u32::try_from(count).is_ok(), "element count exceeds u32");
    dest.write_u32(count as u32);
}

/// A bare point body: `x y [z] [m]`, measure always last.
fn write_point<S: ByteSetter>(point: &Point, dest: &mut ValueSetter<S>) {
    dest.write_f64(point.x());
    dest.write_f64(point.y());
    if let Some(z) = point.opt_z() {
        dest.write_f64(z);
    }
    if let Some(m) = point.opt_m() {
        dest.write_f64(m);
    }
}

fn write_point_array<S: ByteSetter>(points: &[Point], dest: &mut ValueSetter<S>) {
    write_count(points.len(), dest);
    for point in points {
        write_point(point, dest);
    }
}

fn write_polygon<S: ByteSetter>(polygon: &Polygon, dest: &mut ValueSetter<S>) {
    write_count(polygon.len(), dest);
    for ring in polygon {
        write_point_array(ring.points(), dest);
    }
}

/// Exact size in bytes of the EWKB encoding of `geom`.
pub fn estimate_bytes(geom: &Geometry) -> usize {
    let body = match geom {
        Geometry::Point(p) => point_size(p),
        Geometry::LineString(line) => point_array_size(line.points()),
        Geometry::Polygon(polygon) => polygon_size(polygon),
        Geometry::MultiPoint(multi) => {
            4 + multi
                .iter()
                .map(|p| node_header_size(p) + point_size(p))
                .sum::<usize>()
        }
        Geometry::MultiLineString(multi) => {
            4 + multi
                .iter()
                .map(|line| node_header_size(line) + point_array_size(line.points()))
                .sum::<usize>()
        }
        Geometry::MultiPolygon(multi) => {
            4 + multi
                .iter()
                .map(|polygon| node_header_size(polygon) + polygon_size(polygon))
                .sum::<usize>()
        }
        Geometry::GeometryCollection(collection) => {
            4 + collection.iter().map(estimate_bytes).sum::<usize>()
        }
    };
    node_header_size(geom) + body
}

/// Marker, type word and optional SRID.
fn node_header_size(node: &impl Shape) -> usize {
    1 + 4 + if node.srid() != UNKNOWN_SRID { 4 } else { 0 }
}

fn point_size(point: &Point) -> usize {
    let mut size = 16;
    if point.has_z() {
        size += 8;
    }
    if point.has_measure() {
        size += 8;
    }
    size
}

fn point_array_size(points: &[Point]) -> usize {
    4 + points.iter().map(point_size).sum::<usize>()
}

fn polygon_size(polygon: &Polygon) -> usize {
    4 + polygon
        .iter()
        .map(|ring| point_array_size(ring.points()))
        .sum::<usize>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ewkb::bytes::hex_encode;
    use crate::geometry::{
        GeometryCollection, LineString, LinearRing, MultiLineString, MultiPoint, MultiPolygon,
    };

    fn line_3d() -> LineString {
        LineString::new(vec![
            Point::new_z(10.0, 10.0, 20.0),
            Point::new_z(20.0, 20.0, 20.0),
            Point::new_z(50.0, 50.0, 50.0),
            Point::new_z(34.0, 34.0, 34.0),
        ])
    }

    fn polygon_m() -> Polygon {
        let ring = |o: f64| {
            LinearRing::new(vec![
                Point::new_m(o, o, 7.0),
                Point::new_m(o + 1.0, o, 7.0),
                Point::new_m(o + 1.0, o + 1.0, 7.0),
                Point::new_m(o, o, 7.0),
            ])
        };
        Polygon::new(vec![ring(0.0), ring(5.0)])
    }

    fn samples() -> Vec<Geometry> {
        vec![
            Point::new(1.0, 2.0).into(),
            Point::new_zm(1.0, 2.0, 3.0, 4.0).with_srid(4326).into(),
            line_3d().into(),
            polygon_m().with_srid(31467).into(),
            MultiPoint::new(vec![Point::new(1.0, 1.0), Point::new(2.0, 2.0)]).into(),
            MultiLineString::new(vec![line_3d(), line_3d()]).with_srid(4326).into(),
            MultiPolygon::new(vec![polygon_m(), polygon_m()]).into(),
            GeometryCollection::new(vec![
                Point::new_z(1.0, 1.0, 1.0).into(),
                line_3d().into(),
                MultiLineString::new(vec![line_3d()]).into(),
            ])
            .with_srid(4326)
            .into(),
            GeometryCollection::empty().into(),
        ]
    }

    #[test]
    fn estimate_matches_written_length() {
        for geom in samples() {
            let blob = write_binary(&geom, ByteOrder::Ndr);
            assert_eq!(estimate_bytes(&geom), blob.len(), "{geom:?}");
        }
    }

    #[test]
    fn hex_equals_encoded_binary() {
        for geom in samples() {
            for order in [ByteOrder::Xdr, ByteOrder::Ndr] {
                assert_eq!(
                    write_hex(&geom, order),
                    hex_encode(&write_binary(&geom, order))
                );
            }
        }
    }

    #[test]
    fn type_word_carries_flags() {
        let geom: Geometry = Point::new_zm(1.0, 2.0, 3.0, 4.0).with_srid(4326).into();
        let blob = write_binary(&geom, ByteOrder::Xdr);
        assert_eq!(blob[0], 0x00);
        assert_eq!(&blob[1..5], &(1 | EWKB_Z_FLAG | EWKB_M_FLAG | EWKB_SRID_FLAG).to_be_bytes());
        assert_eq!(&blob[5..9], &4326i32.to_be_bytes());
        assert_eq!(blob.len(), 9 + 32);
    }

    #[test]
    fn sub_geometries_repeat_their_srid() {
        let multi: Geometry = MultiPoint::new(vec![Point::new(1.0, 1.0)])
            .with_srid(4326)
            .into();
        let blob = write_binary(&multi, ByteOrder::Ndr);
        // header(9) + count(4) + child header with SRID(9) + xy(16)
        assert_eq!(blob.len(), 38);
        let child_word = u32::from_le_bytes([blob[14], blob[15], blob[16], blob[17]]);
        assert_eq!(child_word, 1 | EWKB_SRID_FLAG);
    }

    #[test]
    fn orders_differ_in_bytes() {
        let geom: Geometry = line_3d().into();
        assert_ne!(
            write_binary(&geom, ByteOrder::Ndr),
            write_binary(&geom, ByteOrder::Xdr)
        );
    }
}
