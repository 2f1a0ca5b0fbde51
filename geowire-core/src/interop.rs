//! Bridges to the georust ecosystem.
//!
//! [`Geometry::to_geo`] and `TryFrom<&geo::Geometry<f64>>` convert to and
//! from `geo` types (XY only). The [`GeozeroGeometry`] impl streams a
//! geometry, Z and M included, through any geozero processor, which gives
//! GeoJSON, WKT and `geo` output for free.

use geo::{Coord, LineString as GeoLineString, Polygon as GeoPolygon};
use geozero::{CoordDimensions, GeomProcessor, GeozeroGeometry, ToJson};

use crate::error::{GeoWireError, Result};
use crate::geometry::{
    Geometry, GeometryCollection, LineString, LinearRing, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon, Shape, UNKNOWN_SRID,
};

// ── geo conversions ──────────────────────────────────────────────────────────

fn coord(point: &Point) -> Coord<f64> {
    Coord {
        x: point.x(),
        y: point.y(),
    }
}

fn geo_line(points: &[Point]) -> GeoLineString<f64> {
    GeoLineString(points.iter().map(coord).collect())
}

fn geo_polygon(polygon: &Polygon) -> GeoPolygon<f64> {
    let shell = polygon
        .shell()
        .map(|ring| geo_line(ring.points()))
        .unwrap_or_else(|| GeoLineString(Vec::new()));
    let holes = polygon
        .holes()
        .iter()
        .map(|ring| geo_line(ring.points()))
        .collect();
    GeoPolygon::new(shell, holes)
}

impl Geometry {
    /// Converts to a `geo` geometry, dropping Z, M and the SRID.
    ///
    /// # Example
    ///
    /// ```
    /// use geowire_core::geometry::{Geometry, Point};
    ///
    /// let geom = Geometry::from(Point::new_z(1.0, 2.0, 3.0));
    /// assert_eq!(geom.to_geo(), geo::Geometry::Point(geo::Point::new(1.0, 2.0)));
    /// ```
    pub fn to_geo(&self) -> geo::Geometry<f64> {
        match self {
            Geometry::Point(p) => geo::Geometry::Point(geo::Point(coord(p))),
            Geometry::LineString(line) => geo::Geometry::LineString(geo_line(line.points())),
            Geometry::Polygon(polygon) => geo::Geometry::Polygon(geo_polygon(polygon)),
            Geometry::MultiPoint(multi) => geo::Geometry::MultiPoint(geo::MultiPoint(
                multi.iter().map(|p| geo::Point(coord(p))).collect(),
            )),
            Geometry::MultiLineString(multi) => geo::Geometry::MultiLineString(
                geo::MultiLineString(multi.iter().map(|line| geo_line(line.points())).collect()),
            ),
            Geometry::MultiPolygon(multi) => geo::Geometry::MultiPolygon(geo::MultiPolygon(
                multi.iter().map(geo_polygon).collect(),
            )),
            Geometry::GeometryCollection(collection) => {
                geo::Geometry::GeometryCollection(geo::GeometryCollection(
                    collection.iter().map(Geometry::to_geo).collect(),
                ))
            }
        }
    }

    /// GeoJSON text of this geometry.
    pub fn to_geojson(&self) -> Result<String> {
        ToJson::to_json(self).map_err(|e| GeoWireError::Conversion(e.to_string()))
    }
}

fn from_coords(line: &GeoLineString<f64>) -> Vec<Point> {
    line.0.iter().map(|c| Point::new(c.x, c.y)).collect()
}

fn from_geo_polygon(polygon: &GeoPolygon<f64>) -> Result<Polygon> {
    if polygon.exterior().0.is_empty() {
        if !polygon.interiors().is_empty() {
            return Err(GeoWireError::Conversion(
                "polygon has holes but no exterior ring".into(),
            ));
        }
        return Ok(Polygon::empty());
    }
    let rings = std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| LinearRing::new(from_coords(ring)))
        .collect();
    Ok(Polygon::new(rings))
}

impl TryFrom<&geo::Geometry<f64>> for Geometry {
    type Error = GeoWireError;

    /// Builds a 2D geometry. `Line` becomes a two-point line string; `Rect`
    /// and `Triangle` become polygons.
    fn try_from(value: &geo::Geometry<f64>) -> Result<Self> {
        Ok(match value {
            geo::Geometry::Point(p) => Point::new(p.x(), p.y()).into(),
            geo::Geometry::Line(line) => LineString::new(vec![
                Point::new(line.start.x, line.start.y),
                Point::new(line.end.x, line.end.y),
            ])
            .into(),
            geo::Geometry::LineString(line) => LineString::new(from_coords(line)).into(),
            geo::Geometry::Polygon(polygon) => from_geo_polygon(polygon)?.into(),
            geo::Geometry::MultiPoint(multi) => {
                MultiPoint::new(multi.iter().map(|p| Point::new(p.x(), p.y())).collect()).into()
            }
            geo::Geometry::MultiLineString(multi) => {
                let lines = multi.iter().map(|l| LineString::new(from_coords(l)));
                MultiLineString::new(lines.collect()).into()
            }
            geo::Geometry::MultiPolygon(multi) => MultiPolygon::new(
                multi
                    .iter()
                    .map(from_geo_polygon)
                    .collect::<Result<Vec<_>>>()?,
            )
            .into(),
            geo::Geometry::GeometryCollection(collection) => GeometryCollection::new(
                collection
                    .iter()
                    .map(Geometry::try_from)
                    .collect::<Result<Vec<_>>>()?,
            )
            .into(),
            geo::Geometry::Rect(rect) => from_geo_polygon(&rect.to_polygon())?.into(),
            geo::Geometry::Triangle(triangle) => from_geo_polygon(&triangle.to_polygon())?.into(),
        })
    }
}

// ── geozero processing ───────────────────────────────────────────────────────

fn process_coord<P: GeomProcessor>(
    point: &Point,
    idx: usize,
    processor: &mut P,
) -> geozero::error::Result<()> {
    match (point.opt_z(), point.opt_m()) {
        (None, None) => processor.xy(point.x(), point.y(), idx),
        (z, m) => processor.coordinate(point.x(), point.y(), z, m, None, None, idx),
    }
}

fn process_line<P: GeomProcessor>(
    points: &[Point],
    tagged: bool,
    idx: usize,
    processor: &mut P,
) -> geozero::error::Result<()> {
    processor.linestring_begin(tagged, points.len(), idx)?;
    for (i, point) in points.iter().enumerate() {
        process_coord(point, i, processor)?;
    }
    processor.linestring_end(tagged, idx)
}

fn process_polygon<P: GeomProcessor>(
    polygon: &Polygon,
    tagged: bool,
    idx: usize,
    processor: &mut P,
) -> geozero::error::Result<()> {
    processor.polygon_begin(tagged, polygon.len(), idx)?;
    for (i, ring) in polygon.iter().enumerate() {
        process_line(ring.points(), false, i, processor)?;
    }
    processor.polygon_end(tagged, idx)
}

fn process_geometry<P: GeomProcessor>(
    geom: &Geometry,
    idx: usize,
    processor: &mut P,
) -> geozero::error::Result<()> {
    match geom {
        Geometry::Point(p) => {
            processor.point_begin(idx)?;
            process_coord(p, 0, processor)?;
            processor.point_end(idx)
        }
        Geometry::LineString(line) => process_line(line.points(), true, idx, processor),
        Geometry::Polygon(polygon) => process_polygon(polygon, true, idx, processor),
        // multipoint members are bare coordinates, without point_begin/point_end
        Geometry::MultiPoint(multi) => {
            processor.multipoint_begin(multi.len(), idx)?;
            for (i, point) in multi.iter().enumerate() {
                process_coord(point, i, processor)?;
            }
            processor.multipoint_end(idx)
        }
        Geometry::MultiLineString(multi) => {
            processor.multilinestring_begin(multi.len(), idx)?;
            for (i, line) in multi.iter().enumerate() {
                process_line(line.points(), false, i, processor)?;
            }
            processor.multilinestring_end(idx)
        }
        Geometry::MultiPolygon(multi) => {
            processor.multipolygon_begin(multi.len(), idx)?;
            for (i, polygon) in multi.iter().enumerate() {
                process_polygon(polygon, false, i, processor)?;
            }
            processor.multipolygon_end(idx)
        }
        Geometry::GeometryCollection(collection) => {
            processor.geometrycollection_begin(collection.len(), idx)?;
            for (i, child) in collection.iter().enumerate() {
                process_geometry(child, i, processor)?;
            }
            processor.geometrycollection_end(idx)
        }
    }
}

impl GeozeroGeometry for Geometry {
    fn process_geom<P: GeomProcessor>(&self, processor: &mut P) -> geozero::error::Result<()>
    where
        Self: Sized,
    {
        process_geometry(self, 0, processor)
    }

    fn dims(&self) -> CoordDimensions {
        CoordDimensions {
            z: self.has_z(),
            m: self.has_measure(),
            t: false,
            tm: false,
        }
    }

    fn srid(&self) -> Option<i32> {
        (Shape::srid(self) != UNKNOWN_SRID).then(|| Shape::srid(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ewkb::{write_binary, ByteOrder};
    use crate::wkt::parse_wkt;
    use assert_matches::assert_matches;
    use geozero::ToGeo;

    fn sample(text: &str) -> Geometry {
        parse_wkt(text).unwrap()
    }

    #[test]
    fn geo_roundtrip_for_2d_data() {
        for text in [
            "POINT(1.5 2.5)",
            "LINESTRING(0 0,1 1,2 0)",
            "POLYGON((0 0,10 0,10 10,0 0),(1 1,2 1,2 2,1 1))",
            "MULTIPOINT(1 2,3 4)",
            "MULTIPOLYGON(((0 0,1 0,1 1,0 0)),((5 5,6 5,6 6,5 5)))",
            "GEOMETRYCOLLECTION(POINT(1 2),LINESTRING(0 0,1 1))",
        ] {
            let geom = sample(text);
            assert_eq!(Geometry::try_from(&geom.to_geo()).unwrap(), geom, "{text}");
        }
    }

    #[test]
    fn geo_special_kinds_become_polygons_and_lines() {
        let rect = geo::Geometry::Rect(geo::Rect::new(
            geo::coord! { x: 0.0, y: 0.0 },
            geo::coord! { x: 2.0, y: 1.0 },
        ));
        let converted = Geometry::try_from(&rect).unwrap();
        assert_eq!(converted.type_name(), "POLYGON");
        assert_eq!(converted.num_points(), 5);

        let line = geo::Geometry::Line(geo::Line::new(
            geo::coord! { x: 0.0, y: 0.0 },
            geo::coord! { x: 1.0, y: 1.0 },
        ));
        assert_eq!(Geometry::try_from(&line).unwrap(), sample("LINESTRING(0 0,1 1)"));
    }

    #[test]
    fn geo_polygon_without_exterior_is_rejected() {
        let polygon = geo::Geometry::Polygon(geo::Polygon::new(
            geo::LineString(Vec::new()),
            vec![geo::LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)])],
        ));
        assert_matches!(Geometry::try_from(&polygon), Err(GeoWireError::Conversion(_)));
    }

    #[test]
    fn agrees_with_geozero_ewkb_reader() {
        for text in [
            "SRID=4326;POINT(1 2 3)",
            "LINESTRING(0 0,1 1,2 0)",
            "SRID=31467;MULTILINESTRING((0 0,1 1),(2 2,3 3))",
            "POLYGON((0 0,10 0,10 10,0 0))",
        ] {
            let geom = sample(text);
            let blob = write_binary(&geom, ByteOrder::Ndr);
            let theirs = geozero::wkb::Ewkb(blob.as_slice()).to_geo().unwrap();
            assert_eq!(theirs, geom.to_geo(), "{text}");
        }
    }

    #[test]
    fn processor_output_matches_direct_conversion() {
        let geom =
            sample("GEOMETRYCOLLECTION(POINT(1 2),MULTIPOINT(3 4,5 6),POLYGON((0 0,1 0,1 1,0 0)))");
        assert_eq!(ToGeo::to_geo(&geom).unwrap(), geom.to_geo());
    }

    #[test]
    fn reports_dims_and_srid() {
        let geom = sample("SRID=4326;LINESTRINGM(0 0 1,1 1 2)");
        let dims = GeozeroGeometry::dims(&geom);
        assert!(!dims.z && dims.m);
        assert_eq!(GeozeroGeometry::srid(&geom), Some(4326));
        assert_eq!(GeozeroGeometry::srid(&sample("POINT(1 2)")), None);
    }

    #[test]
    fn geojson_output() {
        let json = sample("POINT(1.5 2.5)").to_geojson().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "Point");
        assert_eq!(value["coordinates"][0].as_f64(), Some(1.5));
        assert_eq!(value["coordinates"][1].as_f64(), Some(2.5));
    }
}
