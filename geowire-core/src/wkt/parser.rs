use super::tokenizer::{is_empty_marker, split_srid, split_top_level, strip_parens};
use crate::consistency;
use crate::error::{GeoWireError, Result};
use crate::geometry::{
    Dimension, Geometry, GeometryCollection, GeometryType, LineString, LinearRing, MultiLineString,
    MultiPoint, MultiPolygon, Point, Polygon, Shape, MAX_NESTING_DEPTH, UNKNOWN_SRID,
};

/// Parse WKT or EWKT text.
///
/// An optional `SRID=<int>;` prefix sets the SRID of the whole tree. Both
/// `<TYPE> EMPTY` and the legacy `<TYPE>(EMPTY)` denote empty composites;
/// an empty point has no representation and is rejected.
///
/// # Example
///
/// ```
/// use geowire_core::wkt::parse_wkt;
/// use geowire_core::geometry::Shape;
///
/// let geom = parse_wkt("SRID=4326;MULTIPOINT(1 2,3 4)").unwrap();
/// assert_eq!(geom.srid(), 4326);
/// assert_eq!(geom.num_points(), 2);
/// ```
pub fn parse_wkt(text: &str) -> Result<Geometry> {
    let (srid, body) = split_srid(text)?;
    let mut geom = parse_tagged(body, Context::ROOT)?;
    if let Some(srid) = srid {
        geom.set_srid(srid);
    }
    if !consistency::check(&geom) {
        return Err(GeoWireError::text("inconsistent geometry", text));
    }
    Ok(geom)
}

/// Detects the kind from the leading keyword.
pub(crate) fn detect_type(text: &str) -> Option<GeometryType> {
    let text = text.trim_start();
    GeometryType::KEYWORD_ORDER
        .into_iter()
        .find(|kind| text.starts_with(kind.keyword()))
}

/// Measure flag inherited from the enclosing keyword, plus how many
/// composites enclose the node.
#[derive(Debug, Clone, Copy)]
struct Context {
    have_m: bool,
    depth: usize,
}

impl Context {
    const ROOT: Context = Context {
        have_m: false,
        depth: 0,
    };
}

/// A geometry whose keyword is mandatory.
fn parse_tagged(text: &str, ctx: Context) -> Result<Geometry> {
    let kind = detect_type(text)
        .ok_or_else(|| GeoWireError::text("unknown geometry type", excerpt(text)))?;
    Ok(match kind {
        GeometryType::Point => Geometry::Point(parse_point(text, ctx)?),
        GeometryType::LineString => Geometry::LineString(parse_line(text, ctx)?),
        GeometryType::Polygon => Geometry::Polygon(parse_polygon(text, ctx)?),
        GeometryType::MultiPoint => Geometry::MultiPoint(parse_multi_point(text, ctx)?),
        GeometryType::MultiLineString => Geometry::MultiLineString(parse_multi_line(text, ctx)?),
        GeometryType::MultiPolygon => Geometry::MultiPolygon(parse_multi_polygon(text, ctx)?),
        GeometryType::GeometryCollection => {
            Geometry::GeometryCollection(parse_collection(text, ctx)?)
        }
        GeometryType::LinearRing => {
            return Err(GeoWireError::text(
                "linear ring cannot stand alone",
                excerpt(text),
            ))
        }
    })
}

/// At most the first 40 characters of `text`, for error fragments.
fn excerpt(text: &str) -> &str {
    let text = text.trim();
    text.char_indices().nth(40).map_or(text, |(end, _)| &text[..end])
}

/// Strips an optional keyword and the `M` suffix that may follow it.
/// Returns the remaining body and the effective measure flag.
fn strip_keyword(text: &str, kind: GeometryType, have_m: bool) -> (&str, bool) {
    let text = text.trim();
    let text = text.strip_prefix(kind.keyword()).unwrap_or(text).trim_start();
    match text.strip_prefix('M') {
        Some(rest) => (rest.trim_start(), true),
        None => (text, have_m),
    }
}

/// A bare position `x y [z]`: no keyword, no `M`, no parentheses.
pub(crate) fn parse_position(text: &str) -> Result<Point> {
    point_from_ordinates(text, false)
}

fn parse_ordinate(token: &str) -> Result<f64> {
    token
        .parse::<f64>()
        .map_err(|_| GeoWireError::text("invalid ordinate", token))
}

/// `x y`, `x y z`, `x y m` (measured context) or `x y z m`, with or without
/// the `POINT` keyword and enclosing parentheses.
fn parse_point(text: &str, ctx: Context) -> Result<Point> {
    let (body, have_m) = strip_keyword(text, GeometryType::Point, ctx.have_m);
    if is_empty_marker(body) {
        return Err(GeoWireError::text("empty point is not representable", excerpt(text)));
    }
    let body = if body.starts_with('(') {
        strip_parens(body)?
    } else {
        body
    };
    point_from_ordinates(body, have_m)
}

fn point_from_ordinates(body: &str, have_m: bool) -> Result<Point> {
    let ordinates = body
        .split_whitespace()
        .map(parse_ordinate)
        .collect::<Result<Vec<_>>>()?;

    match (ordinates.as_slice(), have_m) {
        (&[x, y], false) => Ok(Point::new(x, y)),
        (&[x, y, z], false) => Ok(Point::new_z(x, y, z)),
        (&[x, y, m], true) => Ok(Point::new_m(x, y, m)),
        (&[x, y, z, m], _) => Ok(Point::new_zm(x, y, z, m)),
        (values, _) => Err(GeoWireError::text(
            format!("a point cannot have {} ordinates here", values.len()),
            body.trim(),
        )),
    }
}

/// A parsed child whose layout may be unknown because it holds no points.
trait Child: Shape {
    fn has_points(&self) -> bool;
    fn set_layout(&mut self, dimension: Dimension, has_measure: bool);
}

impl Child for Point {
    fn has_points(&self) -> bool {
        true
    }

    fn set_layout(&mut self, dimension: Dimension, has_measure: bool) {
        Point::set_layout(self, dimension, has_measure)
    }
}

macro_rules! impl_child {
    ($($kind:ty => |$geom:ident| $has_points:expr),* $(,)?) => {
        $(
            impl Child for $kind {
                fn has_points(&self) -> bool {
                    let $geom = self;
                    $has_points
                }

                fn set_layout(&mut self, dimension: Dimension, has_measure: bool) {
                    <$kind>::set_layout(self, dimension, has_measure)
                }
            }
        )*
    };
}

impl_child!(
    LineString => |line| !line.is_empty(),
    LinearRing => |ring| !ring.is_empty(),
    Polygon => |poly| poly.points().next().is_some(),
    Geometry => |geom| geom.first_point().is_some(),
);

/// Children of a composite plus the layout they share.
struct Parts<C> {
    children: Vec<C>,
    dimension: Dimension,
    has_measure: bool,
}

/// Shared composite grammar: optional keyword, optional `M`, then either an
/// empty marker or a parenthesised list of children parsed by `parse_child`.
///
/// The layout comes from the children that hold points; point-free children
/// such as `LINESTRING EMPTY` take it over.
fn parse_parts<C: Child>(
    text: &str,
    kind: GeometryType,
    ctx: Context,
    parse_child: fn(&str, Context) -> Result<C>,
) -> Result<Parts<C>> {
    let (body, have_m) = strip_keyword(text, kind, ctx.have_m);
    if is_empty_marker(body) {
        return Ok(Parts {
            children: Vec::new(),
            dimension: Dimension::Xy,
            has_measure: have_m,
        });
    }
    if ctx.depth >= MAX_NESTING_DEPTH {
        return Err(GeoWireError::text(
            format!("{kind} nests deeper than {MAX_NESTING_DEPTH} levels"),
            excerpt(text),
        ));
    }
    let inner = Context {
        have_m,
        depth: ctx.depth + 1,
    };
    let mut children = split_top_level(strip_parens(body)?)?
        .into_iter()
        .map(|child| parse_child(child, inner))
        .collect::<Result<Vec<_>>>()?;

    let (dimension, has_measure) = match children.iter().find(|child| child.has_points()) {
        Some(first) => (first.dimension(), first.has_measure()),
        None => (Dimension::Xy, have_m),
    };
    for child in &mut children {
        if !child.has_points() {
            child.set_layout(dimension, has_measure);
        } else if child.dimension() != dimension || child.has_measure() != has_measure {
            return Err(GeoWireError::text(
                format!("{kind} mixes coordinate dimensions"),
                excerpt(text),
            ));
        }
    }
    Ok(Parts {
        children,
        dimension,
        has_measure,
    })
}

macro_rules! composite_parser {
    ($fn_name:ident, $kind:ident, $child_parser:path) => {
        fn $fn_name(text: &str, ctx: Context) -> Result<$kind> {
            let parts = parse_parts(text, GeometryType::$kind, ctx, $child_parser)?;
            Ok($kind::from_parts(
                parts.children,
                parts.dimension,
                parts.has_measure,
                UNKNOWN_SRID,
            ))
        }
    };
}

composite_parser!(parse_line, LineString, parse_point);
composite_parser!(parse_ring, LinearRing, parse_point);
composite_parser!(parse_polygon, Polygon, parse_ring);
composite_parser!(parse_multi_point, MultiPoint, parse_point);
composite_parser!(parse_multi_line, MultiLineString, parse_line);
composite_parser!(parse_multi_polygon, MultiPolygon, parse_polygon);
composite_parser!(parse_collection, GeometryCollection, parse_tagged);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wkt::write_wkt;
    use assert_matches::assert_matches;

    #[test]
    fn point_ordinate_counts() {
        assert_eq!(
            parse_wkt("POINT(10 10)").unwrap(),
            Point::new(10.0, 10.0).into()
        );
        assert_eq!(
            parse_wkt("POINT(10 10 20)").unwrap(),
            Point::new_z(10.0, 10.0, 20.0).into()
        );
        assert_eq!(
            parse_wkt("POINTM(10 10 20)").unwrap(),
            Point::new_m(10.0, 10.0, 20.0).into()
        );
        assert_eq!(
            parse_wkt("POINT(10 10 20 30)").unwrap(),
            Point::new_zm(10.0, 10.0, 20.0, 30.0).into()
        );
        assert_eq!(
            parse_wkt("POINTM(10 10 20 30)").unwrap(),
            Point::new_zm(10.0, 10.0, 20.0, 30.0).into()
        );
    }

    #[test]
    fn point_rejects_bad_ordinates() {
        assert!(parse_wkt("POINT(10)").unwrap_err().is_text());
        assert!(parse_wkt("POINTM(10 10)").unwrap_err().is_text());
        assert!(parse_wkt("POINT(1 2 3 4 5)").unwrap_err().is_text());
        assert_matches!(
            parse_wkt("POINT(1 x)"),
            Err(GeoWireError::MalformedText { fragment, .. }) if fragment == "x"
        );
        assert!(parse_wkt("POINT EMPTY").unwrap_err().is_text());
    }

    #[test]
    fn srid_prefix_applies_to_all_nodes() {
        let geom = parse_wkt("SRID=4326;MULTILINESTRING((1 1,2 2),(3 3,4 4))").unwrap();
        assert_eq!(geom.srid(), 4326);
        assert!(geom.points().all(|p| p.srid() == 4326));
    }

    #[test]
    fn multipoint_accepts_both_spellings() {
        let bare = parse_wkt("MULTIPOINT(11 12, 20 20)").unwrap();
        let wrapped = parse_wkt("MULTIPOINT((11 12),(20 20))").unwrap();
        assert_eq!(bare, wrapped);
        assert_eq!(bare.num_points(), 2);
    }

    #[test]
    fn measure_suffix_reaches_children() {
        let geom = parse_wkt("MULTIPOINTM(1 2 3,4 5 6)").unwrap();
        assert!(geom.has_measure());
        assert!(!geom.has_z());
        assert_eq!(geom.point(1).and_then(Point::opt_m), Some(6.0));

        let geom = parse_wkt("GEOMETRYCOLLECTIONM(POINT(1 2 3),LINESTRING(0 0 1,1 1 2))").unwrap();
        assert!(geom.points().all(|p| p.has_measure() && !p.has_z()));
    }

    #[test]
    fn empty_forms() {
        for text in ["LINESTRING EMPTY", "LINESTRING(EMPTY)", "LINESTRING ( EMPTY )"] {
            let geom = parse_wkt(text).unwrap();
            assert_eq!(geom.geometry_type(), GeometryType::LineString);
            assert!(geom.is_empty());
        }
        let geom = parse_wkt("MULTIPOLYGONM EMPTY").unwrap();
        assert!(geom.is_empty() && geom.has_measure());

        let geom = parse_wkt("GEOMETRYCOLLECTION(POINT(1 2),LINESTRING EMPTY)").unwrap();
        let Geometry::GeometryCollection(gc) = geom else {
            panic!("expected collection");
        };
        assert!(gc.get(1).is_some_and(Geometry::is_empty));
    }

    #[test]
    fn collection_children_need_keywords() {
        assert_matches!(
            parse_wkt("GEOMETRYCOLLECTION((1 2))"),
            Err(GeoWireError::MalformedText { message, .. }) if message == "unknown geometry type"
        );
        // typed children may carry a redundant keyword
        assert_eq!(
            parse_wkt("MULTILINESTRING(LINESTRING(0 0,1 1))").unwrap(),
            parse_wkt("MULTILINESTRING((0 0,1 1))").unwrap()
        );
    }

    #[test]
    fn rejects_mixed_dimensions() {
        assert!(parse_wkt("LINESTRING(0 0,1 1 1)").unwrap_err().is_text());
        assert!(parse_wkt("GEOMETRYCOLLECTION(POINT(1 2),POINT(1 2 3))")
            .unwrap_err()
            .is_text());
    }

    #[test]
    fn rejects_unbalanced_or_unknown() {
        assert!(parse_wkt("POLYGON((0 0,1 0,1 1,0 0)").is_err());
        assert!(parse_wkt("POLYGON((0 0,1 0,1 1,0 0)))").is_err());
        assert!(parse_wkt("TRIANGLE((0 0,1 0,1 1,0 0))").is_err());
        assert!(parse_wkt("").is_err());
        assert!(parse_wkt("LINESTRING()").is_err());
    }

    #[test]
    fn point_free_children_take_the_parent_layout() {
        let collection = Geometry::from(GeometryCollection::new(vec![
            Point::new_z(1.0, 2.0, 3.0).into(),
            LineString::empty_with(Dimension::Xyz, false).into(),
        ]));
        assert!(collection.is_consistent());
        let written = write_wkt(&collection);
        assert_eq!(written, "GEOMETRYCOLLECTION(POINT(1 2 3),LINESTRING EMPTY)");
        assert_eq!(parse_wkt(&written).unwrap(), collection);

        let shell = LinearRing::new(vec![
            Point::new_z(0.0, 0.0, 0.0),
            Point::new_z(1.0, 0.0, 0.0),
            Point::new_z(1.0, 1.0, 0.0),
            Point::new_z(0.0, 0.0, 0.0),
        ]);
        let polygons = Geometry::from(MultiPolygon::new(vec![
            Polygon::new(vec![shell]),
            Polygon::empty_with(Dimension::Xyz, false),
        ]));
        let written = write_wkt(&polygons);
        assert_eq!(written, "MULTIPOLYGON(((0 0 0,1 0 0,1 1 0,0 0 0)),EMPTY)");
        assert_eq!(parse_wkt(&written).unwrap(), polygons);

        let text = "GEOMETRYCOLLECTION(POINT(1 2 3),GEOMETRYCOLLECTION(LINESTRING EMPTY))";
        let nested = parse_wkt(text).unwrap();
        assert!(nested.is_consistent());
        let Geometry::GeometryCollection(outer) = &nested else {
            panic!("expected collection");
        };
        assert_eq!(outer.get(1).map(Shape::dimension), Some(Dimension::Xyz));
    }

    fn nested_collections(levels: usize) -> String {
        format!(
            "{}POINT(1 2){}",
            "GEOMETRYCOLLECTION(".repeat(levels),
            ")".repeat(levels)
        )
    }

    #[test]
    fn nesting_depth_is_bounded() {
        let geom = parse_wkt(&nested_collections(MAX_NESTING_DEPTH)).unwrap();
        assert_eq!(geom.first_point(), Some(&Point::new(1.0, 2.0)));

        assert_matches!(
            parse_wkt(&nested_collections(MAX_NESTING_DEPTH + 1)),
            Err(GeoWireError::MalformedText { message, .. }) if message.contains("nests deeper")
        );
        assert!(parse_wkt(&nested_collections(20_000)).unwrap_err().is_text());
    }

    #[test]
    fn keyword_detection_prefers_multi_kinds() {
        assert_eq!(detect_type("MULTIPOINT(1 2)"), Some(GeometryType::MultiPoint));
        assert_eq!(detect_type("  POINTM(1 2 3)"), Some(GeometryType::Point));
        assert_eq!(detect_type("CIRCLE(1 2)"), None);
    }
}
