use super::{LineString, Point, Polygon};

composite_geometry!(MultiPoint, points: Point);

composite_geometry!(MultiLineString, lines: LineString);

composite_geometry!(MultiPolygon, polygons: Polygon);
