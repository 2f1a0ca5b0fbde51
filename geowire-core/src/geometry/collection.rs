use super::Geometry;

composite_geometry!(
    /// Heterogeneous list of geometries sharing one layout.
    GeometryCollection,
    geometries: Geometry
);
