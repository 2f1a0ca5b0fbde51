#![doc = include_str!("../../README.md")]
//! Crate-specific API surface for `geowire-core`.

pub mod boxes;
pub mod builder;
pub mod consistency;
pub mod error;
pub mod ewkb;
pub mod geometry;
pub mod interop;
pub mod wkt;

pub use boxes::{Box2d, Box3d};
pub use builder::{from_binary, from_text, Encoding};
pub use error::{GeoWireError, Result};
pub use ewkb::ByteOrder;
pub use geometry::{
    Dimension, Geometry, GeometryCollection, GeometryType, LineString, LinearRing,
    MultiLineString, MultiPoint, MultiPolygon, Point, Polygon, Shape,
};
