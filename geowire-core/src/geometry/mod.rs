//! In-memory geometry model.
//!
//! A [`Geometry`] is a closed set of seven kinds. Every kind carries its
//! coordinate dimension, a measure flag and an SRID; composites own typed
//! children that share those three attributes with their parent.

use std::fmt;
use std::str::FromStr;

use crate::error::{GeoWireError, Result};

/// SRID value meaning "no spatial reference set".
pub const UNKNOWN_SRID: i32 = 0;

/// Deepest nesting of composite nodes the parsers accept.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Negative SRIDs are historical spellings of "unknown".
pub(crate) fn normalize_srid(srid: i32) -> i32 {
    if srid < 0 {
        UNKNOWN_SRID
    } else {
        srid
    }
}

/// Whether a geometry carries a Z ordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dimension {
    #[default]
    Xy,
    Xyz,
}

impl Dimension {
    pub fn from_has_z(has_z: bool) -> Self {
        if has_z {
            Dimension::Xyz
        } else {
            Dimension::Xy
        }
    }

    /// Number of spatial ordinates (2 or 3).
    pub fn count(self) -> u8 {
        match self {
            Dimension::Xy => 2,
            Dimension::Xyz => 3,
        }
    }

    pub fn has_z(self) -> bool {
        self == Dimension::Xyz
    }
}

/// Geometry kind, numbered by its WKB base type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum GeometryType {
    /// Only ever appears as a polygon ring, never as a standalone node.
    LinearRing = 0,
    Point = 1,
    LineString = 2,
    Polygon = 3,
    MultiPoint = 4,
    MultiLineString = 5,
    MultiPolygon = 6,
    GeometryCollection = 7,
}

impl GeometryType {
    /// Kinds that may start a WKT body, multi-kinds ahead of the kinds they
    /// embed as a prefix.
    pub(crate) const KEYWORD_ORDER: [GeometryType; 7] = [
        GeometryType::MultiPolygon,
        GeometryType::MultiLineString,
        GeometryType::MultiPoint,
        GeometryType::GeometryCollection,
        GeometryType::Polygon,
        GeometryType::LineString,
        GeometryType::Point,
    ];

    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0 => GeometryType::LinearRing,
            1 => GeometryType::Point,
            2 => GeometryType::LineString,
            3 => GeometryType::Polygon,
            4 => GeometryType::MultiPoint,
            5 => GeometryType::MultiLineString,
            6 => GeometryType::MultiPolygon,
            7 => GeometryType::GeometryCollection,
            _ => return None,
        })
    }

    /// Upper-case WKT keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            GeometryType::LinearRing => "LINEARRING",
            GeometryType::Point => "POINT",
            GeometryType::LineString => "LINESTRING",
            GeometryType::Polygon => "POLYGON",
            GeometryType::MultiPoint => "MULTIPOINT",
            GeometryType::MultiLineString => "MULTILINESTRING",
            GeometryType::MultiPolygon => "MULTIPOLYGON",
            GeometryType::GeometryCollection => "GEOMETRYCOLLECTION",
        }
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Attributes shared by every node of a geometry tree.
pub trait Shape {
    fn dimension(&self) -> Dimension;
    fn has_measure(&self) -> bool;
    fn srid(&self) -> i32;

    /// Sets the SRID on this node and every descendant.
    fn set_srid(&mut self, srid: i32);

    fn has_z(&self) -> bool {
        self.dimension().has_z()
    }

    /// True when `other` has the same dimension, measure flag and SRID.
    fn same_layout(&self, other: &impl Shape) -> bool
    where
        Self: Sized,
    {
        self.dimension() == other.dimension()
            && self.has_measure() == other.has_measure()
            && self.srid() == other.srid()
    }
}

/// Generates a composite kind owning a typed child vector.
macro_rules! composite_geometry {
    ($(#[$meta:meta])* $name:ident, $field:ident: $child:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            $field: Vec<$child>,
            dimension: $crate::geometry::Dimension,
            has_measure: bool,
            srid: i32,
        }

        impl $name {
            /// Builds from children, taking dimension, measure flag and SRID
            /// from the first child.
            pub fn new($field: Vec<$child>) -> Self {
                use $crate::geometry::Shape;
                use $crate::geometry::{Dimension, UNKNOWN_SRID};
                let (dimension, has_measure, srid) = match $field.first() {
                    Some(first) => (first.dimension(), first.has_measure(), first.srid()),
                    None => (Dimension::Xy, false, UNKNOWN_SRID),
                };
                Self { $field, dimension, has_measure, srid }
            }

            /// An empty value of the given layout.
            pub fn empty_with(dimension: $crate::geometry::Dimension, has_measure: bool) -> Self {
                Self {
                    $field: Vec::new(),
                    dimension,
                    has_measure,
                    srid: $crate::geometry::UNKNOWN_SRID,
                }
            }

            pub fn empty() -> Self {
                Self::new(Vec::new())
            }

            /// Builds with an explicit layout; children are not checked.
            pub(crate) fn from_parts(
                $field: Vec<$child>,
                dimension: $crate::geometry::Dimension,
                has_measure: bool,
                srid: i32,
            ) -> Self {
                Self { $field, dimension, has_measure, srid }
            }

            /// Reassigns dimension and measure flag across the subtree. Only
            /// sound for trees without points.
            pub(crate) fn set_layout(
                &mut self,
                dimension: $crate::geometry::Dimension,
                has_measure: bool,
            ) {
                self.dimension = dimension;
                self.has_measure = has_measure;
                for child in &mut self.$field {
                    child.set_layout(dimension, has_measure);
                }
            }

            pub fn $field(&self) -> &[$child] {
                &self.$field
            }

            pub fn len(&self) -> usize {
                self.$field.len()
            }

            pub fn is_empty(&self) -> bool {
                self.$field.is_empty()
            }

            pub fn get(&self, index: usize) -> Option<&$child> {
                self.$field.get(index)
            }

            pub fn iter(&self) -> std::slice::Iter<'_, $child> {
                self.$field.iter()
            }

            pub fn into_inner(self) -> Vec<$child> {
                self.$field
            }

            pub fn with_srid(mut self, srid: i32) -> Self {
                $crate::geometry::Shape::set_srid(&mut self, srid);
                self
            }
        }

        impl $crate::geometry::Shape for $name {
            fn dimension(&self) -> $crate::geometry::Dimension {
                self.dimension
            }

            fn has_measure(&self) -> bool {
                self.has_measure
            }

            fn srid(&self) -> i32 {
                self.srid
            }

            fn set_srid(&mut self, srid: i32) {
                self.srid = $crate::geometry::normalize_srid(srid);
                for child in &mut self.$field {
                    $crate::geometry::Shape::set_srid(child, srid);
                }
            }
        }

        impl<'a> IntoIterator for &'a $name {
            type Item = &'a $child;
            type IntoIter = std::slice::Iter<'a, $child>;

            fn into_iter(self) -> Self::IntoIter {
                self.$field.iter()
            }
        }
    };
}

mod collection;
mod line;
mod multi;
mod point;
mod polygon;

pub use collection::GeometryCollection;
pub use line::{LineString, LinearRing};
pub use multi::{MultiLineString, MultiPoint, MultiPolygon};
pub use point::Point;
pub use polygon::Polygon;

/// A geometry value of one of the seven top-level kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point),
    LineString(LineString),
    Polygon(Polygon),
    MultiPoint(MultiPoint),
    MultiLineString(MultiLineString),
    MultiPolygon(MultiPolygon),
    GeometryCollection(GeometryCollection),
}

macro_rules! dispatch {
    ($geom:expr, $inner:ident => $body:expr) => {
        match $geom {
            Geometry::Point($inner) => $body,
            Geometry::LineString($inner) => $body,
            Geometry::Polygon($inner) => $body,
            Geometry::MultiPoint($inner) => $body,
            Geometry::MultiLineString($inner) => $body,
            Geometry::MultiPolygon($inner) => $body,
            Geometry::GeometryCollection($inner) => $body,
        }
    };
}

impl Geometry {
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Point(_) => GeometryType::Point,
            Geometry::LineString(_) => GeometryType::LineString,
            Geometry::Polygon(_) => GeometryType::Polygon,
            Geometry::MultiPoint(_) => GeometryType::MultiPoint,
            Geometry::MultiLineString(_) => GeometryType::MultiLineString,
            Geometry::MultiPolygon(_) => GeometryType::MultiPolygon,
            Geometry::GeometryCollection(_) => GeometryType::GeometryCollection,
        }
    }

    /// WKT keyword of this kind, e.g. `"MULTIPOLYGON"`.
    pub fn type_name(&self) -> &'static str {
        self.geometry_type().keyword()
    }

    /// True for composites without children. Points are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Point(_) => false,
            Geometry::LineString(g) => g.is_empty(),
            Geometry::Polygon(g) => g.is_empty(),
            Geometry::MultiPoint(g) => g.is_empty(),
            Geometry::MultiLineString(g) => g.is_empty(),
            Geometry::MultiPolygon(g) => g.is_empty(),
            Geometry::GeometryCollection(g) => g.is_empty(),
        }
    }

    /// Every point of the tree in document order.
    pub fn points(&self) -> Box<dyn Iterator<Item = &Point> + '_> {
        match self {
            Geometry::Point(p) => Box::new(std::iter::once(p)),
            Geometry::LineString(g) => Box::new(g.iter()),
            Geometry::Polygon(g) => Box::new(g.points()),
            Geometry::MultiPoint(g) => Box::new(g.iter()),
            Geometry::MultiLineString(g) => Box::new(g.iter().flat_map(|line| line.iter())),
            Geometry::MultiPolygon(g) => Box::new(g.iter().flat_map(|poly| poly.points())),
            Geometry::GeometryCollection(g) => Box::new(g.iter().flat_map(|geom| geom.points())),
        }
    }

    pub fn num_points(&self) -> usize {
        self.points().count()
    }

    /// The `n`-th point in document order.
    pub fn point(&self, n: usize) -> Option<&Point> {
        self.points().nth(n)
    }

    pub fn first_point(&self) -> Option<&Point> {
        self.points().next()
    }

    pub fn last_point(&self) -> Option<&Point> {
        self.points().last()
    }

    pub(crate) fn set_layout(&mut self, dimension: Dimension, has_measure: bool) {
        dispatch!(self, g => g.set_layout(dimension, has_measure))
    }

    /// See [`crate::consistency::check`].
    pub fn is_consistent(&self) -> bool {
        crate::consistency::check(self)
    }

    pub fn with_srid(mut self, srid: i32) -> Self {
        self.set_srid(srid);
        self
    }

    /// WKT without the SRID prefix.
    pub fn to_wkt(&self) -> String {
        crate::wkt::write_wkt(self)
    }

    /// EWKT: WKT prefixed with `SRID=n;` when an SRID is set.
    pub fn to_ewkt(&self) -> String {
        crate::wkt::write_ewkt(self)
    }
}

impl Shape for Geometry {
    fn dimension(&self) -> Dimension {
        dispatch!(self, g => g.dimension())
    }

    fn has_measure(&self) -> bool {
        dispatch!(self, g => g.has_measure())
    }

    fn srid(&self) -> i32 {
        dispatch!(self, g => g.srid())
    }

    fn set_srid(&mut self, srid: i32) {
        dispatch!(self, g => g.set_srid(srid))
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ewkt())
    }
}

impl FromStr for Geometry {
    type Err = GeoWireError;

    /// Accepts EWKT or hex EWKB, see [`crate::builder::from_text`].
    fn from_str(s: &str) -> Result<Self> {
        crate::builder::from_text(s).map(|(geom, _)| geom)
    }
}

macro_rules! impl_from_kind {
    ($($kind:ident),*) => {
        $(
            impl From<$kind> for Geometry {
                fn from(value: $kind) -> Self {
                    Geometry::$kind(value)
                }
            }
        )*
    };
}

impl_from_kind!(
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection
);
