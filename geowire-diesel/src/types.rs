//! Diesel SQL type definitions and `FromSql` / `ToSql` implementations.
//!
//! Both `Geometry` and `Geography` map to `Binary` (BLOB) in SQLite and
//! to PostGIS's native `geometry` / `geography` types in PostgreSQL.
//! Values are always written as little-endian EWKB. SQLite columns may also
//! hold EWKT or hex EWKB text, which is decoded on read.

#[cfg(any(feature = "sqlite", feature = "postgres"))]
use geowire_core::{GeoWireError, Geometry as GeometryValue, Shape};

/// SRID every geography value carries (WGS 84).
pub const GEOGRAPHY_SRID: i32 = 4326;

// ── SQL types ─────────────────────────────────────────────────────────────────

/// Diesel SQL type for a geometry column (stored as EWKB).
///
/// ```rust,ignore
/// table! {
///     features (id) {
///         id   -> Integer,
///         geom -> geowire_diesel::Geometry,
///     }
/// }
/// ```
#[derive(diesel::sql_types::SqlType, diesel::query_builder::QueryId, Debug, Clone, Copy)]
#[diesel(sqlite_type(name = "Binary"))]
#[diesel(postgres_type(name = "geometry"))]
pub struct Geometry;

/// Diesel SQL type for a geography column.
///
/// Same wire format as [`Geometry`], but values must use SRID 4326. Writing
/// a value without SRID tags it with 4326; any other SRID is rejected.
#[derive(diesel::sql_types::SqlType, diesel::query_builder::QueryId, Debug, Clone, Copy)]
#[diesel(sqlite_type(name = "Binary"))]
#[diesel(postgres_type(name = "geography"))]
pub struct Geography;

// ── Shared encode / decode ────────────────────────────────────────────────────

#[cfg(any(feature = "sqlite", feature = "postgres"))]
type BoxedError = Box<dyn std::error::Error + Send + Sync>;

#[cfg(any(feature = "sqlite", feature = "postgres"))]
fn logged(e: GeoWireError) -> BoxedError {
    log::debug!("rejecting spatial column value: {e}");
    Box::new(e)
}

#[cfg(any(feature = "sqlite", feature = "postgres"))]
fn decode_geometry(blob: &[u8]) -> Result<GeometryValue, BoxedError> {
    geowire_core::from_binary(blob).map_err(logged)
}

#[cfg(any(feature = "sqlite", feature = "postgres"))]
fn require_geography(geom: GeometryValue) -> Result<GeometryValue, BoxedError> {
    if geom.srid() == GEOGRAPHY_SRID {
        Ok(geom)
    } else {
        Err(logged(GeoWireError::Conversion(format!(
            "geography must use SRID {GEOGRAPHY_SRID} (got {})",
            geom.srid()
        ))))
    }
}

#[cfg(any(feature = "sqlite", feature = "postgres"))]
fn encode_geometry(geom: &GeometryValue) -> Vec<u8> {
    geowire_core::builder::to_binary(geom, geowire_core::ByteOrder::Ndr)
}

#[cfg(any(feature = "sqlite", feature = "postgres"))]
fn encode_geography(geom: &GeometryValue) -> Result<Vec<u8>, BoxedError> {
    match geom.srid() {
        GEOGRAPHY_SRID => Ok(encode_geometry(geom)),
        geowire_core::geometry::UNKNOWN_SRID => {
            Ok(encode_geometry(&geom.clone().with_srid(GEOGRAPHY_SRID)))
        }
        other => Err(logged(GeoWireError::Conversion(format!(
            "geography must use SRID {GEOGRAPHY_SRID} (got {other})"
        )))),
    }
}

// ── SQLite FromSql / ToSql ────────────────────────────────────────────────────

#[cfg(feature = "sqlite")]
mod sqlite_impls {
    use super::*;
    use diesel::deserialize::{self, FromSql};
    use diesel::serialize::{self, IsNull, Output, ToSql};
    use diesel::sql_types::{Binary, Text};
    use diesel::sqlite::{Sqlite, SqliteType, SqliteValue};
    // SQLite Output does NOT implement std::io::Write.
    // Binary values are passed via `out.set_value(value)` where value
    // implements `Into<SqliteBindValue>` (e.g. &[u8], Vec<u8>).

    /// BLOB columns hold EWKB; TEXT columns hold EWKT or hex EWKB.
    fn read_value(value: SqliteValue<'_, '_, '_>) -> deserialize::Result<GeometryValue> {
        match value.value_type() {
            Some(SqliteType::Text) => {
                let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
                let (geom, _) = geowire_core::from_text(&text).map_err(logged)?;
                Ok(geom)
            }
            _ => {
                let blob = <Vec<u8> as FromSql<Binary, Sqlite>>::from_sql(value)?;
                decode_geometry(&blob)
            }
        }
    }

    // --- Vec<u8> (raw EWKB bytes) ---

    macro_rules! impl_raw_bytes {
        ($sql_type:ty) => {
            impl FromSql<$sql_type, Sqlite> for Vec<u8> {
                fn from_sql(bytes: SqliteValue<'_, '_, '_>) -> deserialize::Result<Self> {
                    <Vec<u8> as FromSql<Binary, Sqlite>>::from_sql(bytes)
                }
            }

            impl ToSql<$sql_type, Sqlite> for Vec<u8> {
                fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
                    out.set_value(self.as_slice());
                    Ok(IsNull::No)
                }
            }
        };
    }

    impl_raw_bytes!(Geometry);
    impl_raw_bytes!(Geography);

    // --- geowire_core::Geometry ---

    impl FromSql<Geometry, Sqlite> for GeometryValue {
        fn from_sql(value: SqliteValue<'_, '_, '_>) -> deserialize::Result<Self> {
            read_value(value)
        }
    }

    impl ToSql<Geometry, Sqlite> for GeometryValue {
        fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
            // Vec<u8> implements Into<SqliteBindValue> via the Binary variant.
            out.set_value(encode_geometry(self));
            Ok(IsNull::No)
        }
    }

    impl FromSql<Geography, Sqlite> for GeometryValue {
        fn from_sql(value: SqliteValue<'_, '_, '_>) -> deserialize::Result<Self> {
            require_geography(read_value(value)?)
        }
    }

    impl ToSql<Geography, Sqlite> for GeometryValue {
        fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
            out.set_value(encode_geography(self)?);
            Ok(IsNull::No)
        }
    }
}

// ── PostgreSQL FromSql / ToSql ────────────────────────────────────────────────

#[cfg(feature = "postgres")]
mod postgres_impls {
    use super::*;
    use diesel::deserialize::{self, FromSql};
    use diesel::pg::{Pg, PgValue};
    use diesel::serialize::{self, IsNull, Output, ToSql};
    use std::io::Write as IoWrite;

    // PostgreSQL Output implements std::io::Write, so binary data is written
    // via `IoWrite::write_all(out, &bytes)`.

    // --- Vec<u8> (raw EWKB bytes) ---

    macro_rules! impl_raw_bytes_pg {
        ($sql_type:ty) => {
            impl FromSql<$sql_type, Pg> for Vec<u8> {
                fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
                    Ok(bytes.as_bytes().to_vec())
                }
            }

            impl ToSql<$sql_type, Pg> for Vec<u8> {
                fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                    IoWrite::write_all(out, self)?;
                    Ok(IsNull::No)
                }
            }
        };
    }

    impl_raw_bytes_pg!(Geometry);
    impl_raw_bytes_pg!(Geography);

    // --- geowire_core::Geometry ---

    impl FromSql<Geometry, Pg> for GeometryValue {
        fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
            decode_geometry(bytes.as_bytes())
        }
    }

    impl ToSql<Geometry, Pg> for GeometryValue {
        fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
            IoWrite::write_all(out, &encode_geometry(self))?;
            Ok(IsNull::No)
        }
    }

    impl FromSql<Geography, Pg> for GeometryValue {
        fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
            require_geography(decode_geometry(bytes.as_bytes())?)
        }
    }

    impl ToSql<Geography, Pg> for GeometryValue {
        fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
            IoWrite::write_all(out, &encode_geography(self)?)?;
            Ok(IsNull::No)
        }
    }
}
