//! Entry points that pick the codec from the input.
//!
//! Text may be EWKT or hex EWKB; bytes are raw EWKB. Output helpers cover
//! the three encodings in either byte order.

use crate::error::Result;
use crate::ewkb::{self, ByteOrder};
use crate::geometry::{Geometry, GeometryCollection, Shape};
use crate::wkt;

/// Encoding detected by [`from_text`] or [`from_binary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// WKT or EWKT text, also used for the `*EMPTY` shortcut.
    Wkt,
    /// Hex-encoded EWKB text.
    HexEwkb,
    /// Raw EWKB bytes.
    Ewkb,
}

// ── Deserialization ──────────────────────────────────────────────────────────

/// Decode a geometry from EWKT or hex EWKB text.
///
/// Surrounding whitespace is ignored. An optional `SRID=n;` prefix is split
/// off first and overrides any SRID embedded in the payload. Payloads
/// starting with `00` or `01` are hex EWKB; any payload ending in `EMPTY`
/// yields an empty geometry collection; everything else is WKT.
///
/// # Example
///
/// ```
/// use geowire_core::builder::{from_text, Encoding};
/// use geowire_core::geometry::Shape;
///
/// let (geom, encoding) = from_text("SRID=4326;0101000000000000000000F03F0000000000000040").unwrap();
/// assert_eq!(encoding, Encoding::HexEwkb);
/// assert_eq!(geom.srid(), 4326);
/// assert_eq!(geom.to_wkt(), "POINT(1 2)");
/// ```
pub fn from_text(text: &str) -> Result<(Geometry, Encoding)> {
    let (srid, payload) = wkt::split_srid(text)?;

    let (mut geom, encoding) = if payload.starts_with("00") || payload.starts_with("01") {
        (ewkb::parse_hex(payload)?, Encoding::HexEwkb)
    } else if payload.ends_with("EMPTY") {
        (GeometryCollection::empty().into(), Encoding::Wkt)
    } else {
        (wkt::parse_wkt(payload)?, Encoding::Wkt)
    };
    log::trace!("decoded {} from {encoding:?} input", geom.type_name());

    if let Some(srid) = srid {
        geom.set_srid(srid);
    }
    Ok((geom, encoding))
}

/// Decode a geometry from raw EWKB bytes.
pub fn from_binary(bytes: &[u8]) -> Result<Geometry> {
    let geom = ewkb::parse_binary(bytes)?;
    log::trace!("decoded {} from {:?} input", geom.type_name(), Encoding::Ewkb);
    Ok(geom)
}

// ── Serialization ────────────────────────────────────────────────────────────

/// EWKT text, see [`wkt::write_ewkt`].
pub fn to_ewkt(geom: &Geometry) -> String {
    wkt::write_ewkt(geom)
}

/// EWKB bytes in `order`.
pub fn to_binary(geom: &Geometry, order: ByteOrder) -> Vec<u8> {
    ewkb::write_binary(geom, order)
}

/// Uppercase hex EWKB in `order`.
pub fn to_hex(geom: &Geometry, order: ByteOrder) -> String {
    ewkb::write_hex(geom, order)
}
