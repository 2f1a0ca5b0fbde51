//! EWKB (Extended Well-Known Binary) parser and writer.
//!
//! Wire format, per geometry node:
//!   [0x01|0x00]   — byte order marker (NDR little-endian or XDR big-endian)
//!   [u32]         — geometry type with flags (in the declared byte order)
//!                   Bit 29 (0x20000000): SRID present
//!                   Bit 31 (0x80000000): Z dimension
//!                   Bit 30 (0x40000000): M dimension
//!                   Bits 0–28: geometry type (1=Point, 2=LineString, …)
//!   [i32]         — SRID (only when SRID flag set, in declared byte order)
//!   …             — type-specific body
//!
//! Point bodies are `x y [z] [m]` doubles. LineString and ring bodies are a
//! `u32` count followed by bare point bodies. Polygon bodies are a `u32` ring
//! count followed by ring bodies. Multi-geometries and collections are a
//! `u32` count followed by complete nodes, each with its own marker and type.
//!
//! The same bytes travel either raw or as uppercase hex text; see [`bytes`].

pub mod bytes;
mod parser;
pub mod value;
mod writer;

pub use parser::{parse, parse_binary, parse_hex};
pub use writer::{estimate_bytes, write_binary, write_geometry, write_hex};

use crate::error::{GeoWireError, Result};
use crate::geometry::{normalize_srid, GeometryType};
use bytes::{BinaryBytes, ByteGetter};
use value::ValueGetter;

// ── EWKB flag constants ───────────────────────────────────────────────────────
pub const EWKB_SRID_FLAG: u32 = 0x20000000;
pub const EWKB_Z_FLAG: u32 = 0x80000000;
pub const EWKB_M_FLAG: u32 = 0x40000000;
pub const EWKB_TYPE_MASK: u32 = 0x1FFFFFFF;

/// Byte order of an encoded node, named after its marker byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ByteOrder {
    /// Big-endian, marker `0`.
    Xdr,
    /// Little-endian, marker `1`.
    #[default]
    Ndr,
}

impl ByteOrder {
    pub fn marker(self) -> u8 {
        match self {
            ByteOrder::Xdr => 0,
            ByteOrder::Ndr => 1,
        }
    }

    pub fn from_marker(marker: u8) -> Option<Self> {
        match marker {
            0 => Some(ByteOrder::Xdr),
            1 => Some(ByteOrder::Ndr),
            _ => None,
        }
    }
}

/// Parsed EWKB node header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EwkbHeader {
    pub geom_type: GeometryType,
    /// SRID embedded in the node, if the SRID flag is set.
    pub srid: Option<i32>,
    pub has_z: bool,
    pub has_m: bool,
    pub byte_order: ByteOrder,
    /// Offset of the marker byte of this node.
    pub offset: usize,
    /// Offset where the body starts (after header + optional SRID).
    pub data_offset: usize,
}

/// Reads one node header at the cursor and switches the cursor to the
/// node's byte order.
///
/// Besides EWKB flag bits, ISO type codes (`1000`/`2000`/`3000` offsets for
/// Z, M and ZM) are understood.
pub(crate) fn read_header<G: ByteGetter>(data: &mut ValueGetter<G>) -> Result<EwkbHeader> {
    let offset = data.position();
    let marker = data.read_u8()?;
    let byte_order = ByteOrder::from_marker(marker).ok_or_else(|| {
        GeoWireError::binary(format!("invalid byte order marker {marker}"), offset)
    })?;
    data.set_order(byte_order);

    let type_offset = data.position();
    let type_word = data.read_u32()?;
    let mut has_z = type_word & EWKB_Z_FLAG != 0;
    let mut has_m = type_word & EWKB_M_FLAG != 0;
    let has_srid = type_word & EWKB_SRID_FLAG != 0;

    let mut code = type_word & EWKB_TYPE_MASK;
    if (1000..4000).contains(&code) {
        match code / 1000 {
            1 => has_z = true,
            2 => has_m = true,
            _ => {
                has_z = true;
                has_m = true;
            }
        }
        code %= 1000;
    }

    let geom_type = match GeometryType::from_code(code) {
        Some(GeometryType::LinearRing) => {
            return Err(GeoWireError::binary(
                "linear ring cannot be encoded as a standalone geometry",
                type_offset,
            ))
        }
        Some(kind) => kind,
        None => {
            return Err(GeoWireError::binary(
                format!("unknown geometry type {code}"),
                type_offset,
            ))
        }
    };

    let srid = if has_srid {
        Some(normalize_srid(data.read_i32()?))
    } else {
        None
    };

    Ok(EwkbHeader {
        geom_type,
        srid,
        has_z,
        has_m,
        byte_order,
        offset,
        data_offset: data.position(),
    })
}

/// Peek at the EWKB header without parsing the body.
///
/// # Example
///
/// ```
/// use geowire_core::ewkb::{parse_ewkb_header, write_binary, ByteOrder};
/// use geowire_core::geometry::{Geometry, GeometryType, Point};
///
/// let blob = write_binary(&Geometry::from(Point::new(1.0, 2.0).with_srid(4326)), ByteOrder::Ndr);
/// let hdr = parse_ewkb_header(&blob).unwrap();
/// assert_eq!(hdr.geom_type, GeometryType::Point);
/// assert_eq!(hdr.srid, Some(4326));
/// assert_eq!(hdr.data_offset, 9);
/// ```
pub fn parse_ewkb_header(blob: &[u8]) -> Result<EwkbHeader> {
    let mut data = ValueGetter::new(BinaryBytes::new(blob), ByteOrder::default());
    read_header(&mut data)
}

/// Extract only the SRID from an EWKB blob (cheap, no geometry parsing).
pub fn extract_srid(blob: &[u8]) -> Option<i32> {
    parse_ewkb_header(blob).ok().and_then(|h| h.srid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn header_of(bytes: &[u8]) -> Result<EwkbHeader> {
        parse_ewkb_header(bytes)
    }

    #[test]
    fn header_big_endian_point_with_srid() {
        let mut blob = vec![0x00];
        blob.extend_from_slice(&(1 | EWKB_SRID_FLAG).to_be_bytes());
        blob.extend_from_slice(&4326i32.to_be_bytes());

        let hdr = header_of(&blob).unwrap();
        assert_eq!(hdr.geom_type, GeometryType::Point);
        assert_eq!(hdr.srid, Some(4326));
        assert_eq!(hdr.byte_order, ByteOrder::Xdr);
        assert_eq!(hdr.data_offset, 9);
    }

    #[test]
    fn header_flags() {
        let mut blob = vec![0x01];
        blob.extend_from_slice(&(2 | EWKB_Z_FLAG | EWKB_M_FLAG).to_le_bytes());
        let hdr = header_of(&blob).unwrap();
        assert_eq!(hdr.geom_type, GeometryType::LineString);
        assert!(hdr.has_z);
        assert!(hdr.has_m);
        assert_eq!(hdr.srid, None);
    }

    #[test]
    fn header_iso_type_codes() {
        for (code, z, m) in [(1003u32, true, false), (2003, false, true), (3003, true, true)] {
            let mut blob = vec![0x01];
            blob.extend_from_slice(&code.to_le_bytes());
            let hdr = header_of(&blob).unwrap();
            assert_eq!(hdr.geom_type, GeometryType::Polygon);
            assert_eq!((hdr.has_z, hdr.has_m), (z, m));
        }
    }

    #[test]
    fn header_rejects_bad_marker() {
        assert_matches!(
            header_of(&[0x02, 0x01, 0x00, 0x00, 0x00]),
            Err(GeoWireError::MalformedBinary { offset: 0, .. })
        );
    }

    #[test]
    fn header_rejects_unknown_and_ring_types() {
        let mut blob = vec![0x01];
        blob.extend_from_slice(&42u32.to_le_bytes());
        assert_matches!(
            header_of(&blob),
            Err(GeoWireError::MalformedBinary { offset: 1, .. })
        );

        let mut ring = vec![0x01];
        ring.extend_from_slice(&0u32.to_le_bytes());
        assert!(header_of(&ring).unwrap_err().is_binary());
    }

    #[test]
    fn header_srid_flag_but_truncated() {
        let mut blob = vec![0x01];
        blob.extend_from_slice(&(1 | EWKB_SRID_FLAG).to_le_bytes());
        assert_matches!(
            header_of(&blob),
            Err(GeoWireError::MalformedBinary { offset: 5, .. })
        );
    }

    #[test]
    fn extract_srid_malformed_blob() {
        assert_eq!(extract_srid(&[]), None);
        assert_eq!(extract_srid(&[0xFF, 0xFF]), None);
    }

    #[test]
    fn byte_order_markers() {
        assert_eq!(ByteOrder::from_marker(0), Some(ByteOrder::Xdr));
        assert_eq!(ByteOrder::from_marker(1), Some(ByteOrder::Ndr));
        assert_eq!(ByteOrder::from_marker(2), None);
        assert_eq!(ByteOrder::default().marker(), 1);
    }
}
