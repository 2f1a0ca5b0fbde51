//! Positional byte sources and sinks.
//!
//! A byte sequence is read either from a raw buffer or from text holding two
//! hex characters per byte (byte `i` at characters `2i` and `2i + 1`). Hex is
//! always produced in uppercase, most significant nibble first, regardless
//! of the byte order declared inside the geometry.

use crate::error::{GeoWireError, Result};

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Random access to a byte sequence.
pub trait ByteGetter {
    /// Number of bytes available.
    fn len(&self) -> usize;

    /// The byte at `index`.
    fn get(&self, index: usize) -> Result<u8>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sequential byte output.
pub trait ByteSetter {
    fn put(&mut self, byte: u8);
}

/// Raw binary input.
#[derive(Debug, Clone, Copy)]
pub struct BinaryBytes<'a> {
    bytes: &'a [u8],
}

impl<'a> BinaryBytes<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }
}

impl ByteGetter for BinaryBytes<'_> {
    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn get(&self, index: usize) -> Result<u8> {
        self.bytes
            .get(index)
            .copied()
            .ok_or_else(|| GeoWireError::binary("unexpected end of input", index))
    }
}

/// Hex-text input, two characters per byte, either case.
#[derive(Debug, Clone, Copy)]
pub struct HexBytes<'a> {
    text: &'a [u8],
}

impl<'a> HexBytes<'a> {
    /// Rejects text of odd length; digits are validated lazily on access.
    pub fn new(text: &'a str) -> Result<Self> {
        let text = text.as_bytes();
        if text.len() % 2 != 0 {
            return Err(GeoWireError::binary(
                "hex input has an odd number of characters",
                text.len() / 2,
            ));
        }
        Ok(Self { text })
    }
}

fn nibble(digit: u8, index: usize) -> Result<u8> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        _ => Err(GeoWireError::binary(
            format!("invalid hex digit {:?}", char::from(digit)),
            index,
        )),
    }
}

impl ByteGetter for HexBytes<'_> {
    fn len(&self) -> usize {
        self.text.len() / 2
    }

    fn get(&self, index: usize) -> Result<u8> {
        match self.text.get(index * 2..index * 2 + 2) {
            Some(&[high, low]) => Ok((nibble(high, index)? << 4) | nibble(low, index)?),
            _ => Err(GeoWireError::binary("unexpected end of input", index)),
        }
    }
}

impl ByteSetter for Vec<u8> {
    fn put(&mut self, byte: u8) {
        self.push(byte);
    }
}

/// Uppercase hex-text output.
#[derive(Debug, Clone, Default)]
pub struct HexSink {
    text: String,
}

impl HexSink {
    /// Sink pre-sized for `bytes` bytes of output.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            text: String::with_capacity(bytes * 2),
        }
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl ByteSetter for HexSink {
    fn put(&mut self, byte: u8) {
        self.text.push(char::from(HEX_DIGITS[usize::from(byte >> 4)]));
        self.text.push(char::from(HEX_DIGITS[usize::from(byte & 0x0F)]));
    }
}

/// Uppercase hex encoding of `bytes`.
///
/// # Example
///
/// ```
/// use geowire_core::ewkb::bytes::hex_encode;
///
/// assert_eq!(hex_encode(&[0x01, 0xAB, 0x00]), "01AB00");
/// ```
pub fn hex_encode(bytes: &[u8]) -> String {
    let mut sink = HexSink::with_capacity(bytes.len());
    for &byte in bytes {
        sink.put(byte);
    }
    sink.into_string()
}

/// Decodes hex text of either case.
pub fn hex_decode(text: &str) -> Result<Vec<u8>> {
    let hex = HexBytes::new(text)?;
    (0..hex.len()).map(|index| hex.get(index)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn hex_roundtrip_uses_uppercase() {
        let bytes = [0x00, 0x0F, 0xF0, 0x7A, 0xFF];
        let hex = hex_encode(&bytes);
        assert_eq!(hex, "000FF07AFF");
        assert_eq!(hex_decode(&hex).unwrap(), bytes);
        assert_eq!(hex_decode("000ff07aff").unwrap(), bytes);
    }

    #[test]
    fn hex_bytes_index_pairs() {
        let hex = HexBytes::new("0102FE").unwrap();
        assert_eq!(hex.len(), 3);
        assert_eq!(hex.get(2).unwrap(), 0xFE);
        assert_matches!(
            hex.get(3),
            Err(GeoWireError::MalformedBinary { offset: 3, .. })
        );
    }

    #[test]
    fn hex_rejects_non_hex_digits() {
        assert_matches!(
            hex_decode("01G2"),
            Err(GeoWireError::MalformedBinary { offset: 1, .. })
        );
        assert!(hex_decode("0x").unwrap_err().is_binary());
    }

    #[test]
    fn hex_rejects_odd_length() {
        assert!(HexBytes::new("012").unwrap_err().is_binary());
    }

    #[test]
    fn binary_bytes_bounds() {
        let bin = BinaryBytes::new(&[7, 8]);
        assert_eq!(bin.get(1).unwrap(), 8);
        assert!(bin.get(2).unwrap_err().is_binary());
        assert!(!bin.is_empty());
    }
}
