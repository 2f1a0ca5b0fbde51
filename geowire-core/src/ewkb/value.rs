//! Endian-aware cursors over byte sources and sinks.

use super::bytes::{ByteGetter, ByteSetter};
use super::ByteOrder;
use crate::error::{GeoWireError, Result};

/// Sequential reader of fixed-width values in a chosen byte order.
///
/// One reader serves one decode call tree and is borrowed mutably through
/// it; the position only moves forward.
#[derive(Debug, Clone)]
pub struct ValueGetter<G> {
    bytes: G,
    order: ByteOrder,
    position: usize,
}

impl<G: ByteGetter> ValueGetter<G> {
    pub fn new(bytes: G, order: ByteOrder) -> Self {
        Self {
            bytes,
            order,
            position: 0,
        }
    }

    /// Reader whose order is taken from the marker byte at offset 0. The
    /// marker itself is not consumed.
    pub fn for_stream(bytes: G) -> Result<Self> {
        let marker = bytes.get(0)?;
        let order = ByteOrder::from_marker(marker).ok_or_else(|| {
            GeoWireError::binary(format!("invalid byte order marker {marker}"), 0)
        })?;
        Ok(Self::new(bytes, order))
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    pub fn set_order(&mut self, order: ByteOrder) {
        self.order = order;
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.position)
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        if self.remaining() < N {
            return Err(GeoWireError::binary(
                format!("unexpected end of input, {N} more bytes needed"),
                self.position,
            ));
        }
        let mut out = [0u8; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.bytes.get(self.position + i)?;
        }
        self.position += N;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let [byte] = self.take::<1>()?;
        Ok(byte)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let raw = self.take::<4>()?;
        Ok(match self.order {
            ByteOrder::Xdr => u32::from_be_bytes(raw),
            ByteOrder::Ndr => u32::from_le_bytes(raw),
        })
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let raw = self.take::<4>()?;
        Ok(match self.order {
            ByteOrder::Xdr => i32::from_be_bytes(raw),
            ByteOrder::Ndr => i32::from_le_bytes(raw),
        })
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let raw = self.take::<8>()?;
        Ok(match self.order {
            ByteOrder::Xdr => u64::from_be_bytes(raw),
            ByteOrder::Ndr => u64::from_le_bytes(raw),
        })
    }

    /// IEEE-754 double through its 64-bit pattern.
    pub fn read_f64(&mut self) -> Result<f64> {
        self.read_u64().map(f64::from_bits)
    }
}

/// Sequential writer of fixed-width values in a chosen byte order.
#[derive(Debug, Clone)]
pub struct ValueSetter<S> {
    sink: S,
    order: ByteOrder,
    written: usize,
}

impl<S: ByteSetter> ValueSetter<S> {
    pub fn new(sink: S, order: ByteOrder) -> Self {
        Self {
            sink,
            order,
            written: 0,
        }
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// Bytes written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    fn put_all(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.sink.put(byte);
        }
        self.written += bytes.len();
    }

    pub fn write_u8(&mut self, value: u8) {
        self.put_all(&[value]);
    }

    pub fn write_u32(&mut self, value: u32) {
        let raw = match self.order {
            ByteOrder::Xdr => value.to_be_bytes(),
            ByteOrder::Ndr => value.to_le_bytes(),
        };
        self.put_all(&raw);
    }

    pub fn write_i32(&mut self, value: i32) {
        let raw = match self.order {
            ByteOrder::Xdr => value.to_be_bytes(),
            ByteOrder::Ndr => value.to_le_bytes(),
        };
        self.put_all(&raw);
    }

    pub fn write_u64(&mut self, value: u64) {
        let raw = match self.order {
            ByteOrder::Xdr => value.to_be_bytes(),
            ByteOrder::Ndr => value.to_le_bytes(),
        };
        self.put_all(&raw);
    }

    pub fn write_f64(&mut self, value: f64) {
        self.write_u64(value.to_bits());
    }

    pub fn into_inner(self) -> S {
        self.sink
    }
}
