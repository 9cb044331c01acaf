//! Coefficient packing.
//!
//! Wavelet coefficients are `i32` but nearly all of them fit in a byte. Each
//! coefficient is stored as one `i8`; values with a magnitude above 127 are
//! replaced by the sentinel -128 and appended to an overflow buffer that is
//! stored next to the coded stream. Since -128 itself has a magnitude above
//! 127 it always goes through the overflow buffer, so the sentinel is never
//! ambiguous.

use crate::constants::{OVERFLOW_SENTINEL, PACKED_MAGNITUDE_MAX};
use crate::error::BildError;
use crate::wavelet::Levels2D;

/// Values that did not fit in a byte, in encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverflowBuffer {
    values: Vec<i32>,
}

impl OverflowBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(values: Vec<i32>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[i32] {
        &self.values
    }

    pub fn push(&mut self, value: i32) {
        self.values.push(value);
    }

    pub fn reader(&self) -> OverflowReader<'_> {
        OverflowReader {
            values: &self.values,
            position: 0,
        }
    }
}

/// FIFO cursor over an [`OverflowBuffer`].
#[derive(Debug)]
pub struct OverflowReader<'a> {
    values: &'a [i32],
    position: usize,
}

impl OverflowReader<'_> {
    pub fn pop(&mut self) -> Result<i32, BildError> {
        let value = *self
            .values
            .get(self.position)
            .ok_or(BildError::OverflowExhausted)?;
        self.position += 1;
        Ok(value)
    }

    pub fn is_exhausted(&self) -> bool {
        self.position == self.values.len()
    }
}

pub fn pack(value: i32, overflow: &mut OverflowBuffer) -> i8 {
    if value.unsigned_abs() > PACKED_MAGNITUDE_MAX as u32 {
        overflow.push(value);
        return OVERFLOW_SENTINEL;
    }
    value as i8
}

pub fn unpack(byte: i8, overflow: &mut OverflowReader<'_>) -> Result<i32, BildError> {
    if byte == OVERFLOW_SENTINEL {
        return overflow.pop();
    }
    Ok(byte as i32)
}

/// Packs a coefficient sequence into one byte per value.
pub fn pack_all(values: &[i32], overflow: &mut OverflowBuffer) -> Vec<u8> {
    values.iter().map(|&v| pack(v, overflow) as u8).collect()
}

pub fn unpack_all(bytes: &[u8], overflow: &OverflowBuffer) -> Result<Vec<i32>, BildError> {
    let mut reader = overflow.reader();
    let values = bytes
        .iter()
        .map(|&b| unpack(b as i8, &mut reader))
        .collect::<Result<Vec<_>, _>>()?;
    if !reader.is_exhausted() {
        return Err(BildError::OverflowNotConsumed);
    }
    Ok(values)
}

/// Packs every detail coefficient of `levels`, finest level first and LH,
/// HL, HH within a level.
pub fn pack_levels(levels: &Levels2D) -> (Vec<u8>, OverflowBuffer) {
    let mut overflow = OverflowBuffer::new();
    let mut packed = Vec::with_capacity(levels.detail_len());
    for level in &levels.levels {
        for subband in level.subbands() {
            packed.extend(subband.data().iter().map(|&v| pack(v, &mut overflow) as u8));
        }
    }
    (packed, overflow)
}

/// Fills the detail subbands of `levels` from `packed` in the order written
/// by [`pack_levels`]. The stream length must match the subband sizes and
/// the overflow buffer must be consumed exactly.
pub fn unpack_levels(
    packed: &[u8],
    overflow: &OverflowBuffer,
    levels: &mut Levels2D,
) -> Result<(), BildError> {
    if packed.len() != levels.detail_len() {
        return Err(BildError::InvalidData);
    }

    let mut reader = overflow.reader();
    let mut bytes = packed.iter();
    for level in &mut levels.levels {
        for subband in level.subbands_mut() {
            subband.rewind();
            for _ in 0..subband.len() {
                let byte = *bytes.next().ok_or(BildError::InvalidData)?;
                subband.push(unpack(byte as i8, &mut reader)?);
            }
            subband.rewind();
        }
    }

    if !reader.is_exhausted() {
        return Err(BildError::OverflowNotConsumed);
    }
    Ok(())
}
