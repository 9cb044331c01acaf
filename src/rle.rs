//! Byte oriented run-length coding.
//!
//! Bytes are copied through unchanged until one repeats the byte before it.
//! The repeated byte is written, followed by a little-endian `u16` holding
//! the number of further copies that were dropped:
//!
//! ```text
//! 7 7 7 7 7 3  ->  7 7 [3 0] 3
//! ```
//!
//! Runs longer than `2 + u16::MAX` continue as another group, since the byte
//! following a capped group again repeats its predecessor.

use crate::error::BildError;

const MAX_REPEAT: usize = u16::MAX as usize;

pub fn encode(data: &[u8]) -> Vec<u8> {
    let Some((&first, rest)) = data.split_first() else {
        return Vec::new();
    };

    let mut coded = Vec::with_capacity(data.len() + data.len() / 8);
    coded.push(first);
    let mut previous = first;
    let mut i = 0;

    while i < rest.len() {
        let byte = rest[i];
        coded.push(byte);
        i += 1;

        if byte == previous {
            let repeat = rest[i..]
                .iter()
                .take(MAX_REPEAT)
                .take_while(|&&b| b == byte)
                .count();
            coded.extend_from_slice(&(repeat as u16).to_le_bytes());
            i += repeat;
        }
        previous = byte;
    }
    coded
}

pub fn decode(coded: &[u8]) -> Result<Vec<u8>, BildError> {
    decode_with_limit(coded, usize::MAX)
}

/// Decodes `coded`, failing with `InvalidData` as soon as the output would
/// grow beyond `max_size` bytes.
pub fn decode_with_limit(coded: &[u8], max_size: usize) -> Result<Vec<u8>, BildError> {
    let Some((&first, rest)) = coded.split_first() else {
        return Ok(Vec::new());
    };
    if max_size == 0 {
        return Err(BildError::InvalidData);
    }

    let mut data = Vec::with_capacity(coded.len().saturating_mul(2).min(max_size));
    data.push(first);
    let mut previous = first;
    let mut i = 0;

    while i < rest.len() {
        let byte = rest[i];
        if data.len() == max_size {
            return Err(BildError::InvalidData);
        }
        data.push(byte);
        i += 1;

        if byte == previous {
            let count = rest.get(i..i + 2).ok_or(BildError::TruncatedData)?;
            let repeat = u16::from_le_bytes([count[0], count[1]]) as usize;
            if repeat > max_size - data.len() {
                return Err(BildError::InvalidData);
            }
            data.resize(data.len() + repeat, byte);
            i += 2;
        }
        previous = byte;
    }
    Ok(data)
}
