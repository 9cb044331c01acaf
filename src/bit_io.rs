//! LSB-first bit packing.
//!
//! Bits fill each byte from the least significant bit upwards and continue
//! into the next byte. Codes longer than a byte simply span several bytes.

use crate::error::BildError;

pub struct BitWriter {
    data: Vec<u8>,
    bit_buffer: u64,
    bits_count: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            data: Vec::with_capacity(bytes),
            bit_buffer: 0,
            bits_count: 0,
        }
    }

    /// Appends the low `length` bits of `code`, least significant first.
    pub fn write_bits(&mut self, code: u64, length: u32) {
        let mut code = code;
        let mut length = length;
        while length > 0 {
            let take = length.min(32);
            let mask = (1u64 << take) - 1;
            self.bit_buffer |= (code & mask) << self.bits_count;
            self.bits_count += take;
            code = code.checked_shr(take).unwrap_or(0);
            length -= take;

            while self.bits_count >= 8 {
                self.data.push(self.bit_buffer as u8);
                self.bit_buffer >>= 8;
                self.bits_count -= 8;
            }
        }
    }

    pub fn bit_len(&self) -> usize {
        self.data.len() * 8 + self.bits_count as usize
    }

    /// Flushes a partial byte, padding its high bits with zeros.
    pub fn finish(mut self) -> Vec<u8> {
        if self.bits_count > 0 {
            self.data.push(self.bit_buffer as u8);
        }
        self.data
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

pub struct BitReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn read_bit(&mut self) -> Result<u8, BildError> {
        let byte = self
            .data
            .get(self.position >> 3)
            .ok_or(BildError::TruncatedData)?;
        let bit = (byte >> (self.position & 7)) & 1;
        self.position += 1;
        Ok(bit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_value(reader: &mut BitReader, count: u32) -> u64 {
        (0..count).fold(0, |bits, i| bits | (reader.read_bit().unwrap() as u64) << i)
    }

    #[test]
    fn test_lsb_first_layout() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b1, 1);
        writer.write_bits(0b10, 2);
        writer.write_bits(0b11111, 5);
        writer.write_bits(0b1, 1);
        assert_eq!(writer.bit_len(), 9);
        assert_eq!(writer.finish(), vec![0b1111_1101, 0b0000_0001]);
    }

    #[test]
    fn test_long_codes_span_bytes() {
        let mut writer = BitWriter::new();
        writer.write_bits(0x5, 3);
        writer.write_bits(0x1_2345_6789_ABCD, 49);
        writer.write_bits(0x3, 2);
        let data = writer.finish();
        assert_eq!(data.len(), 7);

        let mut reader = BitReader::new(&data);
        assert_eq!(read_value(&mut reader, 3), 0x5);
        assert_eq!(read_value(&mut reader, 49), 0x1_2345_6789_ABCD);
        assert_eq!(read_value(&mut reader, 2), 0x3);
        // only the zero padding of the last byte remains
        assert_eq!(read_value(&mut reader, 2), 0);
        assert!(reader.read_bit().is_err());
    }

    #[test]
    fn test_reading_past_end() {
        let data = [0xFFu8];
        let mut reader = BitReader::new(&data);
        assert_eq!(read_value(&mut reader, 8), 0xFF);
        assert!(matches!(reader.read_bit(), Err(BildError::TruncatedData)));
    }
}
