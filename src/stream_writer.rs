//! Little-endian field writer for BILD containers.

use crate::error::BildError;
use std::io::Write;

/// Writes fixed-width little-endian fields to any [`Write`] sink and counts
/// the bytes emitted.
pub struct BildStreamWriter<W: Write> {
    destination: W,
    position: usize,
}

impl<W: Write> BildStreamWriter<W> {
    pub fn new(destination: W) -> Self {
        Self {
            destination,
            position: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.position
    }

    pub fn is_empty(&self) -> bool {
        self.position == 0
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), BildError> {
        self.destination.write_all(bytes)?;
        self.position += bytes.len();
        Ok(())
    }

    pub fn write_byte(&mut self, value: u8) -> Result<(), BildError> {
        self.write_bytes(&[value])
    }

    pub fn write_u16(&mut self, value: u16) -> Result<(), BildError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<(), BildError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<(), BildError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn flush(&mut self) -> Result<(), BildError> {
        self.destination.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.destination
    }
}
