//! Little-endian field reader over an in-memory BILD container.

use crate::error::BildError;

pub struct BildStreamReader<'a> {
    source: &'a [u8],
    position: usize,
}

impl<'a> BildStreamReader<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining_data(&self) -> &'a [u8] {
        &self.source[self.position..]
    }

    pub fn remaining(&self) -> usize {
        self.source.len() - self.position
    }

    /// Borrows the next `count` bytes, failing with `NeedMoreData` if the
    /// source is shorter.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], BildError> {
        let end = self
            .position
            .checked_add(count)
            .filter(|&end| end <= self.source.len())
            .ok_or(BildError::NeedMoreData)?;
        let bytes = &self.source[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], BildError> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.read_bytes(N)?);
        Ok(array)
    }

    pub fn read_u8(&mut self) -> Result<u8, BildError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, BildError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, BildError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, BildError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_fields() {
        let data = [b'B', b'I', b'L', b'D', 1, 0, 0xFE, 0xFF, 0xFF, 0xFF, 7];
        let mut reader = BildStreamReader::new(&data);
        assert_eq!(reader.read_u32().unwrap(), 0x444C_4942);
        assert_eq!(reader.read_u16().unwrap(), 1);
        assert_eq!(reader.read_i32().unwrap(), -2);
        assert_eq!(reader.remaining(), 1);
        assert_eq!(reader.read_u8().unwrap(), 7);
        assert!(reader.remaining_data().is_empty());
    }

    #[test]
    fn test_short_source() {
        let data = [1u8, 2, 3];
        let mut reader = BildStreamReader::new(&data);
        assert!(matches!(reader.read_u32(), Err(BildError::NeedMoreData)));
        // a failed read does not move the cursor
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.read_bytes(3).unwrap(), &data);
        assert!(matches!(reader.read_bytes(usize::MAX), Err(BildError::NeedMoreData)));
    }
}
