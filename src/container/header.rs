//! BILD container headers.
//!
//! ```text
//! file header     magic u32 | version u16 | width u32 | height u32 | quality u32
//! channel header  root i32 | level count u32 | width u32 | height u32
//!                 | coded size u32 | overflow count u32
//! level header    LH w/h | HL w/h | HH w/h | LL w/h   (u32 each)
//! ```
//!
//! All fields are little-endian without padding.

use std::io::Write;

use crate::colour::ColourSpace;
use crate::constants::{
    BILD_MAGIC, BILD_VERSION, FILE_HEADER_SIZE_IN_BYTES, MAX_QUALITY, MIN_QUALITY,
    RLE_QUALITY_THRESHOLD,
};
use crate::error::BildError;
use crate::stream_reader::BildStreamReader;
use crate::stream_writer::BildStreamWriter;
use crate::wavelet::{Level2D, Levels2D};

pub fn validate_quality(quality: u32) -> Result<(), BildError> {
    if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
        return Err(BildError::InvalidQuality(quality));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BildHeader {
    pub version: u16,
    pub width: u32,
    pub height: u32,
    pub quality: u32,
}

impl BildHeader {
    pub fn new(width: u32, height: u32, quality: u32) -> Result<Self, BildError> {
        validate_quality(quality)?;
        if width == 0 || height == 0 {
            return Err(BildError::InvalidDimensions { width, height });
        }
        Ok(Self {
            version: BILD_VERSION,
            width,
            height,
            quality,
        })
    }

    /// Reads the header fields as stored, checking only the magic number.
    /// The version and image parameters are returned without validation.
    pub fn read_fields(reader: &mut BildStreamReader) -> Result<Self, BildError> {
        if reader.remaining() < FILE_HEADER_SIZE_IN_BYTES || reader.read_u32()? != BILD_MAGIC {
            return Err(BildError::NotBildFile);
        }
        Ok(Self {
            version: reader.read_u16()?,
            width: reader.read_u32()?,
            height: reader.read_u32()?,
            quality: reader.read_u32()?,
        })
    }

    /// Reads and validates a file header.
    pub fn read(reader: &mut BildStreamReader) -> Result<Self, BildError> {
        let header = Self::read_fields(reader)?;
        if header.version != BILD_VERSION {
            return Err(BildError::VersionMismatch {
                found: header.version,
                expected: BILD_VERSION,
            });
        }
        Self::new(header.width, header.height, header.quality)
    }

    pub fn write<W: Write>(&self, writer: &mut BildStreamWriter<W>) -> Result<(), BildError> {
        writer.write_u32(BILD_MAGIC)?;
        writer.write_u16(self.version)?;
        writer.write_u32(self.width)?;
        writer.write_u32(self.height)?;
        writer.write_u32(self.quality)?;
        Ok(())
    }

    /// Size of the image as 24-bit RGB.
    pub fn raw_size(&self) -> u64 {
        self.width as u64 * self.height as u64 * 3
    }

    pub fn uses_rle(&self) -> bool {
        self.quality > RLE_QUALITY_THRESHOLD
    }

    /// Colour space the channels are stored in.
    pub fn colour_space(&self) -> ColourSpace {
        if self.quality > 0 {
            ColourSpace::YCbCr411
        } else {
            ColourSpace::Rgb
        }
    }

    pub fn channel_dimensions(&self, channel: usize) -> (usize, usize) {
        self.colour_space()
            .channel_dimensions(channel, self.width as usize, self.height as usize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelHeader {
    pub root_value: i32,
    pub level_count: u32,
    pub width: u32,
    pub height: u32,
    pub coded_size: u32,
    pub overflow_count: u32,
}

impl ChannelHeader {
    pub fn read(reader: &mut BildStreamReader) -> Result<Self, BildError> {
        Ok(Self {
            root_value: reader.read_i32()?,
            level_count: reader.read_u32()?,
            width: reader.read_u32()?,
            height: reader.read_u32()?,
            coded_size: reader.read_u32()?,
            overflow_count: reader.read_u32()?,
        })
    }

    pub fn write<W: Write>(&self, writer: &mut BildStreamWriter<W>) -> Result<(), BildError> {
        writer.write_i32(self.root_value)?;
        writer.write_u32(self.level_count)?;
        writer.write_u32(self.width)?;
        writer.write_u32(self.height)?;
        writer.write_u32(self.coded_size)?;
        writer.write_u32(self.overflow_count)?;
        Ok(())
    }

    /// Level hierarchy implied by the channel dimensions, checked against
    /// the declared level count.
    pub fn levels(&self) -> Result<Levels2D, BildError> {
        let mut levels = Levels2D::with_geometry(self.width as usize, self.height as usize);
        if levels.level_count() != self.level_count as usize {
            return Err(BildError::InvalidHeader);
        }
        levels.root_value = self.root_value;
        Ok(levels)
    }
}

/// Subband dimensions of one level, as `(width, height)` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelHeader {
    pub lh: (u32, u32),
    pub hl: (u32, u32),
    pub hh: (u32, u32),
    pub ll: (u32, u32),
}

impl LevelHeader {
    pub fn from_level(level: &Level2D) -> Self {
        let dimensions = |w: usize, h: usize| (w as u32, h as u32);
        Self {
            lh: dimensions(level.lh.width(), level.lh.height()),
            hl: dimensions(level.hl.width(), level.hl.height()),
            hh: dimensions(level.hh.width(), level.hh.height()),
            ll: dimensions(level.ll_width, level.ll_height),
        }
    }

    pub fn read(reader: &mut BildStreamReader) -> Result<Self, BildError> {
        let mut pair = || -> Result<(u32, u32), BildError> { Ok((reader.read_u32()?, reader.read_u32()?)) };
        Ok(Self {
            lh: pair()?,
            hl: pair()?,
            hh: pair()?,
            ll: pair()?,
        })
    }

    pub fn write<W: Write>(&self, writer: &mut BildStreamWriter<W>) -> Result<(), BildError> {
        for (width, height) in [self.lh, self.hl, self.hh, self.ll] {
            writer.write_u32(width)?;
            writer.write_u32(height)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(header: &BildHeader) -> Vec<u8> {
        let mut writer = BildStreamWriter::new(Vec::new());
        header.write(&mut writer).unwrap();
        writer.into_inner()
    }

    #[test]
    fn test_file_header_layout() {
        let header = BildHeader::new(640, 480, 4).unwrap();
        let bytes = header_bytes(&header);
        assert_eq!(bytes.len(), FILE_HEADER_SIZE_IN_BYTES);
        assert_eq!(&bytes[..4], b"BILD");
        assert_eq!(&bytes[4..6], &[1, 0]);
        assert_eq!(&bytes[6..10], &640u32.to_le_bytes());

        let read = BildHeader::read(&mut BildStreamReader::new(&bytes)).unwrap();
        assert_eq!(read, header);
        assert_eq!(read.raw_size(), 640 * 480 * 3);
        assert!(read.uses_rle());
        assert_eq!(read.colour_space(), ColourSpace::YCbCr411);
    }

    #[test]
    fn test_rejects_foreign_data() {
        let mut bytes = header_bytes(&BildHeader::new(8, 8, 0).unwrap());
        bytes[0] = b'X';
        assert!(matches!(
            BildHeader::read(&mut BildStreamReader::new(&bytes)),
            Err(BildError::NotBildFile)
        ));
        assert!(matches!(
            BildHeader::read(&mut BildStreamReader::new(b"BILD")),
            Err(BildError::NotBildFile)
        ));
    }

    #[test]
    fn test_rejects_other_version() {
        let mut bytes = header_bytes(&BildHeader::new(8, 8, 0).unwrap());
        bytes[4] = 2;
        assert!(matches!(
            BildHeader::read(&mut BildStreamReader::new(&bytes)),
            Err(BildError::VersionMismatch { found: 2, expected: 1 })
        ));
    }

    #[test]
    fn test_fields_of_other_version() {
        let mut bytes = header_bytes(&BildHeader::new(8, 6, 3).unwrap());
        bytes[4] = 2;
        let header = BildHeader::read_fields(&mut BildStreamReader::new(&bytes)).unwrap();
        assert_eq!(
            header,
            BildHeader {
                version: 2,
                width: 8,
                height: 6,
                quality: 3
            }
        );

        bytes[0] = b'X';
        assert!(matches!(
            BildHeader::read_fields(&mut BildStreamReader::new(&bytes)),
            Err(BildError::NotBildFile)
        ));
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(matches!(BildHeader::new(8, 8, 8), Err(BildError::InvalidQuality(8))));
        assert!(matches!(
            BildHeader::new(0, 8, 1),
            Err(BildError::InvalidDimensions { width: 0, height: 8 })
        ));

        let mut bytes = header_bytes(&BildHeader::new(8, 8, 7).unwrap());
        bytes[14] = 9;
        assert!(BildHeader::read(&mut BildStreamReader::new(&bytes)).is_err());
    }

    #[test]
    fn test_rle_threshold() {
        assert!(!BildHeader::new(1, 1, 2).unwrap().uses_rle());
        assert!(BildHeader::new(1, 1, 3).unwrap().uses_rle());
        assert_eq!(BildHeader::new(1, 1, 0).unwrap().colour_space(), ColourSpace::Rgb);
    }

    #[test]
    fn test_level_header_roundtrip() {
        let levels = Levels2D::with_geometry(5, 3);
        let header = LevelHeader::from_level(&levels.levels[0]);
        assert_eq!(header.lh, (2, 2));
        assert_eq!(header.hl, (3, 1));
        assert_eq!(header.hh, (2, 1));
        assert_eq!(header.ll, (3, 2));

        let mut writer = BildStreamWriter::new(Vec::new());
        header.write(&mut writer).unwrap();
        let bytes = writer.into_inner();
        assert_eq!(bytes.len(), crate::constants::LEVEL_HEADER_SIZE_IN_BYTES);
        assert_eq!(LevelHeader::read(&mut BildStreamReader::new(&bytes)).unwrap(), header);
    }

    #[test]
    fn test_channel_header_level_count() {
        let mut channel = ChannelHeader {
            root_value: -3,
            level_count: 3,
            width: 5,
            height: 3,
            coded_size: 0,
            overflow_count: 0,
        };
        let levels = channel.levels().unwrap();
        assert_eq!(levels.root_value, -3);
        channel.level_count = 2;
        assert!(matches!(channel.levels(), Err(BildError::InvalidHeader)));
    }
}
