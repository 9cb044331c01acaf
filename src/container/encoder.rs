use std::io::Write;
use std::time::Instant;

use log::{debug, info};

use crate::colour::{ColourSpace, Image};
use crate::container::header::{BildHeader, ChannelHeader, LevelHeader, validate_quality};
use crate::error::BildError;
use crate::huffman;
use crate::pack::pack_levels;
use crate::rle;
use crate::signal::Signal2D;
use crate::stream_writer::BildStreamWriter;
use crate::wavelet::{Levels2D, decompose_2d};

/// Encodes images into BILD containers at a fixed quality.
///
/// Quality 0 is lossless. Higher qualities quantize the detail subbands more
/// strongly and store the chroma at quarter resolution.
#[derive(Debug, Clone, Copy)]
pub struct BildEncoder {
    quality: u32,
}

impl BildEncoder {
    pub fn new(quality: u32) -> Result<Self, BildError> {
        validate_quality(quality)?;
        Ok(Self { quality })
    }

    pub fn quality(&self) -> u32 {
        self.quality
    }

    pub fn encode(&self, image: &Image) -> Result<Vec<u8>, BildError> {
        let mut destination = Vec::new();
        self.encode_to(image, &mut destination)?;
        Ok(destination)
    }

    /// Writes the container for `image` to `destination` and returns the
    /// number of bytes written.
    pub fn encode_to<W: Write>(&self, image: &Image, destination: W) -> Result<usize, BildError> {
        let width = u32::try_from(image.width()).map_err(|_| BildError::InvalidData)?;
        let height = u32::try_from(image.height()).map_err(|_| BildError::InvalidData)?;
        let header = BildHeader::new(width, height, self.quality)?;

        let start = Instant::now();
        let image = self.arrange_channels(image);
        info!("Colour transformation time: {:?}", start.elapsed());

        let start = Instant::now();
        let levels = image
            .channels()
            .iter()
            .map(|channel| decompose_2d(channel, self.quality))
            .collect::<Result<Vec<_>, _>>()?;
        info!("Decomposition time: {:?}", start.elapsed());

        let start = Instant::now();
        let mut writer = BildStreamWriter::new(destination);
        header.write(&mut writer)?;
        for (index, channel_levels) in levels.iter().enumerate() {
            write_channel(&mut writer, channel_levels, header.uses_rle(), index)?;
        }
        writer.flush()?;
        info!("Creating bitstream time: {:?}", start.elapsed());

        debug!(
            "Encoded {}x{} at quality {} into {} bytes",
            width,
            height,
            self.quality,
            writer.len()
        );
        Ok(writer.len())
    }

    /// Lossy qualities store YCbCr 4:1:1; lossless stores R, G - R, B - R.
    fn arrange_channels(&self, image: &Image) -> Image {
        let mut image = image.clone();
        if self.quality > 0 {
            image.transform_colour_space(ColourSpace::YCbCr411);
        } else {
            image.transform_colour_space(ColourSpace::Rgb);
            image.subtract_base_channel();
        }
        image
    }
}

fn write_channel<W: Write>(
    writer: &mut BildStreamWriter<W>,
    levels: &Levels2D,
    use_rle: bool,
    index: usize,
) -> Result<(), BildError> {
    let (packed, overflow) = pack_levels(levels);
    let packed_len = packed.len();
    let stage_input = if use_rle { rle::encode(&packed) } else { packed };
    let coded = huffman::encode(&stage_input)?;

    debug!(
        "Channel {}: {} levels, {} packed bytes, {} after RLE, {} coded bytes, {} overflow values",
        index,
        levels.level_count(),
        packed_len,
        stage_input.len(),
        coded.len(),
        overflow.len()
    );

    let channel = ChannelHeader {
        root_value: levels.root_value,
        level_count: levels.level_count() as u32,
        width: size_field(levels.width)?,
        height: size_field(levels.height)?,
        coded_size: size_field(coded.len())?,
        overflow_count: size_field(overflow.len())?,
    };
    channel.write(writer)?;
    for level in &levels.levels {
        LevelHeader::from_level(level).write(writer)?;
    }
    writer.write_bytes(&coded)?;
    for &value in overflow.values() {
        writer.write_i32(value)?;
    }
    Ok(())
}

fn size_field(value: usize) -> Result<u32, BildError> {
    u32::try_from(value).map_err(|_| BildError::InvalidData)
}

/// Encodes a single plane as a standalone channel record, the unit the
/// container repeats for every channel.
pub fn encode_plane(plane: &Signal2D, quality: u32) -> Result<Vec<u8>, BildError> {
    validate_quality(quality)?;
    let levels = decompose_2d(plane, quality)?;
    let mut writer = BildStreamWriter::new(Vec::new());
    write_channel(&mut writer, &levels, quality > crate::constants::RLE_QUALITY_THRESHOLD, 0)?;
    Ok(writer.into_inner())
}
