use std::time::Instant;

use log::{debug, info};

use crate::colour::{ColourSpace, Image};
use crate::constants::{CHANNEL_COUNT, RLE_QUALITY_THRESHOLD};
use crate::container::header::{BildHeader, ChannelHeader, LevelHeader, validate_quality};
use crate::error::BildError;
use crate::huffman;
use crate::pack::{OverflowBuffer, unpack_levels};
use crate::rle;
use crate::signal::Signal2D;
use crate::stream_reader::BildStreamReader;
use crate::wavelet::{Levels2D, reconstruct_2d};

pub struct BildDecoder<'a> {
    reader: BildStreamReader<'a>,
    header: Option<BildHeader>,
}

impl<'a> BildDecoder<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            reader: BildStreamReader::new(source),
            header: None,
        }
    }

    pub fn read_header(&mut self) -> Result<BildHeader, BildError> {
        if let Some(header) = self.header {
            return Ok(header);
        }
        let header = BildHeader::read(&mut self.reader)?;
        self.header = Some(header);
        Ok(header)
    }

    pub fn header(&self) -> Option<BildHeader> {
        self.header
    }

    /// Decodes the container into an RGB image.
    pub fn decode(&mut self) -> Result<Image, BildError> {
        let header = self.read_header()?;

        let start = Instant::now();
        let mut channel_levels = Vec::with_capacity(CHANNEL_COUNT);
        for index in 0..CHANNEL_COUNT {
            let expected = header.channel_dimensions(index);
            channel_levels.push(read_channel(&mut self.reader, expected, header.uses_rle(), index)?);
        }
        info!("Reading and decoding bitstream time: {:?}", start.elapsed());

        let start = Instant::now();
        let channels = channel_levels
            .iter()
            .map(|levels| reconstruct_2d(levels, header.quality))
            .collect();
        info!("Reconstruction time: {:?}", start.elapsed());

        let colour_space = header.colour_space();
        let mut image = Image::from_channels(
            colour_space,
            header.width as usize,
            header.height as usize,
            channels,
        )?;

        let start = Instant::now();
        if colour_space == ColourSpace::Rgb {
            image.add_base_channel();
        } else {
            image.transform_colour_space(ColourSpace::Rgb);
        }
        info!("Colour transformation time: {:?}", start.elapsed());

        if self.reader.remaining() > 0 {
            debug!("Ignoring {} trailing bytes", self.reader.remaining());
        }
        Ok(image)
    }
}

/// Reads one channel record and restores its coefficient hierarchy. Every
/// declared size is checked against the expected geometry and the remaining
/// input before it is used.
fn read_channel(
    reader: &mut BildStreamReader,
    expected: (usize, usize),
    use_rle: bool,
    index: usize,
) -> Result<Levels2D, BildError> {
    let channel = ChannelHeader::read(reader)?;
    if (channel.width as usize, channel.height as usize) != expected {
        return Err(BildError::ChannelSizeMismatch);
    }

    let mut levels = channel.levels()?;
    for (i, level) in levels.levels.iter().enumerate() {
        if LevelHeader::read(reader)? != LevelHeader::from_level(level) {
            return Err(BildError::InconsistentLevelHeader { level: i });
        }
    }

    let coded = reader.read_bytes(channel.coded_size as usize)?;
    let overflow_size = (channel.overflow_count as usize)
        .checked_mul(size_of::<i32>())
        .ok_or(BildError::NeedMoreData)?;
    let overflow = OverflowBuffer::from_vec(
        reader
            .read_bytes(overflow_size)?
            .chunks_exact(size_of::<i32>())
            .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
    );

    let detail_len = levels.detail_len();
    let packed = if use_rle {
        // run-length coding at most doubles the packed stream
        let run_coded = huffman::decode_with_limit(coded, detail_len.saturating_mul(2))?;
        rle::decode_with_limit(&run_coded, detail_len)?
    } else {
        huffman::decode_with_limit(coded, detail_len)?
    };

    debug!(
        "Channel {}: {} levels, {} coded bytes, {} packed bytes, {} overflow values",
        index,
        levels.level_count(),
        coded.len(),
        packed.len(),
        overflow.len()
    );

    unpack_levels(&packed, &overflow, &mut levels)?;
    Ok(levels)
}

/// Decodes a standalone channel record written by
/// [`encode_plane`](super::encode_plane).
pub fn decode_plane(
    source: &[u8],
    width: usize,
    height: usize,
    quality: u32,
) -> Result<Signal2D, BildError> {
    validate_quality(quality)?;
    let mut reader = BildStreamReader::new(source);
    let levels = read_channel(&mut reader, (width, height), quality > RLE_QUALITY_THRESHOLD, 0)?;
    Ok(reconstruct_2d(&levels, quality))
}
