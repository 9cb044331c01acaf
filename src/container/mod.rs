//! BILD container encoding and decoding.
//!
//! A container holds a file header followed by three channel records. Each
//! record carries the level geometry of its channel, the Huffman coded
//! coefficient stream (run-length coded first above quality 2) and the
//! coefficients that did not fit in a byte.

pub mod decoder;
pub mod encoder;
pub mod header;

pub use decoder::{BildDecoder, decode_plane};
pub use encoder::{BildEncoder, encode_plane};
pub use header::{BildHeader, ChannelHeader, LevelHeader};

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use log::debug;

use crate::colour::Image;
use crate::constants::FILE_HEADER_SIZE_IN_BYTES;
use crate::error::BildError;
use crate::stream_reader::BildStreamReader;

pub fn encode(image: &Image, quality: u32) -> Result<Vec<u8>, BildError> {
    BildEncoder::new(quality)?.encode(image)
}

pub fn decode(source: &[u8]) -> Result<Image, BildError> {
    BildDecoder::new(source).decode()
}

/// Encodes `image` into the file at `path`, returning the container size.
pub fn compress_to_file<P: AsRef<Path>>(
    image: &Image,
    path: P,
    quality: u32,
) -> Result<usize, BildError> {
    let encoder = BildEncoder::new(quality)?;
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    let written = encoder.encode_to(image, &mut writer)?;
    writer.flush()?;
    debug!("Wrote {} bytes to {}", written, path.as_ref().display());
    Ok(written)
}

pub fn decompress_file<P: AsRef<Path>>(path: P) -> Result<Image, BildError> {
    let source = std::fs::read(path.as_ref())?;
    debug!("Read {} bytes from {}", source.len(), path.as_ref().display());
    decode(&source)
}

/// Reads only the file header of the container at `path`. The version is
/// reported as stored, so containers from other format versions can still be
/// identified.
pub fn read_file_info<P: AsRef<Path>>(path: P) -> Result<BildHeader, BildError> {
    let mut source = Vec::with_capacity(FILE_HEADER_SIZE_IN_BYTES);
    File::open(path)?
        .take(FILE_HEADER_SIZE_IN_BYTES as u64)
        .read_to_end(&mut source)?;
    BildHeader::read_fields(&mut BildStreamReader::new(&source))
}
