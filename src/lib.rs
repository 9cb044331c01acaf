//! BILD: wavelet based image compression.
//!
//! Images are split into three channels, each decomposed with a multi-level
//! Haar transform whose detail subbands are quantized according to the
//! chosen quality. The coefficients are packed into bytes (with an overflow
//! side channel for large values), optionally run-length coded and finally
//! Huffman coded into a BILD container.
//!
//! ```no_run
//! use bild_rs::{Image, container};
//!
//! # fn main() -> Result<(), bild_rs::BildError> {
//! let image = Image::from_rgb8(2, 1, &[255, 0, 0, 0, 0, 255])?;
//! let coded = container::encode(&image, 0)?;
//! let decoded = container::decode(&coded)?;
//! assert_eq!(decoded.to_rgb8(), image.to_rgb8());
//! # Ok(())
//! # }
//! ```

pub mod bit_io;
pub mod colour;
pub mod constants;
pub mod container;
pub mod error;
pub mod huffman;
pub mod pack;
pub mod rle;
pub mod signal;
pub mod stream_reader;
pub mod stream_writer;
pub mod wavelet;

#[cfg(feature = "ffi")]
pub mod ffi;
#[cfg(feature = "wasm")]
pub mod wasm;

pub use colour::{ColourSpace, Image};
pub use container::{
    BildDecoder, BildEncoder, BildHeader, compress_to_file, decompress_file, read_file_info,
};
pub use error::BildError;
pub use signal::{Signal1D, Signal2D};
