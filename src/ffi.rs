//! C Foreign Function Interface for bild-rs.
//!
//! Decoding goes through an opaque handle so the header can be inspected
//! before the caller allocates the pixel buffer. Pixels are interleaved
//! 8-bit RGB on both sides.

use std::os::raw::{c_int, c_uchar};
use std::ptr;

use crate::container::{BildDecoder, BildEncoder, BildHeader};
use crate::error::BildError;
use crate::colour::Image;

/// Opaque decoder handle.
#[repr(C)]
pub struct BildDecoderHandle {
    _private: [u8; 0],
}

/// Container information.
#[repr(C)]
pub struct BildImageInfo {
    pub width: u32,
    pub height: u32,
    pub quality: u32,
    pub version: u32,
}

/// Error codes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BildErrorCode {
    Ok = 0,
    InvalidData = 1,
    BufferTooSmall = 2,
    InvalidParameter = 3,
    NotBildFile = 4,
    InternalError = 5,
}

impl From<&BildError> for BildErrorCode {
    fn from(error: &BildError) -> Self {
        match error {
            BildError::NotBildFile | BildError::VersionMismatch { .. } => Self::NotBildFile,
            BildError::InvalidQuality(_) | BildError::InvalidDimensions { .. } => {
                Self::InvalidParameter
            }
            BildError::Io(_) => Self::InternalError,
            _ => Self::InvalidData,
        }
    }
}

struct DecoderState {
    data: Vec<u8>,
    header: Option<BildHeader>,
}

/// Create a new decoder from a BILD container.
///
/// # Safety
/// `data` must be a valid pointer to `len` bytes.
#[unsafe(no_mangle)]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub unsafe extern "C" fn bild_decoder_new(data: *const c_uchar, len: usize) -> *mut BildDecoderHandle {
    if data.is_null() || len == 0 {
        return ptr::null_mut();
    }

    let slice = unsafe { std::slice::from_raw_parts(data, len) };
    let state = Box::new(DecoderState {
        data: slice.to_vec(),
        header: None,
    });
    Box::into_raw(state) as *mut BildDecoderHandle
}

/// Free a decoder handle.
///
/// # Safety
/// `decoder` must be a valid handle from `bild_decoder_new`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn bild_decoder_free(decoder: *mut BildDecoderHandle) {
    if !decoder.is_null() {
        let _ = unsafe { Box::from_raw(decoder as *mut DecoderState) };
    }
}

/// Read the container header.
///
/// # Safety
/// `decoder` must be valid. `info` must point to a valid `BildImageInfo`.
#[unsafe(no_mangle)]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub unsafe extern "C" fn bild_decoder_read_header(
    decoder: *mut BildDecoderHandle,
    info: *mut BildImageInfo,
) -> c_int {
    if decoder.is_null() || info.is_null() {
        return BildErrorCode::InvalidParameter as c_int;
    }

    let state = unsafe { &mut *(decoder as *mut DecoderState) };
    let header = match BildDecoder::new(&state.data).read_header() {
        Ok(header) => header,
        Err(e) => return BildErrorCode::from(&e) as c_int,
    };
    state.header = Some(header);

    unsafe {
        *info = BildImageInfo {
            width: header.width,
            height: header.height,
            quality: header.quality,
            version: header.version as u32,
        };
    }
    BildErrorCode::Ok as c_int
}

/// Decode the container into interleaved RGB pixels. `output_len` must be at
/// least `width * height * 3`.
///
/// # Safety
/// `decoder` must be valid. `output` must point to `output_len` writable bytes.
#[unsafe(no_mangle)]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub unsafe extern "C" fn bild_decoder_decode(
    decoder: *mut BildDecoderHandle,
    output: *mut c_uchar,
    output_len: usize,
) -> c_int {
    if decoder.is_null() || output.is_null() {
        return BildErrorCode::InvalidParameter as c_int;
    }

    let state = unsafe { &mut *(decoder as *mut DecoderState) };
    if let Some(header) = state.header {
        if (header.raw_size() as usize) > output_len {
            return BildErrorCode::BufferTooSmall as c_int;
        }
    }

    let image = match BildDecoder::new(&state.data).decode() {
        Ok(image) => image,
        Err(e) => return BildErrorCode::from(&e) as c_int,
    };
    let pixels = image.to_rgb8();
    if pixels.len() > output_len {
        return BildErrorCode::BufferTooSmall as c_int;
    }

    let output_slice = unsafe { std::slice::from_raw_parts_mut(output, output_len) };
    output_slice[..pixels.len()].copy_from_slice(&pixels);
    BildErrorCode::Ok as c_int
}

/// Encode interleaved RGB pixels into a BILD container.
///
/// # Safety
/// `pixels` must point to `width * height * 3` bytes, `output` to
/// `output_len` writable bytes and `bytes_written` to a writable `usize`.
#[unsafe(no_mangle)]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub unsafe extern "C" fn bild_encode(
    pixels: *const c_uchar,
    width: u32,
    height: u32,
    quality: u32,
    output: *mut c_uchar,
    output_len: usize,
    bytes_written: *mut usize,
) -> c_int {
    if pixels.is_null() || output.is_null() || bytes_written.is_null() {
        return BildErrorCode::InvalidParameter as c_int;
    }

    let pixel_len = width as usize * height as usize * 3;
    let pixels_slice = unsafe { std::slice::from_raw_parts(pixels, pixel_len) };

    let coded = match Image::from_rgb8(width, height, pixels_slice)
        .and_then(|image| BildEncoder::new(quality)?.encode(&image))
    {
        Ok(coded) => coded,
        Err(e) => return BildErrorCode::from(&e) as c_int,
    };
    if coded.len() > output_len {
        return BildErrorCode::BufferTooSmall as c_int;
    }

    let output_slice = unsafe { std::slice::from_raw_parts_mut(output, output_len) };
    output_slice[..coded.len()].copy_from_slice(&coded);
    unsafe { *bytes_written = coded.len() };
    BildErrorCode::Ok as c_int
}
