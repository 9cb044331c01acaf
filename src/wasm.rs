//! WebAssembly bindings for bild-rs.
//!
//! Pixels cross the boundary as interleaved 8-bit RGB `Uint8Array`s.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Container information returned from the WASM API.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub quality: u32,
    pub version: u32,
}

/// Encode RGB pixels into a BILD container.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn encode_bild(pixels: &[u8], width: u32, height: u32, quality: u32) -> Result<Vec<u8>, JsValue> {
    let image = crate::Image::from_rgb8(width, height, pixels)
        .map_err(|e| JsValue::from_str(&format!("Image error: {}", e)))?;
    crate::container::encode(&image, quality)
        .map_err(|e| JsValue::from_str(&format!("Encode error: {}", e)))
}

/// Decode a BILD container to RGB pixels.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn decode_bild(data: &[u8]) -> Result<Vec<u8>, JsValue> {
    let image = crate::container::decode(data)
        .map_err(|e| JsValue::from_str(&format!("Decode error: {}", e)))?;
    Ok(image.to_rgb8())
}

/// Read the container header without decoding the channels.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn get_image_info(data: &[u8]) -> Result<ImageInfo, JsValue> {
    let header = crate::BildDecoder::new(data)
        .read_header()
        .map_err(|e| JsValue::from_str(&format!("Header error: {}", e)))?;
    Ok(ImageInfo {
        width: header.width,
        height: header.height,
        quality: header.quality,
        version: header.version as u32,
    })
}
