//! Integer Haar wavelet engine.
//!
//! - `haar`: the forward/inverse butterfly.
//! - `quantization`: shift based quantizer and the per-level schedule.
//! - `decomposition`: recursive Mallat decomposition and reconstruction of
//!   1D and 2D sample planes.

pub mod decomposition;
pub mod haar;
pub mod quantization;

pub use decomposition::{
    Level1D, Level2D, Levels1D, Levels2D, decompose_1d, decompose_2d, level_count,
    reconstruct_1d, reconstruct_2d,
};
