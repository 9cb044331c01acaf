//! Mallat decomposition and reconstruction.
//!
//! Each level splits the current approximation plane into an approximation
//! (LL) of half the size, rounded up, and three detail subbands:
//!
//! ```text
//!  LL | LH        LH: horizontal detail
//!  ---+---        HL: vertical detail
//!  HL | HH        HH: diagonal detail
//! ```
//!
//! Levels are stored finest first. After the last level the approximation is
//! a single sample, the root value.

use log::debug;

use crate::error::BildError;
use crate::signal::{Signal1D, Signal2D};
use crate::wavelet::haar;
use crate::wavelet::quantization::{dequantize, level_strength, quantize};

/// Number of levels needed to shrink a `width x height` plane to one sample.
pub fn level_count(width: usize, height: usize) -> usize {
    width.max(height).max(1).next_power_of_two().trailing_zeros() as usize
}

/// One level of a 1D decomposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level1D {
    /// Size of the approximation produced at this level.
    pub l_size: usize,
    pub h: Signal1D,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Levels1D {
    pub root_value: i32,
    pub levels: Vec<Level1D>,
    pub size: usize,
}

impl Levels1D {
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}

fn decompose_level_1d(source: &Signal1D) -> (Signal1D, Level1D) {
    let samples = source.data();
    let size = samples.len();
    let mut l = Signal1D::new(size.div_ceil(2));
    let mut h = Signal1D::new(size / 2);

    for pair in samples.chunks_exact(2) {
        let (s, d) = haar::forward(pair[0], pair[1]);
        l.push(s);
        h.push(d);
    }
    if size % 2 == 1 {
        l.push(samples[size - 1]);
    }

    l.rewind();
    h.rewind();
    let level = Level1D { l_size: l.len(), h };
    (l, level)
}

/// Decomposes a 1D signal down to its root value.
pub fn decompose_1d(signal: &Signal1D) -> Result<Levels1D, BildError> {
    if signal.is_empty() {
        return Err(BildError::InvalidDimensions {
            width: 0,
            height: 1,
        });
    }

    let count = level_count(signal.len(), 1);
    let mut levels = Vec::with_capacity(count);
    let mut approximation: Option<Signal1D> = None;

    for _ in 0..count {
        let source = approximation.as_ref().unwrap_or(signal);
        let (l, level) = decompose_level_1d(source);
        levels.push(level);
        approximation = Some(l);
    }

    let root_value = approximation.as_ref().unwrap_or(signal).data()[0];
    Ok(Levels1D {
        root_value,
        levels,
        size: signal.len(),
    })
}

fn reconstruct_level_1d(l: &Signal1D, level: &Level1D, target_size: usize) -> Signal1D {
    let mut target = Signal1D::new(target_size);
    let mut l_reader = l.reader();
    let mut h_reader = level.h.reader();

    for _ in 0..target_size / 2 {
        let (s1, s2) = haar::inverse(l_reader.next_sample(), h_reader.next_sample());
        target.push(s1);
        target.push(s2);
    }
    if target_size % 2 == 1 {
        target.push(l_reader.next_sample());
    }

    target.rewind();
    target
}

pub fn reconstruct_1d(levels: &Levels1D) -> Signal1D {
    let mut approximation = Signal1D::from_vec(vec![levels.root_value]);

    for index in (0..levels.levels.len()).rev() {
        let target_size = if index == 0 {
            levels.size
        } else {
            levels.levels[index - 1].l_size
        };
        approximation = reconstruct_level_1d(&approximation, &levels.levels[index], target_size);
    }
    approximation
}

/// One level of a 2D decomposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level2D {
    /// Dimensions of the approximation produced at this level.
    pub ll_width: usize,
    pub ll_height: usize,
    pub lh: Signal2D,
    pub hl: Signal2D,
    pub hh: Signal2D,
}

impl Level2D {
    pub fn new(ll_width: usize, ll_height: usize, lh: Signal2D, hl: Signal2D, hh: Signal2D) -> Self {
        Self {
            ll_width,
            ll_height,
            lh,
            hl,
            hh,
        }
    }

    /// Allocates the zeroed subbands of a level decomposing a
    /// `source_width x source_height` approximation.
    pub fn for_source(source_width: usize, source_height: usize) -> Self {
        let (w0, h0) = (source_width / 2, source_height / 2);
        let (w1, h1) = (source_width.div_ceil(2), source_height.div_ceil(2));
        Self::new(
            w1,
            h1,
            Signal2D::new(w0, h1),
            Signal2D::new(w1, h0),
            Signal2D::new(w0, h0),
        )
    }

    /// Detail subbands in coding order.
    pub fn subbands(&self) -> [&Signal2D; 3] {
        [&self.lh, &self.hl, &self.hh]
    }

    pub fn subbands_mut(&mut self) -> [&mut Signal2D; 3] {
        [&mut self.lh, &mut self.hl, &mut self.hh]
    }

    pub fn detail_len(&self) -> usize {
        self.lh.len() + self.hl.len() + self.hh.len()
    }

    fn rewind(&mut self) {
        self.lh.rewind();
        self.hl.rewind();
        self.hh.rewind();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Levels2D {
    pub root_value: i32,
    pub levels: Vec<Level2D>,
    pub width: usize,
    pub height: usize,
}

impl Levels2D {
    /// Allocates the level hierarchy of a `width x height` plane with zeroed
    /// subbands, ready to be filled by a decoder.
    pub fn with_geometry(width: usize, height: usize) -> Self {
        let count = level_count(width, height);
        let mut levels = Vec::with_capacity(count);
        let (mut w, mut h) = (width, height);
        for _ in 0..count {
            let level = Level2D::for_source(w, h);
            w = level.ll_width;
            h = level.ll_height;
            levels.push(level);
        }
        Self {
            root_value: 0,
            levels,
            width,
            height,
        }
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Total number of detail coefficients over all levels.
    pub fn detail_len(&self) -> usize {
        self.levels.iter().map(Level2D::detail_len).sum()
    }
}

fn decompose_level_2d(source: &Signal2D, strength: u32) -> (Signal2D, Level2D) {
    let (w, h) = (source.width(), source.height());
    let samples = source.data();
    let mut level = Level2D::for_source(w, h);
    let mut ll = Signal2D::new(level.ll_width, level.ll_height);

    for y in 0..h / 2 {
        let row0 = &samples[2 * y * w..(2 * y + 1) * w];
        let row1 = &samples[(2 * y + 1) * w..(2 * y + 2) * w];

        for x in 0..w / 2 {
            let (s0, d0) = haar::forward(row0[2 * x], row0[2 * x + 1]);
            let (s1, d1) = haar::forward(row1[2 * x], row1[2 * x + 1]);
            let (ll_value, hl_value) = haar::forward(s0, s1);
            let (lh_value, hh_value) = haar::forward(d0, d1);

            ll.push(ll_value);
            level.hl.push(quantize(hl_value, strength));
            level.lh.push(quantize(lh_value, strength));
            level.hh.push(quantize(hh_value, strength));
        }

        if w % 2 == 1 {
            let (ll_value, hl_value) = haar::forward(row0[w - 1], row1[w - 1]);
            ll.push(ll_value);
            level.hl.push(quantize(hl_value, strength));
        }
    }

    if h % 2 == 1 {
        let row0 = &samples[(h - 1) * w..h * w];
        for x in 0..w / 2 {
            let (ll_value, lh_value) = haar::forward(row0[2 * x], row0[2 * x + 1]);
            ll.push(ll_value);
            level.lh.push(quantize(lh_value, strength));
        }
        if w % 2 == 1 {
            ll.push(row0[w - 1]);
        }
    }

    ll.rewind();
    level.rewind();
    (ll, level)
}

/// Mallat decomposition of `signal`, quantizing the detail subbands of level
/// `i` with strength `max(quality - i, 0)`.
pub fn decompose_2d(signal: &Signal2D, quality: u32) -> Result<Levels2D, BildError> {
    if signal.is_empty() {
        return Err(BildError::InvalidDimensions {
            width: signal.width() as u32,
            height: signal.height() as u32,
        });
    }

    let count = level_count(signal.width(), signal.height());
    let mut levels = Vec::with_capacity(count);
    let mut approximation: Option<Signal2D> = None;

    for index in 0..count {
        let source = approximation.as_ref().unwrap_or(signal);
        let (ll, level) = decompose_level_2d(source, level_strength(quality, index));
        levels.push(level);
        approximation = Some(ll);
    }

    let root_value = approximation.as_ref().unwrap_or(signal).data()[0];
    debug!(
        "decomposed {}x{} plane into {} levels, root {}",
        signal.width(),
        signal.height(),
        count,
        root_value
    );

    Ok(Levels2D {
        root_value,
        levels,
        width: signal.width(),
        height: signal.height(),
    })
}

fn reconstruct_level_2d(
    ll: &Signal2D,
    level: &Level2D,
    target_width: usize,
    target_height: usize,
    strength: u32,
) -> Signal2D {
    let mut target = Signal2D::new(target_width, target_height);
    let w = target_width;
    let out = target.data_mut();

    let mut ll_reader = ll.reader();
    let mut lh_reader = level.lh.reader();
    let mut hl_reader = level.hl.reader();
    let mut hh_reader = level.hh.reader();

    for y in 0..target_height / 2 {
        let row0 = 2 * y * w;
        let row1 = row0 + w;

        for x in 0..w / 2 {
            let (s0, s1) = haar::inverse(
                ll_reader.next_sample(),
                dequantize(hl_reader.next_sample(), strength),
            );
            let (d0, d1) = haar::inverse(
                dequantize(lh_reader.next_sample(), strength),
                dequantize(hh_reader.next_sample(), strength),
            );
            (out[row0 + 2 * x], out[row0 + 2 * x + 1]) = haar::inverse(s0, d0);
            (out[row1 + 2 * x], out[row1 + 2 * x + 1]) = haar::inverse(s1, d1);
        }

        if w % 2 == 1 {
            (out[row0 + w - 1], out[row1 + w - 1]) = haar::inverse(
                ll_reader.next_sample(),
                dequantize(hl_reader.next_sample(), strength),
            );
        }
    }

    if target_height % 2 == 1 {
        let row0 = (target_height - 1) * w;
        for x in 0..w / 2 {
            (out[row0 + 2 * x], out[row0 + 2 * x + 1]) = haar::inverse(
                ll_reader.next_sample(),
                dequantize(lh_reader.next_sample(), strength),
            );
        }
        if w % 2 == 1 {
            out[row0 + w - 1] = ll_reader.next_sample();
        }
    }

    target
}

/// Rebuilds the full resolution plane from `levels`, walking coarsest to
/// finest. `quality` must be the value the levels were decomposed with.
pub fn reconstruct_2d(levels: &Levels2D, quality: u32) -> Signal2D {
    let mut approximation = Signal2D::new(1, 1);
    approximation.push(levels.root_value);

    for index in (0..levels.levels.len()).rev() {
        let (target_width, target_height) = if index == 0 {
            (levels.width, levels.height)
        } else {
            let finer = &levels.levels[index - 1];
            (finer.ll_width, finer.ll_height)
        };
        approximation = reconstruct_level_2d(
            &approximation,
            &levels.levels[index],
            target_width,
            target_height,
            level_strength(quality, index),
        );
    }

    approximation.rewind();
    approximation
}
