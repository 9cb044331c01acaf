//! Sample planes.
//!
//! `Signal1D` and `Signal2D` are dense `i32` containers with a sequential
//! write cursor. The wavelet engine fills subbands through `push` in one pass
//! and reads them back in the next pass through a [`SampleReader`].

use crate::error::BildError;

/// Sequential read cursor over the samples of a plane.
#[derive(Debug, Clone)]
pub struct SampleReader<'a> {
    data: &'a [i32],
    position: usize,
}

impl<'a> SampleReader<'a> {
    pub fn new(data: &'a [i32]) -> Self {
        Self { data, position: 0 }
    }

    /// Reads the value at the cursor and advances it.
    #[inline]
    pub fn next_sample(&mut self) -> i32 {
        let value = self.data[self.position];
        self.position += 1;
        value
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }
}

/// A one dimensional sample plane.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signal1D {
    data: Vec<i32>,
    position: usize,
}

impl Signal1D {
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size],
            position: 0,
        }
    }

    pub fn from_vec(data: Vec<i32>) -> Self {
        Self { data, position: 0 }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[i32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [i32] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<i32> {
        self.data
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Writes `value` at the cursor and advances it.
    pub fn push(&mut self, value: i32) {
        self.data[self.position] = value;
        self.position += 1;
    }

    pub fn reader(&self) -> SampleReader<'_> {
        SampleReader::new(&self.data)
    }

    pub fn rewind(&mut self) {
        self.position = 0;
    }

    pub fn add(&mut self, other: &Signal1D) {
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a = a.wrapping_add(*b);
        }
    }

    pub fn sub(&mut self, other: &Signal1D) {
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a = a.wrapping_sub(*b);
        }
    }
}

/// A two dimensional, row-major sample plane.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signal2D {
    width: usize,
    height: usize,
    data: Vec<i32>,
    position: usize,
}

impl Signal2D {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
            position: 0,
        }
    }

    /// Wraps row-major samples, failing if `data` does not hold exactly
    /// `width * height` values.
    pub fn from_vec(width: usize, height: usize, data: Vec<i32>) -> Result<Self, BildError> {
        if width.checked_mul(height) != Some(data.len()) {
            return Err(BildError::InvalidDimensions {
                width: width as u32,
                height: height as u32,
            });
        }
        Ok(Self {
            width,
            height,
            data,
            position: 0,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[i32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [i32] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<i32> {
        self.data
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn push(&mut self, value: i32) {
        self.data[self.position] = value;
        self.position += 1;
    }

    pub fn reader(&self) -> SampleReader<'_> {
        SampleReader::new(&self.data)
    }

    pub fn rewind(&mut self) {
        self.position = 0;
    }

    pub fn add(&mut self, other: &Signal2D) {
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a = a.wrapping_add(*b);
        }
    }

    pub fn sub(&mut self, other: &Signal2D) {
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a = a.wrapping_sub(*b);
        }
    }

    /// Replaces every 2x2 block by its mean.
    ///
    /// A trailing odd column averages its vertical pair, a trailing odd row
    /// its horizontal pair, and an odd corner is copied. The result is
    /// `ceil(w/2) x ceil(h/2)`.
    pub fn downsample2(&self) -> Signal2D {
        let (w, h) = (self.width, self.height);
        let mut result = Signal2D::new(w.div_ceil(2), h.div_ceil(2));

        for y in 0..h / 2 {
            let row0 = 2 * y * w;
            let row1 = row0 + w;
            for x in 0..w / 2 {
                let sum = self.data[row0 + 2 * x]
                    + self.data[row0 + 2 * x + 1]
                    + self.data[row1 + 2 * x]
                    + self.data[row1 + 2 * x + 1];
                result.push(sum >> 2);
            }
            if w % 2 == 1 {
                result.push((self.data[row0 + w - 1] + self.data[row1 + w - 1]) >> 1);
            }
        }

        if h % 2 == 1 {
            let row0 = (h - 1) * w;
            for x in 0..w / 2 {
                result.push((self.data[row0 + 2 * x] + self.data[row0 + 2 * x + 1]) >> 1);
            }
            if w % 2 == 1 {
                result.push(self.data[row0 + w - 1]);
            }
        }

        result.rewind();
        result
    }

    /// Inverse of [`downsample2`](Self::downsample2) by replication: each
    /// sample fills the 2x2 block (or edge pair) it was averaged from.
    pub fn upsample2(&self, target_width: usize, target_height: usize) -> Signal2D {
        let mut result = Signal2D::new(target_width, target_height);
        let source_width = target_width.div_ceil(2);

        for y in 0..target_height {
            for x in 0..target_width {
                let value = self.data[(y / 2) * source_width + x / 2];
                result.data[y * target_width + x] = value;
            }
        }
        result
    }
}
