//! Colour images and colour space conversions.
//!
//! An [`Image`] holds its samples as one [`Signal2D`] per channel. Samples are
//! plain `i32` so intermediate representations (signed chroma, channel
//! differences) need no clamping until the image is exported as 8-bit pixels.

use crate::error::BildError;
use crate::signal::Signal2D;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColourSpace {
    /// One luminance channel.
    Grayscale,
    Rgb,
    /// Luma at full resolution, chroma subsampled by two in both directions.
    YCbCr411,
}

impl ColourSpace {
    pub fn channel_count(self) -> usize {
        match self {
            ColourSpace::Grayscale => 1,
            ColourSpace::Rgb | ColourSpace::YCbCr411 => 3,
        }
    }

    /// Dimensions of `channel` for an image of `width x height`.
    pub fn channel_dimensions(self, channel: usize, width: usize, height: usize) -> (usize, usize) {
        match (self, channel) {
            (ColourSpace::YCbCr411, 1 | 2) => (width.div_ceil(2), height.div_ceil(2)),
            _ => (width, height),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    colour_space: ColourSpace,
    width: usize,
    height: usize,
    channels: Vec<Signal2D>,
}

impl Image {
    /// Creates a zero filled image.
    pub fn new(width: usize, height: usize, colour_space: ColourSpace) -> Self {
        let channels = (0..colour_space.channel_count())
            .map(|c| {
                let (w, h) = colour_space.channel_dimensions(c, width, height);
                Signal2D::new(w, h)
            })
            .collect();
        Self {
            colour_space,
            width,
            height,
            channels,
        }
    }

    /// Assembles an image from decoded planes, checking their number and
    /// dimensions against `colour_space`.
    pub fn from_channels(
        colour_space: ColourSpace,
        width: usize,
        height: usize,
        channels: Vec<Signal2D>,
    ) -> Result<Self, BildError> {
        if channels.len() != colour_space.channel_count() {
            return Err(BildError::ChannelSizeMismatch);
        }
        for (c, channel) in channels.iter().enumerate() {
            let expected = colour_space.channel_dimensions(c, width, height);
            if (channel.width(), channel.height()) != expected {
                return Err(BildError::ChannelSizeMismatch);
            }
        }
        Ok(Self {
            colour_space,
            width,
            height,
            channels,
        })
    }

    /// Wraps interleaved 8-bit RGB pixels.
    pub fn from_rgb8(width: u32, height: u32, pixels: &[u8]) -> Result<Self, BildError> {
        let pixel_count = checked_pixel_count(width, height, pixels.len(), 3)?;
        let mut image = Image::new(width as usize, height as usize, ColourSpace::Rgb);
        for (i, rgb) in pixels.chunks_exact(3).take(pixel_count).enumerate() {
            for (channel, &value) in image.channels.iter_mut().zip(rgb) {
                channel.data_mut()[i] = value as i32;
            }
        }
        Ok(image)
    }

    pub fn from_gray8(width: u32, height: u32, pixels: &[u8]) -> Result<Self, BildError> {
        checked_pixel_count(width, height, pixels.len(), 1)?;
        let data = pixels.iter().map(|&v| v as i32).collect();
        let plane = Signal2D::from_vec(width as usize, height as usize, data)?;
        Ok(Self {
            colour_space: ColourSpace::Grayscale,
            width: width as usize,
            height: height as usize,
            channels: vec![plane],
        })
    }

    pub fn colour_space(&self) -> ColourSpace {
        self.colour_space
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channels(&self) -> &[Signal2D] {
        &self.channels
    }

    /// Interleaved RGB pixels clipped to `0..=255`.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut rgb = self.clone();
        rgb.transform_colour_space(ColourSpace::Rgb);

        let [r, g, b] = [0, 1, 2].map(|c| rgb.channels[c].data());
        let mut pixels = Vec::with_capacity(self.width * self.height * 3);
        for i in 0..self.width * self.height {
            pixels.extend([clip(r[i]), clip(g[i]), clip(b[i])]);
        }
        pixels
    }

    /// Grayscale pixels clipped to `0..=255`.
    pub fn to_gray8(&self) -> Vec<u8> {
        let mut gray = self.clone();
        gray.transform_colour_space(ColourSpace::Grayscale);
        gray.channels[0].data().iter().map(|&v| clip(v)).collect()
    }

    /// Converts the image in place. Every pair of colour spaces is supported;
    /// conversions away from grayscale replicate the luminance.
    pub fn transform_colour_space(&mut self, target: ColourSpace) {
        use ColourSpace::*;

        match (self.colour_space, target) {
            (Grayscale, Grayscale) | (Rgb, Rgb) | (YCbCr411, YCbCr411) => return,
            (YCbCr411, Rgb) => self.ycbcr411_to_rgb(),
            (Rgb, YCbCr411) => self.rgb_to_ycbcr411(),
            (Rgb, Grayscale) => self.rgb_to_grayscale(),
            (YCbCr411, Grayscale) => self.channels.truncate(1),
            (Grayscale, Rgb) => self.grayscale_to_rgb(),
            (Grayscale, YCbCr411) => {
                self.grayscale_to_rgb();
                self.rgb_to_ycbcr411();
            }
        }
        self.colour_space = target;
    }

    fn rgb_to_ycbcr411(&mut self) {
        let [r, g, b] = self.rgb_planes_mut();
        for ((r, g), b) in r.iter_mut().zip(g.iter_mut()).zip(b.iter_mut()) {
            let (red, green, blue) = (*r, *g, *b);
            *r = ((red + (green << 1) + blue) >> 2) - 128;
            *g = red - green;
            *b = blue - green;
        }
        self.channels[1] = self.channels[1].downsample2();
        self.channels[2] = self.channels[2].downsample2();
    }

    fn ycbcr411_to_rgb(&mut self) {
        let (width, height) = (self.width, self.height);
        self.channels[1] = self.channels[1].upsample2(width, height);
        self.channels[2] = self.channels[2].upsample2(width, height);

        let [y, cb, cr] = self.rgb_planes_mut();
        for ((y, cb), cr) in y.iter_mut().zip(cb.iter_mut()).zip(cr.iter_mut()) {
            // decoded planes may hold arbitrary values
            let green = y
                .wrapping_sub(cb.wrapping_add(*cr) >> 2)
                .wrapping_add(128);
            *y = cb.wrapping_add(green);
            *cb = green;
            *cr = cr.wrapping_add(green);
        }
    }

    fn rgb_to_grayscale(&mut self) {
        let [r, g, b] = self.rgb_planes_mut();
        for ((r, g), b) in r.iter_mut().zip(g.iter()).zip(b.iter()) {
            *r = r
                .wrapping_mul(11)
                .wrapping_add(g.wrapping_mul(16))
                .wrapping_add(b.wrapping_mul(5))
                >> 5;
        }
        self.channels.truncate(1);
    }

    fn grayscale_to_rgb(&mut self) {
        let luminance = self.channels[0].clone();
        self.channels.push(luminance.clone());
        self.channels.push(luminance);
    }

    fn rgb_planes_mut(&mut self) -> [&mut [i32]; 3] {
        let (first, rest) = self.channels.split_at_mut(1);
        let (second, third) = rest.split_at_mut(1);
        [first[0].data_mut(), second[0].data_mut(), third[0].data_mut()]
    }

    /// Replaces G and B by their difference to R, the lossless channel
    /// arrangement.
    pub fn subtract_base_channel(&mut self) {
        let (base, rest) = self.channels.split_at_mut(1);
        for channel in rest {
            channel.sub(&base[0]);
        }
    }

    /// Inverse of [`subtract_base_channel`](Self::subtract_base_channel).
    pub fn add_base_channel(&mut self) {
        let (base, rest) = self.channels.split_at_mut(1);
        for channel in rest {
            channel.add(&base[0]);
        }
    }
}

fn checked_pixel_count(
    width: u32,
    height: u32,
    len: usize,
    bytes_per_pixel: usize,
) -> Result<usize, BildError> {
    let invalid = BildError::InvalidDimensions { width, height };
    match (width as usize).checked_mul(height as usize) {
        Some(count) if count > 0 && count.checked_mul(bytes_per_pixel) == Some(len) => Ok(count),
        _ => Err(invalid),
    }
}

#[inline]
fn clip(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Image {
        let pixels: Vec<u8> = (0..width * height)
            .flat_map(|i| [(i * 7 % 256) as u8, (i * 3 % 256) as u8, (255 - i % 256) as u8])
            .collect();
        Image::from_rgb8(width, height, &pixels).unwrap()
    }

    #[test]
    fn test_rgb8_roundtrip() {
        let pixels = [10u8, 20, 30, 40, 50, 60];
        let image = Image::from_rgb8(2, 1, &pixels).unwrap();
        assert_eq!(image.channels()[1].data(), &[20, 50]);
        assert_eq!(image.to_rgb8(), pixels);
    }

    #[test]
    fn test_pixel_buffer_length_is_checked() {
        assert!(Image::from_rgb8(2, 2, &[0; 11]).is_err());
        assert!(Image::from_rgb8(0, 2, &[]).is_err());
        assert!(Image::from_gray8(3, 1, &[0; 2]).is_err());
    }

    #[test]
    fn test_ycbcr411_forward_values() {
        let mut image = Image::from_rgb8(1, 1, &[100, 50, 20]).unwrap();
        image.transform_colour_space(ColourSpace::YCbCr411);
        // Y = ((100 + 100 + 20) >> 2) - 128, Cb = R - G, Cr = B - G
        assert_eq!(image.channels()[0].data(), &[55 - 128]);
        assert_eq!(image.channels()[1].data(), &[50]);
        assert_eq!(image.channels()[2].data(), &[-30]);
    }

    #[test]
    fn test_ycbcr411_chroma_is_subsampled() {
        let mut image = gradient(5, 3);
        image.transform_colour_space(ColourSpace::YCbCr411);
        assert_eq!(image.colour_space(), ColourSpace::YCbCr411);
        assert_eq!((image.channels()[0].width(), image.channels()[0].height()), (5, 3));
        assert_eq!((image.channels()[1].width(), image.channels()[1].height()), (3, 2));
        assert_eq!((image.channels()[2].width(), image.channels()[2].height()), (3, 2));
    }

    #[test]
    fn test_flat_colour_survives_ycbcr411() {
        let pixels: Vec<u8> = [200u8, 120, 40].repeat(16);
        let mut image = Image::from_rgb8(4, 4, &pixels).unwrap();
        image.transform_colour_space(ColourSpace::YCbCr411);
        image.transform_colour_space(ColourSpace::Rgb);
        let restored = image.to_rgb8();
        for (a, b) in restored.iter().zip(&pixels) {
            assert!((*a as i32 - *b as i32).abs() <= 1, "{a} vs {b}");
        }
    }

    #[test]
    fn test_grayscale_weights() {
        let image = Image::from_rgb8(2, 1, &[255, 255, 255, 32, 0, 0]).unwrap();
        assert_eq!(image.to_gray8(), vec![255, 11]);
    }

    #[test]
    fn test_gray8_expands_to_rgb() {
        let mut image = Image::from_gray8(2, 1, &[7, 9]).unwrap();
        assert_eq!(image.channel_count(), 1);
        image.transform_colour_space(ColourSpace::Rgb);
        assert_eq!(image.channel_count(), 3);
        assert_eq!(image.to_rgb8(), vec![7, 7, 7, 9, 9, 9]);
    }

    #[test]
    fn test_base_channel_differences() {
        let mut image = gradient(3, 3);
        let original = image.clone();
        image.subtract_base_channel();
        assert_eq!(image.channels()[0], original.channels()[0]);
        assert_ne!(image.channels()[1], original.channels()[1]);
        image.add_base_channel();
        assert_eq!(image, original);
    }

    #[test]
    fn test_output_is_clipped() {
        let planes = vec![
            Signal2D::from_vec(2, 1, vec![-5, 300]).unwrap(),
            Signal2D::from_vec(2, 1, vec![0, 0]).unwrap(),
            Signal2D::from_vec(2, 1, vec![128, 256]).unwrap(),
        ];
        let image = Image::from_channels(ColourSpace::Rgb, 2, 1, planes).unwrap();
        assert_eq!(image.to_rgb8(), vec![0, 0, 128, 255, 0, 255]);
    }

    #[test]
    fn test_grayscale_of_extreme_values() {
        let planes = vec![
            Signal2D::from_vec(1, 1, vec![1 << 30]).unwrap(),
            Signal2D::from_vec(1, 1, vec![1 << 30]).unwrap(),
            Signal2D::from_vec(1, 1, vec![i32::MIN]).unwrap(),
        ];
        let image = Image::from_channels(ColourSpace::Rgb, 1, 1, planes).unwrap();
        assert_eq!(image.to_gray8().len(), 1);
    }

    #[test]
    fn test_from_channels_checks_geometry() {
        let planes = vec![Signal2D::new(4, 4), Signal2D::new(4, 4), Signal2D::new(4, 4)];
        assert!(matches!(
            Image::from_channels(ColourSpace::YCbCr411, 4, 4, planes),
            Err(BildError::ChannelSizeMismatch)
        ));
        let planes = vec![Signal2D::new(4, 4), Signal2D::new(2, 2), Signal2D::new(2, 2)];
        assert!(Image::from_channels(ColourSpace::YCbCr411, 4, 4, planes).is_ok());
    }
}
