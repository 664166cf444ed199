//! Owned RGBA8 pixel buffer.
//!
//! # Memory Layout
//!
//! Pixels are stored row-major, top-to-bottom, with interleaved channels:
//!
//! ```text
//! Memory: [R G B A R G B A ...]  <- Row 0
//!         [R G B A R G B A ...]  <- Row 1
//!         ...
//! ```
//!
//! The invariant `samples.len() == width * height * 4` holds for every
//! constructed buffer.
//!
//! # Usage
//!
//! ```rust
//! use coverlift_core::PixelBuffer;
//!
//! let mut img = PixelBuffer::filled(4, 3, [255, 0, 0, 255]);
//! img.set_pixel(1, 1, [0, 0, 255, 128]);
//!
//! assert_eq!(img.pixel(1, 1), [0, 0, 255, 128]);
//! assert_eq!(img.as_raw().len(), 4 * 3 * 4);
//! ```

use crate::{Error, Result};

/// Number of interleaved channels per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// Owned RGBA8 raster.
///
/// Filter stages never mutate a buffer they only borrow; a stage either
/// consumes its input by value or reads it through `&PixelBuffer` and
/// returns a freshly allocated output.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Creates a transparent black buffer.
    ///
    /// # Panics
    ///
    /// Panics if `width * height * 4` overflows `usize`. Use
    /// [`PixelBuffer::byte_len`] to validate untrusted dimensions first.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0, 0, 0, 0])
    }

    /// Creates a buffer with every pixel set to `rgba`.
    ///
    /// # Panics
    ///
    /// Panics if `width * height * 4` overflows `usize`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = (width as usize)
            .checked_mul(height as usize)
            .expect("pixel count overflows usize");
        let data = rgba.repeat(pixels);
        Self { width, height, data }
    }

    /// Wraps existing RGBA8 samples.
    ///
    /// Fails if the sample count does not match the dimensions.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = Self::byte_len(width, height)?;
        if data.len() != expected {
            return Err(Error::BufferSize {
                expected,
                got: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// Returns the byte length a `width x height` buffer needs.
    pub fn byte_len(width: u32, height: u32) -> Result<usize> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions {
                width,
                height,
                reason: "width and height must be > 0".into(),
            });
        }
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|px| px.checked_mul(CHANNELS))
            .ok_or_else(|| Error::InvalidDimensions {
                width,
                height,
                reason: "sample count overflows usize".into(),
            })
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    /// Sample offset of pixel `(x, y)`.
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// Reads pixel `(x, y)` as `[r, g, b, a]`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let i = self.index(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// Writes pixel `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let i = self.index(x, y);
        self.data[i..i + CHANNELS].copy_from_slice(&rgba);
    }

    /// Borrow of row `y`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride();
        &self.data[start..start + self.stride()]
    }

    /// All samples, row-major RGBA.
    #[inline]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to the samples. The length cannot change.
    #[inline]
    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consumes the buffer and returns its samples.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Iterates pixels as 4-byte chunks.
    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(CHANNELS)
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Stores a filtered value into a sample the way a clamped u8 array does:
/// NaN becomes 0, the value is clamped to `[0, 255]` and rounded half to even.
#[inline]
pub fn quantize(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.clamp(0.0, 255.0).round_ties_even() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_layout() {
        let img = PixelBuffer::filled(3, 2, [1, 2, 3, 4]);
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.as_raw().len(), 24);
        assert_eq!(img.stride(), 12);
        for px in img.pixels() {
            assert_eq!(px, &[1, 2, 3, 4]);
        }
    }

    #[test]
    fn test_from_raw_rejects_wrong_length() {
        let err = PixelBuffer::from_raw(2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(err, Error::BufferSize { expected: 16, got: 15 });
    }

    #[test]
    fn test_from_raw_rejects_zero_size() {
        let err = PixelBuffer::from_raw(0, 5, Vec::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions { width: 0, height: 5, .. }));
    }

    #[test]
    fn test_pixel_roundtrip() {
        let mut img = PixelBuffer::new(5, 5);
        img.set_pixel(4, 2, [9, 8, 7, 6]);
        assert_eq!(img.pixel(4, 2), [9, 8, 7, 6]);
        assert_eq!(img.index(4, 2), (2 * 5 + 4) * 4);
        assert_eq!(&img.row(2)[16..20], &[9, 8, 7, 6]);
    }

    #[test]
    #[should_panic]
    fn test_pixel_out_of_bounds() {
        let img = PixelBuffer::new(2, 2);
        let _ = img.pixel(2, 0);
    }

    #[test]
    fn test_quantize() {
        assert_eq!(quantize(-3.0), 0);
        assert_eq!(quantize(300.0), 255);
        assert_eq!(quantize(f32::NAN), 0);
        assert_eq!(quantize(127.5), 128);
        assert_eq!(quantize(126.5), 126);
        assert_eq!(quantize(12.4), 12);
    }
}
