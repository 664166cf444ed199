//! Bitmap decoding via the `image` crate.
//!
//! Decoding is split in two so callers can reject oversized inputs before
//! allocating the full raster:
//!
//! 1. [`probe_dimensions`] reads only the container header
//! 2. [`decode`] decodes and converts to RGBA8

use std::io::Cursor;

use coverlift_core::PixelBuffer;
use image::{ImageFormat, ImageReader};
use tracing::trace;

use crate::{IoError, IoResult};

fn reader(bytes: &[u8]) -> IoResult<ImageReader<Cursor<&[u8]>>> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    if reader.format().is_none() {
        return Err(IoError::UnsupportedFormat(
            "unrecognised image signature".into(),
        ));
    }
    Ok(reader)
}

/// Sniffs the container format from the leading bytes.
pub fn detect_format(bytes: &[u8]) -> IoResult<ImageFormat> {
    reader(bytes)?
        .format()
        .ok_or_else(|| IoError::UnsupportedFormat("unrecognised image signature".into()))
}

/// Reads width and height from the image header without decoding pixels.
pub fn probe_dimensions(bytes: &[u8]) -> IoResult<(u32, u32)> {
    reader(bytes)?
        .into_dimensions()
        .map_err(|e| IoError::DecodeError(format!("cannot read dimensions: {e}")))
}

/// Decodes `bytes` into an RGBA8 buffer.
///
/// Grayscale, RGB and 16-bit sources are converted; alpha defaults to 255.
pub fn decode(bytes: &[u8]) -> IoResult<PixelBuffer> {
    let reader = reader(bytes)?;
    let format = reader.format();
    let img = reader
        .decode()
        .map_err(|e| IoError::DecodeError(e.to_string()))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    trace!(?format, width, height, "decoded bitmap");

    Ok(PixelBuffer::from_raw(width, height, rgba.into_raw())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::png::{encode, Compression};

    #[test]
    fn test_probe_matches_decode() {
        let img = PixelBuffer::filled(17, 9, [1, 2, 3, 255]);
        let bytes = encode(&img, Compression::Fast).unwrap();
        assert_eq!(detect_format(&bytes).unwrap(), ImageFormat::Png);
        assert_eq!(probe_dimensions(&bytes).unwrap(), (17, 9));
        assert_eq!(decode(&bytes).unwrap().dimensions(), (17, 9));
    }

    #[test]
    fn test_garbage_rejected() {
        let bytes = b"definitely not an image";
        assert!(matches!(probe_dimensions(bytes), Err(IoError::UnsupportedFormat(_))));
        assert!(matches!(decode(bytes), Err(IoError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_truncated_png_fails_decode() {
        let img = PixelBuffer::filled(32, 32, [200, 100, 50, 255]);
        let bytes = encode(&img, Compression::Fast).unwrap();
        let truncated = &bytes[..bytes.len() / 2];
        assert!(matches!(decode(truncated), Err(IoError::DecodeError(_))));
    }

    #[test]
    fn test_rgb_source_gets_opaque_alpha() {
        let rgb = image::RgbImage::from_pixel(3, 3, image::Rgb([9, 8, 7]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(rgb)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        let img = decode(&bytes).unwrap();
        assert_eq!(img.pixel(1, 1), [9, 8, 7, 255]);
    }
}
