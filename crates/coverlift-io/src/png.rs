//! PNG encoding.
//!
//! Output is always 8-bit RGBA PNG, tagged sRGB. PNG is lossless, so there
//! is no quality knob; callers that carry a quality value have it ignored.
//!
//! # Example
//!
//! ```rust
//! use coverlift_core::PixelBuffer;
//! use coverlift_io::png::{encode, Compression};
//!
//! let img = PixelBuffer::filled(2, 2, [0, 0, 0, 255]);
//! let bytes = encode(&img, Compression::default()).unwrap();
//! assert_eq!(&bytes[1..4], b"PNG");
//! ```

use coverlift_core::PixelBuffer;
use tracing::trace;

use crate::{IoError, IoResult};

/// Deflate effort. Affects size and speed, never pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Compression {
    /// Favour encode speed.
    Fast,
    /// Encoder default.
    #[default]
    Balanced,
}

impl From<Compression> for png::Compression {
    fn from(c: Compression) -> Self {
        match c {
            Compression::Fast => png::Compression::Fast,
            Compression::Balanced => png::Compression::default(),
        }
    }
}

/// Encodes `img` as an RGBA8 PNG in memory.
pub fn encode(img: &PixelBuffer, compression: Compression) -> IoResult<Vec<u8>> {
    let (width, height) = img.dimensions();
    let mut out = Vec::with_capacity(img.as_raw().len() / 2);

    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(compression.into());
        encoder.set_source_srgb(png::SrgbRenderingIntent::Perceptual);

        let mut writer = encoder
            .write_header()
            .map_err(|e| IoError::EncodeError(e.to_string()))?;
        writer
            .write_image_data(img.as_raw())
            .map_err(|e| IoError::EncodeError(e.to_string()))?;
        writer
            .finish()
            .map_err(|e| IoError::EncodeError(e.to_string()))?;
    }

    trace!(width, height, bytes = out.len(), "encoded png");
    Ok(out)
}
