//! Decoded-bitmap ownership tracking.
//!
//! Every decoded input lives in a [`DecodedBitmap`] registered with a
//! [`BitmapLedger`]. Dropping the guard releases the bitmap, so the ledger
//! reads zero once a job has finished, whichever way it finished.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use coverlift_core::PixelBuffer;
use coverlift_io::{IoResult, decode};
use tracing::trace;

/// Count of decoded bitmaps currently alive.
#[derive(Debug, Clone, Default)]
pub struct BitmapLedger {
    live: Arc<AtomicUsize>,
}

impl BitmapLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bitmaps decoded and not yet released.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }
}

/// A decoded input image, released on drop.
#[derive(Debug)]
pub struct DecodedBitmap {
    pixels: PixelBuffer,
    ledger: BitmapLedger,
}

impl DecodedBitmap {
    /// Decodes `bytes` and registers the result with `ledger`.
    pub fn decode(bytes: &[u8], ledger: &BitmapLedger) -> IoResult<Self> {
        let pixels = decode::decode(bytes)?;
        ledger.live.fetch_add(1, Ordering::AcqRel);
        trace!(width = pixels.width(), height = pixels.height(), "bitmap acquired");
        Ok(Self {
            pixels,
            ledger: ledger.clone(),
        })
    }

    /// Decoded pixels.
    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    /// `(width, height)` of the bitmap.
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

impl Drop for DecodedBitmap {
    fn drop(&mut self) {
        self.ledger.live.fetch_sub(1, Ordering::AcqRel);
        trace!(
            width = self.pixels.width(),
            height = self.pixels.height(),
            "bitmap released"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(w: u32, h: u32) -> Vec<u8> {
        let img = PixelBuffer::filled(w, h, [1, 2, 3, 255]);
        coverlift_io::png::encode(&img, Default::default()).unwrap()
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let ledger = BitmapLedger::new();
        let bytes = png(6, 4);

        let a = DecodedBitmap::decode(&bytes, &ledger).unwrap();
        let b = DecodedBitmap::decode(&bytes, &ledger).unwrap();
        assert_eq!(ledger.live(), 2);
        assert_eq!(a.dimensions(), (6, 4));
        assert_eq!(b.pixels().pixel(0, 0), [1, 2, 3, 255]);

        drop(a);
        assert_eq!(ledger.live(), 1);
        drop(b);
        assert_eq!(ledger.live(), 0);
    }

    #[test]
    fn test_failed_decode_not_counted() {
        let ledger = BitmapLedger::new();
        assert!(DecodedBitmap::decode(b"garbage", &ledger).is_err());
        assert_eq!(ledger.live(), 0);
    }

    #[test]
    fn test_release_on_unwind() {
        let ledger = BitmapLedger::new();
        let bytes = png(2, 2);
        let l = ledger.clone();
        let res = std::panic::catch_unwind(move || {
            let _bmp = DecodedBitmap::decode(&bytes, &l).unwrap();
            panic!("stage failed");
        });
        assert!(res.is_err());
        assert_eq!(ledger.live(), 0);
    }
}
