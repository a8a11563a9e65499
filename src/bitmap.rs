//! Software pixel buffer backing one surface.
//!
//! Fixed RGBA8, with engine-determined row padding: the stride is rounded up
//! to a 16-byte boundary, so it may exceed `width * 4`. Readback goes
//! through an explicit lock/unlock pair; the renderer skips painting a
//! locked bitmap so a reader never observes a half-written frame.

use std::io::Write;

use crate::errors::{Result, SurfaceError};

pub const BYTES_PER_PIXEL: usize = 4;
const ROW_ALIGN: usize = 16;

pub struct Bitmap {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    stride: u32,
    locked: bool,
}

impl Bitmap {
    pub fn new(width: u32, height: u32) -> Self {
        let row = width as usize * BYTES_PER_PIXEL;
        let stride = row.div_ceil(ROW_ALIGN) * ROW_ALIGN;

        Self {
            pixels: vec![0xff; stride * height as usize],
            width,
            height,
            stride: stride as u32,
            locked: false,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row stride in bytes. May exceed `width * 4`.
    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Acquire the readback lock. A second lock without an intervening
    /// [`unlock`](Self::unlock) is rejected rather than handing out a
    /// possibly stale view.
    pub fn lock(&mut self) -> Result<&[u8]> {
        if self.locked {
            return Err(SurfaceError::AlreadyLocked);
        }
        self.locked = true;
        Ok(&self.pixels)
    }

    pub fn unlock(&mut self) -> Result<()> {
        if !self.locked {
            return Err(SurfaceError::NotLocked);
        }
        self.locked = false;
        Ok(())
    }

    pub fn clear(&mut self, rgba: [u8; 4]) {
        for row in self.pixels.chunks_exact_mut(self.stride as usize) {
            for px in row[..self.width as usize * BYTES_PER_PIXEL].chunks_exact_mut(BYTES_PER_PIXEL)
            {
                px.copy_from_slice(&rgba);
            }
        }
    }

    /// Plot text content as grayscale bytes, one byte per pixel cell,
    /// starting `scroll` pixels into the content. Stand-in raster output:
    /// deterministic and scroll-sensitive, which is all the readback
    /// contract needs.
    pub fn blit_text(&mut self, text: &str, scroll: (i32, i32)) {
        let cells = self.width as usize * self.height as usize;
        let skip = (scroll.1.max(0) as usize) * self.width as usize + scroll.0.max(0) as usize;

        for (i, byte) in text.bytes().skip(skip).take(cells).enumerate() {
            let x = i % self.width as usize;
            let y = i / self.width as usize;
            let offset = y * self.stride as usize + x * BYTES_PER_PIXEL;
            self.pixels[offset] = byte;
            self.pixels[offset + 1] = byte;
            self.pixels[offset + 2] = byte;
            self.pixels[offset + 3] = 0xff;
        }
    }

    /// Encode the current frame as PNG, dropping the row padding.
    pub fn write_png<W: Write>(&self, out: W) -> std::result::Result<(), png::EncodingError> {
        let mut encoder = png::Encoder::new(out, self.width, self.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let row = self.width as usize * BYTES_PER_PIXEL;
        let mut packed = Vec::with_capacity(row * self.height as usize);
        for chunk in self.pixels.chunks_exact(self.stride as usize) {
            packed.extend_from_slice(&chunk[..row]);
        }

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&packed)?;
        Ok(())
    }
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("locked", &self.locked)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_is_aligned_and_at_least_row_width() {
        let b = Bitmap::new(33, 4);
        assert!(b.stride() as usize >= 33 * BYTES_PER_PIXEL);
        assert_eq!(b.stride() as usize % ROW_ALIGN, 0);

        let b = Bitmap::new(64, 4);
        assert_eq!(b.stride(), 64 * BYTES_PER_PIXEL as u32);
    }

    #[test]
    fn lock_unlock_is_repeatable_and_double_lock_is_rejected() {
        let mut b = Bitmap::new(8, 8);
        for _ in 0..100 {
            b.lock().unwrap();
            b.unlock().unwrap();
        }

        b.lock().unwrap();
        assert!(matches!(b.lock(), Err(SurfaceError::AlreadyLocked)));
        b.unlock().unwrap();
        assert!(matches!(b.unlock(), Err(SurfaceError::NotLocked)));
    }

    #[test]
    fn clear_fills_every_visible_pixel() {
        let mut b = Bitmap::new(3, 2);
        b.clear([1, 2, 3, 4]);
        let pixels = b.lock().unwrap();
        assert_eq!(&pixels[..4], &[1, 2, 3, 4]);
        let last_row = b.stride() as usize;
        assert_eq!(&b.pixels[last_row..last_row + 4], &[1, 2, 3, 4]);
    }

    #[test]
    fn blit_text_respects_scroll_offset() {
        let mut a = Bitmap::new(4, 4);
        let mut b = Bitmap::new(4, 4);
        a.clear([0xff; 4]);
        b.clear([0xff; 4]);
        a.blit_text("abcdefghijklmnop", (0, 0));
        b.blit_text("abcdefghijklmnop", (0, 1));
        assert_eq!(a.pixels[0], b'a');
        assert_eq!(b.pixels[0], b'e');
    }

    #[test]
    fn png_snapshot_encodes() {
        let mut b = Bitmap::new(10, 10);
        b.clear([0, 0, 0, 0xff]);
        let mut out = Vec::new();
        b.write_png(&mut out).unwrap();
        assert_eq!(&out[1..4], b"PNG");
    }
}
