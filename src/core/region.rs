use serde::{Deserialize, Serialize};

use super::error::{PresentError, Result};

/// Every framebuffer and cursor pixel is 32 bits.
pub const BYTES_PER_PIXEL: u32 = 4;

/// Channel order of incoming pixel bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// Little-endian xRGB words, as most emulated framebuffers emit them
    #[default]
    Bgra8,
    Rgba8,
}

impl PixelFormat {
    pub fn texture_format(self) -> wgpu::TextureFormat {
        match self {
            PixelFormat::Bgra8 => wgpu::TextureFormat::Bgra8Unorm,
            PixelFormat::Rgba8 => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// Texture dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureSize {
    pub width: u32,
    pub height: u32,
}

impl TextureSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Total number of pixels
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Size in bytes of a tightly packed buffer
    pub fn buffer_size(&self) -> usize {
        self.pixel_count() * BYTES_PER_PIXEL as usize
    }

    pub fn full_region(&self) -> Region {
        Region::new(0, 0, self.width, self.height)
    }
}

/// Axis-aligned pixel rectangle `[x, x+width) × [y, y+height)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn right(&self) -> Option<u32> {
        self.x.checked_add(self.width)
    }

    pub fn bottom(&self) -> Option<u32> {
        self.y.checked_add(self.height)
    }

    pub fn fits_within(&self, size: TextureSize) -> bool {
        matches!(
            (self.right(), self.bottom()),
            (Some(r), Some(b)) if r <= size.width && b <= size.height
        )
    }

    pub fn covers(&self, size: TextureSize) -> bool {
        self.x == 0 && self.y == 0 && self.width == size.width && self.height == size.height
    }

    pub fn size(&self) -> TextureSize {
        TextureSize::new(self.width, self.height)
    }
}

/// A dirty rectangle handed over by the framebuffer source.
///
/// Row `r` of the rectangle starts at `pixels[r * stride]`. The buffer is
/// borrowed only for the duration of the upload and never retained.
#[derive(Debug, Clone, Copy)]
pub struct DirtyUpdate<'a> {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub pixels: &'a [u8],
}

impl<'a> DirtyUpdate<'a> {
    pub fn new(pixels: &'a [u8], x: u32, y: u32, width: u32, height: u32, stride: u32) -> Self {
        Self { x, y, width, height, stride, pixels }
    }

    /// Update covering a whole tightly packed image
    pub fn full(pixels: &'a [u8], size: TextureSize) -> Self {
        Self::new(pixels, 0, 0, size.width, size.height, size.width * BYTES_PER_PIXEL)
    }

    pub fn region(&self) -> Region {
        Region::new(self.x, self.y, self.width, self.height)
    }

    /// Check rectangle, stride and buffer length against each other
    pub fn validate(&self) -> Result<()> {
        validate_pixels(self.pixels, self.width, self.height, self.stride)
    }
}

/// Bytes actually read from a `stride`-pitched buffer holding `width × height` pixels
pub fn required_len(width: u32, height: u32, stride: u32) -> usize {
    if width == 0 || height == 0 {
        return 0;
    }
    (height as usize - 1) * stride as usize + width as usize * BYTES_PER_PIXEL as usize
}

pub(crate) fn validate_pixels(pixels: &[u8], width: u32, height: u32, stride: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(PresentError::InvalidBuffer(format!(
            "empty rectangle {}x{}",
            width, height
        )));
    }

    let row_bytes = width as u64 * BYTES_PER_PIXEL as u64;
    if (stride as u64) < row_bytes {
        return Err(PresentError::InvalidBuffer(format!(
            "stride {} shorter than row of {} bytes",
            stride, row_bytes
        )));
    }

    let needed = required_len(width, height, stride);
    if pixels.len() < needed {
        return Err(PresentError::InvalidBuffer(format!(
            "expected at least {} bytes, got {}",
            needed,
            pixels.len()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_fits_and_overflows() {
        let size = TextureSize::new(4, 4);
        assert!(Region::new(1, 1, 2, 2).fits_within(size));
        assert!(Region::new(0, 0, 4, 4).fits_within(size));
        assert!(!Region::new(3, 0, 2, 1).fits_within(size));
        assert!(!Region::new(u32::MAX, 0, 2, 1).fits_within(size));
    }

    #[test]
    fn full_update_covers_size() {
        let size = TextureSize::new(3, 2);
        let pixels = vec![0u8; size.buffer_size()];
        let update = DirtyUpdate::full(&pixels, size);
        assert!(update.region().covers(size));
        assert_eq!(update.stride, 12);
        assert!(update.validate().is_ok());
    }

    #[test]
    fn required_len_ignores_trailing_padding() {
        // Last row only needs its own pixels, not the full stride
        assert_eq!(required_len(2, 3, 16), 2 * 16 + 8);
        assert_eq!(required_len(0, 3, 16), 0);
    }

    #[test]
    fn validate_rejects_short_stride_and_buffer() {
        let pixels = vec![0u8; 64];
        assert!(DirtyUpdate::new(&pixels, 0, 0, 4, 2, 8).validate().is_err());
        assert!(DirtyUpdate::new(&pixels, 0, 0, 4, 5, 16).validate().is_err());
        assert!(DirtyUpdate::new(&pixels, 0, 0, 0, 5, 16).validate().is_err());
        assert!(DirtyUpdate::new(&pixels, 0, 0, 4, 4, 16).validate().is_ok());
    }

    #[test]
    fn texture_size_buffer_size() {
        let size = TextureSize::new(640, 480);
        assert_eq!(size.pixel_count(), 640 * 480);
        assert_eq!(size.buffer_size(), 640 * 480 * 4);
        assert!(TextureSize::new(0, 480).is_empty());
    }
}
