use std::sync::Arc;

use parking_lot::Mutex;

use super::error::{PresentError, Result};
use super::region::{required_len, validate_pixels, DirtyUpdate, Region, TextureSize, BYTES_PER_PIXEL};
use crate::traits::TextureDevice;

const DISPLAY_LABEL: &str = "Display Texture";
const CURSOR_LABEL: &str = "Cursor Texture";

/// Shared handle to a stored texture and its dimensions
pub struct TextureRef<T> {
    pub texture: Arc<T>,
    pub size: TextureSize,
}

impl<T> Clone for TextureRef<T> {
    fn clone(&self) -> Self {
        Self {
            texture: Arc::clone(&self.texture),
            size: self.size,
        }
    }
}

impl<T> std::fmt::Debug for TextureRef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureRef").field("size", &self.size).finish()
    }
}

/// How a successful upload landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upload {
    /// Written into the existing texture
    InPlace,
    /// A new texture was allocated and replaced the previous one
    Reallocated,
}

/// Owns the display and cursor textures
///
/// Each texture sits behind its own lock, held only while a single region
/// is copied or a handle is cloned, so the producer never waits on a frame.
pub struct TextureStore<D: TextureDevice> {
    device: D,
    display: Mutex<Option<TextureRef<D::Texture>>>,
    cursor: Mutex<Option<TextureRef<D::Texture>>>,
}

impl<D: TextureDevice> TextureStore<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            display: Mutex::new(None),
            cursor: Mutex::new(None),
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Copy a dirty rectangle into the display texture.
    ///
    /// `required` is the display size at the time of the call, `None` before
    /// any drawable size is known (then any existing texture is compatible).
    /// A full-frame update at the required size allocates the texture when no
    /// compatible one exists. Any other update against a missing or
    /// mismatched texture, or one that falls outside it, changes nothing.
    pub fn upload_region(&self, update: &DirtyUpdate<'_>, required: Option<TextureSize>) -> Result<Upload> {
        update.validate()?;
        let region = update.region();
        let mut display = self.display.lock();

        let compatible = display
            .as_ref()
            .filter(|slot| required.map_or(true, |need| slot.size == need));

        if let Some(slot) = compatible {
            if !region.fits_within(slot.size) {
                return Err(PresentError::OutOfBounds {
                    region,
                    size: slot.size,
                });
            }
            self.write(&slot.texture, region, update.pixels, update.stride);
            return Ok(Upload::InPlace);
        }

        match required {
            Some(need) if region.covers(need) => {
                let texture = self.device.create_texture(DISPLAY_LABEL, need)?;
                self.write(&texture, region, update.pixels, update.stride);
                *display = Some(TextureRef {
                    texture: Arc::new(texture),
                    size: need,
                });
                log::debug!("display texture reallocated at {}x{}", need.width, need.height);
                Ok(Upload::Reallocated)
            }
            _ => Err(PresentError::NoCompatibleTexture {
                have: display.as_ref().map(|slot| slot.size),
                need: required,
            }),
        }
    }

    /// Replace the display texture contents wholesale, reallocating if the size changed
    pub fn define_display(&self, pixels: &[u8], width: u32, height: u32, stride: u32) -> Result<Upload> {
        self.define(&self.display, DISPLAY_LABEL, pixels, width, height, stride)
    }

    /// Replace the cursor image, reallocating if the size changed
    pub fn define_cursor(&self, pixels: &[u8], width: u32, height: u32, stride: u32) -> Result<Upload> {
        self.define(&self.cursor, CURSOR_LABEL, pixels, width, height, stride)
    }

    pub fn display(&self) -> Option<TextureRef<D::Texture>> {
        self.display.lock().clone()
    }

    pub fn cursor(&self) -> Option<TextureRef<D::Texture>> {
        self.cursor.lock().clone()
    }

    /// Read back the whole display texture
    pub fn read_display(&self) -> Result<Vec<u8>> {
        let slot = self
            .display()
            .ok_or_else(|| PresentError::Readback("no display texture".into()))?;
        self.device.read_texture(&slot.texture, slot.size)
    }

    /// Read back the whole cursor texture
    pub fn read_cursor(&self) -> Result<Vec<u8>> {
        let slot = self
            .cursor()
            .ok_or_else(|| PresentError::Readback("no cursor texture".into()))?;
        self.device.read_texture(&slot.texture, slot.size)
    }

    /// Drop both textures. Frames already holding a handle keep it alive until they finish.
    pub fn release(&self) {
        self.display.lock().take();
        self.cursor.lock().take();
    }

    fn define(
        &self,
        slot: &Mutex<Option<TextureRef<D::Texture>>>,
        label: &'static str,
        pixels: &[u8],
        width: u32,
        height: u32,
        stride: u32,
    ) -> Result<Upload> {
        validate_pixels(pixels, width, height, stride)?;
        let size = TextureSize::new(width, height);
        let region = size.full_region();
        let mut slot = slot.lock();

        if let Some(current) = slot.as_ref().filter(|current| current.size == size) {
            self.write(&current.texture, region, pixels, stride);
            return Ok(Upload::InPlace);
        }

        // On failure the previous texture stays in place for the next frame
        let texture = self.device.create_texture(label, size)?;
        self.write(&texture, region, pixels, stride);
        *slot = Some(TextureRef {
            texture: Arc::new(texture),
            size,
        });
        Ok(Upload::Reallocated)
    }

    fn write(&self, texture: &D::Texture, region: Region, pixels: &[u8], stride: u32) {
        let used = &pixels[..required_len(region.width, region.height, stride)];
        if stride % BYTES_PER_PIXEL == 0 {
            self.device.write_region(texture, region, stride, used);
            return;
        }

        // Rows must start on a texel boundary; repack odd pitches
        let row_bytes = (region.width * BYTES_PER_PIXEL) as usize;
        let mut packed = Vec::with_capacity(row_bytes * region.height as usize);
        for row in 0..region.height as usize {
            let start = row * stride as usize;
            packed.extend_from_slice(&used[start..start + row_bytes]);
        }
        self.device
            .write_region(texture, region, region.width * BYTES_PER_PIXEL, &packed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CpuTextureDevice;

    fn solid(size: TextureSize, pixel: [u8; 4]) -> Vec<u8> {
        pixel.repeat(size.pixel_count())
    }

    #[test]
    fn partial_upload_before_any_texture_is_dropped() {
        let store = TextureStore::new(CpuTextureDevice::new());
        let pixels = solid(TextureSize::new(2, 2), [1, 2, 3, 4]);

        let result = store.upload_region(&DirtyUpdate::new(&pixels, 1, 1, 2, 2, 8), None);
        assert!(matches!(
            result,
            Err(PresentError::NoCompatibleTexture { have: None, need: None })
        ));
        assert!(store.display().is_none());
    }

    #[test]
    fn full_frame_at_required_size_allocates() {
        let store = TextureStore::new(CpuTextureDevice::new());
        let size = TextureSize::new(4, 3);

        let pixels = solid(size, [9, 9, 9, 255]);
        let upload = store.upload_region(&DirtyUpdate::full(&pixels, size), Some(size)).unwrap();

        assert_eq!(upload, Upload::Reallocated);
        assert_eq!(store.display().map(|slot| slot.size), Some(size));
        assert_eq!(store.read_display().unwrap(), pixels);
    }

    #[test]
    fn stale_texture_rejects_partial_updates_after_resize() {
        let store = TextureStore::new(CpuTextureDevice::new());
        let old = TextureSize::new(4, 4);
        store.define_display(&solid(old, [1; 4]), 4, 4, 16).unwrap();

        let pixels = solid(TextureSize::new(1, 1), [2; 4]);
        let result = store.upload_region(
            &DirtyUpdate::new(&pixels, 0, 0, 1, 1, 4),
            Some(TextureSize::new(8, 8)),
        );

        assert!(matches!(result, Err(PresentError::NoCompatibleTexture { .. })));
        assert_eq!(store.read_display().unwrap(), solid(old, [1; 4]));
    }

    #[test]
    fn full_frame_at_stale_size_is_dropped() {
        let store = TextureStore::new(CpuTextureDevice::new());
        let pixels = solid(TextureSize::new(4, 4), [3; 4]);

        let result = store.upload_region(
            &DirtyUpdate::full(&pixels, TextureSize::new(4, 4)),
            Some(TextureSize::new(6, 6)),
        );

        assert!(matches!(result, Err(PresentError::NoCompatibleTexture { .. })));
        assert_eq!(store.device().allocations(), 0);
    }

    #[test]
    fn odd_stride_is_repacked() {
        let store = TextureStore::new(CpuTextureDevice::new());
        store
            .define_display(&solid(TextureSize::new(2, 2), [0; 4]), 2, 2, 8)
            .unwrap();

        // 1x2 region with a 6 byte pitch
        let src = [5, 5, 5, 5, 0, 0, 7, 7, 7, 7];
        store
            .upload_region(&DirtyUpdate::new(&src, 1, 0, 1, 2, 6), None)
            .unwrap();

        let pixels = store.read_display().unwrap();
        assert_eq!(&pixels[4..8], &[5, 5, 5, 5]);
        assert_eq!(&pixels[12..16], &[7, 7, 7, 7]);
    }

    #[test]
    fn redefining_same_size_cursor_reuses_texture() {
        let store = TextureStore::new(CpuTextureDevice::new());
        let size = TextureSize::new(8, 8);
        assert_eq!(
            store.define_cursor(&solid(size, [1; 4]), 8, 8, 32).unwrap(),
            Upload::Reallocated
        );
        assert_eq!(
            store.define_cursor(&solid(size, [2; 4]), 8, 8, 32).unwrap(),
            Upload::InPlace
        );
        assert_eq!(store.device().allocations(), 1);
        assert_eq!(store.read_cursor().unwrap(), solid(size, [2; 4]));
    }

    #[test]
    fn release_drops_both_textures() {
        let store = TextureStore::new(CpuTextureDevice::new());
        store.define_display(&[0; 16], 2, 2, 8).unwrap();
        store.define_cursor(&[0; 16], 2, 2, 8).unwrap();

        store.release();

        assert!(store.display().is_none());
        assert!(store.cursor().is_none());
        assert!(store.read_display().is_err());
    }
}
