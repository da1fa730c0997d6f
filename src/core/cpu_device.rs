use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::error::{PresentError, Result};
use super::region::{Region, TextureSize, BYTES_PER_PIXEL};
use crate::traits::TextureDevice;

/// Same ceiling wgpu's default limits put on 2D textures
pub const DEFAULT_MAX_DIMENSION: u32 = 8192;

/// Texture living in host memory
#[derive(Debug)]
pub struct CpuTexture {
    label: &'static str,
    size: TextureSize,
    pixels: Mutex<Vec<u8>>,
}

impl CpuTexture {
    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn size(&self) -> TextureSize {
        self.size
    }
}

/// Texture device backed by plain byte buffers
///
/// Used for headless presentation and tests, where it stands in for the GPU
/// with the same allocation and partial-write contract.
#[derive(Debug)]
pub struct CpuTextureDevice {
    max_dimension: u32,
    allocations: AtomicUsize,
}

impl CpuTextureDevice {
    pub fn new() -> Self {
        Self::with_max_dimension(DEFAULT_MAX_DIMENSION)
    }

    /// Device that refuses textures larger than `max_dimension` on either axis
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            max_dimension,
            allocations: AtomicUsize::new(0),
        }
    }

    /// Number of successful `create_texture` calls so far
    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::Relaxed)
    }
}

impl Default for CpuTextureDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureDevice for CpuTextureDevice {
    type Texture = CpuTexture;

    fn create_texture(&self, label: &'static str, size: TextureSize) -> Result<CpuTexture> {
        if size.is_empty() {
            return Err(PresentError::Allocation {
                size,
                reason: "zero-sized texture".into(),
            });
        }
        if size.width > self.max_dimension || size.height > self.max_dimension {
            return Err(PresentError::Allocation {
                size,
                reason: format!("exceeds maximum dimension {}", self.max_dimension),
            });
        }

        self.allocations.fetch_add(1, Ordering::Relaxed);
        Ok(CpuTexture {
            label,
            size,
            pixels: Mutex::new(vec![0; size.buffer_size()]),
        })
    }

    fn write_region(&self, texture: &CpuTexture, region: Region, bytes_per_row: u32, pixels: &[u8]) {
        let row_bytes = (region.width * BYTES_PER_PIXEL) as usize;
        let dst_pitch = (texture.size.width * BYTES_PER_PIXEL) as usize;
        let mut dst = texture.pixels.lock();

        for row in 0..region.height as usize {
            let src_offset = row * bytes_per_row as usize;
            let dst_offset = (region.y as usize + row) * dst_pitch + region.x as usize * BYTES_PER_PIXEL as usize;
            dst[dst_offset..dst_offset + row_bytes]
                .copy_from_slice(&pixels[src_offset..src_offset + row_bytes]);
        }
    }

    fn read_texture(&self, texture: &CpuTexture, size: TextureSize) -> Result<Vec<u8>> {
        if size != texture.size {
            return Err(PresentError::Readback(format!(
                "requested {:?} from texture of {:?}",
                size, texture.size
            )));
        }
        Ok(texture.pixels.lock().clone())
    }
}
