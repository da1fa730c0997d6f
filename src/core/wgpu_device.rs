use wgpu::{Texture, TextureView};

use super::error::{PresentError, Result};
use super::gpu_context::GpuContext;
use super::region::{PixelFormat, Region, TextureSize, BYTES_PER_PIXEL};
use crate::traits::TextureDevice;

/// GPU texture plus the view the quad pipeline samples from
pub struct GpuTexture {
    texture: Texture,
    view: TextureView,
    size: TextureSize,
}

impl GpuTexture {
    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    pub fn view(&self) -> &TextureView {
        &self.view
    }

    pub fn size(&self) -> TextureSize {
        self.size
    }
}

/// Texture device on a wgpu queue
#[derive(Clone)]
pub struct WgpuTextureDevice {
    gpu: GpuContext,
    format: wgpu::TextureFormat,
}

impl WgpuTextureDevice {
    pub fn new(gpu: GpuContext, pixel_format: PixelFormat) -> Self {
        Self {
            gpu,
            format: pixel_format.texture_format(),
        }
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }
}

impl TextureDevice for WgpuTextureDevice {
    type Texture = GpuTexture;

    fn create_texture(&self, label: &'static str, size: TextureSize) -> Result<GpuTexture> {
        let max = self.gpu.max_texture_dimension();
        if size.is_empty() || size.width > max || size.height > max {
            return Err(PresentError::Allocation {
                size,
                reason: format!("outside device range 1..={}", max),
            });
        }

        let device = self.gpu.device();
        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(PresentError::Allocation {
                size,
                reason: err.to_string(),
            });
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(GpuTexture { texture, view, size })
    }

    fn write_region(&self, texture: &GpuTexture, region: Region, bytes_per_row: u32, pixels: &[u8]) {
        self.gpu.queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture.texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: region.x,
                    y: region.y,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(region.height),
            },
            wgpu::Extent3d {
                width: region.width,
                height: region.height,
                depth_or_array_layers: 1,
            },
        );
    }

    fn read_texture(&self, texture: &GpuTexture, size: TextureSize) -> Result<Vec<u8>> {
        if size != texture.size {
            return Err(PresentError::Readback(format!(
                "requested {:?} from texture of {:?}",
                size, texture.size
            )));
        }

        let row_bytes = size.width * BYTES_PER_PIXEL;
        let padded_row = row_bytes.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

        let device = self.gpu.device();
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Texture Readback Buffer"),
            size: padded_row as u64 * size.height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Texture Readback Encoder"),
        });
        encoder.copy_texture_to_buffer(
            texture.texture.as_image_copy(),
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(size.height),
                },
            },
            wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
        );
        self.gpu.queue().submit(Some(encoder.finish()));

        unpad_rows(&self.gpu, &buffer, padded_row as usize, row_bytes as usize, size)
    }
}

/// Map a readback buffer and strip the per-row copy alignment padding
fn unpad_rows(
    gpu: &GpuContext,
    buffer: &wgpu::Buffer,
    padded_row: usize,
    row_bytes: usize,
    size: TextureSize,
) -> Result<Vec<u8>> {
    let slice = buffer.slice(..);
    let (sender, receiver) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |mapped| {
        sender.send(mapped).ok();
    });
    gpu.wait_idle()?;

    receiver
        .recv()
        .map_err(|_| PresentError::Readback("map callback never ran".into()))?
        .map_err(|e| PresentError::Readback(format!("buffer mapping failed: {}", e)))?;

    let pixels = {
        let mapped = slice.get_mapped_range();
        let mut pixels = Vec::with_capacity(size.buffer_size());
        for row in mapped.chunks_exact(padded_row) {
            pixels.extend_from_slice(&row[..row_bytes]);
        }
        pixels
    };
    buffer.unmap();
    Ok(pixels)
}
