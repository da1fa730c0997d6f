pub mod chrome;
pub mod compositor;
pub mod cpu_device;
pub mod cursor;
pub mod error;
pub mod frame_stats;
pub mod gpu_context;
pub mod presenter;
pub mod region;
pub mod surface_renderer;
pub mod texture_store;
pub mod viewport;
pub mod wgpu_device;

pub use chrome::{ChromeMetadata, ChromeState};
pub use compositor::{
    Composition, Compositor, CursorSpace, FrameInputs, FramePlan, FrameStatus, QuadDraw,
    QuadLayer, Vertex,
};
pub use cpu_device::{CpuTexture, CpuTextureDevice};
pub use cursor::{CursorPosition, CursorState};
pub use error::{PresentError, Result};
pub use frame_stats::{FrameStats, FrameStatsSnapshot};
pub use gpu_context::GpuContext;
pub use presenter::Presenter;
pub use region::{DirtyUpdate, PixelFormat, Region, TextureSize, BYTES_PER_PIXEL};
pub use surface_renderer::SurfaceRenderer;
pub use texture_store::{TextureRef, TextureStore, Upload};
pub use viewport::{Uniforms, ViewportManager, ViewportTransform};
pub use wgpu_device::{GpuTexture, WgpuTextureDevice};
