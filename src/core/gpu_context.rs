use std::sync::Arc;
use wgpu::{Adapter, Device, DeviceDescriptor, Instance, Limits, Queue, Surface};

use super::error::{PresentError, Result};

/// Shared wgpu device and queue
///
/// Cloned cheaply (Arc) between the texture device used by the producer
/// thread and the surface renderer on the presentation thread.
#[derive(Clone)]
pub struct GpuContext {
    adapter: Arc<Adapter>,
    device: Arc<Device>,
    queue: Arc<Queue>,
}

impl GpuContext {
    /// Create a GPU context without a surface (offscreen presentation, readback tests)
    pub async fn new() -> Result<Self> {
        let instance = Self::create_instance();
        let adapter = Self::request_adapter(&instance, None).await?;
        Self::from_adapter(adapter).await
    }

    /// Create a GPU context whose adapter can present to `surface`
    ///
    /// `instance` must be the instance the surface was created from.
    pub async fn new_with_surface(instance: &Instance, surface: &Surface<'_>) -> Result<Self> {
        let adapter = Self::request_adapter(instance, Some(surface)).await?;
        Self::from_adapter(adapter).await
    }

    pub fn create_instance() -> Instance {
        Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        })
    }

    /// Get reference to the adapter
    pub fn adapter(&self) -> &Adapter {
        &self.adapter
    }

    /// Get reference to the device
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Get reference to the queue
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Largest width or height a 2D texture may have on this device
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    /// Block until all submitted work, including pending buffer maps, completes
    pub fn wait_idle(&self) -> Result<()> {
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            })
            .map(|_| ())
            .map_err(|e| PresentError::Readback(format!("device poll failed: {:?}", e)))
    }

    async fn from_adapter(adapter: Adapter) -> Result<Self> {
        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = Self::request_device(&adapter).await?;

        Ok(Self {
            adapter: Arc::new(adapter),
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }

    async fn request_adapter(instance: &Instance, surface: Option<&Surface<'_>>) -> Result<Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: surface,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| PresentError::Surface(format!("no suitable adapter: {:?}", e)))
    }

    async fn request_device(adapter: &Adapter) -> Result<(Device, Queue)> {
        // Framebuffers of large guests need the adapter's real texture ceiling
        let limits = Limits {
            max_texture_dimension_2d: adapter.limits().max_texture_dimension_2d,
            ..Limits::downlevel_defaults()
        };

        adapter
            .request_device(&DeviceDescriptor {
                label: Some("Presenter Device"),
                required_features: wgpu::Features::empty(),
                required_limits: limits,
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| PresentError::Surface(format!("failed to create device: {:?}", e)))
    }
}
