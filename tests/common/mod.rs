#![allow(dead_code)]

use glam::{UVec2, Vec2};

use fb_presenter::core::{CpuTexture, CpuTextureDevice, FramePlan, FrameStatus, QuadLayer, Result};
use fb_presenter::{DisplaySink, PresentableSurface, Presenter, PresenterConfig};

/// What a recording surface saw for one quad
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuad {
    pub layer: QuadLayer,
    pub origin: Vec2,
    pub size: Vec2,
    pub ndc_min: Vec2,
    pub ndc_max: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFrame {
    pub status: FrameStatus,
    pub drawable: Option<UVec2>,
    pub quads: Vec<RecordedQuad>,
}

/// Surface that records plans instead of drawing them
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub frames: Vec<RecordedFrame>,
}

impl RecordingSurface {
    pub fn last(&self) -> &RecordedFrame {
        self.frames.last().expect("no frame recorded")
    }
}

impl PresentableSurface<CpuTexture> for RecordingSurface {
    fn present(&mut self, plan: &FramePlan<CpuTexture>) -> Result<FrameStatus> {
        let frame = match plan {
            FramePlan::Suspended => RecordedFrame {
                status: FrameStatus::Suspended,
                drawable: None,
                quads: Vec::new(),
            },
            FramePlan::Blank { transform, .. } => RecordedFrame {
                status: FrameStatus::Blank,
                drawable: Some(transform.drawable_size),
                quads: Vec::new(),
            },
            FramePlan::Composite(composition) => RecordedFrame {
                status: FrameStatus::Presented,
                drawable: Some(composition.transform.drawable_size),
                quads: composition
                    .quads
                    .iter()
                    .map(|quad| {
                        let (ndc_min, ndc_max) = quad.ndc_rect(&composition.transform);
                        RecordedQuad {
                            layer: quad.layer,
                            origin: quad.origin,
                            size: quad.size,
                            ndc_min,
                            ndc_max,
                        }
                    })
                    .collect(),
            },
        };

        let status = frame.status;
        self.frames.push(frame);
        Ok(status)
    }
}

pub fn solid(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
    pixel.repeat((width * height) as usize)
}

pub fn presenter() -> Presenter<CpuTextureDevice> {
    Presenter::new(CpuTextureDevice::new(), &PresenterConfig::default())
}

/// Presenter sized to `width × height` with solid content already uploaded
pub fn presenter_with_content(width: u32, height: u32) -> Presenter<CpuTextureDevice> {
    let presenter = presenter();
    presenter.resize(width, height);
    let pixels = solid(width, height, [40, 40, 40, 255]);
    presenter.update_region(fb_presenter::DirtyUpdate::new(&pixels, 0, 0, width, height, width * 4));
    presenter
}

pub fn pixel_at(pixels: &[u8], width: u32, x: u32, y: u32) -> &[u8] {
    let offset = ((y * width + x) * 4) as usize;
    &pixels[offset..offset + 4]
}
