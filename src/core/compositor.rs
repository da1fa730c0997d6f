use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::chrome::ChromeMetadata;
use super::cursor::CursorPosition;
use super::texture_store::TextureRef;
use super::viewport::{Uniforms, ViewportTransform};

/// Textured quad vertex, positions in content pixels
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Coordinate space the source reports cursor positions in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorSpace {
    /// Relative to the content area below the chrome band
    #[default]
    Content,
    /// Relative to the top-left of the whole drawable
    Drawable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuadLayer {
    Display,
    Cursor,
}

/// One textured rectangle to draw
pub struct QuadDraw<T> {
    pub layer: QuadLayer,
    pub texture: Arc<T>,
    /// Top-left corner in content pixels
    pub origin: Vec2,
    /// Extent in content pixels, the texture's native size
    pub size: Vec2,
}

impl<T> QuadDraw<T> {
    /// Two triangles covering the quad, counter-clockwise
    pub fn vertices(&self) -> [Vertex; 6] {
        let (left, top) = (self.origin.x, self.origin.y);
        let (right, bottom) = (left + self.size.x, top + self.size.y);

        let top_left = Vertex { position: [left, top], tex_coord: [0.0, 0.0] };
        let bottom_left = Vertex { position: [left, bottom], tex_coord: [0.0, 1.0] };
        let bottom_right = Vertex { position: [right, bottom], tex_coord: [1.0, 1.0] };
        let top_right = Vertex { position: [right, top], tex_coord: [1.0, 0.0] };

        [top_left, bottom_left, bottom_right, top_left, bottom_right, top_right]
    }

    /// Top-left and bottom-right corners in normalized device coordinates
    pub fn ndc_rect(&self, transform: &ViewportTransform) -> (Vec2, Vec2) {
        (
            transform.to_ndc(self.origin),
            transform.to_ndc(self.origin + self.size),
        )
    }
}

impl<T> std::fmt::Debug for QuadDraw<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuadDraw")
            .field("layer", &self.layer)
            .field("origin", &self.origin)
            .field("size", &self.size)
            .finish()
    }
}

/// Draws for one frame, display quad first and cursor last
#[derive(Debug)]
pub struct Composition<T> {
    pub clear_color: wgpu::Color,
    pub transform: ViewportTransform,
    /// Passed through for the chrome compositing path
    pub chrome: ChromeMetadata,
    pub quads: Vec<QuadDraw<T>>,
}

impl<T> Composition<T> {
    pub fn uniforms(&self) -> Uniforms {
        self.transform.uniforms()
    }
}

#[derive(Debug)]
pub enum FramePlan<T> {
    /// Zero-area drawable, nothing is touched
    Suspended,
    /// No content uploaded yet, clear only
    Blank {
        clear_color: wgpu::Color,
        transform: ViewportTransform,
    },
    Composite(Composition<T>),
}

impl<T> FramePlan<T> {
    pub fn quads(&self) -> &[QuadDraw<T>] {
        match self {
            FramePlan::Composite(composition) => &composition.quads,
            _ => &[],
        }
    }

    pub fn quad(&self, layer: QuadLayer) -> Option<&QuadDraw<T>> {
        self.quads().iter().find(|quad| quad.layer == layer)
    }
}

/// What happened to a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Presented,
    Blank,
    Suspended,
    /// The surface could not provide a target this tick
    Skipped,
}

/// Per-frame snapshot of every input the compositor reads
pub struct FrameInputs<T> {
    pub transform: ViewportTransform,
    pub chrome: ChromeMetadata,
    pub cursor: CursorPosition,
    pub display: Option<TextureRef<T>>,
    pub cursor_image: Option<TextureRef<T>>,
}

/// Turns a frame snapshot into an ordered list of quad draws
#[derive(Debug, Clone, Copy)]
pub struct Compositor {
    clear_color: wgpu::Color,
    cursor_space: CursorSpace,
}

impl Compositor {
    pub fn new(clear_color: wgpu::Color, cursor_space: CursorSpace) -> Self {
        Self {
            clear_color,
            cursor_space,
        }
    }

    pub fn compose<T>(&self, inputs: FrameInputs<T>) -> FramePlan<T> {
        if inputs.transform.is_suspended() {
            return FramePlan::Suspended;
        }

        let Some(display) = inputs.display else {
            return FramePlan::Blank {
                clear_color: self.clear_color,
                transform: inputs.transform,
            };
        };

        // Content starts below the title band; the band itself belongs to chrome rendering
        let content_origin = Vec2::new(0.0, inputs.chrome.title_height);
        let mut quads = vec![QuadDraw {
            layer: QuadLayer::Display,
            texture: display.texture,
            origin: content_origin,
            size: Vec2::new(display.size.width as f32, display.size.height as f32),
        }];

        if let (true, Some(image)) = (inputs.cursor.visible, inputs.cursor_image) {
            let base = match self.cursor_space {
                CursorSpace::Content => content_origin,
                CursorSpace::Drawable => Vec2::ZERO,
            };
            quads.push(QuadDraw {
                layer: QuadLayer::Cursor,
                texture: image.texture,
                origin: base + Vec2::new(inputs.cursor.x as f32, inputs.cursor.y as f32),
                size: Vec2::new(image.size.width as f32, image.size.height as f32),
            });
        }

        FramePlan::Composite(Composition {
            clear_color: self.clear_color,
            transform: inputs.transform,
            chrome: inputs.chrome,
            quads,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TextureSize;

    fn texture(width: u32, height: u32) -> Option<TextureRef<()>> {
        Some(TextureRef {
            texture: Arc::new(()),
            size: TextureSize::new(width, height),
        })
    }

    fn inputs() -> FrameInputs<()> {
        FrameInputs {
            transform: ViewportTransform::new(640, 480, 1.0),
            chrome: ChromeMetadata::default(),
            cursor: CursorPosition::new(true, 10, 20),
            display: texture(640, 480),
            cursor_image: texture(16, 16),
        }
    }

    fn compositor() -> Compositor {
        Compositor::new(wgpu::Color::BLACK, CursorSpace::Content)
    }

    #[test]
    fn cursor_is_drawn_after_display() {
        let plan = compositor().compose(inputs());
        let layers: Vec<_> = plan.quads().iter().map(|quad| quad.layer).collect();
        assert_eq!(layers, vec![QuadLayer::Display, QuadLayer::Cursor]);
    }

    #[test]
    fn vertices_span_quad_with_unit_tex_coords() {
        let plan = compositor().compose(inputs());
        let cursor = plan.quad(QuadLayer::Cursor).unwrap();
        let vertices = cursor.vertices();

        assert_eq!(vertices[0].position, [10.0, 20.0]);
        assert_eq!(vertices[0].tex_coord, [0.0, 0.0]);
        assert_eq!(vertices[2].position, [26.0, 36.0]);
        assert_eq!(vertices[2].tex_coord, [1.0, 1.0]);
    }

    #[test]
    fn no_display_texture_is_blank() {
        let plan = compositor().compose(FrameInputs {
            display: None,
            ..inputs()
        });
        assert!(matches!(plan, FramePlan::Blank { .. }));
        assert!(plan.quads().is_empty());
    }

    #[test]
    fn undefined_cursor_image_emits_no_cursor_quad() {
        let plan = compositor().compose(FrameInputs {
            cursor_image: None,
            ..inputs()
        });
        assert_eq!(plan.quads().len(), 1);
        assert!(plan.quad(QuadLayer::Cursor).is_none());
    }

    #[test]
    fn drawable_cursor_space_ignores_title_band() {
        let chrome = ChromeMetadata {
            title_height: 24.0,
            blurred: false,
        };
        let content = compositor().compose(FrameInputs { chrome, ..inputs() });
        let drawable = Compositor::new(wgpu::Color::BLACK, CursorSpace::Drawable)
            .compose(FrameInputs { chrome, ..inputs() });

        assert_eq!(content.quad(QuadLayer::Cursor).unwrap().origin, Vec2::new(10.0, 44.0));
        assert_eq!(drawable.quad(QuadLayer::Cursor).unwrap().origin, Vec2::new(10.0, 20.0));
        assert_eq!(drawable.quad(QuadLayer::Display).unwrap().origin, Vec2::new(0.0, 24.0));
    }
}
