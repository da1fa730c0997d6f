use glam::{UVec2, Vec2};
use parking_lot::Mutex;

use super::region::TextureSize;

/// Uniform block consumed by the quad vertex stage
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Uniforms {
    pub scale: f32,
    pub _pad: u32,
    pub viewport_size: [u32; 2],
}

/// Maps content-pixel positions to normalized device coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    /// Backing-scale factor: physical pixels per content pixel
    pub scale: f32,
    /// Drawable size in physical pixels
    pub drawable_size: UVec2,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            drawable_size: UVec2::ZERO,
        }
    }
}

impl ViewportTransform {
    pub fn new(width: u32, height: u32, scale: f32) -> Self {
        Self {
            scale,
            drawable_size: UVec2::new(width, height),
        }
    }

    /// Zero-area drawables suspend rendering until a real size arrives
    pub fn is_suspended(&self) -> bool {
        self.drawable_size.x == 0 || self.drawable_size.y == 0
    }

    /// Drawable size expressed in content pixels
    pub fn content_size(&self) -> TextureSize {
        let content = (self.drawable_size.as_vec2() / self.scale).floor();
        TextureSize::new(content.x as u32, content.y as u32)
    }

    /// Content-pixel position to NDC, y pointing up
    pub fn to_ndc(&self, point: Vec2) -> Vec2 {
        if self.is_suspended() {
            return Vec2::ZERO;
        }
        let unit = point * self.scale / self.drawable_size.as_vec2();
        Vec2::new(unit.x * 2.0 - 1.0, 1.0 - unit.y * 2.0)
    }

    /// Content area left below a title band of `title_height` content pixels
    pub fn display_size(&self, title_height: f32) -> TextureSize {
        let content = self.content_size();
        let height = (content.height as f32 - title_height).floor().max(0.0);
        TextureSize::new(content.width, height as u32)
    }

    pub fn uniforms(&self) -> Uniforms {
        Uniforms {
            scale: self.scale,
            _pad: 0,
            viewport_size: self.drawable_size.to_array(),
        }
    }
}

#[derive(Debug, Default)]
struct ViewportState {
    transform: ViewportTransform,
    title_height: f32,
    /// Last non-empty display size; kept while suspended
    display_size: Option<TextureSize>,
}

impl ViewportState {
    fn refresh(&mut self) {
        let size = self.transform.display_size(self.title_height);
        if !size.is_empty() {
            self.display_size = Some(size);
        }
    }
}

/// Holds the current transform and the display size derived from it.
///
/// Both live under one lock, so a reader never sees a transform paired
/// with the display size of an earlier one.
#[derive(Debug, Default)]
pub struct ViewportManager {
    state: Mutex<ViewportState>,
}

impl ViewportManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resize(&self, width: u32, height: u32) -> ViewportTransform {
        let mut state = self.state.lock();
        state.transform.drawable_size = UVec2::new(width, height);
        state.refresh();
        state.transform
    }

    /// Returns `None` and keeps the old factor for non-positive or non-finite input
    pub fn set_scale_factor(&self, scale: f32) -> Option<ViewportTransform> {
        if !scale.is_finite() || scale <= 0.0 {
            log::warn!("ignoring invalid backing scale factor {}", scale);
            return None;
        }
        let mut state = self.state.lock();
        state.transform.scale = scale;
        state.refresh();
        Some(state.transform)
    }

    /// Height of the chrome band the display area starts below
    pub fn set_title_height(&self, title_height: f32) {
        let mut state = self.state.lock();
        state.title_height = title_height;
        state.refresh();
    }

    pub fn current(&self) -> ViewportTransform {
        self.state.lock().transform
    }

    /// Size full-frame updates must have, `None` until a real drawable size arrives
    pub fn display_size(&self) -> Option<TextureSize> {
        self.state.lock().display_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_match_shader_layout() {
        assert_eq!(std::mem::size_of::<Uniforms>(), 16);
        let uniforms = ViewportTransform::new(800, 600, 2.0).uniforms();
        assert_eq!(uniforms.viewport_size, [800, 600]);
        assert_eq!(uniforms.scale, 2.0);
    }

    #[test]
    fn corners_map_to_ndc_extremes() {
        let transform = ViewportTransform::new(800, 600, 1.0);
        assert_eq!(transform.to_ndc(Vec2::ZERO), Vec2::new(-1.0, 1.0));
        assert_eq!(transform.to_ndc(Vec2::new(800.0, 600.0)), Vec2::new(1.0, -1.0));
        assert_eq!(transform.to_ndc(Vec2::new(400.0, 300.0)), Vec2::ZERO);
    }

    #[test]
    fn backing_scale_shrinks_content_size() {
        let transform = ViewportTransform::new(2560, 1601, 2.0);
        assert_eq!(transform.content_size(), TextureSize::new(1280, 800));
        assert_eq!(transform.to_ndc(Vec2::new(1280.0, 0.0)).x, 1.0);
    }

    #[test]
    fn zero_area_is_suspended() {
        let manager = ViewportManager::new();
        assert!(manager.current().is_suspended());
        assert!(!manager.resize(10, 10).is_suspended());
        assert!(manager.resize(10, 0).is_suspended());
    }

    #[test]
    fn invalid_scale_is_ignored() {
        let manager = ViewportManager::new();
        assert!(manager.set_scale_factor(0.0).is_none());
        assert!(manager.set_scale_factor(f32::INFINITY).is_none());
        assert_eq!(manager.current().scale, 1.0);
        assert_eq!(manager.set_scale_factor(2.0).map(|t| t.scale), Some(2.0));
    }

    #[test]
    fn display_size_excludes_title_band() {
        let manager = ViewportManager::new();
        assert_eq!(manager.display_size(), None);

        manager.resize(200, 100);
        assert_eq!(manager.display_size(), Some(TextureSize::new(200, 100)));

        manager.set_title_height(24.5);
        assert_eq!(manager.display_size(), Some(TextureSize::new(200, 75)));

        manager.set_scale_factor(2.0);
        assert_eq!(manager.display_size(), Some(TextureSize::new(100, 25)));
    }

    #[test]
    fn display_size_survives_suspend() {
        let manager = ViewportManager::new();
        manager.resize(64, 48);
        manager.resize(0, 0);
        assert_eq!(manager.display_size(), Some(TextureSize::new(64, 48)));

        // A band taller than the drawable leaves nothing to show
        manager.resize(64, 48);
        manager.set_title_height(60.0);
        assert_eq!(manager.display_size(), Some(TextureSize::new(64, 48)));
    }
}
