use crate::core::DirtyUpdate;

/// Everything a framebuffer source can tell the presenter.
///
/// Updates are best effort: nothing here reports failure back to the
/// source, and the next frame reflects the most recent accepted state.
pub trait DisplaySink: Send + Sync {
    /// Copy a dirty rectangle into the display texture
    fn update_region(&self, update: DirtyUpdate<'_>);

    /// Replace the cursor image
    fn define_cursor(&self, pixels: &[u8], width: u32, height: u32, stride: u32);

    /// Move and show or hide the cursor as one update
    fn set_cursor_visible(&self, visible: bool, x: i32, y: i32);

    /// New drawable size in physical pixels
    fn resize(&self, width: u32, height: u32);

    /// New backing-scale factor (physical pixels per content pixel)
    fn set_scale_factor(&self, scale: f32);

    /// Window chrome metadata: title band height in content pixels and blur hint
    fn set_chrome(&self, title_height: f32, blurred: bool);
}
