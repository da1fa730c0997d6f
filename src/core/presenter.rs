use super::chrome::{ChromeMetadata, ChromeState};
use super::compositor::{Compositor, FrameInputs, FramePlan, FrameStatus, QuadLayer};
use super::cursor::{CursorPosition, CursorState};
use super::error::{PresentError, Result};
use super::frame_stats::{FrameStats, FrameStatsSnapshot};
use super::region::{required_len, DirtyUpdate, TextureSize};
use super::texture_store::{TextureStore, Upload};
use super::viewport::{ViewportManager, ViewportTransform};
use crate::config::PresenterConfig;
use crate::traits::{DisplaySink, PresentableSurface, TextureDevice};

/// Presentation engine: framebuffer and cursor in, one composed frame per tick out.
///
/// Share it behind an `Arc`: the framebuffer source drives it through
/// [`DisplaySink`] while the presentation thread calls [`Presenter::render_frame`].
/// Every resource has its own lock, so neither side waits for a whole frame.
pub struct Presenter<D: TextureDevice> {
    store: TextureStore<D>,
    cursor: CursorState,
    chrome: ChromeState,
    viewport: ViewportManager,
    compositor: Compositor,
    stats: FrameStats,
}

impl<D: TextureDevice> Presenter<D> {
    pub fn new(device: D, config: &PresenterConfig) -> Self {
        Self {
            store: TextureStore::new(device),
            cursor: CursorState::new(),
            chrome: ChromeState::new(),
            viewport: ViewportManager::new(),
            compositor: Compositor::new(config.clear_color(), config.cursor_space),
            stats: FrameStats::new(),
        }
    }

    pub fn store(&self) -> &TextureStore<D> {
        &self.store
    }

    pub fn viewport(&self) -> ViewportTransform {
        self.viewport.current()
    }

    /// Size a full-frame update must have to (re)allocate the display texture:
    /// the drawable in content pixels minus the title band. Empty until the
    /// first non-empty resize; kept through a suspend.
    pub fn content_size(&self) -> TextureSize {
        self.viewport.display_size().unwrap_or(TextureSize::new(0, 0))
    }

    pub fn cursor(&self) -> CursorPosition {
        self.cursor.snapshot()
    }

    pub fn chrome(&self) -> ChromeMetadata {
        self.chrome.snapshot()
    }

    pub fn stats(&self) -> FrameStatsSnapshot {
        self.stats.snapshot()
    }

    /// Replace the whole display image at an explicit size
    pub fn define_display(&self, pixels: &[u8], width: u32, height: u32, stride: u32) {
        let result = self.store.define_display(pixels, width, height, stride);
        self.absorb(QuadLayer::Display, result, required_len(width, height, stride));
    }

    /// Snapshot every input once and compose the frame
    pub fn plan_frame(&self) -> FramePlan<D::Texture> {
        self.compositor.compose(FrameInputs {
            transform: self.viewport.current(),
            chrome: self.chrome.snapshot(),
            cursor: self.cursor.snapshot(),
            display: self.store.display(),
            cursor_image: self.store.cursor(),
        })
    }

    /// Compose and present one frame. Safe with no pending updates and before any content.
    pub fn render_frame<S>(&self, surface: &mut S) -> Result<FrameStatus>
    where
        S: PresentableSurface<D::Texture> + ?Sized,
    {
        let plan = self.plan_frame();
        match surface.present(&plan) {
            Ok(status) => {
                self.stats.record_frame(status);
                Ok(status)
            }
            Err(err) => {
                self.stats.record_frame(FrameStatus::Skipped);
                Err(err)
            }
        }
    }

    /// Tear down both textures
    pub fn release(&self) {
        self.store.release();
        log::debug!("presenter textures released");
    }

    fn absorb(&self, layer: QuadLayer, result: Result<Upload>, bytes: usize) {
        let what = match layer {
            QuadLayer::Display => "display update",
            QuadLayer::Cursor => "cursor define",
        };
        match result {
            Ok(upload) => {
                if upload == Upload::Reallocated {
                    self.stats.record_allocation(layer);
                }
                self.stats.record_upload(bytes as u64);
            }
            Err(err @ PresentError::Allocation { .. }) => {
                self.stats.record_allocation_failure();
                log::warn!("{} kept previous texture: {}", what, err);
            }
            Err(err @ PresentError::InvalidBuffer(_)) => {
                self.stats.record_dropped();
                log::warn!("{} dropped: {}", what, err);
            }
            Err(err) => {
                // Stale or racy damage from the source is routine
                self.stats.record_dropped();
                log::debug!("{} dropped: {}", what, err);
            }
        }
    }
}

impl<D: TextureDevice> DisplaySink for Presenter<D> {
    fn update_region(&self, update: DirtyUpdate<'_>) {
        // Read at upload time from the same state `content_size` reports
        let result = self.store.upload_region(&update, self.viewport.display_size());
        self.absorb(
            QuadLayer::Display,
            result,
            required_len(update.width, update.height, update.stride),
        );
    }

    fn define_cursor(&self, pixels: &[u8], width: u32, height: u32, stride: u32) {
        let result = self.store.define_cursor(pixels, width, height, stride);
        self.absorb(QuadLayer::Cursor, result, required_len(width, height, stride));
    }

    fn set_cursor_visible(&self, visible: bool, x: i32, y: i32) {
        self.cursor.set(visible, x, y);
    }

    fn resize(&self, width: u32, height: u32) {
        let transform = self.viewport.resize(width, height);
        if transform.is_suspended() {
            log::debug!("drawable is {}x{}, rendering suspended", width, height);
        }
    }

    fn set_scale_factor(&self, scale: f32) {
        self.viewport.set_scale_factor(scale);
    }

    fn set_chrome(&self, title_height: f32, blurred: bool) {
        let chrome = self.chrome.set(title_height, blurred);
        self.viewport.set_title_height(chrome.title_height);
    }
}
