use parking_lot::Mutex;

/// Window decoration metadata. Affects layout only, never pixel content.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChromeMetadata {
    /// Height of the title band in content pixels
    pub title_height: f32,
    /// Hint for the chrome compositing path; the content quad ignores it
    pub blurred: bool,
}

#[derive(Debug, Default)]
pub struct ChromeState {
    metadata: Mutex<ChromeMetadata>,
}

impl ChromeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Negative or non-finite heights collapse to zero. Returns what was stored.
    pub fn set(&self, title_height: f32, blurred: bool) -> ChromeMetadata {
        let title_height = if title_height.is_finite() && title_height > 0.0 {
            title_height
        } else {
            if title_height != 0.0 {
                log::warn!("ignoring invalid title height {}", title_height);
            }
            0.0
        };
        let metadata = ChromeMetadata {
            title_height,
            blurred,
        };
        *self.metadata.lock() = metadata;
        metadata
    }

    pub fn snapshot(&self) -> ChromeMetadata {
        *self.metadata.lock()
    }
}
