use crate::core::{FramePlan, FrameStatus, Result};

/// Target that turns a composed frame plan into pixels on screen
pub trait PresentableSurface<T> {
    /// Draw `plan` and present it.
    ///
    /// Must accept every plan variant: a suspended plan draws nothing and a
    /// blank plan only clears.
    fn present(&mut self, plan: &FramePlan<T>) -> Result<FrameStatus>;
}
