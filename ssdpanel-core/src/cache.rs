//! Last-written frame cache
//!
//! The controller has no "skip if unchanged" primitive, so the render loop
//! keeps the frame it last wrote and only sends a new one when it differs.

use crate::gddram::PackedFrame;

/// Remembers what the panel currently shows
#[derive(Debug, Clone, Default)]
pub struct FrameCache {
    shown: Option<PackedFrame>,
}

impl FrameCache {
    /// An empty cache: the first frame is always written
    pub const fn new() -> Self {
        Self { shown: None }
    }

    /// A cache for a panel that was just cleared
    pub const fn cleared() -> Self {
        Self {
            shown: Some(PackedFrame::blank()),
        }
    }

    /// Check if the frame differs from what the panel shows
    pub fn is_dirty(&self, frame: &PackedFrame) -> bool {
        self.shown.as_ref() != Some(frame)
    }

    /// Record a frame that was written successfully
    pub fn mark_written(&mut self, frame: PackedFrame) {
        self.shown = Some(frame);
    }

    /// Forget the shown frame, e.g. after a failed write left the panel in
    /// an unknown state
    pub fn invalidate(&mut self) {
        self.shown = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::{Framebuffer, Rgba};

    #[test]
    fn test_first_frame_is_dirty() {
        let cache = FrameCache::new();
        assert!(cache.is_dirty(&PackedFrame::blank()));
    }

    #[test]
    fn test_unchanged_frame_is_clean() {
        let mut cache = FrameCache::new();
        let mut fb = Framebuffer::new();
        fb.set_pixel(10, 10, Rgba::WHITE);

        let frame = fb.pack();
        cache.mark_written(frame.clone());
        assert!(!cache.is_dirty(&fb.pack()));

        fb.set_pixel(11, 10, Rgba::WHITE);
        assert!(cache.is_dirty(&fb.pack()));
    }

    #[test]
    fn test_cleared_panel_skips_blank_frame() {
        let cache = FrameCache::cleared();
        assert!(!cache.is_dirty(&Framebuffer::new().pack()));
    }

    #[test]
    fn test_invalidate() {
        let mut cache = FrameCache::cleared();
        cache.invalidate();
        assert!(cache.is_dirty(&PackedFrame::blank()));
    }
}
