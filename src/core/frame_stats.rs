use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::compositor::{FrameStatus, QuadLayer};

/// Counters shared by the producer and presentation threads
#[derive(Debug, Default)]
pub struct FrameStats {
    frames_presented: AtomicU64,
    frames_blank: AtomicU64,
    frames_suspended: AtomicU64,
    frames_skipped: AtomicU64,
    regions_uploaded: AtomicU64,
    regions_dropped: AtomicU64,
    bytes_uploaded: AtomicU64,
    display_allocations: AtomicU64,
    cursor_allocations: AtomicU64,
    allocation_failures: AtomicU64,
}

/// Point-in-time copy of [`FrameStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FrameStatsSnapshot {
    pub frames_presented: u64,
    pub frames_blank: u64,
    pub frames_suspended: u64,
    pub frames_skipped: u64,
    pub regions_uploaded: u64,
    pub regions_dropped: u64,
    pub bytes_uploaded: u64,
    pub display_allocations: u64,
    pub cursor_allocations: u64,
    pub allocation_failures: u64,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_frame(&self, status: FrameStatus) {
        let counter = match status {
            FrameStatus::Presented => &self.frames_presented,
            FrameStatus::Blank => &self.frames_blank,
            FrameStatus::Suspended => &self.frames_suspended,
            FrameStatus::Skipped => &self.frames_skipped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_upload(&self, bytes: u64) {
        self.regions_uploaded.fetch_add(1, Ordering::Relaxed);
        self.bytes_uploaded.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.regions_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_allocation(&self, layer: QuadLayer) {
        let counter = match layer {
            QuadLayer::Display => &self.display_allocations,
            QuadLayer::Cursor => &self.cursor_allocations,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_allocation_failure(&self) {
        self.allocation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> FrameStatsSnapshot {
        FrameStatsSnapshot {
            frames_presented: self.frames_presented.load(Ordering::Relaxed),
            frames_blank: self.frames_blank.load(Ordering::Relaxed),
            frames_suspended: self.frames_suspended.load(Ordering::Relaxed),
            frames_skipped: self.frames_skipped.load(Ordering::Relaxed),
            regions_uploaded: self.regions_uploaded.load(Ordering::Relaxed),
            regions_dropped: self.regions_dropped.load(Ordering::Relaxed),
            bytes_uploaded: self.bytes_uploaded.load(Ordering::Relaxed),
            display_allocations: self.display_allocations.load(Ordering::Relaxed),
            cursor_allocations: self.cursor_allocations.load(Ordering::Relaxed),
            allocation_failures: self.allocation_failures.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_are_counted_by_status() {
        let stats = FrameStats::new();
        stats.record_frame(FrameStatus::Presented);
        stats.record_frame(FrameStatus::Presented);
        stats.record_frame(FrameStatus::Suspended);

        let snap = stats.snapshot();
        assert_eq!(snap.frames_presented, 2);
        assert_eq!(snap.frames_suspended, 1);
        assert_eq!(snap.frames_blank, 0);
    }

    #[test]
    fn allocations_are_counted_per_texture() {
        let stats = FrameStats::new();
        stats.record_allocation(QuadLayer::Display);
        stats.record_allocation(QuadLayer::Cursor);
        stats.record_allocation(QuadLayer::Cursor);

        let snap = stats.snapshot();
        assert_eq!(snap.display_allocations, 1);
        assert_eq!(snap.cursor_allocations, 2);
    }

    #[test]
    fn snapshot_serializes() {
        let stats = FrameStats::new();
        stats.record_upload(64);
        let json = serde_json::to_string(&stats.snapshot()).unwrap();
        assert!(json.contains("\"bytes_uploaded\":64"));
    }
}
