#![forbid(unsafe_code)]

use alloc::vec;
use alloc::vec::Vec;

/// Ring buffers of heartbeat timestamps and per-interval loss counts.
///
/// The two rings share a capacity but advance on independent cursors:
/// a loss observation moves both, a sent heartbeat moves only the
/// heartbeat cursor. Slots start at zero and are overwritten on wrap.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    heartbeats: Vec<f64>,
    losses: Vec<u32>,
    hb_idx: usize,
    loss_idx: usize,
    /// Slot holding the most recently written timestamp.
    latest: usize,
}

impl SampleWindow {
    /// A zero capacity is raised to one slot.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            heartbeats: vec![0.0; capacity],
            losses: vec![0; capacity],
            hb_idx: 0,
            loss_idx: 0,
            latest: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.heartbeats.len()
    }

    /// Overwrite the current slot, then advance.
    pub fn record_heartbeat_time(&mut self, t: f64) {
        self.heartbeats[self.hb_idx] = t;
        self.latest = self.hb_idx;
        self.hb_idx = (self.hb_idx + 1) % self.heartbeats.len();
    }

    pub fn record_loss_count(&mut self, missed: u32) {
        self.losses[self.loss_idx] = missed;
        self.loss_idx = (self.loss_idx + 1) % self.losses.len();
    }

    /// Write into the current slot without moving the cursor.
    /// The next `record_heartbeat_time` overwrites it.
    pub fn stamp_heartbeat(&mut self, t: f64) {
        self.heartbeats[self.hb_idx] = t;
        self.latest = self.hb_idx;
    }

    /// Advance first, then write. Leaves the loss cursor alone.
    pub fn advance_heartbeat(&mut self, t: f64) {
        self.hb_idx = (self.hb_idx + 1) % self.heartbeats.len();
        self.heartbeats[self.hb_idx] = t;
        self.latest = self.hb_idx;
    }

    pub fn latest_heartbeat_time(&self) -> f64 {
        self.heartbeats[self.latest]
    }

    pub fn heartbeats(&self) -> &[f64] {
        &self.heartbeats
    }

    pub fn losses(&self) -> &[u32] {
        &self.losses
    }

    pub fn heartbeat_cursor(&self) -> usize {
        self.hb_idx
    }

    pub fn loss_cursor(&self) -> usize {
        self.loss_idx
    }

    pub fn loss_sum(&self) -> u64 {
        self.losses.iter().map(|&n| n as u64).sum()
    }

    /// Differences between adjacent slots in storage order (slot i-1 to slot i).
    /// After a wrap this is not arrival order.
    pub fn intervals(&self) -> impl Iterator<Item = f64> + '_ {
        self.heartbeats.windows(2).map(|w| w[1] - w[0])
    }
}
