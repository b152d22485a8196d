//! Frame registrations
//!
//! Animation-frame style scheduling without callbacks: a loop asks for the
//! next frame with [`FrameScheduler::request`], the host delivers a tick, and
//! every registration due on that tick fires exactly once. A loop that wants
//! to keep running requests again while handling its tick; stopping a loop
//! is just cancelling (or not renewing) its handle.

/// Handle for one pending frame registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

/// What a registration drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameTask {
    /// Crossfade interpolation (and the preload watchdog)
    Crossfade,
    /// Progress polling and auto-advance detection
    Progress,
}

/// One-shot frame registrations
#[derive(Debug, Default)]
pub struct FrameScheduler {
    next_id: u64,
    pending: Vec<(FrameHandle, FrameTask)>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `task` for the next tick
    pub fn request(&mut self, task: FrameTask) -> FrameHandle {
        let handle = FrameHandle(self.next_id);
        self.next_id += 1;
        self.pending.push((handle, task));
        handle
    }

    /// Drop a registration before it fires
    ///
    /// Returns false if the handle already fired or was cancelled.
    pub fn cancel(&mut self, handle: FrameHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(pending, _)| *pending != handle);
        self.pending.len() != before
    }

    /// Whether any loop is waiting for a tick
    ///
    /// Hosts can stop ticking while this is false.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.pending.iter().any(|(pending, _)| *pending == handle)
    }

    /// Take everything due on this tick, in registration order
    ///
    /// Registrations made while handling these fire on the following tick.
    pub fn take_due(&mut self) -> Vec<(FrameHandle, FrameTask)> {
        std::mem::take(&mut self.pending)
    }
}
