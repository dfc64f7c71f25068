use std::sync::Arc;

use parking_lot::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Debug, Default)]
struct ManualState {
    next_id: u64,
    pending: Option<FrameHandle>,
    cancelled: Vec<FrameHandle>,
    requested: u64,
}

/// Scheduler driven by hand, for tests and headless runs.
///
/// Clones share state, so a caller can keep one to inspect and drive frames
/// while the simulator owns another.
#[derive(Clone, Debug, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_pending(&self) -> Option<FrameHandle> {
        self.state.lock().pending.take()
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.state.lock().pending
    }

    pub fn was_cancelled(&self, handle: FrameHandle) -> bool {
        self.state.lock().cancelled.contains(&handle)
    }

    pub fn requested(&self) -> u64 {
        self.state.lock().requested
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let mut state = self.state.lock();
        state.next_id += 1;
        state.requested += 1;
        let handle = FrameHandle::new(state.next_id);
        state.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut state = self.state.lock();
        if state.pending == Some(handle) {
            state.pending = None;
        }
        state.cancelled.push(handle);
    }
}
