//! Frame scheduling.
//!
//! The renderer never talks to a platform timer directly. It asks a
//! [`FrameScheduler`] for the next frame and keeps the returned
//! [`FrameHandle`] as its cancellation token; the host delivers frames by
//! calling back with that handle.

use std::time::{Duration, Instant};

/// Identifies one requested frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    /// Wrap a scheduler-assigned id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The scheduler-assigned id.
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Host side of the request-next-frame pattern.
pub trait FrameScheduler {
    /// Ask for one more frame.
    fn request_frame(&mut self) -> FrameHandle;

    /// Revoke a requested frame so it is never delivered.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Fixed-cadence scheduler for hosts that drive frames from their own loop.
#[derive(Debug)]
pub struct FrameClock {
    interval: Duration,
    /// Time of the last delivered frame.
    last_tick: Instant,
    pending: Option<FrameHandle>,
    next_id: u64,
}

impl FrameClock {
    /// Create a clock ticking every `interval`, starting from `now`.
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last_tick: now,
            pending: None,
            next_id: 0,
        }
    }

    /// Create a clock from a frame rate, clamped to at least one frame per second.
    pub fn with_fps(fps: u32, now: Instant) -> Self {
        Self::new(Duration::from_secs(1) / fps.max(1), now)
    }

    /// Time between frames.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Take the outstanding frame if it is due at `now`.
    pub fn take_due(&mut self, now: Instant) -> Option<FrameHandle> {
        let due = self.next_wakeup().is_some_and(|at| now >= at);
        if !due {
            return None;
        }
        self.last_tick = now;
        self.pending.take()
    }

    /// When the outstanding frame becomes due, if any.
    pub fn next_wakeup(&self) -> Option<Instant> {
        self.pending.map(|_| self.last_tick + self.interval)
    }

    /// The outstanding frame, if any.
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }
}

impl FrameScheduler for FrameClock {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle::new(self.next_id);
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}
