//! Frame scheduling.
//!
//! Two states: `Idle` before the first frame, `Running` forever after. There
//! is no stop transition; ending the loop is host teardown. The scheduler
//! owns elapsed-time derivation and an optional FPS cap; the strict per-frame
//! ordering (resize, compose, draw, reschedule) lives in the windowing shell
//! that calls [`FrameScheduler::begin_frame`] once per iteration.

use std::time::{Duration, Instant};

/// Lifecycle of the render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
}

/// Time state handed to the uniform composer for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    /// Seconds since the loop entered `Running`.
    pub seconds: f32,
    /// Monotonic frame counter for the session.
    pub frame_index: u64,
}

#[derive(Debug)]
pub struct FrameScheduler {
    phase: Phase,
    origin: Option<Instant>,
    frame: u64,
    frame_interval: Option<Duration>,
    last_rendered: Option<Instant>,
}

impl FrameScheduler {
    /// Creates a scheduler, optionally capped. `fps <= 0` means uncapped.
    pub fn new(target_fps: Option<f32>) -> Self {
        let frame_interval = target_fps
            .filter(|fps| *fps > 0.0)
            .map(|fps| Duration::from_secs_f64(1.0 / f64::from(fps)));
        Self {
            phase: Phase::Idle,
            origin: None,
            frame: 0,
            frame_interval,
            last_rendered: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Starts a frame, transitioning `Idle -> Running` on the first call.
    ///
    /// Elapsed seconds are measured from that first transition, so the clock
    /// the shaders see always starts at zero.
    pub fn begin_frame(&mut self, now: Instant) -> FrameClock {
        let origin = *self.origin.get_or_insert(now);
        self.phase = Phase::Running;
        let clock = FrameClock {
            seconds: now.saturating_duration_since(origin).as_secs_f32(),
            frame_index: self.frame,
        };
        self.frame = self.frame.saturating_add(1);
        clock
    }

    /// Whether the cap allows another frame at `now`.
    pub fn ready_for_frame(&self, now: Instant) -> bool {
        match self.next_deadline() {
            Some(deadline) => now >= deadline,
            None => true,
        }
    }

    /// Earliest instant the next frame may render, when capped.
    pub fn next_deadline(&self) -> Option<Instant> {
        let interval = self.frame_interval?;
        let last = self.last_rendered?;
        Some(last + interval)
    }

    /// Records a presented frame for cap bookkeeping.
    pub fn mark_rendered(&mut self, now: Instant) {
        self.last_rendered = Some(now);
    }
}
