//! Frame timing for the host loop.
//!
//! [`FrameClock`] measures wall time between redraws and keeps a smoothed
//! frame rate for the window title. The simulation itself never reads wall
//! time: the engine only sees the `Duration` it is ticked with.

use std::time::{Duration, Instant};

/// Longest frame delta handed to the engine. Window drags and debugger
/// stops otherwise arrive as one enormous step.
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

/// Wall-clock frame timer.
#[derive(Debug)]
pub struct FrameClock {
    last_frame: Instant,
    delta: Duration,
    frame_count: u64,
    fps: f32,
    fps_window_start: Instant,
    fps_window_frames: u64,
    fps_interval: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(now: Instant) -> Self {
        Self {
            last_frame: now,
            delta: Duration::ZERO,
            frame_count: 0,
            fps: 0.0,
            fps_window_start: now,
            fps_window_frames: 0,
            fps_interval: Duration::from_millis(500),
        }
    }

    /// Mark a new frame. Returns the clamped delta since the previous one.
    pub fn tick(&mut self) -> Duration {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> Duration {
        self.delta = now.saturating_duration_since(self.last_frame).min(MAX_FRAME_DELTA);
        self.last_frame = now;
        self.frame_count += 1;
        self.fps_window_frames += 1;

        let window = now.saturating_duration_since(self.fps_window_start);
        if window >= self.fps_interval {
            self.fps = self.fps_window_frames as f32 / window.as_secs_f32();
            self.fps_window_frames = 0;
            self.fps_window_start = now;
        }
        self.delta
    }

    #[inline]
    pub fn delta(&self) -> Duration {
        self.delta
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second over the last half second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
