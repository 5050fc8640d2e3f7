//! Background μ-sweep.
//!
//! Walks the damping coefficient back and forth between two bounds, one
//! fixed step per firing, tracing a triangle wave. The engine runs it from a
//! [`TaskSlot`](crate::scheduler::TaskSlot) on its own interval.

use std::time::Duration;

/// Triangle sweep of μ over `[bottom, top]`.
///
/// Built through [`SweepConfig::build`](crate::config::SweepConfig::build),
/// which guarantees `bottom < top` and a positive step.
#[derive(Debug, Clone, PartialEq)]
pub struct MuSweep {
    bottom: f32,
    top: f32,
    step: f32,
    interval: Duration,
    rising: bool,
}

impl MuSweep {
    pub(crate) fn new(bottom: f32, top: f32, step: f32, interval: Duration) -> Self {
        Self {
            bottom,
            top,
            step,
            interval,
            rising: true,
        }
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.bottom
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.top
    }

    #[inline]
    pub fn step(&self) -> f32 {
        self.step
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[inline]
    pub fn is_rising(&self) -> bool {
        self.rising
    }

    /// The μ that follows `mu`, bouncing off either bound.
    pub fn next_mu(&mut self, mu: f32) -> f32 {
        let current = mu.clamp(self.bottom, self.top);
        if self.rising {
            let next = current + self.step;
            if next >= self.top {
                self.rising = false;
                self.top
            } else {
                next
            }
        } else {
            let next = current - self.step;
            if next <= self.bottom {
                self.rising = true;
                self.bottom
            } else {
                next
            }
        }
    }
}
