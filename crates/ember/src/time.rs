//! Frame timing and delta time.
//!
//! The [`TimeSystem`] is updated at the start of each frame. Systems read it
//! for frame delta and total elapsed time. Headless drivers and tests step
//! it with [`TimeSystem::advance`] instead of the wall clock.

use std::time::{Duration, Instant};

use crate::ecs::System;

/// Frame timing service.
#[derive(Debug, Clone, Copy)]
pub struct TimeSystem {
    startup: Instant,
    frame_start: Instant,
    delta: Duration,
    elapsed: Duration,
    frame_count: u64,
}

impl System for TimeSystem {}

impl TimeSystem {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            startup: now,
            frame_start: now,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Measure the wall-clock time since the previous frame.
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta = now - self.frame_start;
        self.frame_start = now;
        self.elapsed = now - self.startup;
        self.frame_count += 1;
    }

    /// Step by a fixed amount instead of reading the clock.
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.frame_start += delta;
        self.elapsed += delta;
        self.frame_count += 1;
    }

    /// Duration of the previous frame.
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Delta time in seconds (f32), the most common way to use it.
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Number of frames stepped so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Estimated FPS based on the last frame's delta.
    pub fn fps(&self) -> f32 {
        if self.delta.as_secs_f32() > 0.0 {
            1.0 / self.delta.as_secs_f32()
        } else {
            0.0
        }
    }
}

impl Default for TimeSystem {
    fn default() -> Self {
        Self::new()
    }
}
