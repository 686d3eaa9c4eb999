/// Implements timing for the application. Computes the delta time between
/// frames and the time elapsed since the loop started.
use std::time::{Duration, Instant};

pub struct Time {
    last_time: Instant,
    delta_time: Duration,
    global_time: Duration,
}

impl Time {
    pub fn new(current_instant: Instant) -> Self {
        Time {
            last_time: current_instant,
            delta_time: Duration::ZERO,
            global_time: Duration::ZERO,
        }
    }

    #[inline(always)]
    pub fn delta_seconds(&self) -> f32 {
        self.delta_time.as_secs_f32()
    }

    #[inline(always)]
    pub fn delta_milliseconds(&self) -> f32 {
        self.delta_seconds() * 1000.0
    }

    /// Seconds accumulated over every step
    #[inline(always)]
    pub fn global_seconds(&self) -> f32 {
        self.global_time.as_secs_f32()
    }

    /// Advance to `instant`. An instant older than the last one counts as
    /// no time at all.
    pub fn step(&mut self, instant: Instant) {
        self.delta_time = instant.saturating_duration_since(self.last_time);
        self.global_time += self.delta_time;
        self.last_time = instant;
    }
}
