//! Easing curves and wall-clock progress.
//!
//! Progress is always computed from the absolute time elapsed since a
//! recorded start instant, never by counting ticks, so irregular or
//! coalesced timer callbacks produce the same picture.

use std::time::{Duration, Instant};

pub fn ease_out_cubic(t: f32) -> f32 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

pub fn ease_out_quad(t: f32) -> f32 {
    let inv = 1.0 - t;
    1.0 - inv * inv
}

pub fn ease_in_quad(t: f32) -> f32 { t * t }

/// Quick quadratic rise over the first 15%, then a quadratic decay to zero.
pub fn flash_envelope(t: f32) -> f32 {
    const RISE: f32 = 0.15;
    if t < RISE {
        let s = t / RISE;
        s * s
    } else {
        let s = (t - RISE) / (1.0 - RISE);
        (1.0 - s) * (1.0 - s)
    }
}

/// `1 − t²`: the accelerating fade used by every widget's fade-out.
pub fn fade_out_alpha(t: f32) -> f32 { 1.0 - ease_in_quad(t.clamp(0.0, 1.0)) }

/// A running animation anchored at `start`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AnimationClock {
    start: Instant,
    duration: Duration,
}

impl AnimationClock {
    pub fn new(start: Instant, duration: Duration) -> Self { Self { start, duration } }

    pub fn elapsed(&self, now: Instant) -> Duration { now.saturating_duration_since(self.start) }

    /// Unclamped progress; `>= 1.0` means finished. A zero duration is
    /// finished immediately.
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed(now).as_secs_f64() / self.duration.as_secs_f64()) as f32
    }

    pub fn is_finished(&self, now: Instant) -> bool { self.progress(now) >= 1.0 }
}

/// Per-item reveal timing for a staggered intro.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StaggerTiming {
    pub item: Duration,
    pub stagger: Duration,
}

impl StaggerTiming {
    /// `item + (n − 1)·stagger`; the stagger term vanishes for a single item.
    pub fn total(&self, count: usize) -> Duration {
        let extra = count.saturating_sub(1) as u32;
        self.item + self.stagger * extra
    }

    /// Pre-easing progress of item `index` out of `count` at global progress
    /// `global` (0..1 over [`StaggerTiming::total`]).
    pub fn local_progress(&self, index: usize, count: usize, global: f32) -> f32 {
        let total = self.total(count).as_secs_f32();
        if total <= 0.0 {
            return 1.0;
        }
        let delay = (self.stagger.as_secs_f32() * index as f32) / total;
        let span = self.item.as_secs_f32() / total;
        if span <= 0.0 {
            return if global >= delay { 1.0 } else { 0.0 };
        }
        ((global - delay) / span).clamp(0.0, 1.0)
    }

    /// Eased reveal of item `index`.
    pub fn reveal(&self, index: usize, count: usize, global: f32) -> f32 {
        ease_out_quad(self.local_progress(index, count, global))
    }
}

/// Vertical offset of a panel sliding up into place over the first half of
/// its intro.
pub fn slide_offset(global: f32, distance: i32) -> i32 {
    let t = (global * 2.0).clamp(0.0, 1.0);
    ((1.0 - ease_out_quad(t)) * distance as f32) as i32
}
