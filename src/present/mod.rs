use std::time::{Duration, Instant};

use crate::scoring::CanonicalResult;

/// STEM / non-STEM badge text. The 0.5 boundary counts as STEM.
pub fn stem_label(probability: f64) -> &'static str {
    if probability >= 0.5 {
        "STEM"
    } else {
        "non-STEM"
    }
}

/// Breakdown series for chart rendering: (factor name, whole percent).
pub fn breakdown_bars(result: &CanonicalResult) -> Vec<(String, u64)> {
    result
        .breakdown
        .iter()
        .map(|entry| (entry.name.clone(), entry.value_percent.round() as u64))
        .collect()
}

/// Ramps the displayed score from 0 toward its target over a fixed
/// duration, sampled with wall-clock instants on UI ticks. Whatever the
/// sampling jitter, any sample at or past the deadline returns the exact
/// target. Owned by one session's result view; dropped on restart so a
/// late tick can never write into a new session.
#[derive(Debug, Clone)]
pub struct ScoreAnimation {
    started: Instant,
    duration: Duration,
    target: f64,
}

impl ScoreAnimation {
    pub fn new(target: f64, duration: Duration) -> Self {
        Self::starting_at(target, duration, Instant::now())
    }

    /// Deterministic constructor used by tests.
    pub fn starting_at(target: f64, duration: Duration, started: Instant) -> Self {
        Self {
            started,
            duration,
            target,
        }
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn value_at(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.started);
        if elapsed >= self.duration || self.duration.is_zero() {
            return self.target;
        }
        let progress = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.target * progress
    }

    pub fn value(&self) -> f64 {
        self.value_at(Instant::now())
    }

    pub fn is_done_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.duration
    }
}
