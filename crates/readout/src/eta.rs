//! Smoothed time-remaining estimation.
//!
//! Each observation records a seconds-per-item sample computed from the
//! total time since the indicator started, `elapsed / (progress + 1)`. The
//! `+ 1` keeps the very first sample finite. The exposed estimate is the
//! mean of the last [`ETA_SMA_WINDOW`] samples multiplied by the items left,
//! and it is recomputed at most once per [`ETA_INTERVAL`] so the display
//! does not flicker on fast loops.
//!
//! Samples are cumulative averages rather than per-interval deltas, which
//! makes the estimate slow to react to a sudden change of pace late in a run.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::trace;

/// Number of samples in the moving-average window.
pub const ETA_SMA_WINDOW: usize = 9;

/// Minimum time between two recomputations of the estimate.
pub const ETA_INTERVAL: Duration = Duration::from_secs(1);

/// Sliding-window remaining-time estimator.
#[derive(Debug, Clone)]
pub struct EtaEstimator {
    started_at: Instant,
    last_recalc: Instant,
    samples: VecDeque<f64>,
    seconds_per_item: Option<f64>,
    remaining: Option<Duration>,
}

impl EtaEstimator {
    /// Create an estimator for a run that began at `started_at`.
    pub fn new(started_at: Instant) -> Self {
        Self {
            started_at,
            last_recalc: started_at,
            samples: VecDeque::with_capacity(ETA_SMA_WINDOW),
            seconds_per_item: None,
            remaining: None,
        }
    }

    /// Record one observation and, if the interval has passed, refresh the estimate.
    ///
    /// Returns `true` when the exposed estimate was recomputed.
    pub fn observe(&mut self, progress: u64, total: u64, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.started_at).as_secs_f64();
        if self.samples.len() == ETA_SMA_WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(elapsed / progress.saturating_add(1) as f64);

        if now.saturating_duration_since(self.last_recalc) < ETA_INTERVAL {
            return false;
        }
        self.last_recalc = now;

        let mean = self.samples.iter().sum::<f64>() / self.samples.len() as f64;
        let left = total.saturating_sub(progress) as f64;
        self.seconds_per_item = Some(mean);
        self.remaining = Some(Duration::try_from_secs_f64(mean * left).unwrap_or(Duration::MAX));
        trace!(progress, total, seconds_per_item = mean, "eta recomputed");
        true
    }

    /// The smoothed remaining time, or `None` before the first recompute.
    pub fn estimate_remaining(&self) -> Option<Duration> {
        self.remaining
    }

    /// The smoothed seconds-per-item, or `None` before the first recompute.
    pub fn seconds_per_item(&self) -> Option<f64> {
        self.seconds_per_item
    }

    /// Number of samples currently in the window.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}
