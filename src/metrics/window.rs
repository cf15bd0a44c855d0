use std::collections::VecDeque;
use std::time::Instant;

use super::RETENTION_WINDOW;

/// Rolling per-bucket state: a lifetime request counter and a bounded
/// window of `(timestamp, elapsed_ms)` latency samples.
///
/// Samples are appended in real time, so insertion order is also
/// chronological. Eviction trims from the front only.
#[derive(Debug, Default)]
pub struct SampleWindow {
    request_count: u64,
    samples: VecDeque<(Instant, f64)>,
}

impl SampleWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lifetime request count for this bucket. Never decremented, never
    /// reset; eviction only touches the sample list.
    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    /// Counts a request against this bucket. Called once per observation,
    /// whether or not a timing sample accompanies it.
    pub fn note_request(&mut self) {
        self.request_count += 1;
    }

    /// Appends a latency sample stamped `now`.
    pub fn record_sample(&mut self, now: Instant, elapsed_ms: f64) {
        self.samples.push_back((now, elapsed_ms));
    }

    /// Drops samples older than the retention window.
    ///
    /// Single left-to-right sweep: pop from the front until a popped
    /// element turns out to be fresh, then push that one element back and
    /// stop. The sweep never looks past the first fresh element, so a
    /// later sample that is somehow stale (clock anomaly) survives until
    /// it reaches the front. Cost is O(removed) rather than O(n), at the
    /// price of tolerating that brief staleness in the retained
    /// sequence. Callers depend on these exact semantics; replacing the
    /// sweep with a full filter would change reported counts and sums.
    pub fn evict_stale(&mut self, now: Instant) {
        while let Some((stamped, elapsed_ms)) = self.samples.pop_front() {
            if now.duration_since(stamped) <= RETENTION_WINDOW {
                self.samples.push_front((stamped, elapsed_ms));
                break;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// The retained elapsed-time values, in insertion (chronological) order.
    pub fn elapsed_values(&self) -> Vec<f64> {
        self.samples.iter().map(|&(_, elapsed_ms)| elapsed_ms).collect()
    }

    #[cfg(test)]
    fn timestamps(&self) -> Vec<Instant> {
        self.samples.iter().map(|&(stamped, _)| stamped).collect()
    }
}
