use std::collections::BTreeMap;

use serde::Serialize;

/// Quantile levels reported at every aggregation level, with the literal
/// labels they render under. The set is fixed; there is no configuration
/// knob for it.
pub const QUANTILE_LEVELS: [(f64, &str); 7] = [
    (0.1, "0.1"),
    (0.25, "0.25"),
    (0.5, "0.5"),
    (0.75, "0.75"),
    (0.9, "0.9"),
    (0.95, "0.95"),
    (0.99, "0.99"),
];

/// Quantile breakdown for one aggregation level.
/// Serialized straight into the JSON snapshot; the renderer walks
/// `quantiles` in key order, which for these labels is level order.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub quantiles: BTreeMap<&'static str, f64>,
    pub sum: f64,
    pub count: u64,
}

impl Summary {
    /// Placeholder for a level with no retained samples.
    pub fn empty() -> Self {
        Self {
            quantiles: BTreeMap::new(),
            sum: 0.0,
            count: 0,
        }
    }

    /// Convenience: is this summary backed by at least one sample?
    pub fn has_data(&self) -> bool {
        self.count > 0
    }
}

/// Computes sum, count, and the fixed quantile set over `sorted`.
///
/// `sorted` must already be ascending; sorting is the caller's job, done
/// once per aggregation level. Quantiles use the nearest-rank method:
/// `idx = ceil(q * n) - 1`. A rank outside `1..=n` skips that label
/// instead of erroring (unreachable for these levels, guarded anyway).
pub fn summarize(sorted: &[f64]) -> Summary {
    let n = sorted.len();
    if n == 0 {
        return Summary::empty();
    }

    let mut quantiles = BTreeMap::new();
    for (q, label) in QUANTILE_LEVELS {
        let rank = (q * n as f64).ceil() as usize;
        if rank == 0 || rank > n {
            continue;
        }
        quantiles.insert(label, sorted[rank - 1]);
    }

    Summary {
        quantiles,
        sum: sorted.iter().sum(),
        count: n as u64,
    }
}
