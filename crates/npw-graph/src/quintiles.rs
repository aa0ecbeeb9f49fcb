//! Quintile bucketing of per-road demand.

/// Break points splitting non-zero values into five equal-count groups,
/// highest first.  Quintile 1 is the busiest fifth.
#[derive(Clone, Debug, PartialEq)]
pub struct Quintiles {
    /// `thresholds[k]`: values at or above this are in quintile `k + 1`.
    thresholds: [u32; 4],
    /// Sum of all values per quintile.
    pub total_sums: [u64; 5],
}

impl Quintiles {
    /// Zeros are ignored when choosing the break points.
    pub fn new(values: &[u32]) -> Self {
        let mut sorted: Vec<u32> = values.iter().copied().filter(|v| *v > 0).collect();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        let n = sorted.len().div_ceil(5);

        // Too few values for a break point: every non-zero value lands above it.
        let at = |k: usize| sorted.get(n * k).copied().unwrap_or(1);
        let mut quintiles = Self {
            thresholds: [at(1), at(2), at(3), at(4)],
            total_sums: [0; 5],
        };
        for v in &sorted {
            let q = quintiles.quintile(*v);
            quintiles.total_sums[q - 1] += *v as u64;
        }
        quintiles
    }

    /// Returns 1..=5.
    pub fn quintile(&self, value: u32) -> usize {
        self.thresholds
            .iter()
            .position(|t| value >= *t)
            .map_or(5, |k| k + 1)
    }
}
