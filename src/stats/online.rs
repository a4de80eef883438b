// src/stats/online.rs
//! Welford online mean and variance
//!
//! # Recurrence
//!
//! For the k-th observation x:
//! ```text
//! δ    = x − mean_{k−1}
//! mean = mean_{k−1} + δ / k
//! M2   = M2_{k−1} + δ · (x − mean)
//! ```
//! The unbiased sample variance is `M2 / (k − 1)`.
//!
//! # Merging
//!
//! Two accumulators over disjoint streams combine exactly (Chan et al.):
//! ```text
//! n    = n_a + n_b
//! Δ    = mean_b − mean_a
//! mean = mean_a + Δ · n_b / n
//! M2   = M2_a + M2_b + Δ² · n_a · n_b / n
//! ```

/// Streaming mean / variance accumulator
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OnlineStatistics {
    n: usize,
    mean: f64,
    m2: f64,
}

impl OnlineStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one observation.
    pub fn add(&mut self, x: f64) {
        self.n += 1;
        let delta = x - self.mean;
        self.mean += delta / self.n as f64;
        let delta_after = x - self.mean;
        self.m2 += delta * delta_after;
    }

    pub fn count(&self) -> usize {
        self.n
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Unbiased sample variance; 0 for fewer than two observations.
    pub fn variance(&self) -> f64 {
        if self.n > 1 {
            self.m2 / (self.n - 1) as f64
        } else {
            0.0
        }
    }

    /// `sqrt(variance / n)`. NaN when empty: callers check `count()` first.
    pub fn standard_error(&self) -> f64 {
        (self.variance() / self.n as f64).sqrt()
    }

    /// Symmetric interval `mean ± z · standard_error`.
    pub fn confidence_interval(&self, z: f64) -> (f64, f64) {
        let half_width = z * self.standard_error();
        (self.mean - half_width, self.mean + half_width)
    }

    /// Fold another accumulator over a disjoint stream into this one.
    pub fn merge(&mut self, other: &OnlineStatistics) {
        if other.n == 0 {
            return;
        }
        if self.n == 0 {
            *self = *other;
            return;
        }
        let n_a = self.n as f64;
        let n_b = other.n as f64;
        let n = n_a + n_b;
        let delta = other.mean - self.mean;

        self.mean += delta * n_b / n;
        self.m2 += other.m2 + delta * delta * n_a * n_b / n;
        self.n += other.n;
    }
}

impl Extend<f64> for OnlineStatistics {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for x in iter {
            self.add(x);
        }
    }
}

impl FromIterator<f64> for OnlineStatistics {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = OnlineStatistics::new();
        stats.extend(iter);
        stats
    }
}
