// src/stats/covariance.rs
//! Bivariate Welford accumulator
//!
//! Each call to [`OnlineCovariance::add`] takes one `(x, y)` pair. The update
//! order matters: the x-deviation is taken before `mean_x` moves, and the
//! co-moment pairs it with the y-deviation taken after `mean_y` moves:
//! ```text
//! δx     = x − mean_x;  mean_x += δx / n
//! δy     = y − mean_y;  mean_y += δy / n
//! C     += δx · (y − mean_y)
//! M2_x  += δx · (x − mean_x)
//! M2_y  += δy · (y − mean_y)
//! ```

/// Streaming covariance accumulator for paired observations
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OnlineCovariance {
    n: usize,
    mean_x: f64,
    mean_y: f64,
    var_x: f64,
    var_y: f64,
    c: f64,
}

impl OnlineCovariance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one simultaneous observation of both streams.
    pub fn add(&mut self, x: f64, y: f64) {
        self.n += 1;
        let n = self.n as f64;
        let delta_x = x - self.mean_x;
        self.mean_x += delta_x / n;
        let delta_y = y - self.mean_y;
        self.mean_y += delta_y / n;
        self.c += delta_x * (y - self.mean_y);
        self.var_x += delta_x * (x - self.mean_x);
        self.var_y += delta_y * (y - self.mean_y);
    }

    pub fn count(&self) -> usize {
        self.n
    }

    pub fn mean_x(&self) -> f64 {
        self.mean_x
    }

    pub fn mean_y(&self) -> f64 {
        self.mean_y
    }

    pub fn covariance(&self) -> f64 {
        self.unbiased(self.c)
    }

    pub fn variance_x(&self) -> f64 {
        self.unbiased(self.var_x)
    }

    pub fn variance_y(&self) -> f64 {
        self.unbiased(self.var_y)
    }

    /// Pearson correlation; NaN while either variance is zero.
    pub fn correlation(&self) -> f64 {
        self.covariance() / (self.variance_x() * self.variance_y()).sqrt()
    }

    /// Fold another accumulator over a disjoint stream of pairs into this one.
    pub fn merge(&mut self, other: &OnlineCovariance) {
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
        let dx = other.mean_x - self.mean_x;
        let dy = other.mean_y - self.mean_y;
        let weight = n_a * n_b / n;

        self.mean_x += dx * n_b / n;
        self.mean_y += dy * n_b / n;
        self.c += other.c + dx * dy * weight;
        self.var_x += other.var_x + dx * dx * weight;
        self.var_y += other.var_y + dy * dy * weight;
        self.n += other.n;
    }

    fn unbiased(&self, moment: f64) -> f64 {
        if self.n > 1 {
            moment / (self.n - 1) as f64
        } else {
            0.0
        }
    }
}
