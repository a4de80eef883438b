// src/math_utils.rs
use statrs::function::erf;
use std::f64::consts::SQRT_2;

/// Standard normal cumulative distribution function.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erf::erfc(-x / SQRT_2)
}

/// Two-sided standard-normal quantile for a confidence level, e.g.
/// `0.95 -> 1.959964`.
pub fn two_sided_z(confidence: f64) -> f64 {
    erf::erf_inv(confidence) * SQRT_2
}

#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start_time: std::time::Instant,
}

impl Timer {
    pub fn new() -> Timer {
        Timer {
            start_time: std::time::Instant::now(),
        }
    }

    pub fn start(&mut self) {
        self.start_time = std::time::Instant::now();
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Timer {
    fn default() -> Self {
        Timer::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_norm_cdf() {
        assert_abs_diff_eq!(norm_cdf(0.0), 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(norm_cdf(1.959963984540054), 0.975, epsilon = 1e-12);
        assert_abs_diff_eq!(norm_cdf(-1.0) + norm_cdf(1.0), 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_two_sided_z() {
        assert_abs_diff_eq!(two_sided_z(0.95), 1.959963984540054, epsilon = 1e-9);
        assert_abs_diff_eq!(two_sided_z(0.99), 2.5758293035489, epsilon = 1e-9);
    }
}
