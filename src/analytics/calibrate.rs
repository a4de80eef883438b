// src/analytics/calibrate.rs
//! Adaptive calibration of the control variate coefficient
//!
//! # Mathematical Framework
//!
//! For target X and control Y driven by the same draw, the variance of
//! `X − β(Y − E[Y])` is minimised by
//! ```text
//! β* = Cov(X, Y) / Var(Y)
//! ```
//! The sampling error of the plug-in estimate is approximately
//! ```text
//! se(β) = sqrt( (Var(X) / Var(Y)) · (1 − ρ²) / n )
//! ```
//! where ρ is the sample correlation.
//!
//! # Sequential Stopping Rule
//!
//! ```text
//! WarmUp ──(n > min_samples)──▶ Monitoring ──(|se/β| < target or n = max)──▶ Done
//! ```
//! Pairs are accumulated one at a time. Once past warm-up the estimate and
//! its relative error are refreshed after every new pair, so the number of
//! samples actually used depends on the data. Warm-up samples are never
//! discarded.
//!
//! Calibration always yields a beta. Hitting the sample cap is reported via
//! [`StopReason::SampleCap`] (and a `warn!` event), never as an error.

use crate::error::{validation::*, McError, McResult};
use crate::mc::samplers::PathSampler;
use crate::rng::RandomEngine;
use crate::stats::OnlineCovariance;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationConfig {
    /// Hard cap on the number of paired draws.
    pub max_samples: usize,
    /// Warm-up floor; beta is only estimated once the count exceeds it.
    pub min_samples: usize,
    /// Relative standard error of beta at which sampling stops.
    pub error_target: f64,
}

impl CalibrationConfig {
    pub fn validate(&self) -> McResult<()> {
        validate_paths("max_samples", self.max_samples)?;
        if self.min_samples >= self.max_samples {
            return Err(McError::InvalidConfiguration {
                field: "min_samples".to_string(),
                reason: format!(
                    "warm-up floor {} must be below max_samples {}",
                    self.min_samples, self.max_samples
                ),
            });
        }
        validate_probability("error_target", self.error_target)
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        CalibrationConfig {
            max_samples: 10_000,
            min_samples: 1_000,
            error_target: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Relative error of beta fell below the target.
    Converged,
    /// `max_samples` exhausted with a usable but imprecise beta.
    SampleCap,
    /// Warm-up never completed or the control variance stayed non-positive;
    /// beta is 0.
    Degenerate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetaCalibration {
    pub beta: f64,
    /// Number of paired draws consumed.
    pub samples: usize,
    /// `|se(β) / β|` at the last evaluation, if one was made.
    pub relative_error: Option<f64>,
    /// Sample correlation between target and control at the last evaluation.
    pub correlation: Option<f64>,
    pub stop_reason: StopReason,
}

impl BetaCalibration {
    pub fn converged(&self) -> bool {
        self.stop_reason == StopReason::Converged
    }
}

/// Estimate beta for `target` against `control` on a shared draw stream.
pub fn calibrate<T, C>(
    target: &T,
    control: &C,
    rng: &mut RandomEngine,
    config: &CalibrationConfig,
) -> BetaCalibration
where
    T: PathSampler + ?Sized,
    C: PathSampler + ?Sized,
{
    let mut stats = OnlineCovariance::new();
    let mut beta = 0.0;
    let mut relative_error = None;
    let mut correlation = None;
    let mut estimated = false;

    for _ in 0..config.max_samples {
        let z = rng.normal();
        stats.add(target.sample(z), control.sample(z));

        if stats.count() <= config.min_samples {
            continue;
        }

        let var_y = stats.variance_y();
        if var_y.is_nan() || var_y <= 0.0 {
            continue;
        }

        let cov = stats.covariance();
        let var_x = stats.variance_x();
        // Undefined while the target is constant; its se(β) is then 0.
        let rho = if var_x > 0.0 {
            Some(cov / (var_x * var_y).sqrt())
        } else {
            None
        };
        // Rounding can push |ρ| marginally past 1 for a perfect control.
        let unexplained = rho.map_or(0.0, |r| (1.0 - r * r).max(0.0));
        let se_beta = ((var_x / var_y) * unexplained / stats.count() as f64).sqrt();

        beta = cov / var_y;
        estimated = true;
        correlation = rho;

        // A zero beta has no meaningful relative error; keep sampling.
        if beta == 0.0 {
            relative_error = None;
            continue;
        }
        let rel = (se_beta / beta).abs();
        relative_error = Some(rel);

        if rel < config.error_target {
            debug!(
                beta,
                samples = stats.count(),
                relative_error = rel,
                "control variate beta converged"
            );
            return BetaCalibration {
                beta,
                samples: stats.count(),
                relative_error,
                correlation,
                stop_reason: StopReason::Converged,
            };
        }
    }

    let stop_reason = if estimated {
        warn!(
            beta,
            samples = stats.count(),
            relative_error = ?relative_error,
            error_target = config.error_target,
            "beta calibration hit the sample cap before reaching the error target"
        );
        StopReason::SampleCap
    } else {
        warn!(
            samples = stats.count(),
            min_samples = config.min_samples,
            "beta calibration produced no estimate; falling back to beta = 0"
        );
        StopReason::Degenerate
    };

    BetaCalibration {
        beta,
        samples: stats.count(),
        relative_error,
        correlation,
        stop_reason,
    }
}

/// [`calibrate`], keeping only the coefficient.
pub fn calibrate_beta<T, C>(
    target: &T,
    control: &C,
    rng: &mut RandomEngine,
    config: &CalibrationConfig,
) -> f64
where
    T: PathSampler + ?Sized,
    C: PathSampler + ?Sized,
{
    calibrate(target, control, rng, config).beta
}
