//! Standard error against path count
//!
//! Beta is calibrated once on the pilot stream and reused for every path
//! count. Each row restarts every estimator from `config.seed`, so rows
//! differ only in how far along the same stream they read. Antithetic
//! rows consume `n / 2` draws.

use crate::analytics::calibrate::BetaCalibration;
use crate::error::{validation::*, McResult};
use crate::mc::mc_engine::{Estimator, EuropeanPricer, McConfig};
use crate::rng::RandomEngine;
use tracing::trace;

/// Path counts used by the default study.
pub const DEFAULT_PATH_COUNTS: [usize; 8] = [
    1_000, 2_000, 5_000, 10_000, 20_000, 50_000, 100_000, 1_000_000,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceRow {
    pub paths: usize,
    pub mc_se: f64,
    pub anti_se: f64,
    pub cv_se: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceStudy {
    pub calibration: BetaCalibration,
    pub rows: Vec<ConvergenceRow>,
}

pub fn convergence_study(config: &McConfig, path_counts: &[usize]) -> McResult<ConvergenceStudy> {
    for &n in path_counts {
        validate_paths("path_counts", n)?;
    }
    let pricer = EuropeanPricer::new(config)?;
    let calibration = pricer.calibrate();
    let df = pricer.discount_factor();

    let se = |estimator: Estimator, n: usize| {
        let mut rng = RandomEngine::new(config.seed);
        let stats = pricer.run(estimator, estimator.draws_for(n), &mut rng, calibration.beta);
        df * stats.standard_error()
    };

    let rows = path_counts
        .iter()
        .map(|&n| {
            let row = ConvergenceRow {
                paths: n,
                mc_se: se(Estimator::Plain, n),
                anti_se: se(Estimator::Antithetic, n),
                cv_se: se(Estimator::ControlVariate, n),
            };
            trace!(?row, "convergence row");
            row
        })
        .collect();

    Ok(ConvergenceStudy { calibration, rows })
}
