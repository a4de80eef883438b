// src/mc/mc_engine.rs
use crate::analytics::bs_analytic;
use crate::analytics::calibrate::{calibrate, BetaCalibration, CalibrationConfig};
use crate::discount::{Discount, FlatDiscount};
use crate::error::{validation::*, McError, McResult};
use crate::mc::payoffs::{EuropeanOption, OptionType, Payoff, Underlying};
use crate::mc::samplers::{AntitheticSampler, ControlSampler, McSampler, PathSampler};
use crate::models::BlackScholesModel;
use crate::rng::RandomEngine;
use crate::stats::OnlineStatistics;
use bitflags::bitflags;
use std::fmt;
use tracing::debug;

/// Drives one sampler across a stream of normal draws
///
/// The engine is a stateless binding to its sampler: every `run` starts a
/// fresh accumulator, so the same engine can be reused with different path
/// counts or random sources.
pub struct MonteCarloEngine<'a, S: ?Sized> {
    sampler: &'a S,
}

impl<'a, S: PathSampler + ?Sized> MonteCarloEngine<'a, S> {
    pub fn new(sampler: &'a S) -> Self {
        MonteCarloEngine { sampler }
    }

    /// Take exactly `n_paths` draws from `rng`, one sampler call each.
    ///
    /// Non-finite observations are accumulated as-is.
    pub fn run(&self, n_paths: usize, rng: &mut RandomEngine) -> OnlineStatistics {
        let mut stats = OnlineStatistics::new();
        for _ in 0..n_paths {
            let z = rng.normal();
            stats.add(self.sampler.sample(z));
        }
        debug!(
            paths = n_paths,
            mean = stats.mean(),
            standard_error = stats.standard_error(),
            "monte carlo run complete"
        );
        stats
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Estimators: u32 {
        const PLAIN           = 1 << 0;
        const ANTITHETIC      = 1 << 1;
        const CONTROL_VARIATE = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Estimator {
    Plain,
    Antithetic,
    ControlVariate,
}

impl Estimator {
    pub const ALL: [Estimator; 3] = [
        Estimator::Plain,
        Estimator::Antithetic,
        Estimator::ControlVariate,
    ];

    pub fn flag(self) -> Estimators {
        match self {
            Estimator::Plain => Estimators::PLAIN,
            Estimator::Antithetic => Estimators::ANTITHETIC,
            Estimator::ControlVariate => Estimators::CONTROL_VARIATE,
        }
    }

    /// Normal draws needed for a budget of `paths` payoff evaluations.
    ///
    /// Antithetic sampling evaluates two payoffs per draw.
    pub fn draws_for(self, paths: usize) -> usize {
        match self {
            Estimator::Antithetic => paths / 2,
            _ => paths,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Estimator::Plain => "MC",
            Estimator::Antithetic => "Antithetic",
            Estimator::ControlVariate => "Control",
        }
    }
}

impl fmt::Display for Estimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// European option pricing configuration
#[derive(Debug, Clone, PartialEq)]
pub struct McConfig {
    pub spot: f64,
    pub strike: f64,
    pub rate: f64,
    pub volatility: f64,
    pub maturity: f64,
    pub option_type: OptionType,
    /// Payoff evaluations per estimator; antithetic runs half as many draws.
    pub paths: usize,
    pub seed: u32,
    /// Seed of the independent pilot stream used to calibrate beta.
    pub calibration_seed: u32,
    pub calibration: CalibrationConfig,
}

impl McConfig {
    /// Validate the Monte Carlo configuration
    pub fn validate(&self) -> McResult<()> {
        validate_paths("paths", self.paths)?;
        // Every estimator, including the halved antithetic budget, needs two
        // observations for a standard error.
        if Estimator::Antithetic.draws_for(self.paths) < 2 {
            return Err(McError::InvalidConfiguration {
                field: "paths".to_string(),
                reason: format!(
                    "{} paths leave fewer than 2 antithetic draws; need at least 4",
                    self.paths
                ),
            });
        }
        validate_positive("spot", self.spot)?;
        validate_positive("strike", self.strike)?;
        validate_finite("rate", self.rate)?;
        validate_positive("volatility", self.volatility)?;
        validate_positive("maturity", self.maturity)?;
        self.calibration.validate()
    }
}

impl Default for McConfig {
    fn default() -> Self {
        McConfig {
            spot: 100.0,
            strike: 100.0,
            rate: 0.05,
            volatility: 0.2,
            maturity: 1.0,
            option_type: OptionType::Call,
            paths: 200_000,
            seed: 1310,
            calibration_seed: 429,
            calibration: CalibrationConfig {
                error_target: 0.01,
                ..Default::default()
            },
        }
    }
}

/// Discounted price estimate with its sampling error
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceEstimate {
    pub estimator: Estimator,
    pub price: f64,
    pub standard_error: f64,
    /// Number of normal draws consumed.
    pub paths: usize,
    /// Control coefficient, for the control variate estimator only.
    pub beta: Option<f64>,
}

impl PriceEstimate {
    /// Variance of the price estimate, `standard_error²`.
    pub fn variance(&self) -> f64 {
        self.standard_error * self.standard_error
    }

    pub fn confidence_interval(&self, z: f64) -> (f64, f64) {
        (
            self.price - z * self.standard_error,
            self.price + z * self.standard_error,
        )
    }

    /// Distance from `reference` in units of standard error.
    pub fn z_score(&self, reference: f64) -> f64 {
        (self.price - reference) / self.standard_error
    }

    /// `self.variance() / other.variance()`; below 1 means `self` is tighter.
    pub fn variance_ratio(&self, other: &PriceEstimate) -> f64 {
        self.variance() / other.variance()
    }

    /// Percentage of `other`'s variance removed by `self`.
    pub fn variance_reduction_pct(&self, other: &PriceEstimate) -> f64 {
        (1.0 - self.variance_ratio(other)) * 100.0
    }
}

/// Black-Scholes European pricer wiring model, contract, control and curve
///
/// The control leg is the underlying itself, whose discounted expectation
/// is the spot, so its undiscounted mean is `spot / D(T)`.
#[derive(Debug, Clone)]
pub struct EuropeanPricer {
    config: McConfig,
    model: BlackScholesModel,
    option: EuropeanOption,
    control: Underlying,
    discount: FlatDiscount,
}

impl EuropeanPricer {
    pub fn new(config: &McConfig) -> McResult<Self> {
        config.validate()?;
        Ok(EuropeanPricer {
            config: config.clone(),
            model: BlackScholesModel::new(config.spot, config.rate, config.volatility)?,
            option: EuropeanOption::new(config.strike, config.maturity, config.option_type)?,
            control: Underlying::new(config.maturity)?,
            discount: FlatDiscount::new(config.rate)?,
        })
    }

    pub fn config(&self) -> &McConfig {
        &self.config
    }

    pub fn discount_factor(&self) -> f64 {
        self.discount.factor(self.option.maturity())
    }

    /// Undiscounted expectation of the control leg.
    pub fn control_mean(&self) -> f64 {
        self.model.spot() / self.discount_factor()
    }

    pub fn analytic_price(&self) -> f64 {
        bs_analytic::black_scholes_price(
            self.model.spot(),
            self.option.strike(),
            self.model.rate(),
            self.model.volatility(),
            self.option.maturity(),
            self.option.option_type(),
        )
    }

    /// Pilot run on the calibration stream.
    pub fn calibrate(&self) -> BetaCalibration {
        let target = McSampler::new(&self.model, &self.option);
        let control = McSampler::new(&self.model, &self.control);
        let mut rng = RandomEngine::new(self.config.calibration_seed);
        calibrate(&target, &control, &mut rng, &self.config.calibration)
    }

    /// Undiscounted statistics of `draws` observations of `estimator`.
    ///
    /// `beta` is only used by the control variate estimator.
    pub fn run(
        &self,
        estimator: Estimator,
        draws: usize,
        rng: &mut RandomEngine,
        beta: f64,
    ) -> OnlineStatistics {
        match estimator {
            Estimator::Plain => {
                let sampler = McSampler::new(&self.model, &self.option);
                MonteCarloEngine::new(&sampler).run(draws, rng)
            }
            Estimator::Antithetic => {
                let sampler = AntitheticSampler::new(&self.model, &self.option);
                MonteCarloEngine::new(&sampler).run(draws, rng)
            }
            Estimator::ControlVariate => {
                let sampler = ControlSampler::new(
                    McSampler::new(&self.model, &self.option),
                    McSampler::new(&self.model, &self.control),
                    self.control_mean(),
                    beta,
                );
                MonteCarloEngine::new(&sampler).run(draws, rng)
            }
        }
    }

    /// Discount a finished run into a price estimate.
    pub fn to_estimate(
        &self,
        estimator: Estimator,
        stats: &OnlineStatistics,
        beta: Option<f64>,
    ) -> McResult<PriceEstimate> {
        if stats.count() < 2 {
            return Err(McError::InvalidConfiguration {
                field: "paths".to_string(),
                reason: format!(
                    "{} run has {} observations; a standard error needs at least 2",
                    estimator,
                    stats.count()
                ),
            });
        }
        let df = self.discount_factor();
        let estimate = PriceEstimate {
            estimator,
            price: df * stats.mean(),
            standard_error: df * stats.standard_error(),
            paths: stats.count(),
            beta,
        };

        if !estimate.price.is_finite() || !estimate.standard_error.is_finite() {
            return Err(McError::NumericalInstability {
                method: format!("{} Monte Carlo", estimator),
                reason: format!(
                    "non-finite estimate: price = {}, standard error = {}",
                    estimate.price, estimate.standard_error
                ),
            });
        }
        Ok(estimate)
    }

    /// Price with `estimator` on the main stream (`config.seed`).
    ///
    /// For the control variate, `beta` is used when given; otherwise a
    /// pilot calibration runs first.
    pub fn estimate(&self, estimator: Estimator, beta: Option<f64>) -> McResult<PriceEstimate> {
        let beta = match (estimator, beta) {
            (Estimator::ControlVariate, Some(b)) => Some(b),
            (Estimator::ControlVariate, None) => Some(self.calibrate().beta),
            _ => None,
        };
        let draws = estimator.draws_for(self.config.paths);
        let mut rng = RandomEngine::new(self.config.seed);
        let stats = self.run(estimator, draws, &mut rng, beta.unwrap_or(0.0));
        self.to_estimate(estimator, &stats, beta)
    }
}

/// Price a European option with a single estimator.
pub fn price_european(cfg: &McConfig, estimator: Estimator) -> McResult<PriceEstimate> {
    EuropeanPricer::new(cfg)?.estimate(estimator, None)
}

/// Price with every selected estimator, calibrating beta at most once.
///
/// Estimates come back in the order plain, antithetic, control variate.
pub fn compare(cfg: &McConfig, estimators: Estimators) -> McResult<Vec<PriceEstimate>> {
    let pricer = EuropeanPricer::new(cfg)?;
    let beta = if estimators.contains(Estimators::CONTROL_VARIATE) {
        Some(pricer.calibrate().beta)
    } else {
        None
    };

    Estimator::ALL
        .iter()
        .filter(|e| estimators.contains(e.flag()))
        .map(|&e| pricer.estimate(e, beta))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct Shift(f64);

    impl PathSampler for Shift {
        fn sample(&self, z: f64) -> f64 {
            z + self.0
        }
    }

    #[test]
    fn test_engine_advances_rng_by_n_paths() {
        let sampler = Shift(0.0);
        let engine = MonteCarloEngine::new(&sampler);
        let mut rng = RandomEngine::new(21);
        let stats = engine.run(1_000, &mut rng);
        assert_eq!(stats.count(), 1_000);

        let mut replay = RandomEngine::new(21);
        let draws: OnlineStatistics = (0..1_000).map(|_| replay.normal()).collect();
        assert_eq!(stats, draws);
        assert_eq!(rng.normal(), replay.normal());
    }

    #[test]
    fn test_engine_is_reusable() {
        let sampler = Shift(2.0);
        let engine = MonteCarloEngine::new(&sampler);
        let a = engine.run(500, &mut RandomEngine::new(4));
        let b = engine.run(500, &mut RandomEngine::new(4));
        let c = engine.run(10, &mut RandomEngine::new(5));
        assert_eq!(a, b);
        assert_eq!(c.count(), 10);
        assert_eq!(engine.run(0, &mut RandomEngine::new(4)).count(), 0);
    }

    #[test]
    fn test_engine_propagates_nan() {
        let sampler = Shift(f64::NAN);
        let stats = MonteCarloEngine::new(&sampler).run(10, &mut RandomEngine::new(1));
        assert_eq!(stats.count(), 10);
        assert!(stats.mean().is_nan());
    }

    #[test]
    fn test_config_validation() {
        assert!(McConfig::default().validate().is_ok());
        let bad = McConfig {
            volatility: -0.2,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let one_path = McConfig {
            paths: 1,
            ..Default::default()
        };
        assert!(one_path.validate().is_err());
        assert!(price_european(&one_path, Estimator::Plain).is_err());
    }

    #[test]
    fn test_antithetic_budget_below_two_draws_is_rejected() {
        for paths in [2, 3] {
            let cfg = McConfig {
                paths,
                ..Default::default()
            };
            assert!(matches!(
                price_european(&cfg, Estimator::Antithetic),
                Err(McError::InvalidConfiguration { .. })
            ));
        }

        let four = McConfig {
            paths: 4,
            ..Default::default()
        };
        let estimate = price_european(&four, Estimator::Antithetic).unwrap();
        assert_eq!(estimate.paths, 2);
        assert!(estimate.standard_error > 0.0);
    }

    #[test]
    fn test_single_observation_run_has_no_estimate() {
        let pricer = EuropeanPricer::new(&McConfig::default()).unwrap();
        let stats = pricer.run(Estimator::Plain, 1, &mut RandomEngine::new(3), 0.0);
        assert!(matches!(
            pricer.to_estimate(Estimator::Plain, &stats, None),
            Err(McError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_draw_budget() {
        assert_eq!(Estimator::Plain.draws_for(1000), 1000);
        assert_eq!(Estimator::Antithetic.draws_for(1001), 500);
        assert_eq!(Estimator::ControlVariate.draws_for(1000), 1000);
    }

    #[test]
    fn test_plain_estimate_matches_manual_run() {
        let cfg = McConfig {
            paths: 20_000,
            ..Default::default()
        };
        let pricer = EuropeanPricer::new(&cfg).unwrap();
        let estimate = pricer.estimate(Estimator::Plain, None).unwrap();

        let model = BlackScholesModel::new(100.0, 0.05, 0.2).unwrap();
        let call = EuropeanOption::new(100.0, 1.0, OptionType::Call).unwrap();
        let sampler = McSampler::new(&model, &call);
        let stats = MonteCarloEngine::new(&sampler).run(20_000, &mut RandomEngine::new(1310));
        let df = (-0.05f64).exp();

        assert_eq!(estimate.paths, 20_000);
        assert_relative_eq!(estimate.price, df * stats.mean(), max_relative = 1e-12);
        assert_relative_eq!(estimate.standard_error, df * stats.standard_error(), max_relative = 1e-12);
        assert!(estimate.beta.is_none());
    }

    #[test]
    fn test_compare_selects_estimators_in_order() {
        let cfg = McConfig {
            paths: 10_000,
            ..Default::default()
        };
        let results = compare(&cfg, Estimators::CONTROL_VARIATE | Estimators::PLAIN).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].estimator, Estimator::Plain);
        assert_eq!(results[1].estimator, Estimator::ControlVariate);
        assert!(results[1].beta.is_some());

        let all = compare(&cfg, Estimators::all()).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].paths, 5_000);
    }

    #[test]
    fn test_control_mean_is_forward() {
        let pricer = EuropeanPricer::new(&McConfig::default()).unwrap();
        assert_relative_eq!(pricer.control_mean(), 100.0 * 0.05f64.exp(), max_relative = 1e-14);
    }

    #[test]
    fn test_estimate_helpers() {
        let a = PriceEstimate {
            estimator: Estimator::Plain,
            price: 10.0,
            standard_error: 0.2,
            paths: 100,
            beta: None,
        };
        let b = PriceEstimate {
            estimator: Estimator::ControlVariate,
            price: 10.1,
            standard_error: 0.1,
            paths: 100,
            beta: Some(0.6),
        };
        assert_relative_eq!(b.variance_ratio(&a), 0.25, max_relative = 1e-12);
        assert_relative_eq!(b.variance_reduction_pct(&a), 75.0, max_relative = 1e-12);
        assert_relative_eq!(a.z_score(10.4), -2.0, max_relative = 1e-12);
        let (lo, hi) = a.confidence_interval(2.0);
        assert_relative_eq!(lo, 9.6, max_relative = 1e-12);
        assert_relative_eq!(hi, 10.4, max_relative = 1e-12);
        assert_eq!(Estimator::Antithetic.to_string(), "Antithetic");
    }
}
