// tests/integration_test.rs
use mc_varred::analytics::bs_analytic;
use mc_varred::analytics::calibrate::{calibrate, CalibrationConfig, StopReason};
use mc_varred::mc::mc_engine::{
    compare, price_european, Estimator, Estimators, EuropeanPricer, McConfig, MonteCarloEngine,
};
use mc_varred::mc::payoffs::{EuropeanOption, FnPayoff, OptionType, Underlying};
use mc_varred::mc::samplers::{ControlSampler, McSampler, PathSampler};
use mc_varred::models::BlackScholesModel;
use mc_varred::rng::{RandomEngine, RngFactory};
use mc_varred::McError;

const Z_95: f64 = 1.959963984540054;

#[test]
fn test_reference_scenario_against_closed_form() {
    let cfg = McConfig::default();
    let analytic = bs_analytic::bs_call_price(cfg.spot, cfg.strike, cfg.rate, cfg.volatility, cfg.maturity);
    let estimates = compare(&cfg, Estimators::all()).expect("Valid configuration");

    println!("\nAnalytic Price: {:.6}", analytic);
    for est in &estimates {
        println!(
            "{:<12} price = {:.6}, se = {:.6}, z = {:+.3}",
            est.estimator.name(),
            est.price,
            est.standard_error,
            est.z_score(analytic)
        );
    }

    assert_eq!(estimates.len(), 3);
    let plain = &estimates[0];
    let anti = &estimates[1];
    let cv = &estimates[2];

    assert_eq!(plain.estimator, Estimator::Plain);
    assert_eq!(plain.paths, 200_000);
    assert_eq!(anti.paths, 100_000);
    assert_eq!(cv.paths, 200_000);
    assert!(plain.beta.is_none() && anti.beta.is_none());
    assert!(cv.beta.is_some());

    // A fixed seed can legitimately land outside 1.96 se; 4 se cannot
    // plausibly be reached by a correct estimator.
    for est in &estimates {
        assert!(
            est.z_score(analytic).abs() < 4.0,
            "{} estimate {} too far from {}",
            est.estimator,
            est.price,
            analytic
        );
    }

    assert!(cv.variance() < plain.variance(), "Control variate did not reduce variance");
    assert!(anti.variance() < plain.variance(), "Antithetic did not reduce variance");
}

#[test]
fn test_coverage_across_independent_seeds() {
    // Interval coverage does not depend on the path count once the CLT
    // applies, so 20k paths per replica keeps 120 runs fast in debug builds.
    // The 200k-path scenario itself is checked in
    // test_reference_scenario_against_closed_form.
    let cfg = McConfig {
        paths: 20_000,
        ..Default::default()
    };
    let pricer = EuropeanPricer::new(&cfg).expect("Valid configuration");
    let analytic = pricer.analytic_price();
    let beta = pricer.calibrate().beta;
    let factory = RngFactory::new(99);

    let replicas = 40;
    for estimator in Estimator::ALL {
        let mut covered = 0;
        for replica in 0..replicas {
            let mut rng = factory.create_engine(replica);
            let stats = pricer.run(estimator, estimator.draws_for(cfg.paths), &mut rng, beta);
            let est = pricer.to_estimate(estimator, &stats, Some(beta)).expect("Finite estimate");
            let (lo, hi) = est.confidence_interval(Z_95);
            if lo <= analytic && analytic <= hi {
                covered += 1;
            }
        }
        println!("{}: {}/{} intervals cover the analytic price", estimator, covered, replicas);
        // Expected 38 of 40; 32 or fewer has probability well below 1e-3.
        assert!(covered > 32, "{} coverage too low: {}/{}", estimator, covered, replicas);
    }
}

#[test]
fn test_variance_ordering_over_many_seeds() {
    let base = McConfig {
        paths: 20_000,
        ..Default::default()
    };
    let factory = RngFactory::new(7);

    let mut anti_ratio_sum = 0.0;
    let mut cv_ratio_sum = 0.0;
    let runs = 12;
    for replica in 0..runs {
        let cfg = McConfig {
            seed: factory.replica_seed(replica),
            ..base.clone()
        };
        let estimates = compare(&cfg, Estimators::all()).expect("Valid configuration");
        let (plain, anti, cv) = (&estimates[0], &estimates[1], &estimates[2]);

        assert!(cv.variance() < plain.variance());
        anti_ratio_sum += anti.variance_ratio(plain);
        cv_ratio_sum += cv.variance_ratio(plain);
    }

    let anti_ratio = anti_ratio_sum / runs as f64;
    let cv_ratio = cv_ratio_sum / runs as f64;
    println!("\nMean variance ratio (antithetic / plain): {:.4}", anti_ratio);
    println!("Mean variance ratio (control / plain): {:.4}", cv_ratio);

    assert!(anti_ratio < 1.0);
    assert!(cv_ratio < anti_ratio, "Control variate should beat antithetic for an ATM call");
}

#[test]
fn test_put_pricing_and_parity() {
    let call_cfg = McConfig {
        paths: 100_000,
        ..Default::default()
    };
    let put_cfg = McConfig {
        option_type: OptionType::Put,
        ..call_cfg.clone()
    };

    let call = price_european(&call_cfg, Estimator::Plain).expect("Valid configuration");
    let put = price_european(&put_cfg, Estimator::Plain).expect("Valid configuration");

    // Same seed, same draws: C − P = S − K·D(T) holds path by path.
    let parity = call_cfg.spot - call_cfg.strike * (-call_cfg.rate * call_cfg.maturity).exp();
    let mc_forward_gap = call.price - put.price;
    let analytic_put = bs_analytic::bs_put_price(100.0, 100.0, 0.05, 0.2, 1.0);

    println!("\nMC put: {:.6}, analytic put: {:.6}", put.price, analytic_put);
    assert!((mc_forward_gap - parity).abs() < 5.0 * (call.standard_error + put.standard_error));
    assert!(put.z_score(analytic_put).abs() < 4.0);
}

#[test]
fn test_control_with_zero_beta_reproduces_plain_run() {
    let cfg = McConfig {
        paths: 5_000,
        ..Default::default()
    };
    let pricer = EuropeanPricer::new(&cfg).expect("Valid configuration");

    let plain = pricer.estimate(Estimator::Plain, None).expect("Finite");
    let cv = pricer.estimate(Estimator::ControlVariate, Some(0.0)).expect("Finite");

    assert_eq!(plain.price, cv.price);
    assert_eq!(plain.standard_error, cv.standard_error);
    assert_eq!(cv.beta, Some(0.0));
}

#[test]
fn test_calibrated_beta_for_call_on_underlying() {
    let model = BlackScholesModel::new(100.0, 0.05, 0.2).expect("Valid parameters");
    let call = EuropeanOption::new(100.0, 1.0, OptionType::Call).expect("Valid option");
    let underlying = Underlying::new(1.0).expect("Valid maturity");
    let config = CalibrationConfig {
        max_samples: 20_000,
        min_samples: 1_000,
        error_target: 0.01,
    };

    let result = calibrate(
        &McSampler::new(&model, &call),
        &McSampler::new(&model, &underlying),
        &mut RandomEngine::new(429),
        &config,
    );

    println!("\nbeta = {:.4} after {} samples ({:?})", result.beta, result.samples, result.stop_reason);
    assert!(result.beta > 0.3 && result.beta < 1.2, "Unexpected beta {}", result.beta);
    assert!(result.samples > config.min_samples && result.samples <= config.max_samples);
    assert!(result.correlation.map_or(false, |rho| rho > 0.5));
    if result.stop_reason == StopReason::Converged {
        assert!(result.relative_error.map_or(false, |e| e < config.error_target));
    }
}

#[test]
fn test_custom_payoff_and_closure_model() {
    // Digital call under a closure-defined GBM, with the underlying as control.
    let (s0, r, sigma, t) = (100.0_f64, 0.05_f64, 0.2_f64, 1.0_f64);
    let model = move |t: f64, z: f64| s0 * ((r - 0.5 * sigma * sigma) * t + sigma * t.sqrt() * z).exp();
    let digital = FnPayoff::new(|st: f64| if st > 100.0 { 1.0 } else { 0.0 }, t);
    let underlying = Underlying::new(t).expect("Valid maturity");

    let target = McSampler::new(&model, &digital);
    let control = McSampler::new(&model, &underlying);
    let beta = calibrate(&target, &control, &mut RandomEngine::new(1), &CalibrationConfig::default()).beta;
    let cv = ControlSampler::new(target, control, s0 * (r * t).exp(), beta);

    let stats = MonteCarloEngine::new(&cv).run(100_000, &mut RandomEngine::new(2));
    let d2 = ((s0 / 100.0).ln() + (r - 0.5 * sigma * sigma) * t) / (sigma * t.sqrt());
    let expected = mc_varred::math_utils::norm_cdf(d2);

    assert!(
        (stats.mean() - expected).abs() < 4.0 * stats.standard_error(),
        "Digital probability {} vs {}",
        stats.mean(),
        expected
    );
    assert!(cv.sample(0.0).is_finite());
}

#[test]
fn test_invalid_configurations_are_rejected() {
    let bad_vol = McConfig {
        volatility: -0.2,
        ..Default::default()
    };
    assert!(matches!(
        price_european(&bad_vol, Estimator::Plain),
        Err(McError::InvalidParameters { .. })
    ));

    let one_path = McConfig {
        paths: 1,
        ..Default::default()
    };
    assert!(matches!(
        compare(&one_path, Estimators::PLAIN),
        Err(McError::InvalidConfiguration { .. })
    ));

    let bad_calibration = McConfig {
        calibration: CalibrationConfig {
            max_samples: 10,
            min_samples: 20,
            error_target: 0.01,
        },
        ..Default::default()
    };
    assert!(EuropeanPricer::new(&bad_calibration).is_err());
}
