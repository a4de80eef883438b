// demos/demo.rs
use mc_varred::analytics::bs_analytic;
use mc_varred::math_utils::{two_sided_z, Timer};
use mc_varred::mc::mc_engine::{compare, Estimators, EuropeanPricer, McConfig};
use mc_varred::mc::payoffs::OptionType;
use mc_varred::output;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    let option_type = if args.iter().any(|a| a == "--put") {
        OptionType::Put
    } else {
        OptionType::Call
    };

    let cfg = McConfig {
        option_type,
        ..Default::default()
    };

    println!("Monte Carlo Variance Reduction: Numerical Validation");
    println!("====================================================\n");
    println!(
        "European {}: S0 = {}, K = {}, r = {}, sigma = {}, T = {}",
        cfg.option_type, cfg.spot, cfg.strike, cfg.rate, cfg.volatility, cfg.maturity
    );
    println!("Paths: {}, seed: {}\n", cfg.paths, cfg.seed);

    let pricer = match EuropeanPricer::new(&cfg) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    let calibration = pricer.calibrate();
    let analytic = bs_analytic::black_scholes_price(
        cfg.spot,
        cfg.strike,
        cfg.rate,
        cfg.volatility,
        cfg.maturity,
        cfg.option_type,
    );

    println!("Beta calibration:");
    println!("  beta: {:.6}", calibration.beta);
    println!("  samples: {}", calibration.samples);
    if let Some(rho) = calibration.correlation {
        println!("  correlation: {:.6}", rho);
    }
    println!("  stop reason: {:?}\n", calibration.stop_reason);

    let mut timer = Timer::new();
    timer.start();
    let estimates = match compare(&cfg, Estimators::all()) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Pricing failed: {}", e);
            std::process::exit(1);
        }
    };
    let elapsed = timer.elapsed_ms();

    let z = two_sided_z(0.95);
    println!("Analytic (Black-Scholes): {:.6}\n", analytic);
    for est in &estimates {
        let (lo, hi) = est.confidence_interval(z);
        println!("{}:", est.estimator);
        println!("  Price:          {:.6}", est.price);
        println!("  Variance:       {:.6e}", est.variance());
        println!("  Std Error:      {:.6}", est.standard_error);
        println!("  Abs Error:      {:.6}", (est.price - analytic).abs());
        println!("  Z-score:        {:+.3}", est.z_score(analytic));
        println!("  95% CI:         [{:.6}, {:.6}]", lo, hi);
        println!(
            "  Contains exact: {}",
            if lo <= analytic && analytic <= hi { "yes" } else { "no" }
        );
        if let Some(beta) = est.beta {
            println!("  Beta:           {:.6}", beta);
        }
        println!();
    }

    if let [plain, anti, cv] = estimates.as_slice() {
        println!("Variance reduction vs plain Monte Carlo:");
        println!(
            "  Antithetic: ratio {:.4} ({:.1}% reduction)",
            anti.variance_ratio(plain),
            anti.variance_reduction_pct(plain)
        );
        println!(
            "  Control:    ratio {:.4} ({:.1}% reduction)",
            cv.variance_ratio(plain),
            cv.variance_reduction_pct(plain)
        );
    }
    println!("\nTotal pricing time: {:.2} ms", elapsed);

    let out = std::path::Path::new("data").join("estimates.csv");
    match output::write_estimates_csv(&out, &estimates, analytic) {
        Ok(()) => println!("Estimates written to {}", out.display()),
        Err(e) => eprintln!("Could not write estimates: {}", e),
    }
}
