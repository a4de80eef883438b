// scripts/benchmark.rs
use mc_varred::error::McResult;
use mc_varred::math_utils::{two_sided_z, Timer};
use mc_varred::mc::mc_engine::{Estimator, EuropeanPricer, McConfig};
use mc_varred::rng::{RandomEngine, RngFactory};
use mc_varred::stats::OnlineStatistics;
use rayon::prelude::*;
use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::process::Command;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct SystemInfo {
    os: String,
    cpu_model: String,
    cpu_cores: usize,
    rust_version: String,
    rayon_threads: usize,
}

impl SystemInfo {
    fn gather() -> Self {
        Self {
            os: env::consts::OS.to_string(),
            cpu_model: Self::cpu_model(),
            cpu_cores: num_cpus::get(),
            rust_version: Command::new("rustc")
                .arg("--version")
                .output()
                .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
                .unwrap_or_else(|_| "Unknown Rust version".to_string()),
            rayon_threads: rayon::current_num_threads(),
        }
    }

    fn cpu_model() -> String {
        std::fs::read_to_string("/proc/cpuinfo")
            .ok()
            .and_then(|content| {
                content
                    .lines()
                    .find(|line| line.starts_with("model name"))
                    .and_then(|line| line.split(':').nth(1))
                    .map(|s| s.trim().to_string())
            })
            .unwrap_or_else(|| "Unknown CPU".to_string())
    }
}

/// Timing and accuracy of one estimator, averaged over repeated runs.
#[derive(Debug)]
struct TimingResult {
    estimator: Estimator,
    paths: usize,
    mean_time_ms: f64,
    price: f64,
    variance: f64,
    /// `1 / (variance × time)`; higher is better.
    efficiency: f64,
}

/// Merged statistics of independently seeded replications.
#[derive(Debug)]
struct ReplicationResult {
    estimator: Estimator,
    replicas: usize,
    paths_per_replica: usize,
    pooled_price: f64,
    pooled_se: f64,
    coverage: f64,
    time_ms: f64,
}

fn time_estimators(pricer: &EuropeanPricer, beta: f64, repeats: usize) -> McResult<Vec<TimingResult>> {
    let cfg = pricer.config();
    let mut results = Vec::new();

    for estimator in Estimator::ALL {
        let draws = estimator.draws_for(cfg.paths);
        let mut timer = Timer::new();
        let mut total_ms = 0.0;
        let mut last = None;

        for _ in 0..repeats {
            let mut rng = RandomEngine::new(cfg.seed);
            timer.start();
            let stats = pricer.run(estimator, draws, &mut rng, beta);
            total_ms += timer.elapsed_ms();
            last = Some(stats);
        }

        let stats = last.unwrap_or_default();
        let beta = (estimator == Estimator::ControlVariate).then_some(beta);
        let estimate = pricer.to_estimate(estimator, &stats, beta)?;
        let mean_time_ms = total_ms / repeats as f64;

        info!(%estimator, mean_time_ms, price = estimate.price, "timed estimator");
        results.push(TimingResult {
            estimator,
            paths: draws,
            mean_time_ms,
            price: estimate.price,
            variance: estimate.variance(),
            efficiency: 1.0 / (estimate.variance() * mean_time_ms / 1000.0),
        });
    }

    Ok(results)
}

fn run_replications(
    pricer: &EuropeanPricer,
    beta: f64,
    replicas: usize,
    paths_per_replica: usize,
) -> McResult<Vec<ReplicationResult>> {
    let factory = RngFactory::new(pricer.config().seed);
    let analytic = pricer.analytic_price();
    let z = two_sided_z(0.95);
    let mut results = Vec::new();

    for estimator in Estimator::ALL {
        let draws = estimator.draws_for(paths_per_replica);
        let mut timer = Timer::new();
        timer.start();

        // Each replica owns its engine; only the finished accumulators meet.
        let runs: Vec<OnlineStatistics> = (0..replicas as u64)
            .into_par_iter()
            .map(|replica| {
                let mut rng = factory.create_engine(replica);
                pricer.run(estimator, draws, &mut rng, beta)
            })
            .collect();
        let time_ms = timer.elapsed_ms();

        let beta = (estimator == Estimator::ControlVariate).then_some(beta);
        let mut pooled = OnlineStatistics::new();
        let mut covered = 0usize;
        for stats in &runs {
            let est = pricer.to_estimate(estimator, stats, beta)?;
            let (lo, hi) = est.confidence_interval(z);
            if lo <= analytic && analytic <= hi {
                covered += 1;
            }
            pooled.merge(stats);
        }
        let pooled_est = pricer.to_estimate(estimator, &pooled, beta)?;

        results.push(ReplicationResult {
            estimator,
            replicas,
            paths_per_replica: draws,
            pooled_price: pooled_est.price,
            pooled_se: pooled_est.standard_error,
            coverage: covered as f64 / replicas as f64,
            time_ms,
        });
    }

    Ok(results)
}

fn write_results_to_csv(
    timings: &[TimingResult],
    replications: &[ReplicationResult],
    system_info: &SystemInfo,
    analytic: f64,
    filename: &str,
) -> std::io::Result<()> {
    if let Some(parent) = std::path::Path::new(filename).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = BufWriter::new(File::create(filename)?);

    writeln!(file, "# System Information")?;
    writeln!(file, "# OS: {}", system_info.os)?;
    writeln!(file, "# CPU: {}", system_info.cpu_model)?;
    writeln!(file, "# CPU Cores: {}", system_info.cpu_cores)?;
    writeln!(file, "# Rust Version: {}", system_info.rust_version)?;
    writeln!(file, "# Rayon Threads: {}", system_info.rayon_threads)?;
    writeln!(
        file,
        "# Benchmark Date: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(file, "# Analytic Price: {:.6}", analytic)?;
    writeln!(file, "#")?;

    let plain_efficiency = timings
        .iter()
        .find(|t| t.estimator == Estimator::Plain)
        .map(|t| t.efficiency)
        .unwrap_or(f64::NAN);

    writeln!(file, "Method,Draws,Time_ms,Price,Variance,Efficiency,Relative_Efficiency")?;
    for t in timings {
        writeln!(
            file,
            "{},{},{:.3},{:.6},{:.6e},{:.6e},{:.4}",
            t.estimator,
            t.paths,
            t.mean_time_ms,
            t.price,
            t.variance,
            t.efficiency,
            t.efficiency / plain_efficiency
        )?;
    }

    writeln!(file)?;
    writeln!(file, "Method,Replicas,Draws_per_replica,Pooled_Price,Pooled_SE,Coverage,Time_ms")?;
    for r in replications {
        writeln!(
            file,
            "{},{},{},{:.6},{:.6},{:.3},{:.2}",
            r.estimator, r.replicas, r.paths_per_replica, r.pooled_price, r.pooled_se, r.coverage, r.time_ms
        )?;
    }
    file.flush()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("mc-varred Benchmark Suite");
    println!("=========================\n");

    let system_info = SystemInfo::gather();
    println!("System Information:");
    println!("  OS: {}", system_info.os);
    println!("  CPU: {}", system_info.cpu_model);
    println!("  CPU Cores: {}", system_info.cpu_cores);
    println!("  Rust Version: {}", system_info.rust_version);
    println!("  Rayon Threads: {}", system_info.rayon_threads);
    println!();

    let repeats = env::args()
        .nth(1)
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(10);

    let cfg = McConfig::default();
    let pricer = match EuropeanPricer::new(&cfg) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    let beta = pricer.calibrate().beta;
    let analytic = pricer.analytic_price();

    println!("Timing each estimator over {} runs of {} paths...", repeats, cfg.paths);
    let timings = match time_estimators(&pricer, beta, repeats) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Timing failed: {}", e);
            std::process::exit(1);
        }
    };

    println!("Running 100 independent replications per estimator...");
    let replications = match run_replications(&pricer, beta, 100, 20_000) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Replications failed: {}", e);
            std::process::exit(1);
        }
    };

    println!("\n{:<12} {:>10} {:>12} {:>14} {:>12}", "Method", "Time (ms)", "Price", "Variance", "Efficiency");
    for t in &timings {
        println!(
            "{:<12} {:>10.3} {:>12.6} {:>14.6e} {:>12.4e}",
            t.estimator.name(),
            t.mean_time_ms,
            t.price,
            t.variance,
            t.efficiency
        );
    }

    println!("\n{:<12} {:>12} {:>10} {:>10}", "Method", "Pooled", "SE", "Coverage");
    for r in &replications {
        println!(
            "{:<12} {:>12.6} {:>10.6} {:>9.1}%",
            r.estimator.name(),
            r.pooled_price,
            r.pooled_se,
            100.0 * r.coverage
        );
    }

    let filename = "bench/benchmark_results.csv";
    match write_results_to_csv(&timings, &replications, &system_info, analytic, filename) {
        Ok(()) => println!("\nResults written to {}", filename),
        Err(e) => eprintln!("Could not write {}: {}", filename, e),
    }
}
