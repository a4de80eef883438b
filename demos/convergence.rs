// demos/convergence.rs
use mc_varred::mc::convergence::{convergence_study, DEFAULT_PATH_COUNTS};
use mc_varred::mc::mc_engine::McConfig;
use mc_varred::output;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = McConfig::default();
    println!("Convergence study: standard error against path count\n");

    let study = match convergence_study(&cfg, &DEFAULT_PATH_COUNTS) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Convergence study failed: {}", e);
            std::process::exit(1);
        }
    };

    println!(
        "beta = {:.6} ({} calibration samples, {:?})\n",
        study.calibration.beta, study.calibration.samples, study.calibration.stop_reason
    );
    println!("{:>10} {:>12} {:>12} {:>12}", "paths", "MC", "Antithetic", "Control");
    for row in &study.rows {
        println!(
            "{:>10} {:>12.6} {:>12.6} {:>12.6}",
            row.paths, row.mc_se, row.anti_se, row.cv_se
        );
    }

    let out = std::path::Path::new("data").join("convergence_results.csv");
    match output::write_convergence_csv(&out, &study.rows) {
        Ok(()) => println!("\nResults written to {}", out.display()),
        Err(e) => {
            eprintln!("Could not write results: {}", e);
            std::process::exit(1);
        }
    }
}
