// src/output.rs
use crate::error::{McError, McResult};
use crate::mc::convergence::ConvergenceRow;
use crate::mc::mc_engine::PriceEstimate;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

fn io_error(path: &Path, err: io::Error) -> McError {
    McError::Io {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

fn create(path: &Path) -> McResult<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_error(path, e))?;
    }
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| io_error(path, e))
}

fn convergence_rows<W: Write>(out: &mut W, rows: &[ConvergenceRow]) -> io::Result<()> {
    writeln!(out, "paths,mc_se,anti_se,cv_se")?;
    for row in rows {
        writeln!(out, "{},{},{},{}", row.paths, row.mc_se, row.anti_se, row.cv_se)?;
    }
    out.flush()
}

fn estimate_rows<W: Write>(out: &mut W, estimates: &[PriceEstimate], analytic: f64) -> io::Result<()> {
    writeln!(out, "method,paths,price,standard_error,abs_error,beta")?;
    for e in estimates {
        writeln!(
            out,
            "{},{},{:.8},{:.8},{:.8},{}",
            e.estimator,
            e.paths,
            e.price,
            e.standard_error,
            (e.price - analytic).abs(),
            e.beta.map(|b| format!("{:.6}", b)).unwrap_or_default()
        )?;
    }
    out.flush()
}

/// Write a convergence study as `paths,mc_se,anti_se,cv_se`.
pub fn write_convergence_csv<P: AsRef<Path>>(path: P, rows: &[ConvergenceRow]) -> McResult<()> {
    let path = path.as_ref();
    let mut file = create(path)?;
    convergence_rows(&mut file, rows).map_err(|e| io_error(path, e))
}

pub fn write_estimates_csv<P: AsRef<Path>>(
    path: P,
    estimates: &[PriceEstimate],
    analytic: f64,
) -> McResult<()> {
    let path = path.as_ref();
    let mut file = create(path)?;
    estimate_rows(&mut file, estimates, analytic).map_err(|e| io_error(path, e))
}
