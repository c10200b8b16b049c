//! Sweep runner: ties together the job configuration and the I2EM model.

use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;

use i2em_core::model::i2em::I2emModel;
use i2em_core::model::{ScatteringModel, TermSelection};

use crate::config::JobConfig;

/// One angle of a sweep. Fields the sweep mode skips are `None`.
#[derive(Debug, Clone, Serialize)]
pub struct SweepRow {
    pub theta_deg: f64,
    pub vv_db: Option<f64>,
    pub hh_db: Option<f64>,
    pub vh_db: Option<f64>,
    pub vh_terms: Option<usize>,
    pub vh_converged: Option<bool>,
    pub emissivity_v: Option<f64>,
    pub emissivity_h: Option<f64>,
}

/// Results from a sweep, in angle order.
#[derive(Debug, Serialize)]
pub struct SweepOutput {
    pub rows: Vec<SweepRow>,
}

/// Evaluate every angle of the job in parallel.
pub fn run_sweep(job: &JobConfig) -> Result<SweepOutput> {
    let (surface, electrical) = job.build_scene()?;
    let angles = job.geometry.angles.values();
    let model = I2emModel::new(job.numerics);
    let selection = TermSelection::from_flag(job.geometry.auto_select);
    let mode = job.geometry.mode;

    println!("  Model: {}", model.method_name());
    println!(
        "  Surface: σ = {} m, ℓ = {} m, {} correlation",
        surface.rms_height,
        surface.correlation_length,
        surface.correlation.name()
    );
    println!(
        "  Medium: {} GHz, εr = {}",
        electrical.frequency_ghz, electrical.permittivity
    );
    println!("  Angles: {}", angles.len());

    let rows = angles
        .par_iter()
        .map(|&theta_deg| -> Result<SweepRow> {
            let theta = theta_deg.to_radians();
            let mut row = SweepRow {
                theta_deg,
                vv_db: None,
                hh_db: None,
                vh_db: None,
                vh_terms: None,
                vh_converged: None,
                emissivity_v: None,
                emissivity_h: None,
            };
            if mode.backscatter() {
                let full = model
                    .full_backscatter(&surface, &electrical, theta, selection)
                    .with_context(|| format!("backscatter at θ = {theta_deg}°"))?;
                let [vv, hh, vh] = full.to_db();
                row.vv_db = Some(vv);
                row.hh_db = Some(hh);
                row.vh_db = Some(vh);
                row.vh_terms = Some(full.cross_pol.terms);
                row.vh_converged = Some(full.cross_pol.quadrature.converged);
            }
            if mode.emissivity() {
                let e = model
                    .emissivity(&surface, &electrical, theta)
                    .with_context(|| format!("emissivity at θ = {theta_deg}°"))?;
                row.emissivity_v = Some(e.v);
                row.emissivity_h = Some(e.h);
            }
            log::info!("θ = {theta_deg:.2}° done");
            Ok(row)
        })
        .collect::<Result<Vec<_>>>()?;

    let unconverged = rows.iter().filter(|r| r.vh_converged == Some(false)).count();
    if unconverged > 0 {
        eprintln!("Warning: VH integral did not converge at {unconverged} angle(s)");
    }

    Ok(SweepOutput { rows })
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.6}")).unwrap_or_default()
}

/// Write the sweep to a CSV file with a metadata header.
pub fn write_sweep_csv(output: &SweepOutput, path: &Path, job: &JobConfig) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::File::create(path)?;

    writeln!(file, "# I2EM angle sweep")?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(
        file,
        "# surface: rms_height={} m, correlation_length={} m, correlation={}",
        job.surface.rms_height,
        job.surface.correlation_length,
        job.surface.correlation.name()
    )?;
    writeln!(
        file,
        "# dielectric: frequency={} GHz, permittivity={}+{}i",
        job.dielectric.frequency_ghz, job.dielectric.permittivity[0], job.dielectric.permittivity[1]
    )?;
    writeln!(file, "# vh_scale: {}", job.numerics.vh_scale)?;
    writeln!(file, "#")?;
    writeln!(
        file,
        "theta_deg,vv_db,hh_db,vh_db,vh_terms,vh_converged,emissivity_v,emissivity_h"
    )?;

    for row in &output.rows {
        writeln!(
            file,
            "{:.4},{},{},{},{},{},{},{}",
            row.theta_deg,
            cell(row.vv_db),
            cell(row.hh_db),
            cell(row.vh_db),
            row.vh_terms.map(|n| n.to_string()).unwrap_or_default(),
            row.vh_converged.map(|c| c.to_string()).unwrap_or_default(),
            cell(row.emissivity_v),
            cell(row.emissivity_h),
        )?;
    }

    println!("Sweep written to: {}", path.display());
    Ok(())
}

/// Write the sweep to a JSON file.
pub fn write_sweep_json(output: &SweepOutput, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(output)
        .map_err(|e| anyhow::anyhow!("JSON serialisation error: {}", e))?;
    std::fs::write(path, json)?;

    println!("Sweep (JSON) written to: {}", path.display());
    Ok(())
}
