//! I2EM command-line interface.
//!
//! Single evaluations from flags, angle sweeps from TOML job files:
//! ```sh
//! i2em-cli backscatter -f 3 --rms-height 0.0025 --correlation-length 0.1 --theta 30
//! i2em-cli emissivity -f 1.4 --rms-height 0.01 --correlation-length 0.1 --theta 40 -c gaussian
//! i2em-cli run job.toml
//! i2em-cli validate job.toml
//! ```

mod config;
mod runner;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use num_complex::Complex64;

use i2em_core::model::i2em::I2emModel;
use i2em_core::model::{ScatteringModel, TermSelection};
use i2em_core::spectrum::CorrelationFunction;
use i2em_core::types::{
    to_db, ElectricalParameters, Geometry, SurfaceParameters,
};

#[derive(Parser)]
#[command(name = "i2em-cli")]
#[command(about = "I2EM: rough-surface microwave scattering and emission")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Monostatic VV, HH and VH backscatter (dB) at one incidence angle.
    Backscatter {
        #[command(flatten)]
        scene: SceneArgs,
        /// Incidence angle in degrees.
        #[arg(long)]
        theta: f64,
        /// Use a fixed number of VH series terms instead of automatic selection.
        #[arg(long)]
        fixed_terms: bool,
    },
    /// Bistatic VV and HH scattering coefficients (dB).
    Bistatic {
        #[command(flatten)]
        scene: SceneArgs,
        /// Incidence angle in degrees.
        #[arg(long)]
        theta_i: f64,
        /// Scattering angle in degrees.
        #[arg(long)]
        theta_s: f64,
        /// Scattering azimuth in degrees (180 = backscatter).
        #[arg(long, default_value_t = 180.0)]
        phi_s: f64,
    },
    /// V and H emissivity at one observation angle.
    Emissivity {
        #[command(flatten)]
        scene: SceneArgs,
        /// Observation angle in degrees.
        #[arg(long)]
        theta: f64,
    },
    /// Run an angle sweep from a TOML configuration file.
    Run {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file without running the sweep.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// List the supported correlation functions.
    Correlations,
}

/// Surface and medium shared by the single-point commands.
#[derive(Args)]
struct SceneArgs {
    /// Frequency in GHz.
    #[arg(short, long)]
    frequency: f64,
    /// RMS height in metres.
    #[arg(long)]
    rms_height: f64,
    /// Correlation length in metres.
    #[arg(long)]
    correlation_length: f64,
    /// Real part of the relative permittivity.
    #[arg(long, default_value_t = 11.3)]
    eps_real: f64,
    /// Imaginary (loss) part of the relative permittivity.
    #[arg(long, default_value_t = 1.5)]
    eps_imag: f64,
    /// Correlation function of the surface.
    #[arg(short, long, value_enum, default_value_t = Correlation::Exponential)]
    correlation: Correlation,
    /// Shape exponent for the power-law and x-exponential families.
    #[arg(long, default_value_t = 1.0)]
    exponent: f64,
}

#[derive(Clone, Copy, ValueEnum)]
enum Correlation {
    Exponential,
    Gaussian,
    PowerLaw,
    XExponential,
}

impl SceneArgs {
    fn build(&self) -> anyhow::Result<(SurfaceParameters, ElectricalParameters)> {
        let correlation = match self.correlation {
            Correlation::Exponential => CorrelationFunction::Exponential,
            Correlation::Gaussian => CorrelationFunction::Gaussian,
            Correlation::PowerLaw => CorrelationFunction::PowerLaw {
                exponent: self.exponent,
            },
            Correlation::XExponential => CorrelationFunction::XExponential {
                exponent: self.exponent,
            },
        };
        let surface = SurfaceParameters::new(self.rms_height, self.correlation_length, correlation)?;
        let electrical =
            ElectricalParameters::new(self.frequency, Complex64::new(self.eps_real, self.eps_imag))?;
        Ok((surface, electrical))
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let model = I2emModel::default();

    match cli.command {
        Commands::Backscatter {
            scene,
            theta,
            fixed_terms,
        } => {
            let (surface, electrical) = scene.build()?;
            let full = model.full_backscatter(
                &surface,
                &electrical,
                theta.to_radians(),
                TermSelection::from_flag(!fixed_terms),
            )?;
            let [vv, hh, vh] = full.to_db();
            println!("σ⁰VV = {vv:.4} dB");
            println!("σ⁰HH = {hh:.4} dB");
            println!("σ⁰VH = {vh:.4} dB ({} terms)", full.cross_pol.terms);
            if !full.cross_pol.quadrature.converged {
                eprintln!(
                    "Warning: VH integral did not converge (error {:.2e})",
                    full.cross_pol.quadrature.error
                );
            }
            Ok(())
        }
        Commands::Bistatic {
            scene,
            theta_i,
            theta_s,
            phi_s,
        } => {
            let (surface, electrical) = scene.build()?;
            let geometry = Geometry::from_degrees(theta_i, theta_s, phi_s);
            let c = model.bistatic(&surface, &electrical, &geometry)?;
            println!("σ⁰VV = {:.4} dB", to_db(c.vv));
            println!("σ⁰HH = {:.4} dB", to_db(c.hh));
            println!("σ⁰HV = {:.4} dB", to_db(c.hv));
            Ok(())
        }
        Commands::Emissivity { scene, theta } => {
            let (surface, electrical) = scene.build()?;
            let e = model.emissivity(&surface, &electrical, theta.to_radians())?;
            println!("eV = {:.5}", e.v);
            println!("eH = {:.5}", e.h);
            println!(
                "coherent reflectivity = [{:.5}, {:.5}], scattered = [{:.5}, {:.5}]",
                e.coherent_reflectivity[0],
                e.coherent_reflectivity[1],
                e.scattered_reflectivity[0],
                e.scattered_reflectivity[1]
            );
            Ok(())
        }
        Commands::Run { config, output } => {
            println!("I2EM angle sweep");
            println!("================");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            let result = runner::run_sweep(&job)?;
            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));

            if job.output.save_csv {
                runner::write_sweep_csv(&result, &out_dir.join("sweep.csv"), &job)?;
            }
            if job.output.save_json {
                runner::write_sweep_json(&result, &out_dir.join("sweep.json"))?;
            }

            println!("Sweep complete.");
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            job.build_scene()
                .with_context(|| format!("invalid parameters in {}", config.display()))?;
            println!(
                "Configuration is valid: {} ({} angles)",
                config.display(),
                job.geometry.angles.values().len()
            );
            Ok(())
        }
        Commands::Correlations => {
            println!("Correlation functions:");
            println!();
            println!("  exponential    ρ(r) = exp(−r/ℓ)");
            println!("  gaussian       ρ(r) = exp(−r²/ℓ²)");
            println!("  power-law      ρ(r) = (1 + r²/ℓ²)^(−x), x > 0");
            println!("  x-exponential  ρ(r) = exp(−(r/ℓ)^x), 0 < x ≤ 2");
            Ok(())
        }
    }
}
