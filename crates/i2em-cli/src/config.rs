//! TOML configuration deserialisation for sweep jobs.

use anyhow::Context;
use num_complex::Complex64;
use serde::Deserialize;

use i2em_core::spectrum::CorrelationFunction;
use i2em_core::tuning::TuningConfig;
use i2em_core::types::{ElectricalParameters, SurfaceParameters};

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub surface: SurfaceConfig,
    pub dielectric: DielectricConfig,
    pub geometry: GeometryConfig,
    /// Integrator budgets, series threshold and VH scale.
    #[serde(default)]
    pub numerics: TuningConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Surface roughness from TOML.
#[derive(Debug, Deserialize)]
pub struct SurfaceConfig {
    /// RMS height in metres.
    pub rms_height: f64,
    /// Correlation length in metres.
    pub correlation_length: f64,
    /// `{ kind = "exponential" }`, `{ kind = "power_law", exponent = 1.5 }`, ...
    #[serde(default = "default_correlation")]
    pub correlation: CorrelationFunction,
}

fn default_correlation() -> CorrelationFunction {
    CorrelationFunction::Exponential
}

/// Lower medium and sensor frequency.
#[derive(Debug, Deserialize)]
pub struct DielectricConfig {
    pub frequency_ghz: f64,
    /// Relative permittivity as `[real, imaginary]`.
    pub permittivity: [f64; 2],
}

/// Angles and quantities to evaluate.
#[derive(Debug, Deserialize)]
pub struct GeometryConfig {
    /// Incidence (backscatter) or observation (emissivity) angles in degrees.
    pub angles: AngleSpec,
    #[serde(default)]
    pub mode: SweepMode,
    /// Automatic VH term selection (default: true).
    #[serde(default = "default_true")]
    pub auto_select: bool,
}

/// Angle specification: either a range or explicit list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AngleSpec {
    Range { range: [f64; 2], points: usize },
    List { values: Vec<f64> },
}

impl AngleSpec {
    /// Angles in degrees, endpoints included for ranges.
    pub fn values(&self) -> Vec<f64> {
        match self {
            AngleSpec::Range { range, points } => {
                let [start, end] = *range;
                (0..*points)
                    .map(|i| start + (end - start) * i as f64 / (*points - 1).max(1) as f64)
                    .collect()
            }
            AngleSpec::List { values } => values.clone(),
        }
    }
}

/// Quantities computed per angle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepMode {
    /// VV, HH and VH backscatter.
    #[default]
    Backscatter,
    /// V and H emissivity.
    Emissivity,
    /// Both of the above.
    All,
}

impl SweepMode {
    pub fn backscatter(self) -> bool {
        matches!(self, SweepMode::Backscatter | SweepMode::All)
    }

    pub fn emissivity(self) -> bool {
        matches!(self, SweepMode::Emissivity | SweepMode::All)
    }
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Whether to save the sweep as CSV (default: true).
    #[serde(default = "default_true")]
    pub save_csv: bool,
    /// Whether to also save the sweep as JSON (default: false).
    #[serde(default)]
    pub save_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_csv: true,
            save_json: false,
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}
fn default_true() -> bool {
    true
}

impl JobConfig {
    /// Validated model inputs.
    pub fn build_scene(&self) -> anyhow::Result<(SurfaceParameters, ElectricalParameters)> {
        let surface = SurfaceParameters::new(
            self.surface.rms_height,
            self.surface.correlation_length,
            self.surface.correlation,
        )?;
        let [re, im] = self.dielectric.permittivity;
        let electrical =
            ElectricalParameters::new(self.dielectric.frequency_ghz, Complex64::new(re, im))?;
        self.numerics.validate()?;
        if self.geometry.angles.values().is_empty() {
            anyhow::bail!("geometry.angles produces no angles");
        }
        Ok((surface, electrical))
    }
}

/// Parse a TOML job configuration.
pub fn parse_config(content: &str) -> anyhow::Result<JobConfig> {
    let config: JobConfig = toml::from_str(content)?;
    Ok(config)
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    parse_config(&content)
}
