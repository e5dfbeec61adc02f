use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::IngestError;
use crate::types::{CalendarRange, MonthKey};

/// Event kinds that count as an elite signal.
pub const DEFAULT_ELITE_EVENT_KINDS: &[&str] =
    &["PushEvent", "CreateEvent", "DeleteEvent", "GollumEvent"];

/// Every tunable of a pipeline run.
/// Load from a JSON file via `--config <path>`, or print the template with
/// `config-defaults`. Missing fields fall back to their defaults and
/// individual CLI flags override file values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    // -- Calendar --
    /// First month of the shared calendar (`YYYYMM`)
    pub calendar_start: String,
    /// Last month of the shared calendar, inclusive
    pub calendar_end: String,

    // -- Elite labelling --
    /// Event kinds that increment activity counts; everything else is ignored
    pub elite_event_kinds: Vec<String>,
    /// Consecutive inactive months that drop elite status
    pub inactivity_threshold: usize,

    // -- Clustering input --
    /// Value substituted for a zero count before clustering (`null` disables)
    pub zero_epsilon: Option<f64>,

    // -- Clustering --
    /// Cluster count of the detailed run
    pub clusters: usize,
    /// Smallest k of the cohesion sweep
    pub sweep_min: usize,
    /// Largest k of the cohesion sweep, inclusive
    pub sweep_max: usize,
    /// Refinement iterations per KSC run
    pub max_iterations: usize,
    /// Independent KSC runs; the lowest total distance wins
    pub restarts: usize,
    /// RNG seed of the initial partitions
    pub seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            calendar_start: "201501".into(),
            calendar_end: "201810".into(),

            elite_event_kinds: DEFAULT_ELITE_EVENT_KINDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            inactivity_threshold: 3,

            zero_epsilon: Some(0.0001),

            clusters: 3,
            sweep_min: 2,
            sweep_max: 15,
            max_iterations: 100,
            restarts: 10,
            seed: 42,
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file, falling back to defaults for any missing field.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("invalid config JSON '{}'", path.display()))
    }

    /// Default config as pretty JSON (for `config-defaults`).
    pub fn defaults_json() -> Result<String> {
        Ok(serde_json::to_string_pretty(&Self::default())?)
    }

    /// Apply individual CLI overrides on top of the current config.
    pub fn apply_overrides(
        &mut self,
        clusters: Option<usize>,
        sweep_min: Option<usize>,
        sweep_max: Option<usize>,
        seed: Option<u64>,
        no_epsilon: bool,
    ) {
        if let Some(v) = clusters {
            self.clusters = v;
        }
        if let Some(v) = sweep_min {
            self.sweep_min = v;
        }
        if let Some(v) = sweep_max {
            self.sweep_max = v;
        }
        if let Some(v) = seed {
            self.seed = v;
        }
        if no_epsilon {
            self.zero_epsilon = None;
        }
    }

    pub fn calendar(&self) -> Result<CalendarRange, IngestError> {
        let start: MonthKey = self.calendar_start.parse()?;
        let end: MonthKey = self.calendar_end.parse()?;
        CalendarRange::between(start, end)
    }

    pub fn validate(&self) -> Result<()> {
        self.calendar().context("invalid calendar bounds")?;
        if self.inactivity_threshold == 0 {
            bail!("inactivity_threshold must be at least 1");
        }
        if self.sweep_min < 2 {
            bail!("sweep_min must be at least 2, got {}", self.sweep_min);
        }
        if self.sweep_min > self.sweep_max {
            bail!(
                "sweep_min ({}) must not exceed sweep_max ({})",
                self.sweep_min,
                self.sweep_max
            );
        }
        if let Some(eps) = self.zero_epsilon {
            if !(eps.is_finite() && eps > 0.0) {
                bail!("zero_epsilon must be a positive number, got {eps}");
            }
        }
        Ok(())
    }
}
