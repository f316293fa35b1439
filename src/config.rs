//! TOML-based run configuration and preset definitions.
//!
//! A [`RunConfig`] carries everything one simulation run needs beyond the
//! forecast itself: the scenario parameters, the engine settings, and the
//! writer settings. All fields default to the baseline run; load from TOML
//! with [`RunConfig::from_toml_file`] or pick a named preset with
//! [`RunConfig::from_preset`].

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::artifact::WriterSettings;
use crate::error::{Result, SimError};
use crate::scenario::{EngineSettings, HourWindow, Scenario};

/// Top-level run configuration parsed from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Scenario kind and parameters.
    pub scenario: ScenarioConfig,
    /// Scenario-engine settings.
    pub engine: EngineConfig,
    /// Artifact-writer settings.
    pub writer: WriterConfig,
}

/// Scenario parameters. `kind` selects which of the remaining fields apply;
/// the unused ones are ignored, so presets can carry sensible values for
/// both kinds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
    /// `"peak_reduction"` or `"ev_shift"`.
    pub kind: String,
    /// First clipped hour (peak reduction).
    pub start_hour: u32,
    /// First hour past the clipped window (peak reduction).
    pub end_hour: u32,
    /// Demand reduction inside the window, percent (peak reduction).
    pub reduction_percent: f64,
    /// Hours to displace the charging block by (EV shift).
    pub shift_hours: u32,
    /// Charging block magnitude in kW (EV shift).
    pub magnitude_kw: f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            kind: "peak_reduction".to_string(),
            start_hour: 17,
            end_hour: 20,
            reduction_percent: 15.0,
            shift_hours: 4,
            magnitude_kw: 20.0,
        }
    }
}

/// Scenario-engine settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// First hour of the baseline EV charging window.
    pub charging_start_hour: u32,
    /// First hour past the baseline EV charging window.
    pub charging_end_hour: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            charging_start_hour: 17,
            charging_end_hour: 21,
        }
    }
}

/// Artifact-writer settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WriterConfig {
    /// Peak detection quantile over the persisted slice.
    pub peak_quantile: f64,
    /// Retention count; zero keeps everything.
    pub last_n: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            peak_quantile: 0.95,
            last_n: 0,
        }
    }
}

impl RunConfig {
    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "peak-shave", "ev-overnight"];

    /// The baseline run: mild evening peak reduction.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Aggressive evening peak shaving.
    pub fn peak_shave() -> Self {
        Self {
            scenario: ScenarioConfig {
                kind: "peak_reduction".to_string(),
                start_hour: 18,
                end_hour: 21,
                reduction_percent: 20.0,
                ..ScenarioConfig::default()
            },
            ..Self::default()
        }
    }

    /// Push the evening EV charging block into the night.
    pub fn ev_overnight() -> Self {
        Self {
            scenario: ScenarioConfig {
                kind: "ev_shift".to_string(),
                shift_hours: 8,
                magnitude_kw: 20.0,
                ..ScenarioConfig::default()
            },
            ..Self::default()
        }
    }

    /// Loads a run configuration from a named preset.
    ///
    /// # Errors
    ///
    /// `Config` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "peak-shave" => Ok(Self::peak_shave()),
            "ev-overnight" => Ok(Self::ev_overnight()),
            _ => Err(SimError::Config(format!(
                "unknown preset \"{name}\", available: {}",
                Self::PRESETS.join(", ")
            ))),
        }
    }

    /// Parses a run configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// `Config` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SimError::Config(format!("cannot read \"{}\": {e}", path.display()))
        })?;
        toml::from_str(&content).map_err(|e| {
            SimError::Config(format!("invalid TOML in \"{}\": {e}", path.display()))
        })
    }

    /// Builds the validated scenario this configuration describes.
    ///
    /// # Errors
    ///
    /// `Config` on an unknown `scenario.kind`, `InvalidScenario` on
    /// out-of-range parameters.
    pub fn scenario(&self) -> Result<Scenario> {
        let s = &self.scenario;
        match s.kind.as_str() {
            "peak_reduction" => {
                Scenario::peak_reduction(s.start_hour, s.end_hour, s.reduction_percent)
            }
            "ev_shift" => Scenario::ev_shift(s.shift_hours, s.magnitude_kw),
            other => Err(SimError::Config(format!(
                "scenario.kind must be \"peak_reduction\" or \"ev_shift\", got \"{other}\""
            ))),
        }
    }

    /// Builds the validated engine settings.
    ///
    /// # Errors
    ///
    /// `InvalidScenario` if the charging window is out of range or spans
    /// midnight.
    pub fn engine_settings(&self) -> Result<EngineSettings> {
        Ok(EngineSettings {
            charging_window: HourWindow::new(
                self.engine.charging_start_hour,
                self.engine.charging_end_hour,
            )?,
        })
    }

    /// Builds the validated writer settings.
    ///
    /// # Errors
    ///
    /// `Config` if the peak quantile is outside `[0, 1]`.
    pub fn writer_settings(&self) -> Result<WriterSettings> {
        let w = &self.writer;
        if !w.peak_quantile.is_finite() || !(0.0..=1.0).contains(&w.peak_quantile) {
            return Err(SimError::Config(format!(
                "writer.peak_quantile must be in [0.0, 1.0], got {}",
                w.peak_quantile
            )));
        }
        Ok(WriterSettings {
            peak_quantile: w.peak_quantile,
            last_n: (w.last_n > 0).then_some(w.last_n),
        })
    }
}
