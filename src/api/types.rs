//! API request and response types.
//!
//! Wire timestamps are formatted strings in the artifact's write format;
//! demand fields keep the crate's internal `_kw` naming, not the artifact's
//! `ds`/`yhat` names.

use serde::Serialize;

use crate::artifact::TIMESTAMP_WRITE_FORMAT;
use crate::kpi::KpiReport;
use crate::series::{LoadSeries, Sample};

/// Baseline summary returned by `GET /state`.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    /// Number of samples in the baseline series.
    pub samples: usize,
    /// Timestamp of the first sample, if any.
    pub start: Option<String>,
    /// Timestamp of the last sample, if any.
    pub end: Option<String>,
    /// Sampling interval in minutes, derived from the series spacing.
    pub interval_minutes: f64,
    /// Maximum baseline demand (kW).
    pub baseline_peak_kw: f64,
}

impl From<&LoadSeries> for StateResponse {
    fn from(series: &LoadSeries) -> Self {
        let fmt = |s: &Sample| s.timestamp.format(TIMESTAMP_WRITE_FORMAT).to_string();
        Self {
            samples: series.len(),
            start: series.samples().first().map(fmt),
            end: series.samples().last().map(fmt),
            interval_minutes: series.interval_hours() * 60.0,
            baseline_peak_kw: series.peak_kw(),
        }
    }
}

/// Simulation result returned by `POST /simulate`.
///
/// The request body is a [`crate::config::ScenarioConfig`] — the same shape
/// as the TOML `[scenario]` table, so CLI config files and API requests
/// describe scenarios identically.
#[derive(Debug, Serialize)]
pub struct SimulateResponse {
    /// Comparative KPIs for this run.
    pub kpi: KpiReport,
    /// The adjusted series, one point per baseline sample.
    pub adjusted: Vec<SeriesPoint>,
}

/// One wire-format series point.
#[derive(Debug, Serialize)]
pub struct SeriesPoint {
    /// Formatted timestamp.
    pub timestamp: String,
    /// Demand in kilowatts.
    pub demand_kw: f64,
}

impl From<&Sample> for SeriesPoint {
    fn from(s: &Sample) -> Self {
        Self {
            timestamp: s.timestamp.format(TIMESTAMP_WRITE_FORMAT).to_string(),
            demand_kw: s.demand_kw,
        }
    }
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
