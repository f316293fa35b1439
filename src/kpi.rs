//! Comparative KPIs between a baseline and an adjusted series.
//!
//! Computed fresh on every comparison — nothing here is cached, so the
//! numbers always reflect the two series actually passed in.

use std::fmt;

use serde::Serialize;

use crate::error::{Result, SimError};
use crate::series::LoadSeries;

/// Fixed-field KPI record for one baseline/adjusted comparison.
#[derive(Debug, Clone, Serialize)]
pub struct KpiReport {
    /// Maximum baseline demand (kW).
    pub baseline_peak_kw: f64,
    /// Maximum adjusted demand (kW).
    pub adjusted_peak_kw: f64,
    /// Peak reduction (kW); negative when the scenario raised the peak.
    pub peak_reduction_kw: f64,
    /// Peak reduction relative to the baseline peak (%); zero when the
    /// baseline peak is zero.
    pub peak_reduction_pct: f64,
    /// Total energy moved between the two series (kWh): sum of absolute
    /// per-sample differences integrated over the sampling interval.
    pub total_energy_shifted_kwh: f64,
}

impl KpiReport {
    /// Compares a baseline against its scenario-adjusted counterpart.
    ///
    /// The sampling interval for energy integration is derived from the
    /// baseline's own timestamp spacing, so a 5-minute series divides by 12
    /// and an hourly series by 1 without any hard-coded resolution.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the two series differ in length or in any
    /// pairwise timestamp. The scenario engine guarantees matching shapes,
    /// so this only trips when the two series come from different places.
    pub fn compare(baseline: &LoadSeries, adjusted: &LoadSeries) -> Result<Self> {
        if baseline.len() != adjusted.len() {
            return Err(SimError::ShapeMismatch(format!(
                "baseline has {} samples, adjusted has {}",
                baseline.len(),
                adjusted.len()
            )));
        }
        if let Some(index) = baseline
            .iter()
            .zip(adjusted.iter())
            .position(|(b, a)| b.timestamp != a.timestamp)
        {
            return Err(SimError::ShapeMismatch(format!(
                "timestamps diverge at index {index}"
            )));
        }

        let baseline_peak_kw = baseline.peak_kw();
        let adjusted_peak_kw = adjusted.peak_kw();
        let peak_reduction_kw = baseline_peak_kw - adjusted_peak_kw;
        let peak_reduction_pct = if baseline_peak_kw != 0.0 {
            peak_reduction_kw / baseline_peak_kw * 100.0
        } else {
            0.0
        };

        let interval_hours = baseline.interval_hours();
        let total_energy_shifted_kwh: f64 = baseline
            .iter()
            .zip(adjusted.iter())
            .map(|(b, a)| (a.demand_kw - b.demand_kw).abs())
            .sum::<f64>()
            * interval_hours;

        Ok(Self {
            baseline_peak_kw,
            adjusted_peak_kw,
            peak_reduction_kw,
            peak_reduction_pct,
            total_energy_shifted_kwh,
        })
    }
}

impl fmt::Display for KpiReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- KPI Report ---")?;
        writeln!(f, "Baseline peak:        {:.2} kW", self.baseline_peak_kw)?;
        writeln!(f, "Adjusted peak:        {:.2} kW", self.adjusted_peak_kw)?;
        writeln!(
            f,
            "Peak reduction:       {:.2} kW ({:.1}%)",
            self.peak_reduction_kw, self.peak_reduction_pct
        )?;
        write!(
            f,
            "Energy shifted:       {:.2} kWh",
            self.total_energy_shifted_kwh
        )
    }
}
