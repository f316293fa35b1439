//! Demand-response scenario descriptors and the transform engine.
//!
//! A [`Scenario`] is a tagged, range-validated description of one
//! intervention; out-of-range parameters are rejected at construction, never
//! silently defaulted. Applying a scenario is a pure function: the baseline
//! is untouched and the adjusted series comes back with an identical
//! timestamp sequence.
//!
//! Windows are evaluated purely on hour-of-day, independent of calendar
//! date — a scenario repeats identically every day the series spans. That is
//! a deliberate contract, not an accident of implementation.

use std::fmt;

use crate::error::{Result, SimError};
use crate::series::LoadSeries;

/// Half-open `[start, end)` hour-of-day window.
///
/// Constructed windows never span midnight (`start < end` is enforced);
/// windows produced by [`HourWindow::rotated`] may wrap past hour 24 and
/// membership handles the wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourWindow {
    start: u32,
    len: u32,
}

impl HourWindow {
    /// Builds a window covering hours `start_hour <= h < end_hour`.
    ///
    /// # Errors
    ///
    /// `InvalidScenario` unless `0 <= start_hour <= 23`,
    /// `end_hour <= 24` and `start_hour < end_hour`. Windows spanning
    /// midnight are rejected here; relocate one with
    /// [`HourWindow::rotated`] instead.
    pub fn new(start_hour: u32, end_hour: u32) -> Result<Self> {
        if start_hour > 23 {
            return Err(SimError::InvalidScenario(format!(
                "start_hour must be within [0, 23], got {start_hour}"
            )));
        }
        if end_hour > 24 {
            return Err(SimError::InvalidScenario(format!(
                "end_hour must be within [0, 24], got {end_hour}"
            )));
        }
        if start_hour >= end_hour {
            return Err(SimError::InvalidScenario(format!(
                "window must not span midnight: start_hour ({start_hour}) \
                 must be < end_hour ({end_hour})"
            )));
        }
        Ok(Self {
            start: start_hour,
            len: end_hour - start_hour,
        })
    }

    /// First hour inside the window.
    pub fn start_hour(&self) -> u32 {
        self.start
    }

    /// Number of whole hours the window covers.
    pub fn len_hours(&self) -> u32 {
        self.len
    }

    /// Whether the given hour-of-day falls inside the window.
    ///
    /// Works for wrapped windows too: membership is distance from the start
    /// hour modulo 24.
    pub fn contains(&self, hour: u32) -> bool {
        (hour + 24 - self.start) % 24 < self.len
    }

    /// The same-length window starting `shift_hours` later, wrapping past
    /// midnight when the shifted bounds cross hour 24. Wrapping keeps the
    /// relocated block whole instead of truncating it at the end of day.
    pub fn rotated(&self, shift_hours: u32) -> Self {
        Self {
            start: (self.start + shift_hours) % 24,
            len: self.len,
        }
    }
}

/// Engine-level settings for transforms with implicit domain knowledge.
///
/// The EV charging window used to be a buried constant; it is explicit here
/// so the transform's assumption is overridable and testable.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Hour-of-day window in which the relocatable EV charging block sits in
    /// the baseline.
    pub charging_window: HourWindow,
}

impl Default for EngineSettings {
    fn default() -> Self {
        // 17:00-21:00 evening charging block
        Self {
            charging_window: HourWindow { start: 17, len: 4 },
        }
    }
}

/// A named, parameterized demand-response intervention.
///
/// Build via [`Scenario::peak_reduction`] or [`Scenario::ev_shift`]; the
/// constructors validate ranges so an instance always describes a
/// well-defined transform.
#[derive(Debug, Clone, PartialEq)]
pub enum Scenario {
    /// Scales demand inside an hour-of-day window by `1 - percent/100`.
    PeakReduction {
        /// Hours whose demand is clipped.
        window: HourWindow,
        /// Reduction in percent, within `[0, 100]`.
        reduction_percent: f64,
    },
    /// Relocates a fixed-magnitude rectangular charging block from the
    /// engine's charging window to the window `shift_hours` later.
    EvShift {
        /// Whole hours to displace the charging block by, within `[0, 23]`.
        shift_hours: u32,
        /// Magnitude of the relocated block in kilowatts, `>= 0`.
        magnitude_kw: f64,
    },
}

impl Scenario {
    /// Builds a peak-reduction scenario.
    ///
    /// # Errors
    ///
    /// `InvalidScenario` on a midnight-spanning or out-of-range window, or
    /// a `reduction_percent` outside `[0, 100]`.
    pub fn peak_reduction(start_hour: u32, end_hour: u32, reduction_percent: f64) -> Result<Self> {
        let window = HourWindow::new(start_hour, end_hour)?;
        if !reduction_percent.is_finite() || !(0.0..=100.0).contains(&reduction_percent) {
            return Err(SimError::InvalidScenario(format!(
                "reduction_percent must be within [0, 100], got {reduction_percent}"
            )));
        }
        Ok(Self::PeakReduction {
            window,
            reduction_percent,
        })
    }

    /// Builds an EV-shift scenario.
    ///
    /// # Errors
    ///
    /// `InvalidScenario` if `shift_hours > 23` or `magnitude_kw` is
    /// negative or non-finite.
    pub fn ev_shift(shift_hours: u32, magnitude_kw: f64) -> Result<Self> {
        if shift_hours > 23 {
            return Err(SimError::InvalidScenario(format!(
                "shift_hours must be within [0, 23], got {shift_hours}"
            )));
        }
        if !magnitude_kw.is_finite() || magnitude_kw < 0.0 {
            return Err(SimError::InvalidScenario(format!(
                "magnitude_kw must be finite and >= 0, got {magnitude_kw}"
            )));
        }
        Ok(Self::EvShift {
            shift_hours,
            magnitude_kw,
        })
    }

    /// Applies this scenario to a baseline, returning the adjusted series.
    ///
    /// The result has the same length and timestamp sequence as the input;
    /// the baseline itself is never modified. Identity parameters
    /// (`reduction_percent = 0`, `magnitude_kw = 0`) return a series
    /// numerically equal to the baseline.
    pub fn apply(&self, baseline: &LoadSeries, settings: &EngineSettings) -> LoadSeries {
        match self {
            Self::PeakReduction {
                window,
                reduction_percent,
            } => {
                let factor = 1.0 - reduction_percent / 100.0;
                baseline.map_demand(|s| {
                    if window.contains(s.hour()) {
                        s.demand_kw * factor
                    } else {
                        s.demand_kw
                    }
                })
            }
            Self::EvShift {
                shift_hours,
                magnitude_kw,
            } => {
                let original = settings.charging_window;
                let shifted = original.rotated(*shift_hours);
                baseline.map_demand(|s| {
                    let hour = s.hour();
                    let mut demand_kw = s.demand_kw;
                    if original.contains(hour) {
                        demand_kw -= magnitude_kw;
                    }
                    // overlap of both windows nets to zero
                    if shifted.contains(hour) {
                        demand_kw += magnitude_kw;
                    }
                    demand_kw
                })
            }
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PeakReduction {
                window,
                reduction_percent,
            } => write!(
                f,
                "peak reduction of {reduction_percent:.1}% over hours {}-{}",
                window.start_hour(),
                window.start_hour() + window.len_hours()
            ),
            Self::EvShift {
                shift_hours,
                magnitude_kw,
            } => write!(
                f,
                "EV charging shift of {magnitude_kw:.1} kW by {shift_hours} h"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Sample;
    use chrono::NaiveDate;

    /// One day of hourly samples, all at `demand_kw`.
    fn flat_day(demand_kw: f64) -> LoadSeries {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        LoadSeries::new(
            (0..24)
                .map(|h| Sample {
                    timestamp: day.and_hms_opt(h, 0, 0).unwrap(),
                    demand_kw,
                })
                .collect(),
        )
    }

    #[test]
    fn hour_window_membership_is_half_open() {
        let window = HourWindow::new(17, 21).unwrap();
        assert!(!window.contains(16));
        assert!(window.contains(17));
        assert!(window.contains(20));
        assert!(!window.contains(21));
    }

    #[test]
    fn hour_window_rejects_midnight_span() {
        assert!(HourWindow::new(21, 17).is_err());
        assert!(HourWindow::new(5, 5).is_err());
        assert!(HourWindow::new(24, 24).is_err());
        assert!(HourWindow::new(0, 25).is_err());
    }

    #[test]
    fn rotated_window_wraps_past_midnight() {
        let window = HourWindow::new(17, 21).unwrap();
        let rotated = window.rotated(5); // covers 22, 23, 0, 1
        assert!(rotated.contains(22));
        assert!(rotated.contains(23));
        assert!(rotated.contains(0));
        assert!(rotated.contains(1));
        assert!(!rotated.contains(2));
        assert!(!rotated.contains(21));
    }

    #[test]
    fn full_day_window_contains_every_hour() {
        let window = HourWindow::new(0, 24).unwrap();
        for hour in 0..24 {
            assert!(window.contains(hour));
        }
    }

    #[test]
    fn peak_reduction_rejects_out_of_range_percent() {
        assert!(Scenario::peak_reduction(17, 20, -1.0).is_err());
        assert!(Scenario::peak_reduction(17, 20, 100.5).is_err());
        assert!(Scenario::peak_reduction(17, 20, f64::NAN).is_err());
        assert!(Scenario::peak_reduction(17, 20, 0.0).is_ok());
        assert!(Scenario::peak_reduction(17, 20, 100.0).is_ok());
    }

    #[test]
    fn ev_shift_rejects_bad_parameters() {
        assert!(Scenario::ev_shift(24, 5.0).is_err());
        assert!(Scenario::ev_shift(4, -0.1).is_err());
        assert!(Scenario::ev_shift(4, f64::INFINITY).is_err());
        assert!(Scenario::ev_shift(0, 0.0).is_ok());
        assert!(Scenario::ev_shift(23, 50.0).is_ok());
    }

    #[test]
    fn zero_percent_reduction_is_identity() {
        let baseline = flat_day(123.4);
        let scenario = Scenario::peak_reduction(0, 24, 0.0).unwrap();
        let adjusted = scenario.apply(&baseline, &EngineSettings::default());
        assert_eq!(adjusted, baseline);
    }

    #[test]
    fn zero_magnitude_shift_is_identity() {
        let baseline = flat_day(55.0);
        let scenario = Scenario::ev_shift(6, 0.0).unwrap();
        let adjusted = scenario.apply(&baseline, &EngineSettings::default());
        assert_eq!(adjusted, baseline);
    }

    #[test]
    fn apply_preserves_shape_and_baseline() {
        let baseline = flat_day(100.0);
        let scenario = Scenario::peak_reduction(18, 21, 20.0).unwrap();
        let adjusted = scenario.apply(&baseline, &EngineSettings::default());

        assert_eq!(adjusted.len(), baseline.len());
        for (a, b) in adjusted.iter().zip(baseline.iter()) {
            assert_eq!(a.timestamp, b.timestamp);
        }
        // baseline untouched
        assert!(baseline.iter().all(|s| s.demand_kw == 100.0));
    }

    #[test]
    fn peak_reduction_clips_only_the_window() {
        let baseline = flat_day(100.0);
        let scenario = Scenario::peak_reduction(18, 21, 20.0).unwrap();
        let adjusted = scenario.apply(&baseline, &EngineSettings::default());

        for sample in &adjusted {
            let expected = if (18..21).contains(&sample.hour()) {
                80.0
            } else {
                100.0
            };
            assert_eq!(sample.demand_kw, expected, "hour {}", sample.hour());
        }
    }

    #[test]
    fn ev_shift_moves_the_block() {
        let baseline = flat_day(100.0);
        let scenario = Scenario::ev_shift(6, 20.0).unwrap();
        let adjusted = scenario.apply(&baseline, &EngineSettings::default());

        for sample in &adjusted {
            let hour = sample.hour();
            let expected = if (17..21).contains(&hour) {
                80.0 // charging removed
            } else if hour == 23 || hour < 3 {
                120.0 // shifted window 23,0,1,2 wraps past midnight
            } else {
                100.0
            };
            assert_eq!(sample.demand_kw, expected, "hour {hour}");
        }
    }

    #[test]
    fn ev_shift_overlap_nets_to_zero() {
        let baseline = flat_day(100.0);
        // shift by 2: original 17-21, shifted 19-23, overlap 19-21
        let scenario = Scenario::ev_shift(2, 30.0).unwrap();
        let adjusted = scenario.apply(&baseline, &EngineSettings::default());

        for sample in &adjusted {
            let hour = sample.hour();
            let expected = match hour {
                17 | 18 => 70.0,
                19 | 20 => 100.0,
                21 | 22 => 130.0,
                _ => 100.0,
            };
            assert_eq!(sample.demand_kw, expected, "hour {hour}");
        }
    }

    #[test]
    fn custom_charging_window_is_respected() {
        let baseline = flat_day(100.0);
        let settings = EngineSettings {
            charging_window: HourWindow::new(1, 3).unwrap(),
        };
        let scenario = Scenario::ev_shift(10, 10.0).unwrap();
        let adjusted = scenario.apply(&baseline, &settings);

        for sample in &adjusted {
            let hour = sample.hour();
            let expected = match hour {
                1 | 2 => 90.0,
                11 | 12 => 110.0,
                _ => 100.0,
            };
            assert_eq!(sample.demand_kw, expected, "hour {hour}");
        }
    }
}
