//! Canonical demand time series.
//!
//! A [`LoadSeries`] is the engine's internal, validated representation of a
//! forecast: an ordered sequence of timezone-naive timestamps with demand in
//! kilowatts. Series are never mutated after construction — every transform
//! allocates a fresh series, so a baseline stays intact for comparison.

use chrono::{NaiveDateTime, Timelike};

/// One forecast sample: an absolute (timezone-naive) point in time and the
/// demand at that instant in kilowatts.
///
/// Demand is expected non-negative in source artifacts but may go negative
/// transiently during scenario arithmetic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Timezone-naive timestamp.
    pub timestamp: NaiveDateTime,
    /// Demand in kilowatts.
    pub demand_kw: f64,
}

impl Sample {
    /// Local hour-of-day of this sample, in `0..24`.
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }
}

/// Ordered, immutable demand series.
///
/// The sampling interval is derived from the timestamps rather than assumed,
/// so energy integration stays correct for any uniform resolution (the
/// canonical artifact uses 5-minute spacing).
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use dr_sim::series::{LoadSeries, Sample};
///
/// let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let series = LoadSeries::new(
///     (0..12)
///         .map(|i| Sample {
///             timestamp: day.and_hms_opt(0, 5 * i, 0).unwrap(),
///             demand_kw: 100.0,
///         })
///         .collect(),
/// );
/// assert_eq!(series.len(), 12);
/// // 5-minute spacing => 1/12 hour between samples
/// assert!((series.interval_hours() - 1.0 / 12.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadSeries {
    samples: Vec<Sample>,
}

impl LoadSeries {
    /// Wraps an ordered sample vector. The input is assumed chronologically
    /// sorted; sorting is a write-time responsibility of whatever produced
    /// the artifact, not a read-time repair.
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the series holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Borrow the underlying samples.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Iterate over samples.
    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// Maximum demand over the series (kW). Zero for an empty series.
    pub fn peak_kw(&self) -> f64 {
        self.samples
            .iter()
            .map(|s| s.demand_kw)
            .reduce(f64::max)
            .unwrap_or(0.0)
    }

    /// Nominal sampling interval in hours, derived from the first adjacent
    /// pair of timestamps. Series with fewer than two samples have no
    /// measurable spacing and report zero.
    pub fn interval_hours(&self) -> f64 {
        match self.samples.as_slice() {
            [first, second, ..] => {
                (second.timestamp - first.timestamp).num_seconds() as f64 / 3600.0
            }
            _ => 0.0,
        }
    }

    /// Builds a new series with identical timestamps and demand produced by
    /// `f` for each sample. This is the only way demand values change: the
    /// receiver is left untouched.
    pub fn map_demand(&self, f: impl Fn(&Sample) -> f64) -> LoadSeries {
        LoadSeries {
            samples: self
                .samples
                .iter()
                .map(|s| Sample {
                    timestamp: s.timestamp,
                    demand_kw: f(s),
                })
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a LoadSeries {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
