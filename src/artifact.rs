//! Forecast artifact I/O: the JSON boundary contract shared with the model
//! trainers.
//!
//! On disk the artifact is `{"forecast": [{"ds": ..., "yhat": ...}, ...],
//! "peaks": [...]}`. The field names `ds`/`yhat` exist only at this
//! boundary; they are renamed to timestamp/demand on load and the rest of
//! the crate never sees them. The writer is the exact round-trip partner of
//! the loader: anything it emits loads back unchanged (modulo timestamp
//! string formatting).

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::series::{LoadSeries, Sample};

/// Timestamp format emitted by the writer. Matches the trainers' stringified
/// timestamps, so round-trips stay byte-stable.
pub const TIMESTAMP_WRITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Accepted on-disk timestamp formats, tried in order.
const TIMESTAMP_READ_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// A loaded forecast artifact: the canonical series plus the peak
/// annotations the producer attached.
///
/// The `peaks` list is informational metadata — KPI computation always works
/// from the series itself, never from this list.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastArtifact {
    /// Canonical demand series, in artifact order.
    pub series: LoadSeries,
    /// Timestamps the producer flagged as peaks.
    pub peaks: Vec<NaiveDateTime>,
}

/// Writer-side parameters, made explicit rather than baked in as literals.
#[derive(Debug, Clone)]
pub struct WriterSettings {
    /// Quantile over the persisted slice at or above which a sample counts
    /// as a peak (0.95 flags the top 5%).
    pub peak_quantile: f64,
    /// If set, only the most recent `last_n` samples are persisted.
    pub last_n: Option<usize>,
}

impl Default for WriterSettings {
    fn default() -> Self {
        Self {
            peak_quantile: 0.95,
            last_n: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawArtifact {
    forecast: Option<Vec<RawRecord>>,
    #[serde(default)]
    peaks: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    ds: Option<String>,
    yhat: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct ArtifactOut {
    forecast: Vec<RecordOut>,
    peaks: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RecordOut {
    ds: String,
    yhat: f64,
}

impl ForecastArtifact {
    /// Reads and parses an artifact file.
    ///
    /// # Errors
    ///
    /// `NotFound` if the file is missing, `MalformedArtifact` /
    /// `MalformedRecord` per [`ForecastArtifact::from_json_str`], `Io` for
    /// any other read failure.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                SimError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                SimError::Io(err)
            }
        })?;
        Self::from_json_str(&raw)
    }

    /// Parses an artifact from its JSON text.
    ///
    /// Input order is preserved — the artifact is assumed chronologically
    /// sorted by its producer and the loader performs no re-sort.
    ///
    /// # Errors
    ///
    /// `MalformedArtifact` if the JSON is unparseable or the `forecast`
    /// field is absent or empty; `MalformedRecord` if any record lacks a
    /// `ds` or `yhat` field or carries an unparseable value.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let parsed: RawArtifact = serde_json::from_str(raw)
            .map_err(|err| SimError::MalformedArtifact(err.to_string()))?;

        let records = match parsed.forecast {
            Some(records) if !records.is_empty() => records,
            _ => {
                return Err(SimError::MalformedArtifact(
                    "missing or empty `forecast` field".to_string(),
                ));
            }
        };

        let mut samples = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let ds = record.ds.ok_or_else(|| SimError::MalformedRecord {
                index,
                reason: "missing `ds` timestamp field".to_string(),
            })?;
            let timestamp = parse_timestamp(&ds).ok_or_else(|| SimError::MalformedRecord {
                index,
                reason: format!("unparseable timestamp `{ds}`"),
            })?;
            let demand_kw = match record.yhat {
                Some(value) => coerce_demand(&value).ok_or_else(|| SimError::MalformedRecord {
                    index,
                    reason: format!("unparseable demand value `{value}`"),
                })?,
                None => {
                    return Err(SimError::MalformedRecord {
                        index,
                        reason: "missing `yhat` demand field".to_string(),
                    });
                }
            };
            samples.push(Sample {
                timestamp,
                demand_kw,
            });
        }

        let mut peaks = Vec::with_capacity(parsed.peaks.len());
        for raw_peak in &parsed.peaks {
            let ts = parse_timestamp(raw_peak).ok_or_else(|| {
                SimError::MalformedArtifact(format!("unparseable `peaks` timestamp `{raw_peak}`"))
            })?;
            peaks.push(ts);
        }

        Ok(Self {
            series: LoadSeries::new(samples),
            peaks,
        })
    }
}

/// Loads an artifact and returns just its canonical series.
pub fn load(path: &Path) -> Result<LoadSeries> {
    ForecastArtifact::from_path(path).map(|artifact| artifact.series)
}

/// Serializes a series as a forecast artifact to any writer.
///
/// The persisted slice is the most recent `last_n` samples (all of them when
/// unset); the peak threshold is computed over that same slice, never over
/// the full input.
///
/// # Errors
///
/// `Io` if writing fails, `Json` if serialization fails.
pub fn write_artifact(
    series: &LoadSeries,
    settings: &WriterSettings,
    writer: impl Write,
) -> Result<()> {
    let samples = series.samples();
    let start = settings
        .last_n
        .map_or(0, |n| samples.len().saturating_sub(n));
    let kept = &samples[start..];

    let threshold = peak_threshold(kept, settings.peak_quantile);
    let peaks = kept
        .iter()
        .filter(|s| threshold.is_some_and(|t| s.demand_kw >= t))
        .map(|s| s.timestamp.format(TIMESTAMP_WRITE_FORMAT).to_string())
        .collect();

    let out = ArtifactOut {
        forecast: kept
            .iter()
            .map(|s| RecordOut {
                ds: s.timestamp.format(TIMESTAMP_WRITE_FORMAT).to_string(),
                yhat: s.demand_kw,
            })
            .collect(),
        peaks,
    };

    serde_json::to_writer_pretty(writer, &out)?;
    Ok(())
}

/// Writes a forecast artifact to a file path.
///
/// # Errors
///
/// Same conditions as [`write_artifact`], plus file creation failures.
pub fn export_artifact(series: &LoadSeries, settings: &WriterSettings, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut buf = BufWriter::new(file);
    write_artifact(series, settings, &mut buf)?;
    buf.flush()?;
    Ok(())
}

/// Demand threshold at the given quantile over `samples`, or `None` for an
/// empty slice.
///
/// Uses linear interpolation between closest ranks, matching the artifact
/// producers, so loader and writer agree on what counts as a peak.
pub fn peak_threshold(samples: &[Sample], quantile: f64) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let mut values: Vec<f64> = samples.iter().map(|s| s.demand_kw).collect();
    values.sort_by(f64::total_cmp);

    let q = quantile.clamp(0.0, 1.0);
    let h = q * (values.len() - 1) as f64;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    let frac = h - lo as f64;
    Some(values[lo] + frac * (values[hi] - values[lo]))
}

/// Timestamps of all samples at or above the quantile threshold.
pub fn detect_peaks(samples: &[Sample], quantile: f64) -> Vec<NaiveDateTime> {
    let Some(threshold) = peak_threshold(samples, quantile) else {
        return Vec::new();
    };
    samples
        .iter()
        .filter(|s| s.demand_kw >= threshold)
        .map(|s| s.timestamp)
        .collect()
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_READ_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw.trim(), format).ok())
}

fn coerce_demand(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample(hour: u32, minute: u32, demand_kw: f64) -> Sample {
        Sample {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(hour, minute, 0)
                .unwrap(),
            demand_kw,
        }
    }

    #[test]
    fn loads_ds_yhat_records_in_order() {
        let artifact = ForecastArtifact::from_json_str(
            r#"{
                "forecast": [
                    {"ds": "2024-01-01 00:00:00", "yhat": 100.0},
                    {"ds": "2024-01-01 00:05:00", "yhat": 110.5}
                ],
                "peaks": ["2024-01-01 00:05:00"]
            }"#,
        )
        .expect("artifact should load");

        assert_eq!(artifact.series.len(), 2);
        assert_eq!(artifact.series.samples()[0].demand_kw, 100.0);
        assert_eq!(artifact.series.samples()[1].demand_kw, 110.5);
        assert_eq!(artifact.peaks.len(), 1);
        assert_eq!(artifact.peaks[0], artifact.series.samples()[1].timestamp);
    }

    #[test]
    fn accepts_iso_t_separator_and_fractional_seconds() {
        let artifact = ForecastArtifact::from_json_str(
            r#"{"forecast": [
                {"ds": "2024-01-01T06:00:00", "yhat": 1},
                {"ds": "2024-01-01 06:05:00.500", "yhat": 2}
            ]}"#,
        )
        .expect("artifact should load");
        assert_eq!(artifact.series.len(), 2);
        assert!(artifact.peaks.is_empty());
    }

    #[test]
    fn coerces_string_demand() {
        let artifact = ForecastArtifact::from_json_str(
            r#"{"forecast": [{"ds": "2024-01-01 00:00:00", "yhat": "42.5"}]}"#,
        )
        .expect("artifact should load");
        assert_eq!(artifact.series.samples()[0].demand_kw, 42.5);
    }

    #[test]
    fn empty_forecast_is_malformed_not_empty_series() {
        let err = ForecastArtifact::from_json_str(r#"{"forecast": [], "peaks": []}"#)
            .expect_err("must fail");
        assert!(matches!(err, SimError::MalformedArtifact(_)));
    }

    #[test]
    fn missing_forecast_field_is_malformed() {
        let err = ForecastArtifact::from_json_str(r#"{"peaks": []}"#).expect_err("must fail");
        assert!(matches!(err, SimError::MalformedArtifact(_)));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = ForecastArtifact::from_json_str("not json").expect_err("must fail");
        assert!(matches!(err, SimError::MalformedArtifact(_)));
    }

    #[test]
    fn record_without_demand_reports_index() {
        let err = ForecastArtifact::from_json_str(
            r#"{"forecast": [
                {"ds": "2024-01-01 00:00:00", "yhat": 1.0},
                {"ds": "2024-01-01 00:05:00"}
            ]}"#,
        )
        .expect_err("must fail");
        assert!(matches!(err, SimError::MalformedRecord { index: 1, .. }));
    }

    #[test]
    fn unparseable_timestamp_reports_index() {
        let err = ForecastArtifact::from_json_str(
            r#"{"forecast": [{"ds": "yesterday-ish", "yhat": 1.0}]}"#,
        )
        .expect_err("must fail");
        assert!(matches!(err, SimError::MalformedRecord { index: 0, .. }));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load(Path::new("/definitely/not/here/forecast.json")).expect_err("must fail");
        assert!(matches!(err, SimError::NotFound { .. }));
    }

    #[test]
    fn quantile_threshold_selects_only_the_extreme_value() {
        // [1,1,1,1,10]: interpolated 95th percentile is 8.2, so only the 10
        // qualifies as a peak.
        let samples: Vec<Sample> = [1.0, 1.0, 1.0, 1.0, 10.0]
            .iter()
            .enumerate()
            .map(|(i, &kw)| sample(0, 5 * i as u32, kw))
            .collect();

        let threshold = peak_threshold(&samples, 0.95).expect("non-empty slice");
        assert!((threshold - 8.2).abs() < 1e-9);

        let peaks = detect_peaks(&samples, 0.95);
        assert_eq!(peaks, vec![samples[4].timestamp]);
    }

    #[test]
    fn peak_threshold_of_empty_slice_is_none() {
        assert!(peak_threshold(&[], 0.95).is_none());
        assert!(detect_peaks(&[], 0.95).is_empty());
    }

    #[test]
    fn writer_round_trips_through_loader() {
        let series = LoadSeries::new(
            (0..24)
                .map(|h| sample(h, 0, 100.0 + f64::from(h)))
                .collect(),
        );

        let mut out = Vec::new();
        write_artifact(&series, &WriterSettings::default(), &mut out).expect("write should work");
        let json = String::from_utf8(out).expect("valid UTF-8");

        let reloaded = ForecastArtifact::from_json_str(&json).expect("round trip should load");
        assert_eq!(reloaded.series, series);
        // every annotated peak is a timestamp present in the forecast
        for peak in &reloaded.peaks {
            assert!(reloaded.series.iter().any(|s| s.timestamp == *peak));
        }
    }

    #[test]
    fn last_n_truncates_and_thresholds_over_kept_slice_only() {
        // Large early values must not influence the threshold once truncated
        // away.
        let series = LoadSeries::new(vec![
            sample(0, 0, 1000.0),
            sample(0, 5, 1.0),
            sample(0, 10, 1.0),
            sample(0, 15, 1.0),
            sample(0, 20, 1.0),
            sample(0, 25, 10.0),
        ]);
        let settings = WriterSettings {
            peak_quantile: 0.95,
            last_n: Some(5),
        };

        let mut out = Vec::new();
        write_artifact(&series, &settings, &mut out).expect("write should work");
        let reloaded = ForecastArtifact::from_json_str(&String::from_utf8(out).expect("utf-8"))
            .expect("round trip should load");

        assert_eq!(reloaded.series.len(), 5);
        assert_eq!(reloaded.series.samples()[0].demand_kw, 1.0);
        assert_eq!(
            reloaded.peaks,
            vec![reloaded.series.samples()[4].timestamp]
        );
    }
}
