//! Shared test fixtures for integration tests.

// not every test binary uses every fixture
#![allow(dead_code)]

use chrono::NaiveDate;
use dr_sim::series::{LoadSeries, Sample};

/// One day of hourly samples, all at `demand_kw`.
pub fn flat_hourly_day(demand_kw: f64) -> LoadSeries {
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

/// One day of 5-minute samples, all at `demand_kw`.
pub fn flat_five_minute_day(demand_kw: f64) -> LoadSeries {
    let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    LoadSeries::new(
        (0..288)
            .map(|i| Sample {
                timestamp: day.and_hms_opt(i / 12, 5 * (i % 12), 0).unwrap(),
                demand_kw,
            })
            .collect(),
    )
}

/// A unique scratch file path under the system temp directory.
pub fn scratch_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("dr-sim-test-{}-{name}", std::process::id()))
}
