//! Synthetic demand profile for running without a trainer-produced artifact.
//!
//! The generated day is a sinusoidal neighborhood load (morning trough,
//! evening peak) with seeded Gaussian-ish noise, at the canonical 5-minute
//! resolution. Same seed, same series — fixtures and CLI demo runs stay
//! reproducible.

use chrono::{Duration, NaiveDate};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::series::{LoadSeries, Sample};

/// Spacing of generated samples, matching the canonical artifact.
pub const DEMO_INTERVAL_MINUTES: i64 = 5;

/// Average demand of the generated profile (kW).
const BASE_KW: f64 = 120.0;
/// Amplitude of the daily swing (kW).
const AMP_KW: f64 = 40.0;
/// Phase placing the minimum around 06:00 and the maximum around 18:00.
const PHASE_RAD: f64 = std::f64::consts::PI;
/// Noise standard deviation (kW).
const NOISE_STD: f64 = 3.0;

/// Generates `days` of 5-minute demand samples starting at a fixed epoch.
///
/// # Arguments
///
/// * `days` - Number of days to generate (clamped to at least 1)
/// * `seed` - Random seed for reproducible noise
pub fn demo_series(days: usize, seed: u64) -> LoadSeries {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("static demo epoch is valid");
    let mut rng = StdRng::seed_from_u64(seed);

    let samples_per_day = (24 * 60 / DEMO_INTERVAL_MINUTES) as usize;
    let total = samples_per_day * days.max(1);

    let mut samples = Vec::with_capacity(total);
    for i in 0..total {
        let timestamp = start + Duration::minutes(i as i64 * DEMO_INTERVAL_MINUTES);
        let day_pos = (i % samples_per_day) as f64 / samples_per_day as f64; // [0,1)
        let angle = 2.0 * std::f64::consts::PI * day_pos + PHASE_RAD;

        // Gaussian-ish noise via Box-Muller
        let u1: f64 = rng.random::<f64>().clamp(1e-9, 1.0);
        let u2: f64 = rng.random::<f64>();
        let noise =
            (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos() * NOISE_STD;

        let demand_kw = (BASE_KW + AMP_KW * angle.sin() + noise).max(0.0);
        samples.push(Sample {
            timestamp,
            demand_kw,
        });
    }

    LoadSeries::new(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_day_has_288_five_minute_samples() {
        let series = demo_series(1, 42);
        assert_eq!(series.len(), 288);
        assert!((series.interval_hours() - 1.0 / 12.0).abs() < 1e-12);
    }

    #[test]
    fn same_seed_is_deterministic() {
        assert_eq!(demo_series(1, 7), demo_series(1, 7));
    }

    #[test]
    fn different_seeds_differ() {
        assert_ne!(demo_series(1, 1), demo_series(1, 2));
    }

    #[test]
    fn demand_is_never_negative() {
        let series = demo_series(2, 42);
        assert!(series.iter().all(|s| s.demand_kw >= 0.0));
    }

    #[test]
    fn evening_runs_hotter_than_early_morning() {
        let series = demo_series(1, 42);
        let mean = |hour: u32| {
            let (sum, n) = series
                .iter()
                .filter(|s| s.hour() == hour)
                .fold((0.0, 0usize), |(sum, n), s| (sum + s.demand_kw, n + 1));
            sum / n as f64
        };
        assert!(mean(18) > mean(6));
    }
}
