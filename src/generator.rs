//! Synthetic daily series for a resident.
//!
//! Each series is a random walk: the previous day's stability and usage plus
//! uniform noise, a small upward drift, a usage-to-stability coupling term and
//! occasional larger shocks. Values are clamped after every step.

use chrono::{Duration, NaiveDate, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::models::{
    DailyData, FallData, FallLocation, FallSeverity, HealthMetric, Resident, TimeOfDay,
};

pub const STABILITY_RANGE: (f64, f64) = (0.0, 10.0);
pub const USAGE_RANGE: (f64, f64) = (0.0, 100.0);

/// Tunable shape of the walk. Half-widths are the maximum absolute noise drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkParams {
    pub stability_noise: f64,
    pub drift_per_day: f64,
    pub usage_noise: f64,
    pub coupling_divisor: f64,
    pub event_probability: f64,
    pub event_stability_shock: f64,
    pub event_usage_shock: f64,
    pub fall_probability: f64,
    pub metric_noise: f64,
}

impl Default for WalkParams {
    fn default() -> Self {
        Self {
            stability_noise: 0.3,
            drift_per_day: 0.002,
            usage_noise: 15.0,
            coupling_divisor: 400.0,
            event_probability: 0.08,
            event_stability_shock: 1.5,
            event_usage_shock: 25.0,
            fall_probability: 0.07,
            metric_noise: 2.5,
        }
    }
}

/// Owns the random source and window end used to build series.
///
/// The source is ChaCha8, whose output for a given seed is fixed across
/// releases, so a seed always reproduces the same series. Every call to [`SeriesGenerator::generate`] draws fresh values; nothing is
/// cached between calls.
pub struct SeriesGenerator {
    rng: ChaCha8Rng,
    end: NaiveDate,
    params: WalkParams,
}

impl SeriesGenerator {
    pub fn seeded(seed: u64, end: NaiveDate) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            end,
            params: WalkParams::default(),
        }
    }

    pub fn from_entropy(end: NaiveDate) -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
            end,
            params: WalkParams::default(),
        }
    }

    /// Seeded when `seed` is set, otherwise unseeded. The window ends today.
    pub fn for_today(seed: Option<u64>) -> Self {
        let today = Utc::now().date_naive();
        match seed {
            Some(seed) => Self::seeded(seed, today),
            None => Self::from_entropy(today),
        }
    }

    pub fn with_params(mut self, params: WalkParams) -> Self {
        self.params = params;
        self
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn generate(&mut self, resident: &Resident, days: i64) -> Vec<DailyData> {
        generate_series(resident, days, self.end, &self.params, &mut self.rng)
    }
}

/// Unseeded series ending today with the default walk.
pub fn generate(resident: &Resident, days: i64) -> Vec<DailyData> {
    let today = Utc::now().date_naive();
    generate_series(
        resident,
        days,
        today,
        &WalkParams::default(),
        &mut rand::thread_rng(),
    )
}

/// Builds `days` consecutive snapshots, the last one dated `end`.
///
/// Returns an empty series when `days` is not positive or the window would
/// start before the earliest representable date.
pub fn generate_series<R: Rng + ?Sized>(
    resident: &Resident,
    days: i64,
    end: NaiveDate,
    params: &WalkParams,
    rng: &mut R,
) -> Vec<DailyData> {
    if days <= 0 {
        return Vec::new();
    }

    let Some(start) = Duration::try_days(days - 1).and_then(|span| end.checked_sub_signed(span))
    else {
        tracing::warn!(days, %end, "window start out of date range");
        return Vec::new();
    };
    let mut base_stability = resident.stability_score;
    let mut base_usage = resident.pink_noise_usage.baseline_usage();
    let mut series = Vec::with_capacity(days as usize);

    for i in 0..days {
        let drift = params.drift_per_day * i as f64;
        let mut stability = clamp_stability(
            base_stability + jitter(rng, params.stability_noise) + drift,
        );
        let mut usage = clamp_usage(base_usage + jitter(rng, params.usage_noise));

        if i > 0 {
            stability = clamp_stability(stability + (usage - 50.0) / params.coupling_divisor);
        }

        if rng.gen::<f64>() < params.event_probability {
            stability += jitter(rng, params.event_stability_shock);
            usage += jitter(rng, params.event_usage_shock);
            tracing::trace!(resident_id = resident.id, day = i + 1, "significant event");
        }

        stability = clamp_stability(stability);
        usage = clamp_usage(usage);

        let fall_data = if rng.gen::<f64>() < params.fall_probability {
            FallData::occurred(
                pick(rng, &FallSeverity::ALL),
                pick(rng, &FallLocation::ALL),
                pick(rng, &TimeOfDay::ALL),
            )
        } else {
            FallData::none()
        };

        let health_metrics = resident
            .health_metrics
            .iter()
            .map(|metric| HealthMetric {
                value: metric.value + jitter(rng, params.metric_noise),
                ..metric.clone()
            })
            .collect();

        series.push(DailyData {
            day: (i + 1) as u32,
            date: start + Duration::days(i),
            stability,
            pink_noise_usage: usage,
            fall_data,
            health_metrics,
        });

        base_stability = stability;
        base_usage = usage;
    }

    series
}

/// Uniform draw in `[-half_width, +half_width)`.
fn jitter<R: Rng + ?Sized>(rng: &mut R, half_width: f64) -> f64 {
    (rng.gen::<f64>() - 0.5) * 2.0 * half_width
}

fn pick<T: Copy, R: Rng + ?Sized>(rng: &mut R, options: &[T]) -> T {
    options[rng.gen_range(0..options.len())]
}

fn clamp_stability(value: f64) -> f64 {
    value.clamp(STABILITY_RANGE.0, STABILITY_RANGE.1)
}

fn clamp_usage(value: f64) -> f64 {
    value.clamp(USAGE_RANGE.0, USAGE_RANGE.1)
}
