use crate::generator::SeriesGenerator;
use crate::models::{
    AttentionEntry, DailyAverage, DailyData, DailyFalls, Distribution, FallDetail, OverviewStats,
    Resident, StabilityTier, TierCounts, UsagePoint,
};

pub const ATTENTION_LIMIT: usize = 5;
pub const USAGE_ATTENTION_THRESHOLD: f64 = 50.0;
pub const LATEST_WINDOW_DAYS: i64 = 30;

pub fn count_falls(series: &[DailyData]) -> usize {
    series.iter().filter(|day| day.fall_data.occurred).count()
}

pub fn fall_details(series: &[DailyData]) -> Vec<FallDetail> {
    series
        .iter()
        .filter(|day| day.fall_data.occurred)
        .map(|day| FallDetail {
            date: day.date,
            severity: day.fall_data.severity,
            location: day.fall_data.location,
            time_of_day: day.fall_data.time_of_day,
            stability: day.stability,
            pink_noise_usage: day.pink_noise_usage,
        })
        .collect()
}

/// One fresh series per resident, in catalog order.
///
/// Fold the result with [`overview_of`], [`daily_averages_of`], [`fall_trend_of`]
/// and [`attention_of`] when several views must describe the same sample.
pub fn population_series(
    residents: &[Resident],
    days: i64,
    generator: &mut SeriesGenerator,
) -> Vec<Vec<DailyData>> {
    residents
        .iter()
        .map(|resident| generator.generate(resident, days))
        .collect()
}

/// Population-wide averages over every generated day, plus the fall total.
pub fn overview_stats(
    residents: &[Resident],
    days: i64,
    generator: &mut SeriesGenerator,
) -> OverviewStats {
    overview_of(residents, &population_series(residents, days, generator))
}

pub fn overview_of(residents: &[Resident], population: &[Vec<DailyData>]) -> OverviewStats {
    for (resident, series) in residents.iter().zip(population.iter()) {
        if series.is_empty() {
            tracing::warn!(resident_id = resident.id, "no data generated for resident");
        }
    }

    let all_days: Vec<&DailyData> = population.iter().flatten().collect();
    if all_days.is_empty() {
        tracing::warn!(residents = residents.len(), "no data generated for any resident");
        return OverviewStats::default();
    }

    OverviewStats {
        total_residents: residents.len(),
        average_stability: mean(all_days.iter().map(|day| day.stability)),
        average_pink_noise_usage: mean(all_days.iter().map(|day| day.pink_noise_usage)),
        total_falls: all_days.iter().filter(|day| day.fall_data.occurred).count(),
    }
}

/// Per-day averages across residents, indexed from day 1.
pub fn daily_averages(
    residents: &[Resident],
    days: i64,
    generator: &mut SeriesGenerator,
) -> Vec<DailyAverage> {
    daily_averages_of(days, &population_series(residents, days, generator))
}

pub fn daily_averages_of(days: i64, population: &[Vec<DailyData>]) -> Vec<DailyAverage> {
    let window = days.max(0) as usize;
    let mut averages: Vec<DailyAverage> = (0..window)
        .map(|index| DailyAverage {
            day: index as u32 + 1,
            average_stability: 0.0,
            average_pink_noise_usage: 0.0,
        })
        .collect();
    let count = population.len() as f64;

    for series in population.iter() {
        for (slot, day) in averages.iter_mut().zip(series.iter()) {
            slot.average_stability += day.stability / count;
            slot.average_pink_noise_usage += day.pink_noise_usage / count;
        }
    }

    averages
}

/// Number of falls on each day index across the whole population.
pub fn fall_trend(
    residents: &[Resident],
    days: i64,
    generator: &mut SeriesGenerator,
) -> Vec<DailyFalls> {
    fall_trend_of(days, &population_series(residents, days, generator))
}

pub fn fall_trend_of(days: i64, population: &[Vec<DailyData>]) -> Vec<DailyFalls> {
    let window = days.max(0) as usize;
    let mut falls = vec![0usize; window];

    for series in population.iter() {
        for (count, day) in falls.iter_mut().zip(series.iter()) {
            if day.fall_data.occurred {
                *count += 1;
            }
        }
    }

    falls
        .into_iter()
        .enumerate()
        .map(|(index, falls)| DailyFalls {
            day: index as u32 + 1,
            falls,
        })
        .collect()
}

/// Window averages and the attention flag for one resident's series.
pub fn assess(resident: &Resident, series: &[DailyData]) -> AttentionEntry {
    let fall_incidents = count_falls(series);
    let (average_stability, average_pink_noise_usage, needs_attention) = if series.is_empty() {
        tracing::warn!(resident_id = resident.id, "cannot assess an empty series");
        (0.0, 0.0, false)
    } else {
        let stability = mean(series.iter().map(|day| day.stability));
        let usage = mean(series.iter().map(|day| day.pink_noise_usage));
        let flagged = stability < resident.stability_goal
            || usage < USAGE_ATTENTION_THRESHOLD
            || fall_incidents > 0;
        (stability, usage, flagged)
    };

    AttentionEntry {
        resident_id: resident.id,
        name: resident.name.clone(),
        room: resident.room.clone(),
        stability_goal: resident.stability_goal,
        average_stability,
        average_pink_noise_usage,
        fall_incidents,
        needs_attention,
    }
}

/// Flagged residents with the lowest average stability first, at most five.
pub fn attention_ranking(
    residents: &[Resident],
    days: i64,
    generator: &mut SeriesGenerator,
) -> Vec<AttentionEntry> {
    attention_of(residents, &population_series(residents, days, generator))
}

pub fn attention_of(residents: &[Resident], population: &[Vec<DailyData>]) -> Vec<AttentionEntry> {
    let entries = residents
        .iter()
        .zip(population.iter())
        .map(|(resident, series)| assess(resident, series))
        .collect();
    rank_attention(entries)
}

pub fn rank_attention(entries: Vec<AttentionEntry>) -> Vec<AttentionEntry> {
    let mut flagged: Vec<AttentionEntry> = entries
        .into_iter()
        .filter(|entry| entry.needs_attention)
        .collect();
    flagged.sort_by(|a, b| {
        a.average_stability
            .partial_cmp(&b.average_stability)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    flagged.truncate(ATTENTION_LIMIT);
    flagged
}

/// Residents counted by their static pink noise category.
pub fn distribution(residents: &[Resident]) -> Distribution {
    let mut buckets = Distribution::default();
    for resident in residents.iter() {
        buckets.bump(resident.pink_noise_usage);
    }
    buckets
}

/// Residents counted by the tier of their baseline stability score.
pub fn stability_tiers(residents: &[Resident]) -> TierCounts {
    let mut counts = TierCounts::default();
    for resident in residents.iter() {
        counts.bump(StabilityTier::of(resident.stability_score));
    }
    counts
}

pub fn stability_vs_usage(
    residents: &[Resident],
    days: i64,
    generator: &mut SeriesGenerator,
) -> Vec<UsagePoint> {
    residents
        .iter()
        .flat_map(|resident| generator.generate(resident, days))
        .map(|day| UsagePoint {
            pink_noise_usage: day.pink_noise_usage,
            stability: day.stability,
        })
        .collect()
}

/// Last day of a fresh thirty-day window.
pub fn latest(resident: &Resident, generator: &mut SeriesGenerator) -> Option<DailyData> {
    generator.generate(resident, LATEST_WINDOW_DAYS).pop()
}

/// Signed change from `initial` to `current` in percent. `None` when undefined.
pub fn percentage_change(initial: f64, current: f64) -> Option<f64> {
    if !initial.is_finite() || !current.is_finite() || initial == 0.0 {
        return None;
    }
    Some((current - initial) / initial * 100.0)
}

/// "+12.5", "-3.0" or "N/A".
pub fn format_change(change: Option<f64>) -> String {
    match change {
        Some(value) if value >= 0.0 => format!("+{value:.1}"),
        Some(value) => format!("{value:.1}"),
        None => "N/A".to_string(),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut total = 0.0;
    let mut count = 0usize;

    for value in values {
        if !value.is_finite() {
            tracing::warn!(value, "skipping non-finite value");
            continue;
        }
        total += value;
        count += 1;
    }

    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FallData, FallLocation, FallSeverity, TimeOfDay, UsageLevel};
    use crate::registry;
    use chrono::{Duration, NaiveDate};

    fn end_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
    }

    fn catalog() -> Vec<Resident> {
        registry::all_residents().unwrap()
    }

    fn day(index: u32, stability: f64, usage: f64, fell: bool) -> DailyData {
        DailyData {
            day: index,
            date: end_date() + Duration::days(index as i64),
            stability,
            pink_noise_usage: usage,
            fall_data: if fell {
                FallData::occurred(FallSeverity::Minor, FallLocation::Hallway, TimeOfDay::Night)
            } else {
                FallData::none()
            },
            health_metrics: Vec::new(),
        }
    }

    #[test]
    fn fall_count_never_exceeds_days() {
        let residents = catalog();
        let mut generator = SeriesGenerator::seeded(21, end_date());
        for resident in residents.iter() {
            for days in [1, 7, 30, 90] {
                let series = generator.generate(resident, days);
                assert!(count_falls(&series) <= days as usize);
                assert_eq!(fall_details(&series).len(), count_falls(&series));
            }
        }
    }

    #[test]
    fn fall_details_copy_the_day_values() {
        let series = vec![day(1, 5.0, 40.0, false), day(2, 6.5, 70.0, true)];
        let details = fall_details(&series);
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].date, series[1].date);
        assert_eq!(details[0].stability, 6.5);
        assert_eq!(details[0].severity, Some(FallSeverity::Minor));
    }

    #[test]
    fn distribution_partitions_catalog() {
        let residents = catalog();
        let buckets = distribution(&residents);
        assert_eq!(buckets.total(), residents.len());
        assert_eq!(buckets.get(UsageLevel::Low), 6);
        assert_eq!(buckets.get(UsageLevel::Medium), 11);
        assert_eq!(buckets.get(UsageLevel::High), 7);
    }

    #[test]
    fn stability_tiers_partition_catalog() {
        let residents = catalog();
        let tiers = stability_tiers(&residents);
        assert_eq!(tiers.total(), residents.len());
        assert_eq!(tiers.low, 2);
        assert_eq!(tiers.medium, 10);
        assert_eq!(tiers.high, 12);
        assert_eq!(tiers.get(StabilityTier::Low), 2);
        assert_eq!(StabilityTier::of(4.9), StabilityTier::Low);
        assert_eq!(StabilityTier::of(5.0), StabilityTier::Medium);
        assert_eq!(StabilityTier::of(7.0), StabilityTier::High);
    }

    #[test]
    fn overview_of_empty_catalog_is_zeroed() {
        let mut generator = SeriesGenerator::seeded(0, end_date());
        let stats = overview_stats(&[], 30, &mut generator);
        assert_eq!(stats, OverviewStats::default());
        assert_eq!(stats.total_residents, 0);
        assert_eq!(stats.average_stability, 0.0);
        assert_eq!(stats.average_pink_noise_usage, 0.0);
        assert_eq!(stats.total_falls, 0);
    }

    #[test]
    fn overview_with_empty_window_is_zeroed() {
        let residents = catalog();
        let mut generator = SeriesGenerator::seeded(0, end_date());
        assert_eq!(overview_stats(&residents, 0, &mut generator), OverviewStats::default());
    }

    #[test]
    fn overview_averages_stay_in_bounds() {
        let residents = catalog();
        let mut generator = SeriesGenerator::seeded(4, end_date());
        let stats = overview_stats(&residents, 30, &mut generator);
        assert_eq!(stats.total_residents, 24);
        assert!((0.0..=10.0).contains(&stats.average_stability));
        assert!((0.0..=100.0).contains(&stats.average_pink_noise_usage));
        assert!(stats.total_falls <= 24 * 30);
    }

    #[test]
    fn daily_averages_cover_each_day() {
        let residents = catalog();
        let mut generator = SeriesGenerator::seeded(8, end_date());
        let averages = daily_averages(&residents, 14, &mut generator);
        assert_eq!(averages.len(), 14);
        assert_eq!(averages[0].day, 1);
        assert_eq!(averages[13].day, 14);
        assert!(averages
            .iter()
            .all(|day| (0.0..=10.0 + 1e-9).contains(&day.average_stability)));

        assert!(daily_averages(&[], 7, &mut generator)
            .iter()
            .all(|day| day.average_stability == 0.0));
    }

    #[test]
    fn fall_trend_buckets_by_day_index() {
        let residents = catalog();
        let mut generator = SeriesGenerator::seeded(12, end_date());
        let trend = fall_trend(&residents, 30, &mut generator);
        assert_eq!(trend.len(), 30);
        assert!(trend.iter().all(|day| day.falls <= residents.len()));
        assert_eq!(trend[29].day, 30);
    }

    #[test]
    fn folds_over_one_population_agree() {
        let residents = catalog();
        let mut generator = SeriesGenerator::seeded(17, end_date());
        let population = population_series(&residents, 30, &mut generator);
        assert_eq!(population.len(), residents.len());

        let stats = overview_of(&residents, &population);
        let trend = fall_trend_of(30, &population);
        let ranking = attention_of(&residents, &population);

        let trend_total: usize = trend.iter().map(|day| day.falls).sum();
        assert_eq!(stats.total_falls, trend_total);
        let per_resident: usize = population.iter().map(|series| count_falls(series)).sum();
        assert_eq!(stats.total_falls, per_resident);

        for entry in ranking.iter() {
            let index = residents
                .iter()
                .position(|resident| resident.id == entry.resident_id)
                .unwrap();
            assert_eq!(entry.fall_incidents, count_falls(&population[index]));
        }

        let averages = daily_averages_of(30, &population);
        let mean_of_days =
            averages.iter().map(|day| day.average_stability).sum::<f64>() / averages.len() as f64;
        assert!((mean_of_days - stats.average_stability).abs() < 1e-9);
    }

    #[test]
    fn attention_ranking_is_short_flagged_and_sorted() {
        let residents = catalog();
        for seed in 0..10 {
            let mut generator = SeriesGenerator::seeded(seed, end_date());
            let ranking = attention_ranking(&residents, 30, &mut generator);
            assert!(ranking.len() <= ATTENTION_LIMIT);
            assert!(ranking.iter().all(|entry| entry.needs_attention));
            for pair in ranking.windows(2) {
                assert!(pair[0].average_stability <= pair[1].average_stability);
            }
        }
    }

    #[test]
    fn healthy_resident_is_never_flagged() {
        let residents = catalog();
        let carol = registry::find(&residents, 3).unwrap();
        let series: Vec<DailyData> = (1..=30).map(|i| day(i, 8.0, 75.0, false)).collect();

        let entry = assess(carol, &series);
        assert!(!entry.needs_attention);
        assert!(rank_attention(vec![entry]).is_empty());
    }

    #[test]
    fn each_attention_trigger_flags_resident() {
        let residents = catalog();
        let carol = registry::find(&residents, 3).unwrap();

        let below_goal: Vec<DailyData> = (1..=7).map(|i| day(i, 7.0, 75.0, false)).collect();
        assert!(assess(carol, &below_goal).needs_attention);

        let low_usage: Vec<DailyData> = (1..=7).map(|i| day(i, 8.0, 49.0, false)).collect();
        assert!(assess(carol, &low_usage).needs_attention);

        let mut with_fall: Vec<DailyData> = (1..=7).map(|i| day(i, 8.0, 75.0, false)).collect();
        with_fall[3] = day(4, 8.0, 75.0, true);
        let entry = assess(carol, &with_fall);
        assert!(entry.needs_attention);
        assert_eq!(entry.fall_incidents, 1);
    }

    #[test]
    fn ranking_keeps_lowest_five() {
        let residents = catalog();
        let entries = residents
            .iter()
            .take(8)
            .enumerate()
            .map(|(index, resident)| {
                let stability = 1.0 + index as f64 * 0.1;
                let series: Vec<DailyData> =
                    (1..=7).map(|i| day(i, stability, 30.0, false)).collect();
                assess(resident, &series)
            })
            .rev()
            .collect();

        let ranked = rank_attention(entries);
        let ids: Vec<u32> = ranked.iter().map(|entry| entry.resident_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn empty_series_is_not_flagged() {
        let residents = catalog();
        let entry = assess(&residents[0], &[]);
        assert!(!entry.needs_attention);
        assert_eq!(entry.average_stability, 0.0);
    }

    #[test]
    fn scatter_has_one_point_per_day() {
        let residents = catalog();
        let mut generator = SeriesGenerator::seeded(2, end_date());
        assert_eq!(stability_vs_usage(&residents, 7, &mut generator).len(), 24 * 7);
    }

    #[test]
    fn latest_is_last_day_of_window() {
        let residents = catalog();
        let mut generator = SeriesGenerator::seeded(2, end_date());
        let snapshot = latest(&residents[0], &mut generator).unwrap();
        assert_eq!(snapshot.day, 30);
        assert_eq!(snapshot.date, end_date());
    }

    #[test]
    fn percentage_change_handles_undefined_ratios() {
        assert_eq!(format_change(percentage_change(5.0, 6.0)), "+20.0");
        assert_eq!(format_change(percentage_change(8.0, 6.0)), "-25.0");
        assert_eq!(format_change(percentage_change(0.0, 6.0)), "N/A");
        assert_eq!(format_change(percentage_change(f64::NAN, 6.0)), "N/A");
    }
}
