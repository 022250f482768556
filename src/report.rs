use std::fmt::Write;

use chrono::NaiveDate;

use crate::aggregate::{self, format_change, percentage_change};
use crate::models::{
    AttentionEntry, DailyData, DailyFalls, Distribution, OverviewStats, Resident, StabilityTier,
    TierCounts, UsageLevel,
};

/// Inputs of the overview report. Build `stats`, `attention` and `fall_trend`
/// from one [`aggregate::population_series`] so their fall counts agree.
pub struct OverviewReport<'a> {
    pub days: i64,
    pub window_end: NaiveDate,
    pub stats: OverviewStats,
    pub usage_distribution: Distribution,
    pub stability_tiers: TierCounts,
    pub attention: &'a [AttentionEntry],
    pub fall_trend: &'a [DailyFalls],
}

/// Advice text derived from the resident's personalized goal.
pub fn personalized_recommendation(resident: &Resident, today: NaiveDate) -> String {
    let goal = &resident.personalized_goal;
    let stability_diff = goal.target - goal.current;
    let days_until_goal = (goal.achieve_by - today).num_days();

    if stability_diff > 0.0 {
        // Plain ceiling: 8.5 - 7.8 lands just above 0.7, which asks for 15%.
        let increase = (stability_diff * 20.0).ceil();
        format!(
            "Increase pink noise usage by {increase}% to achieve your stability goal of {} by {}. You have {days_until_goal} days left.",
            goal.target, goal.achieve_by
        )
    } else {
        format!(
            "Maintain your current pink noise usage to sustain your excellent stability score. Your next assessment is due in {days_until_goal} days."
        )
    }
}

pub fn build_overview_report(report: &OverviewReport<'_>) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Resident Stability Overview");
    let _ = writeln!(
        output,
        "Window of {} days ending {}",
        report.days, report.window_end
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");

    if report.stats.total_residents == 0 {
        let _ = writeln!(output, "No resident data for this window.");
    } else {
        let _ = writeln!(output, "- Total residents: {}", report.stats.total_residents);
        let _ = writeln!(
            output,
            "- Average stability: {:.1}",
            report.stats.average_stability
        );
        let _ = writeln!(
            output,
            "- Average pink noise usage: {:.1}%",
            report.stats.average_pink_noise_usage
        );
        let _ = writeln!(output, "- Fall incidents: {}", report.stats.total_falls);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Pink Noise Usage Distribution");
    for level in UsageLevel::ALL {
        let _ = writeln!(
            output,
            "- {}: {} residents",
            level,
            report.usage_distribution.get(level)
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Baseline Stability Tiers");
    for tier in StabilityTier::ALL {
        let _ = writeln!(
            output,
            "- {}: {} residents",
            tier,
            report.stability_tiers.get(tier)
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Residents Needing Attention");

    if report.attention.is_empty() {
        let _ = writeln!(output, "No residents flagged in this window.");
    } else {
        for entry in report.attention.iter() {
            let _ = writeln!(
                output,
                "- {} (room {}) stability {:.1} vs goal {:.1}, usage {:.1}%, {} falls",
                entry.name,
                entry.room,
                entry.average_stability,
                entry.stability_goal,
                entry.average_pink_noise_usage,
                entry.fall_incidents
            );
        }
    }

    let busiest = report
        .fall_trend
        .iter()
        .filter(|day| day.falls > 0)
        .max_by_key(|day| day.falls);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Fall Trend");

    match busiest {
        Some(day) => {
            let days_with_falls = report.fall_trend.iter().filter(|d| d.falls > 0).count();
            let _ = writeln!(
                output,
                "Falls recorded on {} of {} days; most on day {} ({} falls).",
                days_with_falls,
                report.fall_trend.len(),
                day.day,
                day.falls
            );
        }
        None => {
            let _ = writeln!(output, "No falls recorded for this window.");
        }
    }

    output
}

/// Markdown detail view for one resident.
///
/// `series` is the displayed window and `latest` an independent snapshot used
/// for the current values, matching the dashboard's profile card.
pub fn build_resident_report(
    resident: &Resident,
    series: &[DailyData],
    latest: Option<&DailyData>,
    today: NaiveDate,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# {} - Room {}", resident.name, resident.room);
    let _ = writeln!(
        output,
        "Baseline stability {:.1}, pink noise usage {}, last assessed {}",
        resident.stability_score, resident.pink_noise_usage, resident.last_assessment
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Current Status");

    match latest {
        Some(latest) => {
            let stability_change =
                format_change(percentage_change(resident.stability_score, latest.stability));
            let usage_change = format_change(
                series
                    .first()
                    .and_then(|day| percentage_change(day.pink_noise_usage, latest.pink_noise_usage)),
            );
            let _ = writeln!(
                output,
                "- Stability score: {:.1} ({}%)",
                latest.stability, stability_change
            );
            let _ = writeln!(
                output,
                "- Pink noise usage: {:.1}% ({}%)",
                latest.pink_noise_usage, usage_change
            );
        }
        None => {
            let _ = writeln!(output, "No recent data available.");
        }
    }
    let _ = writeln!(output, "- Stability goal: {:.1}", resident.stability_goal);
    let _ = writeln!(
        output,
        "- Personalized goal: {:.1} -> {:.1} by {}",
        resident.personalized_goal.current,
        resident.personalized_goal.target,
        resident.personalized_goal.achieve_by
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Health Metrics");
    for metric in resident.health_metrics.iter() {
        let _ = writeln!(
            output,
            "- {}: {} {} ({:?})",
            metric.name, metric.value, metric.unit, metric.trend
        );
    }

    let entry = aggregate::assess(resident, series);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Window ({} days)", series.len());
    let _ = writeln!(
        output,
        "- Average stability {:.2}, average usage {:.1}%",
        entry.average_stability, entry.average_pink_noise_usage
    );
    let _ = writeln!(
        output,
        "- Needs attention: {}",
        if entry.needs_attention { "yes" } else { "no" }
    );

    let falls = aggregate::fall_details(series);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Fall Incidents");

    if falls.is_empty() {
        let _ = writeln!(output, "No falls recorded for this window.");
    } else {
        for fall in falls.iter() {
            let _ = writeln!(
                output,
                "- {}: {} fall in the {} during the {} (stability {:.1}, usage {:.1}%)",
                fall.date,
                fall.severity.map_or("unknown", |s| s.as_str()),
                fall.location.map_or("unknown location", |l| l.as_str()),
                fall.time_of_day.map_or("day", |t| t.as_str()),
                fall.stability,
                fall.pink_noise_usage
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Notes");

    if resident.notes.is_empty() {
        let _ = writeln!(output, "No notes recorded.");
    } else {
        for note in resident.notes.iter() {
            let _ = writeln!(output, "- {}", note);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recommendation");
    let _ = writeln!(output, "{}", resident.pink_noise_recommendation);
    let _ = writeln!(output, "{}", personalized_recommendation(resident, today));

    output
}
