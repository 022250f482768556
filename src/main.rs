use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::sync::RwLock;

use stability_monitor::config::{self, DayCount};
use stability_monitor::generator::SeriesGenerator;
use stability_monitor::models::{Resident, StabilityTier, UsageLevel};
use stability_monitor::notifications::{
    self, NotificationStore, NotificationTicker, TickerConfig,
};
use stability_monitor::{aggregate, export, registry, report};

#[derive(Parser)]
#[command(name = "stability-monitor")]
#[command(about = "Resident stability and pink noise usage monitor", long_about = None)]
struct Cli {
    /// Days in the window (7 to 90, out-of-range values are clamped)
    #[arg(long, global = true, env = "MONITOR_DAYS", default_value = "30")]
    days: DayCount,
    /// Seed for reproducible synthetic data
    #[arg(long, global = true, env = "MONITOR_SEED", value_parser = config::parse_seed)]
    seed: Option<u64>,
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Population averages and fall total
    Overview {
        /// Also print the per-day averages
        #[arg(long)]
        daily: bool,
    },
    /// Residents needing attention, lowest stability first
    Attention,
    /// Fall incidents per day, or for one resident
    Falls {
        #[arg(long)]
        resident: Option<u32>,
    },
    /// Residents by pink noise category and baseline stability tier
    Distribution,
    /// Search the resident catalog
    Residents {
        /// Name or room number fragment
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        usage: Option<UsageLevel>,
        /// Show only the resident after this id in the filtered list
        #[arg(long, conflicts_with = "before")]
        after: Option<u32>,
        /// Show only the resident before this id in the filtered list
        #[arg(long)]
        before: Option<u32>,
    },
    /// Daily (usage, stability) pairs across all residents
    Scatter,
    /// Daily series for one resident
    Series {
        #[arg(long)]
        resident: u32,
    },
    /// Write a markdown report for the facility or one resident
    Report {
        #[arg(long)]
        resident: Option<u32>,
        /// Note to add to the resident for this report
        #[arg(long = "note")]
        notes: Vec<String>,
        /// Stability goal to use for this report
        #[arg(long)]
        goal: Option<f64>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export one resident's series as CSV
    Export {
        #[arg(long)]
        resident: u32,
        #[arg(long, default_value = "series.csv")]
        out: PathBuf,
    },
    /// Run the notification stream for a number of ticks
    Notifications {
        #[arg(long, default_value_t = 1)]
        ticks: u64,
        #[arg(long, default_value_t = notifications::DEFAULT_INTERVAL.as_secs())]
        interval_secs: u64,
        /// Notification ids to mark as read afterwards
        #[arg(long = "mark-read")]
        mark_read: Vec<String>,
        #[arg(long)]
        clear: bool,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn lookup(residents: &[Resident], id: u32) -> anyhow::Result<&Resident> {
    registry::find(residents, id).with_context(|| format!("no resident with id {id}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::init_tracing("warn");
    let cli = Cli::parse();
    let days = cli.days.get();
    let residents = registry::all_residents()?;
    let mut generator = SeriesGenerator::for_today(cli.seed);

    match cli.command {
        Commands::Overview { daily } => {
            let population = aggregate::population_series(&residents, days, &mut generator);
            let stats = aggregate::overview_of(&residents, &population);
            let averages = if daily {
                aggregate::daily_averages_of(days, &population)
            } else {
                Vec::new()
            };

            if cli.json {
                print_json(&serde_json::json!({ "stats": stats, "daily": averages }))?;
                return Ok(());
            }

            println!("Overview for the last {days} days:");
            println!("- Total residents: {}", stats.total_residents);
            println!("- Average stability: {:.1}", stats.average_stability);
            println!(
                "- Average pink noise usage: {:.1}%",
                stats.average_pink_noise_usage
            );
            println!("- Fall incidents: {}", stats.total_falls);
            for day in averages.iter() {
                println!(
                    "  day {:>2}: stability {:.2}, usage {:.2}%",
                    day.day, day.average_stability, day.average_pink_noise_usage
                );
            }
        }
        Commands::Attention => {
            let ranking = aggregate::attention_ranking(&residents, days, &mut generator);

            if cli.json {
                return print_json(&ranking);
            }
            if ranking.is_empty() {
                println!("No residents need attention in this window.");
                return Ok(());
            }

            println!("Residents needing attention:");
            for entry in ranking.iter() {
                println!(
                    "- {} (room {}) stability {:.1} (goal {:.1}), usage {:.1}%, {} falls",
                    entry.name,
                    entry.room,
                    entry.average_stability,
                    entry.stability_goal,
                    entry.average_pink_noise_usage,
                    entry.fall_incidents
                );
            }
        }
        Commands::Falls { resident } => match resident {
            Some(id) => {
                let resident = lookup(&residents, id)?;
                let series = generator.generate(resident, days);
                let details = aggregate::fall_details(&series);

                if cli.json {
                    return print_json(&details);
                }

                println!(
                    "{} had {} falls in the last {days} days.",
                    resident.name,
                    aggregate::count_falls(&series)
                );
                for fall in details.iter() {
                    println!(
                        "- {}: {} in the {} ({})",
                        fall.date,
                        fall.severity.map_or("unknown", |s| s.as_str()),
                        fall.location.map_or("unknown location", |l| l.as_str()),
                        fall.time_of_day.map_or("unknown time", |t| t.as_str())
                    );
                }
            }
            None => {
                let trend = aggregate::fall_trend(&residents, days, &mut generator);

                if cli.json {
                    return print_json(&trend);
                }

                let total: usize = trend.iter().map(|day| day.falls).sum();
                println!("Fall incidents across all residents: {total}");
                for day in trend.iter() {
                    println!("  day {:>2}: {}", day.day, day.falls);
                }
            }
        },
        Commands::Distribution => {
            let usage = aggregate::distribution(&residents);
            let tiers = aggregate::stability_tiers(&residents);

            if cli.json {
                return print_json(&serde_json::json!({ "usage": usage, "stability": tiers }));
            }

            println!("Pink noise usage:");
            for level in UsageLevel::ALL {
                println!("- {level}: {}", usage.get(level));
            }
            println!("Baseline stability:");
            for tier in StabilityTier::ALL {
                println!("- {tier}: {}", tiers.get(tier));
            }
        }
        Commands::Residents {
            search,
            usage,
            after,
            before,
        } => {
            let mut matches: Vec<&Resident> = registry::filter_by_usage(&residents, usage)
                .into_iter()
                .filter(|resident| {
                    search
                        .as_deref()
                        .map_or(true, |term| registry::matches_term(resident, term))
                })
                .collect();

            let neighbour = match (after, before) {
                (Some(id), _) => Some(registry::next_resident(&matches, id)),
                (None, Some(id)) => Some(registry::previous_resident(&matches, id)),
                (None, None) => None,
            };
            if let Some(neighbour) = neighbour {
                matches = neighbour.into_iter().collect();
            }

            if cli.json {
                return print_json(&matches);
            }
            if matches.is_empty() {
                println!("No residents found.");
                return Ok(());
            }

            for resident in matches.iter() {
                println!(
                    "{:>3}  {:<18} room {:<4} stability {:.1}  usage {}",
                    resident.id,
                    resident.name,
                    resident.room,
                    resident.stability_score,
                    resident.pink_noise_usage
                );
            }
        }
        Commands::Scatter => {
            let points = aggregate::stability_vs_usage(&residents, days, &mut generator);

            if cli.json {
                return print_json(&points);
            }

            println!("usage,stability");
            for point in points.iter() {
                println!("{:.2},{:.2}", point.pink_noise_usage, point.stability);
            }
        }
        Commands::Series { resident } => {
            let resident = lookup(&residents, resident)?;
            let series = generator.generate(resident, days);

            if cli.json {
                return print_json(&series);
            }

            println!("{} (room {})", resident.name, resident.room);
            for day in series.iter() {
                println!(
                    "  {} day {:>2}: stability {:.2}, usage {:.1}%{}",
                    day.date,
                    day.day,
                    day.stability,
                    day.pink_noise_usage,
                    if day.fall_data.occurred { ", fall" } else { "" }
                );
            }
        }
        Commands::Report {
            resident,
            notes,
            goal,
            out,
        } => {
            let today = generator.end();
            let report = match resident {
                Some(id) => {
                    let mut session = registry::ResidentSession::new(lookup(&residents, id)?);
                    for note in notes.iter() {
                        session.add_note(note);
                    }
                    if let Some(goal) = goal {
                        session.update_stability_goal(goal);
                    }

                    let series = generator.generate(session.resident(), days);
                    let latest = aggregate::latest(session.resident(), &mut generator);
                    report::build_resident_report(
                        session.resident(),
                        &series,
                        latest.as_ref(),
                        today,
                    )
                }
                None => {
                    let population = aggregate::population_series(&residents, days, &mut generator);
                    let attention = aggregate::attention_of(&residents, &population);
                    let fall_trend = aggregate::fall_trend_of(days, &population);
                    report::build_overview_report(&report::OverviewReport {
                        days,
                        window_end: today,
                        stats: aggregate::overview_of(&residents, &population),
                        usage_distribution: aggregate::distribution(&residents),
                        stability_tiers: aggregate::stability_tiers(&residents),
                        attention: &attention,
                        fall_trend: &fall_trend,
                    })
                }
            };
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { resident, out } => {
            let resident = lookup(&residents, resident)?;
            let series = generator.generate(resident, days);
            let rows = export::write_series_csv_path(&out, resident, &series)?;
            println!("Wrote {rows} days for {} to {}.", resident.name, out.display());
        }
        Commands::Notifications {
            ticks,
            interval_secs,
            mark_read,
            clear,
            limit,
        } => {
            let store = Arc::new(RwLock::new(NotificationStore::from_residents(&residents)));
            let ticker = NotificationTicker::spawn(
                Arc::clone(&store),
                residents.clone(),
                TickerConfig {
                    period: Duration::from_secs(interval_secs.max(1)),
                    max_ticks: Some(ticks),
                    seed: cli.seed,
                },
            );
            ticker.join().await?;

            let mut store = store.write().await;
            for id in mark_read.iter() {
                if !store.mark_read(id) {
                    tracing::warn!(id = id.as_str(), "notification not found or already read");
                }
            }
            if clear {
                store.clear();
            }

            if cli.json {
                return print_json(store.recent(limit));
            }

            println!("{} notifications, {} unread", store.len(), store.unread_count());
            if store.is_empty() {
                println!("No notifications.");
            }
            for notification in store.recent(limit) {
                println!(
                    "- [{}] {} {} ({}){}",
                    notification.id,
                    notification.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    notification.message,
                    notification.priority.as_str(),
                    if notification.read { "" } else { " *" }
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_flag_parses_through_day_count() {
        let cli = Cli::try_parse_from(["stability-monitor", "--days", "14", "attention"]).unwrap();
        assert_eq!(cli.days.get(), 14);

        let cli = Cli::try_parse_from(["stability-monitor", "attention", "--days", "365"]).unwrap();
        assert_eq!(cli.days.get(), DayCount::MAX);

        assert!(Cli::try_parse_from(["stability-monitor", "--days", "soon", "attention"]).is_err());
    }

    #[test]
    fn days_flag_defaults_to_thirty() {
        let cli = Cli::try_parse_from(["stability-monitor", "distribution"]).unwrap();
        assert_eq!(cli.days, DayCount::default());
    }
}
