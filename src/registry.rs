use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{
    HealthMetric, Notification, NotificationKind, PersonalizedGoal, Priority, Resident, Trend,
    UsageLevel,
};

struct SeedRow {
    id: u32,
    name: &'static str,
    room: &'static str,
    stability_score: f64,
    usage: UsageLevel,
    stability_goal: f64,
    notes: [&'static str; 2],
    blood_pressure: f64,
    heart_rate: f64,
    sleep_hours: f64,
    recommendation: &'static str,
    goal_current: f64,
    goal_target: f64,
}

const GOAL_DEADLINE: (i32, u32, u32) = (2023, 8, 15);
const LAST_ASSESSMENT: (i32, u32, u32) = (2023, 5, 1);

const SEED: [SeedRow; 24] = [
    SeedRow {
        id: 1,
        name: "Alice Johnson",
        room: "201",
        stability_score: 5.8,
        usage: UsageLevel::Medium,
        stability_goal: 6.5,
        notes: [
            "Showing good progress with pink noise usage",
            "Reported feeling more stable during morning walks",
        ],
        blood_pressure: 120.0,
        heart_rate: 72.0,
        sleep_hours: 8.0,
        recommendation: "Increase usage during afternoon naps to improve overall stability",
        goal_current: 7.8,
        goal_target: 8.5,
    },
    SeedRow {
        id: 2,
        name: "Bob Smith",
        room: "105",
        stability_score: 4.5,
        usage: UsageLevel::Low,
        stability_goal: 5.5,
        notes: [
            "Needs encouragement to increase pink noise usage",
            "Prefers lower volume settings",
        ],
        blood_pressure: 130.0,
        heart_rate: 68.0,
        sleep_hours: 6.0,
        recommendation: "Try using pink noise for 30 minutes before bedtime to improve sleep quality",
        goal_current: 6.5,
        goal_target: 7.0,
    },
    SeedRow {
        id: 3,
        name: "Carol Davis",
        room: "312",
        stability_score: 7.2,
        usage: UsageLevel::High,
        stability_goal: 7.5,
        notes: [
            "Consistently using pink noise",
            "Reports improved balance during daily activities",
        ],
        blood_pressure: 118.0,
        heart_rate: 70.0,
        sleep_hours: 7.5,
        recommendation: "Maintain current usage pattern and monitor for any changes",
        goal_current: 8.2,
        goal_target: 8.5,
    },
    SeedRow {
        id: 4,
        name: "David Brown",
        room: "118",
        stability_score: 3.9,
        usage: UsageLevel::Low,
        stability_goal: 5.0,
        notes: ["Reluctant to use pink noise", "Experiencing frequent dizzy spells"],
        blood_pressure: 140.0,
        heart_rate: 75.0,
        sleep_hours: 5.0,
        recommendation: "Gradually introduce pink noise during rest periods to improve acceptance",
        goal_current: 5.9,
        goal_target: 7.0,
    },
    SeedRow {
        id: 5,
        name: "Emma Wilson",
        room: "203",
        stability_score: 7.1,
        usage: UsageLevel::Medium,
        stability_goal: 7.5,
        notes: [
            "Showing interest in increasing pink noise usage",
            "Reported improved sleep quality",
        ],
        blood_pressure: 125.0,
        heart_rate: 68.0,
        sleep_hours: 7.0,
        recommendation: "Consider increasing pink noise usage duration to reach stability goal",
        goal_current: 7.1,
        goal_target: 7.5,
    },
    SeedRow {
        id: 6,
        name: "Frank Thomas",
        room: "115",
        stability_score: 6.8,
        usage: UsageLevel::Medium,
        stability_goal: 7.5,
        notes: [
            "Responds well to pink noise during the day",
            "Needs reminders for evening usage",
        ],
        blood_pressure: 128.0,
        heart_rate: 70.0,
        sleep_hours: 6.5,
        recommendation: "Increase evening pink noise usage to improve overall stability",
        goal_current: 6.8,
        goal_target: 7.5,
    },
    SeedRow {
        id: 7,
        name: "Grace Lee",
        room: "220",
        stability_score: 7.5,
        usage: UsageLevel::High,
        stability_goal: 8.0,
        notes: [
            "Enthusiastic about pink noise therapy",
            "Reports improved focus during daily activities",
        ],
        blood_pressure: 122.0,
        heart_rate: 65.0,
        sleep_hours: 7.8,
        recommendation: "Continue current usage pattern and consider slight increase to reach goal",
        goal_current: 7.5,
        goal_target: 8.0,
    },
    SeedRow {
        id: 8,
        name: "Henry Garcia",
        room: "308",
        stability_score: 6.2,
        usage: UsageLevel::Low,
        stability_goal: 7.0,
        notes: [
            "Skeptical about pink noise benefits",
            "Prefers alternative relaxation methods",
        ],
        blood_pressure: 135.0,
        heart_rate: 72.0,
        sleep_hours: 5.5,
        recommendation:
            "Introduce pink noise gradually, starting with short sessions during preferred activities",
        goal_current: 6.2,
        goal_target: 7.0,
    },
    SeedRow {
        id: 9,
        name: "Isabel Martinez",
        room: "112",
        stability_score: 7.9,
        usage: UsageLevel::High,
        stability_goal: 8.5,
        notes: [
            "Consistent pink noise user",
            "Reports significant improvement in balance",
        ],
        blood_pressure: 118.0,
        heart_rate: 68.0,
        sleep_hours: 8.0,
        recommendation: "Maintain current usage and monitor for any changes in effectiveness",
        goal_current: 7.9,
        goal_target: 8.5,
    },
    SeedRow {
        id: 10,
        name: "Jack Wilson",
        room: "205",
        stability_score: 6.7,
        usage: UsageLevel::Medium,
        stability_goal: 7.5,
        notes: [
            "Interested in pink noise therapy",
            "Needs assistance with device operation",
        ],
        blood_pressure: 130.0,
        heart_rate: 70.0,
        sleep_hours: 6.8,
        recommendation:
            "Provide additional support for device usage and encourage consistent application",
        goal_current: 6.7,
        goal_target: 7.5,
    },
    SeedRow {
        id: 11,
        name: "Karen Brown",
        room: "317",
        stability_score: 7.3,
        usage: UsageLevel::Medium,
        stability_goal: 8.0,
        notes: [
            "Enjoys pink noise during reading time",
            "Requests more information on benefits",
        ],
        blood_pressure: 125.0,
        heart_rate: 69.0,
        sleep_hours: 7.2,
        recommendation: "Increase usage during other daily activities to maximize benefits",
        goal_current: 7.3,
        goal_target: 8.0,
    },
    SeedRow {
        id: 12,
        name: "Liam Johnson",
        room: "110",
        stability_score: 6.0,
        usage: UsageLevel::Low,
        stability_goal: 7.0,
        notes: [
            "New to pink noise therapy",
            "Expresses interest but needs guidance",
        ],
        blood_pressure: 132.0,
        heart_rate: 74.0,
        sleep_hours: 5.8,
        recommendation: "Start with short, regular sessions and gradually increase duration",
        goal_current: 6.0,
        goal_target: 7.0,
    },
    SeedRow {
        id: 13,
        name: "Mia Taylor",
        room: "222",
        stability_score: 8.0,
        usage: UsageLevel::High,
        stability_goal: 8.5,
        notes: [
            "Advocates for pink noise among other residents",
            "Reports improved cognitive function",
        ],
        blood_pressure: 120.0,
        heart_rate: 66.0,
        sleep_hours: 8.2,
        recommendation:
            "Continue current regimen and consider participating in peer support activities",
        goal_current: 8.0,
        goal_target: 8.5,
    },
    SeedRow {
        id: 14,
        name: "Noah Anderson",
        room: "305",
        stability_score: 7.2,
        usage: UsageLevel::Medium,
        stability_goal: 7.8,
        notes: [
            "Uses pink noise primarily for sleep",
            "Interested in daytime applications",
        ],
        blood_pressure: 128.0,
        heart_rate: 71.0,
        sleep_hours: 7.5,
        recommendation:
            "Introduce pink noise during daytime rest periods to enhance overall stability",
        goal_current: 7.2,
        goal_target: 7.8,
    },
    SeedRow {
        id: 15,
        name: "Olivia White",
        room: "119",
        stability_score: 6.9,
        usage: UsageLevel::Medium,
        stability_goal: 7.5,
        notes: [
            "Combines pink noise with other relaxation techniques",
            "Reports mixed results",
        ],
        blood_pressure: 126.0,
        heart_rate: 69.0,
        sleep_hours: 7.0,
        recommendation:
            "Adjust pink noise usage to complement other techniques for optimal results",
        goal_current: 6.9,
        goal_target: 7.5,
    },
    SeedRow {
        id: 16,
        name: "Peter Harris",
        room: "210",
        stability_score: 7.7,
        usage: UsageLevel::High,
        stability_goal: 8.2,
        notes: [
            "Consistent user of pink noise",
            "Interested in latest research findings",
        ],
        blood_pressure: 122.0,
        heart_rate: 67.0,
        sleep_hours: 7.8,
        recommendation:
            "Maintain current usage and provide updates on new research developments",
        goal_current: 7.7,
        goal_target: 8.2,
    },
    SeedRow {
        id: 17,
        name: "Quinn Foster",
        room: "320",
        stability_score: 6.3,
        usage: UsageLevel::Low,
        stability_goal: 7.0,
        notes: [
            "Prefers nature sounds over pink noise",
            "Willing to try new approaches",
        ],
        blood_pressure: 130.0,
        heart_rate: 73.0,
        sleep_hours: 6.0,
        recommendation:
            "Explore combining pink noise with nature sounds to increase acceptance and usage",
        goal_current: 6.3,
        goal_target: 7.0,
    },
    SeedRow {
        id: 18,
        name: "Rachel Green",
        room: "108",
        stability_score: 7.4,
        usage: UsageLevel::Medium,
        stability_goal: 8.0,
        notes: [
            "Uses pink noise during physical therapy sessions",
            "Reports improved focus",
        ],
        blood_pressure: 124.0,
        heart_rate: 70.0,
        sleep_hours: 7.3,
        recommendation:
            "Increase usage during other daily activities to enhance overall stability",
        goal_current: 7.4,
        goal_target: 8.0,
    },
    SeedRow {
        id: 19,
        name: "Samuel Clark",
        room: "225",
        stability_score: 6.6,
        usage: UsageLevel::Medium,
        stability_goal: 7.2,
        notes: [
            "Recently started using pink noise",
            "Reports some improvement in sleep quality",
        ],
        blood_pressure: 128.0,
        heart_rate: 72.0,
        sleep_hours: 6.5,
        recommendation: "Gradually increase usage duration to maximize benefits",
        goal_current: 6.6,
        goal_target: 7.2,
    },
    SeedRow {
        id: 20,
        name: "Tina Rodriguez",
        room: "314",
        stability_score: 7.6,
        usage: UsageLevel::High,
        stability_goal: 8.0,
        notes: [
            "Enthusiastic about pink noise therapy",
            "Uses it throughout the day",
        ],
        blood_pressure: 120.0,
        heart_rate: 68.0,
        sleep_hours: 7.7,
        recommendation:
            "Continue current usage pattern and monitor for any plateau in benefits",
        goal_current: 7.6,
        goal_target: 8.0,
    },
    SeedRow {
        id: 21,
        name: "Ulysses King",
        room: "106",
        stability_score: 6.1,
        usage: UsageLevel::Low,
        stability_goal: 7.0,
        notes: [
            "Skeptical about pink noise benefits",
            "Prefers classical music",
        ],
        blood_pressure: 134.0,
        heart_rate: 74.0,
        sleep_hours: 5.5,
        recommendation: "Introduce pink noise gradually, possibly mixed with classical music",
        goal_current: 6.1,
        goal_target: 7.0,
    },
    SeedRow {
        id: 22,
        name: "Violet Chang",
        room: "218",
        stability_score: 7.8,
        usage: UsageLevel::High,
        stability_goal: 8.3,
        notes: ["Uses pink noise during meditation", "Reports improved balance"],
        blood_pressure: 118.0,
        heart_rate: 65.0,
        sleep_hours: 8.0,
        recommendation:
            "Maintain current usage and consider incorporating into other daily activities",
        goal_current: 7.8,
        goal_target: 8.3,
    },
    SeedRow {
        id: 23,
        name: "William Turner",
        room: "302",
        stability_score: 6.7,
        usage: UsageLevel::Medium,
        stability_goal: 7.3,
        notes: [
            "Uses pink noise intermittently",
            "Interested in learning more about optimal usage",
        ],
        blood_pressure: 126.0,
        heart_rate: 71.0,
        sleep_hours: 6.8,
        recommendation:
            "Establish a more consistent usage pattern and provide education on benefits",
        goal_current: 6.7,
        goal_target: 7.3,
    },
    SeedRow {
        id: 24,
        name: "Xena Lawson",
        room: "114",
        stability_score: 7.0,
        usage: UsageLevel::Medium,
        stability_goal: 7.6,
        notes: [
            "Recently increased pink noise usage",
            "Reports feeling more energetic",
        ],
        blood_pressure: 124.0,
        heart_rate: 69.0,
        sleep_hours: 7.2,
        recommendation:
            "Continue increasing usage gradually and monitor improvements in stability",
        goal_current: 7.0,
        goal_target: 7.6,
    },
];

// (resident id, notification id, kind, message, timestamp, read, priority)
const SEED_NOTIFICATIONS: [(u32, &str, NotificationKind, &str, &str, bool, Priority); 3] = [
    (
        1,
        "1",
        NotificationKind::Recommendation,
        "Consider increasing pink noise usage during afternoon naps",
        "2023-05-15T14:30:00Z",
        false,
        Priority::Medium,
    ),
    (
        2,
        "2",
        NotificationKind::Alert,
        "Stability score dropped below goal",
        "2023-05-14T09:15:00Z",
        true,
        Priority::High,
    ),
    (
        4,
        "3",
        NotificationKind::Alert,
        "Low pink noise usage detected",
        "2023-05-16T10:00:00Z",
        false,
        Priority::High,
    ),
];

fn seed_date((year, month, day): (i32, u32, u32)) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).context("invalid date")
}

fn seed_metrics(row: &SeedRow) -> Vec<HealthMetric> {
    // Alice is the only resident with tracked metric trends in the catalog.
    let (heart_trend, sleep_trend) = if row.id == 1 {
        (Trend::Decreasing, Trend::Increasing)
    } else {
        (Trend::Stable, Trend::Stable)
    };

    vec![
        HealthMetric {
            name: "Blood Pressure".to_string(),
            value: row.blood_pressure,
            unit: "mmHg".to_string(),
            trend: Trend::Stable,
        },
        HealthMetric {
            name: "Heart Rate".to_string(),
            value: row.heart_rate,
            unit: "bpm".to_string(),
            trend: heart_trend,
        },
        HealthMetric {
            name: "Sleep Quality".to_string(),
            value: row.sleep_hours,
            unit: "hours".to_string(),
            trend: sleep_trend,
        },
    ]
}

fn seed_notifications(resident_id: u32) -> anyhow::Result<Vec<Notification>> {
    let mut notifications = Vec::new();

    for (owner, id, kind, message, timestamp, read, priority) in SEED_NOTIFICATIONS {
        if owner != resident_id {
            continue;
        }

        let timestamp: DateTime<Utc> = timestamp
            .parse()
            .with_context(|| format!("invalid seed timestamp {timestamp}"))?;
        notifications.push(Notification {
            id: id.to_string(),
            kind,
            message: message.to_string(),
            timestamp,
            read,
            priority,
        });
    }

    Ok(notifications)
}

/// Builds the compiled-in resident catalog.
pub fn all_residents() -> anyhow::Result<Vec<Resident>> {
    let achieve_by = seed_date(GOAL_DEADLINE)?;
    let last_assessment = seed_date(LAST_ASSESSMENT)?;
    let mut residents = Vec::with_capacity(SEED.len());

    for row in SEED.iter() {
        residents.push(Resident {
            id: row.id,
            name: row.name.to_string(),
            room: row.room.to_string(),
            stability_score: row.stability_score,
            pink_noise_usage: row.usage,
            stability_goal: row.stability_goal,
            notes: row.notes.iter().map(|note| note.to_string()).collect(),
            health_metrics: seed_metrics(row),
            notifications: seed_notifications(row.id)?,
            pink_noise_recommendation: row.recommendation.to_string(),
            personalized_goal: PersonalizedGoal {
                current: row.goal_current,
                target: row.goal_target,
                achieve_by,
            },
            last_assessment,
        });
    }

    Ok(residents)
}

pub fn find(residents: &[Resident], id: u32) -> Option<&Resident> {
    residents.iter().find(|resident| resident.id == id)
}

/// Case-insensitive match on name, or a substring match on room number.
pub fn matches_term(resident: &Resident, term: &str) -> bool {
    let needle = term.trim().to_lowercase();
    resident.name.to_lowercase().contains(&needle) || resident.room.contains(&needle)
}

pub fn search<'a>(residents: &'a [Resident], term: &str) -> Vec<&'a Resident> {
    residents
        .iter()
        .filter(|resident| matches_term(resident, term))
        .collect()
}

/// `None` keeps every resident.
pub fn filter_by_usage(residents: &[Resident], level: Option<UsageLevel>) -> Vec<&Resident> {
    residents
        .iter()
        .filter(|resident| level.map_or(true, |level| resident.pink_noise_usage == level))
        .collect()
}

/// Next resident after `current_id`, wrapping to the start. A resident missing
/// from the list counts as sitting before its first entry.
pub fn next_resident<'a>(list: &[&'a Resident], current_id: u32) -> Option<&'a Resident> {
    if list.is_empty() {
        return None;
    }
    let next = match list.iter().position(|resident| resident.id == current_id) {
        Some(index) => (index + 1) % list.len(),
        None => 0,
    };
    Some(list[next])
}

/// Previous resident before `current_id`, wrapping to the end.
pub fn previous_resident<'a>(list: &[&'a Resident], current_id: u32) -> Option<&'a Resident> {
    if list.is_empty() {
        return None;
    }
    let previous = match list.iter().position(|resident| resident.id == current_id) {
        Some(index) => (index + list.len() - 1) % list.len(),
        None => list.len() - 1,
    };
    Some(list[previous])
}

/// Editable copy of a resident for one session. Changes never reach the catalog.
#[derive(Debug, Clone)]
pub struct ResidentSession {
    resident: Resident,
}

impl ResidentSession {
    pub fn new(resident: &Resident) -> Self {
        Self {
            resident: resident.clone(),
        }
    }

    pub fn resident(&self) -> &Resident {
        &self.resident
    }

    /// Returns false when the note is blank after trimming.
    pub fn add_note(&mut self, note: &str) -> bool {
        let note = note.trim();
        if note.is_empty() {
            return false;
        }
        self.resident.notes.push(note.to_string());
        true
    }

    /// Returns false when the goal is unchanged or not a finite number.
    pub fn update_stability_goal(&mut self, goal: f64) -> bool {
        if !goal.is_finite() || goal == self.resident.stability_goal {
            return false;
        }
        tracing::debug!(
            resident_id = self.resident.id,
            previous = self.resident.stability_goal,
            goal,
            "stability goal updated"
        );
        self.resident.stability_goal = goal;
        true
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn catalog() -> Vec<Resident> {
        all_residents().unwrap()
    }

    #[test]
    fn catalog_has_twenty_four_unique_residents() {
        let residents = catalog();
        assert_eq!(residents.len(), 24);

        let ids: HashSet<u32> = residents.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 24);
        assert!(residents
            .iter()
            .all(|r| (0.0..=10.0).contains(&r.stability_score)));
    }

    #[test]
    fn seed_notifications_attach_to_owners() {
        let residents = catalog();
        let bob = find(&residents, 2).unwrap();
        assert_eq!(bob.notifications.len(), 1);
        assert!(bob.notifications[0].read);
        assert_eq!(bob.notifications[0].priority, Priority::High);

        let total: usize = residents.iter().map(|r| r.notifications.len()).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn search_matches_name_case_insensitively_or_room() {
        let residents = catalog();

        let by_name: Vec<u32> = search(&residents, "JOHNSON").iter().map(|r| r.id).collect();
        assert_eq!(by_name, vec![1, 12]);

        let by_room: Vec<u32> = search(&residents, "312").iter().map(|r| r.id).collect();
        assert_eq!(by_room, vec![3]);

        assert_eq!(search(&residents, "").len(), 24);
        assert!(search(&residents, "nobody").is_empty());
    }

    #[test]
    fn filter_by_usage_keeps_matching_category() {
        let residents = catalog();
        let low = filter_by_usage(&residents, Some(UsageLevel::Low));
        assert_eq!(low.len(), 6);
        assert!(low.iter().all(|r| r.pink_noise_usage == UsageLevel::Low));
        assert_eq!(filter_by_usage(&residents, None).len(), 24);
    }

    #[test]
    fn navigation_wraps_around() {
        let residents = catalog();
        let high = filter_by_usage(&residents, Some(UsageLevel::High));
        let first = high[0].id;
        let last = high[high.len() - 1].id;

        assert_eq!(next_resident(&high, last).unwrap().id, first);
        assert_eq!(previous_resident(&high, first).unwrap().id, last);
        assert_eq!(next_resident(&high, 999).unwrap().id, first);
        assert!(next_resident(&[], 1).is_none());
    }

    #[test]
    fn session_edits_stay_local() {
        let residents = catalog();
        let alice = find(&residents, 1).unwrap();
        let mut session = ResidentSession::new(alice);

        assert!(!session.add_note("   "));
        assert!(session.add_note("  Walked unassisted today "));
        assert_eq!(session.resident().notes.last().unwrap(), "Walked unassisted today");

        assert!(!session.update_stability_goal(6.5));
        assert!(session.update_stability_goal(7.0));
        assert_eq!(session.resident().stability_goal, 7.0);

        assert_eq!(alice.notes.len(), 2);
        assert_eq!(alice.stability_goal, 6.5);
    }
}
