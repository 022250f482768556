use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Baseline pink noise adherence category assigned to a resident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UsageLevel {
    Low,
    Medium,
    High,
}

impl UsageLevel {
    pub const ALL: [UsageLevel; 3] = [UsageLevel::Low, UsageLevel::Medium, UsageLevel::High];

    /// Starting usage percentage for the daily random walk.
    pub fn baseline_usage(self) -> f64 {
        match self {
            UsageLevel::High => 80.0,
            UsageLevel::Medium => 50.0,
            UsageLevel::Low => 20.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UsageLevel::Low => "Low",
            UsageLevel::Medium => "Medium",
            UsageLevel::High => "High",
        }
    }
}

impl fmt::Display for UsageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UsageLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "low" => Ok(UsageLevel::Low),
            "medium" | "med" => Ok(UsageLevel::Medium),
            "high" => Ok(UsageLevel::High),
            other => Err(format!("unknown usage level `{other}` (expected low, medium or high)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMetric {
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub trend: Trend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Alert,
    Recommendation,
    Goal,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 3] = [
        NotificationKind::Alert,
        NotificationKind::Recommendation,
        NotificationKind::Goal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Alert => "alert",
            NotificationKind::Recommendation => "recommendation",
            NotificationKind::Goal => "goal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalizedGoal {
    pub current: f64,
    pub target: f64,
    pub achieve_by: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resident {
    pub id: u32,
    pub name: String,
    pub room: String,
    pub stability_score: f64,
    pub pink_noise_usage: UsageLevel,
    pub stability_goal: f64,
    pub notes: Vec<String>,
    pub health_metrics: Vec<HealthMetric>,
    pub notifications: Vec<Notification>,
    pub pink_noise_recommendation: String,
    pub personalized_goal: PersonalizedGoal,
    pub last_assessment: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallSeverity {
    Minor,
    Moderate,
    Severe,
}

impl FallSeverity {
    pub const ALL: [FallSeverity; 3] = [
        FallSeverity::Minor,
        FallSeverity::Moderate,
        FallSeverity::Severe,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FallSeverity::Minor => "minor",
            FallSeverity::Moderate => "moderate",
            FallSeverity::Severe => "severe",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallLocation {
    Bedroom,
    Bathroom,
    LivingRoom,
    Hallway,
}

impl FallLocation {
    pub const ALL: [FallLocation; 4] = [
        FallLocation::Bedroom,
        FallLocation::Bathroom,
        FallLocation::LivingRoom,
        FallLocation::Hallway,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FallLocation::Bedroom => "bedroom",
            FallLocation::Bathroom => "bathroom",
            FallLocation::LivingRoom => "living room",
            FallLocation::Hallway => "hallway",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 4] = [
        TimeOfDay::Morning,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
        TimeOfDay::Night,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }
}

/// Detail fields are only populated when `occurred` is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FallData {
    pub occurred: bool,
    pub severity: Option<FallSeverity>,
    pub location: Option<FallLocation>,
    pub time_of_day: Option<TimeOfDay>,
}

impl FallData {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn occurred(severity: FallSeverity, location: FallLocation, time_of_day: TimeOfDay) -> Self {
        Self {
            occurred: true,
            severity: Some(severity),
            location: Some(location),
            time_of_day: Some(time_of_day),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyData {
    pub day: u32,
    pub date: NaiveDate,
    pub stability: f64,
    pub pink_noise_usage: f64,
    pub fall_data: FallData,
    pub health_metrics: Vec<HealthMetric>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallDetail {
    pub date: NaiveDate,
    pub severity: Option<FallSeverity>,
    pub location: Option<FallLocation>,
    pub time_of_day: Option<TimeOfDay>,
    pub stability: f64,
    pub pink_noise_usage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct OverviewStats {
    pub total_residents: usize,
    pub average_stability: f64,
    pub average_pink_noise_usage: f64,
    pub total_falls: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyAverage {
    pub day: u32,
    pub average_stability: f64,
    pub average_pink_noise_usage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyFalls {
    pub day: u32,
    pub falls: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UsagePoint {
    pub pink_noise_usage: f64,
    pub stability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttentionEntry {
    pub resident_id: u32,
    pub name: String,
    pub room: String,
    pub stability_goal: f64,
    pub average_stability: f64,
    pub average_pink_noise_usage: f64,
    pub fall_incidents: usize,
    pub needs_attention: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Distribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl Distribution {
    pub fn total(&self) -> usize {
        self.low + self.medium + self.high
    }

    pub fn get(&self, level: UsageLevel) -> usize {
        match level {
            UsageLevel::Low => self.low,
            UsageLevel::Medium => self.medium,
            UsageLevel::High => self.high,
        }
    }

    pub(crate) fn bump(&mut self, level: UsageLevel) {
        match level {
            UsageLevel::Low => self.low += 1,
            UsageLevel::Medium => self.medium += 1,
            UsageLevel::High => self.high += 1,
        }
    }
}

/// Band of a baseline stability score: below 5, below 7, or 7 and above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum StabilityTier {
    Low,
    Medium,
    High,
}

impl StabilityTier {
    pub const ALL: [StabilityTier; 3] = [
        StabilityTier::Low,
        StabilityTier::Medium,
        StabilityTier::High,
    ];

    pub fn of(score: f64) -> Self {
        if score < 5.0 {
            StabilityTier::Low
        } else if score < 7.0 {
            StabilityTier::Medium
        } else {
            StabilityTier::High
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StabilityTier::Low => "Low",
            StabilityTier::Medium => "Medium",
            StabilityTier::High => "High",
        }
    }
}

impl fmt::Display for StabilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TierCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl TierCounts {
    pub fn total(&self) -> usize {
        self.low + self.medium + self.high
    }

    pub fn get(&self, tier: StabilityTier) -> usize {
        match tier {
            StabilityTier::Low => self.low,
            StabilityTier::Medium => self.medium,
            StabilityTier::High => self.high,
        }
    }

    pub(crate) fn bump(&mut self, tier: StabilityTier) {
        match tier {
            StabilityTier::Low => self.low += 1,
            StabilityTier::Medium => self.medium += 1,
            StabilityTier::High => self.high += 1,
        }
    }
}
