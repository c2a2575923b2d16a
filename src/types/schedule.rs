use crate::error::PlannerError;
use crate::types::cost::Money;
use crate::types::destination::{Coordinates, Destination};
use chrono::NaiveDate;
use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, Schema, SchemaObject, StringValidation};
use schemars::JsonSchema;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Wall-clock time of day, stored as minutes since midnight and exchanged as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ClockTime(u16);

impl ClockTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour < 24 && minute < 60).then(|| Self((hour * 60 + minute) as u16))
    }

    /// Compile-time constructor; out-of-range parts wrap.
    pub const fn from_hm(hour: u32, minute: u32) -> Self {
        Self((((hour % 24) * 60) + minute % 60) as u16)
    }

    /// Wraps modulo 24 hours.
    pub fn from_minutes(minutes: u32) -> Self {
        Self((minutes % MINUTES_PER_DAY) as u16)
    }

    pub fn hour(self) -> u32 {
        u32::from(self.0) / 60
    }

    pub fn minute(self) -> u32 {
        u32::from(self.0) % 60
    }

    pub fn minutes(self) -> u32 {
        u32::from(self.0)
    }

    pub fn add_minutes(self, minutes: u32) -> Self {
        Self::from_minutes(self.minutes() + minutes % MINUTES_PER_DAY)
    }

    pub fn sub_minutes(self, minutes: u32) -> Self {
        let minutes = minutes % MINUTES_PER_DAY;
        Self::from_minutes(self.minutes() + MINUTES_PER_DAY - minutes)
    }

    /// Signed minutes from `self` to `later` on the same day.
    pub fn minutes_until(self, later: ClockTime) -> i64 {
        i64::from(later.minutes()) - i64::from(self.minutes())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PlannerError::Validation(format!("invalid clock time `{}`", s));
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour: u32 = hour.parse().map_err(|_| invalid())?;
        let minute: u32 = minute.parse().map_err(|_| invalid())?;
        ClockTime::new(hour, minute).ok_or_else(invalid)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

impl JsonSchema for ClockTime {
    fn schema_name() -> String {
        "ClockTime".to_string()
    }

    fn json_schema(_: &mut SchemaGenerator) -> Schema {
        SchemaObject {
            instance_type: Some(InstanceType::String.into()),
            string: Some(Box::new(StringValidation {
                pattern: Some("^([01][0-9]|2[0-3]):[0-5][0-9]$".to_string()),
                ..Default::default()
            })),
            ..Default::default()
        }
        .into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Transport,
    Meal,
    Sightseeing,
    Work,
    FreeTime,
    Accommodation,
}

/// One time-blocked entry of a day's schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub time: ClockTime,
    pub activity: String,
    pub kind: ItemKind,
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Destination>,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub is_work_time: bool,
}

impl ScheduleItem {
    pub fn new(time: ClockTime, kind: ItemKind, activity: impl Into<String>, duration_minutes: u32) -> Self {
        Self {
            time,
            activity: activity.into(),
            kind,
            duration_minutes,
            destination: None,
            notes: Vec::new(),
            is_work_time: false,
        }
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = Some(destination);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn end_time(&self) -> ClockTime {
        self.time.add_minutes(self.duration_minutes)
    }

    pub fn destination_id(&self) -> Option<&str> {
        self.destination.as_ref().map(|d| d.id.as_str())
    }

    /// One-line description for logs and rendered output.
    pub fn describe(&self) -> String {
        let icon = match self.kind {
            ItemKind::Transport => "🚗",
            ItemKind::Meal => "🍽️",
            ItemKind::Sightseeing => "📍",
            ItemKind::Work => "💼",
            ItemKind::FreeTime => "🌙",
            ItemKind::Accommodation => "🏨",
        };
        format!("{} {} {} ({} min)", self.time, icon, self.activity, self.duration_minutes)
    }
}

/// The reserved work block of a working day. Never scheduled over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkingBlock {
    pub location_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    pub start: ClockTime,
    pub end: ClockTime,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Weather attached to a day at generation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    #[serde(default)]
    pub temperature_c: Option<f64>,
    pub condition: String,
    #[serde(default)]
    pub precipitation_mm: f64,
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// True when no provider data was available
    #[serde(default)]
    pub is_fallback: bool,
}

impl WeatherSnapshot {
    pub fn fallback() -> Self {
        Self {
            temperature_c: None,
            condition: "Không có dữ liệu thời tiết".to_string(),
            precipitation_mm: 0.0,
            recommendations: vec!["Kiểm tra dự báo thời tiết trước khi đi".to_string()],
            is_fallback: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub total_distance_km: f64,
    pub travel_minutes: u32,
    /// Distinct time-of-day categories as a percentage of all five
    pub diversity_score: u32,
}

/// Per-person cost estimate for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayCost {
    pub sightseeing: Money,
    pub food: Money,
    pub local_transport: Money,
    pub total: Money,
}

/// One day's resolved schedule, destinations and cost estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    /// 1-based day counter
    pub day: u32,
    pub date: NaiveDate,
    pub theme: String,
    pub is_working_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_block: Option<WorkingBlock>,
    /// Destinations in visiting order
    pub destinations: Vec<Destination>,
    /// Time-sorted schedule
    pub schedule: Vec<ScheduleItem>,
    pub estimated_cost: DayCost,
    pub weather: WeatherSnapshot,
    pub route: RouteSummary,
    #[serde(default)]
    pub notes: Vec<String>,
    /// Set when the day could not be enriched and holds the minimal plan
    #[serde(default)]
    pub is_fallback: bool,
}

impl DayPlan {
    pub fn sort_schedule(&mut self) {
        self.schedule.sort_by_key(|item| item.time);
    }

    pub fn is_time_sorted(&self) -> bool {
        self.schedule.windows(2).all(|pair| pair[0].time <= pair[1].time)
    }

    pub fn sightseeing_items(&self) -> impl Iterator<Item = &ScheduleItem> {
        self.schedule
            .iter()
            .filter(|item| item.kind == ItemKind::Sightseeing && item.destination.is_some())
    }

    /// Ends the visit to `destination_id` at `departure`, trimming its duration.
    /// Returns false when the destination is not scheduled or already ends earlier.
    pub fn shift_departure(&mut self, destination_id: &str, departure: ClockTime) -> bool {
        let Some(item) = self
            .schedule
            .iter_mut()
            .find(|item| item.destination_id() == Some(destination_id))
        else {
            return false;
        };

        let available = item.time.minutes_until(departure);
        if available <= 0 || available >= i64::from(item.duration_minutes) {
            return false;
        }
        item.duration_minutes = available as u32;
        item.notes
            .push(format!("Khởi hành sớm lúc {} để tránh kẹt xe", departure));
        true
    }
}
