use crate::document_schema;
use crate::error::{PlannerError, Result};
use crate::types::cost::Money;
use crate::types::destination::{Coordinates, PlaceRecord};
use crate::types::schedule::ClockTime;
use chrono::{Duration, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const MAX_TRIP_DAYS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TravelStyle {
    Budget,
    #[default]
    Standard,
    Comfort,
    Luxury,
}

impl TravelStyle {
    pub fn label(&self) -> &'static str {
        match self {
            TravelStyle::Budget => "Tiết kiệm",
            TravelStyle::Standard => "Tiêu chuẩn",
            TravelStyle::Comfort => "Thoải mái",
            TravelStyle::Luxury => "Sang trọng",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TripType {
    #[default]
    PureTravel,
    BusinessTravel,
}

/// A place the traveler works at on some or all days of a business trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkingLocation {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    /// Explicit working dates; ignored when `all_days` is set
    #[serde(default)]
    pub dates: Vec<NaiveDate>,
    #[serde(default)]
    pub all_days: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

impl WorkingLocation {
    pub fn applies_to(&self, date: NaiveDate) -> bool {
        self.all_days || self.dates.contains(&date)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PlannerError::InvalidPreferences(
                "working location name is required".to_string(),
            ));
        }
        if self.end_time <= self.start_time {
            return Err(PlannerError::InvalidPreferences(format!(
                "working location `{}` ends ({}) before it starts ({})",
                self.name, self.end_time, self.start_time
            )));
        }
        if !self.all_days && self.dates.is_empty() {
            return Err(PlannerError::InvalidPreferences(format!(
                "working location `{}` needs at least one date or allDays",
                self.name
            )));
        }
        Ok(())
    }
}

fn default_start_time() -> ClockTime {
    ClockTime::new(8, 0).unwrap_or_default()
}

fn default_travelers() -> u32 {
    1
}

/// Traveler preferences for one itinerary generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[document_schema(name = "TripPreferences")]
#[serde(rename_all = "camelCase")]
pub struct TripPreferences {
    /// Destination city, e.g. "Đà Nẵng"
    pub destination: String,
    /// Center used for place searches; the region default applies when absent
    #[serde(default)]
    pub destination_coordinates: Option<Coordinates>,
    /// City the trip departs from
    pub departure_city: String,
    /// First calendar day of the trip
    pub start_date: NaiveDate,
    /// Trip length in days
    pub duration_days: u32,
    /// Number of travelers
    #[serde(default = "default_travelers")]
    pub travelers: u32,
    /// Total budget for the group
    pub budget: Money,
    #[serde(default)]
    pub travel_style: TravelStyle,
    /// Interest keywords such as "food" or "culture"
    #[serde(default)]
    pub interests: BTreeSet<String>,
    /// Departure time from the hotel each morning
    #[serde(default = "default_start_time")]
    pub start_time: ClockTime,
    #[serde(default)]
    pub trip_type: TripType,
    #[serde(default)]
    pub working_locations: Vec<WorkingLocation>,
    /// Places the traveler picked explicitly, in provider shape
    #[serde(default)]
    pub selected_destinations: Vec<PlaceRecord>,
}

impl TripPreferences {
    /// Trims text fields, lowercases interests and rejects unusable input.
    pub fn normalized(mut self) -> Result<Self> {
        self.destination = self.destination.trim().to_string();
        self.departure_city = self.departure_city.trim().to_string();
        self.interests = self
            .interests
            .into_iter()
            .map(|interest| interest.trim().to_lowercase())
            .filter(|interest| !interest.is_empty())
            .collect();
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.destination.trim().is_empty() {
            return Err(PlannerError::InvalidPreferences(
                "destination is required".to_string(),
            ));
        }
        if self.duration_days == 0 || self.duration_days > MAX_TRIP_DAYS {
            return Err(PlannerError::InvalidPreferences(format!(
                "duration must be between 1 and {} days, got {}",
                MAX_TRIP_DAYS, self.duration_days
            )));
        }
        if self.travelers == 0 {
            return Err(PlannerError::InvalidPreferences(
                "at least one traveler is required".to_string(),
            ));
        }
        if self.budget < 0 {
            return Err(PlannerError::InvalidPreferences(
                "budget cannot be negative".to_string(),
            ));
        }
        if self.trip_type == TripType::BusinessTravel {
            for location in &self.working_locations {
                location.validate()?;
            }
        }
        Ok(())
    }

    /// Calendar date of a 1-based day number.
    pub fn date_of_day(&self, day: u32) -> NaiveDate {
        self.start_date + Duration::days(i64::from(day.saturating_sub(1)))
    }

    pub fn end_date(&self) -> NaiveDate {
        self.date_of_day(self.duration_days)
    }

    pub fn nights(&self) -> u32 {
        self.duration_days.saturating_sub(1)
    }

    /// The working location that applies on `date`, if this is a business trip.
    pub fn working_location_for(&self, date: NaiveDate) -> Option<&WorkingLocation> {
        if self.trip_type != TripType::BusinessTravel {
            return None;
        }
        self.working_locations
            .iter()
            .find(|location| location.applies_to(date))
    }

    pub fn has_interest(&self, interest: &str) -> bool {
        self.interests.contains(interest)
    }
}
