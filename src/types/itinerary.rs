use crate::document_schema;
use crate::types::cost::{CostBreakdown, Money};
use crate::types::destination::{Coordinates, Destination};
use crate::types::preferences::{TravelStyle, TripPreferences, TripType};
use crate::types::schedule::DayPlan;
use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Headline facts about the trip, repeated at the top of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TripHeader {
    pub destination: String,
    pub departure_city: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub travelers: u32,
    pub travel_style: TravelStyle,
    pub trip_type: TripType,
    /// Center of the destination area, used for nearby searches
    pub center: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItinerarySummary {
    pub total_days: u32,
    pub total_nights: u32,
    pub total_destinations: u32,
    pub total_cost: Money,
    pub cost_per_person: Money,
    /// Best rated destinations, at most five
    pub highlights: Vec<String>,
}

/// How much of the plan rests on real provider data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataQuality {
    pub user_selected_destinations: bool,
    pub real_destinations: u32,
    /// Days that fell back to the minimal plan
    pub fallback_days: Vec<u32>,
    pub weather_fallback_days: u32,
    /// Collaborator lookups that failed during assembly
    pub provider_errors: u32,
}

/// A complete multi-day trip plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[document_schema(name = "Itinerary")]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    /// Stable identifier, also the monitoring session key
    pub id: String,
    /// Owner of the itinerary, recipient of notifications
    #[serde(default)]
    pub user_id: Option<String>,
    /// Creation timestamp (UTC)
    pub created_at: DateTime<Utc>,
    pub header: TripHeader,
    /// Preferences the plan was generated from
    pub preferences: TripPreferences,
    /// One entry per trip day, in order
    pub days: Vec<DayPlan>,
    /// Reconciled group cost
    pub cost: CostBreakdown,
    pub summary: ItinerarySummary,
    pub data_quality: DataQuality,
}

impl Itinerary {
    pub fn day(&self, day: u32) -> Option<&DayPlan> {
        self.days.iter().find(|plan| plan.day == day)
    }

    pub fn day_mut(&mut self, day: u32) -> Option<&mut DayPlan> {
        self.days.iter_mut().find(|plan| plan.day == day)
    }

    pub fn day_for_date(&self, date: NaiveDate) -> Option<&DayPlan> {
        self.days.iter().find(|plan| plan.date == date)
    }

    pub fn destinations(&self) -> impl Iterator<Item = &Destination> {
        self.days.iter().flat_map(|plan| plan.destinations.iter())
    }

    /// Human-readable day-by-day rendering.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "🗺️  {} → {} | {} - {} | {} khách | {}",
            self.header.departure_city,
            self.header.destination,
            self.header.start_date,
            self.header.end_date,
            self.header.travelers,
            self.header.travel_style.label()
        );

        for plan in &self.days {
            let _ = writeln!(out);
            let marker = if plan.is_fallback { " (dự phòng)" } else { "" };
            let _ = writeln!(out, "📅 Ngày {} ({}): {}{}", plan.day, plan.date, plan.theme, marker);
            if let Some(temperature) = plan.weather.temperature_c {
                let _ = writeln!(out, "   🌤️ {} {:.0}°C", plan.weather.condition, temperature);
            }
            for item in &plan.schedule {
                let _ = writeln!(out, "   {}", item.describe());
            }
            if plan.route.total_distance_km > 0.0 {
                let _ = writeln!(
                    out,
                    "   🧭 {:.1} km, ~{} phút di chuyển",
                    plan.route.total_distance_km, plan.route.travel_minutes
                );
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "💰 Tổng chi phí: {} VND ({} VND/người), dự phòng {} VND",
            self.cost.grand_total, self.cost.per_person, self.cost.contingency.amount
        );
        let status = if self.cost.budget_status.within_budget {
            "trong ngân sách"
        } else {
            "vượt ngân sách"
        };
        let _ = writeln!(
            out,
            "📊 {} ({}%, chênh lệch {} VND)",
            status, self.cost.budget_status.percentage, self.cost.budget_status.difference
        );
        out
    }
}
