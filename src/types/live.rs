//! Shapes returned by the live data collaborators (weather, place status, traffic, pricing).

use crate::types::cost::Money;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Operating status as reported by a places provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusinessStatus {
    Operational,
    ClosedTemporarily,
    ClosedPermanently,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceStatus {
    pub business_status: BusinessStatus,
    /// `None` when the provider has no opening hours for the place
    #[serde(default)]
    pub open_now: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub temperature_c: f64,
    /// Free-text condition, e.g. "mưa rào" or "light rain"
    pub condition: String,
    #[serde(default)]
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForecastEntry {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub temperature_c: Option<f64>,
    #[serde(default)]
    pub precipitation_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeatherWarning {
    pub event: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlaceWeather {
    pub current: CurrentConditions,
    #[serde(default)]
    pub forecast: Vec<ForecastEntry>,
    #[serde(default)]
    pub alerts: Vec<WeatherWarning>,
}

impl PlaceWeather {
    pub fn max_precipitation_mm(&self) -> f64 {
        self.forecast
            .iter()
            .map(|entry| entry.precipitation_mm)
            .fold(0.0, f64::max)
    }

    pub fn is_rainy(&self) -> bool {
        let condition = self.current.condition.to_lowercase();
        condition.contains("mưa") || condition.contains("rain")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TrafficCondition {
    Light,
    Moderate,
    Heavy,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrafficReport {
    pub condition: TrafficCondition,
    pub duration_minutes: u32,
    pub duration_in_traffic_minutes: u32,
}

impl TrafficReport {
    pub fn delay_minutes(&self) -> u32 {
        self.duration_in_traffic_minutes
            .saturating_sub(self.duration_minutes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceChange {
    pub old_price: Money,
    pub new_price: Money,
}

impl PriceChange {
    /// Relative increase in percent; zero when there was no previous price.
    pub fn increase_percent(&self) -> f64 {
        if self.old_price <= 0 {
            return 0.0;
        }
        (self.new_price - self.old_price) as f64 / self.old_price as f64 * 100.0
    }
}
