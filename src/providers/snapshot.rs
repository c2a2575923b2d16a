use super::{PlaceQuery, PlaceSearch, PlaceStatusProvider, PricingProvider, TrafficProvider, WeatherProvider};
use crate::error::{PlannerError, Result};
use crate::schema::parse_document;
use crate::types::{
    Coordinates, Destination, PlaceRecord, PlaceStatus, PlaceWeather, PriceChange, TrafficReport,
};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Weather records farther than this from a lookup are ignored.
const WEATHER_MATCH_KM: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecord {
    pub center: Coordinates,
    pub weather: PlaceWeather,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrafficRecord {
    /// Place id of the leg's start
    pub from: String,
    /// Place id of the leg's end
    pub to: String,
    pub report: TrafficReport,
}

/// Offline lookup data loaded from a JSON file: places, weather, status, traffic and prices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotCatalog {
    #[serde(default)]
    pub places: Vec<PlaceRecord>,
    #[serde(default)]
    pub weather: Vec<WeatherRecord>,
    /// Live status by place id; falls back to the place's own business status
    #[serde(default)]
    pub status: HashMap<String, PlaceStatus>,
    #[serde(default)]
    pub traffic: Vec<TrafficRecord>,
    /// Price changes by place id
    #[serde(default)]
    pub prices: HashMap<String, PriceChange>,
}

impl SnapshotCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self> {
        parse_document(text)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = tokio::fs::read_to_string(path.as_ref()).await?;
        let catalog = Self::from_json(&text)?;
        debug!(
            target: "itinerary::assembler",
            path = %path.as_ref().display(),
            places = catalog.places.len(),
            "snapshot catalog loaded"
        );
        Ok(catalog)
    }

    pub fn with_place(mut self, place: PlaceRecord) -> Self {
        self.places.push(place);
        self
    }

    pub fn with_weather(mut self, center: Coordinates, weather: PlaceWeather) -> Self {
        self.weather.push(WeatherRecord { center, weather });
        self
    }

    pub fn with_status(mut self, place_id: impl Into<String>, status: PlaceStatus) -> Self {
        self.status.insert(place_id.into(), status);
        self
    }

    pub fn with_traffic(mut self, from: impl Into<String>, to: impl Into<String>, report: TrafficReport) -> Self {
        self.traffic.push(TrafficRecord {
            from: from.into(),
            to: to.into(),
            report,
        });
        self
    }

    pub fn with_price(mut self, place_id: impl Into<String>, change: PriceChange) -> Self {
        self.prices.insert(place_id.into(), change);
        self
    }

    fn matches(record: &PlaceRecord, query: &PlaceQuery) -> bool {
        let needle = query.text.trim().to_lowercase();
        let text_match = needle.is_empty()
            || record.types.iter().any(|t| t.eq_ignore_ascii_case(&needle))
            || record.name.to_lowercase().contains(&needle);
        let in_range = record
            .coordinates()
            .map(|c| c.haversine_km(&query.center) * 1000.0 <= f64::from(query.radius_meters))
            .unwrap_or(true);
        text_match && in_range
    }
}

#[async_trait]
impl PlaceSearch for SnapshotCatalog {
    async fn search(&self, query: &PlaceQuery) -> Result<Vec<PlaceRecord>> {
        Ok(self
            .places
            .iter()
            .filter(|record| Self::matches(record, query))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl WeatherProvider for SnapshotCatalog {
    async fn weather(&self, at: Coordinates) -> Result<PlaceWeather> {
        self.weather
            .iter()
            .map(|record| (record.center.haversine_km(&at), record))
            .filter(|(km, _)| *km <= WEATHER_MATCH_KM)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, record)| record.weather.clone())
            .ok_or_else(|| {
                PlannerError::provider("weather", format!("no data near {:.3},{:.3}", at.lat, at.lng))
            })
    }
}

#[async_trait]
impl PlaceStatusProvider for SnapshotCatalog {
    async fn status(&self, place_id: &str) -> Result<PlaceStatus> {
        if let Some(status) = self.status.get(place_id) {
            return Ok(status.clone());
        }
        self.places
            .iter()
            .find(|record| record.place_id == place_id)
            .and_then(|record| record.business_status)
            .map(|business_status| PlaceStatus {
                business_status,
                open_now: None,
            })
            .ok_or_else(|| PlannerError::provider("place status", format!("unknown place `{}`", place_id)))
    }
}

#[async_trait]
impl TrafficProvider for SnapshotCatalog {
    async fn traffic(&self, origin: &Destination, destination: &Destination) -> Result<TrafficReport> {
        self.traffic
            .iter()
            .find(|record| record.from == origin.id && record.to == destination.id)
            .map(|record| record.report.clone())
            .ok_or_else(|| {
                PlannerError::provider(
                    "traffic",
                    format!("no report for {} → {}", origin.name, destination.name),
                )
            })
    }
}

#[async_trait]
impl PricingProvider for SnapshotCatalog {
    async fn price_change(&self, destination: &Destination) -> Result<Option<PriceChange>> {
        Ok(self
            .prices
            .get(&destination.id)
            .copied()
            .filter(|change| change.new_price > change.old_price))
    }
}
