//! Collaborator seams: place search, live conditions and persistence.
//!
//! Every lookup returns a [`Result`]; callers treat `Err` as "no data" and keep going.

pub mod memory;
pub mod snapshot;

use crate::error::Result;
use crate::types::{
    AdjustmentProposal, AlertBatch, Coordinates, Destination, Itinerary, Notification,
    PlaceRecord, PlaceStatus, PlaceWeather, PriceChange, TrafficReport,
};
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

pub use memory::InMemoryAlertStore;
pub use snapshot::SnapshotCatalog;

/// A nearby place search request.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceQuery {
    /// Type tag or free text, e.g. "museum"
    pub text: String,
    pub center: Coordinates,
    pub radius_meters: u32,
    pub region_hint: String,
}

impl PlaceQuery {
    pub fn new(text: impl Into<String>, center: Coordinates, radius_meters: u32) -> Self {
        Self {
            text: text.into(),
            center,
            radius_meters,
            region_hint: "vn".to_string(),
        }
    }

    pub fn with_region_hint(mut self, region: impl Into<String>) -> Self {
        self.region_hint = region.into();
        self
    }
}

#[async_trait]
pub trait PlaceSearch: Send + Sync + Debug {
    async fn search(&self, query: &PlaceQuery) -> Result<Vec<PlaceRecord>>;
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn weather(&self, at: Coordinates) -> Result<PlaceWeather>;
}

#[async_trait]
pub trait PlaceStatusProvider: Send + Sync + Debug {
    async fn status(&self, place_id: &str) -> Result<PlaceStatus>;
}

#[async_trait]
pub trait TrafficProvider: Send + Sync + Debug {
    async fn traffic(&self, origin: &Destination, destination: &Destination) -> Result<TrafficReport>;
}

#[async_trait]
pub trait PricingProvider: Send + Sync + Debug {
    /// `None` when the price is unchanged or unknown.
    async fn price_change(&self, destination: &Destination) -> Result<Option<PriceChange>>;
}

/// Append-only history of monitoring output.
#[async_trait]
pub trait AlertStore: Send + Sync + Debug {
    async fn persist_alert_batch(&self, batch: &AlertBatch) -> Result<()>;

    async fn persist_notification(&self, user_id: &str, notification: &Notification) -> Result<()>;

    async fn persist_adjustments(&self, itinerary_id: &str, proposals: &[AdjustmentProposal]) -> Result<()>;

    /// Most recent batches first, at most `limit`.
    async fn alert_history(&self, itinerary_id: &str, limit: usize) -> Result<Vec<AlertBatch>>;
}

#[async_trait]
pub trait ItineraryStore: Send + Sync + Debug {
    async fn save_itinerary(&self, itinerary: &Itinerary) -> Result<()>;
}

/// The set of collaborators handed to the assembler and the monitoring engine.
/// Missing lookups simply contribute nothing.
#[derive(Debug, Clone)]
pub struct Providers {
    pub places: Arc<dyn PlaceSearch>,
    pub weather: Option<Arc<dyn WeatherProvider>>,
    pub status: Option<Arc<dyn PlaceStatusProvider>>,
    pub traffic: Option<Arc<dyn TrafficProvider>>,
    pub pricing: Option<Arc<dyn PricingProvider>>,
    pub alerts: Option<Arc<dyn AlertStore>>,
    pub itineraries: Option<Arc<dyn ItineraryStore>>,
}

impl Providers {
    pub fn new(places: Arc<dyn PlaceSearch>) -> Self {
        Self {
            places,
            weather: None,
            status: None,
            traffic: None,
            pricing: None,
            alerts: None,
            itineraries: None,
        }
    }

    /// Every lookup served from one offline catalog.
    pub fn from_catalog(catalog: Arc<SnapshotCatalog>) -> Self {
        Self::new(catalog.clone())
            .with_weather(catalog.clone())
            .with_status(catalog.clone())
            .with_traffic(catalog.clone())
            .with_pricing(catalog)
    }

    pub fn with_weather(mut self, weather: Arc<dyn WeatherProvider>) -> Self {
        self.weather = Some(weather);
        self
    }

    pub fn with_status(mut self, status: Arc<dyn PlaceStatusProvider>) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_traffic(mut self, traffic: Arc<dyn TrafficProvider>) -> Self {
        self.traffic = Some(traffic);
        self
    }

    pub fn with_pricing(mut self, pricing: Arc<dyn PricingProvider>) -> Self {
        self.pricing = Some(pricing);
        self
    }

    pub fn with_alert_store(mut self, store: Arc<dyn AlertStore>) -> Self {
        self.alerts = Some(store);
        self
    }

    pub fn with_itinerary_store(mut self, store: Arc<dyn ItineraryStore>) -> Self {
        self.itineraries = Some(store);
        self
    }
}
