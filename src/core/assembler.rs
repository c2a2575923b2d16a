use crate::config::AssemblerConfig;
use crate::core::clock::{Clock, SystemClock};
use crate::core::monitor::MonitoringEngine;
use crate::error::{PlannerError, Result};
use crate::providers::{PlaceQuery, Providers};
use crate::schema::validate_document;
use crate::services::{
    day_search_categories, pick_meals, BudgetAllocator, CandidateSelector, DayPlanScheduler,
    DayRequest, RouteOptimizer,
};
use crate::types::{
    normalize_places, Coordinates, DataQuality, DayPlan, Destination, Itinerary, ItinerarySummary,
    PlaceRecord, PlaceWeather, TripHeader, TripPreferences, WeatherSnapshot,
};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Used when the caller supplies no destination coordinates (Đà Nẵng).
pub const DEFAULT_CENTER: Coordinates = Coordinates {
    lat: 16.047,
    lng: 108.220,
};

const HIGHLIGHT_COUNT: usize = 5;

/// Tried when a day's own categories leave nothing to visit, e.g. the food day.
const WIDER_SEARCH: [&str; 4] = ["tourist_attraction", "landmark", "park", "museum"];

/// Builds complete itineraries from trip preferences.
///
/// The assembler pulls candidates and weather from its [`Providers`], schedules
/// every day, reconciles the budget and validates the finished document. When a
/// [`MonitoringEngine`] is attached, every itinerary it returns is already being
/// monitored.
#[derive(Debug)]
pub struct ItineraryAssembler {
    providers: Providers,
    config: AssemblerConfig,
    clock: Arc<dyn Clock>,
    monitor: Option<MonitoringEngine>,
}

impl ItineraryAssembler {
    pub fn new(providers: Providers) -> Self {
        Self {
            providers,
            config: AssemblerConfig::default(),
            clock: Arc::new(SystemClock::default()),
            monitor: None,
        }
    }

    pub fn with_config(mut self, config: AssemblerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_monitor(mut self, monitor: MonitoringEngine) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    pub fn monitor(&self) -> Option<&MonitoringEngine> {
        self.monitor.as_ref()
    }

    /// Either a complete, schema-valid itinerary or one aggregated error.
    pub async fn assemble(&self, preferences: TripPreferences, user_id: Option<&str>) -> Result<Itinerary> {
        let preferences = preferences.normalized()?;
        let itinerary = self.build(preferences, user_id).await?;

        if let Some(monitor) = &self.monitor {
            monitor.start(itinerary.clone(), user_id).await;
        }
        Ok(itinerary)
    }

    async fn build(&self, preferences: TripPreferences, user_id: Option<&str>) -> Result<Itinerary> {
        let center = preferences
            .destination_coordinates
            .filter(Coordinates::is_valid)
            .unwrap_or(DEFAULT_CENTER);
        let mut quality = DataQuality {
            user_selected_destinations: !preferences.selected_destinations.is_empty(),
            ..Default::default()
        };

        info!(
            target: "itinerary::assembler",
            destination = %preferences.destination,
            days = preferences.duration_days,
            travelers = preferences.travelers,
            "assembling itinerary"
        );

        let restaurants = self.restaurants(center, &mut quality).await;
        let per_day = self.destinations_per_day(&preferences, center, &mut quality).await;
        let weather = self.weather(center, &mut quality).await;

        let scheduler = DayPlanScheduler::new(
            RouteOptimizer::new(self.config.optimizer_budget),
            self.config.pricing.clone(),
        );
        let mut days: Vec<DayPlan> = Vec::with_capacity(per_day.len());
        for (index, destinations) in per_day.into_iter().enumerate() {
            let day = index as u32 + 1;
            let snapshot = weather.as_ref().map(|w| weather_snapshot(w, index));
            if snapshot.is_none() {
                quality.weather_fallback_days += 1;
            }
            let plan = scheduler.schedule_day(DayRequest {
                day,
                preferences: &preferences,
                destinations,
                meals: pick_meals(&restaurants, day),
                weather: snapshot,
            });
            if plan.is_fallback {
                quality.fallback_days.push(day);
            }
            days.push(plan);
        }

        if days.iter().all(|plan| plan.is_fallback) {
            let reasons = days
                .iter()
                .map(|plan| {
                    let reason = plan.notes.first().map(String::as_str).unwrap_or("no plan");
                    format!("day {}: {}", plan.day, reason)
                })
                .collect();
            return Err(PlannerError::Assembly(reasons));
        }

        let cost = BudgetAllocator::new(self.config.pricing.clone()).allocate(&preferences, &days);
        let total_destinations: usize = days.iter().map(|plan| plan.destinations.len()).sum();
        quality.real_destinations = total_destinations as u32;

        let summary = ItinerarySummary {
            total_days: preferences.duration_days,
            total_nights: preferences.nights(),
            total_destinations: total_destinations as u32,
            total_cost: cost.grand_total,
            cost_per_person: cost.per_person,
            highlights: highlights(&days),
        };
        let header = TripHeader {
            destination: preferences.destination.clone(),
            departure_city: preferences.departure_city.clone(),
            start_date: preferences.start_date,
            end_date: preferences.end_date(),
            travelers: preferences.travelers,
            travel_style: preferences.travel_style,
            trip_type: preferences.trip_type,
            center,
        };

        let itinerary = Itinerary {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.map(str::to_string),
            created_at: self.clock.now(),
            header,
            preferences,
            days,
            cost,
            summary,
            data_quality: quality,
        };

        validate_document(&itinerary)?;

        if let Some(store) = &self.providers.itineraries {
            store.save_itinerary(&itinerary).await.map_err(|err| {
                PlannerError::Assembly(vec![format!("itinerary could not be saved: {}", err)])
            })?;
        }

        info!(
            target: "itinerary::assembler",
            itinerary_id = %itinerary.id,
            destinations = itinerary.summary.total_destinations,
            fallback_days = itinerary.data_quality.fallback_days.len(),
            grand_total = itinerary.cost.grand_total,
            "itinerary assembled"
        );
        Ok(itinerary)
    }

    async fn search(&self, text: &str, center: Coordinates) -> Result<Vec<PlaceRecord>> {
        let query = PlaceQuery::new(text, center, self.config.search_radius_m)
            .with_region_hint(self.config.region_hint.clone());
        self.providers.places.search(&query).await
    }

    async fn restaurants(&self, center: Coordinates, quality: &mut DataQuality) -> Vec<Destination> {
        match self.search("restaurant", center).await {
            Ok(records) => normalize_places(records)
                .into_iter()
                .filter(|place| place.is_open && place.category.is_dining())
                .collect(),
            Err(err) => {
                quality.provider_errors += 1;
                warn!(target: "itinerary::assembler", error = %err, "restaurant search failed");
                Vec::new()
            }
        }
    }

    /// User-selected places are spread over the days first; days left empty
    /// are filled from provider searches.
    async fn destinations_per_day(
        &self,
        preferences: &TripPreferences,
        center: Coordinates,
        quality: &mut DataQuality,
    ) -> Vec<Vec<Destination>> {
        let days = preferences.duration_days as usize;
        let mut selector = CandidateSelector::new();

        let mut per_day = if preferences.selected_destinations.is_empty() {
            vec![Vec::new(); days]
        } else {
            let selected = normalize_places(preferences.selected_destinations.clone());
            selector.reserve(selected.iter());
            RouteOptimizer::new(self.config.optimizer_budget).distribute_across_days(selected, days)
        };

        for (index, destinations) in per_day.iter_mut().enumerate() {
            if !destinations.is_empty() {
                continue;
            }
            let day = index as u32 + 1;
            let categories = day_search_categories(day, &preferences.interests);
            let candidates = self.search_many(day, &categories, center, quality).await;
            *destinations = selector.take_for_day(candidates, self.config.destinations_per_day);
            if destinations.is_empty() {
                let candidates = self.search_many(day, &WIDER_SEARCH, center, quality).await;
                *destinations = selector.take_for_day(candidates, self.config.destinations_per_day);
            }
            debug!(
                target: "itinerary::assembler",
                day,
                picked = destinations.len(),
                "day candidates selected"
            );
        }
        per_day
    }

    async fn search_many(
        &self,
        day: u32,
        categories: &[&str],
        center: Coordinates,
        quality: &mut DataQuality,
    ) -> Vec<Destination> {
        let results = join_all(categories.iter().map(|category| self.search(category, center))).await;

        let mut records = Vec::new();
        for (category, result) in categories.iter().zip(results) {
            match result {
                Ok(found) => records.extend(found),
                Err(err) => {
                    quality.provider_errors += 1;
                    warn!(target: "itinerary::assembler", day, category, error = %err, "place search failed");
                }
            }
        }
        normalize_places(records)
    }

    async fn weather(&self, center: Coordinates, quality: &mut DataQuality) -> Option<PlaceWeather> {
        let provider = self.providers.weather.as_ref()?;
        match provider.weather(center).await {
            Ok(weather) => Some(weather),
            Err(err) => {
                quality.provider_errors += 1;
                warn!(target: "itinerary::assembler", error = %err, "weather lookup failed");
                None
            }
        }
    }
}

/// Day `index` (0-based) uses the matching forecast entry when there is one.
pub(crate) fn weather_snapshot(weather: &PlaceWeather, index: usize) -> WeatherSnapshot {
    let forecast = weather.forecast.get(index);
    let temperature = forecast
        .and_then(|entry| entry.temperature_c)
        .unwrap_or(weather.current.temperature_c);
    let precipitation = forecast.map(|entry| entry.precipitation_mm).unwrap_or(0.0);

    let mut recommendations = Vec::new();
    if precipitation > 0.0 || weather.is_rainy() {
        recommendations.push("Có thể có mưa - chuẩn bị ô/áo mưa".to_string());
    }
    if temperature >= 30.0 {
        recommendations.push("Thời tiết nóng - mang theo nước uống".to_string());
    } else if temperature < 15.0 {
        recommendations.push("Trời lạnh - mang theo áo ấm".to_string());
    }
    if weather.current.humidity.map(|h| h > 80.0).unwrap_or(false) {
        recommendations.push("Độ ẩm cao - mặc quần áo thoáng mát".to_string());
    }
    for warning in &weather.alerts {
        recommendations.push(format!("Theo dõi cảnh báo: {}", warning.event));
    }
    if recommendations.is_empty() {
        recommendations.push("Thời tiết thuận lợi cho tham quan".to_string());
    }

    WeatherSnapshot {
        temperature_c: Some(temperature),
        condition: weather.current.condition.clone(),
        precipitation_mm: precipitation,
        recommendations,
        is_fallback: false,
    }
}

fn highlights(days: &[DayPlan]) -> Vec<String> {
    let mut rated: Vec<&Destination> = days.iter().flat_map(|plan| plan.destinations.iter()).collect();
    rated.sort_by(|a, b| b.rating.unwrap_or(0.0).total_cmp(&a.rating.unwrap_or(0.0)));
    rated
        .into_iter()
        .take(HIGHLIGHT_COUNT)
        .map(|destination| destination.name.clone())
        .collect()
}
