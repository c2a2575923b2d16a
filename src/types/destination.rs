use crate::services::timing::parse_duration_label;
use crate::types::cost::Money;
use crate::types::live::BusinessStatus;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and inside the valid degree ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Cheap euclidean distance on raw degrees; only meaningful for ranking nearby points.
    pub fn planar_distance(&self, other: &Coordinates) -> f64 {
        ((self.lat - other.lat).powi(2) + (self.lng - other.lng).powi(2)).sqrt()
    }

    /// Great-circle distance in kilometres.
    pub fn haversine_km(&self, other: &Coordinates) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

/// Canonical place category, derived from provider type tags at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlaceCategory {
    TouristAttraction,
    Landmark,
    Park,
    NaturalFeature,
    Temple,
    Church,
    Museum,
    ArtGallery,
    Restaurant,
    Food,
    Cafe,
    ShoppingMall,
    Market,
    Beach,
    NightClub,
    Bar,
    Entertainment,
    AmusementPark,
    Zoo,
    Aquarium,
    MovieTheater,
    Lodging,
    General,
}

impl PlaceCategory {
    pub fn from_type_tag(tag: &str) -> Option<Self> {
        let category = match tag.trim().to_lowercase().as_str() {
            "tourist_attraction" | "point_of_interest" => Self::TouristAttraction,
            "landmark" | "historical" | "scenic_spot" | "viewpoint" => Self::Landmark,
            "park" | "hiking_area" | "outdoor" => Self::Park,
            "natural_feature" => Self::NaturalFeature,
            "temple" | "hindu_temple" | "place_of_worship" | "pagoda" => Self::Temple,
            "church" | "cathedral" => Self::Church,
            "museum" | "cultural" => Self::Museum,
            "art_gallery" => Self::ArtGallery,
            "restaurant" | "meal_takeaway" | "local_business" => Self::Restaurant,
            "food" | "bakery" | "street_food" => Self::Food,
            "cafe" | "coffee_shop" => Self::Cafe,
            "shopping_mall" | "store" | "shopping" | "clothing_store" => Self::ShoppingMall,
            "market" | "night_market" => Self::Market,
            "beach" => Self::Beach,
            "night_club" => Self::NightClub,
            "bar" | "pub" => Self::Bar,
            "entertainment" | "bowling_alley" | "casino" => Self::Entertainment,
            "amusement_park" => Self::AmusementPark,
            "zoo" => Self::Zoo,
            "aquarium" => Self::Aquarium,
            "movie_theater" => Self::MovieTheater,
            "lodging" | "hotel" => Self::Lodging,
            _ => return None,
        };
        Some(category)
    }

    /// First recognised tag wins; unknown tag lists fall back to `General`.
    pub fn from_type_tags<S: AsRef<str>>(tags: &[S]) -> Self {
        tags.iter()
            .find_map(|tag| Self::from_type_tag(tag.as_ref()))
            .unwrap_or(Self::General)
    }

    /// Search keyword used when looking for places of the same kind.
    pub fn search_tag(&self) -> &'static str {
        match self {
            Self::TouristAttraction => "tourist_attraction",
            Self::Landmark => "landmark",
            Self::Park => "park",
            Self::NaturalFeature => "natural_feature",
            Self::Temple => "temple",
            Self::Church => "church",
            Self::Museum => "museum",
            Self::ArtGallery => "art_gallery",
            Self::Restaurant => "restaurant",
            Self::Food => "food",
            Self::Cafe => "cafe",
            Self::ShoppingMall => "shopping_mall",
            Self::Market => "market",
            Self::Beach => "beach",
            Self::NightClub => "night_club",
            Self::Bar => "bar",
            Self::Entertainment => "entertainment",
            Self::AmusementPark => "amusement_park",
            Self::Zoo => "zoo",
            Self::Aquarium => "aquarium",
            Self::MovieTheater => "movie_theater",
            Self::Lodging => "lodging",
            Self::General => "tourist_attraction",
        }
    }

    pub fn is_dining(&self) -> bool {
        matches!(self, Self::Restaurant | Self::Food | Self::Cafe)
    }

    /// Typical entry fee per person in VND when the provider reports none.
    pub fn estimated_entry_fee(&self) -> Money {
        match self {
            Self::Museum | Self::ArtGallery => 30_000,
            Self::AmusementPark => 100_000,
            Self::Zoo | Self::Aquarium => 50_000,
            Self::Park | Self::NaturalFeature | Self::Temple | Self::Church | Self::Beach => 0,
            Self::Market | Self::ShoppingMall => 0,
            _ => 20_000,
        }
    }

    /// Typical visit length in minutes when the provider reports none.
    pub fn estimated_visit_minutes(&self) -> u32 {
        match self {
            Self::Museum | Self::ArtGallery => 150,
            Self::AmusementPark => 300,
            Self::Zoo | Self::Aquarium => 210,
            Self::Park | Self::NaturalFeature | Self::Beach => 90,
            Self::Temple | Self::Church => 45,
            Self::Restaurant | Self::Food => 60,
            Self::Cafe => 45,
            _ => 90,
        }
    }
}

/// A place in the plan. Always built through [`Destination::from`] on a
/// [`PlaceRecord`] or [`Destination::placeholder`]; durations are minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    pub category: PlaceCategory,
    /// Entry fee per person
    pub entry_fee: Money,
    /// Typical visit length in minutes
    pub visit_minutes: u32,
    pub is_open: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    /// Average spend per person, used for restaurants
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_spend: Option<Money>,
}

impl Destination {
    /// A generic stand-in used by fallback days.
    pub fn placeholder(region: &str) -> Self {
        Self {
            id: format!("placeholder:{}", region.to_lowercase().replace(' ', "-")),
            name: format!("Điểm tham quan {}", region),
            coordinates: None,
            category: PlaceCategory::TouristAttraction,
            entry_fee: 50_000,
            visit_minutes: 150,
            is_open: true,
            address: Some(region.to_string()),
            rating: None,
            average_spend: None,
        }
    }

    pub fn has_coordinates(&self) -> bool {
        self.coordinates.map(|c| c.is_valid()).unwrap_or(false)
    }
}

/// Place data as handed over by a search provider or the UI, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceRecord {
    pub place_id: String,
    pub name: String,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub entry_fee: Option<Money>,
    /// Free-form visit length such as "45 phút" or "1-2 giờ"
    #[serde(default)]
    pub duration_label: Option<String>,
    #[serde(default)]
    pub business_status: Option<BusinessStatus>,
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub estimated_cost: Option<Money>,
}

impl PlaceRecord {
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)).filter(|c| c.is_valid()),
            _ => None,
        }
    }
}

impl From<PlaceRecord> for Destination {
    fn from(record: PlaceRecord) -> Self {
        let coordinates = record.coordinates();
        let category = PlaceCategory::from_type_tags(&record.types);
        let visit_minutes = record
            .duration_label
            .as_deref()
            .and_then(parse_duration_label)
            .unwrap_or_else(|| category.estimated_visit_minutes());
        let is_open = !matches!(
            record.business_status,
            Some(BusinessStatus::ClosedPermanently) | Some(BusinessStatus::ClosedTemporarily)
        );
        let id = if record.place_id.trim().is_empty() {
            format!("name:{}", record.name.trim().to_lowercase())
        } else {
            record.place_id
        };

        Self {
            id,
            name: record.name,
            coordinates,
            category,
            entry_fee: record
                .entry_fee
                .unwrap_or_else(|| category.estimated_entry_fee())
                .max(0),
            visit_minutes,
            is_open,
            address: record.vicinity,
            rating: record.rating,
            average_spend: record.estimated_cost,
        }
    }
}

/// Converts a provider batch into canonical destinations, dropping unnamed records.
pub fn normalize_places(records: Vec<PlaceRecord>) -> Vec<Destination> {
    records
        .into_iter()
        .filter(|record| !record.name.trim().is_empty())
        .map(Destination::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, types: &[&str]) -> PlaceRecord {
        PlaceRecord {
            place_id: format!("id-{}", name),
            name: name.to_string(),
            types: types.iter().map(|t| t.to_string()).collect(),
            lat: Some(16.05),
            lng: Some(108.2),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalization_parses_duration_once() {
        let mut raw = record("Bảo tàng Chăm", &["museum"]);
        raw.duration_label = Some("1.5 giờ".to_string());
        let destination = Destination::from(raw);
        assert_eq!(destination.category, PlaceCategory::Museum);
        assert_eq!(destination.visit_minutes, 90);
        assert_eq!(destination.entry_fee, 30_000);
    }

    #[test]
    fn test_normalization_estimates_missing_fields() {
        let destination = Destination::from(record("Chùa Linh Ứng", &["point_x", "temple"]));
        assert_eq!(destination.category, PlaceCategory::Temple);
        assert_eq!(destination.visit_minutes, 45);
        assert_eq!(destination.entry_fee, 0);
        assert!(destination.is_open);
    }

    #[test]
    fn test_invalid_coordinates_are_dropped() {
        let mut raw = record("Somewhere", &[]);
        raw.lat = Some(f64::NAN);
        let destination = Destination::from(raw);
        assert!(destination.coordinates.is_none());
        assert_eq!(destination.category, PlaceCategory::General);
    }

    #[test]
    fn test_closed_status_marks_destination_closed() {
        let mut raw = record("Old Museum", &["museum"]);
        raw.business_status = Some(BusinessStatus::ClosedPermanently);
        assert!(!Destination::from(raw).is_open);
    }

    #[test]
    fn test_haversine_distance() {
        let hanoi = Coordinates::new(21.0285, 105.8542);
        let da_nang = Coordinates::new(16.0544, 108.2022);
        let km = hanoi.haversine_km(&da_nang);
        assert!((km - 608.0).abs() < 15.0, "got {km}");
    }
}
