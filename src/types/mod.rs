pub mod alert;
pub mod cost;
pub mod destination;
pub mod itinerary;
pub mod live;
pub mod preferences;
pub mod schedule;

pub use alert::{
    AdjustmentKind, AdjustmentProposal, Alert, AlertBatch, AlertType, EvaluationReport,
    Notification, NotificationKind, Severity,
};
pub use cost::{
    AccommodationCost, BudgetStatus, Contingency, CostBreakdown, FoodCost, Money,
    SightseeingCost, TransportCost,
};
pub use destination::{normalize_places, Coordinates, Destination, PlaceCategory, PlaceRecord};
pub use itinerary::{DataQuality, Itinerary, ItinerarySummary, TripHeader};
pub use live::{
    BusinessStatus, CurrentConditions, ForecastEntry, PlaceStatus, PlaceWeather, PriceChange,
    TrafficCondition, TrafficReport, WeatherWarning,
};
pub use preferences::{TravelStyle, TripPreferences, TripType, WorkingLocation};
pub use schedule::{
    ClockTime, DayCost, DayPlan, ItemKind, RouteSummary, ScheduleItem, WeatherSnapshot,
    WorkingBlock, MINUTES_PER_DAY,
};
