use crate::document_schema;
use crate::types::destination::Destination;
use crate::types::schedule::ClockTime;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    WeatherSevere,
    WeatherRain,
    WeatherTemperature,
    PlaceClosedPermanently,
    PlaceClosedTemporarily,
    PlaceClosedNow,
    TrafficHeavy,
    PricingIncrease,
    CrowdHigh,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::WeatherSevere => "weather_severe",
            AlertType::WeatherRain => "weather_rain",
            AlertType::WeatherTemperature => "weather_temperature",
            AlertType::PlaceClosedPermanently => "place_closed_permanently",
            AlertType::PlaceClosedTemporarily => "place_closed_temporarily",
            AlertType::PlaceClosedNow => "place_closed_now",
            AlertType::TrafficHeavy => "traffic_heavy",
            AlertType::PricingIncrease => "pricing_increase",
            AlertType::CrowdHigh => "crowd_high",
        }
    }

    pub fn is_place_closure(&self) -> bool {
        matches!(
            self,
            AlertType::PlaceClosedPermanently | AlertType::PlaceClosedTemporarily
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    pub fn icon(&self) -> &'static str {
        match self {
            Severity::High => "🚨",
            Severity::Medium => "⚠️",
            Severity::Low => "ℹ️",
        }
    }
}

/// A risk condition detected against live data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Destination>,
    /// Start of the leg for traffic alerts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Destination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    #[serde(default)]
    pub suggested_actions: Vec<String>,
    /// Raw provider payload behind the alert
    #[serde(default)]
    pub data: Value,
    pub detected_at: DateTime<Utc>,
}

impl Alert {
    pub fn new(
        alert_type: AlertType,
        severity: Severity,
        title: impl Into<String>,
        message: impl Into<String>,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            alert_type,
            severity,
            title: title.into(),
            message: message.into(),
            destination: None,
            origin: None,
            day: None,
            suggested_actions: Vec::new(),
            data: Value::Null,
            detected_at,
        }
    }

    pub fn for_destination(mut self, destination: &Destination, day: u32) -> Self {
        self.destination = Some(destination.clone());
        self.day = Some(day);
        self
    }

    pub fn with_origin(mut self, origin: &Destination) -> Self {
        self.origin = Some(origin.clone());
        self
    }

    pub fn with_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggested_actions = actions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    pub fn describe(&self) -> String {
        format!("{} [{}] {}: {}", self.severity.icon(), self.alert_type.as_str(), self.title, self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    ReplaceDestination,
    WeatherAdjustment,
    TimeAdjustment,
}

/// A suggested itinerary change produced for an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentProposal {
    #[serde(rename = "type")]
    pub kind: AdjustmentKind,
    pub alert: Alert,
    #[serde(default)]
    pub alternatives: Vec<Destination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_time: Option<ClockTime>,
    pub auto_apply: bool,
    pub reason: String,
}

impl AdjustmentProposal {
    pub fn describe(&self) -> String {
        let auto = if self.auto_apply { "auto" } else { "confirm" };
        match (&self.suggested_time, self.alternatives.len()) {
            (Some(time), _) => format!("🔄 {:?} ({}) → {}: {}", self.kind, auto, time, self.reason),
            (None, count) => format!("🔄 {:?} ({}) → {} alternatives: {}", self.kind, auto, count, self.reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Alert,
    Adjustment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub kind: NotificationKind,
    pub itinerary_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    pub title: String,
    pub body: String,
    pub count: u32,
    pub created_at: DateTime<Utc>,
}

/// One evaluation cycle's alerts as appended to history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[document_schema(name = "AlertBatch")]
#[serde(rename_all = "camelCase")]
pub struct AlertBatch {
    /// Itinerary the alerts were detected for
    pub itinerary_id: String,
    /// Alerts of the cycle, high severity first
    pub alerts: Vec<Alert>,
    /// When the cycle finished
    pub recorded_at: DateTime<Utc>,
}

impl AlertBatch {
    pub fn count(&self, severity: Severity) -> usize {
        self.alerts.iter().filter(|alert| alert.severity == severity).count()
    }
}

/// Outcome of one evaluation cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    pub itinerary_id: String,
    pub evaluated_at: DateTime<Utc>,
    pub alerts: Vec<Alert>,
    pub proposals: Vec<AdjustmentProposal>,
    /// Detectors that failed or timed out this cycle
    pub failed_detectors: Vec<String>,
}

impl EvaluationReport {
    pub fn has_alert(&self, alert_type: AlertType) -> bool {
        self.alerts.iter().any(|alert| alert.alert_type == alert_type)
    }
}
