use itinerary_engine::{
    parse_document, schema::parse_validated, types::TravelStyle, AlertBatch, DocumentSchema,
    PlannerError, TripPreferences,
};
use serde_json::json;
use tokio_test::assert_err;

fn preferences_json() -> serde_json::Value {
    json!({
        "destination": "Đà Nẵng",
        "departureCity": "Hà Nội",
        "startDate": "2026-10-20",
        "durationDays": 3,
        "travelers": 2,
        "budget": 12000000,
        "travelStyle": "comfort",
        "interests": ["food", "culture"],
        "startTime": "07:30"
    })
}

fn validation_message(err: PlannerError) -> String {
    match err {
        PlannerError::Validation(message) => message,
        other => panic!("expected a validation error, got {other}"),
    }
}

#[test]
fn test_preferences_schema_has_expected_structure() {
    let schema = TripPreferences::schema().schema_json();

    assert_eq!(schema["type"], "object");
    assert_eq!(schema["title"], "TripPreferences");

    let props = schema["properties"].as_object().unwrap();
    for key in ["destination", "departureCity", "startDate", "durationDays", "startTime"] {
        assert!(props.contains_key(key), "missing {key}");
    }

    let required = schema["required"].as_array().unwrap();
    assert!(required.contains(&json!("destination")));
    assert!(required.contains(&json!("startDate")));
    assert!(!required.contains(&json!("travelers")));
    assert!(!required.contains(&json!("selectedDestinations")));
    assert!(TripPreferences::schema().required_fields().contains(&"budget"));
}

#[test]
fn test_valid_preferences_parse_with_defaults() {
    let text = preferences_json().to_string();
    let preferences: TripPreferences = parse_validated(&text).unwrap();

    assert_eq!(preferences.duration_days, 3);
    assert_eq!(preferences.travel_style, TravelStyle::Comfort);
    assert_eq!(preferences.start_time.to_string(), "07:30");
    assert!(preferences.has_interest("food"));
    assert!(preferences.working_locations.is_empty());
    assert!(preferences.destination_coordinates.is_none());
}

#[test]
fn test_missing_required_field_is_reported() {
    let mut payload = preferences_json();
    payload.as_object_mut().unwrap().remove("destination");

    let err = assert_err!(parse_validated::<TripPreferences>(&payload.to_string()));
    let message = validation_message(err);
    assert!(message.contains("TripPreferences"), "{message}");
    assert!(message.contains("destination"), "{message}");
}

#[test]
fn test_bad_clock_time_names_the_path() {
    let mut payload = preferences_json();
    payload["startTime"] = json!("25:00");

    let err = assert_err!(parse_validated::<TripPreferences>(&payload.to_string()));
    assert!(validation_message(err).contains("/startTime"));
}

#[test]
fn test_parse_document_reports_json_path() {
    let mut payload = preferences_json();
    payload["durationDays"] = json!("three");

    let err = assert_err!(parse_document::<TripPreferences>(&payload.to_string()));
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
    assert!(err.to_string().contains("durationDays"));
}

#[test]
fn test_malformed_json_is_rejected() {
    let err = assert_err!(parse_validated::<TripPreferences>("{ not json"));
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_alert_batch_schema_rejects_wrong_types() {
    let handle = AlertBatch::schema();
    let payload = json!({
        "itineraryId": 42,
        "alerts": [],
        "recordedAt": "2026-10-20T02:00:00Z"
    });

    let err = assert_err!(itinerary_engine::schema::validate_against(handle, &payload));
    let message = validation_message(err);
    assert!(message.contains("AlertBatch"));
    assert!(message.contains("/itineraryId"));
}

#[test]
fn test_alert_batch_round_trips_through_schema() {
    let text = json!({
        "itineraryId": "trip-1",
        "alerts": [],
        "recordedAt": "2026-10-20T02:00:00Z"
    })
    .to_string();

    let batch: AlertBatch = parse_validated(&text).unwrap();
    assert_eq!(batch.itinerary_id, "trip-1");
    assert!(batch.alerts.is_empty());
}
