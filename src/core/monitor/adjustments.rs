use crate::config::MonitorConfig;
use crate::providers::{PlaceQuery, Providers};
use crate::types::{
    normalize_places, AdjustmentKind, AdjustmentProposal, Alert, AlertType, ClockTime, Destination,
    Itinerary, Severity, TrafficReport,
};
use std::collections::HashSet;
use tracing::{debug, warn};

const INDOOR_TAGS: [&str; 5] = ["museum", "shopping_mall", "art_gallery", "aquarium", "movie_theater"];
const INDOOR_PER_TAG: usize = 2;

/// High severity alerts and heavy traffic get a proposal; everything else is informational.
pub(crate) async fn propose_adjustments(
    alerts: &[Alert],
    itinerary: &Itinerary,
    providers: &Providers,
    config: &MonitorConfig,
) -> Vec<AdjustmentProposal> {
    let mut proposals = Vec::new();

    for alert in alerts {
        let high = alert.severity == Severity::High;
        match alert.alert_type {
            kind if kind.is_place_closure() && high => {
                let Some(original) = &alert.destination else {
                    continue;
                };
                let alternatives = find_alternatives(original, itinerary, providers, config).await;
                if alternatives.is_empty() {
                    debug!(
                        target: "itinerary::monitor",
                        destination = %original.name,
                        "no replacement found"
                    );
                    continue;
                }
                proposals.push(AdjustmentProposal {
                    kind: AdjustmentKind::ReplaceDestination,
                    alert: alert.clone(),
                    alternatives,
                    suggested_time: None,
                    auto_apply: false,
                    reason: format!("{} không khả dụng", original.name),
                });
            }
            AlertType::WeatherSevere if high => {
                let alternatives = find_indoor_alternatives(itinerary, providers, config).await;
                proposals.push(AdjustmentProposal {
                    kind: AdjustmentKind::WeatherAdjustment,
                    alert: alert.clone(),
                    alternatives,
                    suggested_time: None,
                    auto_apply: false,
                    reason: "Thời tiết không thuận lợi".to_string(),
                });
            }
            AlertType::TrafficHeavy => {
                proposals.push(AdjustmentProposal {
                    kind: AdjustmentKind::TimeAdjustment,
                    alert: alert.clone(),
                    alternatives: Vec::new(),
                    suggested_time: Some(earlier_departure(alert, itinerary, config)),
                    auto_apply: true,
                    reason: "Tránh giao thông ùn tắc".to_string(),
                });
            }
            _ => {}
        }
    }
    proposals
}

/// Leave the origin `max(traffic_shift_minutes, delay)` before its scheduled end.
/// Without a scheduled origin the next stop's start, then the trip start time, is the reference.
pub(crate) fn earlier_departure(alert: &Alert, itinerary: &Itinerary, config: &MonitorConfig) -> ClockTime {
    let delay = serde_json::from_value::<TrafficReport>(alert.data.clone())
        .map(|report| report.delay_minutes())
        .unwrap_or(0);
    let shift = config.traffic_shift_minutes.max(delay);

    let plan = alert.day.and_then(|day| itinerary.day(day));
    let scheduled = |destination: Option<&Destination>| {
        let id = destination?.id.as_str();
        plan?.schedule.iter().find(|item| item.destination_id() == Some(id))
    };

    let reference = scheduled(alert.origin.as_ref())
        .map(|item| item.end_time())
        .or_else(|| scheduled(alert.destination.as_ref()).map(|item| item.time))
        .unwrap_or(itinerary.preferences.start_time);
    reference.sub_minutes(shift)
}

fn planned_ids(itinerary: &Itinerary) -> HashSet<&str> {
    itinerary.destinations().map(|d| d.id.as_str()).collect()
}

async fn find_alternatives(
    original: &Destination,
    itinerary: &Itinerary,
    providers: &Providers,
    config: &MonitorConfig,
) -> Vec<Destination> {
    let query = PlaceQuery::new(
        original.category.search_tag(),
        itinerary.header.center,
        config.alternatives_radius_m,
    );
    let records = match providers.places.search(&query).await {
        Ok(records) => records,
        Err(err) => {
            warn!(target: "itinerary::monitor", error = %err, "alternative search failed");
            return Vec::new();
        }
    };

    let planned = planned_ids(itinerary);
    normalize_places(records)
        .into_iter()
        .filter(|place| place.id != original.id && place.is_open && !planned.contains(place.id.as_str()))
        .take(config.max_alternatives)
        .collect()
}

async fn find_indoor_alternatives(
    itinerary: &Itinerary,
    providers: &Providers,
    config: &MonitorConfig,
) -> Vec<Destination> {
    let planned = planned_ids(itinerary);
    let mut found: Vec<Destination> = Vec::new();

    for tag in INDOOR_TAGS {
        let query = PlaceQuery::new(tag, itinerary.header.center, config.indoor_radius_m);
        let records = match providers.places.search(&query).await {
            Ok(records) => records,
            Err(err) => {
                warn!(target: "itinerary::monitor", tag, error = %err, "indoor search failed");
                continue;
            }
        };
        let fresh: Vec<Destination> = normalize_places(records)
            .into_iter()
            .filter(|place| {
                place.is_open
                    && !planned.contains(place.id.as_str())
                    && !found.iter().any(|known| known.id == place.id)
            })
            .take(INDOOR_PER_TAG)
            .collect();
        found.extend(fresh);
    }
    found.truncate(config.max_indoor_alternatives);
    found
}

/// Applies every auto-applicable time adjustment; returns how many changed the plan.
pub(crate) fn apply_auto_adjustments(itinerary: &mut Itinerary, proposals: &[AdjustmentProposal]) -> usize {
    let mut applied = 0;
    for proposal in proposals.iter().filter(|p| p.auto_apply) {
        let (Some(departure), Some(day), Some(origin)) =
            (proposal.suggested_time, proposal.alert.day, proposal.alert.origin.as_ref())
        else {
            continue;
        };
        if let Some(plan) = itinerary.day_mut(day) {
            if plan.shift_departure(&origin.id, departure) {
                applied += 1;
            }
        }
    }
    applied
}
