use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use itinerary_engine::{
    core::FixedClock,
    providers::{AlertStore, PlaceStatusProvider, PlaceSearch},
    types::{
        AlertBatch, BusinessStatus, PriceChange, ClockTime, CurrentConditions, ForecastEntry, Notification,
        NotificationKind, PlaceRecord,
        PlaceStatus, PlaceWeather, Severity, TrafficCondition, TrafficReport, TravelStyle, TripType,
        WeatherWarning,
    },
    AdjustmentKind, AdjustmentProposal, AlertType, InMemoryAlertStore, Itinerary, ItineraryAssembler,
    MonitorConfig, MonitoringEngine, PlannerError, Providers, Result, SnapshotCatalog, TripPreferences,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_test::assert_ok;

const TRIP_START: (i32, u32, u32) = (2026, 10, 20);

fn place(id: &str, kind: &str, lat: f64, lng: f64) -> PlaceRecord {
    PlaceRecord {
        place_id: id.to_string(),
        name: format!("{} {}", kind, id),
        types: vec![kind.to_string()],
        lat: Some(lat),
        lng: Some(lng),
        rating: Some(4.5),
        ..Default::default()
    }
}

fn local(text: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M").unwrap()
}

/// Tuesday morning of the first trip day.
fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(local("2026-10-20T09:00")))
}

async fn plan(selected: Vec<PlaceRecord>) -> Itinerary {
    let (year, month, day) = TRIP_START;
    plan_from(NaiveDate::from_ymd_opt(year, month, day).unwrap(), selected).await
}

async fn plan_from(start_date: NaiveDate, selected: Vec<PlaceRecord>) -> Itinerary {
    let preferences = TripPreferences {
        destination: "Đà Nẵng".to_string(),
        destination_coordinates: None,
        departure_city: "Hà Nội".to_string(),
        start_date,
        duration_days: 1,
        travelers: 2,
        budget: 5_000_000,
        travel_style: TravelStyle::Standard,
        interests: Default::default(),
        start_time: ClockTime::from_hm(8, 0),
        trip_type: TripType::PureTravel,
        working_locations: Vec::new(),
        selected_destinations: selected,
    };
    ItineraryAssembler::new(Providers::new(Arc::new(SnapshotCatalog::new())))
        .with_clock(clock())
        .assemble(preferences, Some("traveler"))
        .await
        .unwrap()
}

fn closure_catalog() -> SnapshotCatalog {
    SnapshotCatalog::new()
        .with_place(place("alt1", "museum", 16.05, 108.2))
        .with_place(place("alt2", "museum", 16.06, 108.2))
        .with_status(
            "closed1",
            PlaceStatus {
                business_status: BusinessStatus::ClosedPermanently,
                open_now: None,
            },
        )
}

fn engine(catalog: SnapshotCatalog, store: Arc<InMemoryAlertStore>, config: MonitorConfig) -> MonitoringEngine {
    let providers = Providers::from_catalog(Arc::new(catalog)).with_alert_store(store);
    MonitoringEngine::new(providers, config, clock())
}

#[tokio::test]
async fn test_closed_place_yields_one_replacement_proposal() {
    let itinerary = plan(vec![place("closed1", "museum", 16.04, 108.21)]).await;
    let store = Arc::new(InMemoryAlertStore::new());
    let engine = engine(closure_catalog(), store.clone(), MonitorConfig::default());

    let report = engine.start(itinerary.clone(), Some("traveler")).await.unwrap();
    assert!(report.has_alert(AlertType::PlaceClosedPermanently));
    assert_eq!(report.proposals.len(), 1);

    let proposal = &report.proposals[0];
    assert_eq!(proposal.kind, AdjustmentKind::ReplaceDestination);
    assert!(!proposal.auto_apply);
    assert_eq!(proposal.alternatives.len(), 2);
    assert!(proposal.alternatives.iter().all(|d| d.id != "closed1"));

    let active = engine.active_alerts(&itinerary.id).await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].severity, Severity::High);

    // one high tier notification plus the adjustment announcement
    let notifications = store.notifications().await;
    assert_eq!(notifications.len(), 2);
    assert!(notifications.iter().all(|(user, _)| user == "traveler"));
    assert!(notifications.iter().any(|(_, n)| n.kind == NotificationKind::Adjustment));
    assert_eq!(store.adjustments(&itinerary.id).await.len(), 1);

    let history = assert_ok!(engine.alert_history(&itinerary.id).await);
    assert_eq!(history.len(), 1);
    engine.shutdown().await;
}

#[tokio::test]
async fn test_heavy_traffic_yields_auto_applied_time_adjustment() {
    let itinerary = plan(vec![
        place("t1", "museum", 16.05, 108.21),
        place("t2", "park", 16.06, 108.22),
    ])
    .await;
    let heavy = TrafficReport {
        condition: TrafficCondition::Heavy,
        duration_minutes: 10,
        duration_in_traffic_minutes: 50,
    };
    let catalog = SnapshotCatalog::new()
        .with_traffic("t1", "t2", heavy.clone())
        .with_traffic("t2", "t1", heavy);
    let store = Arc::new(InMemoryAlertStore::new());
    let engine = engine(catalog, store, MonitorConfig::default());

    let report = engine.start(itinerary.clone(), Some("traveler")).await.unwrap();
    assert_eq!(report.alerts.len(), 1);
    assert_eq!(report.alerts[0].alert_type, AlertType::TrafficHeavy);
    assert_eq!(report.alerts[0].severity, Severity::Medium);
    assert_eq!(report.proposals.len(), 1);

    let proposal = &report.proposals[0];
    assert_eq!(proposal.kind, AdjustmentKind::TimeAdjustment);
    assert!(proposal.auto_apply);

    let origin_id = proposal.alert.origin.as_ref().unwrap().id.clone();
    let before = itinerary.days[0]
        .schedule
        .iter()
        .find(|item| item.destination_id() == Some(origin_id.as_str()))
        .unwrap()
        .clone();
    // the delay (40 min) exceeds the default 30 minute shift
    assert_eq!(proposal.suggested_time, Some(before.end_time().sub_minutes(40)));

    let adjusted = engine.itinerary(&itinerary.id).await.unwrap();
    let after = adjusted.days[0]
        .schedule
        .iter()
        .find(|item| item.destination_id() == Some(origin_id.as_str()))
        .unwrap();
    assert_eq!(after.duration_minutes, before.duration_minutes - 40);
    assert!(after.notes.iter().any(|note| note.contains("Khởi hành sớm")));
    assert_eq!(engine.session_status(&itinerary.id).await.unwrap().adjustments_applied, 1);
    engine.shutdown().await;
}

#[tokio::test]
async fn test_persistent_traffic_is_applied_only_once() {
    let itinerary = plan(vec![
        place("t1", "museum", 16.05, 108.21),
        place("t2", "park", 16.06, 108.22),
    ])
    .await;
    let heavy = TrafficReport {
        condition: TrafficCondition::Heavy,
        duration_minutes: 10,
        duration_in_traffic_minutes: 50,
    };
    let catalog = SnapshotCatalog::new()
        .with_traffic("t1", "t2", heavy.clone())
        .with_traffic("t2", "t1", heavy);
    let engine = engine(catalog, Arc::new(InMemoryAlertStore::new()), MonitorConfig::default());

    let first = engine.start(itinerary.clone(), Some("traveler")).await.unwrap();
    let origin_id = first.proposals[0].alert.origin.as_ref().unwrap().id.clone();
    let before = itinerary.days[0]
        .schedule
        .iter()
        .find(|item| item.destination_id() == Some(origin_id.as_str()))
        .unwrap()
        .duration_minutes;

    for _ in 0..3 {
        let report = engine.evaluate_now(&itinerary.id).await.unwrap();
        assert_eq!(report.proposals.len(), 1);
        assert_eq!(report.proposals[0].suggested_time, first.proposals[0].suggested_time);
    }

    let adjusted = engine.itinerary(&itinerary.id).await.unwrap();
    let origin = adjusted.days[0]
        .schedule
        .iter()
        .find(|item| item.destination_id() == Some(origin_id.as_str()))
        .unwrap();
    assert_eq!(origin.duration_minutes, before - 40);
    let early_notes = origin.notes.iter().filter(|note| note.contains("Khởi hành sớm")).count();
    assert_eq!(early_notes, 1);

    let status = engine.session_status(&itinerary.id).await.unwrap();
    assert_eq!(status.cycles, 4);
    assert_eq!(status.adjustments_applied, 1);
    engine.shutdown().await;
}

#[tokio::test]
async fn test_severe_weather_suggests_indoor_alternatives() {
    let itinerary = plan(vec![place("beach1", "beach", 16.06, 108.25)]).await;
    let catalog = SnapshotCatalog::new()
        .with_place(place("alt1", "museum", 16.05, 108.2))
        .with_place(place("mall1", "shopping_mall", 16.07, 108.21))
        .with_weather(
            itinerary_engine::core::DEFAULT_CENTER,
            PlaceWeather {
                current: CurrentConditions {
                    temperature_c: 26.0,
                    condition: "mưa to".to_string(),
                    humidity: Some(95.0),
                },
                forecast: vec![ForecastEntry {
                    time: Some("12:00".to_string()),
                    temperature_c: Some(25.0),
                    precipitation_mm: 25.0,
                }],
                alerts: vec![WeatherWarning {
                    event: "Bão".to_string(),
                    description: "Bão số 6 đổ bộ".to_string(),
                }],
            },
        );
    let engine = engine(catalog, Arc::new(InMemoryAlertStore::new()), MonitorConfig::default());

    let report = engine.evaluate_once(&itinerary).await;
    assert!(report.has_alert(AlertType::WeatherSevere));
    assert!(report.has_alert(AlertType::WeatherRain));
    assert_eq!(report.alerts[0].severity, Severity::High);

    assert_eq!(report.proposals.len(), 1);
    let proposal = &report.proposals[0];
    assert_eq!(proposal.kind, AdjustmentKind::WeatherAdjustment);
    assert!(!proposal.auto_apply);
    let ids: Vec<&str> = proposal.alternatives.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["alt1", "mall1"]);
    assert!(!engine.is_monitoring(&itinerary.id).await);
}

#[derive(Debug, Default)]
struct CountingStatus {
    calls: AtomicUsize,
    delay: Duration,
}

#[async_trait]
impl PlaceStatusProvider for CountingStatus {
    async fn status(&self, _place_id: &str) -> Result<PlaceStatus> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(PlaceStatus {
            business_status: BusinessStatus::Operational,
            open_now: None,
        })
    }
}

#[derive(Debug)]
struct NoPlaces;

#[async_trait]
impl PlaceSearch for NoPlaces {
    async fn search(&self, _query: &itinerary_engine::PlaceQuery) -> Result<Vec<PlaceRecord>> {
        Ok(Vec::new())
    }
}

fn counting_engine(status: Arc<CountingStatus>, config: MonitorConfig) -> MonitoringEngine {
    let providers = Providers::new(Arc::new(NoPlaces)).with_status(status);
    MonitoringEngine::new(providers, config, clock())
}

#[tokio::test]
async fn test_restart_leaves_single_session_and_stop_ends_it() {
    let itinerary = plan(vec![place("s1", "museum", 16.05, 108.21)]).await;
    let status = Arc::new(CountingStatus::default());
    let config = MonitorConfig::default().with_interval(Duration::from_millis(40));
    let engine = counting_engine(status.clone(), config);

    engine.start(itinerary.clone(), None).await;
    engine.start(itinerary.clone(), None).await;
    assert_eq!(engine.monitored().await, vec![itinerary.id.clone()]);

    tokio::time::sleep(Duration::from_millis(150)).await;
    let running = engine.session_status(&itinerary.id).await.unwrap();
    assert_eq!(running.generation, 2);
    assert!(running.cycles >= 2, "ticker should have fired");

    assert!(engine.stop(&itinerary.id).await);
    assert!(!engine.is_monitoring(&itinerary.id).await);
    tokio::time::sleep(Duration::from_millis(20)).await;

    let calls = status.calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(status.calls.load(Ordering::SeqCst), calls, "no cycle may run after stop");
    assert!(!engine.stop(&itinerary.id).await);
}

#[tokio::test]
async fn test_overlapping_cycle_is_skipped() {
    let itinerary = plan(vec![place("s1", "museum", 16.05, 108.21)]).await;
    let status = Arc::new(CountingStatus {
        calls: AtomicUsize::new(0),
        delay: Duration::from_millis(100),
    });
    let engine = counting_engine(status, MonitorConfig::default());
    engine.start(itinerary.clone(), None).await;

    let (first, second) = tokio::join!(engine.evaluate_now(&itinerary.id), engine.evaluate_now(&itinerary.id));
    assert!(first.is_some() != second.is_some(), "exactly one cycle may run");
    assert_eq!(engine.session_status(&itinerary.id).await.unwrap().cycles, 2);
    engine.shutdown().await;
}

#[tokio::test]
async fn test_slow_detector_times_out_without_failing_cycle() {
    let itinerary = plan(vec![place("s1", "museum", 16.05, 108.21)]).await;
    let status = Arc::new(CountingStatus {
        calls: AtomicUsize::new(0),
        delay: Duration::from_millis(500),
    });
    let config = MonitorConfig::default().with_cycle_timeout(Duration::from_millis(50));
    let engine = counting_engine(status, config);

    let report = engine.evaluate_once(&itinerary).await;
    assert_eq!(report.failed_detectors, vec!["place_status".to_string()]);
    assert!(report.alerts.is_empty());
}

#[tokio::test]
async fn test_panicking_subscriber_does_not_block_others() {
    let itinerary = plan(vec![place("closed1", "museum", 16.04, 108.21)]).await;
    let engine = engine(closure_catalog(), Arc::new(InMemoryAlertStore::new()), MonitorConfig::default());

    let received = Arc::new(AtomicUsize::new(0));
    let _noisy = engine.subscribe(|_: &str, _: &[itinerary_engine::Alert]| panic!("subscriber bug"));
    let counter = received.clone();
    let quiet = engine.subscribe(move |_: &str, alerts: &[itinerary_engine::Alert]| {
        counter.fetch_add(alerts.len(), Ordering::SeqCst);
    });

    engine.start(itinerary.clone(), None).await;
    assert_eq!(received.load(Ordering::SeqCst), 1);

    assert!(quiet.unsubscribe());
    engine.evaluate_now(&itinerary.id).await;
    assert_eq!(received.load(Ordering::SeqCst), 1);
    engine.shutdown().await;
}

#[tokio::test]
async fn test_active_alerts_are_replaced_each_cycle() {
    let itinerary = plan(vec![place("closed1", "museum", 16.04, 108.21)]).await;
    let store = Arc::new(InMemoryAlertStore::new());
    let clock = clock();
    let providers = Providers::from_catalog(Arc::new(closure_catalog())).with_alert_store(store.clone());
    let engine = MonitoringEngine::new(providers, MonitorConfig::default(), clock.clone());

    engine.start(itinerary.clone(), None).await;
    assert_eq!(engine.active_alerts(&itinerary.id).await.len(), 1);

    // after the trip nothing is upcoming any more
    clock.set(local("2026-11-30T09:00"));
    let report = engine.evaluate_now(&itinerary.id).await.unwrap();
    assert!(report.alerts.is_empty());
    assert!(engine.active_alerts(&itinerary.id).await.is_empty());
    assert_eq!(store.batch_count(&itinerary.id).await, 1);

    engine.clear_alerts(&itinerary.id).await;
    assert!(engine.active_alerts(&itinerary.id).await.is_empty());
    engine.shutdown().await;
}

#[tokio::test]
async fn test_weekend_crowds_are_reported_the_day_before() {
    let saturday = NaiveDate::from_ymd_opt(2026, 10, 24).unwrap();
    let itinerary = plan_from(saturday, vec![place("s1", "museum", 16.05, 108.21)]).await;
    let friday_noon = Arc::new(FixedClock::new(local("2026-10-23T11:00")));
    let engine = MonitoringEngine::new(
        Providers::new(Arc::new(NoPlaces)),
        MonitorConfig::default(),
        friday_noon.clone(),
    );

    let report = engine.evaluate_once(&itinerary).await;
    assert_eq!(report.alerts.len(), 1);
    let crowd = &report.alerts[0];
    assert_eq!(crowd.alert_type, AlertType::CrowdHigh);
    assert_eq!(crowd.severity, Severity::Low);
    assert!(crowd.message.contains("ngày mai"));
    assert!(report.proposals.is_empty());
    assert!(report.failed_detectors.is_empty());

    // outside peak hours nothing is reported
    friday_noon.set(local("2026-10-23T18:00"));
    assert!(engine.evaluate_once(&itinerary).await.alerts.is_empty());
}

#[tokio::test]
async fn test_price_increase_is_informational() {
    let itinerary = plan(vec![place("s1", "museum", 16.05, 108.21)]).await;
    let catalog = SnapshotCatalog::new().with_price(
        "s1",
        PriceChange {
            old_price: 50_000,
            new_price: 80_000,
        },
    );
    let store = Arc::new(InMemoryAlertStore::new());
    let engine = engine(catalog, store.clone(), MonitorConfig::default());

    let report = engine.start(itinerary.clone(), Some("traveler")).await.unwrap();
    assert!(report.has_alert(AlertType::PricingIncrease));
    assert!(report.alerts.iter().all(|alert| alert.severity == Severity::Low));
    assert!(report.proposals.is_empty());

    let notifications = store.notifications().await;
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].1.severity, Some(Severity::Low));
    assert!(store.adjustments(&itinerary.id).await.is_empty());
    engine.shutdown().await;
}

fn weather_at(temperature_c: f64, condition: &str) -> PlaceWeather {
    PlaceWeather {
        current: CurrentConditions {
            temperature_c,
            condition: condition.to_string(),
            humidity: None,
        },
        forecast: Vec::new(),
        alerts: Vec::new(),
    }
}

#[tokio::test]
async fn test_extreme_temperatures_raise_medium_alerts() {
    let itinerary = plan(vec![place("s1", "museum", 16.05, 108.21)]).await;

    for (temperature, title) in [(39.5, "Cảnh báo nắng nóng"), (3.0, "Cảnh báo lạnh")] {
        let catalog = SnapshotCatalog::new()
            .with_weather(itinerary_engine::core::DEFAULT_CENTER, weather_at(temperature, "trời quang"));
        let engine = engine(catalog, Arc::new(InMemoryAlertStore::new()), MonitorConfig::default());

        let report = engine.evaluate_once(&itinerary).await;
        let alerts: Vec<_> = report
            .alerts
            .iter()
            .filter(|alert| alert.alert_type == AlertType::WeatherTemperature)
            .collect();
        assert_eq!(alerts.len(), 1, "{temperature}°C");
        assert_eq!(alerts[0].severity, Severity::Medium);
        assert_eq!(alerts[0].title, title);
        assert!(report.proposals.is_empty());
    }

    // 38°C and 5°C sit on the thresholds and stay quiet
    for temperature in [38.0, 5.0, 26.0] {
        let catalog = SnapshotCatalog::new()
            .with_weather(itinerary_engine::core::DEFAULT_CENTER, weather_at(temperature, "trời quang"));
        let engine = engine(catalog, Arc::new(InMemoryAlertStore::new()), MonitorConfig::default());
        let report = engine.evaluate_once(&itinerary).await;
        assert!(!report.has_alert(AlertType::WeatherTemperature), "{temperature}°C");
    }
}

fn closed_now_catalog() -> SnapshotCatalog {
    SnapshotCatalog::new().with_status(
        "s1",
        PlaceStatus {
            business_status: BusinessStatus::Operational,
            open_now: Some(false),
        },
    )
}

#[tokio::test]
async fn test_place_closed_now_only_during_visiting_hours_today() {
    let itinerary = plan(vec![place("s1", "museum", 16.05, 108.21)]).await;
    let clock = clock();
    let engine = MonitoringEngine::new(
        Providers::from_catalog(Arc::new(closed_now_catalog())),
        MonitorConfig::default(),
        clock.clone(),
    );

    let report = engine.evaluate_once(&itinerary).await;
    assert_eq!(report.alerts.len(), 1);
    assert_eq!(report.alerts[0].alert_type, AlertType::PlaceClosedNow);
    assert_eq!(report.alerts[0].severity, Severity::Medium);
    assert!(report.proposals.is_empty());

    clock.set(local("2026-10-20T21:00"));
    assert!(!engine.evaluate_once(&itinerary).await.has_alert(AlertType::PlaceClosedNow));

    clock.set(local("2026-10-20T07:30"));
    assert!(!engine.evaluate_once(&itinerary).await.has_alert(AlertType::PlaceClosedNow));
}

#[tokio::test]
async fn test_place_closed_now_ignores_future_days() {
    let tomorrow = NaiveDate::from_ymd_opt(2026, 10, 21).unwrap();
    let itinerary = plan_from(tomorrow, vec![place("s1", "museum", 16.05, 108.21)]).await;
    let engine = MonitoringEngine::new(
        Providers::from_catalog(Arc::new(closed_now_catalog())),
        MonitorConfig::default(),
        clock(),
    );

    let report = engine.evaluate_once(&itinerary).await;
    assert!(!report.has_alert(AlertType::PlaceClosedNow));
}

#[tokio::test]
async fn test_temporarily_closed_place_yields_replacement() {
    let itinerary = plan(vec![place("closed1", "museum", 16.04, 108.21)]).await;
    let catalog = SnapshotCatalog::new()
        .with_place(place("alt1", "museum", 16.05, 108.2))
        .with_status(
            "closed1",
            PlaceStatus {
                business_status: BusinessStatus::ClosedTemporarily,
                open_now: None,
            },
        );
    let engine = engine(catalog, Arc::new(InMemoryAlertStore::new()), MonitorConfig::default());

    let report = engine.evaluate_once(&itinerary).await;
    assert!(report.has_alert(AlertType::PlaceClosedTemporarily));
    assert_eq!(report.alerts[0].severity, Severity::High);
    assert_eq!(report.proposals.len(), 1);
    let proposal = &report.proposals[0];
    assert_eq!(proposal.kind, AdjustmentKind::ReplaceDestination);
    assert!(!proposal.auto_apply);
    assert_eq!(proposal.alternatives[0].id, "alt1");
}

/// Accepts notifications but refuses to record alert history.
#[derive(Debug, Default)]
struct HistoryDown {
    notifications: Mutex<Vec<Notification>>,
    batch_attempts: AtomicUsize,
}

#[async_trait]
impl AlertStore for HistoryDown {
    async fn persist_alert_batch(&self, _batch: &AlertBatch) -> Result<()> {
        self.batch_attempts.fetch_add(1, Ordering::SeqCst);
        Err(PlannerError::Persistence("history table unavailable".to_string()))
    }

    async fn persist_notification(&self, _user_id: &str, notification: &Notification) -> Result<()> {
        self.notifications.lock().unwrap().push(notification.clone());
        Ok(())
    }

    async fn persist_adjustments(&self, _itinerary_id: &str, _proposals: &[AdjustmentProposal]) -> Result<()> {
        Ok(())
    }

    async fn alert_history(&self, _itinerary_id: &str, _limit: usize) -> Result<Vec<AlertBatch>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_history_failure_still_notifies_and_broadcasts() {
    let itinerary = plan(vec![place("closed1", "museum", 16.04, 108.21)]).await;
    let store = Arc::new(HistoryDown::default());
    let providers = Providers::from_catalog(Arc::new(closure_catalog())).with_alert_store(store.clone());
    let engine = MonitoringEngine::new(providers, MonitorConfig::default(), clock());

    let received = Arc::new(AtomicUsize::new(0));
    let counter = received.clone();
    let _subscription = engine.subscribe(move |_: &str, alerts: &[itinerary_engine::Alert]| {
        counter.fetch_add(alerts.len(), Ordering::SeqCst);
    });

    let report = engine.start(itinerary.clone(), Some("traveler")).await.unwrap();
    assert!(report.has_alert(AlertType::PlaceClosedPermanently));

    assert_eq!(store.batch_attempts.load(Ordering::SeqCst), 1);
    let notifications = store.notifications.lock().unwrap().clone();
    assert_eq!(notifications.len(), 2);
    assert!(notifications.iter().any(|n| n.kind == NotificationKind::Adjustment));
    assert_eq!(received.load(Ordering::SeqCst), 1);
    assert_eq!(engine.active_alerts(&itinerary.id).await.len(), 1);
    engine.shutdown().await;
}
