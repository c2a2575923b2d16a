//! Risk detectors run once per evaluation cycle.
//!
//! A detector whose collaborator is not configured finds nothing. Individual
//! lookup failures are skipped; a detector only fails when every lookup it
//! attempted failed.

use crate::config::MonitorConfig;
use crate::error::{PlannerError, Result};
use crate::providers::{PlaceStatusProvider, PricingProvider, TrafficProvider, WeatherProvider};
use crate::types::{
    Alert, AlertType, BusinessStatus, Coordinates, DayPlan, Destination, Itinerary, Severity,
    TrafficCondition,
};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc, Weekday};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

const HEAVY_RAIN_MM: f64 = 10.0;
const HOT_CELSIUS: f64 = 38.0;
const COLD_CELSIUS: f64 = 5.0;
const VISITING_HOURS: std::ops::RangeInclusive<u32> = 8..=20;
const CROWD_PEAK_HOURS: std::ops::RangeInclusive<u32> = 10..=16;

/// Read-only view of an itinerary at one instant.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scan<'a> {
    pub itinerary: &'a Itinerary,
    /// Trip-local wall clock
    pub now: NaiveDateTime,
    pub detected_at: DateTime<Utc>,
    pub config: &'a MonitorConfig,
}

impl<'a> Scan<'a> {
    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }

    /// Days dated within `span` days from today, today included.
    pub fn days_ahead(&self, span: i64) -> impl Iterator<Item = &'a DayPlan> {
        let today = self.today();
        let itinerary = self.itinerary;
        itinerary
            .days
            .iter()
            .filter(move |plan| (0..span).contains(&(plan.date - today).num_days()))
    }

    fn relative_day(&self, date: NaiveDate) -> &'static str {
        if date == self.today() {
            "hôm nay"
        } else {
            "ngày mai"
        }
    }

    fn alert(&self, alert_type: AlertType, severity: Severity, title: &str, message: String) -> Alert {
        Alert::new(alert_type, severity, title, message, self.detected_at)
    }
}

/// Tallies lookups so a detector can tell "nothing found" from "nothing worked".
struct Lookups {
    detector: &'static str,
    attempted: usize,
    failed: usize,
    last_error: Option<PlannerError>,
}

impl Lookups {
    fn new(detector: &'static str) -> Self {
        Self {
            detector,
            attempted: 0,
            failed: 0,
            last_error: None,
        }
    }

    fn record<T>(&mut self, result: Result<T>) -> Option<T> {
        self.attempted += 1;
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(target: "itinerary::monitor", detector = self.detector, error = %err, "lookup failed");
                self.failed += 1;
                self.last_error = Some(err);
                None
            }
        }
    }

    fn finish(self, alerts: Vec<Alert>) -> Result<Vec<Alert>> {
        match self.last_error {
            Some(err) if self.failed == self.attempted => Err(err),
            _ => Ok(alerts),
        }
    }
}

fn payload<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_default()
}

fn located(destination: &Destination) -> Option<Coordinates> {
    destination.coordinates.filter(Coordinates::is_valid)
}

/// Ids minted during normalization cannot be looked up.
fn has_provider_id(destination: &Destination) -> bool {
    !destination.id.starts_with("placeholder:") && !destination.id.starts_with("name:")
}

pub(crate) async fn weather_alerts(scan: &Scan<'_>, provider: Option<&dyn WeatherProvider>) -> Result<Vec<Alert>> {
    let Some(provider) = provider else {
        return Ok(Vec::new());
    };
    let mut lookups = Lookups::new("weather");
    let mut alerts = Vec::new();

    for plan in scan.days_ahead(2) {
        let when = scan.relative_day(plan.date);
        for destination in &plan.destinations {
            let Some(at) = located(destination) else {
                continue;
            };
            let Some(weather) = lookups.record(provider.weather(at).await) else {
                continue;
            };

            if let Some(warning) = weather.alerts.first() {
                alerts.push(
                    scan.alert(
                        AlertType::WeatherSevere,
                        Severity::High,
                        "Cảnh báo thời tiết nghiêm trọng",
                        format!("{}: {}", destination.name, warning.description),
                    )
                    .for_destination(destination, plan.day)
                    .with_data(payload(warning))
                    .with_actions([
                        "Hoãn hoặc thay đổi kế hoạch",
                        "Tìm hoạt động trong nhà",
                        "Theo dõi cập nhật thời tiết",
                    ]),
                );
            }

            if weather.is_rainy() && weather.max_precipitation_mm() > HEAVY_RAIN_MM {
                alerts.push(
                    scan.alert(
                        AlertType::WeatherRain,
                        Severity::Medium,
                        "Cảnh báo mưa lớn",
                        format!("{}: Dự báo mưa lớn {}", destination.name, when),
                    )
                    .for_destination(destination, plan.day)
                    .with_data(payload(&weather.current))
                    .with_actions(["Mang theo ô/áo mưa", "Chọn hoạt động trong nhà", "Kiểm tra giao thông"]),
                );
            }

            let temperature = weather.current.temperature_c;
            if temperature > HOT_CELSIUS || temperature < COLD_CELSIUS {
                let hot = temperature > HOT_CELSIUS;
                let (title, actions) = if hot {
                    (
                        "Cảnh báo nắng nóng",
                        ["Tránh hoạt động ngoài trời 11h-15h", "Mang theo nước uống", "Sử dụng kem chống nắng"],
                    )
                } else {
                    ("Cảnh báo lạnh", ["Mang theo áo ấm", "Kiểm tra giờ mở cửa", "Chuẩn bị đồ giữ ấm"])
                };
                alerts.push(
                    scan.alert(
                        AlertType::WeatherTemperature,
                        Severity::Medium,
                        title,
                        format!("{}: Nhiệt độ {}°C", destination.name, temperature),
                    )
                    .for_destination(destination, plan.day)
                    .with_data(payload(&weather.current))
                    .with_actions(actions),
                );
            }
        }
    }
    lookups.finish(alerts)
}

pub(crate) async fn place_status_alerts(
    scan: &Scan<'_>,
    provider: Option<&dyn PlaceStatusProvider>,
) -> Result<Vec<Alert>> {
    let Some(provider) = provider else {
        return Ok(Vec::new());
    };
    let mut lookups = Lookups::new("place_status");
    let mut alerts = Vec::new();
    let in_visiting_hours = VISITING_HOURS.contains(&scan.now.hour());

    for plan in scan.days_ahead(i64::from(scan.config.upcoming_days)) {
        for destination in plan.destinations.iter().filter(|d| has_provider_id(d)) {
            let Some(status) = lookups.record(provider.status(&destination.id).await) else {
                continue;
            };

            let alert = match status.business_status {
                BusinessStatus::ClosedPermanently => Some(
                    scan.alert(
                        AlertType::PlaceClosedPermanently,
                        Severity::High,
                        "Điểm đến đã đóng cửa vĩnh viễn",
                        format!("{} đã đóng cửa vĩnh viễn", destination.name),
                    )
                    .with_actions([
                        "Tìm điểm đến thay thế",
                        "Cập nhật lịch trình",
                        "Kiểm tra hoàn tiền (nếu đã đặt vé)",
                    ]),
                ),
                BusinessStatus::ClosedTemporarily => Some(
                    scan.alert(
                        AlertType::PlaceClosedTemporarily,
                        Severity::High,
                        "Điểm đến tạm thời đóng cửa",
                        format!("{} tạm thời đóng cửa", destination.name),
                    )
                    .with_actions(["Kiểm tra ngày mở cửa lại", "Tìm điểm đến thay thế", "Liên hệ để xác nhận"]),
                ),
                BusinessStatus::Operational
                    if status.open_now == Some(false) && plan.date == scan.today() && in_visiting_hours =>
                {
                    Some(
                        scan.alert(
                            AlertType::PlaceClosedNow,
                            Severity::Medium,
                            "Điểm đến hiện tại đóng cửa",
                            format!("{} hiện tại đóng cửa", destination.name),
                        )
                        .with_actions([
                            "Kiểm tra giờ mở cửa",
                            "Điều chỉnh thời gian tham quan",
                            "Tham quan điểm khác trước",
                        ]),
                    )
                }
                BusinessStatus::Operational => None,
            };

            if let Some(alert) = alert {
                alerts.push(alert.for_destination(destination, plan.day).with_data(payload(&status)));
            }
        }
    }
    lookups.finish(alerts)
}

/// Legs between consecutive sightseeing stops of today, in visiting order.
pub(crate) async fn traffic_alerts(scan: &Scan<'_>, provider: Option<&dyn TrafficProvider>) -> Result<Vec<Alert>> {
    let Some(provider) = provider else {
        return Ok(Vec::new());
    };
    let mut lookups = Lookups::new("traffic");
    let mut alerts = Vec::new();

    for plan in scan.days_ahead(1) {
        let stops: Vec<&Destination> = plan
            .sightseeing_items()
            .filter_map(|item| item.destination.as_ref())
            .filter(|destination| located(destination).is_some())
            .collect();

        for leg in stops.windows(2) {
            let (origin, destination) = (leg[0], leg[1]);
            let Some(report) = lookups.record(provider.traffic(origin, destination).await) else {
                continue;
            };
            if report.condition != TrafficCondition::Heavy {
                continue;
            }
            alerts.push(
                scan.alert(
                    AlertType::TrafficHeavy,
                    Severity::Medium,
                    "Giao thông ùn tắc",
                    format!("Giao thông từ {} đến {} đang ùn tắc", origin.name, destination.name),
                )
                .for_destination(destination, plan.day)
                .with_origin(origin)
                .with_data(payload(&report))
                .with_actions(["Khởi hành sớm hơn", "Sử dụng tuyến đường khác", "Chọn phương tiện khác"]),
            );
        }
    }
    lookups.finish(alerts)
}

/// Every remaining day, not only the near ones: tickets are often bought ahead.
pub(crate) async fn pricing_alerts(scan: &Scan<'_>, provider: Option<&dyn PricingProvider>) -> Result<Vec<Alert>> {
    let Some(provider) = provider else {
        return Ok(Vec::new());
    };
    let mut lookups = Lookups::new("pricing");
    let mut alerts = Vec::new();
    let today = scan.today();

    for plan in scan.itinerary.days.iter().filter(|plan| plan.date >= today) {
        for destination in plan.destinations.iter().filter(|d| has_provider_id(d)) {
            let Some(Some(change)) = lookups.record(provider.price_change(destination).await) else {
                continue;
            };
            alerts.push(
                scan.alert(
                    AlertType::PricingIncrease,
                    Severity::Low,
                    "Giá vé tăng",
                    format!(
                        "Giá vé tại {} đã tăng {:.0}%",
                        destination.name,
                        change.increase_percent()
                    ),
                )
                .for_destination(destination, plan.day)
                .with_data(payload(&change))
                .with_actions([
                    "Đặt vé ngay để tránh tăng giá thêm",
                    "Tìm ưu đãi/khuyến mãi",
                    "Xem xét điểm đến thay thế",
                ]),
            );
        }
    }
    lookups.finish(alerts)
}

/// Weekend days of today and tomorrow, while the clock is inside peak hours.
pub(crate) async fn crowd_alerts(scan: &Scan<'_>) -> Result<Vec<Alert>> {
    let mut alerts = Vec::new();
    if !CROWD_PEAK_HOURS.contains(&scan.now.hour()) {
        return Ok(alerts);
    }

    for plan in scan.days_ahead(2) {
        if !matches!(plan.date.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }
        let when = scan.relative_day(plan.date);
        for destination in &plan.destinations {
            alerts.push(
                scan.alert(
                    AlertType::CrowdHigh,
                    Severity::Low,
                    "Dự báo đông đúc",
                    format!("{} dự báo rất đông {}", destination.name, when),
                )
                .for_destination(destination, plan.day)
                .with_data(serde_json::json!({ "crowdLevel": "high", "peakHours": "10:00-16:00" }))
                .with_actions([
                    "Đến sớm hơn (trước 10h)",
                    "Đến muộn hơn (sau 16h)",
                    "Đặt vé trước để tránh xếp hàng",
                ]),
            );
        }
    }
    Ok(alerts)
}
