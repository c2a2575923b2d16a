use crate::config::PricingTable;
use crate::error::{PlannerError, Result};
use crate::services::route::RouteOptimizer;
use crate::types::{
    ClockTime, DayCost, DayPlan, Destination, ItemKind, Money, PlaceCategory, ScheduleItem,
    TripPreferences, WeatherSnapshot, WorkingBlock, WorkingLocation,
};
use chrono::NaiveDate;
use tracing::{debug, warn};

const END_OF_DAY: ClockTime = ClockTime::from_hm(22, 0);
const DINNER_TIME: ClockTime = ClockTime::from_hm(18, 0);
const EVENING_FREE_TIME: ClockTime = ClockTime::from_hm(20, 0);
const ARRIVAL_DEPARTURE: ClockTime = ClockTime::from_hm(6, 30);
const ARRIVAL_CHECK_IN: ClockTime = ClockTime::from_hm(12, 30);
const ARRIVAL_SIGHTSEEING: ClockTime = ClockTime::from_hm(14, 0);
const HOTEL_BREAKFAST: ClockTime = ClockTime::from_hm(7, 0);
const LATEST_EVENING_VISIT: ClockTime = ClockTime::from_hm(21, 0);
const LUNCH_EARLIEST: ClockTime = ClockTime::from_hm(11, 0);
const LUNCH_START: ClockTime = ClockTime::from_hm(12, 0);
const LUNCH_END: ClockTime = ClockTime::from_hm(13, 0);
const LUNCH_MINUTES: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meal {
    Breakfast,
    Lunch,
    Dinner,
}

impl Meal {
    fn label(&self) -> &'static str {
        match self {
            Meal::Breakfast => "Ăn sáng",
            Meal::Lunch => "Ăn trưa",
            Meal::Dinner => "Ăn tối",
        }
    }

    fn default_venue(&self) -> &'static str {
        match self {
            Meal::Breakfast => "khách sạn",
            Meal::Lunch | Meal::Dinner => "nhà hàng địa phương",
        }
    }

    fn base_cost(&self, pricing: &PricingTable) -> Money {
        match self {
            Meal::Breakfast => pricing.breakfast,
            Meal::Lunch => pricing.lunch,
            Meal::Dinner => pricing.dinner,
        }
    }
}

/// Restaurants picked for one day's meals.
#[derive(Debug, Clone, Default)]
pub struct MealPicks {
    pub breakfast: Option<Destination>,
    pub lunch: Option<Destination>,
    pub dinner: Option<Destination>,
}

impl MealPicks {
    fn pick(&self, meal: Meal) -> Option<&Destination> {
        match meal {
            Meal::Breakfast => self.breakfast.as_ref(),
            Meal::Lunch => self.lunch.as_ref(),
            Meal::Dinner => self.dinner.as_ref(),
        }
    }
}

/// Everything needed to schedule one day.
#[derive(Debug, Clone)]
pub struct DayRequest<'a> {
    pub day: u32,
    pub preferences: &'a TripPreferences,
    /// Candidate destinations for the day, in any order
    pub destinations: Vec<Destination>,
    pub meals: MealPicks,
    pub weather: Option<WeatherSnapshot>,
}

impl DayRequest<'_> {
    fn date(&self) -> NaiveDate {
        self.preferences.date_of_day(self.day)
    }
}

/// Accumulates schedule items together with their per-person cost.
struct DraftDay<'a> {
    pricing: &'a PricingTable,
    multiplier: f64,
    meals: &'a MealPicks,
    items: Vec<ScheduleItem>,
    visited: Vec<Destination>,
    food: Money,
    sightseeing: Money,
}

impl<'a> DraftDay<'a> {
    fn new(pricing: &'a PricingTable, multiplier: f64, meals: &'a MealPicks) -> Self {
        Self {
            pricing,
            multiplier,
            meals,
            items: Vec::new(),
            visited: Vec::new(),
            food: 0,
            sightseeing: 0,
        }
    }

    fn meal(&mut self, at: ClockTime, meal: Meal, minutes: u32, note: Option<&str>) -> ClockTime {
        let meals = self.meals;
        let pick = meals.pick(meal);
        let venue = pick.map(|d| d.name.as_str()).unwrap_or(meal.default_venue());
        let mut item = ScheduleItem::new(at, ItemKind::Meal, format!("{} tại {}", meal.label(), venue), minutes);
        if let Some(restaurant) = pick {
            item = item.with_destination(restaurant.clone());
        }
        if let Some(note) = note {
            item = item.with_note(note);
        }
        self.food += pick
            .and_then(|d| d.average_spend)
            .unwrap_or_else(|| self.pricing.round(meal.base_cost(self.pricing) as f64 * self.multiplier));
        let end = item.end_time();
        self.items.push(item);
        end
    }

    fn visit(&mut self, at: ClockTime, destination: Destination, minutes: u32, notes: &[&str]) -> ClockTime {
        self.sightseeing += destination.entry_fee;
        let mut item = ScheduleItem::new(
            at,
            ItemKind::Sightseeing,
            format!("Tham quan {}", destination.name),
            minutes,
        )
        .with_destination(destination.clone());
        for note in notes.iter().filter(|n| !n.is_empty()) {
            item = item.with_note(*note);
        }
        self.visited.push(destination);
        let end = item.end_time();
        self.items.push(item);
        end
    }

    fn block(&mut self, at: ClockTime, kind: ItemKind, activity: impl Into<String>, minutes: u32, notes: &[&str]) -> ClockTime {
        let mut item = ScheduleItem::new(at, kind, activity, minutes);
        for note in notes {
            item = item.with_note(*note);
        }
        let end = item.end_time();
        self.items.push(item);
        end
    }
}

/// Builds one day's time-blocked schedule. Branches on working day versus free day.
#[derive(Debug, Clone)]
pub struct DayPlanScheduler {
    optimizer: RouteOptimizer,
    pricing: PricingTable,
}

impl DayPlanScheduler {
    pub fn new(optimizer: RouteOptimizer, pricing: PricingTable) -> Self {
        Self { optimizer, pricing }
    }

    pub fn optimizer(&self) -> &RouteOptimizer {
        &self.optimizer
    }

    /// The working location reserving time on `date`, if any.
    pub fn working_location<'p>(preferences: &'p TripPreferences, date: NaiveDate) -> Option<&'p WorkingLocation> {
        preferences.working_location_for(date)
    }

    /// Always yields a plan; internal failures produce the minimal fallback day.
    pub fn schedule_day(&self, request: DayRequest<'_>) -> DayPlan {
        let day = request.day;
        let date = request.date();
        let preferences = request.preferences;
        match self.try_schedule_day(request) {
            Ok(plan) => plan,
            Err(err) => {
                warn!(target: "itinerary::schedule", day, error = %err, "using fallback day");
                self.fallback_day(day, date, preferences, &err.to_string())
            }
        }
    }

    pub fn try_schedule_day(&self, request: DayRequest<'_>) -> Result<DayPlan> {
        let date = request.date();
        let preferences = request.preferences;
        let multiplier = self.pricing.style(preferences.travel_style).multiplier;
        let ordered = self.optimizer.optimize_day(request.destinations.clone());
        let mut draft = DraftDay::new(&self.pricing, multiplier, &request.meals);

        let working = Self::working_location(preferences, date);
        let working_block = match working {
            Some(location) => Some(self.build_working_day(&mut draft, location, preferences.start_time, ordered)?),
            None => {
                if ordered.is_empty() {
                    return Err(PlannerError::Schedule(format!(
                        "no destinations available for day {}",
                        request.day
                    )));
                }
                self.build_free_day(&mut draft, request.day, preferences, ordered);
                None
            }
        };

        let DraftDay {
            mut items,
            visited,
            food,
            sightseeing,
            ..
        } = draft;
        items.sort_by_key(|item| item.time);

        let local_transport = self.pricing.style(preferences.travel_style).local_transport_per_day;
        let route = self.optimizer.summarize(&visited);
        let theme = theme_for(request.day, working.is_some(), &visited);
        let mut notes = Vec::new();
        if let Some(location) = working {
            notes.push(format!("Ngày làm việc tại {}", location.name));
            if let Some(extra) = &location.notes {
                notes.push(extra.clone());
            }
        }

        debug!(
            target: "itinerary::schedule",
            day = request.day,
            items = items.len(),
            destinations = visited.len(),
            working = working.is_some(),
            "day scheduled"
        );

        Ok(DayPlan {
            day: request.day,
            date,
            theme,
            is_working_day: working.is_some(),
            working_block,
            destinations: visited,
            schedule: items,
            estimated_cost: DayCost {
                sightseeing,
                food,
                local_transport,
                total: sightseeing + food + local_transport,
            },
            weather: request.weather.unwrap_or_else(WeatherSnapshot::fallback),
            route,
            notes,
            is_fallback: false,
        })
    }

    /// Arrival block on day 1, breakfast otherwise, then sightseeing until dinner.
    fn build_free_day(
        &self,
        draft: &mut DraftDay<'_>,
        day: u32,
        preferences: &TripPreferences,
        ordered: Vec<Destination>,
    ) {
        let mut current = if day == 1 {
            draft.block(
                ARRIVAL_DEPARTURE,
                ItemKind::Transport,
                format!("Khởi hành từ {}", preferences.departure_city),
                30,
                &["Chuẩn bị hành lý", "Kiểm tra giấy tờ"],
            );
            draft.block(
                ARRIVAL_CHECK_IN,
                ItemKind::Accommodation,
                format!("Đến {}, nhận phòng", preferences.destination),
                30,
                &["Check-in khách sạn", "Nghỉ ngơi"],
            );
            ARRIVAL_SIGHTSEEING
        } else {
            let after_breakfast = draft.meal(HOTEL_BREAKFAST, Meal::Breakfast, 45, None);
            preferences.start_time.max(after_breakfast)
        };

        // the arrival day has lunch around check-in
        let mut lunch_added = day == 1;
        for destination in ordered {
            if current >= DINNER_TIME {
                debug!(target: "itinerary::schedule", day, skipped = %destination.name, "no time left before dinner");
                continue;
            }
            if !lunch_added && lunch_due(current, destination.visit_minutes) {
                current = draft.meal(current, Meal::Lunch, LUNCH_MINUTES, None);
                lunch_added = true;
                if current >= DINNER_TIME {
                    continue;
                }
            }
            let minutes = destination
                .visit_minutes
                .min(current.minutes_until(DINNER_TIME) as u32);
            current = draft.visit(current, destination, minutes, &[]);
        }

        if !lunch_added {
            let at = current.max(LUNCH_START);
            if at.add_minutes(LUNCH_MINUTES) <= DINNER_TIME {
                draft.meal(at, Meal::Lunch, LUNCH_MINUTES, None);
            }
        }

        draft.meal(DINNER_TIME, Meal::Dinner, 90, None);
        draft.block(
            EVENING_FREE_TIME,
            ItemKind::FreeTime,
            "Tự do khám phá, dạo phố, mua sắm",
            120,
            &["Dạo chợ đêm", "Uống cà phê", "Chụp ảnh đêm"],
        );
    }

    /// Fills the windows before and after the immutable work block by tier.
    fn build_working_day(
        &self,
        draft: &mut DraftDay<'_>,
        location: &WorkingLocation,
        departure: ClockTime,
        ordered: Vec<Destination>,
    ) -> Result<WorkingBlock> {
        let (work_start, work_end) = (location.start_time, location.end_time);
        if work_end <= work_start {
            return Err(PlannerError::Schedule(format!(
                "work block at {} ends before it starts",
                location.name
            )));
        }

        let mut pool = ordered.into_iter();
        let morning_window = departure.minutes_until(work_start);
        let mut current = departure;

        if morning_window >= 180 {
            current = draft.meal(current, Meal::Breakfast, 45, Some("Bắt đầu ngày mới với bữa sáng ngon"));
            for idx in 0..2 {
                let remaining = current.minutes_until(work_start);
                if remaining <= 0 {
                    break;
                }
                let Some(destination) = pool.next() else {
                    break;
                };
                let minutes = destination.visit_minutes.min(remaining as u32);
                let note = if idx == 0 { "Nên chọn địa điểm gần nơi làm việc" } else { "" };
                current = draft.visit(current, destination, minutes, &["Tham quan trước giờ làm", note]);
            }
        } else if morning_window >= 120 {
            current = draft.meal(current, Meal::Breakfast, 45, Some("Ăn sáng nhẹ trước khi đi làm"));
            if let Some(destination) = pool.next() {
                let minutes = 60u32.min(current.minutes_until(work_start).max(0) as u32);
                draft.visit(current, destination, minutes, &["Tham quan nhanh trước giờ làm"]);
            }
        } else if morning_window >= 60 {
            draft.meal(current, Meal::Breakfast, 30, Some("Ăn sáng nhanh trước giờ làm"));
        }

        let work_minutes = work_start.minutes_until(work_end) as u32;
        let mut work = ScheduleItem::new(
            work_start,
            ItemKind::Work,
            format!("💼 Làm việc tại {}", location.name),
            work_minutes,
        )
        .with_note("⚠️ Thời gian làm việc - KHÔNG có gợi ý du lịch")
        .with_note(
            location
                .notes
                .clone()
                .unwrap_or_else(|| "Nhớ mang theo tài liệu làm việc".to_string()),
        );
        work.is_work_time = true;
        draft.items.push(work);

        let evening_window = work_end.minutes_until(END_OF_DAY);
        let mut current = work_end;
        if evening_window >= 180 {
            current = draft.meal(current, Meal::Dinner, 90, Some("Thưởng thức ẩm thực sau ngày làm việc"));
            for _ in 0..2 {
                if current >= LATEST_EVENING_VISIT {
                    break;
                }
                let Some(destination) = pool.next() else {
                    break;
                };
                let minutes = destination
                    .visit_minutes
                    .min(current.minutes_until(END_OF_DAY) as u32);
                current = draft.visit(current, destination, minutes, &["Hoạt động tối sau giờ làm"]);
            }
            let left = current.minutes_until(END_OF_DAY);
            if left >= 30 {
                draft.block(
                    current,
                    ItemKind::FreeTime,
                    "Tự do khám phá, dạo phố, mua sắm",
                    left.min(120) as u32,
                    &["Thời gian tự do sau ngày làm việc"],
                );
            }
        } else if evening_window >= 120 {
            current = draft.meal(current, Meal::Dinner, 60, None);
            if let Some(destination) = pool.next() {
                let minutes = 60u32.min(current.minutes_until(END_OF_DAY).max(0) as u32);
                draft.visit(current, destination, minutes, &["Tham quan nhanh buổi tối"]);
            }
        } else if evening_window >= 60 {
            draft.meal(current, Meal::Dinner, 45, Some("Nghỉ ngơi sau ngày làm việc dài"));
        }

        Ok(WorkingBlock {
            location_name: location.name.clone(),
            address: location.address.clone(),
            coordinates: location.coordinates,
            start: work_start,
            end: work_end,
            notes: location.notes.clone(),
        })
    }

    /// Breakfast, one generic sightseeing placeholder and dinner.
    pub fn fallback_day(&self, day: u32, date: NaiveDate, preferences: &TripPreferences, reason: &str) -> DayPlan {
        let multiplier = self.pricing.style(preferences.travel_style).multiplier;
        let placeholder = Destination::placeholder(&preferences.destination);
        let breakfast = self.pricing.round(self.pricing.breakfast as f64 * multiplier);
        let dinner = self.pricing.round(self.pricing.dinner as f64 * multiplier);
        let local_transport = self.pricing.style(preferences.travel_style).local_transport_per_day;
        let sightseeing = self.pricing.default_entry_fee;

        let schedule = vec![
            ScheduleItem::new(HOTEL_BREAKFAST, ItemKind::Meal, "Ăn sáng tại khách sạn", 45),
            ScheduleItem::new(
                ClockTime::from_hm(9, 0),
                ItemKind::Sightseeing,
                format!("Tham quan {}", placeholder.name),
                placeholder.visit_minutes,
            )
            .with_destination(placeholder)
            .with_note("Lịch trình dự phòng, vui lòng cập nhật địa điểm"),
            ScheduleItem::new(DINNER_TIME, ItemKind::Meal, "Ăn tối tại nhà hàng địa phương", 90),
        ];

        DayPlan {
            day,
            date,
            theme: "Khám phá địa điểm nổi bật".to_string(),
            is_working_day: false,
            working_block: None,
            destinations: Vec::new(),
            schedule,
            estimated_cost: DayCost {
                sightseeing,
                food: breakfast + dinner,
                local_transport,
                total: sightseeing + breakfast + dinner + local_transport,
            },
            weather: WeatherSnapshot::fallback(),
            route: Default::default(),
            notes: vec![reason.to_string()],
            is_fallback: true,
        }
    }
}

fn theme_for(day: u32, is_working_day: bool, destinations: &[Destination]) -> String {
    if is_working_day {
        return "Công tác & Khám phá".to_string();
    }
    if day == 1 {
        return "Khám phá & Làm quen".to_string();
    }

    let mut culture = 0;
    let mut nature = 0;
    let mut food = 0;
    for destination in destinations {
        match destination.category {
            PlaceCategory::Museum
            | PlaceCategory::ArtGallery
            | PlaceCategory::Temple
            | PlaceCategory::Church
            | PlaceCategory::Landmark => culture += 1,
            PlaceCategory::Park | PlaceCategory::NaturalFeature | PlaceCategory::Beach => nature += 1,
            PlaceCategory::Restaurant | PlaceCategory::Food | PlaceCategory::Cafe | PlaceCategory::Market => food += 1,
            _ => {}
        }
    }

    let theme = if culture > 0 && culture >= nature && culture >= food {
        "Văn hóa & Lịch sử"
    } else if nature > 0 && nature >= food {
        "Thiên nhiên & Thư giãn"
    } else if food > 0 {
        "Ẩm thực & Trải nghiệm"
    } else {
        "Khám phá địa điểm nổi bật"
    };
    theme.to_string()
}

/// Lunch goes in before a visit once noon has passed, or when a late-morning
/// visit would run past the lunch window.
fn lunch_due(current: ClockTime, visit_minutes: u32) -> bool {
    if current.add_minutes(LUNCH_MINUTES) > DINNER_TIME {
        return false;
    }
    current >= LUNCH_START
        || (current >= LUNCH_EARLIEST && current.minutes() + visit_minutes > LUNCH_END.minutes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PlaceRecord, TravelStyle, TripType};

    fn preferences() -> TripPreferences {
        TripPreferences {
            destination: "Đà Nẵng".to_string(),
            destination_coordinates: None,
            departure_city: "Hà Nội".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
            duration_days: 3,
            travelers: 2,
            budget: 10_000_000,
            travel_style: TravelStyle::Standard,
            interests: Default::default(),
            start_time: ClockTime::from_hm(8, 0),
            trip_type: TripType::PureTravel,
            working_locations: Vec::new(),
            selected_destinations: Vec::new(),
        }
    }

    fn place(id: &str, types: &[&str], minutes: &str, lng: f64) -> Destination {
        Destination::from(PlaceRecord {
            place_id: id.to_string(),
            name: id.to_string(),
            types: types.iter().map(|t| t.to_string()).collect(),
            lat: Some(16.05),
            lng: Some(lng),
            duration_label: Some(minutes.to_string()),
            entry_fee: Some(40_000),
            ..Default::default()
        })
    }

    fn scheduler() -> DayPlanScheduler {
        DayPlanScheduler::new(RouteOptimizer::default(), PricingTable::default())
    }

    fn request(prefs: &TripPreferences, day: u32, destinations: Vec<Destination>) -> DayRequest<'_> {
        DayRequest {
            day,
            preferences: prefs,
            destinations,
            meals: MealPicks::default(),
            weather: None,
        }
    }

    #[test]
    fn test_first_day_has_arrival_block() {
        let prefs = preferences();
        let plan = scheduler().schedule_day(request(&prefs, 1, vec![place("museum", &["museum"], "2 giờ", 108.2)]));

        assert!(!plan.is_fallback);
        assert!(plan.is_time_sorted());
        assert_eq!(plan.schedule[0].kind, ItemKind::Transport);
        assert_eq!(plan.schedule[0].time.to_string(), "06:30");
        assert_eq!(plan.schedule[1].kind, ItemKind::Accommodation);
        let visit = plan.sightseeing_items().next().unwrap();
        assert_eq!(visit.time.to_string(), "14:00");
        assert_eq!(plan.theme, "Khám phá & Làm quen");
    }

    #[test]
    fn test_free_day_injects_lunch_once() {
        let prefs = preferences();
        let destinations = vec![
            place("a", &["park"], "2 giờ", 108.20),
            place("b", &["park"], "2 giờ", 108.21),
            place("c", &["shopping_mall"], "1 giờ", 108.22),
        ];
        let plan = scheduler().schedule_day(request(&prefs, 2, destinations));

        let times: Vec<_> = plan.schedule.iter().map(|i| (i.time.to_string(), i.kind)).collect();
        assert_eq!(times[0], ("07:00".to_string(), ItemKind::Meal));
        assert_eq!(times[1], ("08:00".to_string(), ItemKind::Sightseeing));
        assert_eq!(times[2], ("10:00".to_string(), ItemKind::Sightseeing));
        assert_eq!(times[3], ("12:00".to_string(), ItemKind::Meal));
        assert_eq!(times[4], ("13:00".to_string(), ItemKind::Sightseeing));
        let lunches = plan.schedule.iter().filter(|i| i.activity.starts_with("Ăn trưa")).count();
        assert_eq!(lunches, 1);
        assert_eq!(plan.estimated_cost.sightseeing, 120_000);
        assert_eq!(plan.estimated_cost.food, 50_000 + 100_000 + 150_000);
        assert_eq!(plan.estimated_cost.local_transport, 150_000);
    }

    #[test]
    fn test_free_day_with_four_long_visits_gets_lunch_at_noon() {
        let prefs = preferences();
        let destinations = (0..4)
            .map(|i| place(&format!("p{i}"), &["park"], "2 giờ", 108.20 + i as f64 * 0.01))
            .collect();
        let plan = scheduler().schedule_day(request(&prefs, 2, destinations));

        assert!(plan.is_time_sorted());
        let lunches: Vec<_> = plan
            .schedule
            .iter()
            .filter(|i| i.activity.starts_with("Ăn trưa"))
            .collect();
        assert_eq!(lunches.len(), 1);
        assert_eq!(lunches[0].time, ClockTime::from_hm(12, 0));
        assert_eq!(plan.sightseeing_items().count(), 4);
        assert_eq!(plan.sightseeing_items().last().unwrap().end_time(), ClockTime::from_hm(17, 0));
    }

    #[test]
    fn test_late_morning_visit_waits_for_lunch() {
        let prefs = preferences();
        let destinations = vec![
            place("a", &["park"], "3 giờ", 108.20),
            place("b", &["park"], "3 giờ", 108.21),
        ];
        let plan = scheduler().schedule_day(request(&prefs, 2, destinations));

        let times: Vec<_> = plan.schedule.iter().map(|i| (i.time.to_string(), i.kind)).collect();
        assert_eq!(times[1], ("08:00".to_string(), ItemKind::Sightseeing));
        assert_eq!(times[2], ("11:00".to_string(), ItemKind::Meal));
        assert_eq!(times[3], ("12:00".to_string(), ItemKind::Sightseeing));
    }

    #[test]
    fn test_free_day_stops_sightseeing_at_dinner() {
        let prefs = preferences();
        let destinations = (0..5)
            .map(|i| place(&format!("zoo{i}"), &["zoo"], "4 giờ", 108.2 + i as f64 * 0.01))
            .collect();
        let plan = scheduler().schedule_day(request(&prefs, 2, destinations));

        assert!(plan.is_time_sorted());
        let last_visit = plan.sightseeing_items().last().unwrap();
        assert!(last_visit.end_time() <= DINNER_TIME);
        assert!(plan.destinations.len() < 5);
    }

    #[test]
    fn test_working_day_reserves_work_block() {
        let mut prefs = preferences();
        prefs.trip_type = TripType::BusinessTravel;
        prefs.start_time = ClockTime::from_hm(6, 0);
        prefs.working_locations.push(WorkingLocation {
            id: "office".to_string(),
            name: "Văn phòng FPT".to_string(),
            address: None,
            coordinates: None,
            start_time: ClockTime::from_hm(9, 0),
            end_time: ClockTime::from_hm(17, 0),
            dates: Vec::new(),
            all_days: true,
            notes: None,
        });
        let destinations = vec![
            place("m1", &["museum"], "1 giờ", 108.20),
            place("m2", &["museum"], "1 giờ", 108.21),
            place("m3", &["museum"], "1 giờ", 108.22),
            place("m4", &["museum"], "1 giờ", 108.23),
        ];
        let plan = scheduler().schedule_day(request(&prefs, 2, destinations));

        assert!(plan.is_working_day);
        let work = plan.schedule.iter().find(|i| i.is_work_time).unwrap();
        assert_eq!(work.time.to_string(), "09:00");
        assert_eq!(work.duration_minutes, 480);
        for item in plan.schedule.iter().filter(|i| !i.is_work_time) {
            let overlaps = item.time < work.end_time() && item.end_time() > work.time;
            assert!(!overlaps, "{} overlaps the work block", item.describe());
        }
        // 3h morning: breakfast + 2 visits; 5h evening: dinner + 2 visits
        assert_eq!(plan.sightseeing_items().count(), 4);
        assert_eq!(plan.theme, "Công tác & Khám phá");
    }

    #[test]
    fn test_short_windows_schedule_little() {
        let mut prefs = preferences();
        prefs.trip_type = TripType::BusinessTravel;
        prefs.start_time = ClockTime::from_hm(8, 0);
        prefs.working_locations.push(WorkingLocation {
            id: "office".to_string(),
            name: "Office".to_string(),
            address: None,
            coordinates: None,
            start_time: ClockTime::from_hm(8, 30),
            end_time: ClockTime::from_hm(21, 0),
            dates: Vec::new(),
            all_days: true,
            notes: None,
        });
        let plan = scheduler().schedule_day(request(&prefs, 2, vec![place("m1", &["museum"], "1 giờ", 108.2)]));

        assert_eq!(plan.sightseeing_items().count(), 0);
        assert_eq!(plan.schedule.len(), 2);
        assert_eq!(plan.schedule[1].kind, ItemKind::Meal);
        assert_eq!(plan.schedule[1].duration_minutes, 45);
    }

    #[test]
    fn test_empty_free_day_falls_back() {
        let prefs = preferences();
        let plan = scheduler().schedule_day(request(&prefs, 2, Vec::new()));

        assert!(plan.is_fallback);
        assert_eq!(plan.schedule.len(), 3);
        assert!(plan.is_time_sorted());
        assert_eq!(plan.schedule[1].kind, ItemKind::Sightseeing);
    }
}
