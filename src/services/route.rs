use crate::types::{Destination, PlaceCategory, RouteSummary};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Groups of this size or smaller get nearest-neighbour ordering.
const NEAREST_NEIGHBOUR_LIMIT: usize = 10;
/// Days with more destinations skip geometric ordering entirely.
const CATEGORY_ONLY_THRESHOLD: usize = 15;
const MAX_PER_DAY: usize = 6;
const TRAVEL_MINUTES_PER_KM: f64 = 3.0;

/// Time-of-day class used to order a day's destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeSlot {
    Morning,
    Lunch,
    Afternoon,
    Evening,
    Flexible,
}

impl TimeSlot {
    pub const ORDER: [TimeSlot; 5] = [
        TimeSlot::Morning,
        TimeSlot::Lunch,
        TimeSlot::Afternoon,
        TimeSlot::Evening,
        TimeSlot::Flexible,
    ];
}

/// Orders destinations into a sensible visiting sequence. Never fails: when
/// the time budget runs out it degrades to category-only ordering.
#[derive(Debug, Clone)]
pub struct RouteOptimizer {
    time_budget: Duration,
}

impl Default for RouteOptimizer {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl RouteOptimizer {
    pub fn new(time_budget: Duration) -> Self {
        Self { time_budget }
    }

    pub fn categorize(destination: &Destination) -> TimeSlot {
        let by_category = match destination.category {
            PlaceCategory::TouristAttraction
            | PlaceCategory::Landmark
            | PlaceCategory::Park
            | PlaceCategory::NaturalFeature
            | PlaceCategory::Temple
            | PlaceCategory::Church
            | PlaceCategory::Museum
            | PlaceCategory::ArtGallery
            | PlaceCategory::AmusementPark => Some(TimeSlot::Morning),
            PlaceCategory::Restaurant | PlaceCategory::Food => Some(TimeSlot::Lunch),
            PlaceCategory::ShoppingMall
            | PlaceCategory::Market
            | PlaceCategory::Cafe
            | PlaceCategory::Beach => Some(TimeSlot::Afternoon),
            PlaceCategory::NightClub | PlaceCategory::Bar | PlaceCategory::Entertainment => {
                Some(TimeSlot::Evening)
            }
            _ => None,
        };
        by_category.unwrap_or_else(|| categorize_by_name(&destination.name))
    }

    /// Nearest-neighbour from the first element for small groups, a (lat, lng)
    /// sort for larger ones. Destinations without coordinates keep their order
    /// and go last.
    pub fn order_within_group(&self, destinations: Vec<Destination>) -> Vec<Destination> {
        let (located, unlocated): (Vec<_>, Vec<_>) = destinations
            .into_iter()
            .partition(Destination::has_coordinates);

        let mut ordered = if located.len() <= NEAREST_NEIGHBOUR_LIMIT {
            nearest_neighbour(located)
        } else {
            let mut sorted = located;
            sorted.sort_by(|a, b| {
                let (a, b) = (coords(a), coords(b));
                a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1))
            });
            sorted
        };
        ordered.extend(unlocated);
        ordered
    }

    pub fn optimize_day(&self, destinations: Vec<Destination>) -> Vec<Destination> {
        if destinations.len() > CATEGORY_ONLY_THRESHOLD {
            debug!(
                target: "itinerary::route",
                count = destinations.len(),
                "too many destinations, using category-only ordering"
            );
            return category_only(destinations);
        }

        let started = Instant::now();
        let mut groups = group_by_slot(destinations);
        let mut ordered = Vec::new();

        for slot in TimeSlot::ORDER {
            let group = std::mem::take(&mut groups[slot as usize]);
            if started.elapsed() > self.time_budget {
                warn!(
                    target: "itinerary::route",
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "route optimization exceeded its time budget, degrading"
                );
                ordered.extend(group);
                for rest in groups.iter_mut() {
                    ordered.append(rest);
                }
                return category_only(ordered);
            }
            ordered.extend(self.order_within_group(group));
        }
        ordered
    }

    /// Round-robins each time-of-day class over the days, capping every day at
    /// `min(6, ceil(total / days) + 1)`. A full day passes the item to the next
    /// day with room; items that fit nowhere are dropped.
    pub fn distribute_across_days(
        &self,
        destinations: Vec<Destination>,
        days: usize,
    ) -> Vec<Vec<Destination>> {
        if days == 0 || destinations.is_empty() {
            return vec![Vec::new(); days];
        }

        let total = destinations.len();
        let cap = MAX_PER_DAY.min(total.div_ceil(days) + 1);
        let mut plans: Vec<Vec<Destination>> = vec![Vec::new(); days];
        let mut dropped = 0usize;

        for group in group_by_slot(destinations) {
            for (index, destination) in group.into_iter().enumerate() {
                let target = (0..days)
                    .map(|offset| (index + offset) % days)
                    .find(|day| plans[*day].len() < cap);
                match target {
                    Some(day) => plans[day].push(destination),
                    None => dropped += 1,
                }
            }
        }

        if dropped > 0 {
            warn!(
                target: "itinerary::route",
                dropped, cap, days, "destinations exceed daily capacity"
            );
        }

        for plan in plans.iter_mut() {
            plan.sort_by_key(Self::categorize);
        }
        plans
    }

    /// Great-circle distance along the visiting order plus category diversity.
    pub fn summarize(&self, destinations: &[Destination]) -> RouteSummary {
        let points: Vec<_> = destinations.iter().filter_map(|d| d.coordinates).collect();
        let total_distance_km: f64 = points
            .windows(2)
            .map(|pair| pair[0].haversine_km(&pair[1]))
            .sum();
        let slots: HashSet<TimeSlot> = destinations.iter().map(Self::categorize).collect();

        RouteSummary {
            total_distance_km: (total_distance_km * 10.0).round() / 10.0,
            travel_minutes: (total_distance_km * TRAVEL_MINUTES_PER_KM).round() as u32,
            diversity_score: (slots.len() * 100 / TimeSlot::ORDER.len()) as u32,
        }
    }
}

fn categorize_by_name(name: &str) -> TimeSlot {
    let name = name.to_lowercase();
    let has = |keys: &[&str]| keys.iter().any(|key| name.contains(key));
    if has(&["chùa", "đền", "bảo tàng", "công viên"]) {
        TimeSlot::Morning
    } else if has(&["nhà hàng", "quán ăn"]) {
        TimeSlot::Lunch
    } else if has(&["chợ", "cà phê", "bãi biển"]) {
        TimeSlot::Afternoon
    } else if has(&["bar", "club", "giải trí"]) {
        TimeSlot::Evening
    } else {
        TimeSlot::Flexible
    }
}

fn coords(destination: &Destination) -> (f64, f64) {
    destination
        .coordinates
        .map(|c| (c.lat, c.lng))
        .unwrap_or((f64::MAX, f64::MAX))
}

fn group_by_slot(destinations: Vec<Destination>) -> [Vec<Destination>; 5] {
    let mut groups: [Vec<Destination>; 5] = Default::default();
    for destination in destinations {
        groups[RouteOptimizer::categorize(&destination) as usize].push(destination);
    }
    groups
}

fn category_only(destinations: Vec<Destination>) -> Vec<Destination> {
    group_by_slot(destinations).into_iter().flatten().collect()
}

fn nearest_neighbour(mut remaining: Vec<Destination>) -> Vec<Destination> {
    if remaining.is_empty() {
        return remaining;
    }
    let mut ordered = Vec::with_capacity(remaining.len());
    let mut current = remaining.remove(0);

    while !remaining.is_empty() {
        let here = current.coordinates;
        let next = remaining
            .iter()
            .enumerate()
            .filter_map(|(idx, candidate)| {
                let distance = here?.planar_distance(&candidate.coordinates?);
                Some((idx, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        ordered.push(std::mem::replace(&mut current, remaining.remove(next)));
    }
    ordered.push(current);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coordinates, PlaceRecord};

    fn place(id: &str, types: &[&str], lat: f64, lng: f64) -> Destination {
        Destination::from(PlaceRecord {
            place_id: id.to_string(),
            name: id.to_string(),
            types: types.iter().map(|t| t.to_string()).collect(),
            lat: Some(lat),
            lng: Some(lng),
            ..Default::default()
        })
    }

    fn ids(destinations: &[Destination]) -> Vec<&str> {
        destinations.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn test_categorize_by_category_and_name() {
        assert_eq!(RouteOptimizer::categorize(&place("a", &["museum"], 0.0, 0.0)), TimeSlot::Morning);
        assert_eq!(RouteOptimizer::categorize(&place("b", &["restaurant"], 0.0, 0.0)), TimeSlot::Lunch);
        assert_eq!(RouteOptimizer::categorize(&place("c", &["bar"], 0.0, 0.0)), TimeSlot::Evening);
        assert_eq!(
            RouteOptimizer::categorize(&place("Chợ Hàn", &["zoo"], 0.0, 0.0)),
            TimeSlot::Afternoon
        );
        assert_eq!(RouteOptimizer::categorize(&place("x", &[], 0.0, 0.0)), TimeSlot::Flexible);
    }

    #[test]
    fn test_nearest_neighbour_is_a_permutation() {
        let optimizer = RouteOptimizer::default();
        let input: Vec<_> = (0..10)
            .map(|i| place(&format!("p{i}"), &["park"], 16.0 + ((i * 7) % 10) as f64 * 0.01, 108.0 + i as f64 * 0.003))
            .collect();
        let output = optimizer.order_within_group(input.clone());

        let mut expected = ids(&input);
        let mut actual = ids(&output);
        assert_eq!(actual[0], "p0");
        expected.sort();
        actual.sort();
        assert_eq!(expected, actual);
    }

    #[test]
    fn test_nearest_neighbour_follows_closest_point() {
        let optimizer = RouteOptimizer::default();
        let input = vec![
            place("start", &[], 0.0, 0.0),
            place("far", &[], 0.0, 10.0),
            place("near", &[], 0.0, 1.0),
        ];
        assert_eq!(ids(&optimizer.order_within_group(input)), vec!["start", "near", "far"]);
    }

    #[test]
    fn test_large_group_sorted_and_unlocated_last() {
        let optimizer = RouteOptimizer::default();
        let mut input: Vec<_> = (0..12)
            .map(|i| place(&format!("p{i}"), &[], 20.0 - i as f64, 100.0))
            .collect();
        let mut lost = place("lost", &[], 0.0, 0.0);
        lost.coordinates = None;
        input.insert(0, lost);

        let output = optimizer.order_within_group(input);
        assert_eq!(output.len(), 13);
        assert_eq!(output[0].id, "p11");
        assert_eq!(output.last().map(|d| d.id.as_str()), Some("lost"));
    }

    #[test]
    fn test_optimize_day_orders_by_time_slot() {
        let optimizer = RouteOptimizer::default();
        let output = optimizer.optimize_day(vec![
            place("club", &["night_club"], 16.0, 108.0),
            place("lunch", &["restaurant"], 16.0, 108.0),
            place("temple", &["temple"], 16.0, 108.0),
            place("mall", &["shopping_mall"], 16.0, 108.0),
        ]);
        assert_eq!(ids(&output), vec!["temple", "lunch", "mall", "club"]);
    }

    #[test]
    fn test_zero_budget_degrades_without_losing_items() {
        let optimizer = RouteOptimizer::new(Duration::ZERO);
        let input: Vec<_> = (0..8).map(|i| place(&format!("p{i}"), &["cafe"], 16.0, 108.0 + i as f64)).collect();
        assert_eq!(optimizer.optimize_day(input).len(), 8);
    }

    #[test]
    fn test_distribute_respects_cap_and_keeps_all() {
        let optimizer = RouteOptimizer::default();
        let input: Vec<_> = (0..10)
            .map(|i| {
                let kind = if i < 7 { "museum" } else { "restaurant" };
                place(&format!("p{i}"), &[kind], 16.0, 108.0)
            })
            .collect();
        let days = optimizer.distribute_across_days(input, 3);

        assert_eq!(days.len(), 3);
        assert!(days.iter().all(|day| day.len() <= 5));
        assert_eq!(days.iter().map(Vec::len).sum::<usize>(), 10);
    }

    #[test]
    fn test_summary_distance_and_diversity() {
        let optimizer = RouteOptimizer::default();
        let mut a = place("a", &["museum"], 16.0, 108.0);
        a.coordinates = Some(Coordinates::new(16.0, 108.0));
        let b = place("b", &["restaurant"], 16.1, 108.0);
        let summary = optimizer.summarize(&[a, b]);
        assert!(summary.total_distance_km > 10.0 && summary.total_distance_km < 12.0);
        assert_eq!(summary.diversity_score, 40);
    }
}
