use crate::services::schedule::MealPicks;
use crate::types::Destination;
use std::collections::HashSet;

const DAY_CATEGORIES: [&[&str]; 5] = [
    &["tourist_attraction", "landmark"],
    &["restaurant", "food", "local_business"],
    &["museum", "art_gallery", "cultural"],
    &["park", "natural_feature", "outdoor"],
    &["shopping_mall", "market", "entertainment"],
];

const INTEREST_CATEGORIES: [(&str, &[&str]); 4] = [
    ("food", &["restaurant", "cafe", "bakery"]),
    ("culture", &["museum", "temple", "historical"]),
    ("adventure", &["park", "hiking_area", "outdoor"]),
    ("photography", &["scenic_spot", "viewpoint", "landmark"]),
];

/// Search categories for a day: a rotating base set extended by interests, without repeats.
pub fn day_search_categories<'a, I>(day: u32, interests: I) -> Vec<&'static str>
where
    I: IntoIterator<Item = &'a String>,
{
    let base = DAY_CATEGORIES[(day.saturating_sub(1) as usize) % DAY_CATEGORIES.len()];
    let interests: HashSet<&str> = interests.into_iter().map(String::as_str).collect();

    let mut categories: Vec<&'static str> = base.to_vec();
    for (interest, extra) in INTEREST_CATEGORIES {
        if interests.contains(interest) {
            categories.extend_from_slice(extra);
        }
    }

    let mut seen = HashSet::new();
    categories.retain(|category| seen.insert(*category));
    categories
}

/// Hands out destinations so no place appears on two days.
#[derive(Debug, Default)]
pub struct CandidateSelector {
    used: HashSet<String>,
}

impl CandidateSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks destinations as taken, e.g. user-selected ones distributed up front.
    pub fn reserve<'a>(&mut self, destinations: impl IntoIterator<Item = &'a Destination>) {
        self.used
            .extend(destinations.into_iter().map(|d| d.id.clone()));
    }

    /// Best rated open sightseeing candidates not used on an earlier day.
    pub fn take_for_day(&mut self, candidates: Vec<Destination>, count: usize) -> Vec<Destination> {
        let mut fresh: Vec<Destination> = Vec::new();
        for candidate in candidates {
            let duplicate = fresh.iter().any(|d| d.id == candidate.id);
            if candidate.is_open
                && !candidate.category.is_dining()
                && !duplicate
                && !self.used.contains(&candidate.id)
            {
                fresh.push(candidate);
            }
        }

        fresh.sort_by(|a, b| {
            b.rating
                .unwrap_or(0.0)
                .total_cmp(&a.rating.unwrap_or(0.0))
        });
        fresh.truncate(count);
        self.reserve(fresh.iter());
        fresh
    }
}

/// Rotates through the restaurant list so consecutive meals and days differ.
pub fn pick_meals(restaurants: &[Destination], day: u32) -> MealPicks {
    if restaurants.is_empty() {
        return MealPicks::default();
    }
    let offset = (day.saturating_sub(1) as usize) * 3;
    let at = |slot: usize| Some(restaurants[(offset + slot) % restaurants.len()].clone());
    MealPicks {
        breakfast: at(0),
        lunch: at(1),
        dinner: at(2),
    }
}
