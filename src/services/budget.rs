use crate::config::PricingTable;
use crate::types::{
    AccommodationCost, BudgetStatus, Contingency, CostBreakdown, DayPlan, FoodCost, Money,
    SightseeingCost, TransportCost, TripPreferences,
};
use tracing::info;

/// Per-person discount applied to food, local transport and misc for larger groups.
pub fn group_discount(travelers: u32) -> f64 {
    match travelers {
        t if t >= 6 => 0.15,
        4 | 5 => 0.10,
        _ => 0.0,
    }
}

/// Reconciles per-day estimates into one group cost breakdown.
#[derive(Debug, Clone)]
pub struct BudgetAllocator {
    pricing: PricingTable,
}

impl BudgetAllocator {
    pub fn new(pricing: PricingTable) -> Self {
        Self { pricing }
    }

    /// Group totals are recomputed from the per-person day estimates so the
    /// discount is applied exactly once. Every component is rounded before it
    /// is summed.
    pub fn allocate(&self, preferences: &TripPreferences, days: &[DayPlan]) -> CostBreakdown {
        let pricing = &self.pricing;
        let style = pricing.style(preferences.travel_style);
        let travelers = preferences.travelers.max(1);
        let group = f64::from(travelers);
        let discounted = group * (1.0 - group_discount(travelers));
        let duration = preferences.duration_days.max(1);

        let food_per_person: Money = days.iter().map(|d| d.estimated_cost.food).sum();
        let local_per_person: Money = days.iter().map(|d| d.estimated_cost.local_transport).sum();
        let fees_per_person: Money = days.iter().map(|d| d.estimated_cost.sightseeing).sum();

        let intercity = pricing.round(style.intercity_fare as f64 * group);
        let local = pricing.round(local_per_person as f64 * discounted);
        let transport = TransportCost {
            intercity,
            local,
            total: intercity + local,
        };

        let rooms = travelers.div_ceil(2);
        let nights = preferences.nights();
        let accommodation = AccommodationCost {
            total: pricing.round(style.hotel_per_night as f64 * f64::from(nights) * f64::from(rooms)),
            per_night: style.hotel_per_night,
            nights,
            rooms,
        };

        let food_total = pricing.round(food_per_person as f64 * discounted);
        let food = FoodCost {
            total: food_total,
            per_day: pricing.round(food_total as f64 / f64::from(duration)),
            per_person: pricing.round(food_total as f64 / group),
        };

        let sightseeing = SightseeingCost {
            total: pricing.round(fees_per_person as f64 * group),
            per_person: pricing.round(fees_per_person as f64),
        };

        let misc = pricing.round(pricing.misc_per_person_day as f64 * f64::from(duration) * discounted);

        let subtotal = transport.total + accommodation.total + food.total + sightseeing.total + misc;
        let contingency = Contingency {
            amount: (subtotal as f64 * f64::from(pricing.contingency_percent) / 100.0).round() as Money,
            percentage: pricing.contingency_percent,
        };
        let grand_total = subtotal + contingency.amount;

        let budget = preferences.budget;
        let budget_status = BudgetStatus {
            within_budget: grand_total <= budget,
            difference: budget - grand_total,
            percentage: if budget > 0 {
                ((grand_total as f64 / budget as f64) * 100.0).round().min(f64::from(u32::MAX)) as u32
            } else {
                0
            },
        };

        info!(
            target: "itinerary::budget",
            travelers,
            subtotal,
            grand_total,
            within_budget = budget_status.within_budget,
            "cost breakdown reconciled"
        );

        CostBreakdown {
            transport,
            accommodation,
            food,
            sightseeing,
            misc,
            subtotal,
            contingency,
            grand_total,
            per_person: pricing.round(grand_total as f64 / group),
            budget_status,
        }
    }
}
