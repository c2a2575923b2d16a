pub mod budget;
pub mod candidates;
pub mod route;
pub mod schedule;
pub mod timing;

pub use budget::{group_discount, BudgetAllocator};
pub use candidates::{day_search_categories, pick_meals, CandidateSelector};
pub use route::{RouteOptimizer, TimeSlot};
pub use schedule::{DayPlanScheduler, DayRequest, MealPicks};
pub use timing::{advance_time, parse_duration_label, DEFAULT_DURATION_MINUTES};
