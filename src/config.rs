use crate::error::{PlannerError, Result};
use crate::types::{Money, TravelStyle};
use std::str::FromStr;
use std::time::Duration;

/// Settings for the background monitoring loop.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    pub interval: Duration,
    /// Upper bound for each detector within one cycle
    pub cycle_timeout: Duration,
    pub history_limit: usize,
    pub alternatives_radius_m: u32,
    pub indoor_radius_m: u32,
    pub max_alternatives: usize,
    pub max_indoor_alternatives: usize,
    /// Look-ahead window of the place-status detector
    pub upcoming_days: u32,
    pub traffic_shift_minutes: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(600),
            cycle_timeout: Duration::from_secs(60),
            history_limit: 50,
            alternatives_radius_m: 30_000,
            indoor_radius_m: 20_000,
            max_alternatives: 3,
            max_indoor_alternatives: 5,
            upcoming_days: 7,
            traffic_shift_minutes: 30,
        }
    }
}

impl MonitorConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_cycle_timeout(mut self, timeout: Duration) -> Self {
        self.cycle_timeout = timeout;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_max_alternatives(mut self, max: usize) -> Self {
        self.max_alternatives = max;
        self
    }

    /// Defaults overridden by `ITINERARY_MONITOR_INTERVAL_SECS`,
    /// `ITINERARY_MONITOR_TIMEOUT_SECS` and `ITINERARY_HISTORY_LIMIT`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(secs) = env_value::<u64>("ITINERARY_MONITOR_INTERVAL_SECS")? {
            if secs == 0 {
                return Err(PlannerError::Config(
                    "ITINERARY_MONITOR_INTERVAL_SECS must be greater than zero".to_string(),
                ));
            }
            config.interval = Duration::from_secs(secs);
        }
        if let Some(secs) = env_value::<u64>("ITINERARY_MONITOR_TIMEOUT_SECS")? {
            config.cycle_timeout = Duration::from_secs(secs);
        }
        if let Some(limit) = env_value::<usize>("ITINERARY_HISTORY_LIMIT")? {
            config.history_limit = limit;
        }
        Ok(config)
    }
}

/// Price table for one travel style. Amounts in VND.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StylePricing {
    pub multiplier: f64,
    pub hotel_per_night: Money,
    pub local_transport_per_day: Money,
    pub intercity_fare: Money,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricingTable {
    pub budget: StylePricing,
    pub standard: StylePricing,
    pub comfort: StylePricing,
    pub luxury: StylePricing,
    pub breakfast: Money,
    pub lunch: Money,
    pub dinner: Money,
    pub default_entry_fee: Money,
    pub misc_per_person_day: Money,
    /// Every component is rounded to this many currency units
    pub rounding: Money,
    /// Contingency share of the subtotal, in percent
    pub contingency_percent: u32,
}

impl Default for PricingTable {
    fn default() -> Self {
        Self {
            budget: StylePricing {
                multiplier: 0.7,
                hotel_per_night: 150_000,
                local_transport_per_day: 50_000,
                intercity_fare: 200_000,
            },
            standard: StylePricing {
                multiplier: 1.0,
                hotel_per_night: 300_000,
                local_transport_per_day: 150_000,
                intercity_fare: 400_000,
            },
            comfort: StylePricing {
                multiplier: 1.4,
                hotel_per_night: 600_000,
                local_transport_per_day: 200_000,
                intercity_fare: 1_200_000,
            },
            luxury: StylePricing {
                multiplier: 2.2,
                hotel_per_night: 1_500_000,
                local_transport_per_day: 800_000,
                intercity_fare: 3_000_000,
            },
            breakfast: 50_000,
            lunch: 100_000,
            dinner: 150_000,
            default_entry_fee: 50_000,
            misc_per_person_day: 30_000,
            rounding: 1_000,
            contingency_percent: 5,
        }
    }
}

impl PricingTable {
    pub fn style(&self, style: TravelStyle) -> &StylePricing {
        match style {
            TravelStyle::Budget => &self.budget,
            TravelStyle::Standard => &self.standard,
            TravelStyle::Comfort => &self.comfort,
            TravelStyle::Luxury => &self.luxury,
        }
    }

    /// Rounds to the configured granularity, half away from zero.
    pub fn round(&self, amount: f64) -> Money {
        let unit = self.rounding.max(1) as f64;
        ((amount / unit).round() * unit) as Money
    }
}

/// Settings for itinerary assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblerConfig {
    pub destinations_per_day: usize,
    pub search_radius_m: u32,
    pub region_hint: String,
    /// Wall-clock budget for ordering one day's destinations
    pub optimizer_budget: Duration,
    pub pricing: PricingTable,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            destinations_per_day: 4,
            search_radius_m: 15_000,
            region_hint: "vn".to_string(),
            optimizer_budget: Duration::from_secs(5),
            pricing: PricingTable::default(),
        }
    }
}

impl AssemblerConfig {
    pub fn with_destinations_per_day(mut self, count: usize) -> Self {
        self.destinations_per_day = count;
        self
    }

    pub fn with_search_radius(mut self, meters: u32) -> Self {
        self.search_radius_m = meters;
        self
    }

    pub fn with_region_hint(mut self, region: impl Into<String>) -> Self {
        self.region_hint = region.into();
        self
    }

    pub fn with_optimizer_budget(mut self, budget: Duration) -> Self {
        self.optimizer_budget = budget;
        self
    }

    pub fn with_pricing(mut self, pricing: PricingTable) -> Self {
        self.pricing = pricing;
        self
    }

    /// Defaults overridden by `ITINERARY_DESTINATIONS_PER_DAY`,
    /// `ITINERARY_SEARCH_RADIUS_M` and `ITINERARY_REGION_HINT`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(count) = env_value::<usize>("ITINERARY_DESTINATIONS_PER_DAY")? {
            if count == 0 {
                return Err(PlannerError::Config(
                    "ITINERARY_DESTINATIONS_PER_DAY must be greater than zero".to_string(),
                ));
            }
            config.destinations_per_day = count;
        }
        if let Some(radius) = env_value::<u32>("ITINERARY_SEARCH_RADIUS_M")? {
            config.search_radius_m = radius;
        }
        if let Ok(region) = std::env::var("ITINERARY_REGION_HINT") {
            if !region.trim().is_empty() {
                config.region_hint = region.trim().to_string();
            }
        }
        Ok(config)
    }
}

fn env_value<T: FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            PlannerError::Config(format!("{} has an invalid value `{}`", key, raw))
        }),
        Err(_) => Ok(None),
    }
}
