use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Whole currency units (VND).
pub type Money = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransportCost {
    pub intercity: Money,
    pub local: Money,
    pub total: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccommodationCost {
    pub total: Money,
    pub per_night: Money,
    pub nights: u32,
    pub rooms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FoodCost {
    pub total: Money,
    pub per_day: Money,
    pub per_person: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SightseeingCost {
    pub total: Money,
    pub per_person: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contingency {
    pub amount: Money,
    pub percentage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    pub within_budget: bool,
    /// `budget - grandTotal`; negative when over budget
    pub difference: Money,
    /// Share of the budget consumed by the grand total
    pub percentage: u32,
}

/// Reconciled trip cost. `grand_total == subtotal + contingency.amount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub transport: TransportCost,
    pub accommodation: AccommodationCost,
    pub food: FoodCost,
    pub sightseeing: SightseeingCost,
    pub misc: Money,
    pub subtotal: Money,
    pub contingency: Contingency,
    pub grand_total: Money,
    pub per_person: Money,
    pub budget_status: BudgetStatus,
}
