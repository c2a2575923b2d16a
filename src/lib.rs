//! itinerary-engine: multi-day trip scheduling, route ordering, budget
//! reconciliation and live monitoring of finished plans.
//!
//! Candidate places, weather and traffic come from collaborators implementing
//! the traits in [`providers`]; the engine turns them into a time-blocked,
//! costed [`Itinerary`] and can keep re-evaluating it in the background.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use itinerary_engine::{ItineraryAssembler, Providers, SnapshotCatalog, TripPreferences};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = Arc::new(SnapshotCatalog::load("catalog.json").await?);
//!     let preferences: TripPreferences =
//!         itinerary_engine::schema::parse_document(&std::fs::read_to_string("trip.json")?)?;
//!
//!     let assembler = ItineraryAssembler::new(Providers::from_catalog(catalog));
//!     let itinerary = assembler.assemble(preferences, None).await?;
//!     println!("{}", itinerary.render());
//!     Ok(())
//! }
//! ```

extern crate self as itinerary_engine;

pub mod config;
pub mod core;
pub mod error;
pub mod providers;
pub mod schema;
pub(crate) mod services;
pub mod types;

pub use crate::core::{
    Clock, FixedClock, ItineraryAssembler, MonitoringEngine, SessionStatus, Subscription,
    SystemClock,
};
pub use config::{AssemblerConfig, MonitorConfig, PricingTable};
pub use error::{PlannerError, Result};
pub use itinerary_macros::document_schema;
pub use providers::{InMemoryAlertStore, PlaceQuery, Providers, SnapshotCatalog};
pub use schema::{parse_document, validate_document, DocumentSchema, SchemaHandle};
pub use services::{
    advance_time, group_discount, parse_duration_label, BudgetAllocator, DayPlanScheduler,
    DayRequest, MealPicks, RouteOptimizer, TimeSlot,
};
pub use types::{
    AdjustmentKind, AdjustmentProposal, Alert, AlertBatch, AlertType, CostBreakdown, DayPlan,
    Destination, EvaluationReport, Itinerary, Severity, TripPreferences,
};

#[cfg(feature = "cli")]
pub mod cli;
