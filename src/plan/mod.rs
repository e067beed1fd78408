//! Domain types for trips, plans, and budget ranges.

pub mod record;
pub mod trip;

pub use record::{BudgetRange, PlanDraft, PlanId, PlanRecord};
pub use trip::TripRequest;
