//! Persisted plan records and pipeline output types.

use core::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::plan::trip::TripRequest;

/// Identifier of a persisted plan record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanId(pub Uuid);

impl PlanId {
    /// Create a new random identifier.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlanId {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for PlanId {
    #[inline]
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Budget range combined from independent point estimates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetRange {
    /// Lowest estimate.
    pub min: u64,
    /// Highest estimate.
    pub max: u64,
}

impl BudgetRange {
    /// Reduce a set of point estimates to its min/max span.
    ///
    /// Order-independent; a single estimate degenerates to `min == max`.
    /// Returns `None` for an empty set.
    #[must_use]
    pub fn from_estimates(estimates: &[u64]) -> Option<Self> {
        let mut iter = estimates.iter().copied();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), e| (lo.min(e), hi.max(e)));
        Some(Self { min, max })
    }
}

/// Successful pipeline output, not yet persisted.
#[derive(Clone, Debug)]
pub struct PlanDraft {
    /// Narrative travel plan text.
    pub plan: String,
    /// Combined budget range.
    pub budget: BudgetRange,
}

/// The persisted aggregate: trip parameters plus pipeline output.
///
/// Created once per submission, never updated in place, deleted by id. A
/// record is only ever built after both pipeline stages have succeeded, so a
/// plan without a budget can never reach the store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanRecord {
    /// Record identifier.
    pub id: PlanId,
    /// Where the trip goes.
    pub destination: String,
    /// Why the trip happens.
    pub purpose: String,
    /// Number of travellers.
    pub people_count: u32,
    /// First day of the trip.
    pub start_date: NaiveDate,
    /// Last day of the trip.
    pub end_date: NaiveDate,
    /// Generated travel plan text.
    pub plan: String,
    /// Combined budget range.
    pub budget: BudgetRange,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl PlanRecord {
    /// Build a record from the submitted trip and the finished draft.
    #[must_use]
    pub fn new(trip: TripRequest, draft: PlanDraft) -> Self {
        Self {
            id: PlanId::new(),
            destination: trip.destination,
            purpose: trip.purpose,
            people_count: trip.people_count,
            start_date: trip.start_date,
            end_date: trip.end_date,
            plan: draft.plan,
            budget: draft.budget,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_reduction_is_order_independent() {
        let range = BudgetRange::from_estimates(&[120_000, 95_000, 150_000]).unwrap();
        assert_eq!(range, BudgetRange { min: 95_000, max: 150_000 });

        let reversed = BudgetRange::from_estimates(&[150_000, 95_000, 120_000]).unwrap();
        assert_eq!(range, reversed);
    }

    #[test]
    fn test_single_estimate_degenerates() {
        let range = BudgetRange::from_estimates(&[80_000]).unwrap();
        assert_eq!(range, BudgetRange { min: 80_000, max: 80_000 });
    }

    #[test]
    fn test_empty_estimates_have_no_range() {
        assert!(BudgetRange::from_estimates(&[]).is_none());
    }

    #[test]
    fn test_record_carries_trip_and_draft() {
        let trip: TripRequest = serde_json::from_str(
            r#"{
                "destination": "Busan",
                "purpose": "vacation",
                "people_count": 2,
                "start_date": "2025-05-01",
                "end_date": "2025-05-04"
            }"#,
        )
        .unwrap();

        let record = PlanRecord::new(
            trip,
            PlanDraft {
                plan: "Visit Haeundae beach on day one.".to_string(),
                budget: BudgetRange { min: 200_000, max: 300_000 },
            },
        );

        assert_eq!(record.destination, "Busan");
        assert_eq!(record.plan, "Visit Haeundae beach on day one.");
        assert_eq!(record.budget, BudgetRange { min: 200_000, max: 300_000 });
    }
}
