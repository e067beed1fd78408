//! Caller-supplied trip parameters.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Trip parameters submitted by the caller.
///
/// Immutable once handed to the pipeline. Field values are taken as-is; the
/// only gate is the typed JSON decode at the HTTP boundary.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TripRequest {
    /// Where the trip goes.
    pub destination: String,
    /// Why the trip happens (vacation, business, ...).
    pub purpose: String,
    /// Number of travellers.
    pub people_count: u32,
    /// First day of the trip.
    pub start_date: NaiveDate,
    /// Last day of the trip.
    pub end_date: NaiveDate,
}
