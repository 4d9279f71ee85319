// --- File: crates/mindmend_common/src/models.rs ---

// Data structures shared by the scheduling logic, the store implementations
// and the HTTP layer.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// A therapist's recurring open hours for one weekday.
///
/// At most one window exists per therapist and weekday. Times are kept as
/// the stored text (`HH:MM` or `HH:MM:SS`).
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub therapist_id: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "Mon"))]
    pub day_of_week: Weekday,
    #[cfg_attr(feature = "openapi", schema(example = "09:00"))]
    pub start_time: String,
    #[cfg_attr(feature = "openapi", schema(example = "17:00"))]
    pub end_time: String,
}

/// A concrete blocked time range: a booked appointment or a manual block.
///
/// Timestamps are carried as stored; parsing happens in the slot
/// calculator so a single bad row can be skipped instead of failing the query.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailabilityRecord {
    pub id: Option<i64>,
    pub therapist_id: String,
    #[cfg_attr(feature = "openapi", schema(example = "2025-05-05T10:00:00Z"))]
    pub start_time: String,
    #[cfg_attr(feature = "openapi", schema(example = "2025-05-05T11:00:00Z"))]
    pub end_time: String,
    #[cfg_attr(feature = "openapi", schema(example = "Booked"))]
    pub reason: Option<String>,
    pub appointment_id: Option<String>,
}

/// One bookable unit within a day.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    #[cfg_attr(feature = "openapi", schema(example = "09:00"))]
    pub start_time: String,
    #[cfg_attr(feature = "openapi", schema(example = "09:30"))]
    pub end_time: String,
}

/// A slot that cannot be booked, with a human-readable reason.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailableSlot {
    #[cfg_attr(feature = "openapi", schema(example = "10:00"))]
    pub start_time: String,
    #[cfg_attr(feature = "openapi", schema(example = "10:30"))]
    pub end_time: String,
    #[cfg_attr(feature = "openapi", schema(example = "Booked"))]
    pub reason: String,
}

/// Result of a free-slot calculation.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeSlots {
    pub available: Vec<Slot>,
    pub unavailable: Vec<UnavailableSlot>,
}

impl FreeSlots {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty() && self.unavailable.is_empty()
    }
}
