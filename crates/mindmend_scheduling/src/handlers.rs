// File: crates/mindmend_scheduling/src/handlers.rs
use crate::error::SchedulingError;
use crate::refund::{scheduled_at_in_zone, RefundPolicy, RefundQuote};
use crate::slots::{compute_free_slots, parse_time_of_day, parse_timestamp, SlotQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{Duration, NaiveDate, SecondsFormat, Utc, Weekday};
use chrono_tz::Tz;
use mindmend_common::{
    config_error, validation_error, AvailabilityWindow, MindmendError, ScheduleStore, Slot,
    UnavailabilityRecord, UnavailableSlot,
};
use mindmend_config::AppConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

// Shared state for the scheduling routes
#[derive(Clone)]
pub struct SchedulingState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ScheduleStore>,
    pub refund_policy: RefundPolicy,
}

impl SchedulingState {
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<dyn ScheduleStore>,
    ) -> Result<Self, SchedulingError> {
        let refund_policy = RefundPolicy::from_config(&config.refund)?;
        for tier in refund_policy.tiers() {
            info!(
                "Refund tier: {}% with at least {}h notice",
                tier.percentage, tier.min_hours_before
            );
        }
        Ok(Self {
            config,
            store,
            refund_policy,
        })
    }

    fn time_zone(&self) -> Result<Tz, MindmendError> {
        self.config
            .scheduling
            .time_zone
            .parse::<Tz>()
            .map_err(|e| config_error(format!("invalid scheduling.time_zone: {}", e)))
    }
}

// --- Data Structures ---
#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct FreeSlotsQuery {
    /// Date in YYYY-MM-DD format
    #[cfg_attr(feature = "openapi", schema(format = "date", example = "2025-05-05"))]
    pub date: String,
    /// Slot width in minutes, defaults to the configured interval
    #[cfg_attr(feature = "openapi", schema(example = 30))]
    pub interval: Option<i64>,
    /// Requested session length in minutes, defaults to the slot width
    #[cfg_attr(feature = "openapi", schema(example = 60))]
    pub session_duration: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FreeSlotsResponse {
    pub therapist_id: String,
    #[cfg_attr(feature = "openapi", schema(example = "2025-05-05"))]
    pub date: String,
    pub interval_minutes: i64,
    pub session_duration_minutes: i64,
    pub available: Vec<Slot>,
    pub unavailable: Vec<UnavailableSlot>,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RefundQuoteRequest {
    /// Appointment date in the practice time zone, YYYY-MM-DD
    #[cfg_attr(feature = "openapi", schema(example = "2025-05-07"))]
    pub appointment_date: String,
    /// Appointment start in the practice time zone, HH:MM
    #[cfg_attr(feature = "openapi", schema(example = "10:00"))]
    pub appointment_time: String,
    /// Amount paid, in minor currency units
    #[cfg_attr(feature = "openapi", schema(example = 10000))]
    pub amount_minor_units: i64,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SetAvailabilityRequest {
    #[cfg_attr(feature = "openapi", schema(example = "09:00"))]
    pub start_time: String,
    #[cfg_attr(feature = "openapi", schema(example = "17:00"))]
    pub end_time: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BlockIntervalRequest {
    #[cfg_attr(feature = "openapi", schema(example = "2025-05-05T10:00:00Z"))]
    pub start_time: String,
    #[cfg_attr(feature = "openapi", schema(example = "2025-05-05T11:00:00Z"))]
    pub end_time: String,
    pub reason: Option<String>,
    pub appointment_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReleaseResponse {
    pub appointment_id: String,
    pub released: u64,
}

fn parse_date(value: &str) -> Result<NaiveDate, MindmendError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| validation_error(format!("Invalid date {:?} (YYYY-MM-DD)", value)))
}

/// Handler to compute free and unavailable slots for one therapist and date.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/therapists/{therapist_id}/free-slots",
    params(
        ("therapist_id" = String, Path, description = "Therapist identifier"),
        FreeSlotsQuery
    ),
    responses(
        (status = 200, description = "Slots for the day", body = FreeSlotsResponse),
        (status = 400, description = "Invalid date, interval or session duration")
    ),
    tag = "Scheduling"
))]
pub async fn get_free_slots_handler(
    State(state): State<Arc<SchedulingState>>,
    Path(therapist_id): Path<String>,
    Query(query): Query<FreeSlotsQuery>,
) -> Result<Json<FreeSlotsResponse>, MindmendError> {
    let scheduling = &state.config.scheduling;
    let date = parse_date(&query.date)?;
    let interval = query.interval.unwrap_or(scheduling.default_interval_minutes);
    let session_duration = query
        .session_duration
        .unwrap_or(scheduling.default_interval_minutes);

    if !scheduling
        .allowed_session_durations
        .contains(&session_duration)
    {
        return Err(validation_error(format!(
            "session_duration must be one of {:?}, got {}",
            scheduling.allowed_session_durations, session_duration
        )));
    }

    let mut slot_query = SlotQuery::new(therapist_id.clone(), date, session_duration)
        .with_interval(interval);
    if let Some(lead) = scheduling.booking_lead_minutes {
        slot_query = slot_query.with_not_before(Utc::now() + Duration::minutes(lead));
    }

    let slots = compute_free_slots(state.store.as_ref(), &slot_query).await?;
    info!(
        "Free slots for therapist {} on {}: {} available, {} unavailable",
        therapist_id,
        date,
        slots.available.len(),
        slots.unavailable.len()
    );

    Ok(Json(FreeSlotsResponse {
        therapist_id,
        date: date.to_string(),
        interval_minutes: interval,
        session_duration_minutes: session_duration,
        available: slots.available,
        unavailable: slots.unavailable,
    }))
}

/// Handler to quote the refund for cancelling an appointment now.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/refunds/quote",
    request_body = RefundQuoteRequest,
    responses(
        (status = 200, description = "Refund quote", body = RefundQuote),
        (status = 400, description = "Invalid date, time or amount")
    ),
    tag = "Scheduling"
))]
pub async fn refund_quote_handler(
    State(state): State<Arc<SchedulingState>>,
    Json(payload): Json<RefundQuoteRequest>,
) -> Result<Json<RefundQuote>, MindmendError> {
    let date = parse_date(&payload.appointment_date)?;
    let time = parse_time_of_day(&payload.appointment_time).ok_or_else(|| {
        validation_error(format!(
            "Invalid appointment_time {:?} (HH:MM)",
            payload.appointment_time
        ))
    })?;
    let scheduled_at = scheduled_at_in_zone(date, time, state.time_zone()?)?;

    let quote = state
        .refund_policy
        .quote(scheduled_at, Utc::now(), payload.amount_minor_units)?;
    info!(
        "Refund quote for session at {}: {}% = {}",
        scheduled_at, quote.percentage, quote.amount_minor_units
    );
    Ok(Json(quote))
}

/// Handler to create or replace a therapist's window for one weekday.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/admin/therapists/{therapist_id}/availability/{weekday}",
    params(
        ("therapist_id" = String, Path, description = "Therapist identifier"),
        ("weekday" = String, Path, description = "Mon..Sun or full day name", example = "Mon")
    ),
    request_body = SetAvailabilityRequest,
    responses(
        (status = 200, description = "Stored window", body = AvailabilityWindow),
        (status = 400, description = "Invalid weekday or times")
    ),
    tag = "Scheduling Admin"
))]
pub async fn set_availability_handler(
    State(state): State<Arc<SchedulingState>>,
    Path((therapist_id, weekday)): Path<(String, String)>,
    Json(payload): Json<SetAvailabilityRequest>,
) -> Result<Json<AvailabilityWindow>, MindmendError> {
    let day_of_week = weekday
        .parse::<Weekday>()
        .map_err(|_| validation_error(format!("Invalid weekday {:?}", weekday)))?;

    let start = parse_time_of_day(&payload.start_time);
    let end = parse_time_of_day(&payload.end_time);
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) if start < end => (start, end),
        (Some(_), Some(_)) => {
            return Err(validation_error("start_time must be before end_time"));
        }
        _ => {
            return Err(validation_error(
                "start_time and end_time must be HH:MM or HH:MM:SS",
            ));
        }
    };

    let window = AvailabilityWindow {
        therapist_id,
        day_of_week,
        start_time: start.format("%H:%M").to_string(),
        end_time: end.format("%H:%M").to_string(),
    };
    let stored = state
        .store
        .upsert_window(window)
        .await
        .map_err(SchedulingError::from)?;
    info!(
        "Availability for therapist {} on {} set to {} - {}",
        stored.therapist_id, stored.day_of_week, stored.start_time, stored.end_time
    );
    Ok(Json(stored))
}

/// Handler to block an interval (booking or manual block).
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/admin/therapists/{therapist_id}/unavailability",
    params(
        ("therapist_id" = String, Path, description = "Therapist identifier")
    ),
    request_body = BlockIntervalRequest,
    responses(
        (status = 201, description = "Stored interval", body = UnavailabilityRecord),
        (status = 400, description = "Invalid timestamps")
    ),
    tag = "Scheduling Admin"
))]
pub async fn block_interval_handler(
    State(state): State<Arc<SchedulingState>>,
    Path(therapist_id): Path<String>,
    Json(payload): Json<BlockIntervalRequest>,
) -> Result<(StatusCode, Json<UnavailabilityRecord>), MindmendError> {
    let (start, end) = match (
        parse_timestamp(&payload.start_time),
        parse_timestamp(&payload.end_time),
    ) {
        (Some(start), Some(end)) if start < end => (start, end),
        (Some(_), Some(_)) => {
            return Err(validation_error("start_time must be before end_time"));
        }
        _ => {
            return Err(validation_error(
                "start_time and end_time must be RFC 3339 timestamps",
            ));
        }
    };

    let record = UnavailabilityRecord {
        id: None,
        therapist_id,
        start_time: start.to_rfc3339_opts(SecondsFormat::Secs, true),
        end_time: end.to_rfc3339_opts(SecondsFormat::Secs, true),
        reason: payload.reason,
        appointment_id: payload.appointment_id,
    };
    let stored = state
        .store
        .block_interval(record)
        .await
        .map_err(SchedulingError::from)?;
    info!(
        "Blocked {} - {} for therapist {} ({:?})",
        stored.start_time, stored.end_time, stored.therapist_id, stored.reason
    );
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Handler to release the intervals held by a cancelled appointment.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/admin/appointments/{appointment_id}/unavailability",
    params(
        ("appointment_id" = String, Path, description = "Appointment identifier")
    ),
    responses(
        (status = 200, description = "Number of released intervals", body = ReleaseResponse)
    ),
    tag = "Scheduling Admin"
))]
pub async fn release_appointment_handler(
    State(state): State<Arc<SchedulingState>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<ReleaseResponse>, MindmendError> {
    let released = state
        .store
        .release_appointment(&appointment_id)
        .await
        .map_err(SchedulingError::from)?;
    info!(
        "Released {} interval(s) for appointment {}",
        released, appointment_id
    );
    Ok(Json(ReleaseResponse {
        appointment_id,
        released,
    }))
}
