// --- File: crates/mindmend_scheduling/src/slots.rs ---
//! Free-slot calculation for therapist booking.
//!
//! A therapist publishes one availability window per weekday. For a given
//! date the window is cut into `interval`-wide candidate slots, and each
//! candidate is classified against the unavailability recorded for that UTC
//! calendar day:
//!
//! * **Booked**: the candidate overlaps a blocked interval (reported with the
//!   stored reason, `"Booked"` when none was given).
//! * **Insufficient time**: the candidate itself is free, but the requested
//!   session length would run into a blocked interval or past the window end.
//! * **Available**: otherwise.
//!
//! Once a timestamp has been reduced to its UTC time of day, all arithmetic is
//! done in minutes since midnight, so the calculation is day-agnostic.

use crate::error::SchedulingError;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use mindmend_common::{
    log_error, AvailabilityStore, AvailabilityWindow, FreeSlots, Slot, UnavailabilityRecord,
    UnavailabilityStore, UnavailableSlot,
};
use tracing::{debug, warn};

pub const DEFAULT_INTERVAL_MINUTES: i64 = 30;
pub const BOOKED_REASON: &str = "Booked";
pub const INSUFFICIENT_TIME_REASON: &str = "Insufficient time";
pub const TOO_SOON_REASON: &str = "Too soon";

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Parameters of one free-slot calculation.
#[derive(Debug, Clone)]
pub struct SlotQuery {
    pub therapist_id: String,
    pub date: NaiveDate,
    /// Width of each candidate slot.
    pub interval_minutes: i64,
    /// Length of the session the client wants to book.
    pub session_duration_minutes: i64,
    /// Candidates starting before this instant are reported as too soon.
    pub not_before: Option<DateTime<Utc>>,
}

impl SlotQuery {
    pub fn new(
        therapist_id: impl Into<String>,
        date: NaiveDate,
        session_duration_minutes: i64,
    ) -> Self {
        Self {
            therapist_id: therapist_id.into(),
            date,
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
            session_duration_minutes,
            not_before: None,
        }
    }

    pub fn with_interval(mut self, interval_minutes: i64) -> Self {
        self.interval_minutes = interval_minutes;
        self
    }

    pub fn with_not_before(mut self, not_before: DateTime<Utc>) -> Self {
        self.not_before = Some(not_before);
        self
    }

    fn validate(&self) -> Result<(), SchedulingError> {
        if self.interval_minutes <= 0 || self.interval_minutes > MINUTES_PER_DAY {
            return Err(SchedulingError::InvalidQuery(format!(
                "interval must be between 1 and {} minutes, got {}",
                MINUTES_PER_DAY, self.interval_minutes
            )));
        }
        if self.session_duration_minutes <= 0 || self.session_duration_minutes > MINUTES_PER_DAY {
            return Err(SchedulingError::InvalidQuery(format!(
                "session duration must be between 1 and {} minutes, got {}",
                MINUTES_PER_DAY, self.session_duration_minutes
            )));
        }
        Ok(())
    }
}

/// A blocked interval clamped to the requested day, in minutes since UTC midnight.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BlockedSpan {
    start: i64,
    end: i64,
    reason: String,
}

/// Returns `[date 00:00 UTC, date+1 00:00 UTC)`.
pub fn day_bounds_utc(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

/// Parses a stored time of day, `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

/// Parses a stored timestamp. Accepts RFC 3339, Postgres-style text with a
/// short offset (`2025-05-05 10:00:00+00`), and offset-less text, which is
/// taken to be UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn minute_of_day(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

fn format_minute(minute: i64) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

fn window_minutes(window: &AvailabilityWindow) -> Option<(i64, i64)> {
    match (
        parse_time_of_day(&window.start_time),
        parse_time_of_day(&window.end_time),
    ) {
        (Some(start), Some(end)) if start < end => Some((minute_of_day(start), minute_of_day(end))),
        (Some(_), Some(_)) => {
            warn!(
                "Availability window for therapist {} on {} ends before it starts ({} - {}); ignoring it",
                window.therapist_id, window.day_of_week, window.start_time, window.end_time
            );
            None
        }
        _ => {
            warn!(
                "Unparseable availability window for therapist {} on {} ({} - {}); ignoring it",
                window.therapist_id, window.day_of_week, window.start_time, window.end_time
            );
            None
        }
    }
}

fn candidate_starts(window_start: i64, window_end: i64, interval: i64) -> impl Iterator<Item = i64> {
    (0..)
        .map(move |i| window_start + i * interval)
        .take_while(move |start| start + interval <= window_end)
}

/// Cuts a window into `interval`-wide slots, `[start, start + interval)`,
/// stopping at the last slot that still ends inside the window.
pub fn generate_candidate_slots(window: &AvailabilityWindow, interval_minutes: i64) -> Vec<Slot> {
    if interval_minutes <= 0 {
        return Vec::new();
    }
    let Some((window_start, window_end)) = window_minutes(window) else {
        return Vec::new();
    };
    candidate_starts(window_start, window_end, interval_minutes)
        .map(|start| Slot {
            start_time: format_minute(start),
            end_time: format_minute(start + interval_minutes),
        })
        .collect()
}

fn blocked_spans(records: &[UnavailabilityRecord], date: NaiveDate) -> Vec<BlockedSpan> {
    let (day_start, day_end) = day_bounds_utc(date);

    let mut spans: Vec<BlockedSpan> = records
        .iter()
        .filter_map(|record| {
            let (Some(start), Some(end)) = (
                parse_timestamp(&record.start_time),
                parse_timestamp(&record.end_time),
            ) else {
                warn!(
                    "Skipping unavailability {:?} for therapist {}: unparseable timestamps {:?} - {:?}",
                    record.id, record.therapist_id, record.start_time, record.end_time
                );
                return None;
            };
            if end <= start {
                warn!(
                    "Skipping unavailability {:?} for therapist {}: ends at {} before it starts at {}",
                    record.id, record.therapist_id, end, start
                );
                return None;
            }

            let start = start.max(day_start);
            let end = end.min(day_end);
            if end <= start {
                debug!("Unavailability {:?} does not touch {}", record.id, date);
                return None;
            }

            let reason = record
                .reason
                .as_deref()
                .map(str::trim)
                .filter(|reason| !reason.is_empty())
                .unwrap_or(BOOKED_REASON)
                .to_string();

            Some(BlockedSpan {
                start: (start - day_start).num_minutes(),
                // round partial minutes up so the tail stays blocked
                end: ((end - day_start).num_seconds() + 59) / 60,
                reason,
            })
        })
        .collect();

    spans.sort_by_key(|span| span.start);
    spans
}

fn blocking_reason(spans: &[BlockedSpan], from: i64, to: i64) -> Option<&str> {
    spans
        .iter()
        .find(|span| span.start < to && span.end > from)
        .map(|span| span.reason.as_str())
}

/// Walks the session in `interval` ticks; every tick must be free and the
/// whole session must end inside the window.
fn session_fits(
    spans: &[BlockedSpan],
    start: i64,
    session: i64,
    interval: i64,
    window_end: i64,
) -> bool {
    let session_end = start + session;
    if session_end > window_end {
        return false;
    }
    let mut tick = start;
    while tick < session_end {
        let tick_end = (tick + interval).min(session_end);
        if blocking_reason(spans, tick, tick_end).is_some() {
            return false;
        }
        tick += interval;
    }
    true
}

fn earliest_start_minute(query: &SlotQuery) -> Option<i64> {
    let not_before = query.not_before?;
    let (day_start, day_end) = day_bounds_utc(query.date);
    if not_before <= day_start {
        return None;
    }
    if not_before >= day_end {
        return Some(MINUTES_PER_DAY);
    }
    Some(((not_before - day_start).num_seconds() + 59) / 60)
}

/// Classifies every candidate slot of `window` on `query.date`.
///
/// Pure: callers supply the window and the unavailability rows. Rows with
/// unparseable or inverted timestamps are skipped with a warning. Every
/// candidate ends up in exactly one of the two lists, in chronological order.
pub fn classify_slots(
    window: &AvailabilityWindow,
    records: &[UnavailabilityRecord],
    query: &SlotQuery,
) -> Result<FreeSlots, SchedulingError> {
    query.validate()?;

    let Some((window_start, window_end)) = window_minutes(window) else {
        return Ok(FreeSlots::empty());
    };

    let spans = blocked_spans(records, query.date);
    let earliest_start = earliest_start_minute(query);
    let interval = query.interval_minutes;
    let session = query.session_duration_minutes;

    let mut result = FreeSlots::empty();
    for start in candidate_starts(window_start, window_end, interval) {
        let end = start + interval;
        let start_time = format_minute(start);
        let end_time = format_minute(end);

        if let Some(reason) = blocking_reason(&spans, start, end) {
            result.unavailable.push(UnavailableSlot {
                start_time,
                end_time,
                reason: reason.to_string(),
            });
        } else if earliest_start.is_some_and(|earliest| start < earliest) {
            result.unavailable.push(UnavailableSlot {
                start_time,
                end_time,
                reason: TOO_SOON_REASON.to_string(),
            });
        } else if !session_fits(&spans, start, session, interval, window_end) {
            result.unavailable.push(UnavailableSlot {
                start_time,
                end_time,
                reason: INSUFFICIENT_TIME_REASON.to_string(),
            });
        } else {
            result.available.push(Slot {
                start_time,
                end_time,
            });
        }
    }

    debug!(
        "Therapist {} on {}: {} available, {} unavailable (interval {}m, session {}m, {} blocked spans)",
        query.therapist_id,
        query.date,
        result.available.len(),
        result.unavailable.len(),
        interval,
        session,
        spans.len()
    );
    Ok(result)
}

/// Computes free slots for a therapist on a date, reading from `store`.
///
/// Store failures do not propagate: a failed window lookup yields no slots
/// and a failed unavailability lookup is treated as nothing blocked. Only an
/// invalid query is an error.
pub async fn compute_free_slots<S>(store: &S, query: &SlotQuery) -> Result<FreeSlots, SchedulingError>
where
    S: AvailabilityStore + UnavailabilityStore + ?Sized,
{
    query.validate()?;

    let weekday = query.date.weekday();
    let window = match store.find_window(&query.therapist_id, weekday).await {
        Ok(Some(window)) => window,
        Ok(None) => {
            debug!(
                "No availability window for therapist {} on {} ({})",
                query.therapist_id, weekday, query.date
            );
            return Ok(FreeSlots::empty());
        }
        Err(e) => {
            log_error(
                &e,
                &format!(
                    "Availability lookup failed for therapist {} on {}",
                    query.therapist_id, weekday
                ),
            );
            return Ok(FreeSlots::empty());
        }
    };

    let (day_start, day_end) = day_bounds_utc(query.date);
    let records = match store
        .find_overlapping(&query.therapist_id, day_start, day_end)
        .await
    {
        Ok(records) => records,
        Err(e) => {
            log_error(
                &e,
                &format!(
                    "Unavailability lookup failed for therapist {} on {}; treating the day as unblocked",
                    query.therapist_id, query.date
                ),
            );
            Vec::new()
        }
    };

    classify_slots(&window, &records, query)
}
