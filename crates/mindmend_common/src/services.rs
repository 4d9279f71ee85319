// --- File: crates/mindmend_common/src/services.rs ---
//! Store abstractions for schedule data.
//!
//! The slot calculator and the HTTP handlers only see these traits, so the
//! SQL repository and the in-memory store used in tests are interchangeable.

use crate::models::{AvailabilityWindow, UnavailabilityRecord};
use chrono::{DateTime, Utc, Weekday};
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl BoxedError {
    /// Wraps any error.
    pub fn new<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        BoxedError(Box::new(err))
    }
}

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// Read access to therapists' weekly availability windows.
pub trait AvailabilityStore: Send + Sync {
    /// Returns the therapist's window for the weekday, if one is set.
    fn find_window(
        &self,
        therapist_id: &str,
        day_of_week: Weekday,
    ) -> BoxFuture<'_, Option<AvailabilityWindow>, BoxedError>;
}

/// Read access to concrete blocked intervals.
pub trait UnavailabilityStore: Send + Sync {
    /// Returns every record for the therapist overlapping `[range_start, range_end)`.
    fn find_overlapping(
        &self,
        therapist_id: &str,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<UnavailabilityRecord>, BoxedError>;
}

/// Write access used by therapist setup tooling and the booking/cancellation path.
pub trait ScheduleWriter: Send + Sync {
    /// Creates or replaces the window for `(therapist_id, day_of_week)`.
    fn upsert_window(&self, window: AvailabilityWindow)
        -> BoxFuture<'_, AvailabilityWindow, BoxedError>;

    /// Stores a blocked interval and returns it with its id.
    fn block_interval(
        &self,
        record: UnavailabilityRecord,
    ) -> BoxFuture<'_, UnavailabilityRecord, BoxedError>;

    /// Deletes the records tied to an appointment; returns how many were removed.
    fn release_appointment(&self, appointment_id: &str) -> BoxFuture<'_, u64, BoxedError>;
}

/// Everything the scheduling routes need from a backing store.
pub trait ScheduleStore: AvailabilityStore + UnavailabilityStore + ScheduleWriter {}

impl<T> ScheduleStore for T where T: AvailabilityStore + UnavailabilityStore + ScheduleWriter {}
