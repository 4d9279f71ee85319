// --- File: crates/mindmend_scheduling/src/store.rs ---
//! In-memory schedule store.
//!
//! Backs the routes when no database is configured, and the tests.

use crate::error::SchedulingError;
use crate::slots::parse_timestamp;
use chrono::{DateTime, Utc, Weekday};
use mindmend_common::{
    AvailabilityStore, AvailabilityWindow, BoxFuture, BoxedError, ScheduleWriter,
    UnavailabilityRecord, UnavailabilityStore,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryScheduleStore {
    windows: RwLock<HashMap<(String, Weekday), AvailabilityWindow>>,
    records: RwLock<Vec<UnavailabilityRecord>>,
    next_id: AtomicI64,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> BoxedError {
        BoxedError::new(SchedulingError::LockPoisoned)
    }
}

impl AvailabilityStore for InMemoryScheduleStore {
    fn find_window(
        &self,
        therapist_id: &str,
        day_of_week: Weekday,
    ) -> BoxFuture<'_, Option<AvailabilityWindow>, BoxedError> {
        let key = (therapist_id.to_string(), day_of_week);
        Box::pin(async move {
            let windows = self.windows.read().map_err(|_| Self::poisoned())?;
            Ok(windows.get(&key).cloned())
        })
    }
}

impl UnavailabilityStore for InMemoryScheduleStore {
    fn find_overlapping(
        &self,
        therapist_id: &str,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<UnavailabilityRecord>, BoxedError> {
        let therapist_id = therapist_id.to_string();
        Box::pin(async move {
            let records = self.records.read().map_err(|_| Self::poisoned())?;
            Ok(records
                .iter()
                .filter(|record| record.therapist_id == therapist_id)
                .filter(|record| {
                    match (
                        parse_timestamp(&record.start_time),
                        parse_timestamp(&record.end_time),
                    ) {
                        (Some(start), Some(end)) => start < range_end && end > range_start,
                        // hand bad rows to the calculator, which reports and skips them
                        _ => true,
                    }
                })
                .cloned()
                .collect())
        })
    }
}

impl ScheduleWriter for InMemoryScheduleStore {
    fn upsert_window(
        &self,
        window: AvailabilityWindow,
    ) -> BoxFuture<'_, AvailabilityWindow, BoxedError> {
        Box::pin(async move {
            let mut windows = self.windows.write().map_err(|_| Self::poisoned())?;
            windows.insert(
                (window.therapist_id.clone(), window.day_of_week),
                window.clone(),
            );
            Ok(window)
        })
    }

    fn block_interval(
        &self,
        mut record: UnavailabilityRecord,
    ) -> BoxFuture<'_, UnavailabilityRecord, BoxedError> {
        Box::pin(async move {
            let mut records = self.records.write().map_err(|_| Self::poisoned())?;
            record.id = Some(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
            records.push(record.clone());
            Ok(record)
        })
    }

    fn release_appointment(&self, appointment_id: &str) -> BoxFuture<'_, u64, BoxedError> {
        let appointment_id = appointment_id.to_string();
        Box::pin(async move {
            let mut records = self.records.write().map_err(|_| Self::poisoned())?;
            let before = records.len();
            records.retain(|record| record.appointment_id.as_deref() != Some(appointment_id.as_str()));
            Ok((before - records.len()) as u64)
        })
    }
}
