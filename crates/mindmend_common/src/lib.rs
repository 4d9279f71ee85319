// --- File: crates/mindmend_common/src/lib.rs ---

pub mod error; // Error handling
pub mod http; // HTTP error responses
pub mod logging; // Logging utilities
pub mod models; // Shared schedule data structures
pub mod services; // Store abstractions

pub use error::{
    config_error, database_error, internal_error, not_found, validation_error, HttpStatusCode,
    MindmendError,
};

pub use http::IntoHttpResponse;

pub use logging::{init, init_with_level, log_error};

pub use models::{AvailabilityWindow, FreeSlots, Slot, UnavailabilityRecord, UnavailableSlot};

pub use services::{
    AvailabilityStore, BoxFuture, BoxedError, ScheduleStore, ScheduleWriter, UnavailabilityStore,
};
