// --- File: crates/mindmend_scheduling/src/lib.rs ---
pub mod doc;
pub mod error;
pub mod handlers;
pub mod refund;
pub mod routes;
pub mod slots;
#[cfg(test)]
mod slots_proptest;
pub mod store;

pub use error::SchedulingError;
pub use handlers::SchedulingState;
pub use refund::{compute_refund, RefundPolicy, RefundQuote, RefundTier};
pub use routes::routes;
pub use slots::{classify_slots, compute_free_slots, SlotQuery};
pub use store::InMemoryScheduleStore;
