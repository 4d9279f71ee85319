// File: crates/mindmend_scheduling/src/routes.rs
use crate::handlers::{
    block_interval_handler, get_free_slots_handler, refund_quote_handler,
    release_appointment_handler, set_availability_handler, SchedulingState,
};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

/// Creates a router containing all scheduling routes.
pub fn routes(state: Arc<SchedulingState>) -> Router {
    Router::new()
        .route(
            "/therapists/{therapist_id}/free-slots",
            get(get_free_slots_handler),
        )
        .route("/refunds/quote", post(refund_quote_handler))
        .route(
            "/admin/therapists/{therapist_id}/availability/{weekday}",
            put(set_availability_handler),
        )
        .route(
            "/admin/therapists/{therapist_id}/unavailability",
            post(block_interval_handler),
        )
        .route(
            "/admin/appointments/{appointment_id}/unavailability",
            delete(release_appointment_handler),
        )
        .with_state(state)
}
