// File: crates/mindmend_scheduling/src/doc.rs
#![cfg(feature = "openapi")]

use crate::handlers::{
    BlockIntervalRequest, FreeSlotsResponse, RefundQuoteRequest, ReleaseResponse,
    SetAvailabilityRequest,
};
use crate::refund::RefundQuote;
use mindmend_common::{AvailabilityWindow, Slot, UnavailabilityRecord, UnavailableSlot};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::get_free_slots_handler,
        crate::handlers::refund_quote_handler,
        crate::handlers::set_availability_handler,
        crate::handlers::block_interval_handler,
        crate::handlers::release_appointment_handler,
    ),
    components(schemas(
        FreeSlotsResponse,
        Slot,
        UnavailableSlot,
        RefundQuoteRequest,
        RefundQuote,
        SetAvailabilityRequest,
        AvailabilityWindow,
        BlockIntervalRequest,
        UnavailabilityRecord,
        ReleaseResponse,
    )),
    tags(
        (name = "Scheduling", description = "Therapist free slots and cancellation refunds"),
        (name = "Scheduling Admin", description = "Availability windows and blocked intervals")
    )
)]
pub struct SchedulingApiDoc;
