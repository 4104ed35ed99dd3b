// --- File: crates/oasis_scheduling/src/routes.rs ---
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers::{
    availability_handler, booking_changes_handler, chain_upsell_handler, commit_assignment_handler,
    create_booking_handler, create_waitlist_handler, delete_waitlist_handler, list_bookings_handler,
    list_resources_handler, list_waitlist_handler, match_drop_handler, propose_assignment_handler,
    transition_handler, SchedulerState,
};

/// Builds the scheduling router. Mounted by the backend under `/api`.
pub fn routes(state: Arc<SchedulerState>) -> Router {
    Router::new()
        .route("/resources", get(list_resources_handler))
        .route("/availability", get(availability_handler))
        .route(
            "/bookings",
            post(create_booking_handler).get(list_bookings_handler),
        )
        .route("/bookings/changes", get(booking_changes_handler))
        .route("/bookings/{booking_id}/transition", post(transition_handler))
        .route("/bookings/{booking_id}/upsell", post(chain_upsell_handler))
        .route("/assignments/propose", post(propose_assignment_handler))
        .route("/assignments/commit", post(commit_assignment_handler))
        .route(
            "/waitlist",
            post(create_waitlist_handler).get(list_waitlist_handler),
        )
        .route("/waitlist/{item_id}", delete(delete_waitlist_handler))
        .route("/waitlist/{item_id}/match", post(match_drop_handler))
        .with_state(state)
}
