// --- File: crates/oasis_scheduling/src/handlers.rs ---
//! Axum handlers: the surface the staff UI and the online booking flow call.
//!
//! Handlers validate and translate; every scheduling decision happens in the
//! core components. Errors map to HTTP through `OasisError`'s status codes
//! (400 validation, 404 not found, 409 conflict/invalid transition).

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Json,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use oasis_common::{
    validation_error, AuditSink, InvoicingService, OasisError,
};
use oasis_config::{AppConfig, SchedulingConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::availability::{compute_free_ranges, Availability, FreeRange};
use crate::catalog::{ResourceCatalog, ResourceEntry};
use crate::conflict::ConflictResolver;
use crate::lifecycle::{valid_actions, BookingAction, LifecycleManager};
use crate::models::{
    Booking, BookingSource, BookingStatus, NewBooking, RoomType, SessionContext, TimeSlot,
    WaitlistItem,
};
use crate::store::{BookingChanges, BookingStore, WaitlistStore};
use crate::upsell::{ChainedUpsell, UpsellEngine};
use crate::waitlist::{MatchOutcome, WaitlistMatcher};

/// Shared state for all scheduling handlers.
pub struct SchedulerState {
    pub scheduling: SchedulingConfig,
    pub time_zone: Tz,
    pub catalog: Arc<ResourceCatalog>,
    pub bookings: Arc<BookingStore>,
    pub waitlist: Arc<WaitlistStore>,
    pub resolver: Arc<ConflictResolver>,
    pub lifecycle: Arc<LifecycleManager>,
    pub matcher: Arc<WaitlistMatcher>,
    pub upsell: Arc<UpsellEngine>,
}

impl SchedulerState {
    pub fn new(
        config: &AppConfig,
        catalog: Arc<ResourceCatalog>,
        invoicing: Arc<dyn InvoicingService>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let bookings = Arc::new(BookingStore::new());
        let waitlist = Arc::new(WaitlistStore::new());
        let resolver = Arc::new(ConflictResolver::new(
            catalog.clone(),
            bookings.clone(),
            audit.clone(),
        ));
        let lifecycle = Arc::new(LifecycleManager::new(
            bookings.clone(),
            catalog.clone(),
            invoicing,
            audit.clone(),
        ));
        let matcher = Arc::new(WaitlistMatcher::new(
            catalog.clone(),
            resolver.clone(),
            waitlist.clone(),
            audit.clone(),
        ));
        let upsell = Arc::new(UpsellEngine::new(
            resolver.clone(),
            config.scheduling.upsell_fallback_duration_minutes,
        ));
        Self {
            scheduling: config.scheduling.clone(),
            time_zone: oasis_config::resolve_time_zone(&config.scheduling),
            catalog,
            bookings,
            waitlist,
            resolver,
            lifecycle,
            matcher,
            upsell,
        }
    }
}

/// The actor identity for audit records. The UI sends the logged-in staff id;
/// unauthenticated online bookings fall back to "online".
fn session_from_headers(headers: &HeaderMap) -> SessionContext {
    let actor = headers
        .get("x-staff-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("online")
        .to_string();
    SessionContext::new(actor)
}

fn parse_date(raw: &str) -> Result<NaiveDate, OasisError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| validation_error("invalid date format (YYYY-MM-DD)"))
}

/// Branch operating window on `date`, in the configured branch-local zone,
/// converted to UTC.
fn day_window(
    state: &SchedulerState,
    branch_id: &str,
    date: NaiveDate,
) -> Result<TimeSlot, OasisError> {
    let branch = state.catalog.branch(branch_id)?;
    let open = state
        .time_zone
        .from_local_datetime(&date.and_time(branch.operating_hours.open))
        .earliest()
        .ok_or_else(|| validation_error("operating window start is not a valid local time"))?;
    let close = state
        .time_zone
        .from_local_datetime(&date.and_time(branch.operating_hours.close))
        .earliest()
        .ok_or_else(|| validation_error("operating window end is not a valid local time"))?;
    TimeSlot::new(open.with_timezone(&Utc), close.with_timezone(&Utc))
}

// --- Resources ---

#[derive(Debug, Deserialize)]
pub struct ResourcesQuery {
    pub branch_id: String,
    pub room_type: Option<RoomType>,
}

pub async fn list_resources_handler(
    State(state): State<Arc<SchedulerState>>,
    Query(query): Query<ResourcesQuery>,
) -> Result<Json<Vec<ResourceEntry>>, OasisError> {
    let entries = state
        .catalog
        .list_resources(&query.branch_id, query.room_type)?;
    Ok(Json(entries))
}

// --- Availability ---

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub branch_id: String,
    /// Date in YYYY-MM-DD format (branch-local).
    pub date: String,
    pub room_type: Option<RoomType>,
    pub slot_minutes: Option<i64>,
    /// How many ranges to return; the banner shows the top 3.
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    /// True when the resource filter matched nothing — distinct from a fully
    /// booked day.
    pub no_resources: bool,
    pub ranges: Vec<FreeRange>,
}

pub async fn availability_handler(
    State(state): State<Arc<SchedulerState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, OasisError> {
    let date = parse_date(&query.date)?;
    let window = day_window(&state, &query.branch_id, date)?;
    let resources = state
        .catalog
        .list_resources(&query.branch_id, query.room_type)?;
    let bookings = state.bookings.snapshot();
    let slot_minutes = query
        .slot_minutes
        .unwrap_or(state.scheduling.slot_size_minutes);
    let limit = query.limit.unwrap_or(3);

    match compute_free_ranges(&resources, &bookings, window, slot_minutes)? {
        Availability::NoResources => Ok(Json(AvailabilityResponse {
            no_resources: true,
            ranges: vec![],
        })),
        Availability::Open(mut ranges) => {
            ranges.truncate(limit);
            Ok(Json(AvailabilityResponse {
                no_resources: false,
                ranges,
            }))
        }
    }
}

// --- Bookings ---

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub customer_name: String,
    pub phone: String,
    pub service_id: String,
    pub branch_id: String,
    pub resource_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub staff_id: Option<String>,
    /// Defaults to pending; staff entry may create directly as confirmed.
    pub status: Option<BookingStatus>,
    pub source: Option<BookingSource>,
    #[serde(default)]
    pub note: String,
}

pub async fn create_booking_handler(
    State(state): State<Arc<SchedulerState>>,
    headers: HeaderMap,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<Json<Booking>, OasisError> {
    let ctx = session_from_headers(&headers);
    let slot = TimeSlot::new(payload.start_time, payload.end_time)?;
    let booking = state.resolver.create_booking(
        &ctx,
        NewBooking {
            customer_name: payload.customer_name,
            phone: payload.phone,
            service_id: payload.service_id,
            branch_id: payload.branch_id,
            resource_id: payload.resource_id,
            slot,
            staff_id: payload.staff_id,
            status: payload.status.unwrap_or(BookingStatus::Pending),
            source: payload.source.unwrap_or(BookingSource::Manual),
            note: payload.note,
        },
    )?;
    Ok(Json(booking))
}

#[derive(Debug, Deserialize)]
pub struct BookingsQuery {
    pub branch_id: String,
    pub date: String,
}

pub async fn list_bookings_handler(
    State(state): State<Arc<SchedulerState>>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<Booking>>, OasisError> {
    let date = parse_date(&query.date)?;
    let window = day_window(&state, &query.branch_id, date)?;
    let mut bookings: Vec<Booking> = state
        .bookings
        .snapshot()
        .into_iter()
        .filter(|b| b.branch_id == query.branch_id)
        .filter(|b| b.slot().overlaps(&window))
        .collect();
    // Active entries first, then by start time; cancelled sink to the bottom.
    bookings.sort_by_key(|b| (!b.status.is_active(), b.start_time));
    Ok(Json(bookings))
}

#[derive(Debug, Deserialize)]
pub struct ChangesQuery {
    pub since: Option<u64>,
}

/// Poll-and-diff feed: staff clients call this every few seconds with the
/// last revision they saw.
pub async fn booking_changes_handler(
    State(state): State<Arc<SchedulerState>>,
    Query(query): Query<ChangesQuery>,
) -> Result<Json<BookingChanges>, OasisError> {
    Ok(Json(state.bookings.changes_since(query.since.unwrap_or(0))))
}

// --- Assignment (create / drag / resize gate) ---

#[derive(Debug, Deserialize)]
pub struct ProposeAssignmentRequest {
    pub resource_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub exclude_booking_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ProposeAssignmentResponse {
    pub ok: bool,
    pub room_id: String,
    pub bed_id: Option<String>,
    pub room_type: RoomType,
}

pub async fn propose_assignment_handler(
    State(state): State<Arc<SchedulerState>>,
    Json(payload): Json<ProposeAssignmentRequest>,
) -> Result<Json<ProposeAssignmentResponse>, OasisError> {
    let slot = TimeSlot::new(payload.start_time, payload.end_time)?;
    let resolved =
        state
            .resolver
            .propose_assignment(&payload.resource_id, slot, payload.exclude_booking_id)?;
    Ok(Json(ProposeAssignmentResponse {
        ok: true,
        room_id: resolved.room_id,
        bed_id: resolved.bed_id,
        room_type: resolved.room_type,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CommitAssignmentRequest {
    pub booking_id: Uuid,
    pub resource_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

pub async fn commit_assignment_handler(
    State(state): State<Arc<SchedulerState>>,
    headers: HeaderMap,
    Json(payload): Json<CommitAssignmentRequest>,
) -> Result<Json<Booking>, OasisError> {
    let ctx = session_from_headers(&headers);
    let slot = TimeSlot::new(payload.start_time, payload.end_time)?;
    let booking =
        state
            .resolver
            .commit_assignment(&ctx, payload.booking_id, &payload.resource_id, slot)?;
    Ok(Json(booking))
}

// --- Lifecycle ---

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub action: BookingAction,
}

#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub booking: Booking,
    /// What the operator may do next.
    pub valid_actions: Vec<BookingAction>,
}

pub async fn transition_handler(
    State(state): State<Arc<SchedulerState>>,
    headers: HeaderMap,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<TransitionRequest>,
) -> Result<Json<TransitionResponse>, OasisError> {
    let ctx = session_from_headers(&headers);
    let booking = state
        .lifecycle
        .transition(&ctx, booking_id, payload.action)
        .await?;
    let actions = valid_actions(booking.status);
    Ok(Json(TransitionResponse {
        booking,
        valid_actions: actions,
    }))
}

// --- Waitlist ---

#[derive(Debug, Deserialize)]
pub struct CreateWaitlistRequest {
    pub customer_name: String,
    pub phone: String,
    pub service_name: String,
    pub preferred_time: DateTime<Utc>,
    pub duration_minutes: i64,
    #[serde(default)]
    pub note: String,
}

pub async fn create_waitlist_handler(
    State(state): State<Arc<SchedulerState>>,
    Json(payload): Json<CreateWaitlistRequest>,
) -> Result<Json<WaitlistItem>, OasisError> {
    if payload.duration_minutes < 1 {
        return Err(validation_error("duration_minutes must be positive"));
    }
    let item = WaitlistItem {
        id: Uuid::new_v4(),
        customer_name: payload.customer_name,
        phone: payload.phone,
        service_name: payload.service_name,
        preferred_time: payload.preferred_time,
        duration_minutes: payload.duration_minutes,
        note: payload.note,
        created_at: Utc::now(),
    };
    state.waitlist.insert(item.clone());
    Ok(Json(item))
}

pub async fn list_waitlist_handler(
    State(state): State<Arc<SchedulerState>>,
) -> Result<Json<Vec<WaitlistItem>>, OasisError> {
    Ok(Json(state.waitlist.list()))
}

pub async fn delete_waitlist_handler(
    State(state): State<Arc<SchedulerState>>,
    Path(item_id): Path<Uuid>,
) -> Result<Json<WaitlistItem>, OasisError> {
    Ok(Json(state.waitlist.remove(item_id)?))
}

#[derive(Debug, Deserialize)]
pub struct MatchDropRequest {
    pub resource_id: String,
    pub drop_time: DateTime<Utc>,
    /// Operator override after a type-mismatch warning.
    #[serde(default)]
    pub confirm_type_mismatch: bool,
}

pub async fn match_drop_handler(
    State(state): State<Arc<SchedulerState>>,
    headers: HeaderMap,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<MatchDropRequest>,
) -> Result<Json<MatchOutcome>, OasisError> {
    let ctx = session_from_headers(&headers);
    let outcome = state.matcher.match_drop(
        &ctx,
        item_id,
        &payload.resource_id,
        payload.drop_time,
        payload.confirm_type_mismatch,
    )?;
    Ok(Json(outcome))
}

// --- Upsell ---

#[derive(Debug, Deserialize)]
pub struct ChainUpsellRequest {
    pub service_name: String,
    pub qty: u32,
}

pub async fn chain_upsell_handler(
    State(state): State<Arc<SchedulerState>>,
    headers: HeaderMap,
    Path(parent_booking_id): Path<Uuid>,
    Json(payload): Json<ChainUpsellRequest>,
) -> Result<Json<ChainedUpsell>, OasisError> {
    let ctx = session_from_headers(&headers);
    let chained = state.upsell.chain_upsell(
        &ctx,
        parent_booking_id,
        &payload.service_name,
        payload.qty,
    )?;
    Ok(Json(chained))
}
