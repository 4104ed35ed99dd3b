// --- File: crates/oasis_scheduling/src/waitlist.rs ---
//! Waitlist Matcher: converts a queued customer into a booking when staff
//! drop the entry onto a concrete slot.
//!
//! Ordering is create-then-delete: the waitlist item is only removed after
//! the booking exists. A failed match leaves the queue untouched — a queued
//! customer is never silently lost.

use chrono::{DateTime, Utc};
use oasis_common::{AuditEvent, AuditSink, OasisError};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::catalog::ResourceCatalog;
use crate::conflict::ConflictResolver;
use crate::inference::infer_room_type;
use crate::models::{
    BookingSource, BookingStatus, NewBooking, RoomType, SessionContext, TimeSlot,
};
use crate::store::WaitlistStore;

/// Outcome of a drop. A type mismatch is a warning requiring operator
/// confirmation, not an error: staff may override intentionally.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MatchOutcome {
    Booked(crate::models::Booking),
    TypeMismatch { expected: RoomType, actual: RoomType },
}

pub struct WaitlistMatcher {
    catalog: Arc<ResourceCatalog>,
    resolver: Arc<ConflictResolver>,
    waitlist: Arc<WaitlistStore>,
    audit: Arc<dyn AuditSink>,
}

impl WaitlistMatcher {
    pub fn new(
        catalog: Arc<ResourceCatalog>,
        resolver: Arc<ConflictResolver>,
        waitlist: Arc<WaitlistStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            catalog,
            resolver,
            waitlist,
            audit,
        }
    }

    /// Drops waitlist item `item_id` onto `resource_id` at `drop_time`.
    ///
    /// The expected room type comes from the keyword heuristic over the
    /// item's free-text service name; when it disagrees with the target
    /// resource's actual type and the operator has not confirmed, the drop
    /// stops before any mutation.
    pub fn match_drop(
        &self,
        ctx: &SessionContext,
        item_id: Uuid,
        resource_id: &str,
        drop_time: DateTime<Utc>,
        confirm_type_mismatch: bool,
    ) -> Result<MatchOutcome, OasisError> {
        let item = self.waitlist.get(item_id)?;
        let resolved = self.catalog.resolve(resource_id)?;

        let expected = infer_room_type(&item.service_name);
        if expected != resolved.room_type && !confirm_type_mismatch {
            return Ok(MatchOutcome::TypeMismatch {
                expected,
                actual: resolved.room_type,
            });
        }

        let slot = TimeSlot::from_duration(drop_time, item.duration_minutes)?;

        // The waitlist stores free text; fall back to it as the service ref
        // when no catalog record matches.
        let service_id = self
            .catalog
            .service_by_name(&item.service_name)
            .map(|s| s.id.clone())
            .unwrap_or_else(|| item.service_name.clone());

        let booking = self.resolver.create_booking(
            ctx,
            NewBooking {
                customer_name: item.customer_name.clone(),
                phone: item.phone.clone(),
                service_id,
                branch_id: resolved.branch_id.clone(),
                resource_id: resource_id.to_string(),
                slot,
                staff_id: None,
                status: BookingStatus::Pending,
                source: BookingSource::Manual,
                note: item.note.clone(),
            },
        )?;

        // Booking exists; only now may the queue entry go.
        self.waitlist.remove(item_id)?;

        info!(
            waitlist_item = %item_id,
            booking_id = %booking.id,
            resource = %resource_id,
            "waitlist entry converted"
        );
        self.audit.record(AuditEvent {
            actor: ctx.actor.clone(),
            at: Utc::now(),
            action: "waitlist_match".to_string(),
            booking_id: booking.id,
            before: serde_json::to_value(&item).ok(),
            after: serde_json::to_value(&booking).ok(),
        });

        Ok(MatchOutcome::Booked(booking))
    }
}
