// --- File: crates/oasis_scheduling/src/conflict.rs ---
//! Conflict Resolver: the authoritative gate for every (resource, interval)
//! assignment — create, drag-and-drop move, resize, waitlist placement and
//! upsell chaining all end here. UIs may compute candidate placements
//! optimistically, but nothing is committed until this module re-validates
//! it under the store's write lock.

use chrono::Utc;
use oasis_common::{conflict, validation_error, AuditEvent, AuditSink, OasisError};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::catalog::{ResolvedResource, ResourceCatalog};
use crate::models::{Booking, BookingStatus, NewBooking, SessionContext, TimeSlot};
use crate::store::BookingStore;

/// Scans `bookings` for an active booking on `concrete_key` overlapping
/// `slot`, skipping `exclude` (the booking being moved, when rescheduling).
pub fn find_overlap<'a>(
    bookings: impl IntoIterator<Item = &'a Booking>,
    concrete_key: &str,
    slot: &TimeSlot,
    exclude: Option<Uuid>,
) -> Option<Uuid> {
    bookings
        .into_iter()
        .filter(|b| Some(b.id) != exclude)
        .filter(|b| b.status.is_active())
        .filter(|b| b.concrete_key() == concrete_key)
        .find(|b| b.slot().overlaps(slot))
        .map(|b| b.id)
}

pub struct ConflictResolver {
    catalog: Arc<ResourceCatalog>,
    store: Arc<BookingStore>,
    audit: Arc<dyn AuditSink>,
}

impl ConflictResolver {
    pub fn new(
        catalog: Arc<ResourceCatalog>,
        store: Arc<BookingStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            catalog,
            store,
            audit,
        }
    }

    /// Dry-run validation of a proposed assignment. Read-only: a success here
    /// is advisory, the commit path re-validates under the write lock.
    pub fn propose_assignment(
        &self,
        resource_id: &str,
        slot: TimeSlot,
        exclude_booking_id: Option<Uuid>,
    ) -> Result<ResolvedResource, OasisError> {
        let resolved = self.catalog.resolve(resource_id)?;
        let snapshot = self.store.snapshot();
        if let Some(with) = find_overlap(
            snapshot.iter(),
            resolved.concrete_key(),
            &slot,
            exclude_booking_id,
        ) {
            return Err(conflict(
                Some(with),
                format!("resource {resource_id} is occupied in the requested interval"),
            ));
        }
        Ok(resolved)
    }

    /// Creates a booking after conflict-checking the placement. The scan and
    /// the insert happen under the same write lock, so two concurrent staff
    /// clients proposing the same placement cannot both win.
    pub fn create_booking(
        &self,
        ctx: &SessionContext,
        new: NewBooking,
    ) -> Result<Booking, OasisError> {
        if !matches!(new.status, BookingStatus::Pending | BookingStatus::Confirmed) {
            return Err(validation_error(format!(
                "a booking cannot be created as {}",
                new.status
            )));
        }
        if new.customer_name.trim().is_empty() {
            return Err(validation_error("customer name must not be empty"));
        }
        self.catalog.branch(&new.branch_id)?;
        let resolved = self.catalog.resolve(&new.resource_id)?;
        if resolved.branch_id != new.branch_id {
            return Err(validation_error(format!(
                "resource {} belongs to branch {}, not {}",
                new.resource_id, resolved.branch_id, new.branch_id
            )));
        }

        let booking = Booking {
            id: Uuid::new_v4(),
            customer_name: new.customer_name,
            phone: new.phone,
            service_id: new.service_id,
            branch_id: new.branch_id,
            room_id: resolved.room_id.clone(),
            bed_id: resolved.bed_id.clone(),
            staff_id: new.staff_id,
            start_time: new.slot.start,
            end_time: new.slot.end,
            status: new.status,
            source: new.source,
            note: new.note,
            services_done: Vec::new(),
        };

        let created = self.store.commit(|bookings| {
            if let Some(with) = find_overlap(
                bookings.values(),
                resolved.concrete_key(),
                &new.slot,
                None,
            ) {
                return Err(conflict(
                    Some(with),
                    format!(
                        "resource {} is occupied in the requested interval",
                        resolved.concrete_key()
                    ),
                ));
            }
            bookings.insert(booking.id, booking.clone());
            Ok((booking.id, booking.clone()))
        })?;

        debug!(booking_id = %created.id, resource = %created.concrete_key(), "booking created");
        self.audit.record(AuditEvent {
            actor: ctx.actor.clone(),
            at: Utc::now(),
            action: "create".to_string(),
            booking_id: created.id,
            before: None,
            after: serde_json::to_value(&created).ok(),
        });
        Ok(created)
    }

    /// Commits a reschedule (drag, resize, or resource move). Rejection
    /// leaves the stored interval and resource untouched; there are no
    /// partial writes.
    pub fn commit_assignment(
        &self,
        ctx: &SessionContext,
        booking_id: Uuid,
        resource_id: &str,
        slot: TimeSlot,
    ) -> Result<Booking, OasisError> {
        let resolved = self.catalog.resolve(resource_id)?;

        let (before, after) = self.store.commit(|bookings| {
            let current = bookings
                .get(&booking_id)
                .ok_or_else(|| oasis_common::not_found(format!("unknown booking: {booking_id}")))?
                .clone();

            // Reschedule is only permitted before check-in.
            if !matches!(
                current.status,
                BookingStatus::Pending | BookingStatus::Confirmed
            ) {
                return Err(OasisError::InvalidTransition {
                    from: current.status.to_string(),
                    action: "reschedule".to_string(),
                });
            }
            if resolved.branch_id != current.branch_id {
                return Err(validation_error(format!(
                    "resource {resource_id} belongs to a different branch"
                )));
            }
            if let Some(with) = find_overlap(
                bookings.values(),
                resolved.concrete_key(),
                &slot,
                Some(booking_id),
            ) {
                return Err(conflict(
                    Some(with),
                    format!("resource {resource_id} is occupied in the requested interval"),
                ));
            }

            let entry = bookings
                .get_mut(&booking_id)
                .expect("booking present, checked above");
            entry.room_id = resolved.room_id.clone();
            entry.bed_id = resolved.bed_id.clone();
            entry.start_time = slot.start;
            entry.end_time = slot.end;
            Ok((booking_id, (current, entry.clone())))
        })?;

        debug!(booking_id = %booking_id, resource = %after.concrete_key(), "booking rescheduled");
        self.audit.record(AuditEvent {
            actor: ctx.actor.clone(),
            at: Utc::now(),
            action: "reschedule".to_string(),
            booking_id,
            before: serde_json::to_value(&before).ok(),
            after: serde_json::to_value(&after).ok(),
        });
        Ok(after)
    }

    /// Inserts a booking WITHOUT the overlap check. This exists solely for
    /// the upsell degrade path (non-NAIL_SPA fallback onto a busy resource);
    /// every other caller goes through `create_booking`.
    pub(crate) fn insert_unchecked(
        &self,
        ctx: &SessionContext,
        booking: Booking,
    ) -> Result<Booking, OasisError> {
        let created = self.store.commit(|bookings| {
            bookings.insert(booking.id, booking.clone());
            Ok((booking.id, booking.clone()))
        })?;
        self.audit.record(AuditEvent {
            actor: ctx.actor.clone(),
            at: Utc::now(),
            action: "create".to_string(),
            booking_id: created.id,
            before: None,
            after: serde_json::to_value(&created).ok(),
        });
        Ok(created)
    }

    pub(crate) fn catalog(&self) -> &ResourceCatalog {
        &self.catalog
    }

    pub(crate) fn store(&self) -> &Arc<BookingStore> {
        &self.store
    }

    pub(crate) fn audit(&self) -> &Arc<dyn AuditSink> {
        &self.audit
    }
}
