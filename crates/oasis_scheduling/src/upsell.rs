// --- File: crates/oasis_scheduling/src/upsell.rs ---
//! Upsell Chaining Engine: appends a follow-on booking immediately after an
//! in-progress one, auto-selecting a compatible free resource.
//!
//! When no matching-type resource is free, behavior splits by category:
//! NAIL_SPA rejects outright (a nail station is a hard constraint), every
//! other type degrades to the first matching resource with an explicit
//! double-booking-risk flag rather than blocking service.

use chrono::Utc;
use oasis_common::{conflict, not_found, validation_error, AuditEvent, OasisError};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::conflict::ConflictResolver;
use crate::inference::infer_room_type;
use crate::models::{
    Booking, BookingSource, BookingStatus, RoomType, ServiceLine, SessionContext, TimeSlot,
};

#[derive(Debug, Clone, Serialize)]
pub struct ChainedUpsell {
    pub booking: Booking,
    /// True when the engine fell back to a busy resource. Surfaced, never
    /// hidden: staff must know the slot is contended.
    pub double_booking_risk: bool,
}

pub struct UpsellEngine {
    resolver: Arc<ConflictResolver>,
    fallback_duration_minutes: i64,
}

impl UpsellEngine {
    pub fn new(resolver: Arc<ConflictResolver>, fallback_duration_minutes: i64) -> Self {
        Self {
            resolver,
            fallback_duration_minutes,
        }
    }

    /// Chains `qty` of the named service directly after `parent_booking_id`.
    ///
    /// The chained booking starts exactly at the parent's end time, enters as
    /// confirmed with source `linked`, and a service line is appended to the
    /// parent's `services_done` for invoicing.
    pub fn chain_upsell(
        &self,
        ctx: &SessionContext,
        parent_booking_id: Uuid,
        service_name: &str,
        qty: u32,
    ) -> Result<ChainedUpsell, OasisError> {
        if qty < 1 {
            return Err(validation_error("qty must be at least 1"));
        }

        let parent = self.resolver.store().get(parent_booking_id)?;
        if parent.status.is_terminal() {
            return Err(validation_error(format!(
                "cannot chain onto a {} booking",
                parent.status
            )));
        }

        let catalog = self.resolver.catalog();
        let service = catalog
            .service_by_name(service_name)
            .ok_or_else(|| not_found(format!("unknown service: {service_name}")))?
            .clone();

        let duration = service
            .duration_minutes
            .unwrap_or(self.fallback_duration_minutes);
        // The authoritative signal is the service record; the keyword
        // heuristic only covers records that predate required_room_type.
        let target_type = service
            .required_room_type
            .unwrap_or_else(|| infer_room_type(&service.name));

        let slot = TimeSlot::from_duration(parent.end_time, duration)?;
        let candidates = catalog.list_resources(&parent.branch_id, Some(target_type))?;
        if candidates.is_empty() {
            return Err(not_found(format!(
                "branch {} has no {} resources",
                parent.branch_id, target_type
            )));
        }

        let free_candidate = candidates
            .iter()
            .find(|entry| {
                self.resolver
                    .propose_assignment(&entry.id, slot, None)
                    .is_ok()
            })
            .cloned();

        let (booking, double_booking_risk) = match free_candidate {
            Some(entry) => {
                let booking = self.resolver.create_booking(
                    ctx,
                    crate::models::NewBooking {
                        customer_name: parent.customer_name.clone(),
                        phone: parent.phone.clone(),
                        service_id: service.id.clone(),
                        branch_id: parent.branch_id.clone(),
                        resource_id: entry.id.clone(),
                        slot,
                        staff_id: parent.staff_id.clone(),
                        status: BookingStatus::Confirmed,
                        source: BookingSource::Linked,
                        note: format!("Upsell of booking {parent_booking_id}"),
                    },
                )?;
                (booking, false)
            }
            None if target_type == RoomType::NailSpa => {
                // Nail stations are a hard constraint: no free station, no booking.
                return Err(conflict(
                    None,
                    format!(
                        "no free {} resource at branch {} for {} - {}",
                        target_type, parent.branch_id, slot.start, slot.end
                    ),
                ));
            }
            None => {
                // Known, flagged degrade: take the first matching-type
                // resource even though it is busy in the interval.
                let entry = candidates[0].clone();
                let resolved = catalog.resolve(&entry.id)?;
                warn!(
                    parent_booking = %parent_booking_id,
                    resource = %entry.id,
                    "upsell fallback onto busy resource, double-booking risk"
                );
                let booking = self.resolver.insert_unchecked(
                    ctx,
                    Booking {
                        id: Uuid::new_v4(),
                        customer_name: parent.customer_name.clone(),
                        phone: parent.phone.clone(),
                        service_id: service.id.clone(),
                        branch_id: parent.branch_id.clone(),
                        room_id: resolved.room_id.clone(),
                        bed_id: resolved.bed_id.clone(),
                        staff_id: parent.staff_id.clone(),
                        start_time: slot.start,
                        end_time: slot.end,
                        status: BookingStatus::Confirmed,
                        source: BookingSource::Linked,
                        note: format!(
                            "Upsell of booking {parent_booking_id} (double-booking risk)"
                        ),
                        services_done: Vec::new(),
                    },
                )?;
                (booking, true)
            }
        };

        // Record the upsell line on the parent for invoicing.
        let (parent_before, parent_after) = self.resolver.store().commit(|bookings| {
            let current = bookings
                .get(&parent_booking_id)
                .ok_or_else(|| not_found(format!("unknown booking: {parent_booking_id}")))?
                .clone();
            let entry = bookings
                .get_mut(&parent_booking_id)
                .expect("parent present, checked above");
            entry.services_done.push(ServiceLine {
                name: service.name.clone(),
                qty,
                price: service.price,
            });
            Ok((parent_booking_id, (current, entry.clone())))
        })?;

        self.resolver.audit().record(AuditEvent {
            actor: ctx.actor.clone(),
            at: Utc::now(),
            action: "upsell_chain".to_string(),
            booking_id: parent_booking_id,
            before: serde_json::to_value(&parent_before).ok(),
            after: serde_json::to_value(&parent_after).ok(),
        });

        Ok(ChainedUpsell {
            booking,
            double_booking_risk,
        })
    }
}
