// --- File: crates/oasis_scheduling/src/lifecycle.rs ---
//! Booking Lifecycle Manager: the status state machine.
//!
//! Status moves monotonically pending → confirmed → processing → completed,
//! with cancelled reachable from any non-terminal state. Completed and
//! cancelled are terminal. Any other move fails with InvalidTransition and
//! performs no mutation. Status is mutated here and nowhere else; interval
//! and resource mutations belong to the conflict resolver.

use chrono::Utc;
use oasis_common::{
    AuditEvent, AuditSink, InvoiceLine, InvoiceRequest, InvoicingService, OasisError,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::catalog::ResourceCatalog;
use crate::models::{Booking, BookingStatus, SessionContext};
use crate::store::BookingStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingAction {
    Approve,
    CheckIn,
    Complete,
    Cancel,
}

impl fmt::Display for BookingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BookingAction::Approve => "approve",
            BookingAction::CheckIn => "check_in",
            BookingAction::Complete => "complete",
            BookingAction::Cancel => "cancel",
        };
        write!(f, "{name}")
    }
}

/// The transition table. `None` means the move is not in the table.
fn next_status(current: BookingStatus, action: BookingAction) -> Option<BookingStatus> {
    match (current, action) {
        (BookingStatus::Pending, BookingAction::Approve) => Some(BookingStatus::Confirmed),
        (BookingStatus::Confirmed, BookingAction::CheckIn) => Some(BookingStatus::Processing),
        (BookingStatus::Processing, BookingAction::Complete) => Some(BookingStatus::Completed),
        (
            BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::Processing,
            BookingAction::Cancel,
        ) => Some(BookingStatus::Cancelled),
        _ => None,
    }
}

/// All legal actions for a status. Drives the action buttons staff UIs show.
pub fn valid_actions(status: BookingStatus) -> Vec<BookingAction> {
    match status {
        BookingStatus::Pending => vec![BookingAction::Approve, BookingAction::Cancel],
        BookingStatus::Confirmed => vec![BookingAction::CheckIn, BookingAction::Cancel],
        BookingStatus::Processing => vec![BookingAction::Complete, BookingAction::Cancel],
        // Terminal states - no transitions allowed
        BookingStatus::Completed | BookingStatus::Cancelled => vec![],
    }
}

pub struct LifecycleManager {
    store: Arc<BookingStore>,
    catalog: Arc<ResourceCatalog>,
    invoicing: Arc<dyn InvoicingService>,
    audit: Arc<dyn AuditSink>,
}

impl LifecycleManager {
    pub fn new(
        store: Arc<BookingStore>,
        catalog: Arc<ResourceCatalog>,
        invoicing: Arc<dyn InvoicingService>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            store,
            catalog,
            invoicing,
            audit,
        }
    }

    /// Applies a lifecycle action to a booking.
    ///
    /// The guard and the status write happen under the store's write lock.
    /// `complete` additionally signals the invoicing collaborator; invoicing
    /// failure is logged but does not roll the transition back — the
    /// treatment happened whether or not the invoice was delivered.
    pub async fn transition(
        &self,
        ctx: &SessionContext,
        booking_id: Uuid,
        action: BookingAction,
    ) -> Result<Booking, OasisError> {
        let (before, after) = self.store.commit(|bookings| {
            let current = bookings
                .get(&booking_id)
                .ok_or_else(|| oasis_common::not_found(format!("unknown booking: {booking_id}")))?
                .clone();

            let next = next_status(current.status, action).ok_or_else(|| {
                OasisError::InvalidTransition {
                    from: current.status.to_string(),
                    action: action.to_string(),
                }
            })?;

            let entry = bookings
                .get_mut(&booking_id)
                .expect("booking present, checked above");
            entry.status = next;
            Ok((booking_id, (current, entry.clone())))
        })?;

        info!(
            booking_id = %booking_id,
            from = %before.status,
            to = %after.status,
            action = %action,
            "booking transition"
        );
        self.audit.record(AuditEvent {
            actor: ctx.actor.clone(),
            at: Utc::now(),
            action: action.to_string(),
            booking_id,
            before: serde_json::to_value(&before).ok(),
            after: serde_json::to_value(&after).ok(),
        });

        if after.status == BookingStatus::Completed {
            if let Err(err) = self
                .invoicing
                .invoice_booking(self.build_invoice(&after))
                .await
            {
                error!(booking_id = %booking_id, error = %err, "invoicing signal failed");
            }
        }

        Ok(after)
    }

    /// Invoice lines: the booked service (when the catalog knows it) plus
    /// every upsell line recorded on the booking.
    fn build_invoice(&self, booking: &Booking) -> InvoiceRequest {
        let mut lines = Vec::new();
        if let Some(service) = self.catalog.service(&booking.service_id) {
            lines.push(InvoiceLine {
                name: service.name.clone(),
                qty: 1,
                price: service.price,
            });
        }
        lines.extend(booking.services_done.iter().map(|line| InvoiceLine {
            name: line.name.clone(),
            qty: line.qty,
            price: line.price,
        }));
        InvoiceRequest {
            booking_id: booking.id,
            customer_name: booking.customer_name.clone(),
            phone: booking.phone.clone(),
            lines,
        }
    }
}
