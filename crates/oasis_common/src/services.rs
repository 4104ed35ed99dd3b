// --- File: crates/oasis_common/src/services.rs ---
//! Collaborator seams for external services.
//!
//! The scheduling core does not own invoicing or audit storage; it talks to
//! them through these traits so the backend can wire real integrations and
//! tests can substitute recording doubles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use tracing::info;
use uuid::Uuid;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// One line of a generated invoice (the booked service plus any upsell items).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub name: String,
    pub qty: u32,
    /// Unit price in minor currency units.
    pub price: i64,
}

/// Invoice data handed to the invoicing collaborator when a booking completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRequest {
    pub booking_id: Uuid,
    pub customer_name: String,
    pub phone: String,
    pub lines: Vec<InvoiceLine>,
}

/// A trait for the invoicing collaborator.
///
/// Signalled by the lifecycle manager when a booking reaches `completed`.
pub trait InvoicingService: Send + Sync {
    fn invoice_booking(&self, request: InvoiceRequest) -> BoxFuture<'_, (), BoxedError>;
}

/// No-op invoicing implementation for deployments without an invoicing
/// backend and for tests that don't care about the signal.
#[derive(Debug, Default)]
pub struct NullInvoicing;

impl InvoicingService for NullInvoicing {
    fn invoice_booking(&self, request: InvoiceRequest) -> BoxFuture<'_, (), BoxedError> {
        Box::pin(async move {
            info!(booking_id = %request.booking_id, "invoicing signal (null sink)");
            Ok(())
        })
    }
}

/// One audit record: who did what to which booking, with before/after state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub actor: String,
    pub at: DateTime<Utc>,
    /// e.g. "create", "approve", "check_in", "complete", "cancel",
    /// "reschedule", "waitlist_match", "upsell_chain".
    pub action: String,
    pub booking_id: Uuid,
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
}

/// A trait for the audit/log sink.
///
/// Recording is fire-and-forget: audit failures must never fail the
/// operation they describe.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// Default sink: structured tracing events.
#[derive(Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        info!(
            actor = %event.actor,
            action = %event.action,
            booking_id = %event.booking_id,
            at = %event.at,
            "audit"
        );
    }
}
