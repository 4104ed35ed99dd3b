// --- File: crates/oasis_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error taxonomy shared across crates
pub mod http; // HTTP error mapping utilities
pub mod logging; // Logging utilities
pub mod services; // External collaborator seams (invoicing, audit)

// Re-export error types and utilities for easier access
pub use error::{conflict, not_found, validation_error, HttpStatusCode, OasisError};

// Re-export HTTP utilities for easier access
pub use http::{handle_json_result, IntoHttpResponse};

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level};

// Re-export the collaborator seams
pub use services::{
    AuditEvent, AuditSink, BoxFuture, BoxedError, InvoiceLine, InvoiceRequest, InvoicingService,
    NullInvoicing,
    TracingAuditSink,
};
