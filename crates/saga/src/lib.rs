//! Saga pattern implementation for invoice creation.
//!
//! This crate orchestrates the two-step invoice creation saga against the
//! remote accounting service:
//! 1. Create the invoice record (and perform e-invoicing)
//! 2. Generate the invoice PDF and store it
//!
//! Each completed step is journaled before the next one begins, so an
//! interrupted saga resumes from its last durable step instead of
//! re-running remote calls. Transient failures are retried with bounded
//! exponential backoff; application-level rejections fail the saga.
//! Duplicate or concurrent starts for the same saga ID attach to the one
//! in-flight execution.

pub mod coordinator;
pub mod error;
pub mod events;
pub mod instance;
pub mod invoice_creation;
pub mod request;
pub mod retry;
pub mod state;

pub use coordinator::{SagaCoordinator, SagaOutcome};
pub use error::SagaError;
pub use events::SagaEvent;
pub use instance::SagaInstance;
pub use request::InvoiceRequest;
pub use retry::RetryPolicy;
pub use state::SagaState;
