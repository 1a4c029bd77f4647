//! Stateless pub-sub plumbing for the audit trail.
//!
//! Business operations never write audit rows inline. They publish an [`AuditEvent`] after their transaction has
//! committed, and a subscriber (usually [`crate::traits::StorefrontDatabase::record_audit`]) persists it out of
//! band. A lost audit entry is logged and swallowed; it never fails the operation that produced it.
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
