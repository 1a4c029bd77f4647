use crate::db_types::NewAuditEntry;

/// Fired after a state-changing operation commits. Carries everything the audit sink needs to persist the entry,
/// so handlers need no access to the engine's internals.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub entry: NewAuditEntry,
}

impl AuditEvent {
    pub fn new(entry: NewAuditEntry) -> Self {
        Self { entry }
    }
}
