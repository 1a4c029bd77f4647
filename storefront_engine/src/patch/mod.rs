//! # The patch/merge engine.
//!
//! Partial updates to products arrive in one of two styles:
//! * a sequence of structural edit operations (add/remove/replace/move) in the manner of JSON Patch, applied
//!   against a JSON tree view of the product, or
//! * a merge document in the manner of RFC 7386, overlaying only the fields present in the input.
//!
//! Both styles produce a [`ProductDraft`] candidate without touching the stored row; validation and persistence
//! of the candidate happen in the backend, inside the same transaction as the optimistic version check.
mod change_set;
mod document;
mod draft;

pub use change_set::{ChangeSet, FieldChange};
pub use document::{PatchError, PatchOp, ProductPatch};
pub use draft::ProductDraft;
