use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::patch::ProductDraft;

#[derive(Debug, Clone, Error)]
pub enum PatchError {
    #[error("Path does not exist: {0}")]
    UnknownPath(String),
    #[error("Path is not valid for this resource: {0}")]
    InvalidPath(String),
    #[error("Patched document is not a valid product: {0}")]
    InvalidResult(String),
}

//--------------------------------------       PatchOp       ---------------------------------------------------------

/// A single structural edit in the JSON Patch style. `path` and `from` are JSON pointers, e.g. `/name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOp {
    Add { path: String, value: Value },
    Remove { path: String },
    Replace { path: String, value: Value },
    Move { from: String, path: String },
}

//--------------------------------------     ProductPatch    ---------------------------------------------------------

/// A partial update in one of the two supported styles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductPatch {
    /// A sequence of structural edit operations, applied in order.
    Operations(Vec<PatchOp>),
    /// A merge document: only the fields present in the input are overlaid onto the current object, with
    /// explicit nulls clearing the field.
    Merge(Value),
}

impl ProductPatch {
    pub fn operations(ops: Vec<PatchOp>) -> Self {
        ProductPatch::Operations(ops)
    }

    pub fn merge(doc: Value) -> Self {
        ProductPatch::Merge(doc)
    }

    /// Applies the patch to a tree view of the draft and deserializes the result back into a candidate draft.
    /// The stored product is never touched; the caller decides whether the candidate is persisted.
    pub fn apply_to(&self, target: &ProductDraft) -> Result<ProductDraft, PatchError> {
        let mut tree = serde_json::to_value(target).map_err(|e| PatchError::InvalidResult(e.to_string()))?;
        match self {
            ProductPatch::Operations(ops) => {
                for op in ops {
                    apply_op(&mut tree, op)?;
                }
            },
            ProductPatch::Merge(doc) => {
                tree = merge_value(tree, doc);
            },
        }
        serde_json::from_value(tree).map_err(|e| PatchError::InvalidResult(e.to_string()))
    }
}

fn apply_op(tree: &mut Value, op: &PatchOp) -> Result<(), PatchError> {
    match op {
        PatchOp::Add { path, value } => {
            let (map, key) = resolve_parent(tree, path)?;
            map.insert(key, value.clone());
        },
        PatchOp::Remove { path } => {
            let (map, key) = resolve_parent(tree, path)?;
            // nulling rather than dropping the key keeps the document deserializable as a draft
            match map.get_mut(&key) {
                Some(slot) => *slot = Value::Null,
                None => return Err(PatchError::UnknownPath(path.clone())),
            }
        },
        PatchOp::Replace { path, value } => {
            let (map, key) = resolve_parent(tree, path)?;
            match map.get_mut(&key) {
                Some(slot) => *slot = value.clone(),
                None => return Err(PatchError::UnknownPath(path.clone())),
            }
        },
        PatchOp::Move { from, path } => {
            let value = {
                let (map, key) = resolve_parent(tree, from)?;
                match map.get_mut(&key) {
                    Some(slot) => std::mem::replace(slot, Value::Null),
                    None => return Err(PatchError::UnknownPath(from.clone())),
                }
            };
            let (map, key) = resolve_parent(tree, path)?;
            map.insert(key, value);
        },
    }
    Ok(())
}

/// Resolves a JSON pointer down to its parent object and final key. The product tree only contains objects, so
/// array indexing is not supported.
fn resolve_parent<'a>(tree: &'a mut Value, pointer: &str) -> Result<(&'a mut Map<String, Value>, String), PatchError> {
    let Some(rest) = pointer.strip_prefix('/') else {
        return Err(PatchError::InvalidPath(pointer.to_string()));
    };
    let mut segments: Vec<String> = rest.split('/').map(unescape_segment).collect();
    let Some(last) = segments.pop() else {
        return Err(PatchError::InvalidPath(pointer.to_string()));
    };
    let mut current = tree;
    for segment in &segments {
        current = match current {
            Value::Object(map) => {
                map.get_mut(segment).ok_or_else(|| PatchError::UnknownPath(pointer.to_string()))?
            },
            _ => return Err(PatchError::UnknownPath(pointer.to_string())),
        };
    }
    match current {
        Value::Object(map) => Ok((map, last)),
        _ => Err(PatchError::UnknownPath(pointer.to_string())),
    }
}

fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// RFC 7386 merge: objects merge member-wise, explicit nulls clear the member, anything else replaces wholesale.
fn merge_value(target: Value, patch: &Value) -> Value {
    match (target, patch) {
        (Value::Object(mut tgt), Value::Object(overlay)) => {
            for (key, value) in overlay {
                if value.is_null() {
                    // keep the key as an explicit null so the draft deserializes with the field cleared
                    tgt.insert(key.clone(), Value::Null);
                } else {
                    let merged = match tgt.remove(key) {
                        Some(existing) => merge_value(existing, value),
                        None => value.clone(),
                    };
                    tgt.insert(key.clone(), merged);
                }
            }
            Value::Object(tgt)
        },
        (_, other) => other.clone(),
    }
}
