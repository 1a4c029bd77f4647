use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{db_types::Product, patch::ProductDraft};

//--------------------------------------     FieldChange     ---------------------------------------------------------

/// One changed field, with its before and after values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub from: Value,
    pub to: Value,
}

//--------------------------------------      ChangeSet      ---------------------------------------------------------

/// The field-level diff between a stored product and its patched candidate, covering the five mutable fields.
/// This is what gets handed to the audit sink.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet(Vec<FieldChange>);

impl ChangeSet {
    /// Compares the stored product against the candidate and records a `{field, from, to}` triple for every
    /// field whose value differs.
    pub fn diff(old: &Product, new: &ProductDraft) -> Self {
        let mut changes = Vec::new();
        push_change(&mut changes, "name", Value::from(old.name.as_str()), Value::from(new.name.as_str()));
        push_change(&mut changes, "description", option_to_value(&old.description), option_to_value(&new.description));
        push_change(
            &mut changes,
            "retail_price",
            Value::from(old.retail_price.value()),
            Value::from(new.retail_price.value()),
        );
        push_change(
            &mut changes,
            "wholesale_price",
            Value::from(old.wholesale_price.value()),
            Value::from(new.wholesale_price.value()),
        );
        push_change(&mut changes, "quantity", Value::from(old.quantity), Value::from(new.quantity));
        Self(changes)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldChange> {
        self.0.iter()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|c| c.field == field)
    }

    /// Renders the change set as the JSON object recorded in the audit log:
    /// `{"name": {"from": "A", "to": "B"}, ...}`.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for change in &self.0 {
            let mut entry = Map::new();
            entry.insert("from".to_string(), change.from.clone());
            entry.insert("to".to_string(), change.to.clone());
            map.insert(change.field.clone(), Value::Object(entry));
        }
        Value::Object(map)
    }
}

fn push_change(changes: &mut Vec<FieldChange>, field: &str, from: Value, to: Value) {
    if from != to {
        changes.push(FieldChange { field: field.to_string(), from, to });
    }
}

fn option_to_value(value: &Option<String>) -> Value {
    value.as_deref().map(Value::from).unwrap_or(Value::Null)
}
