use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sfe_common::Money;
use sqlx::FromRow;

use crate::{
    db_types::{Product, VersionTag},
    patch::ChangeSet,
};

//--------------------------------------     PatchOutcome    ---------------------------------------------------------

/// What happened to the product row as a result of a patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatchOutcome {
    /// The patch was applied in place.
    Updated(Product),
    /// The patch renamed the product onto an existing name; the returned product is the absorber.
    MergedInto(Product),
    /// The resulting quantity was zero or below, so the row was deleted.
    Removed { product_id: i64 },
}

impl PatchOutcome {
    /// The surviving product, if any.
    pub fn product(&self) -> Option<&Product> {
        match self {
            PatchOutcome::Updated(p) | PatchOutcome::MergedInto(p) => Some(p),
            PatchOutcome::Removed { .. } => None,
        }
    }
}

//--------------------------------------     PatchSummary    ---------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchSummary {
    pub outcome: PatchOutcome,
    /// Field-level diff between the stored product and the patched candidate.
    pub changes: ChangeSet,
    /// The version the stored row carried before the patch.
    pub previous_version: VersionTag,
    /// The token to present on the next optimistic check. `None` when the row was removed.
    pub version: Option<VersionTag>,
}

//--------------------------------------     UpsertOutcome   ---------------------------------------------------------

/// Result of creating a product when an existing row may share the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpsertOutcome {
    Created(Product),
    Merged(Product),
}

impl UpsertOutcome {
    pub fn product(&self) -> &Product {
        match self {
            UpsertOutcome::Created(p) | UpsertOutcome::Merged(p) => p,
        }
    }
}

//--------------------------------------  Analytics rollups  ---------------------------------------------------------

/// Orders-per-product tally, most frequent first.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ProductFrequency {
    pub product_id: i64,
    pub orders: i64,
}

/// Latest order timestamp per product, most recent first.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ProductRecency {
    pub product_id: i64,
    pub last_ordered: DateTime<Utc>,
}

/// Units ordered per product, largest first.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ProductUnits {
    pub product_id: i64,
    pub units: i64,
}

/// Profit per product over matching orders, computed from the snapshot prices as
/// `(retail - wholesale) * quantity`, largest first.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ProductProfit {
    pub product_id: i64,
    pub profit: Money,
}
