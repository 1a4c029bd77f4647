use thiserror::Error;

use crate::{
    db_types::{ActingUser, NewAuditEntry, NewProduct, Order, OrderItem, VersionTag},
    patch::ProductPatch,
    traits::{
        data_objects::{PatchSummary, UpsertOutcome},
        OrderManagement,
        ProductManagement,
    },
};

/// This trait defines the write side of a storefront engine backend.
///
/// Every method runs as one atomic transaction: either all of its effects are observable, or none are. The
/// cross-entity invariant the implementations must uphold is that the sum of live order reservations never exceeds
/// the original stock, and that no product row survives with a non-positive quantity.
#[allow(async_fn_in_trait)]
pub trait StorefrontDatabase: Clone + ProductManagement + OrderManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Places a multi-item order for `user_id`.
    ///
    /// A validation pass runs first and performs no mutation: every item is resolved, and *all* failures
    /// (unknown product, insufficient stock) are collected into a single
    /// [`StorefrontError::OrderPlacement`] rejection so the caller sees every problem at once.
    ///
    /// The commit pass then, for each item: snapshots the product's name, description and prices into a new
    /// `Processing` order row, decrements stock, and deletes the product row outright if the remaining quantity
    /// is zero or below. All items share the one transaction.
    ///
    /// Preconditions (`items` non-empty, every quantity >= 1) fail fast with [`StorefrontError::Invalid`].
    async fn place_order(&self, user_id: i64, items: &[OrderItem]) -> Result<Vec<Order>, StorefrontError>;

    /// Cancels a `Processing` order and returns its stock to the shelf.
    ///
    /// The acting user must own the order or be an administrator. Cancelling a `Completed` order is a
    /// [`StorefrontError::Conflict`]; any other non-`Processing` status is [`StorefrontError::Invalid`].
    ///
    /// If the referenced product still exists its quantity is incremented by the order's quantity. If it was
    /// deleted (an earlier sale took it to zero), it is recreated from the order's snapshot fields. This is the
    /// only path by which a deleted product resurfaces, and it must reproduce the historical name, description
    /// and prices exactly.
    async fn cancel_order(&self, order_id: i64, acting_user: &ActingUser) -> Result<Order, StorefrontError>;

    /// Marks a `Processing` order as `Completed`. No stock movement: stock was already deducted at placement.
    ///
    /// Completing a `Cancelled` or already-`Completed` order is a [`StorefrontError::Conflict`].
    async fn complete_order(&self, order_id: i64) -> Result<Order, StorefrontError>;

    /// Applies a partial update to a product.
    ///
    /// If `expected_version` is given it must exactly match the stored version; a mismatch short-circuits with
    /// [`StorefrontError::PreconditionFailed`] before the patch is applied. The patched candidate is validated
    /// (non-empty name, non-negative prices and quantity) and then persisted, with two twists:
    /// * renaming onto another product's name merges the two rows (the other product absorbs description and
    ///   prices, quantities are summed, the renamed row is deleted);
    /// * a resulting quantity of zero or below deletes the row instead of saving it.
    ///
    /// Returns the outcome, the field-level change set, and the next version tag.
    async fn patch_product(
        &self,
        product_id: i64,
        patch: &ProductPatch,
        expected_version: Option<VersionTag>,
    ) -> Result<PatchSummary, StorefrontError>;

    /// Creates a product, or merges into an existing product carrying the same name (summed quantities, the
    /// incoming description and prices win). The initial quantity must be >= 1.
    async fn upsert_product(&self, product: NewProduct) -> Result<UpsertOutcome, StorefrontError>;

    /// Persists an audit entry. Used by the default audit sink subscriber; runs outside any business
    /// transaction, after commit.
    async fn record_audit(&self, entry: NewAuditEntry) -> Result<(), StorefrontError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), StorefrontError> {
        Ok(())
    }
}

//--------------------------------------   OrderItemProblem  ---------------------------------------------------------

/// A single item-level failure discovered during the order-placement validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum OrderItemProblem {
    #[error("Product not found: {product_id}")]
    NotFound { product_id: i64 },
    #[error("Insufficient stock for product: {name}")]
    InsufficientStock { product_id: i64, name: String, available: i64, requested: i64 },
}

fn join_problems(problems: &[OrderItemProblem]) -> String {
    problems.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

//--------------------------------------   StorefrontError   ---------------------------------------------------------

#[derive(Debug, Clone, Error)]
pub enum StorefrontError {
    #[error("We have an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("The requested product {0} does not exist")]
    ProductNotFound(i64),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(i64),
    #[error("Invalid request: {0}")]
    Invalid(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Version precondition failed: expected {expected}, but the product is at {actual}")]
    PreconditionFailed { expected: VersionTag, actual: VersionTag },
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Failed to process order: {}", join_problems(.0))]
    OrderPlacement(Vec<OrderItemProblem>),
    #[error("Patched product failed validation: {0}")]
    Validation(String),
    #[error("Invalid patch document: {0}")]
    InvalidPatch(String),
}

impl From<sqlx::Error> for StorefrontError {
    fn from(e: sqlx::Error) -> Self {
        StorefrontError::DatabaseError(e.to_string())
    }
}

impl From<crate::patch::PatchError> for StorefrontError {
    fn from(e: crate::patch::PatchError) -> Self {
        StorefrontError::InvalidPatch(e.to_string())
    }
}
