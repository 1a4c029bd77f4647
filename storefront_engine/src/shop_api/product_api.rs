use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{ActingUser, NewAuditEntry, NewProduct, Product, VersionTag},
    events::{AuditEvent, EventProducers},
    patch::ProductPatch,
    traits::{PatchSummary, StorefrontDatabase, StorefrontError, UpsertOutcome},
};

/// `ProductApi` handles the catalogue: creation, partial updates with optimistic concurrency, and lookups.
/// Mutating methods are administrator-only and emit an audit event after the backend transaction commits.
pub struct ProductApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for ProductApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProductApi")
    }
}

impl<B> ProductApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> ProductApi<B>
where B: StorefrontDatabase
{
    /// Applies a patch to a product. The `expected_version` token, if supplied, must match the stored version
    /// exactly or the patch is rejected untried.
    pub async fn patch_product(
        &self,
        product_id: i64,
        patch: &ProductPatch,
        expected_version: Option<VersionTag>,
        user: &ActingUser,
    ) -> Result<PatchSummary, StorefrontError> {
        if !user.is_admin() {
            return Err(StorefrontError::Forbidden("Only administrators can edit products".to_string()));
        }
        let summary = self.db.patch_product(product_id, patch, expected_version).await?;
        if !summary.changes.is_empty() {
            let entry = NewAuditEntry {
                resource_type: "product".to_string(),
                resource_id: product_id,
                user_id: Some(user.id),
                change_set: summary.changes.to_json(),
                previous_version: Some(summary.previous_version),
                new_version: summary.version,
            };
            self.call_audit_hook(entry).await;
        }
        debug!("🔄️🏷️ Product #{product_id} patched by user {}", user.id);
        Ok(summary)
    }

    /// Creates a product, or merges into an existing one with the same name.
    pub async fn create_product(
        &self,
        product: NewProduct,
        user: &ActingUser,
    ) -> Result<UpsertOutcome, StorefrontError> {
        if !user.is_admin() {
            return Err(StorefrontError::Forbidden("Only administrators can create products".to_string()));
        }
        let name = product.name.clone();
        let outcome = self.db.upsert_product(product).await?;
        let (verb, product) = match &outcome {
            UpsertOutcome::Created(p) => ("created", p),
            UpsertOutcome::Merged(p) => ("merged", p),
        };
        let entry = NewAuditEntry {
            resource_type: "product".to_string(),
            resource_id: product.id,
            user_id: Some(user.id),
            change_set: serde_json::json!({"name": {"from": null, "to": name}}),
            previous_version: None,
            new_version: Some(product.version),
        };
        self.call_audit_hook(entry).await;
        debug!("🔄️🏷️ Product '{}' {verb} as #{}", product.name, product.id);
        Ok(outcome)
    }

    pub async fn product_by_id(&self, product_id: i64) -> Result<Option<Product>, StorefrontError> {
        self.db.fetch_product(product_id).await
    }

    pub async fn product_by_name(&self, name: &str) -> Result<Option<Product>, StorefrontError> {
        self.db.fetch_product_by_name(name).await
    }

    pub async fn products(&self, limit: i64, offset: i64) -> Result<Vec<Product>, StorefrontError> {
        self.db.fetch_products(limit, offset).await
    }

    async fn call_audit_hook(&self, entry: NewAuditEntry) {
        for emitter in &self.producers.audit_producer {
            trace!("🔄️🏷️ Notifying audit hook subscribers");
            emitter.publish_event(AuditEvent::new(entry.clone())).await;
        }
    }
}
