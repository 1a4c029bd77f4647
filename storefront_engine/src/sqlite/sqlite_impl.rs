//! `SqliteDatabase` is a concrete implementation of a storefront engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module. Every write-side operation runs inside a single `sqlx` transaction; dropping the transaction without
//! committing rolls everything back, so no failure path leaves partial effects behind.
use std::{collections::HashMap, fmt::Debug};

use log::*;
use sqlx::SqlitePool;

use super::db::{analytics, audit, db_url, new_pool, orders, products};
use crate::{
    db_types::{ActingUser, NewAuditEntry, NewOrder, NewProduct, Order, OrderItem, OrderStatusType, Product, VersionTag},
    patch::{ChangeSet, ProductDraft, ProductPatch},
    shop_api::order_objects::OrderQueryFilter,
    traits::{
        OrderItemProblem,
        OrderManagement,
        PatchOutcome,
        PatchSummary,
        ProductFrequency,
        ProductManagement,
        ProductProfit,
        ProductRecency,
        ProductUnits,
        ShopAnalytics,
        StorefrontDatabase,
        StorefrontError,
        UpsertOutcome,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL from the environment.
    pub async fn new(max_connections: u32) -> Result<Self, StorefrontError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, StorefrontError> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl StorefrontDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn place_order(&self, user_id: i64, items: &[OrderItem]) -> Result<Vec<Order>, StorefrontError> {
        if items.is_empty() {
            return Err(StorefrontError::Invalid("Order items cannot be empty".to_string()));
        }
        if items.iter().any(|item| item.quantity < 1) {
            return Err(StorefrontError::Invalid("Each order item quantity must be >= 1".to_string()));
        }
        let mut tx = self.pool.begin().await?;
        // Validation pass. Nothing is mutated here; every problem is collected so the caller sees them all.
        // Requested quantities are accumulated per product so that a request repeating the same product cannot
        // reserve more than the row holds.
        let mut problems = Vec::new();
        let mut resolved = Vec::with_capacity(items.len());
        let mut reserved: HashMap<i64, i64> = HashMap::new();
        for item in items {
            match products::fetch_product(item.product_id, &mut tx).await? {
                None => problems.push(OrderItemProblem::NotFound { product_id: item.product_id }),
                Some(product) => {
                    let running = reserved.entry(product.id).or_insert(0);
                    *running += item.quantity;
                    if product.quantity < *running {
                        problems.push(OrderItemProblem::InsufficientStock {
                            product_id: product.id,
                            name: product.name.clone(),
                            available: product.quantity,
                            requested: *running,
                        });
                    } else {
                        resolved.push((product, item.quantity));
                    }
                },
            }
        }
        if !problems.is_empty() {
            // dropping the transaction rolls it back
            return Err(StorefrontError::OrderPlacement(problems));
        }
        // Commit pass. Snapshots are taken from the rows read above, inside the same transaction, before any
        // stock mutation or deletion. Stock is adjusted once per product, after every line against it has been
        // inserted, so the delete-on-zero rule applies to the combined decrement.
        let mut placed = Vec::with_capacity(resolved.len());
        let mut remaining: HashMap<i64, i64> = HashMap::new();
        for (product, quantity) in resolved {
            let order = orders::insert_order(NewOrder::from_product(user_id, &product, quantity), &mut tx).await?;
            *remaining.entry(product.id).or_insert(product.quantity) -= quantity;
            placed.push(order);
        }
        for (product_id, quantity) in remaining {
            products::set_quantity(product_id, quantity, &mut tx).await?;
        }
        tx.commit().await?;
        debug!("🛒️ User {user_id} placed {} order(s)", placed.len());
        Ok(placed)
    }

    async fn cancel_order(&self, order_id: i64, acting_user: &ActingUser) -> Result<Order, StorefrontError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order(order_id, &mut tx).await?.ok_or(StorefrontError::OrderNotFound(order_id))?;
        if !acting_user.is_admin() && order.user_id != acting_user.id {
            return Err(StorefrontError::Forbidden("You can only cancel your own orders".to_string()));
        }
        match order.status {
            OrderStatusType::Completed => {
                return Err(StorefrontError::Conflict("Cannot cancel a completed order".to_string()))
            },
            OrderStatusType::Cancelled => {
                return Err(StorefrontError::Invalid(format!("Cannot cancel order in state: {}", order.status)))
            },
            OrderStatusType::Processing => {},
        }
        // Restock. If the product row is gone (an earlier sale took it to zero), recreate it from the order's
        // snapshot fields. This must reproduce the historical name, description and prices, not current data.
        match products::fetch_product(order.product_id, &mut tx).await? {
            Some(product) => {
                products::set_quantity(product.id, product.quantity + order.quantity, &mut tx).await?;
            },
            None => {
                let restored = NewProduct {
                    name: order.product_name.clone(),
                    description: order.product_description.clone(),
                    retail_price: order.retail_price,
                    wholesale_price: order.wholesale_price,
                    quantity: order.quantity,
                };
                let product = products::insert_product(restored, &mut tx).await?;
                debug!("🛒️ Product '{}' recreated as #{} from order #{order_id} snapshots", product.name, product.id);
            },
        }
        let order = orders::update_order_status(order.id, OrderStatusType::Cancelled, &mut tx).await?;
        tx.commit().await?;
        debug!("🛒️ Order #{order_id} cancelled and stock returned");
        Ok(order)
    }

    async fn complete_order(&self, order_id: i64) -> Result<Order, StorefrontError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order(order_id, &mut tx).await?.ok_or(StorefrontError::OrderNotFound(order_id))?;
        match order.status {
            OrderStatusType::Cancelled => {
                return Err(StorefrontError::Conflict("Cannot complete a cancelled order".to_string()))
            },
            OrderStatusType::Completed => {
                return Err(StorefrontError::Conflict("Order already completed".to_string()))
            },
            OrderStatusType::Processing => {},
        }
        // No stock movement: stock was already deducted at placement.
        let order = orders::update_order_status(order.id, OrderStatusType::Completed, &mut tx).await?;
        tx.commit().await?;
        debug!("🛒️ Order #{order_id} completed");
        Ok(order)
    }

    async fn patch_product(
        &self,
        product_id: i64,
        patch: &ProductPatch,
        expected_version: Option<VersionTag>,
    ) -> Result<PatchSummary, StorefrontError> {
        let mut tx = self.pool.begin().await?;
        let product =
            products::fetch_product(product_id, &mut tx).await?.ok_or(StorefrontError::ProductNotFound(product_id))?;
        // Pessimistic short-circuit: a stale token fails before the patch is applied at all.
        if let Some(expected) = expected_version {
            if expected != product.version {
                return Err(StorefrontError::PreconditionFailed { expected, actual: product.version });
            }
        }
        let patched = patch.apply_to(&ProductDraft::from(&product))?;
        patched.validate().map_err(StorefrontError::Validation)?;
        let changes = ChangeSet::diff(&product, &patched);
        let previous_version = product.version;

        // Merge-by-name: renaming onto another product's name consolidates the two rows instead of tripping a
        // uniqueness failure.
        if patched.name != product.name {
            if let Some(other) = products::fetch_product_by_name_excluding(&patched.name, product.id, &mut tx).await? {
                let merged_quantity = other.quantity + patched.quantity;
                products::delete_product(product.id, &mut tx).await?;
                let outcome = if merged_quantity <= 0 {
                    products::delete_product(other.id, &mut tx).await?;
                    PatchOutcome::Removed { product_id: other.id }
                } else {
                    let absorbed = ProductDraft {
                        name: other.name.clone(),
                        description: patched.description.clone(),
                        retail_price: patched.retail_price,
                        wholesale_price: patched.wholesale_price,
                        quantity: merged_quantity,
                    };
                    let updated = products::update_product_fields(other.id, &absorbed, &mut tx).await?;
                    PatchOutcome::MergedInto(updated)
                };
                tx.commit().await?;
                debug!("🛒️ Product #{product_id} merged into '{}' by rename", patched.name);
                let version = outcome.product().map(|p| p.version);
                return Ok(PatchSummary { outcome, changes, previous_version, version });
            }
        }

        let outcome = if patched.quantity <= 0 {
            products::delete_product(product.id, &mut tx).await?;
            PatchOutcome::Removed { product_id: product.id }
        } else {
            let updated = products::update_product_fields(product.id, &patched, &mut tx).await?;
            PatchOutcome::Updated(updated)
        };
        tx.commit().await?;
        trace!("🛒️ Product #{product_id} patched ({} field(s) changed)", changes.len());
        let version = outcome.product().map(|p| p.version);
        Ok(PatchSummary { outcome, changes, previous_version, version })
    }

    async fn upsert_product(&self, product: NewProduct) -> Result<UpsertOutcome, StorefrontError> {
        if product.quantity < 1 {
            return Err(StorefrontError::Invalid("Quantity must be greater than 0".to_string()));
        }
        let draft = ProductDraft::from(&product);
        draft.validate().map_err(StorefrontError::Validation)?;
        let mut tx = self.pool.begin().await?;
        let outcome = match products::fetch_product_by_name(&product.name, &mut tx).await? {
            Some(existing) => {
                // Same-name creation merges: incoming description and prices win, quantities accumulate.
                let merged = ProductDraft {
                    name: existing.name.clone(),
                    description: product.description.clone(),
                    retail_price: product.retail_price,
                    wholesale_price: product.wholesale_price,
                    quantity: existing.quantity + product.quantity,
                };
                let updated = products::update_product_fields(existing.id, &merged, &mut tx).await?;
                UpsertOutcome::Merged(updated)
            },
            None => {
                let created = products::insert_product(product, &mut tx).await?;
                UpsertOutcome::Created(created)
            },
        };
        tx.commit().await?;
        Ok(outcome)
    }

    async fn record_audit(&self, entry: NewAuditEntry) -> Result<(), StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        audit::insert_audit_entry(entry, &mut conn).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), StorefrontError> {
        self.pool.close().await;
        Ok(())
    }
}

impl ProductManagement for SqliteDatabase {
    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        products::fetch_product(product_id, &mut conn).await
    }

    async fn fetch_product_by_name(&self, name: &str) -> Result<Option<Product>, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        products::fetch_product_by_name(name, &mut conn).await
    }

    async fn fetch_products(&self, limit: i64, offset: i64) -> Result<Vec<Product>, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        products::fetch_products(limit, offset, &mut conn).await
    }
}

impl OrderManagement for SqliteDatabase {
    async fn order_by_id(&self, order_id: i64) -> Result<Option<Order>, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order(order_id, &mut conn).await
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        orders::search_orders(query, &mut conn).await
    }
}

impl ShopAnalytics for SqliteDatabase {
    async fn top_by_frequency(
        &self,
        n: i64,
        statuses: &[OrderStatusType],
    ) -> Result<Vec<ProductFrequency>, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        analytics::top_by_frequency(n, statuses, &mut conn).await
    }

    async fn top_by_recency(
        &self,
        n: i64,
        statuses: &[OrderStatusType],
    ) -> Result<Vec<ProductRecency>, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        analytics::top_by_recency(n, statuses, &mut conn).await
    }

    async fn top_by_units(&self, n: i64, statuses: &[OrderStatusType]) -> Result<Vec<ProductUnits>, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        analytics::top_by_units(n, statuses, &mut conn).await
    }

    async fn top_by_profit(&self, n: i64, statuses: &[OrderStatusType]) -> Result<Vec<ProductProfit>, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        analytics::top_by_profit(n, statuses, &mut conn).await
    }

    async fn total_units_sold(&self) -> Result<i64, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        analytics::total_units_sold(&mut conn).await
    }
}
