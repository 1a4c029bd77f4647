use crate::{db_types::Product, traits::StorefrontError};

/// Read-side queries over the product table.
#[allow(async_fn_in_trait)]
pub trait ProductManagement {
    /// Point lookup by id. Returns `None` if the product does not exist (including products deleted because
    /// their stock collapsed to zero).
    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, StorefrontError>;

    /// Unique-field lookup by name. Name uniqueness is a soft invariant maintained by the merge-by-name rule,
    /// so at most one row matches.
    async fn fetch_product_by_name(&self, name: &str) -> Result<Option<Product>, StorefrontError>;

    /// Paginated scan ordered by ascending product id.
    async fn fetch_products(&self, limit: i64, offset: i64) -> Result<Vec<Product>, StorefrontError>;
}
