use crate::{db_types::Order, shop_api::order_objects::OrderQueryFilter, traits::StorefrontError};

/// Read-side queries over the order table.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Point lookup by id.
    async fn order_by_id(&self, order_id: i64) -> Result<Option<Order>, StorefrontError>;

    /// Fetches orders according to the criteria in the [`OrderQueryFilter`], newest first.
    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, StorefrontError>;
}
