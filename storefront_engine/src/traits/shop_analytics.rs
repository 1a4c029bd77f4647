use crate::{
    db_types::OrderStatusType,
    traits::{
        data_objects::{ProductFrequency, ProductProfit, ProductRecency, ProductUnits},
        StorefrontError,
    },
};

/// Read-only rollups over order history, grouped by product id.
///
/// Every query takes a status filter (`statuses` empty means "all statuses"; passing `[Completed]` restricts the
/// rollup to fulfilled orders) and a top-N limit. Ties are always broken by ascending product id so that results
/// are deterministic.
#[allow(async_fn_in_trait)]
pub trait ShopAnalytics {
    /// Top-N products by number of matching orders.
    async fn top_by_frequency(
        &self,
        n: i64,
        statuses: &[OrderStatusType],
    ) -> Result<Vec<ProductFrequency>, StorefrontError>;

    /// Top-N products by most recent matching order.
    async fn top_by_recency(&self, n: i64, statuses: &[OrderStatusType])
        -> Result<Vec<ProductRecency>, StorefrontError>;

    /// Top-N products by total units across matching orders.
    async fn top_by_units(&self, n: i64, statuses: &[OrderStatusType]) -> Result<Vec<ProductUnits>, StorefrontError>;

    /// Top-N products by summed `(retail - wholesale) * quantity` over the snapshot prices of matching orders.
    async fn top_by_profit(&self, n: i64, statuses: &[OrderStatusType]) -> Result<Vec<ProductProfit>, StorefrontError>;

    /// Total units across `Completed` orders.
    async fn total_units_sold(&self) -> Result<i64, StorefrontError>;
}
