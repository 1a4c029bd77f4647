use std::fmt::Debug;

use crate::{
    db_types::OrderStatusType,
    traits::{ProductFrequency, ProductProfit, ProductRecency, ProductUnits, ShopAnalytics, StorefrontError},
};

/// Read-only sales leaderboards. Every `top_*` method takes the leaderboard size `n` and an optional status
/// filter; an empty `statuses` slice means all statuses count. Ties on the metric break by ascending product id,
/// so results are deterministic.
pub struct AnalyticsApi<B> {
    db: B,
}

impl<B> Debug for AnalyticsApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AnalyticsApi")
    }
}

impl<B> AnalyticsApi<B>
where B: ShopAnalytics
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Products ranked by the number of orders placed against them.
    pub async fn top_by_frequency(
        &self,
        n: i64,
        statuses: &[OrderStatusType],
    ) -> Result<Vec<ProductFrequency>, StorefrontError> {
        check_n(n)?;
        self.db.top_by_frequency(n, statuses).await
    }

    /// Products ranked by how recently they were last ordered.
    pub async fn top_by_recency(
        &self,
        n: i64,
        statuses: &[OrderStatusType],
    ) -> Result<Vec<ProductRecency>, StorefrontError> {
        check_n(n)?;
        self.db.top_by_recency(n, statuses).await
    }

    /// Products ranked by total units ordered.
    pub async fn top_by_units(
        &self,
        n: i64,
        statuses: &[OrderStatusType],
    ) -> Result<Vec<ProductUnits>, StorefrontError> {
        check_n(n)?;
        self.db.top_by_units(n, statuses).await
    }

    /// Products ranked by gross profit, i.e. the sum over orders of (retail - wholesale) * quantity, priced at
    /// the snapshots taken when each order was placed.
    pub async fn top_by_profit(
        &self,
        n: i64,
        statuses: &[OrderStatusType],
    ) -> Result<Vec<ProductProfit>, StorefrontError> {
        check_n(n)?;
        self.db.top_by_profit(n, statuses).await
    }

    /// Total units across all completed orders.
    pub async fn total_units_sold(&self) -> Result<i64, StorefrontError> {
        self.db.total_units_sold().await
    }
}

fn check_n(n: i64) -> Result<(), StorefrontError> {
    if n < 1 {
        return Err(StorefrontError::Invalid(format!("Leaderboard size must be at least 1, got {n}")));
    }
    Ok(())
}
