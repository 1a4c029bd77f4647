use sqlx::SqliteConnection;

use crate::{
    db_types::OrderStatusType,
    traits::{ProductFrequency, ProductProfit, ProductRecency, ProductUnits, StorefrontError},
};

/// Renders the status filter as a `WHERE status IN (...)` fragment. An empty filter means all statuses.
/// The values come from the enum's `Display`, so interpolating them directly is safe.
fn status_filter(statuses: &[OrderStatusType]) -> String {
    if statuses.is_empty() {
        return String::new();
    }
    let list = statuses.iter().map(|s| format!("'{s}'")).collect::<Vec<_>>().join(",");
    format!("WHERE status IN ({list})")
}

pub async fn top_by_frequency(
    n: i64,
    statuses: &[OrderStatusType],
    conn: &mut SqliteConnection,
) -> Result<Vec<ProductFrequency>, StorefrontError> {
    let sql = format!(
        "SELECT product_id, COUNT(*) AS orders FROM orders {} GROUP BY product_id \
         ORDER BY orders DESC, product_id ASC LIMIT $1",
        status_filter(statuses)
    );
    let rows = sqlx::query_as(&sql).bind(n).fetch_all(conn).await?;
    Ok(rows)
}

pub async fn top_by_recency(
    n: i64,
    statuses: &[OrderStatusType],
    conn: &mut SqliteConnection,
) -> Result<Vec<ProductRecency>, StorefrontError> {
    let sql = format!(
        "SELECT product_id, MAX(created_at) AS last_ordered FROM orders {} GROUP BY product_id \
         ORDER BY last_ordered DESC, product_id ASC LIMIT $1",
        status_filter(statuses)
    );
    let rows = sqlx::query_as(&sql).bind(n).fetch_all(conn).await?;
    Ok(rows)
}

pub async fn top_by_units(
    n: i64,
    statuses: &[OrderStatusType],
    conn: &mut SqliteConnection,
) -> Result<Vec<ProductUnits>, StorefrontError> {
    let sql = format!(
        "SELECT product_id, SUM(quantity) AS units FROM orders {} GROUP BY product_id \
         ORDER BY units DESC, product_id ASC LIMIT $1",
        status_filter(statuses)
    );
    let rows = sqlx::query_as(&sql).bind(n).fetch_all(conn).await?;
    Ok(rows)
}

/// Profit is computed from the order snapshots, not the live product table, so repricing or deleting a product
/// never rewrites history.
pub async fn top_by_profit(
    n: i64,
    statuses: &[OrderStatusType],
    conn: &mut SqliteConnection,
) -> Result<Vec<ProductProfit>, StorefrontError> {
    let sql = format!(
        "SELECT product_id, SUM((retail_price - wholesale_price) * quantity) AS profit FROM orders {} \
         GROUP BY product_id ORDER BY profit DESC, product_id ASC LIMIT $1",
        status_filter(statuses)
    );
    let rows = sqlx::query_as(&sql).bind(n).fetch_all(conn).await?;
    Ok(rows)
}

pub async fn total_units_sold(conn: &mut SqliteConnection) -> Result<i64, StorefrontError> {
    let (total,): (i64,) =
        sqlx::query_as("SELECT COALESCE(SUM(quantity), 0) FROM orders WHERE status = 'Completed'")
            .fetch_one(conn)
            .await?;
    Ok(total)
}
