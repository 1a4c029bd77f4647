use sfe_common::Money;
use storefront_engine::{
    db_types::{OrderItem, OrderStatusType},
    AnalyticsApi,
    ShopAnalytics,
    StorefrontDatabase,
    StorefrontError,
};

mod support;

use support::{seed_product, setup, tear_down};

/// Seeds three products and a spread of orders:
/// * Teapot (2 completed orders, 5 units, margin 699 each)
/// * Mug (1 completed order, 10 units, margin 100 each)
/// * Saucer (1 processing order, 1 unit, margin 50)
async fn seed_shop(db: &storefront_engine::SqliteDatabase) -> (i64, i64, i64) {
    let teapot = seed_product(db, "Teapot", 1099, 400, 20).await;
    let mug = seed_product(db, "Mug", 500, 400, 20).await;
    let saucer = seed_product(db, "Saucer", 250, 200, 20).await;

    let o1 = db.place_order(101, &[OrderItem { product_id: teapot.id, quantity: 2 }]).await.unwrap();
    let o2 = db.place_order(102, &[OrderItem { product_id: teapot.id, quantity: 3 }]).await.unwrap();
    let o3 = db.place_order(101, &[OrderItem { product_id: mug.id, quantity: 10 }]).await.unwrap();
    db.place_order(103, &[OrderItem { product_id: saucer.id, quantity: 1 }]).await.unwrap();
    for order in o1.iter().chain(&o2).chain(&o3) {
        db.complete_order(order.id).await.unwrap();
    }
    (teapot.id, mug.id, saucer.id)
}

#[tokio::test]
async fn top_by_units_ranks_and_filters_by_status() {
    let db = setup().await;
    let (teapot, mug, saucer) = seed_shop(&db).await;
    let api = AnalyticsApi::new(db.clone());

    let all = api.top_by_units(10, &[]).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!((all[0].product_id, all[0].units), (mug, 10));
    assert_eq!((all[1].product_id, all[1].units), (teapot, 5));
    assert_eq!((all[2].product_id, all[2].units), (saucer, 1));

    let completed = api.top_by_units(10, &[OrderStatusType::Completed]).await.unwrap();
    assert_eq!(completed.len(), 2, "the saucer order is still processing");
    assert!(completed.iter().all(|r| r.product_id != saucer));
    tear_down(db).await;
}

#[tokio::test]
async fn top_by_frequency_counts_orders_not_units() {
    let db = setup().await;
    let (teapot, mug, _) = seed_shop(&db).await;
    let api = AnalyticsApi::new(db.clone());

    let rows = api.top_by_frequency(2, &[OrderStatusType::Completed]).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!((rows[0].product_id, rows[0].orders), (teapot, 2));
    assert_eq!((rows[1].product_id, rows[1].orders), (mug, 1));
    tear_down(db).await;
}

#[tokio::test]
async fn profit_is_computed_from_order_snapshots() {
    let db = setup().await;
    let (teapot, mug, _) = seed_shop(&db).await;
    let api = AnalyticsApi::new(db.clone());

    // raise the teapot price after the fact; historical profit must not move
    let patch = storefront_engine::patch::ProductPatch::merge(serde_json::json!({"retail_price": 9999}));
    db.patch_product(teapot, &patch, None).await.unwrap();

    let rows = api.top_by_profit(10, &[OrderStatusType::Completed]).await.unwrap();
    assert_eq!(rows[0].product_id, teapot);
    assert_eq!(rows[0].profit, Money::from_cents(5 * (1099 - 400)));
    assert_eq!(rows[1].product_id, mug);
    assert_eq!(rows[1].profit, Money::from_cents(10 * (500 - 400)));
    tear_down(db).await;
}

#[tokio::test]
async fn ties_break_by_ascending_product_id() {
    let db = setup().await;
    let first = seed_product(&db, "Fork", 300, 100, 10).await;
    let second = seed_product(&db, "Spoon", 300, 100, 10).await;
    db.place_order(101, &[
        OrderItem { product_id: first.id, quantity: 2 },
        OrderItem { product_id: second.id, quantity: 2 },
    ])
    .await
    .unwrap();

    let rows = db.top_by_units(10, &[]).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].product_id < rows[1].product_id, "equal metrics must order by product id");
    tear_down(db).await;
}

#[tokio::test]
async fn recency_is_non_increasing_and_bounded_by_n() {
    let db = setup().await;
    seed_shop(&db).await;
    let api = AnalyticsApi::new(db.clone());

    let rows = api.top_by_recency(2, &[]).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].last_ordered >= rows[1].last_ordered);

    let err = api.top_by_recency(0, &[]).await.unwrap_err();
    assert!(matches!(err, StorefrontError::Invalid(_)), "n must be at least 1");
    tear_down(db).await;
}

#[tokio::test]
async fn total_units_sold_counts_completed_orders_only() {
    let db = setup().await;
    seed_shop(&db).await;
    let api = AnalyticsApi::new(db.clone());

    // 5 teapots + 10 mugs completed; the saucer order is still processing
    assert_eq!(api.total_units_sold().await.unwrap(), 15);
    tear_down(db).await;
}
