use log::*;
use storefront_engine::{
    db_types::{ActingUser, OrderItem, OrderStatusType},
    events::EventProducers,
    OrderFlowApi,
    OrderItemProblem,
    ProductManagement,
    StorefrontDatabase,
    StorefrontError,
};

mod support;

use support::{seed_product, setup, tear_down};

#[tokio::test]
async fn placing_an_order_reserves_stock_and_snapshots_the_product() {
    let db = setup().await;
    let product = seed_product(&db, "Teapot", 1099, 400, 5).await;

    let orders = db.place_order(101, &[OrderItem { product_id: product.id, quantity: 3 }]).await.unwrap();
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order.status, OrderStatusType::Processing);
    assert_eq!(order.quantity, 3);
    assert_eq!(order.product_name, "Teapot");
    assert_eq!(order.retail_price.value(), 1099);
    assert_eq!(order.wholesale_price.value(), 400);

    let product = db.fetch_product(product.id).await.unwrap().expect("product should still exist");
    assert_eq!(product.quantity, 2);
    tear_down(db).await;
}

#[tokio::test]
async fn cancelling_returns_stock_and_blocks_completion() {
    let db = setup().await;
    let product = seed_product(&db, "Teapot", 1099, 400, 5).await;
    let orders = db.place_order(101, &[OrderItem { product_id: product.id, quantity: 3 }]).await.unwrap();
    let order_id = orders[0].id;

    let cancelled = db.cancel_order(order_id, &ActingUser::customer(101)).await.unwrap();
    assert_eq!(cancelled.status, OrderStatusType::Cancelled);
    let product = db.fetch_product(product.id).await.unwrap().unwrap();
    assert_eq!(product.quantity, 5);

    let err = db.complete_order(order_id).await.unwrap_err();
    assert!(matches!(err, StorefrontError::Conflict(_)), "completing a cancelled order must conflict, got {err}");
    tear_down(db).await;
}

#[tokio::test]
async fn cancelling_twice_is_invalid_and_does_not_double_restock() {
    let db = setup().await;
    let product = seed_product(&db, "Teapot", 1099, 400, 5).await;
    let orders = db.place_order(101, &[OrderItem { product_id: product.id, quantity: 3 }]).await.unwrap();
    let order_id = orders[0].id;
    db.cancel_order(order_id, &ActingUser::customer(101)).await.unwrap();

    let err = db.cancel_order(order_id, &ActingUser::customer(101)).await.unwrap_err();
    assert!(matches!(err, StorefrontError::Invalid(_)), "cancelling a cancelled order must be invalid, got {err}");
    let product = db.fetch_product(product.id).await.unwrap().unwrap();
    assert_eq!(product.quantity, 5, "the second cancel must not restock again");
    tear_down(db).await;
}

#[tokio::test]
async fn selling_out_deletes_the_product_and_cancel_recreates_it() {
    let db = setup().await;
    let product = seed_product(&db, "Limited Run Mug", 2500, 900, 3).await;
    let orders = db.place_order(102, &[OrderItem { product_id: product.id, quantity: 3 }]).await.unwrap();
    assert!(db.fetch_product(product.id).await.unwrap().is_none(), "sold-out product must be deleted");

    db.cancel_order(orders[0].id, &ActingUser::customer(102)).await.unwrap();
    let restored = db.fetch_product_by_name("Limited Run Mug").await.unwrap().expect("product must be recreated");
    assert_ne!(restored.id, product.id, "recreation must mint a fresh id");
    assert_eq!(restored.quantity, 3);
    assert_eq!(restored.retail_price.value(), 2500);
    assert_eq!(restored.wholesale_price.value(), 900);
    tear_down(db).await;
}

#[tokio::test]
async fn invalid_items_reject_the_whole_order_with_every_problem() {
    let db = setup().await;
    let product = seed_product(&db, "Teapot", 1099, 400, 2).await;

    let items =
        [OrderItem { product_id: product.id, quantity: 5 }, OrderItem { product_id: 999_999, quantity: 1 }];
    let err = db.place_order(101, &items).await.unwrap_err();
    match err {
        StorefrontError::OrderPlacement(problems) => {
            assert_eq!(problems.len(), 2);
            assert!(problems.iter().any(|p| matches!(p, OrderItemProblem::InsufficientStock { .. })));
            assert!(problems.iter().any(|p| matches!(p, OrderItemProblem::NotFound { product_id: 999_999 })));
            let msg = StorefrontError::OrderPlacement(problems).to_string();
            assert!(msg.starts_with("Failed to process order: "), "unexpected message: {msg}");
            assert!(msg.contains("; "), "problems must be joined: {msg}");
        },
        other => panic!("expected OrderPlacement, got {other}"),
    }
    // nothing moved
    let product = db.fetch_product(product.id).await.unwrap().unwrap();
    assert_eq!(product.quantity, 2);
    tear_down(db).await;
}

#[tokio::test]
async fn repeated_items_cannot_reserve_more_than_the_shared_stock() {
    let db = setup().await;
    let product = seed_product(&db, "Teapot", 1099, 400, 5).await;

    // two lines of 3 against a stock of 5: individually fine, together oversold
    let items =
        [OrderItem { product_id: product.id, quantity: 3 }, OrderItem { product_id: product.id, quantity: 3 }];
    let err = db.place_order(101, &items).await.unwrap_err();
    match err {
        StorefrontError::OrderPlacement(problems) => {
            assert_eq!(problems.len(), 1);
            assert!(matches!(
                problems[0],
                OrderItemProblem::InsufficientStock { available: 5, requested: 6, .. }
            ));
        },
        other => panic!("expected OrderPlacement, got {other}"),
    }
    let product = db.fetch_product(product.id).await.unwrap().unwrap();
    assert_eq!(product.quantity, 5, "a rejected request must not move stock");
    tear_down(db).await;
}

#[tokio::test]
async fn repeated_items_share_one_stock_decrement() {
    let db = setup().await;
    let product = seed_product(&db, "Teapot", 1099, 400, 6).await;

    let items =
        [OrderItem { product_id: product.id, quantity: 3 }, OrderItem { product_id: product.id, quantity: 3 }];
    let orders = db.place_order(101, &items).await.unwrap();
    assert_eq!(orders.len(), 2);
    assert!(
        db.fetch_product(product.id).await.unwrap().is_none(),
        "the combined decrement takes the stock to zero, which deletes the row"
    );
    tear_down(db).await;
}

#[tokio::test]
async fn empty_and_non_positive_items_fail_fast() {
    let db = setup().await;
    let product = seed_product(&db, "Teapot", 1099, 400, 2).await;

    let err = db.place_order(101, &[]).await.unwrap_err();
    assert!(matches!(err, StorefrontError::Invalid(_)));
    let err = db.place_order(101, &[OrderItem { product_id: product.id, quantity: 0 }]).await.unwrap_err();
    assert!(matches!(err, StorefrontError::Invalid(_)));
    tear_down(db).await;
}

#[tokio::test]
async fn customers_cannot_touch_other_peoples_orders() {
    let db = setup().await;
    let api = OrderFlowApi::new(db.clone(), EventProducers::default());
    let product = seed_product(&db, "Teapot", 1099, 400, 5).await;
    let orders =
        api.place_order(&ActingUser::customer(101), &[OrderItem { product_id: product.id, quantity: 1 }]).await.unwrap();
    let order_id = orders[0].id;

    let err = api.cancel_order(order_id, &ActingUser::customer(555)).await.unwrap_err();
    assert!(matches!(err, StorefrontError::Forbidden(_)));
    let err = api.complete_order(order_id, &ActingUser::customer(101)).await.unwrap_err();
    assert!(matches!(err, StorefrontError::Forbidden(_)));

    // admins may do both
    let completed = api.complete_order(order_id, &ActingUser::admin(1)).await.unwrap();
    assert_eq!(completed.status, OrderStatusType::Completed);
    let err = api.cancel_order(order_id, &ActingUser::admin(1)).await.unwrap_err();
    assert!(matches!(err, StorefrontError::Conflict(_)), "cancelling a completed order must conflict");
    info!("🚀️ Access control checks complete");
    tear_down(db).await;
}

#[tokio::test]
async fn completing_twice_is_a_conflict_and_moves_no_stock() {
    let db = setup().await;
    let product = seed_product(&db, "Teapot", 1099, 400, 5).await;
    let orders = db.place_order(101, &[OrderItem { product_id: product.id, quantity: 2 }]).await.unwrap();

    let completed = db.complete_order(orders[0].id).await.unwrap();
    assert_eq!(completed.status, OrderStatusType::Completed);
    let err = db.complete_order(orders[0].id).await.unwrap_err();
    assert!(matches!(err, StorefrontError::Conflict(_)));

    // stock was deducted at placement; completion leaves it alone
    let product = db.fetch_product(product.id).await.unwrap().unwrap();
    assert_eq!(product.quantity, 3);
    tear_down(db).await;
}
