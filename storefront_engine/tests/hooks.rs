use storefront_engine::{
    db_types::{ActingUser, OrderItem},
    events::{EventHandlers, EventHooks},
    sqlite::db::audit,
    OrderFlowApi,
    ProductApi,
};

mod support;

use support::{seed_product, setup, tear_down};

#[tokio::test]
async fn order_lifecycle_changes_reach_the_audit_log() {
    let db = setup().await;
    let handlers = EventHandlers::new(10, EventHooks::persist_to(db.clone()));
    let producers = handlers.producers();
    let handler = handlers.on_audit.expect("audit handler registered");
    let join = tokio::spawn(handler.start_handler());

    let api = OrderFlowApi::new(db.clone(), producers);
    let product = seed_product(&db, "Teapot", 1099, 400, 5).await;
    let user = ActingUser::customer(101);
    let orders = api.place_order(&user, &[OrderItem { product_id: product.id, quantity: 2 }]).await.unwrap();
    let order_id = orders[0].id;
    api.cancel_order(order_id, &user).await.unwrap();

    // dropping the api drops the last producer, which shuts the handler down once the queue drains
    drop(api);
    join.await.unwrap();

    let mut conn = db.pool().acquire().await.unwrap();
    let entries = audit::entries_for_resource("order", order_id, &mut conn).await.unwrap();
    assert_eq!(entries.len(), 2, "placement and cancellation must both be recorded");
    assert!(entries.iter().any(|e| e.change_set.contains("Cancelled")));
    assert!(entries.iter().all(|e| e.user_id == Some(101)));
    drop(conn);
    tear_down(db).await;
}

#[tokio::test]
async fn product_patches_record_versions_and_field_diffs() {
    let db = setup().await;
    let handlers = EventHandlers::new(10, EventHooks::persist_to(db.clone()));
    let producers = handlers.producers();
    let handler = handlers.on_audit.expect("audit handler registered");
    let join = tokio::spawn(handler.start_handler());

    let api = ProductApi::new(db.clone(), producers);
    let product = seed_product(&db, "Teapot", 1099, 400, 5).await;
    let admin = ActingUser::admin(1);
    let patch = storefront_engine::patch::ProductPatch::merge(serde_json::json!({"retail_price": 1299}));
    let summary = api.patch_product(product.id, &patch, Some(product.version), &admin).await.unwrap();

    drop(api);
    join.await.unwrap();

    let mut conn = db.pool().acquire().await.unwrap();
    let entries = audit::entries_for_resource("product", product.id, &mut conn).await.unwrap();
    let entry = entries.iter().find(|e| e.change_set.contains("retail_price")).expect("patch entry recorded");
    assert_eq!(entry.previous_version, Some(product.version));
    assert_eq!(entry.new_version, summary.version);
    drop(conn);
    tear_down(db).await;
}
