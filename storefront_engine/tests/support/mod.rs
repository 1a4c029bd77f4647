pub mod prepare_env;

use sfe_common::Money;
use storefront_engine::{
    db_types::{NewProduct, Product},
    SqliteDatabase,
    StorefrontDatabase,
    UpsertOutcome,
};

use crate::support::prepare_env::{prepare_test_env, random_db_path};

pub async fn setup() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    // A single connection serialises every statement through sqlite's worker thread. With more connections the
    // out-of-band audit writes race the deferred business transactions (SQLITE_BUSY_SNAPSHOT) and their commits
    // can become visible after `record_audit` resolves, making the hook tests flaky.
    SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating database")
}

pub async fn tear_down(mut db: SqliteDatabase) {
    use sqlx::{migrate::MigrateDatabase, Sqlite};
    let url = db.url().to_string();
    if let Err(e) = db.close().await {
        log::error!("🚀️ Failed to close database: {e}");
    }
    Sqlite::drop_database(&url).await.unwrap();
}

/// Seeds a product and returns the stored row.
pub async fn seed_product(
    db: &SqliteDatabase,
    name: &str,
    retail_cents: i64,
    wholesale_cents: i64,
    quantity: i64,
) -> Product {
    let product = NewProduct::new(name, Money::from_cents(retail_cents), Money::from_cents(wholesale_cents), quantity);
    match db.upsert_product(product).await.expect("Error seeding product") {
        UpsertOutcome::Created(p) => p,
        UpsertOutcome::Merged(p) => p,
    }
}
