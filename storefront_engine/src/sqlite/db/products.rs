use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewProduct, Product},
    patch::ProductDraft,
    traits::StorefrontError,
};

/// Inserts a new product row. The store assigns the id and starts the version counter at 1.
pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, StorefrontError> {
    let product = sqlx::query_as(
        r#"
            INSERT INTO products (
                name,
                description,
                retail_price,
                wholesale_price,
                quantity
            ) VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(product.name)
    .bind(product.description)
    .bind(product.retail_price)
    .bind(product.wholesale_price)
    .bind(product.quantity)
    .fetch_one(conn)
    .await?;
    Ok(product)
}

pub async fn fetch_product(product_id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, StorefrontError> {
    let product =
        sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(product_id).fetch_optional(conn).await?;
    Ok(product)
}

/// Name uniqueness is a soft invariant, but if duplicates ever slip in, the lowest id wins deterministically.
pub async fn fetch_product_by_name(name: &str, conn: &mut SqliteConnection) -> Result<Option<Product>, StorefrontError> {
    let product = sqlx::query_as("SELECT * FROM products WHERE name = $1 ORDER BY id LIMIT 1")
        .bind(name)
        .fetch_optional(conn)
        .await?;
    Ok(product)
}

/// Used by the merge-by-name rule: find a *different* product already carrying this name.
pub async fn fetch_product_by_name_excluding(
    name: &str,
    product_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, StorefrontError> {
    let product = sqlx::query_as("SELECT * FROM products WHERE name = $1 AND id <> $2 ORDER BY id LIMIT 1")
        .bind(name)
        .bind(product_id)
        .fetch_optional(conn)
        .await?;
    Ok(product)
}

pub async fn fetch_products(
    limit: i64,
    offset: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Product>, StorefrontError> {
    let products = sqlx::query_as("SELECT * FROM products ORDER BY id ASC LIMIT $1 OFFSET $2")
        .bind(limit)
        .bind(offset)
        .fetch_all(conn)
        .await?;
    Ok(products)
}

/// Overwrites the five mutable fields on the stored row. The version counter is bumped in the same statement,
/// which is what keeps the optimistic tag monotonic.
pub async fn update_product_fields(
    product_id: i64,
    draft: &ProductDraft,
    conn: &mut SqliteConnection,
) -> Result<Product, StorefrontError> {
    let updated: Option<Product> = sqlx::query_as(
        r#"
            UPDATE products SET
                name = $1,
                description = $2,
                retail_price = $3,
                wholesale_price = $4,
                quantity = $5,
                version = version + 1,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $6
            RETURNING *;
        "#,
    )
    .bind(draft.name.as_str())
    .bind(draft.description.as_deref())
    .bind(draft.retail_price)
    .bind(draft.wholesale_price)
    .bind(draft.quantity)
    .bind(product_id)
    .fetch_optional(conn)
    .await?;
    updated.ok_or(StorefrontError::ProductNotFound(product_id))
}

/// Sets the stock level for a product, enforcing the no-zero-stock invariant: a new quantity of zero or below
/// deletes the row instead of saving it. Returns the surviving row, or `None` when it was deleted.
pub async fn set_quantity(
    product_id: i64,
    new_quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, StorefrontError> {
    if new_quantity <= 0 {
        delete_product(product_id, conn).await?;
        debug!("🛒️ Product #{product_id} hit zero stock and was removed");
        return Ok(None);
    }
    let updated: Option<Product> = sqlx::query_as(
        "UPDATE products SET quantity = $1, version = version + 1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 \
         RETURNING *",
    )
    .bind(new_quantity)
    .bind(product_id)
    .fetch_optional(conn)
    .await?;
    updated.map(Some).ok_or(StorefrontError::ProductNotFound(product_id))
}

pub async fn delete_product(product_id: i64, conn: &mut SqliteConnection) -> Result<(), StorefrontError> {
    sqlx::query("DELETE FROM products WHERE id = $1").bind(product_id).execute(conn).await?;
    Ok(())
}
