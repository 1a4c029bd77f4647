use sqlx::SqliteConnection;

use crate::{
    db_types::{AuditEntry, NewAuditEntry},
    traits::StorefrontError,
};

/// Persists one audit entry. The change set is stored as its JSON rendering.
pub async fn insert_audit_entry(
    entry: NewAuditEntry,
    conn: &mut SqliteConnection,
) -> Result<AuditEntry, StorefrontError> {
    let entry = sqlx::query_as(
        r#"
            INSERT INTO audit_log (
                resource_type,
                resource_id,
                user_id,
                change_set,
                previous_version,
                new_version
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(entry.resource_type)
    .bind(entry.resource_id)
    .bind(entry.user_id)
    .bind(entry.change_set.to_string())
    .bind(entry.previous_version)
    .bind(entry.new_version)
    .fetch_one(conn)
    .await?;
    Ok(entry)
}

/// Entries for one resource, oldest first. Primarily useful for inspection and tests; the engine itself only
/// ever writes.
pub async fn entries_for_resource(
    resource_type: &str,
    resource_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<AuditEntry>, StorefrontError> {
    let entries = sqlx::query_as(
        "SELECT * FROM audit_log WHERE resource_type = $1 AND resource_id = $2 ORDER BY id ASC",
    )
    .bind(resource_type)
    .bind(resource_id)
    .fetch_all(conn)
    .await?;
    Ok(entries)
}
