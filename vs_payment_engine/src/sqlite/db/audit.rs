use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::AuditRecord;

/// Appends a new audit row for an intent-creation response. `payment_id` is the local payment id as a string,
/// or the empty string if the payment insert failed; the row must exist either way so that manual
/// reconciliation remains possible.
pub async fn insert_audit(
    external_reference: &str,
    gateway_payment_id: &str,
    payment_id: &str,
    response_created_intent: &str,
    conn: &mut SqliteConnection,
) -> Result<AuditRecord, sqlx::Error> {
    let audit: AuditRecord = sqlx::query_as(
        r#"
            INSERT INTO audit (external_reference, gateway_payment_id, payment_id, response_created_intent)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(external_reference)
    .bind(gateway_payment_id)
    .bind(payment_id)
    .bind(response_created_intent)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Audit row {} appended for reference {external_reference}", audit.id);
    Ok(audit)
}

/// Composite correlation-key lookup, mirroring
/// [`fetch_payment_by_correlation_key`](super::payments::fetch_payment_by_correlation_key).
pub async fn fetch_audit_by_correlation_key(
    key: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<AuditRecord>, sqlx::Error> {
    let audit = sqlx::query_as(
        r#"
            SELECT * FROM audit
            WHERE external_reference = $1 OR gateway_payment_id = $1
            ORDER BY (external_reference = $1) DESC
            LIMIT 1
        "#,
    )
    .bind(key)
    .fetch_optional(conn)
    .await?;
    Ok(audit)
}

/// Records the raw response of a terminal gateway call against an existing audit row.
pub async fn update_audit_response(
    audit_id: i64,
    response_get_payment: &str,
    conn: &mut SqliteConnection,
) -> Result<AuditRecord, sqlx::Error> {
    let audit = sqlx::query_as(
        r#"
            UPDATE audit SET response_get_payment = $1, updated_at = $2
            WHERE id = $3
            RETURNING *;
        "#,
    )
    .bind(response_get_payment)
    .bind(Utc::now())
    .bind(audit_id)
    .fetch_one(conn)
    .await?;
    Ok(audit)
}

/// Records the raw webhook body and the signature-verification response against an existing audit row. The
/// row is updated in place, so a redelivered webhook does not duplicate audit rows.
pub async fn update_audit_webhook(
    audit_id: i64,
    requested_webhook: &str,
    response_get_payment: &str,
    conn: &mut SqliteConnection,
) -> Result<AuditRecord, sqlx::Error> {
    let audit = sqlx::query_as(
        r#"
            UPDATE audit SET requested_webhook = $1, response_get_payment = $2, updated_at = $3
            WHERE id = $4
            RETURNING *;
        "#,
    )
    .bind(requested_webhook)
    .bind(response_get_payment)
    .bind(Utc::now())
    .bind(audit_id)
    .fetch_one(conn)
    .await?;
    Ok(audit)
}
