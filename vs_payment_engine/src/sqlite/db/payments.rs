use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{NewPaymentIntent, Payment, PaymentStatusType};

pub async fn insert_payment(intent: &NewPaymentIntent, conn: &mut SqliteConnection) -> Result<Payment, sqlx::Error> {
    let payment: Payment = sqlx::query_as(
        r#"
            INSERT INTO payments (invoice_id, gateway_payment_id, order_id, date_created)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(intent.invoice_id.as_str())
    .bind(intent.gateway_payment_id.as_deref())
    .bind(intent.order_id)
    .bind(intent.date_created)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Payment [{}] inserted with id {}", payment.invoice_id, payment.id);
    Ok(payment)
}

/// Finds a payment by any of its known correlation keys in one composite lookup. Different callback paths
/// surface different identifiers (the return path yields an invoice id, the cancel path a raw gateway token),
/// so both columns are matched; an invoice id match wins if both somehow match different rows.
pub async fn fetch_payment_by_correlation_key(
    key: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as(
        r#"
            SELECT * FROM payments
            WHERE invoice_id = $1 OR gateway_payment_id = $1
            ORDER BY (invoice_id = $1) DESC
            LIMIT 1
        "#,
    )
    .bind(key)
    .fetch_optional(conn)
    .await?;
    Ok(payment)
}

pub async fn fetch_payment_by_invoice_id(
    invoice_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    let payment =
        sqlx::query_as("SELECT * FROM payments WHERE invoice_id = $1").bind(invoice_id).fetch_optional(conn).await?;
    Ok(payment)
}

pub async fn update_payment_status(
    payment_id: i64,
    status: PaymentStatusType,
    conn: &mut SqliteConnection,
) -> Result<Payment, sqlx::Error> {
    let payment = sqlx::query_as("UPDATE payments SET status = $1 WHERE id = $2 RETURNING *;")
        .bind(status)
        .bind(payment_id)
        .fetch_one(conn)
        .await?;
    Ok(payment)
}

/// Stores the payer and payment-method snapshots from a terminal gateway response, optionally moving the
/// payment status at the same time.
pub async fn update_payment_snapshots(
    payment_id: i64,
    payer: &str,
    payment_method: &str,
    status: Option<PaymentStatusType>,
    conn: &mut SqliteConnection,
) -> Result<Payment, sqlx::Error> {
    let payment = match status {
        Some(status) => {
            sqlx::query_as(
                r#"
                    UPDATE payments SET payer = $1, payment_method = $2, status = $3
                    WHERE id = $4
                    RETURNING *;
                "#,
            )
            .bind(payer)
            .bind(payment_method)
            .bind(status)
            .bind(payment_id)
            .fetch_one(conn)
            .await?
        },
        None => {
            sqlx::query_as(
                r#"
                    UPDATE payments SET payer = $1, payment_method = $2
                    WHERE id = $3
                    RETURNING *;
                "#,
            )
            .bind(payer)
            .bind(payment_method)
            .bind(payment_id)
            .fetch_one(conn)
            .await?
        },
    };
    Ok(payment)
}
