use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Created,
    Paid,
    Refunded,
}

/// Internal payment ledger entry for a booking. There is no gateway
/// behind this; orders are confirmed first-party.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Creates the payment order for a booking, or returns the existing
    /// one (one order per booking, idempotent)
    pub async fn create_order(
        pool: &PgPool,
        booking_id: Uuid,
        user_id: Uuid,
        amount: Decimal,
    ) -> Result<Self, sqlx::Error> {
        let payment = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO payments (booking_id, user_id, amount)
            VALUES ($1, $2, $3)
            ON CONFLICT (booking_id) DO UPDATE SET updated_at = payments.updated_at
            RETURNING *
            "#,
        )
        .bind(booking_id)
        .bind(user_id)
        .bind(amount)
        .fetch_one(pool)
        .await?;

        Ok(payment)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let payment = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM payments WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(payment)
    }

    pub async fn find_by_booking(
        pool: &PgPool,
        booking_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let payment = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM payments WHERE booking_id = $1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(pool)
        .await?;

        Ok(payment)
    }

    /// Confirms an open order. Returns `None` when the order was already
    /// paid or refunded (guarded transition).
    pub async fn confirm(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let payment = sqlx::query_as::<_, Self>(
            r#"
            UPDATE payments
            SET status = 'paid', updated_at = NOW()
            WHERE id = $1 AND status = 'created'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(payment)
    }

    /// Refunds the paid order of a cancelled booking, if any
    pub async fn refund_for_booking(
        pool: &PgPool,
        booking_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let payment = sqlx::query_as::<_, Self>(
            r#"
            UPDATE payments
            SET status = 'refunded', updated_at = NOW()
            WHERE booking_id = $1 AND status = 'paid'
            RETURNING *
            "#,
        )
        .bind(booking_id)
        .fetch_optional(pool)
        .await?;

        Ok(payment)
    }
}
