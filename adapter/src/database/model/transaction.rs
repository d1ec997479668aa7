use kernel::model::{
    id::{BookingId, ListingId, TransactionId, UserId},
    transaction::Transaction,
};
use shared::error::AppError;
use sqlx::types::chrono::{DateTime, Utc};

#[derive(sqlx::FromRow)]
pub struct TransactionRow {
    pub transaction_id: TransactionId,
    pub listing_id: ListingId,
    pub guest_id: UserId,
    pub booking_id: BookingId,
    pub payment_method: String,
    pub payment_status: String,
    pub total_cost: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub refunded_at: Option<DateTime<Utc>>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = AppError;

    fn try_from(value: TransactionRow) -> Result<Self, Self::Error> {
        let TransactionRow {
            transaction_id,
            listing_id,
            guest_id,
            booking_id,
            payment_method,
            payment_status,
            total_cost,
            created_at,
            refunded_at,
        } = value;
        Ok(Transaction {
            transaction_id,
            listing_id,
            guest_id,
            booking_id,
            payment_method: payment_method.parse()?,
            payment_status: payment_status.parse()?,
            total_cost,
            created_at,
            refunded_at,
        })
    }
}
