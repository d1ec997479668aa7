use crate::database::{model::transaction::TransactionRow, ConnectionPool};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    id::{ListingId, TransactionId},
    transaction::Transaction,
};
use kernel::repository::transaction::TransactionRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct TransactionRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl TransactionRepository for TransactionRepositoryImpl {
    async fn find_by_id(&self, transaction_id: TransactionId) -> AppResult<Option<Transaction>> {
        sqlx::query_as::<_, TransactionRow>(
            r#"
                SELECT
                transaction_id,
                listing_id,
                guest_id,
                booking_id,
                payment_method,
                payment_status,
                total_cost,
                created_at,
                refunded_at
                FROM transactions
                WHERE transaction_id = $1
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .map(Transaction::try_from)
        .transpose()
    }

    // 管理者向けの集計で使う全件取得
    async fn find_all(&self) -> AppResult<Vec<Transaction>> {
        sqlx::query_as::<_, TransactionRow>(
            r#"
                SELECT
                transaction_id,
                listing_id,
                guest_id,
                booking_id,
                payment_method,
                payment_status,
                total_cost,
                created_at,
                refunded_at
                FROM transactions
                ORDER BY created_at ASC
            "#,
        )
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .into_iter()
        .map(Transaction::try_from)
        .collect()
    }

    // 掲載施設ごとの集計で使う。find_all に WHERE 句を加えたもの
    async fn find_by_listing_id(&self, listing_id: ListingId) -> AppResult<Vec<Transaction>> {
        sqlx::query_as::<_, TransactionRow>(
            r#"
                SELECT
                transaction_id,
                listing_id,
                guest_id,
                booking_id,
                payment_method,
                payment_status,
                total_cost,
                created_at,
                refunded_at
                FROM transactions
                WHERE listing_id = $1
                ORDER BY created_at ASC
            "#,
        )
        .bind(listing_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .into_iter()
        .map(Transaction::try_from)
        .collect()
    }
}
