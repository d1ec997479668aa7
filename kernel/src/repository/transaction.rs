use crate::model::{
    id::{ListingId, TransactionId},
    transaction::Transaction,
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn find_by_id(&self, transaction_id: TransactionId) -> AppResult<Option<Transaction>>;
    async fn find_all(&self) -> AppResult<Vec<Transaction>>;
    async fn find_by_listing_id(&self, listing_id: ListingId) -> AppResult<Vec<Transaction>>;
}
