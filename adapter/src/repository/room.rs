use crate::database::{
    model::room::{PriceHistoryRow, RoomRow},
    ConnectionPool,
};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    id::RoomId,
    room::{event::UpdateRoomPrice, PriceLedgerEntry, Room},
};
use kernel::repository::room::RoomRepository;
use shared::error::{AppError, AppResult};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(new)]
pub struct RoomRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl RoomRepository for RoomRepositoryImpl {
    async fn find_by_id(&self, room_id: RoomId) -> AppResult<Option<Room>> {
        let row = sqlx::query_as::<_, RoomRow>(
            r#"
                SELECT
                room_id,
                listing_id,
                base_price,
                price,
                is_dynamically_priced,
                is_available,
                total_rooms_allocated,
                currently_available_rooms,
                version
                FROM rooms
                WHERE room_id = $1
            "#,
        )
        .bind(room_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut histories = self.find_price_histories(&[room_id.raw()]).await?;
        let history = histories.remove(&room_id).unwrap_or_default();
        Ok(Some(row.into_room(history)))
    }

    async fn find_available(&self) -> AppResult<Vec<Room>> {
        let rows = sqlx::query_as::<_, RoomRow>(
            r#"
                SELECT
                room_id,
                listing_id,
                base_price,
                price,
                is_dynamically_priced,
                is_available,
                total_rooms_allocated,
                currently_available_rooms,
                version
                FROM rooms
                WHERE is_available = TRUE
                ORDER BY created_at ASC
            "#,
        )
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let room_ids: Vec<Uuid> = rows.iter().map(|r| r.room_id.raw()).collect();
        let mut histories = self.find_price_histories(&room_ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let history = histories.remove(&row.room_id).unwrap_or_default();
                row.into_room(history)
            })
            .collect())
    }

    async fn update_price(&self, event: UpdateRoomPrice) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        // version が読み込み時点から変わっていない場合のみ更新する
        let res = sqlx::query(
            r#"
                UPDATE rooms
                SET
                    price = $1,
                    version = version + 1,
                    updated_at = CURRENT_TIMESTAMP(3)
                WHERE room_id = $2 AND version = $3
            "#,
        )
        .bind(event.price)
        .bind(event.room_id)
        .bind(event.expected_version)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            // 0 件の場合は、部屋が存在しないのか他の更新に先を越されたのかを区別する
            let exists = sqlx::query("SELECT 1 FROM rooms WHERE room_id = $1")
                .bind(event.room_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::SpecificOperationError)?
                .is_some();
            return Err(if exists {
                AppError::ConcurrencyError(format!(
                    "部屋（{}）は他の処理によって更新されています（version={}）。",
                    event.room_id, event.expected_version
                ))
            } else {
                AppError::EntityNotFound(format!(
                    "部屋（{}）が見つかりませんでした。",
                    event.room_id
                ))
            });
        }

        let res = sqlx::query(
            r#"
                INSERT INTO room_price_history (room_id, recorded_at, price)
                VALUES ($1, $2, $3)
            "#,
        )
        .bind(event.room_id)
        .bind(event.ledger_entry.date)
        .bind(event.ledger_entry.price)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No room_price_history record has been created".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }
}

impl RoomRepositoryImpl {
    // 価格履歴を部屋ごとにまとめて、新しい順で返す
    async fn find_price_histories(
        &self,
        room_ids: &[Uuid],
    ) -> AppResult<HashMap<RoomId, Vec<PriceLedgerEntry>>> {
        let rows = sqlx::query_as::<_, PriceHistoryRow>(
            r#"
                SELECT room_id, recorded_at, price
                FROM room_price_history
                WHERE room_id = ANY($1)
                ORDER BY recorded_at DESC, room_price_history_id DESC
            "#,
        )
        .bind(room_ids)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let mut histories: HashMap<RoomId, Vec<PriceLedgerEntry>> = HashMap::new();
        for row in rows {
            histories
                .entry(row.room_id)
                .or_default()
                .push(PriceLedgerEntry::from(row));
        }
        Ok(histories)
    }
}
