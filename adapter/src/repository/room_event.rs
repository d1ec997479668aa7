use crate::database::{model::room_event::RoomEventRow, ConnectionPool};
use async_trait::async_trait;
use chrono::NaiveDate;
use derive_new::new;
use kernel::model::{
    id::{RoomEventId, RoomId},
    room_event::{
        event::{CreateRoomEvent, DeleteRoomEvent},
        RoomEvent,
    },
};
use kernel::repository::room_event::RoomEventRepository;
use shared::error::{AppError, AppResult};
use sqlx::types::Json;
use uuid::Uuid;

#[derive(new)]
pub struct RoomEventRepositoryImpl {
    db: ConnectionPool,
}

// 作成日時の古い順。同じミリ秒に作成されたものは created_seq の順
const SELECT_ROOM_EVENTS: &str = r#"
    SELECT
    e.room_event_id,
    e.listing_id,
    e.author_id,
    e.payload,
    e.start_date,
    e.end_date,
    e.created_at,
    e.created_seq,
    ARRAY(
        SELECT er.room_id FROM room_event_rooms AS er
        WHERE er.room_event_id = e.room_event_id
        ORDER BY er.position
    ) AS room_ids
    FROM room_events AS e
    WHERE EXISTS (
        SELECT 1 FROM room_event_rooms AS target
        WHERE target.room_event_id = e.room_event_id AND target.room_id = $1
    )
"#;

#[async_trait]
impl RoomEventRepository for RoomEventRepositoryImpl {
    async fn create(&self, event: CreateRoomEvent) -> AppResult<RoomEventId> {
        event.validate()?;

        let mut tx = self.db.begin().await?;

        // 対象の部屋がすべて存在し、同じ掲載施設に属しているかを確認する
        {
            let room_ids: Vec<Uuid> = event.room_ids.iter().map(|id| id.raw()).collect();
            let found: i64 = sqlx::query_scalar::<_, i64>(
                r#"
                    SELECT COUNT(*) FROM rooms
                    WHERE room_id = ANY($1) AND listing_id = $2
                "#,
            )
            .bind(&room_ids)
            .bind(event.listing_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            let mut distinct = room_ids.clone();
            distinct.sort();
            distinct.dedup();
            if found != distinct.len() as i64 {
                return Err(AppError::UnprocessableEntity(format!(
                    "掲載施設（{}）に属さない部屋が含まれています。",
                    event.listing_id
                )));
            }
        }

        let room_event_id = RoomEventId::new();
        let res = sqlx::query(
            r#"
                INSERT INTO room_events
                (room_event_id, listing_id, author_id, event_type, payload,
                start_date, end_date, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(room_event_id)
        .bind(event.listing_id)
        .bind(event.author_id)
        .bind(event.kind.type_name())
        .bind(Json(&event.kind))
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(event.created_at)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No room event record has been created".into(),
            ));
        }

        for (position, room_id) in event.room_ids.iter().enumerate() {
            sqlx::query(
                r#"
                    INSERT INTO room_event_rooms (room_event_id, room_id, position)
                    VALUES ($1, $2, $3)
                    ON CONFLICT DO NOTHING
                "#,
            )
            .bind(room_event_id)
            .bind(room_id)
            .bind(position as i32)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(room_event_id)
    }

    async fn delete(&self, event: DeleteRoomEvent) -> AppResult<()> {
        // 指定の部屋を対象としているイベントのみ削除できる
        let res = sqlx::query(
            r#"
                DELETE FROM room_events AS e
                WHERE e.room_event_id = $1
                AND EXISTS (
                    SELECT 1 FROM room_event_rooms AS er
                    WHERE er.room_event_id = e.room_event_id AND er.room_id = $2
                )
            "#,
        )
        .bind(event.room_event_id)
        .bind(event.room_id)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "部屋（{}）のイベント（{}）が見つかりませんでした。",
                event.room_id, event.room_event_id
            )));
        }

        Ok(())
    }

    async fn find_active_for_room(
        &self,
        room_id: RoomId,
        date: NaiveDate,
    ) -> AppResult<Vec<RoomEvent>> {
        let sql = format!(
            "{SELECT_ROOM_EVENTS} AND e.start_date <= $2 AND $2 <= e.end_date \
             ORDER BY e.created_at ASC, e.created_seq ASC"
        );
        sqlx::query_as::<_, RoomEventRow>(&sql)
            .bind(room_id)
            .bind(date)
            .fetch_all(self.db.inner_ref())
            .await
            .map(|rows| rows.into_iter().map(RoomEvent::from).collect())
            .map_err(AppError::SpecificOperationError)
    }

    async fn find_by_room_id(&self, room_id: RoomId) -> AppResult<Vec<RoomEvent>> {
        let sql = format!("{SELECT_ROOM_EVENTS} ORDER BY e.created_at ASC, e.created_seq ASC");
        sqlx::query_as::<_, RoomEventRow>(&sql)
            .bind(room_id)
            .fetch_all(self.db.inner_ref())
            .await
            .map(|rows| rows.into_iter().map(RoomEvent::from).collect())
            .map_err(AppError::SpecificOperationError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use kernel::model::{
        id::{ListingId, UserId},
        room_event::{PriceChangeEntry, RoomEventKind},
    };

    async fn insert_room(pool: &sqlx::PgPool, listing_id: ListingId) -> anyhow::Result<RoomId> {
        let room_id = RoomId::new();
        sqlx::query(
            r#"
                INSERT INTO rooms
                (room_id, listing_id, base_price, price, is_dynamically_priced,
                total_rooms_allocated, currently_available_rooms)
                VALUES ($1, $2, 1000, 1000, TRUE, 100, 10)
            "#,
        )
        .bind(room_id)
        .bind(listing_id)
        .execute(pool)
        .await?;
        Ok(room_id)
    }

    fn price_change(
        listing_id: ListingId,
        room_ids: Vec<RoomId>,
        new_price: f64,
        created_at: chrono::DateTime<Utc>,
    ) -> CreateRoomEvent {
        let kind = RoomEventKind::PriceChange(
            room_ids
                .iter()
                .map(|&room_id| PriceChangeEntry { room_id, new_price })
                .collect(),
        );
        CreateRoomEvent::new(
            listing_id,
            UserId::new(),
            room_ids,
            NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 8, 31).unwrap(),
            kind,
            created_at,
        )
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
    async fn create_lookup_and_delete(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let listing_id = ListingId::new();
        let room_id = insert_room(&pool, listing_id).await?;
        let sibling = insert_room(&pool, listing_id).await?;
        let foreign = insert_room(&pool, ListingId::new()).await?;
        let repo = RoomEventRepositoryImpl::new(ConnectionPool::new(pool));

        // 別の掲載施設の部屋を含むイベントは登録できない
        let at = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let res = repo
            .create(price_change(listing_id, vec![room_id, foreign], 500.0, at))
            .await;
        assert!(matches!(res, Err(AppError::UnprocessableEntity(_))));

        // 同じミリ秒に収まる 2 件は登録した順に返る
        let first = repo
            .create(price_change(
                listing_id,
                vec![room_id],
                500.0,
                at + chrono::Duration::microseconds(100),
            ))
            .await?;
        let second = repo
            .create(price_change(
                listing_id,
                vec![room_id, sibling],
                700.0,
                at + chrono::Duration::microseconds(200),
            ))
            .await?;

        let date = NaiveDate::from_ymd_opt(2024, 8, 10).unwrap();
        let active = repo.find_active_for_room(room_id, date).await?;
        let ids: Vec<RoomEventId> = active.iter().map(|e| e.room_event_id).collect();
        assert_eq!(ids, vec![first, second]);
        assert_eq!(active[0].created_at, active[1].created_at);
        assert!(active[0].created_seq < active[1].created_seq);
        assert_eq!(active[1].room_ids, vec![room_id, sibling]);

        let outside = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        assert!(repo.find_active_for_room(room_id, outside).await?.is_empty());

        // 対象外の部屋からは削除できない
        let res = repo.delete(DeleteRoomEvent::new(first, sibling)).await;
        assert!(matches!(res, Err(AppError::EntityNotFound(_))));

        repo.delete(DeleteRoomEvent::new(first, room_id)).await?;
        let remaining = repo.find_by_room_id(room_id).await?;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].room_event_id, second);
        assert_eq!(repo.find_by_room_id(sibling).await?.len(), 1);
        Ok(())
    }
}
