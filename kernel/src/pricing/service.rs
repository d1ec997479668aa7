use crate::{
    clock::Clock,
    model::{
        id::RoomId,
        room::{event::UpdateRoomPrice, Room},
    },
    pricing::{PriceResolution, PricingRules},
    repository::{room::RoomRepository, room_event::RoomEventRepository},
};
use chrono::SubsecRound;
use shared::error::{AppError, AppResult};
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RepriceSummary {
    pub repriced: usize,
    pub failed: usize,
}

/// 部屋の読み込み → 価格計算 → 楽観的ロック付きの書き戻し、を一つの単位として実行する
#[derive(Clone)]
pub struct RoomPricer {
    room_repository: Arc<dyn RoomRepository>,
    room_event_repository: Arc<dyn RoomEventRepository>,
    clock: Arc<dyn Clock>,
    rules: PricingRules,
    retry: RetryPolicy,
}

impl RoomPricer {
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        room_event_repository: Arc<dyn RoomEventRepository>,
        clock: Arc<dyn Clock>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            room_repository,
            room_event_repository,
            clock,
            rules: PricingRules::default(),
            retry,
        }
    }

    pub async fn reprice(&self, room_id: RoomId) -> AppResult<(Room, PriceResolution)> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.reprice_once(room_id).await {
                Ok(done) => return Ok(done),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    tracing::warn!(
                        %room_id,
                        attempt,
                        error.message = %e,
                        "room price write-back failed, retrying with a fresh snapshot"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn reprice_all(&self) -> AppResult<RepriceSummary> {
        let rooms = self.room_repository.find_available().await?;
        let mut summary = RepriceSummary::default();
        for room in rooms {
            match self.reprice(room.room_id).await {
                Ok(_) => summary.repriced += 1,
                Err(e) => {
                    tracing::error!(
                        room_id = %room.room_id,
                        error.cause_chain = ?e,
                        error.message = %e,
                        "failed to reprice room"
                    );
                    summary.failed += 1;
                }
            }
        }
        Ok(summary)
    }

    async fn reprice_once(&self, room_id: RoomId) -> AppResult<(Room, PriceResolution)> {
        // 履歴はミリ秒精度で保存されるので、返す Room もそれに揃える
        let now = self.clock.now().trunc_subsecs(3);

        let mut room = self
            .room_repository
            .find_by_id(room_id)
            .await?
            .ok_or_else(|| AppError::EntityNotFound(format!("部屋（{room_id}）が見つかりませんでした。")))?;
        let events = self
            .room_event_repository
            .find_active_for_room(room_id, now.date_naive())
            .await?;

        let resolution = self.rules.resolve(&room, &events, now)?;

        self.room_repository
            .update_price(UpdateRoomPrice::new(
                room_id,
                room.version,
                resolution.final_price,
                resolution.ledger_entry,
            ))
            .await?;

        room.apply(&resolution);
        room.version += 1;

        if resolution.is_dynamically_priced {
            tracing::info!(%room_id, price = resolution.final_price, "applied dynamic room price");
        } else {
            tracing::info!(%room_id, price = resolution.final_price, "applied event-only room price");
        }

        Ok((room, resolution))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::FixedClock,
        model::{
            id::{ListingId, RoomEventId, UserId},
            room::fixture::room,
            room_event::{
                event::{CreateRoomEvent, DeleteRoomEvent},
                PriceChangeEntry, RoomEvent, RoomEventKind,
            },
        },
    };
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use std::sync::Mutex;

    #[derive(Default)]
    struct InMemoryRooms {
        rooms: Mutex<Vec<Room>>,
        // 書き戻し直前に他の更新が割り込んだ状態を再現する回数
        interleaved_writes: Mutex<u32>,
        update_calls: Mutex<u32>,
    }

    #[async_trait]
    impl RoomRepository for InMemoryRooms {
        async fn find_by_id(&self, room_id: RoomId) -> AppResult<Option<Room>> {
            Ok(self
                .rooms
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.room_id == room_id)
                .cloned())
        }

        async fn find_available(&self) -> AppResult<Vec<Room>> {
            Ok(self
                .rooms
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.is_available)
                .cloned()
                .collect())
        }

        async fn update_price(&self, event: UpdateRoomPrice) -> AppResult<()> {
            *self.update_calls.lock().unwrap() += 1;
            let mut rooms = self.rooms.lock().unwrap();
            let stored = rooms
                .iter_mut()
                .find(|r| r.room_id == event.room_id)
                .ok_or_else(|| AppError::EntityNotFound("room".into()))?;

            let mut interleaved = self.interleaved_writes.lock().unwrap();
            if *interleaved > 0 {
                *interleaved -= 1;
                stored.version += 1;
            }

            if stored.version != event.expected_version {
                return Err(AppError::ConcurrencyError("stale room version".into()));
            }
            stored.price = event.price;
            stored.dynamic_price.insert(0, event.ledger_entry);
            stored.version += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct InMemoryEvents {
        events: Vec<RoomEvent>,
    }

    #[async_trait]
    impl RoomEventRepository for InMemoryEvents {
        async fn create(&self, _event: CreateRoomEvent) -> AppResult<RoomEventId> {
            unimplemented!()
        }

        async fn delete(&self, _event: DeleteRoomEvent) -> AppResult<()> {
            unimplemented!()
        }

        async fn find_active_for_room(
            &self,
            room_id: RoomId,
            date: NaiveDate,
        ) -> AppResult<Vec<RoomEvent>> {
            Ok(self
                .events
                .iter()
                .filter(|e| e.targets(room_id) && e.is_active_on(date))
                .cloned()
                .collect())
        }

        async fn find_by_room_id(&self, room_id: RoomId) -> AppResult<Vec<RoomEvent>> {
            Ok(self
                .events
                .iter()
                .filter(|e| e.targets(room_id))
                .cloned()
                .collect())
        }
    }

    fn saturday_in_august() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 10, 12, 0, 0).unwrap()
    }

    fn pricer(rooms: Arc<InMemoryRooms>, events: InMemoryEvents, attempts: u32) -> RoomPricer {
        RoomPricer::new(
            rooms,
            Arc::new(events),
            Arc::new(FixedClock(saturday_in_august())),
            RetryPolicy {
                max_attempts: attempts,
            },
        )
    }

    #[tokio::test]
    async fn reprice_persists_price_and_prepends_ledger() -> anyhow::Result<()> {
        let r = room(1000.0, 100, 10, true);
        let room_id = r.room_id;
        let rooms = Arc::new(InMemoryRooms {
            rooms: Mutex::new(vec![r]),
            ..Default::default()
        });
        let pricer = pricer(rooms.clone(), InMemoryEvents::default(), 3);

        let (updated, resolution) = pricer.reprice(room_id).await?;
        assert_eq!(resolution.final_price, 1386.0);
        assert_eq!(updated.price, 1386.0);
        assert_eq!(updated.version, 1);

        pricer.reprice(room_id).await?;
        let stored = rooms.find_by_id(room_id).await?.unwrap();
        assert_eq!(stored.price, 1386.0);
        assert_eq!(stored.version, 2);
        assert_eq!(stored.dynamic_price.len(), 2);
        assert!(stored
            .dynamic_price
            .iter()
            .all(|e| e.price == 1386.0 && e.date == saturday_in_august()));
        Ok(())
    }

    #[tokio::test]
    async fn ledger_date_is_truncated_to_milliseconds() -> anyhow::Result<()> {
        let r = room(1000.0, 100, 10, true);
        let room_id = r.room_id;
        let rooms = Arc::new(InMemoryRooms {
            rooms: Mutex::new(vec![r]),
            ..Default::default()
        });
        let now = saturday_in_august() + chrono::Duration::nanoseconds(123_456_789);
        let pricer = RoomPricer::new(
            rooms.clone(),
            Arc::new(InMemoryEvents::default()),
            Arc::new(FixedClock(now)),
            RetryPolicy::default(),
        );

        let (updated, resolution) = pricer.reprice(room_id).await?;
        let expected = saturday_in_august() + chrono::Duration::milliseconds(123);
        assert_eq!(resolution.ledger_entry.date, expected);
        assert_eq!(updated.dynamic_price[0].date, expected);
        let stored = rooms.find_by_id(room_id).await?.unwrap();
        assert_eq!(stored.dynamic_price, updated.dynamic_price);
        Ok(())
    }

    #[tokio::test]
    async fn reprice_uses_events_from_the_store() -> anyhow::Result<()> {
        let r = room(1000.0, 100, 10, false);
        let room_id = r.room_id;
        let rooms = Arc::new(InMemoryRooms {
            rooms: Mutex::new(vec![r]),
            ..Default::default()
        });
        let events = InMemoryEvents {
            events: vec![RoomEvent {
                room_event_id: RoomEventId::new(),
                listing_id: ListingId::new(),
                author_id: UserId::new(),
                room_ids: vec![room_id],
                start_date: NaiveDate::from_ymd_opt(2024, 8, 10).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2024, 8, 10).unwrap(),
                created_at: Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap(),
                created_seq: 1,
                kind: RoomEventKind::PriceChange(vec![PriceChangeEntry {
                    room_id,
                    new_price: 500.0,
                }]),
            }],
        };
        let (_, resolution) = pricer(rooms, events, 1).reprice(room_id).await?;
        assert_eq!(resolution.final_price, 500.0);
        assert!(!resolution.is_dynamically_priced);
        Ok(())
    }

    #[tokio::test]
    async fn lost_race_is_retried_from_fresh_snapshot() -> anyhow::Result<()> {
        let r = room(1000.0, 100, 10, false);
        let room_id = r.room_id;
        let rooms = Arc::new(InMemoryRooms {
            rooms: Mutex::new(vec![r]),
            interleaved_writes: Mutex::new(1),
            ..Default::default()
        });
        let (updated, _) = pricer(rooms.clone(), InMemoryEvents::default(), 3)
            .reprice(room_id)
            .await?;

        assert_eq!(*rooms.update_calls.lock().unwrap(), 2);
        // 割り込んだ更新 + 自分の更新
        assert_eq!(updated.version, 2);
        assert_eq!(rooms.find_by_id(room_id).await?.unwrap().dynamic_price.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn concurrency_error_surfaces_when_attempts_run_out() {
        let r = room(1000.0, 100, 10, false);
        let room_id = r.room_id;
        let rooms = Arc::new(InMemoryRooms {
            rooms: Mutex::new(vec![r]),
            interleaved_writes: Mutex::new(5),
            ..Default::default()
        });
        let err = pricer(rooms.clone(), InMemoryEvents::default(), 2)
            .reprice(room_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConcurrencyError(_)));
        assert_eq!(*rooms.update_calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn validation_errors_are_not_retried() {
        let r = room(1000.0, 0, 0, true);
        let room_id = r.room_id;
        let rooms = Arc::new(InMemoryRooms {
            rooms: Mutex::new(vec![r]),
            ..Default::default()
        });
        let err = pricer(rooms.clone(), InMemoryEvents::default(), 5)
            .reprice(room_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(*rooms.update_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn missing_room_is_not_found() {
        let rooms = Arc::new(InMemoryRooms::default());
        let err = pricer(rooms, InMemoryEvents::default(), 3)
            .reprice(RoomId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EntityNotFound(_)));
    }

    #[tokio::test]
    async fn reprice_all_skips_failures() -> anyhow::Result<()> {
        let good = room(1000.0, 100, 10, true);
        let bad = room(1000.0, 0, 0, true);
        let mut closed = room(1000.0, 10, 10, true);
        closed.is_available = false;
        let rooms = Arc::new(InMemoryRooms {
            rooms: Mutex::new(vec![good, bad, closed]),
            ..Default::default()
        });
        let summary = pricer(rooms, InMemoryEvents::default(), 3)
            .reprice_all()
            .await?;
        assert_eq!(
            summary,
            RepriceSummary {
                repriced: 1,
                failed: 1
            }
        );
        Ok(())
    }
}
