use crate::model::{
    id::{ListingId, RoomEventId, RoomId, UserId},
    room_event::RoomEventKind,
};
use chrono::{DateTime, NaiveDate, Utc};
use derive_new::new;
use shared::error::{AppError, AppResult};

#[derive(Debug, new)]
pub struct CreateRoomEvent {
    pub listing_id: ListingId,
    pub author_id: UserId,
    pub room_ids: Vec<RoomId>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub kind: RoomEventKind,
    pub created_at: DateTime<Utc>,
}

impl CreateRoomEvent {
    /// 保存前の整合性チェック。payload の部屋は room_ids に含まれている必要がある
    pub fn validate(&self) -> AppResult<()> {
        if self.start_date > self.end_date {
            return Err(AppError::ValidationError(format!(
                "開始日（{}）が終了日（{}）より後になっています。",
                self.start_date, self.end_date
            )));
        }
        if self.room_ids.is_empty() {
            return Err(AppError::ValidationError(
                "対象の部屋が指定されていません。".into(),
            ));
        }
        let check_room = |room_id: &RoomId| -> AppResult<()> {
            if self.room_ids.contains(room_id) {
                Ok(())
            } else {
                Err(AppError::ValidationError(format!(
                    "部屋（{room_id}）はイベントの対象に含まれていません。"
                )))
            }
        };
        match &self.kind {
            RoomEventKind::PriceChange(entries) => {
                // 空の HighDemand は予約受付停止を表すが、空の PriceChange は意味を持たない
                if entries.is_empty() {
                    return Err(AppError::ValidationError(
                        "価格変更の内容が指定されていません。".into(),
                    ));
                }
                for e in entries {
                    check_room(&e.room_id)?;
                    if !e.new_price.is_finite() || e.new_price <= 0.0 {
                        return Err(AppError::ValidationError(format!(
                            "部屋（{}）の新価格が不正です: {}",
                            e.room_id, e.new_price
                        )));
                    }
                }
            }
            RoomEventKind::HighDemand(entries) => {
                for e in entries {
                    check_room(&e.room_id)?;
                    if !e.price_increment_percentage.is_finite()
                        || e.price_increment_percentage < 0.0
                    {
                        return Err(AppError::ValidationError(format!(
                            "部屋（{}）の値上げ率が不正です: {}",
                            e.room_id, e.price_increment_percentage
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, new)]
pub struct DeleteRoomEvent {
    pub room_event_id: RoomEventId,
    pub room_id: RoomId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::room_event::{HighDemandEntry, PriceChangeEntry};

    fn create(room_ids: Vec<RoomId>, kind: RoomEventKind) -> CreateRoomEvent {
        CreateRoomEvent::new(
            ListingId::new(),
            UserId::new(),
            room_ids,
            NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
            kind,
            Utc::now(),
        )
    }

    #[test]
    fn accepts_single_day_event_and_booking_closed() {
        let room = RoomId::new();
        let ok = create(
            vec![room],
            RoomEventKind::PriceChange(vec![PriceChangeEntry {
                room_id: room,
                new_price: 120.0,
            }]),
        );
        assert!(ok.validate().is_ok());
        assert!(create(vec![room], RoomEventKind::booking_closed())
            .validate()
            .is_ok());
    }

    #[test]
    fn rejects_inverted_range_and_foreign_rooms() {
        let room = RoomId::new();
        let mut inverted = create(vec![room], RoomEventKind::booking_closed());
        inverted.end_date = NaiveDate::from_ymd_opt(2024, 7, 31).unwrap();
        assert!(inverted.validate().is_err());

        let foreign = create(
            vec![room],
            RoomEventKind::HighDemand(vec![HighDemandEntry {
                room_id: RoomId::new(),
                price_increment_percentage: 0.1,
            }]),
        );
        assert!(foreign.validate().is_err());

        assert!(create(vec![], RoomEventKind::booking_closed())
            .validate()
            .is_err());
    }

    #[test]
    fn rejects_price_change_without_entries() {
        let room = RoomId::new();
        let empty = create(vec![room], RoomEventKind::PriceChange(vec![]));
        assert!(matches!(empty.validate(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn rejects_negative_increment() {
        let room = RoomId::new();
        let bad = create(
            vec![room],
            RoomEventKind::HighDemand(vec![HighDemandEntry {
                room_id: room,
                price_increment_percentage: -0.1,
            }]),
        );
        assert!(matches!(bad.validate(), Err(AppError::ValidationError(_))));
    }
}
