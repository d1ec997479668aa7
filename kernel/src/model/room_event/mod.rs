use crate::model::id::{ListingId, RoomEventId, RoomId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub mod event;

#[derive(Debug, Clone, PartialEq)]
pub struct RoomEvent {
    pub room_event_id: RoomEventId,
    pub listing_id: ListingId,
    pub author_id: UserId,
    pub room_ids: Vec<RoomId>,
    // 両端を含む
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    // 保存時に採番される連番。created_at が同じイベントの作成順を決める
    pub created_seq: i64,
    pub kind: RoomEventKind,
}

/// 部屋ごとの価格修正内容。
/// 予約受付停止は payload が空の HighDemand として表現する
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "entries")]
pub enum RoomEventKind {
    PriceChange(Vec<PriceChangeEntry>),
    HighDemand(Vec<HighDemandEntry>),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceChangeEntry {
    pub room_id: RoomId,
    pub new_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighDemandEntry {
    pub room_id: RoomId,
    // 0.15 = 15%
    pub price_increment_percentage: f64,
}

impl RoomEventKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            RoomEventKind::PriceChange(_) => "PriceChange",
            RoomEventKind::HighDemand(_) => "HighDemand",
        }
    }

    pub fn booking_closed() -> Self {
        RoomEventKind::HighDemand(Vec::new())
    }
}

impl RoomEvent {
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn targets(&self, room_id: RoomId) -> bool {
        self.room_ids.contains(&room_id)
    }

    pub fn is_booking_closed(&self) -> bool {
        matches!(&self.kind, RoomEventKind::HighDemand(entries) if entries.is_empty())
    }

    pub fn new_price_for(&self, room_id: RoomId) -> Option<f64> {
        match &self.kind {
            RoomEventKind::PriceChange(entries) => entries
                .iter()
                .find(|e| e.room_id == room_id)
                .map(|e| e.new_price),
            RoomEventKind::HighDemand(_) => None,
        }
    }

    pub fn increment_for(&self, room_id: RoomId) -> Option<f64> {
        match &self.kind {
            RoomEventKind::HighDemand(entries) => entries
                .iter()
                .find(|e| e.room_id == room_id)
                .map(|e| e.price_increment_percentage),
            RoomEventKind::PriceChange(_) => None,
        }
    }
}
