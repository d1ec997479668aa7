use kernel::model::{
    id::{ListingId, RoomId},
    room::{PriceLedgerEntry, Room},
};
use sqlx::types::chrono::{DateTime, Utc};

#[derive(sqlx::FromRow)]
pub struct RoomRow {
    pub room_id: RoomId,
    pub listing_id: ListingId,
    pub base_price: f64,
    pub price: f64,
    pub is_dynamically_priced: bool,
    pub is_available: bool,
    pub total_rooms_allocated: i32,
    pub currently_available_rooms: i32,
    pub version: i64,
}

// 価格履歴 1 件分の行
#[derive(sqlx::FromRow)]
pub struct PriceHistoryRow {
    pub room_id: RoomId,
    pub recorded_at: DateTime<Utc>,
    pub price: f64,
}

impl From<PriceHistoryRow> for PriceLedgerEntry {
    fn from(value: PriceHistoryRow) -> Self {
        let PriceHistoryRow {
            room_id: _,
            recorded_at,
            price,
        } = value;
        PriceLedgerEntry {
            date: recorded_at,
            price,
        }
    }
}

impl RoomRow {
    // 履歴は別テーブルにあるため、From の代わりに引数で受け取る
    pub fn into_room(self, dynamic_price: Vec<PriceLedgerEntry>) -> Room {
        let RoomRow {
            room_id,
            listing_id,
            base_price,
            price,
            is_dynamically_priced,
            is_available,
            total_rooms_allocated,
            currently_available_rooms,
            version,
        } = self;
        Room {
            room_id,
            listing_id,
            base_price,
            price,
            is_dynamically_priced,
            is_available,
            total_rooms_allocated,
            currently_available_rooms,
            dynamic_price,
            version,
        }
    }
}
