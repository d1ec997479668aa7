use crate::model::id::{ListingId, RoomId};
use crate::pricing::PriceResolution;
use chrono::{DateTime, Utc};
use shared::error::{AppError, AppResult};

pub mod event;

#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub room_id: RoomId,
    pub listing_id: ListingId,
    pub base_price: f64,
    pub price: f64,
    pub is_dynamically_priced: bool,
    pub is_available: bool,
    pub total_rooms_allocated: i32,
    pub currently_available_rooms: i32,
    // 新しい順（先頭が最新）
    pub dynamic_price: Vec<PriceLedgerEntry>,
    // 楽観的ロック用のバージョン。価格を書き戻すたびに 1 増える
    pub version: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceLedgerEntry {
    pub date: DateTime<Utc>,
    pub price: f64,
}

impl Room {
    /// 価格計算の前提となる数値の整合性を確認する
    pub fn validate(&self) -> AppResult<()> {
        if !self.base_price.is_finite() || self.base_price <= 0.0 {
            return Err(AppError::ValidationError(format!(
                "部屋（{}）の base_price が不正です: {}",
                self.room_id, self.base_price
            )));
        }
        if self.total_rooms_allocated <= 0 {
            return Err(AppError::ValidationError(format!(
                "部屋（{}）の total_rooms_allocated は 1 以上である必要があります: {}",
                self.room_id, self.total_rooms_allocated
            )));
        }
        if self.currently_available_rooms < 0
            || self.currently_available_rooms > self.total_rooms_allocated
        {
            return Err(AppError::ValidationError(format!(
                "部屋（{}）の currently_available_rooms が範囲外です: {} / {}",
                self.room_id, self.currently_available_rooms, self.total_rooms_allocated
            )));
        }
        Ok(())
    }

    /// 稼働率（%）。validate 済みであることが前提
    pub fn occupancy_rate(&self) -> f64 {
        let total = f64::from(self.total_rooms_allocated);
        let occupied = f64::from(self.total_rooms_allocated - self.currently_available_rooms);
        occupied / total * 100.0
    }

    pub fn apply(&mut self, resolution: &PriceResolution) {
        self.price = resolution.final_price;
        self.dynamic_price.insert(0, resolution.ledger_entry);
    }

    pub fn latest_ledger_entry(&self) -> Option<&PriceLedgerEntry> {
        self.dynamic_price.first()
    }
}

#[cfg(test)]
pub(crate) mod fixture {
    use super::*;

    pub fn room(base_price: f64, total: i32, available: i32, dynamic: bool) -> Room {
        Room {
            room_id: RoomId::new(),
            listing_id: ListingId::new(),
            base_price,
            price: base_price,
            is_dynamically_priced: dynamic,
            is_available: true,
            total_rooms_allocated: total,
            currently_available_rooms: available,
            dynamic_price: Vec::new(),
            version: 0,
        }
    }
}
