use super::round_currency;
use chrono::{DateTime, Utc};
use kernel::model::{
    id::{ListingId, RoomId},
    room::{PriceLedgerEntry, Room},
};
use kernel::pricing::PriceResolution;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    pub room_id: RoomId,
    pub listing_id: ListingId,
    pub base_price: f64,
    pub price: f64,
    pub is_dynamically_priced: bool,
    pub is_available: bool,
    pub total_rooms_allocated: i32,
    pub currently_available_rooms: i32,
    pub dynamic_price: Vec<PriceLedgerEntryResponse>,
    pub version: i64,
}

impl From<Room> for RoomResponse {
    fn from(value: Room) -> Self {
        let Room {
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
        } = value;
        Self {
            room_id,
            listing_id,
            base_price: round_currency(base_price),
            price: round_currency(price),
            is_dynamically_priced,
            is_available,
            total_rooms_allocated,
            currently_available_rooms,
            dynamic_price: dynamic_price
                .into_iter()
                .map(PriceLedgerEntryResponse::from)
                .collect(),
            version,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceLedgerEntryResponse {
    pub date: DateTime<Utc>,
    pub price: f64,
}

impl From<PriceLedgerEntry> for PriceLedgerEntryResponse {
    fn from(value: PriceLedgerEntry) -> Self {
        let PriceLedgerEntry { date, price } = value;
        Self {
            date,
            price: round_currency(price),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceResolutionResponse {
    pub final_price: f64,
    pub is_dynamically_priced: bool,
    pub room: RoomResponse,
}

impl From<(Room, PriceResolution)> for PriceResolutionResponse {
    fn from((room, resolution): (Room, PriceResolution)) -> Self {
        Self {
            final_price: round_currency(resolution.final_price),
            is_dynamically_priced: resolution.is_dynamically_priced,
            room: room.into(),
        }
    }
}
