use kernel::model::{
    id::{ListingId, RoomEventId, RoomId, UserId},
    room_event::{RoomEvent, RoomEventKind},
};
use sqlx::types::{
    chrono::{DateTime, NaiveDate, Utc},
    Json,
};
use uuid::Uuid;

#[derive(sqlx::FromRow)]
pub struct RoomEventRow {
    pub room_event_id: RoomEventId,
    pub listing_id: ListingId,
    pub author_id: UserId,
    pub payload: Json<RoomEventKind>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub created_seq: i64,
    // room_event_rooms を position 順に集約したもの
    pub room_ids: Vec<Uuid>,
}

impl From<RoomEventRow> for RoomEvent {
    fn from(value: RoomEventRow) -> Self {
        let RoomEventRow {
            room_event_id,
            listing_id,
            author_id,
            payload,
            start_date,
            end_date,
            created_at,
            created_seq,
            room_ids,
        } = value;
        RoomEvent {
            room_event_id,
            listing_id,
            author_id,
            room_ids: room_ids.into_iter().map(RoomId::from).collect(),
            start_date,
            end_date,
            created_at,
            created_seq,
            kind: payload.0,
        }
    }
}
