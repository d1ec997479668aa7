use crate::model::{
    id::{RoomEventId, RoomId},
    room_event::{
        event::{CreateRoomEvent, DeleteRoomEvent},
        RoomEvent,
    },
};
use async_trait::async_trait;
use chrono::NaiveDate;
use shared::error::AppResult;

#[async_trait]
pub trait RoomEventRepository: Send + Sync {
    async fn create(&self, event: CreateRoomEvent) -> AppResult<RoomEventId>;
    async fn delete(&self, event: DeleteRoomEvent) -> AppResult<()>;
    // date を期間に含み、room_id を対象とするイベントを作成日時の古い順に取得する
    async fn find_active_for_room(&self, room_id: RoomId, date: NaiveDate)
        -> AppResult<Vec<RoomEvent>>;
    async fn find_by_room_id(&self, room_id: RoomId) -> AppResult<Vec<RoomEvent>>;
}
