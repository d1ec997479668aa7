use crate::model::{
    id::RoomId,
    room::{event::UpdateRoomPrice, Room},
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait RoomRepository: Send + Sync {
    // 部屋を価格履歴（新しい順）込みで取得する
    async fn find_by_id(&self, room_id: RoomId) -> AppResult<Option<Room>>;
    // 予約受付中の部屋をすべて取得する
    async fn find_available(&self) -> AppResult<Vec<Room>>;
    // 価格と価格履歴を書き戻す。version が一致しなければ ConcurrencyError
    async fn update_price(&self, event: UpdateRoomPrice) -> AppResult<()>;
}
