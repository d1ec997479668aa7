use crate::model::{id::RoomId, room::PriceLedgerEntry};
use derive_new::new;

// 価格再計算の結果を書き戻すためのイベント。
// expected_version が保存済みの version と一致した場合のみ更新される
#[derive(Debug, Clone, new)]
pub struct UpdateRoomPrice {
    pub room_id: RoomId,
    pub expected_version: i64,
    pub price: f64,
    pub ledger_entry: PriceLedgerEntry,
}
