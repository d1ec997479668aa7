use crate::model::{id::RoomId, room_event::RoomEvent};
use chrono::NaiveDate;

/// `date` に有効で `room_id` を対象とするイベントを、作成日時の古い順に並べて返す。
///
/// 同じ部屋に期間の重なるイベントが複数ある場合は、種別ごとに先頭（最も早く作成されたもの）
/// が採用される。created_at が保存精度で並んだ場合は作成時の連番で決める。
/// 並び順は呼び出し元やストレージの返却順に依存しない。
pub fn active_events_for<'a>(
    room_id: RoomId,
    events: &'a [RoomEvent],
    date: NaiveDate,
) -> Vec<&'a RoomEvent> {
    let mut active: Vec<&RoomEvent> = events
        .iter()
        .filter(|e| e.targets(room_id) && e.is_active_on(date))
        .collect();
    active.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.created_seq.cmp(&b.created_seq))
    });
    active
}

pub fn first_price_override(room_id: RoomId, active: &[&RoomEvent]) -> Option<f64> {
    active.iter().find_map(|e| e.new_price_for(room_id))
}

pub fn first_demand_increment(room_id: RoomId, active: &[&RoomEvent]) -> Option<f64> {
    active.iter().find_map(|e| e.increment_for(room_id))
}
