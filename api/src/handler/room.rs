use crate::model::room::{PriceResolutionResponse, RoomResponse};
use axum::{
    extract::{Path, State},
    Json,
};
use kernel::model::id::RoomId;
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

pub async fn show_room(
    Path(room_id): Path<RoomId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<RoomResponse>> {
    registry
        .room_repository()
        .find_by_id(room_id)
        .await
        .and_then(|room| match room {
            Some(room) => Ok(Json(room.into())),
            None => Err(AppError::EntityNotFound(format!(
                "部屋（{room_id}）が見つかりませんでした。"
            ))),
        })
}

// 価格を再計算して保存する。呼び出すタイミングは予約処理や定期ジョブ側が決める
pub async fn reprice_room(
    Path(room_id): Path<RoomId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<PriceResolutionResponse>> {
    registry
        .room_pricer()
        .reprice(room_id)
        .await
        .map(PriceResolutionResponse::from)
        .map(Json)
}
