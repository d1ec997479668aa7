use crate::model::room_event::{
    CreateRoomEventRequest, CreatedRoomEventResponse, RoomEventsResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{
    id::{RoomEventId, RoomId},
    room_event::event::DeleteRoomEvent,
};
use registry::AppRegistry;
use shared::error::AppResult;

pub async fn register_room_event(
    Path(room_id): Path<RoomId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateRoomEventRequest>,
) -> AppResult<(StatusCode, Json<CreatedRoomEventResponse>)> {
    req.validate(&())?;

    let event = req.into_event(room_id, registry.clock().now())?;
    let room_event_id = registry.room_event_repository().create(event).await?;

    tracing::info!(%room_id, %room_event_id, "registered room event");

    Ok((
        StatusCode::CREATED,
        Json(CreatedRoomEventResponse { room_event_id }),
    ))
}

pub async fn show_room_events(
    Path(room_id): Path<RoomId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<RoomEventsResponse>> {
    registry
        .room_event_repository()
        .find_by_room_id(room_id)
        .await
        .map(RoomEventsResponse::from)
        .map(Json)
}

pub async fn delete_room_event(
    Path((room_id, room_event_id)): Path<(RoomId, RoomEventId)>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    registry
        .room_event_repository()
        .delete(DeleteRoomEvent::new(room_event_id, room_id))
        .await
        .map(|_| StatusCode::OK)
}
