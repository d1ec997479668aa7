use axum::{
    routing::{delete, get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::{
    room::{reprice_room, show_room},
    room_event::{delete_room_event, register_room_event, show_room_events},
};

pub fn build_room_routers() -> Router<AppRegistry> {
    let rooms_routers = Router::new()
        .route("/:room_id", get(show_room))
        .route("/:room_id/price", post(reprice_room))
        .route("/:room_id/events", get(show_room_events))
        .route("/:room_id/events", post(register_room_event))
        .route("/:room_id/events/:room_event_id", delete(delete_room_event));

    Router::new().nest("/rooms", rooms_routers)
}
