use super::{
    health::build_health_check_routers, revenue::build_revenue_routers, room::build_room_routers,
};
use axum::Router;
use registry::AppRegistry;

pub fn routes() -> Router<AppRegistry> {
    let router = Router::new()
        .merge(build_health_check_routers())
        .merge(build_room_routers())
        .merge(build_revenue_routers());
    Router::new().nest("/api/v1", router)
}
