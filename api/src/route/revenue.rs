use axum::{routing::get, Router};
use registry::AppRegistry;

use crate::handler::revenue::{
    show_listing_monthly_revenue, show_listing_revenue_summary, show_monthly_revenue,
    show_revenue_summary, show_transaction_revenue,
};

pub fn build_revenue_routers() -> Router<AppRegistry> {
    let revenue_routers = Router::new()
        .route("/summary", get(show_revenue_summary))
        .route("/monthly", get(show_monthly_revenue));

    let listing_routers = Router::new()
        .route("/:listing_id/revenue/summary", get(show_listing_revenue_summary))
        .route("/:listing_id/revenue/monthly", get(show_listing_monthly_revenue));

    let transaction_routers =
        Router::new().route("/:transaction_id/revenue", get(show_transaction_revenue));

    Router::new()
        .nest("/revenue", revenue_routers)
        .nest("/listings", listing_routers)
        .nest("/transactions", transaction_routers)
}
