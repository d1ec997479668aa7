use crate::model::revenue::{
    MonthlyComparisonResponse, MonthlyRevenueQuery, RevenueSummaryResponse,
    TransactionRevenueResponse,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Datelike;
use garde::Validate;
use kernel::model::{
    id::{ListingId, TransactionId},
    transaction::Transaction,
};
use kernel::revenue::{
    recognized_revenue,
    rollup::{MonthlyComparison, RevenueSummary},
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

pub async fn show_transaction_revenue(
    Path(transaction_id): Path<TransactionId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<TransactionRevenueResponse>> {
    let transaction = registry
        .transaction_repository()
        .find_by_id(transaction_id)
        .await?
        .ok_or_else(|| {
            AppError::EntityNotFound(format!(
                "取引（{transaction_id}）が見つかりませんでした。"
            ))
        })?;
    let revenue = recognized_revenue(&transaction)?;
    Ok(Json(TransactionRevenueResponse::new(&transaction, revenue)))
}

// 全体の集計と掲載施設ごとの集計は、対象の取引が異なるだけで同じ計算を使う

pub async fn show_revenue_summary(
    State(registry): State<AppRegistry>,
) -> AppResult<Json<RevenueSummaryResponse>> {
    let transactions = registry.transaction_repository().find_all().await?;
    summarize(&registry, &transactions)
}

pub async fn show_listing_revenue_summary(
    Path(listing_id): Path<ListingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<RevenueSummaryResponse>> {
    let transactions = registry
        .transaction_repository()
        .find_by_listing_id(listing_id)
        .await?;
    summarize(&registry, &transactions)
}

pub async fn show_monthly_revenue(
    Query(query): Query<MonthlyRevenueQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<MonthlyComparisonResponse>> {
    query.validate(&())?;
    let transactions = registry.transaction_repository().find_all().await?;
    compare_monthly(&registry, &transactions, query.year)
}

pub async fn show_listing_monthly_revenue(
    Path(listing_id): Path<ListingId>,
    Query(query): Query<MonthlyRevenueQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<MonthlyComparisonResponse>> {
    query.validate(&())?;
    let transactions = registry
        .transaction_repository()
        .find_by_listing_id(listing_id)
        .await?;
    compare_monthly(&registry, &transactions, query.year)
}

fn summarize(
    registry: &AppRegistry,
    transactions: &[Transaction],
) -> AppResult<Json<RevenueSummaryResponse>> {
    RevenueSummary::compute(transactions, registry.clock().now())
        .map(RevenueSummaryResponse::from)
        .map(Json)
}

fn compare_monthly(
    registry: &AppRegistry,
    transactions: &[Transaction],
    year: Option<i32>,
) -> AppResult<Json<MonthlyComparisonResponse>> {
    let year = year.unwrap_or_else(|| registry.clock().now().year());
    MonthlyComparison::compute(transactions, year)
        .map(MonthlyComparisonResponse::from)
        .map(Json)
}
