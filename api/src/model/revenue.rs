use super::round_currency;
use garde::Validate;
use kernel::model::{
    id::TransactionId,
    transaction::{PaymentMethod, PaymentStatus, Transaction},
};
use kernel::revenue::rollup::{MonthlyComparison, RevenueSummary};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
pub struct MonthlyRevenueQuery {
    // 未指定の場合は現在の年
    #[garde(range(min = 1970, max = 9999))]
    pub year: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSummaryResponse {
    pub today: f64,
    pub week: f64,
    pub month: f64,
    pub year: f64,
}

impl From<RevenueSummary> for RevenueSummaryResponse {
    fn from(value: RevenueSummary) -> Self {
        let RevenueSummary {
            today,
            week,
            month,
            year,
        } = value;
        Self {
            today: round_currency(today),
            week: round_currency(week),
            month: round_currency(month),
            year: round_currency(year),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyComparisonResponse {
    pub current_year: i32,
    pub past_year: i32,
    pub current: Vec<f64>,
    pub past: Vec<f64>,
}

impl From<MonthlyComparison> for MonthlyComparisonResponse {
    fn from(value: MonthlyComparison) -> Self {
        let MonthlyComparison {
            current_year,
            past_year,
            current,
            past,
        } = value;
        Self {
            current_year,
            past_year,
            current: current.into_iter().map(round_currency).collect(),
            past: past.into_iter().map(round_currency).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRevenueResponse {
    pub transaction_id: TransactionId,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub total_cost: Option<f64>,
    pub recognized_revenue: f64,
}

impl TransactionRevenueResponse {
    pub fn new(transaction: &Transaction, recognized_revenue: f64) -> Self {
        Self {
            transaction_id: transaction.transaction_id,
            payment_method: transaction.payment_method,
            payment_status: transaction.payment_status,
            total_cost: transaction.total_cost,
            recognized_revenue: round_currency(recognized_revenue),
        }
    }
}
