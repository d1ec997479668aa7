use crate::model::transaction::{PaymentMethod, PaymentStatus, Transaction};
use chrono::Duration;
use shared::error::{AppError, AppResult};

pub mod rollup;

// 決済手数料 5% を差し引いた割合
pub const NET_OF_PLATFORM_FEE_RATE: f64 = 0.95;
pub const LATE_CANCELLATION_FEE_RATE: f64 = 0.05;

/// 返金がこの時間以内（ちょうどを含む）なら全額返金扱い
pub fn full_refund_window() -> Duration {
    Duration::hours(48)
}

/// 取引から計上する売上額を求める。丸めは表示側で行う
pub fn recognized_revenue(transaction: &Transaction) -> AppResult<f64> {
    let total_cost = validated_total_cost(transaction)?;

    let revenue = match (transaction.payment_method, transaction.payment_status) {
        (PaymentMethod::OnlinePayment, PaymentStatus::Refunded) => {
            let refunded_at = transaction.refunded_at.ok_or_else(|| {
                AppError::ValidationError(format!(
                    "返金済みの取引（{}）に refunded_at がありません。",
                    transaction.transaction_id
                ))
            })?;
            if refunded_at - transaction.created_at <= full_refund_window() {
                0.0
            } else {
                total_cost * LATE_CANCELLATION_FEE_RATE
            }
        }
        (PaymentMethod::OnlinePayment, _) => total_cost * NET_OF_PLATFORM_FEE_RATE,
        (PaymentMethod::BookNowPayLater, PaymentStatus::Charged) => {
            total_cost * NET_OF_PLATFORM_FEE_RATE
        }
        (PaymentMethod::BookNowPayLater, PaymentStatus::Cancelled | PaymentStatus::Pending) => 0.0,
        (PaymentMethod::BookNowPayLater, _) => total_cost,
    };

    Ok(revenue)
}

fn validated_total_cost(transaction: &Transaction) -> AppResult<f64> {
    match transaction.total_cost {
        None => Err(AppError::ValidationError(format!(
            "取引（{}）に total_cost がありません。",
            transaction.transaction_id
        ))),
        Some(cost) if !cost.is_finite() || cost < 0.0 => Err(AppError::ValidationError(format!(
            "取引（{}）の total_cost が不正です: {cost}",
            transaction.transaction_id
        ))),
        Some(cost) => Ok(cost),
    }
}
