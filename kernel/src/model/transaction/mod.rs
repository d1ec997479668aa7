use crate::model::id::{BookingId, ListingId, TransactionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub transaction_id: TransactionId,
    pub listing_id: ListingId,
    pub guest_id: UserId,
    pub booking_id: BookingId,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    // 税込みの支払総額。欠損している行は不正データとして扱う
    pub total_cost: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub refunded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    OnlinePayment,
    BookNowPayLater,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Cancelled,
    Refunded,
    Charged,
    RequestedRefund,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::OnlinePayment => "ONLINE_PAYMENT",
            PaymentMethod::BookNowPayLater => "BOOK_NOW_PAY_LATER",
        }
    }
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Charged => "charged",
            PaymentStatus::RequestedRefund => "requested_refund",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ONLINE_PAYMENT" => Ok(PaymentMethod::OnlinePayment),
            "BOOK_NOW_PAY_LATER" => Ok(PaymentMethod::BookNowPayLater),
            other => Err(AppError::ConversionEntityError(format!(
                "未知の支払い方法です: {other}"
            ))),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "completed" => Ok(PaymentStatus::Completed),
            "cancelled" => Ok(PaymentStatus::Cancelled),
            "refunded" => Ok(PaymentStatus::Refunded),
            "charged" => Ok(PaymentStatus::Charged),
            "requested_refund" => Ok(PaymentStatus::RequestedRefund),
            other => Err(AppError::ConversionEntityError(format!(
                "未知の支払いステータスです: {other}"
            ))),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
