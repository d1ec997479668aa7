use crate::{model::transaction::Transaction, revenue::recognized_revenue};
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use shared::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevenuePeriod {
    Today,
    // 月曜始まり
    Week,
    Month,
    Year,
}

impl RevenuePeriod {
    /// `now` を含む期間を半開区間 [start, end) で返す（UTC）
    pub fn bounds(self, now: DateTime<Utc>) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
        let today = now.date_naive();
        let (start, end) = match self {
            RevenuePeriod::Today => (today, today + Duration::days(1)),
            RevenuePeriod::Week => {
                let monday =
                    today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
                (monday, monday + Duration::days(7))
            }
            RevenuePeriod::Month => {
                let first = first_of_month(today.year(), today.month())?;
                let next = if today.month() == 12 {
                    first_of_month(today.year() + 1, 1)?
                } else {
                    first_of_month(today.year(), today.month() + 1)?
                };
                (first, next)
            }
            RevenuePeriod::Year => (
                first_of_month(today.year(), 1)?,
                first_of_month(today.year() + 1, 1)?,
            ),
        };
        Ok((start_of_day(start), start_of_day(end)))
    }
}

/// [start, end) に作成された取引の売上合計
pub fn revenue_between(
    transactions: &[Transaction],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> AppResult<f64> {
    transactions
        .iter()
        .filter(|tx| start <= tx.created_at && tx.created_at < end)
        .map(recognized_revenue)
        .sum()
}

pub fn revenue_for_period(
    transactions: &[Transaction],
    period: RevenuePeriod,
    now: DateTime<Utc>,
) -> AppResult<f64> {
    let (start, end) = period.bounds(now)?;
    revenue_between(transactions, start, end)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevenueSummary {
    pub today: f64,
    pub week: f64,
    pub month: f64,
    pub year: f64,
}

impl RevenueSummary {
    pub fn compute(transactions: &[Transaction], now: DateTime<Utc>) -> AppResult<Self> {
        Ok(Self {
            today: revenue_for_period(transactions, RevenuePeriod::Today, now)?,
            week: revenue_for_period(transactions, RevenuePeriod::Week, now)?,
            month: revenue_for_period(transactions, RevenuePeriod::Month, now)?,
            year: revenue_for_period(transactions, RevenuePeriod::Year, now)?,
        })
    }
}

/// 指定年の月別売上。index 0 が 1 月
pub fn monthly_revenue(transactions: &[Transaction], year: i32) -> AppResult<[f64; 12]> {
    let mut buckets = [0.0; 12];
    for tx in transactions.iter().filter(|tx| tx.created_at.year() == year) {
        buckets[tx.created_at.month0() as usize] += recognized_revenue(tx)?;
    }
    Ok(buckets)
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyComparison {
    pub current_year: i32,
    pub past_year: i32,
    pub current: [f64; 12],
    pub past: [f64; 12],
}

impl MonthlyComparison {
    pub fn compute(transactions: &[Transaction], current_year: i32) -> AppResult<Self> {
        let past_year = current_year - 1;
        Ok(Self {
            current_year,
            past_year,
            current: monthly_revenue(transactions, current_year)?,
            past: monthly_revenue(transactions, past_year)?,
        })
    }
}

fn first_of_month(year: i32, month: u32) -> AppResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::ValidationError(format!("日付の範囲外です: {year}-{month}")))
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}
