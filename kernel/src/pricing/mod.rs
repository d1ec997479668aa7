use crate::model::{
    room::{PriceLedgerEntry, Room},
    room_event::RoomEvent,
};
use chrono::{DateTime, Datelike, Utc, Weekday};
use shared::error::{AppError, AppResult};

pub mod lookup;
pub mod service;

use lookup::{active_events_for, first_demand_increment, first_price_override};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceResolution {
    pub final_price: f64,
    pub ledger_entry: PriceLedgerEntry,
    // どちらの計算経路を通ったか。ログ出力用
    pub is_dynamically_priced: bool,
}

/// 動的価格の各加算ルール。率は 0.20 = 20% の小数表記
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingRules {
    pub high_occupancy_threshold: f64,
    pub high_occupancy_rate: f64,
    pub medium_occupancy_threshold: f64,
    pub medium_occupancy_rate: f64,
    // 0 始まりの月（6 = 7 月）
    pub peak_months0: [u32; 3],
    pub peak_season_rate: f64,
    pub weekend_rate: f64,
    pub weekday_discount_rate: f64,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            high_occupancy_threshold: 80.0,
            high_occupancy_rate: 0.20,
            medium_occupancy_threshold: 50.0,
            medium_occupancy_rate: 0.10,
            peak_months0: [6, 7, 8],
            peak_season_rate: 0.10,
            weekend_rate: 0.05,
            weekday_discount_rate: 0.05,
        }
    }
}

pub fn resolve_price(
    room: &Room,
    events: &[RoomEvent],
    now: DateTime<Utc>,
) -> AppResult<PriceResolution> {
    PricingRules::default().resolve(room, events, now)
}

impl PricingRules {
    /// 部屋の実効価格を求める。
    ///
    /// 基本価格 → 価格変更イベント（上書き）→ 需要増イベント（乗算）の順に適用し、
    /// 動的価格が有効な部屋には稼働率・シーズン・曜日の加算を現在の価格に対して累積で適用する。
    /// 結果の保存は呼び出し元が行う。
    pub fn resolve(
        &self,
        room: &Room,
        events: &[RoomEvent],
        now: DateTime<Utc>,
    ) -> AppResult<PriceResolution> {
        room.validate()?;

        let active = active_events_for(room.room_id, events, now.date_naive());

        let mut final_price = room.base_price;
        if let Some(new_price) = first_price_override(room.room_id, &active) {
            final_price = new_price;
        }
        if let Some(pct) = first_demand_increment(room.room_id, &active) {
            final_price *= 1.0 + pct;
        }

        if room.is_dynamically_priced {
            final_price = self.apply_occupancy(final_price, room.occupancy_rate());
            final_price = self.apply_season(final_price, now);
            final_price = self.apply_day_of_week(final_price, now);
        }

        if !final_price.is_finite() || final_price <= 0.0 {
            return Err(AppError::ValidationError(format!(
                "部屋（{}）の計算後の価格が不正です: {final_price}",
                room.room_id
            )));
        }

        tracing::debug!(
            room_id = %room.room_id,
            active_events = active.len(),
            dynamic = room.is_dynamically_priced,
            final_price,
            "resolved room price"
        );

        Ok(PriceResolution {
            final_price,
            ledger_entry: PriceLedgerEntry {
                date: now,
                price: final_price,
            },
            is_dynamically_priced: room.is_dynamically_priced,
        })
    }

    // 段階は排他。高い方のみ適用する
    fn apply_occupancy(&self, price: f64, occupancy_rate: f64) -> f64 {
        if occupancy_rate > self.high_occupancy_threshold {
            price + price * self.high_occupancy_rate
        } else if occupancy_rate > self.medium_occupancy_threshold {
            price + price * self.medium_occupancy_rate
        } else {
            price
        }
    }

    fn apply_season(&self, price: f64, now: DateTime<Utc>) -> f64 {
        if self.peak_months0.contains(&now.month0()) {
            price + price * self.peak_season_rate
        } else {
            price
        }
    }

    fn apply_day_of_week(&self, price: f64, now: DateTime<Utc>) -> f64 {
        match now.weekday() {
            Weekday::Fri | Weekday::Sat | Weekday::Sun => price + price * self.weekend_rate,
            Weekday::Mon | Weekday::Tue | Weekday::Wed => price - price * self.weekday_discount_rate,
            Weekday::Thu => price,
        }
    }
}
