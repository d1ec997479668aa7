pub mod revenue;
pub mod room;
pub mod room_event;

// 通貨表示用に小数第 2 位で丸める。計算は丸めずに行い、レスポンス生成時にのみ使う
pub(crate) fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::round_currency;

    #[test]
    fn rounds_to_cents() {
        assert_eq!(round_currency(1385.999), 1386.0);
        assert_eq!(round_currency(47.504), 47.5);
        assert_eq!(round_currency(0.0), 0.0);
    }
}
