use rust_decimal::Decimal;

use crate::domain::reservation::ClassCode;

const DEFAULT_FLAT_RATE: i64 = 60;

const FLAT_RATES: [(&str, i64); 6] =
    [("1A", 240), ("2A", 200), ("3A", 180), ("CC", 180), ("SL", 120), ("2S", 60)];

/// Minimum per-passenger cancellation charge by class. Codes outside the
/// table get the cheapest tier instead of an error.
#[derive(Clone, Copy, Debug, Default)]
pub struct FareRuleTable;

impl FareRuleTable {
    pub fn flat_rate(&self, class_code: &ClassCode) -> Decimal {
        flat_rate(class_code.as_str())
    }
}

pub fn flat_rate(class_code: &str) -> Decimal {
    let rate = FLAT_RATES
        .iter()
        .find(|(code, _)| *code == class_code)
        .map(|(_, rate)| *rate)
        .unwrap_or(DEFAULT_FLAT_RATE);
    Decimal::from(rate)
}
