use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::payment::PaymentMethod;
use crate::domain::reservation::PnrNumber;

/// Fixed offsets before departure at which a cancellation is priced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Checkpoint {
    FourHours,
    TwelveHours,
    FortyEightHours,
    SeventyTwoHours,
}

impl Checkpoint {
    pub const ALL: [Checkpoint; 4] =
        [Self::FourHours, Self::TwelveHours, Self::FortyEightHours, Self::SeventyTwoHours];

    pub fn offset_hours(self) -> i64 {
        match self {
            Self::FourHours => 4,
            Self::TwelveHours => 12,
            Self::FortyEightHours => 48,
            Self::SeventyTwoHours => 72,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::FourHours => "Less than 4 hours before departure",
            Self::TwelveHours => "Between 4 and 12 hours before departure",
            Self::FortyEightHours => "Between 12 and 48 hours before departure",
            Self::SeventyTwoHours => "48 hours or more before departure",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationScenario {
    pub checkpoint: Checkpoint,
    pub description: String,
    pub cancellation_charge: Decimal,
    /// `fare - charge`, floored at zero, ignoring payment fees.
    pub refund: Decimal,
    pub payment_deduction: Decimal,
    /// `fare - charge - payment_deduction`, floored at zero.
    pub net_refund: Decimal,
    pub checkpoint_at: NaiveDateTime,
    pub is_past: bool,
    pub is_best_time: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundReport {
    pub pnr: PnrNumber,
    pub payment_method: PaymentMethod,
    pub evaluated_at: NaiveDateTime,
    pub advice: String,
    pub scenarios: Vec<CancellationScenario>,
}

impl RefundReport {
    pub fn best_time(&self) -> Option<&CancellationScenario> {
        self.scenarios.iter().find(|scenario| scenario.is_best_time)
    }
}
