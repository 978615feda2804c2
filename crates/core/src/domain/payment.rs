use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Upi,
    DebitCard,
    CreditCard,
    NetBanking,
    EWallet,
    InternationalCard,
    EmiPayLater,
}

impl PaymentMethod {
    pub fn name(self) -> &'static str {
        match self {
            Self::Upi => "UPI",
            Self::DebitCard => "Debit Card",
            Self::CreditCard => "Credit Card",
            Self::NetBanking => "Net Banking",
            Self::EWallet => "E-Wallet",
            Self::InternationalCard => "International Card",
            Self::EmiPayLater => "EMI / Pay Later",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Self::Upi => "upi",
            Self::DebitCard => "debit-card",
            Self::CreditCard => "credit-card",
            Self::NetBanking => "net-banking",
            Self::EWallet => "e-wallet",
            Self::InternationalCard => "international-card",
            Self::EmiPayLater => "emi-pay-later",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PaymentMethod {
    type Err = DomainError;

    /// Accepts display names and slugs, ignoring case, spaces, `-`, `_` and `/`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key: String = value
            .chars()
            .filter(|ch| !matches!(ch, ' ' | '-' | '_' | '/'))
            .map(|ch| ch.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "upi" => Ok(Self::Upi),
            "debitcard" | "debit" => Ok(Self::DebitCard),
            "creditcard" | "credit" => Ok(Self::CreditCard),
            "netbanking" => Ok(Self::NetBanking),
            "ewallet" | "wallet" => Ok(Self::EWallet),
            "internationalcard" => Ok(Self::InternationalCard),
            "emipaylater" | "emi" | "paylater" => Ok(Self::EmiPayLater),
            _ => Err(DomainError::UnsupportedPaymentMethod(value.to_string())),
        }
    }
}
