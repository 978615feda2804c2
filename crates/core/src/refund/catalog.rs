use rust_decimal::Decimal;

use crate::domain::payment::PaymentMethod;

/// Amount at or below which debit cards use the lower fee band.
const DEBIT_CARD_LOWER_BAND_LIMIT: i64 = 2000;
const NET_BANKING_FLAT_FEE: i64 = 10;

const ORDERED_METHODS: [PaymentMethod; 7] = [
    PaymentMethod::Upi,
    PaymentMethod::DebitCard,
    PaymentMethod::CreditCard,
    PaymentMethod::NetBanking,
    PaymentMethod::EWallet,
    PaymentMethod::InternationalCard,
    PaymentMethod::EmiPayLater,
];

#[derive(Clone, Copy, Debug, Default)]
pub struct PaymentMethodCatalog;

impl PaymentMethodCatalog {
    pub fn methods(&self) -> &'static [PaymentMethod] {
        &ORDERED_METHODS
    }

    pub fn charges(&self, amount: Decimal, method: PaymentMethod) -> Decimal {
        charges(amount, method)
    }
}

/// Gateway fee the payment provider keeps on `amount`. Callers bound
/// `amount` to `0..=MAX_FARE` (see `check_fare_range`).
pub fn charges(amount: Decimal, method: PaymentMethod) -> Decimal {
    match method {
        PaymentMethod::Upi => Decimal::ZERO,
        PaymentMethod::DebitCard => {
            if amount <= Decimal::from(DEBIT_CARD_LOWER_BAND_LIMIT) {
                percent_of(amount, Decimal::new(4, 1))
            } else {
                percent_of(amount, Decimal::new(9, 1))
            }
        }
        PaymentMethod::CreditCard => percent_of(amount, Decimal::ONE),
        PaymentMethod::NetBanking => Decimal::from(NET_BANKING_FLAT_FEE),
        PaymentMethod::EWallet => percent_of(amount, Decimal::new(18, 1)),
        PaymentMethod::InternationalCard | PaymentMethod::EmiPayLater => {
            percent_of(amount, Decimal::new(35, 1))
        }
    }
}

pub fn total_payable(amount: Decimal, method: PaymentMethod) -> Decimal {
    amount + charges(amount, method)
}

fn percent_of(amount: Decimal, percentage: Decimal) -> Decimal {
    amount * percentage / Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{charges, total_payable, PaymentMethodCatalog};
    use crate::domain::payment::PaymentMethod;
    use crate::domain::reservation::MAX_FARE;

    #[test]
    fn catalog_lists_methods_in_checkout_order() {
        let names: Vec<&str> =
            PaymentMethodCatalog.methods().iter().map(|method| method.name()).collect();

        assert_eq!(
            names,
            vec![
                "UPI",
                "Debit Card",
                "Credit Card",
                "Net Banking",
                "E-Wallet",
                "International Card",
                "EMI / Pay Later",
            ]
        );
    }

    #[test]
    fn debit_card_switches_band_above_two_thousand() {
        assert_eq!(charges(Decimal::from(2000), PaymentMethod::DebitCard), Decimal::from(8));
        assert_eq!(
            charges(Decimal::from(3845), PaymentMethod::DebitCard),
            Decimal::new(34_605, 3)
        );
    }

    #[test]
    fn percentage_methods_apply_to_full_amount() {
        let fare = Decimal::from(1000);

        assert_eq!(charges(fare, PaymentMethod::Upi), Decimal::ZERO);
        assert_eq!(charges(fare, PaymentMethod::CreditCard), Decimal::from(10));
        assert_eq!(charges(fare, PaymentMethod::EWallet), Decimal::from(18));
        assert_eq!(charges(fare, PaymentMethod::InternationalCard), Decimal::from(35));
        assert_eq!(charges(fare, PaymentMethod::EmiPayLater), Decimal::from(35));
    }

    #[test]
    fn net_banking_is_a_flat_fee() {
        assert_eq!(charges(Decimal::from(50), PaymentMethod::NetBanking), Decimal::from(10));
        assert_eq!(charges(Decimal::from(50_000), PaymentMethod::NetBanking), Decimal::from(10));
    }

    #[test]
    fn total_payable_adds_the_gateway_fee() {
        assert_eq!(
            total_payable(Decimal::from(1000), PaymentMethod::CreditCard),
            Decimal::from(1010)
        );
        assert_eq!(PaymentMethodCatalog.charges(Decimal::ZERO, PaymentMethod::EWallet), Decimal::ZERO);
    }

    #[test]
    fn ceiling_amount_prices_every_method() {
        let ceiling = Decimal::from(MAX_FARE);

        for method in PaymentMethodCatalog.methods() {
            assert!(total_payable(ceiling, *method) >= ceiling);
        }
        assert_eq!(
            total_payable(ceiling, PaymentMethod::InternationalCard),
            Decimal::from(10_350_000)
        );
    }
}
