pub mod advisory;
pub mod catalog;
pub mod fare_rules;
pub mod scenarios;

use chrono::NaiveDateTime;

use crate::domain::payment::PaymentMethod;
use crate::domain::reservation::ReservationSnapshot;
use crate::domain::scenario::RefundReport;
use crate::errors::DomainError;

use self::{
    advisory::{AdvisoryEngine, DeterministicAdvisoryEngine},
    scenarios::{DeterministicScenarioCalculator, ScenarioCalculator},
};

/// Runs one full evaluation pass. Callers invoke [`RefundRuntime::recompute`]
/// whenever the reservation or the payment method changes and replace the
/// previous report wholesale.
pub struct RefundRuntime<S, A> {
    calculator: S,
    advisory: A,
}

impl<S, A> RefundRuntime<S, A> {
    pub fn new(calculator: S, advisory: A) -> Self {
        Self { calculator, advisory }
    }
}

impl Default for RefundRuntime<DeterministicScenarioCalculator, DeterministicAdvisoryEngine> {
    fn default() -> Self {
        Self::new(DeterministicScenarioCalculator::default(), DeterministicAdvisoryEngine)
    }
}

impl<S, A> RefundRuntime<S, A>
where
    S: ScenarioCalculator,
    A: AdvisoryEngine,
{
    /// `now` is read once by the caller so the advice and every scenario's
    /// past flag agree.
    pub fn recompute(
        &self,
        reservation: &ReservationSnapshot,
        payment_method: PaymentMethod,
        now: NaiveDateTime,
    ) -> Result<RefundReport, DomainError> {
        let scenarios = self.calculator.compute(reservation, payment_method, now)?;
        let advice = self.advisory.advise(reservation.booked_at, reservation.departure_at, now);

        Ok(RefundReport {
            pnr: reservation.pnr.clone(),
            payment_method,
            evaluated_at: now,
            advice: advice.to_string(),
            scenarios,
        })
    }
}

pub fn recompute(
    reservation: &ReservationSnapshot,
    payment_method: PaymentMethod,
    now: NaiveDateTime,
) -> Result<RefundReport, DomainError> {
    RefundRuntime::default().recompute(reservation, payment_method, now)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;

    use crate::{
        domain::{
            payment::PaymentMethod,
            reservation::{ClassCode, Passenger, PnrNumber, ReservationSnapshot, TrainDetails},
            scenario::{CancellationScenario, Checkpoint},
        },
        errors::DomainError,
        refund::{
            advisory::{Advice, AdvisoryEngine},
            recompute, RefundRuntime,
        },
        refund::scenarios::{DeterministicScenarioCalculator, ScenarioCalculator},
    };

    fn departure() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 11, 20)
            .and_then(|date| date.and_hms_opt(6, 45, 0))
            .expect("fixture departure")
    }

    fn reservation(booked_at: NaiveDateTime) -> ReservationSnapshot {
        ReservationSnapshot {
            pnr: PnrNumber::parse("8120456673").expect("fixture pnr"),
            train: TrainDetails {
                number: "12002".to_string(),
                name: "BHOPAL SHATABDI".to_string(),
                source: "NDLS".to_string(),
                destination: "RKMP".to_string(),
            },
            departure_at: departure(),
            booked_at,
            class_code: ClassCode::new("CC"),
            fare: Decimal::from(1890),
            passengers: vec![
                Passenger {
                    serial: 1,
                    booking_status: "CNF/C4/33/WS".to_string(),
                    current_status: "CNF".to_string(),
                    coach: Some("C4".to_string()),
                    berth: Some("33".to_string()),
                },
                Passenger {
                    serial: 2,
                    booking_status: "WL/12".to_string(),
                    current_status: "WL/4".to_string(),
                    coach: None,
                    berth: None,
                },
            ],
        }
    }

    #[test]
    fn recompute_pairs_scenarios_with_advice_for_the_same_instant() {
        let now = departure() - Duration::hours(60);
        let report = recompute(&reservation(now - Duration::hours(10)), PaymentMethod::Upi, now)
            .expect("valid reservation");

        assert_eq!(report.evaluated_at, now);
        assert_eq!(report.advice, Advice::RecentlyBooked.to_string());
        assert_eq!(report.scenarios.len(), 4);
        let best = report.best_time().expect("best time while checkpoints remain");
        assert_eq!(best.checkpoint, Checkpoint::FortyEightHours);
    }

    #[test]
    fn waitlisted_passengers_still_count_toward_flat_charge() {
        let now = departure() - Duration::days(7);
        let report =
            recompute(&reservation(now - Duration::days(3)), PaymentMethod::NetBanking, now)
                .expect("valid reservation");

        let earliest = report
            .scenarios
            .iter()
            .find(|scenario| scenario.checkpoint == Checkpoint::SeventyTwoHours)
            .expect("72h checkpoint");
        assert_eq!(earliest.cancellation_charge, Decimal::from(360));
        assert_eq!(earliest.net_refund, Decimal::from(1520));
        assert_eq!(report.advice, Advice::CancelSoon.to_string());
    }

    #[test]
    fn runtime_supports_explicit_engine_interfaces() {
        struct FixedAdvice;

        impl AdvisoryEngine for FixedAdvice {
            fn advise(&self, _: NaiveDateTime, _: NaiveDateTime, _: NaiveDateTime) -> Advice {
                Advice::MinimalRefund
            }
        }

        struct RejectingCalculator;

        impl ScenarioCalculator for RejectingCalculator {
            fn compute(
                &self,
                _reservation: &ReservationSnapshot,
                _payment_method: PaymentMethod,
                _now: NaiveDateTime,
            ) -> Result<Vec<CancellationScenario>, DomainError> {
                Err(DomainError::InvariantViolation("calculator offline".to_string()))
            }
        }

        let now = departure() - Duration::days(7);
        let snapshot = reservation(now - Duration::days(3));

        let report = RefundRuntime::new(DeterministicScenarioCalculator::default(), FixedAdvice)
            .recompute(&snapshot, PaymentMethod::Upi, now)
            .expect("deterministic calculator succeeds");
        assert_eq!(report.advice, Advice::MinimalRefund.to_string());

        let error = RefundRuntime::new(RejectingCalculator, FixedAdvice)
            .recompute(&snapshot, PaymentMethod::Upi, now)
            .expect_err("calculator error propagates");
        assert!(matches!(error, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn report_serializes_with_snake_case_payment_method() {
        let now = departure() - Duration::days(7);
        let report =
            recompute(&reservation(now - Duration::days(3)), PaymentMethod::EmiPayLater, now)
                .expect("valid reservation");

        let json = serde_json::to_value(&report).expect("report serializes");
        assert_eq!(json["payment_method"], "emi_pay_later");
        assert_eq!(json["pnr"], "8120456673");
        assert_eq!(json["scenarios"][0]["checkpoint"], "four_hours");
    }
}
