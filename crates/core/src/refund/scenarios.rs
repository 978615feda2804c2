use std::cmp::{Ordering, Reverse};

use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;

use crate::domain::payment::PaymentMethod;
use crate::domain::reservation::ReservationSnapshot;
use crate::domain::scenario::{CancellationScenario, Checkpoint};
use crate::errors::DomainError;
use crate::refund::catalog::PaymentMethodCatalog;
use crate::refund::fare_rules::FareRuleTable;

pub trait ScenarioCalculator: Send + Sync {
    fn compute(
        &self,
        reservation: &ReservationSnapshot,
        payment_method: PaymentMethod,
        now: NaiveDateTime,
    ) -> Result<Vec<CancellationScenario>, DomainError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicScenarioCalculator {
    fare_rules: FareRuleTable,
    catalog: PaymentMethodCatalog,
}

impl ScenarioCalculator for DeterministicScenarioCalculator {
    fn compute(
        &self,
        reservation: &ReservationSnapshot,
        payment_method: PaymentMethod,
        now: NaiveDateTime,
    ) -> Result<Vec<CancellationScenario>, DomainError> {
        reservation.validate()?;

        let fare = reservation.fare;
        let flat_total = self.fare_rules.flat_rate(&reservation.class_code)
            * Decimal::from(reservation.passenger_count());
        let payment_deduction = self.catalog.charges(fare, payment_method);

        let mut scenarios = Checkpoint::ALL
            .into_iter()
            .map(|checkpoint| -> Result<CancellationScenario, DomainError> {
                let checkpoint_at = reservation
                    .departure_at
                    .checked_sub_signed(Duration::hours(checkpoint.offset_hours()))
                    .ok_or_else(|| {
                        DomainError::InvariantViolation(format!(
                            "checkpoint `{}` falls outside the supported calendar range",
                            checkpoint.description()
                        ))
                    })?;

                let gap_hours = (reservation.departure_at - checkpoint_at).num_hours();
                if gap_hours != checkpoint.offset_hours() {
                    return Err(DomainError::InvariantViolation(format!(
                        "checkpoint gap of {gap_hours}h does not match its {}h offset",
                        checkpoint.offset_hours()
                    )));
                }

                let cancellation_charge = cancellation_charge(fare, flat_total, gap_hours);
                let refund = (fare - cancellation_charge).max(Decimal::ZERO);
                let net_refund =
                    (fare - cancellation_charge - payment_deduction).max(Decimal::ZERO);

                Ok(CancellationScenario {
                    checkpoint,
                    description: checkpoint.description().to_string(),
                    cancellation_charge,
                    refund,
                    payment_deduction,
                    net_refund,
                    checkpoint_at,
                    is_past: checkpoint_at < now,
                    is_best_time: false,
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        mark_best_time(&mut scenarios);
        Ok(scenarios)
    }
}

pub fn compute_scenarios(
    reservation: &ReservationSnapshot,
    payment_method: PaymentMethod,
    now: NaiveDateTime,
) -> Result<Vec<CancellationScenario>, DomainError> {
    DeterministicScenarioCalculator::default().compute(reservation, payment_method, now)
}

/// Tiered charge for cancelling `gap_hours` before departure.
/// `flat_total` is the class flat rate times the passenger count.
pub fn cancellation_charge(fare: Decimal, flat_total: Decimal, gap_hours: i64) -> Decimal {
    match gap_hours {
        hours if hours <= 4 => fare,
        hours if hours <= 12 => (fare * Decimal::new(5, 1)).max(flat_total),
        hours if hours <= 48 => (fare * Decimal::new(25, 2)).max(flat_total),
        _ => flat_total,
    }
}

/// Flags the upcoming checkpoint with the greatest net refund. Ties go to the
/// checkpoint closest to departure; nothing is flagged once all have passed.
pub fn mark_best_time(scenarios: &mut [CancellationScenario]) {
    let best = scenarios
        .iter()
        .enumerate()
        .filter(|(_, scenario)| !scenario.is_past)
        .max_by_key(|(_, scenario)| {
            (scenario.net_refund, Reverse(scenario.checkpoint.offset_hours()))
        })
        .map(|(index, _)| index);

    for (index, scenario) in scenarios.iter_mut().enumerate() {
        scenario.is_best_time = Some(index) == best;
    }
}

/// Re-evaluates past flags and the best-time pick for a new clock reading.
/// Amounts are left untouched.
pub fn refresh_timeline(scenarios: &mut [CancellationScenario], now: NaiveDateTime) {
    for scenario in scenarios.iter_mut() {
        scenario.is_past = scenario.checkpoint_at < now;
    }
    mark_best_time(scenarios);
}

/// Best time first, then upcoming checkpoints by net refund, then past ones.
pub fn sort_for_display(scenarios: &mut [CancellationScenario]) {
    scenarios.sort_by(|left, right| {
        right
            .is_best_time
            .cmp(&left.is_best_time)
            .then_with(|| left.is_past.cmp(&right.is_past))
            .then_with(|| {
                if left.is_past {
                    Ordering::Equal
                } else {
                    right.net_refund.cmp(&left.net_refund)
                }
            })
    });
}
