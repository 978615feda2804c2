use chrono::NaiveDateTime;
use railrefund_core::{
    recompute, sort_for_display, CancellationScenario, PaymentMethod, RefundReport,
    ReservationSnapshot,
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::commands::{CommandResult, EXIT_EVALUATION};

const DISPLAY_TIME_FORMAT: &str = "%d-%m-%Y %H:%M";

#[derive(Debug, Serialize)]
struct ReportDocument<'a> {
    reservation: &'a ReservationSnapshot,
    class_name: &'a str,
    report: &'a RefundReport,
}

/// Computes the report for `reservation` at `now` and renders it for the terminal.
pub fn evaluate(
    command: &str,
    reservation: &ReservationSnapshot,
    payment_method: PaymentMethod,
    now: NaiveDateTime,
    json_output: bool,
) -> CommandResult {
    let mut report = match recompute(reservation, payment_method, now) {
        Ok(report) => report,
        Err(error) => {
            return CommandResult::failure(command, "evaluation", error.to_string(), EXIT_EVALUATION)
        }
    };
    sort_for_display(&mut report.scenarios);

    if !json_output {
        return CommandResult { exit_code: 0, output: render_human(reservation, &report) };
    }

    let document = ReportDocument {
        reservation,
        class_name: reservation.class_code.full_name(),
        report: &report,
    };
    match serde_json::to_string_pretty(&document) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => {
            CommandResult::failure(command, "serialization", error.to_string(), EXIT_EVALUATION)
        }
    }
}

pub fn render_human(reservation: &ReservationSnapshot, report: &RefundReport) -> String {
    let train = &reservation.train;
    let mut lines = vec![
        format!(
            "PNR {} | {} {} | {} -> {}",
            reservation.pnr, train.number, train.name, train.source, train.destination
        ),
        format!(
            "class: {} ({}) | fare: {} | passengers: {}",
            reservation.class_code.full_name(),
            reservation.class_code.as_str(),
            rupees(reservation.fare),
            reservation.passenger_count()
        ),
        format!(
            "departure: {} | payment: {} | evaluated at: {}",
            reservation.departure_at.format(DISPLAY_TIME_FORMAT),
            report.payment_method,
            report.evaluated_at.format(DISPLAY_TIME_FORMAT)
        ),
        format!("advice: {}", report.advice),
        "scenarios:".to_string(),
    ];

    lines.extend(report.scenarios.iter().map(render_scenario));
    lines.join("\n")
}

fn render_scenario(scenario: &CancellationScenario) -> String {
    let marker = if scenario.is_best_time {
        "best"
    } else if scenario.is_past {
        "past"
    } else {
        "open"
    };

    format!(
        "- [{marker}] {} (at {}): charge {}, refund {}, payment deduction {}, net refund {}",
        scenario.description,
        scenario.checkpoint_at.format(DISPLAY_TIME_FORMAT),
        rupees(scenario.cancellation_charge),
        rupees(scenario.refund),
        rupees(scenario.payment_deduction),
        rupees(scenario.net_refund)
    )
}

pub fn rupees(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("₹{rounded:.2}")
}
