//! Offline evaluation of a saved provider response. Useful for replaying a
//! lookup at a chosen instant without spending a metered upstream call.

use std::fs;
use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};
use railrefund_core::config::{AppConfig, LoadOptions};
use railrefund_core::PnrNumber;
use railrefund_gateway::parse_status_payload;
use serde_json::{json, Value};

use crate::commands::{report, resolve_payment_method, CommandResult, EXIT_INVALID_INPUT};

const COMMAND: &str = "scenarios";

const NOW_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, Clone, Default)]
pub struct ScenarioArgs {
    pub record: PathBuf,
    pub pnr: Option<String>,
    pub payment_method: Option<String>,
    pub now: Option<String>,
    pub json: bool,
}

pub fn run(args: ScenarioArgs) -> CommandResult {
    match prepare(&args) {
        Ok(prepared) => report::evaluate(
            COMMAND,
            &prepared.reservation,
            prepared.payment_method,
            prepared.now,
            args.json,
        ),
        Err(failure) => failure,
    }
}

struct Prepared {
    reservation: railrefund_core::ReservationSnapshot,
    payment_method: railrefund_core::PaymentMethod,
    now: NaiveDateTime,
}

fn prepare(args: &ScenarioArgs) -> Result<Prepared, CommandResult> {
    let config = AppConfig::load(LoadOptions::default())
        .map_err(|error| failure("config_validation", error.to_string()))?;
    let payment_method = resolve_payment_method(
        COMMAND,
        args.payment_method.as_deref(),
        config.refund.default_payment_method,
    )?;

    let now = match args.now.as_deref() {
        Some(raw) => parse_now(raw)?,
        None => Local::now().naive_local(),
    };

    let raw = fs::read_to_string(&args.record).map_err(|error| {
        failure("invalid_input", format!("could not read `{}`: {error}", args.record.display()))
    })?;
    let payload: Value = serde_json::from_str(&raw).map_err(|error| {
        failure("invalid_input", format!("`{}` is not valid JSON: {error}", args.record.display()))
    })?;
    let payload = into_envelope(payload);

    let requested = requested_pnr(args.pnr.as_deref(), &payload)?;
    let reservation = parse_status_payload(payload, &requested)
        .map_err(|error| CommandResult::from_gateway(COMMAND, &error))?;

    Ok(Prepared { reservation, payment_method, now })
}

/// Saved files may hold the full `{status, message, data}` response or just
/// the record itself.
fn into_envelope(payload: Value) -> Value {
    if payload.get("status").is_some() || payload.get("data").is_some() {
        payload
    } else {
        json!({ "status": true, "data": payload })
    }
}

fn requested_pnr(explicit: Option<&str>, payload: &Value) -> Result<PnrNumber, CommandResult> {
    let raw = match explicit {
        Some(raw) => raw.to_string(),
        None => match &payload["data"]["Pnr"] {
            Value::String(text) => text.clone(),
            Value::Number(number) => number.to_string(),
            _ => {
                return Err(failure(
                    "invalid_input",
                    "the record carries no `Pnr`; pass --pnr".to_string(),
                ))
            }
        },
    };

    PnrNumber::parse(&raw).map_err(|error| failure("invalid_input", error.to_string()))
}

fn parse_now(raw: &str) -> Result<NaiveDateTime, CommandResult> {
    NOW_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw.trim(), format).ok())
        .ok_or_else(|| {
            failure("invalid_input", format!("`{raw}` is not a `YYYY-MM-DD HH:MM` timestamp"))
        })
}

fn failure(error_class: &str, message: String) -> CommandResult {
    CommandResult::failure(COMMAND, error_class, message, EXIT_INVALID_INPUT)
}
