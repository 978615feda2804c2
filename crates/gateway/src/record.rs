//! Upstream PNR status payload and its normalization into a
//! [`ReservationSnapshot`].

use railrefund_core::domain::reservation::{parse_booking, parse_departure, parse_fare};
use railrefund_core::{
    ClassCode, DomainError, Passenger, PnrNumber, ReservationSnapshot, TrainDetails,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GatewayError;

/// Fields the provider sends either as JSON strings or as numbers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextOrNumber {
    Number(serde_json::Number),
    Text(String),
}

impl TextOrNumber {
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text.trim().to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct PnrStatusEnvelope {
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<PnrRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PnrRecord {
    #[serde(default)]
    pub pnr: Option<TextOrNumber>,
    #[serde(default)]
    pub train_no: Option<TextOrNumber>,
    #[serde(default)]
    pub train_name: Option<String>,
    pub doj: String,
    pub departure_time: String,
    pub booking_date: String,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(rename = "Class")]
    pub class_code: String,
    pub booking_fare: TextOrNumber,
    #[serde(default)]
    pub passenger_status: Option<Vec<PassengerRecord>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PassengerRecord {
    #[serde(default)]
    pub number: Option<TextOrNumber>,
    #[serde(default)]
    pub booking_status: Option<String>,
    #[serde(default)]
    pub current_status: Option<String>,
    #[serde(default)]
    pub coach: Option<String>,
    #[serde(default)]
    pub berth: Option<TextOrNumber>,
}

/// Unwraps the `{status, message, data}` envelope and normalizes the record.
pub fn parse_status_payload(
    payload: Value,
    requested: &PnrNumber,
) -> Result<ReservationSnapshot, GatewayError> {
    let envelope: PnrStatusEnvelope =
        serde_json::from_value(payload).map_err(|error| GatewayError::Decode(error.to_string()))?;

    if !envelope.status {
        let message = envelope
            .message
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| "provider returned an unsuccessful status".to_string());
        return Err(GatewayError::Rejected(message));
    }

    let record = envelope
        .data
        .ok_or_else(|| GatewayError::Decode("successful response carried no `data`".to_string()))?;
    Ok(normalize(&record, requested)?)
}

pub fn normalize(
    record: &PnrRecord,
    requested: &PnrNumber,
) -> Result<ReservationSnapshot, DomainError> {
    let pnr = match &record.pnr {
        Some(raw) => PnrNumber::parse(&raw.as_text())?,
        None => requested.clone(),
    };
    let departure_at = parse_departure(&record.doj, &record.departure_time)?;
    let booked_at = parse_booking(&record.booking_date)?;
    let fare = parse_fare(&record.booking_fare.as_text())?;

    let passengers: Vec<Passenger> = record
        .passenger_status
        .as_deref()
        .ok_or(DomainError::MissingPassengers)?
        .iter()
        .enumerate()
        .map(|(index, passenger)| normalize_passenger(index, passenger))
        .collect();

    let snapshot = ReservationSnapshot {
        pnr,
        train: TrainDetails {
            number: record.train_no.as_ref().map(TextOrNumber::as_text).unwrap_or_default(),
            name: record.train_name.clone().unwrap_or_default(),
            source: record.from.clone().unwrap_or_default(),
            destination: record.to.clone().unwrap_or_default(),
        },
        departure_at,
        booked_at,
        class_code: ClassCode::new(record.class_code.as_str()),
        fare,
        passengers,
    };
    snapshot.validate()?;

    Ok(snapshot)
}

fn normalize_passenger(index: usize, record: &PassengerRecord) -> Passenger {
    let position = u32::try_from(index + 1).unwrap_or(u32::MAX);
    let serial = record
        .number
        .as_ref()
        .and_then(|number| number.as_text().parse::<u32>().ok())
        .unwrap_or(position);

    Passenger {
        serial,
        booking_status: record.booking_status.clone().unwrap_or_default(),
        current_status: record.current_status.clone().unwrap_or_default(),
        coach: record.coach.clone().filter(|coach| !coach.trim().is_empty()),
        berth: record.berth.as_ref().map(TextOrNumber::as_text).filter(|berth| berth != "0"),
    }
}
