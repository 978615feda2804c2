use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

pub const JOURNEY_DATE_FORMAT: &str = "%d-%m-%Y";
pub const DEPARTURE_TIME_FORMAT: &str = "%H:%M";
pub const BOOKING_DATE_TIME_FORMAT: &str = "%d-%m-%Y %H:%M";

/// Largest fare, in rupees, accepted for a single PNR. Keeps every fee and
/// charge computation well inside `Decimal` range.
pub const MAX_FARE: i64 = 10_000_000;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PnrNumber(String);

impl PnrNumber {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.len() == 10 && trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(DomainError::InvalidPnr(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PnrNumber {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl fmt::Display for PnrNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Journey class code as reported upstream (`2A`, `SL`, ...). Unknown codes
/// are carried verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct ClassCode(String);

impl ClassCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn full_name(&self) -> &str {
        match self.0.as_str() {
            "EC" => "Air-Conditioned Executive Chair Class",
            "1A" => "Air-Conditioned First Class",
            "2A" => "Air-Conditioned Two-Tier Class",
            "3A" => "Air-Conditioned Three-Tier Class",
            "CC" => "AC Chair Class",
            "SL" => "Sleeper Class",
            "2S" => "Second Class",
            other => other,
        }
    }
}

impl From<String> for ClassCode {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainDetails {
    pub number: String,
    pub name: String,
    pub source: String,
    pub destination: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    pub serial: u32,
    pub booking_status: String,
    pub current_status: String,
    pub coach: Option<String>,
    pub berth: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationSnapshot {
    pub pnr: PnrNumber,
    pub train: TrainDetails,
    pub departure_at: NaiveDateTime,
    pub booked_at: NaiveDateTime,
    pub class_code: ClassCode,
    pub fare: Decimal,
    pub passengers: Vec<Passenger>,
}

impl ReservationSnapshot {
    pub fn validate(&self) -> Result<(), DomainError> {
        check_fare_range(self.fare, &self.fare.to_string())?;
        if self.passengers.is_empty() {
            return Err(DomainError::MissingPassengers);
        }
        Ok(())
    }

    /// Every listed passenger counts, whatever their current status.
    pub fn passenger_count(&self) -> usize {
        self.passengers.len()
    }
}

pub fn parse_departure(journey_date: &str, departure_time: &str) -> Result<NaiveDateTime, DomainError> {
    let date = NaiveDate::parse_from_str(journey_date.trim(), JOURNEY_DATE_FORMAT).map_err(|_| {
        DomainError::InvalidTimestamp {
            field: "Doj",
            value: journey_date.to_string(),
            expected: "dd-mm-yyyy",
        }
    })?;
    let time =
        NaiveTime::parse_from_str(departure_time.trim(), DEPARTURE_TIME_FORMAT).map_err(|_| {
            DomainError::InvalidTimestamp {
                field: "DepartureTime",
                value: departure_time.to_string(),
                expected: "HH:MM",
            }
        })?;

    Ok(date.and_time(time))
}

/// Booking dates usually carry no time of day; those resolve to midnight.
pub fn parse_booking(booking_date: &str) -> Result<NaiveDateTime, DomainError> {
    let trimmed = booking_date.trim();
    if let Ok(stamp) = NaiveDateTime::parse_from_str(trimmed, BOOKING_DATE_TIME_FORMAT) {
        return Ok(stamp);
    }

    NaiveDate::parse_from_str(trimmed, JOURNEY_DATE_FORMAT)
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|_| DomainError::InvalidTimestamp {
            field: "BookingDate",
            value: booking_date.to_string(),
            expected: "dd-mm-yyyy or dd-mm-yyyy HH:MM",
        })
}

pub fn parse_fare(raw: &str) -> Result<Decimal, DomainError> {
    let fare = Decimal::from_str(raw.trim()).map_err(|_| DomainError::InvalidFare(raw.to_string()))?;
    check_fare_range(fare, raw)?;
    Ok(fare)
}

/// Rejects amounts outside `0..=MAX_FARE`.
pub fn check_fare_range(amount: Decimal, raw: &str) -> Result<(), DomainError> {
    if amount < Decimal::ZERO || amount > Decimal::from(MAX_FARE) {
        return Err(DomainError::InvalidFare(raw.to_string()));
    }
    Ok(())
}
