use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Recommendation shown next to the scenarios. Rules are checked in
/// declaration order and the first match wins, so a ticket booked within the
/// last day always gets the urgent advice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advice {
    AlreadyDeparted,
    RecentlyBooked,
    CancelSoon,
    CancelWithin { hours: i64 },
    CancelImmediately,
    MinimalRefund,
}

impl fmt::Display for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyDeparted => {
                f.write_str("The train has already departed. Cancellation is not possible.")
            }
            Self::RecentlyBooked => {
                f.write_str("Cancel as soon as possible to get the maximum refund.")
            }
            Self::CancelSoon => f.write_str("Cancel soon to minimize cancellation charges."),
            Self::CancelWithin { hours } => write!(
                f,
                "Cancel within the next {hours} hours to avoid higher cancellation charges."
            ),
            Self::CancelImmediately => {
                f.write_str("Cancel immediately to avoid very high cancellation charges.")
            }
            Self::MinimalRefund => {
                f.write_str("Cancellation will result in minimal or no refund at this point.")
            }
        }
    }
}

pub trait AdvisoryEngine: Send + Sync {
    fn advise(
        &self,
        booked_at: NaiveDateTime,
        departure_at: NaiveDateTime,
        now: NaiveDateTime,
    ) -> Advice;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicAdvisoryEngine;

impl AdvisoryEngine for DeterministicAdvisoryEngine {
    fn advise(
        &self,
        booked_at: NaiveDateTime,
        departure_at: NaiveDateTime,
        now: NaiveDateTime,
    ) -> Advice {
        advise(booked_at, departure_at, now)
    }
}

pub fn advise(booked_at: NaiveDateTime, departure_at: NaiveDateTime, now: NaiveDateTime) -> Advice {
    // whole hours, truncated toward zero
    let hours_since_booking = (now - booked_at).num_hours();
    let hours_until_departure = (departure_at - now).num_hours();

    if departure_at < now {
        Advice::AlreadyDeparted
    } else if hours_since_booking <= 24 {
        Advice::RecentlyBooked
    } else if hours_until_departure > 48 {
        Advice::CancelSoon
    } else if hours_until_departure > 12 {
        Advice::CancelWithin { hours: hours_until_departure - 12 }
    } else if hours_until_departure > 4 {
        Advice::CancelImmediately
    } else {
        Advice::MinimalRefund
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    use super::{advise, Advice};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 2)
            .and_then(|date| date.and_hms_opt(9, 0, 0))
            .expect("fixture clock")
    }

    fn advice_for(booked_hours_ago: i64, departs_in_hours: i64) -> Advice {
        advise(
            now() - Duration::hours(booked_hours_ago),
            now() + Duration::hours(departs_in_hours),
            now(),
        )
    }

    #[test]
    fn departed_train_wins_over_everything() {
        assert_eq!(advice_for(2, -1), Advice::AlreadyDeparted);
        assert_eq!(
            advice_for(2, -1).to_string(),
            "The train has already departed. Cancellation is not possible."
        );
    }

    #[test]
    fn fresh_booking_overrides_distance_to_departure() {
        let advice = advice_for(10, 60);

        assert_eq!(advice, Advice::RecentlyBooked);
        assert_eq!(advice.to_string(), "Cancel as soon as possible to get the maximum refund.");
    }

    #[test]
    fn booking_exactly_a_day_old_is_still_recent() {
        assert_eq!(advice_for(24, 100), Advice::RecentlyBooked);
        assert_eq!(advice_for(25, 100), Advice::CancelSoon);
    }

    #[test]
    fn window_advice_embeds_hours_left_before_twelve_hour_mark() {
        let advice = advice_for(72, 30);

        assert_eq!(advice, Advice::CancelWithin { hours: 18 });
        assert_eq!(
            advice.to_string(),
            "Cancel within the next 18 hours to avoid higher cancellation charges."
        );
    }

    #[test]
    fn tiers_follow_hours_until_departure() {
        assert_eq!(advice_for(72, 49), Advice::CancelSoon);
        assert_eq!(advice_for(72, 48), Advice::CancelWithin { hours: 36 });
        assert_eq!(advice_for(72, 12), Advice::CancelImmediately);
        assert_eq!(advice_for(72, 5), Advice::CancelImmediately);
        assert_eq!(advice_for(72, 4), Advice::MinimalRefund);
        assert_eq!(
            advice_for(72, 0).to_string(),
            "Cancellation will result in minimal or no refund at this point."
        );
    }

    #[test]
    fn partial_hours_are_truncated() {
        let advice = advise(
            now() - Duration::days(5),
            now() + Duration::hours(12) + Duration::minutes(59),
            now(),
        );

        assert_eq!(advice, Advice::CancelImmediately);
    }
}
