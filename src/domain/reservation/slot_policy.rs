//! Pure slot validation rules for new bookings.
//!
//! Rules run in a fixed order and short-circuit on the first failure.
//! Advisor approval and blocked-interval checks require the store and are
//! performed by the booking handler, not here.
//!
//! Bookable hours: a slot may start at any whole hour from 09:00 through
//! 19:00 inclusive, so the last bookable slot is 19:00~20:00.

use chrono::{Datelike, Timelike, Weekday};

use crate::domain::foundation::{Actor, Timestamp, UserId};

use super::{ReservationError, Slot};

/// Earliest allowed slot start hour (09:00).
pub const FIRST_SLOT_HOUR: u32 = 9;

/// Latest allowed slot start hour; the last bookable slot is 19:00~20:00.
pub const LAST_SLOT_HOUR: u32 = 19;

/// Validates a booking request against the slot policy.
///
/// Rule order: role, past date, same day, weekend, business hours,
/// self-booking. Returns the first violated rule.
pub fn validate(
    now: Timestamp,
    actor: &Actor,
    advisor_id: UserId,
    slot: &Slot,
) -> Result<(), ReservationError> {
    if !actor.is_client() {
        return Err(ReservationError::RoleNotPermitted { role: actor.role });
    }

    let today = now.date();
    if slot.date < today {
        return Err(ReservationError::PastDateNotAllowed { date: slot.date });
    }
    if slot.date == today {
        return Err(ReservationError::SameDayReservationNotAllowed);
    }

    if matches!(slot.date.weekday(), Weekday::Sat | Weekday::Sun) {
        return Err(ReservationError::WeekendNotAllowed { date: slot.date });
    }

    let on_the_hour = slot.start.minute() == 0 && slot.start.second() == 0;
    let hour = slot.start.hour();
    if !on_the_hour || !(FIRST_SLOT_HOUR..=LAST_SLOT_HOUR).contains(&hour) {
        return Err(ReservationError::OutsideBusinessHours { start: slot.start });
    }

    if actor.id == advisor_id {
        return Err(ReservationError::SelfReservationNotAllowed);
    }

    Ok(())
}
