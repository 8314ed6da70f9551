//! Temporal constraint evaluation
//!
//! Pure functions over a [`Constraint`] and an instant; safe to call
//! concurrently without synchronization.


use crate::core::models::{Constraint, ConstraintFailure, SessionClock};
use crate::utils::clock::seconds;
use chrono::{DateTime, Datelike, NaiveTime, Utc};

/// Check every present dimension of `constraint` at `at`.
///
/// The idle and absolute-duration dimensions need session timing and pass
/// when `session` is `None`.
pub fn validate(
    constraint: &Constraint,
    at: DateTime<Utc>,
    session: Option<&SessionClock>,
) -> Result<(), ConstraintFailure> {
    let date = at.date_naive();

    if let Some(begin) = constraint.begin_date {
        if date < begin {
            return Err(ConstraintFailure::BeforeBeginDate(begin));
        }
    }
    if let Some(end) = constraint.end_date {
        if date > end {
            return Err(ConstraintFailure::AfterEndDate(end));
        }
    }

    let locked = match (constraint.begin_lock_date, constraint.end_lock_date) {
        (Some(begin), Some(end)) => date >= begin && date <= end,
        (Some(begin), None) => date >= begin,
        (None, Some(end)) => date <= end,
        (None, None) => false,
    };
    if locked {
        return Err(ConstraintFailure::Locked);
    }

    if let Some(mask) = constraint.day_mask {
        let day = at.weekday();
        if !mask.contains(day) {
            return Err(ConstraintFailure::DayNotAllowed(day));
        }
    }

    if !in_time_window(constraint.begin_time, constraint.end_time, at.time()) {
        return Err(ConstraintFailure::OutsideTimeWindow);
    }

    if let Some(clock) = session {
        if let Some(timeout) = constraint.idle_timeout() {
            if at - clock.last_access > seconds(timeout) {
                return Err(ConstraintFailure::IdleTimeout);
            }
        }
        if let Some(limit) = constraint.max_duration() {
            if at - clock.started_at > seconds(limit) {
                return Err(ConstraintFailure::MaxDurationExceeded);
            }
        }
    }

    Ok(())
}

/// Boolean form of [`validate`] without session timing
pub fn is_satisfied(constraint: &Constraint, at: DateTime<Utc>) -> bool {
    validate(constraint, at, None).is_ok()
}

fn in_time_window(begin: Option<NaiveTime>, end: Option<NaiveTime>, now: NaiveTime) -> bool {
    match (begin, end) {
        // Wraps past midnight
        (Some(begin), Some(end)) if begin > end => now >= begin || now <= end,
        (Some(begin), Some(end)) => now >= begin && now <= end,
        (Some(begin), None) => now >= begin,
        (None, Some(end)) => now <= end,
        (None, None) => true,
    }
}
