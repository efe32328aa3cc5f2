//! Cutoff rule and meal window arithmetic
//!
//! The cutoff rule encodes a same-day decision deadline for the next day's
//! meals: a mess cut requested before the cutoff time may start tomorrow;
//! once the deadline passes, tomorrow is already locked in and only the day
//! after is open. All wall-clock comparisons happen in the facility's
//! timezone.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use tracing::debug;

use crate::error::{AccessError, AccessResult};
use crate::models::Meal;

/// Longest permitted mess cut, in days
pub const MAX_CUT_DAYS: i64 = 30;

/// Earliest permissible start date for a mess cut requested at `now`
pub fn earliest_cut_date(now: DateTime<Tz>, cutoff: NaiveTime) -> NaiveDate {
    let today = now.date_naive();
    if now.time() >= cutoff {
        today + Duration::days(2)
    } else {
        today + Duration::days(1)
    }
}

/// Validate the shape of a mess cut range, independent of the cutoff rule
///
/// Rejects inverted ranges and ranges longer than [`MAX_CUT_DAYS`]. These
/// bounds hold for every cut, including admin overrides that bypass the
/// cutoff deadline.
pub fn validate_cut_duration(from: NaiveDate, to: NaiveDate) -> AccessResult<()> {
    if from > to {
        return Err(AccessError::CutoffViolation {
            detail: format!("from date {} is after to date {}", from, to),
        });
    }

    let days = (to - from).num_days() + 1;
    if days > MAX_CUT_DAYS {
        return Err(AccessError::CutoffViolation {
            detail: format!("cut of {} days exceeds the {}-day limit", days, MAX_CUT_DAYS),
        });
    }

    Ok(())
}

/// Validate a requested mess cut range against the cutoff rule
///
/// Rejects everything [`validate_cut_duration`] rejects, plus ranges
/// starting before the earliest permissible date. The returned violation
/// carries full detail; these are user-correctable input errors, not
/// security-sensitive ones.
pub fn validate_cut_range(
    from: NaiveDate,
    to: NaiveDate,
    now: DateTime<Tz>,
    cutoff: NaiveTime,
) -> AccessResult<()> {
    validate_cut_duration(from, to)?;

    let earliest = earliest_cut_date(now, cutoff);
    if from < earliest {
        debug!(%from, %earliest, "mess cut request rejected by cutoff rule");
        return Err(AccessError::CutoffViolation {
            detail: format!("earliest permitted start date is {}", earliest),
        });
    }

    Ok(())
}

/// Time-of-day interval per meal, bounds inclusive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealWindows {
    pub breakfast: (NaiveTime, NaiveTime),
    pub lunch: (NaiveTime, NaiveTime),
    pub dinner: (NaiveTime, NaiveTime),
}

impl Default for MealWindows {
    fn default() -> Self {
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).expect("valid meal window time");
        Self {
            breakfast: (t(7, 0), t(9, 30)),
            lunch: (t(12, 0), t(14, 30)),
            dinner: (t(19, 0), t(21, 30)),
        }
    }
}

impl MealWindows {
    /// The configured `[start, end]` interval for `meal`
    pub fn window(&self, meal: Meal) -> (NaiveTime, NaiveTime) {
        match meal {
            Meal::Breakfast => self.breakfast,
            Meal::Lunch => self.lunch,
            Meal::Dinner => self.dinner,
        }
    }

    /// The meal whose window contains `time`, if any
    ///
    /// Scanning is not gated on this: terminals declare the meal they are
    /// serving, and the declared value is what gets recorded. The window is
    /// exposed for terminal and dashboard display.
    pub fn current_meal(&self, time: NaiveTime) -> Option<Meal> {
        [Meal::Breakfast, Meal::Lunch, Meal::Dinner]
            .into_iter()
            .find(|meal| {
                let (start, end) = self.window(*meal);
                start <= time && time <= end
            })
    }
}
