//! Mess cut and mess closure models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Who requested a mess cut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppliedBy {
    Member,
    Admin,
}

impl AppliedBy {
    /// Database/wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AppliedBy::Member => "MEMBER",
            AppliedBy::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for AppliedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppliedBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MEMBER" => Ok(AppliedBy::Member),
            "ADMIN" => Ok(AppliedBy::Admin),
            other => Err(format!("unknown applied-by value: {}", other)),
        }
    }
}

/// Mess cut entity: a member-scoped exemption from meals for a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessCut {
    pub id: Uuid,
    pub member_id: Uuid,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub applied_at: DateTime<Utc>,
    pub applied_by: AppliedBy,
    /// Whether the cutoff rule was satisfied when the cut was created
    pub cutoff_ok: bool,
}

impl MessCut {
    /// Whether the inclusive cut range contains `date`
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.from_date <= date && date <= self.to_date
    }

    /// Whether the inclusive ranges `[from_date, to_date]` and `[from, to]`
    /// intersect
    pub fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.from_date <= to && from <= self.to_date
    }
}

/// New mess cut creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessCut {
    pub member_id: Uuid,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub applied_by: AppliedBy,
}

/// Mess closure entity: a facility-wide shutdown for a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessClosure {
    pub id: Uuid,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl MessClosure {
    /// Whether the inclusive closure range contains `date`
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.from_date <= date && date <= self.to_date
    }
}

/// New mess closure creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessClosure {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).expect("valid date")
    }

    #[test]
    fn test_cut_covers_inclusive_bounds() {
        let cut = MessCut {
            id: Uuid::new_v4(),
            member_id: Uuid::new_v4(),
            from_date: d(2026, 5, 10),
            to_date: d(2026, 5, 12),
            applied_at: Utc::now(),
            applied_by: AppliedBy::Member,
            cutoff_ok: true,
        };
        assert!(cut.covers(d(2026, 5, 10)));
        assert!(cut.covers(d(2026, 5, 12)));
        assert!(!cut.covers(d(2026, 5, 9)));
        assert!(!cut.covers(d(2026, 5, 13)));
    }

    #[test]
    fn test_single_day_cut_overlap() {
        let cut = MessCut {
            id: Uuid::new_v4(),
            member_id: Uuid::new_v4(),
            from_date: d(2026, 5, 10),
            to_date: d(2026, 5, 10),
            applied_at: Utc::now(),
            applied_by: AppliedBy::Member,
            cutoff_ok: true,
        };
        assert!(cut.overlaps(d(2026, 5, 10), d(2026, 5, 10)));
        assert!(cut.overlaps(d(2026, 5, 1), d(2026, 5, 31)));
        assert!(!cut.overlaps(d(2026, 5, 11), d(2026, 5, 20)));
    }
}
