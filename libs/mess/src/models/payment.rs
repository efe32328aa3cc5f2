//! Payment cycle model and related functionality

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Review state of a payment cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    None,
    Uploaded,
    Verified,
    Denied,
}

impl PaymentStatus {
    /// Database/wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::None => "NONE",
            PaymentStatus::Uploaded => "UPLOADED",
            PaymentStatus::Verified => "VERIFIED",
            PaymentStatus::Denied => "DENIED",
        }
    }

    /// Whether a cycle in this state counts against the no-overlap invariant
    pub fn blocks_overlap(&self) -> bool {
        matches!(self, PaymentStatus::Uploaded | PaymentStatus::Verified)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NONE" => Ok(PaymentStatus::None),
            "UPLOADED" => Ok(PaymentStatus::Uploaded),
            "VERIFIED" => Ok(PaymentStatus::Verified),
            "DENIED" => Ok(PaymentStatus::Denied),
            other => Err(format!("unknown payment status: {}", other)),
        }
    }
}

/// Payment cycle entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCycle {
    pub id: Uuid,
    pub member_id: Uuid,
    pub cycle_start: NaiveDate,
    pub cycle_end: NaiveDate,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentCycle {
    /// Whether the inclusive cycle range contains `date`
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.cycle_start <= date && date <= self.cycle_end
    }

    /// Whether this cycle grants meal access on `date`
    pub fn grants_access_on(&self, date: NaiveDate) -> bool {
        self.status == PaymentStatus::Verified && self.covers(date)
    }

    /// Whether the inclusive ranges `[cycle_start, cycle_end]` and
    /// `[from, to]` intersect
    pub fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.cycle_start <= to && from <= self.cycle_end
    }
}

/// New payment cycle creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPaymentCycle {
    pub member_id: Uuid,
    pub cycle_start: NaiveDate,
    pub cycle_end: NaiveDate,
    pub amount: Decimal,
    pub status: PaymentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle(start: NaiveDate, end: NaiveDate, status: PaymentStatus) -> PaymentCycle {
        PaymentCycle {
            id: Uuid::new_v4(),
            member_id: Uuid::new_v4(),
            cycle_start: start,
            cycle_end: end,
            amount: Decimal::new(3_500_00, 2),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).expect("valid date")
    }

    #[test]
    fn test_verified_cycle_grants_access_inside_range() {
        let c = cycle(d(2026, 3, 1), d(2026, 3, 31), PaymentStatus::Verified);
        assert!(c.grants_access_on(d(2026, 3, 1)));
        assert!(c.grants_access_on(d(2026, 3, 15)));
        assert!(c.grants_access_on(d(2026, 3, 31)));
        assert!(!c.grants_access_on(d(2026, 4, 1)));
    }

    #[test]
    fn test_uploaded_cycle_grants_no_access() {
        let c = cycle(d(2026, 3, 1), d(2026, 3, 31), PaymentStatus::Uploaded);
        assert!(!c.grants_access_on(d(2026, 3, 15)));
        assert!(c.status.blocks_overlap());
        assert!(!PaymentStatus::Denied.blocks_overlap());
    }

    #[test]
    fn test_overlap_detection() {
        let c = cycle(d(2026, 3, 1), d(2026, 3, 31), PaymentStatus::Verified);
        // Start inside the existing range
        assert!(c.overlaps(d(2026, 3, 15), d(2026, 4, 14)));
        // Fully contained
        assert!(c.overlaps(d(2026, 3, 10), d(2026, 3, 20)));
        // Touching boundaries still counts
        assert!(c.overlaps(d(2026, 3, 31), d(2026, 4, 30)));
        assert!(c.overlaps(d(2026, 2, 1), d(2026, 3, 1)));
        // Disjoint
        assert!(!c.overlaps(d(2026, 4, 1), d(2026, 4, 30)));
        assert!(!c.overlaps(d(2026, 1, 1), d(2026, 2, 28)));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            PaymentStatus::None,
            PaymentStatus::Uploaded,
            PaymentStatus::Verified,
            PaymentStatus::Denied,
        ] {
            assert_eq!(status.as_str().parse::<PaymentStatus>(), Ok(status));
        }
        assert!("PAID".parse::<PaymentStatus>().is_err());
    }
}
