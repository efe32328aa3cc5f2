//! Meal access decision engine
//!
//! Pure verdict computation over read-only snapshots of a member's records.
//! The precedence is a business-rule contract, not an implementation
//! detail: status > payment > cut/closure, first match wins, and the
//! matching rule determines the reason a denied member is shown.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::models::{Member, MemberStatus, MessClosure, MessCut, PaymentCycle, ScanResult};

/// Read-only records consulted for one decision
///
/// Callers pass whatever payment cycles, cuts, and closures could be
/// relevant for the day in question; the engine filters the rest.
#[derive(Debug, Clone, Copy, Default)]
pub struct DayRecords<'a> {
    pub payments: &'a [PaymentCycle],
    pub cuts: &'a [MessCut],
    pub closures: &'a [MessClosure],
}

impl DayRecords<'_> {
    fn payment_ok(&self, date: NaiveDate) -> bool {
        self.payments.iter().any(|p| p.grants_access_on(date))
    }

    fn cut_today(&self, date: NaiveDate) -> bool {
        self.cuts.iter().any(|c| c.covers(date))
    }

    fn closure_today(&self, date: NaiveDate) -> bool {
        self.closures.iter().any(|c| c.covers(date))
    }
}

/// One access decision: the verdict plus its human-readable reason
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub result: ScanResult,
    pub reason: &'static str,
}

/// Decide whether `member` may be served a meal on `today`
///
/// Never mutates state; recording the verdict is the caller's job.
pub fn decide(member: &Member, today: NaiveDate, records: &DayRecords) -> Verdict {
    if member.status != MemberStatus::Approved {
        return Verdict {
            result: ScanResult::BlockedStatus,
            reason: "Member not approved",
        };
    }

    if !records.payment_ok(today) {
        return Verdict {
            result: ScanResult::BlockedNoPayment,
            reason: "No valid payment for current period",
        };
    }

    // A member cut and a facility closure share one verdict code; only the
    // reason string and the debug log tell them apart
    if records.cut_today(today) {
        debug!(member_id = %member.id, %today, "denied by member mess cut");
        return Verdict {
            result: ScanResult::BlockedCut,
            reason: "Mess cut applied for today",
        };
    }
    if records.closure_today(today) {
        debug!(member_id = %member.id, %today, "denied by facility closure");
        return Verdict {
            result: ScanResult::BlockedCut,
            reason: "Mess is closed today",
        };
    }

    Verdict {
        result: ScanResult::Allowed,
        reason: "Access granted",
    }
}

/// Aggregate eligibility state, mirroring the decision precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    NotApproved,
    NoPayment,
    CutOrClosed,
    Allowed,
}

/// Read-only projection of a member's eligibility for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberSnapshot {
    pub id: Uuid,
    pub name: String,
    pub roll_no: String,
    pub room_no: String,
    pub status: MemberStatus,
    pub payment_ok: bool,
    pub today_cut: bool,
    pub closure_today: bool,
    pub overall_status: OverallStatus,
}

/// Build the display snapshot for `member` on `today`
///
/// Derived from the same three checks as [`decide`], so `overall_status`
/// always agrees with the verdict a scan would produce.
pub fn member_snapshot(member: &Member, today: NaiveDate, records: &DayRecords) -> MemberSnapshot {
    let payment_ok = records.payment_ok(today);
    let today_cut = records.cut_today(today);
    let closure_today = records.closure_today(today);

    let overall_status = if member.status != MemberStatus::Approved {
        OverallStatus::NotApproved
    } else if !payment_ok {
        OverallStatus::NoPayment
    } else if today_cut || closure_today {
        OverallStatus::CutOrClosed
    } else {
        OverallStatus::Allowed
    };

    MemberSnapshot {
        id: member.id,
        name: member.name.clone(),
        roll_no: member.roll_no.clone(),
        room_no: member.room_no.clone(),
        status: member.status,
        payment_ok,
        today_cut,
        closure_today,
        overall_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppliedBy, PaymentStatus};
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).expect("valid date")
    }

    fn member(status: MemberStatus) -> Member {
        Member {
            id: Uuid::new_v4(),
            name: "Asha Nair".to_string(),
            roll_no: "CS2023042".to_string(),
            room_no: "B-214".to_string(),
            phone: "+919812345678".to_string(),
            status,
            credential_version: 1,
            credential_nonce: "0123456789ab".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn verified_payment(member_id: Uuid, start: NaiveDate, end: NaiveDate) -> PaymentCycle {
        PaymentCycle {
            id: Uuid::new_v4(),
            member_id,
            cycle_start: start,
            cycle_end: end,
            amount: Decimal::new(3_500_00, 2),
            status: PaymentStatus::Verified,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn cut(member_id: Uuid, from: NaiveDate, to: NaiveDate) -> MessCut {
        MessCut {
            id: Uuid::new_v4(),
            member_id,
            from_date: from,
            to_date: to,
            applied_at: Utc::now(),
            applied_by: AppliedBy::Member,
            cutoff_ok: true,
        }
    }

    fn closure(from: NaiveDate, to: NaiveDate) -> MessClosure {
        MessClosure {
            id: Uuid::new_v4(),
            from_date: from,
            to_date: to,
            reason: "Semester break".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_approved_paid_member_is_allowed() {
        let m = member(MemberStatus::Approved);
        let today = d(2026, 3, 15);
        let payments = [verified_payment(m.id, d(2026, 3, 1), d(2026, 3, 31))];
        let records = DayRecords {
            payments: &payments,
            ..Default::default()
        };

        let verdict = decide(&m, today, &records);
        assert_eq!(verdict.result, ScanResult::Allowed);
    }

    #[test]
    fn test_status_beats_everything_else() {
        // Pending member with a verified payment and no cuts: the status
        // rule must fire, not the payment rule
        let m = member(MemberStatus::Pending);
        let today = d(2026, 3, 15);
        let payments = [verified_payment(m.id, d(2026, 3, 1), d(2026, 3, 31))];
        let records = DayRecords {
            payments: &payments,
            ..Default::default()
        };

        let verdict = decide(&m, today, &records);
        assert_eq!(verdict.result, ScanResult::BlockedStatus);

        let denied = member(MemberStatus::Denied);
        assert_eq!(
            decide(&denied, today, &records).result,
            ScanResult::BlockedStatus
        );
    }

    #[test]
    fn test_no_payment_blocks_before_cut() {
        let m = member(MemberStatus::Approved);
        let today = d(2026, 3, 15);
        let cuts = [cut(m.id, d(2026, 3, 15), d(2026, 3, 16))];
        let records = DayRecords {
            cuts: &cuts,
            ..Default::default()
        };

        let verdict = decide(&m, today, &records);
        assert_eq!(verdict.result, ScanResult::BlockedNoPayment);
    }

    #[test]
    fn test_cut_beats_verified_payment() {
        // Approved, paid, and cut for today: the cut wins over payment-ok
        let m = member(MemberStatus::Approved);
        let today = d(2026, 3, 15);
        let payments = [verified_payment(m.id, d(2026, 3, 1), d(2026, 3, 31))];
        let cuts = [cut(m.id, d(2026, 3, 14), d(2026, 3, 16))];
        let records = DayRecords {
            payments: &payments,
            cuts: &cuts,
            closures: &[],
        };

        let verdict = decide(&m, today, &records);
        assert_eq!(verdict.result, ScanResult::BlockedCut);
    }

    #[test]
    fn test_closure_blocks_under_the_same_verdict_as_a_cut() {
        let m = member(MemberStatus::Approved);
        let today = d(2026, 3, 15);
        let payments = [verified_payment(m.id, d(2026, 3, 1), d(2026, 3, 31))];
        let closures = [closure(d(2026, 3, 15), d(2026, 3, 15))];
        let records = DayRecords {
            payments: &payments,
            cuts: &[],
            closures: &closures,
        };

        let verdict = decide(&m, today, &records);
        assert_eq!(verdict.result, ScanResult::BlockedCut);
        assert_eq!(verdict.reason, "Mess is closed today");
    }

    #[test]
    fn test_expired_payment_cycle_does_not_count() {
        let m = member(MemberStatus::Approved);
        let today = d(2026, 4, 1);
        let payments = [verified_payment(m.id, d(2026, 3, 1), d(2026, 3, 31))];
        let records = DayRecords {
            payments: &payments,
            ..Default::default()
        };

        assert_eq!(
            decide(&m, today, &records).result,
            ScanResult::BlockedNoPayment
        );
    }

    #[test]
    fn test_snapshot_mirrors_decision_precedence() {
        let m = member(MemberStatus::Approved);
        let today = d(2026, 3, 15);
        let payments = [verified_payment(m.id, d(2026, 3, 1), d(2026, 3, 31))];
        let cuts = [cut(m.id, d(2026, 3, 15), d(2026, 3, 15))];

        let snapshot = member_snapshot(
            &m,
            today,
            &DayRecords {
                payments: &payments,
                cuts: &cuts,
                closures: &[],
            },
        );
        assert!(snapshot.payment_ok);
        assert!(snapshot.today_cut);
        assert!(!snapshot.closure_today);
        assert_eq!(snapshot.overall_status, OverallStatus::CutOrClosed);

        let pending = member(MemberStatus::Pending);
        let snapshot = member_snapshot(&pending, today, &DayRecords::default());
        assert_eq!(snapshot.overall_status, OverallStatus::NotApproved);

        let snapshot = member_snapshot(&m, today, &DayRecords::default());
        assert_eq!(snapshot.overall_status, OverallStatus::NoPayment);

        let snapshot = member_snapshot(
            &m,
            today,
            &DayRecords {
                payments: &payments,
                cuts: &[],
                closures: &[],
            },
        );
        assert_eq!(snapshot.overall_status, OverallStatus::Allowed);
    }
}
