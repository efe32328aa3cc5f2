//! Scan orchestration
//!
//! One scan runs: decode and verify the credential, resolve the member,
//! decide, record the event, respond. Every attempt that reaches a member
//! is recorded, denials included; denial events are audit data, not noise.
//! There is no retry or idempotence machinery because duplicate scans are
//! legitimate business events.

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use mess::AccessError;
use mess::credential::CredentialCodec;
use mess::decision::{DayRecords, MemberSnapshot, Verdict, decide, member_snapshot};
use mess::models::{Meal, Member, NewScanEvent, ScanResult, StaffToken};
use tracing::info;
use uuid::Uuid;

use crate::error::{ScannerError, ScannerResult};
use crate::repositories::{
    CutRepository, MemberRepository, PaymentRepository, ScanEventRepository, SettingsRepository,
};

/// Outcome of one scan, as returned to the terminal
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub scan_id: Uuid,
    pub result: ScanResult,
    /// Human-readable denial reason; absent when allowed
    pub reason: Option<String>,
    /// Member snapshot; present only when allowed
    pub member: Option<MemberSnapshot>,
}

/// Scan orchestrator
#[derive(Clone)]
pub struct ScanService {
    members: MemberRepository,
    payments: PaymentRepository,
    cuts: CutRepository,
    scans: ScanEventRepository,
    settings: SettingsRepository,
    codec: CredentialCodec,
    timezone: Tz,
}

impl ScanService {
    /// Create a new scan service
    pub fn new(
        members: MemberRepository,
        payments: PaymentRepository,
        cuts: CutRepository,
        scans: ScanEventRepository,
        settings: SettingsRepository,
        codec: CredentialCodec,
        timezone: Tz,
    ) -> Self {
        Self {
            members,
            payments,
            cuts,
            scans,
            settings,
            codec,
            timezone,
        }
    }

    /// Handle one scan attempt from an authenticated staff terminal
    pub async fn scan(
        &self,
        qr_data: &str,
        meal: Meal,
        staff_token: &StaffToken,
        device_info: &str,
    ) -> ScannerResult<ScanOutcome> {
        let secret_epoch = self.settings.current_epoch().await?;
        let claims = self.codec.decode(qr_data, secret_epoch)?;

        // A missing member surfaces exactly like a bad signature; the error
        // mapping collapses both so member ids cannot be enumerated
        let member = self
            .members
            .find_by_id(claims.member_id)
            .await?
            .ok_or(AccessError::MemberNotFound)?;
        self.codec.verify_member(&claims, &member)?;

        let today = self.today();
        let (verdict, snapshot) = self.evaluate(&member, today).await?;

        let event = self
            .scans
            .record(&NewScanEvent {
                member_id: member.id,
                meal,
                result: verdict.result,
                staff_token_id: Some(staff_token.id),
                device_info: device_info.to_string(),
            })
            .await?;

        info!(
            member_id = %member.id,
            meal = %meal,
            result = %verdict.result,
            scan_id = %event.id,
            "recorded scan"
        );

        if verdict.result == ScanResult::Allowed {
            Ok(ScanOutcome {
                scan_id: event.id,
                result: verdict.result,
                reason: None,
                member: Some(snapshot),
            })
        } else {
            // Denials carry a reason but never the snapshot
            Ok(ScanOutcome {
                scan_id: event.id,
                result: verdict.result,
                reason: Some(verdict.reason.to_string()),
                member: None,
            })
        }
    }

    /// Read-only eligibility preview for dashboards; records nothing
    pub async fn eligibility(&self, member_id: Uuid) -> ScannerResult<MemberSnapshot> {
        let member = self
            .members
            .find_by_id(member_id)
            .await?
            .ok_or_else(|| ScannerError::BadRequest("Member not found".to_string()))?;

        let today = self.today();
        let (_, snapshot) = self.evaluate(&member, today).await?;
        Ok(snapshot)
    }

    /// Current date in the facility timezone
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }

    async fn evaluate(
        &self,
        member: &Member,
        today: NaiveDate,
    ) -> ScannerResult<(Verdict, MemberSnapshot)> {
        let payments = self.payments.verified_covering(member.id, today).await?;
        let cuts = self.cuts.cuts_covering(member.id, today).await?;
        let closures = self.cuts.closures_covering(today).await?;

        let records = DayRecords {
            payments: &payments,
            cuts: &cuts,
            closures: &closures,
        };

        Ok((
            decide(member, today, &records),
            member_snapshot(member, today, &records),
        ))
    }
}
