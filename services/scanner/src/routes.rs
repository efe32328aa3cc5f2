//! Scanner service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use mess::cutoff;
use mess::decision::MemberSnapshot;
use mess::models::{
    AppliedBy, Meal, NewMessClosure, NewMessCut, NewPaymentCycle, PaymentStatus, ScanResult,
    StaffToken,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::AppState;
use crate::error::ScannerError;
use crate::middleware::{admin_auth_middleware, staff_auth_middleware};
use crate::validation;

/// Request for one QR scan
#[derive(Deserialize)]
pub struct ScanRequest {
    pub qr_data: String,
    pub meal: String,
    pub device_info: Option<String>,
}

/// Response for one QR scan
#[derive(Serialize)]
pub struct ScanResponse {
    pub result: ScanResult,
    pub scan_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<MemberSnapshot>,
}

/// Response for an eligibility preview
#[derive(Serialize)]
pub struct EligibilityResponse {
    pub member: MemberSnapshot,
    /// Meal whose serving window contains the current time, if any;
    /// informational only, scanning is not gated on it
    pub current_meal: Option<Meal>,
}

/// Request for issuing a staff token
#[derive(Deserialize)]
pub struct IssueStaffTokenRequest {
    pub label: String,
    pub expires_hours: Option<i64>,
}

/// Response for a freshly issued staff token; carries the raw secret,
/// shown exactly once
#[derive(Serialize)]
pub struct IssuedStaffTokenResponse {
    pub id: Uuid,
    pub label: String,
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Staff token state without the secret hash
#[derive(Serialize)]
pub struct StaffTokenInfo {
    pub id: Uuid,
    pub label: String,
    pub active: bool,
    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<StaffToken> for StaffTokenInfo {
    fn from(token: StaffToken) -> Self {
        Self {
            id: token.id,
            label: token.label,
            active: token.active,
            issued_at: token.issued_at,
            expires_at: token.expires_at,
        }
    }
}

/// Response for a member credential rotation
#[derive(Serialize)]
pub struct RotateCredentialResponse {
    pub member_id: Uuid,
    pub version: i32,
    pub nonce: String,
}

/// Request for creating a mess cut
#[derive(Deserialize)]
pub struct CreateCutRequest {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub applied_by: Option<AppliedBy>,
}

/// Request for creating a payment cycle
#[derive(Deserialize)]
pub struct CreatePaymentRequest {
    pub cycle_start: NaiveDate,
    pub cycle_end: NaiveDate,
    pub amount: Decimal,
    pub status: Option<PaymentStatus>,
}

/// Request for creating a facility closure
#[derive(Deserialize)]
pub struct CreateClosureRequest {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub reason: Option<String>,
}

/// Create the router for the scanner service
pub fn create_router(state: AppState) -> Router {
    let staff_routes = Router::new()
        .route("/scan", post(scan))
        .route("/members/:id/eligibility", get(member_eligibility))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            staff_auth_middleware,
        ));

    let admin_routes = Router::new()
        .route("/staff-tokens", post(issue_staff_token))
        .route("/staff-tokens/:id/revoke", post(revoke_staff_token))
        .route("/staff-tokens/:id/reactivate", post(reactivate_staff_token))
        .route("/members/:id/credential/qr", get(member_credential_qr))
        .route("/members/:id/credential/rotate", post(rotate_member_credential))
        .route("/credentials/rotate-epoch", post(rotate_secret_epoch))
        .route("/members/:id/cuts", post(create_mess_cut))
        .route("/members/:id/payments", post(create_payment_cycle))
        .route("/closures", post(create_closure))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(staff_routes)
        .merge(admin_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database_up = common::database::health_check(&state.db_pool)
        .await
        .unwrap_or(false);

    Json(json!({
        "status": if database_up { "ok" } else { "degraded" },
        "service": "scanner-service",
        "database": database_up
    }))
}

/// Handle one QR scan from a staff terminal
pub async fn scan(
    State(state): State<AppState>,
    Extension(staff_token): Extension<StaffToken>,
    Json(payload): Json<ScanRequest>,
) -> Result<impl IntoResponse, ScannerError> {
    let meal: Meal = payload.meal.parse().map_err(ScannerError::BadRequest)?;
    let device_info = payload.device_info.unwrap_or_default();

    let outcome = state
        .scan_service
        .scan(&payload.qr_data, meal, &staff_token, &device_info)
        .await?;

    Ok(Json(ScanResponse {
        result: outcome.result,
        scan_id: outcome.scan_id,
        reason: outcome.reason,
        member: outcome.member,
    }))
}

/// Read-only eligibility preview for a member; records no scan
pub async fn member_eligibility(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ScannerError> {
    let member = state.scan_service.eligibility(id).await?;

    let local_time = Utc::now().with_timezone(&state.config.timezone).time();
    let current_meal = state.config.meal_windows.current_meal(local_time);

    Ok(Json(EligibilityResponse {
        member,
        current_meal,
    }))
}

/// Issue a new staff token; the raw secret appears only in this response
pub async fn issue_staff_token(
    State(state): State<AppState>,
    Json(payload): Json<IssueStaffTokenRequest>,
) -> Result<impl IntoResponse, ScannerError> {
    validation::validate_token_label(&payload.label).map_err(ScannerError::BadRequest)?;

    let ttl = match payload.expires_hours {
        Some(hours) if hours <= 0 => {
            return Err(ScannerError::BadRequest(
                "expires_hours must be positive".to_string(),
            ));
        }
        Some(hours) => Some(Duration::hours(hours)),
        None => None,
    };

    let (staff_token, raw_secret) = state
        .token_store
        .issue(payload.label.trim(), ttl, Utc::now())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(IssuedStaffTokenResponse {
            id: staff_token.id,
            label: staff_token.label,
            token: raw_secret,
            issued_at: staff_token.issued_at,
            expires_at: staff_token.expires_at,
        }),
    ))
}

/// Revoke a staff token
pub async fn revoke_staff_token(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ScannerError> {
    let staff_token = state.token_store.revoke(id).await?;
    Ok(Json(StaffTokenInfo::from(staff_token)))
}

/// Reactivate a revoked staff token, unless it has already expired
pub async fn reactivate_staff_token(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ScannerError> {
    let staff_token = state.token_store.reactivate(id, Utc::now()).await?;
    Ok(Json(StaffTokenInfo::from(staff_token)))
}

/// Render a member's current QR credential as a PNG image
pub async fn member_credential_qr(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ScannerError> {
    let png = state.credential_service.issue_qr(id, Utc::now()).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

/// Rotate one member's credential, invalidating their outstanding QR
pub async fn rotate_member_credential(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ScannerError> {
    let (version, nonce) = state.credential_service.rotate_member(id).await?;
    Ok(Json(RotateCredentialResponse {
        member_id: id,
        version,
        nonce,
    }))
}

/// Advance the global secret epoch, invalidating every outstanding
/// credential; reports per-member rotation results
pub async fn rotate_secret_epoch(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ScannerError> {
    let rotation = state.credential_service.rotate_epoch().await?;
    Ok(Json(rotation))
}

/// Create a mess cut for a member, subject to the cutoff rule
pub async fn create_mess_cut(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateCutRequest>,
) -> Result<impl IntoResponse, ScannerError> {
    if state.members.find_by_id(id).await?.is_none() {
        return Err(ScannerError::BadRequest("Member not found".to_string()));
    }

    let applied_by = payload.applied_by.unwrap_or(AppliedBy::Member);
    let now = Utc::now().with_timezone(&state.config.timezone);
    let cutoff_check = cutoff::validate_cut_range(
        payload.from_date,
        payload.to_date,
        now,
        state.config.cutoff_time,
    );
    let cutoff_ok = cutoff_check.is_ok();

    match applied_by {
        AppliedBy::Member => cutoff_check?,
        AppliedBy::Admin => {
            // Admin overrides bypass only the earliest-date deadline; the
            // range and 30-day cap still apply, and cutoff_ok records the
            // bypass
            cutoff::validate_cut_duration(payload.from_date, payload.to_date)?;
        }
    }

    let cut = state
        .cuts
        .create_cut(
            &NewMessCut {
                member_id: id,
                from_date: payload.from_date,
                to_date: payload.to_date,
                applied_by,
            },
            cutoff_ok,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(cut)))
}

/// Create a payment cycle for a member
pub async fn create_payment_cycle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, ScannerError> {
    if state.members.find_by_id(id).await?.is_none() {
        return Err(ScannerError::BadRequest("Member not found".to_string()));
    }

    let status = payload.status.unwrap_or(PaymentStatus::Uploaded);
    if !status.blocks_overlap() {
        return Err(ScannerError::BadRequest(
            "status must be UPLOADED or VERIFIED".to_string(),
        ));
    }

    let today = state.scan_service.today();
    validation::validate_payment_cycle(payload.cycle_start, payload.cycle_end, today)
        .map_err(ScannerError::BadRequest)?;
    validation::validate_payment_amount(payload.amount).map_err(ScannerError::BadRequest)?;

    let cycle = state
        .payments
        .create(&NewPaymentCycle {
            member_id: id,
            cycle_start: payload.cycle_start,
            cycle_end: payload.cycle_end,
            amount: payload.amount,
            status,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(cycle)))
}

/// Create a facility-wide closure
pub async fn create_closure(
    State(state): State<AppState>,
    Json(payload): Json<CreateClosureRequest>,
) -> Result<impl IntoResponse, ScannerError> {
    if payload.from_date > payload.to_date {
        return Err(ScannerError::BadRequest(
            "from_date is after to_date".to_string(),
        ));
    }

    let closure = state
        .cuts
        .create_closure(&NewMessClosure {
            from_date: payload.from_date,
            to_date: payload.to_date,
            reason: payload.reason.unwrap_or_default(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(closure)))
}
