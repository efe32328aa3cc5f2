//! Scan event repository for database operations
//!
//! Scan events are append-only audit facts; this repository only ever
//! inserts.

use anyhow::anyhow;
use mess::models::{Meal, NewScanEvent, ScanEvent, ScanResult};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::error::{ScannerError, ScannerResult};

/// Scan event repository
#[derive(Clone)]
pub struct ScanEventRepository {
    pool: PgPool,
}

impl ScanEventRepository {
    /// Create a new scan event repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist one scan event; `scanned_at` is assigned by the database
    pub async fn record(&self, new: &NewScanEvent) -> ScannerResult<ScanEvent> {
        let row = sqlx::query(
            r#"
            INSERT INTO scan_events (member_id, meal, result, staff_token_id, device_info)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, member_id, meal, result, scanned_at, staff_token_id, device_info
            "#,
        )
        .bind(new.member_id)
        .bind(new.meal.as_str())
        .bind(new.result.as_str())
        .bind(new.staff_token_id)
        .bind(&new.device_info)
        .fetch_one(&self.pool)
        .await?;

        scan_event_from_row(&row)
    }
}

fn scan_event_from_row(row: &PgRow) -> ScannerResult<ScanEvent> {
    let meal: String = row.get("meal");
    let meal = meal
        .parse::<Meal>()
        .map_err(|e| ScannerError::Internal(anyhow!(e)))?;

    let result: String = row.get("result");
    let result = result
        .parse::<ScanResult>()
        .map_err(|e| ScannerError::Internal(anyhow!(e)))?;

    Ok(ScanEvent {
        id: row.get("id"),
        member_id: row.get("member_id"),
        meal,
        result,
        scanned_at: row.get("scanned_at"),
        staff_token_id: row.get("staff_token_id"),
        device_info: row.get("device_info"),
    })
}
