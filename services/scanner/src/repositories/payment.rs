//! Payment cycle repository for database operations

use anyhow::anyhow;
use chrono::NaiveDate;
use mess::AccessError;
use mess::models::{NewPaymentCycle, PaymentCycle, PaymentStatus};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::error::{ScannerError, ScannerResult};

const PAYMENT_COLUMNS: &str =
    "id, member_id, cycle_start, cycle_end, amount, status, created_at, updated_at";

/// Payment cycle repository
#[derive(Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    /// Create a new payment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Verified payment cycles of a member covering `date`
    pub async fn verified_covering(
        &self,
        member_id: Uuid,
        date: NaiveDate,
    ) -> ScannerResult<Vec<PaymentCycle>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM payment_cycles
            WHERE member_id = $1
              AND status = 'VERIFIED'
              AND cycle_start <= $2
              AND cycle_end >= $2
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(member_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(payment_from_row).collect()
    }

    /// Create a payment cycle, enforcing the no-overlap invariant
    ///
    /// The overlap probe and the insert run in one transaction so two
    /// concurrent requests cannot both pass the check; the exclusion
    /// constraint in the schema backstops the race between two inserts.
    pub async fn create(&self, new: &NewPaymentCycle) -> ScannerResult<PaymentCycle> {
        let mut tx = self.pool.begin().await?;

        let conflict = sqlx::query(
            r#"
            SELECT cycle_start, cycle_end
            FROM payment_cycles
            WHERE member_id = $1
              AND status IN ('UPLOADED', 'VERIFIED')
              AND cycle_start <= $3
              AND cycle_end >= $2
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(new.member_id)
        .bind(new.cycle_start)
        .bind(new.cycle_end)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(row) = conflict {
            return Err(AccessError::OverlapViolation {
                entity: "payment cycle",
                from: row.get("cycle_start"),
                to: row.get("cycle_end"),
            }
            .into());
        }

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO payment_cycles (member_id, cycle_start, cycle_end, amount, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(new.member_id)
        .bind(new.cycle_start)
        .bind(new.cycle_end)
        .bind(new.amount)
        .bind(new.status.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let cycle = payment_from_row(&row)?;
        info!(
            member_id = %cycle.member_id,
            cycle_start = %cycle.cycle_start,
            cycle_end = %cycle.cycle_end,
            "created payment cycle"
        );
        Ok(cycle)
    }
}

fn payment_from_row(row: &PgRow) -> ScannerResult<PaymentCycle> {
    let status: String = row.get("status");
    let status = status
        .parse::<PaymentStatus>()
        .map_err(|e| ScannerError::Internal(anyhow!(e)))?;

    Ok(PaymentCycle {
        id: row.get("id"),
        member_id: row.get("member_id"),
        cycle_start: row.get("cycle_start"),
        cycle_end: row.get("cycle_end"),
        amount: row.get("amount"),
        status,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
