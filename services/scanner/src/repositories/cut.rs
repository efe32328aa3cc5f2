//! Mess cut and mess closure repository for database operations

use anyhow::anyhow;
use chrono::NaiveDate;
use mess::AccessError;
use mess::models::{AppliedBy, MessClosure, MessCut, NewMessClosure, NewMessCut};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::error::{ScannerError, ScannerResult};

const CUT_COLUMNS: &str =
    "id, member_id, from_date, to_date, applied_at, applied_by, cutoff_ok";

/// Mess cut and closure repository
#[derive(Clone)]
pub struct CutRepository {
    pool: PgPool,
}

impl CutRepository {
    /// Create a new cut repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Mess cuts of a member covering `date`
    pub async fn cuts_covering(
        &self,
        member_id: Uuid,
        date: NaiveDate,
    ) -> ScannerResult<Vec<MessCut>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM mess_cuts
            WHERE member_id = $1
              AND from_date <= $2
              AND to_date >= $2
            "#,
            CUT_COLUMNS
        ))
        .bind(member_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(cut_from_row).collect()
    }

    /// Facility closures covering `date`
    pub async fn closures_covering(&self, date: NaiveDate) -> ScannerResult<Vec<MessClosure>> {
        let rows = sqlx::query(
            r#"
            SELECT id, from_date, to_date, reason, created_at
            FROM mess_closures
            WHERE from_date <= $1
              AND to_date >= $1
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(closure_from_row).collect())
    }

    /// Create a mess cut, enforcing the per-member no-overlap invariant
    ///
    /// Probe and insert share one transaction; the schema-level exclusion
    /// constraint backstops concurrent inserts.
    pub async fn create_cut(&self, new: &NewMessCut, cutoff_ok: bool) -> ScannerResult<MessCut> {
        let mut tx = self.pool.begin().await?;

        let conflict = sqlx::query(
            r#"
            SELECT from_date, to_date
            FROM mess_cuts
            WHERE member_id = $1
              AND from_date <= $3
              AND to_date >= $2
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(new.member_id)
        .bind(new.from_date)
        .bind(new.to_date)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(row) = conflict {
            return Err(AccessError::OverlapViolation {
                entity: "mess cut",
                from: row.get("from_date"),
                to: row.get("to_date"),
            }
            .into());
        }

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO mess_cuts (member_id, from_date, to_date, applied_by, cutoff_ok)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            CUT_COLUMNS
        ))
        .bind(new.member_id)
        .bind(new.from_date)
        .bind(new.to_date)
        .bind(new.applied_by.as_str())
        .bind(cutoff_ok)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let cut = cut_from_row(&row)?;
        info!(
            member_id = %cut.member_id,
            from_date = %cut.from_date,
            to_date = %cut.to_date,
            cutoff_ok,
            "created mess cut"
        );
        Ok(cut)
    }

    /// Create a facility-wide closure
    pub async fn create_closure(&self, new: &NewMessClosure) -> ScannerResult<MessClosure> {
        let row = sqlx::query(
            r#"
            INSERT INTO mess_closures (from_date, to_date, reason)
            VALUES ($1, $2, $3)
            RETURNING id, from_date, to_date, reason, created_at
            "#,
        )
        .bind(new.from_date)
        .bind(new.to_date)
        .bind(&new.reason)
        .fetch_one(&self.pool)
        .await?;

        let closure = closure_from_row(&row);
        info!(
            from_date = %closure.from_date,
            to_date = %closure.to_date,
            "created mess closure"
        );
        Ok(closure)
    }
}

fn cut_from_row(row: &PgRow) -> ScannerResult<MessCut> {
    let applied_by: String = row.get("applied_by");
    let applied_by = applied_by
        .parse::<AppliedBy>()
        .map_err(|e| ScannerError::Internal(anyhow!(e)))?;

    Ok(MessCut {
        id: row.get("id"),
        member_id: row.get("member_id"),
        from_date: row.get("from_date"),
        to_date: row.get("to_date"),
        applied_at: row.get("applied_at"),
        applied_by,
        cutoff_ok: row.get("cutoff_ok"),
    })
}

fn closure_from_row(row: &PgRow) -> MessClosure {
    MessClosure {
        id: row.get("id"),
        from_date: row.get("from_date"),
        to_date: row.get("to_date"),
        reason: row.get("reason"),
        created_at: row.get("created_at"),
    }
}
