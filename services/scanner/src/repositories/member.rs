//! Member repository for database operations

use anyhow::anyhow;
use mess::models::{Member, MemberStatus};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::error::{ScannerError, ScannerResult};

const MEMBER_COLUMNS: &str = "id, name, roll_no, room_no, phone, status, \
     credential_version, credential_nonce, created_at, updated_at";

/// Member repository
#[derive(Clone)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    /// Create a new member repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a member by ID
    pub async fn find_by_id(&self, id: Uuid) -> ScannerResult<Option<Member>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM members WHERE id = $1",
            MEMBER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(member_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// IDs of all approved members
    pub async fn approved_ids(&self) -> ScannerResult<Vec<Uuid>> {
        let rows = sqlx::query("SELECT id FROM members WHERE status = 'APPROVED' ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|row| row.get("id")).collect())
    }

    /// Replace a member's credential version and nonce, invalidating every
    /// previously issued QR for that member
    pub async fn update_credential(
        &self,
        id: Uuid,
        version: i32,
        nonce: &str,
    ) -> ScannerResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE members
            SET credential_version = $2, credential_nonce = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(version)
        .bind(nonce)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ScannerError::BadRequest("Member not found".to_string()));
        }

        info!(member_id = %id, version, "rotated member credential");
        Ok(())
    }
}

fn member_from_row(row: &PgRow) -> ScannerResult<Member> {
    let status: String = row.get("status");
    let status = status
        .parse::<MemberStatus>()
        .map_err(|e| ScannerError::Internal(anyhow!(e)))?;

    Ok(Member {
        id: row.get("id"),
        name: row.get("name"),
        roll_no: row.get("roll_no"),
        room_no: row.get("room_no"),
        phone: row.get("phone"),
        status,
        credential_version: row.get("credential_version"),
        credential_nonce: row.get("credential_nonce"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
