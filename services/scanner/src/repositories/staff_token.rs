//! Staff token repository for database operations

use chrono::{DateTime, Utc};
use mess::models::StaffToken;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::ScannerResult;

const TOKEN_COLUMNS: &str = "id, label, token_hash, active, issued_at, expires_at";

/// Staff token repository
#[derive(Clone)]
pub struct StaffTokenRepository {
    pool: PgPool,
}

impl StaffTokenRepository {
    /// Create a new staff token repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a freshly issued token
    pub async fn insert(
        &self,
        label: &str,
        token_hash: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> ScannerResult<StaffToken> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO staff_tokens (label, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            TOKEN_COLUMNS
        ))
        .bind(label)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(token_from_row(&row))
    }

    /// Keyed lookup by secret hash; the hash is the lookup key, so no
    /// secret comparison happens here
    pub async fn find_by_hash(&self, token_hash: &str) -> ScannerResult<Option<StaffToken>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM staff_tokens WHERE token_hash = $1",
            TOKEN_COLUMNS
        ))
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(token_from_row))
    }

    /// Find a token by ID
    pub async fn find_by_id(&self, id: Uuid) -> ScannerResult<Option<StaffToken>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM staff_tokens WHERE id = $1",
            TOKEN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(token_from_row))
    }

    /// Flip the active flag, returning the updated row if it exists
    pub async fn set_active(&self, id: Uuid, active: bool) -> ScannerResult<Option<StaffToken>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE staff_tokens
            SET active = $2
            WHERE id = $1
            RETURNING {}
            "#,
            TOKEN_COLUMNS
        ))
        .bind(id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(token_from_row))
    }
}

fn token_from_row(row: &PgRow) -> StaffToken {
    StaffToken {
        id: row.get("id"),
        label: row.get("label"),
        token_hash: row.get("token_hash"),
        active: row.get("active"),
        issued_at: row.get("issued_at"),
        expires_at: row.get("expires_at"),
    }
}
