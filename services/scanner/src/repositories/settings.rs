//! Settings repository for the global credential secret epoch
//!
//! The epoch lives in a single-row table so advancing it is one atomic
//! update visible to every verifier on its next read. The signing secret
//! itself never touches the database.

use sqlx::{PgPool, Row};
use tracing::info;

use crate::error::ScannerResult;

/// Settings repository
#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    /// Create a new settings repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the settings row if it does not exist yet
    pub async fn ensure_defaults(&self) -> ScannerResult<()> {
        sqlx::query(
            "INSERT INTO settings (id, secret_epoch) VALUES (1, 1) ON CONFLICT (id) DO NOTHING",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// The currently active secret epoch
    pub async fn current_epoch(&self) -> ScannerResult<i32> {
        let row = sqlx::query("SELECT secret_epoch FROM settings WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("secret_epoch"))
    }

    /// Advance the secret epoch, invalidating every outstanding credential
    pub async fn advance_epoch(&self) -> ScannerResult<i32> {
        let row = sqlx::query(
            "UPDATE settings SET secret_epoch = secret_epoch + 1 WHERE id = 1 RETURNING secret_epoch",
        )
        .fetch_one(&self.pool)
        .await?;

        let epoch: i32 = row.get("secret_epoch");
        info!(epoch, "advanced credential secret epoch");
        Ok(epoch)
    }
}
