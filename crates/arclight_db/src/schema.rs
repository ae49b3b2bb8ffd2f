//! Schema creation (idempotent, run on every open).

use crate::{ArclightDb, Result};

impl ArclightDb {
    pub(crate) async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS assets (
                id TEXT PRIMARY KEY,
                stable_id TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                path TEXT NOT NULL,
                asset_type TEXT NOT NULL DEFAULT 'file',
                host TEXT NOT NULL DEFAULT '',
                environment TEXT NOT NULL DEFAULT '',
                owner TEXT NOT NULL DEFAULT '',
                source_system TEXT NOT NULL DEFAULT '',
                total_findings INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL,
                updated_at TIMESTAMP NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS findings (
                id TEXT PRIMARY KEY,
                asset_id TEXT NOT NULL REFERENCES assets(id),
                pattern_name TEXT NOT NULL,
                matches TEXT NOT NULL DEFAULT '[]',
                severity TEXT NOT NULL DEFAULT '',
                created_at TIMESTAMP NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_findings_asset ON findings(asset_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS classifications (
                id TEXT PRIMARY KEY,
                finding_id TEXT NOT NULL REFERENCES findings(id),
                classification_type TEXT NOT NULL DEFAULT '',
                sub_category TEXT NOT NULL DEFAULT '',
                confidence_score REAL NOT NULL DEFAULT 0.0,
                dpdpa_category TEXT NOT NULL DEFAULT '',
                requires_consent INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_classifications_finding ON classifications(finding_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
