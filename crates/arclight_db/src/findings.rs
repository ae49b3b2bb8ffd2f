//! Typed asset/finding/classification operations, plus the `FindingStore`
//! trait implementation the pipeline consumes.

use crate::error::{DbError, Result};
use crate::ArclightDb;
use arclight_protocol::{Asset, Classification, Finding, FindingStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

impl ArclightDb {
    // ========================================================================
    // Assets
    // ========================================================================

    /// Insert or refresh an asset, keyed by `stable_id`.
    pub async fn upsert_asset(&self, asset: &Asset) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO assets (id, stable_id, name, path, asset_type, host,
                                environment, owner, source_system, total_findings,
                                created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(stable_id) DO UPDATE SET
                name = excluded.name,
                path = excluded.path,
                asset_type = excluded.asset_type,
                host = excluded.host,
                environment = excluded.environment,
                owner = excluded.owner,
                source_system = excluded.source_system,
                total_findings = excluded.total_findings,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(asset.id.to_string())
        .bind(&asset.stable_id)
        .bind(&asset.name)
        .bind(&asset.path)
        .bind(&asset.asset_type)
        .bind(&asset.host)
        .bind(&asset.environment)
        .bind(&asset.owner)
        .bind(&asset.source_system)
        .bind(asset.total_findings)
        .bind(asset.created_at)
        .bind(asset.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All registered assets, most recently updated first.
    pub async fn list_all_assets(&self) -> Result<Vec<Asset>> {
        let rows = sqlx::query("SELECT * FROM assets ORDER BY updated_at DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_asset).collect()
    }

    /// Fetch one asset by id.
    pub async fn get_asset_by_id(&self, asset_id: Uuid) -> Result<Option<Asset>> {
        let row = sqlx::query("SELECT * FROM assets WHERE id = ?")
            .bind(asset_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row_to_asset(&row)?)),
            None => Ok(None),
        }
    }

    // ========================================================================
    // Findings
    // ========================================================================

    /// Record a finding (used by the ingestion layer and tests).
    pub async fn insert_finding(&self, finding: &Finding) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO findings (id, asset_id, pattern_name, matches, severity, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(finding.id.to_string())
        .bind(finding.asset_id.to_string())
        .bind(&finding.pattern_name)
        .bind(serde_json::to_string(&finding.matches)?)
        .bind(&finding.severity)
        .bind(finding.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All findings recorded against an asset, oldest first.
    pub async fn list_findings_for_asset(&self, asset_id: Uuid) -> Result<Vec<Finding>> {
        let rows = sqlx::query("SELECT * FROM findings WHERE asset_id = ? ORDER BY created_at ASC")
            .bind(asset_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_finding).collect()
    }

    // ========================================================================
    // Classifications
    // ========================================================================

    /// Record a classification for a finding.
    pub async fn insert_classification(&self, classification: &Classification) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO classifications (id, finding_id, classification_type, sub_category,
                                         confidence_score, dpdpa_category, requires_consent,
                                         created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(classification.id.to_string())
        .bind(classification.finding_id.to_string())
        .bind(&classification.classification_type)
        .bind(&classification.sub_category)
        .bind(classification.confidence_score)
        .bind(&classification.dpdpa_category)
        .bind(classification.requires_consent)
        .bind(classification.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Classifications linked to a finding, newest first.
    pub async fn list_classifications_for_finding(
        &self,
        finding_id: Uuid,
    ) -> Result<Vec<Classification>> {
        let rows = sqlx::query(
            "SELECT * FROM classifications WHERE finding_id = ? ORDER BY created_at DESC",
        )
        .bind(finding_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_classification).collect()
    }
}

// ============================================================================
// Row converters
// ============================================================================

fn parse_uuid(row: &SqliteRow, column: &str) -> Result<Uuid> {
    let raw: String = row.get(column);
    Uuid::parse_str(&raw).map_err(|e| DbError::decode(format!("{column}: {e}")))
}

fn row_to_asset(row: &SqliteRow) -> Result<Asset> {
    Ok(Asset {
        id: parse_uuid(row, "id")?,
        stable_id: row.get("stable_id"),
        name: row.get("name"),
        path: row.get("path"),
        asset_type: row.get("asset_type"),
        host: row.get("host"),
        environment: row.get("environment"),
        owner: row.get("owner"),
        source_system: row.get("source_system"),
        total_findings: row.get("total_findings"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    })
}

fn row_to_finding(row: &SqliteRow) -> Result<Finding> {
    let matches_json: String = row.get("matches");
    Ok(Finding {
        id: parse_uuid(row, "id")?,
        asset_id: parse_uuid(row, "asset_id")?,
        pattern_name: row.get("pattern_name"),
        matches: serde_json::from_str(&matches_json)?,
        severity: row.get("severity"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    })
}

fn row_to_classification(row: &SqliteRow) -> Result<Classification> {
    Ok(Classification {
        id: parse_uuid(row, "id")?,
        finding_id: parse_uuid(row, "finding_id")?,
        classification_type: row.get("classification_type"),
        sub_category: row.get("sub_category"),
        confidence_score: row.get("confidence_score"),
        dpdpa_category: row.get("dpdpa_category"),
        requires_consent: row.get("requires_consent"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    })
}

// ============================================================================
// FindingStore implementation
// ============================================================================

#[async_trait]
impl FindingStore for ArclightDb {
    async fn list_assets(&self) -> std::result::Result<Vec<Asset>, StoreError> {
        Ok(self.list_all_assets().await?)
    }

    async fn get_asset(&self, asset_id: Uuid) -> std::result::Result<Option<Asset>, StoreError> {
        Ok(self.get_asset_by_id(asset_id).await?)
    }

    async fn list_findings(&self, asset_id: Uuid) -> std::result::Result<Vec<Finding>, StoreError> {
        Ok(self.list_findings_for_asset(asset_id).await?)
    }

    async fn get_classifications(
        &self,
        finding_id: Uuid,
    ) -> std::result::Result<Vec<Classification>, StoreError> {
        Ok(self.list_classifications_for_finding(finding_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_asset(name: &str) -> Asset {
        let now = Utc::now();
        Asset {
            id: Uuid::new_v4(),
            stable_id: format!("stable-{name}"),
            name: name.to_string(),
            path: format!("/data/{name}.csv"),
            asset_type: "file".to_string(),
            host: "db-host-01".to_string(),
            environment: "production".to_string(),
            owner: "data-platform".to_string(),
            source_system: "postgres".to_string(),
            total_findings: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn asset_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let db = ArclightDb::open(tmp.path().join("test.db")).await.unwrap();

        let asset = sample_asset("customers");
        db.upsert_asset(&asset).await.unwrap();

        let assets = db.list_all_assets().await.unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].id, asset.id);
        assert_eq!(assets[0].host, "db-host-01");

        let fetched = db.get_asset_by_id(asset.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "customers");
        assert!(db.get_asset_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_asset_is_idempotent_by_stable_id() {
        let tmp = TempDir::new().unwrap();
        let db = ArclightDb::open(tmp.path().join("test.db")).await.unwrap();

        let mut asset = sample_asset("orders");
        db.upsert_asset(&asset).await.unwrap();

        asset.total_findings = 7;
        db.upsert_asset(&asset).await.unwrap();

        let assets = db.list_all_assets().await.unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].total_findings, 7);
    }

    #[tokio::test]
    async fn findings_and_classifications_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let db = ArclightDb::open(tmp.path().join("test.db")).await.unwrap();

        let asset = sample_asset("payroll");
        db.upsert_asset(&asset).await.unwrap();

        let finding = Finding {
            id: Uuid::new_v4(),
            asset_id: asset.id,
            pattern_name: "aadhaar_number".to_string(),
            matches: vec!["XXXX-XXXX-1234".to_string(), "XXXX-XXXX-5678".to_string()],
            severity: "critical".to_string(),
            created_at: Utc::now(),
        };
        db.insert_finding(&finding).await.unwrap();

        let classification = Classification {
            id: Uuid::new_v4(),
            finding_id: finding.id,
            classification_type: "PII".to_string(),
            sub_category: "IN_AADHAAR".to_string(),
            confidence_score: 0.92,
            dpdpa_category: "Government Identifier".to_string(),
            requires_consent: true,
            created_at: Utc::now(),
        };
        db.insert_classification(&classification).await.unwrap();

        let findings = db.list_findings_for_asset(asset.id).await.unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].match_count(), 2);

        let classifications = db
            .list_classifications_for_finding(finding.id)
            .await
            .unwrap();
        assert_eq!(classifications.len(), 1);
        assert_eq!(classifications[0].sub_category, "IN_AADHAAR");
        assert!(classifications[0].requires_consent);
    }
}
