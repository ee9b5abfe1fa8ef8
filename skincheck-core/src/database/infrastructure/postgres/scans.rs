use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use tracing::debug;
use uuid::Uuid;

use crate::database::ports::scans::ScanRepository;
use crate::domain::{NewScan, PageRequest, ScanPage, ScanRecord, ScanResult};
use crate::error::{Result, ScanError};

const SCAN_COLUMNS: &str = "id, user_id, image_path, captured_at, condition, \
                            confidence, recommendations";

/// PostgreSQL-backed implementation of the `ScanRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresScanRepository {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct ScanRow {
    id: Uuid,
    user_id: Uuid,
    image_path: String,
    captured_at: DateTime<Utc>,
    condition: Option<String>,
    confidence: Option<f64>,
    recommendations: Option<Vec<String>>,
}

impl From<ScanRow> for ScanRecord {
    fn from(row: ScanRow) -> Self {
        let result = match (row.condition, row.confidence) {
            (Some(condition), Some(confidence)) => Some(ScanResult {
                condition,
                confidence,
                recommendations: row.recommendations.unwrap_or_default(),
            }),
            _ => None,
        };

        ScanRecord {
            id: row.id,
            user_id: row.user_id,
            image_path: row.image_path,
            timestamp: row.captured_at,
            result,
        }
    }
}

impl PostgresScanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn insert<'e, E>(executor: E, scan: NewScan) -> Result<ScanRecord>
    where
        E: PgExecutor<'e>,
    {
        let id = Uuid::now_v7();
        let (condition, confidence, recommendations) = match &scan.result {
            Some(result) => (
                Some(result.condition.as_str()),
                Some(result.confidence),
                Some(result.recommendations.clone()),
            ),
            None => (None, None, None),
        };

        sqlx::query(
            r#"
            INSERT INTO scans (
                id, user_id, image_path, captured_at,
                condition, confidence, recommendations
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(scan.user_id)
        .bind(&scan.image_path)
        .bind(scan.timestamp)
        .bind(condition)
        .bind(confidence)
        .bind(recommendations)
        .execute(executor)
        .await
        .map_err(|e| ScanError::Persistence(format!("Failed to insert scan: {e}")))?;

        Ok(scan.into_record(id))
    }
}

#[async_trait]
impl ScanRepository for PostgresScanRepository {
    async fn create(&self, scan: NewScan) -> Result<ScanRecord> {
        Self::insert(self.pool(), scan).await
    }

    async fn create_batch(&self, scans: Vec<NewScan>) -> Result<Vec<ScanRecord>> {
        let mut tx = self.pool().begin().await.map_err(|e| {
            ScanError::Persistence(format!("Failed to start transaction: {e}"))
        })?;

        let mut created = Vec::with_capacity(scans.len());
        for scan in scans {
            match Self::insert(&mut *tx, scan).await {
                Ok(record) => created.push(record),
                Err(err) => {
                    if let Err(rollback_err) = tx.rollback().await {
                        debug!(error = %rollback_err, "rollback after failed batch insert");
                    }
                    return Err(err);
                }
            }
        }

        tx.commit().await.map_err(|e| {
            ScanError::Persistence(format!("Failed to commit scan batch: {e}"))
        })?;

        Ok(created)
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<ScanRecord> {
        let query =
            format!("SELECT {SCAN_COLUMNS} FROM scans WHERE id = $1 AND user_id = $2");
        let row = sqlx::query_as::<_, ScanRow>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| ScanError::Persistence(format!("Failed to load scan: {e}")))?;

        row.map(ScanRecord::from).ok_or_else(ScanError::scan_not_found)
    }

    async fn list(&self, user_id: Uuid, page: PageRequest) -> Result<ScanPage> {
        // Count and page share one snapshot so the totals match the items.
        let mut tx = self.pool().begin().await.map_err(|e| {
            ScanError::Persistence(format!("Failed to start transaction: {e}"))
        })?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                ScanError::Persistence(format!("Failed to configure transaction: {e}"))
            })?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM scans WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    ScanError::Persistence(format!("Failed to count scans: {e}"))
                })?;

        let query = format!(
            "SELECT {SCAN_COLUMNS} FROM scans WHERE user_id = $1 \
             ORDER BY captured_at DESC, id DESC LIMIT $2 OFFSET $3"
        );
        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, ScanRow>(&query)
            .bind(user_id)
            .bind(i64::from(page.per_page()))
            .bind(offset)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| ScanError::Persistence(format!("Failed to list scans: {e}")))?;

        tx.commit().await.map_err(|e| {
            ScanError::Persistence(format!("Failed to finish scan listing: {e}"))
        })?;

        let items = rows.into_iter().map(ScanRecord::from).collect();
        Ok(ScanPage::new(items, total.max(0) as u64, page))
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        let outcome = sqlx::query("DELETE FROM scans WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool())
            .await
            .map_err(|e| ScanError::Persistence(format!("Failed to delete scan: {e}")))?;

        if outcome.rows_affected() == 0 {
            return Err(ScanError::scan_not_found());
        }
        Ok(())
    }
}
