use std::str::FromStr;

use anyhow::{ensure, Context};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Acquire, Postgres};
use ulid::Ulid;

use crate::entities;
use crate::ports;

#[derive(Debug, Clone, sqlx::FromRow)]
struct VerificationModel {
    id: String,
    user_id: String,
    certificate_type: String,
    file_name: String,
    file_path: String,
    file_size: i64,
    file_mime_type: String,
    status: String,
    confidence_score: Option<f64>,
    analysis_details: Option<serde_json::Value>,
    analyzed_at: Option<DateTime<Utc>>,
    processing_time_ms: Option<i64>,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: i32,
}

impl VerificationModel {
    fn into_entity(self) -> anyhow::Result<entities::Verification> {
        let id = Ulid::from_str(&self.id).context("ulid decode error")?;
        let status = entities::VerificationStatus::try_from(self.status.as_str())?;

        let analysis = match (self.confidence_score, self.analysis_details, self.analyzed_at) {
            (Some(confidence), Some(details), Some(analyzed_at)) => {
                Some(entities::AnalysisOutcome {
                    confidence: entities::ConfidenceScore::try_from(confidence)?,
                    details,
                    analyzed_at,
                })
            }
            (None, None, None) => None,
            _ => anyhow::bail!("analysis columns must be populated together"),
        };
        ensure!(
            analysis.is_none() || self.error_message.is_none(),
            "analysis fields and error message are mutually exclusive"
        );

        Ok(entities::Verification {
            id: entities::VerificationId::from(id),
            user_id: entities::UserId::from(self.user_id),
            certificate_type: entities::CertificateType::try_from(self.certificate_type.as_str())?,
            file_name: self.file_name,
            file_path: self.file_path,
            file_size: entities::FileSize::try_from(self.file_size)?,
            mime_type: entities::MimeType::try_from(self.file_mime_type)?,
            status,
            analysis,
            processing_time_ms: self.processing_time_ms,
            error_message: self.error_message,
            created_at: self.created_at,
            updated_at: self.updated_at,
            version: entities::Version::try_from(self.version)?,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    id,
    user_id,
    certificate_type,
    file_name,
    file_path,
    file_size,
    file_mime_type,
    status,
    confidence_score,
    analysis_details,
    analyzed_at,
    processing_time_ms,
    error_message,
    created_at,
    updated_at,
    version
"#;

#[derive(Debug, Clone)]
pub struct VerificationsRepositoryImpl<A> {
    db: A,
}

impl<A> VerificationsRepositoryImpl<A> {
    pub fn new(db: A) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<A> ports::VerificationsRepository for VerificationsRepositoryImpl<A>
where
    A: Send + Sync,
    for<'c> &'c A: Acquire<'c, Database = Postgres>,
{
    async fn create(
        &mut self,
        user_id: entities::UserId,
        now: DateTime<Utc>,
        certificate_type: entities::CertificateType,
        upload: entities::Upload,
    ) -> anyhow::Result<entities::Verification> {
        let mut trx = self.db.begin().await?;
        let verification = entities::Verification {
            id: entities::VerificationId::from(Ulid::from_datetime(now.into())),
            user_id,
            certificate_type,
            file_name: upload.file_name,
            file_path: upload.file_path,
            file_size: upload.size,
            mime_type: upload.mime_type,
            status: entities::VerificationStatus::Pending,
            analysis: None,
            processing_time_ms: None,
            error_message: None,
            created_at: now,
            updated_at: now,
            version: entities::Version::new(),
        };

        sqlx::query(
            r#"
                INSERT INTO verifications
                    (id, user_id, certificate_type, file_name, file_path, file_size,
                     file_mime_type, status, created_at, updated_at, version)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(Ulid::from(verification.id).to_string())
        .bind(verification.user_id.as_str())
        .bind(verification.certificate_type.as_str())
        .bind(&verification.file_name)
        .bind(&verification.file_path)
        .bind(i64::from(verification.file_size))
        .bind(verification.mime_type.value())
        .bind(verification.status.as_str())
        .bind(verification.created_at)
        .bind(verification.updated_at)
        .bind(i32::from(verification.version))
        .execute(&mut *trx)
        .await
        .context("insert verification")?;

        trx.commit().await?;
        Ok(verification)
    }

    async fn mark_processing(
        &mut self,
        id: entities::VerificationId,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<entities::Verification>> {
        let mut conn = self.db.acquire().await?;

        let model = sqlx::query_as::<_, VerificationModel>(&format!(
            r#"
                UPDATE verifications
                    SET status = 'PROCESSING', updated_at = $1, version = version + 1
                    WHERE id = $2 AND status = 'PENDING'
                RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(now)
        .bind(Ulid::from(id).to_string())
        .fetch_optional(&mut *conn)
        .await
        .context("mark verification processing")?;

        model.map(VerificationModel::into_entity).transpose()
    }

    async fn record_outcome(
        &mut self,
        verification: entities::Verification,
        status: entities::VerificationStatus,
        outcome: entities::AnalysisOutcome,
        processing_time_ms: i64,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<entities::Verification>> {
        let mut trx = self.db.begin().await?;
        let prev_version = verification.version;

        let model = sqlx::query_as::<_, VerificationModel>(&format!(
            r#"
                UPDATE verifications
                    SET
                        status = $1,
                        confidence_score = $2,
                        analysis_details = $3,
                        analyzed_at = $4,
                        processing_time_ms = $5,
                        updated_at = $6,
                        version = $7
                    WHERE id = $8 AND version = $9
                RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(status.as_str())
        .bind(outcome.confidence.value())
        .bind(&outcome.details)
        .bind(outcome.analyzed_at)
        .bind(processing_time_ms)
        .bind(now)
        .bind(i32::from(prev_version.next()))
        .bind(Ulid::from(verification.id).to_string())
        .bind(i32::from(prev_version))
        .fetch_optional(&mut *trx)
        .await
        .context("record verification outcome")?;

        trx.commit().await?;
        model.map(VerificationModel::into_entity).transpose()
    }

    async fn record_failure(
        &mut self,
        id: entities::VerificationId,
        error_message: String,
        processing_time_ms: i64,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<entities::Verification>> {
        let mut conn = self.db.acquire().await?;

        let model = sqlx::query_as::<_, VerificationModel>(&format!(
            r#"
                UPDATE verifications
                    SET
                        status = 'FORGED',
                        error_message = $1,
                        processing_time_ms = $2,
                        updated_at = $3,
                        version = version + 1
                    WHERE id = $4 AND status IN ('PENDING', 'PROCESSING')
                RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(&error_message)
        .bind(processing_time_ms)
        .bind(now)
        .bind(Ulid::from(id).to_string())
        .fetch_optional(&mut *conn)
        .await
        .context("record verification failure")?;

        model.map(VerificationModel::into_entity).transpose()
    }

    async fn get_by_id(
        &mut self,
        user_id: &entities::UserId,
        id: entities::VerificationId,
    ) -> anyhow::Result<Option<entities::Verification>> {
        let mut conn = self.db.acquire().await?;

        let model = sqlx::query_as::<_, VerificationModel>(&format!(
            r#"
                SELECT {SELECT_COLUMNS}
                FROM verifications
                WHERE id = $1 AND user_id = $2
            "#
        ))
        .bind(Ulid::from(id).to_string())
        .bind(user_id.as_str())
        .fetch_optional(&mut *conn)
        .await
        .context("fetch verification")?;

        model.map(VerificationModel::into_entity).transpose()
    }

    async fn list(
        &mut self,
        user_id: &entities::UserId,
        page: &entities::PageRequest,
    ) -> anyhow::Result<ports::Paged<entities::Verification>> {
        let mut conn = self.db.acquire().await?;

        // Sequential on one connection; keeps pool pressure at one per request.
        let models = sqlx::query_as::<_, VerificationModel>(&format!(
            r#"
                SELECT {SELECT_COLUMNS}
                FROM verifications
                WHERE user_id = $1
                ORDER BY created_at DESC, id DESC
                LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id.as_str())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *conn)
        .await
        .context("fetch verification page")?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM verifications WHERE user_id = $1")
                .bind(user_id.as_str())
                .fetch_one(&mut *conn)
                .await
                .context("count verifications")?;

        let values = models
            .into_iter()
            .map(VerificationModel::into_entity)
            .collect::<anyhow::Result<Vec<_>>>()
            .context("convert Verification")?;

        Ok(ports::Paged {
            values,
            total: u64::try_from(total).unwrap_or(0),
        })
    }

    async fn recent(
        &mut self,
        user_id: &entities::UserId,
        limit: i64,
    ) -> anyhow::Result<Vec<entities::Verification>> {
        let mut conn = self.db.acquire().await?;

        let models = sqlx::query_as::<_, VerificationModel>(&format!(
            r#"
                SELECT {SELECT_COLUMNS}
                FROM verifications
                WHERE user_id = $1
                ORDER BY created_at DESC, id DESC
                LIMIT $2
            "#
        ))
        .bind(user_id.as_str())
        .bind(limit)
        .fetch_all(&mut *conn)
        .await
        .context("fetch recent verifications")?;

        models
            .into_iter()
            .map(VerificationModel::into_entity)
            .collect::<anyhow::Result<Vec<_>>>()
            .context("convert Verification")
    }

    async fn status_counts(
        &mut self,
        user_id: &entities::UserId,
    ) -> anyhow::Result<ports::StatusCounts> {
        let mut conn = self.db.acquire().await?;

        let (total, authentic, suspicious, forged): (i64, i64, i64, i64) = sqlx::query_as(
            r#"
                SELECT
                    COUNT(*),
                    COUNT(*) FILTER (WHERE status = 'AUTHENTIC'),
                    COUNT(*) FILTER (WHERE status = 'SUSPICIOUS'),
                    COUNT(*) FILTER (WHERE status = 'FORGED')
                FROM verifications
                WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_one(&mut *conn)
        .await
        .context("count verification statuses")?;

        Ok(ports::StatusCounts {
            total: u64::try_from(total).unwrap_or(0),
            authentic: u64::try_from(authentic).unwrap_or(0),
            suspicious: u64::try_from(suspicious).unwrap_or(0),
            forged: u64::try_from(forged).unwrap_or(0),
        })
    }

    async fn delete(
        &mut self,
        user_id: &entities::UserId,
        id: entities::VerificationId,
    ) -> anyhow::Result<Option<entities::Verification>> {
        let mut trx = self.db.begin().await?;

        let model = sqlx::query_as::<_, VerificationModel>(&format!(
            r#"
                DELETE FROM verifications
                WHERE id = $1 AND user_id = $2
                RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(Ulid::from(id).to_string())
        .bind(user_id.as_str())
        .fetch_optional(&mut *trx)
        .await
        .context("delete verification")?;

        trx.commit().await?;
        model.map(VerificationModel::into_entity).transpose()
    }
}
