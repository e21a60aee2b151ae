use super::{Paged, StatusCounts};
use crate::entities;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait VerificationsRepository {
    /// Creates a record in PENDING state.
    async fn create(
        &mut self,
        user_id: entities::UserId,
        now: DateTime<Utc>,
        certificate_type: entities::CertificateType,
        upload: entities::Upload,
    ) -> anyhow::Result<entities::Verification>;

    /// Advances PENDING -> PROCESSING. Returns `None` when the record is
    /// missing or no longer pending.
    async fn mark_processing(
        &mut self,
        id: entities::VerificationId,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<entities::Verification>>;

    /// Settles a record with the classifier outcome. Version-guarded; `None`
    /// means a concurrent writer (or a delete) won and nothing was written.
    async fn record_outcome(
        &mut self,
        verification: entities::Verification,
        status: entities::VerificationStatus,
        outcome: entities::AnalysisOutcome,
        processing_time_ms: i64,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<entities::Verification>>;

    /// Settles a record as FORGED with an error message. Only applies while
    /// the record is still PENDING or PROCESSING.
    async fn record_failure(
        &mut self,
        id: entities::VerificationId,
        error_message: String,
        processing_time_ms: i64,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<entities::Verification>>;

    async fn get_by_id(
        &mut self,
        user_id: &entities::UserId,
        id: entities::VerificationId,
    ) -> anyhow::Result<Option<entities::Verification>>;

    /// Owner-scoped page, newest first.
    async fn list(
        &mut self,
        user_id: &entities::UserId,
        page: &entities::PageRequest,
    ) -> anyhow::Result<Paged<entities::Verification>>;

    /// The `limit` most recently created records for one owner.
    async fn recent(
        &mut self,
        user_id: &entities::UserId,
        limit: i64,
    ) -> anyhow::Result<Vec<entities::Verification>>;

    async fn status_counts(&mut self, user_id: &entities::UserId)
        -> anyhow::Result<StatusCounts>;

    /// Deletes the row and returns it, or `None` when it does not exist for
    /// this owner.
    async fn delete(
        &mut self,
        user_id: &entities::UserId,
        id: entities::VerificationId,
    ) -> anyhow::Result<Option<entities::Verification>>;
}
