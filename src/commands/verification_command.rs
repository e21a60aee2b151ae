use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use thiserror::Error;

use crate::entities;
use crate::ports::{Classifier, FileStore, VerificationsRepository};
use crate::task_registry::TaskRegistry;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Verification not found")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn elapsed_ms(started: Instant) -> i64 {
    i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX)
}

/// Orchestrates the verification lifecycle: intake, dispatch to the
/// classifier, reconciliation into a terminal status, deletion.
#[derive(Clone)]
pub struct VerificationPipeline<R, S, C> {
    repo: R,
    store: S,
    classifier: C,
    tasks: TaskRegistry,
}

impl<R, S, C> VerificationPipeline<R, S, C>
where
    R: VerificationsRepository + Clone + Send + Sync + 'static,
    S: FileStore + Clone + Send + Sync + 'static,
    C: Classifier + Clone + Send + Sync + 'static,
{
    pub fn new(repo: R, store: S, classifier: C) -> Self {
        Self {
            repo,
            store,
            classifier,
            tasks: TaskRegistry::new(),
        }
    }

    pub fn tasks(&self) -> &TaskRegistry {
        &self.tasks
    }

    /// Stores the payload, creates the record in PENDING state and schedules
    /// reconciliation. Returns before the classifier is called; the eventual
    /// result is only visible through later reads.
    pub async fn intake(
        &self,
        user_id: entities::UserId,
        certificate_type: entities::CertificateType,
        file_name: String,
        mime_type: entities::MimeType,
        size: entities::FileSize,
        payload: &Path,
    ) -> Result<entities::Verification, PipelineError> {
        let now = Utc::now();
        let key = entities::FileKey::generate(now, &mime_type);
        let file_path = self.store.save(payload, &key).await?;

        let mut repo = self.repo.clone();
        let verification = match repo
            .create(
                user_id,
                now,
                certificate_type,
                entities::Upload {
                    file_name,
                    file_path: file_path.clone(),
                    size,
                    mime_type,
                },
            )
            .await
        {
            Ok(verification) => verification,
            Err(err) => {
                // The record never existed, so nothing else will unlink the
                // stored file.
                if let Err(remove_err) = self.store.remove(&file_path).await {
                    log::error!(
                        "failed to clean up stored file {}: {:#}",
                        file_path,
                        remove_err
                    );
                }
                return Err(err.into());
            }
        };

        let this = self.clone();
        let id = verification.id;
        let handle = tokio::spawn(async move { this.process(id).await });
        self.tasks.register(id, handle);

        Ok(verification)
    }

    /// Reconciles one record: PENDING -> PROCESSING -> terminal. Runs as the
    /// spawned task but is callable directly; never returns an error because
    /// nobody upstream is left to handle one.
    pub async fn process(&self, id: entities::VerificationId) {
        let started = Instant::now();
        match self.reconcile(id, started).await {
            Ok(Some(status)) => {
                log::info!("verification {} completed: {}", id, status);
            }
            Ok(None) => {
                log::warn!(
                    "verification {} skipped reconciliation: record missing or already settled",
                    id
                );
            }
            Err(err) => {
                log::error!("verification {} processing failed: {:#}", id, err);
                let mut repo = self.repo.clone();
                match repo
                    .record_failure(id, err.to_string(), elapsed_ms(started), Utc::now())
                    .await
                {
                    Ok(Some(_)) => {}
                    Ok(None) => {
                        log::warn!("verification {}: failure not recorded, record gone", id)
                    }
                    Err(err) => {
                        log::error!("verification {}: could not persist failure: {:#}", id, err)
                    }
                }
            }
        }
    }

    async fn reconcile(
        &self,
        id: entities::VerificationId,
        started: Instant,
    ) -> anyhow::Result<Option<entities::VerificationStatus>> {
        let mut repo = self.repo.clone();

        let Some(verification) = repo.mark_processing(id, Utc::now()).await? else {
            return Ok(None);
        };

        let verdict = self
            .classifier
            .classify(&verification.file_path, verification.certificate_type)
            .await?;

        let status = entities::VerificationStatus::from_classifier_label(&verdict.authenticity);
        let outcome = entities::AnalysisOutcome {
            confidence: entities::ConfidenceScore::try_from(verdict.confidence)?,
            details: verdict.details,
            analyzed_at: Utc::now(),
        };

        let updated = repo
            .record_outcome(verification, status, outcome, elapsed_ms(started), Utc::now())
            .await?;
        Ok(updated.map(|v| v.status))
    }

    /// Owner-scoped delete: unlink the stored file best-effort, then drop the
    /// record.
    pub async fn delete(
        &self,
        user_id: &entities::UserId,
        id: entities::VerificationId,
    ) -> Result<(), PipelineError> {
        let mut repo = self.repo.clone();

        let Some(verification) = repo.get_by_id(user_id, id).await? else {
            return Err(PipelineError::NotFound);
        };

        if let Err(err) = self.store.remove(&verification.file_path).await {
            log::error!("failed to delete file {}: {:#}", verification.file_path, err);
        }

        match repo.delete(user_id, id).await? {
            Some(_) => Ok(()),
            // lost a race with another delete
            None => Err(PipelineError::NotFound),
        }
    }
}
