//! In-memory implementations of the ports, used to drive the pipeline and
//! query layers without a database or network.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ulid::Ulid;

use certificate_verify_backend::commands::verification_command::VerificationPipeline;
use certificate_verify_backend::entities;
use certificate_verify_backend::ports::{
    Classifier, ClassifierError, FileStore, NewUser, Notifier, Paged, StatusCounts,
    UsersRepository, Verdict, VerificationsRepository,
};

// ---------------------------------------------------------------------------
// Verifications

#[derive(Clone, Default)]
pub struct MemoryVerifications {
    inner: Arc<Mutex<HashMap<entities::VerificationId, entities::Verification>>>,
    pub fail_create: Arc<AtomicBool>,
}

impl MemoryVerifications {
    fn sorted_for(&self, user_id: &entities::UserId) -> Vec<entities::Verification> {
        let map = self.inner.lock().unwrap();
        let mut records: Vec<_> = map
            .values()
            .filter(|v| &v.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        records
    }
}

#[async_trait]
impl VerificationsRepository for MemoryVerifications {
    async fn create(
        &mut self,
        user_id: entities::UserId,
        now: DateTime<Utc>,
        certificate_type: entities::CertificateType,
        upload: entities::Upload,
    ) -> anyhow::Result<entities::Verification> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(anyhow!("insert failed"));
        }
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
        self.inner
            .lock()
            .unwrap()
            .insert(verification.id, verification.clone());
        Ok(verification)
    }

    async fn mark_processing(
        &mut self,
        id: entities::VerificationId,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<entities::Verification>> {
        let mut map = self.inner.lock().unwrap();
        match map.get_mut(&id) {
            Some(v) if v.status == entities::VerificationStatus::Pending => {
                v.status = entities::VerificationStatus::Processing;
                v.updated_at = now;
                v.version = v.version.next();
                Ok(Some(v.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn record_outcome(
        &mut self,
        verification: entities::Verification,
        status: entities::VerificationStatus,
        outcome: entities::AnalysisOutcome,
        processing_time_ms: i64,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<entities::Verification>> {
        let mut map = self.inner.lock().unwrap();
        match map.get_mut(&verification.id) {
            Some(v) if v.version == verification.version => {
                v.status = status;
                v.analysis = Some(outcome);
                v.processing_time_ms = Some(processing_time_ms);
                v.updated_at = now;
                v.version = v.version.next();
                Ok(Some(v.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn record_failure(
        &mut self,
        id: entities::VerificationId,
        error_message: String,
        processing_time_ms: i64,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<entities::Verification>> {
        let mut map = self.inner.lock().unwrap();
        match map.get_mut(&id) {
            Some(v) if !v.status.is_terminal() => {
                v.status = entities::VerificationStatus::Forged;
                v.error_message = Some(error_message);
                v.processing_time_ms = Some(processing_time_ms);
                v.updated_at = now;
                v.version = v.version.next();
                Ok(Some(v.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn get_by_id(
        &mut self,
        user_id: &entities::UserId,
        id: entities::VerificationId,
    ) -> anyhow::Result<Option<entities::Verification>> {
        let map = self.inner.lock().unwrap();
        Ok(map.get(&id).filter(|v| &v.user_id == user_id).cloned())
    }

    async fn list(
        &mut self,
        user_id: &entities::UserId,
        page: &entities::PageRequest,
    ) -> anyhow::Result<Paged<entities::Verification>> {
        let records = self.sorted_for(user_id);
        let total = records.len() as u64;
        let values = records
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(Paged { values, total })
    }

    async fn recent(
        &mut self,
        user_id: &entities::UserId,
        limit: i64,
    ) -> anyhow::Result<Vec<entities::Verification>> {
        Ok(self
            .sorted_for(user_id)
            .into_iter()
            .take(limit as usize)
            .collect())
    }

    async fn status_counts(
        &mut self,
        user_id: &entities::UserId,
    ) -> anyhow::Result<StatusCounts> {
        let records = self.sorted_for(user_id);
        let count = |status: entities::VerificationStatus| {
            records.iter().filter(|v| v.status == status).count() as u64
        };
        Ok(StatusCounts {
            total: records.len() as u64,
            authentic: count(entities::VerificationStatus::Authentic),
            suspicious: count(entities::VerificationStatus::Suspicious),
            forged: count(entities::VerificationStatus::Forged),
        })
    }

    async fn delete(
        &mut self,
        user_id: &entities::UserId,
        id: entities::VerificationId,
    ) -> anyhow::Result<Option<entities::Verification>> {
        let mut map = self.inner.lock().unwrap();
        if map.get(&id).is_some_and(|v| &v.user_id == user_id) {
            Ok(map.remove(&id))
        } else {
            Ok(None)
        }
    }
}

// ---------------------------------------------------------------------------
// File store

#[derive(Clone, Default)]
pub struct MemoryFileStore {
    pub saved: Arc<Mutex<Vec<String>>>,
    pub removed: Arc<Mutex<Vec<String>>>,
    pub fail_remove: Arc<AtomicBool>,
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn save(&self, _src: &Path, key: &entities::FileKey) -> anyhow::Result<String> {
        let path = format!("mem://{}", key.as_str());
        self.saved.lock().unwrap().push(path.clone());
        Ok(path)
    }

    async fn remove(&self, path: &str) -> anyhow::Result<()> {
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(anyhow!("unlink failed"));
        }
        self.removed.lock().unwrap().push(path.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Classifier stub

#[derive(Clone)]
pub enum StubOutcome {
    Verdict {
        confidence: f64,
        authenticity: String,
        details: serde_json::Value,
    },
    Unavailable,
    InvalidResponse,
}

#[derive(Clone)]
pub struct StubClassifier {
    outcome: Arc<StubOutcome>,
    pub calls: Arc<Mutex<Vec<(String, entities::CertificateType)>>>,
}

impl StubClassifier {
    pub fn new(outcome: StubOutcome) -> Self {
        Self {
            outcome: Arc::new(outcome),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn verdict(confidence: f64, authenticity: &str) -> Self {
        Self::new(StubOutcome::Verdict {
            confidence,
            authenticity: authenticity.to_string(),
            details: serde_json::json!({"model": "stub"}),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Classifier for StubClassifier {
    async fn classify(
        &self,
        file_path: &str,
        certificate_type: entities::CertificateType,
    ) -> Result<Verdict, ClassifierError> {
        self.calls
            .lock()
            .unwrap()
            .push((file_path.to_string(), certificate_type));
        match self.outcome.as_ref() {
            StubOutcome::Verdict {
                confidence,
                authenticity,
                details,
            } => Ok(Verdict {
                confidence: *confidence,
                authenticity: authenticity.clone(),
                details: details.clone(),
            }),
            StubOutcome::Unavailable => {
                Err(ClassifierError::Unavailable("connection refused".to_string()))
            }
            StubOutcome::InvalidResponse => {
                Err(ClassifierError::InvalidResponse("not json".to_string()))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Users + notifier

#[derive(Clone, Default)]
pub struct MemoryUsers {
    inner: Arc<Mutex<HashMap<String, entities::User>>>,
}

#[async_trait]
impl UsersRepository for MemoryUsers {
    async fn create(
        &mut self,
        now: DateTime<Utc>,
        new_user: NewUser,
    ) -> anyhow::Result<entities::User> {
        let user = entities::User {
            id: entities::UserId::from(Ulid::from_datetime(now.into()).to_string()),
            email: new_user.email,
            password_hash: new_user.password_hash,
            full_name: new_user.full_name,
            institution_name: new_user.institution_name,
            role: new_user.role,
            email_verified: false,
            verification_code: Some(new_user.verification_code),
            reset_code: None,
            created_at: now,
            updated_at: now,
            version: entities::Version::new(),
        };
        self.inner
            .lock()
            .unwrap()
            .insert(user.id.as_str().to_string(), user.clone());
        Ok(user)
    }

    async fn get_by_id(&mut self, id: &entities::UserId) -> anyhow::Result<Option<entities::User>> {
        let map = self.inner.lock().unwrap();
        Ok(map.get(id.as_str()).cloned())
    }

    async fn get_by_email(&mut self, email: &str) -> anyhow::Result<Option<entities::User>> {
        let map = self.inner.lock().unwrap();
        Ok(map.values().find(|u| u.email == email).cloned())
    }

    async fn get_by_verification_code(
        &mut self,
        code: &str,
    ) -> anyhow::Result<Option<entities::User>> {
        let map = self.inner.lock().unwrap();
        Ok(map
            .values()
            .find(|u| u.verification_code.as_ref().is_some_and(|c| c.code() == code))
            .cloned())
    }

    async fn get_by_reset_code(&mut self, code: &str) -> anyhow::Result<Option<entities::User>> {
        let map = self.inner.lock().unwrap();
        Ok(map
            .values()
            .find(|u| u.reset_code.as_ref().is_some_and(|c| c.code() == code))
            .cloned())
    }

    async fn update(
        &mut self,
        mut user: entities::User,
        now: DateTime<Utc>,
    ) -> anyhow::Result<entities::User> {
        let mut map = self.inner.lock().unwrap();
        let stored = map
            .get_mut(user.id.as_str())
            .ok_or_else(|| anyhow!("user missing"))?;
        if stored.version != user.version {
            return Err(anyhow!("conflict"));
        }
        user.version = user.version.next();
        user.updated_at = now;
        *stored = user.clone();
        Ok(user)
    }
}

#[derive(Clone, Default)]
pub struct MemoryNotifier {
    pub verification_codes: Arc<Mutex<Vec<(String, String)>>>,
    pub reset_codes: Arc<Mutex<Vec<(String, String)>>>,
}

impl MemoryNotifier {
    pub fn last_verification_code(&self) -> Option<String> {
        self.verification_codes
            .lock()
            .unwrap()
            .last()
            .map(|(_, code)| code.clone())
    }

    pub fn last_reset_code(&self) -> Option<String> {
        self.reset_codes
            .lock()
            .unwrap()
            .last()
            .map(|(_, code)| code.clone())
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn send_verification_code(&self, email: &str, code: &str) -> anyhow::Result<()> {
        self.verification_codes
            .lock()
            .unwrap()
            .push((email.to_string(), code.to_string()));
        Ok(())
    }

    async fn send_password_reset_code(&self, email: &str, code: &str) -> anyhow::Result<()> {
        self.reset_codes
            .lock()
            .unwrap()
            .push((email.to_string(), code.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers

pub type TestPipeline = VerificationPipeline<MemoryVerifications, MemoryFileStore, StubClassifier>;

pub fn pipeline(
    classifier: StubClassifier,
) -> (TestPipeline, MemoryVerifications, MemoryFileStore) {
    let repo = MemoryVerifications::default();
    let store = MemoryFileStore::default();
    (
        VerificationPipeline::new(repo.clone(), store.clone(), classifier),
        repo,
        store,
    )
}

pub fn owner(name: &str) -> entities::UserId {
    entities::UserId::from(name.to_string())
}

pub fn mime(value: &str) -> entities::MimeType {
    entities::MimeType::try_from(value.to_string()).unwrap()
}

pub fn file_size(value: i64) -> entities::FileSize {
    entities::FileSize::try_from(value).unwrap()
}

pub fn pdf_upload(file_name: &str, size: i64) -> entities::Upload {
    entities::Upload {
        file_name: file_name.to_string(),
        file_path: format!("mem://{file_name}"),
        size: file_size(size),
        mime_type: mime("application/pdf"),
    }
}

/// Drives a record straight to a terminal status through the repository.
pub async fn settle(
    repo: &mut MemoryVerifications,
    id: entities::VerificationId,
    status: entities::VerificationStatus,
) {
    let now = Utc::now();
    let processing = repo.mark_processing(id, now).await.unwrap().unwrap();
    match status {
        entities::VerificationStatus::Forged => {
            repo.record_failure(id, "stub failure".to_string(), 5, now)
                .await
                .unwrap()
                .unwrap();
        }
        _ => {
            let outcome = entities::AnalysisOutcome {
                confidence: entities::ConfidenceScore::try_from(80.0).unwrap(),
                details: serde_json::json!({}),
                analyzed_at: now,
            };
            repo.record_outcome(processing, status, outcome, 5, now)
                .await
                .unwrap()
                .unwrap();
        }
    }
}
