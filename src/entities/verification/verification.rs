use super::{AnalysisOutcome, CertificateType, VerificationId, VerificationStatus};
use crate::entities::{FileSize, MimeType, UserId, Version};
use chrono::{DateTime, Utc};

/// One upload's verification record.
#[derive(Clone, Debug)]
pub struct Verification {
    pub id: VerificationId,
    pub user_id: UserId,
    pub certificate_type: CertificateType,
    pub file_name: String,
    pub file_path: String,
    pub file_size: FileSize,
    pub mime_type: MimeType,
    pub status: VerificationStatus,
    pub analysis: Option<AnalysisOutcome>,
    pub processing_time_ms: Option<i64>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: Version,
}
