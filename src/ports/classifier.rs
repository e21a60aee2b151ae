use crate::entities;
use async_trait::async_trait;
use thiserror::Error;

/// What the remote classifier returns for one document.
#[derive(Clone, Debug)]
pub struct Verdict {
    pub confidence: f64,
    pub authenticity: String,
    pub details: serde_json::Value,
}

#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Timeout or connection failure; distinct from a well-formed negative
    /// classification.
    #[error("classifier service unavailable: {0}")]
    Unavailable(String),
    #[error("classifier returned an invalid response: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Outbound call to the external authenticity-scoring service. Stateless; no
/// retries at this layer.
#[async_trait]
pub trait Classifier {
    async fn classify(
        &self,
        file_path: &str,
        certificate_type: entities::CertificateType,
    ) -> Result<Verdict, ClassifierError>;
}
